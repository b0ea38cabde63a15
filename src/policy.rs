//! Trust Policy
//!
//! Domains on the trusted list classify as Legitimate with full confidence
//! before any tokenization or model work happens. Matching is exact against
//! the canonical host (lowercased, one leading `www.` stripped), so
//! subdomains and look-alike registrations still go through the model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::TRUSTED_DOMAINS;

/// Set of domains that bypass model invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustedDomains {
    domains: HashSet<String>,
}

impl TrustedDomains {
    /// Build a custom trust list; entries are canonicalized on insertion
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| canonical_domain(&d.into()))
                .collect(),
        }
    }

    /// Empty trust list; every URL reaches the model
    pub fn none() -> Self {
        Self {
            domains: HashSet::new(),
        }
    }

    /// True when the canonical host is on the list
    pub fn contains(&self, canonical_host: &str) -> bool {
        self.domains.contains(canonical_host)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl Default for TrustedDomains {
    fn default() -> Self {
        Self::new(TRUSTED_DOMAINS.iter().copied())
    }
}

fn canonical_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    lowered.strip_prefix("www.").unwrap_or(&lowered).to_string()
}
