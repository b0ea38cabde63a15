//! Scan Records
//!
//! Flat value summarizing one completed scan. The pipeline keeps no
//! storage of its own; callers persist or render these however they like.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calibrate::{Prediction, Verdict};

/// Which pipeline produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Email,
    Url,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Email => "email",
            InputKind::Url => "url",
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One completed scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub kind: InputKind,
    pub verdict: Verdict,
    pub confidence: f64,
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl ScanRecord {
    pub fn new(kind: InputKind, prediction: Prediction, elapsed_ms: u64) -> Self {
        Self {
            kind,
            verdict: prediction.verdict,
            confidence: prediction.confidence,
            elapsed_ms,
            timestamp: Utc::now(),
        }
    }
}
