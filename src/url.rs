//! URL Pipeline
//!
//! Canonicalize the submitted URL, short-circuit trusted domains, then
//! tokenize the canonical host+path and run the classifier, feeding scaled
//! structural features alongside when the loaded graph takes two inputs.

use std::path::Path;

use ::url::Url;

use crate::artifact::{self, PipelineConfig};
use crate::calibrate::{calibrate, Prediction};
use crate::constants::{MODEL_FILE, URL_DIR};
use crate::error::{PipelineError, PipelineResult};
use crate::features::{UrlFeatureExtractor, URL_FEATURE_COUNT};
use crate::model::{InferenceEngine, ModelInputs, OnnxModel};
use crate::policy::TrustedDomains;
use crate::scaler::FeatureScaler;
use crate::tokenizer::Tokenizer;

/// Canonical form of a submitted URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    /// Lowercased host with one leading `www.` stripped; the whitelist key
    pub host: String,
    /// host + path, the exact string the model consumes
    pub canonical: String,
}

/// Normalize a raw URL string into its canonical form.
///
/// The whole string is lowercased once, so the whitelist key, the token
/// stream and the structural features all see the same text. A missing
/// scheme defaults to `http://`. Queries and fragments are dropped; a bare
/// root path contributes nothing.
pub fn normalize_url(raw: &str) -> PipelineResult<CanonicalUrl> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidInput("empty URL".to_string()));
    }

    let lowered = trimmed.to_lowercase();
    let with_scheme = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        lowered
    } else {
        format!("http://{}", lowered)
    };

    let parsed = Url::parse(&with_scheme)
        .map_err(|e| PipelineError::InvalidInput(format!("unparseable URL: {}", e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| PipelineError::InvalidInput("URL has no host".to_string()))?;
    let host = host.strip_prefix("www.").unwrap_or(host).to_string();

    let path = parsed.path();
    let canonical = if path == "/" {
        host.clone()
    } else {
        format!("{}{}", host, path)
    };

    Ok(CanonicalUrl { host, canonical })
}

/// The URL classification pipeline
pub struct UrlPipeline {
    tokenizer: Tokenizer,
    config: PipelineConfig,
    extractor: UrlFeatureExtractor,
    trusted: TrustedDomains,
    engine: Box<dyn InferenceEngine>,
}

impl std::fmt::Debug for UrlPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlPipeline").finish_non_exhaustive()
    }
}

impl UrlPipeline {
    /// Load every artifact from `<base>/url/` with the built-in trust list
    pub fn load(base_dir: &Path) -> PipelineResult<Self> {
        Self::load_with_policy(base_dir, TrustedDomains::default())
    }

    /// Load with a caller-supplied trust list
    pub fn load_with_policy(base_dir: &Path, trusted: TrustedDomains) -> PipelineResult<Self> {
        let dir = base_dir.join(URL_DIR);
        log::info!(
            "Loading URL pipeline from {} ({} trusted domains)",
            dir.display(),
            trusted.len()
        );

        let tokenizer = Tokenizer::load(&dir)?;
        let config = PipelineConfig::load(&dir)?;
        // The scaler ships with every URL model generation, single-input
        // ones included, so its absence is always a broken install.
        let scaler = FeatureScaler::load(&dir, URL_FEATURE_COUNT)?;
        let model_path = artifact::require(&dir, MODEL_FILE)?;
        let model = OnnxModel::load(&model_path, config.max_seq_len)?;

        Ok(Self::with_engine(
            tokenizer,
            config,
            UrlFeatureExtractor::new(scaler),
            trusted,
            Box::new(model),
        ))
    }

    /// Assemble a pipeline around a caller-supplied engine
    pub fn with_engine(
        tokenizer: Tokenizer,
        config: PipelineConfig,
        extractor: UrlFeatureExtractor,
        trusted: TrustedDomains,
        engine: Box<dyn InferenceEngine>,
    ) -> Self {
        Self {
            tokenizer,
            config,
            extractor,
            trusted,
            engine,
        }
    }

    /// Classify one URL
    pub fn predict(&self, raw: &str) -> PipelineResult<Prediction> {
        let url = normalize_url(raw)?;

        if self.trusted.contains(&url.host) {
            log::debug!("Host {} is trusted, skipping model", url.host);
            return Ok(Prediction::trusted());
        }

        let sequence = self
            .tokenizer
            .encode(&url.canonical, self.config.max_seq_len);
        let probability = match self.engine.inputs() {
            ModelInputs::Single => self.engine.predict(&sequence, None)?,
            ModelInputs::Dual => {
                let features = self.extractor.transform(&[url.canonical.as_str()])?;
                self.engine.predict(&sequence, Some(&features))?
            }
        };
        Ok(calibrate(probability))
    }
}
