//! Inference Context
//!
//! Explicit handle owning both loaded pipelines. Construction is
//! all-or-nothing: either every artifact of both pipelines loads and
//! validates, or the context does not exist. There is no global state;
//! callers share the context behind an `Arc` when they need to.

use std::path::Path;
use std::time::Instant;

use crate::calibrate::Prediction;
use crate::email::EmailPipeline;
use crate::error::PipelineResult;
use crate::policy::TrustedDomains;
use crate::record::{InputKind, ScanRecord};
use crate::url::UrlPipeline;

pub struct InferenceContext {
    email: EmailPipeline,
    url: UrlPipeline,
}

impl std::fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceContext").finish_non_exhaustive()
    }
}

impl InferenceContext {
    /// Load both pipelines from the artifact base directory
    pub fn load(base_dir: &Path) -> PipelineResult<Self> {
        Self::load_with_policy(base_dir, TrustedDomains::default())
    }

    /// Load both pipelines with a caller-supplied trust list
    pub fn load_with_policy(base_dir: &Path, trusted: TrustedDomains) -> PipelineResult<Self> {
        let email = EmailPipeline::load(base_dir)?;
        let url = UrlPipeline::load_with_policy(base_dir, trusted)?;
        log::info!("Inference context ready ({})", base_dir.display());
        Ok(Self { email, url })
    }

    /// Assemble a context from already-built pipelines
    pub fn from_pipelines(email: EmailPipeline, url: UrlPipeline) -> Self {
        Self { email, url }
    }

    pub fn email(&self) -> &EmailPipeline {
        &self.email
    }

    pub fn url(&self) -> &UrlPipeline {
        &self.url
    }

    /// Classify one raw `.eml` envelope
    pub fn predict_email(&self, raw: &[u8]) -> PipelineResult<Prediction> {
        self.email.predict(raw)
    }

    /// Classify one URL
    pub fn predict_url(&self, raw: &str) -> PipelineResult<Prediction> {
        self.url.predict(raw)
    }

    /// Classify an envelope and wrap the result into a timestamped record
    pub fn scan_email(&self, raw: &[u8]) -> PipelineResult<ScanRecord> {
        let started = Instant::now();
        let prediction = self.email.predict(raw)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "E-mail scanned in {} ms -> {} {:.3}",
            elapsed_ms,
            prediction.verdict,
            prediction.confidence
        );
        Ok(ScanRecord::new(InputKind::Email, prediction, elapsed_ms))
    }

    /// Classify a URL and wrap the result into a timestamped record
    pub fn scan_url(&self, raw: &str) -> PipelineResult<ScanRecord> {
        let started = Instant::now();
        let prediction = self.url.predict(raw)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "URL scanned in {} ms -> {} {:.3}",
            elapsed_ms,
            prediction.verdict,
            prediction.confidence
        );
        Ok(ScanRecord::new(InputKind::Url, prediction, elapsed_ms))
    }
}
