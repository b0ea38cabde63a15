//! E-mail Pipeline
//!
//! Raw `.eml` bytes in, verdict out: parse the envelope, pull every plain
//! text part, flatten to one normalized lowercase string, tokenize to the
//! trained sequence length and run the single-input classifier. Messages
//! that decode imperfectly still classify; only an input with no message
//! structure at all is refused.

mod decode;
mod message;

pub use decode::{decode_charset, DecodedText};
pub use message::{parse_message, MessagePart};

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::artifact::{self, PipelineConfig};
use crate::calibrate::{calibrate, Prediction};
use crate::constants::{EMAIL_DIR, MODEL_FILE};
use crate::error::{PipelineError, PipelineResult};
use crate::model::{InferenceEngine, ModelInputs, OnnxModel};
use crate::tokenizer::Tokenizer;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Flatten raw envelope bytes into the single lowercase string the
/// vocabulary was fitted on.
///
/// All `text/plain` parts are decoded and joined; a message with none falls
/// back to its root payload when it is a leaf, so bare HTML mails still
/// classify on their source text. HTML entities are unescaped and
/// whitespace runs collapse to single spaces. The degraded flag reports
/// lossy charset decoding anywhere in the message.
pub fn normalize_email(raw: &[u8]) -> PipelineResult<DecodedText> {
    let root = message::parse_message(raw)?;

    let mut pieces: Vec<String> = Vec::new();
    let mut degraded = false;

    for part in root.walk() {
        if part.content_type() != "text/plain" {
            continue;
        }
        let body = part.decoded_body();
        if body.is_empty() {
            continue;
        }
        let decoded = decode::decode_charset(&body, part.charset().as_deref());
        degraded |= decoded.degraded;
        if !decoded.text.is_empty() {
            pieces.push(decoded.text);
        }
    }

    if pieces.is_empty() && root.is_leaf() && root.has_body() {
        let decoded = decode::decode_charset(&root.decoded_body(), root.charset().as_deref());
        degraded |= decoded.degraded;
        pieces.push(decoded.text);
    }

    let joined = pieces.join(" ");
    let unescaped = html_escape::decode_html_entities(&joined);
    let collapsed = WHITESPACE.replace_all(&unescaped, " ");
    let text = collapsed.trim().to_lowercase();

    Ok(DecodedText { text, degraded })
}

/// The e-mail classification pipeline
pub struct EmailPipeline {
    tokenizer: Tokenizer,
    config: PipelineConfig,
    engine: Box<dyn InferenceEngine>,
}

impl std::fmt::Debug for EmailPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailPipeline").finish_non_exhaustive()
    }
}

impl EmailPipeline {
    /// Load every artifact from `<base>/email/`; any missing or malformed
    /// file aborts construction
    pub fn load(base_dir: &Path) -> PipelineResult<Self> {
        let dir = base_dir.join(EMAIL_DIR);
        log::info!("Loading e-mail pipeline from {}", dir.display());

        let tokenizer = Tokenizer::load(&dir)?;
        let config = PipelineConfig::load(&dir)?;
        let model_path = artifact::require(&dir, MODEL_FILE)?;
        let model = OnnxModel::load(&model_path, config.max_seq_len)?;
        if model.inputs() != ModelInputs::Single {
            return Err(PipelineError::invalid_artifact(
                model_path,
                "e-mail graph must take exactly one input",
            ));
        }

        Self::with_engine(tokenizer, config, Box::new(model))
    }

    /// Assemble a pipeline around a caller-supplied engine
    pub fn with_engine(
        tokenizer: Tokenizer,
        config: PipelineConfig,
        engine: Box<dyn InferenceEngine>,
    ) -> PipelineResult<Self> {
        if engine.inputs() != ModelInputs::Single {
            return Err(PipelineError::ModelUnavailable(
                "e-mail pipeline requires a single-input model".to_string(),
            ));
        }
        Ok(Self {
            tokenizer,
            config,
            engine,
        })
    }

    /// Classify one raw `.eml` envelope
    pub fn predict(&self, raw: &[u8]) -> PipelineResult<Prediction> {
        let normalized = normalize_email(raw)?;
        if normalized.degraded {
            log::debug!("Envelope decoded with degraded fidelity");
        }
        let sequence = self
            .tokenizer
            .encode(&normalized.text, self.config.max_seq_len);
        let probability = self.engine.predict(&sequence, None)?;
        Ok(calibrate(probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_body_normalizes() {
        let raw = b"From: alerts@bank.example\n\
Subject: hi\n\
\n\
Dear   Customer,\nVerify NOW\n";
        let normalized = normalize_email(raw).unwrap();
        assert_eq!(normalized.text, "dear customer, verify now");
        assert!(!normalized.degraded);
    }

    #[test]
    fn test_multipart_plain_parts_joined() {
        let raw = b"From: a@b.c\n\
Content-Type: multipart/mixed; boundary=m\n\
\n\
--m\n\
Content-Type: text/plain\n\
\n\
first part\n\
--m\n\
Content-Type: text/html\n\
\n\
<b>skipped</b>\n\
--m\n\
Content-Type: text/plain\n\
\n\
second part\n\
--m--\n";
        let normalized = normalize_email(raw).unwrap();
        assert_eq!(normalized.text, "first part second part");
    }

    #[test]
    fn test_html_entities_unescaped() {
        let raw = b"From: a@b.c\n\nyou&nbsp;won &amp; claim prize\n";
        let normalized = normalize_email(raw).unwrap();
        assert_eq!(normalized.text, "you won & claim prize");
    }

    #[test]
    fn test_html_only_message_falls_back_to_source() {
        let raw = b"From: a@b.c\n\
Content-Type: text/html\n\
\n\
<p>Click here</p>\n";
        let normalized = normalize_email(raw).unwrap();
        assert_eq!(normalized.text, "<p>click here</p>");
    }

    #[test]
    fn test_multipart_without_plain_text_is_empty() {
        let raw = b"From: a@b.c\n\
Content-Type: multipart/mixed; boundary=m\n\
\n\
--m\n\
Content-Type: text/html\n\
\n\
<p>only html</p>\n\
--m--\n";
        let normalized = normalize_email(raw).unwrap();
        assert_eq!(normalized.text, "");
    }

    #[test]
    fn test_unknown_charset_degrades_not_errors() {
        let raw = b"From: a@b.c\n\
Content-Type: text/plain; charset=\"x-unknown-charset\"\n\
\n\
still readable\n";
        let normalized = normalize_email(raw).unwrap();
        assert_eq!(normalized.text, "still readable");
        assert!(normalized.degraded);
    }

    #[test]
    fn test_base64_part_contributes_text() {
        // "reset your password"
        let raw = b"From: a@b.c\n\
Content-Type: text/plain\n\
Content-Transfer-Encoding: base64\n\
\n\
cmVzZXQgeW91ciBwYXNzd29yZA==\n";
        let normalized = normalize_email(raw).unwrap();
        assert_eq!(normalized.text, "reset your password");
    }

    #[test]
    fn test_headerless_bytes_are_invalid_input() {
        let err = normalize_email(b"no structure here at all").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }
}
