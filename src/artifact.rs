//! Artifact loading
//!
//! Pipelines are built from a directory of pre-trained artifacts. Every
//! file is checked for presence and non-zero size before it is read, and
//! JSON artifacts are validated against their shape invariants immediately
//! after parsing. Any failure aborts pipeline construction with an error
//! naming the offending file; there is no partial load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::CONFIG_FILE;
use crate::error::{PipelineError, PipelineResult};

/// Check that an artifact exists and is non-empty, returning its full path
pub fn require(dir: &Path, name: &str) -> PipelineResult<PathBuf> {
    let path = dir.join(name);
    let usable = fs::metadata(&path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false);
    if !usable {
        return Err(PipelineError::MissingArtifact { path });
    }
    Ok(path)
}

/// Read and deserialize a JSON artifact, naming the file on any failure
pub fn load_json<T>(dir: &Path, name: &str) -> PipelineResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let path = require(dir, name)?;
    let text = fs::read_to_string(&path)
        .map_err(|e| PipelineError::invalid_artifact(&path, format!("read failed: {}", e)))?;
    serde_json::from_str(&text)
        .map_err(|e| PipelineError::invalid_artifact(&path, format!("parse failed: {}", e)))
}

/// Per-pipeline configuration shipped alongside the trained model
///
/// `max_seq_len` is the fixed token-sequence length the model was trained
/// with; `label_mapping` records which output index the trainer assigned to
/// each class name.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub max_seq_len: usize,
    pub label_mapping: HashMap<String, u32>,
}

impl PipelineConfig {
    pub fn load(dir: &Path) -> PipelineResult<Self> {
        let config: PipelineConfig = load_json(dir, CONFIG_FILE)?;
        config.validate(&dir.join(CONFIG_FILE))?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> PipelineResult<()> {
        if self.max_seq_len == 0 {
            return Err(PipelineError::invalid_artifact(
                path,
                "max_seq_len must be positive",
            ));
        }
        if self.label_mapping.len() != 2 {
            return Err(PipelineError::invalid_artifact(
                path,
                format!(
                    "label_mapping must have exactly 2 entries, found {}",
                    self.label_mapping.len()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) {
        fs::write(dir.join(CONFIG_FILE), body).unwrap();
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = require(dir.path(), "tokenizer.json").unwrap_err();
        match err {
            PipelineError::MissingArtifact { path } => {
                assert!(path.ends_with("tokenizer.json"));
            }
            other => panic!("expected MissingArtifact, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_artifact() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.onnx"), b"").unwrap();
        let err = require(dir.path(), "model.onnx").unwrap_err();
        assert!(matches!(err, PipelineError::MissingArtifact { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "{ not json");
        let err = PipelineConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArtifact { .. }));
    }

    #[test]
    fn test_config_load() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{"max_seq_len": 150, "label_mapping": {"legitimate": 0, "phishing": 1}}"#,
        );
        let config = PipelineConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_seq_len, 150);
        assert_eq!(config.label_mapping["phishing"], 1);
    }

    #[test]
    fn test_zero_max_seq_len() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{"max_seq_len": 0, "label_mapping": {"legitimate": 0, "phishing": 1}}"#,
        );
        assert!(PipelineConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_label_mapping_arity() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{"max_seq_len": 150, "label_mapping": {"phishing": 1}}"#,
        );
        assert!(PipelineConfig::load(dir.path()).is_err());
    }
}
