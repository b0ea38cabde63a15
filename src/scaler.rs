//! Feature scaling
//!
//! Applies the standardization fitted at training time: each feature column
//! is centered on its training mean and divided by its training scale. The
//! parameters ship as a JSON artifact next to the model; a scaler whose
//! arity disagrees with the feature layout is rejected at load.

use std::path::Path;

use ndarray::Array2;
use serde::Deserialize;

use crate::artifact;
use crate::constants::SCALER_FILE;
use crate::error::{PipelineError, PipelineResult};

/// Per-column standardization parameters
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureScaler {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl FeatureScaler {
    /// Load the scaler artifact and validate it against the feature arity
    pub fn load(dir: &Path, arity: usize) -> PipelineResult<Self> {
        let scaler: FeatureScaler = artifact::load_json(dir, SCALER_FILE)?;
        let path = dir.join(SCALER_FILE);
        if scaler.mean.len() != arity || scaler.scale.len() != arity {
            return Err(PipelineError::invalid_artifact(
                path,
                format!(
                    "expected {} mean/scale entries, found {}/{}",
                    arity,
                    scaler.mean.len(),
                    scaler.scale.len()
                ),
            ));
        }
        if scaler.mean.iter().any(|m| !m.is_finite()) {
            return Err(PipelineError::invalid_artifact(path, "non-finite mean"));
        }
        if scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(PipelineError::invalid_artifact(
                path,
                "scale entries must be finite and non-zero",
            ));
        }
        Ok(scaler)
    }

    /// Standardize a feature matrix in place: `(x - mean) / scale` per column
    pub fn transform(&self, mut matrix: Array2<f32>) -> Array2<f32> {
        debug_assert_eq!(matrix.ncols(), self.mean.len());
        for mut row in matrix.rows_mut() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (*value - self.mean[j]) / self.scale[j];
            }
        }
        matrix
    }
}
