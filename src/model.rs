//! Model Invocation - ONNX Runtime Integration
//!
//! Loads and runs the compiled classifier graphs. Input arity is inspected
//! once, when the session is created, and fixed as a tag on the loaded
//! model; per-call code never re-derives it. The session sits behind a
//! mutex so a shared model serializes its forward passes while staying
//! `Send + Sync` for callers.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::tokenizer::TokenSequence;

// ============================================================================
// INPUT ARITY
// ============================================================================

/// How many inputs the loaded graph takes, decided once at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelInputs {
    /// Token sequence only
    Single,
    /// Token sequence plus scaled structural features
    Dual,
}

impl ModelInputs {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelInputs::Single => "single",
            ModelInputs::Dual => "dual",
        }
    }
}

fn arity_tag(count: usize, path: &Path) -> PipelineResult<ModelInputs> {
    match count {
        1 => Ok(ModelInputs::Single),
        2 => Ok(ModelInputs::Dual),
        n => Err(PipelineError::invalid_artifact(
            path,
            format!("expected 1 or 2 graph inputs, found {}", n),
        )),
    }
}

// ============================================================================
// METADATA
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub inputs: ModelInputs,
    pub sequence_length: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// Trait for prediction backends (ONNX in production, fixtures in tests)
pub trait InferenceEngine: Send + Sync {
    fn inputs(&self) -> ModelInputs;

    /// Run one forward pass and return the raw phishing probability.
    ///
    /// `features` must be a `(1, n)` scaled feature row for dual-input
    /// models and is ignored by single-input ones.
    fn predict(
        &self,
        sequence: &TokenSequence,
        features: Option<&Array2<f32>>,
    ) -> PipelineResult<f32>;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// Production engine backed by an ONNX Runtime session
pub struct OnnxModel {
    session: Mutex<Session>,
    inputs: ModelInputs,
    metadata: ModelMetadata,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("inputs", &self.inputs)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl OnnxModel {
    /// Load a graph from disk and fix its input arity
    pub fn load(path: &Path, sequence_length: usize) -> PipelineResult<Self> {
        log::info!("Loading ONNX model from: {}", path.display());

        let session = Session::builder()
            .map_err(|e| {
                PipelineError::Inference(format!("Failed to create session builder: {}", e))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PipelineError::Inference(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| {
                PipelineError::invalid_artifact(path, format!("failed to load graph: {}", e))
            })?;

        let inputs = arity_tag(session.inputs.len(), path)?;
        log::info!("ONNX model loaded ({}-input)", inputs.as_str());

        let metadata = ModelMetadata {
            model_path: path.display().to_string(),
            inputs,
            sequence_length,
            loaded_at: chrono::Utc::now(),
        };

        Ok(Self {
            session: Mutex::new(session),
            inputs,
            metadata,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl InferenceEngine for OnnxModel {
    fn inputs(&self) -> ModelInputs {
        self.inputs
    }

    fn predict(
        &self,
        sequence: &TokenSequence,
        features: Option<&Array2<f32>>,
    ) -> PipelineResult<f32> {
        let ids: Vec<i64> = sequence.as_slice().iter().map(|&id| i64::from(id)).collect();
        let seq_array = Array2::from_shape_vec((1, ids.len()), ids)
            .map_err(|e| PipelineError::Inference(format!("Sequence tensor error: {}", e)))?;
        let seq_tensor = Tensor::from_array(seq_array)
            .map_err(|e| PipelineError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| PipelineError::Inference("Graph defines no outputs".to_string()))?;

        // Graph input order is part of the artifact contract: the token
        // sequence feeds the first input, features the second.
        let outputs = match (self.inputs, features) {
            (ModelInputs::Single, _) => session
                .run(ort::inputs![seq_tensor])
                .map_err(|e| PipelineError::Inference(format!("Inference failed: {}", e)))?,
            (ModelInputs::Dual, Some(matrix)) => {
                let feature_tensor = Tensor::from_array(matrix.clone())
                    .map_err(|e| PipelineError::Inference(format!("Tensor error: {}", e)))?;
                session
                    .run(ort::inputs![seq_tensor, feature_tensor])
                    .map_err(|e| PipelineError::Inference(format!("Inference failed: {}", e)))?
            }
            (ModelInputs::Dual, None) => {
                return Err(PipelineError::ModelUnavailable(
                    "dual-input model invoked without features".to_string(),
                ))
            }
        };

        let output = outputs
            .get(output_name.as_str())
            .ok_or_else(|| PipelineError::Inference("No output tensor".to_string()))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::Inference(format!("Extract error: {}", e)))?;

        data.first()
            .copied()
            .ok_or_else(|| PipelineError::Inference("Empty output tensor".to_string()))
    }
}
