//! URL Structural Features
//!
//! The URL model's second input is a small vector of structural counts
//! computed over the canonical host+path form. Order is part of the trained
//! model's contract: the scaler and the model both index columns by
//! position, so the layout below is the single source of truth.

use ndarray::Array2;

use crate::error::{PipelineError, PipelineResult};
use crate::scaler::FeatureScaler;

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Feature names in the exact order they appear in the vector
pub const URL_FEATURE_LAYOUT: &[&str] = &[
    "url_length",          // 0: chars in the canonical host+path
    "dot_count",           // 1: '.' occurrences
    "slash_count",         // 2: '/' occurrences
    "hyphen_count",        // 3: '-' occurrences
    "digit_count",         // 4: ASCII digit occurrences
    "question_mark_count", // 5: '?' occurrences
    "ampersand_count",     // 6: '&' occurrences
];

/// Total number of URL features
/// IMPORTANT: Must match URL_FEATURE_LAYOUT.len()!
pub const URL_FEATURE_COUNT: usize = 7;

/// Raw structural counts for one canonical URL
pub fn structural_features(canonical: &str) -> [f32; URL_FEATURE_COUNT] {
    let mut counts = [0.0f32; URL_FEATURE_COUNT];
    counts[0] = canonical.chars().count() as f32;
    for c in canonical.chars() {
        match c {
            '.' => counts[1] += 1.0,
            '/' => counts[2] += 1.0,
            '-' => counts[3] += 1.0,
            '?' => counts[5] += 1.0,
            '&' => counts[6] += 1.0,
            c if c.is_ascii_digit() => counts[4] += 1.0,
            _ => {}
        }
    }
    counts
}

// ============================================================================
// EXTRACTOR
// ============================================================================

/// Builds the scaled feature matrix the dual-input URL model consumes
#[derive(Debug)]
pub struct UrlFeatureExtractor {
    scaler: Option<FeatureScaler>,
}

impl UrlFeatureExtractor {
    pub fn new(scaler: FeatureScaler) -> Self {
        Self {
            scaler: Some(scaler),
        }
    }

    /// Extractor without fitted scaling parameters; `transform` will refuse
    /// to produce values the model was not trained on.
    pub fn unscaled() -> Self {
        Self { scaler: None }
    }

    /// Compute and standardize features for a batch of canonical URLs.
    ///
    /// Output shape is always `(n, URL_FEATURE_COUNT)`.
    pub fn transform(&self, canonicals: &[&str]) -> PipelineResult<Array2<f32>> {
        let scaler = self.scaler.as_ref().ok_or_else(|| {
            PipelineError::ModelUnavailable("feature scaler not loaded".to_string())
        })?;

        let mut matrix = Array2::zeros((canonicals.len(), URL_FEATURE_COUNT));
        for (i, canonical) in canonicals.iter().enumerate() {
            let row = structural_features(canonical);
            for (j, value) in row.iter().enumerate() {
                matrix[[i, j]] = *value;
            }
        }
        Ok(scaler.transform(matrix))
    }
}
