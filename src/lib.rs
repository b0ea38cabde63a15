//! PhishGuard Inference Core
//!
//! Deterministic preprocessing, tokenization and model invocation for two
//! phishing classifiers: raw e-mail envelopes and URLs in, a verdict with
//! calibrated confidence out. Everything runs synchronously against
//! pre-trained artifacts loaded once into an explicit [`InferenceContext`];
//! routing, sessions and persistence belong to the caller.
//!
//! ```no_run
//! use std::path::Path;
//! use phishguard_core::InferenceContext;
//!
//! # fn main() -> Result<(), phishguard_core::PipelineError> {
//! let context = InferenceContext::load(Path::new("models"))?;
//! let prediction = context.predict_url("http://secure-login.example.com/verify")?;
//! println!("{} ({:.3})", prediction.verdict, prediction.confidence);
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod calibrate;
pub mod constants;
pub mod context;
pub mod email;
pub mod error;
pub mod features;
pub mod model;
pub mod policy;
pub mod record;
pub mod scaler;
pub mod tokenizer;
pub mod url;


pub use calibrate::{calibrate, Prediction, Verdict};
pub use context::InferenceContext;
pub use email::EmailPipeline;
pub use error::{PipelineError, PipelineResult};
pub use model::{InferenceEngine, ModelInputs};
pub use policy::TrustedDomains;
pub use record::{InputKind, ScanRecord};
pub use url::UrlPipeline;
