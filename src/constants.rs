//! Central Configuration Constants
//!
//! Single source of truth for artifact layout, tokenizer defaults and the
//! built-in trusted-domain list. To rename an artifact file or change a
//! default, only edit this file.

/// Subdirectory holding the e-mail pipeline artifacts
pub const EMAIL_DIR: &str = "email";

/// Subdirectory holding the URL pipeline artifacts
pub const URL_DIR: &str = "url";

/// Tokenizer artifact file name (vocabulary + tokenization rules)
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Pipeline config artifact file name (sequence length + label mapping)
pub const CONFIG_FILE: &str = "config.json";

/// Feature scaler artifact file name (URL pipeline only)
pub const SCALER_FILE: &str = "scaler.json";

/// Compiled model graph file name
pub const MODEL_FILE: &str = "model.onnx";

/// Default directory searched for model artifacts when none is given
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Domains that bypass the URL model and classify as legitimate outright.
///
/// Matched exactly against the canonical host (lowercased, `www.` stripped),
/// so `www.github.com` and `github.com` both hit, `github.com.evil.io` does
/// not.
pub const TRUSTED_DOMAINS: &[&str] = &[
    "github.com",
    "youtube.com",
    "wikipedia.org",
    "reddit.com",
];

/// Decision threshold on the model's phishing probability
pub const PHISHING_THRESHOLD: f32 = 0.5;

/// Default token filter set (punctuation stripped before splitting).
///
/// Tokenizer artifacts may override this; absent fields fall back here so
/// older artifacts keep tokenizing exactly as they were fitted.
pub const DEFAULT_TOKEN_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Default token split character
pub const DEFAULT_TOKEN_SPLIT: char = ' ';

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "PhishGuard";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the model artifact directory from environment or use default
pub fn default_model_dir() -> String {
    std::env::var("PHISHGUARD_MODEL_DIR")
        .unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_string())
}
