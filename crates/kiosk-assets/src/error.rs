use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("request for {path} failed with HTTP {status}")]
    Http { path: String, status: u16 },

    #[error("network error fetching {path}: {message}")]
    Network { path: String, message: String },

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid argument descriptor for '{program}': {reason}")]
    BadDescriptor { program: String, reason: String },

    #[error("unknown program: {0}")]
    UnknownProgram(String),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),
}
