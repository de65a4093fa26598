use kiosk_assets::AssetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("module download failed with HTTP {status}: {path}")]
    Download { path: String, status: u16 },

    #[error("module download failed: {0}")]
    DownloadStream(String),

    #[error("module compile failed: {0}")]
    Compile(String),

    #[error("instantiation failed: {0}")]
    Instantiate(String),

    #[error("runtime fault: {0}")]
    Runtime(String),
}

impl RunnerError {
    /// Classify an asset failure from the module payload fetch.
    ///
    /// HTTP error statuses become [`RunnerError::Download`]; transport
    /// failures mid-stream become [`RunnerError::DownloadStream`].
    pub(crate) fn from_module_fetch(path: &str, err: AssetError) -> Self {
        match err {
            AssetError::NotFound(_) => RunnerError::Download {
                path: path.to_string(),
                status: 404,
            },
            AssetError::Http { path, status } => RunnerError::Download { path, status },
            other => RunnerError::DownloadStream(other.to_string()),
        }
    }
}
