//! Error types for the poster studio

use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, composing, capturing or saving a poster
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize a platform capability
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to load an asset (template image, profile photo, catalog)
    #[error("Failed to load asset: {0}")]
    LoadError(String),

    /// Asset bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Failed to render the composition view
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Rasterizing or encoding the composition failed
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// Storage permission could not be requested
    #[error("Permission request failed: {0}")]
    PermissionError(String),

    /// Media library operation failed
    #[error("Media library error: {0}")]
    MediaLibraryError(String),

    /// Background removal service failed or rejected the request
    #[error("Background removal failed: {0}")]
    BackgroundRemovalError(String),

    /// Icon name outside the closed icon set
    #[error("Unknown icon: {0}")]
    UnknownIcon(String),

    /// Frame style id outside the known set
    #[error("Unknown frame style: {0}")]
    UnknownFrame(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}
