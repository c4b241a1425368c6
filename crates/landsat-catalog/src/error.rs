//! Error types for the catalog client.

use thiserror::Error;

/// Errors raised by scene search and download.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid settings file: {0}")]
    Settings(String),

    #[error("No user or password given")]
    MissingCredentials,

    #[error("Failed to read credentials: {0}")]
    CredentialsIo(#[source] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Malformed catalog response: {0}")]
    Response(String),

    #[error("Download of scene <{scene}> failed: {message}")]
    Download { scene: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
