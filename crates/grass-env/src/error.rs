//! Error types for the GRASS adapter.

use thiserror::Error;

/// Errors raised while driving GRASS modules.
#[derive(Error, Debug)]
pub enum GrassError {
    #[error("Failed to spawn {module}: {source}")]
    Spawn {
        module: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{module} exited with status {status}: {stderr}")]
    ModuleFailed {
        module: String,
        status: i32,
        stderr: String,
    },

    #[error("Unparseable {module} output: {message}")]
    Parse { module: String, message: String },
}

/// Result type for GRASS operations.
pub type Result<T> = std::result::Result<T, GrassError>;
