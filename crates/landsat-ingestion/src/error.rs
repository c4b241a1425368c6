//! Error types for the ingestion crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during ingestion.
///
/// `Configuration`, `SelectionEmpty`, and `ProjectionMismatch` are fatal
/// to a run; `Ingestion` and `Cleanup` are recovered per file.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Nothing found to import. Please check input and pattern options.")]
    SelectionEmpty,

    #[error(
        "Projection of <{file}> does not appear to match the current environment. \
         Force reprojection with --reproject or override the projection check."
    )]
    ProjectionMismatch { file: PathBuf },

    #[error("Failed to expand archive <{archive}>: {source}")]
    Expansion {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to inspect <{file}>: {source}")]
    Inspection {
        file: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to import <{file}>: {source}")]
    Ingestion {
        file: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to remove <{path}>: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
