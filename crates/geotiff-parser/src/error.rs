//! Error types for the geotiff-parser crate.

use thiserror::Error;

/// Errors that can occur while reading GeoTIFF metadata.
#[derive(Error, Debug)]
pub enum GeoTiffError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Not a TIFF file: {0}")]
    NotATiff(String),

    #[error("Truncated TIFF structure: {0}")]
    Truncated(String),

    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    #[error("Unsupported field type {field_type} for tag {tag}")]
    UnsupportedFieldType { tag: u16, field_type: u16 },

    #[error("Malformed GeoKey directory: {0}")]
    BadGeoKeyDirectory(String),
}

/// Result type for GeoTIFF metadata operations.
pub type Result<T> = std::result::Result<T, GeoTiffError>;
