//! EarthExplorer scene catalog client.
//!
//! Covers the download half of the toolkit: credentials, scene search
//! (dataset, bounding box, date range, cloud cover) and archive download
//! by scene identifier. The ingestion pipeline only requires the result:
//! a local directory of scene archives.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

// Re-exports
pub use auth::Credentials;
pub use client::{EarthExplorerClient, SceneCatalog};
pub use error::{CatalogError, Result};
pub use types::{DatasetCode, SceneRecord, SearchFilter};
