//! Landsat scene ingestion pipeline.
//!
//! Takes a directory of downloaded scene archives, expands them, selects
//! band files by naming pattern, and brings each matching raster into the
//! destination environment, resolving projection mismatches and
//! normalizing pixel types along the way.
//!
//! # Architecture
//!
//! The pipeline runs strictly in sequence: expansion, selection, then per
//! file classification, strategy selection, and ingestion. The
//! destination environment and coordinate-system introspection are
//! capability traits ([`env::RasterEnvironment`],
//! [`env::CoordinateSystemInspector`]) injected at construction time; the
//! `grass-env` crate provides the production adapter and tests substitute
//! fakes.

pub mod classify;
pub mod env;
pub mod error;
pub mod expand;
pub mod ingest;
pub mod pipeline;
pub mod select;
pub mod strategy;

// Re-exports
pub use classify::{ProjectionClassifier, ProjectionVerdict};
pub use env::{
    CoordinateSystemInspector, DirectParams, ExtentPolicy, GeoTiffInspector, LinkParams,
    PixelType, RasterEnvironment, Region, RegionOverride, ReprojectParams, Resampling,
};
pub use error::{IngestionError, Result};
pub use expand::ArchiveExpander;
pub use ingest::{IngestReport, RasterIngestor};
pub use pipeline::{PipelineConfig, PipelineLifecycle};
pub use select::{CandidateFile, FileSelector};
pub use strategy::{select_strategy, ImportOptions, ImportStrategy, DEFAULT_MEMORY_MB};
