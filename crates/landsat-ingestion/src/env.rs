//! Destination environment capability traits.
//!
//! The pipeline depends on two collaborator seams: a `RasterEnvironment`
//! that performs the actual dataset operations (GRASS in production, a
//! fake in tests), and a `CoordinateSystemInspector` that reports a
//! file's native resolution and coordinate system. Concrete adapters are
//! injected at construction time.

use landsat_common::SrsCode;
use std::path::Path;
use tracing::debug;

/// Resampling method for reprojecting imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    Nearest,
    Bilinear,
    Bicubic,
}

impl Resampling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resampling::Nearest => "nearest",
            Resampling::Bilinear => "bilinear",
            Resampling::Bicubic => "bicubic",
        }
    }
}

/// Whether an import is bounded by the input data's own extent or by the
/// destination environment's active computational region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtentPolicy {
    #[default]
    Input,
    Region,
}

impl ExtentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtentPolicy::Input => "input",
            ExtentPolicy::Region => "region",
        }
    }
}

impl std::str::FromStr for ExtentPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "input" => Ok(ExtentPolicy::Input),
            "region" => Ok(ExtentPolicy::Region),
            other => Err(format!(
                "invalid extent '{}': expected 'input' or 'region'",
                other
            )),
        }
    }
}

/// Pixel type of a destination dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Integer,
    Float32,
    Float64,
}

impl PixelType {
    /// Floating-point output is a resampling artifact on integer bands
    /// and triggers the rounding post-process.
    pub fn is_floating_point(&self) -> bool {
        matches!(self, PixelType::Float32 | PixelType::Float64)
    }
}

/// The destination environment's active computational region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub ns_res: f64,
    pub ew_res: f64,
}

/// Parameters for a reference-link import.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkParams {
    pub override_projection_check: bool,
}

/// Parameters for a direct (copying, non-resampling) import.
#[derive(Debug, Clone, Copy)]
pub struct DirectParams {
    pub override_projection_check: bool,
    /// Clip output to the active region (extent policy "region").
    pub clip_to_region: bool,
    /// Row cache budget in MB.
    pub memory_mb: u32,
}

/// Parameters for a reprojecting import.
#[derive(Debug, Clone, Copy)]
pub struct ReprojectParams {
    pub resampling: Resampling,
    /// Output resolution in ground units, equal to the source's native
    /// resolution.
    pub resolution: u32,
    pub extent: ExtentPolicy,
    pub memory_mb: u32,
}

/// Raster operations of the destination environment.
///
/// One implementation drives a GRASS session; tests substitute a fake.
/// All dataset arguments are names inside the destination environment,
/// unique per run.
pub trait RasterEnvironment {
    /// Register `file` as a reference-only dataset (no pixel copy).
    fn link_import(&self, file: &Path, dataset: &str, params: &LinkParams) -> anyhow::Result<()>;

    /// Load pixel data as-is.
    fn direct_import(
        &self,
        file: &Path,
        dataset: &str,
        params: &DirectParams,
    ) -> anyhow::Result<()>;

    /// Load pixel data, resampling into the environment's coordinate
    /// system.
    fn reproject_import(
        &self,
        file: &Path,
        dataset: &str,
        params: &ReprojectParams,
    ) -> anyhow::Result<()>;

    /// Dry-run compatibility check with "report, don't write" semantics.
    /// Returns true when a direct load would succeed against the current
    /// coordinate reference system; any failure means incompatible. Must
    /// not create a destination artifact.
    fn check_projection(&self, file: &Path) -> bool;

    /// The environment's active computational region.
    fn current_region(&self) -> anyhow::Result<Region>;

    /// Pixel type of an existing dataset.
    fn pixel_type(&self, dataset: &str) -> anyhow::Result<PixelType>;

    /// Create `dest` as the integer rounding of `source`.
    fn round_to_integer(&self, source: &str, dest: &str) -> anyhow::Result<()>;

    /// Rename `from` over `to`, replacing it atomically.
    fn rename_dataset(&self, from: &str, to: &str) -> anyhow::Result<()>;

    /// Record provenance metadata on a dataset.
    fn write_history(&self, dataset: &str, note: &str) -> anyhow::Result<()>;

    /// Override the computational region to match `dataset`. Process-wide
    /// state; acquire through [`RegionOverride`] so release is guaranteed.
    fn set_region_override(&self, dataset: &str) -> anyhow::Result<()>;

    /// Release a region override set by `set_region_override`.
    fn release_region_override(&self) -> anyhow::Result<()>;
}

/// Scoped acquisition of a computation-region override, released on all
/// exit paths.
pub struct RegionOverride<'a> {
    env: &'a dyn RasterEnvironment,
}

impl<'a> RegionOverride<'a> {
    pub fn acquire(env: &'a dyn RasterEnvironment, dataset: &str) -> anyhow::Result<Self> {
        env.set_region_override(dataset)?;
        Ok(Self { env })
    }
}

impl Drop for RegionOverride<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.env.release_region_override() {
            debug!(error = %e, "Failed to release region override");
        }
    }
}

/// Coordinate-system introspection for candidate files.
pub trait CoordinateSystemInspector {
    /// Ground size of one pixel, from the file's geotransform.
    fn native_resolution(&self, file: &Path) -> anyhow::Result<u32>;

    /// The file's native coordinate reference system.
    fn native_system_id(&self, file: &Path) -> anyhow::Result<SrsCode>;
}

/// Inspector backed by the in-repo GeoTIFF metadata reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoTiffInspector;

impl CoordinateSystemInspector for GeoTiffInspector {
    fn native_resolution(&self, file: &Path) -> anyhow::Result<u32> {
        let meta = geotiff_parser::read_metadata(file)?;
        meta.native_resolution()
            .ok_or_else(|| anyhow::anyhow!("no pixel scale in <{}>", file.display()))
    }

    fn native_system_id(&self, file: &Path) -> anyhow::Result<SrsCode> {
        let meta = geotiff_parser::read_metadata(file)?;
        meta.epsg_code()
            .map(SrsCode)
            .ok_or_else(|| anyhow::anyhow!("no EPSG code in <{}>", file.display()))
    }
}
