//! Import strategy selection.

use std::path::Path;

use crate::classify::ProjectionVerdict;
use crate::env::{
    CoordinateSystemInspector, DirectParams, ExtentPolicy, LinkParams, ReprojectParams, Resampling,
};
use crate::error::{IngestionError, Result};

/// Default row cache budget in MB for copying imports.
pub const DEFAULT_MEMORY_MB: u32 = 300;

/// User intent for a pipeline run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Reproject instead of failing when projections mismatch.
    pub allow_reproject: bool,
    /// Register reference-only datasets instead of copying pixels.
    pub link_only: bool,
    /// Skip the projection check and import against the environment's
    /// system as-is.
    pub override_projection_check: bool,
    pub extent: ExtentPolicy,
    pub memory_mb: u32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            allow_reproject: false,
            link_only: false,
            override_projection_check: false,
            extent: ExtentPolicy::Input,
            memory_mb: DEFAULT_MEMORY_MB,
        }
    }
}

/// One of the three raster-loading strategies, with the parameters its
/// loader requires. Chosen once per candidate file.
#[derive(Debug, Clone, Copy)]
pub enum ImportStrategy {
    Link(LinkParams),
    Direct(DirectParams),
    Reproject(ReprojectParams),
}

impl ImportStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ImportStrategy::Link(_) => "link",
            ImportStrategy::Direct(_) => "direct",
            ImportStrategy::Reproject(_) => "reproject",
        }
    }
}

/// Pick the strategy for one candidate file.
///
/// Mismatch is only tolerated when the caller explicitly asked for
/// reprojection or overrode the safety check; link and direct share the
/// same strictness because both require the source and destination grids
/// to already align. With the override set, the link/direct choice still
/// honors `link_only` and the override flag is pushed down to the
/// collaborator.
pub fn select_strategy(
    opts: &ImportOptions,
    verdict: ProjectionVerdict,
    file: &Path,
    inspector: &dyn CoordinateSystemInspector,
) -> Result<ImportStrategy> {
    if opts.override_projection_check {
        return Ok(aligned_strategy(opts, true));
    }

    match verdict {
        ProjectionVerdict::Match => Ok(aligned_strategy(opts, false)),
        ProjectionVerdict::Mismatch => {
            // Link always needs aligned grids; reprojection cannot help it.
            if opts.allow_reproject && !opts.link_only {
                let resolution = inspector.native_resolution(file).map_err(|source| {
                    IngestionError::Inspection {
                        file: file.to_path_buf(),
                        source,
                    }
                })?;
                Ok(ImportStrategy::Reproject(ReprojectParams {
                    resampling: Resampling::Bilinear,
                    resolution,
                    extent: opts.extent,
                    memory_mb: opts.memory_mb,
                }))
            } else {
                Err(IngestionError::ProjectionMismatch {
                    file: file.to_path_buf(),
                })
            }
        }
    }
}

/// The strategy used when grids align (or the check is overridden):
/// link when requested, otherwise direct.
fn aligned_strategy(opts: &ImportOptions, override_check: bool) -> ImportStrategy {
    if opts.link_only {
        ImportStrategy::Link(LinkParams {
            override_projection_check: override_check,
        })
    } else {
        ImportStrategy::Direct(DirectParams {
            override_projection_check: override_check,
            clip_to_region: opts.extent == ExtentPolicy::Region,
            memory_mb: opts.memory_mb,
        })
    }
}
