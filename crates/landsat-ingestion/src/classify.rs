//! Projection compatibility classification.

use std::path::Path;
use tracing::debug;

use crate::env::RasterEnvironment;

/// Binary verdict driving strategy selection. The underlying failure
/// reason from the environment is deliberately discarded: any dry-run
/// failure means a direct load would not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionVerdict {
    Match,
    Mismatch,
}

impl ProjectionVerdict {
    pub fn is_match(&self) -> bool {
        matches!(self, ProjectionVerdict::Match)
    }
}

/// Classifies candidate files against the destination environment's
/// current coordinate reference system via a dry-run load.
pub struct ProjectionClassifier<'a> {
    env: &'a dyn RasterEnvironment,
}

impl<'a> ProjectionClassifier<'a> {
    pub fn new(env: &'a dyn RasterEnvironment) -> Self {
        Self { env }
    }

    pub fn classify(&self, file: &Path) -> ProjectionVerdict {
        let verdict = if self.env.check_projection(file) {
            ProjectionVerdict::Match
        } else {
            ProjectionVerdict::Mismatch
        };
        debug!(file = %file.display(), ?verdict, "Classified projection");
        verdict
    }
}
