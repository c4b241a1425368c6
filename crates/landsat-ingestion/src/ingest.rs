//! Strategy execution against the destination environment.

use tracing::{info, warn};

use crate::classify::{ProjectionClassifier, ProjectionVerdict};
use crate::env::{CoordinateSystemInspector, RasterEnvironment, RegionOverride};
use crate::error::{IngestionError, Result};
use crate::select::CandidateFile;
use crate::strategy::{select_strategy, ImportOptions, ImportStrategy};

/// Per-run outcome summary. A failed file never fails the batch; the
/// report carries both sides.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Dataset names created, in ingestion order.
    pub imported: Vec<String>,
    /// Files whose load failed and was skipped.
    pub failed: Vec<CandidateFile>,
}

impl IngestReport {
    pub fn processed(&self) -> usize {
        self.imported.len() + self.failed.len()
    }
}

/// Executes the chosen strategy per candidate file and repairs
/// floating-point drift after reprojection.
pub struct RasterIngestor<'a> {
    env: &'a dyn RasterEnvironment,
    inspector: &'a dyn CoordinateSystemInspector,
    options: ImportOptions,
}

impl<'a> RasterIngestor<'a> {
    pub fn new(
        env: &'a dyn RasterEnvironment,
        inspector: &'a dyn CoordinateSystemInspector,
        options: ImportOptions,
    ) -> Self {
        Self {
            env,
            inspector,
            options,
        }
    }

    /// Ingest every candidate in order.
    ///
    /// A strict-mode projection mismatch aborts the whole run; any other
    /// per-file failure is logged and the batch continues.
    pub fn ingest_all(&self, files: &[CandidateFile]) -> Result<IngestReport> {
        let classifier = ProjectionClassifier::new(self.env);
        let mut report = IngestReport::default();

        for file in files {
            // The dry run is skipped entirely when the caller overrode
            // the check; the override flag reaches the collaborator via
            // the strategy parameters instead.
            let verdict = if self.options.override_projection_check {
                ProjectionVerdict::Match
            } else {
                classifier.classify(&file.path)
            };

            let strategy = match select_strategy(&self.options, verdict, &file.path, self.inspector)
            {
                Ok(strategy) => strategy,
                Err(err @ IngestionError::ProjectionMismatch { .. }) => return Err(err),
                Err(err) => {
                    warn!(file = %file.path.display(), error = %err, "Skipping file");
                    report.failed.push(file.clone());
                    continue;
                }
            };

            match self.import_one(file, &strategy) {
                Ok(()) => report.imported.push(file.dataset_name()),
                Err(source) => {
                    let err = IngestionError::Ingestion {
                        file: file.path.clone(),
                        source,
                    };
                    warn!(file = %file.path.display(), error = %err, "Import failed, continuing");
                    report.failed.push(file.clone());
                }
            }
        }

        info!(
            imported = report.imported.len(),
            failed = report.failed.len(),
            "Ingestion finished"
        );
        Ok(report)
    }

    fn import_one(&self, file: &CandidateFile, strategy: &ImportStrategy) -> anyhow::Result<()> {
        let dataset = file.dataset_name();
        info!(dataset = %dataset, strategy = strategy.name(), "Processing");

        match strategy {
            ImportStrategy::Link(params) => {
                self.env.link_import(&file.path, &dataset, params)?;
            }
            ImportStrategy::Direct(params) => {
                self.env.direct_import(&file.path, &dataset, params)?;
            }
            ImportStrategy::Reproject(params) => {
                self.env.reproject_import(&file.path, &dataset, params)?;
                self.round_if_floating(&dataset)?;
            }
        }

        self.env.write_history(
            &dataset,
            &format!(
                "landsat-import strategy={} extent={}",
                strategy.name(),
                self.options.extent.as_str()
            ),
        )?;

        Ok(())
    }

    /// Bilinear resampling turns integer bands into floating point;
    /// replace the dataset with a rounded integer copy under the same
    /// name. The region override is scoped to the dataset so the rounding
    /// covers its full extent.
    fn round_if_floating(&self, dataset: &str) -> anyhow::Result<()> {
        if !self.env.pixel_type(dataset)?.is_floating_point() {
            return Ok(());
        }

        info!(dataset = %dataset, "Rounding to integer after reprojection");
        let temp = format!("tmp_{}", dataset);

        let _region = RegionOverride::acquire(self.env, dataset)?;
        self.env.round_to_integer(dataset, &temp)?;
        self.env.rename_dataset(&temp, dataset)?;

        Ok(())
    }
}
