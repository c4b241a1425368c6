//! Pipeline orchestration and lifecycle.

use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::env::{CoordinateSystemInspector, RasterEnvironment};
use crate::error::{IngestionError, Result};
use crate::expand::ArchiveExpander;
use crate::ingest::{IngestReport, RasterIngestor};
use crate::select::{CandidateFile, FileSelector};
use crate::strategy::ImportOptions;

/// Configuration for one pipeline run, assembled by the CLI front end.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding downloaded scene archives.
    pub input_dir: PathBuf,
    /// Directory archives are expanded into (default: the input
    /// directory).
    pub working_dir: Option<PathBuf>,
    /// Band name pattern (regex fragment).
    pub band_pattern: Option<String>,
    /// Scene/file name substring filter.
    pub file_pattern: Option<String>,
    /// Assert archives are already expanded and skip extraction.
    pub skip_extraction: bool,
    pub options: ImportOptions,
}

/// Orchestrates expansion, selection, per-file ingestion, and cleanup.
///
/// `finalize` must be called exactly once after the run, on success or
/// failure; it releases extraction directories unless linked rasters
/// depend on them.
pub struct PipelineLifecycle<'a> {
    config: PipelineConfig,
    env: &'a dyn RasterEnvironment,
    inspector: &'a dyn CoordinateSystemInspector,
    working_dir: PathBuf,
    created_dirs: Vec<PathBuf>,
    finalized: bool,
}

impl<'a> PipelineLifecycle<'a> {
    /// Validate directories and acquire the working area.
    pub fn new(
        config: PipelineConfig,
        env: &'a dyn RasterEnvironment,
        inspector: &'a dyn CoordinateSystemInspector,
    ) -> Result<Self> {
        if !config.input_dir.is_dir() {
            return Err(IngestionError::Configuration(format!(
                "input directory <{}> does not exist",
                config.input_dir.display()
            )));
        }

        let working_dir = config
            .working_dir
            .clone()
            .unwrap_or_else(|| config.input_dir.clone());
        if !working_dir.is_dir() {
            return Err(IngestionError::Configuration(format!(
                "working directory <{}> does not exist",
                working_dir.display()
            )));
        }

        Ok(Self {
            config,
            env,
            inspector,
            working_dir,
            created_dirs: Vec::new(),
            finalized: false,
        })
    }

    /// Expand archives (unless skipped) and select candidate files.
    ///
    /// Exposed separately from [`run`](Self::run) so print mode can list
    /// candidates without importing.
    pub fn candidates(&mut self) -> Result<Vec<CandidateFile>> {
        if self.config.skip_extraction {
            debug!("Skipping extraction; operating on existing working area");
        } else {
            let mut expander = ArchiveExpander::new(&self.config.input_dir, &self.working_dir);
            let result = expander.expand_all(self.config.file_pattern.as_deref());
            // Record created directories even on failure so finalize can
            // discard partial extractions.
            self.created_dirs.extend(expander.into_created());
            result?;
        }

        FileSelector::new(&self.working_dir).select(
            self.config.band_pattern.as_deref(),
            self.config.file_pattern.as_deref(),
        )
    }

    /// Run the full pipeline: expand, select, classify/strategize/ingest
    /// per file.
    pub fn run(&mut self) -> Result<IngestReport> {
        let files = self.candidates()?;
        info!(candidates = files.len(), "Starting ingestion");

        let ingestor = RasterIngestor::new(self.env, self.inspector, self.config.options.clone());
        ingestor.ingest_all(&files)
    }

    /// Release extraction-created directories. Linked rasters read their
    /// pixels from the extracted files, so cleanup is skipped for link
    /// runs. Removal failures are logged and swallowed: ingestion has
    /// already completed.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;

        if self.config.options.link_only {
            debug!("Linked rasters in use; keeping extracted data on disk");
            return;
        }

        for dir in self.created_dirs.drain(..) {
            debug!(dir = %dir.display(), "Removing extraction directory");
            if let Err(source) = fs::remove_dir_all(&dir) {
                let err = IngestionError::Cleanup { path: dir, source };
                debug!(error = %err, "Cleanup failed");
            }
        }
    }

    /// Directories created by expansion so far (test and debug aid).
    pub fn created_directories(&self) -> &[PathBuf] {
        &self.created_dirs
    }
}
