//! Scene archive expansion.

use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{IngestionError, Result};

const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Extracts scene archives into a working directory, tracking the
/// directories it creates so the lifecycle can discard them later.
pub struct ArchiveExpander {
    input_dir: PathBuf,
    working_dir: PathBuf,
    created: Vec<PathBuf>,
}

impl ArchiveExpander {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input_dir: P, working_dir: Q) -> Self {
        Self {
            input_dir: input_dir.into(),
            working_dir: working_dir.into(),
            created: Vec::new(),
        }
    }

    /// Expand every archive in the input directory whose name contains
    /// `name_filter` (all archives when no filter is given). Returns the
    /// number of archives expanded. A failing archive is a hard failure;
    /// partial extraction directories are left for the lifecycle to
    /// remove.
    pub fn expand_all(&mut self, name_filter: Option<&str>) -> Result<usize> {
        let mut archives = Vec::new();
        for entry in fs::read_dir(&self.input_dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if !name.ends_with(ARCHIVE_SUFFIX) {
                continue;
            }
            if let Some(filter) = name_filter {
                if !name.contains(filter) {
                    continue;
                }
            }
            archives.push(path);
        }
        archives.sort();

        for archive in &archives {
            self.expand_archive(archive)?;
        }

        info!(count = archives.len(), "Expanded scene archives");
        Ok(archives.len())
    }

    fn expand_archive(&mut self, archive: &Path) -> Result<()> {
        let stem = archive_stem(archive).ok_or_else(|| {
            IngestionError::Configuration(format!("unreadable archive name <{}>", archive.display()))
        })?;

        // Landsat tarballs are flat; each archive gets its own directory
        // so pipeline-created directories are identifiable for cleanup.
        let dest = self.working_dir.join(stem);
        let newly_created = !dest.exists();

        fs::create_dir_all(&dest).map_err(|source| IngestionError::Expansion {
            archive: archive.to_path_buf(),
            source,
        })?;
        if newly_created {
            self.created.push(dest.clone());
        }

        debug!(archive = %archive.display(), dest = %dest.display(), "Expanding archive");

        let file = fs::File::open(archive).map_err(|source| IngestionError::Expansion {
            archive: archive.to_path_buf(),
            source,
        })?;
        tar::Archive::new(GzDecoder::new(file))
            .unpack(&dest)
            .map_err(|source| IngestionError::Expansion {
                archive: archive.to_path_buf(),
                source,
            })?;

        Ok(())
    }

    /// Directories created by expansion, in creation order.
    pub fn created_directories(&self) -> &[PathBuf] {
        &self.created
    }

    /// Consume the expander, yielding the created-directory list.
    pub fn into_created(self) -> Vec<PathBuf> {
        self.created
    }
}

/// Archive file name without the `.tar.gz` suffix.
fn archive_stem(archive: &Path) -> Option<&str> {
    archive
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(ARCHIVE_SUFFIX))
}
