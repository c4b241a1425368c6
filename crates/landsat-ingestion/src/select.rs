//! Candidate file selection.

use regex::Regex;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{IngestionError, Result};

/// A raster file selected for import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
}

impl CandidateFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The destination dataset name: the file's base name without its
    /// suffix.
    pub fn dataset_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Walks the working directory and returns the files matching the band
/// pattern, ordered lexicographically by path for deterministic
/// ingestion.
pub struct FileSelector {
    working_dir: PathBuf,
}

impl FileSelector {
    pub fn new<P: Into<PathBuf>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Select candidate files. `band_pattern` is a regex fragment matched
    /// inside the base name (default: any band file, `_B*`); `file_filter`
    /// restricts scene directories by substring. Zero results is fatal:
    /// the pipeline has nothing to import.
    pub fn select(
        &self,
        band_pattern: Option<&str>,
        file_filter: Option<&str>,
    ) -> Result<Vec<CandidateFile>> {
        let pattern = band_regex(band_pattern)?;
        debug!(pattern = %pattern.as_str(), "Band filter");

        let mut scene_dirs = Vec::new();
        for entry in fs::read_dir(&self.working_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(filter) = file_filter {
                let name = entry.file_name();
                if !name.to_string_lossy().contains(filter) {
                    continue;
                }
            }
            scene_dirs.push(path);
        }

        if scene_dirs.is_empty() {
            return Err(IngestionError::SelectionEmpty);
        }
        scene_dirs.sort();

        let mut files = Vec::new();
        for scene_dir in &scene_dirs {
            for entry in WalkDir::new(scene_dir)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if pattern.is_match(&name) {
                    files.push(CandidateFile::new(entry.into_path()));
                }
            }
        }

        if files.is_empty() {
            return Err(IngestionError::SelectionEmpty);
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = files.len(), "Selected candidate files");
        Ok(files)
    }
}

/// Build the band-name filter. The user pattern is a regex fragment;
/// matching is case-insensitive because Landsat archives ship `.TIF`.
fn band_regex(band_pattern: Option<&str>) -> Result<Regex> {
    let source = match band_pattern {
        Some(p) => format!(r"(?i).*{}.*\.tif$", p),
        None => r"(?i).*_B.*\.tif$".to_string(),
    };

    Regex::new(&source)
        .map_err(|e| IngestionError::Configuration(format!("invalid band pattern: {}", e)))
}
