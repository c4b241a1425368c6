//! GRASS GIS destination-environment adapter.
//!
//! Implements the pipeline's `RasterEnvironment` capability trait by
//! driving GRASS raster modules as subprocesses. The adapter expects to
//! run inside an active GRASS session (the module binaries on PATH and a
//! location/mapset selected), the same assumption the interactive
//! modules make.
//!
//! The computation-region override uses the saved-region mechanism: the
//! current region is saved under a temporary name, `WIND_OVERRIDE` points
//! subsequent modules at it, and the saved region is removed on release.

pub mod command;
pub mod error;

pub use error::{GrassError, Result};

use std::cell::RefCell;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::{debug, trace};

use landsat_ingestion::{
    DirectParams, LinkParams, PixelType, RasterEnvironment, Region, ReprojectParams,
};

/// Destination environment backed by a GRASS session.
pub struct GrassEnvironment {
    /// Name of the saved region backing an active override.
    region_override: RefCell<Option<String>>,
}

impl GrassEnvironment {
    pub fn new() -> Self {
        Self {
            region_override: RefCell::new(None),
        }
    }

    fn run_module(&self, module: &str, args: &[String]) -> Result<Output> {
        trace!(module = module, args = ?args, "Running GRASS module");

        let mut cmd = Command::new(module);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(name) = self.region_override.borrow().as_deref() {
            cmd.env("WIND_OVERRIDE", name);
        }

        let output = cmd.output().map_err(|source| GrassError::Spawn {
            module: module.to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(GrassError::ModuleFailed {
                module: module.to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }

    fn run_module_stdout(&self, module: &str, args: &[String]) -> Result<String> {
        let output = self.run_module(module, args)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for GrassEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterEnvironment for GrassEnvironment {
    fn link_import(&self, file: &Path, dataset: &str, params: &LinkParams) -> anyhow::Result<()> {
        self.run_module("r.external", &command::link_args(file, dataset, params))?;
        Ok(())
    }

    fn direct_import(
        &self,
        file: &Path,
        dataset: &str,
        params: &DirectParams,
    ) -> anyhow::Result<()> {
        self.run_module("r.in.gdal", &command::direct_args(file, dataset, params))?;
        Ok(())
    }

    fn reproject_import(
        &self,
        file: &Path,
        dataset: &str,
        params: &ReprojectParams,
    ) -> anyhow::Result<()> {
        self.run_module("r.import", &command::reproject_args(file, dataset, params))?;
        Ok(())
    }

    fn check_projection(&self, file: &Path) -> bool {
        // Dry run with "report, don't write" semantics; any failure
        // means a direct load would not succeed.
        match self.run_module("r.in.gdal", &command::check_projection_args(file)) {
            Ok(_) => true,
            Err(e) => {
                debug!(file = %file.display(), error = %e, "Projection dry run failed");
                false
            }
        }
    }

    fn current_region(&self) -> anyhow::Result<Region> {
        let stdout = self.run_module_stdout("g.region", &["-g".to_string()])?;
        let kv = command::parse_key_values(&stdout);
        Ok(parse_region(&kv)?)
    }

    fn pixel_type(&self, dataset: &str) -> anyhow::Result<PixelType> {
        let stdout =
            self.run_module_stdout("r.info", &["-g".to_string(), format!("map={}", dataset)])?;
        let kv = command::parse_key_values(&stdout);
        let datatype = kv.get("datatype").map(String::as_str).unwrap_or("");
        Ok(parse_pixel_type(datatype)?)
    }

    fn round_to_integer(&self, source: &str, dest: &str) -> anyhow::Result<()> {
        self.run_module("r.mapcalc", &command::round_args(source, dest))?;
        Ok(())
    }

    fn rename_dataset(&self, from: &str, to: &str) -> anyhow::Result<()> {
        self.run_module("g.rename", &command::rename_args(from, to))?;
        Ok(())
    }

    fn write_history(&self, dataset: &str, note: &str) -> anyhow::Result<()> {
        self.run_module("r.support", &command::history_args(dataset, note))?;
        Ok(())
    }

    fn set_region_override(&self, dataset: &str) -> anyhow::Result<()> {
        let name = format!("tmp_landsat_import_{}", std::process::id());

        // Save the user's region first, then point modules at the copy
        // and shape it to the dataset.
        self.run_module("g.region", &[format!("save={}", name), "--overwrite".to_string()])?;
        *self.region_override.borrow_mut() = Some(name);
        self.run_module("g.region", &[format!("raster={}", dataset)])?;

        Ok(())
    }

    fn release_region_override(&self) -> anyhow::Result<()> {
        let Some(name) = self.region_override.borrow_mut().take() else {
            return Ok(());
        };

        self.run_module(
            "g.remove",
            &[
                "-f".to_string(),
                "--quiet".to_string(),
                "type=region".to_string(),
                format!("name={}", name),
            ],
        )?;

        Ok(())
    }
}

/// Map a GRASS datatype keyword to a pixel type.
fn parse_pixel_type(datatype: &str) -> Result<PixelType> {
    match datatype {
        "CELL" => Ok(PixelType::Integer),
        "FCELL" => Ok(PixelType::Float32),
        "DCELL" => Ok(PixelType::Float64),
        other => Err(GrassError::Parse {
            module: "r.info".to_string(),
            message: format!("unknown datatype '{}'", other),
        }),
    }
}

/// Build a region from `g.region -g` key-value output.
fn parse_region(kv: &std::collections::BTreeMap<String, String>) -> Result<Region> {
    let get = |key: &str| -> Result<f64> {
        kv.get(key)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| GrassError::Parse {
                module: "g.region".to_string(),
                message: format!("missing or non-numeric '{}'", key),
            })
    };

    Ok(Region {
        north: get("n")?,
        south: get("s")?,
        east: get("e")?,
        west: get("w")?,
        ns_res: get("nsres")?,
        ew_res: get("ewres")?,
    })
}
