//! End-to-end pipeline scenarios against a fake destination environment.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;

use landsat_ingestion::{
    DirectParams, GeoTiffInspector, ImportOptions, IngestionError, LinkParams, PipelineConfig,
    PipelineLifecycle, PixelType, RasterEnvironment, Region, ReprojectParams,
};
use test_utils::archive::{build_scene_archive, mtl_stub};
use test_utils::fixtures::{bands, epsg, scenes};
use test_utils::geotiff::GeoTiffSpec;

/// Fake destination environment: keeps datasets in memory, classifies
/// projections by comparing file metadata against its own EPSG code, and
/// records every operation.
struct FakeEnvironment {
    current_epsg: u32,
    fail_on: Vec<String>,
    calls: RefCell<Vec<String>>,
    datasets: RefCell<BTreeMap<String, PixelType>>,
    region_override_depth: Cell<i32>,
}

impl FakeEnvironment {
    fn new(current_epsg: u32) -> Self {
        Self {
            current_epsg,
            fail_on: Vec::new(),
            calls: RefCell::new(Vec::new()),
            datasets: RefCell::new(BTreeMap::new()),
            region_override_depth: Cell::new(0),
        }
    }

    fn failing_on(current_epsg: u32, dataset: &str) -> Self {
        Self {
            fail_on: vec![dataset.to_string()],
            ..Self::new(current_epsg)
        }
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn create(&self, dataset: &str, pixel_type: PixelType) -> anyhow::Result<()> {
        if self.fail_on.iter().any(|d| d == dataset) {
            anyhow::bail!("simulated corrupt raster");
        }
        self.datasets
            .borrow_mut()
            .insert(dataset.to_string(), pixel_type);
        Ok(())
    }

    fn dataset_names(&self) -> Vec<String> {
        self.datasets.borrow().keys().cloned().collect()
    }
}

impl RasterEnvironment for FakeEnvironment {
    fn link_import(&self, _file: &Path, dataset: &str, _params: &LinkParams) -> anyhow::Result<()> {
        self.log(format!("link {}", dataset));
        self.create(dataset, PixelType::Integer)
    }

    fn direct_import(
        &self,
        _file: &Path,
        dataset: &str,
        _params: &DirectParams,
    ) -> anyhow::Result<()> {
        self.log(format!("direct {}", dataset));
        self.create(dataset, PixelType::Integer)
    }

    fn reproject_import(
        &self,
        _file: &Path,
        dataset: &str,
        params: &ReprojectParams,
    ) -> anyhow::Result<()> {
        self.log(format!("reproject {} res={}", dataset, params.resolution));
        // Bilinear resampling of integer bands produces float output.
        self.create(dataset, PixelType::Float32)
    }

    fn check_projection(&self, file: &Path) -> bool {
        geotiff_parser::read_metadata(file)
            .ok()
            .and_then(|meta| meta.epsg_code())
            .map(|code| code == self.current_epsg)
            .unwrap_or(false)
    }

    fn current_region(&self) -> anyhow::Result<Region> {
        Ok(Region {
            north: 0.0,
            south: -10.0,
            east: 10.0,
            west: 0.0,
            ns_res: 30.0,
            ew_res: 30.0,
        })
    }

    fn pixel_type(&self, dataset: &str) -> anyhow::Result<PixelType> {
        self.datasets
            .borrow()
            .get(dataset)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no such dataset: {}", dataset))
    }

    fn round_to_integer(&self, source: &str, dest: &str) -> anyhow::Result<()> {
        self.log(format!("round {} -> {}", source, dest));
        anyhow::ensure!(
            self.region_override_depth.get() > 0,
            "rounding outside a region override"
        );
        self.pixel_type(source)?;
        self.datasets
            .borrow_mut()
            .insert(dest.to_string(), PixelType::Integer);
        Ok(())
    }

    fn rename_dataset(&self, from: &str, to: &str) -> anyhow::Result<()> {
        self.log(format!("rename {} -> {}", from, to));
        let pixel_type = self
            .datasets
            .borrow_mut()
            .remove(from)
            .ok_or_else(|| anyhow::anyhow!("no such dataset: {}", from))?;
        self.datasets.borrow_mut().insert(to.to_string(), pixel_type);
        Ok(())
    }

    fn write_history(&self, dataset: &str, _note: &str) -> anyhow::Result<()> {
        self.log(format!("history {}", dataset));
        Ok(())
    }

    fn set_region_override(&self, dataset: &str) -> anyhow::Result<()> {
        self.log(format!("region-override {}", dataset));
        self.region_override_depth
            .set(self.region_override_depth.get() + 1);
        Ok(())
    }

    fn release_region_override(&self) -> anyhow::Result<()> {
        self.log("region-release");
        self.region_override_depth
            .set(self.region_override_depth.get() - 1);
        Ok(())
    }
}

/// Build an input directory holding one flat scene archive with a B4
/// band in the given EPSG plus an MTL metadata file.
fn scene_archive_dir(file_epsg: u16) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let band = GeoTiffSpec::uint16(file_epsg).to_bytes();
    build_scene_archive(
        dir.path().join(format!("{}.tar.gz", scenes::LC08)),
        &[
            (bands::LC08_B4, band.as_slice()),
            (bands::LC08_MTL, mtl_stub(scenes::LC08).as_slice()),
        ],
    )
    .unwrap();
    dir
}

fn config(input: &Path, options: ImportOptions) -> PipelineConfig {
    PipelineConfig {
        input_dir: input.to_path_buf(),
        working_dir: None,
        band_pattern: None,
        file_pattern: None,
        skip_extraction: false,
        options,
    }
}

const B4_DATASET: &str = "LC08_L1TP_231094_20200111_20200824_01_T1_B4";

#[test]
fn scenario_a_direct_import_when_systems_match() {
    let dir = scene_archive_dir(epsg::UTM_20S);
    let env = FakeEnvironment::new(epsg::UTM_20S as u32);
    let inspector = GeoTiffInspector;

    let mut pipeline =
        PipelineLifecycle::new(config(dir.path(), ImportOptions::default()), &env, &inspector)
            .unwrap();
    let report = pipeline.run().unwrap();
    pipeline.finalize();

    assert_eq!(report.imported, vec![B4_DATASET.to_string()]);
    assert!(report.failed.is_empty());
    assert_eq!(env.dataset_names(), vec![B4_DATASET.to_string()]);
    assert_eq!(env.pixel_type(B4_DATASET).unwrap(), PixelType::Integer);

    // Extraction directory removed, archive left in place.
    assert!(!dir.path().join(scenes::LC08).exists());
    assert!(dir
        .path()
        .join(format!("{}.tar.gz", scenes::LC08))
        .is_file());
}

#[test]
fn scenario_b_reproject_yields_integer_dataset() {
    let dir = scene_archive_dir(epsg::UTM_20S);
    let env = FakeEnvironment::new(epsg::UTM_33N as u32);
    let inspector = GeoTiffInspector;

    let options = ImportOptions {
        allow_reproject: true,
        ..Default::default()
    };
    let mut pipeline = PipelineLifecycle::new(config(dir.path(), options), &env, &inspector).unwrap();
    let report = pipeline.run().unwrap();
    pipeline.finalize();

    assert_eq!(report.imported, vec![B4_DATASET.to_string()]);
    // The intermediate was floating point; the surviving dataset is the
    // rounded integer replacement under the original name.
    assert_eq!(env.pixel_type(B4_DATASET).unwrap(), PixelType::Integer);
    assert_eq!(env.dataset_names(), vec![B4_DATASET.to_string()]);

    let calls = env.calls.borrow();
    assert!(calls.iter().any(|c| c.starts_with("reproject") && c.ends_with("res=30")));
    assert!(calls.contains(&format!("round {} -> tmp_{}", B4_DATASET, B4_DATASET)));
    assert!(calls.contains(&format!("rename tmp_{} -> {}", B4_DATASET, B4_DATASET)));
    assert_eq!(env.region_override_depth.get(), 0, "override must be released");
}

#[test]
fn scenario_b_reprojection_is_deterministic() {
    let run = || {
        let dir = scene_archive_dir(epsg::UTM_20S);
        let env = FakeEnvironment::new(epsg::UTM_33N as u32);
        let inspector = GeoTiffInspector;
        let options = ImportOptions {
            allow_reproject: true,
            ..Default::default()
        };
        let mut pipeline =
            PipelineLifecycle::new(config(dir.path(), options), &env, &inspector).unwrap();
        pipeline.run().unwrap();
        pipeline.finalize();
        let datasets = env.datasets.borrow().clone();
        datasets
    };

    assert_eq!(run(), run());
}

#[test]
fn scenario_c_zero_candidates_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"no archives here").unwrap();

    let env = FakeEnvironment::new(epsg::UTM_20S as u32);
    let inspector = GeoTiffInspector;
    let mut pipeline =
        PipelineLifecycle::new(config(dir.path(), ImportOptions::default()), &env, &inspector)
            .unwrap();
    let err = pipeline.run().unwrap_err();
    pipeline.finalize();

    assert!(matches!(err, IngestionError::SelectionEmpty));
    assert!(env.dataset_names().is_empty());
}

#[test]
fn scenario_d_single_failure_does_not_abort_batch() {
    let dir = tempfile::tempdir().unwrap();
    let band = GeoTiffSpec::uint16(epsg::UTM_20S).to_bytes();
    build_scene_archive(
        dir.path().join(format!("{}.tar.gz", scenes::LC08)),
        &[
            (bands::LC08_B4, band.as_slice()),
            (bands::LC08_B5, band.as_slice()),
        ],
    )
    .unwrap();

    let failing = "LC08_L1TP_231094_20200111_20200824_01_T1_B5";
    let env = FakeEnvironment::failing_on(epsg::UTM_20S as u32, failing);
    let inspector = GeoTiffInspector;

    let mut pipeline =
        PipelineLifecycle::new(config(dir.path(), ImportOptions::default()), &env, &inspector)
            .unwrap();
    let report = pipeline.run().unwrap();
    pipeline.finalize();

    assert_eq!(report.imported, vec![B4_DATASET.to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].path.ends_with(bands::LC08_B5));
    assert_eq!(env.dataset_names(), vec![B4_DATASET.to_string()]);
}

#[test]
fn strict_mismatch_aborts_without_importing() {
    let dir = scene_archive_dir(epsg::UTM_20S);
    let env = FakeEnvironment::new(epsg::UTM_33N as u32);
    let inspector = GeoTiffInspector;

    let mut pipeline =
        PipelineLifecycle::new(config(dir.path(), ImportOptions::default()), &env, &inspector)
            .unwrap();
    let err = pipeline.run().unwrap_err();
    pipeline.finalize();

    assert!(matches!(err, IngestionError::ProjectionMismatch { .. }));
    assert!(env.dataset_names().is_empty());
}

#[test]
fn link_run_keeps_extracted_data() {
    let dir = scene_archive_dir(epsg::UTM_20S);
    let env = FakeEnvironment::new(epsg::UTM_20S as u32);
    let inspector = GeoTiffInspector;

    let options = ImportOptions {
        link_only: true,
        ..Default::default()
    };
    let mut pipeline = PipelineLifecycle::new(config(dir.path(), options), &env, &inspector).unwrap();
    let report = pipeline.run().unwrap();
    pipeline.finalize();

    assert_eq!(report.imported.len(), 1);
    assert!(env.calls.borrow().iter().any(|c| c.starts_with("link ")));
    // Linked datasets read pixels from the extracted files.
    assert!(dir.path().join(scenes::LC08).is_dir());
}

#[test]
fn candidates_listing_performs_no_imports() {
    let dir = scene_archive_dir(epsg::UTM_20S);
    let env = FakeEnvironment::new(epsg::UTM_20S as u32);
    let inspector = GeoTiffInspector;

    let mut pipeline =
        PipelineLifecycle::new(config(dir.path(), ImportOptions::default()), &env, &inspector)
            .unwrap();
    let files = pipeline.candidates().unwrap();
    pipeline.finalize();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].dataset_name(), B4_DATASET);
    assert!(env.dataset_names().is_empty());
    assert!(env.calls.borrow().is_empty());
}

#[test]
fn skip_extraction_operates_on_existing_working_area() {
    let dir = tempfile::tempdir().unwrap();
    let scene_dir = dir.path().join(scenes::LC08);
    std::fs::create_dir(&scene_dir).unwrap();
    GeoTiffSpec::uint16(epsg::UTM_20S)
        .write_to(scene_dir.join(bands::LC08_B4))
        .unwrap();

    let env = FakeEnvironment::new(epsg::UTM_20S as u32);
    let inspector = GeoTiffInspector;

    let mut pipeline_config = config(dir.path(), ImportOptions::default());
    pipeline_config.skip_extraction = true;
    let mut pipeline = PipelineLifecycle::new(pipeline_config, &env, &inspector).unwrap();
    let report = pipeline.run().unwrap();
    pipeline.finalize();

    assert_eq!(report.imported, vec![B4_DATASET.to_string()]);
    // Nothing was extracted by the pipeline, so nothing is removed.
    assert!(scene_dir.is_dir());
}

#[test]
fn missing_input_directory_is_configuration_error() {
    let env = FakeEnvironment::new(epsg::UTM_20S as u32);
    let inspector = GeoTiffInspector;

    let err = PipelineLifecycle::new(
        config(Path::new("/does/not/exist"), ImportOptions::default()),
        &env,
        &inspector,
    )
    .err()
    .unwrap();
    assert!(matches!(err, IngestionError::Configuration(_)));
}

#[test]
fn separate_working_directory_receives_extraction() {
    let input = scene_archive_dir(epsg::UTM_20S);
    let work = tempfile::tempdir().unwrap();
    let env = FakeEnvironment::new(epsg::UTM_20S as u32);
    let inspector = GeoTiffInspector;

    let mut pipeline_config = config(input.path(), ImportOptions::default());
    pipeline_config.working_dir = Some(work.path().to_path_buf());
    let mut pipeline = PipelineLifecycle::new(pipeline_config, &env, &inspector).unwrap();
    let report = pipeline.run().unwrap();

    assert_eq!(report.imported.len(), 1);
    assert_eq!(
        pipeline.created_directories(),
        &[work.path().join(scenes::LC08)]
    );
    pipeline.finalize();
    assert!(!work.path().join(scenes::LC08).exists());
}

#[test]
fn override_skips_dry_run_and_imports() {
    let dir = scene_archive_dir(epsg::UTM_20S);
    // Mismatched environment, but the override suppresses the check.
    let env = FakeEnvironment::new(epsg::UTM_33N as u32);
    let inspector = GeoTiffInspector;

    let options = ImportOptions {
        override_projection_check: true,
        ..Default::default()
    };
    let mut pipeline = PipelineLifecycle::new(config(dir.path(), options), &env, &inspector).unwrap();
    let report = pipeline.run().unwrap();
    pipeline.finalize();

    assert_eq!(report.imported, vec![B4_DATASET.to_string()]);
    assert_eq!(env.pixel_type(B4_DATASET).unwrap(), PixelType::Integer);
}
