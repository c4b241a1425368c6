//! GRASS module command-line construction and output parsing.
//!
//! Kept as pure functions so the exact command lines are testable
//! without a GRASS installation.

use std::collections::BTreeMap;
use std::path::Path;

use landsat_ingestion::{DirectParams, ExtentPolicy, LinkParams, ReprojectParams};

/// Arguments for `r.external`: register a reference-only raster.
pub fn link_args(file: &Path, dataset: &str, params: &LinkParams) -> Vec<String> {
    let mut args = Vec::new();
    if params.override_projection_check {
        args.push("-o".to_string());
    }
    args.push(format!("input={}", file.display()));
    args.push(format!("output={}", dataset));
    args
}

/// Arguments for `r.in.gdal`: copying, non-resampling import.
pub fn direct_args(file: &Path, dataset: &str, params: &DirectParams) -> Vec<String> {
    let mut args = Vec::new();
    if params.override_projection_check {
        args.push("-o".to_string());
    }
    if params.clip_to_region {
        args.push("-r".to_string());
    }
    args.push(format!("input={}", file.display()));
    args.push(format!("output={}", dataset));
    args.push(format!("memory={}", params.memory_mb));
    args
}

/// Arguments for `r.import`: reprojecting import at an explicit output
/// resolution.
pub fn reproject_args(file: &Path, dataset: &str, params: &ReprojectParams) -> Vec<String> {
    vec![
        format!("input={}", file.display()),
        format!("output={}", dataset),
        format!("resample={}", params.resampling.as_str()),
        "resolution=value".to_string(),
        format!("resolution_value={}", params.resolution),
        format!("extent={}", extent_keyword(params.extent)),
        format!("memory={}", params.memory_mb),
    ]
}

/// Arguments for the `r.in.gdal -j` projection dry run.
pub fn check_projection_args(file: &Path) -> Vec<String> {
    vec![
        "-j".to_string(),
        "--quiet".to_string(),
        format!("input={}", file.display()),
    ]
}

/// Arguments for `r.mapcalc` rounding a dataset into a temp name.
pub fn round_args(source: &str, dest: &str) -> Vec<String> {
    vec![
        "--quiet".to_string(),
        format!("expression={} = round({})", dest, source),
    ]
}

/// Arguments for `g.rename` replacing `to` with `from`.
pub fn rename_args(from: &str, to: &str) -> Vec<String> {
    vec![
        "--quiet".to_string(),
        "--overwrite".to_string(),
        format!("raster={},{}", from, to),
    ]
}

/// Arguments for `r.support` recording provenance.
pub fn history_args(dataset: &str, note: &str) -> Vec<String> {
    vec![format!("map={}", dataset), format!("history={}", note)]
}

fn extent_keyword(extent: ExtentPolicy) -> &'static str {
    match extent {
        ExtentPolicy::Input => "input",
        ExtentPolicy::Region => "region",
    }
}

/// Parse `key=value` lines as emitted by `g.region -g` and `r.info -g`.
pub fn parse_key_values(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use landsat_ingestion::Resampling;

    #[test]
    fn test_link_args() {
        let params = LinkParams {
            override_projection_check: true,
        };
        assert_eq!(
            link_args(Path::new("/data/B4.TIF"), "B4", &params),
            vec!["-o", "input=/data/B4.TIF", "output=B4"]
        );
    }

    #[test]
    fn test_direct_args_with_region_clip() {
        let params = DirectParams {
            override_projection_check: false,
            clip_to_region: true,
            memory_mb: 300,
        };
        assert_eq!(
            direct_args(Path::new("/data/B4.TIF"), "B4", &params),
            vec!["-r", "input=/data/B4.TIF", "output=B4", "memory=300"]
        );
    }

    #[test]
    fn test_reproject_args() {
        let params = ReprojectParams {
            resampling: Resampling::Bilinear,
            resolution: 30,
            extent: ExtentPolicy::Input,
            memory_mb: 300,
        };
        assert_eq!(
            reproject_args(Path::new("/data/B4.TIF"), "B4", &params),
            vec![
                "input=/data/B4.TIF",
                "output=B4",
                "resample=bilinear",
                "resolution=value",
                "resolution_value=30",
                "extent=input",
                "memory=300",
            ]
        );
    }

    #[test]
    fn test_round_and_rename_args() {
        assert_eq!(
            round_args("B4", "tmp_B4"),
            vec!["--quiet", "expression=tmp_B4 = round(B4)"]
        );
        assert_eq!(
            rename_args("tmp_B4", "B4"),
            vec!["--quiet", "--overwrite", "raster=tmp_B4,B4"]
        );
    }

    #[test]
    fn test_parse_key_values() {
        let out = "n=100\ns=0\ne=200\nw=0\nnsres=30\newres=30\n";
        let kv = parse_key_values(out);
        assert_eq!(kv.get("n").map(String::as_str), Some("100"));
        assert_eq!(kv.get("nsres").map(String::as_str), Some("30"));
        assert_eq!(kv.len(), 6);
    }

    #[test]
    fn test_parse_key_values_skips_noise() {
        let kv = parse_key_values("projection: UTM\ndatatype=CELL\n");
        assert_eq!(kv.len(), 1);
        assert_eq!(kv.get("datatype").map(String::as_str), Some("CELL"));
    }
}
