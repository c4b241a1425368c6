//! GeoTIFF metadata reader.
//!
//! A pure Rust reader for the slice of TIFF/GeoTIFF metadata that raster
//! import decisions need: image dimensions, pixel data type, ground
//! resolution from the model pixel scale, and the EPSG code from the
//! GeoKey directory. Pixel data itself is never decoded; imports go
//! through the destination environment, which has its own readers.

pub mod error;
mod geokeys;
mod ifd;

pub use error::{GeoTiffError, Result};
pub use geokeys::{GeoKeys, ModelType};

use ifd::{
    TiffReader, TAG_BITS_PER_SAMPLE, TAG_GEO_KEY_DIRECTORY, TAG_IMAGE_LENGTH, TAG_IMAGE_WIDTH,
    TAG_MODEL_PIXEL_SCALE, TAG_MODEL_TIEPOINT, TAG_SAMPLE_FORMAT,
};
use std::path::Path;

/// Numeric interpretation of a sample (TIFF tag 339).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    UnsignedInt,
    SignedInt,
    Float,
    Other(u16),
}

/// Metadata extracted from a GeoTIFF file.
#[derive(Debug, Clone)]
pub struct GeoTiffMetadata {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
    pub sample_format: SampleFormat,
    /// Ground size of one pixel (x, y) from ModelPixelScaleTag.
    pub pixel_scale: Option<(f64, f64)>,
    /// Raster-to-model tiepoint (i, j, k, x, y, z), if present.
    pub tiepoint: Option<[f64; 6]>,
    /// Coordinate reference information from the GeoKey directory.
    pub geo_keys: Option<GeoKeys>,
}

impl GeoTiffMetadata {
    /// Native ground resolution: the x scale term of the geotransform,
    /// truncated to whole units the way import resolution is specified.
    pub fn native_resolution(&self) -> Option<u32> {
        self.pixel_scale.map(|(x, _)| x as u32)
    }

    /// EPSG code of the file's native coordinate reference system.
    pub fn epsg_code(&self) -> Option<u32> {
        self.geo_keys.as_ref().and_then(|k| k.native_epsg())
    }

    /// Whether samples are stored as floating point.
    pub fn is_floating_point(&self) -> bool {
        self.sample_format == SampleFormat::Float
    }
}

/// Parse GeoTIFF metadata from a byte slice.
pub fn parse(data: &[u8]) -> Result<GeoTiffMetadata> {
    let reader = TiffReader::new(data)?;
    let entries = reader.first_ifd()?;

    let width = reader.value_as_u32(
        TiffReader::find(&entries, TAG_IMAGE_WIDTH).ok_or(GeoTiffError::MissingTag("ImageWidth"))?,
    )?;
    let height = reader.value_as_u32(
        TiffReader::find(&entries, TAG_IMAGE_LENGTH)
            .ok_or(GeoTiffError::MissingTag("ImageLength"))?,
    )?;

    // Single-band rasters carry one short here; defaults per TIFF 6.0.
    let bits_per_sample = match TiffReader::find(&entries, TAG_BITS_PER_SAMPLE) {
        Some(entry) => *reader
            .value_as_u16s(entry)?
            .first()
            .ok_or(GeoTiffError::MissingTag("BitsPerSample"))?,
        None => 1,
    };

    let sample_format = match TiffReader::find(&entries, TAG_SAMPLE_FORMAT) {
        Some(entry) => match reader.value_as_u16s(entry)?.first().copied().unwrap_or(1) {
            1 => SampleFormat::UnsignedInt,
            2 => SampleFormat::SignedInt,
            3 => SampleFormat::Float,
            other => SampleFormat::Other(other),
        },
        None => SampleFormat::UnsignedInt,
    };

    let pixel_scale = match TiffReader::find(&entries, TAG_MODEL_PIXEL_SCALE) {
        Some(entry) => {
            let scales = reader.value_as_f64s(entry)?;
            if scales.len() >= 2 {
                Some((scales[0], scales[1]))
            } else {
                None
            }
        }
        None => None,
    };

    let tiepoint = match TiffReader::find(&entries, TAG_MODEL_TIEPOINT) {
        Some(entry) => {
            let values = reader.value_as_f64s(entry)?;
            if values.len() >= 6 {
                let mut tp = [0.0; 6];
                tp.copy_from_slice(&values[..6]);
                Some(tp)
            } else {
                None
            }
        }
        None => None,
    };

    let geo_keys = match TiffReader::find(&entries, TAG_GEO_KEY_DIRECTORY) {
        Some(entry) => Some(geokeys::parse_geokey_directory(
            &reader.value_as_u16s(entry)?,
        )?),
        None => None,
    };

    Ok(GeoTiffMetadata {
        width,
        height,
        bits_per_sample,
        sample_format,
        pixel_scale,
        tiepoint,
        geo_keys,
    })
}

/// Read GeoTIFF metadata from a file on disk.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<GeoTiffMetadata> {
    let data = std::fs::read(path)?;
    parse(&data)
}
