//! Metadata extraction tests against generated GeoTIFF fixtures.

use geotiff_parser::{GeoTiffError, SampleFormat};
use test_utils::fixtures::epsg;
use test_utils::geotiff::GeoTiffSpec;

#[test]
fn test_uint16_utm_little_endian() {
    let bytes = GeoTiffSpec::uint16(epsg::UTM_20S).to_bytes();
    let meta = geotiff_parser::parse(&bytes).unwrap();

    assert_eq!(meta.width, 8);
    assert_eq!(meta.height, 8);
    assert_eq!(meta.bits_per_sample, 16);
    assert_eq!(meta.sample_format, SampleFormat::UnsignedInt);
    assert!(!meta.is_floating_point());
    assert_eq!(meta.native_resolution(), Some(30));
    assert_eq!(meta.epsg_code(), Some(epsg::UTM_20S as u32));
}

#[test]
fn test_float32_big_endian() {
    let spec = GeoTiffSpec {
        big_endian: true,
        ..GeoTiffSpec::float32(epsg::UTM_33N)
    };
    let meta = geotiff_parser::parse(&spec.to_bytes()).unwrap();

    assert_eq!(meta.sample_format, SampleFormat::Float);
    assert!(meta.is_floating_point());
    assert_eq!(meta.epsg_code(), Some(epsg::UTM_33N as u32));
}

#[test]
fn test_geographic_model() {
    let bytes = GeoTiffSpec::uint16(epsg::WGS84).to_bytes();
    let meta = geotiff_parser::parse(&bytes).unwrap();
    assert_eq!(meta.epsg_code(), Some(4326));
}

#[test]
fn test_fractional_scale_truncates() {
    let spec = GeoTiffSpec {
        pixel_scale: (15.7, 15.7),
        ..Default::default()
    };
    let meta = geotiff_parser::parse(&spec.to_bytes()).unwrap();
    assert_eq!(meta.native_resolution(), Some(15));
}

#[test]
fn test_read_metadata_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("band.TIF");
    GeoTiffSpec::uint16(epsg::UTM_20S).write_to(&path).unwrap();

    let meta = geotiff_parser::read_metadata(&path).unwrap();
    assert_eq!(meta.epsg_code(), Some(epsg::UTM_20S as u32));
}

#[test]
fn test_rejects_non_tiff_file() {
    let err = geotiff_parser::parse(b"GROUP = L1_METADATA_FILE").unwrap_err();
    assert!(matches!(err, GeoTiffError::NotATiff(_)));
}

#[test]
fn test_truncated_file() {
    let bytes = GeoTiffSpec::default().to_bytes();
    let err = geotiff_parser::parse(&bytes[..64]).unwrap_err();
    assert!(matches!(err, GeoTiffError::Truncated(_)));
}
