//! Minimal GeoTIFF writer for test fixtures.
//!
//! Emits a single-strip, single-band TIFF carrying the GeoTIFF tags that
//! import decisions read: ModelPixelScaleTag, ModelTiepointTag, and a
//! GeoKey directory with a model type and an EPSG code. Pixel data is a
//! zero-filled strip; tests only consume the metadata.

use std::io::Write;
use std::path::Path;

/// Description of a fixture GeoTIFF.
#[derive(Debug, Clone)]
pub struct GeoTiffSpec {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
    /// TIFF SampleFormat: 1 = unsigned int, 2 = signed int, 3 = float.
    pub sample_format: u16,
    /// Ground size of one pixel (x, y).
    pub pixel_scale: (f64, f64),
    pub epsg: u16,
    pub big_endian: bool,
}

impl Default for GeoTiffSpec {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            bits_per_sample: 16,
            sample_format: 1,
            pixel_scale: (30.0, 30.0),
            epsg: crate::fixtures::epsg::UTM_20S,
            big_endian: false,
        }
    }
}

impl GeoTiffSpec {
    /// An unsigned 16-bit band, the usual Landsat Level-1 pixel type.
    pub fn uint16(epsg: u16) -> Self {
        Self {
            epsg,
            ..Default::default()
        }
    }

    /// A 32-bit float band, as produced by resampling.
    pub fn float32(epsg: u16) -> Self {
        Self {
            bits_per_sample: 32,
            sample_format: 3,
            epsg,
            ..Default::default()
        }
    }

    fn is_geographic(&self) -> bool {
        matches!(self.epsg, 4326 | 4269 | 4258)
    }

    /// Serialize the fixture to TIFF bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        const ENTRY_COUNT: usize = 13;
        const IFD_OFFSET: usize = 8;
        // count + entries + next-IFD pointer
        const DATA_START: usize = IFD_OFFSET + 2 + ENTRY_COUNT * 12 + 4;

        let scale_offset = DATA_START as u32;
        let tiepoint_offset = scale_offset + 3 * 8;
        let geokey_offset = tiepoint_offset + 6 * 8;
        // 4-short header + two 4-short key entries
        let pixels_offset = geokey_offset + 12 * 2;

        let strip_bytes = self.width * self.height * (self.bits_per_sample as u32 / 8);

        let w = Writer {
            big_endian: self.big_endian,
        };
        let mut buf = Vec::new();

        // Header
        buf.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        w.push_u16(&mut buf, 42);
        w.push_u32(&mut buf, IFD_OFFSET as u32);

        // IFD
        w.push_u16(&mut buf, ENTRY_COUNT as u16);
        w.entry_long(&mut buf, 256, self.width); // ImageWidth
        w.entry_long(&mut buf, 257, self.height); // ImageLength
        w.entry_short(&mut buf, 258, self.bits_per_sample); // BitsPerSample
        w.entry_short(&mut buf, 259, 1); // Compression: none
        w.entry_short(&mut buf, 262, 1); // Photometric: BlackIsZero
        w.entry_long(&mut buf, 273, pixels_offset); // StripOffsets
        w.entry_short(&mut buf, 277, 1); // SamplesPerPixel
        w.entry_long(&mut buf, 278, self.height); // RowsPerStrip
        w.entry_long(&mut buf, 279, strip_bytes); // StripByteCounts
        w.entry_short(&mut buf, 339, self.sample_format); // SampleFormat
        w.entry_offset(&mut buf, 33550, 12, 3, scale_offset); // ModelPixelScaleTag
        w.entry_offset(&mut buf, 33922, 12, 6, tiepoint_offset); // ModelTiepointTag
        w.entry_offset(&mut buf, 34735, 3, 12, geokey_offset); // GeoKeyDirectoryTag
        w.push_u32(&mut buf, 0); // no next IFD

        // ModelPixelScale: x, y, z
        w.push_f64(&mut buf, self.pixel_scale.0);
        w.push_f64(&mut buf, self.pixel_scale.1);
        w.push_f64(&mut buf, 0.0);

        // ModelTiepoint: raster (0,0,0) pinned to an arbitrary origin
        for v in [0.0, 0.0, 0.0, 500_000.0, 7_000_000.0, 0.0] {
            w.push_f64(&mut buf, v);
        }

        // GeoKey directory: version 1.1.0, 2 keys
        let (model_type, crs_key) = if self.is_geographic() {
            (2u16, 2048u16)
        } else {
            (1u16, 3072u16)
        };
        for v in [1, 1, 0, 2, 1024, 0, 1, model_type, crs_key, 0, 1, self.epsg] {
            w.push_u16(&mut buf, v);
        }

        buf.resize(buf.len() + strip_bytes as usize, 0);
        debug_assert_eq!(buf.len(), pixels_offset as usize + strip_bytes as usize);

        buf
    }

    /// Write the fixture to a file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(&self.to_bytes())
    }
}

struct Writer {
    big_endian: bool,
}

impl Writer {
    fn push_u16(&self, buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        });
    }

    fn push_u32(&self, buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        });
    }

    fn push_f64(&self, buf: &mut Vec<u8>, v: f64) {
        buf.extend_from_slice(&if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        });
    }

    /// A SHORT entry with its value inline, left-justified per TIFF 6.0.
    fn entry_short(&self, buf: &mut Vec<u8>, tag: u16, value: u16) {
        self.push_u16(buf, tag);
        self.push_u16(buf, 3);
        self.push_u32(buf, 1);
        self.push_u16(buf, value);
        self.push_u16(buf, 0);
    }

    /// A LONG entry with its value inline.
    fn entry_long(&self, buf: &mut Vec<u8>, tag: u16, value: u32) {
        self.push_u16(buf, tag);
        self.push_u16(buf, 4);
        self.push_u32(buf, 1);
        self.push_u32(buf, value);
    }

    /// An entry whose values live at an external offset.
    fn entry_offset(&self, buf: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, offset: u32) {
        self.push_u16(buf, tag);
        self.push_u16(buf, field_type);
        self.push_u32(buf, count);
        self.push_u32(buf, offset);
    }
}
