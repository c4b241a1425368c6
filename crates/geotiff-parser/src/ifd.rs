//! TIFF image file directory parsing.
//!
//! Implements just enough of the TIFF 6.0 baseline to walk the first IFD
//! and pull out the tags GeoTIFF metadata lives in. Both byte orders are
//! supported; values stored inline in the entry and values stored at an
//! offset are handled uniformly.

use crate::error::{GeoTiffError, Result};

pub const TAG_IMAGE_WIDTH: u16 = 256;
pub const TAG_IMAGE_LENGTH: u16 = 257;
pub const TAG_BITS_PER_SAMPLE: u16 = 258;
pub const TAG_SAMPLE_FORMAT: u16 = 339;
pub const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub const TAG_MODEL_TIEPOINT: u16 = 33922;
pub const TAG_GEO_KEY_DIRECTORY: u16 = 34735;

const TYPE_BYTE: u16 = 1;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

fn type_size(field_type: u16) -> Option<usize> {
    match field_type {
        TYPE_BYTE => Some(1),
        TYPE_SHORT => Some(2),
        TYPE_LONG => Some(4),
        TYPE_DOUBLE => Some(8),
        _ => None,
    }
}

/// Byte-order-aware view over a TIFF byte slice.
pub struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

/// One parsed IFD entry.
#[derive(Debug, Clone, Copy)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    /// Raw offset of the entry's value field (the 4 value/offset bytes).
    value_field_offset: usize,
}

impl<'a> TiffReader<'a> {
    /// Validate the TIFF header and return a reader positioned on it.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < 8 {
            return Err(GeoTiffError::NotATiff("file shorter than header".into()));
        }

        let big_endian = match &data[0..2] {
            b"II" => false,
            b"MM" => true,
            other => {
                return Err(GeoTiffError::NotATiff(format!(
                    "bad byte-order mark {:02x}{:02x}",
                    other[0], other[1]
                )))
            }
        };

        let reader = Self { data, big_endian };
        let magic = reader.read_u16(2)?;
        if magic != 42 {
            return Err(GeoTiffError::NotATiff(format!("magic {} != 42", magic)));
        }

        Ok(reader)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        let bytes: [u8; 2] = self
            .data
            .get(offset..offset + 2)
            .ok_or_else(|| GeoTiffError::Truncated(format!("u16 at {}", offset)))?
            .try_into()
            .unwrap();
        Ok(if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let bytes: [u8; 4] = self
            .data
            .get(offset..offset + 4)
            .ok_or_else(|| GeoTiffError::Truncated(format!("u32 at {}", offset)))?
            .try_into()
            .unwrap();
        Ok(if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    pub fn read_f64(&self, offset: usize) -> Result<f64> {
        let bytes: [u8; 8] = self
            .data
            .get(offset..offset + 8)
            .ok_or_else(|| GeoTiffError::Truncated(format!("f64 at {}", offset)))?
            .try_into()
            .unwrap();
        Ok(if self.big_endian {
            f64::from_be_bytes(bytes)
        } else {
            f64::from_le_bytes(bytes)
        })
    }

    /// Parse all entries of the first IFD.
    pub fn first_ifd(&self) -> Result<Vec<IfdEntry>> {
        let ifd_offset = self.read_u32(4)? as usize;
        let entry_count = self.read_u16(ifd_offset)? as usize;

        let mut entries = Vec::with_capacity(entry_count);
        for i in 0..entry_count {
            let base = ifd_offset + 2 + i * 12;
            entries.push(IfdEntry {
                tag: self.read_u16(base)?,
                field_type: self.read_u16(base + 2)?,
                count: self.read_u32(base + 4)?,
                value_field_offset: base + 8,
            });
        }

        Ok(entries)
    }

    /// Find an entry by tag in a parsed IFD.
    pub fn find<'e>(entries: &'e [IfdEntry], tag: u16) -> Option<&'e IfdEntry> {
        entries.iter().find(|e| e.tag == tag)
    }

    /// Resolve where an entry's values actually live: inline in the value
    /// field if they fit in 4 bytes, otherwise at the stored offset.
    fn value_offset(&self, entry: &IfdEntry) -> Result<usize> {
        let size = type_size(entry.field_type).ok_or(GeoTiffError::UnsupportedFieldType {
            tag: entry.tag,
            field_type: entry.field_type,
        })?;

        let total = size * entry.count as usize;
        if total <= 4 {
            Ok(entry.value_field_offset)
        } else {
            Ok(self.read_u32(entry.value_field_offset)? as usize)
        }
    }

    /// Read an entry's value as a single unsigned integer (SHORT or LONG).
    pub fn value_as_u32(&self, entry: &IfdEntry) -> Result<u32> {
        let offset = self.value_offset(entry)?;
        match entry.field_type {
            TYPE_SHORT => Ok(self.read_u16(offset)? as u32),
            TYPE_LONG => self.read_u32(offset),
            field_type => Err(GeoTiffError::UnsupportedFieldType {
                tag: entry.tag,
                field_type,
            }),
        }
    }

    /// Read an entry's values as a SHORT array.
    pub fn value_as_u16s(&self, entry: &IfdEntry) -> Result<Vec<u16>> {
        if entry.field_type != TYPE_SHORT {
            return Err(GeoTiffError::UnsupportedFieldType {
                tag: entry.tag,
                field_type: entry.field_type,
            });
        }

        let offset = self.value_offset(entry)?;
        (0..entry.count as usize)
            .map(|i| self.read_u16(offset + i * 2))
            .collect()
    }

    /// Read an entry's values as a DOUBLE array.
    pub fn value_as_f64s(&self, entry: &IfdEntry) -> Result<Vec<f64>> {
        if entry.field_type != TYPE_DOUBLE {
            return Err(GeoTiffError::UnsupportedFieldType {
                tag: entry.tag,
                field_type: entry.field_type,
            });
        }

        let offset = self.value_offset(entry)?;
        (0..entry.count as usize)
            .map(|i| self.read_f64(offset + i * 8))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_tiff() {
        assert!(TiffReader::new(b"PK\x03\x04garbage").is_err());
        assert!(TiffReader::new(b"II").is_err());
    }

    #[test]
    fn test_endian_readers() {
        // Minimal little-endian header: II, 42, ifd offset 8
        let le = [0x49, 0x49, 0x2a, 0x00, 0x08, 0x00, 0x00, 0x00];
        let r = TiffReader::new(&le).unwrap();
        assert_eq!(r.read_u16(2).unwrap(), 42);
        assert_eq!(r.read_u32(4).unwrap(), 8);

        // Big-endian equivalent
        let be = [0x4d, 0x4d, 0x00, 0x2a, 0x00, 0x00, 0x00, 0x08];
        let r = TiffReader::new(&be).unwrap();
        assert_eq!(r.read_u16(2).unwrap(), 42);
        assert_eq!(r.read_u32(4).unwrap(), 8);
    }
}
