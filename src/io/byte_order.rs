//! Byte order handling for TIFF files
//!
//! Strategy objects for little- and big-endian files. Besides reading header
//! and tag fields, a handler turns decompressed block bytes into typed
//! samples and undoes 16-bit horizontal differencing, both of which depend on
//! the file's byte order.

use std::io::Result;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::adapter::{SampleData, SampleType};
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the first two header bytes
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II"
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM"
            _ => Err(TiffError::InvalidByteOrder(marker)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    fn byte_order(&self) -> ByteOrder;

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    /// Read a rational value (two u32 values as numerator/denominator)
    fn read_rational(&self, reader: &mut dyn SeekableReader) -> Result<(u32, u32)>;

    /// Convert raw pixel bytes into typed samples
    fn decode_samples(&self, bytes: &[u8], sample_type: SampleType) -> TiffResult<SampleData>;

    /// Reverse horizontal differencing on one row of 16-bit samples in place
    fn undo_predictor_u16(&self, row: &mut [u8], channels: usize);
}

/// Decode `bytes` as a run of `sample_type` values in byte order `E`
fn decode_with<E: byteorder::ByteOrder>(bytes: &[u8], sample_type: SampleType) -> TiffResult<SampleData> {
    let size = sample_type.bytes_per_sample();
    if bytes.len() % size != 0 {
        return Err(TiffError::GenericError(format!(
            "{} bytes is not a whole number of {} samples",
            bytes.len(),
            sample_type
        )));
    }
    let count = bytes.len() / size;

    let data = match sample_type {
        SampleType::U8 => SampleData::U8(bytes.to_vec()),
        SampleType::I8 => SampleData::I8(bytes.iter().map(|&b| b as i8).collect()),
        SampleType::U16 => {
            let mut out = vec![0u16; count];
            E::read_u16_into(bytes, &mut out);
            SampleData::U16(out)
        }
        SampleType::I16 => {
            let mut out = vec![0i16; count];
            E::read_i16_into(bytes, &mut out);
            SampleData::I16(out)
        }
        SampleType::U32 => {
            let mut out = vec![0u32; count];
            E::read_u32_into(bytes, &mut out);
            SampleData::U32(out)
        }
        SampleType::I32 => {
            let mut out = vec![0i32; count];
            E::read_i32_into(bytes, &mut out);
            SampleData::I32(out)
        }
        SampleType::F32 => {
            let mut out = vec![0f32; count];
            E::read_f32_into(bytes, &mut out);
            SampleData::F32(out)
        }
        SampleType::F64 => {
            let mut out = vec![0f64; count];
            E::read_f64_into(bytes, &mut out);
            SampleData::F64(out)
        }
        SampleType::Complex32 => {
            let mut parts = vec![0f32; count * 2];
            E::read_f32_into(bytes, &mut parts);
            SampleData::Complex32(parts.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
        }
        SampleType::Complex64 => {
            let mut parts = vec![0f64; count * 2];
            E::read_f64_into(bytes, &mut parts);
            SampleData::Complex64(parts.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
        }
    };

    Ok(data)
}

fn undo_predictor_u16_with<E: byteorder::ByteOrder>(row: &mut [u8], channels: usize) {
    let stride = channels * 2;
    for i in (stride..row.len().saturating_sub(1)).step_by(2) {
        let previous = E::read_u16(&row[i - stride..]);
        let current = E::read_u16(&row[i..]);
        E::write_u16(&mut row[i..], current.wrapping_add(previous));
    }
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::LittleEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn read_rational(&self, reader: &mut dyn SeekableReader) -> Result<(u32, u32)> {
        let numerator = reader.read_u32::<LittleEndian>()?;
        let denominator = reader.read_u32::<LittleEndian>()?;
        Ok((numerator, denominator))
    }

    fn decode_samples(&self, bytes: &[u8], sample_type: SampleType) -> TiffResult<SampleData> {
        decode_with::<LittleEndian>(bytes, sample_type)
    }

    fn undo_predictor_u16(&self, row: &mut [u8], channels: usize) {
        undo_predictor_u16_with::<LittleEndian>(row, channels)
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::BigEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn read_rational(&self, reader: &mut dyn SeekableReader) -> Result<(u32, u32)> {
        let numerator = reader.read_u32::<BigEndian>()?;
        let denominator = reader.read_u32::<BigEndian>()?;
        Ok((numerator, denominator))
    }

    fn decode_samples(&self, bytes: &[u8], sample_type: SampleType) -> TiffResult<SampleData> {
        decode_with::<BigEndian>(bytes, sample_type)
    }

    fn undo_predictor_u16(&self, row: &mut [u8], channels: usize) {
        undo_predictor_u16_with::<BigEndian>(row, channels)
    }
}
