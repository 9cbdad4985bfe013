//! Handler for JPEG compressed blocks
//!
//! Whole-slide TIFFs (Aperio SVS among them) store each tile as an
//! "abbreviated" JPEG stream without quantization and Huffman tables; the
//! tables live once in the JPEGTables tag and must be spliced in before the
//! tile can be decoded:
//!
//! 1. JPEGTables starts with SOI (FFD8) and ends with EOI (FFD9)
//! 2. Tile data also starts with SOI and ends with EOI
//! 3. Strip EOI from the tables, strip SOI from the tile, concatenate

use image::ImageFormat;
use log::trace;

use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// Start Of Image marker
const SOI: [u8; 2] = [0xFF, 0xD8];

/// End Of Image marker
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Define Huffman Table marker
const DHT: [u8; 2] = [0xFF, 0xC4];

/// Define Quantization Table marker
const DQT: [u8; 2] = [0xFF, 0xDB];

/// Start Of Scan marker
const SOS: [u8; 2] = [0xFF, 0xDA];

/// Whether `data` reaches its scan without defining any DQT/DHT tables
pub fn is_abbreviated_stream(data: &[u8]) -> bool {
    if data.len() < 4 || data[0..2] != SOI {
        return false;
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }

        let marker = [data[pos], data[pos + 1]];
        if marker == DQT || marker == DHT {
            return false;
        }
        if marker == SOS {
            return true;
        }

        // Skip the segment body: 2-byte big-endian length follows the marker
        if pos + 3 < data.len() && marker[1] != 0x00 && marker[1] != 0xD8 && marker[1] != 0xD9 {
            let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            pos += 2 + length;
        } else {
            pos += 2;
        }
    }

    false
}

/// Splice shared tables into an abbreviated tile stream
pub fn merge_jpeg_tables(tables: &[u8], tile_data: &[u8]) -> Vec<u8> {
    if tables.is_empty() {
        return tile_data.to_vec();
    }
    if tile_data.is_empty() {
        return Vec::new();
    }

    let tables_end = if tables.len() >= 2 && tables[tables.len() - 2..] == EOI {
        tables.len() - 2
    } else {
        tables.len()
    };
    let tile_start = if tile_data.len() >= 2 && tile_data[0..2] == SOI { 2 } else { 0 };

    let mut merged = Vec::with_capacity(tables_end + tile_data.len() - tile_start);
    merged.extend_from_slice(&tables[..tables_end]);
    merged.extend_from_slice(&tile_data[tile_start..]);
    merged
}

/// JPEG handler (compression code 7)
///
/// Decodes straight to interleaved 8-bit pixels: grey for one sample per
/// pixel, RGB otherwise (YCbCr is converted by the decoder).
pub struct JpegHandler {
    tables: Option<Vec<u8>>,
    samples_per_pixel: u16,
}

impl JpegHandler {
    pub fn new(tables: Option<Vec<u8>>, samples_per_pixel: u16) -> TiffResult<Self> {
        if samples_per_pixel != 1 && samples_per_pixel != 3 {
            return Err(TiffError::UnsupportedLayout(format!(
                "JPEG blocks with {} samples per pixel",
                samples_per_pixel
            )));
        }

        Ok(JpegHandler {
            tables,
            samples_per_pixel,
        })
    }
}

impl CompressionHandler for JpegHandler {
    fn decompress(&self, data: &[u8], _expected_size: usize) -> TiffResult<Vec<u8>> {
        let stream = match &self.tables {
            Some(tables) if is_abbreviated_stream(data) => {
                trace!("Merging {} bytes of JPEG tables into abbreviated block", tables.len());
                merge_jpeg_tables(tables, data)
            }
            _ => data.to_vec(),
        };

        let decoded = image::load_from_memory_with_format(&stream, ImageFormat::Jpeg)
            .map_err(|e| TiffError::GenericError(format!("JPEG decode error: {}", e)))?;

        let pixels = if self.samples_per_pixel == 1 {
            decoded.to_luma8().into_raw()
        } else {
            decoded.to_rgb8().into_raw()
        };

        Ok(pixels)
    }

    fn name(&self) -> &'static str {
        "JPEG"
    }

    fn code(&self) -> u16 {
        7
    }

    fn yields_pixels(&self) -> bool {
        true
    }
}
