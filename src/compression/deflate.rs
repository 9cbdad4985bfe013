//! Handler for Deflate compressed data

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::tiff::errors::TiffResult;
use super::handler::CompressionHandler;

/// Zlib/Deflate handler (compression codes 8 and 32946)
pub struct DeflateHandler {
    code: u16,
}

impl DeflateHandler {
    pub fn new(code: u16) -> Self {
        DeflateHandler { code }
    }
}

impl CompressionHandler for DeflateHandler {
    fn decompress(&self, data: &[u8], expected_size: usize) -> TiffResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data).take(expected_size as u64);
        let mut decompressed_data = Vec::with_capacity(expected_size);
        decoder.read_to_end(&mut decompressed_data)?;
        Ok(decompressed_data)
    }

    fn name(&self) -> &'static str {
        "Deflate"
    }

    fn code(&self) -> u16 {
        self.code
    }
}
