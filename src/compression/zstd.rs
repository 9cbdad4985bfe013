//! Handler for ZSTD compressed data

use std::io::Read;

use log::{debug, warn};

use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// ZSTD handler (compression codes 14 and 50000)
pub struct ZstdHandler {
    code: u16,
}

impl ZstdHandler {
    pub fn new(code: u16) -> Self {
        ZstdHandler { code }
    }
}

impl CompressionHandler for ZstdHandler {
    fn decompress(&self, data: &[u8], expected_size: usize) -> TiffResult<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let decoded = zstd::stream::read::Decoder::new(data).and_then(|decoder| {
            let mut decompressed_data = Vec::with_capacity(expected_size);
            decoder.take(expected_size as u64).read_to_end(&mut decompressed_data)?;
            Ok(decompressed_data)
        });

        match decoded {
            Ok(decompressed_data) => {
                debug!("ZSTD decompressed {} -> {} bytes", data.len(), decompressed_data.len());
                Ok(decompressed_data)
            }
            Err(e) => {
                warn!("ZSTD decompression error: {}", e);
                Err(TiffError::GenericError(format!("ZSTD decompression error: {}", e)))
            }
        }
    }

    fn name(&self) -> &'static str {
        "ZSTD"
    }

    fn code(&self) -> u16 {
        self.code
    }
}
