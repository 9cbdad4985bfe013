//! Compression handler trait definition

use crate::tiff::errors::TiffResult;

/// Strategy trait for decoding one compressed TIFF block
pub trait CompressionHandler: Send + Sync {
    /// Decompress the bytes of one tile or strip
    ///
    /// Stream decoders stop after `expected_size` bytes; anything the block
    /// holds beyond that is never inflated.
    fn decompress(&self, data: &[u8], expected_size: usize) -> TiffResult<Vec<u8>>;

    /// Get the name of this compression method
    fn name(&self) -> &'static str;

    /// Get the compression code
    fn code(&self) -> u16;

    /// Whether the output is decoded pixels rather than a byte stream that
    /// still needs predictor reversal
    fn yields_pixels(&self) -> bool {
        false
    }
}
