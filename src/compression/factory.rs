//! Factory for creating compression handlers

use log::debug;

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::layout::ImageLayout;
use super::deflate::DeflateHandler;
use super::handler::CompressionHandler;
use super::jpeg::JpegHandler;
use super::packbits::PackBitsHandler;
use super::uncompressed::UncompressedHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for the given compression code
    ///
    /// `jpeg_tables` and `samples_per_pixel` only matter for JPEG.
    pub fn create_handler(
        code: u16,
        jpeg_tables: Option<&[u8]>,
        samples_per_pixel: u16,
    ) -> TiffResult<Box<dyn CompressionHandler>> {
        let handler: Box<dyn CompressionHandler> = match code {
            compression::NONE => Box::new(UncompressedHandler),
            compression::DEFLATE | compression::DEFLATE_OLD => Box::new(DeflateHandler::new(code)),
            compression::ZSTD | compression::ZSTD_LIBTIFF => Box::new(ZstdHandler::new(code)),
            compression::PACKBITS => Box::new(PackBitsHandler),
            compression::JPEG => Box::new(JpegHandler::new(jpeg_tables.map(<[u8]>::to_vec), samples_per_pixel)?),
            _ => return Err(TiffError::UnsupportedCompression(code as u64)),
        };

        debug!("Using {} handler for compression code {}", handler.name(), code);
        Ok(handler)
    }

    /// Handler for an image layout; JPEG additionally requires 8-bit samples
    pub fn for_layout(layout: &ImageLayout) -> TiffResult<Box<dyn CompressionHandler>> {
        if layout.compression == compression::JPEG && layout.bits_per_sample != 8 {
            return Err(TiffError::UnsupportedLayout(format!(
                "JPEG blocks with {}-bit samples",
                layout.bits_per_sample
            )));
        }

        CompressionFactory::create_handler(layout.compression, layout.jpeg_tables.as_deref(), layout.samples_per_pixel)
    }
}
