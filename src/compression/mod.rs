//! Block decompression for TIFF images
//!
//! One strategy per compression code; `CompressionFactory` picks the handler
//! for an image layout.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;
mod packbits;
pub mod jpeg;
#[cfg(test)]
mod tests;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::DeflateHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;
pub use packbits::PackBitsHandler;
pub use jpeg::JpegHandler;
