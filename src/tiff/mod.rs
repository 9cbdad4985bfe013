//! TIFF container parsing
//!
//! Header, IFD chain and block layout of TIFF and BigTIFF files, enough to
//! locate and decode the blocks that back a pixel rectangle.

pub mod errors;
pub mod ifd;
pub mod types;
pub mod reader;
pub mod layout;
pub mod constants;
pub(crate) mod validation;
#[cfg(test)]
pub(crate) mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFDEntry, IFD};
pub use layout::ImageLayout;
pub use reader::TiffReader;
pub use types::TIFF;
