//! TIFF format utilities
//!
//! Byte order and TIFF/BigTIFF detection from the file header.

use log::debug;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::validation;

/// Detects and returns the byte order handler for a TIFF file
pub fn detect_byte_order(reader: &mut dyn SeekableReader) -> TiffResult<Box<dyn ByteOrderHandler>> {
    let byte_order = ByteOrder::detect(reader)?;
    debug!("Detected byte order: {}", byte_order.name());

    Ok(byte_order.create_handler())
}

/// Reads the version number and reports whether the file is a BigTIFF
pub fn detect_tiff_format(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TiffResult<bool> {
    let version = byte_order_handler.read_u16(reader)?;

    match version {
        header::BIG_TIFF_VERSION => {
            debug!("Detected BigTIFF format");
            validation::validate_bigtiff_header(reader, byte_order_handler)?;
            Ok(true)
        }
        header::TIFF_VERSION => {
            debug!("Detected standard TIFF format");
            Ok(false)
        }
        _ => Err(TiffError::UnsupportedVersion(version)),
    }
}
