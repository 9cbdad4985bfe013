//! IFD utilities
//!
//! Offset arithmetic for walking the IFD chain of a TIFF or BigTIFF file.

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::TiffResult;

/// Reads an IFD offset field (4 bytes in TIFF, 8 in BigTIFF)
///
/// Used for the header's first-IFD pointer and each IFD's next pointer.
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TiffResult<u64> {
    if is_big_tiff {
        Ok(byte_order_handler.read_u64(reader)?)
    } else {
        Ok(byte_order_handler.read_u32(reader)? as u64)
    }
}

/// Size of the entry-count field at the start of an IFD
pub fn entry_count_size(is_big_tiff: bool) -> u64 {
    if is_big_tiff { 8 } else { 2 }
}

/// Size of a single IFD entry
pub fn entry_size(is_big_tiff: bool) -> u64 {
    if is_big_tiff { 20 } else { 12 }
}

/// Offset of the next-IFD pointer of an IFD with `entry_count` entries
pub fn next_offset_position(ifd_offset: u64, entry_count: u64, is_big_tiff: bool) -> u64 {
    ifd_offset + entry_count_size(is_big_tiff) + entry_size(is_big_tiff) * entry_count
}
