//! TIFF file reader implementation
//!
//! Parses the header and the IFD chain of a TIFF or BigTIFF file using the
//! byte order strategy detected from the header, and reads tag values on
//! demand.

use std::io::{Cursor, SeekFrom};

use log::{debug, info, warn};

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFDEntry, IFD};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::{format_utils, ifd_utils, tag_utils};

/// Upper bound on the IFD chain length, guards against offset cycles
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
///
/// The reader does not own the byte source; every call takes the source it
/// should read from, so the same reader can serve block reads after parsing.
pub struct TiffReader {
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        TiffReader::new()
    }
}

impl TiffReader {
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
        }
    }

    /// Byte order handler detected by `read`
    pub fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler
            .as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Reads the header and every IFD in the chain
    ///
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Walk the IFD chain
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let handler = format_utils::detect_byte_order(reader)?;
        self.is_big_tiff = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.byte_order_handler = Some(handler);

        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(self.is_big_tiff);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        if tiff.ifds.is_empty() {
            return Err(TiffError::NoImage);
        }

        info!("Read {} IFD(s) from {}", tiff.ifds.len(), if self.is_big_tiff { "BigTIFF" } else { "TIFF" });
        Ok(tiff)
    }

    /// Follows next-IFD pointers until a zero offset or a broken link
    ///
    /// A broken link after the first IFD ends the chain with a warning; the
    /// directories read so far are kept.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64, file_size: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if ifds.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            let position = ifd_utils::next_offset_position(ifd_offset, ifd.entry_count() as u64, self.is_big_tiff);
            ifds.push(ifd);

            reader.seek(SeekFrom::Start(position))?;
            let next = match ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    break;
                }
            };

            if next != 0 && validation::validate_ifd_offset(next, file_size).is_err() {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next);
                break;
            }
            ifd_offset = next;
        }

        Ok(ifds)
    }

    /// Reads the IFD at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let handler = self.handler()?;
        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} at {} has {} entries", number, offset, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }

        Ok(ifd)
    }

    /// Reads one entry
    ///
    /// Inline values are decoded at their own width so a SHORT in a
    /// big-endian file is not mistaken for a shifted LONG.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let value_position = reader.stream_position()?;
        let field_len = if self.is_big_tiff { 8 } else { 4 };
        let mut raw = [0u8; 8];
        reader.read_exact(&mut raw[..field_len])?;
        let mut field = Cursor::new(&raw[..field_len]);

        let mut entry = IFDEntry::new(tag, field_type, count, 0, value_position);
        entry.value_offset = if count > 0 && entry.is_value_inline(self.is_big_tiff) {
            match entry.field_type_size() {
                1 => raw[0] as u64,
                2 => handler.read_u16(&mut field)? as u64,
                4 => handler.read_u32(&mut field)? as u64,
                _ => handler.read_u64(&mut field)?,
            }
        } else if self.is_big_tiff {
            handler.read_u64(&mut field)?
        } else {
            handler.read_u32(&mut field)? as u64
        };

        Ok(entry)
    }

    /// Reads all values of an integer-typed tag
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        self.seek_to_value(reader, entry)?;
        tag_utils::read_tag_value_array(reader, entry, self.handler()?)
    }

    /// Reads the raw bytes of a BYTE/UNDEFINED/ASCII tag
    pub fn read_tag_bytes(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u8>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        self.seek_to_value(reader, entry)?;

        let mut buffer = vec![0u8; entry.value_size() as usize];
        reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads an ASCII tag, dropping trailing NULs
    pub fn read_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<String> {
        let mut bytes = self.read_tag_bytes(reader, ifd, tag)?;
        while bytes.last() == Some(&0) {
            bytes.pop();
        }

        String::from_utf8(bytes).map_err(|e| TiffError::GenericError(format!("Invalid UTF-8 string: {}", e)))
    }

    fn seek_to_value(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<()> {
        let position = if entry.is_value_inline(self.is_big_tiff) {
            entry.value_position
        } else {
            let file_size = validation::get_file_size(reader)?;
            validation::validate_data_range(entry.value_offset, entry.value_size(), file_size,
                                            tag_utils::get_tag_name(entry.tag))?;
            entry.value_offset
        };

        reader.seek(SeekFrom::Start(position))?;
        Ok(())
    }
}
