//! Seekable reader trait
//!
//! TIFF blocks are read by absolute offset, so every source handed to the
//! TIFF layer must support both reading and seeking.

use std::io::{Read, Seek};

/// A byte source that can be read and repositioned
///
/// Implemented for files, buffered files and in-memory cursors alike.
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
