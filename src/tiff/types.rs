//! Core TIFF data structures

use std::fmt;

use crate::tiff::constants::tags;
use crate::tiff::ifd::IFD;

/// Parsed directory structure of a TIFF file
#[derive(Debug)]
pub struct TIFF {
    /// Image File Directories in file order
    pub ifds: Vec<IFD>,
    /// Whether this is a BigTIFF format
    pub is_big_tiff: bool,
}

impl TIFF {
    pub fn new(is_big_tiff: bool) -> Self {
        TIFF {
            ifds: Vec::new(),
            is_big_tiff,
        }
    }

    /// The full-resolution image (first IFD)
    pub fn main_ifd(&self) -> Option<&IFD> {
        self.ifds.first()
    }

    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }

    /// Reduced-resolution directories (NewSubfileType bit 0 set)
    pub fn overviews(&self) -> Vec<&IFD> {
        self.ifds
            .iter()
            .filter(|ifd| ifd.get_tag_value(tags::NEW_SUBFILE_TYPE).map_or(false, |t| t & 1 == 1))
            .collect()
    }
}

impl fmt::Display for TIFF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TIFF File:")?;
        writeln!(f, "  Format: {}", if self.is_big_tiff { "BigTIFF" } else { "TIFF" })?;
        writeln!(f, "  Number of IFDs: {}", self.ifds.len())?;

        if let Some(ifd) = self.main_ifd() {
            write!(f, "{}", ifd)?;
        }

        Ok(())
    }
}
