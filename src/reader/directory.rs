//! Aggregate-directory reader
//!
//! Treats a collection of image files as one tiled source: file `i` of the
//! lexicographically sorted list is tile `i`, read whole. Tiles have no
//! common pixel grid, so coordinate addressing and image dimensions are not
//! available.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use regex::Regex;

use crate::adapter::{format_token, FormatRegistry, PixelBuffer};
use crate::errors::{RegionError, RegionResult};
use crate::grid::{RegionIdentifier, TileDims};

use super::iterator::TileIterator;
use super::region_reader::RegionReader;
use super::source::RegionSource;

/// One whole image file per tile
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    root: Option<PathBuf>,
    files: Vec<PathBuf>,
}

impl DirectoryReader {
    /// Collect every file in `dir` whose format has a registered adapter
    pub fn open<P: AsRef<Path>>(dir: P) -> RegionResult<Self> {
        DirectoryReader::scan(dir.as_ref(), None)
    }

    /// Like `open`, keeping only files whose name matches `pattern`
    pub fn open_matching<P: AsRef<Path>>(dir: P, pattern: &Regex) -> RegionResult<Self> {
        DirectoryReader::scan(dir.as_ref(), Some(pattern))
    }

    /// Use an explicit list of files; order is by path, not list order
    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut files: Vec<PathBuf> = files.into_iter().map(Into::into).collect();
        files.sort();
        DirectoryReader { root: None, files }
    }

    fn scan(dir: &Path, pattern: Option<&Regex>) -> RegionResult<Self> {
        let metadata = fs::metadata(dir).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RegionError::FileNotFound(dir.to_path_buf()),
            _ => RegionError::Io(e),
        })?;
        if !metadata.is_dir() {
            return Err(RegionError::NotSupported(format!("{} is not a directory", dir.display())));
        }

        let registry = FormatRegistry::global();
        let mut files = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !registry.supports(&format_token(&path)) {
                continue;
            }

            if let Some(pattern) = pattern {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                if !pattern.is_match(name) {
                    debug!("Skipping {}: name does not match '{}'", path.display(), pattern);
                    continue;
                }
            }

            files.push(path);
        }

        files.sort();
        info!("Directory {} holds {} readable image(s)", dir.display(), files.len());

        Ok(DirectoryReader {
            root: Some(dir.to_path_buf()),
            files,
        })
    }

    /// Directory the files were collected from, if any
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Files in tile order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File backing tile `index`
    pub fn path_of(&self, index: i64) -> RegionResult<&Path> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.files.get(i))
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                RegionError::RegionOutOfBounds(format!("tile {} of a {}-file directory", index, self.files.len()))
            })
    }

    /// Iterate over every file in tile order
    pub fn tiles(&mut self) -> TileIterator<'_, Self> {
        TileIterator::new(self, TileDims::DEFAULT)
    }
}

impl RegionSource for DirectoryReader {
    /// The file count; tile dimensions play no part
    fn number_of_regions(&self, _dims: TileDims) -> RegionResult<u64> {
        Ok(self.files.len() as u64)
    }

    fn get_region(&mut self, identifier: RegionIdentifier, _dims: TileDims) -> RegionResult<PixelBuffer> {
        let index = match identifier {
            RegionIdentifier::Index(index) => index,
            RegionIdentifier::Coordinate(..) => {
                return Err(RegionError::NotSupported(
                    "coordinate identifiers on a directory reader".to_string(),
                ))
            }
        };

        let path = self.path_of(index)?;
        debug!("Directory tile {} -> {}", index, path.display());

        // The file handle lives only as long as this reader
        let mut reader = RegionReader::open(path)?;
        reader.read_all()
    }

    fn width(&self) -> RegionResult<u32> {
        Err(RegionError::NotSupported("width of a directory reader".to_string()))
    }

    fn height(&self) -> RegionResult<u32> {
        Err(RegionError::NotSupported("height of a directory reader".to_string()))
    }
}
