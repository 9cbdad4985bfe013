//! Single-image region reader
//!
//! `RegionReader` is the entry point for reading tiles of one image. It
//! resolves identifiers through the tile grid, checks bounds and delegates
//! the pixel fetch to the backend adapter chosen when the image was opened.
//! The adapter handle is owned by the reader and released when it is dropped.

use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::adapter::{AdapterConstructor, BackendAdapter, FormatRegistry, PixelBuffer, SampleType};
use crate::config::ReaderConfig;
use crate::errors::{RegionError, RegionResult};
use crate::grid::{Region, RegionIdentifier, TileDims, TileGrid};

use super::iterator::TileIterator;
use super::source::RegionSource;

/// Replaces extension-based adapter selection when opening a file
pub enum AdapterOverride {
    /// Use this already-opened adapter as is
    Instance(Box<dyn BackendAdapter>),
    /// Open the file with this constructor
    Constructor(AdapterConstructor),
    /// Look the constructor up under this token instead of the extension
    ///
    /// A token containing a '.' is reduced to the text after its last '.',
    /// so "scan.tif" and ".tif" both select the "tif" adapter.
    Format(String),
}

/// Region-addressing facade over one image
///
/// No addressing state is kept between calls: tile dimensions are passed to
/// every operation, and the configured defaults only back the `*_default`
/// convenience forms.
pub struct RegionReader {
    path: Option<PathBuf>,
    adapter: Box<dyn BackendAdapter>,
    config: ReaderConfig,
}

impl RegionReader {
    /// Open an image, choosing the adapter from its extension
    pub fn open<P: AsRef<Path>>(path: P) -> RegionResult<Self> {
        RegionReader::open_with(path, None)
    }

    /// Open an image, optionally overriding adapter selection
    ///
    /// # Arguments
    /// * `path` - Image file; must exist and be a regular file
    /// * `adapter` - Override for the registry lookup, if any
    ///
    /// # Errors
    /// `FileNotFound` or `NotAFile` for a bad path, `UnsupportedFormat` when
    /// no adapter is registered for the token, and `AdapterIOFailure` when
    /// the adapter itself cannot open the file.
    pub fn open_with<P: AsRef<Path>>(path: P, adapter: Option<AdapterOverride>) -> RegionResult<Self> {
        let path = path.as_ref();
        check_image_path(path)?;

        let registry = FormatRegistry::global();
        let adapter = match adapter {
            None => registry.create(path)?,
            Some(AdapterOverride::Instance(adapter)) => {
                info!("Using supplied '{}' adapter for {}", adapter.name(), path.display());
                adapter
            }
            Some(AdapterOverride::Constructor(constructor)) => constructor(path)?,
            Some(AdapterOverride::Format(token)) => registry.create_for_token(normalize_token(&token), path)?,
        };

        Ok(RegionReader {
            path: Some(path.to_path_buf()),
            adapter,
            config: ReaderConfig::default(),
        })
    }

    /// Wrap an adapter that is not backed by a file path
    pub fn from_adapter(adapter: Box<dyn BackendAdapter>) -> Self {
        debug!("Region reader over '{}' adapter without a file path", adapter.name());
        RegionReader {
            path: None,
            adapter,
            config: ReaderConfig::default(),
        }
    }

    /// Replace the addressing defaults
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Path the image was opened from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn adapter_name(&self) -> &'static str {
        self.adapter.name()
    }

    pub fn channels(&self) -> u16 {
        self.adapter.channels()
    }

    pub fn sample_type(&self) -> SampleType {
        self.adapter.sample_type()
    }

    pub fn width(&self) -> u32 {
        self.adapter.width()
    }

    pub fn height(&self) -> u32 {
        self.adapter.height()
    }

    /// (width, height) in pixels
    pub fn dims(&self) -> (u32, u32) {
        (self.adapter.width(), self.adapter.height())
    }

    /// Tile grid of this image for a tile size, using the configured edge policy
    pub fn grid(&self, dims: TileDims) -> TileGrid {
        TileGrid::with_policy(self.width(), self.height(), dims, self.config.edge_policy)
    }

    pub fn number_of_regions(&self, dims: TileDims) -> u64 {
        self.grid(dims).total()
    }

    pub fn number_of_regions_default(&self) -> u64 {
        self.number_of_regions(self.config.default_dims)
    }

    /// Validate an identifier and turn it into a pixel rectangle
    ///
    /// Indices go through the tile grid and are clipped at the image edges;
    /// explicit coordinates must fit entirely inside the image.
    pub fn resolve(&self, identifier: RegionIdentifier, dims: TileDims) -> RegionResult<Region> {
        let grid = self.grid(dims);
        match identifier {
            RegionIdentifier::Index(index) => grid.index_to_region(index),
            RegionIdentifier::Coordinate(x, y) => grid.coordinate_to_region(x, y, dims),
        }
    }

    /// Pixels of one region
    pub fn get_region(&mut self, identifier: RegionIdentifier, dims: TileDims) -> RegionResult<PixelBuffer> {
        let region = self.resolve(identifier, dims)?;
        debug!("Fetching {} ({}) through '{}'", identifier, region, self.adapter.name());
        self.adapter.fetch(region)
    }

    /// Pixels of a region already obtained from `resolve`
    ///
    /// The adapter still rejects rectangles outside the image.
    pub fn fetch_region(&mut self, region: Region) -> RegionResult<PixelBuffer> {
        debug!("Fetching {} through '{}'", region, self.adapter.name());
        self.adapter.fetch(region)
    }

    pub fn get_region_default(&mut self, identifier: RegionIdentifier) -> RegionResult<PixelBuffer> {
        let dims = self.config.default_dims;
        self.get_region(identifier, dims)
    }

    /// The whole image as one buffer
    pub fn read_all(&mut self) -> RegionResult<PixelBuffer> {
        let (width, height) = self.dims();
        self.adapter.fetch(Region::full(width, height))
    }

    /// Iterate over every tile in row-major order
    pub fn tiles(&mut self, dims: TileDims) -> TileIterator<'_, Self> {
        TileIterator::new(self, dims)
    }

    pub fn tiles_default(&mut self) -> TileIterator<'_, Self> {
        let dims = self.config.default_dims;
        TileIterator::new(self, dims)
    }

    /// Iterate over tiles `range.start..range.end`, cut short at the tile count
    pub fn tiles_in_range(&mut self, range: Range<u64>, dims: TileDims) -> TileIterator<'_, Self> {
        TileIterator::with_range(self, range, dims)
    }
}

impl RegionSource for RegionReader {
    fn number_of_regions(&self, dims: TileDims) -> RegionResult<u64> {
        Ok(RegionReader::number_of_regions(self, dims))
    }

    fn get_region(&mut self, identifier: RegionIdentifier, dims: TileDims) -> RegionResult<PixelBuffer> {
        RegionReader::get_region(self, identifier, dims)
    }

    fn width(&self) -> RegionResult<u32> {
        Ok(RegionReader::width(self))
    }

    fn height(&self) -> RegionResult<u32> {
        Ok(RegionReader::height(self))
    }
}

/// The path must name an existing regular file
fn check_image_path(path: &Path) -> RegionResult<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(()),
        Ok(_) => Err(RegionError::NotAFile(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RegionError::FileNotFound(path.to_path_buf())),
        Err(e) => Err(RegionError::Io(e)),
    }
}

fn normalize_token(format: &str) -> &str {
    match format.rsplit_once('.') {
        Some((_, token)) => token,
        None => format,
    }
}
