//! Format-independent region access for very large raster images
//!
//! An image is opened once through the backend adapter registered for its
//! format; regions are then requested by linear tile index or by pixel
//! coordinate and come back as typed pixel buffers.
//!
//! ```no_run
//! use regionkit::{RegionIdentifier, RegionReader, TileDims};
//!
//! let mut reader = RegionReader::open("slide.tif")?;
//! let tile = reader.get_region(RegionIdentifier::Index(0), TileDims::DEFAULT)?;
//! println!("{:?}", tile.shape());
//! # Ok::<(), regionkit::RegionError>(())
//! ```

pub mod errors;
pub mod grid;
pub mod adapter;
pub mod reader;
pub mod config;
pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod commands;
pub mod api;

pub use crate::api::RegionKit;
pub use crate::errors::{RegionError, RegionResult};

pub use adapter::{BackendAdapter, FormatRegistry, PixelBuffer, SampleData, SampleType};
pub use grid::{EdgePolicy, Region, RegionIdentifier, TileDims, TileGrid};
pub use reader::{AdapterOverride, DirectoryReader, RegionReader, RegionSource, TileIterator};
