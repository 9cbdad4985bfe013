//! Common interface of everything that serves regions by identifier

use crate::adapter::PixelBuffer;
use crate::errors::RegionResult;
use crate::grid::{RegionIdentifier, TileDims};

/// Something regions can be requested from
///
/// Implemented by the single-image `RegionReader` and by the
/// `DirectoryReader`; the sequential iterator works over either.
pub trait RegionSource {
    /// Number of regions for a tile size
    fn number_of_regions(&self, dims: TileDims) -> RegionResult<u64>;

    /// Fetch the pixels of one region
    fn get_region(&mut self, identifier: RegionIdentifier, dims: TileDims) -> RegionResult<PixelBuffer>;

    fn width(&self) -> RegionResult<u32>;

    fn height(&self) -> RegionResult<u32>;

    /// (width, height) of the image
    fn dims(&self) -> RegionResult<(u32, u32)> {
        Ok((self.width()?, self.height()?))
    }
}
