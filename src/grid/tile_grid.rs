//! Tile grid arithmetic
//!
//! Partitions an image into a row-major grid of tiles for a given tile size
//! and converts between linear tile indices, grid positions and pixel
//! rectangles. Row-major order (left to right, then top to bottom) is the
//! single enumeration order used by every consumer.

use std::fmt;
use std::str::FromStr;

use log::trace;

use crate::errors::{RegionError, RegionResult};

use super::dims::TileDims;
use super::region::Region;

/// How the grid treats tiles cut by the right and bottom image edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Count edge tiles and clip them to the image (ceiling division)
    #[default]
    Clip,
    /// Ignore incomplete edge tiles entirely (floor division)
    Drop,
}

impl EdgePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            EdgePolicy::Clip => "clip",
            EdgePolicy::Drop => "drop",
        }
    }

    /// Number of tiles along one axis of `length` pixels
    fn tiles_along(&self, length: u32, tile: u32) -> u32 {
        match self {
            EdgePolicy::Clip => length.div_ceil(tile),
            EdgePolicy::Drop => length / tile,
        }
    }
}

impl FromStr for EdgePolicy {
    type Err = RegionError;

    fn from_str(s: &str) -> RegionResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "clip" | "ceil" => Ok(EdgePolicy::Clip),
            "drop" | "floor" => Ok(EdgePolicy::Drop),
            other => Err(RegionError::InvalidConfig(format!(
                "Unknown edge policy '{}' (expected 'clip' or 'drop')",
                other
            ))),
        }
    }
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logical partition of one image into tiles of one size
///
/// The grid is cheap to build and holds no resources; it is derived on
/// demand from the image size and the call's tile dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    image_width: u32,
    image_height: u32,
    tile: TileDims,
    policy: EdgePolicy,
    columns: u32,
    rows: u32,
}

impl TileGrid {
    /// Grid with clipped edge tiles
    pub fn new(image_width: u32, image_height: u32, tile: TileDims) -> Self {
        TileGrid::with_policy(image_width, image_height, tile, EdgePolicy::Clip)
    }

    /// Grid with an explicit edge policy
    pub fn with_policy(image_width: u32, image_height: u32, tile: TileDims, policy: EdgePolicy) -> Self {
        let columns = policy.tiles_along(image_width, tile.width());
        let rows = policy.tiles_along(image_height, tile.height());

        trace!("Tile grid for {}x{} image with {} tiles ({}): {} columns x {} rows",
               image_width, image_height, tile, policy, columns, rows);

        TileGrid {
            image_width,
            image_height,
            tile,
            policy,
            columns,
            rows,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of addressable tiles
    pub fn total(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    pub fn tile_dims(&self) -> TileDims {
        self.tile
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    /// Image size the grid was built for
    pub fn image_dims(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// Validate a linear index and return it unsigned
    fn checked_index(&self, index: i64) -> RegionResult<u64> {
        let total = self.total();
        if index < 0 || index as u64 >= total {
            return Err(RegionError::RegionOutOfBounds(format!(
                "tile index {} outside [0, {}) for {}x{} image with {} tiles",
                index, total, self.image_width, self.image_height, self.tile
            )));
        }
        Ok(index as u64)
    }

    /// Grid position (column, row) of a tile index
    pub fn tile_position(&self, index: i64) -> RegionResult<(u32, u32)> {
        let index = self.checked_index(index)?;
        let columns = self.columns as u64;
        Ok(((index % columns) as u32, (index / columns) as u32))
    }

    /// Linear index of the tile at (column, row)
    pub fn index_of(&self, column: u32, row: u32) -> RegionResult<u64> {
        if column >= self.columns || row >= self.rows {
            return Err(RegionError::RegionOutOfBounds(format!(
                "tile ({}, {}) outside {}x{} grid",
                column, row, self.columns, self.rows
            )));
        }
        Ok(row as u64 * self.columns as u64 + column as u64)
    }

    /// Rectangle of the tile at (column, row), clipped to the image
    ///
    /// Callers must pass a position inside the grid.
    fn rect_at(&self, column: u32, row: u32) -> Region {
        let x = column as u64 * self.tile.width() as u64;
        let y = row as u64 * self.tile.height() as u64;
        let width = (self.tile.width() as u64).min(self.image_width as u64 - x);
        let height = (self.tile.height() as u64).min(self.image_height as u64 - y);

        Region::new(x as u32, y as u32, width as u32, height as u32)
    }

    /// Size of the tile at (column, row); edge tiles may be smaller than nominal
    pub fn tile_size(&self, column: u32, row: u32) -> RegionResult<(u32, u32)> {
        self.index_of(column, row)?;
        let rect = self.rect_at(column, row);
        Ok((rect.width, rect.height))
    }

    /// Resolve a tile index into its pixel rectangle
    ///
    /// Fails with `RegionOutOfBounds` if `index < 0` or `index >= total()`.
    /// Edge tiles are clipped, never rejected.
    pub fn index_to_region(&self, index: i64) -> RegionResult<Region> {
        let (column, row) = self.tile_position(index)?;
        let region = self.rect_at(column, row);
        trace!("Tile index {} -> ({}, {}) -> {}", index, column, row, region);
        Ok(region)
    }

    /// Validate an explicit top-left coordinate plus requested size
    ///
    /// Explicit rectangles are never clipped: anything reaching past the
    /// image edge fails with `RegionOutOfBounds`.
    pub fn coordinate_to_region(&self, x: i64, y: i64, requested: TileDims) -> RegionResult<Region> {
        coordinate_rect(x, y, requested, self.image_width, self.image_height)
    }

    /// All tile rectangles in row-major order
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |column| self.rect_at(column, row)))
    }
}

fn coordinate_rect(x: i64, y: i64, requested: TileDims, width: u32, height: u32) -> RegionResult<Region> {
    if x < 0 || x >= width as i64 || y < 0 || y >= height as i64 {
        return Err(RegionError::RegionOutOfBounds(format!(
            "coordinate ({}, {}) outside {}x{} image",
            x, y, width, height
        )));
    }

    if x + requested.width() as i64 > width as i64 || y + requested.height() as i64 > height as i64 {
        return Err(RegionError::RegionOutOfBounds(format!(
            "{} region at ({}, {}) reaches past {}x{} image",
            requested, x, y, width, height
        )));
    }

    Ok(Region::new(x as u32, y as u32, requested.width(), requested.height()))
}

/// Number of tiles (partial edge tiles included) covering an image
///
/// # Arguments
/// * `image` - Image (width, height) in pixels
/// * `tile` - Requested tile (width, height); both must be > 0
pub fn number_of_regions(image: (u32, u32), tile: (i64, i64)) -> RegionResult<u64> {
    let dims = TileDims::try_from(tile)?;
    Ok(TileGrid::new(image.0, image.1, dims).total())
}

/// Pixel rectangle of tile `index`, clipped at the image edges
pub fn index_to_rectangle(index: i64, image: (u32, u32), tile: (i64, i64)) -> RegionResult<Region> {
    let dims = TileDims::try_from(tile)?;
    TileGrid::new(image.0, image.1, dims).index_to_region(index)
}

/// Validated rectangle of `requested` size at top-left (x, y)
pub fn coordinate_to_rectangle(x: i64, y: i64, requested: (i64, i64), image: (u32, u32)) -> RegionResult<Region> {
    let dims = TileDims::try_from(requested)?;
    coordinate_rect(x, y, dims, image.0, image.1)
}
