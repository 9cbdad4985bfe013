//! Tile grid and region addressing
//!
//! Pure arithmetic that turns a region identifier plus tile dimensions into a
//! validated pixel rectangle. Nothing in this module touches an image file.

mod region;
mod dims;
mod identifier;
mod tile_grid;
#[cfg(test)]
mod tests;

pub use region::Region;
pub use dims::{TileDims, DEFAULT_TILE_WIDTH, DEFAULT_TILE_HEIGHT};
pub use identifier::RegionIdentifier;
pub use tile_grid::{TileGrid, EdgePolicy, number_of_regions, index_to_rectangle, coordinate_to_rectangle};
