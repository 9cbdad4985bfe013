//! Tile dimensions

use std::fmt;
use std::str::FromStr;

use crate::errors::{RegionError, RegionResult};

/// Default tile width in pixels
pub const DEFAULT_TILE_WIDTH: u32 = 512;

/// Default tile height in pixels
pub const DEFAULT_TILE_HEIGHT: u32 = 512;

/// Width and height of a tile, both guaranteed to be non-zero
///
/// Tile dimensions are a call parameter, never state of an open image: each
/// addressing operation receives them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileDims {
    width: u32,
    height: u32,
}

impl TileDims {
    /// The process-wide default of 512x512
    pub const DEFAULT: TileDims = TileDims {
        width: DEFAULT_TILE_WIDTH,
        height: DEFAULT_TILE_HEIGHT,
    };

    /// Validate a pair of signed dimensions
    ///
    /// Fails with `InvalidDimensions` if either value is zero or negative, or
    /// does not fit in a `u32`.
    pub fn new(width: i64, height: i64) -> RegionResult<Self> {
        if width <= 0 || height <= 0 || width > u32::MAX as i64 || height > u32::MAX as i64 {
            return Err(RegionError::InvalidDimensions { width, height });
        }

        Ok(TileDims {
            width: width as u32,
            height: height as u32,
        })
    }

    /// Square tile of the given side length
    pub fn square(side: i64) -> RegionResult<Self> {
        TileDims::new(side, side)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// (width, height) tuple
    pub fn as_tuple(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for TileDims {
    fn default() -> Self {
        TileDims::DEFAULT
    }
}

impl TryFrom<(i64, i64)> for TileDims {
    type Error = RegionError;

    fn try_from((width, height): (i64, i64)) -> RegionResult<Self> {
        TileDims::new(width, height)
    }
}

/// Parses "WxH" (or "W,H"); a single number gives a square tile
impl FromStr for TileDims {
    type Err = RegionError;

    fn from_str(s: &str) -> RegionResult<Self> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split(|c| c == 'x' || c == 'X' || c == ',').collect();

        let parse = |part: &str| {
            part.trim().parse::<i64>().map_err(|_| {
                RegionError::InvalidConfig(format!("Invalid tile dimensions: '{}'", trimmed))
            })
        };

        match parts.as_slice() {
            [side] => TileDims::square(parse(side)?),
            [w, h] => TileDims::new(parse(w)?, parse(h)?),
            _ => Err(RegionError::InvalidConfig(format!(
                "Invalid tile dimensions: '{}' (expected WIDTHxHEIGHT)",
                trimmed
            ))),
        }
    }
}

impl fmt::Display for TileDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
