//! Region identifiers
//!
//! A region is requested either by its linear tile index or by the pixel
//! coordinate of its top-left corner.

use std::fmt;
use std::str::FromStr;

use crate::errors::{RegionError, RegionResult};

/// How a caller names the region it wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionIdentifier {
    /// Linear, row-major tile index resolved through the tile grid
    Index(i64),
    /// Explicit top-left pixel coordinate (x, y)
    Coordinate(i64, i64),
}

impl RegionIdentifier {
    /// Build a coordinate identifier from a slice of components
    ///
    /// Fails with `InvalidCoordinates` unless exactly two components are given.
    pub fn from_components(components: &[i64]) -> RegionResult<Self> {
        match components {
            [x, y] => Ok(RegionIdentifier::Coordinate(*x, *y)),
            _ => Err(RegionError::InvalidCoordinates(format!("{:?}", components))),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, RegionIdentifier::Index(_))
    }
}

impl From<i64> for RegionIdentifier {
    fn from(index: i64) -> Self {
        RegionIdentifier::Index(index)
    }
}

impl From<(i64, i64)> for RegionIdentifier {
    fn from((x, y): (i64, i64)) -> Self {
        RegionIdentifier::Coordinate(x, y)
    }
}

/// Parses "7" as an index and "512,1024" as a coordinate
impl FromStr for RegionIdentifier {
    type Err = RegionError;

    fn from_str(s: &str) -> RegionResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RegionError::InvalidIdentifier(s.to_string()));
        }

        if !trimmed.contains(',') {
            return trimmed
                .parse::<i64>()
                .map(RegionIdentifier::Index)
                .map_err(|_| RegionError::InvalidIdentifier(trimmed.to_string()));
        }

        let components = trimmed
            .split(',')
            .map(|part| part.trim().parse::<i64>())
            .collect::<Result<Vec<i64>, _>>()
            .map_err(|_| RegionError::InvalidIdentifier(trimmed.to_string()))?;

        RegionIdentifier::from_components(&components)
    }
}

impl fmt::Display for RegionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionIdentifier::Index(i) => write!(f, "index {}", i),
            RegionIdentifier::Coordinate(x, y) => write!(f, "coordinate ({}, {})", x, y),
        }
    }
}
