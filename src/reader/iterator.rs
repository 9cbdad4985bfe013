//! Sequential tile iteration
//!
//! A `TileIterator` walks tile indices `start..min(stop, total)` of one
//! region source with fixed tile dimensions. It borrows the source mutably,
//! so a second pass over the same reader cannot start while one is running.

use std::iter::FusedIterator;
use std::ops::Range;

use log::{debug, warn};

use crate::adapter::PixelBuffer;
use crate::errors::{RegionError, RegionResult};
use crate::grid::{RegionIdentifier, TileDims};

use super::source::RegionSource;

/// Lifecycle of a tile iterator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    NotStarted,
    Iterating,
    Exhausted,
}

/// Forward-only pass over the tiles of a region source
pub struct TileIterator<'a, S: RegionSource + ?Sized> {
    source: &'a mut S,
    dims: TileDims,
    start: u64,
    stop: Option<u64>,
    position: u64,
    end: u64,
    state: IteratorState,
}

impl<'a, S: RegionSource + ?Sized> TileIterator<'a, S> {
    /// Iterate over every tile of `source`
    pub fn new(source: &'a mut S, dims: TileDims) -> Self {
        TileIterator::bounded(source, dims, 0, None)
    }

    /// Iterate over tiles `range.start..range.end`; the end is capped at the tile count
    pub fn with_range(source: &'a mut S, range: Range<u64>, dims: TileDims) -> Self {
        TileIterator::bounded(source, dims, range.start, Some(range.end))
    }

    fn bounded(source: &'a mut S, dims: TileDims, start: u64, stop: Option<u64>) -> Self {
        TileIterator {
            source,
            dims,
            start,
            stop,
            position: start,
            end: 0,
            state: IteratorState::NotStarted,
        }
    }

    pub fn state(&self) -> IteratorState {
        self.state
    }

    /// Index of the next tile to be read
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn dims(&self) -> TileDims {
        self.dims
    }

    /// Exclusive end index, known once iteration has started
    pub fn end(&self) -> Option<u64> {
        match self.state {
            IteratorState::NotStarted => None,
            _ => Some(self.end),
        }
    }

    /// Read the next tile
    ///
    /// Returns `Ok(None)` once at the end of the sequence; any call after
    /// that fails with `IteratorExhausted`. When a tile cannot be fetched the
    /// error is returned and the position still moves on, so the caller may
    /// skip the bad tile and continue.
    pub fn advance(&mut self) -> RegionResult<Option<PixelBuffer>> {
        match self.state {
            IteratorState::Exhausted => return Err(RegionError::IteratorExhausted),
            IteratorState::NotStarted => self.begin()?,
            IteratorState::Iterating => {}
        }

        if self.position >= self.end {
            debug!("Tile iteration finished at {}", self.position);
            self.state = IteratorState::Exhausted;
            return Ok(None);
        }

        let index = self.position;
        self.position += 1;

        match self.source.get_region(RegionIdentifier::Index(index as i64), self.dims) {
            Ok(buffer) => Ok(Some(buffer)),
            Err(e) => {
                warn!("Tile {} could not be read: {}", index, e);
                Err(e)
            }
        }
    }

    fn begin(&mut self) -> RegionResult<()> {
        let total = match self.source.number_of_regions(self.dims) {
            Ok(total) => total,
            Err(e) => {
                self.state = IteratorState::Exhausted;
                return Err(e);
            }
        };

        self.end = self.stop.map_or(total, |stop| stop.min(total));
        self.position = self.start;
        self.state = IteratorState::Iterating;

        debug!("Iterating tiles {}..{} of {} ({} tiles)", self.start, self.end, total, self.dims);
        Ok(())
    }

    /// Tiles left to read, known once iteration has started
    pub fn remaining(&self) -> Option<u64> {
        match self.state {
            IteratorState::NotStarted => None,
            IteratorState::Iterating => Some(self.end.saturating_sub(self.position)),
            IteratorState::Exhausted => Some(0),
        }
    }
}

impl<S: RegionSource + ?Sized> Iterator for TileIterator<'_, S> {
    type Item = RegionResult<PixelBuffer>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == IteratorState::Exhausted {
            return None;
        }
        self.advance().transpose()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining() {
            Some(left) => (left as usize, Some(left as usize)),
            None => (0, self.stop.map(|stop| stop.saturating_sub(self.start) as usize)),
        }
    }
}

impl<S: RegionSource + ?Sized> FusedIterator for TileIterator<'_, S> {}
