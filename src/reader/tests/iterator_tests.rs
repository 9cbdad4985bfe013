//! Tests for sequential tile iteration

extern crate std;

use crate::adapter::{PixelBuffer, SampleData};
use crate::errors::{RegionError, RegionResult};
use crate::grid::{RegionIdentifier, TileDims};
use crate::reader::{IteratorState, RegionSource, TileIterator};

use super::{first_sample, indexed_reader};

/// Source of `total` one-pixel tiles that fails on chosen indices
struct ScriptedSource {
    total: u64,
    failing: Vec<i64>,
    requested: Vec<i64>,
}

impl ScriptedSource {
    fn new(total: u64) -> Self {
        ScriptedSource {
            total,
            failing: Vec::new(),
            requested: Vec::new(),
        }
    }
}

impl RegionSource for ScriptedSource {
    fn number_of_regions(&self, _dims: TileDims) -> RegionResult<u64> {
        Ok(self.total)
    }

    fn get_region(&mut self, identifier: RegionIdentifier, _dims: TileDims) -> RegionResult<PixelBuffer> {
        let index = match identifier {
            RegionIdentifier::Index(i) => i,
            RegionIdentifier::Coordinate(..) => return Err(RegionError::NotSupported("coordinates".to_string())),
        };
        self.requested.push(index);
        if self.failing.contains(&index) {
            return Err(RegionError::adapter("scripted", format!("tile {} is corrupt", index)));
        }
        PixelBuffer::new(1, 1, 1, SampleData::I32(vec![index as i32]))
    }

    fn width(&self) -> RegionResult<u32> {
        Ok(self.total as u32)
    }

    fn height(&self) -> RegionResult<u32> {
        Ok(1)
    }
}

fn tile() -> TileDims {
    TileDims::square(1).unwrap()
}

#[test]
fn test_state_transitions() {
    let mut source = ScriptedSource::new(2);
    let mut tiles = TileIterator::new(&mut source, tile());

    std::assert_eq!(tiles.state(), IteratorState::NotStarted);
    std::assert_eq!(tiles.end(), None);
    std::assert_eq!(tiles.remaining(), None);

    std::assert!(tiles.advance().unwrap().is_some());
    std::assert_eq!(tiles.state(), IteratorState::Iterating);
    std::assert_eq!(tiles.end(), Some(2));
    std::assert_eq!(tiles.position(), 1);
    std::assert_eq!(tiles.remaining(), Some(1));

    std::assert!(tiles.advance().unwrap().is_some());
    std::assert!(tiles.advance().unwrap().is_none());
    std::assert_eq!(tiles.state(), IteratorState::Exhausted);

    std::assert!(matches!(tiles.advance(), Err(RegionError::IteratorExhausted)));
    std::assert!(tiles.next().is_none());
}

#[test]
fn test_std_iterator_is_fused() {
    let mut source = ScriptedSource::new(3);
    let mut tiles = TileIterator::new(&mut source, tile());
    std::assert_eq!(tiles.by_ref().count(), 3);
    std::assert!(tiles.next().is_none());
    std::assert!(tiles.next().is_none());
}

#[test]
fn test_failed_tile_is_skipped() {
    let mut source = ScriptedSource::new(4);
    source.failing.push(1);

    let results: Vec<RegionResult<PixelBuffer>> = TileIterator::new(&mut source, tile()).collect();
    std::assert_eq!(results.len(), 4);
    std::assert!(results[0].is_ok());
    std::assert!(matches!(results[1], Err(RegionError::AdapterIOFailure { adapter: "scripted", .. })));
    std::assert!(results[2].is_ok());
    std::assert!(results[3].is_ok());

    std::assert_eq!(source.requested, vec![0, 1, 2, 3]);
}

#[test]
fn test_range_is_capped_at_total() {
    let mut source = ScriptedSource::new(5);
    let count = TileIterator::with_range(&mut source, 2..100, tile()).count();
    std::assert_eq!(count, 3);
    std::assert_eq!(source.requested, vec![2, 3, 4]);

    let mut source = ScriptedSource::new(5);
    std::assert_eq!(TileIterator::with_range(&mut source, 1..3, tile()).count(), 2);
    std::assert_eq!(source.requested, vec![1, 2]);

    let mut source = ScriptedSource::new(5);
    std::assert_eq!(TileIterator::with_range(&mut source, 7..9, tile()).count(), 0);
    std::assert!(source.requested.is_empty());
}

#[test]
fn test_empty_source() {
    let mut source = ScriptedSource::new(0);
    let mut tiles = TileIterator::new(&mut source, tile());
    std::assert!(tiles.advance().unwrap().is_none());
    std::assert!(matches!(tiles.advance(), Err(RegionError::IteratorExhausted)));
}

#[test]
fn test_size_hint() {
    let mut source = ScriptedSource::new(10);
    let mut tiles = TileIterator::with_range(&mut source, 2..6, tile());
    std::assert_eq!(tiles.size_hint(), (0, Some(4)));
    tiles.next();
    std::assert_eq!(tiles.size_hint(), (3, Some(3)));
}

#[test]
fn test_reader_tiles_in_row_major_order() {
    let mut reader = indexed_reader(100, 60);
    let dims = TileDims::new(40, 25).unwrap();

    let origins: Vec<u32> = reader.tiles(dims).map(|tile| first_sample(&tile.unwrap())).collect();
    let expected: Vec<u32> = [0u32, 25, 50]
        .iter()
        .flat_map(|&y| [0u32, 40, 80].into_iter().map(move |x| y * 100 + x))
        .collect();
    std::assert_eq!(origins, expected);

    // The reader is usable again once the pass is over
    std::assert_eq!(reader.tiles_in_range(7..9, dims).count(), 2);
    std::assert_eq!(reader.tiles_default().count(), 1);
}
