//! Tests for tile grid arithmetic

extern crate std;

use std::collections::HashSet;

use crate::errors::RegionError;
use crate::grid::{
    coordinate_to_rectangle, index_to_rectangle, number_of_regions, EdgePolicy, Region, TileDims, TileGrid,
};

fn dims(w: i64, h: i64) -> TileDims {
    TileDims::new(w, h).unwrap()
}

#[test]
fn test_exact_multiple_grid() {
    let grid = TileGrid::new(1024, 1024, dims(512, 512));
    std::assert_eq!(grid.columns(), 2);
    std::assert_eq!(grid.rows(), 2);
    std::assert_eq!(grid.total(), 4);

    std::assert_eq!(grid.index_to_region(0).unwrap(), Region::new(0, 0, 512, 512));
    std::assert_eq!(grid.index_to_region(1).unwrap(), Region::new(512, 0, 512, 512));
    std::assert_eq!(grid.index_to_region(2).unwrap(), Region::new(0, 512, 512, 512));
    std::assert_eq!(grid.index_to_region(3).unwrap(), Region::new(512, 512, 512, 512));
}

#[test]
fn test_partial_edge_tiles_are_clipped() {
    let grid = TileGrid::new(1000, 1000, dims(512, 512));
    std::assert_eq!(grid.columns(), 2);
    std::assert_eq!(grid.rows(), 2);
    std::assert_eq!(grid.total(), 4);

    std::assert_eq!(grid.index_to_region(1).unwrap(), Region::new(512, 0, 488, 512));
    std::assert_eq!(grid.index_to_region(2).unwrap(), Region::new(0, 512, 512, 488));
    std::assert_eq!(grid.index_to_region(3).unwrap(), Region::new(512, 512, 488, 488));
}

#[test]
fn test_free_functions_match_grid() {
    std::assert_eq!(number_of_regions((1000, 1000), (512, 512)).unwrap(), 4);
    std::assert_eq!(
        index_to_rectangle(1, (1000, 1000), (512, 512)).unwrap(),
        Region::new(512, 0, 488, 512)
    );
    std::assert_eq!(
        coordinate_to_rectangle(100, 200, (50, 60), (1000, 1000)).unwrap(),
        Region::new(100, 200, 50, 60)
    );
}

#[test]
fn test_invalid_tile_dimensions() {
    for tile in [(0, 512), (512, 0), (-1, 512), (512, -7)] {
        match number_of_regions((1000, 1000), tile) {
            Err(RegionError::InvalidDimensions { width, height }) => {
                std::assert_eq!((width, height), tile);
            }
            other => panic!("expected InvalidDimensions for {:?}, got {:?}", tile, other),
        }
        std::assert!(index_to_rectangle(0, (1000, 1000), tile).is_err());
    }
}

#[test]
fn test_index_bounds() {
    let grid = TileGrid::new(1000, 1000, dims(512, 512));
    std::assert!(matches!(grid.index_to_region(4), Err(RegionError::RegionOutOfBounds(_))));
    std::assert!(matches!(grid.index_to_region(-1), Err(RegionError::RegionOutOfBounds(_))));
    std::assert!(matches!(grid.index_to_region(i64::MIN), Err(RegionError::RegionOutOfBounds(_))));
}

#[test]
fn test_coordinate_path_rejects_overflowing_rectangle() {
    let grid = TileGrid::new(1000, 1000, dims(512, 512));
    let result = grid.coordinate_to_region(900, 900, dims(200, 200));
    std::assert!(matches!(result, Err(RegionError::RegionOutOfBounds(_))));

    // Exactly touching the edge is allowed
    std::assert_eq!(
        grid.coordinate_to_region(800, 800, dims(200, 200)).unwrap(),
        Region::new(800, 800, 200, 200)
    );
}

#[test]
fn test_coordinate_path_rejects_outside_origin() {
    let grid = TileGrid::new(1000, 500, dims(512, 512));
    for (x, y) in [(-1, 0), (0, -1), (1000, 0), (0, 500)] {
        let result = grid.coordinate_to_region(x, y, dims(1, 1));
        std::assert!(matches!(result, Err(RegionError::RegionOutOfBounds(_))), "({}, {})", x, y);
    }
}

#[test]
fn test_round_trip_index_position_index() {
    for (w, h) in [(1000u32, 700u32), (513, 1), (1, 513), (4096, 4096), (37, 91)] {
        for tile in [dims(512, 512), dims(100, 37), dims(1, 1), dims(4096, 3)] {
            let grid = TileGrid::new(w, h, tile);
            for i in 0..grid.total() as i64 {
                let (col, row) = grid.tile_position(i).unwrap();
                std::assert_eq!(row as i64 * grid.columns() as i64 + col as i64, i);
                std::assert_eq!(grid.index_of(col, row).unwrap(), i as u64);

                let rect = grid.index_to_region(i).unwrap();
                std::assert_eq!(rect.x, col * tile.width());
                std::assert_eq!(rect.y, row * tile.height());
            }
        }
    }
}

#[test]
fn test_partition_covers_image_exactly_once() {
    let (w, h) = (130u32, 70u32);
    let grid = TileGrid::new(w, h, dims(32, 24));

    let mut seen = HashSet::new();
    let mut area = 0u64;
    for rect in grid.regions() {
        std::assert!(rect.fits_within(w, h));
        area += rect.area();
        for y in rect.y..rect.end_y() {
            for x in rect.x..rect.end_x() {
                std::assert!(seen.insert((x, y)), "pixel ({}, {}) covered twice", x, y);
            }
        }
    }

    std::assert_eq!(area, w as u64 * h as u64);
    std::assert_eq!(seen.len() as u64, w as u64 * h as u64);
}

#[test]
fn test_regions_follow_index_order() {
    let grid = TileGrid::new(1000, 700, dims(300, 300));
    let by_iterator: Vec<Region> = grid.regions().collect();
    let by_index: Vec<Region> = (0..grid.total() as i64)
        .map(|i| grid.index_to_region(i).unwrap())
        .collect();
    std::assert_eq!(by_iterator, by_index);
}

#[test]
fn test_edge_tile_law() {
    let (w, h) = (1000u32, 777u32);
    let (tw, th) = (300u32, 200u32);
    let grid = TileGrid::new(w, h, dims(tw as i64, th as i64));

    let last_col = grid.columns() - 1;
    let last_row = grid.rows() - 1;
    let expected_w = w - last_col * tw;
    let expected_h = h - last_row * th;
    std::assert!(expected_w > 0 && expected_w < tw);
    std::assert!(expected_h > 0 && expected_h < th);

    for row in 0..grid.rows() {
        std::assert_eq!(grid.tile_size(last_col, row).unwrap().0, expected_w);
    }
    for col in 0..grid.columns() {
        std::assert_eq!(grid.tile_size(col, last_row).unwrap().1, expected_h);
    }
}

#[test]
fn test_drop_policy_ignores_partial_tiles() {
    let grid = TileGrid::with_policy(1000, 1000, dims(512, 512), EdgePolicy::Drop);
    std::assert_eq!(grid.total(), 1);
    std::assert_eq!(grid.index_to_region(0).unwrap(), Region::new(0, 0, 512, 512));
    std::assert!(grid.index_to_region(1).is_err());

    let tiny = TileGrid::with_policy(100, 100, dims(512, 512), EdgePolicy::Drop);
    std::assert_eq!(tiny.total(), 0);
    std::assert!(tiny.index_to_region(0).is_err());
}

#[test]
fn test_tile_larger_than_image() {
    let grid = TileGrid::new(100, 50, dims(512, 512));
    std::assert_eq!(grid.total(), 1);
    std::assert_eq!(grid.index_to_region(0).unwrap(), Region::new(0, 0, 100, 50));
}

#[test]
fn test_index_of_outside_grid() {
    let grid = TileGrid::new(1000, 1000, dims(512, 512));
    std::assert!(grid.index_of(2, 0).is_err());
    std::assert!(grid.index_of(0, 2).is_err());
    std::assert!(grid.tile_size(2, 2).is_err());
}

#[test]
fn test_edge_policy_parsing() {
    std::assert_eq!("clip".parse::<EdgePolicy>().unwrap(), EdgePolicy::Clip);
    std::assert_eq!("FLOOR".parse::<EdgePolicy>().unwrap(), EdgePolicy::Drop);
    std::assert!("sometimes".parse::<EdgePolicy>().is_err());
}

#[test]
fn test_tile_dims_parsing() {
    std::assert_eq!("256x128".parse::<TileDims>().unwrap(), dims(256, 128));
    std::assert_eq!("64".parse::<TileDims>().unwrap(), dims(64, 64));
    std::assert_eq!("10,20".parse::<TileDims>().unwrap(), dims(10, 20));
    std::assert!("0x10".parse::<TileDims>().is_err());
    std::assert!("axb".parse::<TileDims>().is_err());
    std::assert_eq!(TileDims::default().as_tuple(), (512, 512));
}
