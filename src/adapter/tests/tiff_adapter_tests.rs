//! Tests for region reads through the TIFF adapter

extern crate std;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::adapter::{BackendAdapter, SampleData, SampleType, TiffAdapter};
use crate::errors::RegionError;
use crate::grid::Region;
use crate::tiff::tests::test_utils::{pattern_u8, TiffFixture};

/// Crop the expected bytes out of a full-image pattern
fn expected_crop(pixels: &[u8], width: u32, bpp: usize, region: Region) -> Vec<u8> {
    let mut out = Vec::new();
    for y in region.y..region.end_y() {
        let start = (y * width + region.x) as usize * bpp;
        out.extend_from_slice(&pixels[start..start + region.width as usize * bpp]);
    }
    out
}

fn assert_regions_match(fixture: &TiffFixture, regions: &[Region]) {
    let pixels = pattern_u8(fixture.width, fixture.height, fixture.samples_per_pixel);
    let mut adapter = TiffAdapter::from_reader(fixture.cursor(&pixels)).unwrap();

    std::assert_eq!(adapter.width(), fixture.width);
    std::assert_eq!(adapter.height(), fixture.height);
    std::assert_eq!(adapter.channels(), fixture.samples_per_pixel);
    std::assert_eq!(adapter.sample_type(), SampleType::U8);

    for &region in regions {
        let buffer = adapter.fetch(region).unwrap();
        std::assert_eq!(buffer.shape(), (region.height as usize, region.width as usize, fixture.samples_per_pixel as usize));
        std::assert_eq!(
            buffer.as_u8().unwrap(),
            expected_crop(&pixels, fixture.width, fixture.samples_per_pixel as usize, region).as_slice(),
            "{:?} {}",
            fixture.blocks,
            region
        );
    }
}

fn regions_for(width: u32, height: u32) -> Vec<Region> {
    vec![
        Region::full(width, height),
        Region::new(0, 0, 1, 1),
        Region::new(width - 1, height - 1, 1, 1),
        Region::new(5, 3, width / 2, height / 3),
        Region::new(width / 3, height / 2, width - width / 3, height - height / 2),
    ]
}

#[test]
fn test_tiled_uncompressed_rgb() {
    let fixture = TiffFixture::new(100, 70).tiled(32, 16).channels(3);
    assert_regions_match(&fixture, &regions_for(100, 70));
}

#[test]
fn test_stripped_greyscale() {
    let fixture = TiffFixture::new(61, 47).strips(5);
    assert_regions_match(&fixture, &regions_for(61, 47));
}

#[test]
fn test_compressed_blocks() {
    for code in [8u16, 32946, 14, 50000, 32773] {
        let fixture = TiffFixture::new(80, 40).tiled(16, 16).channels(3).compressed(code);
        assert_regions_match(&fixture, &regions_for(80, 40));

        let fixture = TiffFixture::new(80, 40).strips(7).compressed(code);
        assert_regions_match(&fixture, &regions_for(80, 40));
    }
}

#[test]
fn test_predictor_8bit() {
    let fixture = TiffFixture::new(64, 32).tiled(16, 16).channels(3).compressed(8).predicted();
    assert_regions_match(&fixture, &regions_for(64, 32));
}

#[test]
fn test_big_endian_bigtiff() {
    let fixture = TiffFixture::new(50, 50).tiled(16, 16).channels(2).big_endian().big_tiff();
    assert_regions_match(&fixture, &regions_for(50, 50));
}

#[test]
fn test_u16_samples_with_predictor_both_byte_orders() {
    let (width, height) = (20u32, 12u32);
    let values: Vec<u16> = (0..width * height).map(|i| (i * 997 % 65521) as u16).collect();

    for big_endian in [false, true] {
        let mut bytes = Vec::new();
        for &v in &values {
            if big_endian {
                bytes.write_u16::<BigEndian>(v).unwrap();
            } else {
                bytes.write_u16::<LittleEndian>(v).unwrap();
            }
        }

        let mut fixture = TiffFixture::new(width, height).strips(5).samples(16, 1).compressed(14).predicted();
        if big_endian {
            fixture = fixture.big_endian();
        }

        let mut adapter = TiffAdapter::from_reader(fixture.cursor(&bytes)).unwrap();
        std::assert_eq!(adapter.sample_type(), SampleType::U16);

        let buffer = adapter.fetch(Region::full(width, height)).unwrap();
        std::assert_eq!(buffer.data(), &SampleData::U16(values.clone()));

        let part = adapter.fetch(Region::new(3, 4, 2, 2)).unwrap();
        let expected = vec![values[83], values[84], values[103], values[104]];
        std::assert_eq!(part.data(), &SampleData::U16(expected));
    }
}

#[test]
fn test_float_samples() {
    let (width, height) = (8u32, 4u32);
    let values: Vec<f32> = (0..width * height).map(|i| i as f32 * 0.5 - 3.0).collect();
    let mut bytes = Vec::new();
    for &v in &values {
        bytes.write_f32::<LittleEndian>(v).unwrap();
    }

    let fixture = TiffFixture::new(width, height).samples(32, 3).tiled(16, 16);
    let mut adapter = TiffAdapter::from_reader(fixture.cursor(&bytes)).unwrap();

    std::assert_eq!(adapter.sample_type(), SampleType::F32);
    let row = adapter.fetch(Region::new(0, 2, 8, 1)).unwrap();
    std::assert_eq!(row.data(), &SampleData::F32(values[16..24].to_vec()));
}

#[test]
fn test_jpeg_tiles_decode_close_to_source() {
    let (width, height) = (32u32, 32u32);
    let pixels = vec![128u8; (width * height * 3) as usize];
    let fixture = TiffFixture::new(width, height).tiled(16, 16).channels(3).compressed(7);
    let mut adapter = TiffAdapter::from_reader(fixture.cursor(&pixels)).unwrap();

    let buffer = adapter.fetch(Region::new(8, 8, 16, 16)).unwrap();
    for &v in buffer.as_u8().unwrap() {
        std::assert!((v as i32 - 128).abs() <= 3, "sample {}", v);
    }
}

#[test]
fn test_unsupported_layouts_fail_open() {
    // LZW is not decoded
    let mut bytes = TiffFixture::new(8, 8).build(&pattern_u8(8, 8, 1));
    let compression_entry = find_entry(&bytes, 259);
    bytes[compression_entry + 8] = 5;

    match TiffAdapter::from_reader(std::io::Cursor::new(bytes)) {
        Err(RegionError::AdapterIOFailure { adapter, source }) => {
            std::assert_eq!(adapter, "tiff");
            std::assert!(source.to_string().contains("compression"));
        }
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("LZW should be rejected"),
    }

    // Not a TIFF at all
    let result = TiffAdapter::from_reader(std::io::Cursor::new(b"GIF89a..".to_vec()));
    std::assert!(matches!(result, Err(RegionError::AdapterIOFailure { .. })));
}

#[test]
fn test_fetch_outside_image_is_rejected() {
    let fixture = TiffFixture::new(10, 10);
    let mut adapter = TiffAdapter::from_reader(fixture.cursor(&pattern_u8(10, 10, 1))).unwrap();
    std::assert!(matches!(adapter.fetch(Region::new(5, 5, 6, 1)), Err(RegionError::RegionOutOfBounds(_))));
}

/// Byte offset of a classic little-endian IFD entry for `tag`
fn find_entry(file: &[u8], tag: u16) -> usize {
    let ifd = u32::from_le_bytes([file[4], file[5], file[6], file[7]]) as usize;
    let count = u16::from_le_bytes([file[ifd], file[ifd + 1]]) as usize;
    (0..count)
        .map(|i| ifd + 2 + i * 12)
        .find(|&at| u16::from_le_bytes([file[at], file[at + 1]]) == tag)
        .unwrap()
}

#[test]
fn test_layout_and_description() {
    let text = "Aperio Image Library v12.0.5 |AppMag = 20|MPP = 0.499";
    let fixture = TiffFixture::new(40, 30).tiled(16, 16).described(text);
    let adapter = TiffAdapter::from_reader(fixture.cursor(&pattern_u8(40, 30, 1))).unwrap();

    std::assert_eq!(adapter.description(), Some(text));
    std::assert_eq!(adapter.overview_count(), 0);
    std::assert!(adapter.layout().tiled);
    std::assert_eq!(adapter.layout().block_count(), 6);

    let plain = TiffAdapter::from_reader(TiffFixture::new(4, 4).cursor(&pattern_u8(4, 4, 1))).unwrap();
    std::assert_eq!(plain.description(), None);
}

fn assert_layout_rejected(bytes: Vec<u8>) {
    match TiffAdapter::from_reader(std::io::Cursor::new(bytes)) {
        Err(RegionError::AdapterIOFailure { adapter, source }) => {
            std::assert_eq!(adapter, "tiff");
            std::assert!(source.to_string().contains("samples per pixel"));
        }
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(adapter) => panic!("opened with {} channel(s)", adapter.channels()),
    }
}

#[test]
fn test_bad_samples_per_pixel_fail_open() {
    let bytes = TiffFixture::new(8, 8).predicted().build(&pattern_u8(8, 8, 1));

    // SHORT value of zero
    let mut zero = bytes.clone();
    let entry = find_entry(&zero, 277);
    zero[entry + 8..entry + 10].copy_from_slice(&[0, 0]);
    assert_layout_rejected(zero);

    // LONG value that does not fit in 16 bits
    for value in [65536u32, 65537] {
        let mut wide = bytes.clone();
        let entry = find_entry(&wide, 277);
        wide[entry + 2..entry + 4].copy_from_slice(&4u16.to_le_bytes());
        wide[entry + 8..entry + 12].copy_from_slice(&value.to_le_bytes());
        assert_layout_rejected(wide);
    }
}
