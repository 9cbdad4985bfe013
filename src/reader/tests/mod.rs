mod iterator_tests;

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};

use crate::adapter::{MemoryAdapter, PixelBuffer, SampleData};
use crate::reader::RegionReader;

/// Reader over a single-channel image whose sample value is its pixel index
pub(super) fn indexed_reader(width: u32, height: u32) -> RegionReader {
    let samples = (0..width * height).collect();
    let buffer = PixelBuffer::new(width, height, 1, SampleData::U32(samples)).unwrap();
    RegionReader::from_adapter(Box::new(MemoryAdapter::new(buffer)))
}

/// First sample of a buffer produced by `indexed_reader`
pub(super) fn first_sample(buffer: &PixelBuffer) -> u32 {
    match buffer.data() {
        SampleData::U32(v) => v[0],
        other => panic!("unexpected samples {:?}", other.sample_type()),
    }
}

/// Write a greyscale PNG filled with `value`
pub(super) fn write_png(dir: &Path, name: &str, width: u32, height: u32, value: u8) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_pixel(width, height, Luma([value])).save_with_format(&path, image::ImageFormat::Png).unwrap();
    path
}
