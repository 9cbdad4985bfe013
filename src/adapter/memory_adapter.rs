//! Adapter over a pixel buffer already held in memory

use log::debug;

use crate::errors::RegionResult;
use crate::grid::Region;

use super::buffer::{PixelBuffer, SampleType};
use super::handler::BackendAdapter;

/// Serves crops of an in-memory buffer
///
/// Not reachable through extension dispatch; pass it explicitly as an
/// adapter override or to `RegionReader::from_adapter`.
pub struct MemoryAdapter {
    buffer: PixelBuffer,
}

impl MemoryAdapter {
    pub fn new(buffer: PixelBuffer) -> Self {
        MemoryAdapter { buffer }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }
}

impl BackendAdapter for MemoryAdapter {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn width(&self) -> u32 {
        self.buffer.width()
    }

    fn height(&self) -> u32 {
        self.buffer.height()
    }

    fn channels(&self) -> u16 {
        self.buffer.channels()
    }

    fn sample_type(&self) -> SampleType {
        self.buffer.sample_type()
    }

    fn fetch(&mut self, region: Region) -> RegionResult<PixelBuffer> {
        debug!("Memory adapter fetching {}", region);
        self.buffer.crop(&region)
    }
}
