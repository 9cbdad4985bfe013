//! Adapter for common single-frame formats decoded with the `image` crate

use std::path::Path;

use image::ImageReader;
use log::{debug, info};

use crate::errors::{RegionError, RegionResult};
use crate::grid::Region;

use super::buffer::{PixelBuffer, SampleType};
use super::handler::BackendAdapter;

const ADAPTER_NAME: &str = "image";

/// Decodes the whole image once on open and serves crops from memory
///
/// PNG, JPEG, BMP and friends have no tiled random access, so this adapter
/// is only suitable for images that fit in memory.
pub struct ImageCrateAdapter {
    pixels: PixelBuffer,
}

impl ImageCrateAdapter {
    /// Open and decode an image file
    pub fn open(path: &Path) -> RegionResult<Self> {
        info!("Decoding {} with the image crate", path.display());

        let reader = ImageReader::open(path)
            .map_err(|e| RegionError::adapter(ADAPTER_NAME, e))?
            .with_guessed_format()
            .map_err(|e| RegionError::adapter(ADAPTER_NAME, e))?;

        let decoded = reader.decode().map_err(|e| RegionError::adapter(ADAPTER_NAME, e))?;
        let pixels = PixelBuffer::from_dynamic_image(decoded);

        debug!("Decoded {}x{} image with {} channel(s) of {}",
               pixels.width(), pixels.height(), pixels.channels(), pixels.sample_type());

        Ok(ImageCrateAdapter { pixels })
    }

    /// Registry constructor
    pub fn create(path: &Path) -> RegionResult<Box<dyn BackendAdapter>> {
        Ok(Box::new(ImageCrateAdapter::open(path)?))
    }
}

impl BackendAdapter for ImageCrateAdapter {
    fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn channels(&self) -> u16 {
        self.pixels.channels()
    }

    fn sample_type(&self) -> SampleType {
        self.pixels.sample_type()
    }

    fn fetch(&mut self, region: Region) -> RegionResult<PixelBuffer> {
        self.pixels.crop(&region)
    }
}
