//! Pixel buffers returned by adapters
//!
//! A buffer is a row-major, channel-interleaved block of samples with shape
//! `(height, width, channels)`. The sample type is whatever the backend
//! reports; callers must not assume 8-bit data.

use std::fmt;

use image::{DynamicImage, ImageBuffer, Luma, LumaA, Rgb, Rgba};

use crate::errors::{RegionError, RegionResult};
use crate::grid::Region;

/// Numeric type of a single sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
    /// Complex number made of two `f32`
    Complex32,
    /// Complex number made of two `f64`
    Complex64,
}

impl SampleType {
    pub fn name(&self) -> &'static str {
        match self {
            SampleType::U8 => "uint8",
            SampleType::I8 => "int8",
            SampleType::U16 => "uint16",
            SampleType::I16 => "int16",
            SampleType::U32 => "uint32",
            SampleType::I32 => "int32",
            SampleType::F32 => "float32",
            SampleType::F64 => "float64",
            SampleType::Complex32 => "complex64",
            SampleType::Complex64 => "complex128",
        }
    }

    /// Size of one sample in bytes
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 | SampleType::Complex32 => 8,
            SampleType::Complex64 => 16,
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed sample storage
#[derive(Debug, Clone, PartialEq)]
pub enum SampleData {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Complex32(Vec<[f32; 2]>),
    Complex64(Vec<[f64; 2]>),
}

/// Apply the same expression to whichever vector a `SampleData` holds
macro_rules! map_samples {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            SampleData::U8($v) => SampleData::U8($body),
            SampleData::I8($v) => SampleData::I8($body),
            SampleData::U16($v) => SampleData::U16($body),
            SampleData::I16($v) => SampleData::I16($body),
            SampleData::U32($v) => SampleData::U32($body),
            SampleData::I32($v) => SampleData::I32($body),
            SampleData::F32($v) => SampleData::F32($body),
            SampleData::F64($v) => SampleData::F64($body),
            SampleData::Complex32($v) => SampleData::Complex32($body),
            SampleData::Complex64($v) => SampleData::Complex64($body),
        }
    };
}

impl SampleData {
    pub fn sample_type(&self) -> SampleType {
        match self {
            SampleData::U8(_) => SampleType::U8,
            SampleData::I8(_) => SampleType::I8,
            SampleData::U16(_) => SampleType::U16,
            SampleData::I16(_) => SampleType::I16,
            SampleData::U32(_) => SampleType::U32,
            SampleData::I32(_) => SampleType::I32,
            SampleData::F32(_) => SampleType::F32,
            SampleData::F64(_) => SampleType::F64,
            SampleData::Complex32(_) => SampleType::Complex32,
            SampleData::Complex64(_) => SampleType::Complex64,
        }
    }

    /// Number of samples held
    pub fn len(&self) -> usize {
        match self {
            SampleData::U8(v) => v.len(),
            SampleData::I8(v) => v.len(),
            SampleData::U16(v) => v.len(),
            SampleData::I16(v) => v.len(),
            SampleData::U32(v) => v.len(),
            SampleData::I32(v) => v.len(),
            SampleData::F32(v) => v.len(),
            SampleData::F64(v) => v.len(),
            SampleData::Complex32(v) => v.len(),
            SampleData::Complex64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Copy a sub-rectangle out of a row-major interleaved sample vector
fn crop_samples<T: Copy>(samples: &[T], row_len: usize, channels: usize, region: &Region) -> Vec<T> {
    let span = region.width as usize * channels;
    let mut out = Vec::with_capacity(span * region.height as usize);

    for y in region.y as usize..region.end_y() as usize {
        let start = y * row_len + region.x as usize * channels;
        out.extend_from_slice(&samples[start..start + span]);
    }

    out
}

/// Rectangular block of pixels with an adapter-defined sample type
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u16,
    data: SampleData,
}

impl PixelBuffer {
    /// Create a buffer, checking that the sample count matches the shape
    pub fn new(width: u32, height: u32, channels: u16, data: SampleData) -> RegionResult<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(RegionError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(PixelBuffer {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Shape as (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, self.channels as usize)
    }

    pub fn sample_type(&self) -> SampleType {
        self.data.sample_type()
    }

    pub fn data(&self) -> &SampleData {
        &self.data
    }

    pub fn into_data(self) -> SampleData {
        self.data
    }

    /// Borrow the samples as bytes when the buffer holds 8-bit unsigned data
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.data {
            SampleData::U8(v) => Some(v),
            _ => None,
        }
    }

    /// Copy out a sub-rectangle of this buffer
    ///
    /// Fails with `RegionOutOfBounds` if the region does not fit the buffer.
    pub fn crop(&self, region: &Region) -> RegionResult<PixelBuffer> {
        if !region.fits_within(self.width, self.height) {
            return Err(RegionError::RegionOutOfBounds(format!(
                "crop {} outside {}x{} buffer",
                region, self.width, self.height
            )));
        }

        let channels = self.channels as usize;
        let row_len = self.width as usize * channels;
        let data = map_samples!(&self.data, v => crop_samples(v, row_len, channels, region));

        PixelBuffer::new(region.width, region.height, self.channels, data)
    }

    /// Take ownership of a decoded image, keeping its native sample type
    pub fn from_dynamic_image(image: DynamicImage) -> PixelBuffer {
        let (width, height) = (image.width(), image.height());
        let (channels, data) = match image {
            DynamicImage::ImageLuma8(buf) => (1, SampleData::U8(buf.into_raw())),
            DynamicImage::ImageLumaA8(buf) => (2, SampleData::U8(buf.into_raw())),
            DynamicImage::ImageRgb8(buf) => (3, SampleData::U8(buf.into_raw())),
            DynamicImage::ImageRgba8(buf) => (4, SampleData::U8(buf.into_raw())),
            DynamicImage::ImageLuma16(buf) => (1, SampleData::U16(buf.into_raw())),
            DynamicImage::ImageLumaA16(buf) => (2, SampleData::U16(buf.into_raw())),
            DynamicImage::ImageRgb16(buf) => (3, SampleData::U16(buf.into_raw())),
            DynamicImage::ImageRgba16(buf) => (4, SampleData::U16(buf.into_raw())),
            DynamicImage::ImageRgb32F(buf) => (3, SampleData::F32(buf.into_raw())),
            DynamicImage::ImageRgba32F(buf) => (4, SampleData::F32(buf.into_raw())),
            other => (4, SampleData::U8(other.to_rgba8().into_raw())),
        };

        PixelBuffer {
            width,
            height,
            channels,
            data,
        }
    }

    /// Convert into an `image` crate image for encoding to common formats
    ///
    /// Only 8/16-bit unsigned data with 1-4 channels and 32-bit float RGB(A)
    /// have an `image` representation; anything else is `NotSupported`.
    pub fn to_dynamic_image(&self) -> RegionResult<DynamicImage> {
        let (w, h) = (self.width, self.height);
        let image = match (&self.data, self.channels) {
            (SampleData::U8(v), 1) => ImageBuffer::<Luma<u8>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageLuma8),
            (SampleData::U8(v), 2) => ImageBuffer::<LumaA<u8>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageLumaA8),
            (SampleData::U8(v), 3) => ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageRgb8),
            (SampleData::U8(v), 4) => ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageRgba8),
            (SampleData::U16(v), 1) => ImageBuffer::<Luma<u16>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageLuma16),
            (SampleData::U16(v), 2) => ImageBuffer::<LumaA<u16>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageLumaA16),
            (SampleData::U16(v), 3) => ImageBuffer::<Rgb<u16>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageRgb16),
            (SampleData::U16(v), 4) => ImageBuffer::<Rgba<u16>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageRgba16),
            (SampleData::F32(v), 3) => ImageBuffer::<Rgb<f32>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageRgb32F),
            (SampleData::F32(v), 4) => ImageBuffer::<Rgba<f32>, _>::from_raw(w, h, v.clone()).map(DynamicImage::ImageRgba32F),
            _ => None,
        };

        image.ok_or_else(|| {
            RegionError::NotSupported(format!(
                "{} buffer with {} channel(s) has no image representation",
                self.sample_type(),
                self.channels
            ))
        })
    }
}
