//! Backend adapter trait definition

use crate::errors::RegionResult;
use crate::grid::Region;

use super::buffer::{PixelBuffer, SampleType};

/// Strategy trait wrapping one native imaging capability
///
/// An adapter owns whatever native handle it needs for the lifetime of the
/// value; dropping the adapter releases it. Fetches take `&mut self`, so one
/// handle never serves two operations at once.
pub trait BackendAdapter: Send {
    /// Short name used in logs and `AdapterIOFailure` errors
    fn name(&self) -> &'static str;

    /// Image width in pixels
    fn width(&self) -> u32;

    /// Image height in pixels
    fn height(&self) -> u32;

    /// Samples per pixel
    fn channels(&self) -> u16;

    /// Sample type of the buffers returned by `fetch`
    fn sample_type(&self) -> SampleType;

    /// Read a rectangle that has already been validated against the image
    ///
    /// The returned buffer has shape `(region.height, region.width, channels)`.
    fn fetch(&mut self, region: Region) -> RegionResult<PixelBuffer>;
}
