//! Backend adapters and format dispatch
//!
//! A backend adapter wraps one native way of reading pixels; the format
//! registry maps a file's extension to the adapter that opens it.

mod handler;
mod buffer;
mod registry;
mod memory_adapter;
mod image_adapter;
mod tiff_adapter;
#[cfg(test)]
mod tests;

pub use handler::BackendAdapter;
pub use buffer::{PixelBuffer, SampleData, SampleType};
pub use registry::{format_token, AdapterConstructor, FormatRegistry};
pub use memory_adapter::MemoryAdapter;
pub use image_adapter::ImageCrateAdapter;
pub use tiff_adapter::TiffAdapter;
