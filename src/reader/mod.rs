//! Region readers
//!
//! The facade that turns region identifiers into pixel buffers, the
//! aggregate-directory reader that serves one file per tile, and the
//! sequential iterator that walks either of them.

mod source;
mod region_reader;
mod iterator;
mod directory;
#[cfg(test)]
mod tests;

pub use source::RegionSource;
pub use region_reader::{AdapterOverride, RegionReader};
pub use iterator::{IteratorState, TileIterator};
pub use directory::DirectoryReader;
