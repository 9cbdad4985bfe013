//! Error types for region addressing and adapter dispatch
//!
//! Every failure of the core is a single-call failure: it is raised at the
//! violated precondition and carries enough context for the caller to decide
//! whether to skip a tile, abort an iteration, or give up on the image.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised by the region reader, its adapters and the tile grid
#[derive(Debug)]
pub enum RegionError {
    /// No adapter is registered for this format token
    UnsupportedFormat(String),
    /// A tile dimension was zero or negative
    InvalidDimensions { width: i64, height: i64 },
    /// A coordinate identifier did not have exactly two components
    InvalidCoordinates(String),
    /// A region identifier was neither an index nor a coordinate pair
    InvalidIdentifier(String),
    /// The requested region would read outside the image
    RegionOutOfBounds(String),
    /// The operation has no meaning for this reader variant
    NotSupported(String),
    /// The backend failed to open or fetch; the backend error is kept as the source
    AdapterIOFailure {
        adapter: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    /// The image path does not exist
    FileNotFound(PathBuf),
    /// The image path exists but is not a regular file
    NotAFile(PathBuf),
    /// `advance` was called on an iterator that already reported the end
    IteratorExhausted,
    /// A pixel buffer's sample count does not match its shape
    BufferSizeMismatch { expected: usize, actual: usize },
    /// A configuration file or value could not be understood
    InvalidConfig(String),
    /// I/O outside any adapter (output files, directory listing)
    Io(io::Error),
}

impl RegionError {
    /// Wrap a backend error, naming the adapter it came from
    pub fn adapter<E>(adapter: &'static str, error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        RegionError::AdapterIOFailure {
            adapter,
            source: error.into(),
        }
    }
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionError::UnsupportedFormat(token) => write!(f, "Unsupported format: '{}'", token),
            RegionError::InvalidDimensions { width, height } => {
                write!(f, "Invalid region dimensions: {}x{} (both must be > 0)", width, height)
            }
            RegionError::InvalidCoordinates(c) => write!(f, "Invalid coordinates: {}", c),
            RegionError::InvalidIdentifier(id) => write!(f, "Invalid region identifier: {}", id),
            RegionError::RegionOutOfBounds(msg) => write!(f, "Region out of bounds: {}", msg),
            RegionError::NotSupported(op) => write!(f, "Not supported: {}", op),
            RegionError::AdapterIOFailure { adapter, source } => {
                write!(f, "Adapter '{}' failed: {}", adapter, source)
            }
            RegionError::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            RegionError::NotAFile(path) => write!(f, "Not a file: {}", path.display()),
            RegionError::IteratorExhausted => write!(f, "Tile iterator is already exhausted"),
            RegionError::BufferSizeMismatch { expected, actual } => {
                write!(f, "Pixel buffer size mismatch: expected {} samples, got {}", expected, actual)
            }
            RegionError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            RegionError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for RegionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RegionError::AdapterIOFailure { source, .. } => Some(source.as_ref()),
            RegionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RegionError {
    fn from(error: io::Error) -> Self {
        RegionError::Io(error)
    }
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
