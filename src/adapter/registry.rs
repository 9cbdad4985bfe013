//! Format registry
//!
//! Process-wide, read-only mapping from a lowercase format token (the file
//! name's last extension) to an adapter constructor. The table is built once
//! on first use and never changes afterwards.

use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use log::{debug, info};

use crate::errors::{RegionError, RegionResult};

use super::handler::BackendAdapter;
use super::image_adapter::ImageCrateAdapter;
use super::tiff_adapter::TiffAdapter;

/// Function that opens an image file and returns its adapter
pub type AdapterConstructor = fn(&Path) -> RegionResult<Box<dyn BackendAdapter>>;

lazy_static! {
    static ref REGISTRY: FormatRegistry = FormatRegistry::with_builtin_adapters();
}

/// Token -> constructor table
pub struct FormatRegistry {
    constructors: HashMap<&'static str, AdapterConstructor>,
}

impl FormatRegistry {
    fn with_builtin_adapters() -> Self {
        let mut registry = FormatRegistry {
            constructors: HashMap::new(),
        };

        for token in ["tif", "tiff", "svs"] {
            registry.register(token, TiffAdapter::create);
        }
        for token in ["png", "jpg", "jpeg", "bmp", "gif", "webp", "tga", "pnm", "pgm", "ppm"] {
            registry.register(token, ImageCrateAdapter::create);
        }

        debug!("Format registry initialised with {} tokens", registry.constructors.len());
        registry
    }

    fn register(&mut self, token: &'static str, constructor: AdapterConstructor) {
        self.constructors.insert(token, constructor);
    }

    /// The process-wide registry
    pub fn global() -> &'static FormatRegistry {
        &REGISTRY
    }

    /// Constructor registered for `token`
    ///
    /// Lookup is case-insensitive; a miss fails with `UnsupportedFormat`.
    pub fn lookup(&self, token: &str) -> RegionResult<AdapterConstructor> {
        let token = token.to_lowercase();
        self.constructors
            .get(token.as_str())
            .copied()
            .ok_or(RegionError::UnsupportedFormat(token))
    }

    pub fn supports(&self, token: &str) -> bool {
        self.constructors.contains_key(token.to_lowercase().as_str())
    }

    /// Open `path` with the adapter registered for its extension
    pub fn create(&self, path: &Path) -> RegionResult<Box<dyn BackendAdapter>> {
        self.create_for_token(&format_token(path), path)
    }

    /// Open `path` with the adapter registered for an explicit token
    pub fn create_for_token(&self, token: &str, path: &Path) -> RegionResult<Box<dyn BackendAdapter>> {
        let constructor = self.lookup(token)?;
        let adapter = constructor(path)?;

        info!("Opened {} with '{}' adapter ({}x{}, {} channel(s), {})",
              path.display(), adapter.name(), adapter.width(), adapter.height(),
              adapter.channels(), adapter.sample_type());

        Ok(adapter)
    }

    /// All registered tokens, sorted
    pub fn formats(&self) -> Vec<&'static str> {
        let mut tokens: Vec<&'static str> = self.constructors.keys().copied().collect();
        tokens.sort_unstable();
        tokens
    }
}

/// Lowercase text after the last '.' of the file name, or "" if there is none
pub fn format_token(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}
