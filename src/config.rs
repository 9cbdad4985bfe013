//! Runtime configuration
//!
//! Settings come from an optional TOML file; command-line flags override
//! whatever the file sets.
//!
//! ```toml
//! [tiles]
//! width = 512
//! height = 512
//! edge_policy = "clip"
//!
//! [logging]
//! level = "info"
//! file = "regionkit.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, LevelFilter};

use crate::errors::{RegionError, RegionResult};
use crate::grid::{EdgePolicy, TileDims};

/// Addressing defaults for a region reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReaderConfig {
    /// Tile size used by the `*_default` operations
    pub default_dims: TileDims,
    /// How index addressing treats partial edge tiles
    pub edge_policy: EdgePolicy,
}

impl ReaderConfig {
    pub fn new(default_dims: TileDims, edge_policy: EdgePolicy) -> Self {
        ReaderConfig {
            default_dims,
            edge_policy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    /// Write log records to this file instead of the console
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LevelFilter::Info,
            file: None,
        }
    }
}

/// Everything a configuration file can set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    pub reader: ReaderConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Parse settings from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> RegionResult<Self> {
        let value: toml::Value = content
            .parse()
            .map_err(|e| RegionError::InvalidConfig(format!("Failed to parse TOML: {}", e)))?;

        let mut settings = Settings::default();

        if let Some(tiles) = value.get("tiles") {
            let tiles = tiles
                .as_table()
                .ok_or_else(|| RegionError::InvalidConfig("[tiles] must be a table".to_string()))?;

            let (default_w, default_h) = settings.reader.default_dims.as_tuple();
            let width = read_integer(tiles, "tiles", "width")?.unwrap_or(default_w as i64);
            let height = read_integer(tiles, "tiles", "height")?.unwrap_or(default_h as i64);
            settings.reader.default_dims = TileDims::new(width, height)?;

            if let Some(policy) = read_string(tiles, "tiles", "edge_policy")? {
                settings.reader.edge_policy = policy.parse()?;
            }
        }

        if let Some(logging) = value.get("logging") {
            let logging = logging
                .as_table()
                .ok_or_else(|| RegionError::InvalidConfig("[logging] must be a table".to_string()))?;

            if let Some(level) = read_string(logging, "logging", "level")? {
                settings.logging.level = level
                    .parse()
                    .map_err(|_| RegionError::InvalidConfig(format!("unknown log level '{}'", level)))?;
            }
            if let Some(file) = read_string(logging, "logging", "file")? {
                settings.logging.file = Some(PathBuf::from(file));
            }
        }

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> RegionResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

fn read_integer(table: &toml::value::Table, section: &str, key: &str) -> RegionResult<Option<i64>> {
    match table.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_integer()
            .map(Some)
            .ok_or_else(|| RegionError::InvalidConfig(format!("{}.{} must be an integer", section, key))),
    }
}

fn read_string<'a>(table: &'a toml::value::Table, section: &str, key: &str) -> RegionResult<Option<&'a str>> {
    match table.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| RegionError::InvalidConfig(format!("{}.{} must be a string", section, key))),
    }
}
