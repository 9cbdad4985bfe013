use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{info, warn};
use regex::Regex;

use crate::adapter::PixelBuffer;
use crate::config::Settings;
use crate::errors::{RegionError, RegionResult};
use crate::grid::{RegionIdentifier, TileDims};
use crate::reader::{AdapterOverride, DirectoryReader, IteratorState, RegionReader, RegionSource, TileIterator};
use crate::tiff::TiffReader;
use crate::utils::progress::ProgressTracker;

/// Outcome of a tile export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSummary {
    /// Tiles written to disk
    pub written: u64,
    /// Tiles that could not be read or encoded
    pub failed: u64,
}

/// Main interface to the RegionKit library
///
/// Bundles the loaded settings with the operations the command line tool
/// offers, so they can be used from other programs as well.
#[derive(Debug, Clone, Default)]
pub struct RegionKit {
    settings: Settings,
}

impl RegionKit {
    pub fn new(settings: Settings) -> Self {
        RegionKit { settings }
    }

    /// Load settings from a TOML file
    pub fn from_config_file(path: &Path) -> RegionResult<Self> {
        Ok(RegionKit::new(Settings::from_file(path)?))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Open an image with the configured addressing defaults
    ///
    /// # Arguments
    /// * `path` - Image file
    /// * `format` - Explicit format token; the extension is used when `None`
    pub fn open(&self, path: &Path, format: Option<&str>) -> RegionResult<RegionReader> {
        let adapter = format.map(|token| AdapterOverride::Format(token.to_string()));
        Ok(RegionReader::open_with(path, adapter)?.with_config(self.settings.reader))
    }

    /// Open a directory of images, optionally filtered by a file name regex
    pub fn open_directory(&self, dir: &Path, pattern: Option<&str>) -> RegionResult<DirectoryReader> {
        match pattern {
            Some(pattern) => {
                let regex = Regex::new(pattern)
                    .map_err(|e| RegionError::InvalidConfig(format!("Invalid file pattern '{}': {}", pattern, e)))?;
                DirectoryReader::open_matching(dir, &regex)
            }
            None => DirectoryReader::open(dir),
        }
    }

    /// Human-readable summary of an image and its tile grid
    ///
    /// # Arguments
    /// * `path` - Image file
    /// * `format` - Explicit format token, if any
    /// * `dims` - Tile size the grid is computed for
    /// * `structure` - Also list the container structure of TIFF files
    pub fn describe(&self, path: &Path, format: Option<&str>, dims: TileDims, structure: bool) -> RegionResult<String> {
        let reader = self.open(path, format)?;
        let grid = reader.grid(dims);

        let mut result = String::from("Image Summary:\n");
        result.push_str(&format!("  File: {}\n", path.display()));
        result.push_str(&format!("  Adapter: {}\n", reader.adapter_name()));
        result.push_str(&format!("  Dimensions: {}x{}\n", reader.width(), reader.height()));
        result.push_str(&format!("  Channels: {}\n", reader.channels()));
        result.push_str(&format!("  Sample type: {}\n", reader.sample_type()));
        result.push_str(&format!("  Tile size: {} ({})\n", dims, grid.policy()));
        result.push_str(&format!(
            "  Grid: {} columns x {} rows = {} regions\n",
            grid.columns(),
            grid.rows(),
            grid.total()
        ));

        if structure && reader.adapter_name() == "tiff" {
            result.push('\n');
            result.push_str(&self.tiff_structure(path)?);
        }

        Ok(result)
    }

    /// Summary of an aggregate directory
    pub fn describe_directory(&self, dir: &Path, pattern: Option<&str>) -> RegionResult<String> {
        let reader = self.open_directory(dir, pattern)?;

        let mut result = String::from("Directory Summary:\n");
        result.push_str(&format!("  Directory: {}\n", dir.display()));
        result.push_str(&format!("  Regions: {}\n", reader.len()));
        for (i, file) in reader.files().iter().enumerate() {
            result.push_str(&format!("    {}: {}\n", i, file.display()));
        }

        Ok(result)
    }

    /// IFD listing of a TIFF file
    pub fn tiff_structure(&self, path: &Path) -> RegionResult<String> {
        let file = File::open(path)?;
        let mut source = BufReader::new(file);
        let tiff = TiffReader::new()
            .read(&mut source)
            .map_err(|e| RegionError::adapter("tiff", e))?;
        Ok(tiff.to_string())
    }

    /// Save one region of an image as an image file
    ///
    /// The output format follows the extension of `output`.
    pub fn extract_to_file(&self,
                           path: &Path,
                           format: Option<&str>,
                           identifier: RegionIdentifier,
                           dims: TileDims,
                           output: &Path) -> RegionResult<()> {
        let mut reader = self.open(path, format)?;
        let region = reader.resolve(identifier, dims)?;
        let buffer = reader.fetch_region(region)?;

        save_buffer(&buffer, output)?;
        info!("Saved {} of {} to {}", region, path.display(), output.display());
        Ok(())
    }

    /// Save one file of an aggregate directory, by index
    pub fn extract_directory_tile(&self,
                                  dir: &Path,
                                  pattern: Option<&str>,
                                  index: i64,
                                  output: &Path) -> RegionResult<()> {
        let mut reader = self.open_directory(dir, pattern)?;
        let buffer = reader.get_region(RegionIdentifier::Index(index), TileDims::DEFAULT)?;
        save_buffer(&buffer, output)?;
        info!("Saved directory tile {} to {}", index, output.display());
        Ok(())
    }

    /// Write every tile of an image as `tile_NNNNNN.png` into `out_dir`
    pub fn export_tiles(&self,
                        path: &Path,
                        format: Option<&str>,
                        dims: TileDims,
                        out_dir: &Path,
                        show_progress: bool) -> RegionResult<ExportSummary> {
        let mut reader = self.open(path, format)?;
        let total = reader.number_of_regions(dims);
        info!("Exporting {} tile(s) of {} to {}", total, path.display(), out_dir.display());

        let tiles = reader.tiles(dims);
        export_all(tiles, total, out_dir, show_progress)
    }

    /// Write every file of an aggregate directory as `tile_NNNNNN.png`
    pub fn export_directory(&self,
                            dir: &Path,
                            pattern: Option<&str>,
                            out_dir: &Path,
                            show_progress: bool) -> RegionResult<ExportSummary> {
        let mut reader = self.open_directory(dir, pattern)?;
        let total = reader.len() as u64;
        info!("Exporting {} directory tile(s) to {}", total, out_dir.display());

        let tiles = reader.tiles();
        export_all(tiles, total, out_dir, show_progress)
    }
}

/// Output path of tile `index` inside `out_dir`
pub fn tile_file_name(out_dir: &Path, index: u64) -> PathBuf {
    out_dir.join(format!("tile_{:06}.png", index))
}

fn save_buffer(buffer: &PixelBuffer, output: &Path) -> RegionResult<()> {
    let image = buffer.to_dynamic_image()?;
    image.save(output).map_err(|e| RegionError::adapter("image", e))
}

fn export_all<S: RegionSource + ?Sized>(mut tiles: TileIterator<'_, S>,
                                        total: u64,
                                        out_dir: &Path,
                                        show_progress: bool) -> RegionResult<ExportSummary> {
    fs::create_dir_all(out_dir)?;

    let progress = if show_progress {
        ProgressTracker::new(total, "Exporting tiles")
    } else {
        ProgressTracker::hidden()
    };
    let mut summary = ExportSummary::default();

    loop {
        let index = tiles.position();
        let outcome = match tiles.advance() {
            Ok(None) => break,
            Ok(Some(buffer)) => save_buffer(&buffer, &tile_file_name(out_dir, index)),
            // The tile count itself could not be determined
            Err(e) if tiles.state() == IteratorState::Exhausted => return Err(e),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => summary.written += 1,
            Err(e) => {
                warn!("Skipping tile {}: {}", index, e);
                summary.failed += 1;
            }
        }
        progress.increment(1);
    }

    progress.finish();
    info!("Export finished: {} written, {} failed", summary.written, summary.failed);
    Ok(summary)
}
