//! Tile export command

use std::path::PathBuf;

use clap::ArgMatches;
use log::{info, warn};

use crate::api::RegionKit;
use crate::commands::command_traits::Command;
use crate::commands::InputArgs;
use crate::errors::{RegionError, RegionResult};

/// Writes every tile of an image, or every file of a directory, as PNG
pub struct ExportCommand<'a> {
    input: InputArgs,
    out_dir: PathBuf,
    api: &'a RegionKit,
}

impl<'a> ExportCommand<'a> {
    pub fn new(args: &ArgMatches, api: &'a RegionKit) -> RegionResult<Self> {
        let out_dir = args
            .get_one::<String>("export")
            .map(PathBuf::from)
            .ok_or_else(|| RegionError::InvalidConfig("Missing export directory".to_string()))?;

        Ok(ExportCommand {
            input: InputArgs::from_matches(args, api)?,
            out_dir,
            api,
        })
    }
}

impl<'a> Command for ExportCommand<'a> {
    fn execute(&self) -> RegionResult<()> {
        let input = &self.input;
        info!("Exporting tiles of {} into {}", input.path.display(), self.out_dir.display());

        let summary = if input.directory {
            self.api.export_directory(&input.path, input.pattern.as_deref(), &self.out_dir, true)?
        } else {
            self.api.export_tiles(&input.path, input.format.as_deref(), input.dims, &self.out_dir, true)?
        };

        if summary.failed > 0 {
            warn!("{} tile(s) could not be exported", summary.failed);
        }
        println!("Exported {} tile(s) to {} ({} failed)", summary.written, self.out_dir.display(), summary.failed);
        Ok(())
    }
}
