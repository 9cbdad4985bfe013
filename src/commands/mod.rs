//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod info_command;
pub mod extract_command;
pub mod export_command;

pub use command_traits::{Command, CommandFactory};
pub use info_command::InfoCommand;
pub use extract_command::ExtractCommand;
pub use export_command::ExportCommand;

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};

use crate::api::RegionKit;
use crate::errors::{RegionError, RegionResult};
use crate::grid::TileDims;

/// Command-line definition of the `regionkit` tool
pub fn cli_definition() -> ClapCommand {
    ClapCommand::new("regionkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read tiles and regions of very large raster images")
        .arg(
            Arg::new("input")
                .help("Input image file, or directory with --directory")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .help("Show image and tile grid information (default)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("extract")
                .short('e')
                .long("extract")
                .help("Extract one region to an image file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("index")
                .long("index")
                .help("Linear tile index of the region to extract")
                .value_name("N")
                .allow_negative_numbers(true)
                .conflicts_with("coordinate"),
        )
        .arg(
            Arg::new("coordinate")
                .long("coordinate")
                .help("Top-left pixel of the region to extract in 'x,y' format")
                .value_name("X,Y"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output image file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .help("Write every tile as tile_NNNNNN.png into this directory")
                .value_name("DIR")
                .conflicts_with("extract"),
        )
        .arg(
            Arg::new("tile")
                .short('t')
                .long("tile")
                .help("Tile size as WxH (or a single number for square tiles)")
                .value_name("WxH"),
        )
        .arg(
            Arg::new("edge-policy")
                .long("edge-policy")
                .help("Partial edge tiles: clip (default) or drop")
                .value_name("POLICY"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Format token to use instead of the file extension")
                .value_name("TOKEN"),
        )
        .arg(
            Arg::new("directory")
                .short('d')
                .long("directory")
                .help("Treat INPUT as a directory with one image per tile")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .help("Regular expression file names must match in directory mode")
                .value_name("REGEX")
                .requires("directory"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML configuration file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log output to this file instead of the console")
                .value_name("FILE"),
        )
}

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct RegionkitCommandFactory;

impl RegionkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        RegionkitCommandFactory
    }
}

impl Default for RegionkitCommandFactory {
    fn default() -> Self {
        RegionkitCommandFactory::new()
    }
}

impl<'a> CommandFactory<'a> for RegionkitCommandFactory {
    fn create_command(&self, args: &ArgMatches, api: &'a RegionKit) -> RegionResult<Box<dyn Command + 'a>> {
        if args.get_flag("extract") {
            Ok(Box::new(ExtractCommand::new(args, api)?))
        } else if args.get_one::<String>("export").is_some() {
            Ok(Box::new(ExportCommand::new(args, api)?))
        } else {
            // Default to the info command
            Ok(Box::new(InfoCommand::new(args, api)?))
        }
    }
}

/// Arguments every command shares
#[derive(Debug, Clone)]
pub(crate) struct InputArgs {
    pub path: PathBuf,
    pub format: Option<String>,
    pub directory: bool,
    pub pattern: Option<String>,
    pub dims: TileDims,
}

impl InputArgs {
    pub fn from_matches(args: &ArgMatches, api: &RegionKit) -> RegionResult<Self> {
        let path = args
            .get_one::<String>("input")
            .map(PathBuf::from)
            .ok_or_else(|| RegionError::InvalidConfig("Missing input path".to_string()))?;

        let dims = match args.get_one::<String>("tile") {
            Some(text) => text.parse::<TileDims>()?,
            None => api.settings().reader.default_dims,
        };

        Ok(InputArgs {
            path,
            format: args.get_one::<String>("format").cloned(),
            directory: args.get_flag("directory"),
            pattern: args.get_one::<String>("pattern").cloned(),
            dims,
        })
    }
}
