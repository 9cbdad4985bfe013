//! Region extraction command
//!
//! Saves a single region, addressed by tile index or by top-left pixel
//! coordinate, as an image file.

use std::path::PathBuf;

use clap::ArgMatches;
use log::info;

use crate::api::RegionKit;
use crate::commands::command_traits::Command;
use crate::commands::InputArgs;
use crate::errors::{RegionError, RegionResult};
use crate::grid::RegionIdentifier;

/// Command for extracting one region to a file
pub struct ExtractCommand<'a> {
    input: InputArgs,
    identifier: RegionIdentifier,
    output: PathBuf,
    api: &'a RegionKit,
}

impl<'a> ExtractCommand<'a> {
    /// Create a new extract command
    ///
    /// Exactly one of `--index` and `--coordinate` selects the region;
    /// `--output` is required.
    pub fn new(args: &ArgMatches, api: &'a RegionKit) -> RegionResult<Self> {
        let input = InputArgs::from_matches(args, api)?;

        let identifier = match (args.get_one::<String>("index"), args.get_one::<String>("coordinate")) {
            (Some(index), None) => index
                .trim()
                .parse::<i64>()
                .map(RegionIdentifier::Index)
                .map_err(|_| RegionError::InvalidIdentifier(index.clone()))?,
            (None, Some(coordinate)) => {
                let identifier = coordinate.parse::<RegionIdentifier>()?;
                if identifier.is_index() {
                    return Err(RegionError::InvalidCoordinates(coordinate.clone()));
                }
                identifier
            }
            _ => {
                return Err(RegionError::InvalidConfig(
                    "Extraction needs exactly one of --index or --coordinate".to_string(),
                ))
            }
        };

        let output = args
            .get_one::<String>("output")
            .map(PathBuf::from)
            .ok_or_else(|| RegionError::InvalidConfig("Missing output file path for extraction".to_string()))?;

        info!("Extracting {} of {} to {}", identifier, input.path.display(), output.display());

        Ok(ExtractCommand {
            input,
            identifier,
            output,
            api,
        })
    }
}

impl<'a> Command for ExtractCommand<'a> {
    fn execute(&self) -> RegionResult<()> {
        let input = &self.input;

        if input.directory {
            let index = match self.identifier {
                RegionIdentifier::Index(index) => index,
                RegionIdentifier::Coordinate(..) => {
                    return Err(RegionError::NotSupported(
                        "coordinate identifiers on a directory reader".to_string(),
                    ))
                }
            };
            self.api
                .extract_directory_tile(&input.path, input.pattern.as_deref(), index, &self.output)?;
        } else {
            self.api.extract_to_file(&input.path,
                                     input.format.as_deref(),
                                     self.identifier,
                                     input.dims,
                                     &self.output)?;
        }

        println!("Saved {} to {}", self.identifier, self.output.display());
        Ok(())
    }
}
