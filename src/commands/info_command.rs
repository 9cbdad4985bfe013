//! Image and tile grid information command

use clap::ArgMatches;
use log::{debug, info};

use crate::api::RegionKit;
use crate::commands::command_traits::Command;
use crate::commands::InputArgs;
use crate::errors::RegionResult;

/// Prints image dimensions, sample layout and the tile grid
pub struct InfoCommand<'a> {
    input: InputArgs,
    /// Also list the TIFF container structure
    verbose: bool,
    api: &'a RegionKit,
}

impl<'a> InfoCommand<'a> {
    /// Create a new info command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `api` - Library facade carrying the effective settings
    pub fn new(args: &ArgMatches, api: &'a RegionKit) -> RegionResult<Self> {
        Ok(InfoCommand {
            input: InputArgs::from_matches(args, api)?,
            verbose: args.get_flag("verbose"),
            api,
        })
    }

    /// Build the report without printing it
    pub fn report(&self) -> RegionResult<String> {
        let input = &self.input;
        if input.directory {
            self.api.describe_directory(&input.path, input.pattern.as_deref())
        } else {
            self.api.describe(&input.path, input.format.as_deref(), input.dims, self.verbose)
        }
    }
}

impl<'a> Command for InfoCommand<'a> {
    fn execute(&self) -> RegionResult<()> {
        info!("Describing {}", self.input.path.display());
        let report = self.report()?;
        println!("{}", report);
        debug!("Info completed successfully");
        Ok(())
    }
}
