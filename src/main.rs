use std::path::{Path, PathBuf};
use std::process;

use log::{error, LevelFilter};

use regionkit::api::RegionKit;
use regionkit::commands::{cli_definition, CommandFactory, RegionkitCommandFactory};
use regionkit::config::Settings;
use regionkit::errors::RegionResult;
use regionkit::grid::EdgePolicy;
use regionkit::utils::logger::Logger;

fn main() {
    let matches = cli_definition().get_matches();

    let api = match build_api(&matches) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let verbose = matches.get_flag("verbose");
    let log_file = matches
        .get_one::<String>("log-file")
        .map(PathBuf::from)
        .or_else(|| api.settings().logging.file.clone());
    let level = if verbose { LevelFilter::Debug } else { api.settings().logging.level };

    if let Err(e) = init_logging(log_file.as_deref(), level) {
        eprintln!("Error setting up logger: {}", e);
        process::exit(1);
    }

    let factory = RegionkitCommandFactory::new();

    match factory.create_command(&matches, &api) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}

/// Settings from the config file, with command-line overrides applied
fn build_api(matches: &clap::ArgMatches) -> RegionResult<RegionKit> {
    let settings = match matches.get_one::<String>("config") {
        Some(path) => Settings::from_file(Path::new(path))?,
        None => Settings::default(),
    };

    let mut api = RegionKit::new(settings);
    if let Some(policy) = matches.get_one::<String>("edge-policy") {
        api.settings_mut().reader.edge_policy = policy.parse::<EdgePolicy>()?;
    }

    Ok(api)
}

fn init_logging(log_file: Option<&Path>, level: LevelFilter) -> std::io::Result<()> {
    match log_file {
        Some(path) => Logger::init_global_logger(path, level),
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .format_timestamp(None)
                .init();
            Ok(())
        }
    }
}
