mod commands;
mod domain;
mod logging;
mod services;
#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use crate::commands::aggregate_cmd::aggregate_command;
use crate::commands::base_commands::{CliArgs, Commands};
use crate::commands::completions_cmd::completions_command;
use crate::commands::fetch_cmd::fetch_command;
use crate::commands::summary_cmd::summary_command;
use crate::logging::init_logging;
use clap::Parser;

fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialise logging: {e}");
    }

    let args = CliArgs::parse();
    let outcome = match args.command {
        Commands::Fetch {
            config,
            output,
            location,
        } => fetch_command(&config, &output, location.as_deref()),
        Commands::Aggregate {
            config,
            location,
            input,
            output,
        } => aggregate_command(&config, &location, &input, &output),
        Commands::Summary {
            config,
            input,
            output,
            adjustments,
        } => summary_command(&config, &input, &output, adjustments.as_deref()),
        Commands::Completions { shell } => {
            completions_command(shell);
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
