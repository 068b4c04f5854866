use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch shift sheets from Google Sheets and aggregate payroll per location
    Fetch {
        /// Path to payroll config YAML
        #[arg(short, long)]
        config: String,
        /// Output results YAML file
        #[arg(short, long)]
        output: String,
        /// Only fetch the location with this id
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Aggregate one location from a local JSON value matrix
    Aggregate {
        /// Path to payroll config YAML
        #[arg(short, long)]
        config: String,
        /// Location id from the config
        #[arg(short, long)]
        location: String,
        /// JSON file with the sheet values
        #[arg(short, long)]
        input: String,
        /// Output results YAML file
        #[arg(short, long)]
        output: String,
    },
    /// Build the cross-location payroll summary as CSV
    Summary {
        /// Path to payroll config YAML
        #[arg(short, long)]
        config: String,
        /// Results YAML written by fetch or aggregate
        #[arg(short, long)]
        input: String,
        /// Output CSV file
        #[arg(short, long)]
        output: String,
        /// Optional YAML with bonus adjustments per employee key
        #[arg(short, long)]
        adjustments: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
