//! # bmi-run
//!
//! Command-line driver for BMI models.
//!
//! ## Usage
//! ```bash
//! # Print what a model declares
//! bmi-run inspect --config driver.toml
//!
//! # Run the configured loop and keep the final outputs
//! bmi-run run --config driver.toml --output values.json
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bmi-run",
    about = "Drive a Basic Model Interface model through its lifecycle",
    version
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect, initialize and print the model's variables, grids and time settings.
    Inspect {
        /// Path to the driver configuration.
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Run the stepping loop described by the driver configuration.
    Run {
        /// Path to the driver configuration.
        #[arg(short, long)]
        config: PathBuf,

        /// Write the final output values to this JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { config } => commands::inspect::execute(config),
        Commands::Run { config, output } => commands::run::execute(config, output),
    }
}
