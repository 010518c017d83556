use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(about = "Enforce contracts declared in source annotations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enforce contracts defined in the given packages
    Enforce {
        /// The package patterns to enforce contracts upon
        packages: Vec<String>,

        /// Only consider explicit interface assertions
        #[arg(long = "asserted_only")]
        asserted_only: bool,

        /// Override the current working directory
        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,

        /// Return a non-zero exit code if errors are reported
        #[arg(long = "set_exit_status")]
        set_exit_status: bool,

        /// Include test sources in the analysis
        #[arg(long, short = 't')]
        tests: bool,

        /// Enable additional diagnostic messages
        #[arg(long, short = 'v')]
        verbose: bool,

        /// Output as structured JSON
        #[arg(long)]
        json: bool,
    },

    /// List all defined contracts
    Contracts,
}

#[cfg(test)]
#[path = "cli_args_tests.rs"]
mod tests;
