use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use gavel_cli::gen::Generator;

/// Generates a contract-enforcement linter binary: discovers contract
/// implementations in a crate and emits a main that registers them.
#[derive(Parser)]
#[command(name = "gavel", version, about = "Generate a contract-enforcement linter binary")]
struct Cli {
    /// Name of the generated linter
    #[arg(long)]
    name: String,

    /// Crate directory to scan for contract implementations
    #[arg(long, short = 'd', default_value = ".")]
    dir: PathBuf,

    /// Rust path of the crate the contract types live in
    #[arg(long)]
    contracts_crate: String,

    /// Rust expression constructing the front-end loader
    #[arg(long)]
    loader: String,

    /// Output file for the generated main
    #[arg(long, short = 'o')]
    outfile: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let gen = Generator {
        name: cli.name,
        dir: cli.dir,
        contracts_crate: cli.contracts_crate,
        loader: cli.loader,
        outfile: cli.outfile,
    };
    match gen.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
