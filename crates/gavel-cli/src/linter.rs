use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::OnceLock;

use clap::{CommandFactory, FromArgMatches};

use gavel_core::cancel::CancelToken;
use gavel_core::loader::Loader;
use gavel_enforce::{ContractRegistry, Enforcer};
use gavel_output::{human::HumanFormatter, json::JsonFormatter, OutputFormatter};

use crate::cli_args::{Cli, Commands};

/// The runtime entry point a generated linter binary hands control to.
pub struct Linter {
    pub name: String,
    pub registry: ContractRegistry,
    pub loader: Box<dyn Loader>,
}

impl Linter {
    pub fn new(name: impl Into<String>, registry: ContractRegistry, loader: Box<dyn Loader>) -> Self {
        Self {
            name: name.into(),
            registry,
            loader,
        }
    }

    /// Parses the process arguments and dispatches. Exit code 0 on success;
    /// 1 on a fatal error or, with `--set_exit_status`, when any reports
    /// were produced.
    pub fn run(self) -> ExitCode {
        let matches = Cli::command().name(self.name.clone()).get_matches();
        match Cli::from_arg_matches(&matches) {
            Ok(cli) => ExitCode::from(self.dispatch(cli)),
            Err(err) => {
                eprintln!("{err}");
                ExitCode::FAILURE
            }
        }
    }

    /// Runs one subcommand and returns the process exit code.
    pub fn dispatch(self, cli: Cli) -> u8 {
        match cli.command {
            Commands::Enforce {
                packages,
                asserted_only,
                dir,
                set_exit_status,
                tests,
                verbose,
                json,
            } => self.enforce(EnforceOptions {
                packages,
                asserted_only,
                dir,
                set_exit_status,
                tests,
                verbose,
                json,
            }),
            Commands::Contracts => self.contracts(),
        }
    }

    fn enforce(self, opts: EnforceOptions) -> u8 {
        if opts.verbose {
            init_logging();
        }

        let cancel = CancelToken::new();
        {
            let cancel = cancel.clone();
            let _ = ctrlc::set_handler(move || {
                eprintln!("Interrupted");
                cancel.cancel();
            });
        }

        let mut enforcer = Enforcer::new(self.name, self.registry);
        enforcer.asserted_only = opts.asserted_only;
        enforcer.dir = opts.dir;
        enforcer.packages = opts.packages;
        enforcer.tests = opts.tests;

        match enforcer.execute(self.loader.as_ref(), &cancel) {
            Ok(results) => {
                let formatter: Box<dyn OutputFormatter> = if opts.json {
                    Box::new(JsonFormatter)
                } else {
                    Box::new(HumanFormatter)
                };
                print!("{}", formatter.format_results(&results));
                if opts.set_exit_status && !results.is_empty() {
                    eprintln!("reports generated");
                    return 1;
                }
                0
            }
            Err(err) => {
                eprintln!("{err}");
                1
            }
        }
    }

    fn contracts(self) -> u8 {
        for (name, provider) in self.registry.iter() {
            if provider.help.is_empty() {
                println!("contract:{name}");
            } else {
                println!("{}", provider.help);
            }
            println!();
        }
        0
    }
}

struct EnforceOptions {
    packages: Vec<String>,
    asserted_only: bool,
    dir: PathBuf,
    set_exit_status: bool,
    tests: bool,
    verbose: bool,
    json: bool,
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    static INITIALISED: OnceLock<()> = OnceLock::new();
    INITIALISED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

#[cfg(test)]
#[path = "linter_tests.rs"]
mod tests;
