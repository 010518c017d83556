//! Skeleton generator.
//!
//! Scans a crate for contract implementations (`impl Contract for <Type>`)
//! and emits a `main.rs` that registers each of them — plus the built-in
//! `retlint` contract — and hands control to [`Linter::run`](crate::Linter).

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use ignore::WalkBuilder;
use regex::Regex;

pub struct Generator {
    /// Name of the generated linter binary.
    pub name: String,
    /// Crate directory scanned for contract implementations.
    pub dir: PathBuf,
    /// Rust path of the crate the discovered contract types live in.
    pub contracts_crate: String,
    /// Rust expression constructing the front-end loader.
    pub loader: String,
    /// Where the generated main is written.
    pub outfile: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("no name was set for the output binary")]
    NoName,

    #[error("no contract implementations found under {}", .0.display())]
    NoContracts(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn impl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"impl\s+Contract\s+for\s+(\w+)").unwrap())
}

impl Generator {
    pub fn execute(&self) -> Result<(), GenError> {
        if self.name.is_empty() {
            return Err(GenError::NoName);
        }
        let contracts = self.find_contracts();
        if contracts.is_empty() {
            return Err(GenError::NoContracts(self.dir.clone()));
        }
        let src = render_main(&self.name, &self.contracts_crate, &self.loader, &contracts);
        fs::write(&self.outfile, src)?;
        Ok(())
    }

    /// Discovered contract type names, sorted and deduplicated.
    pub fn find_contracts(&self) -> Vec<String> {
        let mut found = Vec::new();
        for entry in WalkBuilder::new(&self.dir).hidden(true).build() {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            for cap in impl_re().captures_iter(&content) {
                let name = cap[1].to_string();
                if !found.contains(&name) {
                    found.push(name);
                }
            }
        }
        found.sort();
        found
    }
}

fn render_main(name: &str, contracts_crate: &str, loader: &str, contracts: &[String]) -> String {
    let mut registrations = String::new();
    for c in contracts {
        registrations.push_str(&format!(
            "    registry.register(\n        \"{c}\",\n        \
             gavel_enforce::ContractProvider::of::<{contracts_crate}::{c}>(\"contract:{c}\"),\n    );\n"
        ));
    }
    format!(
        "// Generated by gavel; do not edit.\n\n\
         use std::process::ExitCode;\n\n\
         fn main() -> ExitCode {{\n    \
         let mut registry = gavel_enforce::ContractRegistry::new();\n    \
         registry.register(\n        \"retlint\",\n        \
         gavel_enforce::ContractProvider::of::<gavel_contracts::RetLint>(\"contract:retlint\"),\n    );\n\
         {registrations}    \
         gavel_cli::Linter::new(\"{name}\", registry, Box::new({loader})).run()\n}}\n"
    )
}
