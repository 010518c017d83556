//! Command-line surface for gavel linters.
//!
//! A generated linter binary configures a [`Linter`] with its contract
//! registry and front-end loader, then hands over to [`Linter::run`], which
//! provides the `enforce` and `contracts` subcommands. The [`gen`] module is
//! the skeleton generator that emits such binaries.

pub mod cli_args;
pub mod gen;
pub mod linter;

pub use linter::Linter;
