//! Enforcement runtime for gavel contracts.
//!
//! The runtime ingests a typed+SSA [`Program`](gavel_core::program::Program),
//! scans it for contract annotations, resolves each annotation into a
//! [`Target`](target::Target) bound to a registered contract provider, and
//! dispatches the configured contract instances concurrently. Violations are
//! aggregated by source position into [`Results`](report::Results).
//!
//! - [`contract`] — the `Contract` trait, providers, and the registry
//! - [`context`] — the invocation context handed to a contract
//! - [`oracle`] — interface-implementer queries
//! - [`target`] — alias expansion, coalescing, and provider binding
//! - [`engine`] — the `Enforcer` entry point and worker pool
//! - [`report`] — the report channel and position-keyed aggregation

pub mod contract;
pub mod context;
pub mod engine;
pub mod errors;
pub mod oracle;
pub mod report;
pub mod target;

pub use contract::{Contract, ContractError, ContractProvider, ContractRegistry};
pub use context::Context;
pub use engine::Enforcer;
pub use errors::EnforceError;
pub use oracle::Oracle;
pub use report::{Report, Results};
pub use target::Target;
