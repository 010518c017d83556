use gavel_core::loader::LoadError;
use gavel_core::position::Position;

/// Fatal failures of an enforcement run. Contract violations are not errors;
/// they accumulate in [`Results`](crate::report::Results).
#[derive(Debug, thiserror::Error)]
pub enum EnforceError {
    #[error("no packages specified")]
    NoPackages,

    #[error("{pos}: cannot find contract named {name}")]
    UnknownContract { pos: Position, name: String },

    #[error("{pos}: recursive contract alias {name}")]
    RecursiveAlias { pos: Position, name: String },

    #[error("{pos}: bad contract configuration: {source}")]
    BadConfig {
        pos: Position,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("interrupted")]
    Cancelled,
}
