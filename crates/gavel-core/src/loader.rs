use std::path::PathBuf;

use crate::program::Program;

/// How the front-end should load a program.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Working directory for pattern resolution.
    pub dir: PathBuf,
    /// Package patterns to load.
    pub patterns: Vec<String>,
    /// Include test sources.
    pub tests: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            patterns: Vec::new(),
            tests: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not load source: {0}")]
    Source(String),

    #[error("no packages matched {0:?}")]
    NoMatch(Vec<String>),
}

/// The seam to the external front-end: produces a typed+SSA [`Program`]
/// from package patterns. The SSA is expected to be fully built; the
/// runtime never asks for lazy construction.
pub trait Loader {
    fn load(&self, opts: &LoadOptions) -> Result<Program, LoadError>;
}

impl<F> Loader for F
where
    F: Fn(&LoadOptions) -> Result<Program, LoadError>,
{
    fn load(&self, opts: &LoadOptions) -> Result<Program, LoadError> {
        self(opts)
    }
}
