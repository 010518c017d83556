//! Analysis contracts shipped with gavel.
//!
//! [`retlint`] holds the return-type analysis contract: given a target
//! interface and a set of allowed concrete types, it decides for every
//! function returning the interface whether each return value is statically
//! provable to be one of the allowed types.

pub mod retlint;

pub use retlint::{DirtyFunction, DirtyReason, RetLint, RetLintError};
