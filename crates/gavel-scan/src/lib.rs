//! Annotation scanner for the gavel contract enforcer.
//!
//! Walks the declaration surface of every loaded file, extracts magic-comment
//! contract annotations, and records the explicit interface assertions that
//! seed the implementer oracle.
//!
//! The magic comment syntax is `contract:<Name>` optionally followed by a
//! JSON object configuring the contract instance:
//!
//! ```text
//! // contract:MustReturnInt { "Expected": 1 }
//! ```
//!
//! Block comments may spread the object across lines; a single-line comment
//! cannot.

pub mod annotations;
pub mod comment;
pub mod scanner;

pub use annotations::{Annotation, Assertion, ScanOutput};
pub use scanner::scan;
