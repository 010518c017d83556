//! The per-file declaration surface the annotation scanner walks.
//!
//! The front-end reduces each source file to the declaration shapes that can
//! carry contract annotations, with their surrounding comment groups already
//! attached. Function bodies are not represented; the scanner never descends
//! into them.

use crate::position::Position;
use crate::types::{FuncId, TypeId};

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub decls: Vec<SyntaxDecl>,
}

#[derive(Debug, Clone)]
pub enum SyntaxDecl {
    /// A top-level function or method declaration.
    Func(FuncDecl),
    /// A type declaration group with one or more specs.
    TypeGroup(TypeGroup),
    /// An anonymous binding of an interface type initialized from a concrete
    /// value; seeds the explicit-implementer set.
    DiscardBinding(DiscardBinding),
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub func: FuncId,
    pub comments: Vec<CommentGroup>,
}

#[derive(Debug, Clone)]
pub struct TypeGroup {
    /// Comments on the group keyword itself.
    pub comments: Vec<CommentGroup>,
    pub specs: Vec<TypeSpec>,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub ty: TypeId,
    /// Comments on the individual spec inside a grouped declaration.
    pub comments: Vec<CommentGroup>,
    /// Method signatures, populated when the entry declares an interface.
    pub methods: Vec<MethodSpec>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub name: String,
    pub comments: Vec<CommentGroup>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct DiscardBinding {
    /// The declared (left-hand) type.
    pub declared: TypeId,
    /// The static type of the initializing value.
    pub value: TypeId,
    pub pos: Position,
}

/// Adjacent comments attached to one declaration.
#[derive(Debug, Clone, Default)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    pub fn one(text: impl Into<String>, pos: Position) -> Self {
        Self {
            comments: vec![Comment {
                text: text.into(),
                pos,
            }],
        }
    }
}

/// A single comment. Block comments keep their embedded newlines.
#[derive(Debug, Clone)]
pub struct Comment {
    pub text: String,
    pub pos: Position,
}
