use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{FuncId, TypeId};

/// The kind of declaration a contract annotation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Function,
    Method,
    Type,
    Interface,
    InterfaceMethod,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Function => "function",
            Kind::Method => "method",
            Kind::Type => "type",
            Kind::Interface => "interface",
            Kind::InterfaceMethod => "interface_method",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to the typed declaration an annotation attaches to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclRef {
    Func(FuncId),
    Type(TypeId),
    /// A method signature inside an interface declaration.
    InterfaceMethod { iface: TypeId, method: String },
}

/// An SSA-level program entity handed to a contract: either a function or a
/// type. The counterpart of a source declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    Func(FuncId),
    Type(TypeId),
}
