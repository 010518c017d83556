use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Index of a type in the program's type table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TypeId(pub u32);

/// Index of a package in the program.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PkgId(pub u32);

/// Index of an SSA function in the program.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FuncId(pub u32);

/// The shape of a type. Identical structural types are interned to a single
/// `TypeId` by the builder, so signature comparison is id comparison.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A built-in scalar type (int, string, bool, ...).
    Basic(String),
    /// A declared named type wrapping an underlying type.
    Named(NamedType),
    Pointer(TypeId),
    Struct(StructType),
    Interface(InterfaceType),
    /// Multiple-result carrier. Never a declared type; produced by calls.
    Tuple(Vec<TypeId>),
    Func(Signature),
}

/// A declared named type. `pkg == None` places the name in the universe
/// scope of the front-end (e.g. a built-in `error` interface).
#[derive(Debug, Clone)]
pub struct NamedType {
    pub pkg: Option<PkgId>,
    pub name: String,
    pub underlying: TypeId,
    pub pos: Position,
}

#[derive(Debug, Clone, Default)]
pub struct StructType {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceType {
    pub methods: Vec<MethodSig>,
}

/// A method signature inside an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub sig: Signature,
}

/// Parameter and result types of a function or interface method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<TypeId>,
    pub results: Vec<TypeId>,
}

impl Signature {
    pub fn new(params: Vec<TypeId>, results: Vec<TypeId>) -> Self {
        Self { params, results }
    }
}

/// The receiver of a method declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receiver {
    /// The named type the method is declared on.
    pub ty: TypeId,
    /// True for pointer receivers.
    pub pointer: bool,
}

/// How a concrete type satisfies an interface: through its value method set
/// or only through the pointer method set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverForm {
    Value,
    Pointer,
}
