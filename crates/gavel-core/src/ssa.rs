use crate::position::Position;
use crate::types::{FuncId, PkgId, Receiver, Signature, TypeId};

/// Index of a value in a function's value arena. Ids are local to one
/// function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(pub u32);

/// An SSA function: a top-level function or a method with a receiver.
#[derive(Debug, Clone)]
pub struct Function {
    pub pkg: PkgId,
    pub name: String,
    pub sig: Signature,
    pub recv: Option<Receiver>,
    pub pos: Position,
    pub blocks: Vec<Block>,
    pub values: Vec<Value>,
}

impl Function {
    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.0 as usize]
    }

    pub fn is_method(&self) -> bool {
        self.recv.is_some()
    }

    /// All return instructions across the function's blocks.
    pub fn returns(&self) -> impl Iterator<Item = &Return> {
        self.blocks.iter().flat_map(|b| {
            b.instrs.iter().filter_map(|i| match i {
                Instr::Return(r) => Some(r),
                Instr::Value(_) => None,
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub instrs: Vec<Instr>,
}

#[derive(Debug, Clone)]
pub enum Instr {
    /// An instruction that yields an SSA value.
    Value(ValueId),
    Return(Return),
}

#[derive(Debug, Clone)]
pub struct Return {
    pub results: Vec<ValueId>,
    pub pos: Position,
}

/// An SSA value: its shape, its static type, and where it came from.
#[derive(Debug, Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub ty: TypeId,
    pub pos: Position,
}

/// The value shapes the runtime guarantees to contracts. Anything the
/// front-end produces beyond these arrives as [`ValueKind::Opaque`].
#[derive(Debug, Clone)]
pub enum ValueKind {
    /// A formal parameter.
    Param { name: String },
    /// A call. `callee` is `None` when the callee is not statically known
    /// (interface dispatch, function values).
    Call { callee: Option<FuncId> },
    /// A constant. `nil` marks the zero value of a nilable type.
    Const { nil: bool, repr: String },
    /// Projection of one element out of a tuple-valued instruction.
    Extract { tuple: ValueId, index: usize },
    /// A concrete value being wrapped into an interface.
    MakeInterface { value: ValueId },
    /// Convergence of values after a branch.
    Phi { edges: Vec<ValueId> },
    /// A checked conversion to an asserted type.
    TypeAssert { value: ValueId, asserted: TypeId },
    /// A unary operation; `UnOpKind::Deref` is the load through a pointer.
    UnOp { op: UnOpKind, operand: ValueId },
    /// Any other instruction shape.
    Opaque { describe: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOpKind {
    Deref,
    Neg,
    Not,
}
