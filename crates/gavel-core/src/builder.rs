//! Construction of [`Program`] values.
//!
//! Front-end adapters translate their typed+SSA artifacts through this
//! builder; tests use it to materialize fixture programs. Structural types
//! (basics, pointers, tuples) are interned so that signature comparison
//! reduces to id comparison.

use std::collections::HashMap;

use crate::position::Position;
use crate::program::{Package, Program};
use crate::ssa::{Block, Function, Instr, Return, UnOpKind, Value, ValueId, ValueKind};
use crate::syntax::SourceFile;
use crate::types::{
    Field, FuncId, InterfaceType, MethodSig, NamedType, PkgId, Receiver, Signature, StructType,
    TypeId, TypeKind,
};

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    prog: Program,
    basics: HashMap<String, TypeId>,
    pointers: HashMap<TypeId, TypeId>,
    tuples: HashMap<Vec<TypeId>, TypeId>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_type(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.prog.types.len() as u32);
        self.prog.types.push(kind);
        id
    }

    /// Interned built-in scalar type.
    pub fn basic(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.basics.get(name) {
            return *id;
        }
        let id = self.push_type(TypeKind::Basic(name.to_string()));
        self.basics.insert(name.to_string(), id);
        id
    }

    /// Interned pointer type.
    pub fn pointer_to(&mut self, elem: TypeId) -> TypeId {
        if let Some(id) = self.pointers.get(&elem) {
            return *id;
        }
        let id = self.push_type(TypeKind::Pointer(elem));
        self.pointers.insert(elem, id);
        id
    }

    /// Interned tuple type.
    pub fn tuple(&mut self, elems: Vec<TypeId>) -> TypeId {
        if let Some(id) = self.tuples.get(&elems) {
            return *id;
        }
        let id = self.push_type(TypeKind::Tuple(elems.clone()));
        self.tuples.insert(elems, id);
        id
    }

    pub fn func_type(&mut self, sig: Signature) -> TypeId {
        self.push_type(TypeKind::Func(sig))
    }

    pub fn struct_type(&mut self, fields: Vec<Field>) -> TypeId {
        self.push_type(TypeKind::Struct(StructType { fields }))
    }

    pub fn interface_type(&mut self, methods: Vec<MethodSig>) -> TypeId {
        self.push_type(TypeKind::Interface(InterfaceType { methods }))
    }

    pub fn package(&mut self, path: &str, name: &str, input: bool) -> PkgId {
        let id = PkgId(self.prog.pkgs.len() as u32);
        self.prog.pkgs.push(Package {
            path: path.to_string(),
            name: name.to_string(),
            input,
            files: Vec::new(),
        });
        id
    }

    /// Declares a named type. `pkg == None` registers the name in the
    /// universe scope.
    pub fn named(
        &mut self,
        pkg: Option<PkgId>,
        name: &str,
        underlying: TypeId,
        pos: Position,
    ) -> TypeId {
        let id = self.push_type(TypeKind::Named(NamedType {
            pkg,
            name: name.to_string(),
            underlying,
            pos,
        }));
        match pkg {
            Some(p) => {
                let path = self.prog.pkgs[p.0 as usize].path.clone();
                self.prog.named_index.insert((path, name.to_string()), id);
            }
            None => {
                self.prog.universe.insert(name.to_string(), id);
            }
        }
        id
    }

    /// Convenience: a named type over an empty struct.
    pub fn named_struct(&mut self, pkg: PkgId, name: &str, pos: Position) -> TypeId {
        let underlying = self.struct_type(Vec::new());
        self.named(Some(pkg), name, underlying, pos)
    }

    /// Convenience: a named interface type.
    pub fn named_interface(
        &mut self,
        pkg: Option<PkgId>,
        name: &str,
        methods: Vec<MethodSig>,
        pos: Position,
    ) -> TypeId {
        let underlying = self.interface_type(methods);
        self.named(pkg, name, underlying, pos)
    }

    /// Marks `id` as the contract-marker interface that aliases derive from.
    pub fn mark_contract_interface(&mut self, id: TypeId) {
        self.prog.contract_marker = Some(id);
    }

    /// Declares a function; the body is attached with [`define_func`].
    ///
    /// [`define_func`]: ProgramBuilder::define_func
    pub fn declare_func(
        &mut self,
        pkg: PkgId,
        name: &str,
        sig: Signature,
        recv: Option<Receiver>,
        pos: Position,
    ) -> FuncId {
        let id = FuncId(self.prog.funcs.len() as u32);
        self.prog.funcs.push(Function {
            pkg,
            name: name.to_string(),
            sig,
            recv,
            pos,
            blocks: Vec::new(),
            values: Vec::new(),
        });
        id
    }

    pub fn define_func(&mut self, id: FuncId, body: FuncBody) {
        let f = &mut self.prog.funcs[id.0 as usize];
        f.blocks = body.blocks;
        f.values = body.values;
    }

    pub fn add_file(&mut self, pkg: PkgId, file: SourceFile) {
        self.prog.pkgs[pkg.0 as usize].files.push(file);
    }

    pub fn finish(self) -> Program {
        self.prog
    }
}

/// Builds the blocks and value arena of one function.
#[derive(Debug, Default)]
pub struct FuncBody {
    values: Vec<Value>,
    blocks: Vec<Block>,
}

impl FuncBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new basic block; subsequent instructions land there.
    pub fn block(&mut self) {
        self.blocks.push(Block::default());
    }

    fn current_block(&mut self) -> &mut Block {
        if self.blocks.is_empty() {
            self.blocks.push(Block::default());
        }
        self.blocks.last_mut().unwrap()
    }

    fn push(&mut self, kind: ValueKind, ty: TypeId, pos: Position) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(Value { kind, ty, pos });
        self.current_block().instrs.push(Instr::Value(id));
        id
    }

    pub fn param(&mut self, name: &str, ty: TypeId, pos: Position) -> ValueId {
        self.push(
            ValueKind::Param {
                name: name.to_string(),
            },
            ty,
            pos,
        )
    }

    pub fn call(&mut self, callee: Option<FuncId>, ty: TypeId, pos: Position) -> ValueId {
        self.push(ValueKind::Call { callee }, ty, pos)
    }

    pub fn constant(&mut self, repr: &str, ty: TypeId, pos: Position) -> ValueId {
        self.push(
            ValueKind::Const {
                nil: false,
                repr: repr.to_string(),
            },
            ty,
            pos,
        )
    }

    pub fn nil(&mut self, ty: TypeId, pos: Position) -> ValueId {
        self.push(
            ValueKind::Const {
                nil: true,
                repr: "nil".to_string(),
            },
            ty,
            pos,
        )
    }

    pub fn extract(&mut self, tuple: ValueId, index: usize, ty: TypeId, pos: Position) -> ValueId {
        self.push(ValueKind::Extract { tuple, index }, ty, pos)
    }

    pub fn make_interface(&mut self, value: ValueId, ty: TypeId, pos: Position) -> ValueId {
        self.push(ValueKind::MakeInterface { value }, ty, pos)
    }

    pub fn phi(&mut self, edges: Vec<ValueId>, ty: TypeId, pos: Position) -> ValueId {
        self.push(ValueKind::Phi { edges }, ty, pos)
    }

    pub fn type_assert(
        &mut self,
        value: ValueId,
        asserted: TypeId,
        ty: TypeId,
        pos: Position,
    ) -> ValueId {
        self.push(ValueKind::TypeAssert { value, asserted }, ty, pos)
    }

    pub fn deref(&mut self, operand: ValueId, ty: TypeId, pos: Position) -> ValueId {
        self.push(
            ValueKind::UnOp {
                op: UnOpKind::Deref,
                operand,
            },
            ty,
            pos,
        )
    }

    pub fn opaque(&mut self, describe: &str, ty: TypeId, pos: Position) -> ValueId {
        self.push(
            ValueKind::Opaque {
                describe: describe.to_string(),
            },
            ty,
            pos,
        )
    }

    pub fn ret(&mut self, results: Vec<ValueId>, pos: Position) {
        self.current_block()
            .instrs
            .push(Instr::Return(Return { results, pos }));
    }
}
