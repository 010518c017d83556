use std::collections::BTreeMap;

use crate::decl::Member;
use crate::position::Position;
use crate::ssa::Function;
use crate::syntax::SourceFile;
use crate::types::{
    FuncId, InterfaceType, NamedType, PkgId, ReceiverForm, TypeId, TypeKind,
};

/// A loaded package. `input` marks packages named by the load patterns, as
/// opposed to their transitive dependencies.
#[derive(Debug, Clone)]
pub struct Package {
    pub path: String,
    pub name: String,
    pub input: bool,
    pub files: Vec<SourceFile>,
}

/// The typed+SSA program the front-end hands to the enforcement runtime.
///
/// Types and functions live in interned arenas indexed by [`TypeId`] and
/// [`FuncId`]; identity is id equality. The program is immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub(crate) pkgs: Vec<Package>,
    pub(crate) types: Vec<TypeKind>,
    pub(crate) funcs: Vec<Function>,
    /// Named types in the front-end's universe scope, by name.
    pub(crate) universe: BTreeMap<String, TypeId>,
    /// Named types declared in packages, by (package path, name).
    pub(crate) named_index: BTreeMap<(String, String), TypeId>,
    /// The marker interface that contract aliases derive from, if the
    /// loaded universe declares one.
    pub(crate) contract_marker: Option<TypeId>,
}

impl Program {
    pub fn pkg(&self, id: PkgId) -> &Package {
        &self.pkgs[id.0 as usize]
    }

    pub fn type_kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.0 as usize]
    }

    pub fn func(&self, id: FuncId) -> &Function {
        &self.funcs[id.0 as usize]
    }

    pub fn packages(&self) -> impl Iterator<Item = (PkgId, &Package)> {
        self.pkgs
            .iter()
            .enumerate()
            .map(|(i, p)| (PkgId(i as u32), p))
    }

    pub fn input_packages(&self) -> impl Iterator<Item = (PkgId, &Package)> {
        self.packages().filter(|(_, p)| p.input)
    }

    pub fn functions(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.funcs
            .iter()
            .enumerate()
            .map(|(i, f)| (FuncId(i as u32), f))
    }

    /// The marker interface type for contract aliases.
    pub fn contract_marker(&self) -> Option<TypeId> {
        self.contract_marker
    }

    pub fn named(&self, id: TypeId) -> Option<&NamedType> {
        match self.type_kind(id) {
            TypeKind::Named(n) => Some(n),
            _ => None,
        }
    }

    /// Follows named-type links down to the underlying unnamed type.
    pub fn underlying(&self, mut id: TypeId) -> TypeId {
        while let TypeKind::Named(n) = self.type_kind(id) {
            id = n.underlying;
        }
        id
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        matches!(self.type_kind(self.underlying(id)), TypeKind::Interface(_))
    }

    /// The method signatures of an interface type (named or bare).
    pub fn interface_methods(&self, id: TypeId) -> Option<&InterfaceType> {
        match self.type_kind(self.underlying(id)) {
            TypeKind::Interface(i) => Some(i),
            _ => None,
        }
    }

    /// Looks up a named type in the universe scope.
    pub fn universe_lookup(&self, name: &str) -> Option<TypeId> {
        self.universe.get(name).copied()
    }

    /// Looks up a named type by package path and name.
    pub fn lookup(&self, pkg_path: &str, name: &str) -> Option<TypeId> {
        self.named_index
            .get(&(pkg_path.to_string(), name.to_string()))
            .copied()
    }

    /// All named types declared in packages, in (package path, name) order.
    pub fn named_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.named_index.values().copied()
    }

    /// The method set of a named type. The pointer method set includes the
    /// value-receiver methods; the value set does not include pointer-receiver
    /// methods. Sorted by method name.
    pub fn method_set(&self, named: TypeId, pointer: bool) -> Vec<FuncId> {
        let mut set: Vec<FuncId> = self
            .functions()
            .filter(|(_, f)| match f.recv {
                Some(r) => r.ty == named && (pointer || !r.pointer),
                None => false,
            })
            .map(|(id, _)| id)
            .collect();
        set.sort_by(|a, b| self.func(*a).name.cmp(&self.func(*b).name));
        set
    }

    /// Finds the method named `name` in the given method set of `named`.
    pub fn method_lookup(&self, named: TypeId, name: &str, form: ReceiverForm) -> Option<FuncId> {
        self.method_set(named, form == ReceiverForm::Pointer)
            .into_iter()
            .find(|id| self.func(*id).name == name)
    }

    /// Decides whether `concrete` structurally implements `iface`, and if so
    /// through which receiver form. The value form wins when both do.
    pub fn implements(&self, concrete: TypeId, iface: TypeId) -> Option<ReceiverForm> {
        let methods = &self.interface_methods(iface)?.methods;
        for form in [ReceiverForm::Value, ReceiverForm::Pointer] {
            let set = self.method_set(concrete, form == ReceiverForm::Pointer);
            let satisfied = methods.iter().all(|m| {
                set.iter().any(|id| {
                    let f = self.func(*id);
                    f.name == m.name && f.sig == m.sig
                })
            });
            if satisfied {
                return Some(form);
            }
        }
        None
    }

    /// All concrete named types across the loaded packages that structurally
    /// implement `iface`, in (package path, name) order.
    pub fn implementers(&self, iface: TypeId) -> Vec<TypeId> {
        self.named_types()
            .filter(|id| !self.is_interface(*id))
            .filter(|id| self.implements(*id, iface).is_some())
            .collect()
    }

    /// Renders a type for diagnostics.
    pub fn type_string(&self, id: TypeId) -> String {
        match self.type_kind(id) {
            TypeKind::Basic(name) => name.clone(),
            TypeKind::Named(n) => match n.pkg {
                Some(pkg) => format!("{}.{}", self.pkg(pkg).path, n.name),
                None => n.name.clone(),
            },
            TypeKind::Pointer(elem) => format!("*{}", self.type_string(*elem)),
            TypeKind::Struct(_) => "struct{...}".to_string(),
            TypeKind::Interface(_) => "interface{...}".to_string(),
            TypeKind::Tuple(elems) => {
                let parts: Vec<String> = elems.iter().map(|e| self.type_string(*e)).collect();
                format!("({})", parts.join(", "))
            }
            TypeKind::Func(_) => "func".to_string(),
        }
    }

    /// Renders a function as `path.Name` or `path.(*Recv).Name`.
    pub fn func_string(&self, id: FuncId) -> String {
        let f = self.func(id);
        let path = &self.pkg(f.pkg).path;
        match f.recv {
            Some(r) => {
                let recv = self
                    .named(r.ty)
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| self.type_string(r.ty));
                if r.pointer {
                    format!("{}.(*{}).{}", path, recv, f.name)
                } else {
                    format!("{}.({}).{}", path, recv, f.name)
                }
            }
            None => format!("{}.{}", path, f.name),
        }
    }

    pub fn member_name(&self, m: Member) -> &str {
        match m {
            Member::Func(id) => &self.func(id).name,
            Member::Type(id) => self
                .named(id)
                .map(|n| n.name.as_str())
                .unwrap_or("<unnamed>"),
        }
    }

    pub fn member_pos(&self, m: Member) -> Position {
        match m {
            Member::Func(id) => self.func(id).pos.clone(),
            Member::Type(id) => self
                .named(id)
                .map(|n| n.pos.clone())
                .unwrap_or_default(),
        }
    }
}

/// Whether a declaration name is exported from its package.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
