use std::collections::BTreeMap;

use gavel_core::program::Program;
use gavel_core::types::{FuncId, TypeId};
use gavel_scan::Assertion;

/// Read-only query surface over "which concrete types implement which
/// interface".
///
/// The explicit set comes from scanned assertions; the structural closure
/// comes from the program's method sets. `asserted_only` selects between the
/// explicit set alone and the union, and the former is always a subset of
/// the latter. All answers are ordered by (package path, declaration name).
pub struct Oracle {
    asserted: BTreeMap<TypeId, Vec<TypeId>>,
}

impl Oracle {
    pub fn new(prog: &Program, assertions: &[Assertion]) -> Self {
        let mut asserted: BTreeMap<TypeId, Vec<TypeId>> = BTreeMap::new();
        for a in assertions {
            let impls = asserted.entry(a.iface).or_default();
            if !impls.contains(&a.imp) {
                impls.push(a.imp);
            }
        }
        for impls in asserted.values_mut() {
            sort_types(prog, impls);
        }
        Self { asserted }
    }

    /// Concrete types declared to implement `iface`: exactly the asserted
    /// set, or its union with every structural implementer.
    pub fn type_implementers(
        &self,
        prog: &Program,
        iface: TypeId,
        asserted_only: bool,
    ) -> Vec<TypeId> {
        let mut impls = self.asserted.get(&iface).cloned().unwrap_or_default();
        if !asserted_only {
            for imp in prog.implementers(iface) {
                if !impls.contains(&imp) {
                    impls.push(imp);
                }
            }
        }
        sort_types(prog, &mut impls);
        impls
    }

    /// The method named `name` on each implementer of `iface`, selected by
    /// pointer or value receiver according to how the implementer satisfies
    /// the interface. Implementers without a matching method are skipped.
    pub fn method_implementers(
        &self,
        prog: &Program,
        iface: TypeId,
        name: &str,
        asserted_only: bool,
    ) -> Vec<FuncId> {
        self.type_implementers(prog, iface, asserted_only)
            .into_iter()
            .filter_map(|imp| {
                let form = prog.implements(imp, iface)?;
                prog.method_lookup(imp, name, form)
            })
            .collect()
    }
}

fn sort_types(prog: &Program, types: &mut [TypeId]) {
    types.sort_by_key(|id| {
        let named = prog.named(*id);
        let pkg = named
            .and_then(|n| n.pkg)
            .map(|p| prog.pkg(p).path.clone())
            .unwrap_or_default();
        let name = named.map(|n| n.name.clone()).unwrap_or_default();
        (pkg, name)
    });
}

#[cfg(test)]
#[path = "oracle_tests.rs"]
mod tests;
