use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use tracing::debug;

use gavel_core::cancel::CancelToken;
use gavel_core::decl::{DeclRef, Kind};
use gavel_core::program::Program;
use gavel_core::syntax::{CommentGroup, SourceFile, SyntaxDecl};
use gavel_core::types::{PkgId, TypeKind};

use crate::annotations::{Annotation, Assertion, ScanOutput};
use crate::comment::scan_comment;

/// Walks every file of the input packages and extracts contract annotations
/// and interface assertions.
///
/// Files are processed by a worker pool bounded by hardware parallelism; the
/// shared output is guarded by a single mutex and sorted once the pool has
/// drained, so the result is deterministic regardless of scheduling.
pub fn scan(prog: &Program, cancel: &CancelToken) -> ScanOutput {
    let shared = Mutex::new(ScanOutput::default());
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    let (tx, rx) = mpsc::channel::<(PkgId, &SourceFile)>();
    let rx = Mutex::new(rx);

    thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|| loop {
                if cancel.is_cancelled() {
                    return;
                }
                let item = rx.lock().unwrap().recv();
                match item {
                    Ok((pkg, file)) => process_file(prog, pkg, file, &shared),
                    Err(_) => return,
                }
            });
        }

        'send: for (pkg_id, pkg) in prog.input_packages() {
            for file in &pkg.files {
                if cancel.is_cancelled() {
                    break 'send;
                }
                if tx.send((pkg_id, file)).is_err() {
                    break 'send;
                }
            }
        }
        drop(tx);
    });

    let mut out = shared.into_inner().unwrap();
    out.annotations.sort_by_key(Annotation::sort_key);
    out.assertions.sort_by_key(|a| a.pos.clone());
    out
}

fn process_file(prog: &Program, _pkg: PkgId, file: &SourceFile, shared: &Mutex<ScanOutput>) {
    let mut local = ScanOutput::default();

    for decl in &file.decls {
        match decl {
            SyntaxDecl::Func(fd) => {
                let kind = if prog.func(fd.func).is_method() {
                    Kind::Method
                } else {
                    Kind::Function
                };
                collect(
                    &mut local,
                    &fd.comments,
                    DeclRef::Func(fd.func),
                    None,
                    kind,
                );
                // Never descend into function bodies.
            }

            SyntaxDecl::TypeGroup(group) => {
                for spec in &group.specs {
                    let kind = if prog.is_interface(spec.ty) {
                        Kind::Interface
                    } else {
                        Kind::Type
                    };
                    // Comments on the group keyword and on the individual
                    // spec are both considered.
                    collect(&mut local, &group.comments, DeclRef::Type(spec.ty), None, kind);
                    collect(&mut local, &spec.comments, DeclRef::Type(spec.ty), None, kind);

                    if kind == Kind::Interface {
                        for method in &spec.methods {
                            collect(
                                &mut local,
                                &method.comments,
                                DeclRef::InterfaceMethod {
                                    iface: spec.ty,
                                    method: method.name.clone(),
                                },
                                Some(spec.ty),
                                Kind::InterfaceMethod,
                            );
                        }
                    }
                }
            }

            SyntaxDecl::DiscardBinding(binding) => {
                if let Some(assertion) = extract_assertion(prog, binding) {
                    debug!(
                        iface = %prog.type_string(assertion.iface),
                        imp = %prog.type_string(assertion.imp),
                        "assertion"
                    );
                    local.assertions.push(assertion);
                }
            }
        }
    }

    if !local.annotations.is_empty() || !local.assertions.is_empty() {
        let mut out = shared.lock().unwrap();
        out.annotations.append(&mut local.annotations);
        out.assertions.append(&mut local.assertions);
    }
}

fn collect(
    out: &mut ScanOutput,
    groups: &[CommentGroup],
    decl: DeclRef,
    enclosing: Option<gavel_core::types::TypeId>,
    kind: Kind,
) {
    for group in groups {
        for comment in &group.comments {
            for m in scan_comment(&comment.text) {
                debug!(contract = %m.contract, kind = %kind, pos = %comment.pos, "target");
                out.annotations.push(Annotation {
                    contract: m.contract,
                    config: m.config,
                    decl: decl.clone(),
                    enclosing,
                    kind,
                    pos: comment.pos.clone(),
                });
            }
        }
    }
}

/// A discard binding contributes an assertion iff the declared type is a
/// named interface and the value's type is a named concrete type, or a
/// single pointer to one. Anonymous struct literals do not contribute.
fn extract_assertion(
    prog: &Program,
    binding: &gavel_core::syntax::DiscardBinding,
) -> Option<Assertion> {
    if prog.named(binding.declared).is_none() || !prog.is_interface(binding.declared) {
        return None;
    }
    let concrete = match prog.type_kind(binding.value) {
        TypeKind::Pointer(elem) => *elem,
        _ => binding.value,
    };
    match prog.named(concrete) {
        Some(_) if !prog.is_interface(concrete) => Some(Assertion {
            iface: binding.declared,
            imp: concrete,
            pos: binding.pos.clone(),
        }),
        _ => None,
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
