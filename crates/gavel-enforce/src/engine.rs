use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use tracing::debug;

use gavel_core::cancel::CancelToken;
use gavel_core::decl::{DeclRef, Kind, Member};
use gavel_core::loader::{Loader, LoadOptions};
use gavel_core::program::Program;

use crate::contract::ContractRegistry;
use crate::context::Context;
use crate::errors::EnforceError;
use crate::oracle::Oracle;
use crate::report::{self, Report, Results};
use crate::target::{build_targets, Target};

/// The main entry point of a generated linter binary: configuration plus the
/// phases of one enforcement run.
///
/// A run is load → scan → target table → concurrent enforcement. SSA is
/// expected prebuilt by the loader, and every target is bound and configured
/// before the first contract executes, so misconfigured runs fail without
/// doing analysis work.
pub struct Enforcer {
    /// Only consider interface implementers recorded by an explicit
    /// assertion.
    pub asserted_only: bool,
    /// Working directory override for the loader.
    pub dir: PathBuf,
    /// The name of the generated linter.
    pub name: String,
    /// Package patterns to enforce contracts upon.
    pub packages: Vec<String>,
    /// Include test sources.
    pub tests: bool,
    /// Providers for the contract implementations compiled into the binary.
    pub registry: ContractRegistry,
}

impl Enforcer {
    pub fn new(name: impl Into<String>, registry: ContractRegistry) -> Self {
        Self {
            asserted_only: false,
            dir: PathBuf::from("."),
            name: name.into(),
            packages: Vec::new(),
            tests: false,
            registry,
        }
    }

    /// Runs enforcement and returns the aggregated reports. The first fatal
    /// error wins; contract violations accumulate and are never fatal.
    pub fn execute(
        &self,
        loader: &dyn Loader,
        cancel: &CancelToken,
    ) -> Result<Results, EnforceError> {
        if self.packages.is_empty() {
            return Err(EnforceError::NoPackages);
        }
        debug!(name = %self.name, packages = ?self.packages, "enforcing");

        let opts = LoadOptions {
            dir: self.dir.clone(),
            patterns: self.packages.clone(),
            tests: self.tests,
        };
        let prog = loader.load(&opts)?;

        let scanned = gavel_scan::scan(&prog, cancel);
        if cancel.is_cancelled() {
            return Err(EnforceError::Cancelled);
        }

        let targets = build_targets(&prog, scanned.annotations, &self.registry)?;
        let oracle = Oracle::new(&prog, &scanned.assertions);

        let results = self.enforce_all(&prog, &oracle, targets, cancel);
        if cancel.is_cancelled() {
            return Err(EnforceError::Cancelled);
        }
        Ok(results)
    }

    /// Dispatches all targets across a worker pool and aggregates reports.
    fn enforce_all(
        &self,
        prog: &Program,
        oracle: &Oracle,
        targets: Vec<Target>,
        cancel: &CancelToken,
    ) -> Results {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let (report_tx, report_rx) = mpsc::channel::<Report>();
        let (target_tx, target_rx) = mpsc::channel::<Target>();
        let target_rx = Mutex::new(target_rx);

        thread::scope(|s| {
            let collector = s.spawn(move || report::collect(report_rx));

            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let tx = report_tx.clone();
                let target_rx = &target_rx;
                handles.push(s.spawn(move || loop {
                    if cancel.is_cancelled() {
                        return;
                    }
                    let tgt = target_rx.lock().unwrap().recv();
                    match tgt {
                        Ok(t) => self.enforce_one(prog, oracle, t, &tx, cancel),
                        Err(_) => return,
                    }
                }));
            }
            drop(report_tx);

            // Each target is moved into the channel, so the dispatcher holds
            // no reference once it is handed to a worker.
            for tgt in targets {
                if cancel.is_cancelled() {
                    break;
                }
                if target_tx.send(tgt).is_err() {
                    break;
                }
            }
            drop(target_tx);

            for h in handles {
                let _ = h.join();
            }
            collector.join().unwrap_or_default()
        })
    }

    /// Resolves one target into its invocation context and runs the
    /// contract. An error from the contract is reported against the target's
    /// declaration.
    fn enforce_one(
        &self,
        prog: &Program,
        oracle: &Oracle,
        mut tgt: Target,
        reports: &mpsc::Sender<Report>,
        cancel: &CancelToken,
    ) {
        let Some(mut instance) = tgt.instance.take() else {
            return;
        };

        let (declaration, objects) = match &tgt.decl {
            DeclRef::Func(fid) => (Member::Func(*fid), vec![Member::Func(*fid)]),
            DeclRef::Type(ty) => match tgt.kind {
                Kind::Interface => {
                    let impls = oracle.type_implementers(prog, *ty, self.asserted_only);
                    (
                        Member::Type(*ty),
                        impls.into_iter().map(Member::Type).collect(),
                    )
                }
                _ => (Member::Type(*ty), vec![Member::Type(*ty)]),
            },
            DeclRef::InterfaceMethod { iface, method } => {
                let impls = oracle.method_implementers(prog, *iface, method, self.asserted_only);
                (
                    Member::Type(*iface),
                    impls.into_iter().map(Member::Func).collect(),
                )
            }
        };

        debug!(
            pos = %tgt.pos,
            kind = %tgt.kind,
            decl = prog.member_name(declaration),
            objects = objects.len(),
            "enforcing"
        );

        let ctx = Context {
            program: prog,
            oracle,
            contract: &tgt.contract,
            kind: tgt.kind,
            declaration,
            objects,
            asserted_only: self.asserted_only,
            cancel: cancel.clone(),
            reports: reports.clone(),
        };

        if let Err(err) = instance.enforce(&ctx) {
            ctx.report(
                prog.member_pos(declaration),
                format!("{}: {}", tgt.contract, err),
            );
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
