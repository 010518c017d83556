//! Flow-sensitive return-type analysis.
//!
//! Configured with a target interface and a set of allowed concrete types,
//! the analysis walks the SSA value graph behind every return of every
//! function whose signature mentions the target interface. A function is
//! *dirty* when some returned value cannot be statically proven to be one of
//! the allowed types; the verdict carries the shortest known explanation
//! chain through the call and value graph.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Deserialize;
use tracing::trace;

use gavel_core::cancel::CancelToken;
use gavel_core::decl::Member;
use gavel_core::position::Position;
use gavel_core::program::{is_exported, Program};
use gavel_core::ssa::{Return, UnOpKind, ValueId, ValueKind};
use gavel_core::types::{FuncId, TypeId, TypeKind};
use gavel_enforce::{Contract, ContractError, Context};

/// The retlint contract configuration.
///
/// `TargetInterface` is either a simple name resolved in the universe scope
/// or a fully qualified `pkg/path/Name`; the same goes for each entry of
/// `AllowedNames`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetLint {
    #[serde(rename = "TargetInterface")]
    pub target_interface: String,
    #[serde(rename = "AllowedNames", default)]
    pub allowed_names: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RetLintError {
    #[error("no target interface name set")]
    NoTarget,

    #[error("unable to find type {0:?}")]
    UnknownType(String),
}

/// One hop of a dirty explanation: a reason and the SSA value it anchors to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtyReason {
    pub reason: String,
    pub func: FuncId,
    pub value: ValueId,
}

/// An exported function proven dirty, with its chosen explanation chain.
#[derive(Debug, Clone)]
pub struct DirtyFunction {
    pub func: FuncId,
    pub why: Vec<DirtyReason>,
}

impl DirtyFunction {
    /// Renders the verdict as a human-readable chain.
    pub fn render(&self, prog: &Program) -> String {
        let mut out = format!(
            "{} may return a disallowed value:",
            prog.func_string(self.func)
        );
        for r in &self.why {
            let pos = &prog.func(r.func).value(r.value).pos;
            out.push_str(&format!("\n{} at {}", r.reason, pos));
        }
        out
    }

    pub fn pos(&self, prog: &Program) -> Position {
        prog.func(self.func).pos.clone()
    }
}

impl RetLint {
    /// Runs the analysis over the program's input packages and returns the
    /// dirty functions that are exported and defined in those packages, in
    /// source order.
    pub fn execute(&self, prog: &Program) -> Result<Vec<DirtyFunction>, RetLintError> {
        let analysis = self.analyze_program(prog, None)?;
        let mut dirty: Vec<DirtyFunction> = analysis
            .stats
            .iter()
            .filter(|s| s.state == State::Dirty)
            .filter(|s| is_exported(&prog.func(s.func).name))
            .filter(|s| prog.pkg(prog.func(s.func).pkg).input)
            .map(|s| DirtyFunction {
                func: s.func,
                why: s.why.clone(),
            })
            .collect();
        dirty.sort_by_key(|d| d.pos(prog));
        Ok(dirty)
    }

    fn analyze_program<'a>(
        &self,
        prog: &'a Program,
        cancel: Option<&CancelToken>,
    ) -> Result<Analysis<'a>, RetLintError> {
        if self.target_interface.is_empty() {
            return Err(RetLintError::NoTarget);
        }
        let target = resolve(prog, &self.target_interface)?;
        let mut allowed = HashSet::new();
        for name in &self.allowed_names {
            allowed.insert(resolve(prog, name)?);
        }

        let mut analysis = Analysis {
            prog,
            target,
            allowed,
            stats: Vec::new(),
            index: HashMap::new(),
            work: Vec::new(),
        };

        // Seed with every function of the input packages; methods are
        // regular functions with receivers in this model, so both method
        // sets are covered.
        for (fid, f) in prog.functions() {
            if prog.pkg(f.pkg).input {
                analysis.stat(fid);
            }
        }

        // Outer rounds drain the current work list; stat() appends newly
        // encountered callees. Terminate when a round adds nothing.
        while !analysis.work.is_empty() {
            let round = std::mem::take(&mut analysis.work);
            for idx in round {
                if cancel.is_some_and(CancelToken::is_cancelled) {
                    return Ok(analysis);
                }
                analysis.analyze(idx);
            }
        }

        // Anything that survived the fixed point without a dirty verdict is
        // clean.
        for stat in &mut analysis.stats {
            if stat.state == State::Analyzing {
                stat.state = State::Clean;
            }
        }
        Ok(analysis)
    }
}

impl Contract for RetLint {
    /// Reports every dirty function among the invocation's objects, each
    /// with its rendered explanation chain.
    fn enforce(&mut self, ctx: &Context<'_>) -> Result<(), ContractError> {
        let prog = ctx.program();
        let cancel = ctx.cancel_token();
        let analysis = self
            .analyze_program(prog, Some(&cancel))
            .map_err(|e| ContractError::new(e.to_string()))?;

        for member in ctx.objects() {
            let Member::Func(fid) = member else { continue };
            if let Some(stat) = analysis.lookup(*fid) {
                if stat.state == State::Dirty {
                    let dirty = DirtyFunction {
                        func: *fid,
                        why: stat.why.clone(),
                    };
                    ctx.report(dirty.pos(prog), dirty.render(prog));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unknown,
    Analyzing,
    Clean,
    Dirty,
}

struct FuncStat {
    func: FuncId,
    returns: Vec<Return>,
    target_indices: Vec<usize>,
    state: State,
    why: Vec<DirtyReason>,
    /// Callers awaiting this function's verdict, keyed by their stat index,
    /// with the call site in the caller's value arena.
    dependents: HashMap<usize, ValueId>,
}

impl FuncStat {
    fn new(func: FuncId) -> Self {
        Self {
            func,
            returns: Vec::new(),
            target_indices: Vec::new(),
            state: State::Unknown,
            why: Vec::new(),
            dependents: HashMap::new(),
        }
    }
}

struct Analysis<'a> {
    prog: &'a Program,
    target: TypeId,
    allowed: HashSet<TypeId>,
    stats: Vec<FuncStat>,
    index: HashMap<FuncId, usize>,
    work: Vec<usize>,
}

impl Analysis<'_> {
    fn lookup(&self, func: FuncId) -> Option<&FuncStat> {
        self.index.get(&func).map(|idx| &self.stats[*idx])
    }

    /// Memoizes a stat for the function, queueing it for analysis and
    /// extracting its return sites on first sight.
    fn stat(&mut self, func: FuncId) -> usize {
        if let Some(&idx) = self.index.get(&func) {
            return idx;
        }
        let idx = self.stats.len();
        self.stats.push(FuncStat::new(func));
        self.index.insert(func, idx);
        self.work.push(idx);
        self.extract(idx);
        idx
    }

    /// Determines relevance (some result slot names the target interface)
    /// and gathers every return instruction. Irrelevant functions are
    /// permanently clean.
    fn extract(&mut self, idx: usize) {
        let f = self.prog.func(self.stats[idx].func);
        let target_indices: Vec<usize> = f
            .sig
            .results
            .iter()
            .enumerate()
            .filter(|(_, res)| **res == self.target)
            .map(|(i, _)| i)
            .collect();
        if target_indices.is_empty() {
            self.stats[idx].state = State::Clean;
            return;
        }
        self.stats[idx].returns = f.returns().cloned().collect();
        self.stats[idx].target_indices = target_indices;
    }

    /// Analyzes one function. A no-op unless the function is still in the
    /// `Unknown` state; `Analyzing` guards against re-entrance through
    /// recursion. A panic during analysis is re-raised with the function's
    /// qualified name prepended, so compiler-IR bugs keep their locality.
    fn analyze(&mut self, idx: usize) {
        if self.stats[idx].state != State::Unknown {
            return;
        }
        let name = self.prog.func_string(self.stats[idx].func);
        trace!(func = %name, "analyzing");
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| self.analyze_inner(idx))) {
            panic!("{}: {}", name, panic_message(payload));
        }
    }

    fn analyze_inner(&mut self, idx: usize) {
        self.stats[idx].state = State::Analyzing;
        let returns = self.stats[idx].returns.clone();
        let target_indices = self.stats[idx].target_indices.clone();
        let mut seen = HashSet::new();
        for ret in &returns {
            for &i in &target_indices {
                self.decide(idx, ret.results[i], &mut seen);
                if self.stats[idx].state != State::Analyzing {
                    return;
                }
            }
        }
        // Tentatively clean; the verdict is pending until the global fixed
        // point in case a callee still in flight turns dirty.
    }

    /// Marks the function dirty unless the value is statically resolvable
    /// to an allowed concrete type, recursing through the value shapes that
    /// forward other values.
    fn decide(&mut self, idx: usize, val: ValueId, seen: &mut HashSet<ValueId>) {
        if !seen.insert(val) {
            return;
        }
        let prog = self.prog;
        let func_id = self.stats[idx].func;
        let value = prog.func(func_id).value(val);
        match &value.kind {
            ValueKind::Call {
                callee: Some(callee),
            } => {
                let next = self.stat(*callee);
                self.analyze(next);
                match self.stats[next].state {
                    // Already proven clean; nothing to do.
                    State::Clean => {}
                    State::Dirty => {
                        let mut why = vec![DirtyReason {
                            reason: "calls".to_string(),
                            func: func_id,
                            value: val,
                        }];
                        why.extend(self.stats[next].why.iter().cloned());
                        self.mark_dirty(idx, why);
                    }
                    // Verdict pending; register for future dirtying.
                    _ => {
                        self.stats[next].dependents.insert(idx, val);
                    }
                }
            }

            ValueKind::Call { callee: None } => {
                self.dirty_value(idx, val, "callee not static".to_string());
            }

            ValueKind::Const { nil, .. } => {
                if !nil && !self.is_allowed(value.ty) {
                    let ty = prog.type_string(value.ty);
                    self.dirty_value(idx, val, format!("constant of type {ty:?}"));
                }
            }

            // Unpacking of a multiple-result call or comma-ok expression.
            ValueKind::Extract { tuple, .. } => self.decide(idx, *tuple, seen),

            ValueKind::MakeInterface { value } => self.decide(idx, *value, seen),

            // The convergence of the flows after a branch; every incoming
            // edge must prove out.
            ValueKind::Phi { edges } => {
                for edge in edges.clone() {
                    self.decide(idx, edge, seen);
                }
            }

            ValueKind::TypeAssert { asserted, .. } => {
                // TODO: a comma-ok assert that dominates a later return of
                // the tested value does not narrow it here; dominance-aware
                // narrowing would remove that over-approximation.
                if !self.is_allowed(*asserted) {
                    let ty = prog.type_string(*asserted);
                    self.dirty_value(idx, val, format!("assertion to {ty:?}"));
                }
            }

            ValueKind::UnOp {
                op: UnOpKind::Deref,
                operand,
            } => self.decide(idx, *operand, seen),

            _ => {
                if !self.is_allowed(value.ty) {
                    let ty = prog.type_string(value.ty);
                    self.dirty_value(idx, val, format!("result of disallowed type {ty:?}"));
                }
            }
        }
    }

    /// Unwraps pointers down to a named type and tests set membership.
    /// Tuples are unpacked during extraction and must never reach here.
    fn is_allowed(&self, mut ty: TypeId) -> bool {
        loop {
            match self.prog.type_kind(ty) {
                TypeKind::Pointer(elem) => ty = *elem,
                TypeKind::Named(_) => return self.allowed.contains(&ty),
                TypeKind::Tuple(_) => {
                    panic!("tuple type in allowed check; returns are unpacked during extraction")
                }
                _ => return false,
            }
        }
    }

    fn dirty_value(&mut self, idx: usize, val: ValueId, reason: String) {
        let func = self.stats[idx].func;
        self.mark_dirty(
            idx,
            vec![DirtyReason {
                reason,
                func,
                value: val,
            }],
        );
    }

    /// Marks the function dirty and propagates to registered dependents.
    /// A stored explanation is only ever replaced by a strictly shorter
    /// one, which propagation preserves, so explanations converge to the
    /// globally shortest chains. A dirty function never becomes clean.
    fn mark_dirty(&mut self, idx: usize, why: Vec<DirtyReason>) {
        let stat = &mut self.stats[idx];
        let mut changed = false;
        if stat.why.is_empty() || why.len() < stat.why.len() {
            stat.why = why;
            changed = true;
        }
        if stat.state == State::Dirty && !changed {
            return;
        }
        stat.state = State::Dirty;

        let chosen = stat.why.clone();
        let dependents: Vec<(usize, ValueId)> =
            stat.dependents.iter().map(|(k, v)| (*k, *v)).collect();
        for (dep, call) in dependents {
            let mut next_why = vec![DirtyReason {
                reason: "calls".to_string(),
                func: self.stats[dep].func,
                value: call,
            }];
            next_why.extend(chosen.iter().cloned());
            self.mark_dirty(dep, next_why);
        }
    }
}

/// Looks up a named type: simple names against the universe scope,
/// `pkg/path/Name` against the loaded packages.
fn resolve(prog: &Program, name: &str) -> Result<TypeId, RetLintError> {
    let found = match name.rfind('/') {
        Some(split) => prog.lookup(&name[..split], &name[split + 1..]),
        None => prog.universe_lookup(name),
    };
    found.ok_or_else(|| RetLintError::UnknownType(name.to_string()))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic".to_string()
    }
}

#[cfg(test)]
#[path = "retlint_tests.rs"]
mod tests;
