use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use gavel_core::decl::{DeclRef, Kind};
use gavel_core::position::Position;
use gavel_core::program::Program;
use gavel_core::types::TypeId;
use gavel_scan::Annotation;

use crate::contract::{Contract, ContractRegistry};
use crate::errors::EnforceError;

/// An annotation resolved to a contract provider with a configured instance.
/// Mutable until enforcement begins; the engine takes the instance out when
/// the target is dispatched.
pub struct Target {
    pub contract: String,
    pub config: String,
    pub decl: DeclRef,
    pub enclosing: Option<TypeId>,
    pub kind: Kind,
    pub pos: Position,
    pub(crate) instance: Option<Box<dyn Contract>>,
}

impl Target {
    /// Targets are totally ordered by (position, contract name) for stable
    /// output.
    pub fn sort_key(&self) -> (Position, String) {
        (self.pos.clone(), self.contract.clone())
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("contract", &self.contract)
            .field("config", &self.config)
            .field("kind", &self.kind)
            .field("pos", &self.pos)
            .finish()
    }
}

/// One entry of a contract alias: a contract name with a fixed
/// configuration.
#[derive(Debug, Clone)]
struct AliasEntry {
    contract: String,
    config: String,
    pos: Position,
}

/// Normalizes scanned annotations into configured targets: splits off alias
/// definitions, expands alias uses, coalesces duplicates, and binds every
/// terminal target to its provider.
pub fn build_targets(
    prog: &Program,
    annotations: Vec<Annotation>,
    registry: &ContractRegistry,
) -> Result<Vec<Target>, EnforceError> {
    let (aliases, plain) = split_aliases(prog, annotations);

    let mut targets = Vec::new();
    for ann in &plain {
        targets.append(&mut expand(ann, &aliases)?);
    }

    // Coalesce duplicates: one target per (position, contract name).
    targets.sort_by_key(Target::sort_key);
    targets.dedup_by(|a, b| a.pos == b.pos && a.contract == b.contract);

    for tgt in &mut targets {
        let provider =
            registry
                .get(&tgt.contract)
                .ok_or_else(|| EnforceError::UnknownContract {
                    pos: tgt.pos.clone(),
                    name: tgt.contract.clone(),
                })?;
        let instance =
            provider
                .construct(&tgt.config)
                .map_err(|source| EnforceError::BadConfig {
                    pos: tgt.pos.clone(),
                    source,
                })?;
        tgt.instance = Some(instance);
    }

    Ok(targets)
}

/// An annotation defines an alias when its attached type's underlying type
/// is the program's contract-marker interface:
///
/// ```text
/// // contract:Foo { ... }
/// type Alias Contract
/// ```
fn split_aliases(
    prog: &Program,
    annotations: Vec<Annotation>,
) -> (BTreeMap<String, Vec<AliasEntry>>, Vec<Annotation>) {
    let marker = prog
        .contract_marker()
        .map(|m| prog.underlying(m));

    let mut aliases: BTreeMap<String, Vec<AliasEntry>> = BTreeMap::new();
    let mut plain = Vec::new();

    for ann in annotations {
        let alias_name = match (&ann.decl, marker) {
            (DeclRef::Type(ty), Some(marker)) if prog.underlying(*ty) == marker => {
                prog.named(*ty).map(|n| n.name.clone())
            }
            _ => None,
        };
        match alias_name {
            Some(name) => aliases.entry(name).or_default().push(AliasEntry {
                contract: ann.contract,
                config: ann.config,
                pos: ann.pos,
            }),
            None => plain.push(ann),
        }
    }

    for entries in aliases.values_mut() {
        entries.sort_by_key(|e| (e.pos.clone(), e.contract.clone()));
    }
    (aliases, plain)
}

/// Expands one annotation through the alias table into terminal targets.
/// Terminal targets keep the original annotation's position, declaration,
/// and kind, and adopt the alias entry's contract name and configuration.
fn expand(
    ann: &Annotation,
    aliases: &BTreeMap<String, Vec<AliasEntry>>,
) -> Result<Vec<Target>, EnforceError> {
    let Some(first) = aliases.get(&ann.contract) else {
        return Ok(vec![terminal(ann, &ann.contract, &ann.config)]);
    };

    // Aliases may reference aliases; a name revisited along this expansion
    // is a recursive definition.
    let mut seen: BTreeSet<String> = BTreeSet::new();
    seen.insert(ann.contract.clone());

    let mut term = Vec::new();
    let mut work: Vec<&AliasEntry> = first.iter().collect();
    while let Some(entry) = work.pop() {
        match aliases.get(&entry.contract) {
            Some(more) => {
                if !seen.insert(entry.contract.clone()) {
                    return Err(EnforceError::RecursiveAlias {
                        pos: ann.pos.clone(),
                        name: entry.contract.clone(),
                    });
                }
                work.extend(more);
            }
            None => term.push(terminal(ann, &entry.contract, &entry.config)),
        }
    }
    term.sort_by_key(Target::sort_key);
    Ok(term)
}

fn terminal(ann: &Annotation, contract: &str, config: &str) -> Target {
    Target {
        contract: contract.to_string(),
        config: config.to_string(),
        decl: ann.decl.clone(),
        enclosing: ann.enclosing,
        kind: ann.kind,
        pos: ann.pos.clone(),
        instance: None,
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
