use std::sync::mpsc::Sender;

use gavel_core::cancel::CancelToken;
use gavel_core::decl::{Kind, Member};
use gavel_core::position::Position;
use gavel_core::program::Program;

use crate::oracle::Oracle;
use crate::report::Report;

/// The per-target invocation context handed to a contract.
///
/// `declaration` is the SSA member the annotation was written on;
/// `objects` is the aggregated set the contract should examine, which
/// depends on the annotation kind:
///
/// | kind             | objects                                        |
/// |------------------|------------------------------------------------|
/// | function, method | the annotated function                         |
/// | type             | the annotated type                             |
/// | interface        | one type per implementer                       |
/// | interface method | one function per implementer's matching method |
pub struct Context<'a> {
    pub(crate) program: &'a Program,
    pub(crate) oracle: &'a Oracle,
    pub(crate) contract: &'a str,
    pub(crate) kind: Kind,
    pub(crate) declaration: Member,
    pub(crate) objects: Vec<Member>,
    pub(crate) asserted_only: bool,
    pub(crate) cancel: CancelToken,
    pub(crate) reports: Sender<Report>,
}

impl Context<'_> {
    pub fn program(&self) -> &Program {
        self.program
    }

    pub fn oracle(&self) -> &Oracle {
        self.oracle
    }

    /// The contract name this invocation runs under.
    pub fn contract(&self) -> &str {
        self.contract
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn declaration(&self) -> Member {
        self.declaration
    }

    pub fn objects(&self) -> &[Member] {
        &self.objects
    }

    /// Whether implementer queries should consider only explicit assertions.
    pub fn asserted_only(&self) -> bool {
        self.asserted_only
    }

    /// Cooperative cancellation; compute-bound contracts poll this at loop
    /// granularity.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The run's cancellation token, for contracts that thread it through
    /// their own analysis loops.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Adds a violation at `pos` to the run's output.
    pub fn report(&self, pos: Position, info: impl Into<String>) {
        // The aggregator only goes away when the run is being torn down;
        // a failed send is a report after cancellation.
        let _ = self.reports.send(Report {
            pos,
            contract: self.contract.to_string(),
            info: info.into(),
        });
    }
}
