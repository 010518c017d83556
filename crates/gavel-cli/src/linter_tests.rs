use super::*;
use clap::Parser;

use gavel_core::builder::ProgramBuilder;
use gavel_core::loader::{LoadError, LoadOptions};
use gavel_core::position::Position;
use gavel_core::program::Program;
use gavel_core::syntax::{CommentGroup, FuncDecl, SourceFile, SyntaxDecl};
use gavel_core::types::Signature;
use gavel_enforce::{Contract, ContractError, ContractProvider, Context};

struct AlwaysReport;

impl Contract for AlwaysReport {
    fn enforce(&mut self, ctx: &Context<'_>) -> Result<(), ContractError> {
        let prog = ctx.program();
        ctx.report(prog.member_pos(ctx.declaration()), "flagged");
        Ok(())
    }
}

fn fixture(_opts: &LoadOptions) -> Result<Program, LoadError> {
    let mut b = ProgramBuilder::new();
    let pkg = b.package("example.io/demo", "demo", true);
    let f = b.declare_func(
        pkg,
        "Annotated",
        Signature::default(),
        None,
        Position::new("demo.x", 2, 1),
    );
    b.add_file(
        pkg,
        SourceFile {
            path: "demo.x".to_string(),
            decls: vec![SyntaxDecl::Func(FuncDecl {
                func: f,
                comments: vec![CommentGroup::one(
                    "// contract:AlwaysReport",
                    Position::new("demo.x", 1, 1),
                )],
            })],
        },
    );
    Ok(b.finish())
}

fn linter() -> Linter {
    let mut registry = ContractRegistry::new();
    registry.register(
        "AlwaysReport",
        ContractProvider::new("", |_| Ok(Box::new(AlwaysReport) as Box<dyn Contract>)),
    );
    Linter::new("demo-linter", registry, Box::new(fixture))
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_enforce_without_packages_fails() {
    let code = linter().dispatch(parse(&["demo-linter", "enforce"]));
    assert_eq!(code, 1);
}

#[test]
fn test_enforce_succeeds_with_reports_by_default() {
    let code = linter().dispatch(parse(&["demo-linter", "enforce", "./..."]));
    assert_eq!(code, 0);
}

#[test]
fn test_set_exit_status_fails_on_reports() {
    let code = linter().dispatch(parse(&[
        "demo-linter",
        "enforce",
        "--set_exit_status",
        "./...",
    ]));
    assert_eq!(code, 1);
}

#[test]
fn test_contracts_listing_succeeds() {
    let code = linter().dispatch(parse(&["demo-linter", "contracts"]));
    assert_eq!(code, 0);
}
