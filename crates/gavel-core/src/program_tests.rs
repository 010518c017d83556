use super::*;
use crate::builder::ProgramBuilder;
use crate::types::{MethodSig, Receiver, ReceiverForm, Signature};

fn pos(line: u32) -> Position {
    Position::new("fixture.x", line, 1)
}

/// One package with an interface `Stringer { String() string }` and three
/// types: `ByValue` (value receiver), `ByPointer` (pointer receiver), and
/// `Unrelated` (no methods).
fn fixture() -> Program {
    let mut b = ProgramBuilder::new();
    let string = b.basic("string");
    let pkg = b.package("example.io/demo", "demo", true);

    let sig = Signature::new(vec![], vec![string]);
    let stringer = b.named_interface(
        Some(pkg),
        "Stringer",
        vec![MethodSig {
            name: "String".to_string(),
            sig: sig.clone(),
        }],
        pos(1),
    );
    let by_value = b.named_struct(pkg, "ByValue", pos(5));
    let by_pointer = b.named_struct(pkg, "ByPointer", pos(10));
    b.named_struct(pkg, "Unrelated", pos(15));

    b.declare_func(
        pkg,
        "String",
        sig.clone(),
        Some(Receiver {
            ty: by_value,
            pointer: false,
        }),
        pos(6),
    );
    b.declare_func(
        pkg,
        "String",
        sig,
        Some(Receiver {
            ty: by_pointer,
            pointer: true,
        }),
        pos(11),
    );

    let _ = stringer;
    b.finish()
}

#[test]
fn test_method_sets_respect_receiver_form() {
    let prog = fixture();
    let by_value = prog.lookup("example.io/demo", "ByValue").unwrap();
    let by_pointer = prog.lookup("example.io/demo", "ByPointer").unwrap();

    assert_eq!(prog.method_set(by_value, false).len(), 1);
    assert_eq!(prog.method_set(by_value, true).len(), 1);
    assert_eq!(prog.method_set(by_pointer, false).len(), 0);
    assert_eq!(prog.method_set(by_pointer, true).len(), 1);
}

#[test]
fn test_implements_selects_receiver_form() {
    let prog = fixture();
    let stringer = prog.lookup("example.io/demo", "Stringer").unwrap();
    let by_value = prog.lookup("example.io/demo", "ByValue").unwrap();
    let by_pointer = prog.lookup("example.io/demo", "ByPointer").unwrap();
    let unrelated = prog.lookup("example.io/demo", "Unrelated").unwrap();

    assert_eq!(prog.implements(by_value, stringer), Some(ReceiverForm::Value));
    assert_eq!(
        prog.implements(by_pointer, stringer),
        Some(ReceiverForm::Pointer)
    );
    assert_eq!(prog.implements(unrelated, stringer), None);
}

#[test]
fn test_implementers_are_sorted_and_exclude_interfaces() {
    let prog = fixture();
    let stringer = prog.lookup("example.io/demo", "Stringer").unwrap();
    let names: Vec<String> = prog
        .implementers(stringer)
        .into_iter()
        .map(|id| prog.named(id).unwrap().name.clone())
        .collect();
    assert_eq!(names, vec!["ByPointer", "ByValue"]);
}

#[test]
fn test_underlying_and_is_interface() {
    let prog = fixture();
    let stringer = prog.lookup("example.io/demo", "Stringer").unwrap();
    let by_value = prog.lookup("example.io/demo", "ByValue").unwrap();
    assert!(prog.is_interface(stringer));
    assert!(!prog.is_interface(by_value));
    assert!(matches!(
        prog.type_kind(prog.underlying(stringer)),
        TypeKind::Interface(_)
    ));
}

#[test]
fn test_type_and_func_rendering() {
    let mut b = ProgramBuilder::new();
    let pkg = b.package("example.io/demo", "demo", true);
    let t = b.named_struct(pkg, "Widget", pos(1));
    let ptr = b.pointer_to(t);
    let fid = b.declare_func(
        pkg,
        "Mend",
        Signature::default(),
        Some(Receiver {
            ty: t,
            pointer: true,
        }),
        pos(2),
    );
    let prog = b.finish();

    assert_eq!(prog.type_string(t), "example.io/demo.Widget");
    assert_eq!(prog.type_string(ptr), "*example.io/demo.Widget");
    assert_eq!(prog.func_string(fid), "example.io/demo.(*Widget).Mend");
}

#[test]
fn test_is_exported() {
    assert!(is_exported("Widget"));
    assert!(!is_exported("widget"));
    assert!(!is_exported(""));
}
