use super::*;
use gavel_core::builder::ProgramBuilder;
use gavel_core::position::Position;
use gavel_core::types::{MethodSig, Receiver, Signature};

fn pos(line: u32) -> Position {
    Position::new("oracle.x", line, 1)
}

/// Interface `Speaker { Speak() string }` with three structural implementers
/// across two packages, only one of which carries an explicit assertion.
fn fixture() -> (Program, TypeId, Vec<Assertion>) {
    let mut b = ProgramBuilder::new();
    let string = b.basic("string");
    let zoo = b.package("example.io/zoo", "zoo", true);
    let farm = b.package("example.io/farm", "farm", true);

    let sig = Signature::new(vec![], vec![string]);
    let speaker = b.named_interface(
        Some(zoo),
        "Speaker",
        vec![MethodSig {
            name: "Speak".to_string(),
            sig: sig.clone(),
        }],
        pos(1),
    );

    let lion = b.named_struct(zoo, "Lion", pos(5));
    let cow = b.named_struct(farm, "Cow", pos(5));
    let goat = b.named_struct(farm, "Goat", pos(9));
    for (ty, pointer) in [(lion, false), (cow, false), (goat, true)] {
        b.declare_func(
            if ty == lion { zoo } else { farm },
            "Speak",
            sig.clone(),
            Some(Receiver { ty, pointer }),
            pos(6),
        );
    }

    let assertions = vec![Assertion {
        iface: speaker,
        imp: lion,
        pos: pos(20),
    }];
    (b.finish(), speaker, assertions)
}

#[test]
fn test_asserted_only_returns_exactly_the_assertions() {
    let (prog, speaker, assertions) = fixture();
    let oracle = Oracle::new(&prog, &assertions);
    let impls = oracle.type_implementers(&prog, speaker, true);
    assert_eq!(impls.len(), 1);
    assert_eq!(prog.named(impls[0]).unwrap().name, "Lion");
}

#[test]
fn test_structural_closure_is_ordered_by_package_then_name() {
    let (prog, speaker, assertions) = fixture();
    let oracle = Oracle::new(&prog, &assertions);
    let names: Vec<String> = oracle
        .type_implementers(&prog, speaker, false)
        .into_iter()
        .map(|id| {
            let n = prog.named(id).unwrap();
            format!("{}.{}", prog.pkg(n.pkg.unwrap()).path, n.name)
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "example.io/farm.Cow",
            "example.io/farm.Goat",
            "example.io/zoo.Lion"
        ]
    );
}

#[test]
fn test_asserted_set_is_subset_of_structural_closure() {
    let (prog, speaker, assertions) = fixture();
    let oracle = Oracle::new(&prog, &assertions);
    let narrow = oracle.type_implementers(&prog, speaker, true);
    let wide = oracle.type_implementers(&prog, speaker, false);
    for imp in narrow {
        assert!(wide.contains(&imp));
    }
}

#[test]
fn test_method_implementers_select_receiver_form() {
    let (prog, speaker, assertions) = fixture();
    let oracle = Oracle::new(&prog, &assertions);
    let methods = oracle.method_implementers(&prog, speaker, "Speak", false);
    assert_eq!(methods.len(), 3);
    for id in methods {
        assert_eq!(prog.func(id).name, "Speak");
    }
}
