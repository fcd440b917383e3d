use super::common::*;
use jsonshape::{MemberClause, Pattern, PatternErrorKind, PatternGraph, TypeMarker};

#[test]
fn renders_plain_object() {
    let mut graph = PatternGraph::new();
    let string = ty(&mut graph, TypeMarker::String);
    let integer = ty(&mut graph, TypeMarker::Integer);
    let root = object(&mut graph, vec![("name", string), ("age", integer)]);
    assert_eq!(
        graph.display(root).expect("renders"),
        r#"{"name": string, "age": integer}"#
    );
}

#[test]
fn renders_cycle_with_back_reference_label() {
    let mut graph = PatternGraph::new();
    let string = ty(&mut graph, TypeMarker::String);
    let email = ty(&mut graph, TypeMarker::Email);
    let person = graph.reserve();
    let back = graph.add(Pattern::Cyclic(person));
    let friends = graph.add(Pattern::ArrayOf(back));
    graph
        .fill(
            person,
            Pattern::Object(vec![
                MemberClause::named("name", string),
                MemberClause::named("email", email),
                MemberClause::named("friends", friends),
            ]),
        )
        .expect("reserved slot");

    assert_eq!(
        graph.display(person).expect("renders"),
        r##"#1={"name": string, "email": email, "friends": [#1]}"##
    );
}

#[test]
fn counters_restart_for_each_render() {
    let mut graph = PatternGraph::new();
    let tree = graph.reserve();
    let children = graph.add(Pattern::ArrayOf(tree));
    let leaf = graph.add(Pattern::Type(TypeMarker::Integer));
    graph.fill(tree, Pattern::OneOf(vec![leaf, children])).expect("reserved slot");

    let first = graph.display(tree).expect("renders");
    let second = graph.display(tree).expect("renders");
    assert_eq!(first, "#1=one_of(integer | [#1])");
    assert_eq!(first, second);
}

#[test]
fn shared_acyclic_nodes_are_printed_in_full() {
    let mut graph = PatternGraph::new();
    let string = ty(&mut graph, TypeMarker::String);
    let pair = object(&mut graph, vec![("a", string), ("b", string)]);
    let root = graph.add(Pattern::ArrayOf(pair));
    assert_eq!(graph.display(root).expect("renders"), r#"[{"a": string, "b": string}]"#);
}

#[test]
fn renders_every_clause_kind() {
    let mut graph = PatternGraph::new();
    let integer = ty(&mut graph, TypeMarker::Integer);
    let string = ty(&mut graph, TypeMarker::String);
    let anything = graph.add(Pattern::Anything);
    let base = object(&mut graph, vec![("id", integer)]);
    let red = graph.add(Pattern::literal("red"));
    let word = graph.add(Pattern::regex("^w"));
    let colour = graph.add(Pattern::OneOf(vec![red, word]));
    let root = graph.add(Pattern::Object(vec![
        MemberClause::Flatten(base),
        MemberClause::named("colour", colour),
        MemberClause::OneOf(vec![
            vec![MemberClause::named("car", string)],
            vec![MemberClause::named("bike", string)],
        ]),
        MemberClause::Optional(vec![MemberClause::named("count", integer)]),
        MemberClause::Many(anything),
    ]));

    let expected = concat!(
        r#"{...{"id": integer}, "colour": one_of("red" | /^w/), "#,
        r#"one_of({"car": string} | {"bike": string}), "#,
        r#"optional {"count": integer}, *: anything}"#,
    );
    assert_eq!(graph.display(root).expect("renders"), expected);
}

#[test]
fn rendering_unfilled_slot_fails() {
    let mut graph = PatternGraph::new();
    let slot = graph.reserve();
    let root = graph.add(Pattern::ArrayOf(slot));
    let err = graph.display(root).expect_err("unfilled");
    assert_eq!(err.kind, PatternErrorKind::UnfilledSlot);
}
