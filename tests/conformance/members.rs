use super::common::*;
use jsonshape::{
    Failure, MemberClause, Path, PathStep, Pattern, PatternGraph, PatternId, TypeMarker,
};
use serde_json::json;

// ─── Optional groups ────────────────────────────────────────────────────────

#[test]
fn untriggered_optional_group_leaves_members_unconsumed() {
    let mut graph = PatternGraph::new();
    let integer = ty(&mut graph, TypeMarker::Integer);
    let root = graph.add(Pattern::Object(vec![MemberClause::Optional(vec![
        MemberClause::named("count", integer),
    ])]));

    let failures = validate(&graph, root, &json!({"blink": 3}));
    assert_eq!(
        failures,
        vec![Failure::unexpected(&Path::root(), "names: blink", "end of object members")]
    );
    assert!(validate(&graph, root, &json!({})).is_empty());
    assert!(validate(&graph, root, &json!({"count": 3})).is_empty());
}

#[test]
fn triggered_optional_group_requires_all_members() {
    let mut graph = PatternGraph::new();
    let integer = ty(&mut graph, TypeMarker::Integer);
    let string = ty(&mut graph, TypeMarker::String);
    let root = graph.add(Pattern::Object(vec![MemberClause::Optional(vec![
        MemberClause::named("count", integer),
        MemberClause::named("unit", string),
    ])]));

    assert!(validate(&graph, root, &json!({"count": 1, "unit": "kg"})).is_empty());
    assert_eq!(
        validate(&graph, root, &json!({"count": 1})),
        vec![Failure::unexpected(&Path::root(), "end of object members", "name:\"unit\"")]
    );
}

#[test]
fn optional_group_is_triggered_only_by_its_first_name() {
    let mut graph = PatternGraph::new();
    let integer = ty(&mut graph, TypeMarker::Integer);
    let string = ty(&mut graph, TypeMarker::String);
    let root = graph.add(Pattern::Object(vec![
        MemberClause::named("id", integer),
        MemberClause::Optional(vec![
            MemberClause::named("count", integer),
            MemberClause::named("unit", string),
        ]),
    ]));

    // `unit` alone does not open the group
    assert_eq!(
        validate(&graph, root, &json!({"id": 1, "unit": "kg"})),
        vec![Failure::unexpected(&Path::root(), "names: unit", "end of object members")]
    );
}

// ─── Many members ───────────────────────────────────────────────────────────

#[test]
fn many_members_validates_and_consumes_everything_left() {
    let mut graph = PatternGraph::new();
    let string = ty(&mut graph, TypeMarker::String);
    let integer = ty(&mut graph, TypeMarker::Integer);
    let root = graph.add(Pattern::Object(vec![
        MemberClause::named("name", string),
        MemberClause::Many(integer),
    ]));

    let failures = validate(&graph, root, &json!({"name": "x", "a": 1, "b": "two", "c": 3}));
    assert_eq!(
        failures,
        vec![Failure::unexpected(&path(vec![name("b")]), "string", "integer")]
    );
    assert!(validate(&graph, root, &json!({"name": "x"})).is_empty());
}

#[test]
fn many_members_of_arrays_reports_nested_paths() {
    let mut graph = PatternGraph::new();
    let integer = ty(&mut graph, TypeMarker::Integer);
    let list = graph.add(Pattern::ArrayOf(integer));
    let root = graph.add(Pattern::Object(vec![MemberClause::Many(list)]));

    let failures = validate(&graph, root, &json!({"odd": [1, 3], "even": [2, "four"]}));
    assert_eq!(
        failures,
        vec![Failure::unexpected(
            &path(vec![name("even"), PathStep::Index(1)]),
            "string",
            "integer"
        )]
    );
}

// ─── Sequencing ─────────────────────────────────────────────────────────────

#[test]
fn clause_failures_follow_declared_order() {
    let mut graph = PatternGraph::new();
    let integer = ty(&mut graph, TypeMarker::Integer);
    let root = object(&mut graph, vec![("a", integer), ("b", integer)]);

    let failures = validate(&graph, root, &json!({"b": "y", "a": "x"}));
    assert_eq!(
        failures,
        vec![
            Failure::unexpected(&path(vec![name("a")]), "string", "integer"),
            Failure::unexpected(&path(vec![name("b")]), "string", "integer"),
        ]
    );
}

// ─── Flatten ────────────────────────────────────────────────────────────────

#[test]
fn flattened_object_members_are_inlined() {
    let mut graph = PatternGraph::new();
    let integer = ty(&mut graph, TypeMarker::Integer);
    let string = ty(&mut graph, TypeMarker::String);
    let base = object(&mut graph, vec![("id", integer)]);
    let root = graph.add(Pattern::Object(vec![
        MemberClause::Flatten(base),
        MemberClause::named("name", string),
    ]));

    assert!(validate(&graph, root, &json!({"id": 1, "name": "n"})).is_empty());
    assert_eq!(
        validate(&graph, root, &json!({"id": "1", "name": "n"})),
        vec![Failure::unexpected(&path(vec![name("id")]), "string", "integer")]
    );
    // The flattened object on its own still rejects the extra member.
    assert_eq!(
        validate(&graph, base, &json!({"id": 1, "name": "n"})),
        vec![Failure::unexpected(&Path::root(), "names: name", "end of object members")]
    );
}

#[test]
fn flatten_can_feed_an_optional_group() {
    let mut graph = PatternGraph::new();
    let integer = ty(&mut graph, TypeMarker::Integer);
    let paging = object(&mut graph, vec![("offset", integer), ("limit", integer)]);
    let root = graph.add(Pattern::Object(vec![MemberClause::Optional(vec![
        MemberClause::Flatten(paging),
    ])]));

    assert!(validate(&graph, root, &json!({})).is_empty());
    assert!(validate(&graph, root, &json!({"offset": 0, "limit": 10})).is_empty());
    assert_eq!(
        validate(&graph, root, &json!({"offset": 0})),
        vec![Failure::unexpected(&Path::root(), "end of object members", "name:\"limit\"")]
    );
}

// ─── Cyclic patterns ────────────────────────────────────────────────────────

fn person(graph: &mut PatternGraph) -> PatternId {
    let string = ty(graph, TypeMarker::String);
    let email = ty(graph, TypeMarker::Email);
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
    person
}

#[test]
fn cyclic_pattern_accepts_finite_values() {
    let mut graph = PatternGraph::new();
    let root = person(&mut graph);

    let lonely = json!({"name": "A", "email": "a@b.com", "friends": []});
    assert!(validate(&graph, root, &lonely).is_empty());
    assert!(
        validate(
            &graph,
            root,
            &json!({
                "name": "A",
                "email": "a@b.com",
                "friends": [{"name": "B", "email": "b@c.org", "friends": []}]
            })
        )
        .is_empty()
    );
}

#[test]
fn cyclic_pattern_reports_deep_paths() {
    let mut graph = PatternGraph::new();
    let root = person(&mut graph);

    let failures = validate(
        &graph,
        root,
        &json!({
            "name": "A",
            "email": "a@b.com",
            "friends": [
                {"name": "B", "email": "b@c.org", "friends": []},
                {
                    "name": "C",
                    "email": "nope",
                    "friends": [{"name": 4, "email": "d@e.net", "friends": []}]
                }
            ]
        }),
    );
    assert_eq!(
        failures,
        vec![
            Failure::unexpected(
                &path(vec![name("friends"), PathStep::Index(1), name("email")]),
                "\"nope\"",
                "email"
            ),
            Failure::unexpected(
                &path(vec![
                    name("friends"),
                    PathStep::Index(1),
                    name("friends"),
                    PathStep::Index(0),
                    name("name"),
                ]),
                "integer",
                "string"
            ),
        ]
    );
}

#[test]
fn recursive_tree_through_disjunction() {
    let mut graph = PatternGraph::new();
    let integer = ty(&mut graph, TypeMarker::Integer);
    let tree = graph.reserve();
    let children = graph.add(Pattern::ArrayOf(tree));
    let node = object(&mut graph, vec![("children", children)]);
    graph.fill(tree, Pattern::OneOf(vec![integer, node])).expect("reserved slot");

    let nested = json!({"children": [1, {"children": [2, 3]}, {"children": []}]});
    assert!(validate(&graph, tree, &nested).is_empty());
    assert_eq!(
        validate(&graph, tree, &json!({"children": [1, {"children": ["x"]}]})),
        vec![Failure::Unexpected {
            path: path(vec![
                name("children"),
                PathStep::Index(1),
                name("children"),
                PathStep::Index(0),
            ]),
            found: "\"x\"".to_string(),
            expected: jsonshape::Expected::OneOf(labels(&["integer", "object"])),
        }]
    );
}
