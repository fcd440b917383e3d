#![no_main]

use jsonshape::{MemberClause, Pattern, PatternGraph, TypeMarker};
use libfuzzer_sys::fuzz_target;

/// A recursive tagged tree with optional metadata and open extensions.
fn graph() -> (PatternGraph, jsonshape::PatternId) {
    let mut graph = PatternGraph::new();
    let string = graph.add(Pattern::Type(TypeMarker::String));
    let number = graph.add(Pattern::Type(TypeMarker::Number));
    let anything = graph.add(Pattern::Anything);
    let leaf_tag = graph.add(Pattern::literal("leaf"));
    let node_tag = graph.add(Pattern::literal("node"));
    let tree = graph.reserve();
    let back = graph.add(Pattern::Cyclic(tree));
    let children = graph.add(Pattern::ArrayOf(back));
    let leaf = graph.add(Pattern::Object(vec![
        MemberClause::named("kind", leaf_tag),
        MemberClause::named("value", number),
    ]));
    let node = graph.add(Pattern::Object(vec![
        MemberClause::named("kind", node_tag),
        MemberClause::named("children", children),
        MemberClause::Optional(vec![MemberClause::named("label", string)]),
        MemberClause::Many(anything),
    ]));
    let _ = graph.fill(tree, Pattern::OneOf(vec![leaf, node, string]));
    (graph, tree)
}

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let (graph, root) = graph();
    let Ok(validator) = jsonshape::compile(&graph, root) else {
        return;
    };
    for failure in validator.validate(&value) {
        let _ = failure.to_string();
        let _ = failure.to_json();
    }
    let _ = validator.shallow_matches(&value);
});
