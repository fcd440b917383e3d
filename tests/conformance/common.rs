use jsonshape::{
    Failure, Labels, MemberClause, Path, PathStep, Pattern, PatternGraph, PatternId, TypeMarker,
};
use serde_json::Value;

/// Helper: compile then validate, panicking on malformed patterns.
pub fn validate(graph: &PatternGraph, root: PatternId, value: &Value) -> Vec<Failure> {
    jsonshape::compile(graph, root)
        .expect("pattern should compile")
        .validate(value)
}

pub fn ty(graph: &mut PatternGraph, marker: TypeMarker) -> PatternId {
    graph.add(Pattern::Type(marker))
}

pub fn object(graph: &mut PatternGraph, members: Vec<(&str, PatternId)>) -> PatternId {
    graph.add(Pattern::Object(
        members
            .into_iter()
            .map(|(name, value)| MemberClause::named(name, value))
            .collect(),
    ))
}

pub fn path(steps: Vec<PathStep>) -> Path {
    Path::from(steps)
}

pub fn name(s: &str) -> PathStep {
    PathStep::Name(s.to_string())
}

pub fn labels(items: &[&str]) -> Labels {
    items.iter().map(|s| s.to_string()).collect()
}

/// Labels in discovery order, for order-sensitive assertions.
pub fn ordered(labels: &Labels) -> Vec<&str> {
    labels.iter().map(String::as_str).collect()
}
