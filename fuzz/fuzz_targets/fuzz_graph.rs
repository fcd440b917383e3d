#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use jsonshape::{MemberClause, Pattern, PatternGraph, PatternId, TypeMarker};
use libfuzzer_sys::fuzz_target;

const MARKERS: [TypeMarker; 10] = [
    TypeMarker::Boolean,
    TypeMarker::String,
    TypeMarker::Integer,
    TypeMarker::Float,
    TypeMarker::Number,
    TypeMarker::Null,
    TypeMarker::Array,
    TypeMarker::Object,
    TypeMarker::Email,
    TypeMarker::Url,
];

const NAMES: [&str; 4] = ["a", "b", "c", "type"];

fn pick(u: &mut Unstructured<'_>, ids: &[PatternId]) -> arbitrary::Result<PatternId> {
    Ok(*u.choose(ids)?)
}

fn clause(
    u: &mut Unstructured<'_>,
    ids: &[PatternId],
    depth: u8,
) -> arbitrary::Result<MemberClause> {
    let name = *u.choose(&NAMES)?;
    let choice = if depth == 0 { 0 } else { u.int_in_range(0..=4)? };
    Ok(match choice {
        0 => MemberClause::named(name, pick(u, ids)?),
        1 => MemberClause::Optional(clauses(u, ids, depth - 1)?),
        2 => MemberClause::Many(pick(u, ids)?),
        3 => MemberClause::Flatten(pick(u, ids)?),
        _ => {
            let n = u.int_in_range(0..=3)?;
            let mut groups = Vec::with_capacity(n);
            for _ in 0..n {
                groups.push(clauses(u, ids, depth - 1)?);
            }
            MemberClause::OneOf(groups)
        }
    })
}

fn clauses(
    u: &mut Unstructured<'_>,
    ids: &[PatternId],
    depth: u8,
) -> arbitrary::Result<Vec<MemberClause>> {
    let n = u.int_in_range(0..=3)?;
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(clause(u, ids, depth)?);
    }
    Ok(out)
}

fn scalar(u: &mut Unstructured<'_>) -> arbitrary::Result<serde_json::Value> {
    Ok(match u.int_in_range(0..=4)? {
        0 => serde_json::Value::Null,
        1 => serde_json::Value::Bool(bool::arbitrary(u)?),
        2 => serde_json::Value::from(i64::arbitrary(u)?),
        3 => serde_json::Value::from(f64::arbitrary(u)?),
        _ => serde_json::Value::String(String::arbitrary(u)?),
    })
}

fn pattern(u: &mut Unstructured<'_>, ids: &[PatternId]) -> arbitrary::Result<Pattern> {
    Ok(match u.int_in_range(0..=7)? {
        0 => Pattern::Literal(scalar(u)?),
        1 => Pattern::Type(*u.choose(&MARKERS)?),
        2 => Pattern::Regex(String::arbitrary(u)?),
        3 => Pattern::ArrayOf(pick(u, ids)?),
        4 => Pattern::Object(clauses(u, ids, 2)?),
        5 => {
            let n = u.int_in_range(0..=3)?;
            let mut alts = Vec::with_capacity(n);
            for _ in 0..n {
                alts.push(pick(u, ids)?);
            }
            Pattern::OneOf(alts)
        }
        6 => Pattern::Cyclic(pick(u, ids)?),
        _ => Pattern::Anything,
    })
}

fn build(u: &mut Unstructured<'_>) -> arbitrary::Result<(PatternGraph, PatternId)> {
    let mut graph = PatternGraph::new();
    let root = graph.reserve();
    let mut ids = vec![root, graph.add(Pattern::Anything)];
    for _ in 0..u.int_in_range(0..=8)? {
        let p = pattern(u, &ids)?;
        ids.push(graph.add(p));
    }
    let p = pattern(u, &ids)?;
    let _ = graph.fill(root, p);
    Ok((graph, root))
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok((graph, root)) = build(&mut u) else {
        return;
    };
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(u.take_rest()) else {
        return;
    };
    let _ = graph.display(root);
    if let Ok(validator) = jsonshape::compile(&graph, root) {
        let _ = validator.validate(&value);
    }
});
