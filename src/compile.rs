//! Pattern graph → validator graph.
//!
//! Compilation is depth-first and memoized on pattern identity. A node's
//! validator slot is recorded before its children are compiled, so a child
//! that refers back to an enclosing node resolves to the slot in progress.
//! Each pattern node with a body yields exactly one validator; a `Cyclic`
//! node yields none of its own and shares its target's.

use crate::error::{PatternError, PatternErrorKind};
use crate::members::MemberCheck;
use crate::pattern::{MemberClause, Pattern, PatternGraph, PatternId, TypeMarker};
use crate::validator::{Validator, ValidatorId, ValueCheck};
use crate::value::is_scalar;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// ─── Cached regexes ─────────────────────────────────────────────────────────

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").unwrap());

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$").unwrap());

/// Compiles the pattern rooted at `root` into a [`Validator`].
///
/// The graph is not modified. Every call builds a fresh validator graph with
/// its own identity table, so concurrent calls share no state.
///
/// # Errors
///
/// Returns the first [`PatternError`] found: unknown ids, unfilled slots,
/// invalid regexes, non-scalar literals, misplaced `Many` clauses, empty
/// alternations, flatten targets that are not objects, and cycles that do not
/// pass through an array element or object member.
pub fn compile(graph: &PatternGraph, root: PatternId) -> Result<Validator, PatternError> {
    tracing::debug!(patterns = graph.len(), root = %root, "compiling pattern graph");
    let mut compiler = Compiler {
        graph,
        memo: HashMap::new(),
        checks: Vec::new(),
        bodies: Vec::new(),
    };
    let root = compiler.node(root)?;
    compiler.check_unguarded_cycles()?;
    tracing::debug!(validators = compiler.checks.len(), "compiled pattern graph");
    Ok(Validator {
        checks: compiler.checks,
        root,
    })
}

struct Compiler<'g> {
    graph: &'g PatternGraph,
    memo: HashMap<PatternId, ValidatorId>,
    checks: Vec<ValueCheck>,
    /// Pattern nodes that received a validator, in compilation order.
    bodies: Vec<PatternId>,
}

impl Compiler<'_> {
    fn node(&mut self, id: PatternId) -> Result<ValidatorId, PatternError> {
        if let Some(&slot) = self.memo.get(&id) {
            return Ok(slot);
        }
        let graph = self.graph;
        let pattern = graph.get(id)?;
        if let Pattern::Cyclic(_) = pattern {
            let (target, _) = graph.resolve(id)?;
            let slot = self.node(target)?;
            self.memo.insert(id, slot);
            return Ok(slot);
        }

        // Reserve before recursing so back-edges land on this slot.
        let slot = self.checks.len();
        self.checks.push(ValueCheck::Anything);
        self.memo.insert(id, slot);
        self.bodies.push(id);

        let check = match pattern {
            Pattern::Literal(value) => {
                if !is_scalar(value) {
                    return Err(PatternError::new(
                        PatternErrorKind::NonScalarLiteral,
                        id,
                        format!("literal must be a scalar, got {}", value),
                    ));
                }
                ValueCheck::Literal(value.clone())
            }
            Pattern::Type(TypeMarker::Email) => ValueCheck::Regex {
                regex: EMAIL_RE.clone(),
                label: TypeMarker::Email.label().to_string(),
            },
            Pattern::Type(TypeMarker::Url) => ValueCheck::Regex {
                regex: URL_RE.clone(),
                label: TypeMarker::Url.label().to_string(),
            },
            Pattern::Type(marker) => ValueCheck::Kind(*marker),
            Pattern::Regex(source) => {
                let regex = Regex::new(source).map_err(|e| {
                    PatternError::new(
                        PatternErrorKind::InvalidRegex,
                        id,
                        format!("invalid regex /{}/: {}", source, e),
                    )
                })?;
                ValueCheck::Regex {
                    regex,
                    label: format!("/{}/", source),
                }
            }
            Pattern::ArrayOf(element) => ValueCheck::ArrayOf(self.node(*element)?),
            Pattern::Object(clauses) => ValueCheck::Object(self.clauses(id, clauses)?),
            Pattern::OneOf(alternatives) => {
                if alternatives.is_empty() {
                    return Err(PatternError::new(
                        PatternErrorKind::EmptyAlternatives,
                        id,
                        "one_of needs at least one alternative",
                    ));
                }
                let mut compiled = Vec::with_capacity(alternatives.len());
                for alt in alternatives {
                    compiled.push(self.node(*alt)?);
                }
                ValueCheck::OneOf(compiled)
            }
            Pattern::Anything => ValueCheck::Anything,
            Pattern::Cyclic(_) => unreachable!("handled above"),
        };
        self.checks[slot] = check;
        Ok(slot)
    }

    fn clauses(
        &mut self,
        owner: PatternId,
        clauses: &[MemberClause],
    ) -> Result<MemberCheck, PatternError> {
        let mut items = Vec::with_capacity(clauses.len());
        for (i, clause) in clauses.iter().enumerate() {
            let item = match clause {
                MemberClause::Named { name, value } => MemberCheck::Named {
                    name: name.clone(),
                    value: self.node(*value)?,
                },
                MemberClause::Optional(inner) => {
                    MemberCheck::Optional(Box::new(self.clauses(owner, inner)?))
                }
                MemberClause::Many(value) => {
                    if i + 1 != clauses.len() {
                        return Err(PatternError::new(
                            PatternErrorKind::MisplacedMany,
                            owner,
                            "a many-members clause must be the last clause of its list",
                        ));
                    }
                    MemberCheck::Many(self.node(*value)?)
                }
                MemberClause::Flatten(target) => {
                    self.check_flattenable(owner, *target)?;
                    MemberCheck::Flatten(self.node(*target)?)
                }
                MemberClause::OneOf(groups) => {
                    if groups.is_empty() {
                        return Err(PatternError::new(
                            PatternErrorKind::EmptyAlternatives,
                            owner,
                            "one_of needs at least one member group",
                        ));
                    }
                    let mut compiled = Vec::with_capacity(groups.len());
                    for group in groups {
                        compiled.push(self.clauses(owner, group)?);
                    }
                    MemberCheck::OneOf(compiled)
                }
            };
            items.push(item);
        }
        Ok(MemberCheck::Sequence(items))
    }

    /// A flatten target must be an object, or a disjunction whose
    /// alternatives are all flattenable.
    fn check_flattenable(&self, owner: PatternId, target: PatternId) -> Result<(), PatternError> {
        let mut pending = vec![target];
        let mut seen = HashSet::new();
        while let Some(id) = pending.pop() {
            let (id, pattern) = self.graph.resolve(id)?;
            if !seen.insert(id) {
                continue;
            }
            match pattern {
                Pattern::Object(_) => {}
                Pattern::OneOf(alternatives) => pending.extend(alternatives.iter().copied()),
                _ => {
                    return Err(PatternError::new(
                        PatternErrorKind::InvalidFlatten,
                        owner,
                        format!(
                            "flatten target {} must be an object or a disjunction of objects",
                            id
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Disjunction and flatten edges do not descend into the value. A cycle
    /// made only of them would never terminate, so it is rejected.
    fn check_unguarded_cycles(&self) -> Result<(), PatternError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Open,
            Done,
        }
        let mut marks: HashMap<PatternId, Mark> = HashMap::new();
        for &start in &self.bodies {
            if marks.contains_key(&start) {
                continue;
            }
            let mut stack = vec![(start, self.unguarded_edges(start)?, 0usize)];
            marks.insert(start, Mark::Open);
            while let Some((node, edges, next)) = stack.last_mut() {
                let Some(&edge) = edges.get(*next) else {
                    marks.insert(*node, Mark::Done);
                    stack.pop();
                    continue;
                };
                *next += 1;
                match marks.get(&edge) {
                    Some(Mark::Open) => {
                        return Err(PatternError::new(
                            PatternErrorKind::UnguardedCycle,
                            edge,
                            "cycle through one_of or flatten never descends into the value",
                        ));
                    }
                    Some(Mark::Done) => {}
                    None => {
                        let edges = self.unguarded_edges(edge)?;
                        marks.insert(edge, Mark::Open);
                        stack.push((edge, edges, 0));
                    }
                }
            }
        }
        Ok(())
    }

    fn unguarded_edges(&self, id: PatternId) -> Result<Vec<PatternId>, PatternError> {
        let mut edges = Vec::new();
        match self.graph.get(id)? {
            Pattern::OneOf(alternatives) => edges.extend(alternatives.iter().copied()),
            Pattern::Object(clauses) => flatten_targets(clauses, &mut edges),
            _ => {}
        }
        for edge in edges.iter_mut() {
            *edge = self.graph.resolve(*edge)?.0;
        }
        Ok(edges)
    }
}

fn flatten_targets(clauses: &[MemberClause], out: &mut Vec<PatternId>) {
    for clause in clauses {
        match clause {
            MemberClause::Flatten(target) => out.push(*target),
            MemberClause::Optional(inner) => flatten_targets(inner, out),
            MemberClause::OneOf(groups) => {
                for group in groups {
                    flatten_targets(group, out);
                }
            }
            MemberClause::Named { .. } | MemberClause::Many(_) => {}
        }
    }
}
