//! The pattern graph: an arena of pattern nodes addressed by [`PatternId`].
//!
//! Nodes may share children and may form cycles. A cyclic node is built in
//! two phases: [`PatternGraph::reserve`] hands out an id before the body
//! exists, the body refers back to it (usually through [`Pattern::Cyclic`]),
//! and [`PatternGraph::fill`] installs the body once. The graph is never
//! mutated after that.

use crate::error::{PatternError, PatternErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identity of a node in a [`PatternGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(usize);

impl PatternId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type wildcards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeMarker {
    Boolean,
    String,
    Integer,
    /// Accepts integers as well as floats.
    Float,
    /// Accepts integers as well as floats.
    Number,
    Null,
    Array,
    Object,
    Email,
    Url,
}

impl TypeMarker {
    pub fn label(&self) -> &'static str {
        match self {
            TypeMarker::Boolean => "boolean",
            TypeMarker::String => "string",
            TypeMarker::Integer => "integer",
            TypeMarker::Float => "float",
            TypeMarker::Number => "number",
            TypeMarker::Null => "null",
            TypeMarker::Array => "array",
            TypeMarker::Object => "object",
            TypeMarker::Email => "email",
            TypeMarker::Url => "url",
        }
    }
}

/// A pattern node.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// Matches a structurally equal scalar.
    Literal(Value),
    Type(TypeMarker),
    /// Matches strings containing a match of the regex source.
    Regex(String),
    /// Array whose every element matches the pattern.
    ArrayOf(PatternId),
    Object(Vec<MemberClause>),
    /// Value alternation; branches are picked by shallow matching.
    OneOf(Vec<PatternId>),
    Anything,
    /// Back-edge into an enclosing node. Compiles to the target's validator.
    Cyclic(PatternId),
}

impl Pattern {
    pub fn literal(value: impl Into<Value>) -> Self {
        Pattern::Literal(value.into())
    }

    pub fn regex(source: impl Into<String>) -> Self {
        Pattern::Regex(source.into())
    }
}

/// One unit of an object pattern's member list.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberClause {
    Named { name: String, value: PatternId },
    /// All-or-nothing group, triggered by the presence of one of its first names.
    Optional(Vec<MemberClause>),
    /// Every remaining member. Must be the last clause of its list.
    Many(PatternId),
    /// Reuses an object pattern, or a disjunction of object patterns, inline.
    Flatten(PatternId),
    /// Alternation between clause lists.
    OneOf(Vec<Vec<MemberClause>>),
}

impl MemberClause {
    pub fn named(name: impl Into<String>, value: PatternId) -> Self {
        MemberClause::Named {
            name: name.into(),
            value,
        }
    }
}

/// Arena of pattern nodes.
#[derive(Clone, Debug, Default)]
pub struct PatternGraph {
    nodes: Vec<Option<Pattern>>,
}

impl PatternGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a finished node.
    pub fn add(&mut self, pattern: Pattern) -> PatternId {
        self.nodes.push(Some(pattern));
        PatternId(self.nodes.len() - 1)
    }

    /// Reserves a slot whose body is supplied later with [`fill`](Self::fill).
    pub fn reserve(&mut self) -> PatternId {
        self.nodes.push(None);
        PatternId(self.nodes.len() - 1)
    }

    /// Installs the body of a reserved slot. A slot can be filled once.
    pub fn fill(&mut self, id: PatternId, pattern: Pattern) -> Result<(), PatternError> {
        match self.nodes.get_mut(id.0) {
            None => Err(unknown(id)),
            Some(Some(_)) => Err(PatternError::new(
                PatternErrorKind::SlotAlreadyFilled,
                id,
                "slot already holds a pattern",
            )),
            Some(slot) => {
                *slot = Some(pattern);
                Ok(())
            }
        }
    }

    /// Looks up a node. Unknown ids and unfilled slots are errors.
    pub fn get(&self, id: PatternId) -> Result<&Pattern, PatternError> {
        match self.nodes.get(id.0) {
            None => Err(unknown(id)),
            Some(None) => Err(PatternError::new(
                PatternErrorKind::UnfilledSlot,
                id,
                "reserved slot was never filled",
            )),
            Some(Some(p)) => Ok(p),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Follows `Cyclic` back-edges until a structural node is reached.
    pub(crate) fn resolve(&self, id: PatternId) -> Result<(PatternId, &Pattern), PatternError> {
        let mut current = id;
        let mut seen = HashSet::new();
        loop {
            match self.get(current)? {
                Pattern::Cyclic(target) => {
                    if !seen.insert(current) {
                        return Err(PatternError::new(
                            PatternErrorKind::UnguardedCycle,
                            id,
                            "cyclic references never reach a pattern body",
                        ));
                    }
                    current = *target;
                }
                pattern => return Ok((current, pattern)),
            }
        }
    }

    /// Renders the pattern rooted at `id` as JSON-like text.
    ///
    /// Nodes re-entered while still being printed are labelled `#n=` on first
    /// entry and printed as `#n` at the back-edge.
    pub fn display(&self, id: PatternId) -> Result<String, PatternError> {
        let mut heads = HashSet::new();
        find_cycle_heads(self, id, &mut Vec::new(), &mut heads)?;
        let mut renderer = Renderer {
            graph: self,
            heads,
            labels: HashMap::new(),
            open: Vec::new(),
            out: String::new(),
        };
        let mut counter = 0;
        renderer.pattern(id, &mut counter)?;
        Ok(renderer.out)
    }
}

fn unknown(id: PatternId) -> PatternError {
    PatternError::new(
        PatternErrorKind::UnknownPattern,
        id,
        "id does not belong to this graph",
    )
}

// ─── Rendering ──────────────────────────────────────────────────────────────

fn clause_children(clauses: &[MemberClause], out: &mut Vec<PatternId>) {
    for clause in clauses {
        match clause {
            MemberClause::Named { value, .. } => out.push(*value),
            MemberClause::Optional(inner) => clause_children(inner, out),
            MemberClause::Many(value) | MemberClause::Flatten(value) => out.push(*value),
            MemberClause::OneOf(groups) => {
                for group in groups {
                    clause_children(group, out);
                }
            }
        }
    }
}

fn children(pattern: &Pattern) -> Vec<PatternId> {
    match pattern {
        Pattern::ArrayOf(inner) => vec![*inner],
        Pattern::OneOf(alternatives) => alternatives.clone(),
        Pattern::Object(clauses) => {
            let mut out = Vec::new();
            clause_children(clauses, &mut out);
            out
        }
        _ => Vec::new(),
    }
}

fn find_cycle_heads(
    graph: &PatternGraph,
    id: PatternId,
    open: &mut Vec<PatternId>,
    heads: &mut HashSet<PatternId>,
) -> Result<(), PatternError> {
    let (id, pattern) = graph.resolve(id)?;
    if open.contains(&id) {
        heads.insert(id);
        return Ok(());
    }
    open.push(id);
    for child in children(pattern) {
        find_cycle_heads(graph, child, open, heads)?;
    }
    open.pop();
    Ok(())
}

struct Renderer<'g> {
    graph: &'g PatternGraph,
    heads: HashSet<PatternId>,
    labels: HashMap<PatternId, usize>,
    open: Vec<PatternId>,
    out: String,
}

impl Renderer<'_> {
    fn pattern(&mut self, id: PatternId, counter: &mut usize) -> Result<(), PatternError> {
        let (id, pattern) = self.graph.resolve(id)?;
        if self.open.contains(&id) {
            let label = self.labels.get(&id).copied().unwrap_or_default();
            self.out.push_str(&format!("#{}", label));
            return Ok(());
        }
        if self.heads.contains(&id) {
            *counter += 1;
            self.labels.insert(id, *counter);
            self.out.push_str(&format!("#{}=", counter));
        }
        self.open.push(id);
        match pattern {
            Pattern::Literal(v) => self.out.push_str(&v.to_string()),
            Pattern::Type(marker) => self.out.push_str(marker.label()),
            Pattern::Regex(source) => self.out.push_str(&format!("/{}/", source)),
            Pattern::Anything => self.out.push_str("anything"),
            Pattern::ArrayOf(inner) => {
                self.out.push('[');
                self.pattern(*inner, counter)?;
                self.out.push(']');
            }
            Pattern::OneOf(alternatives) => {
                self.out.push_str("one_of(");
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(" | ");
                    }
                    self.pattern(*alt, counter)?;
                }
                self.out.push(')');
            }
            Pattern::Object(clauses) => self.clauses(clauses, counter)?,
            // resolve() never yields a back-edge
            Pattern::Cyclic(_) => {}
        }
        self.open.pop();
        Ok(())
    }

    fn clauses(
        &mut self,
        clauses: &[MemberClause],
        counter: &mut usize,
    ) -> Result<(), PatternError> {
        self.out.push('{');
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            match clause {
                MemberClause::Named { name, value } => {
                    self.out.push_str(&format!("{}: ", Value::String(name.clone())));
                    self.pattern(*value, counter)?;
                }
                MemberClause::Optional(inner) => {
                    self.out.push_str("optional ");
                    self.clauses(inner, counter)?;
                }
                MemberClause::Many(value) => {
                    self.out.push_str("*: ");
                    self.pattern(*value, counter)?;
                }
                MemberClause::Flatten(target) => {
                    self.out.push_str("...");
                    self.pattern(*target, counter)?;
                }
                MemberClause::OneOf(groups) => {
                    self.out.push_str("one_of(");
                    for (j, group) in groups.iter().enumerate() {
                        if j > 0 {
                            self.out.push_str(" | ");
                        }
                        self.clauses(group, counter)?;
                    }
                    self.out.push(')');
                }
            }
        }
        self.out.push('}');
        Ok(())
    }
}
