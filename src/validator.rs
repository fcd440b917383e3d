//! Compiled validators for single values.
//!
//! A [`Validator`] is an arena of value checks produced by
//! [`compile`](crate::compile). Child checks are referenced by index, so a
//! cyclic pattern yields a cyclic validator graph. Traversal depth is bounded
//! by the nesting of the value being validated.

use crate::failure::{END_OF_MEMBERS, Expected, Failure, Labels, describe_names};
use crate::members::{MemberCheck, Members, Remainder};
use crate::path::Path;
use crate::pattern::TypeMarker;
use crate::value::{Kind, describe_shallow, render, structurally_equal};
use regex::Regex;
use serde_json::Value;

pub(crate) type ValidatorId = usize;

/// One compiled value check.
#[derive(Clone, Debug)]
pub(crate) enum ValueCheck {
    Kind(TypeMarker),
    Literal(Value),
    /// String kinds backed by a regex: user patterns, email, URL.
    Regex { regex: Regex, label: String },
    ArrayOf(ValidatorId),
    Object(MemberCheck),
    OneOf(Vec<ValidatorId>),
    Anything,
}

/// A compiled pattern. Immutable and reusable across any number of values.
#[derive(Clone, Debug)]
pub struct Validator {
    pub(crate) checks: Vec<ValueCheck>,
    pub(crate) root: ValidatorId,
}

impl Validator {
    /// Validates a value from the root path. An empty result means the value
    /// conforms.
    pub fn validate(&self, value: &Value) -> Vec<Failure> {
        self.validate_at(&Path::root(), value)
    }

    /// Validates a value as if it were found at `path`.
    pub fn validate_at(&self, path: &Path, value: &Value) -> Vec<Failure> {
        let mut failures = Vec::new();
        self.check(self.root, path, value, &mut failures);
        failures
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_empty()
    }

    /// Number of compiled value checks. Each distinct pattern node that
    /// carries a body contributes exactly one.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Whether the root shallowly matches `value`, as a disjunction would
    /// decide when choosing a branch.
    pub fn shallow_matches(&self, value: &Value) -> bool {
        self.shallow_match(self.root, value)
    }

    /// Short labels describing the root, as used in disjunction failures.
    pub fn shallow_describe(&self) -> Labels {
        self.describe(self.root)
    }

    pub(crate) fn check(
        &self,
        id: ValidatorId,
        path: &Path,
        value: &Value,
        failures: &mut Vec<Failure>,
    ) {
        match &self.checks[id] {
            ValueCheck::Kind(marker) => {
                if !accepts(*marker, value) {
                    let found = Kind::of(value).as_str();
                    failures.push(Failure::unexpected(path, found, marker.label()));
                }
            }
            ValueCheck::Literal(literal) => {
                if structurally_equal(literal, value) {
                    return;
                }
                let (found, expected) = if Kind::of(literal) == Kind::of(value) {
                    (render(value), render(literal))
                } else {
                    (Kind::of(value).to_string(), Kind::of(literal).to_string())
                };
                failures.push(Failure::unexpected(path, found, expected));
            }
            ValueCheck::Regex { regex, label } => match value {
                Value::String(s) if regex.is_match(s) => {}
                Value::String(_) => {
                    failures.push(Failure::unexpected(path, render(value), label.as_str()))
                }
                _ => failures.push(Failure::unexpected(path, Kind::of(value).as_str(), "string")),
            },
            ValueCheck::ArrayOf(element) => match value {
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        self.check(*element, &path.child(i), item, failures);
                    }
                }
                _ => failures.push(Failure::unexpected(path, Kind::of(value).as_str(), "array")),
            },
            ValueCheck::Object(members) => match value {
                Value::Object(map) => {
                    let members = Members::Clause(members);
                    let remainder =
                        self.validate_members(members, path, Remainder::of(map), failures);
                    end_of_members(path, &remainder, failures);
                }
                _ => failures.push(Failure::unexpected(path, Kind::of(value).as_str(), "object")),
            },
            ValueCheck::OneOf(alternatives) => {
                let branches = self.branches(alternatives, value);
                match branches.as_slice() {
                    [Branch::Single(only)] => self.check(*only, path, value, failures),
                    [Branch::Objects(objects)] => {
                        if let Value::Object(map) = value {
                            let objects: Vec<Members<'_>> =
                                objects.iter().map(|id| Members::Of(*id)).collect();
                            let remainder =
                                self.dispatch(&objects, path, Remainder::of(map), failures);
                            end_of_members(path, &remainder, failures);
                        }
                    }
                    [] => failures.push(Failure::unexpected(
                        path,
                        describe_shallow(value),
                        Expected::from_labels(self.describe_all(alternatives)),
                    )),
                    _ => {
                        let mut overlapping = Labels::new();
                        for branch in &branches {
                            match branch {
                                Branch::Single(id) => overlapping.extend(self.describe(*id)),
                                Branch::Objects(ids) => overlapping.extend(self.describe_all(ids)),
                            }
                        }
                        let found = describe_shallow(value);
                        failures.push(Failure::ambiguity(path, found, overlapping));
                    }
                }
            }
            ValueCheck::Anything => {}
        }
    }

    /// Cheap, non-recursive test used to pick a branch. A disjunction matches
    /// iff exactly one of its branches does.
    pub(crate) fn shallow_match(&self, id: ValidatorId, value: &Value) -> bool {
        match &self.checks[id] {
            ValueCheck::Kind(marker) => accepts(*marker, value),
            ValueCheck::Literal(literal) => structurally_equal(literal, value),
            ValueCheck::Regex { regex, .. } => value.as_str().is_some_and(|s| regex.is_match(s)),
            ValueCheck::ArrayOf(_) => value.is_array(),
            ValueCheck::Object(_) => value.is_object(),
            ValueCheck::OneOf(alternatives) => self.branches(alternatives, value).len() == 1,
            ValueCheck::Anything => true,
        }
    }

    /// Branches of a disjunction that shallowly match `value`, in declared
    /// order.
    ///
    /// Object alternatives are told apart by their members, not by shape, so
    /// against an object they form a single branch. Nested disjunctions are
    /// spliced in place for that grouping, which puts the object alternatives
    /// of `one_of(one_of(a, b), c)` in the same branch as those of
    /// `one_of(a, b, c)`. The group sits where its first member was declared.
    fn branches(&self, alternatives: &[ValidatorId], value: &Value) -> Vec<Branch> {
        let mut branches = Vec::new();
        if !value.is_object() {
            for alt in alternatives {
                if self.shallow_match(*alt, value) {
                    branches.push(Branch::Single(*alt));
                }
            }
            return branches;
        }

        let mut objects = Vec::new();
        let mut objects_at = None;
        for alt in self.spliced(alternatives) {
            if let ValueCheck::Object(_) = &self.checks[alt] {
                objects_at.get_or_insert(branches.len());
                objects.push(alt);
            } else if self.shallow_match(alt, value) {
                branches.push(Branch::Single(alt));
            }
        }
        if let Some(at) = objects_at {
            let group = match objects.as_slice() {
                [only] => Branch::Single(*only),
                _ => Branch::Objects(objects),
            };
            branches.insert(at, group);
        }
        branches
    }

    /// Alternatives with nested disjunctions replaced by their own
    /// alternatives. Each validator appears once.
    fn spliced(&self, alternatives: &[ValidatorId]) -> Vec<ValidatorId> {
        let mut out = Vec::new();
        let mut pending: Vec<ValidatorId> = alternatives.iter().rev().copied().collect();
        while let Some(alt) = pending.pop() {
            match &self.checks[alt] {
                ValueCheck::OneOf(inner) => pending.extend(inner.iter().rev().copied()),
                _ if out.contains(&alt) => {}
                _ => out.push(alt),
            }
        }
        out
    }

    pub(crate) fn describe(&self, id: ValidatorId) -> Labels {
        match &self.checks[id] {
            ValueCheck::Kind(marker) => Labels::from([marker.label().to_string()]),
            ValueCheck::Literal(literal) => Labels::from([render(literal)]),
            ValueCheck::Regex { label, .. } => Labels::from([label.clone()]),
            ValueCheck::ArrayOf(_) => Labels::from(["array".to_string()]),
            ValueCheck::Object(_) => Labels::from(["object".to_string()]),
            ValueCheck::OneOf(alternatives) => self.describe_all(alternatives),
            ValueCheck::Anything => Labels::from(["anything".to_string()]),
        }
    }

    pub(crate) fn describe_all(&self, ids: &[ValidatorId]) -> Labels {
        let mut labels = Labels::new();
        for id in ids {
            labels.extend(self.describe(*id));
        }
        labels
    }
}

enum Branch {
    Single(ValidatorId),
    Objects(Vec<ValidatorId>),
}

fn end_of_members(path: &Path, remainder: &Remainder<'_>, failures: &mut Vec<Failure>) {
    if !remainder.is_empty() {
        let found = describe_names(remainder.names());
        failures.push(Failure::unexpected(path, found, END_OF_MEMBERS));
    }
}

fn accepts(marker: TypeMarker, value: &Value) -> bool {
    let kind = Kind::of(value);
    match marker {
        TypeMarker::Boolean => kind == Kind::Boolean,
        TypeMarker::String | TypeMarker::Email | TypeMarker::Url => kind == Kind::String,
        TypeMarker::Integer => kind == Kind::Integer,
        TypeMarker::Float | TypeMarker::Number => matches!(kind, Kind::Integer | Kind::Float),
        TypeMarker::Null => kind == Kind::Null,
        TypeMarker::Array => kind == Kind::Array,
        TypeMarker::Object => kind == Kind::Object,
    }
}
