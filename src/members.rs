//! Member-clause validators: how an object's member set is consumed.
//!
//! Every clause consumes members from a [`Remainder`] left to right and hands
//! what is left to the next clause. Alternatives between clause lists are
//! dispatched in two phases: first by which distinguishing member name is
//! present, then by that member's value.

use crate::failure::{END_OF_MEMBERS, Expected, Failure, Labels, describe_names, name_label};
use crate::path::Path;
use crate::validator::{Validator, ValidatorId, ValueCheck};
use crate::value::describe_shallow;
use serde_json::{Map, Value};

/// Compiled member clause.
#[derive(Clone, Debug)]
pub(crate) enum MemberCheck {
    Named { name: String, value: ValidatorId },
    /// Clauses applied in declared order.
    Sequence(Vec<MemberCheck>),
    Optional(Box<MemberCheck>),
    Many(ValidatorId),
    /// Member view of another compiled object or disjunction of objects.
    Flatten(ValidatorId),
    OneOf(Vec<MemberCheck>),
}

/// Members of an object not yet consumed, in object order.
#[derive(Clone, Debug)]
pub(crate) struct Remainder<'v> {
    members: Vec<(&'v str, &'v Value)>,
}

impl<'v> Remainder<'v> {
    pub(crate) fn of(map: &'v Map<String, Value>) -> Self {
        Remainder {
            members: map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        }
    }

    fn get(&self, name: &str) -> Option<&'v Value> {
        self.members.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }

    fn without(&self, name: &str) -> Self {
        Remainder {
            members: self.members.iter().copied().filter(|(k, _)| *k != name).collect(),
        }
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &'v str> + '_ {
        self.members.iter().map(|(k, _)| *k)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn empty() -> Self {
        Remainder { members: Vec::new() }
    }
}

/// A view over member clauses. Flattened validators are resolved through the
/// arena when the view is used, which keeps cyclic flattening finite.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Members<'a> {
    Clause(&'a MemberCheck),
    Of(ValidatorId),
}

enum Expanded<'a> {
    /// Named, optional or many clause.
    Leaf(&'a MemberCheck),
    Sequence(&'a [MemberCheck]),
    Alternatives(Vec<Members<'a>>),
    Nothing,
}

impl Validator {
    /// Unfolds flatten adapters so callers only see concrete shapes.
    fn expand<'a>(&'a self, members: Members<'a>) -> Expanded<'a> {
        match members {
            Members::Of(id) => self.expand_validator(id),
            Members::Clause(MemberCheck::Flatten(id)) => self.expand_validator(*id),
            Members::Clause(MemberCheck::Sequence(items)) => Expanded::Sequence(items),
            Members::Clause(MemberCheck::OneOf(alternatives)) => {
                Expanded::Alternatives(alternatives.iter().map(Members::Clause).collect())
            }
            Members::Clause(leaf) => Expanded::Leaf(leaf),
        }
    }

    fn expand_validator(&self, id: ValidatorId) -> Expanded<'_> {
        match &self.checks[id] {
            ValueCheck::Object(inner) => self.expand(Members::Clause(inner)),
            ValueCheck::OneOf(alternatives) => {
                Expanded::Alternatives(alternatives.iter().map(|alt| Members::Of(*alt)).collect())
            }
            _ => Expanded::Nothing,
        }
    }

    /// Names that may open this clause.
    pub(crate) fn possible_first_names(&self, members: Members<'_>) -> Labels {
        let mut names = Labels::new();
        match self.expand(members) {
            Expanded::Leaf(clause) => match clause {
                MemberCheck::Named { name, .. } => {
                    names.insert(name.clone());
                }
                MemberCheck::Optional(inner) => {
                    names.extend(self.possible_first_names(Members::Clause(inner)))
                }
                _ => {}
            },
            Expanded::Sequence(items) => {
                for item in leading(items) {
                    names.extend(self.possible_first_names(Members::Clause(item)));
                }
            }
            Expanded::Alternatives(alternatives) => {
                for alt in alternatives {
                    names.extend(self.possible_first_names(alt));
                }
            }
            Expanded::Nothing => {}
        }
        names
    }

    /// First names of this clause that are present in `remaining`.
    pub(crate) fn matching_first_names(
        &self,
        members: Members<'_>,
        remaining: &Remainder<'_>,
    ) -> Labels {
        self.possible_first_names(members)
            .into_iter()
            .filter(|name| remaining.get(name).is_some())
            .collect()
    }

    /// Whether the clause opened by `name` would accept `value` shallowly.
    pub(crate) fn first_value_matches(
        &self,
        members: Members<'_>,
        name: &str,
        value: &Value,
    ) -> bool {
        match self.expand(members) {
            Expanded::Leaf(clause) => match clause {
                MemberCheck::Named { name: own, value: v } => {
                    own == name && self.shallow_match(*v, value)
                }
                MemberCheck::Optional(inner) => {
                    self.first_value_matches(Members::Clause(inner), name, value)
                }
                _ => false,
            },
            Expanded::Sequence(items) => leading(items).iter().any(|item| {
                self.possible_first_names(Members::Clause(item)).contains(name)
                    && self.first_value_matches(Members::Clause(item), name, value)
            }),
            Expanded::Alternatives(alternatives) => {
                alternatives
                    .into_iter()
                    .filter(|alt| self.first_value_matches(*alt, name, value))
                    .count()
                    == 1
            }
            Expanded::Nothing => false,
        }
    }

    /// Value validators that could apply to the first member `name`.
    pub(crate) fn first_value_validators(
        &self,
        members: Members<'_>,
        name: &str,
    ) -> Vec<ValidatorId> {
        let mut out = Vec::new();
        match self.expand(members) {
            Expanded::Leaf(clause) => match clause {
                MemberCheck::Named { name: own, value } if own == name => out.push(*value),
                MemberCheck::Optional(inner) => {
                    out.extend(self.first_value_validators(Members::Clause(inner), name))
                }
                _ => {}
            },
            Expanded::Sequence(items) => {
                for item in leading(items) {
                    out.extend(self.first_value_validators(Members::Clause(item), name));
                }
            }
            Expanded::Alternatives(alternatives) => {
                for alt in alternatives {
                    out.extend(self.first_value_validators(alt, name));
                }
            }
            Expanded::Nothing => {}
        }
        out
    }

    /// Consumes members of `remaining` and returns what is left.
    pub(crate) fn validate_members<'v>(
        &self,
        members: Members<'_>,
        path: &Path,
        remaining: Remainder<'v>,
        failures: &mut Vec<Failure>,
    ) -> Remainder<'v> {
        match self.expand(members) {
            Expanded::Leaf(clause) => match clause {
                MemberCheck::Named { name, value } => match remaining.get(name) {
                    Some(member) => {
                        self.check(*value, &path.child(name.as_str()), member, failures);
                        remaining.without(name)
                    }
                    None => {
                        failures.push(Failure::unexpected(
                            path,
                            describe_names(remaining.names()),
                            name_label(name),
                        ));
                        remaining
                    }
                },
                MemberCheck::Optional(inner) => {
                    let inner = Members::Clause(inner);
                    if self.matching_first_names(inner, &remaining).is_empty() {
                        remaining
                    } else {
                        self.validate_members(inner, path, remaining, failures)
                    }
                }
                MemberCheck::Many(value) => {
                    for (name, member) in &remaining.members {
                        self.check(*value, &path.child(*name), member, failures);
                    }
                    Remainder::empty()
                }
                // expand() has already handled the composite clauses
                MemberCheck::Sequence(_) | MemberCheck::Flatten(_) | MemberCheck::OneOf(_) => {
                    remaining
                }
            },
            Expanded::Sequence(items) => items.iter().fold(remaining, |rest, item| {
                self.validate_members(Members::Clause(item), path, rest, failures)
            }),
            Expanded::Alternatives(alternatives) => {
                self.dispatch(&alternatives, path, remaining, failures)
            }
            Expanded::Nothing => remaining,
        }
    }

    /// Picks one alternative by first member name, then by that member's value.
    pub(crate) fn dispatch<'v>(
        &self,
        alternatives: &[Members<'_>],
        path: &Path,
        remaining: Remainder<'v>,
        failures: &mut Vec<Failure>,
    ) -> Remainder<'v> {
        let mut candidates = Vec::new();
        let mut all_names = Labels::new();
        for alt in alternatives {
            let names = self.matching_first_names(*alt, &remaining);
            if !names.is_empty() {
                candidates.push(*alt);
                all_names.extend(names);
            }
        }

        if all_names.is_empty() {
            let mut expected = Labels::new();
            for alt in alternatives {
                expected.extend(self.possible_first_names(*alt).iter().map(|n| name_label(n)));
            }
            // alternatives that open with no named member can only close the object
            if expected.is_empty() {
                expected.insert(END_OF_MEMBERS.to_string());
            }
            tracing::trace!(%path, "no alternative opens with a present member");
            failures.push(Failure::unexpected(
                path,
                describe_names(remaining.names()),
                Expected::from_labels(expected),
            ));
            return remaining;
        }

        if all_names.len() > 1 {
            let mut overlapping = Labels::new();
            for alt in &candidates {
                overlapping.extend(self.possible_first_names(*alt).iter().map(|n| name_label(n)));
            }
            let names = all_names.len();
            tracing::trace!(%path, names, "several distinguishing members present");
            failures.push(Failure::ambiguity(
                path,
                describe_names(all_names.iter().map(String::as_str)),
                overlapping,
            ));
            return remaining;
        }

        let Some(name) = all_names.first() else {
            return remaining;
        };
        let Some(value) = remaining.get(name) else {
            return remaining;
        };
        let reduced = remaining.without(name);
        let matching: Vec<Members<'_>> = candidates
            .iter()
            .copied()
            .filter(|alt| self.first_value_matches(*alt, name, value))
            .collect();

        match matching.as_slice() {
            [winner] => {
                tracing::trace!(%path, %name, "alternative selected");
                self.validate_members(*winner, path, remaining, failures)
            }
            [] => {
                let mut expected = Labels::new();
                for alt in &candidates {
                    expected.extend(self.describe_all(&self.first_value_validators(*alt, name)));
                }
                failures.push(Failure::unexpected(
                    &path.child(name.as_str()),
                    describe_shallow(value),
                    Expected::from_labels(expected),
                ));
                reduced
            }
            _ => {
                let mut overlapping = Labels::new();
                for alt in &matching {
                    overlapping.extend(self.describe_all(&self.first_value_validators(*alt, name)));
                }
                failures.push(Failure::ambiguity(
                    &path.child(name.as_str()),
                    describe_shallow(value),
                    overlapping,
                ));
                reduced
            }
        }
    }
}

/// Clauses that can supply the first member of a sequence: everything up to
/// and including the first clause that is not an optional group.
fn leading(items: &[MemberCheck]) -> &[MemberCheck] {
    let end = items
        .iter()
        .position(|item| !matches!(item, MemberCheck::Optional(_)))
        .map_or(items.len(), |i| i + 1);
    &items[..end]
}
