//! Validation failures.
//!
//! Failures are data, not errors: validation never aborts, it returns every
//! divergence it finds in traversal order.

use crate::path::Path;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Insertion-ordered set of short pattern descriptions.
pub type Labels = IndexSet<String>;

pub(crate) const END_OF_MEMBERS: &str = "end of object members";

/// What a failing location should have held.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expected {
    One(String),
    /// Several descriptions were viable before elimination.
    OneOf(Labels),
}

impl Expected {
    /// Builds from a label set, collapsing a single label to [`Expected::One`].
    pub fn from_labels(labels: Labels) -> Self {
        if labels.len() == 1 {
            let only = labels.into_iter().next().unwrap_or_default();
            Expected::One(only)
        } else {
            Expected::OneOf(labels)
        }
    }
}

impl From<&str> for Expected {
    fn from(s: &str) -> Self {
        Expected::One(s.to_string())
    }
}

impl From<String> for Expected {
    fn from(s: String) -> Self {
        Expected::One(s)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::One(s) => f.write_str(s),
            Expected::OneOf(labels) => write!(f, "one of: {}", join(labels)),
        }
    }
}

/// A single reason a value does not conform.
///
/// The structured (serde) form is a map with `path` plus either
/// `found`/`expected` or `found`/`overlapping_patterns`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Failure {
    /// The chosen pattern does not match, or no alternative matched.
    Unexpected {
        path: Path,
        found: String,
        expected: Expected,
    },
    /// Two or more alternatives matched the same input.
    Ambiguity {
        path: Path,
        found: String,
        overlapping_patterns: Labels,
    },
}

impl Failure {
    pub fn unexpected(
        path: &Path,
        found: impl Into<String>,
        expected: impl Into<Expected>,
    ) -> Self {
        Failure::Unexpected {
            path: path.clone(),
            found: found.into(),
            expected: expected.into(),
        }
    }

    pub fn ambiguity(path: &Path, found: impl Into<String>, overlapping_patterns: Labels) -> Self {
        Failure::Ambiguity {
            path: path.clone(),
            found: found.into(),
            overlapping_patterns,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Failure::Unexpected { path, .. } | Failure::Ambiguity { path, .. } => path,
        }
    }

    pub fn found(&self) -> &str {
        match self {
            Failure::Unexpected { found, .. } | Failure::Ambiguity { found, .. } => found,
        }
    }

    pub fn is_ambiguity(&self) -> bool {
        matches!(self, Failure::Ambiguity { .. })
    }

    /// The structured form as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Unexpected {
                path,
                found,
                expected,
            } => write!(f, "at {}; found {}; expected {}", path, found, expected),
            Failure::Ambiguity {
                path,
                found,
                overlapping_patterns,
            } => write!(
                f,
                "ambiguous patterns at {}; found {}; overlapping patterns: {}",
                path,
                found,
                join(overlapping_patterns)
            ),
        }
    }
}

fn join(labels: &Labels) -> String {
    labels.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// `found` text for a set of leftover member names.
pub(crate) fn describe_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.into_iter().collect();
    if names.is_empty() {
        END_OF_MEMBERS.to_string()
    } else {
        format!("names: {}", names.join(", "))
    }
}

/// Label used when a named member is expected.
pub(crate) fn name_label(name: &str) -> String {
    format!("name:\"{}\"", name)
}
