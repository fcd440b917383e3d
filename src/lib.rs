//! Structural validation of JSON values against JSON-shaped patterns.
//!
//! A pattern graph describes the expected shape of a value: type wildcards,
//! literals, uniform arrays, objects built from member clauses, optional
//! member groups, alternation with automatic case dispatch, and cyclic
//! references for recursive shapes. The graph is compiled once into a
//! [`Validator`] that can be applied to any number of values:
//!
//! ```text
//! PatternGraph → compile(graph, root) → Validator → validate(value) → Vec<Failure>
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use jsonshape::{MemberClause, Pattern, PatternGraph, TypeMarker};
//! use serde_json::json;
//!
//! let mut graph = PatternGraph::new();
//! let string = graph.add(Pattern::Type(TypeMarker::String));
//! let email = graph.add(Pattern::Type(TypeMarker::Email));
//! let person = graph.reserve();
//! let back = graph.add(Pattern::Cyclic(person));
//! let friends = graph.add(Pattern::ArrayOf(back));
//! graph
//!     .fill(
//!         person,
//!         Pattern::Object(vec![
//!             MemberClause::named("name", string),
//!             MemberClause::named("email", email),
//!             MemberClause::named("friends", friends),
//!         ]),
//!     )
//!     .expect("slot was reserved");
//!
//! let validator = jsonshape::compile(&graph, person).expect("well-formed pattern");
//! let failures = validator.validate(&json!({
//!     "name": "Ann",
//!     "email": "ann@example.com",
//!     "friends": [{"name": "Bo", "email": "bo@example.com", "friends": [3]}],
//! }));
//! assert_eq!(failures.len(), 1);
//! assert_eq!(
//!     failures[0].to_string(),
//!     "at $['friends'][0]['friends'][0]; found integer; expected object"
//! );
//! ```

pub mod compile;
pub mod error;
pub mod failure;
pub mod path;
pub mod pattern;
pub mod validator;
pub mod value;

pub(crate) mod members;

pub use error::*;
pub use failure::{Expected, Failure, Labels};
pub use path::{Path, PathStep};
pub use pattern::{MemberClause, Pattern, PatternGraph, PatternId, TypeMarker};
pub use validator::Validator;

// Re-export entry-point functions at the crate root for convenience.
pub use compile::compile;

/// Convenience entry point composing compile → validate.
///
/// # Errors
///
/// Returns [`ConformError::Pattern`] if the pattern graph is malformed and
/// [`ConformError::Failures`] if the value does not conform.
///
/// # Example
///
/// ```rust
/// use jsonshape::{Pattern, PatternGraph, TypeMarker};
/// use serde_json::json;
///
/// let mut graph = PatternGraph::new();
/// let string = graph.add(Pattern::Type(TypeMarker::String));
/// let list = graph.add(Pattern::ArrayOf(string));
///
/// assert!(jsonshape::conform(&graph, list, &json!(["a", "b"])).is_ok());
/// match jsonshape::conform(&graph, list, &json!(["a", 1])) {
///     Err(jsonshape::ConformError::Failures(failures)) => assert_eq!(failures.len(), 1),
///     other => panic!("unexpected outcome: {:?}", other),
/// }
/// ```
pub fn conform(
    graph: &PatternGraph,
    root: PatternId,
    value: &serde_json::Value,
) -> Result<(), ConformError> {
    let validator = compile::compile(graph, root)?;
    let failures = validator.validate(value);
    if failures.is_empty() {
        Ok(())
    } else {
        Err(ConformError::Failures(failures))
    }
}
