use crate::failure::Failure;
use crate::pattern::PatternId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error kind for malformed pattern graphs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternErrorKind {
    UnknownPattern,
    UnfilledSlot,
    SlotAlreadyFilled,
    InvalidRegex,
    NonScalarLiteral,
    InvalidFlatten,
    MisplacedMany,
    EmptyAlternatives,
    UnguardedCycle,
}

/// Produced while building or compiling a pattern graph.
///
/// These abort compilation; they are never reported as validation failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternError {
    pub kind: PatternErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternId>,
}

impl PatternError {
    pub(crate) fn new(
        kind: PatternErrorKind,
        pattern: PatternId,
        message: impl Into<String>,
    ) -> Self {
        PatternError {
            kind,
            message: message.into(),
            pattern: Some(pattern),
        }
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pattern {
            Some(id) => write!(f, "pattern {}: {}", id, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for PatternError {}

/// Combined error type for the [`conform`](crate::conform) entry point.
#[derive(Clone, Debug)]
pub enum ConformError {
    Pattern(PatternError),
    Failures(Vec<Failure>),
}

impl fmt::Display for ConformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConformError::Pattern(e) => write!(f, "Pattern error: {}", e),
            ConformError::Failures(failures) => {
                write!(f, "{} validation failure(s)", failures.len())?;
                for failure in failures {
                    write!(f, "\n  {}", failure)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConformError {}

impl From<PatternError> for ConformError {
    fn from(e: PatternError) -> Self {
        ConformError::Pattern(e)
    }
}
