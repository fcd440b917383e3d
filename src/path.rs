//! Locations inside a value, from the root down.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step from a container into a member or element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathStep {
    Index(usize),
    Name(String),
}

impl From<&str> for PathStep {
    fn from(name: &str) -> Self {
        PathStep::Name(name.to_string())
    }
}

impl From<String> for PathStep {
    fn from(name: String) -> Self {
        PathStep::Name(name)
    }
}

impl From<usize> for PathStep {
    fn from(index: usize) -> Self {
        PathStep::Index(index)
    }
}

/// Ordered sequence of steps from the root value.
///
/// Displays as `$['a'][3]['b']`. The empty path is `$`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathStep>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    /// Returns a new path extended by one step. The receiver is unchanged.
    pub fn child(&self, step: impl Into<PathStep>) -> Self {
        let mut steps = self.0.clone();
        steps.push(step.into());
        Path(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        Path(steps)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for step in &self.0 {
            match step {
                PathStep::Index(i) => write!(f, "[{}]", i)?,
                PathStep::Name(name) => {
                    f.write_str("['")?;
                    for c in name.chars() {
                        if c == '\'' || c == '\\' {
                            f.write_str("\\")?;
                        }
                        write!(f, "{}", c)?;
                    }
                    f.write_str("']")?;
                }
            }
        }
        Ok(())
    }
}
