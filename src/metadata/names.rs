//! Value objects for names, notes, and DAX expressions
//!
//! The source model reports absent strings as either missing or empty. These
//! wrappers collapse both cases into a single "absent" state so every entity
//! treats them the same way.

use std::fmt;

use serde::Serialize;

/// Name of a model object (table, column, measure, role, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DaxName(String);

impl DaxName {
    pub fn new<S: AsRef<str>>(raw: Option<S>) -> Self {
        Self(raw.map(|s| s.as_ref().to_string()).unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the source did not supply a name
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DaxName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for DaxName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for DaxName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DaxName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for DaxName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form descriptive text (descriptions, display folders)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DaxNote(String);

impl DaxNote {
    pub fn new<S: AsRef<str>>(raw: Option<S>) -> Self {
        Self(raw.map(|s| s.as_ref().to_string()).unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DaxNote {
    fn from(note: &str) -> Self {
        Self(note.to_string())
    }
}

impl fmt::Display for DaxNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A DAX expression, kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DaxExpression(String);

impl DaxExpression {
    pub fn new(expression: impl Into<String>) -> Self {
        Self(expression.into())
    }

    /// Wrap an optional source expression. Missing, empty, and whitespace-only
    /// text all mean "no expression".
    pub fn from_source<S: AsRef<str>>(raw: Option<S>) -> Option<Self> {
        raw.and_then(|s| {
            let s = s.as_ref();
            if s.trim().is_empty() {
                None
            } else {
                Some(Self(s.to_string()))
            }
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DaxExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
