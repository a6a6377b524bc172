//! Row types read out of a source's statement store.

use serde::{Deserialize, Serialize};

/// One triple or annotation row. `stanza` groups the rows describing a single term.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Statement {
    pub stanza: String,
    pub subject: String,
    pub predicate: String,
    /// object reference, absent when the row carries a literal
    pub object: Option<String>,
    /// literal value, absent when the row points at another node
    pub value: Option<String>,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Statement {
    /// The compact identifiers this row mentions, skipping empty and absent values.
    pub fn curies(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.subject.as_str()),
            Some(self.predicate.as_str()),
            self.object.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|c| !c.is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prefix {
    pub prefix: String,
    pub base: String,
}

impl Prefix {
    pub fn new(prefix: impl Into<String>, base: impl Into<String>) -> Self {
        Prefix {
            prefix: prefix.into(),
            base: base.into(),
        }
    }
}

/// A parent/child link produced by the store's traversal capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub parent: String,
    pub child: String,
}

/// Exact-match filter over the statements relation. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementPattern {
    pub stanza: Option<String>,
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    pub value: Option<String>,
}

impl StatementPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stanza(mut self, stanza: impl Into<String>) -> Self {
        self.stanza = Some(stanza.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}
