//! The rows describing the selected term itself.

use crate::config::Vocabulary;
use crate::statement::{Statement, StatementPattern};
use crate::store::StatementStore;
use anyhow::Result;
use log::debug;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct Stanza {
    /// sorted by predicate; rows sharing a predicate keep store order
    pub rows: Vec<Statement>,
    /// every CURIE in subject, predicate and object position
    pub referenced: BTreeSet<String>,
}

impl Stanza {
    pub fn from_rows(mut rows: Vec<Statement>) -> Self {
        rows.sort_by(|a, b| a.predicate.cmp(&b.predicate));
        let referenced = rows
            .iter()
            .flat_map(|r| r.curies())
            .map(str::to_string)
            .collect();
        Self { rows, referenced }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loads the stanza of `term_id`. The class root has no backing stanza. For the ontology
/// pseudo-term the rows about the ontology IRI are used instead, when it is known.
pub fn load_stanza(
    store: &dyn StatementStore,
    vocab: &Vocabulary,
    term_id: &str,
    ontology_iri: Option<&str>,
) -> Result<Stanza> {
    let rows = if term_id == vocab.class_root {
        vec![]
    } else if term_id == vocab.ontology_root {
        match ontology_iri {
            Some(iri) => store.find(&StatementPattern::new().subject(iri))?,
            None => vec![],
        }
    } else {
        store.find(&StatementPattern::new().stanza(term_id))?
    };
    debug!("Stanza for {} has {} rows", term_id, rows.len());
    Ok(Stanza::from_rows(rows))
}
