//! Identifies the ontology a source describes and its title.

use crate::config::Vocabulary;
use crate::prefix::PrefixTable;
use crate::statement::StatementPattern;
use crate::store::StatementStore;
use anyhow::Result;
use log::debug;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologyInfo {
    pub iri: Option<String>,
    pub title: Option<String>,
}

/// The title predicate as the source would spell it: a CURIE when some prefix maps to the
/// title namespace, otherwise the bracketed IRI.
pub fn title_predicate(prefixes: &PrefixTable, vocab: &Vocabulary) -> String {
    match prefixes.prefix_for_base(&vocab.title_namespace) {
        Some(prefix) => format!("{}:title", prefix),
        None => format!("<{}title>", vocab.title_namespace),
    }
}

/// The first subject typed as an ontology, and its title if one is stated.
pub fn ontology_metadata(
    store: &dyn StatementStore,
    prefixes: &PrefixTable,
    vocab: &Vocabulary,
) -> Result<OntologyInfo> {
    let declared = store.find(
        &StatementPattern::new()
            .predicate(vocab.type_predicate.as_str())
            .object(vocab.ontology_marker.as_str()),
    )?;
    let iri = match declared.into_iter().next() {
        Some(row) => row.subject,
        None => return Ok(OntologyInfo::default()),
    };
    let title = store
        .find(
            &StatementPattern::new()
                .stanza(iri.as_str())
                .subject(iri.as_str())
                .predicate(title_predicate(prefixes, vocab)),
        )?
        .into_iter()
        .find_map(|row| row.value);
    debug!("Ontology {} titled {:?}", iri, title);
    Ok(OntologyInfo {
        iri: Some(iri),
        title,
    })
}
