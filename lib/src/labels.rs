//! Bulk resolution of display labels and deprecation flags for every term a page will show.

use crate::config::Vocabulary;
use crate::hierarchy::Hierarchy;
use crate::ontology::OntologyInfo;
use crate::prefix::{is_unresolvable, PrefixTable};
use crate::statement::Prefix;
use crate::store::StatementStore;
use anyhow::Result;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelIndex {
    pub labels: BTreeMap<String, String>,
    /// deprecated terms in store order
    pub obsolete: Vec<String>,
    /// prefixes used by the resolvable CURIEs, for RDFa declarations
    pub prefixes: Vec<Prefix>,
}

impl LabelIndex {
    pub fn label(&self, curie: &str) -> Option<&str> {
        self.labels.get(curie).map(String::as_str)
    }

    /// The label, or the CURIE itself.
    pub fn display<'a>(&'a self, curie: &'a str) -> &'a str {
        self.label(curie).unwrap_or(curie)
    }

    pub fn is_obsolete(&self, curie: &str) -> bool {
        self.obsolete.iter().any(|o| o == curie)
    }
}

/// Resolves labels and obsolescence for `referenced`.
///
/// Store labels come first (a later row for the same subject replaces an earlier one), then
/// the built-in names of the top-level types, then the ontology title on the ontology IRI.
/// Blank nodes and absolute IRIs stay in the lookup but never contribute a prefix.
pub fn resolve_labels(
    store: &dyn StatementStore,
    vocab: &Vocabulary,
    prefixes: &PrefixTable,
    referenced: &BTreeSet<String>,
    ontology: &OntologyInfo,
) -> Result<LabelIndex> {
    let used_prefixes = prefixes.used_by(
        referenced
            .iter()
            .map(String::as_str)
            .filter(|c| !is_unresolvable(c)),
    );

    let ids: Vec<String> = referenced.iter().cloned().collect();
    let mut labels = BTreeMap::new();
    let mut obsolete = Vec::new();
    if !ids.is_empty() {
        for row in store.literals_in_stanzas(&ids, &vocab.label_predicate, None)? {
            if let Some(value) = row.value {
                labels.insert(row.subject, value);
            }
        }
        let mut seen = HashSet::new();
        for row in store.literals_in_stanzas(
            &ids,
            &vocab.deprecated_predicate,
            Some(vocab.deprecated_value.as_str()),
        )? {
            if seen.insert(row.subject.clone()) {
                obsolete.push(row.subject);
            }
        }
    }
    debug!(
        "Resolved {} labels and {} obsolete terms for {} CURIEs",
        labels.len(),
        obsolete.len(),
        ids.len()
    );

    for top in &vocab.top_levels {
        labels.insert(top.curie.clone(), top.label.clone());
    }
    if let (Some(iri), Some(title)) = (&ontology.iri, &ontology.title) {
        labels.insert(iri.clone(), title.clone());
    }

    Ok(LabelIndex {
        labels,
        obsolete,
        prefixes: used_prefixes,
    })
}

/// Copies labels and obsolete flags onto the hierarchy nodes that have them.
pub fn apply_labels(hierarchy: &mut Hierarchy, index: &LabelIndex) {
    for (key, node) in hierarchy.iter_mut() {
        if let Some(label) = index.label(key) {
            node.label = Some(label.to_string());
        }
        node.obsolete = index.is_obsolete(key);
    }
}
