//! Assembles the renderable payload for one source: hierarchy, stanza and resolved labels.

use crate::config::Vocabulary;
use crate::hierarchy::{build_hierarchy, Hierarchy};
use crate::labels::{apply_labels, resolve_labels, LabelIndex};
use crate::ontology::{ontology_metadata, OntologyInfo};
use crate::prefix::PrefixTable;
use crate::stanza::load_stanza;
use crate::statement::Statement;
use crate::store::StatementStore;
use anyhow::Result;
use log::info;
use serde::Serialize;
use std::collections::BTreeSet;

/// The term the stanza describes.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub curie: String,
    pub iri: String,
    pub label: String,
}

/// Everything a renderer needs to draw one source's column.
#[derive(Serialize, Debug, Clone)]
pub struct TreePage {
    pub source: String,
    pub term_id: String,
    pub entity_type: String,
    /// label chosen for the term, shared by the tree and the stanza
    pub label: String,
    pub hierarchy: Hierarchy,
    #[serde(flatten)]
    pub index: LabelIndex,
    pub stanza: Vec<Statement>,
    pub ontology: OntologyInfo,
    pub subject: Option<Subject>,
}

/// Picks the label to show for `term_id`: the resolved label, or the CURIE itself.
///
/// Resolution already settled on one of the term's asserted labels (the last row in store
/// order), so the tree and the stanza heading agree on it.
pub fn select_display_label(term_id: &str, index: &LabelIndex) -> String {
    index.display(term_id).to_string()
}

fn expand(prefixes: &PrefixTable, curie: &str) -> String {
    prefixes
        .curie_to_named_node(curie)
        .map(|n| n.into_string())
        .unwrap_or_else(|| prefixes.curie_to_iri(curie))
}

/// Runs hierarchy, stanza and label resolution for `term_id` against one source, in that order.
pub fn build_tree_page(
    store: &dyn StatementStore,
    vocab: &Vocabulary,
    source: &str,
    term_id: &str,
    include_children: bool,
) -> Result<TreePage> {
    let prefixes = PrefixTable::load(store)?;
    let ontology = ontology_metadata(store, &prefixes, vocab)?;

    let result = build_hierarchy(
        store,
        vocab,
        term_id,
        include_children,
        ontology.iri.as_deref(),
    )?;
    let mut hierarchy = result.hierarchy;
    let stanza = load_stanza(store, vocab, term_id, ontology.iri.as_deref())?;

    let mut referenced: BTreeSet<String> = result.referenced;
    referenced.extend(stanza.referenced.iter().cloned());
    let index = resolve_labels(store, vocab, &prefixes, &referenced, &ontology)?;
    apply_labels(&mut hierarchy, &index);

    let label = select_display_label(term_id, &index);
    let subject = if term_id == vocab.ontology_root {
        ontology.iri.as_ref().map(|iri| Subject {
            curie: iri.clone(),
            iri: expand(&prefixes, iri),
            label: index.display(iri).to_string(),
        })
    } else {
        Some(Subject {
            curie: term_id.to_string(),
            iri: expand(&prefixes, term_id),
            label: label.clone(),
        })
    };

    info!(
        "Built tree page for {} in {}: {} nodes, {} stanza rows",
        term_id,
        source,
        hierarchy.len(),
        stanza.rows.len()
    );
    Ok(TreePage {
        source: source.to_string(),
        term_id: term_id.to_string(),
        entity_type: result.entity_type,
        label,
        hierarchy,
        index,
        stanza: stanza.rows,
        ontology,
        subject,
    })
}
