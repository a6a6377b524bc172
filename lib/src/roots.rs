//! Direct children of the fixed top-level types.
//!
//! Each root type has its own discovery rule. All of them produce a single level: every child
//! gets the root as its only parent and no children of its own.

use crate::config::Vocabulary;
use crate::hierarchy::Hierarchy;
use crate::statement::{Statement, StatementPattern};
use crate::store::StatementStore;
use anyhow::Result;
use log::debug;
use std::collections::{HashMap, HashSet};

/// Distinct subjects in row order.
fn distinct_subjects<'a, I>(rows: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Statement>,
{
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert(r.subject.as_str()))
        .map(|r| r.subject.clone())
        .collect()
}

/// Subjects whose every `rdf:type` is an individual marker, with at least one type that is not
/// itself a top-level type.
fn individuals(store: &dyn StatementStore, vocab: &Vocabulary) -> Result<Vec<String>> {
    let rows = store.find(&StatementPattern::new().predicate(vocab.type_predicate.as_str()))?;
    let mut order: Vec<&str> = Vec::new();
    let mut types: HashMap<&str, Vec<&str>> = HashMap::new();
    // a type row without an object says nothing about either condition
    for row in &rows {
        let Some(object) = row.object.as_deref() else {
            continue;
        };
        types
            .entry(row.subject.as_str())
            .or_insert_with(|| {
                order.push(row.subject.as_str());
                Vec::new()
            })
            .push(object);
    }
    Ok(order
        .into_iter()
        .filter(|subject| {
            let objects = &types[subject];
            let only_markers = objects.iter().all(|o| vocab.is_individual_marker(o));
            let any_non_top = objects.iter().any(|o| !vocab.is_top_level(o));
            only_markers && any_non_top
        })
        .map(str::to_string)
        .collect())
}

fn datatypes(store: &dyn StatementStore, vocab: &Vocabulary) -> Result<Vec<String>> {
    let rows = store.find(
        &StatementPattern::new()
            .predicate(vocab.type_predicate.as_str())
            .object(vocab.datatype_root.as_str()),
    )?;
    Ok(distinct_subjects(&rows))
}

/// Terms typed as `root` without any stated parent other than the universal top class.
fn parentless(store: &dyn StatementStore, vocab: &Vocabulary, root: &str) -> Result<Vec<String>> {
    let predicate = vocab.parent_predicate(root);
    let parented: HashSet<String> = store
        .find(&StatementPattern::new().predicate(predicate))?
        .into_iter()
        .filter(|r| r.object.as_deref() != Some(vocab.top_class.as_str()))
        .map(|r| r.subject)
        .collect();
    let typed = store.find(
        &StatementPattern::new()
            .predicate(vocab.type_predicate.as_str())
            .object(root),
    )?;
    let candidates = distinct_subjects(&typed);
    Ok(candidates
        .into_iter()
        .filter(|s| {
            !s.starts_with("_:")
                && s != root
                && *s != vocab.top_class
                && *s != vocab.type_predicate
                && !parented.contains(s)
        })
        .collect())
}

/// The direct children of a top-level type.
pub fn top_level_children(
    store: &dyn StatementStore,
    vocab: &Vocabulary,
    root: &str,
) -> Result<Vec<String>> {
    if root == vocab.ontology_root {
        Ok(vec![])
    } else if root == vocab.individual_root {
        individuals(store, vocab)
    } else if root == vocab.datatype_root {
        datatypes(store, vocab)
    } else {
        parentless(store, vocab, root)
    }
}

/// A one-level hierarchy: `root` and its direct children.
pub fn top_level_hierarchy(
    store: &dyn StatementStore,
    vocab: &Vocabulary,
    root: &str,
) -> Result<Hierarchy> {
    let children = top_level_children(store, vocab, root)?;
    debug!("{} direct children under {}", children.len(), root);
    let mut hierarchy = Hierarchy::new();
    hierarchy.ensure(root);
    for child in &children {
        hierarchy.link(root, child);
    }
    Ok(hierarchy)
}
