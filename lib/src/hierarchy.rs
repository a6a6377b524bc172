//! The local parent/child neighbourhood around one focal term.
//!
//! A `Hierarchy` is rebuilt for every request. For the fixed top-level types it comes from the
//! root policy in [`crate::roots`]; for every other term the store's traversal capability
//! supplies the edges and this module stitches them into nodes hanging off the entity-type root.

use crate::config::Vocabulary;
use crate::errors::BrowseError;
use crate::roots;
use crate::statement::StatementPattern;
use crate::store::StatementStore;
use anyhow::Result;
use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TermNode {
    /// display label; the key itself is shown when unset
    pub label: Option<String>,
    pub obsolete: bool,
    pub parents: Vec<String>,
    pub children: Vec<String>,
}

impl TermNode {
    pub fn display_label<'a>(&'a self, curie: &'a str) -> &'a str {
        self.label.as_deref().unwrap_or(curie)
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Hierarchy {
    nodes: BTreeMap<String, TermNode>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `curie`, creating an empty one if needed.
    pub fn ensure(&mut self, curie: &str) -> &mut TermNode {
        self.nodes.entry(curie.to_string()).or_default()
    }

    /// Records `child` under `parent`, creating both nodes. Duplicate links and self-loops are
    /// ignored.
    pub fn link(&mut self, parent: &str, child: &str) {
        if parent == child {
            return;
        }
        self.ensure(child);
        let p = self.ensure(parent);
        if !p.children.iter().any(|c| c == child) {
            p.children.push(child.to_string());
        }
        let c = self.ensure(child);
        if !c.parents.iter().any(|x| x == parent) {
            c.parents.push(parent.to_string());
        }
    }

    pub fn get(&self, curie: &str) -> Option<&TermNode> {
        self.nodes.get(curie)
    }

    pub fn get_mut(&mut self, curie: &str) -> Option<&mut TermNode> {
        self.nodes.get_mut(curie)
    }

    pub fn contains(&self, curie: &str) -> bool {
        self.nodes.contains_key(curie)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TermNode)> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut TermNode)> {
        self.nodes.iter_mut()
    }

    /// Every CURIE appearing as a key, a parent or a child.
    pub fn curies(&self) -> BTreeSet<String> {
        let mut curies = BTreeSet::new();
        for (key, node) in &self.nodes {
            curies.insert(key.clone());
            curies.extend(node.parents.iter().cloned());
            curies.extend(node.children.iter().cloned());
        }
        curies
    }
}

/// What the builder hands to the rest of the page pipeline.
#[derive(Debug, Clone)]
pub struct HierarchyResult {
    pub hierarchy: Hierarchy,
    /// seeds label and obsolescence resolution
    pub referenced: BTreeSet<String>,
    pub entity_type: String,
}

/// Classifies a non-root term by its own `rdf:type` assertions.
///
/// The first asserted type that is itself a top-level type wins. Any other asserted type (a
/// class, or an individual marker) makes the term an individual. Without type assertions a
/// stated `subClassOf`/`subPropertyOf` parent decides between class and object property.
pub fn entity_type(store: &dyn StatementStore, vocab: &Vocabulary, term_id: &str) -> Result<String> {
    let types = store.find(
        &StatementPattern::new()
            .stanza(term_id)
            .subject(term_id)
            .predicate(vocab.type_predicate.as_str()),
    )?;
    let objects: Vec<&str> = types.iter().filter_map(|r| r.object.as_deref()).collect();
    if let Some(t) = objects
        .iter()
        .find(|o| vocab.is_top_level(o) && **o != vocab.ontology_root)
    {
        return Ok(t.to_string());
    }
    if !objects.is_empty() {
        return Ok(vocab.individual_root.clone());
    }
    let has_parent = |predicate: &str| -> Result<bool> {
        Ok(!store
            .find(
                &StatementPattern::new()
                    .stanza(term_id)
                    .subject(term_id)
                    .predicate(predicate),
            )?
            .is_empty())
    };
    if has_parent(&vocab.subclass_predicate)? {
        return Ok(vocab.class_root.clone());
    }
    if has_parent(&vocab.subproperty_predicate)? {
        return Ok(vocab.object_property_root.clone());
    }
    Err(BrowseError::UnknownEntityType(term_id.to_string()).into())
}

/// Adds every node reachable from `from` through child links to `reached`.
fn reach(hierarchy: &Hierarchy, from: &str, reached: &mut BTreeSet<String>) {
    let mut stack = vec![from.to_string()];
    while let Some(curie) = stack.pop() {
        if !reached.insert(curie.clone()) {
            continue;
        }
        if let Some(node) = hierarchy.get(&curie) {
            stack.extend(
                node.children
                    .iter()
                    .filter(|c| !reached.contains(*c))
                    .cloned(),
            );
        }
    }
}

/// Builds the neighbourhood of `term_id`.
///
/// Top-level types go through the root policy; everything else is classified with
/// [`entity_type`] and filled from the store's traversal. Ancestors left without a parent, and
/// one member of any cycle not reachable from the root, are hung under the entity-type root so
/// the tree always starts there.
pub fn build_hierarchy(
    store: &dyn StatementStore,
    vocab: &Vocabulary,
    term_id: &str,
    include_children: bool,
    ontology_iri: Option<&str>,
) -> Result<HierarchyResult> {
    if vocab.is_top_level(term_id) {
        let hierarchy = roots::top_level_hierarchy(store, vocab, term_id)?;
        let mut referenced = hierarchy.curies();
        if term_id == vocab.ontology_root {
            if let Some(iri) = ontology_iri {
                referenced.insert(iri.to_string());
            }
        }
        info!(
            "Top level {} has {} direct children",
            term_id,
            hierarchy.len().saturating_sub(1)
        );
        return Ok(HierarchyResult {
            hierarchy,
            referenced,
            entity_type: term_id.to_string(),
        });
    }

    let entity_type = entity_type(store, vocab, term_id)?;
    debug!("{} is a {}", term_id, entity_type);
    let edges = store.hierarchy_edges(term_id, &entity_type, include_children)?;

    let mut hierarchy = Hierarchy::new();
    hierarchy.ensure(&entity_type);
    hierarchy.ensure(term_id);
    for edge in &edges {
        // a stated top-class parent is the same as hanging directly off the root
        let parent = if edge.parent == vocab.top_class {
            entity_type.as_str()
        } else {
            edge.parent.as_str()
        };
        hierarchy.link(parent, &edge.child);
    }
    let orphans: Vec<String> = hierarchy
        .iter()
        .filter(|(key, node)| **key != entity_type && node.parents.is_empty())
        .map(|(key, _)| key.clone())
        .collect();
    for orphan in orphans {
        hierarchy.link(&entity_type, &orphan);
    }
    // an ancestor chain ending in a cycle has no orphan; hang one member of it off the root
    let mut reached = BTreeSet::new();
    reach(&hierarchy, &entity_type, &mut reached);
    let keys: Vec<String> = hierarchy.iter().map(|(key, _)| key.clone()).collect();
    for key in keys {
        if !reached.contains(&key) {
            debug!("Attaching cyclic ancestor {} under {}", key, entity_type);
            hierarchy.link(&entity_type, &key);
            reach(&hierarchy, &key, &mut reached);
        }
    }

    let referenced = hierarchy.curies();
    Ok(HierarchyResult {
        hierarchy,
        referenced,
        entity_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_is_idempotent_and_ignores_self_loops() {
        let mut h = Hierarchy::new();
        h.link("owl:Class", "ex:Dog");
        h.link("owl:Class", "ex:Dog");
        h.link("ex:Dog", "ex:Dog");
        assert_eq!(h.get("owl:Class").unwrap().children, vec!["ex:Dog"]);
        assert_eq!(h.get("ex:Dog").unwrap().parents, vec!["owl:Class"]);
        assert!(h.get("ex:Dog").unwrap().children.is_empty());
    }

    #[test]
    fn curies_cover_keys_parents_and_children() {
        let mut h = Hierarchy::new();
        h.link("a:1", "a:2");
        h.ensure("a:3");
        let curies = h.curies();
        assert_eq!(
            curies.into_iter().collect::<Vec<_>>(),
            vec!["a:1".to_string(), "a:2".to_string(), "a:3".to_string()]
        );
    }

    #[test]
    fn display_label_defaults_to_key() {
        let node = TermNode::default();
        assert_eq!(node.display_label("ex:Dog"), "ex:Dog");
        let node = TermNode {
            label: Some("Dog".into()),
            ..Default::default()
        };
        assert_eq!(node.display_label("ex:Dog"), "Dog");
    }
}
