//! Conversion between compact URIs and IRIs using a source's prefix table.

use crate::errors::BrowseError;
use crate::statement::Prefix;
use crate::store::StatementStore;
use anyhow::Result;
use log::debug;
use oxigraph::model::NamedNode;
use std::collections::BTreeSet;

/// A source's prefixes, always ordered longest base IRI first so expansion and compaction pick
/// the most specific namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
    prefixes: Vec<Prefix>,
}

impl PrefixTable {
    pub fn new(mut prefixes: Vec<Prefix>) -> Self {
        // stable, so equal-length bases keep the store's order
        prefixes.sort_by(|a, b| b.base.len().cmp(&a.base.len()));
        Self { prefixes }
    }

    pub fn load(store: &dyn StatementStore) -> Result<Self> {
        let prefixes = store.prefixes()?;
        debug!("Loaded {} prefixes", prefixes.len());
        Ok(Self::new(prefixes))
    }

    pub fn prefixes(&self) -> &[Prefix] {
        &self.prefixes
    }

    pub fn base_for(&self, prefix: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|p| p.prefix == prefix)
            .map(|p| p.base.as_str())
    }

    pub fn prefix_for_base(&self, base: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|p| p.base == base)
            .map(|p| p.prefix.as_str())
    }

    /// Expands a CURIE into an IRI. Blank nodes, `<...>` absolute forms, and CURIEs with an
    /// unknown prefix come back unchanged.
    pub fn curie_to_iri(&self, curie: &str) -> String {
        if is_unresolvable(curie) {
            return curie.to_string();
        }
        match split_curie(curie) {
            Ok((prefix, local)) => match self.base_for(prefix) {
                Some(base) => format!("{}{}", base, local),
                None => curie.to_string(),
            },
            Err(_) => curie.to_string(),
        }
    }

    /// Expands a CURIE into a validated IRI node; `<...>` forms are unwrapped first.
    pub fn curie_to_named_node(&self, curie: &str) -> Option<NamedNode> {
        if let Some(iri) = curie.strip_prefix('<').and_then(|c| c.strip_suffix('>')) {
            return NamedNode::new(iri).ok();
        }
        if curie.starts_with("_:") {
            return None;
        }
        let iri = self.curie_to_iri(curie);
        if iri == curie {
            // nothing expanded; only accept it if it is already an absolute IRI
            return NamedNode::new(iri).ok().filter(|_| curie.contains("://"));
        }
        NamedNode::new(iri).ok()
    }

    /// Compacts an IRI against the longest matching base.
    pub fn iri_to_curie(&self, iri: &str) -> Option<String> {
        self.prefixes.iter().find_map(|p| {
            iri.strip_prefix(p.base.as_str())
                .map(|local| format!("{}:{}", p.prefix, local))
        })
    }

    /// The entries whose prefix is used by at least one of `curies`, in table order.
    pub fn used_by<'a, I>(&self, curies: I) -> Vec<Prefix>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let used: BTreeSet<&str> = curies
            .into_iter()
            .filter(|c| !is_unresolvable(c))
            .filter_map(|c| split_curie(c).ok().map(|(prefix, _)| prefix))
            .collect();
        self.prefixes
            .iter()
            .filter(|p| used.contains(p.prefix.as_str()))
            .cloned()
            .collect()
    }
}

/// Blank nodes and bracketed absolute IRIs never go through prefix lookup.
pub fn is_unresolvable(curie: &str) -> bool {
    curie.is_empty() || curie.starts_with('_') || curie.starts_with('<')
}

/// Splits on the first `:`.
pub fn split_curie(curie: &str) -> Result<(&str, &str), BrowseError> {
    curie
        .split_once(':')
        .ok_or_else(|| BrowseError::MalformedCurie(curie.to_string()))
}
