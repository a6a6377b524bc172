//! Text search over a single source.
//!
//! Only the first requested source is ever searched; the result is forwarded untouched.

use crate::config::Vocabulary;
use crate::errors::BrowseError;
use crate::store::{SourceCatalog, StatementStore};
use anyhow::Result;
use log::{debug, info};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};

pub trait SearchCapability: Sync {
    fn search(&self, source: &str, text: &str) -> Result<Value>;
}

/// Sends the query to the first source only.
pub fn dispatch_search(
    capability: &dyn SearchCapability,
    sources: &[String],
    text: &str,
) -> Result<Value> {
    let first = sources.first().ok_or(BrowseError::EmptySourceList)?;
    info!("Searching {} for {:?}", first, text);
    capability.search(first, text)
}

/// Folds a failed search into a JSON error document.
pub fn search_response(result: Result<Value>) -> Value {
    match result {
        Ok(value) => value,
        Err(e) => json!({ "error": format!("{:#}", e) }),
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub label: String,
    pub short_label: String,
    pub synonym: Option<String>,
    pub property: String,
    pub order: usize,
}

/// How closely a matched literal fits the query; lower is better.
fn rank(value: &str, lowered_text: &str, word: &Regex) -> u8 {
    let lowered = value.to_lowercase();
    if lowered == lowered_text {
        0
    } else if lowered.starts_with(lowered_text) {
        1
    } else if word.is_match(value) {
        2
    } else {
        3
    }
}

fn local_name(curie: &str) -> &str {
    curie
        .split_once(':')
        .map(|(_, local)| local)
        .filter(|l| !l.is_empty())
        .unwrap_or(curie)
}

/// Case-insensitive substring search over labels and synonyms.
pub struct LabelSearch<C> {
    catalog: C,
    vocabulary: Vocabulary,
    limit: usize,
}

impl<C: SourceCatalog> LabelSearch<C> {
    pub fn new(catalog: C, vocabulary: Vocabulary, limit: usize) -> Self {
        Self {
            catalog,
            vocabulary,
            limit,
        }
    }

    /// Ranked hits: exact, then prefix, then word-start, then anywhere; ties by label.
    pub fn hits(&self, store: &dyn StatementStore, text: &str) -> Result<Vec<SearchHit>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![]);
        }
        let vocab = &self.vocabulary;
        let mut predicates = vec![vocab.label_predicate.clone()];
        predicates.extend(vocab.synonym_predicates.iter().cloned());
        let rows = store.literals_containing(&predicates, text)?;

        let lowered_text = text.to_lowercase();
        let word = RegexBuilder::new(&format!(r"\b{}", regex::escape(text)))
            .case_insensitive(true)
            .build()?;

        // best match per subject
        let mut best: BTreeMap<String, (u8, String, String)> = BTreeMap::new();
        for row in rows {
            let Some(value) = row.value else { continue };
            if row.subject.starts_with("_:") {
                continue;
            }
            let r = rank(&value, &lowered_text, &word);
            let better = best.get(&row.subject).map_or(true, |(old, _, _)| r < *old);
            if better {
                best.insert(row.subject, (r, row.predicate, value));
            }
        }

        let ids: Vec<String> = best.keys().cloned().collect();
        let mut labels: HashMap<String, String> = HashMap::new();
        if !ids.is_empty() {
            for row in store.literals_in_stanzas(&ids, &vocab.label_predicate, None)? {
                // last row wins, as in label resolution
                if let Some(value) = row.value {
                    labels.insert(row.subject, value);
                }
            }
        }

        let mut hits: Vec<(u8, SearchHit)> = best
            .into_iter()
            .map(|(id, (r, property, value))| {
                let is_label = property == vocab.label_predicate;
                let label = if is_label {
                    value.clone()
                } else {
                    labels.get(&id).cloned().unwrap_or_else(|| id.clone())
                };
                let hit = SearchHit {
                    short_label: local_name(&id).to_string(),
                    id,
                    label,
                    synonym: if is_label { None } else { Some(value) },
                    property,
                    order: 0,
                };
                (r, hit)
            })
            .collect();
        hits.sort_by(|(ra, a), (rb, b)| {
            ra.cmp(rb)
                .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(self.limit);
        debug!("{} hits for {:?}", hits.len(), text);
        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(i, (_, mut hit))| {
                hit.order = i + 1;
                hit
            })
            .collect())
    }
}

impl<C: SourceCatalog> SearchCapability for LabelSearch<C> {
    fn search(&self, source: &str, text: &str) -> Result<Value> {
        let store = self.catalog.open(source)?;
        let hits = self.hits(&store, text)?;
        Ok(serde_json::to_value(hits)?)
    }
}
