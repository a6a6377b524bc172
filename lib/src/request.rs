//! Navigation state carried in a query string: `?sources=A,B&id=ex:Dog`, plus `format=json`
//! and `text` for search.

use crate::config::Vocabulary;
use crate::errors::BrowseError;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Page,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// ordered; the first is the only one searched
    pub sources: Vec<String>,
    pub id: String,
    pub text: String,
    pub mode: Mode,
}

/// Splits a comma-separated source list, dropping blanks.
pub fn parse_sources(list: &str) -> Result<Vec<String>> {
    let sources: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if sources.is_empty() {
        return Err(BrowseError::EmptySourceList.into());
    }
    Ok(sources)
}

impl Request {
    pub fn new(sources: Vec<String>, id: Option<String>, vocab: &Vocabulary) -> Self {
        Self {
            sources,
            id: id.unwrap_or_else(|| vocab.class_root.clone()),
            text: String::new(),
            mode: Mode::Page,
        }
    }

    /// Parses a raw (possibly `?`-prefixed) query string. `sources` is mandatory; a missing `id`
    /// selects the class root.
    pub fn from_query(query: &str, vocab: &Vocabulary) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut sources = None;
        let mut id = None;
        let mut text = String::new();
        let mut mode = Mode::Page;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "sources" => sources = Some(value.into_owned()),
                "id" if !value.is_empty() => id = Some(value.into_owned()),
                "text" => text = value.into_owned(),
                "format" if value == "json" => mode = Mode::Search,
                _ => {}
            }
        }
        let sources = sources.ok_or(BrowseError::MissingParameter("sources"))?;
        let mut request = Self::new(parse_sources(&sources)?, id, vocab);
        request.text = text;
        request.mode = mode;
        Ok(request)
    }
}
