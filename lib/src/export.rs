//! Serializes a term's stanza as RDF, expanding CURIEs through the source's prefix table.

use crate::prefix::PrefixTable;
use crate::statement::Statement;
use anyhow::{anyhow, Result};
use log::{debug, warn};
use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{
    BlankNode, Graph, Literal, NamedNode, NamedOrBlankNode, Term, Triple,
};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Turtle,
    NTriples,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "turtle" | "ttl" => Ok(ExportFormat::Turtle),
            "ntriples" | "nt" => Ok(ExportFormat::NTriples),
            other => Err(anyhow!("Unsupported export format: {}", other)),
        }
    }
}

impl From<ExportFormat> for RdfFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Turtle => RdfFormat::Turtle,
            ExportFormat::NTriples => RdfFormat::NTriples,
        }
    }
}

fn node(prefixes: &PrefixTable, curie: &str) -> Option<NamedOrBlankNode> {
    match curie.strip_prefix("_:") {
        Some(id) => BlankNode::new(id).ok().map(Into::into),
        None => prefixes.curie_to_named_node(curie).map(Into::into),
    }
}

fn object(prefixes: &PrefixTable, row: &Statement) -> Option<Term> {
    if let Some(object) = row.object.as_deref().filter(|o| !o.is_empty()) {
        return node(prefixes, object).map(Into::into);
    }
    let value = row.value.as_deref()?;
    if let Some(language) = row.language.as_deref().filter(|l| !l.is_empty()) {
        return Literal::new_language_tagged_literal(value, language)
            .ok()
            .map(Into::into);
    }
    // datatypes starting with '_' are storage markers, not RDF datatypes
    let datatype = row
        .datatype
        .as_deref()
        .filter(|d| !d.is_empty() && !d.starts_with('_'))
        .and_then(|d| prefixes.curie_to_named_node(d));
    Some(match datatype {
        Some(datatype) => Literal::new_typed_literal(value, datatype).into(),
        None => Literal::new_simple_literal(value).into(),
    })
}

/// Converts stanza rows to triples. Rows whose terms cannot be expanded are skipped.
pub fn stanza_to_graph(rows: &[Statement], prefixes: &PrefixTable) -> Graph {
    let mut graph = Graph::new();
    for row in rows {
        let triple = (|| {
            let subject = node(prefixes, &row.subject)?;
            let predicate: NamedNode = prefixes.curie_to_named_node(&row.predicate)?;
            let object = object(prefixes, row)?;
            Some(Triple::new(subject, predicate, object))
        })();
        match triple {
            Some(triple) => {
                graph.insert(&triple);
            }
            None => warn!(
                "Skipping row {} {} that does not expand to RDF",
                row.subject, row.predicate
            ),
        }
    }
    graph
}

/// Writes the stanza in the requested format; Turtle output declares the source's prefixes.
pub fn serialize_stanza(
    rows: &[Statement],
    prefixes: &PrefixTable,
    format: ExportFormat,
) -> Result<String> {
    let graph = stanza_to_graph(rows, prefixes);
    debug!("Serializing {} triples as {:?}", graph.len(), format);
    let mut serializer = RdfSerializer::from_format(format.into());
    if format == ExportFormat::Turtle {
        for p in prefixes.prefixes() {
            if NamedNode::new(p.base.as_str()).is_ok() {
                serializer = serializer.with_prefix(p.prefix.as_str(), p.base.as_str())?;
            }
        }
    }
    let mut writer = serializer.for_writer(Vec::new());
    for triple in graph.iter() {
        writer.serialize_triple(triple)?;
    }
    let bytes = writer.finish()?;
    Ok(String::from_utf8(bytes)?)
}
