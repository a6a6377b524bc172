//! Turns tree pages into markup: one HTML/RDFa fragment per source, then the full page.

use crate::errors::BrowseError;
use crate::hierarchy::Hierarchy;
use crate::page::TreePage;
use crate::statement::Statement;
use anyhow::Result;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;
use tera::{escape_html, Context, Tera};

const DEFAULT_TEMPLATE: &str = include_str!("../templates/index.html.tera");

/// Builds links that keep the full source list and only swap the term id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationHref {
    sources: Vec<String>,
}

impl NavigationHref {
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Each source percent-encoded, joined with literal commas.
    fn source_list(&self) -> String {
        self.sources
            .iter()
            .map(|s| encode(s))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The href pattern with a `{curie}` placeholder.
    pub fn template(&self) -> String {
        format!("?sources={}&id={{curie}}", self.source_list())
    }

    pub fn href(&self, curie: &str) -> String {
        format!("?sources={}&id={}", self.source_list(), encode(curie))
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub trait Renderer: Sync {
    /// Markup for one source's column.
    fn render(&self, page: &TreePage, entity_type: &str, href: &NavigationHref) -> Result<String>;

    /// Placeholder column for a source whose page could not be built.
    fn render_failure(&self, source: &str, term_id: &str, error: &anyhow::Error) -> String {
        format!(
            "<div class=\"failure\" data-source=\"{}\"><h3>{}</h3><p>Could not show {}: {}</p></div>",
            escape_html(source),
            escape_html(source),
            escape_html(term_id),
            escape_html(&error.to_string())
        )
    }
}

pub trait PageTemplate: Sync {
    fn render(&self, first: &str, rest: &[String], title: &str) -> Result<String>;
}

/// Nested-list hierarchy followed by the stanza table, annotated with RDFa.
#[derive(Debug, Clone, Default)]
pub struct RdfaRenderer;

impl RdfaRenderer {
    fn node(
        &self,
        out: &mut String,
        page: &TreePage,
        curie: &str,
        href: &NavigationHref,
        path: &mut BTreeSet<String>,
    ) {
        let hierarchy: &Hierarchy = &page.hierarchy;
        let Some(node) = hierarchy.get(curie) else {
            return;
        };
        let label = escape_html(node.display_label(curie));
        let label = if node.obsolete {
            format!("<span class=\"obsolete\">{}</span>", label)
        } else {
            label
        };
        out.push_str("<li>");
        if curie == page.term_id {
            let _ = write!(
                out,
                "<span class=\"active\" about=\"{}\">{}</span>",
                escape_html(curie),
                label
            );
        } else {
            let _ = write!(
                out,
                "<a href=\"{}\" resource=\"{}\">{}</a>",
                escape_html(&href.href(curie)),
                escape_html(curie),
                label
            );
        }
        // a term reached again along its own path is a cycle; draw it but stop there
        if !node.children.is_empty() && path.insert(curie.to_string()) {
            out.push_str("<ul>");
            for child in &node.children {
                self.node(out, page, child, href, path);
            }
            out.push_str("</ul>");
            path.remove(curie);
        }
        out.push_str("</li>");
    }

    fn value(
        &self,
        out: &mut String,
        page: &TreePage,
        row: &Statement,
        href: &NavigationHref,
        shown: &mut BTreeSet<String>,
    ) {
        let predicate = escape_html(&row.predicate);
        match (&row.object, &row.value) {
            (Some(object), _) if !object.is_empty() => {
                if object.starts_with("_:") {
                    let _ = write!(
                        out,
                        "<div class=\"blank\" rel=\"{}\">",
                        predicate
                    );
                    // each blank node is expanded once, which also stops cycles
                    if shown.insert(object.clone()) {
                        self.rows(out, page, object, href, shown);
                    } else {
                        out.push_str(&escape_html(object));
                    }
                    out.push_str("</div>");
                } else {
                    let class = if page.index.is_obsolete(object) {
                        " class=\"obsolete\""
                    } else {
                        ""
                    };
                    let _ = write!(
                        out,
                        "<a href=\"{}\" rel=\"{}\" resource=\"{}\"{}>{}</a>",
                        escape_html(&href.href(object)),
                        predicate,
                        escape_html(object),
                        class,
                        escape_html(page.index.display(object))
                    );
                }
            }
            (_, Some(value)) => {
                let _ = write!(out, "<span property=\"{}\"", predicate);
                if let Some(datatype) = &row.datatype {
                    let _ = write!(out, " datatype=\"{}\"", escape_html(datatype));
                }
                if let Some(language) = &row.language {
                    let _ = write!(out, " xml:lang=\"{}\"", escape_html(language));
                }
                let _ = write!(out, ">{}</span>", escape_html(value));
            }
            _ => {}
        }
    }

    /// The table of stanza rows about `subject`; blank-node objects nest their own rows.
    fn rows(
        &self,
        out: &mut String,
        page: &TreePage,
        subject: &str,
        href: &NavigationHref,
        shown: &mut BTreeSet<String>,
    ) {
        let rows: Vec<&Statement> = page
            .stanza
            .iter()
            .filter(|row| row.subject == subject)
            .collect();
        if rows.is_empty() {
            return;
        }
        out.push_str("<table class=\"stanza\"><tbody>");
        // rows arrive sorted by predicate, so each run is one table row
        for group in rows.chunk_by(|a, b| a.predicate == b.predicate) {
            let predicate = &group[0].predicate;
            let _ = write!(
                out,
                "<tr><th><a href=\"{}\">{}</a></th><td><ul>",
                escape_html(&href.href(predicate)),
                escape_html(page.index.display(predicate))
            );
            for row in group {
                out.push_str("<li>");
                self.value(out, page, row, href, shown);
                out.push_str("</li>");
            }
            out.push_str("</ul></td></tr>");
        }
        out.push_str("</tbody></table>");
    }

    fn stanza(&self, out: &mut String, page: &TreePage, href: &NavigationHref) {
        let Some(subject) = &page.subject else {
            return;
        };
        let _ = write!(
            out,
            "<div class=\"stanza\" resource=\"{}\"><h2>{}</h2>",
            escape_html(&subject.curie),
            escape_html(&subject.label)
        );
        if page.index.is_obsolete(&subject.curie) {
            out.push_str("<p class=\"obsolete\">obsolete</p>");
        }
        let _ = write!(
            out,
            "<p><a href=\"{}\">{}</a></p>",
            escape_html(&subject.iri),
            escape_html(&subject.iri)
        );
        let mut shown = BTreeSet::new();
        self.rows(out, page, &subject.curie, href, &mut shown);
        // blank nodes in the stanza that no shown row points at
        let mut unattached: Vec<&str> = page
            .stanza
            .iter()
            .map(|row| row.subject.as_str())
            .filter(|s| s.starts_with("_:"))
            .collect();
        unattached.sort_unstable();
        unattached.dedup();
        for blank in unattached {
            if shown.insert(blank.to_string()) {
                let _ = write!(
                    out,
                    "<div class=\"blank\" about=\"{}\">",
                    escape_html(blank)
                );
                self.rows(out, page, blank, href, &mut shown);
                out.push_str("</div>");
            }
        }
        out.push_str("</div>");
    }
}

impl Renderer for RdfaRenderer {
    fn render(&self, page: &TreePage, entity_type: &str, href: &NavigationHref) -> Result<String> {
        let mut out = String::new();
        let prefixes: Vec<String> = page
            .index
            .prefixes
            .iter()
            .map(|p| format!("{}: {}", p.prefix, p.base))
            .collect();
        let _ = write!(
            out,
            "<div class=\"tree-page\" data-source=\"{}\" prefix=\"{}\">",
            escape_html(&page.source),
            escape_html(&prefixes.join(" "))
        );
        let heading = page.ontology.title.as_deref().unwrap_or(&page.source);
        let _ = write!(out, "<h3>{}</h3>", escape_html(heading));
        out.push_str("<ul class=\"hierarchy\">");
        let mut path = BTreeSet::new();
        self.node(&mut out, page, entity_type, href, &mut path);
        out.push_str("</ul>");
        self.stanza(&mut out, page, href);
        out.push_str("</div>");
        Ok(out)
    }
}

/// Page template rendered with Tera. Fragments are inserted unescaped.
#[derive(Debug, Clone)]
pub struct TeraPage {
    template: String,
}

impl Default for TeraPage {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl TeraPage {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }
}

impl PageTemplate for TeraPage {
    fn render(&self, first: &str, rest: &[String], title: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("first", first);
        context.insert("trees", rest);
        context.insert("title", title);
        Ok(Tera::one_off(&self.template, &context, true).map_err(BrowseError::from)?)
    }
}
