//! Builds one column per requested source and lines them up for comparison.
//!
//! Sources are isolated from each other: each column opens its own store, and a failure in one
//! source becomes a placeholder column instead of failing the page.

use crate::config::Vocabulary;
use crate::errors::BrowseError;
use crate::page::build_tree_page;
use crate::render::{NavigationHref, Renderer};
use crate::store::SourceCatalog;
use anyhow::{anyhow, Result};
use log::{info, warn};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ComposedPage {
    pub first: String,
    pub rest: Vec<String>,
}

/// Settings shared by every column of one comparison.
pub struct ComposeOptions<'a> {
    pub vocabulary: &'a Vocabulary,
    pub include_children: bool,
    /// build the columns on scoped threads; output order is unchanged
    pub parallel: bool,
}

fn column<C: SourceCatalog>(
    catalog: &C,
    renderer: &dyn Renderer,
    options: &ComposeOptions<'_>,
    source: &str,
    term_id: &str,
    href: &NavigationHref,
) -> Result<String> {
    let store = catalog.open(source)?;
    let page = build_tree_page(
        &store,
        options.vocabulary,
        source,
        term_id,
        options.include_children,
    )?;
    renderer.render(&page, &page.entity_type, href)
}

/// Renders `term_id` from every source in `sources`, keeping their order.
pub fn compose<C: SourceCatalog>(
    catalog: &C,
    renderer: &dyn Renderer,
    options: &ComposeOptions<'_>,
    sources: &[String],
    term_id: &str,
) -> Result<ComposedPage> {
    if sources.is_empty() {
        return Err(BrowseError::EmptySourceList.into());
    }
    let href = NavigationHref::new(sources.iter().cloned());
    info!("Composing {} for sources {:?}", term_id, sources);

    let results: Vec<Result<String>> = if options.parallel {
        std::thread::scope(|scope| {
            let handles: Vec<_> = sources
                .iter()
                .map(|source| {
                    let href = &href;
                    scope.spawn(move || column(catalog, renderer, options, source, term_id, href))
                })
                .collect();
            handles
                .into_iter()
                .zip(sources)
                .map(|(handle, source)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(anyhow!("worker for source {} panicked", source)))
                })
                .collect()
        })
    } else {
        sources
            .iter()
            .map(|source| column(catalog, renderer, options, source, term_id, &href))
            .collect()
    };

    let mut fragments: Vec<String> = results
        .into_iter()
        .zip(sources)
        .map(|(result, source)| match result {
            Ok(fragment) => fragment,
            Err(e) => {
                warn!("Failed to build {} from source {}: {:#}", term_id, source, e);
                renderer.render_failure(source, term_id, &e)
            }
        })
        .collect();
    let first = fragments.remove(0);
    Ok(ComposedPage {
        first,
        rest: fragments,
    })
}
