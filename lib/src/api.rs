//! Defines the main `Browser` API struct, which ties a source directory, a renderer and a page
//! template together and answers page, search and export requests.

use crate::compose::{compose, ComposeOptions, ComposedPage};
use crate::config::Config;
use crate::export::{serialize_stanza, ExportFormat};
use crate::ontology::ontology_metadata;
use crate::page::{build_tree_page, TreePage};
use crate::prefix::PrefixTable;
use crate::render::{PageTemplate, RdfaRenderer, Renderer, TeraPage};
use crate::request::{Mode, Request};
use crate::search::{dispatch_search, search_response, LabelSearch, SearchCapability, SearchHit};
use crate::stanza::load_stanza;
use crate::store::{DirectoryCatalog, SourceCatalog};
use anyhow::Result;
use log::{debug, info};
use serde_json::Value;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Copies `ONTOTREE_LOG` into `RUST_LOG` so it wins over the process environment.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("ONTOTREE_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}

/// A finished answer to a `Request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub content_type: &'static str,
    pub body: String,
}

pub struct Browser {
    config: Config,
    catalog: DirectoryCatalog,
    renderer: Box<dyn Renderer>,
    page: Box<dyn PageTemplate>,
    search: LabelSearch<DirectoryCatalog>,
}

impl Browser {
    /// Creates a browser over `config.database_dir`, using the RDFa renderer and either the
    /// configured template file or the built-in page.
    pub fn new(config: Config) -> Result<Self> {
        let catalog = DirectoryCatalog::from_config(&config);
        let page: Box<dyn PageTemplate> = match &config.template {
            Some(path) => {
                info!("Using page template {}", path.display());
                Box::new(TeraPage::from_file(path)?)
            }
            None => Box::new(TeraPage::default()),
        };
        let search = LabelSearch::new(
            catalog.clone(),
            config.vocabulary.clone(),
            config.search_limit,
        );
        Ok(Self {
            config,
            catalog,
            renderer: Box::new(RdfaRenderer),
            page,
            search,
        })
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_page_template(mut self, page: Box<dyn PageTemplate>) -> Self {
        self.page = page;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn list_sources(&self) -> Result<Vec<String>> {
        self.catalog.list_sources()
    }

    /// The payload for one source, before rendering.
    pub fn tree_page(&self, source: &str, term_id: &str) -> Result<TreePage> {
        let store = self.catalog.open(source)?;
        build_tree_page(
            &store,
            &self.config.vocabulary,
            source,
            term_id,
            self.config.include_children,
        )
    }

    /// One rendered fragment per source, in request order.
    pub fn compose(&self, sources: &[String], term_id: &str) -> Result<ComposedPage> {
        let options = ComposeOptions {
            vocabulary: &self.config.vocabulary,
            include_children: self.config.include_children,
            parallel: self.config.parallel,
        };
        compose(
            &self.catalog,
            self.renderer.as_ref(),
            &options,
            sources,
            term_id,
        )
    }

    /// The complete HTML comparison page.
    pub fn page(&self, sources: &[String], term_id: &str) -> Result<String> {
        let composed = self.compose(sources, term_id)?;
        self.page
            .render(&composed.first, &composed.rest, &self.config.title)
    }

    pub fn search(&self, source: &str, text: &str) -> Result<Vec<SearchHit>> {
        let store = self.catalog.open(source)?;
        self.search.hits(&store, text)
    }

    /// Searches the first of `sources`; failures come back as `{"error": ...}`.
    pub fn search_json(&self, sources: &[String], text: &str) -> Value {
        search_response(dispatch_search(&self.search, sources, text))
    }

    pub fn search_capability(&self) -> &dyn SearchCapability {
        &self.search
    }

    /// The stanza of `term_id` in `source`, serialized as RDF.
    pub fn export_stanza(&self, source: &str, term_id: &str, format: ExportFormat) -> Result<String> {
        let vocab = &self.config.vocabulary;
        let store = self.catalog.open(source)?;
        let prefixes = PrefixTable::load(&store)?;
        let ontology = ontology_metadata(&store, &prefixes, vocab)?;
        let stanza = load_stanza(&store, vocab, term_id, ontology.iri.as_deref())?;
        serialize_stanza(&stanza.rows, &prefixes, format)
    }

    pub fn handle(&self, request: &Request) -> Result<Response> {
        debug!("Handling {:?}", request);
        match request.mode {
            Mode::Page => Ok(Response {
                content_type: HTML_CONTENT_TYPE,
                body: self.page(&request.sources, &request.id)?,
            }),
            Mode::Search => Ok(Response {
                content_type: JSON_CONTENT_TYPE,
                body: serde_json::to_string(&self.search_json(&request.sources, &request.text))?,
            }),
        }
    }
}
