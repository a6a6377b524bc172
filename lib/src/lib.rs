//! Side-by-side browsing of ontology class and property hierarchies stored as statement tables,
//! one SQLite database per source.

extern crate derive_builder;

pub mod api;
pub mod compose;
pub mod config;
pub mod consts;
pub mod errors;
pub mod export;
pub mod hierarchy;
pub mod labels;
pub mod ontology;
pub mod page;
pub mod prefix;
pub mod render;
pub mod request;
pub mod roots;
pub mod search;
pub mod stanza;
pub mod statement;
pub mod store;

pub use api::{Browser, Response};
pub use config::{Config, Vocabulary};
pub use errors::BrowseError;
pub use request::{Mode, Request};
pub use store::{DirectoryCatalog, SourceCatalog, SqliteStore, StatementStore};
