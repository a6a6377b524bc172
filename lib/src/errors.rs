//! Typed failures raised by the hierarchy engine. They travel inside `anyhow::Error`
//! so callers can recover them with `downcast_ref::<BrowseError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowseError {
    /// The string has no namespace separator and is neither a blank node nor an absolute IRI
    #[error("Malformed CURIE: {0}")]
    MalformedCurie(String),

    /// A non-root term has no type assertion (or parent assertion) we can classify
    #[error("Unknown entity type for {0}")]
    UnknownEntityType(String),

    #[error("No sources were requested")]
    EmptySourceList,

    #[error("Invalid source name: {0}")]
    InvalidSourceName(String),

    #[error("Source database not found at {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Store query failed: {0}")]
    StoreQuery(#[from] rusqlite::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),
}
