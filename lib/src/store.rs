//! Read-only access to a source's statement store.
//!
//! `StatementStore` is the capability the hierarchy engine is written against: exact-match and
//! set-membership reads over the statements relation, plus the generic ancestor/descendant
//! traversal. `SqliteStore` implements it over one SQLite database per source, and
//! `DirectoryCatalog` maps source names onto those databases.

use crate::config::{Config, Vocabulary};
use crate::errors::BrowseError;
use crate::statement::{Edge, Prefix, Statement, StatementPattern};
use anyhow::Result;
use log::{debug, info};
use regex::Regex;
use rusqlite::{Connection, OpenFlags, Row, ToSql};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Keeps `IN (...)` lists well below SQLite's bound-parameter limit.
const MAX_BOUND_PARAMS: usize = 500;

const STATEMENT_COLUMNS: &str = "stanza, subject, predicate, object, value, datatype, language";

pub trait StatementStore {
    /// The prefix table, longest base IRI first.
    fn prefixes(&self) -> Result<Vec<Prefix>>;

    /// Every row matching the pattern, in the store's natural row order.
    fn find(&self, pattern: &StatementPattern) -> Result<Vec<Statement>>;

    /// Literal rows (non-null `value`) whose stanza is one of `stanzas`, with the given
    /// predicate and, if set, the given value.
    fn literals_in_stanzas(
        &self,
        stanzas: &[String],
        predicate: &str,
        value: Option<&str>,
    ) -> Result<Vec<Statement>>;

    /// Literal rows for any of `predicates` whose value contains `text`, case-insensitively.
    fn literals_containing(&self, predicates: &[String], text: &str) -> Result<Vec<Statement>>;

    /// Parent/child links around `term_id`: all of its ancestors within the hierarchy of
    /// `entity_type` and, if `include_children` is set, its direct children.
    fn hierarchy_edges(
        &self,
        term_id: &str,
        entity_type: &str,
        include_children: bool,
    ) -> Result<Vec<Edge>>;
}

/// Maps source names to freshly opened stores. Each call hands out a new connection.
pub trait SourceCatalog: Sync {
    type Store: StatementStore;

    fn open(&self, source: &str) -> Result<Self::Store>;
}

fn statement_from_row(row: &Row) -> rusqlite::Result<Statement> {
    Ok(Statement {
        stanza: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        subject: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        predicate: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        object: row.get(3)?,
        value: row.get(4)?,
        datatype: row.get(5)?,
        language: row.get(6)?,
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn is_blank(curie: &str) -> bool {
    curie.starts_with("_:")
}

/// A statement store backed by a single SQLite database holding `prefix` and `statements`
/// tables. The connection is opened read-only.
pub struct SqliteStore {
    conn: Connection,
    vocabulary: Vocabulary,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteStore {
    pub fn open(path: &Path, vocabulary: Vocabulary) -> Result<Self> {
        if !path.is_file() {
            return Err(BrowseError::SourceNotFound(path.to_path_buf()).into());
        }
        debug!("Opening statement store: {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(BrowseError::from)?;
        Ok(Self { conn, vocabulary })
    }

    /// Wraps an existing connection; used when the caller manages the database itself.
    pub fn from_connection(conn: Connection, vocabulary: Vocabulary) -> Self {
        Self { conn, vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn query_statements(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Statement>> {
        let run = || -> rusqlite::Result<Vec<Statement>> {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map(params, statement_from_row)?;
            let result = rows.collect::<rusqlite::Result<Vec<_>>>();
            result
        };
        Ok(run().map_err(BrowseError::from)?)
    }

    fn query_edges(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Edge>> {
        let run = || -> rusqlite::Result<Vec<Edge>> {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map(params, |row| {
                Ok(Edge {
                    parent: row.get(0)?,
                    child: row.get(1)?,
                })
            })?;
            let result = rows.collect::<rusqlite::Result<Vec<_>>>();
            result
        };
        Ok(run().map_err(BrowseError::from)?)
    }

    /// Walks up from `term_id` along `predicate`, ignoring blank-node parents.
    fn ancestor_edges(&self, term_id: &str, predicate: &str) -> Result<Vec<Edge>> {
        let sql = "WITH RECURSIVE ancestors(parent, child) AS (
                VALUES (?1, NULL)
                UNION
                SELECT s.object, s.subject
                FROM statements s
                JOIN ancestors a ON s.stanza = a.parent AND s.subject = a.parent
                WHERE s.predicate = ?2
                  AND s.object IS NOT NULL
                  AND substr(s.object, 1, 2) != '_:'
            )
            SELECT parent, child FROM ancestors WHERE child IS NOT NULL";
        self.query_edges(sql, rusqlite::params![term_id, predicate])
    }

    fn child_edges(&self, term_id: &str, predicate: &str) -> Result<Vec<Edge>> {
        let sql = "SELECT DISTINCT object, subject
            FROM statements
            WHERE predicate = ?1
              AND object = ?2
              AND substr(subject, 1, 2) != '_:'";
        self.query_edges(sql, rusqlite::params![predicate, term_id])
    }
}

impl StatementStore for SqliteStore {
    fn prefixes(&self) -> Result<Vec<Prefix>> {
        let run = || -> rusqlite::Result<Vec<Prefix>> {
            let mut stmt = self
                .conn
                .prepare("SELECT prefix, base FROM prefix ORDER BY length(base) DESC")?;
            let rows = stmt.query_map([], |row| {
                Ok(Prefix {
                    prefix: row.get(0)?,
                    base: row.get(1)?,
                })
            })?;
            let result = rows.collect::<rusqlite::Result<Vec<_>>>();
            result
        };
        Ok(run().map_err(BrowseError::from)?)
    }

    fn find(&self, pattern: &StatementPattern) -> Result<Vec<Statement>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();
        let columns = [
            ("stanza", &pattern.stanza),
            ("subject", &pattern.subject),
            ("predicate", &pattern.predicate),
            ("object", &pattern.object),
            ("value", &pattern.value),
        ];
        for (column, value) in columns.iter() {
            if let Some(v) = value {
                clauses.push(format!("{} = ?", column));
                params.push(v);
            }
        }
        let mut sql = format!("SELECT {} FROM statements", STATEMENT_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        self.query_statements(&sql, &params)
    }

    fn literals_in_stanzas(
        &self,
        stanzas: &[String],
        predicate: &str,
        value: Option<&str>,
    ) -> Result<Vec<Statement>> {
        let mut rows = Vec::new();
        for chunk in stanzas.chunks(MAX_BOUND_PARAMS) {
            let mut params: Vec<&dyn ToSql> = Vec::new();
            params.push(&predicate);
            let mut sql = format!(
                "SELECT {} FROM statements WHERE predicate = ? AND value IS NOT NULL",
                STATEMENT_COLUMNS
            );
            if let Some(v) = value.as_ref() {
                sql.push_str(" AND value = ?");
                params.push(v);
            }
            sql.push_str(&format!(" AND stanza IN ({})", placeholders(chunk.len())));
            params.extend(chunk.iter().map(|s| s as &dyn ToSql));
            rows.extend(self.query_statements(&sql, &params)?);
        }
        Ok(rows)
    }

    fn literals_containing(&self, predicates: &[String], text: &str) -> Result<Vec<Statement>> {
        if predicates.is_empty() || text.is_empty() {
            return Ok(vec![]);
        }
        let escaped = text
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let needle = format!("%{}%", escaped);
        let sql = format!(
            "SELECT {} FROM statements
             WHERE predicate IN ({})
               AND value LIKE ? ESCAPE '\\'",
            STATEMENT_COLUMNS,
            placeholders(predicates.len())
        );
        let mut params: Vec<&dyn ToSql> = predicates.iter().map(|p| p as &dyn ToSql).collect();
        params.push(&needle);
        self.query_statements(&sql, &params)
    }

    fn hierarchy_edges(
        &self,
        term_id: &str,
        entity_type: &str,
        include_children: bool,
    ) -> Result<Vec<Edge>> {
        let vocab = &self.vocabulary;
        let mut edges = Vec::new();
        if entity_type == vocab.individual_root {
            // an individual hangs off its asserted classes, which then follow subClassOf upward
            let types = self.find(
                &StatementPattern::new()
                    .stanza(term_id)
                    .subject(term_id)
                    .predicate(vocab.type_predicate.as_str()),
            )?;
            for class in types.iter().filter_map(|row| row.object.as_deref()) {
                if is_blank(class) || vocab.is_individual_marker(class) {
                    continue;
                }
                edges.push(Edge {
                    parent: class.to_string(),
                    child: term_id.to_string(),
                });
                edges.extend(self.ancestor_edges(class, &vocab.subclass_predicate)?);
            }
        } else {
            let predicate = vocab.parent_predicate(entity_type);
            edges.extend(self.ancestor_edges(term_id, predicate)?);
            if include_children {
                edges.extend(self.child_edges(term_id, predicate)?);
            }
        }
        let mut seen = HashSet::new();
        edges.retain(|e| seen.insert(e.clone()));
        debug!(
            "Traversal for {} ({}) produced {} edges",
            term_id,
            entity_type,
            edges.len()
        );
        Ok(edges)
    }
}

fn source_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("source name pattern is valid")
    })
}

/// Checks that a source name is a bare file stem and cannot escape the database directory.
pub fn validate_source_name(source: &str) -> Result<()> {
    if source_name_pattern().is_match(source) && !source.contains("..") {
        Ok(())
    } else {
        Err(BrowseError::InvalidSourceName(source.to_string()).into())
    }
}

/// Sources stored as `<name>.<extension>` SQLite files inside one directory.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
    extension: String,
    vocabulary: Vocabulary,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>, vocabulary: Vocabulary) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            vocabulary,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.database_dir.clone(),
            config.database_extension.clone(),
            config.vocabulary.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, source: &str) -> PathBuf {
        self.root.join(format!("{}.{}", source, self.extension))
    }

    /// Names of every source database in the directory, sorted.
    pub fn list_sources(&self) -> Result<Vec<String>> {
        let mut sources = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_source_name(stem).is_ok() {
                    sources.push(stem.to_string());
                }
            }
        }
        sources.sort();
        info!("Found {} sources in {}", sources.len(), self.root.display());
        Ok(sources)
    }
}

impl SourceCatalog for DirectoryCatalog {
    type Store = SqliteStore;

    fn open(&self, source: &str) -> Result<SqliteStore> {
        validate_source_name(source)?;
        SqliteStore::open(&self.path_for(source), self.vocabulary.clone())
    }
}
