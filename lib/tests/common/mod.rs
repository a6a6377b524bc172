#![allow(dead_code)]

use ontotree::api::Browser;
use ontotree::config::Config;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE prefix (prefix TEXT PRIMARY KEY, base TEXT NOT NULL);
    CREATE TABLE statements (
        stanza TEXT, subject TEXT, predicate TEXT, object TEXT,
        value TEXT, datatype TEXT, language TEXT
    );
";

const PREFIXES: [(&str, &str); 7] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("oboInOwl", "http://www.geneontology.org/formats/oboInOwl#"),
    ("ex", "http://example.com/"),
];

/// A directory of source databases that disappears with the test.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, source: &str) -> PathBuf {
        self.dir.path().join(format!("{}.db", source))
    }

    /// Creates an empty source with the standard prefix table.
    pub fn source(&self, name: &str) -> SourceBuilder {
        let conn = Connection::open(self.path(name)).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        for (prefix, base) in PREFIXES {
            conn.execute("INSERT INTO prefix VALUES (?1, ?2)", params![prefix, base])
                .unwrap();
        }
        SourceBuilder { conn }
    }

    pub fn config(&self) -> Config {
        Config::builder()
            .database_dir(self.dir.path())
            .title("Animals compared")
            .build()
            .unwrap()
    }

    pub fn browser(&self) -> Browser {
        Browser::new(self.config()).unwrap()
    }
}

pub struct SourceBuilder {
    conn: Connection,
}

impl SourceBuilder {
    /// A resource-valued statement in the subject's own stanza.
    pub fn link(self, subject: &str, predicate: &str, object: &str) -> Self {
        self.conn
            .execute(
                "INSERT INTO statements (stanza, subject, predicate, object) VALUES (?1, ?1, ?2, ?3)",
                params![subject, predicate, object],
            )
            .unwrap();
        self
    }

    pub fn literal(self, subject: &str, predicate: &str, value: &str) -> Self {
        self.conn
            .execute(
                "INSERT INTO statements (stanza, subject, predicate, value) VALUES (?1, ?1, ?2, ?3)",
                params![subject, predicate, value],
            )
            .unwrap();
        self
    }

    pub fn class(self, curie: &str, label: &str) -> Self {
        self.link(curie, "rdf:type", "owl:Class")
            .literal(curie, "rdfs:label", label)
    }
}

/// Source `A`: a small animal ontology exercising every root type.
pub fn animals(fixture: &Fixture, name: &str) {
    fixture
        .source(name)
        .link("ex:animals", "rdf:type", "owl:Ontology")
        .literal("ex:animals", "dc:title", "Animal Ontology")
        .class("ex:Animal", "Animal")
        .class("ex:Mammal", "Mammal")
        .link("ex:Mammal", "rdfs:subClassOf", "ex:Animal")
        .link("ex:Dog", "rdf:type", "owl:Class")
        .literal("ex:Dog", "rdfs:label", "Canis")
        .literal("ex:Dog", "rdfs:label", "Dog")
        .literal("ex:Dog", "oboInOwl:hasExactSynonym", "hound")
        .link("ex:Dog", "rdfs:subClassOf", "ex:Mammal")
        .link("ex:Dog", "rdfs:subClassOf", "_:restriction1")
        .class("ex:Puppy", "Puppy")
        .link("ex:Puppy", "rdfs:subClassOf", "ex:Dog")
        .class("ex:Cat", "Cat")
        .link("ex:Cat", "rdfs:subClassOf", "ex:Mammal")
        .literal("ex:Cat", "owl:deprecated", "true")
        .class("ex:Thingy", "Thingy")
        .link("ex:Thingy", "rdfs:subClassOf", "owl:Thing")
        .link("ex:hasOwner", "rdf:type", "owl:ObjectProperty")
        .literal("ex:hasOwner", "rdfs:label", "has owner")
        .link("ex:hasPet", "rdf:type", "owl:ObjectProperty")
        .link("ex:hasPet", "rdfs:subPropertyOf", "ex:hasOwner")
        .link("ex:fido", "rdf:type", "owl:NamedIndividual")
        .literal("ex:fido", "rdfs:label", "Fido")
        .link("ex:rex", "rdf:type", "owl:NamedIndividual")
        .link("ex:rex", "rdf:type", "ex:Dog")
        .literal("ex:rex", "rdfs:label", "Rex")
        .link("ex:Weight", "rdf:type", "rdfs:Datatype");
}

/// Source `B`: plants only, so `ex:Dog` is unknown there.
pub fn plants(fixture: &Fixture, name: &str) {
    fixture
        .source(name)
        .class("ex:Plant", "Plant")
        .class("ex:Tree", "Tree")
        .link("ex:Tree", "rdfs:subClassOf", "ex:Plant");
}
