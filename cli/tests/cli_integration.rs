use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn ontotree_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ontotree"))
}

fn write_source(dir: &Path, name: &str) {
    let conn = Connection::open(dir.join(format!("{}.db", name))).expect("open db");
    conn.execute_batch(
        "CREATE TABLE prefix (prefix TEXT PRIMARY KEY, base TEXT NOT NULL);
         CREATE TABLE statements (stanza TEXT, subject TEXT, predicate TEXT, object TEXT,
                                  value TEXT, datatype TEXT, language TEXT);
         INSERT INTO prefix VALUES
            ('rdf', 'http://www.w3.org/1999/02/22-rdf-syntax-ns#'),
            ('rdfs', 'http://www.w3.org/2000/01/rdf-schema#'),
            ('owl', 'http://www.w3.org/2002/07/owl#'),
            ('ex', 'http://example.com/');",
    )
    .expect("schema");
    let rows: [(&str, &str, Option<&str>, Option<&str>); 4] = [
        ("ex:Animal", "rdf:type", Some("owl:Class"), None),
        ("ex:Dog", "rdf:type", Some("owl:Class"), None),
        ("ex:Dog", "rdfs:subClassOf", Some("ex:Animal"), None),
        ("ex:Dog", "rdfs:label", None, Some("Dog")),
    ];
    for (subject, predicate, object, value) in rows {
        conn.execute(
            "INSERT INTO statements (stanza, subject, predicate, object, value)
             VALUES (?1, ?1, ?2, ?3, ?4)",
            params![subject, predicate, object, value],
        )
        .expect("insert");
    }
}

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_source(dir.path(), "A");
    write_source(dir.path(), "B");
    dir
}

fn run(dir: &Path, args: &[&str], query: Option<&str>) -> Output {
    let mut cmd = Command::new(ontotree_bin());
    cmd.arg("--db-dir").arg(dir).args(args);
    match query {
        Some(q) => cmd.env("QUERY_STRING", q),
        None => cmd.env_remove("QUERY_STRING"),
    };
    cmd.output().expect("run ontotree")
}

#[test]
fn sources_lists_databases() {
    let dir = fixture();
    let out = run(dir.path(), &["sources"], None);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["A", "B"]);

    let out = run(dir.path(), &["sources", "--json"], None);
    let listed: Vec<String> = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(listed, vec!["A", "B"]);
}

#[test]
fn cgi_page_has_content_type_header() {
    let dir = fixture();
    let out = run(dir.path(), &["cgi"], Some("sources=A,B&id=ex%3ADog"));
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Content-Type: text/html; charset=utf-8\r\n\r\n"));
    assert!(stdout.contains("data-source=\"A\""));
    assert!(stdout.contains("data-source=\"B\""));
}

#[test]
fn cgi_search_returns_json() {
    let dir = fixture();
    let out = run(dir.path(), &["cgi"], Some("sources=A,Nope&format=json&text=dog"));
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let (header, body) = stdout.split_once("\r\n\r\n").expect("header");
    assert_eq!(header, "Content-Type: application/json");
    let value: serde_json::Value = serde_json::from_str(body).expect("json body");
    assert_eq!(value[0]["id"], "ex:Dog");
}

#[test]
fn cgi_without_sources_fails() {
    let dir = fixture();
    let out = run(dir.path(), &["cgi"], Some("id=ex%3ADog"));
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("sources"));
    assert!(out.stdout.is_empty());

    let out = run(dir.path(), &["cgi"], Some("sources=&id=ex%3ADog"));
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());

    let out = run(dir.path(), &["page", "--sources", " , "], None);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn missing_stanza_source_is_a_runtime_failure() {
    let dir = fixture();
    let out = run(dir.path(), &["stanza", "--source", "Missing", "--id", "ex:Dog"], None);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Source database not found"));
    assert!(out.stdout.is_empty());
}

#[test]
fn page_writes_output_file() {
    let dir = fixture();
    let target = dir.path().join("page.html");
    let out = run(
        dir.path(),
        &["page", "--sources", "A", "--id", "ex:Dog", "--output", target.to_str().unwrap()],
        None,
    );
    assert!(out.status.success());
    let html = std::fs::read_to_string(&target).expect("page written");
    assert!(html.contains("<span class=\"active\" about=\"ex:Dog\">Dog</span>"));
}

#[test]
fn stanza_prints_ntriples() {
    let dir = fixture();
    let out = run(
        dir.path(),
        &["stanza", "--source", "A", "--id", "ex:Dog", "--format", "ntriples"],
        None,
    );
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains(
        "<http://example.com/Dog> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://example.com/Animal> ."
    ));
    assert_eq!(stdout.lines().count(), 3);
}

#[test]
fn invalid_source_name_is_rejected() {
    let dir = fixture();
    let out = run(dir.path(), &["search", "--sources", "../A", "--text", "dog"], None);
    // search failures are reported in the JSON body
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Invalid source name"));
}
