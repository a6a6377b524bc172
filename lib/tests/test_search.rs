mod common;

use anyhow::Result;
use common::{animals, Fixture};
use ontotree::search::{dispatch_search, SearchCapability};
use serde_json::{json, Value};
use std::sync::Mutex;

#[derive(Default)]
struct Recording {
    calls: Mutex<Vec<String>>,
}

impl SearchCapability for Recording {
    fn search(&self, source: &str, text: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(source.to_string());
        Ok(json!({ "source": source, "text": text }))
    }
}

#[test]
fn only_first_source_is_searched() -> Result<()> {
    let recording = Recording::default();
    let sources = vec!["A".to_string(), "B".to_string()];
    let value = dispatch_search(&recording, &sources, "dog")?;
    assert_eq!(value, json!({ "source": "A", "text": "dog" }));
    assert_eq!(*recording.calls.lock().unwrap(), vec!["A"]);
    Ok(())
}

#[test]
fn second_source_need_not_exist() {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    let browser = fixture.browser();

    let value = browser.search_json(&["A".to_string(), "B".to_string()], "dog");
    let hits = value.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], "ex:Dog");
    assert_eq!(hits[0]["label"], "Dog");
    assert_eq!(hits[0]["short_label"], "Dog");
    assert_eq!(hits[0]["order"], 1);
    assert!(!fixture.path("B").exists());
}

#[test]
fn hits_are_ranked_by_match_quality() -> Result<()> {
    let fixture = Fixture::new();
    fixture
        .source("A")
        .class("ex:Bulldog", "bulldog")
        .class("ex:HotDog", "hot dog")
        .class("ex:DogBreed", "Dog breed")
        .class("ex:Dog", "dog");
    let browser = fixture.browser();

    let ids: Vec<String> = browser
        .search("A", "Dog")?
        .into_iter()
        .map(|hit| hit.id)
        .collect();
    assert_eq!(ids, vec!["ex:Dog", "ex:DogBreed", "ex:HotDog", "ex:Bulldog"]);
    Ok(())
}

#[test]
fn synonym_hits_report_the_label_and_synonym() -> Result<()> {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    let browser = fixture.browser();

    let hits = browser.search("A", "hound")?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "ex:Dog");
    assert_eq!(hits[0].label, "Dog");
    assert_eq!(hits[0].synonym.as_deref(), Some("hound"));
    assert_eq!(hits[0].property, "oboInOwl:hasExactSynonym");
    Ok(())
}

#[test]
fn wildcards_in_text_are_literal() -> Result<()> {
    let fixture = Fixture::new();
    fixture
        .source("A")
        .class("ex:Pct", "100% pure")
        .class("ex:Other", "100 pure");
    let browser = fixture.browser();

    let hits = browser.search("A", "0%")?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "ex:Pct");
    assert!(browser.search("A", "   ")?.is_empty());
    Ok(())
}

#[test]
fn search_failure_becomes_error_document() {
    let fixture = Fixture::new();
    let browser = fixture.browser();

    let value = browser.search_json(&["Nowhere".to_string()], "dog");
    let error = value["error"].as_str().unwrap();
    assert!(error.contains("Source database not found"));
}
