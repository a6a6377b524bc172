mod common;

use anyhow::Result;
use common::{animals, plants, Fixture};
use ontotree::api::{Browser, HTML_CONTENT_TYPE, JSON_CONTENT_TYPE};
use ontotree::errors::BrowseError;
use ontotree::request::Request;

fn sources(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn missing_term_degrades_only_its_column() -> Result<()> {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    plants(&fixture, "B");
    let browser = fixture.browser();

    let page = browser.compose(&sources(&["A", "B"]), "ex:Dog")?;
    assert!(page.first.contains("data-source=\"A\""));
    assert!(page.first.contains("class=\"active\""));
    assert!(!page.first.contains("class=\"failure\""));
    assert_eq!(page.rest.len(), 1);
    assert!(page.rest[0].contains("class=\"failure\""));
    assert!(page.rest[0].contains("data-source=\"B\""));
    assert!(page.rest[0].contains("Unknown entity type"));
    Ok(())
}

#[test]
fn missing_database_degrades_its_column() -> Result<()> {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    let browser = fixture.browser();

    let page = browser.compose(&sources(&["Missing", "A"]), "ex:Dog")?;
    assert!(page.first.contains("class=\"failure\""));
    assert!(page.first.contains("Source database not found"));
    assert!(page.rest[0].contains("data-source=\"A\""));
    Ok(())
}

#[test]
fn links_carry_the_whole_source_list() -> Result<()> {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    animals(&fixture, "C");
    plants(&fixture, "B");
    let browser = fixture.browser();

    let page = browser.compose(&sources(&["C", "A", "B"]), "ex:Dog")?;
    for fragment in std::iter::once(&page.first).chain(&page.rest[..1]) {
        assert!(fragment.contains("href=\"?sources=C,A,B&amp;id=ex%3AMammal\""));
    }
    // the fragments keep request order
    assert!(page.first.contains("data-source=\"C\""));
    assert!(page.rest[0].contains("data-source=\"A\""));
    assert!(page.rest[1].contains("data-source=\"B\""));
    Ok(())
}

#[test]
fn parallel_composition_matches_sequential() -> Result<()> {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    plants(&fixture, "B");
    animals(&fixture, "C");
    let sequential = fixture.browser();
    let mut config = fixture.config();
    config.parallel = true;
    let parallel = Browser::new(config)?;

    let names = sources(&["A", "B", "C", "Missing"]);
    for term in ["ex:Dog", "owl:Class", "ontology"] {
        assert_eq!(
            sequential.compose(&names, term)?,
            parallel.compose(&names, term)?
        );
    }
    Ok(())
}

#[test]
fn empty_source_list_is_rejected() {
    let fixture = Fixture::new();
    let browser = fixture.browser();
    let err = browser.compose(&[], "ex:Dog").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BrowseError>(),
        Some(BrowseError::EmptySourceList)
    ));
}

#[test]
fn full_page_shows_every_column() -> Result<()> {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    plants(&fixture, "B");
    let browser = fixture.browser();

    let html = browser.page(&sources(&["A", "B"]), "owl:Class")?;
    assert!(html.contains("<title>Animals compared</title>"));
    assert!(html.contains("data-source=\"A\""));
    assert!(html.contains("data-source=\"B\""));
    assert!(html.contains(">Animal</a>"));
    assert!(html.contains(">Plant</a>"));
    Ok(())
}

#[test]
fn requests_select_page_or_search() -> Result<()> {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    let browser = fixture.browser();
    let vocab = &browser.config().vocabulary;

    let response = browser.handle(&Request::from_query("sources=A&id=ex%3ADog", vocab)?)?;
    assert_eq!(response.content_type, HTML_CONTENT_TYPE);
    assert!(response.body.contains("<!DOCTYPE html>"));

    let response = browser.handle(&Request::from_query("sources=A&format=json&text=dog", vocab)?)?;
    assert_eq!(response.content_type, JSON_CONTENT_TYPE);
    let value: serde_json::Value = serde_json::from_str(&response.body)?;
    assert_eq!(value[0]["id"], "ex:Dog");
    Ok(())
}

#[test]
fn source_names_cannot_rewrite_link_parameters() -> Result<()> {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    let browser = fixture.browser();

    let page = browser.compose(&sources(&["A", "B&id=evil"]), "ex:Dog")?;
    assert!(page
        .first
        .contains("href=\"?sources=A,B%26id%3Devil&amp;id=ex%3AMammal\""));
    assert!(page.rest[0].contains("class=\"failure\""));
    assert!(page.rest[0].contains("Invalid source name"));

    // following the link asks for the same sources and the linked term
    let vocab = &browser.config().vocabulary;
    let request = Request::from_query("?sources=A,B%26id%3Devil&id=ex%3AMammal", vocab)?;
    assert_eq!(request.sources, sources(&["A", "B&id=evil"]));
    assert_eq!(request.id, "ex:Mammal");
    Ok(())
}

#[test]
fn term_in_subclass_cycle_is_shown() -> Result<()> {
    let fixture = Fixture::new();
    fixture
        .source("A")
        .class("ex:A", "Alpha")
        .class("ex:B", "Beta")
        .link("ex:A", "rdfs:subClassOf", "ex:B")
        .link("ex:B", "rdfs:subClassOf", "ex:A");
    let browser = fixture.browser();

    let page = browser.compose(&sources(&["A"]), "ex:A")?;
    assert!(!page.first.contains("class=\"failure\""));
    assert!(page
        .first
        .contains("<span class=\"active\" about=\"ex:A\">Alpha</span>"));
    assert!(page.first.contains(">Beta</a>"));
    Ok(())
}

#[test]
fn configured_template_replaces_the_built_in_page() -> Result<()> {
    let fixture = Fixture::new();
    animals(&fixture, "A");
    plants(&fixture, "B");
    let template = fixture.dir.path().join("custom.html.tera");
    std::fs::write(
        &template,
        "<main>{{ title }}|{{ first | safe }}{% for tree in trees %}<hr>{{ tree | safe }}{% endfor %}</main>",
    )?;
    let mut config = fixture.config();
    config.template = Some(template);
    let browser = Browser::new(config)?;

    let html = browser.page(&sources(&["A", "B"]), "owl:Class")?;
    assert!(html.starts_with("<main>Animals compared|<div"));
    assert!(html.ends_with("</main>"));
    assert!(html.contains("<hr><div"));
    assert!(html.contains("data-source=\"B\""));
    assert!(!html.contains("<!DOCTYPE html>"));
    Ok(())
}

#[test]
fn missing_template_file_is_an_error() {
    let fixture = Fixture::new();
    let mut config = fixture.config();
    config.template = Some(fixture.dir.path().join("absent.tera"));
    assert!(Browser::new(config).is_err());
}
