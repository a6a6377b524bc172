//! Defines the configuration structures for the browser.
//! `Config` describes where sources live and how pages are produced; `Vocabulary` is the
//! immutable schema description handed to the hierarchy builder and label resolver.

use crate::consts::*;
use anyhow::Result;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TopLevel {
    pub curie: String,
    pub label: String,
}

/// The predicate and type names a source is expected to use. Sources with divergent
/// schemas can be browsed with their own `Vocabulary`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Vocabulary {
    /// Root classifiers with their built-in display names
    pub top_levels: Vec<TopLevel>,
    pub type_predicate: String,
    pub label_predicate: String,
    pub deprecated_predicate: String,
    /// literal marking a term as deprecated
    pub deprecated_value: String,
    pub subclass_predicate: String,
    pub subproperty_predicate: String,
    /// universal top class; a parent equal to this does not count as a real parent
    pub top_class: String,
    pub class_root: String,
    pub object_property_root: String,
    pub individual_root: String,
    /// every type that only marks a subject as an individual
    pub individual_markers: Vec<String>,
    pub datatype_root: String,
    pub ontology_marker: String,
    /// pseudo-term selecting the ontology container
    pub ontology_root: String,
    /// namespace whose `title` gives the ontology title
    pub title_namespace: String,
    pub synonym_predicates: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary {
            top_levels: TOP_LEVELS
                .iter()
                .map(|(curie, label)| TopLevel {
                    curie: curie.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            type_predicate: RDF_TYPE.to_string(),
            label_predicate: RDFS_LABEL.to_string(),
            deprecated_predicate: OWL_DEPRECATED.to_string(),
            deprecated_value: "true".to_string(),
            subclass_predicate: RDFS_SUBCLASS_OF.to_string(),
            subproperty_predicate: RDFS_SUBPROPERTY_OF.to_string(),
            top_class: OWL_THING.to_string(),
            class_root: OWL_CLASS.to_string(),
            object_property_root: OWL_OBJECT_PROPERTY.to_string(),
            individual_root: OWL_INDIVIDUAL.to_string(),
            individual_markers: vec![OWL_INDIVIDUAL.to_string(), OWL_NAMED_INDIVIDUAL.to_string()],
            datatype_root: RDFS_DATATYPE.to_string(),
            ontology_marker: OWL_ONTOLOGY.to_string(),
            ontology_root: ONTOLOGY_ROOT.to_string(),
            title_namespace: DC_ELEMENTS_NAMESPACE.to_string(),
            synonym_predicates: vec![
                EXACT_SYNONYM.to_string(),
                BROAD_SYNONYM.to_string(),
                NARROW_SYNONYM.to_string(),
                RELATED_SYNONYM.to_string(),
            ],
        }
    }
}

impl Vocabulary {
    pub fn is_top_level(&self, curie: &str) -> bool {
        self.top_levels.iter().any(|t| t.curie == curie)
    }

    pub fn top_level_label(&self, curie: &str) -> Option<&str> {
        self.top_levels
            .iter()
            .find(|t| t.curie == curie)
            .map(|t| t.label.as_str())
    }

    pub fn is_individual_marker(&self, curie: &str) -> bool {
        self.individual_markers.iter().any(|m| m == curie)
    }

    /// The predicate linking a term to its parent for the given root type.
    pub fn parent_predicate(&self, entity_type: &str) -> &str {
        if entity_type == self.class_root {
            &self.subclass_predicate
        } else {
            &self.subproperty_predicate
        }
    }
}

#[derive(Builder, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Config {
    /// directory holding one `<source>.<database_extension>` file per source
    #[builder(default = "PathBuf::from(\"build\")")]
    pub database_dir: PathBuf,
    #[builder(default = "\"db\".to_string()")]
    #[serde(default = "default_extension")]
    pub database_extension: String,
    #[builder(default = "\"Ontology Browser\".to_string()")]
    #[serde(default = "default_title")]
    pub title: String,
    /// replaces the built-in page template
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[builder(default = "30")]
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// build each source's column on its own thread
    #[builder(default = "false")]
    #[serde(default)]
    pub parallel: bool,
    #[builder(default = "true")]
    #[serde(default = "default_include_children")]
    pub include_children: bool,
    #[builder(default)]
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

fn default_extension() -> String {
    "db".to_string()
}

fn default_title() -> String {
    "Ontology Browser".to_string()
}

fn default_search_limit() -> usize {
    30
}

fn default_include_children() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_dir: PathBuf::from("build"),
            database_extension: default_extension(),
            title: default_title(),
            template: None,
            search_limit: default_search_limit(),
            parallel: false,
            include_children: default_include_children(),
            vocabulary: Vocabulary::default(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the database file backing the named source.
    pub fn source_path(&self, source: &str) -> PathBuf {
        self.database_dir
            .join(format!("{}.{}", source, self.database_extension))
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn from_file(file: &Path) -> Result<Self> {
        let file = std::fs::File::open(file)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Prints out the current Config in a clear and readable way for command line output.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  Database directory: {}", self.database_dir.display());
        println!("  Database extension: {}", self.database_extension);
        println!("  Title: {}", self.title);
        if let Some(template) = &self.template {
            println!("  Template: {}", template.display());
        }
        println!("  Search limit: {}", self.search_limit);
        println!("  Parallel: {}", self.parallel);
        println!("  Include children: {}", self.include_children);
        println!("  Top levels:");
        for top in &self.vocabulary.top_levels {
            println!("    - {} ({})", top.curie, top.label);
        }
    }
}
