//! Compact identifiers for the vocabulary terms the browser special-cases, plus the
//! namespaces backing them. These seed the default `Vocabulary`; stores with a
//! different schema override them through configuration.

use oxigraph::model::vocab::{rdf, rdfs, xsd};
use oxigraph::model::NamedNodeRef;

pub const ONTOLOGY_ROOT: &str = "ontology";
pub const OWL_CLASS: &str = "owl:Class";
pub const OWL_THING: &str = "owl:Thing";
pub const OWL_ONTOLOGY: &str = "owl:Ontology";
pub const OWL_INDIVIDUAL: &str = "owl:Individual";
pub const OWL_NAMED_INDIVIDUAL: &str = "owl:NamedIndividual";
pub const OWL_OBJECT_PROPERTY: &str = "owl:ObjectProperty";
pub const OWL_DATATYPE_PROPERTY: &str = "owl:DatatypeProperty";
pub const OWL_ANNOTATION_PROPERTY: &str = "owl:AnnotationProperty";
pub const OWL_DEPRECATED: &str = "owl:deprecated";
pub const RDFS_DATATYPE: &str = "rdfs:Datatype";
pub const RDF_TYPE: &str = "rdf:type";
pub const RDFS_LABEL: &str = "rdfs:label";
pub const RDFS_SUBCLASS_OF: &str = "rdfs:subClassOf";
pub const RDFS_SUBPROPERTY_OF: &str = "rdfs:subPropertyOf";

// oboInOwl synonyms, matched by search
pub const EXACT_SYNONYM: &str = "oboInOwl:hasExactSynonym";
pub const BROAD_SYNONYM: &str = "oboInOwl:hasBroadSynonym";
pub const NARROW_SYNONYM: &str = "oboInOwl:hasNarrowSynonym";
pub const RELATED_SYNONYM: &str = "oboInOwl:hasRelatedSynonym";

pub const OWL_NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
pub const DC_ELEMENTS_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

/// Root types and their built-in display names, in the order they are listed in the browser
pub const TOP_LEVELS: [(&str, &str); 7] = [
    (ONTOLOGY_ROOT, "Ontology"),
    (OWL_CLASS, "Class"),
    (OWL_ANNOTATION_PROPERTY, "Annotation Property"),
    (OWL_DATATYPE_PROPERTY, "Data Property"),
    (OWL_OBJECT_PROPERTY, "Object Property"),
    (OWL_INDIVIDUAL, "Individual"),
    (RDFS_DATATYPE, "Datatype"),
];

fn ns(term: NamedNodeRef<'static>, local: &str) -> &'static str {
    let iri = term.as_str();
    &iri[..iri.len() - local.len()]
}

/// Prefixes every source is assumed to understand even when its prefix table omits them.
pub fn builtin_namespaces() -> [(&'static str, &'static str); 4] {
    [
        ("rdf", ns(rdf::TYPE, "type")),
        ("rdfs", ns(rdfs::LABEL, "label")),
        ("xsd", ns(xsd::STRING, "string")),
        ("owl", OWL_NAMESPACE),
    ]
}
