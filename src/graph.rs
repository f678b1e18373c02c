//! Product graph assembly.
//!
//! [`ProductGraph`] owns the triple set and the [`Vocabulary`] for a whole
//! run. It is created once by `main`, passed by `&mut` to the dispatcher for
//! each site, and serialized once at the end.
//!
//! Triples form a set kept in insertion order. There is no removal, and
//! asserting a triple twice is a no-op.

use crate::models::{ProductFields, Site};
use crate::utils::{sanitize_identifier, underscore_whitespace, upcase};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const EX: &str = "http://example.org/";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Reference to another resource.
    Iri(String),
    /// Plain text value.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

/// Terms of the product ontology, all under one namespace.
///
/// The fixed terms exist from construction. Properties for spec keys are
/// minted on first use and the same key always maps to the same IRI.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    namespace: String,
    minted: HashMap<String, String>,
}

impl Vocabulary {
    pub const FIXED_PROPERTIES: [&'static str; 5] =
        ["hasName", "hasPrice", "listedOn", "hasSourceURL", "hasImage"];

    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            minted: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// IRI of `local` under the namespace.
    pub fn term(&self, local: &str) -> String {
        format!("{}{}", self.namespace, local)
    }

    pub fn product(&self) -> String {
        self.term("Product")
    }

    /// IRI of the property for a spec key, minting it if needed.
    ///
    /// The flag is `true` when the property was minted by this call.
    pub fn spec_property(&mut self, key: &str) -> (String, bool) {
        let normalized = underscore_whitespace(key);
        if let Some(iri) = self.minted.get(&normalized) {
            return (iri.clone(), false);
        }
        let iri = self.term(&normalized);
        self.minted.insert(normalized, iri.clone());
        (iri, true)
    }

    pub fn minted_count(&self) -> usize {
        self.minted.len()
    }
}

/// The in-memory product graph for one run.
#[derive(Debug, Clone)]
pub struct ProductGraph {
    vocabulary: Vocabulary,
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
}

impl Default for ProductGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductGraph {
    /// Create a graph under the `ex:` namespace with its vocabulary declared.
    pub fn new() -> Self {
        Self::with_namespace(EX)
    }

    pub fn with_namespace(namespace: &str) -> Self {
        let mut graph = Self {
            vocabulary: Vocabulary::new(namespace),
            triples: Vec::new(),
            seen: HashSet::new(),
        };

        let class = graph.vocabulary.product();
        graph.insert(Triple::new(
            class,
            rdf_type(),
            Term::Iri(format!("{RDFS}Class")),
        ));
        for local in Vocabulary::FIXED_PROPERTIES {
            let property = graph.vocabulary.term(local);
            graph.declare_property(property);
        }
        graph
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Add a triple. Returns `false` when it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if !self.seen.insert(triple.clone()) {
            return false;
        }
        self.triples.push(triple);
        true
    }

    /// Fold one scraped product into the graph and return its subject IRI.
    ///
    /// The subject is derived from the name alone, so products whose names
    /// sanitize to the same identifier accumulate on one node.
    pub fn add_product(&mut self, fields: &ProductFields, site: Site, source_url: &str) -> String {
        let before = self.triples.len();
        let subject = self.subject_for(&fields.name);

        let literal = |s: &str| Term::Literal(s.to_string());
        let has_name = self.vocabulary.term("hasName");
        let has_price = self.vocabulary.term("hasPrice");
        let listed_on = self.vocabulary.term("listedOn");
        let has_source = self.vocabulary.term("hasSourceURL");

        self.insert(Triple::new(
            subject.clone(),
            rdf_type(),
            Term::Iri(self.vocabulary.product()),
        ));
        self.insert(Triple::new(subject.clone(), has_name, literal(&fields.name)));
        self.insert(Triple::new(subject.clone(), has_price, literal(&fields.price)));
        self.insert(Triple::new(
            subject.clone(),
            listed_on,
            literal(&upcase(site.tag())),
        ));
        self.insert(Triple::new(subject.clone(), has_source, literal(source_url)));

        if !fields.image_url.is_empty() {
            let has_image = self.vocabulary.term("hasImage");
            self.insert(Triple::new(
                subject.clone(),
                has_image,
                Term::Iri(fields.image_url.clone()),
            ));
        }

        for (key, value) in &fields.specs {
            let (property, minted) = self.vocabulary.spec_property(key);
            if minted {
                debug!(%key, %property, "Minted spec property");
                self.declare_property(property.clone());
            }
            self.insert(Triple::new(subject.clone(), property, literal(value)));
        }

        debug!(
            %subject,
            added = self.triples.len() - before,
            total = self.triples.len(),
            "Added product to graph"
        );
        subject
    }

    /// Subject IRI for a product name.
    pub fn subject_for(&self, name: &str) -> String {
        self.vocabulary.term(&sanitize_identifier(name))
    }

    fn declare_property(&mut self, property: String) {
        self.insert(Triple::new(
            property,
            rdf_type(),
            Term::Iri(format!("{RDF}Property")),
        ));
    }
}

pub fn rdf_type() -> String {
    format!("{RDF}type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn widget() -> ProductFields {
        ProductFields {
            name: "Widget A".to_string(),
            price: "Rp 10.000".to_string(),
            image_url: String::new(),
            specs: BTreeMap::from([("Color".to_string(), "Red".to_string())]),
        }
    }

    fn objects<'a>(graph: &'a ProductGraph, subject: &str, predicate: &str) -> Vec<&'a Term> {
        graph
            .triples()
            .iter()
            .filter(|t| t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
            .collect()
    }

    #[test]
    fn test_vocabulary_is_declared_up_front() {
        let graph = ProductGraph::new();
        assert_eq!(graph.len(), 1 + Vocabulary::FIXED_PROPERTIES.len());
        assert_eq!(
            objects(&graph, "http://example.org/Product", &rdf_type()),
            vec![&Term::Iri(format!("{RDFS}Class"))]
        );
        assert_eq!(
            objects(&graph, "http://example.org/hasImage", &rdf_type()),
            vec![&Term::Iri(format!("{RDF}Property"))]
        );
    }

    #[test]
    fn test_add_product_triples() {
        let mut graph = ProductGraph::new();
        let subject = graph.add_product(&widget(), Site::Bukalapak, "http://x/p1");

        assert_eq!(subject, "http://example.org/Widget_A");
        assert_eq!(
            objects(&graph, &subject, &rdf_type()),
            vec![&Term::Iri("http://example.org/Product".to_string())]
        );
        assert_eq!(
            objects(&graph, &subject, "http://example.org/hasName"),
            vec![&Term::Literal("Widget A".to_string())]
        );
        assert_eq!(
            objects(&graph, &subject, "http://example.org/hasPrice"),
            vec![&Term::Literal("Rp 10.000".to_string())]
        );
        assert_eq!(
            objects(&graph, &subject, "http://example.org/listedOn"),
            vec![&Term::Literal("Bukalapak".to_string())]
        );
        assert_eq!(
            objects(&graph, &subject, "http://example.org/hasSourceURL"),
            vec![&Term::Literal("http://x/p1".to_string())]
        );
        assert_eq!(
            objects(&graph, &subject, "http://example.org/Color"),
            vec![&Term::Literal("Red".to_string())]
        );
        assert!(objects(&graph, &subject, "http://example.org/hasImage").is_empty());
    }

    #[test]
    fn test_image_is_an_iri_reference() {
        let mut graph = ProductGraph::new();
        let fields = ProductFields {
            image_url: "https://images.tokopedia.net/kopi.jpg".to_string(),
            ..widget()
        };
        let subject = graph.add_product(&fields, Site::Tokopedia, "http://x/p2");
        assert_eq!(
            objects(&graph, &subject, "http://example.org/hasImage"),
            vec![&Term::Iri("https://images.tokopedia.net/kopi.jpg".to_string())]
        );
        assert_eq!(
            objects(&graph, &subject, "http://example.org/listedOn"),
            vec![&Term::Literal("Tokopedia".to_string())]
        );
    }

    #[test]
    fn test_spec_property_minted_once() {
        let mut vocab = Vocabulary::new(EX);
        let (first, minted_first) = vocab.spec_property("Berat Barang");
        let (second, minted_second) = vocab.spec_property("Berat  Barang");

        assert_eq!(first, "http://example.org/Berat_Barang");
        assert_eq!(first, second);
        assert!(minted_first);
        assert!(!minted_second);
        assert_eq!(vocab.minted_count(), 1);
    }

    #[test]
    fn test_minted_property_declared_once() {
        let mut graph = ProductGraph::new();
        graph.add_product(&widget(), Site::Bukalapak, "http://x/p1");
        let other = ProductFields {
            name: "Widget B".to_string(),
            ..widget()
        };
        graph.add_product(&other, Site::Bukalapak, "http://x/p2");

        let declarations = objects(&graph, "http://example.org/Color", &rdf_type());
        assert_eq!(declarations, vec![&Term::Iri(format!("{RDF}Property"))]);
    }

    #[test]
    fn test_colliding_names_share_a_subject() {
        let mut graph = ProductGraph::new();
        let first = graph.add_product(&widget(), Site::Bukalapak, "http://x/p1");
        let twin = ProductFields {
            name: "Widget  A".to_string(),
            price: "Rp 12.000".to_string(),
            ..widget()
        };
        let second = graph.add_product(&twin, Site::Tokopedia, "http://y/p9");

        assert_eq!(first, second);
        // Both listings' values pile up on the one node.
        assert_eq!(objects(&graph, &first, "http://example.org/hasPrice").len(), 2);
        assert_eq!(objects(&graph, &first, "http://example.org/listedOn").len(), 2);
    }

    #[test]
    fn test_reasserting_a_product_is_idempotent() {
        let mut graph = ProductGraph::new();
        graph.add_product(&widget(), Site::Bukalapak, "http://x/p1");
        let len = graph.len();
        graph.add_product(&widget(), Site::Bukalapak, "http://x/p1");
        assert_eq!(graph.len(), len);
    }
}
