//! RDF/XML serialization of the product graph.
//!
//! Subjects are written as `rdf:Description` elements in the order they
//! first appear in the graph. Literal objects become element text and IRI
//! objects become `rdf:resource` attributes.
//!
//! Predicates must be written as XML qualified names, so each predicate IRI
//! is split into a namespace and a local name. Well-known namespaces get
//! the `rdf`, `rdfs` and `ex` prefixes; anything else is bound to `ns1`,
//! `ns2`, ... on the root element. A predicate whose IRI does not end in a
//! valid XML name (for instance a spec key like `Berat (gram)`) cannot be
//! written in RDF/XML; those triples are logged and left out.

use crate::error::WriteError;
use crate::graph::{ProductGraph, RDF, RDFS, Term};
use itertools::Itertools;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

pub const BASE_NAME: &str = "output";
pub const EXTENSION: &str = "xml";

/// Prefix bindings for the root element, in declaration order.
struct Prefixes {
    bindings: Vec<(String, String)>,
    generated: usize,
}

impl Prefixes {
    fn new(namespace: &str) -> Self {
        Self {
            bindings: vec![
                ("rdf".to_string(), RDF.to_string()),
                ("rdfs".to_string(), RDFS.to_string()),
                ("ex".to_string(), namespace.to_string()),
            ],
            generated: 0,
        }
    }

    fn prefix_for(&mut self, namespace: &str) -> String {
        if let Some((prefix, _)) = self.bindings.iter().find(|(_, ns)| ns == namespace) {
            return prefix.clone();
        }
        self.generated += 1;
        let prefix = format!("ns{}", self.generated);
        self.bindings.push((prefix.clone(), namespace.to_string()));
        prefix
    }
}

/// Serialize the whole graph to an RDF/XML document.
pub fn serialize(graph: &ProductGraph) -> Result<String, WriteError> {
    let triples = graph.triples();

    let mut prefixes = Prefixes::new(graph.vocabulary().namespace());
    let mut qnames: HashMap<&str, String> = HashMap::new();
    for predicate in triples.iter().map(|t| t.predicate.as_str()).unique() {
        match split_iri(predicate) {
            Some((namespace, local)) => {
                let prefix = prefixes.prefix_for(namespace);
                qnames.insert(predicate, format!("{prefix}:{local}"));
            }
            None => warn!(%predicate, "Predicate has no XML local name; its triples are not written"),
        }
    }

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;

    let mut root = BytesStart::new("rdf:RDF");
    for (prefix, namespace) in &prefixes.bindings {
        root.push_attribute((format!("xmlns:{prefix}").as_str(), namespace.as_str()));
    }
    writer.write_event(Event::Start(root)).map_err(xml_error)?;

    let by_subject = triples.iter().into_group_map_by(|t| t.subject.as_str());
    for subject in triples.iter().map(|t| t.subject.as_str()).unique() {
        let mut description = BytesStart::new("rdf:Description");
        description.push_attribute(("rdf:about", subject));
        writer
            .write_event(Event::Start(description))
            .map_err(xml_error)?;

        for triple in by_subject.get(subject).into_iter().flatten() {
            let Some(qname) = qnames.get(triple.predicate.as_str()) else {
                continue;
            };
            match &triple.object {
                Term::Iri(iri) => {
                    let mut element = BytesStart::new(qname.as_str());
                    element.push_attribute(("rdf:resource", iri.as_str()));
                    writer.write_event(Event::Empty(element)).map_err(xml_error)?;
                }
                Term::Literal(text) if text.is_empty() => {
                    writer
                        .write_event(Event::Empty(BytesStart::new(qname.as_str())))
                        .map_err(xml_error)?;
                }
                Term::Literal(text) => {
                    writer
                        .write_event(Event::Start(BytesStart::new(qname.as_str())))
                        .map_err(xml_error)?;
                    writer
                        .write_event(Event::Text(BytesText::new(text)))
                        .map_err(xml_error)?;
                    writer
                        .write_event(Event::End(BytesEnd::new(qname.as_str())))
                        .map_err(xml_error)?;
                }
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new("rdf:Description")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("rdf:RDF")))
        .map_err(xml_error)?;

    let mut xml = String::from_utf8(writer.into_inner()).map_err(xml_error)?;
    xml.push('\n');
    Ok(xml)
}

/// File name for the `n`th run: `output.xml`, then `output_2.xml`, ...
pub fn candidate_name(n: usize) -> String {
    if n <= 1 {
        format!("{BASE_NAME}.{EXTENSION}")
    } else {
        format!("{BASE_NAME}_{n}.{EXTENSION}")
    }
}

/// Serialize `graph` and save it under the first free candidate name in
/// `output_dir`.
///
/// Files are opened with create-new semantics, so an existing output is
/// never overwritten. Returns the path actually written.
#[instrument(level = "info", skip(graph), fields(triples = graph.len()))]
pub async fn write_graph(graph: &ProductGraph, output_dir: &Path) -> Result<PathBuf, WriteError> {
    let xml = serialize(graph)?;
    tokio::fs::create_dir_all(output_dir).await?;

    let mut n = 1;
    loop {
        let path = output_dir.join(candidate_name(n));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => {
                write_or_remove(file, &path, xml.as_bytes()).await?;
                info!(path = %path.display(), bytes = xml.len(), "RDF data saved");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Output file exists; trying next name");
                n += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Write `bytes` to the freshly created `path`. On failure the partial file
/// is removed so no truncated output is left behind.
async fn write_or_remove<W: AsyncWrite + Unpin>(
    mut out: W,
    path: &Path,
    bytes: &[u8],
) -> std::io::Result<()> {
    let written = async {
        out.write_all(bytes).await?;
        out.flush().await
    }
    .await;
    if let Err(e) = written {
        drop(out);
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %remove_err, "Could not remove partial output file");
        }
        return Err(e);
    }
    Ok(())
}

/// Split an IRI into namespace and the longest trailing XML name.
fn split_iri(iri: &str) -> Option<(&str, &str)> {
    let mut start = iri.len();
    for (idx, ch) in iri.char_indices().rev() {
        if !is_name_char(ch) {
            break;
        }
        start = idx;
    }
    let offset = iri[start..].find(is_name_start)?;
    let split = start + offset;
    Some((&iri[..split], &iri[split..]))
}

fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

fn xml_error(e: impl std::fmt::Display) -> WriteError {
    WriteError::Xml(e.to_string())
}
