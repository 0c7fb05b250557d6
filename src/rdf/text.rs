// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Text extraction helpers.
//!
//! Small accessors over a parsed document tree. Tree access and identifier
//! shape are kept apart: [`first_element`] and [`element_text`] only walk the
//! tree, while [`trailing_segment`] only knows how a resource URI is shaped.
//! Absence is never an error here. A missing element yields an empty string,
//! and a missing node or attribute yields no identifier.

use crate::rdf::{RdfError, RecordId, Result, RDF_NS};

use roxmltree::{Document, Node, ParsingOptions};

/// Name of the `rdf:about` attribute.
pub const ABOUT: (&str, &str) = (RDF_NS, "about");

/// Name of the `rdf:resource` attribute.
pub const RESOURCE: (&str, &str) = (RDF_NS, "resource");

/// Element name to look up under a node.
///
/// Without a namespace the name matches by local name in any namespace. DMCC
/// exports bind their vocabularies to generated prefixes like `_3` and `_4`,
/// so the local name is the only stable part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementName<'a> {
    namespace: Option<&'a str>,
    local: &'a str,
}

impl<'a> ElementName<'a> {
    /// Match element by local name in any namespace.
    pub const fn local(local: &'a str) -> Self {
        Self {
            namespace: None,
            local,
        }
    }

    /// Match element by namespace URI and local name.
    pub const fn qualified(namespace: &'a str, local: &'a str) -> Self {
        Self {
            namespace: Some(namespace),
            local,
        }
    }

    /// Check if element node carries this name.
    pub fn matches(&self, node: &Node<'_, '_>) -> bool {
        if !node.is_element() {
            return false;
        }

        let tag = node.tag_name();
        tag.name() == self.local
            && match self.namespace {
                Some(namespace) => tag.namespace() == Some(namespace),
                None => true,
            }
    }
}

/// Parse well-formed markup into a document tree.
///
/// DTDs are allowed, since some exports carry an internal subset for
/// entities.
///
/// # Errors
///
/// - Return [`RdfError::DocumentUnreadable`] if markup is not well-formed.
pub fn parse_document<'input>(
    text: &'input str,
    origin: impl Into<String>,
) -> Result<Document<'input>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };

    Document::parse_with_options(text, options).map_err(|source| RdfError::DocumentUnreadable {
        source,
        origin: origin.into(),
    })
}

/// Iterate every `rdf:Description` record in document order.
pub fn descriptions<'a, 'input>(
    document: &'a Document<'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    let name = ElementName::qualified(RDF_NS, "Description");
    document
        .descendants()
        .filter(move |node| name.matches(node))
}

/// Find first element under node that matches target name.
///
/// The node itself is never considered.
pub fn first_element<'a, 'input>(
    node: Node<'a, 'input>,
    name: ElementName<'_>,
) -> Option<Node<'a, 'input>> {
    node.descendants().skip(1).find(|child| name.matches(child))
}

/// Find every element under node that matches target name.
pub fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: ElementName<'a>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants().skip(1).filter(move |child| name.matches(child))
}

/// Get text of first element under node that matches target name.
///
/// Surrounding whitespace is trimmed. Returns an empty string if no such
/// element exists, or the element holds no text.
pub fn element_text(node: Node<'_, '_>, name: ElementName<'_>) -> String {
    first_element(node, name)
        .map(|element| {
            element
                .descendants()
                .filter(|child| child.is_text())
                .filter_map(|child| child.text())
                .collect::<String>()
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

/// Get substring following last `/` of URI.
///
/// Returns the whole input if it has no `/` at all.
pub fn trailing_segment(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(index) => &uri[index + 1..],
        None => uri,
    }
}

/// Get record identifier from URI-shaped attribute of node.
///
/// Returns [`None`] if the node is absent, or the node lacks the attribute.
pub fn resource_id(node: Option<Node<'_, '_>>, attribute: (&str, &str)) -> Option<RecordId> {
    node.and_then(|node| node.attribute(attribute))
        .map(RecordId::from_uri)
}
