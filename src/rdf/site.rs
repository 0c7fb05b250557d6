// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Site and collaborative group records.
//!
//! Sites and collaborative groups never own person data. They refer to people
//! by identifier, and those identifiers are resolved against a
//! [`PersonCatalog`] parsed from a different document. The resulting records
//! borrow from that catalog, so it must outlive them.
//!
//! # Unresolved References
//!
//! A staff, member, or principal investigator reference that names nobody in
//! the person catalog is kept in place as [`Reference::Unresolved`]. It is
//! neither dropped nor treated as a parse failure. Callers decide what an
//! unresolved reference means for them.

use crate::rdf::{
    text::{
        descriptions, element_text, elements, first_element, parse_document, resource_id,
        ElementName, ABOUT, RESOURCE,
    },
    Catalog, Person, PersonCatalog, RdfError, Record, RecordId, Result,
};

use roxmltree::Node;
use std::{fs, path::Path};
use tracing::{debug, instrument, warn};

const ABBREV_NAME: ElementName<'static> = ElementName::local("abbrevName");
const TITLE: ElementName<'static> = ElementName::local("title");
const STAFF: ElementName<'static> = ElementName::local("staff");
const MEMBER: ElementName<'static> = ElementName::local("member");
const PI: ElementName<'static> = ElementName::local("pi");
const PROGRAM: ElementName<'static> = ElementName::local("program");
const MEMBER_TYPE: ElementName<'static> = ElementName::local("memberType");
const COMMITTEE_TYPE: ElementName<'static> = ElementName::local("committeeType");

/// Reference to a person resolved against a person catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference<'p> {
    /// Reference names a person in the catalog.
    Resolved(&'p Person),

    /// Reference names nobody in the catalog.
    Unresolved(RecordId),
}

impl<'p> Reference<'p> {
    /// Resolve record identifier against person catalog.
    pub fn resolve(persons: &'p PersonCatalog, id: RecordId) -> Self {
        match persons.get(id.as_str()) {
            Some(person) => Self::Resolved(person),
            None => Self::Unresolved(id),
        }
    }

    /// Get referenced person if resolved.
    pub fn person(&self) -> Option<&'p Person> {
        match self {
            Self::Resolved(person) => Some(*person),
            Self::Unresolved(_) => None,
        }
    }

    /// Identifier the reference was made with.
    pub fn record_id(&self) -> &RecordId {
        match self {
            Self::Resolved(person) => &person.record_id,
            Self::Unresolved(id) => id,
        }
    }
}

/// Research site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site<'p> {
    pub record_id: RecordId,

    /// Abbreviated site name.
    pub display_name: String,
    pub title: String,
    pub principal_investigator: Option<Reference<'p>>,

    /// Staff in document order.
    pub staff: Vec<Reference<'p>>,
    pub program: String,
    pub member_type: String,
}

impl Site<'_> {
    /// Last name of principal investigator, or empty if not resolved.
    pub fn pi_last_name(&self) -> &str {
        self.principal_investigator
            .as_ref()
            .and_then(Reference::person)
            .map(|person| person.last_name.as_str())
            .unwrap_or_default()
    }
}

impl Record for Site<'_> {
    fn record_id(&self) -> &RecordId {
        &self.record_id
    }
}

/// Collaborative group, e.g., a committee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaborativeGroup<'p> {
    pub record_id: RecordId,
    pub title: String,

    /// Members in document order.
    pub members: Vec<Reference<'p>>,
    pub group_type: String,
}

impl Record for CollaborativeGroup<'_> {
    fn record_id(&self) -> &RecordId {
        &self.record_id
    }
}

/// Parse every site record, resolving people through person catalog.
///
/// # Errors
///
/// - Return [`RdfError::DocumentUnreadable`] if markup is not well-formed.
pub fn parse_sites<'p>(
    text: &str,
    origin: impl Into<String>,
    persons: &'p PersonCatalog,
) -> Result<Catalog<Site<'p>>> {
    let document = parse_document(text, origin)?;
    let mut catalog = Catalog::new();
    for node in descriptions(&document) {
        let site = Site {
            record_id: own_id(node),
            display_name: element_text(node, ABBREV_NAME),
            title: element_text(node, TITLE),
            principal_investigator: resource_id(first_element(node, PI), RESOURCE)
                .map(|id| Reference::resolve(persons, id)),
            staff: references(node, STAFF, persons),
            program: element_text(node, PROGRAM),
            member_type: element_text(node, MEMBER_TYPE),
        };
        report_unresolved(&site.record_id, site.staff.iter().chain(&site.principal_investigator));
        debug!("found site: [{}] {}", site.display_name, site.title);
        catalog.push(site);
    }

    Ok(catalog)
}

/// Parse every collaborative group record, resolving people through person
/// catalog.
///
/// # Errors
///
/// - Return [`RdfError::DocumentUnreadable`] if markup is not well-formed.
pub fn parse_groups<'p>(
    text: &str,
    origin: impl Into<String>,
    persons: &'p PersonCatalog,
) -> Result<Catalog<CollaborativeGroup<'p>>> {
    let document = parse_document(text, origin)?;
    let mut catalog = Catalog::new();
    for node in descriptions(&document) {
        let group = CollaborativeGroup {
            record_id: own_id(node),
            title: element_text(node, TITLE),
            members: references(node, MEMBER, persons),
            group_type: element_text(node, COMMITTEE_TYPE),
        };
        report_unresolved(&group.record_id, group.members.iter());
        debug!("found collaborative group: {}", group.title);
        catalog.push(group);
    }

    Ok(catalog)
}

/// Read and parse site export at target path.
///
/// # Errors
///
/// - Return [`RdfError::ReadDocument`] if file cannot be read.
/// - Return [`RdfError::DocumentUnreadable`] if markup is not well-formed.
#[instrument(skip(path, persons), level = "debug")]
pub fn open_sites<'p>(
    path: impl AsRef<Path>,
    persons: &'p PersonCatalog,
) -> Result<Catalog<Site<'p>>> {
    let path = path.as_ref();
    parse_sites(&read(path)?, path.display().to_string(), persons)
}

/// Read and parse collaborative group export at target path.
///
/// # Errors
///
/// - Return [`RdfError::ReadDocument`] if file cannot be read.
/// - Return [`RdfError::DocumentUnreadable`] if markup is not well-formed.
#[instrument(skip(path, persons), level = "debug")]
pub fn open_groups<'p>(
    path: impl AsRef<Path>,
    persons: &'p PersonCatalog,
) -> Result<Catalog<CollaborativeGroup<'p>>> {
    let path = path.as_ref();
    parse_groups(&read(path)?, path.display().to_string(), persons)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| RdfError::ReadDocument {
        source,
        path: path.to_path_buf(),
    })
}

fn own_id(node: Node<'_, '_>) -> RecordId {
    node.attribute(ABOUT)
        .map(RecordId::from_uri)
        .unwrap_or_default()
}

// INVARIANT: Positions are preserved, a reference without an rdf:resource
// attribute resolves as an empty identifier.
fn references<'p>(
    node: Node<'_, '_>,
    name: ElementName<'_>,
    persons: &'p PersonCatalog,
) -> Vec<Reference<'p>> {
    elements(node, name)
        .map(|element| resource_id(Some(element), RESOURCE).unwrap_or_default())
        .map(|id| Reference::resolve(persons, id))
        .collect()
}

fn report_unresolved<'a, 'p: 'a>(
    owner: &RecordId,
    references: impl Iterator<Item = &'a Reference<'p>>,
) {
    for reference in references {
        if let Reference::Unresolved(id) = reference {
            warn!("record {owner} refers to unknown person {id:?}");
        }
    }
}
