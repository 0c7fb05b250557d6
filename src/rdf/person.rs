// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Person records.
//!
//! A DMCC user export lists registered people, one `rdf:Description` per
//! person. Each record becomes a [`Person`] with a guaranteed account
//! identifier and phone number, so that it can always be turned into a
//! directory entry.

use crate::rdf::{
    phone::{normalize_phone, DEFAULT_PHONE},
    text::{
        descriptions, element_text, first_element, parse_document, resource_id, ElementName,
        ABOUT, RESOURCE,
    },
    Catalog, RdfError, Record, RecordId, Result,
};

use roxmltree::Node;
use std::{fs, path::Path};
use tracing::{debug, instrument, warn};

/// Email used when a record carries no mailbox.
pub const DEFAULT_EMAIL: &str = "unknown@example.com";

const GIVEN_NAME: ElementName<'static> = ElementName::local("givenname");
const SURNAME: ElementName<'static> = ElementName::local("surname");
const ACCOUNT_NAME: ElementName<'static> = ElementName::local("accountName");
const MBOX: ElementName<'static> = ElementName::local("mbox");
const PHONE: ElementName<'static> = ElementName::local("phone");
const SITE: ElementName<'static> = ElementName::local("site");

/// Catalog of people keyed by record identifier.
pub type PersonCatalog = Catalog<Person>;

/// Person extracted from one RDF record.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Identifier of the record itself.
    pub record_id: RecordId,

    /// Site the person is primarily affiliated with.
    pub site_id: Option<RecordId>,

    /// Mailbox without its URI scheme.
    pub email: String,

    /// Directory user identifier.
    pub account_id: String,

    pub first_name: String,
    pub last_name: String,

    /// Phone number in `AAA-EEE-NNNN` form.
    pub phone: String,
}

impl Person {
    /// Full name as "first last".
    pub fn common_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for Person {
    fn record_id(&self) -> &RecordId {
        &self.record_id
    }
}

/// Fallback values for person fields missing from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDefaults {
    pub email: String,
    pub phone: String,
}

impl Default for PersonDefaults {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.into(),
            phone: DEFAULT_PHONE.into(),
        }
    }
}

/// Parse every person record of user export.
///
/// Records are kept in document order without deduplication. A record that
/// yields no account identifier at all is skipped.
///
/// # Errors
///
/// - Return [`RdfError::DocumentUnreadable`] if markup is not well-formed.
pub fn parse_persons(
    text: &str,
    origin: impl Into<String>,
    defaults: &PersonDefaults,
) -> Result<PersonCatalog> {
    let document = parse_document(text, origin)?;
    let mut catalog = PersonCatalog::new();
    for node in descriptions(&document) {
        match person_from_node(node, defaults) {
            Some(person) => {
                debug!(
                    "found person: [{}, {}] as {}",
                    person.last_name, person.first_name, person.account_id
                );
                catalog.push(person);
            }
            None => warn!(
                "skip person record at byte {}: no account name, name, or identifier",
                node.range().start
            ),
        }
    }

    Ok(catalog)
}

/// Read and parse user export at target path.
///
/// # Errors
///
/// - Return [`RdfError::ReadDocument`] if file cannot be read.
/// - Return [`RdfError::DocumentUnreadable`] if markup is not well-formed.
#[instrument(skip(path, defaults), level = "debug")]
pub fn open_persons(path: impl AsRef<Path>, defaults: &PersonDefaults) -> Result<PersonCatalog> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| RdfError::ReadDocument {
        source,
        path: path.to_path_buf(),
    })?;

    let catalog = parse_persons(&text, path.display().to_string(), defaults)?;
    debug!("parsed {} people from {:?}", catalog.len(), path.display());

    Ok(catalog)
}

fn person_from_node(node: Node<'_, '_>, defaults: &PersonDefaults) -> Option<Person> {
    let record_id = node
        .attribute(ABOUT)
        .map(RecordId::from_uri)
        .unwrap_or_default();
    let site_id = resource_id(first_element(node, SITE), RESOURCE);
    let first_name = element_text(node, GIVEN_NAME);
    let last_name = element_text(node, SURNAME);

    let email = strip_scheme(&element_text(node, MBOX)).to_string();
    let email = if email.is_empty() {
        defaults.email.clone()
    } else {
        email
    };

    let explicit = element_text(node, ACCOUNT_NAME);
    let mut account_id = if explicit.is_empty() {
        synthesize_account_id(&first_name, &last_name)
    } else {
        explicit
    };

    // INVARIANT: Every person must carry an account identifier.
    if account_id.is_empty() {
        account_id = record_id.as_str().to_lowercase();
    }
    if account_id.is_empty() {
        return None;
    }

    let phone_text = element_text(node, PHONE);
    let phone = normalize_phone(Some(phone_text.as_str()), &defaults.phone);

    Some(Person {
        record_id,
        site_id,
        email,
        account_id,
        first_name,
        last_name,
        phone,
    })
}

/// Build account identifier from first initial and last name.
///
/// Result is lower-cased, and cut at the first comma so that suffixes like
/// "Doe, Jr." do not leak into the identifier.
pub fn synthesize_account_id(first_name: &str, last_name: &str) -> String {
    let initial = first_name.chars().next().map(String::from).unwrap_or_default();
    let mut account_id = format!("{initial}{last_name}").to_lowercase();
    if let Some(comma) = account_id.find(',') {
        account_id.truncate(comma);
    }
    account_id
}

/// Strip URI scheme like `mailto:` from mailbox.
///
/// Everything up to and including the first `:` is removed.
pub fn strip_scheme(mailbox: &str) -> &str {
    match mailbox.find(':') {
        Some(index) => &mailbox[index + 1..],
        None => mailbox,
    }
}
