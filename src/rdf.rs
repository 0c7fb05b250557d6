// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! DMCC RDF extraction.
//!
//! The DMCC exports people, research sites, and collaborative groups as
//! __RDF-subset documents__: plain XML files made of `rdf:Description`
//! records whose children are namespace-prefixed elements. Some children hold
//! text, e.g., a surname, while others point at another record through an
//! `rdf:resource` attribute.
//!
//! # Record Identifiers
//!
//! Every record names itself through its `rdf:about` attribute, which is a
//! URI. Only the trailing path segment of that URI is kept as the record's
//! [`RecordId`]. References between records are resolved the same way, so a
//! staff reference of `http://edrn.nci.nih.gov/data/registered-person/42`
//! resolves to the person whose `rdf:about` ends in `/42`.
//!
//! # Catalogs
//!
//! Parsing a document yields a [`Catalog`]. People are always parsed first.
//! Sites and collaborative groups come from a second document and borrow the
//! person catalog to resolve their staff, members, and principal
//! investigator. See [`person`] and [`site`].

pub mod catalog;
pub mod person;
pub mod phone;
pub mod site;
pub mod text;

pub use catalog::{Catalog, Record};
pub use person::{open_persons, parse_persons, Person, PersonCatalog, PersonDefaults};
pub use site::{
    open_groups, open_sites, parse_groups, parse_sites, CollaborativeGroup, Reference, Site,
};

use std::{
    borrow::Borrow,
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
};

/// Namespace of the RDF syntax vocabulary.
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Identifier of an RDF record.
///
/// Holds the trailing path segment of a resource URI.
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Construct record identifier from a URI-shaped resource reference.
    pub fn from_uri(uri: impl AsRef<str>) -> Self {
        Self(text::trailing_segment(uri.as_ref()).to_string())
    }

    /// Treat record identifier as string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check if record identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for RecordId {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl Borrow<str> for RecordId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// All possible error types for RDF extraction.
#[derive(Debug, thiserror::Error)]
pub enum RdfError {
    /// RDF document cannot be read from disk.
    #[error("failed to read RDF document at {:?}", path.display())]
    ReadDocument {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// RDF document is not well-formed markup.
    #[error("RDF document from {origin} is unreadable")]
    DocumentUnreadable {
        #[source]
        source: roxmltree::Error,
        origin: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = RdfError> = std::result::Result<T, E>;
