// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Synchronize DMCC RDF exports into an EDRN LDAP directory.
//!
//! The DMCC publishes the people, research sites, and collaborative groups of
//! EDRN as RDF exports. This crate reads those exports into catalogs, and
//! pushes them into an LDAP directory as person entries and groups of unique
//! names.
//!
//! A run always starts from the person export. Site and collaborative group
//! exports come second, and borrow the person catalog to resolve their staff,
//! members, and principal investigators. Catalogs are rebuilt from scratch on
//! every run; nothing is persisted between runs.
//!
//! # See Also
//!
//! 1. [`rdf`] for parsing exports.
//! 2. [`sync`] for pushing catalogs into a directory.

pub mod config;
pub mod directory;
pub mod path;
pub mod rdf;
pub mod sync;

pub use config::{CredentialFlags, Credentials, SyncConfig, UsageError};
pub use directory::{Directory, DirectoryError, DirectorySettings, LdapDirectory};
pub use rdf::{Catalog, CollaborativeGroup, Person, PersonCatalog, RdfError, Reference, Site};
pub use sync::{SyncReport, Synchronizer};
