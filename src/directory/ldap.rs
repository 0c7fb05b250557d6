// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! LDAP directory access through ldap3.

use crate::directory::{Directory, DirectoryError, Entry, Result};

use ldap3::{LdapConn, Mod, Scope, SearchEntry};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Directory access over one LDAP connection.
///
/// The same connection serves every operation of a run.
pub struct LdapDirectory {
    connection: LdapConn,
    url: String,
}

impl LdapDirectory {
    /// Open connection to LDAP server at target URL.
    ///
    /// # Errors
    ///
    /// - Return [`DirectoryError::Connect`] if server cannot be reached.
    #[instrument(level = "debug")]
    pub fn connect(url: &str) -> Result<Self> {
        let connection = LdapConn::new(url).map_err(|source| DirectoryError::Connect {
            source,
            url: url.to_string(),
        })?;

        Ok(Self {
            connection,
            url: url.to_string(),
        })
    }

    /// URL of connected server.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl Directory for LdapDirectory {
    fn bind(&mut self, identity: &str, secret: &str) -> Result<()> {
        debug!("bind to {} as {identity}", self.url);
        self.connection
            .simple_bind(identity, secret)
            .and_then(|result| result.success())
            .map_err(|error| DirectoryError::operation("bind", error))?;

        Ok(())
    }

    fn search(&mut self, base: &str, filter: &str) -> Result<Vec<String>> {
        debug!("search {base} for {filter}");
        // INVARIANT: Request no attributes, only distinguished names matter.
        let (entries, _) = self
            .connection
            .search(base, Scope::Subtree, filter, vec!["1.1"])
            .and_then(|result| result.success())
            .map_err(|error| DirectoryError::operation("search", error))?;

        Ok(entries
            .into_iter()
            .map(|entry| SearchEntry::construct(entry).dn)
            .collect())
    }

    fn add(&mut self, entry: &Entry) -> Result<()> {
        let attributes: Vec<(&str, HashSet<&str>)> = entry
            .attributes
            .iter()
            .map(|(name, values)| (name.as_str(), values.iter().map(String::as_str).collect()))
            .collect();

        self.connection
            .add(&entry.dn, attributes)
            .and_then(|result| result.success())
            .map_err(|error| DirectoryError::operation("add", error))?;

        Ok(())
    }

    fn add_values(&mut self, dn: &str, attribute: &str, values: &[String]) -> Result<()> {
        let values: HashSet<&str> = values.iter().map(String::as_str).collect();
        self.connection
            .modify(dn, vec![Mod::Add(attribute, values)])
            .and_then(|result| result.success())
            .map_err(|error| DirectoryError::operation("modify", error))?;

        Ok(())
    }

    fn unbind(&mut self) -> Result<()> {
        debug!("unbind from {}", self.url);
        self.connection
            .unbind()
            .map_err(|error| DirectoryError::operation("unbind", error))
    }
}
