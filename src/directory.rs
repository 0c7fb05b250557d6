// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Directory service access.
//!
//! The synchronizer only needs a handful of directory operations: bind,
//! search by filter, add an entry, add values to an attribute, and unbind.
//! [`Directory`] is the seam for those operations. [`LdapDirectory`] talks to
//! a real LDAP server, while tests substitute an in-memory implementation.
//!
//! Entries themselves are built by [`entry`], which knows nothing about how
//! they get delivered.

pub mod entry;
pub mod ldap;

pub use entry::{DirectorySettings, Entry};
pub use ldap::LdapDirectory;

use tracing::warn;

/// Layer of indirection for directory access.
pub trait Directory {
    /// Authenticate as identity with secret.
    fn bind(&mut self, identity: &str, secret: &str) -> Result<()>;

    /// Find distinguished names of entries under base that match filter.
    fn search(&mut self, base: &str, filter: &str) -> Result<Vec<String>>;

    /// Add new entry.
    fn add(&mut self, entry: &Entry) -> Result<()>;

    /// Add values to attribute of existing entry.
    fn add_values(&mut self, dn: &str, attribute: &str, values: &[String]) -> Result<()>;

    /// Close session with directory.
    fn unbind(&mut self) -> Result<()>;
}

/// Bind to directory, run work, and unbind again.
///
/// Unbinding always happens, even when the bind itself was rejected. An
/// unbind failure is only logged, since the work is already done by then.
///
/// # Errors
///
/// - Return [`DirectoryError::OperationFailed`] if the bind is rejected.
pub fn with_session<D, T>(
    directory: &mut D,
    identity: &str,
    secret: &str,
    work: impl FnOnce(&mut D) -> T,
) -> Result<T>
where
    D: Directory,
{
    let bound = directory.bind(identity, secret);
    let value = bound.map(|()| work(directory));

    if let Err(error) = directory.unbind() {
        warn!("{error}");
    }

    value
}

/// All possible error types for directory access.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Directory server cannot be reached.
    #[error("failed to connect to directory at {url}")]
    Connect {
        #[source]
        source: ldap3::LdapError,
        url: String,
    },

    /// Directory rejected an operation.
    #[error("directory {operation} failed: {detail}")]
    OperationFailed {
        operation: &'static str,
        detail: String,
    },
}

impl DirectoryError {
    pub(crate) fn operation(operation: &'static str, error: ldap3::LdapError) -> Self {
        let detail = match error {
            ldap3::LdapError::LdapResult { result } if !result.text.is_empty() => result.text,
            ldap3::LdapError::LdapResult { result } => result.to_string(),
            error => error.to_string(),
        };

        Self::OperationFailed { operation, detail }
    }
}

/// Friendly result alias :3
pub type Result<T, E = DirectoryError> = std::result::Result<T, E>;
