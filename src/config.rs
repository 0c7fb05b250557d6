// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that edrn-sync reads to learn
//! how to reach the directory server, and what to fill in for missing record
//! fields. Every setting is optional. Command-line flags take precedence over
//! whatever the file says.
//!
//! # General Layout
//!
//! ```toml
//! [ldap]
//! url = "ldaps://localhost:636"
//! bind_dn = "uid=admin,ou=system"
//! password = "${EDRN_SYNC_PASSWORD}"
//! base_dn = "dc=edrn,dc=jpl,dc=nasa,dc=gov"
//!
//! [defaults]
//! email = "unknown@example.com"
//! phone = "555-555-5555"
//! password = "changeme"
//! description = "imported via EDRN dmccsync at "
//! ```
//!
//! The `url`, `bind_dn`, and `password` settings of the `[ldap]` table go
//! through shell expansion, so secrets can stay in the environment.

use crate::{
    directory::{
        entry::{DEFAULT_BASE_DN, DEFAULT_DESCRIPTION, DEFAULT_PASSWORD},
        DirectorySettings,
    },
    rdf::{
        person::DEFAULT_EMAIL,
        phone::DEFAULT_PHONE,
        PersonDefaults,
    },
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Configuration file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// How to reach the directory server.
    #[serde(default)]
    pub ldap: LdapConfig,

    /// Fallback values for imported records.
    #[serde(default)]
    pub defaults: RecordDefaults,
}

impl SyncConfig {
    /// Load configuration file at target path.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ReadFile`] if file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file layout is invalid.
    /// - Return [`ConfigError::ShellExpansion`] if shell expansion fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("load configuration: {:?}", path.display());
        fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile {
                source,
                path: path.to_path_buf(),
            })?
            .parse()
    }

    /// Load configuration file at target path if it exists.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// - Same as [`SyncConfig::load`].
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Settings for synthesizing directory entries.
    pub fn directory_settings(&self) -> DirectorySettings {
        DirectorySettings {
            base_dn: self
                .ldap
                .base_dn
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_DN.into()),
            password: self.defaults.password.clone(),
            description: self.defaults.description.clone(),
        }
    }

    /// Fallback values for parsing people.
    pub fn person_defaults(&self) -> PersonDefaults {
        PersonDefaults {
            email: self.defaults.email.clone(),
            phone: self.defaults.phone.clone(),
        }
    }

    /// Merge connection settings from command-line flags over this
    /// configuration.
    ///
    /// Every flag that is set wins over the configuration file. Whatever is
    /// still missing afterwards is a usage error.
    ///
    /// # Errors
    ///
    /// - Return [`UsageError`] naming the first setting neither source provides.
    pub fn credentials(&self, flags: CredentialFlags) -> Result<Credentials, UsageError> {
        let url = flags
            .url
            .or_else(|| self.ldap.url.clone())
            .ok_or(UsageError("LDAP URL (--ldap-url)"))?;
        let bind_dn = flags
            .bind_dn
            .or_else(|| self.ldap.bind_dn.clone())
            .ok_or(UsageError("bind DN (--user)"))?;
        let password = flags
            .password
            .or_else(|| self.ldap.password.clone())
            .ok_or(UsageError("bind password (--password)"))?;

        Ok(Credentials {
            url,
            bind_dn,
            password,
        })
    }
}

/// Connection settings given on the command line.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct CredentialFlags {
    pub url: Option<String>,
    pub bind_dn: Option<String>,
    pub password: Option<String>,
}

/// Everything needed to reach and bind to the directory.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub bind_dn: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.debug_struct("Credentials")
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .finish_non_exhaustive()
    }
}

/// Connection setting missing from both command line and configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing {0}: pass it on the command line or set it in the configuration file")]
pub struct UsageError(pub &'static str);

impl FromStr for SyncConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: SyncConfig = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on connection settings.
        config.ldap.url = expand(config.ldap.url)?;
        config.ldap.bind_dn = expand(config.ldap.bind_dn)?;
        config.ldap.password = expand(config.ldap.password)?;

        Ok(config)
    }
}

impl Display for SyncConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Directory connection settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct LdapConfig {
    /// LDAP URL of the server to synchronize with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// DN of the user allowed to add entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_dn: Option<String>,

    /// Password of the bind user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Base DN that people and groups live under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dn: Option<String>,
}

/// Fallback values for imported records.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordDefaults {
    /// Email of people without a mailbox.
    pub email: String,

    /// Phone number of people without a usable phone number.
    pub phone: String,

    /// Password placeholder of imported people.
    pub password: String,

    /// Description prefix of imported people.
    pub description: String,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.into(),
            phone: DEFAULT_PHONE.into(),
            password: DEFAULT_PASSWORD.into(),
            description: DEFAULT_DESCRIPTION.into(),
        }
    }
}

fn expand(value: Option<String>) -> Result<Option<String>> {
    value
        .map(|value| {
            shellexpand::full(value.as_str())
                .map(|expanded| expanded.into_owned())
                .map_err(ConfigError::ShellExpansion)
        })
        .transpose()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file cannot be read.
    #[error("failed to read configuration file at {:?}", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
