// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Directory entry synthesis.
//!
//! Turn parsed people and groups into directory entries, search filters, and
//! distinguished names. Values are escaped before they land in a filter or a
//! DN, so names like "O'Brien, Jr." cannot break either.

use crate::rdf::Person;

use chrono::{DateTime, Utc};
use ldap3::{dn_escape, ldap_escape};
use std::collections::BTreeMap;

/// Base DN that people and groups are stored under.
pub const DEFAULT_BASE_DN: &str = "dc=edrn,dc=jpl,dc=nasa,dc=gov";

/// Password placeholder for imported people.
pub const DEFAULT_PASSWORD: &str = "changeme";

/// Description prefix for imported people, followed by the import time.
pub const DEFAULT_DESCRIPTION: &str = "imported via EDRN dmccsync at ";

const PERSON_CLASSES: [&str; 5] = [
    "top",
    "person",
    "organizationalPerson",
    "edrnPerson",
    "inetOrgPerson",
];
const GROUP_CLASSES: [&str; 2] = ["top", "groupOfUniqueNames"];

/// Settings that shape synthesized entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySettings {
    pub base_dn: String,
    pub password: String,
    pub description: String,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            base_dn: DEFAULT_BASE_DN.into(),
            password: DEFAULT_PASSWORD.into(),
            description: DEFAULT_DESCRIPTION.into(),
        }
    }
}

impl DirectorySettings {
    /// Distinguished name of person with account identifier.
    pub fn person_dn(&self, account_id: &str) -> String {
        format!("uid={},{}", dn_escape(account_id), self.base_dn)
    }

    /// Distinguished name of group with common name.
    pub fn group_dn(&self, name: &str) -> String {
        format!("cn={},{}", dn_escape(name), self.base_dn)
    }

    /// Build directory entry for person.
    ///
    /// The description records when the import happened.
    pub fn person_entry(&self, person: &Person, imported_at: DateTime<Utc>) -> Entry {
        let mut entry = Entry::new(self.person_dn(&person.account_id));
        entry.insert("objectClass", PERSON_CLASSES);
        entry.insert("cn", [person.common_name()]);
        entry.insert("userPassword", [self.password.as_str()]);
        entry.insert("uid", [person.account_id.as_str()]);
        entry.insert("mail", [person.email.as_str()]);
        entry.insert("telephoneNumber", [person.phone.as_str()]);
        entry.insert("sn", [person.last_name.as_str()]);
        entry.insert(
            "description",
            [format!(
                "{}{}",
                self.description,
                imported_at.format("%Y-%m-%dT%H:%M:%S")
            )],
        );
        entry
    }

    /// Build directory entry for group of unique names.
    pub fn group_entry<'a>(
        &self,
        name: &str,
        members: impl IntoIterator<Item = &'a Person>,
    ) -> Entry {
        let mut entry = Entry::new(self.group_dn(name));
        entry.insert("objectClass", GROUP_CLASSES);
        entry.insert("cn", [name]);
        entry.insert("description", [name]);

        let members: Vec<String> = members
            .into_iter()
            .map(|person| self.person_dn(&person.account_id))
            .collect();
        if !members.is_empty() {
            entry.insert("uniqueMember", members);
        }
        entry
    }
}

/// Name of group built for a site: principal investigator's last name
/// followed by the site title.
pub fn site_group_name(pi_last_name: &str, title: &str) -> String {
    format!("{pi_last_name} {title}").trim().to_string()
}

/// Filter matching person by account identifier.
pub fn person_filter(account_id: &str) -> String {
    format!("(uid={})", ldap_escape(account_id))
}

/// Filter matching group of unique names by common name.
pub fn group_filter(name: &str) -> String {
    format!(
        "(&(cn={})(objectClass=groupOfUniqueNames))",
        ldap_escape(name)
    )
}

/// Filter matching group by common name that already lists member.
pub fn member_filter(name: &str, member_dn: &str) -> String {
    format!(
        "(&(cn={})(objectClass=groupOfUniqueNames)(uniqueMember={}))",
        ldap_escape(name),
        ldap_escape(member_dn)
    )
}

/// Directory entry ready to be added.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub dn: String,
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Entry {
    /// Construct new entry without attributes.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set values of attribute, replacing any previous values.
    pub fn insert(
        &mut self,
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.attributes.insert(
            attribute.into(),
            values.into_iter().map(Into::into).collect(),
        );
    }

    /// Get values of attribute.
    pub fn values(&self, attribute: &str) -> &[String] {
        self.attributes
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
