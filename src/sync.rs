// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Directory synchronization.
//!
//! Push parsed records into a directory one at a time. Synchronization only
//! ever adds: people and groups that already exist are left alone, and nothing
//! is ever deleted. Each record stands on its own, so a record the directory
//! rejects is logged and counted, and the run moves on to the next one. A run
//! that fails halfway leaves every record added before the failure in place.
//!
//! # Existing Groups
//!
//! By default an existing group is not touched, and the members that would
//! have been added are only logged. Enabling member merging through
//! [`Synchronizer::merge_members`] adds every resolved member that the group
//! does not list yet.

use crate::{
    directory::{
        entry::{group_filter, member_filter, person_filter, site_group_name},
        Directory, DirectorySettings, Result,
    },
    rdf::{Catalog, CollaborativeGroup, Person, Reference, Site},
};

use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::{debug, error, info, instrument, warn};

/// Tally of a synchronization run.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries newly added.
    pub added: usize,

    /// Entries that already existed and were left alone.
    pub existing: usize,

    /// Existing groups that received new members.
    pub updated: usize,

    /// Records the directory rejected.
    pub failed: usize,

    /// Records that could not be turned into an entry.
    pub skipped: usize,
}

impl SyncReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Added => self.added += 1,
            Outcome::Existing => self.existing += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

impl std::ops::AddAssign for SyncReport {
    fn add_assign(&mut self, other: Self) {
        self.added += other.added;
        self.existing += other.existing;
        self.updated += other.updated;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

impl Display for SyncReport {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "{} added, {} existing, {} updated, {} failed, {} skipped",
            self.added, self.existing, self.updated, self.failed, self.skipped
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Added,
    Existing,
    Updated,
    Skipped,
}

/// Synchronize parsed records into a directory.
pub struct Synchronizer<'d, D>
where
    D: Directory,
{
    directory: &'d mut D,
    settings: DirectorySettings,
    imported_at: DateTime<Utc>,
    merge_members: bool,
}

impl<'d, D> Synchronizer<'d, D>
where
    D: Directory,
{
    /// Construct new synchronizer over bound directory.
    ///
    /// The import time stamped on every person is taken once, now.
    pub fn new(directory: &'d mut D, settings: DirectorySettings) -> Self {
        Self {
            directory,
            settings,
            imported_at: Utc::now(),
            merge_members: false,
        }
    }

    /// Use fixed import time for person descriptions.
    pub fn imported_at(mut self, imported_at: DateTime<Utc>) -> Self {
        self.imported_at = imported_at;
        self
    }

    /// Add missing members to groups that already exist.
    pub fn merge_members(mut self, merge: bool) -> Self {
        self.merge_members = merge;
        self
    }

    /// Add every person that the directory lacks.
    #[instrument(skip_all, level = "debug")]
    pub fn sync_persons<'a>(&mut self, persons: impl IntoIterator<Item = &'a Person>) -> SyncReport {
        let mut report = SyncReport::default();
        for person in persons {
            match self.sync_person(person) {
                Ok(outcome) => report.record(outcome),
                Err(err) => {
                    error!("cannot sync person [uid={}]: {err}", person.account_id);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Add a group for every site that the directory lacks.
    ///
    /// Groups are named after the principal investigator's last name and the
    /// site title. Staff become the group's unique members.
    #[instrument(skip_all, level = "debug")]
    pub fn sync_sites(&mut self, sites: &Catalog<Site<'_>>) -> SyncReport {
        let mut report = SyncReport::default();
        for site in sites {
            info!("processing group: [{}]", site.display_name);
            let name = site_group_name(site.pi_last_name(), &site.title);
            match self.sync_group(&name, &site.staff) {
                Ok(outcome) => report.record(outcome),
                Err(err) => {
                    error!("cannot sync group [{name}]: {err}");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Add a group for every collaborative group that the directory lacks.
    ///
    /// Groups are named after their title.
    #[instrument(skip_all, level = "debug")]
    pub fn sync_groups(&mut self, groups: &Catalog<CollaborativeGroup<'_>>) -> SyncReport {
        let mut report = SyncReport::default();
        for group in groups {
            info!("processing group: [{}]", group.title);
            let name = group.title.trim();
            match self.sync_group(name, &group.members) {
                Ok(outcome) => report.record(outcome),
                Err(err) => {
                    error!("cannot sync group [{name}]: {err}");
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn sync_person(&mut self, person: &Person) -> Result<Outcome> {
        let base = self.settings.base_dn.as_str();
        if !self
            .directory
            .search(base, &person_filter(&person.account_id))?
            .is_empty()
        {
            debug!(
                "skip record [uid={}]: entry already exists",
                person.account_id
            );
            return Ok(Outcome::Existing);
        }

        let entry = self.settings.person_entry(person, self.imported_at);
        debug!("sync record: {entry:?}");
        self.directory.add(&entry)?;

        Ok(Outcome::Added)
    }

    fn sync_group(&mut self, name: &str, references: &[Reference<'_>]) -> Result<Outcome> {
        if name.is_empty() {
            warn!("skip group without a name");
            return Ok(Outcome::Skipped);
        }

        let mut members = Vec::new();
        for reference in references {
            match reference.person() {
                Some(person) => members.push(person),
                None => debug!(
                    "leave unknown person {:?} out of group [{name}]",
                    reference.record_id().as_str()
                ),
            }
        }

        let base = self.settings.base_dn.as_str();
        let found = self.directory.search(base, &group_filter(name))?;
        let Some(group_dn) = found.first() else {
            let entry = self.settings.group_entry(name, members);
            debug!("create group: {entry:?}");
            self.directory.add(&entry)?;
            return Ok(Outcome::Added);
        };

        if !self.merge_members {
            info!(
                "group [{name}] already exists: {} member(s) would be added",
                members.len()
            );
            return Ok(Outcome::Existing);
        }

        // INVARIANT: Members are checked and added at the DN the search found,
        // which may sit anywhere below the base.
        let mut missing = Vec::new();
        for person in members {
            let member_dn = self.settings.person_dn(&person.account_id);
            if self
                .directory
                .search(group_dn, &member_filter(name, &member_dn))?
                .is_empty()
                && !missing.contains(&member_dn)
            {
                missing.push(member_dn);
            }
        }

        if missing.is_empty() {
            debug!("group [{name}] already lists every member");
            return Ok(Outcome::Existing);
        }

        info!("add {} member(s) to group {group_dn}", missing.len());
        self.directory
            .add_values(group_dn, "uniqueMember", &missing)?;

        Ok(Outcome::Updated)
    }
}
