// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Ordered record catalogs.

use crate::rdf::RecordId;

use std::{collections::HashMap, slice::Iter};

/// Record that can be looked up by identifier.
pub trait Record {
    /// Identifier of record.
    fn record_id(&self) -> &RecordId;
}

/// Ordered collection of parsed records.
///
/// Keeps records in document order, duplicates included. Lookup goes through
/// an index that is built as records are inserted. When an identifier repeats,
/// the first record in document order is the one found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog<T> {
    records: Vec<T>,
    index: HashMap<RecordId, usize>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Record> Catalog<T> {
    /// Construct new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append record to end of catalog.
    pub fn push(&mut self, record: T) {
        let position = self.records.len();
        self.index
            .entry(record.record_id().clone())
            .or_insert(position);
        self.records.push(record);
    }

    /// Get record by identifier.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|position| &self.records[*position])
    }

    /// Iterate records in document order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.records.iter()
    }

    /// Number of records in catalog.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if catalog has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Record> FromIterator<T> for Catalog<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for record in iter {
            catalog.push(record);
        }
        catalog
    }
}

impl<'a, T> IntoIterator for &'a Catalog<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
