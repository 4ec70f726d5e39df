//! Insert-if-absent record storage
//!
//! Records are keyed by application number. A record whose key is already
//! stored is skipped, never overwritten.

use crate::record::ParsedRecord;
use std::collections::BTreeMap;

/// A sink for parsed records
pub trait RecordStore {
    /// Store `record` unless its application number is already present.
    /// Returns whether it was inserted.
    fn insert_if_absent(&mut self, record: ParsedRecord) -> bool;
}

/// In-memory store ordered by application number
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, ParsedRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, application_number: &str) -> Option<&ParsedRecord> {
        self.records.get(application_number)
    }

    pub fn records(&self) -> impl Iterator<Item = &ParsedRecord> {
        self.records.values()
    }
}

impl RecordStore for MemoryStore {
    fn insert_if_absent(&mut self, record: ParsedRecord) -> bool {
        if self.records.contains_key(&record.application_number) {
            log::info!(
                "Skipped: application \"{}\" with address \"{}\" because it was already present",
                record.application_number,
                record.address
            );
            return false;
        }
        log::info!(
            "Inserted: application \"{}\" with address \"{}\", description \"{}\" and received date \"{}\"",
            record.application_number,
            record.address,
            record.description,
            record
                .received_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        );
        self.records
            .insert(record.application_number.clone(), record);
        true
    }
}
