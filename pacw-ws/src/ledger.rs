//! Export Ledger
//!
//! Records generated export artifacts keyed by export id. Append-only:
//! entries are immutable once recorded, nothing is ever removed or replaced,
//! and a failed generation adds nothing. Generating a second export of the
//! same type yields a new record alongside the old one.

use std::collections::BTreeMap;

use pacw_common::models::{ExportType, PacketExportDetail, PacketExportRecord};
use pacw_common::{Error, Result};

/// Append-only ledger of a case's generated exports
#[derive(Debug, Default, Clone)]
pub struct ExportLedger {
    entries: BTreeMap<i64, PacketExportRecord>,
}

impl ExportLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ledger from the server's export list
    pub fn from_records(records: Vec<PacketExportRecord>) -> Result<Self> {
        let mut ledger = Self::new();
        for record in records {
            ledger.record(record)?;
        }
        Ok(ledger)
    }

    /// Append one export record; duplicate ids are rejected
    pub fn record(&mut self, record: PacketExportRecord) -> Result<()> {
        if self.entries.contains_key(&record.export_id) {
            return Err(Error::InvalidInput(format!(
                "Export {} is already recorded",
                record.export_id
            )));
        }
        self.entries.insert(record.export_id, record);
        Ok(())
    }

    /// Append the record for a freshly generated export detail
    pub fn record_detail(&mut self, detail: &PacketExportDetail) -> Result<()> {
        self.record(detail.record())
    }

    pub fn get(&self, export_id: i64) -> Option<&PacketExportRecord> {
        self.entries.get(&export_id)
    }

    /// All records, newest first
    pub fn records(&self) -> Vec<&PacketExportRecord> {
        let mut records: Vec<&PacketExportRecord> = self.entries.values().collect();
        records.sort_by(|a, b| (b.created_at, b.export_id).cmp(&(a.created_at, a.export_id)));
        records
    }

    pub fn count_of_type(&self, export_type: ExportType) -> usize {
        self.entries
            .values()
            .filter(|record| record.export_type == export_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
