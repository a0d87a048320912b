//! Calculation History Module
//!
//! Provides the in-memory ledger of completed calculations plus its
//! CSV persistence. Row indices are positional: deleting a row shifts every
//! later row down by one, and a reload renumbers from file order.

pub mod csv;

use rust_decimal::Decimal;
use std::path::Path;
use tokio::fs as tokio_fs;
use tracing::{debug, info, warn};

use crate::error::{CalcError, CalcResult};

/// One logged invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationRecord {
    pub operation_name: String,
    pub operand_a: Decimal,
    pub operand_b: Decimal,
    pub result: Decimal,
}

impl std::fmt::Display for CalculationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} = {}",
            self.operation_name, self.operand_a, self.operand_b, self.result
        )
    }
}

/// Ordered, mutable history of calculation records
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    records: Vec<CalculationRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: CalculationRecord) {
        debug!("Ledger append: {}", record);
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Snapshot of every record in current order
    pub fn all(&self) -> &[CalculationRecord] {
        &self.records
    }

    /// Records whose operation name equals `operation_name` exactly
    pub fn filter(&self, operation_name: &str) -> Vec<&CalculationRecord> {
        self.filter_indexed(operation_name)
            .into_iter()
            .map(|(_, r)| r)
            .collect()
    }

    /// Like `filter`, paired with each record's current row index
    pub fn filter_indexed(&self, operation_name: &str) -> Vec<(usize, &CalculationRecord)> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.operation_name == operation_name)
            .collect()
    }

    /// Remove the record at `index`, shifting later rows down by one.
    pub fn delete(&mut self, index: usize) -> CalcResult<CalculationRecord> {
        if index >= self.records.len() {
            warn!("Index {} is out of range; nothing deleted", index);
            return Err(CalcError::IndexOutOfRange {
                index: index as i64,
                len: self.records.len(),
            });
        }
        let removed = self.records.remove(index);
        info!("Deleted calculation at index {}", index);
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every record to `path` as CSV, creating parent directories.
    /// An existing file is overwritten.
    pub async fn save(&self, path: impl AsRef<Path>) -> CalcResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio_fs::create_dir_all(parent).await?;
            }
        }

        tokio_fs::write(path, csv::encode(&self.records)).await?;
        info!("Saved {} records to {:?}", self.records.len(), path);
        Ok(())
    }

    /// Replace the whole ledger with the contents of `path`.
    ///
    /// The file is parsed completely before anything is replaced, so a
    /// missing or malformed file leaves the ledger as it was.
    pub async fn load(&mut self, path: impl AsRef<Path>) -> CalcResult<()> {
        let path = path.as_ref();
        if !tokio_fs::try_exists(path).await? {
            return Err(CalcError::FileNotFound(path.to_path_buf()));
        }

        let content = tokio_fs::read_to_string(path).await?;
        self.records = csv::decode(&content)?;
        info!("Loaded {} records from {:?}", self.records.len(), path);
        Ok(())
    }
}

impl From<Vec<CalculationRecord>> for Ledger {
    fn from(records: Vec<CalculationRecord>) -> Self {
        Self { records }
    }
}
