//! In-memory transaction store loaded from a resale-transaction CSV export.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use super::{StreetMatch, TransactionRow, TransactionStore};
use crate::classify::normalize_query;
use crate::error::StoreError;

/// Transaction rows plus their upper-cased street names, in file order.
pub struct CsvTransactionStore {
    rows: Vec<(String, TransactionRow)>,
}

impl CsvTransactionStore {
    /// Load rows from a CSV file with `block`, `street_name`, `latitude`,
    /// `longitude` columns. Other columns are ignored.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open transactions file {}", path.display()))?;

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for record in reader.deserialize::<TransactionRow>() {
            match record {
                Ok(row) => rows.push(row),
                Err(e) => {
                    skipped += 1;
                    if skipped <= 5 {
                        warn!("Skipping malformed transaction row: {}", e);
                    }
                }
            }
        }

        info!(
            "Loaded {} transactions from {} ({} skipped)",
            rows.len(),
            path.display(),
            skipped
        );
        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(rows: Vec<TransactionRow>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| (street_key(&row.street_name), row))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn street_key(street: &str) -> String {
    normalize_query(street).to_uppercase()
}

#[async_trait]
impl TransactionStore for CsvTransactionStore {
    async fn find_by_street(
        &self,
        street: &str,
        mode: StreetMatch,
        limit: usize,
    ) -> Result<Vec<TransactionRow>, StoreError> {
        let needle = street_key(street);
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .rows
            .iter()
            .filter(|(key, _)| match mode {
                StreetMatch::Exact => *key == needle,
                StreetMatch::Contains => key.contains(&needle),
            })
            .take(limit)
            .map(|(_, row)| row.clone())
            .collect())
    }
}
