//! Read-only reference stores consumed by the resolver.
//!
//! The resolver only sees these traits; concrete stores are constructed by the
//! server and passed in, so tests can substitute in-memory doubles.

mod transactions;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::StoreError;
use crate::models::{Coordinate, SubzoneSummary};

pub use transactions::CsvTransactionStore;

/// Spatial polygon store.
#[async_trait]
pub trait SubzoneStore: Send + Sync {
    /// Authoritative point-in-polygon lookup: ids of every subzone containing
    /// the coordinate.
    async fn subzones_containing(&self, coord: Coordinate) -> Result<Vec<String>, StoreError>;

    /// Authoritative containment check against a single subzone.
    async fn subzone_contains(&self, subzone_id: &str, coord: Coordinate)
        -> Result<bool, StoreError>;

    /// Bulk read of every subzone without geometry.
    async fn subzones(&self) -> Result<Vec<SubzoneSummary>, StoreError>;

    async fn subzone(&self, subzone_id: &str) -> Result<Option<SubzoneSummary>, StoreError>;
}

/// How a street name is compared against transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreetMatch {
    /// Case-insensitive equality
    Exact,
    /// Case-insensitive substring
    Contains,
}

/// One historical transaction with its recorded location.
///
/// Coordinates are kept as recorded; callers parse and validate them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionRow {
    #[serde(default)]
    pub block: String,
    pub street_name: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
}

/// Historical transaction store, used as a street coordinate source.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Rows whose street name matches, in retrieval order, at most `limit`.
    async fn find_by_street(
        &self,
        street: &str,
        mode: StreetMatch,
        limit: usize,
    ) -> Result<Vec<TransactionRow>, StoreError>;
}
