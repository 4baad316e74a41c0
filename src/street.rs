//! Street-name coordinate inference from historical transactions.
//!
//! There is no canonical street gazetteer, so a street is located through the
//! recorded coordinates of past transactions on it. The first row whose
//! coordinate resolves to any subzone wins; rows are not aggregated.

use std::sync::{Arc, LazyLock};

use futures::stream::{self, StreamExt};
use regex::Regex;
use tracing::{debug, warn};

use crate::classify::normalize_query;
use crate::containment::{Containment, ContainmentResolver};
use crate::error::{ResolveError, Result};
use crate::models::Coordinate;
use crate::store::{StreetMatch, TransactionRow, TransactionStore};

static BLOCK_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[A-Za-z]?\s+").expect("valid block prefix regex"));

/// Remove a leading block number ("38 ", "38A ") from a street query.
pub fn strip_block_number(query: &str) -> String {
    let normalized = normalize_query(query);
    BLOCK_PREFIX.replace(&normalized, "").into_owned()
}

/// A coordinate inferred for a street together with the subzone it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetResolution {
    pub street: String,
    pub coordinate: Coordinate,
    pub containment: Containment,
}

/// Infers street coordinates from the transaction store.
#[derive(Clone)]
pub struct StreetInferrer {
    transactions: Arc<dyn TransactionStore>,
    containment: ContainmentResolver,
    row_limit: usize,
    max_concurrent_checks: usize,
}

impl StreetInferrer {
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        containment: ContainmentResolver,
        row_limit: usize,
        max_concurrent_checks: usize,
    ) -> Self {
        Self {
            transactions,
            containment,
            row_limit: row_limit.max(1),
            max_concurrent_checks: max_concurrent_checks.max(1),
        }
    }

    pub async fn resolve(&self, query: &str) -> Result<StreetResolution> {
        let street = strip_block_number(query);
        if street.is_empty() {
            return Err(ResolveError::InvalidInput("street name is empty".to_string()));
        }

        let mut rows = self
            .transactions
            .find_by_street(&street, StreetMatch::Exact, self.row_limit)
            .await?;
        if rows.is_empty() {
            debug!("No exact street match for '{}', trying substring", street);
            rows = self
                .transactions
                .find_by_street(&street, StreetMatch::Contains, self.row_limit)
                .await?;
        }

        let coords = valid_coordinates(&rows);
        debug!(
            "Street '{}': {} rows, {} usable coordinates",
            street,
            rows.len(),
            coords.len()
        );

        let mut trials = std::pin::pin!(stream::iter(coords)
            .map(|coord| async move { (coord, self.containment.resolve(coord).await) })
            .buffered(self.max_concurrent_checks));

        while let Some((coordinate, outcome)) = trials.next().await {
            match outcome {
                Ok(containment) => {
                    return Ok(StreetResolution {
                        street,
                        coordinate,
                        containment,
                    })
                }
                Err(ResolveError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(ResolveError::NotFound(format!(
            "no transaction coordinates resolve for street '{}'",
            street
        )))
    }
}

/// Parsed coordinates in row order, skipping unusable rows.
fn valid_coordinates(rows: &[TransactionRow]) -> Vec<Coordinate> {
    rows.iter()
        .filter_map(|row| match Coordinate::parse(&row.latitude, &row.longitude) {
            Ok(coord) => Some(coord),
            Err(e) => {
                warn!(
                    "Skipping transaction at {} {}: {}",
                    row.block, row.street_name, e
                );
                None
            }
        })
        .collect()
}
