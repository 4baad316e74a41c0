//! PIP service backing the [`SubzoneStore`] port with an in-memory index.

use async_trait::async_trait;
use geo::Contains;
use tracing::debug;

use super::SubzoneSpatialIndex;
use crate::error::StoreError;
use crate::models::{Coordinate, SubzoneSummary};
use crate::store::SubzoneStore;

/// Point-in-Polygon lookup service
pub struct PipService {
    index: SubzoneSpatialIndex,
}

impl PipService {
    /// Create a new PIP service from a spatial index
    pub fn new(index: SubzoneSpatialIndex) -> Self {
        Self { index }
    }

    /// Get the spatial index (for stats/debugging)
    pub fn index(&self) -> &SubzoneSpatialIndex {
        &self.index
    }
}

#[async_trait]
impl SubzoneStore for PipService {
    async fn subzones_containing(&self, coord: Coordinate) -> Result<Vec<String>, StoreError> {
        let hits: Vec<String> = self
            .index
            .lookup(coord)
            .iter()
            .map(|s| s.id().to_string())
            .collect();

        debug!(
            "PIP lookup at ({}, {}): {} containing subzones",
            coord.lat(),
            coord.lng(),
            hits.len()
        );
        Ok(hits)
    }

    async fn subzone_contains(
        &self,
        subzone_id: &str,
        coord: Coordinate,
    ) -> Result<bool, StoreError> {
        let subzone = self
            .index
            .get(subzone_id)
            .ok_or_else(|| StoreError::Query(format!("unknown subzone '{}'", subzone_id)))?;
        Ok(subzone.geometry.contains(&coord.to_point()))
    }

    async fn subzones(&self) -> Result<Vec<SubzoneSummary>, StoreError> {
        Ok(self.index.subzones().map(|s| s.summary.clone()).collect())
    }

    async fn subzone(&self, subzone_id: &str) -> Result<Option<SubzoneSummary>, StoreError> {
        Ok(self.index.get(subzone_id).map(|s| s.summary.clone()))
    }
}
