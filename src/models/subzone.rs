//! Subzone reference data.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use super::Bbox;

/// Bulk-read view of a subzone: everything except the geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubzoneSummary {
    pub id: String,
    pub name: String,
    pub planning_area_id: String,
    pub region: String,
    pub bbox: Bbox,
}

/// Public shape returned by `/subzones/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubzoneInfo {
    pub id: String,
    pub name: String,
    pub planning_area_id: String,
    pub region: String,
}

impl From<&SubzoneSummary> for SubzoneInfo {
    fn from(summary: &SubzoneSummary) -> Self {
        Self {
            id: summary.id.clone(),
            name: summary.name.clone(),
            planning_area_id: summary.planning_area_id.clone(),
            region: summary.region.clone(),
        }
    }
}

/// A subzone polygon with its metadata.
///
/// `summary.bbox` is always derived from `geometry`, see [`SubzonePolygon::new`].
#[derive(Debug, Clone)]
pub struct SubzonePolygon {
    pub summary: SubzoneSummary,
    pub geometry: MultiPolygon<f64>,
}

impl SubzonePolygon {
    /// Build a polygon, computing the bounding box from the geometry.
    ///
    /// Returns `None` for empty geometry.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        planning_area_id: impl Into<String>,
        region: impl Into<String>,
        geometry: MultiPolygon<f64>,
    ) -> Option<Self> {
        let bbox = Bbox::from_geometry(&geometry)?;
        Some(Self {
            summary: SubzoneSummary {
                id: id.into(),
                name: name.into(),
                planning_area_id: planning_area_id.into(),
                region: region.into(),
                bbox,
            },
            geometry,
        })
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }
}
