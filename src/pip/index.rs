//! Spatial index for fast subzone lookups.

use geo::Contains;
use hashbrown::{HashMap, HashSet};
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{Coordinate, SubzonePolygon};

/// Wrapper for R-tree indexing of subzone polygons
#[derive(Clone)]
pub struct IndexedSubzone {
    pub subzone: Arc<SubzonePolygon>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedSubzone {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedSubzone {
    pub fn new(subzone: SubzonePolygon) -> Self {
        let bbox = subzone.summary.bbox;
        Self {
            subzone: Arc::new(subzone),
            envelope: AABB::from_corners([bbox.min_lng, bbox.min_lat], [bbox.max_lng, bbox.max_lat]),
        }
    }
}

/// Spatial index for subzone polygons using R-tree
pub struct SubzoneSpatialIndex {
    tree: RTree<IndexedSubzone>,
    /// Subzones in stable id order
    ordered: Vec<Arc<SubzonePolygon>>,
    by_id: HashMap<String, usize>,
}

impl SubzoneSpatialIndex {
    /// Build spatial index from subzone polygons
    pub fn build(subzones: Vec<SubzonePolygon>) -> Self {
        info!("Building spatial index for {} subzones...", subzones.len());

        // First occurrence of an id wins so the tree and the id table agree
        let mut seen: HashSet<String> = HashSet::with_capacity(subzones.len());
        let mut indexed: Vec<IndexedSubzone> = Vec::with_capacity(subzones.len());
        for subzone in subzones {
            if !seen.insert(subzone.id().to_string()) {
                warn!("Duplicate subzone id {}; keeping the first", subzone.id());
                continue;
            }
            indexed.push(IndexedSubzone::new(subzone));
        }

        let mut ordered: Vec<Arc<SubzonePolygon>> =
            indexed.iter().map(|is| Arc::clone(&is.subzone)).collect();
        ordered.sort_by(|a, b| a.id().cmp(b.id()));

        let by_id = ordered
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id().to_string(), i))
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self {
            tree,
            ordered,
            by_id,
        }
    }

    /// Find all subzones whose polygon contains a point, in id order
    pub fn lookup(&self, coord: Coordinate) -> Vec<Arc<SubzonePolygon>> {
        let point = coord.to_point();
        let query_envelope = AABB::from_point([coord.lng(), coord.lat()]);

        // Envelope intersection first, then exact containment
        let mut hits: Vec<Arc<SubzonePolygon>> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|is| is.subzone.geometry.contains(&point))
            .map(|is| Arc::clone(&is.subzone))
            .collect();
        hits.sort_by(|a, b| a.id().cmp(b.id()));
        hits
    }

    pub fn get(&self, id: &str) -> Option<&Arc<SubzonePolygon>> {
        self.by_id.get(id).map(|&i| &self.ordered[i])
    }

    /// Get total number of indexed subzones
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Iterate over all subzones in id order
    pub fn subzones(&self) -> impl Iterator<Item = &Arc<SubzonePolygon>> {
        self.ordered.iter()
    }
}
