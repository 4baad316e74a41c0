//! Two-tier spatial containment resolution.
//!
//! 1. Ask the store's authoritative point-in-polygon capability.
//! 2. Otherwise pre-filter every subzone by bounding box and, when several
//!    boxes overlap, confirm candidates one by one (in id order).
//! 3. If no candidate confirms, fall back to the first bbox candidate and mark
//!    the result as a best-effort guess.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::error::{ResolveError, Result};
use crate::models::{Coordinate, ResolutionTier, SubzoneSummary};
use crate::store::SubzoneStore;

/// Outcome of containment resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Containment {
    /// Confirmed by the authoritative check or by unique bbox containment.
    Exact {
        subzone: SubzoneSummary,
        tier: ResolutionTier,
    },
    /// Unconfirmed first bbox candidate.
    BestEffort { subzone: SubzoneSummary },
}

impl Containment {
    pub fn subzone(&self) -> &SubzoneSummary {
        match self {
            Containment::Exact { subzone, .. } | Containment::BestEffort { subzone } => subzone,
        }
    }

    pub fn into_subzone(self) -> SubzoneSummary {
        match self {
            Containment::Exact { subzone, .. } | Containment::BestEffort { subzone } => subzone,
        }
    }

    pub fn tier(&self) -> ResolutionTier {
        match self {
            Containment::Exact { tier, .. } => *tier,
            Containment::BestEffort { .. } => ResolutionTier::BboxGuess,
        }
    }

    pub fn is_best_effort(&self) -> bool {
        matches!(self, Containment::BestEffort { .. })
    }
}

/// Resolves a coordinate to its enclosing subzone.
#[derive(Clone)]
pub struct ContainmentResolver {
    store: Arc<dyn SubzoneStore>,
    max_concurrent_checks: usize,
}

impl ContainmentResolver {
    pub fn new(store: Arc<dyn SubzoneStore>, max_concurrent_checks: usize) -> Self {
        Self {
            store,
            max_concurrent_checks: max_concurrent_checks.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn SubzoneStore> {
        &self.store
    }

    pub async fn resolve(&self, coord: Coordinate) -> Result<Containment> {
        if let Some(subzone) = self.authoritative(coord).await {
            debug!("Authoritative containment hit: {}", subzone.id);
            return Ok(Containment::Exact {
                subzone,
                tier: ResolutionTier::Exact,
            });
        }

        let mut candidates: Vec<SubzoneSummary> = self
            .store
            .subzones()
            .await?
            .into_iter()
            .filter(|s| s.bbox.contains(&coord))
            .collect();
        candidates.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(
            "Bbox pre-filter at ({}, {}): {} candidates",
            coord.lat(),
            coord.lng(),
            candidates.len()
        );

        match candidates.len() {
            0 => Err(ResolveError::NotFound(format!(
                "no subzone contains ({}, {})",
                coord.lat(),
                coord.lng()
            ))),
            1 => Ok(Containment::Exact {
                subzone: candidates.remove(0),
                tier: ResolutionTier::BboxUnique,
            }),
            _ => {
                if let Some(index) = self.first_verified(&candidates, coord).await {
                    return Ok(Containment::Exact {
                        subzone: candidates.swap_remove(index),
                        tier: ResolutionTier::BboxVerified,
                    });
                }
                warn!(
                    "No bbox candidate confirmed at ({}, {}); guessing {}",
                    coord.lat(),
                    coord.lng(),
                    candidates[0].id
                );
                Ok(Containment::BestEffort {
                    subzone: candidates.remove(0),
                })
            }
        }
    }

    /// Authoritative lookup; any failure falls through to the bbox tier.
    async fn authoritative(&self, coord: Coordinate) -> Option<SubzoneSummary> {
        let ids = match self.store.subzones_containing(coord).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Authoritative containment unavailable: {}", e);
                return None;
            }
        };

        let id = ids.first()?;
        match self.store.subzone(id).await {
            Ok(Some(subzone)) => Some(subzone),
            Ok(None) => {
                warn!("Authoritative hit {} is missing from the subzone table", id);
                None
            }
            Err(e) => {
                warn!("Failed to load subzone {}: {}", id, e);
                None
            }
        }
    }

    /// Index of the first candidate, in slice order, confirmed by the
    /// per-candidate check.
    ///
    /// Checks run concurrently but results are consumed in order; the
    /// remaining checks are dropped once a winner is known.
    async fn first_verified(&self, candidates: &[SubzoneSummary], coord: Coordinate) -> Option<usize> {
        let ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();
        let mut checks = std::pin::pin!(stream::iter(ids.into_iter().enumerate())
            .map(|(index, id)| async move { (index, self.verify(&id, coord).await) })
            .buffered(self.max_concurrent_checks));

        while let Some((index, contained)) = checks.next().await {
            if contained {
                return Some(index);
            }
        }
        None
    }

    async fn verify(&self, subzone_id: &str, coord: Coordinate) -> bool {
        match self.store.subzone_contains(subzone_id, coord).await {
            Ok(contained) => contained,
            Err(e) => {
                warn!("Containment check for {} failed: {}", subzone_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::{Bbox, Confidence};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store double with scripted answers.
    #[derive(Default)]
    struct ScriptedStore {
        summaries: Vec<SubzoneSummary>,
        authoritative: Option<Vec<String>>,
        contains: HashMap<String, Result<bool, ()>>,
        fail_bulk: bool,
        checks: AtomicUsize,
    }

    #[async_trait]
    impl SubzoneStore for ScriptedStore {
        async fn subzones_containing(&self, _: Coordinate) -> Result<Vec<String>, StoreError> {
            self.authoritative
                .clone()
                .ok_or_else(|| StoreError::Unavailable("no authoritative lookup".into()))
        }

        async fn subzone_contains(&self, id: &str, _: Coordinate) -> Result<bool, StoreError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            match self.contains.get(id) {
                Some(Ok(v)) => Ok(*v),
                Some(Err(())) => Err(StoreError::Query("timeout".into())),
                None => Err(StoreError::Unavailable("no per-candidate check".into())),
            }
        }

        async fn subzones(&self) -> Result<Vec<SubzoneSummary>, StoreError> {
            if self.fail_bulk {
                return Err(StoreError::Query("connection reset".into()));
            }
            Ok(self.summaries.clone())
        }

        async fn subzone(&self, id: &str) -> Result<Option<SubzoneSummary>, StoreError> {
            Ok(self.summaries.iter().find(|s| s.id == id).cloned())
        }
    }

    fn summary(id: &str, bbox: Bbox) -> SubzoneSummary {
        SubzoneSummary {
            id: id.to_string(),
            name: id.to_uppercase(),
            planning_area_id: "PA".to_string(),
            region: "REGION".to_string(),
            bbox,
        }
    }

    fn overlapping() -> Vec<SubzoneSummary> {
        vec![
            summary("west", Bbox::new(1.30, 103.80, 1.40, 103.86)),
            summary("east", Bbox::new(1.30, 103.84, 1.40, 103.90)),
            summary("north", Bbox::new(1.45, 103.80, 1.49, 103.90)),
        ]
    }

    fn point() -> Coordinate {
        Coordinate::new(1.35, 103.85).unwrap()
    }

    fn resolver(store: ScriptedStore) -> ContainmentResolver {
        ContainmentResolver::new(Arc::new(store), 4)
    }

    #[tokio::test]
    async fn test_authoritative_hit_is_exact() {
        let store = ScriptedStore {
            summaries: overlapping(),
            authoritative: Some(vec!["west".into(), "east".into()]),
            ..Default::default()
        };
        let result = resolver(store).resolve(point()).await.unwrap();
        assert_eq!(result.tier(), ResolutionTier::Exact);
        assert_eq!(result.subzone().id, "west");
    }

    #[tokio::test]
    async fn test_unique_bbox_skips_verification() {
        let store = ScriptedStore {
            summaries: overlapping(),
            ..Default::default()
        };
        let store = Arc::new(store);
        let resolver = ContainmentResolver::new(store.clone(), 4);
        let coord = Coordinate::new(1.46, 103.85).unwrap();

        let result = resolver.resolve(coord).await.unwrap();
        assert_eq!(result.tier(), ResolutionTier::BboxUnique);
        assert_eq!(result.subzone().id, "north");
        assert_eq!(store.checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_overlap_returns_polygon_owner_not_scan_order() {
        // "east" sorts before "west"; only "west" actually contains the point
        let store = ScriptedStore {
            summaries: overlapping(),
            authoritative: Some(vec![]),
            contains: HashMap::from([("east".to_string(), Ok(false)), ("west".to_string(), Ok(true))]),
            ..Default::default()
        };
        let result = resolver(store).resolve(point()).await.unwrap();
        assert_eq!(result.tier(), ResolutionTier::BboxVerified);
        assert_eq!(result.subzone().id, "west");
        assert!(!result.is_best_effort());
    }

    #[tokio::test]
    async fn test_check_errors_are_swallowed() {
        let store = ScriptedStore {
            summaries: overlapping(),
            contains: HashMap::from([("east".to_string(), Err(())), ("west".to_string(), Ok(true))]),
            ..Default::default()
        };
        let result = resolver(store).resolve(point()).await.unwrap();
        assert_eq!(result.subzone().id, "west");
        assert_eq!(result.tier(), ResolutionTier::BboxVerified);
    }

    #[tokio::test]
    async fn test_all_checks_fail_is_best_effort() {
        let store = ScriptedStore {
            summaries: overlapping(),
            ..Default::default()
        };
        let result = resolver(store).resolve(point()).await.unwrap();
        assert!(result.is_best_effort());
        assert_eq!(result.tier(), ResolutionTier::BboxGuess);
        assert_eq!(result.subzone().id, "east");
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let store = ScriptedStore {
            summaries: overlapping(),
            authoritative: Some(vec![]),
            ..Default::default()
        };
        let coord = Coordinate::new(1.20, 103.60).unwrap();
        assert!(matches!(
            resolver(store).resolve(coord).await,
            Err(ResolveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_bulk_failure_is_internal() {
        let store = ScriptedStore {
            fail_bulk: true,
            ..Default::default()
        };
        assert!(matches!(
            resolver(store).resolve(point()).await,
            Err(ResolveError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_bbox_tier_never_outranks_authoritative() {
        let only_north = vec![summary("north", Bbox::new(1.45, 103.80, 1.49, 103.90))];
        let coord = Coordinate::new(1.46, 103.85).unwrap();

        let authoritative = resolver(ScriptedStore {
            summaries: only_north.clone(),
            authoritative: Some(vec!["north".into()]),
            ..Default::default()
        })
        .resolve(coord)
        .await
        .unwrap();

        let bbox = resolver(ScriptedStore {
            summaries: only_north,
            authoritative: None,
            ..Default::default()
        })
        .resolve(coord)
        .await
        .unwrap();

        assert_eq!(authoritative.subzone(), bbox.subzone());
        assert!(
            Confidence::from_tier(bbox.tier()) <= Confidence::from_tier(authoritative.tier())
        );
    }

    #[tokio::test]
    async fn test_deterministic_across_calls() {
        let store = Arc::new(ScriptedStore {
            summaries: overlapping(),
            contains: HashMap::from([("east".to_string(), Ok(true)), ("west".to_string(), Ok(true))]),
            ..Default::default()
        });
        let resolver = ContainmentResolver::new(store, 1);
        let first = resolver.resolve(point()).await.unwrap();
        for _ in 0..5 {
            assert_eq!(resolver.resolve(point()).await.unwrap(), first);
        }
        assert_eq!(first.subzone().id, "east");
    }
}
