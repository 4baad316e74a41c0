//! Resolution pipeline orchestration.
//!
//! `raw query -> classify -> {geocode | street inference | name match}
//! -> containment -> neighbourhood -> ResolvedAddress`

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::classify::{classify, Query, QueryKind};
use crate::config::ResolverConfig;
use crate::containment::ContainmentResolver;
use crate::error::{ResolveError, Result};
use crate::geocoder::{GeocodeCandidate, Geocoder};
use crate::models::{ResolutionMethod, ResolvedAddress, SubzoneSummary};
use crate::neighbourhood::NeighbourhoodDirectory;
use crate::store::{SubzoneStore, TransactionStore};
use crate::street::StreetInferrer;

/// Stateless resolver over explicitly injected collaborators.
pub struct AddressResolver {
    geocoder: Arc<dyn Geocoder>,
    containment: ContainmentResolver,
    streets: StreetInferrer,
    neighbourhoods: NeighbourhoodDirectory,
    cache: TtlCache<(String, usize), ResolvedAddress>,
}

impl AddressResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        subzones: Arc<dyn SubzoneStore>,
        transactions: Arc<dyn TransactionStore>,
        neighbourhoods: NeighbourhoodDirectory,
        config: &ResolverConfig,
    ) -> Self {
        let containment = ContainmentResolver::new(subzones, config.max_concurrent_checks);
        let streets = StreetInferrer::new(
            transactions,
            containment.clone(),
            config.street_row_limit,
            config.max_concurrent_checks,
        );

        Self {
            geocoder,
            containment,
            streets,
            neighbourhoods,
            cache: TtlCache::new(config.cache_ttl()),
        }
    }

    pub fn neighbourhoods(&self) -> &NeighbourhoodDirectory {
        &self.neighbourhoods
    }

    pub fn cache(&self) -> &TtlCache<(String, usize), ResolvedAddress> {
        &self.cache
    }

    /// Find the subzone for a postal code or street name.
    ///
    /// Free text is rejected; it has no single subzone search strategy.
    pub async fn search_subzone(&self, kind: QueryKind, raw: &str) -> Result<SubzoneSummary> {
        let query = classify(raw, Some(kind))?;
        debug!("Subzone search ({:?}): '{}'", query.kind, query.text);

        let containment = match query.kind {
            QueryKind::Street => self.streets.resolve(&query.text).await?.containment,
            QueryKind::Postal => {
                let candidates = self.geocoder.geocode(&query.text).await?;
                let first = pick(&candidates, 0)?;
                self.containment.resolve(first.coordinate).await?
            }
            QueryKind::FreeText => {
                return Err(ResolveError::InvalidInput(
                    "subzone search type must be 'postal' or 'street'".to_string(),
                ))
            }
        };

        Ok(containment.into_subzone())
    }

    /// Resolve a free-form address or postal code into a neighbourhood.
    ///
    /// `candidate_index` selects among the ranked alternatives of whichever
    /// strategy answers the query; the strategy itself does not depend on it.
    pub async fn resolve_address(
        &self,
        raw: &str,
        candidate_index: Option<usize>,
    ) -> Result<ResolvedAddress> {
        let query = classify(raw, None)?;
        let index = candidate_index.unwrap_or(0);
        let key = (query.text.clone(), index);

        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for '{}' #{}", query.text, index);
            return Ok(cached);
        }

        let resolved = self.resolve_uncached(&query, index).await?;
        info!(
            "Resolved '{}' -> {} / {} ({}, {:?})",
            query.text,
            resolved.subzone_id,
            resolved.neighbourhood_id,
            resolved.confidence,
            resolved.method
        );

        self.cache.insert(key, resolved.clone());
        Ok(resolved)
    }

    async fn resolve_uncached(&self, query: &Query, index: usize) -> Result<ResolvedAddress> {
        let method = match query.kind {
            QueryKind::Postal => ResolutionMethod::PostalGeocode,
            _ => ResolutionMethod::AddressGeocode,
        };

        let err = match self.geocoder.geocode(&query.text).await {
            Ok(candidates) => return self.from_geocode(query, &candidates, index, method).await,
            Err(e) => ResolveError::from(e),
        };

        // Postal codes have no further strategy; other failures are real errors
        if query.kind == QueryKind::Postal || !err.is_no_match() {
            return Err(err);
        }
        debug!("Geocoding '{}' failed ({}); trying street inference", query.text, err);

        match self.streets.resolve(&query.text).await {
            Ok(street) => {
                if index != 0 {
                    return Err(out_of_range(index));
                }
                return self.neighbourhoods.map_containment(
                    &query.text,
                    &street.containment,
                    ResolutionMethod::StreetInference,
                    street.coordinate,
                    vec![street.street],
                );
            }
            Err(e) if e.is_no_match() || matches!(e, ResolveError::InvalidInput(_)) => {
                debug!("Street inference for '{}' failed: {}", query.text, e);
            }
            Err(e) => return Err(e),
        }

        self.from_name_match(query, index).await
    }

    async fn from_geocode(
        &self,
        query: &Query,
        candidates: &[GeocodeCandidate],
        index: usize,
        method: ResolutionMethod,
    ) -> Result<ResolvedAddress> {
        let chosen = pick(candidates, index)?;
        let containment = self.containment.resolve(chosen.coordinate).await?;
        let labels = candidates
            .iter()
            .map(|c| c.formatted_address.clone())
            .collect();

        self.neighbourhoods.map_containment(
            &query.text,
            &containment,
            method,
            chosen.coordinate,
            labels,
        )
    }

    async fn from_name_match(&self, query: &Query, index: usize) -> Result<ResolvedAddress> {
        let matches = self.neighbourhoods.match_names(&query.text);
        if matches.is_empty() {
            return Err(ResolveError::NotFound(format!(
                "nothing matches '{}'",
                query.text
            )));
        }
        let chosen = matches.get(index).ok_or_else(|| out_of_range(index))?;

        let subzone_id = &chosen.neighbourhood.parent_subzone_id;
        let subzone = self
            .containment
            .store()
            .subzone(subzone_id)
            .await?
            .ok_or_else(|| {
                ResolveError::NotFound(format!(
                    "neighbourhood {} refers to unknown subzone {}",
                    chosen.neighbourhood.id, subzone_id
                ))
            })?;

        let labels = matches
            .iter()
            .map(|m| m.neighbourhood.name.clone())
            .collect();
        Ok(self
            .neighbourhoods
            .map_name_match(&query.text, chosen, &subzone, labels))
    }
}

fn pick(candidates: &[GeocodeCandidate], index: usize) -> Result<&GeocodeCandidate> {
    candidates.get(index).ok_or_else(|| out_of_range(index))
}

fn out_of_range(index: usize) -> ResolveError {
    ResolveError::NotFound(format!("candidate index {} is out of range", index))
}
