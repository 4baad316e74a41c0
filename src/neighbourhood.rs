//! Neighbourhood mapping, free-text name matching and confidence scoring.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use hashbrown::HashMap;
use tracing::{debug, info, warn};

use crate::containment::Containment;
use crate::error::{ResolveError, Result};
use crate::models::{
    Confidence, Coordinate, Neighbourhood, ResolutionMethod, ResolvedAddress, SubzoneSummary,
};

/// Trim, upper-case and collapse whitespace.
pub fn normalize_name(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Symmetric substring rule on already-normalized strings.
pub fn names_match(query: &str, key: &str) -> bool {
    !query.is_empty() && !key.is_empty() && (query.contains(key) || key.contains(query))
}

/// How a free-text name matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatchKind {
    Exact,
    Substring,
}

impl NameMatchKind {
    pub fn confidence(self) -> Confidence {
        match self {
            NameMatchKind::Exact => Confidence::High,
            NameMatchKind::Substring => Confidence::Medium,
        }
    }
}

/// A neighbourhood matched by name.
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch<'a> {
    pub neighbourhood: &'a Neighbourhood,
    pub kind: NameMatchKind,
}

/// In-memory neighbourhood reference data with lookup indexes.
#[derive(Debug, Clone, Default)]
pub struct NeighbourhoodDirectory {
    neighbourhoods: Vec<Neighbourhood>,
    /// subzone id -> owning neighbourhood
    by_subzone: HashMap<String, usize>,
    /// normalized key -> first neighbourhood declaring it
    by_key: HashMap<String, usize>,
    /// (normalized key, neighbourhood) in load order, for the substring scan
    keys: Vec<(String, usize)>,
    max_candidates: usize,
}

impl NeighbourhoodDirectory {
    pub fn new(neighbourhoods: Vec<Neighbourhood>, max_candidates: usize) -> Self {
        let mut by_subzone: HashMap<String, usize> = HashMap::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();
        let mut keys = Vec::new();

        for (idx, hood) in neighbourhoods.iter().enumerate() {
            for subzone in hood.subzones() {
                match by_subzone.get(subzone) {
                    // A sealed neighbourhood takes over an unsealed claim
                    Some(&existing) if !neighbourhoods[existing].is_sealed() && hood.is_sealed() => {
                        by_subzone.insert(subzone.to_string(), idx);
                    }
                    Some(&existing) => {
                        if hood.is_sealed() && neighbourhoods[existing].is_sealed() {
                            warn!(
                                "Subzone {} claimed by sealed neighbourhoods {} and {}; keeping {}",
                                subzone, neighbourhoods[existing].id, hood.id, neighbourhoods[existing].id
                            );
                        }
                    }
                    None => {
                        by_subzone.insert(subzone.to_string(), idx);
                    }
                }
            }

            for key in hood.lookup_keys() {
                let key = normalize_name(key);
                if key.is_empty() {
                    continue;
                }
                by_key.entry(key.clone()).or_insert(idx);
                keys.push((key, idx));
            }
        }

        Self {
            neighbourhoods,
            by_subzone,
            by_key,
            keys,
            max_candidates: max_candidates.max(1),
        }
    }

    /// Load neighbourhoods from a JSON array file.
    pub fn load_from_file<P: AsRef<Path>>(path: P, max_candidates: usize) -> AnyResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read neighbourhoods file {}", path.display()))?;
        let neighbourhoods: Vec<Neighbourhood> =
            serde_json::from_str(&content).context("Failed to parse neighbourhoods file")?;
        info!(
            "Loaded {} neighbourhoods from {}",
            neighbourhoods.len(),
            path.display()
        );
        Ok(Self::new(neighbourhoods, max_candidates))
    }

    pub fn len(&self) -> usize {
        self.neighbourhoods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbourhoods.is_empty()
    }

    /// Owning neighbourhood of a subzone.
    pub fn for_subzone(&self, subzone_id: &str) -> Option<&Neighbourhood> {
        self.by_subzone
            .get(subzone_id)
            .map(|&idx| &self.neighbourhoods[idx])
    }

    /// Every neighbourhood matching a free-text query, best first.
    ///
    /// An exact normalized key wins outright; the rest follow in load order
    /// under the symmetric substring rule. Capped at `max_candidates`.
    pub fn match_names(&self, query: &str) -> Vec<NameMatch<'_>> {
        let query = normalize_name(query);
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<NameMatch<'_>> = Vec::new();
        let mut seen = Vec::new();

        if let Some(&idx) = self.by_key.get(&query) {
            matches.push(NameMatch {
                neighbourhood: &self.neighbourhoods[idx],
                kind: NameMatchKind::Exact,
            });
            seen.push(idx);
        }

        for (key, idx) in &self.keys {
            if matches.len() >= self.max_candidates {
                break;
            }
            if seen.contains(idx) || !names_match(&query, key) {
                continue;
            }
            seen.push(*idx);
            matches.push(NameMatch {
                neighbourhood: &self.neighbourhoods[*idx],
                kind: if *key == query {
                    NameMatchKind::Exact
                } else {
                    NameMatchKind::Substring
                },
            });
        }

        debug!("Name match for '{}': {} candidates", query, matches.len());
        matches
    }

    /// Build a resolved address from a containment result.
    pub fn map_containment(
        &self,
        query: &str,
        containment: &Containment,
        method: ResolutionMethod,
        coordinate: Coordinate,
        candidates: Vec<String>,
    ) -> Result<ResolvedAddress> {
        let subzone = containment.subzone();
        let hood = self.owner(subzone)?;
        let tier = containment.tier();

        Ok(ResolvedAddress {
            query: query.to_string(),
            subzone_id: subzone.id.clone(),
            subzone_name: subzone.name.clone(),
            neighbourhood_id: hood.id.clone(),
            neighbourhood_name: hood.name.clone(),
            confidence: Confidence::from_tier(tier),
            method,
            tier: Some(tier),
            best_effort: containment.is_best_effort(),
            coordinate: Some(coordinate),
            candidates,
        })
    }

    /// Build a resolved address from a name match.
    pub fn map_name_match(
        &self,
        query: &str,
        matched: &NameMatch<'_>,
        subzone: &SubzoneSummary,
        candidates: Vec<String>,
    ) -> ResolvedAddress {
        ResolvedAddress {
            query: query.to_string(),
            subzone_id: subzone.id.clone(),
            subzone_name: subzone.name.clone(),
            neighbourhood_id: matched.neighbourhood.id.clone(),
            neighbourhood_name: matched.neighbourhood.name.clone(),
            confidence: matched.kind.confidence(),
            method: ResolutionMethod::NameMatch,
            tier: None,
            best_effort: false,
            coordinate: None,
            candidates,
        }
    }

    fn owner(&self, subzone: &SubzoneSummary) -> Result<&Neighbourhood> {
        self.for_subzone(&subzone.id).ok_or_else(|| {
            ResolveError::NotFound(format!(
                "subzone {} ({}) has no neighbourhood",
                subzone.name, subzone.id
            ))
        })
    }
}

/// Short user-facing sentence describing a resolution.
pub fn confidence_message(confidence: Confidence, display_name: &str) -> String {
    match confidence {
        Confidence::High => format!("This address is in {}.", display_name),
        Confidence::Medium => format!("This address is most likely in {}.", display_name),
        Confidence::Low => format!(
            "We think this address is in {}, but couldn't confirm it. Please check the location.",
            display_name
        ),
    }
}
