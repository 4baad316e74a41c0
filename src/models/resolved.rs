//! Resolution results and confidence tiers.

use serde::Serialize;
use std::fmt;

use super::Coordinate;

/// Which containment tier produced a subzone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// Authoritative point-in-polygon hit
    Exact,
    /// Only one bounding box contained the point
    BboxUnique,
    /// Several bounding boxes, confirmed by a per-candidate check
    BboxVerified,
    /// Several bounding boxes, no candidate confirmed
    BboxGuess,
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionTier::Exact => write!(f, "exact"),
            ResolutionTier::BboxUnique => write!(f, "bbox_unique"),
            ResolutionTier::BboxVerified => write!(f, "bbox_verified"),
            ResolutionTier::BboxGuess => write!(f, "bbox_guess"),
        }
    }
}

/// Coarse reliability of a resolution.
///
/// Ordered so that `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_tier(tier: ResolutionTier) -> Self {
        match tier {
            ResolutionTier::Exact | ResolutionTier::BboxUnique => Confidence::High,
            ResolutionTier::BboxVerified => Confidence::Medium,
            ResolutionTier::BboxGuess => Confidence::Low,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// How the coordinate (or entity) behind a resolution was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    PostalGeocode,
    AddressGeocode,
    StreetInference,
    NameMatch,
}

/// Final output of the pipeline for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAddress {
    pub query: String,
    pub subzone_id: String,
    pub subzone_name: String,
    pub neighbourhood_id: String,
    pub neighbourhood_name: String,
    pub confidence: Confidence,
    pub method: ResolutionMethod,
    /// Containment tier, absent for name matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<ResolutionTier>,
    /// Set when no tier confirmed the subzone and it was guessed
    pub best_effort: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    /// Ordered alternates, selectable by index
    pub candidates: Vec<String>,
}
