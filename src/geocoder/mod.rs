//! Geocoding adapter.
//!
//! Converts postal codes and free-text addresses into coordinates through an
//! external provider. One attempt per query, no retries: a provider outage is
//! reported as [`GeocodeError::Upstream`] and the pipeline treats it like a
//! miss.

mod onemap;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ResolveError;
use crate::models::Coordinate;

pub use onemap::OneMapClient;

/// One ranked geocoder result.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub coordinate: Coordinate,
    pub formatted_address: String,
    pub postal: Option<String>,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Provider reported zero results.
    #[error("no geocoding results for '{0}'")]
    NotFound(String),

    /// Provider unreachable.
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("geocoding provider returned status {0}")]
    Status(u16),

    /// Coordinates in the first-ranked result are unusable.
    #[error("invalid geocoding result: {message}")]
    InvalidResult { message: String },
}

impl From<GeocodeError> for ResolveError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound(_) => ResolveError::NotFound(err.to_string()),
            GeocodeError::Http(_) | GeocodeError::Status(_) => {
                ResolveError::UpstreamFailure(err.to_string())
            }
            GeocodeError::InvalidResult { .. } => ResolveError::InvalidResult(err.to_string()),
        }
    }
}

/// External geocoding provider.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocode a postal code or address.
    ///
    /// On success the list is non-empty and ranked; index 0 is the
    /// provider's first-ranked result and always carries a valid coordinate.
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let err: ResolveError = GeocodeError::NotFound("x".into()).into();
        assert!(matches!(err, ResolveError::NotFound(_)));

        let err: ResolveError = GeocodeError::Status(503).into();
        assert!(matches!(err, ResolveError::UpstreamFailure(_)));

        let err: ResolveError = GeocodeError::InvalidResult {
            message: "lat".into(),
        }
        .into();
        assert!(matches!(err, ResolveError::InvalidResult(_)));
    }
}
