//! Error taxonomy for the resolution pipeline.

use thiserror::Error;

/// Errors surfaced by the resolution pipeline.
///
/// Each variant maps onto one HTTP status in [`ResolveError::status_code`].
/// Provider-side failures (`UpstreamFailure`, `InvalidResult`) are reported to
/// callers exactly like `NotFound`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Malformed postal code, missing/empty query, unknown declared type.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Nothing could be resolved at any tier.
    #[error("not found: {0}")]
    NotFound(String),

    /// Geocoding provider unreachable or returned a non-success status.
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    /// Provider returned coordinates that are not usable.
    #[error("invalid result: {0}")]
    InvalidResult(String),

    /// Store failure or unexpected internal state.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResolveError {
    /// HTTP status code for this error at the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            ResolveError::InvalidInput(_) => 400,
            ResolveError::NotFound(_)
            | ResolveError::UpstreamFailure(_)
            | ResolveError::InvalidResult(_) => 404,
            ResolveError::Internal(_) => 500,
        }
    }

    /// Whether a fallback strategy may be attempted after this error.
    pub fn is_no_match(&self) -> bool {
        matches!(
            self,
            ResolveError::NotFound(_)
                | ResolveError::UpstreamFailure(_)
                | ResolveError::InvalidResult(_)
        )
    }
}

/// Failure inside one of the read-only reference stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store does not offer the requested capability.
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The store failed while serving the request.
    #[error("store query failed: {0}")]
    Query(String),
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        ResolveError::Internal(err.to_string())
    }
}

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
