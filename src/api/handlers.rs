//! Request handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use super::AppState;
use crate::classify::QueryKind;
use crate::error::ResolveError;
use crate::models::{ResolvedAddress, SubzoneInfo};
use crate::neighbourhood::confidence_message;

/// Error body: `{"error": ..., "detail"?: ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            ResolveError::Internal(_) => {
                error!("Resolution failed: {}", err);
                Self {
                    status,
                    message: "internal error".to_string(),
                    detail: Some(err.to_string()),
                }
            }
            ResolveError::InvalidInput(_) => Self {
                status,
                message: err.to_string(),
                detail: None,
            },
            _ => Self {
                status,
                message: "no matching location found".to_string(),
                detail: Some(err.to_string()),
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub resolved_address: ResolvedAddress,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub subzone: SubzoneInfo,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    neighbourhoods: usize,
    cached_resolutions: usize,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        neighbourhoods: state.resolver.neighbourhoods().len(),
        cached_resolutions: state.resolver.cache().len(),
    })
}

/// `POST /address/resolve` with `{query, candidateIndex?}`
pub async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let query = string_field(&body, "query")?;
    let candidate_index = match body.get("candidateIndex") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => match (n.as_u64(), n.as_i64()) {
            (Some(i), _) => Some(usize::try_from(i).unwrap_or(usize::MAX)),
            // Negative indexes can never select anything
            (None, Some(_)) => {
                return Err(ResolveError::NotFound("candidate index is out of range".into()).into())
            }
            _ => return Err(ApiError::bad_request("candidateIndex must be an integer")),
        },
        Some(_) => return Err(ApiError::bad_request("candidateIndex must be an integer")),
    };

    let resolved = state
        .resolver
        .resolve_address(query, candidate_index)
        .await?;
    let message = confidence_message(resolved.confidence, &resolved.neighbourhood_name);

    Ok(Json(ResolveResponse {
        resolved_address: resolved,
        message,
    }))
}

/// `POST /subzones/search` with `{type: "postal"|"street", query}`
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let kind: QueryKind = match body.get("type").and_then(Value::as_str) {
        Some(kind) => kind.parse()?,
        None => return Err(ApiError::bad_request("type must be 'postal' or 'street'")),
    };
    let query = string_field(&body, "query")?;

    let subzone = state.resolver.search_subzone(kind, query).await?;
    Ok(Json(SearchResponse {
        subzone: SubzoneInfo::from(&subzone),
    }))
}

fn string_field<'a>(body: &'a Value, field: &str) -> Result<&'a str, ApiError> {
    match body.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        Some(_) => Err(ApiError::bad_request(format!("{} must not be empty", field))),
        None => Err(ApiError::bad_request(format!("{} must be a string", field))),
    }
}
