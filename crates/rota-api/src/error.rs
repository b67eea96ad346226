//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use rota_engine::UnmappedRef;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A solve is already in flight for the requested (tenant, week).
  #[error("conflict: {0}")]
  Busy(String),

  /// The solve instance referenced rows that do not exist in this tenant.
  #[error("solve instance has {} unmapped reference(s)", .0.len())]
  Validation(Vec<UnmappedRef>),

  /// The external solver was unreachable or broke the wire contract.
  #[error("solver error: {0}")]
  Solver(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Busy(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Validation(refs) => {
        return (
          StatusCode::BAD_REQUEST,
          Json(json!({ "error": "unmapped references", "details": refs })),
        )
          .into_response();
      }
      ApiError::Solver(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<rota_engine::Error> for ApiError {
  fn from(e: rota_engine::Error) -> Self {
    match e {
      rota_engine::Error::Store(e) => ApiError::Store(e),
      busy @ rota_engine::Error::Busy { .. } => ApiError::Busy(busy.to_string()),
      rota_engine::Error::Validation(refs) => ApiError::Validation(refs),
      rota_engine::Error::Solver(e) => ApiError::Solver(e.to_string()),
      rota_engine::Error::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
    }
  }
}
