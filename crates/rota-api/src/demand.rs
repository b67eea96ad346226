//! Handlers for `/demand/forecast` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/demand/forecast?week_start=<date>` | Backfills the week, then returns it |
//! | `POST` | `/demand/forecast` | Body: `{"week_start":"2025-03-03"}`; merges the ML forecast first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use rota_core::store::EntityStore;
use rota_engine::{
  SolverApi,
  demand::{ensure_demand, refresh_forecast},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct WeekParams {
  pub tenant:     Option<String>,
  pub week_start: Option<NaiveDate>,
}

/// `GET /demand/forecast?week_start=<date>`
///
/// Reading has a write side: missing (class, subject) rows are synthesized
/// before the week is returned, while stored values keep whatever the
/// operator or the forecaster last wrote.
pub async fn current<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Query(params): Query<WeekParams>,
) -> Result<Json<Value>, ApiError>
where
  S: EntityStore,
{
  let tenant = state.tenant(params.tenant.as_deref());
  let week_start = params
    .week_start
    .ok_or_else(|| ApiError::BadRequest("week_start required".to_string()))?;
  let items = ensure_demand(&state.store, tenant, week_start).await?;
  Ok(Json(json!({ "week_start": week_start, "items": items })))
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
  pub tenant:     Option<String>,
  pub week_start: Option<NaiveDate>,
}

/// `POST /demand/forecast` — body: `{"week_start":"2025-03-03"}`
///
/// Pulls fresh numbers from the forecasting service and merges them in;
/// a down forecaster degrades to the plain backfill. `count` is the number
/// of demand rows the week holds afterwards, not the number of forecast
/// items received.
pub async fn refresh<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Json(body): Json<RefreshBody>,
) -> Result<Json<Value>, ApiError>
where
  S: EntityStore,
  C: SolverApi,
{
  let tenant = state.tenant(body.tenant.as_deref());
  let week_start = body
    .week_start
    .ok_or_else(|| ApiError::BadRequest("week_start required".to_string()))?;
  let rows = refresh_forecast(&state.store, &state.solver, tenant, week_start).await?;
  Ok(Json(json!({ "ok": true, "week_start": week_start, "count": rows.len() })))
}
