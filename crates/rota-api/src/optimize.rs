//! Handlers for `/optimize` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/optimize/solve` | Body: `{"week_start":"2025-03-03","strict":true}` |
//! | `GET`  | `/optimize/solution/:id` | Optional `?teacher_id=`; 404 if unknown |
//! | `POST` | `/optimize/lock` | 201 with the stored lock |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use rota_core::{
  entities::NewHardLock,
  id::EntityId,
  store::EntityStore,
};
use rota_engine::{
  SolveOutcome, SolverApi, enrich::enriched_solution, locks::add_lock, run_solve,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError};

// ─── Solve ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SolveBody {
  pub tenant:     Option<String>,
  pub week_start: Option<NaiveDate>,
  pub strict:     Option<bool>,
}

/// `POST /optimize/solve` — body: `{"week_start":"2025-03-03","strict":true}`
///
/// Runs the full pipeline for the requested week. An infeasible instance
/// is a normal reply (`ok: false`), not an error; a solve already running
/// for the same (tenant, week) is refused with 409.
pub async fn solve<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Json(body): Json<SolveBody>,
) -> Result<Json<Value>, ApiError>
where
  S: EntityStore,
  C: SolverApi,
{
  let tenant = state.tenant(body.tenant.as_deref());
  let week_start = body
    .week_start
    .ok_or_else(|| ApiError::BadRequest("week_start required".to_string()))?;
  let strict = body.strict.unwrap_or(true);

  let outcome = run_solve(&state.store, &state.solver, &state.gate, tenant, week_start, strict)
    .await?;
  let reply = match outcome {
    SolveOutcome::Solved { solution_id, objective } => json!({
      "ok": true,
      "week_start": week_start,
      "solution_id": solution_id,
      "objective": objective,
    }),
    SolveOutcome::Infeasible => json!({
      "ok": false,
      "message": "No feasible solution",
      "solution_id": null,
    }),
  };
  Ok(Json(reply))
}

// ─── Solution ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SolutionParams {
  pub tenant:     Option<String>,
  pub teacher_id: Option<String>,
}

/// `GET /optimize/solution/:id[?teacher_id=<id>]`
///
/// Rows come back labelled and ordered for display; `teacher_id` narrows
/// them to one teacher's personal timetable.
pub async fn solution<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Path(id): Path<String>,
  Query(params): Query<SolutionParams>,
) -> Result<Json<Value>, ApiError>
where
  S: EntityStore,
{
  let tenant = state.tenant(params.tenant.as_deref());
  let teacher = params.teacher_id.as_deref().map(EntityId::parse);
  let rows = enriched_solution(&state.store, tenant, &id, teacher.as_ref()).await?;
  Ok(Json(json!({ "rows": rows })))
}

// ─── Lock ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LockBody {
  pub tenant:     Option<String>,
  pub week_start: Option<NaiveDate>,
  pub class_id:   EntityId,
  pub subject_id: EntityId,
  pub teacher_id: EntityId,
  pub room_id:    EntityId,
  pub day:        u8,
  pub period:     u8,
}

/// `POST /optimize/lock` — pins (class, subject, teacher, room) to a slot.
///
/// The lock binds every later solve for its week until the data changes;
/// there is no unlock endpoint.
pub async fn lock<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Json(body): Json<LockBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EntityStore,
{
  let tenant = state.tenant(body.tenant.as_deref());
  let week_start = body
    .week_start
    .ok_or_else(|| ApiError::BadRequest("week_start required".to_string()))?;
  let draft = NewHardLock {
    week_start,
    class_id: body.class_id,
    subject_id: body.subject_id,
    teacher_id: body.teacher_id,
    room_id: body.room_id,
    day: body.day,
    period: body.period,
  };
  let lock = add_lock(&state.store, tenant, &draft).await?;
  Ok((StatusCode::CREATED, Json(lock)))
}
