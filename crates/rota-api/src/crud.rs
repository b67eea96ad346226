//! Handlers for `/crud/{entity}` endpoints.
//!
//! One surface covers every editable collection: classes, subjects,
//! teachers, rooms, the relation edges, the availability grids, demand
//! rows, and penalty weights. Collections with a natural key (availability
//! slots, demand rows, penalties) treat create as an upsert, so repeating
//! a request converges on one row instead of duplicating.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/crud/:entity` | `?q=`, `?limit=`, `?offset=`; `?week_start=` on demand rows |
//! | `POST`   | `/crud/:entity` | 201 with the stored row |
//! | `GET`    | `/crud/:entity/:id` | 404 if not found |
//! | `PUT`    | `/crud/:entity/:id` | Partial update; 404 if not found |
//! | `DELETE` | `/crud/:entity/:id` | 204; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rota_core::{
  entities::{
    Class, ClassSubject, DemandForecast, Penalties, Record, Room, RoomAvailability, Subject,
    Teacher, TeacherAvailability, TeacherSubject,
  },
  id::EntityId,
  store::{EntityStore, Filter, ListQuery, Patch},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{ApiState, error::ApiError};

/// Rows returned by a list request when the client sends no `limit`.
const DEFAULT_LIMIT: usize = 1000;

// ─── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub tenant:     Option<String>,
  pub q:          Option<String>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
  pub week_start: Option<NaiveDate>,
}

impl ListParams {
  /// Narrowing rules vary by collection: `q` searches only rows that have a
  /// name, and `week_start` scopes only demand rows.
  fn query(&self, entity: &str) -> ListQuery {
    let mut filter = Filter::new();
    if entity == DemandForecast::COLLECTION {
      if let Some(week) = self.week_start {
        filter = filter.eq("week_start", week.to_string());
      }
    }
    let name_contains = match entity {
      "subjects" | "teachers" => self.q.clone(),
      _ => None,
    };
    ListQuery {
      filter,
      name_contains,
      limit: Some(self.limit.unwrap_or(DEFAULT_LIMIT)),
      offset: self.offset,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct TenantParam {
  pub tenant: Option<String>,
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /crud/:entity`
pub async fn list<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Path(entity): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Response, ApiError>
where
  S: EntityStore,
{
  let tenant = state.tenant(params.tenant.as_deref());
  let store = &state.store;
  let query = params.query(&entity);
  match entity.as_str() {
    "classes" => list_rows::<Class, S>(store, tenant, &query).await,
    "subjects" => list_rows::<Subject, S>(store, tenant, &query).await,
    "teachers" => list_rows::<Teacher, S>(store, tenant, &query).await,
    "rooms" => list_rows::<Room, S>(store, tenant, &query).await,
    "teacher_subjects" => list_rows::<TeacherSubject, S>(store, tenant, &query).await,
    "class_subjects" => list_rows::<ClassSubject, S>(store, tenant, &query).await,
    "availability_teacher" => list_rows::<TeacherAvailability, S>(store, tenant, &query).await,
    "availability_room" => list_rows::<RoomAvailability, S>(store, tenant, &query).await,
    "demand_forecast" => list_rows::<DemandForecast, S>(store, tenant, &query).await,
    "penalties" => list_rows::<Penalties, S>(store, tenant, &query).await,
    other => Err(unknown_entity(other)),
  }
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /crud/:entity`
pub async fn create<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Path(entity): Path<String>,
  Query(params): Query<TenantParam>,
  Json(body): Json<Value>,
) -> Result<Response, ApiError>
where
  S: EntityStore,
{
  let tenant = state.tenant(params.tenant.as_deref());
  let store = &state.store;
  match entity.as_str() {
    "classes" => insert_row::<Class, S>(store, tenant, body).await,
    "subjects" => insert_row::<Subject, S>(store, tenant, body).await,
    "teachers" => insert_row::<Teacher, S>(store, tenant, body).await,
    "rooms" => insert_row::<Room, S>(store, tenant, body).await,
    "teacher_subjects" => insert_row::<TeacherSubject, S>(store, tenant, body).await,
    "class_subjects" => insert_row::<ClassSubject, S>(store, tenant, body).await,
    "availability_teacher" => {
      upsert_row::<TeacherAvailability, S>(store, tenant, body, &["teacher_id", "day", "period"])
        .await
    }
    "availability_room" => {
      upsert_row::<RoomAvailability, S>(store, tenant, body, &["room_id", "day", "period"]).await
    }
    "demand_forecast" => {
      upsert_row::<DemandForecast, S>(store, tenant, body, &["week_start", "class_id", "subject_id"])
        .await
    }
    // One weights row per tenant; an empty key always addresses it.
    "penalties" => upsert_row::<Penalties, S>(store, tenant, body, &[]).await,
    other => Err(unknown_entity(other)),
  }
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /crud/:entity/:id`
pub async fn get_one<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Path((entity, id)): Path<(String, String)>,
  Query(params): Query<TenantParam>,
) -> Result<Response, ApiError>
where
  S: EntityStore,
{
  let tenant = state.tenant(params.tenant.as_deref());
  let store = &state.store;
  let id = EntityId::parse(&id);
  match entity.as_str() {
    "classes" => get_row::<Class, S>(store, tenant, &id).await,
    "subjects" => get_row::<Subject, S>(store, tenant, &id).await,
    "teachers" => get_row::<Teacher, S>(store, tenant, &id).await,
    "rooms" => get_row::<Room, S>(store, tenant, &id).await,
    "teacher_subjects" => get_row::<TeacherSubject, S>(store, tenant, &id).await,
    "class_subjects" => get_row::<ClassSubject, S>(store, tenant, &id).await,
    "availability_teacher" => get_row::<TeacherAvailability, S>(store, tenant, &id).await,
    "availability_room" => get_row::<RoomAvailability, S>(store, tenant, &id).await,
    "demand_forecast" => get_row::<DemandForecast, S>(store, tenant, &id).await,
    "penalties" => get_row::<Penalties, S>(store, tenant, &id).await,
    other => Err(unknown_entity(other)),
  }
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /crud/:entity/:id` — partial update; absent fields keep their value.
pub async fn update_one<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Path((entity, id)): Path<(String, String)>,
  Query(params): Query<TenantParam>,
  Json(body): Json<Value>,
) -> Result<Response, ApiError>
where
  S: EntityStore,
{
  let tenant = state.tenant(params.tenant.as_deref());
  let store = &state.store;
  let id = EntityId::parse(&id);
  let patch = patch_from(body)?;
  match entity.as_str() {
    "classes" => update_row::<Class, S>(store, tenant, &id, &patch).await,
    "subjects" => update_row::<Subject, S>(store, tenant, &id, &patch).await,
    "teachers" => update_row::<Teacher, S>(store, tenant, &id, &patch).await,
    "rooms" => update_row::<Room, S>(store, tenant, &id, &patch).await,
    "teacher_subjects" => update_row::<TeacherSubject, S>(store, tenant, &id, &patch).await,
    "class_subjects" => update_row::<ClassSubject, S>(store, tenant, &id, &patch).await,
    "availability_teacher" => {
      update_row::<TeacherAvailability, S>(store, tenant, &id, &patch).await
    }
    "availability_room" => update_row::<RoomAvailability, S>(store, tenant, &id, &patch).await,
    "demand_forecast" => update_row::<DemandForecast, S>(store, tenant, &id, &patch).await,
    "penalties" => update_row::<Penalties, S>(store, tenant, &id, &patch).await,
    other => Err(unknown_entity(other)),
  }
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /crud/:entity/:id`
///
/// Deletion does not cascade; edges left dangling surface as unmapped
/// references when the next solve validates its instance.
pub async fn delete_one<S, C>(
  State(state): State<Arc<ApiState<S, C>>>,
  Path((entity, id)): Path<(String, String)>,
  Query(params): Query<TenantParam>,
) -> Result<Response, ApiError>
where
  S: EntityStore,
{
  let tenant = state.tenant(params.tenant.as_deref());
  let store = &state.store;
  let id = EntityId::parse(&id);
  match entity.as_str() {
    "classes" => delete_row::<Class, S>(store, tenant, &id).await,
    "subjects" => delete_row::<Subject, S>(store, tenant, &id).await,
    "teachers" => delete_row::<Teacher, S>(store, tenant, &id).await,
    "rooms" => delete_row::<Room, S>(store, tenant, &id).await,
    "teacher_subjects" => delete_row::<TeacherSubject, S>(store, tenant, &id).await,
    "class_subjects" => delete_row::<ClassSubject, S>(store, tenant, &id).await,
    "availability_teacher" => delete_row::<TeacherAvailability, S>(store, tenant, &id).await,
    "availability_room" => delete_row::<RoomAvailability, S>(store, tenant, &id).await,
    "demand_forecast" => delete_row::<DemandForecast, S>(store, tenant, &id).await,
    "penalties" => delete_row::<Penalties, S>(store, tenant, &id).await,
    other => Err(unknown_entity(other)),
  }
}

// ─── Row helpers ──────────────────────────────────────────────────────────────

fn unknown_entity(entity: &str) -> ApiError {
  ApiError::NotFound(format!("unknown entity {entity}"))
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
  serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn patch_from(body: Value) -> Result<Patch, ApiError> {
  match body {
    Value::Object(fields) => Ok(Patch(fields)),
    _ => Err(ApiError::BadRequest("body must be a JSON object".to_string())),
  }
}

/// Serialize a draft back into its stored field map.
fn to_document<T: serde::Serialize>(draft: &T) -> Result<Map<String, Value>, ApiError> {
  match serde_json::to_value(draft) {
    Ok(Value::Object(doc)) => Ok(doc),
    Ok(_) => Err(ApiError::BadRequest("body must be a JSON object".to_string())),
    Err(e) => Err(ApiError::Store(Box::new(e))),
  }
}

async fn list_rows<R, S>(store: &S, tenant: &str, query: &ListQuery) -> Result<Response, ApiError>
where
  R: Record,
  S: EntityStore,
{
  let rows: Vec<R> = store
    .list(tenant, query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(rows).into_response())
}

async fn get_row<R, S>(store: &S, tenant: &str, id: &EntityId) -> Result<Response, ApiError>
where
  R: Record,
  S: EntityStore,
{
  let row: R = store
    .get(tenant, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("{} {id} not found", R::COLLECTION)))?;
  Ok(Json(row).into_response())
}

async fn insert_row<R, S>(store: &S, tenant: &str, body: Value) -> Result<Response, ApiError>
where
  R: Record,
  S: EntityStore,
{
  let draft: R::New = decode(body)?;
  let row: R = store
    .insert(tenant, &draft)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// Create-or-replace on the collection's natural key. The body is narrowed
/// through the draft type first, so ids and stray fields never reach the
/// store.
async fn upsert_row<R, S>(
  store: &S,
  tenant: &str,
  body: Value,
  key_fields: &[&str],
) -> Result<Response, ApiError>
where
  R: Record,
  S: EntityStore,
{
  let draft: R::New = decode(body)?;
  let doc = to_document(&draft)?;
  let mut key = Filter::new();
  for field in key_fields {
    key = key.eq(*field, doc.get(*field).cloned().unwrap_or(Value::Null));
  }
  let row: R = store
    .upsert(tenant, &key, &Patch(doc))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(row)).into_response())
}

async fn update_row<R, S>(
  store: &S,
  tenant: &str,
  id: &EntityId,
  patch: &Patch,
) -> Result<Response, ApiError>
where
  R: Record,
  S: EntityStore,
{
  let row: R = store
    .update(tenant, id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("{} {id} not found", R::COLLECTION)))?;
  Ok(Json(row).into_response())
}

async fn delete_row<R, S>(store: &S, tenant: &str, id: &EntityId) -> Result<Response, ApiError>
where
  R: Record,
  S: EntityStore,
{
  let deleted = store
    .delete::<R>(tenant, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if deleted {
    Ok(StatusCode::NO_CONTENT.into_response())
  } else {
    Err(ApiError::NotFound(format!("{} {id} not found", R::COLLECTION)))
  }
}
