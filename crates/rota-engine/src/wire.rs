//! Wire types for the external optimization service.
//!
//! Every cross-referencing id field carries a dense `1..=N` index assigned
//! for one solve, never a native store id. Flags the solver reads as counts
//! (`is_lab`, `available`) travel as 0/1 integers; `hard_lock` in returned
//! assignments is a JSON boolean. Dates serialize as `YYYY-MM-DD`.

use chrono::NaiveDate;
use rota_core::id::EntityId;
use serde::{Deserialize, Serialize};

// ─── Solve request ───────────────────────────────────────────────────────────

/// One complete normalized instance, submitted as `POST /optimize/solve`.
#[derive(Debug, Clone, Serialize)]
pub struct SolveRequest {
  pub tenant:               String,
  pub week_start:           NaiveDate,
  pub strict:               bool,
  pub classes:              Vec<WireClass>,
  pub subjects:             Vec<WireSubject>,
  pub teachers:             Vec<WireTeacher>,
  pub rooms:                Vec<WireRoom>,
  pub teacher_subjects:     Vec<WireTeacherSubject>,
  pub class_subjects:       Vec<WireClassSubject>,
  pub availability_teacher: Vec<WireTeacherSlot>,
  pub availability_room:    Vec<WireRoomSlot>,
  pub demand:               Vec<WireDemand>,
  pub locks:                Vec<WireLock>,
  pub penalties:            WirePenalties,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireClass {
  pub id:      i64,
  pub code:    String,
  pub section: String,
  pub size:    i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireSubject {
  pub id:     i64,
  pub code:   String,
  pub name:   String,
  pub is_lab: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireTeacher {
  pub id:                   i64,
  pub name:                 String,
  pub max_periods_per_day:  i64,
  pub max_periods_per_week: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireRoom {
  pub id:       i64,
  pub code:     String,
  pub capacity: i64,
  pub is_lab:   u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireTeacherSubject {
  pub teacher_id: i64,
  pub subject_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireClassSubject {
  pub class_id:   i64,
  pub subject_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireTeacherSlot {
  pub teacher_id: i64,
  pub day:        u8,
  pub period:     u8,
  pub available:  u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireRoomSlot {
  pub room_id:   i64,
  pub day:       u8,
  pub period:    u8,
  pub available: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireDemand {
  pub class_id:         i64,
  pub subject_id:       i64,
  pub periods_required: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireLock {
  pub class_id:   i64,
  pub subject_id: i64,
  pub teacher_id: i64,
  pub room_id:    i64,
  pub day:        u8,
  pub period:     u8,
}

/// Soft-constraint weights. [`Default`] carries the provisioning weights,
/// used whenever a tenant has no penalties row.
#[derive(Debug, Clone, Serialize)]
pub struct WirePenalties {
  pub teacher_gap:    i64,
  pub uneven_subject: i64,
  pub room_mismatch:  i64,
  pub early_or_late:  i64,
}

impl Default for WirePenalties {
  fn default() -> Self {
    Self { teacher_gap: 3, uneven_subject: 2, room_mismatch: 4, early_or_late: 1 }
  }
}

// ─── Solve response ──────────────────────────────────────────────────────────

/// Solver verdict. `solution_id: None` means the instance was infeasible.
#[derive(Debug, Clone, Deserialize)]
pub struct SolveResponse {
  pub solution_id: Option<String>,
  #[serde(default)]
  pub objective:   Option<f64>,
  #[serde(default)]
  pub assignments: Vec<WireAssignment>,
}

/// One scheduled slot, still in dense-id space.
#[derive(Debug, Clone, Deserialize)]
pub struct WireAssignment {
  pub class_id:   i64,
  pub subject_id: i64,
  pub teacher_id: i64,
  pub room_id:    i64,
  pub day:        u8,
  pub period:     u8,
  #[serde(default)]
  pub hard_lock:  bool,
}

// ─── Demand forecast ─────────────────────────────────────────────────────────

/// `POST /demand/forecast` request body.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastRequest {
  pub tenant:     String,
  pub week_start: NaiveDate,
}

/// Forecast items come back in native-id space; the forecaster works from
/// the store's own exports, not from a per-solve dense index.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
  #[serde(default)]
  pub items: Vec<ForecastItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastItem {
  pub class_id:         EntityId,
  pub subject_id:       EntityId,
  pub periods_required: i64,
}
