//! Domain rows for weekly school timetabling.
//!
//! Every row is scoped by a tenant (one school) and carries a backend-native
//! [`EntityId`]. Drafts (`New*`) are the insert shape: the row minus its id.
//! Relation edges reference other rows by native id; referential integrity is
//! checked when a solve instance is normalized, not at write time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::id::EntityId;

/// A typed row bound to its store collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
  /// Collection name in the store.
  const COLLECTION: &'static str;

  /// Insert shape: the row minus its id.
  type New: Serialize + DeserializeOwned + Send + Sync + 'static;

  fn id(&self) -> &EntityId;
}

/// Every collection a backend persists, in provisioning order.
pub const COLLECTIONS: [&str; 13] = [
  Tenant::COLLECTION,
  Class::COLLECTION,
  Subject::COLLECTION,
  Teacher::COLLECTION,
  Room::COLLECTION,
  TeacherSubject::COLLECTION,
  ClassSubject::COLLECTION,
  TeacherAvailability::COLLECTION,
  RoomAvailability::COLLECTION,
  DemandForecast::COLLECTION,
  Penalties::COLLECTION,
  HardLock::COLLECTION,
  Assignment::COLLECTION,
];

// ─── Tenant ──────────────────────────────────────────────────────────────────

/// One school; the unit of data isolation. Created at provisioning and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
  pub id:   EntityId,
  pub slug: String,
  pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTenant {
  pub slug: String,
  pub name: String,
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// A class group, labelled `{code}-{section}` for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
  pub id:      EntityId,
  pub code:    String,
  pub section: String,
  pub size:    i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClass {
  pub code:    String,
  pub section: String,
  pub size:    i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub id:     EntityId,
  pub code:   String,
  pub name:   String,
  /// Lab subjects prefer lab rooms and default to a lighter weekly load.
  #[serde(default)]
  pub is_lab: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubject {
  pub code:   String,
  pub name:   String,
  #[serde(default)]
  pub is_lab: bool,
}

/// Capacity fields are soft hints consumed by the solver, not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
  pub id:                   EntityId,
  pub name:                 String,
  #[serde(default = "default_max_per_day")]
  pub max_periods_per_day:  i64,
  #[serde(default = "default_max_per_week")]
  pub max_periods_per_week: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeacher {
  pub name:                 String,
  #[serde(default = "default_max_per_day")]
  pub max_periods_per_day:  i64,
  #[serde(default = "default_max_per_week")]
  pub max_periods_per_week: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
  pub id:       EntityId,
  pub code:     String,
  pub capacity: i64,
  #[serde(default)]
  pub is_lab:   bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
  pub code:     String,
  pub capacity: i64,
  #[serde(default)]
  pub is_lab:   bool,
}

// ─── Relation edges ──────────────────────────────────────────────────────────

/// Eligibility edge: which teacher may teach which subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherSubject {
  pub id:         EntityId,
  pub teacher_id: EntityId,
  pub subject_id: EntityId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeacherSubject {
  pub teacher_id: EntityId,
  pub subject_id: EntityId,
}

/// Curriculum edge: which subject a class takes. A class with no edges at
/// all is assumed to take every tenant subject (see the demand backfill).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSubject {
  pub id:         EntityId,
  pub class_id:   EntityId,
  pub subject_id: EntityId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClassSubject {
  pub class_id:   EntityId,
  pub subject_id: EntityId,
}

// ─── Availability grids ──────────────────────────────────────────────────────

/// One (teacher, day, period) slot. Day runs 0..=4, period 0..P-1.
///
/// Grids are expected dense from provisioning; the solver treats an absent
/// slot as unavailable, so rows are forwarded verbatim rather than
/// default-filled at solve time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherAvailability {
  pub id:         EntityId,
  pub teacher_id: EntityId,
  pub day:        u8,
  pub period:     u8,
  #[serde(default = "default_available")]
  pub available:  bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeacherAvailability {
  pub teacher_id: EntityId,
  pub day:        u8,
  pub period:     u8,
  #[serde(default = "default_available")]
  pub available:  bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAvailability {
  pub id:        EntityId,
  pub room_id:   EntityId,
  pub day:       u8,
  pub period:    u8,
  #[serde(default = "default_available")]
  pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoomAvailability {
  pub room_id:   EntityId,
  pub day:       u8,
  pub period:    u8,
  #[serde(default = "default_available")]
  pub available: bool,
}

// ─── Weekly demand ───────────────────────────────────────────────────────────

/// Where a demand row came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandSource {
  /// Synthesized default or operator-entered value.
  #[default]
  Manual,
  /// Produced by the external forecasting service.
  Ml,
}

/// Required period count for a (class, subject) pair in one week.
/// Unique per (tenant, week_start, class, subject); writes are upserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandForecast {
  pub id:               EntityId,
  pub week_start:       NaiveDate,
  pub class_id:         EntityId,
  pub subject_id:       EntityId,
  pub periods_required: i64,
  #[serde(default)]
  pub source:           DemandSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDemandForecast {
  pub week_start:       NaiveDate,
  pub class_id:         EntityId,
  pub subject_id:       EntityId,
  pub periods_required: i64,
  #[serde(default)]
  pub source:           DemandSource,
}

// ─── Locks, penalties, solutions ─────────────────────────────────────────────

/// A user pin the solver must keep verbatim in any solution for that week.
/// Append-only; there is no unlock operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardLock {
  pub id:         EntityId,
  pub week_start: NaiveDate,
  pub class_id:   EntityId,
  pub subject_id: EntityId,
  pub teacher_id: EntityId,
  pub room_id:    EntityId,
  pub day:        u8,
  pub period:     u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHardLock {
  pub week_start: NaiveDate,
  pub class_id:   EntityId,
  pub subject_id: EntityId,
  pub teacher_id: EntityId,
  pub room_id:    EntityId,
  pub day:        u8,
  pub period:     u8,
}

/// Per-tenant soft-constraint weights, forwarded verbatim to the solver.
/// One row per tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Penalties {
  pub id:             EntityId,
  #[serde(default = "default_teacher_gap")]
  pub teacher_gap:    i64,
  #[serde(default = "default_uneven_subject")]
  pub uneven_subject: i64,
  #[serde(default = "default_room_mismatch")]
  pub room_mismatch:  i64,
  #[serde(default = "default_early_or_late")]
  pub early_or_late:  i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPenalties {
  #[serde(default = "default_teacher_gap")]
  pub teacher_gap:    i64,
  #[serde(default = "default_uneven_subject")]
  pub uneven_subject: i64,
  #[serde(default = "default_room_mismatch")]
  pub room_mismatch:  i64,
  #[serde(default = "default_early_or_late")]
  pub early_or_late:  i64,
}

/// One scheduled slot of a solution.
///
/// A solution is an immutable batch of assignments sharing one externally
/// generated `solution_id`; a batch fully replaces any earlier batch for the
/// same (tenant, week_start, solution_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
  pub id:          EntityId,
  pub solution_id: String,
  pub week_start:  NaiveDate,
  pub class_id:    EntityId,
  pub subject_id:  EntityId,
  pub teacher_id:  EntityId,
  pub room_id:     EntityId,
  pub day:         u8,
  pub period:      u8,
  #[serde(default)]
  pub hard_lock:   bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignment {
  pub solution_id: String,
  pub week_start:  NaiveDate,
  pub class_id:    EntityId,
  pub subject_id:  EntityId,
  pub teacher_id:  EntityId,
  pub room_id:     EntityId,
  pub day:         u8,
  pub period:      u8,
  #[serde(default)]
  pub hard_lock:   bool,
}

// ─── Record impls ────────────────────────────────────────────────────────────

impl Record for Tenant {
  const COLLECTION: &'static str = "tenants";
  type New = NewTenant;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for Class {
  const COLLECTION: &'static str = "classes";
  type New = NewClass;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for Subject {
  const COLLECTION: &'static str = "subjects";
  type New = NewSubject;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for Teacher {
  const COLLECTION: &'static str = "teachers";
  type New = NewTeacher;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for Room {
  const COLLECTION: &'static str = "rooms";
  type New = NewRoom;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for TeacherSubject {
  const COLLECTION: &'static str = "teacher_subjects";
  type New = NewTeacherSubject;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for ClassSubject {
  const COLLECTION: &'static str = "class_subjects";
  type New = NewClassSubject;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for TeacherAvailability {
  const COLLECTION: &'static str = "availability_teacher";
  type New = NewTeacherAvailability;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for RoomAvailability {
  const COLLECTION: &'static str = "availability_room";
  type New = NewRoomAvailability;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for DemandForecast {
  const COLLECTION: &'static str = "demand_forecast";
  type New = NewDemandForecast;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for Penalties {
  const COLLECTION: &'static str = "penalties";
  type New = NewPenalties;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for HardLock {
  const COLLECTION: &'static str = "hard_locks";
  type New = NewHardLock;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

impl Record for Assignment {
  const COLLECTION: &'static str = "timetable";
  type New = NewAssignment;
  fn id(&self) -> &EntityId {
    &self.id
  }
}

// ─── Serde defaults ──────────────────────────────────────────────────────────

fn default_max_per_day() -> i64 {
  5
}

fn default_max_per_week() -> i64 {
  28
}

fn default_available() -> bool {
  true
}

fn default_teacher_gap() -> i64 {
  3
}

fn default_uneven_subject() -> i64 {
  2
}

fn default_room_mismatch() -> i64 {
  4
}

fn default_early_or_late() -> i64 {
  1
}
