//! Identity normalization between native store ids and the dense `1..=N`
//! index space the solver consumes.
//!
//! Maps are built fresh per solve from one store snapshot and never
//! persisted or shared across requests. Dense indexes follow store
//! insertion order, so re-running over unchanged rows reproduces the
//! identical instance.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rota_core::{
  entities::{
    Class, ClassSubject, DemandForecast, HardLock, NewAssignment, Room, RoomAvailability,
    Subject, Teacher, TeacherAvailability, TeacherSubject,
  },
  id::EntityId,
};
use serde::Serialize;

use crate::{
  solver::SolverError,
  wire::{
    WireAssignment, WireClass, WireClassSubject, WireDemand, WireLock, WireRoom, WireRoomSlot,
    WireSubject, WireTeacher, WireTeacherSlot, WireTeacherSubject,
  },
};

// ─── Dense maps ──────────────────────────────────────────────────────────────

/// A solve-scoped bijection between native ids and dense `1..=N` indexes.
#[derive(Debug)]
pub struct DenseMap {
  to_dense:  HashMap<EntityId, i64>,
  to_native: Vec<EntityId>,
}

impl DenseMap {
  pub fn build<'a, I>(ids: I) -> Self
  where
    I: IntoIterator<Item = &'a EntityId>,
  {
    let mut to_dense = HashMap::new();
    let mut to_native = Vec::new();
    for id in ids {
      to_native.push(id.clone());
      to_dense.insert(id.clone(), to_native.len() as i64);
    }
    Self { to_dense, to_native }
  }

  /// Dense index for a native id, if the id belongs to this solve.
  pub fn dense(&self, id: &EntityId) -> Option<i64> {
    self.to_dense.get(id).copied()
  }

  /// Native id for a dense index. `None` when the index is outside `1..=N`.
  pub fn native(&self, dense: i64) -> Option<&EntityId> {
    let slot = usize::try_from(dense.checked_sub(1)?).ok()?;
    self.to_native.get(slot)
  }

  pub fn len(&self) -> usize {
    self.to_native.len()
  }

  pub fn is_empty(&self) -> bool {
    self.to_native.is_empty()
  }
}

/// Dense maps for the four entity kinds, built once per solve.
#[derive(Debug)]
pub struct SolveMaps {
  pub classes:  DenseMap,
  pub subjects: DenseMap,
  pub teachers: DenseMap,
  pub rooms:    DenseMap,
}

impl SolveMaps {
  pub fn build(
    classes: &[Class],
    subjects: &[Subject],
    teachers: &[Teacher],
    rooms: &[Room],
  ) -> Self {
    Self {
      classes:  DenseMap::build(classes.iter().map(|c| &c.id)),
      subjects: DenseMap::build(subjects.iter().map(|s| &s.id)),
      teachers: DenseMap::build(teachers.iter().map(|t| &t.id)),
      rooms:    DenseMap::build(rooms.iter().map(|r| &r.id)),
    }
  }
}

// ─── Unmapped references ─────────────────────────────────────────────────────

/// A relation field whose native id matched no row in this tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnmappedRef {
  /// Qualified field path on the offending row, e.g.
  /// `"teacher_subjects.teacher_id"`.
  pub field: &'static str,
  /// The dangling native id, rendered as text.
  pub id:    String,
}

impl std::fmt::Display for UnmappedRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}={}", self.field, self.id)
  }
}

fn resolve(
  map: &DenseMap,
  field: &'static str,
  id: &EntityId,
  unmapped: &mut Vec<UnmappedRef>,
) -> Option<i64> {
  let dense = map.dense(id);
  if dense.is_none() {
    unmapped.push(UnmappedRef { field, id: id.to_string() });
  }
  dense
}

/// Collapse duplicate (field, id) reports, preserving first-seen order.
pub fn dedupe(unmapped: Vec<UnmappedRef>) -> Vec<UnmappedRef> {
  let mut seen = HashSet::new();
  unmapped.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

// ─── Entity rows ─────────────────────────────────────────────────────────────

pub fn wire_classes(rows: &[Class]) -> Vec<WireClass> {
  rows
    .iter()
    .enumerate()
    .map(|(i, c)| WireClass {
      id: i as i64 + 1,
      code: c.code.clone(),
      section: c.section.clone(),
      size: c.size,
    })
    .collect()
}

pub fn wire_subjects(rows: &[Subject]) -> Vec<WireSubject> {
  rows
    .iter()
    .enumerate()
    .map(|(i, s)| WireSubject {
      id: i as i64 + 1,
      code: s.code.clone(),
      name: s.name.clone(),
      is_lab: u8::from(s.is_lab),
    })
    .collect()
}

pub fn wire_teachers(rows: &[Teacher]) -> Vec<WireTeacher> {
  rows
    .iter()
    .enumerate()
    .map(|(i, t)| WireTeacher {
      id: i as i64 + 1,
      name: t.name.clone(),
      max_periods_per_day: t.max_periods_per_day,
      max_periods_per_week: t.max_periods_per_week,
    })
    .collect()
}

pub fn wire_rooms(rows: &[Room]) -> Vec<WireRoom> {
  rows
    .iter()
    .enumerate()
    .map(|(i, r)| WireRoom {
      id: i as i64 + 1,
      code: r.code.clone(),
      capacity: r.capacity,
      is_lab: u8::from(r.is_lab),
    })
    .collect()
}

// ─── Relation rows ───────────────────────────────────────────────────────────
//
// Rows whose references all resolve are translated; every dangling field is
// reported, not just the first per row.

pub fn wire_teacher_subjects(
  rows: &[TeacherSubject],
  maps: &SolveMaps,
  unmapped: &mut Vec<UnmappedRef>,
) -> Vec<WireTeacherSubject> {
  rows
    .iter()
    .filter_map(|r| {
      let teacher = resolve(&maps.teachers, "teacher_subjects.teacher_id", &r.teacher_id, unmapped);
      let subject = resolve(&maps.subjects, "teacher_subjects.subject_id", &r.subject_id, unmapped);
      Some(WireTeacherSubject { teacher_id: teacher?, subject_id: subject? })
    })
    .collect()
}

pub fn wire_class_subjects(
  rows: &[ClassSubject],
  maps: &SolveMaps,
  unmapped: &mut Vec<UnmappedRef>,
) -> Vec<WireClassSubject> {
  rows
    .iter()
    .filter_map(|r| {
      let class = resolve(&maps.classes, "class_subjects.class_id", &r.class_id, unmapped);
      let subject = resolve(&maps.subjects, "class_subjects.subject_id", &r.subject_id, unmapped);
      Some(WireClassSubject { class_id: class?, subject_id: subject? })
    })
    .collect()
}

pub fn wire_teacher_slots(
  rows: &[TeacherAvailability],
  maps: &SolveMaps,
  unmapped: &mut Vec<UnmappedRef>,
) -> Vec<WireTeacherSlot> {
  rows
    .iter()
    .filter_map(|r| {
      let teacher =
        resolve(&maps.teachers, "availability_teacher.teacher_id", &r.teacher_id, unmapped)?;
      Some(WireTeacherSlot {
        teacher_id: teacher,
        day: r.day,
        period: r.period,
        available: u8::from(r.available),
      })
    })
    .collect()
}

pub fn wire_room_slots(
  rows: &[RoomAvailability],
  maps: &SolveMaps,
  unmapped: &mut Vec<UnmappedRef>,
) -> Vec<WireRoomSlot> {
  rows
    .iter()
    .filter_map(|r| {
      let room = resolve(&maps.rooms, "availability_room.room_id", &r.room_id, unmapped)?;
      Some(WireRoomSlot {
        room_id: room,
        day: r.day,
        period: r.period,
        available: u8::from(r.available),
      })
    })
    .collect()
}

pub fn wire_demand(
  rows: &[DemandForecast],
  maps: &SolveMaps,
  unmapped: &mut Vec<UnmappedRef>,
) -> Vec<WireDemand> {
  rows
    .iter()
    .filter_map(|r| {
      let class = resolve(&maps.classes, "demand.class_id", &r.class_id, unmapped);
      let subject = resolve(&maps.subjects, "demand.subject_id", &r.subject_id, unmapped);
      Some(WireDemand {
        class_id: class?,
        subject_id: subject?,
        periods_required: r.periods_required,
      })
    })
    .collect()
}

pub fn wire_locks(
  rows: &[HardLock],
  maps: &SolveMaps,
  unmapped: &mut Vec<UnmappedRef>,
) -> Vec<WireLock> {
  rows
    .iter()
    .filter_map(|r| {
      let class = resolve(&maps.classes, "locks.class_id", &r.class_id, unmapped);
      let subject = resolve(&maps.subjects, "locks.subject_id", &r.subject_id, unmapped);
      let teacher = resolve(&maps.teachers, "locks.teacher_id", &r.teacher_id, unmapped);
      let room = resolve(&maps.rooms, "locks.room_id", &r.room_id, unmapped);
      Some(WireLock {
        class_id: class?,
        subject_id: subject?,
        teacher_id: teacher?,
        room_id: room?,
        day: r.day,
        period: r.period,
      })
    })
    .collect()
}

// ─── Solution inversion ──────────────────────────────────────────────────────

/// Map a solver solution back into native-id assignment drafts.
///
/// A dense index outside `1..=N` breaks the wire contract on the solver's
/// side and is a protocol error, never a silent skip.
pub fn invert_assignments(
  solution_id: &str,
  week_start: NaiveDate,
  rows: &[WireAssignment],
  maps: &SolveMaps,
) -> Result<Vec<NewAssignment>, SolverError> {
  rows
    .iter()
    .map(|r| {
      Ok(NewAssignment {
        solution_id: solution_id.to_string(),
        week_start,
        class_id: lookup(&maps.classes, "class_id", r.class_id)?,
        subject_id: lookup(&maps.subjects, "subject_id", r.subject_id)?,
        teacher_id: lookup(&maps.teachers, "teacher_id", r.teacher_id)?,
        room_id: lookup(&maps.rooms, "room_id", r.room_id)?,
        day: r.day,
        period: r.period,
        hard_lock: r.hard_lock,
      })
    })
    .collect()
}

fn lookup(map: &DenseMap, field: &'static str, dense: i64) -> Result<EntityId, SolverError> {
  map.native(dense).cloned().ok_or_else(|| {
    SolverError::Protocol(format!("assignment {field} index {dense} is out of range"))
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(raw: &[i64]) -> Vec<EntityId> {
    raw.iter().map(|n| EntityId::Int(*n)).collect()
  }

  #[test]
  fn dense_ids_follow_row_order() {
    let map = DenseMap::build(&ids(&[40, 7, 19]));
    assert_eq!(map.dense(&EntityId::Int(40)), Some(1));
    assert_eq!(map.dense(&EntityId::Int(7)), Some(2));
    assert_eq!(map.dense(&EntityId::Int(19)), Some(3));
    assert_eq!(map.len(), 3);
  }

  #[test]
  fn every_dense_id_maps_back_to_its_native_id() {
    let native = ids(&[40, 7, 19]);
    let map = DenseMap::build(&native);
    for id in &native {
      let dense = map.dense(id).unwrap();
      assert_eq!(map.native(dense), Some(id));
    }
  }

  #[test]
  fn out_of_range_dense_ids_resolve_to_none() {
    let map = DenseMap::build(&ids(&[1, 2]));
    assert_eq!(map.native(0), None);
    assert_eq!(map.native(3), None);
    assert_eq!(map.native(-1), None);
  }

  #[test]
  fn string_and_integer_ids_share_one_map() {
    let native = vec![EntityId::Int(5), EntityId::Str("a1b2c3".into())];
    let map = DenseMap::build(&native);
    assert_eq!(map.dense(&EntityId::Str("a1b2c3".into())), Some(2));
    assert_eq!(map.native(2), Some(&native[1]));
  }

  #[test]
  fn unknown_ids_are_dense_none() {
    let map = DenseMap::build(&ids(&[1]));
    assert_eq!(map.dense(&EntityId::Int(99)), None);
  }
}
