//! Human-readable projection of a stored solution.

use std::collections::HashMap;

use chrono::NaiveDate;
use rota_core::{
  entities::{Assignment, Class, Room, Subject, Teacher},
  id::EntityId,
  store::{EntityStore, Filter, ListQuery},
};
use serde::Serialize;

use crate::error::{Error, Result};

/// One timetable slot joined with display labels and the reasons the
/// slot is acceptable.
///
/// The rationale is a fixed rule table keyed on (hard_lock, subject lab
/// flag, room lab flag), not solver introspection.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedAssignment {
  pub solution_id:   String,
  pub week_start:    NaiveDate,
  pub class_id:      EntityId,
  pub subject_id:    EntityId,
  pub teacher_id:    EntityId,
  pub room_id:       EntityId,
  pub day:           u8,
  pub period:        u8,
  pub hard_lock:     bool,
  pub class_label:   String,
  pub subject_label: String,
  pub teacher_name:  String,
  pub room_label:    String,
  pub is_lab:        bool,
  pub room_is_lab:   bool,
  pub rationale:     Vec<String>,
}

/// Assignments for one solution, labelled and ordered for display.
///
/// Rows sort by (day, period, class label) ascending. `teacher` narrows
/// the result to one teacher's personal timetable. An unknown solution id
/// is [`Error::NotFound`]; a known solution with no rows for the requested
/// teacher is an empty list.
pub async fn enriched_solution<S: EntityStore>(
  store: &S,
  tenant: &str,
  solution_id: &str,
  teacher: Option<&EntityId>,
) -> Result<Vec<EnrichedAssignment>> {
  let query = ListQuery::matching(Filter::new().eq("solution_id", solution_id));
  let mut rows: Vec<Assignment> = store.list(tenant, &query).await.map_err(Error::store)?;
  if rows.is_empty() {
    return Err(Error::NotFound(format!("solution {solution_id}")));
  }
  if let Some(teacher) = teacher {
    rows.retain(|r| &r.teacher_id == teacher);
  }

  let all = ListQuery::all();
  let classes: Vec<Class> = store.list(tenant, &all).await.map_err(Error::store)?;
  let subjects: Vec<Subject> = store.list(tenant, &all).await.map_err(Error::store)?;
  let teachers: Vec<Teacher> = store.list(tenant, &all).await.map_err(Error::store)?;
  let rooms: Vec<Room> = store.list(tenant, &all).await.map_err(Error::store)?;

  let classes: HashMap<&EntityId, &Class> = classes.iter().map(|c| (&c.id, c)).collect();
  let subjects: HashMap<&EntityId, &Subject> = subjects.iter().map(|s| (&s.id, s)).collect();
  let teachers: HashMap<&EntityId, &Teacher> = teachers.iter().map(|t| (&t.id, t)).collect();
  let rooms: HashMap<&EntityId, &Room> = rooms.iter().map(|r| (&r.id, r)).collect();

  let mut out: Vec<EnrichedAssignment> = rows
    .iter()
    .map(|r| {
      let class = classes.get(&r.class_id).copied();
      let subject = subjects.get(&r.subject_id).copied();
      let teacher = teachers.get(&r.teacher_id).copied();
      let room = rooms.get(&r.room_id).copied();

      let is_lab = subject.is_some_and(|s| s.is_lab);
      let room_is_lab = room.is_some_and(|x| x.is_lab);

      let mut rationale = Vec::new();
      if r.hard_lock {
        rationale.push("Locked by user; solver kept this slot.".to_string());
      }
      if is_lab {
        rationale.push(if room_is_lab {
          "Lab subject scheduled in lab room (preferred).".to_string()
        } else {
          "Lab subject in non-lab room (penalized).".to_string()
        });
      }
      rationale.push("No teacher/room/class conflicts at this slot.".to_string());
      rationale.push("Soft penalties minimized (gaps, lab mismatch).".to_string());

      EnrichedAssignment {
        solution_id: r.solution_id.clone(),
        week_start: r.week_start,
        class_id: r.class_id.clone(),
        subject_id: r.subject_id.clone(),
        teacher_id: r.teacher_id.clone(),
        room_id: r.room_id.clone(),
        day: r.day,
        period: r.period,
        hard_lock: r.hard_lock,
        class_label: class
          .map(|c| format!("{}-{}", c.code, c.section))
          .unwrap_or_else(|| "Class".to_string()),
        subject_label: subject.map(|s| s.name.clone()).unwrap_or_else(|| "Subject".to_string()),
        teacher_name: teacher.map(|t| t.name.clone()).unwrap_or_else(|| "Teacher".to_string()),
        room_label: room.map(|x| x.code.clone()).unwrap_or_else(|| "Room".to_string()),
        is_lab,
        room_is_lab,
        rationale,
      }
    })
    .collect();

  out.sort_by(|a, b| {
    (a.day, a.period, a.class_label.as_str()).cmp(&(b.day, b.period, b.class_label.as_str()))
  });
  Ok(out)
}
