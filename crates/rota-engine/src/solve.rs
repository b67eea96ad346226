//! Solve orchestration: one guarded pipeline from stored rows to a
//! persisted solution batch.

use std::{
  collections::HashSet,
  sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::NaiveDate;
use rota_core::{
  entities::{
    Assignment, Class, ClassSubject, HardLock, Penalties, Room, RoomAvailability, Subject,
    Teacher, TeacherAvailability, TeacherSubject,
  },
  store::{EntityStore, Filter, ListQuery},
};
use tracing::info;

use crate::{
  demand,
  error::{Error, Result},
  normalize::{self, SolveMaps},
  solver::SolverApi,
  wire::{SolveRequest, WirePenalties},
};

// ─── Solve gate ──────────────────────────────────────────────────────────────

/// At most one in-flight solve per (tenant, week); a second attempt is
/// refused with [`Error::Busy`], never queued. Solves for distinct keys
/// proceed independently.
#[derive(Debug, Default)]
pub struct SolveGate {
  running: Mutex<HashSet<(String, NaiveDate)>>,
}

impl SolveGate {
  pub fn new() -> Self {
    Self::default()
  }

  fn claim(&self, tenant: &str, week_start: NaiveDate) -> Result<SolvePermit<'_>> {
    let mut running = self.lock();
    if !running.insert((tenant.to_string(), week_start)) {
      return Err(Error::Busy { tenant: tenant.to_string(), week_start });
    }
    Ok(SolvePermit { gate: self, tenant: tenant.to_string(), week_start })
  }

  fn lock(&self) -> MutexGuard<'_, HashSet<(String, NaiveDate)>> {
    // A poisoned set still holds exactly the claims that were alive.
    self.running.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Releases its claim on drop.
#[derive(Debug)]
struct SolvePermit<'a> {
  gate:       &'a SolveGate,
  tenant:     String,
  week_start: NaiveDate,
}

impl Drop for SolvePermit<'_> {
  fn drop(&mut self) {
    let key = (self.tenant.clone(), self.week_start);
    self.gate.lock().remove(&key);
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Terminal state of a successful solve run.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
  /// Assignments were persisted under `solution_id`.
  Solved {
    solution_id: String,
    objective:   Option<f64>,
  },
  /// The solver proved the week over-constrained; nothing was written.
  Infeasible,
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Run the full solve pipeline for one (tenant, week).
///
/// Claims the gate, backfills demand, collects the tenant's rows, maps
/// native ids onto dense indexes, validates every reference, submits the
/// instance, and replaces the timetable batch with the returned
/// assignments. Validation failures halt before any network call.
pub async fn run_solve<S, C>(
  store: &S,
  solver: &C,
  gate: &SolveGate,
  tenant: &str,
  week_start: NaiveDate,
  strict: bool,
) -> Result<SolveOutcome>
where
  S: EntityStore,
  C: SolverApi,
{
  let _permit = gate.claim(tenant, week_start)?;

  // The backfill returns the completed week, so demand needs no re-read.
  let demand_rows = demand::ensure_demand(store, tenant, week_start).await?;

  let all = ListQuery::all();
  let week = ListQuery::matching(Filter::new().eq("week_start", week_start.to_string()));

  let (classes, subjects, teachers, rooms) = tokio::try_join!(
    store.list::<Class>(tenant, &all),
    store.list::<Subject>(tenant, &all),
    store.list::<Teacher>(tenant, &all),
    store.list::<Room>(tenant, &all),
  )
  .map_err(Error::store)?;

  let (teacher_subjects, class_subjects, teacher_slots, room_slots) = tokio::try_join!(
    store.list::<TeacherSubject>(tenant, &all),
    store.list::<ClassSubject>(tenant, &all),
    store.list::<TeacherAvailability>(tenant, &all),
    store.list::<RoomAvailability>(tenant, &all),
  )
  .map_err(Error::store)?;

  let (locks, penalty_rows) = tokio::try_join!(
    store.list::<HardLock>(tenant, &week),
    store.list::<Penalties>(tenant, &all),
  )
  .map_err(Error::store)?;

  let maps = SolveMaps::build(&classes, &subjects, &teachers, &rooms);

  let mut unmapped = Vec::new();
  let wire_teacher_subjects =
    normalize::wire_teacher_subjects(&teacher_subjects, &maps, &mut unmapped);
  let wire_class_subjects = normalize::wire_class_subjects(&class_subjects, &maps, &mut unmapped);
  let wire_teacher_slots = normalize::wire_teacher_slots(&teacher_slots, &maps, &mut unmapped);
  let wire_room_slots = normalize::wire_room_slots(&room_slots, &maps, &mut unmapped);
  let wire_demand = normalize::wire_demand(&demand_rows, &maps, &mut unmapped);
  let wire_locks = normalize::wire_locks(&locks, &maps, &mut unmapped);

  let unmapped = normalize::dedupe(unmapped);
  if !unmapped.is_empty() {
    return Err(Error::Validation(unmapped));
  }

  let penalties = penalty_rows
    .first()
    .map(|p| WirePenalties {
      teacher_gap: p.teacher_gap,
      uneven_subject: p.uneven_subject,
      room_mismatch: p.room_mismatch,
      early_or_late: p.early_or_late,
    })
    .unwrap_or_default();

  let request = SolveRequest {
    tenant: tenant.to_string(),
    week_start,
    strict,
    classes: normalize::wire_classes(&classes),
    subjects: normalize::wire_subjects(&subjects),
    teachers: normalize::wire_teachers(&teachers),
    rooms: normalize::wire_rooms(&rooms),
    teacher_subjects: wire_teacher_subjects,
    class_subjects: wire_class_subjects,
    availability_teacher: wire_teacher_slots,
    availability_room: wire_room_slots,
    demand: wire_demand,
    locks: wire_locks,
    penalties,
  };

  info!(
    tenant,
    %week_start,
    classes = request.classes.len(),
    demand = request.demand.len(),
    locks = request.locks.len(),
    "submitting solve instance"
  );

  let response = solver.solve(&request).await?;

  let Some(solution_id) = response.solution_id else {
    info!(tenant, %week_start, "solver reported infeasible");
    return Ok(SolveOutcome::Infeasible);
  };

  let drafts =
    normalize::invert_assignments(&solution_id, week_start, &response.assignments, &maps)?;

  // A batch fully replaces any earlier rows under the same (week, solution).
  let batch = Filter::new()
    .eq("week_start", week_start.to_string())
    .eq("solution_id", solution_id.as_str());
  store.delete_matching::<Assignment>(tenant, &batch).await.map_err(Error::store)?;
  store.insert_many::<Assignment>(tenant, &drafts).await.map_err(Error::store)?;

  info!(tenant, %week_start, %solution_id, rows = drafts.len(), "solution persisted");

  Ok(SolveOutcome::Solved { solution_id, objective: response.objective })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
