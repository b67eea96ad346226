//! Engine pipeline tests over the in-memory backend and a scripted solver.

use std::sync::{
  Mutex,
  atomic::{AtomicUsize, Ordering},
};

use chrono::NaiveDate;
use rota_core::{
  entities::{
    Assignment, Class, ClassSubject, DemandForecast, DemandSource, HardLock, NewAssignment,
    NewClass, NewClassSubject, NewDemandForecast, NewHardLock, NewRoom, NewSubject, NewTeacher,
    NewTeacherSubject, Room, Subject, Teacher, TeacherSubject,
  },
  id::EntityId,
  store::{EntityStore, ListQuery},
};
use rota_store_mem::MemStore;

use crate::{
  demand::{DEFAULT_PERIODS, LAB_PERIODS, ensure_demand, refresh_forecast, upsert_demand},
  enrich::enriched_solution,
  error::Error,
  locks::add_lock,
  solve::{SolveGate, SolveOutcome, run_solve},
  solver::{SolverApi, SolverError},
  wire::{
    ForecastItem, ForecastRequest, ForecastResponse, SolveRequest, SolveResponse, WireAssignment,
  },
};

const TENANT: &str = "demo";

fn week() -> NaiveDate {
  NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
}

// ─── Scripted solver ─────────────────────────────────────────────────────────

enum Script<T> {
  Respond(T),
  Transport(String),
}

/// Solver double: replays a scripted response and records every submitted
/// instance.
struct FakeSolver {
  solve_script:    Script<SolveResponse>,
  forecast_script: Script<ForecastResponse>,
  requests:        Mutex<Vec<SolveRequest>>,
  solve_calls:     AtomicUsize,
}

impl FakeSolver {
  fn solved(response: SolveResponse) -> Self {
    Self {
      solve_script: Script::Respond(response),
      forecast_script: Script::Respond(ForecastResponse { items: Vec::new() }),
      requests: Mutex::new(Vec::new()),
      solve_calls: AtomicUsize::new(0),
    }
  }

  fn infeasible() -> Self {
    Self::solved(SolveResponse { solution_id: None, objective: None, assignments: Vec::new() })
  }

  fn down() -> Self {
    let mut fake = Self::infeasible();
    fake.solve_script = Script::Transport("connection refused".to_string());
    fake
  }

  fn forecasting(items: Vec<ForecastItem>) -> Self {
    let mut fake = Self::infeasible();
    fake.forecast_script = Script::Respond(ForecastResponse { items });
    fake
  }

  fn forecast_down() -> Self {
    let mut fake = Self::infeasible();
    fake.forecast_script = Script::Transport("connection refused".to_string());
    fake
  }

  fn last_request(&self) -> SolveRequest {
    self.requests.lock().unwrap().last().cloned().expect("a submitted solve request")
  }

  fn calls(&self) -> usize {
    self.solve_calls.load(Ordering::SeqCst)
  }
}

impl SolverApi for FakeSolver {
  async fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolverError> {
    self.solve_calls.fetch_add(1, Ordering::SeqCst);
    self.requests.lock().unwrap().push(request.clone());
    match &self.solve_script {
      Script::Respond(r) => Ok(r.clone()),
      Script::Transport(msg) => Err(SolverError::Transport(msg.clone())),
    }
  }

  async fn forecast(&self, _request: &ForecastRequest) -> Result<ForecastResponse, SolverError> {
    match &self.forecast_script {
      Script::Respond(r) => Ok(r.clone()),
      Script::Transport(msg) => Err(SolverError::Transport(msg.clone())),
    }
  }
}

// ─── World fixture ───────────────────────────────────────────────────────────

/// Class C1-A, subjects MATH and SCI (lab), two teachers, a plain room and
/// a lab, full eligibility and curriculum.
struct World {
  class:    Class,
  math:     Subject,
  sci:      Subject,
  teachers: Vec<Teacher>,
  rooms:    Vec<Room>,
}

async fn seed_entities(store: &MemStore) -> World {
  let class: Class = store
    .insert(TENANT, &NewClass { code: "C1".into(), section: "A".into(), size: 30 })
    .await
    .unwrap();
  let math: Subject = store
    .insert(TENANT, &NewSubject { code: "MATH".into(), name: "Mathematics".into(), is_lab: false })
    .await
    .unwrap();
  let sci: Subject = store
    .insert(TENANT, &NewSubject { code: "SCI".into(), name: "Science".into(), is_lab: true })
    .await
    .unwrap();
  let asha: Teacher = store
    .insert(
      TENANT,
      &NewTeacher { name: "Asha Rao".into(), max_periods_per_day: 5, max_periods_per_week: 28 },
    )
    .await
    .unwrap();
  let ben: Teacher = store
    .insert(
      TENANT,
      &NewTeacher {
        name: "Ben Whitfield".into(),
        max_periods_per_day: 5,
        max_periods_per_week: 28,
      },
    )
    .await
    .unwrap();
  let room: Room = store
    .insert(TENANT, &NewRoom { code: "R101".into(), capacity: 40, is_lab: false })
    .await
    .unwrap();
  let lab: Room = store
    .insert(TENANT, &NewRoom { code: "LAB1".into(), capacity: 24, is_lab: true })
    .await
    .unwrap();

  World { class, math, sci, teachers: vec![asha, ben], rooms: vec![room, lab] }
}

async fn seed_world(store: &MemStore) -> World {
  let world = seed_entities(store).await;
  store
    .insert::<TeacherSubject>(
      TENANT,
      &NewTeacherSubject {
        teacher_id: world.teachers[0].id.clone(),
        subject_id: world.math.id.clone(),
      },
    )
    .await
    .unwrap();
  store
    .insert::<TeacherSubject>(
      TENANT,
      &NewTeacherSubject {
        teacher_id: world.teachers[1].id.clone(),
        subject_id: world.sci.id.clone(),
      },
    )
    .await
    .unwrap();
  store
    .insert::<ClassSubject>(
      TENANT,
      &NewClassSubject { class_id: world.class.id.clone(), subject_id: world.math.id.clone() },
    )
    .await
    .unwrap();
  store
    .insert::<ClassSubject>(
      TENANT,
      &NewClassSubject { class_id: world.class.id.clone(), subject_id: world.sci.id.clone() },
    )
    .await
    .unwrap();
  world
}

fn demand_draft(
  world: &World,
  subject: &EntityId,
  periods: i64,
  source: DemandSource,
) -> NewDemandForecast {
  NewDemandForecast {
    week_start: week(),
    class_id: world.class.id.clone(),
    subject_id: subject.clone(),
    periods_required: periods,
    source,
  }
}

fn slot(world: &World, solution_id: &str, day: u8, period: u8) -> NewAssignment {
  NewAssignment {
    solution_id: solution_id.to_string(),
    week_start: week(),
    class_id: world.class.id.clone(),
    subject_id: world.math.id.clone(),
    teacher_id: world.teachers[0].id.clone(),
    room_id: world.rooms[0].id.clone(),
    day,
    period,
    hard_lock: false,
  }
}

async fn timetable(store: &MemStore) -> Vec<Assignment> {
  store.list(TENANT, &ListQuery::all()).await.unwrap()
}

// ─── Demand backfill ─────────────────────────────────────────────────────────

#[tokio::test]
async fn backfill_synthesizes_demand_for_the_curriculum() {
  let store = MemStore::new();
  let world = seed_world(&store).await;

  let rows = ensure_demand(&store, TENANT, week()).await.unwrap();
  assert_eq!(rows.len(), 2);

  let math = rows.iter().find(|d| d.subject_id == world.math.id).unwrap();
  assert_eq!(math.periods_required, DEFAULT_PERIODS);
  assert_eq!(math.source, DemandSource::Manual);

  let sci = rows.iter().find(|d| d.subject_id == world.sci.id).unwrap();
  assert_eq!(sci.periods_required, LAB_PERIODS);
  assert_eq!(sci.source, DemandSource::Manual);
}

#[tokio::test]
async fn backfill_is_idempotent_and_preserves_edits() {
  let store = MemStore::new();
  let world = seed_world(&store).await;

  ensure_demand(&store, TENANT, week()).await.unwrap();
  upsert_demand(&store, TENANT, &demand_draft(&world, &world.math.id, 3, DemandSource::Manual))
    .await
    .unwrap();

  let rows = ensure_demand(&store, TENANT, week()).await.unwrap();
  assert_eq!(rows.len(), 2, "repeat backfill must not add rows");
  let math = rows.iter().find(|d| d.subject_id == world.math.id).unwrap();
  assert_eq!(math.periods_required, 3, "operator edit must survive the backfill");
}

#[tokio::test]
async fn classes_without_curriculum_take_every_subject() {
  let store = MemStore::new();
  let world = seed_entities(&store).await;

  let rows = ensure_demand(&store, TENANT, week()).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|d| d.class_id == world.class.id));
  assert!(rows.iter().any(|d| d.subject_id == world.math.id));
  assert!(rows.iter().any(|d| d.subject_id == world.sci.id));
}

#[tokio::test]
async fn forecast_rows_overwrite_manual_values() {
  let store = MemStore::new();
  let world = seed_world(&store).await;
  ensure_demand(&store, TENANT, week()).await.unwrap();

  let fake = FakeSolver::forecasting(vec![ForecastItem {
    class_id: world.class.id.clone(),
    subject_id: world.math.id.clone(),
    periods_required: 4,
  }]);
  let rows = refresh_forecast(&store, &fake, TENANT, week()).await.unwrap();

  assert_eq!(rows.len(), 2);
  let math = rows.iter().find(|d| d.subject_id == world.math.id).unwrap();
  assert_eq!(math.periods_required, 4);
  assert_eq!(math.source, DemandSource::Ml);
  let sci = rows.iter().find(|d| d.subject_id == world.sci.id).unwrap();
  assert_eq!(sci.source, DemandSource::Manual, "unforecast rows stay manual");
}

#[tokio::test]
async fn a_dead_forecaster_degrades_to_the_backfill() {
  let store = MemStore::new();
  seed_world(&store).await;

  let rows = refresh_forecast(&store, &FakeSolver::forecast_down(), TENANT, week())
    .await
    .unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|d| d.source == DemandSource::Manual));
}

// ─── Solve pipeline ──────────────────────────────────────────────────────────

#[tokio::test]
async fn solves_submit_dense_sequential_ids() {
  let store = MemStore::new();
  let world = seed_world(&store).await;
  add_lock(
    &store,
    TENANT,
    &NewHardLock {
      week_start: week(),
      class_id: world.class.id.clone(),
      subject_id: world.math.id.clone(),
      teacher_id: world.teachers[0].id.clone(),
      room_id: world.rooms[0].id.clone(),
      day: 0,
      period: 0,
    },
  )
  .await
  .unwrap();

  let fake = FakeSolver::infeasible();
  let gate = SolveGate::new();
  run_solve(&store, &fake, &gate, TENANT, week(), true).await.unwrap();

  let request = fake.last_request();
  assert_eq!(request.tenant, TENANT);
  assert_eq!(request.week_start, week());
  assert!(request.strict);

  assert_eq!(request.classes.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1]);
  assert_eq!(request.subjects.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
  assert_eq!(request.teachers.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
  assert_eq!(request.rooms.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

  // Eligibility was seeded teacher 1 → MATH, teacher 2 → SCI.
  assert_eq!(request.teacher_subjects[0].teacher_id, 1);
  assert_eq!(request.teacher_subjects[0].subject_id, 1);
  assert_eq!(request.teacher_subjects[1].teacher_id, 2);
  assert_eq!(request.teacher_subjects[1].subject_id, 2);

  let mut demand: Vec<(i64, i64, i64)> = request
    .demand
    .iter()
    .map(|d| (d.class_id, d.subject_id, d.periods_required))
    .collect();
  demand.sort();
  assert_eq!(demand, vec![(1, 1, DEFAULT_PERIODS), (1, 2, LAB_PERIODS)]);

  assert_eq!(request.locks.len(), 1);
  assert_eq!(request.locks[0].class_id, 1);
  assert_eq!(request.locks[0].teacher_id, 1);
  assert_eq!(request.locks[0].room_id, 1);

  // No penalties row seeded, so the defaults travel.
  assert_eq!(request.penalties.teacher_gap, 3);
  assert_eq!(request.penalties.uneven_subject, 2);
  assert_eq!(request.penalties.room_mismatch, 4);
  assert_eq!(request.penalties.early_or_late, 1);
}

#[tokio::test]
async fn dangling_references_fail_before_submission() {
  let store = MemStore::new();
  let world = seed_world(&store).await;
  let ghost = EntityId::Str("ghost".to_string());
  for _ in 0..2 {
    store
      .insert::<TeacherSubject>(
        TENANT,
        &NewTeacherSubject { teacher_id: ghost.clone(), subject_id: world.math.id.clone() },
      )
      .await
      .unwrap();
  }

  let fake = FakeSolver::infeasible();
  let gate = SolveGate::new();
  let err = run_solve(&store, &fake, &gate, TENANT, week(), true).await.unwrap_err();

  match err {
    Error::Validation(refs) => {
      assert_eq!(refs.len(), 1, "duplicate reports collapse to one");
      assert_eq!(refs[0].field, "teacher_subjects.teacher_id");
      assert_eq!(refs[0].id, "ghost");
    }
    other => panic!("expected a validation error, got {other:?}"),
  }
  assert_eq!(fake.calls(), 0, "the solver must never see an invalid instance");
}

#[tokio::test]
async fn infeasible_weeks_write_nothing() {
  let store = MemStore::new();
  seed_world(&store).await;

  let fake = FakeSolver::infeasible();
  let gate = SolveGate::new();
  let outcome = run_solve(&store, &fake, &gate, TENANT, week(), false).await.unwrap();

  assert_eq!(outcome, SolveOutcome::Infeasible);
  assert!(!fake.last_request().strict);
  assert!(timetable(&store).await.is_empty());
}

#[tokio::test]
async fn a_solution_batch_replaces_its_predecessor() {
  let store = MemStore::new();
  let world = seed_world(&store).await;

  // Stale rows from an interrupted earlier run of the same solution.
  store
    .insert_many::<Assignment>(TENANT, &[slot(&world, "s-1", 3, 3), slot(&world, "s-1", 4, 4)])
    .await
    .unwrap();

  let fake = FakeSolver::solved(SolveResponse {
    solution_id: Some("s-1".to_string()),
    objective: Some(12.0),
    assignments: vec![WireAssignment {
      class_id: 1,
      subject_id: 1,
      teacher_id: 1,
      room_id: 1,
      day: 0,
      period: 2,
      hard_lock: false,
    }],
  });
  let gate = SolveGate::new();
  let outcome = run_solve(&store, &fake, &gate, TENANT, week(), true).await.unwrap();

  assert_eq!(
    outcome,
    SolveOutcome::Solved { solution_id: "s-1".to_string(), objective: Some(12.0) }
  );

  let rows = timetable(&store).await;
  assert_eq!(rows.len(), 1, "the stale batch is fully replaced");
  assert_eq!(rows[0].day, 0);
  assert_eq!(rows[0].period, 2);
  // Native ids round-tripped through the dense map.
  assert_eq!(rows[0].class_id, world.class.id);
  assert_eq!(rows[0].subject_id, world.math.id);
  assert_eq!(rows[0].teacher_id, world.teachers[0].id);
  assert_eq!(rows[0].room_id, world.rooms[0].id);
}

#[tokio::test]
async fn earlier_solutions_survive_a_new_solve() {
  let store = MemStore::new();
  let world = seed_world(&store).await;
  let gate = SolveGate::new();

  let first = FakeSolver::solved(SolveResponse {
    solution_id: Some("s-1".to_string()),
    objective: Some(10.0),
    assignments: vec![WireAssignment {
      class_id: 1,
      subject_id: 1,
      teacher_id: 1,
      room_id: 1,
      day: 0,
      period: 0,
      hard_lock: false,
    }],
  });
  run_solve(&store, &first, &gate, TENANT, week(), true).await.unwrap();

  let second = FakeSolver::solved(SolveResponse {
    solution_id: Some("s-2".to_string()),
    objective: Some(8.0),
    assignments: vec![WireAssignment {
      class_id: 1,
      subject_id: 2,
      teacher_id: 2,
      room_id: 2,
      day: 1,
      period: 1,
      hard_lock: false,
    }],
  });
  run_solve(&store, &second, &gate, TENANT, week(), true).await.unwrap();

  let s1 = enriched_solution(&store, TENANT, "s-1", None).await.unwrap();
  assert_eq!(s1.len(), 1);
  assert_eq!(s1[0].day, 0);
  assert_eq!(s1[0].subject_id, world.math.id);

  let s2 = enriched_solution(&store, TENANT, "s-2", None).await.unwrap();
  assert_eq!(s2.len(), 1);
  assert_eq!(s2[0].day, 1);
  assert_eq!(s2[0].subject_id, world.sci.id);
}

#[tokio::test]
async fn solver_failures_release_the_gate() {
  let store = MemStore::new();
  seed_world(&store).await;
  let fake = FakeSolver::down();
  let gate = SolveGate::new();

  let err = run_solve(&store, &fake, &gate, TENANT, week(), true).await.unwrap_err();
  assert!(matches!(err, Error::Solver(SolverError::Transport(_))));

  // A retry reaches the solver again instead of bouncing off the gate.
  let err = run_solve(&store, &fake, &gate, TENANT, week(), true).await.unwrap_err();
  assert!(matches!(err, Error::Solver(SolverError::Transport(_))));
  assert_eq!(fake.calls(), 2);
}

#[tokio::test]
async fn out_of_range_solution_indexes_are_protocol_errors() {
  let store = MemStore::new();
  seed_world(&store).await;

  let fake = FakeSolver::solved(SolveResponse {
    solution_id: Some("s-1".to_string()),
    objective: None,
    assignments: vec![WireAssignment {
      class_id: 99,
      subject_id: 1,
      teacher_id: 1,
      room_id: 1,
      day: 0,
      period: 0,
      hard_lock: false,
    }],
  });
  let gate = SolveGate::new();
  let err = run_solve(&store, &fake, &gate, TENANT, week(), true).await.unwrap_err();

  match err {
    Error::Solver(SolverError::Protocol(msg)) => {
      assert!(msg.contains("class_id"), "unexpected message: {msg}");
    }
    other => panic!("expected a protocol error, got {other:?}"),
  }
  assert!(timetable(&store).await.is_empty(), "nothing may persist from a broken solution");
}

// ─── Enrichment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn enriched_rows_explain_lab_placement() {
  let store = MemStore::new();
  let world = seed_world(&store).await;

  let fake = FakeSolver::solved(SolveResponse {
    solution_id: Some("s-1".to_string()),
    objective: None,
    assignments: vec![
      // SCI in the lab, then SCI in the plain room.
      WireAssignment {
        class_id: 1,
        subject_id: 2,
        teacher_id: 2,
        room_id: 2,
        day: 0,
        period: 0,
        hard_lock: false,
      },
      WireAssignment {
        class_id: 1,
        subject_id: 2,
        teacher_id: 2,
        room_id: 1,
        day: 0,
        period: 1,
        hard_lock: false,
      },
    ],
  });
  let gate = SolveGate::new();
  run_solve(&store, &fake, &gate, TENANT, week(), true).await.unwrap();

  let rows = enriched_solution(&store, TENANT, "s-1", None).await.unwrap();
  assert_eq!(rows.len(), 2);

  let in_lab = &rows[0];
  assert!(in_lab.is_lab && in_lab.room_is_lab);
  assert_eq!(in_lab.class_label, "C1-A");
  assert_eq!(in_lab.subject_label, "Science");
  assert_eq!(in_lab.teacher_name, "Ben Whitfield");
  assert_eq!(in_lab.room_label, "LAB1");
  assert!(
    in_lab
      .rationale
      .contains(&"Lab subject scheduled in lab room (preferred).".to_string())
  );

  let mismatched = &rows[1];
  assert!(mismatched.is_lab && !mismatched.room_is_lab);
  assert!(
    mismatched
      .rationale
      .contains(&"Lab subject in non-lab room (penalized).".to_string())
  );
  assert_eq!(
    mismatched.rationale.last().unwrap(),
    "Soft penalties minimized (gaps, lab mismatch)."
  );
  assert_eq!(mismatched.subject_id, world.sci.id);
}

#[tokio::test]
async fn locked_slots_lead_the_rationale() {
  let store = MemStore::new();
  let world = seed_world(&store).await;
  let mut pinned = slot(&world, "s-1", 0, 0);
  pinned.hard_lock = true;
  store.insert::<Assignment>(TENANT, &pinned).await.unwrap();

  let rows = enriched_solution(&store, TENANT, "s-1", None).await.unwrap();
  assert_eq!(rows[0].rationale[0], "Locked by user; solver kept this slot.");
  assert!(rows[0].hard_lock);
}

#[tokio::test]
async fn solution_lookup_narrows_to_one_teacher() {
  let store = MemStore::new();
  let world = seed_world(&store).await;

  let mut for_ben = slot(&world, "s-1", 1, 0);
  for_ben.teacher_id = world.teachers[1].id.clone();
  store
    .insert_many::<Assignment>(TENANT, &[slot(&world, "s-1", 0, 0), for_ben])
    .await
    .unwrap();

  let rows = enriched_solution(&store, TENANT, "s-1", Some(&world.teachers[1].id))
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].teacher_name, "Ben Whitfield");
}

#[tokio::test]
async fn unknown_solutions_are_not_found() {
  let store = MemStore::new();
  seed_world(&store).await;

  let err = enriched_solution(&store, TENANT, "no-such-run", None).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn rows_sort_by_day_period_and_class() {
  let store = MemStore::new();
  let world = seed_world(&store).await;
  let second: Class = store
    .insert(TENANT, &NewClass { code: "B2".into(), section: "A".into(), size: 28 })
    .await
    .unwrap();

  let mut other_class = slot(&world, "s-1", 0, 1);
  other_class.class_id = second.id.clone();
  store
    .insert_many::<Assignment>(
      TENANT,
      &[
        slot(&world, "s-1", 1, 0),
        slot(&world, "s-1", 0, 1),
        other_class,
        slot(&world, "s-1", 0, 0),
      ],
    )
    .await
    .unwrap();

  let rows = enriched_solution(&store, TENANT, "s-1", None).await.unwrap();
  let order: Vec<(u8, u8, String)> = rows
    .iter()
    .map(|r| (r.day, r.period, r.class_label.clone()))
    .collect();
  assert_eq!(
    order,
    vec![
      (0, 0, "C1-A".to_string()),
      (0, 1, "B2-A".to_string()),
      (0, 1, "C1-A".to_string()),
      (1, 0, "C1-A".to_string()),
    ]
  );
}

// ─── Locks ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn locks_append_per_week() {
  let store = MemStore::new();
  let world = seed_world(&store).await;

  let lock = add_lock(
    &store,
    TENANT,
    &NewHardLock {
      week_start: week(),
      class_id: world.class.id.clone(),
      subject_id: world.sci.id.clone(),
      teacher_id: world.teachers[1].id.clone(),
      room_id: world.rooms[1].id.clone(),
      day: 2,
      period: 3,
    },
  )
  .await
  .unwrap();

  assert_eq!(lock.week_start, week());
  assert_eq!(lock.day, 2);

  let stored: Vec<HardLock> = store.list(TENANT, &ListQuery::all()).await.unwrap();
  assert_eq!(stored.len(), 1);
  assert_eq!(stored[0].subject_id, world.sci.id);
}

// ─── Demand listing ──────────────────────────────────────────────────────────

#[tokio::test]
async fn demand_rows_scope_to_their_week() {
  let store = MemStore::new();
  let world = seed_world(&store).await;
  ensure_demand(&store, TENANT, week()).await.unwrap();
  let next_week = week() + chrono::Days::new(7);
  ensure_demand(&store, TENANT, next_week).await.unwrap();

  let all: Vec<DemandForecast> = store.list(TENANT, &ListQuery::all()).await.unwrap();
  assert_eq!(all.len(), 4);
  assert_eq!(all.iter().filter(|d| d.week_start == week()).count(), 2);
  assert!(all.iter().any(|d| d.week_start == next_week && d.subject_id == world.sci.id));
}
