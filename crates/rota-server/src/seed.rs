//! Idempotent demo-tenant provisioning.
//!
//! Every write goes through the store's natural-key upsert, so re-running
//! `--seed-demo` against an already-provisioned database changes nothing.

use rota_core::{
  entities::{
    Class, ClassSubject, Penalties, Room, RoomAvailability, Subject, Teacher,
    TeacherAvailability, TeacherSubject, Tenant,
  },
  store::{EntityStore, Filter, Patch},
};

const TENANT: &str = "demo";
const DAYS: u8 = 5;

const CLASSES: &[(&str, &str, i64)] =
  &[("8", "A", 35), ("8", "B", 34), ("9", "A", 36), ("9", "B", 35), ("10", "A", 38)];

const SUBJECTS: &[(&str, &str, bool)] = &[
  ("MATH", "Mathematics", false),
  ("SCI", "Science", true),
  ("ENG", "English", false),
  ("SOC", "Social Studies", false),
  ("LANG", "Language", false),
  ("COMP", "Computer Science", true),
];

const TEACHERS: &[&str] = &[
  "Asha Rao",
  "Vikram Iyer",
  "Neha Sharma",
  "Rohan Mehta",
  "Divya Nair",
  "Thomas George",
  "Sana Khan",
  "Arjun Pillai",
  "Ritu Verma",
  "Karthik Menon",
  "Meera Das",
  "Sandeep Bose",
];

/// `(teacher index, subject index)` eligibility pairs. Every subject has at
/// least two eligible teachers so the demo data set is solvable.
const ELIGIBILITY: &[(usize, usize)] = &[
  (0, 0),
  (3, 0),
  (9, 0), // MATH
  (1, 1),
  (4, 1), // SCI
  (2, 2),
  (5, 2), // ENG
  (6, 3),
  (11, 3), // SOC
  (7, 4),
  (10, 4), // LANG
  (8, 5),
  (9, 5), // COMP
];

const ROOMS: &[(&str, i64, bool)] = &[
  ("R101", 40, false),
  ("R201", 40, false),
  ("LAB1", 30, true),
  ("R102", 40, false),
  ("R202", 40, false),
  ("LAB2", 30, true),
];

/// Provision the `demo` tenant: five classes, six subjects (two lab),
/// twelve teachers, six rooms (two lab), eligibility pairs, a full
/// curriculum, dense availability grids `periods_per_day` wide, and the
/// default penalty row.
pub async fn seed_demo<S: EntityStore>(store: &S, periods_per_day: u8) -> anyhow::Result<()> {
  store
    .upsert::<Tenant>(
      TENANT,
      &Filter::new().eq("slug", TENANT),
      &Patch::new().set("name", "Demo School"),
    )
    .await?;

  let mut classes = Vec::with_capacity(CLASSES.len());
  for (code, section, size) in CLASSES {
    let row: Class = store
      .upsert(
        TENANT,
        &Filter::new().eq("code", *code).eq("section", *section),
        &Patch::new().set("size", *size),
      )
      .await?;
    classes.push(row);
  }

  let mut subjects = Vec::with_capacity(SUBJECTS.len());
  for (code, name, is_lab) in SUBJECTS {
    let row: Subject = store
      .upsert(
        TENANT,
        &Filter::new().eq("code", *code),
        &Patch::new().set("name", *name).set("is_lab", *is_lab),
      )
      .await?;
    subjects.push(row);
  }

  let mut teachers = Vec::with_capacity(TEACHERS.len());
  for name in TEACHERS {
    let row: Teacher =
      store.upsert(TENANT, &Filter::new().eq("name", *name), &Patch::new()).await?;
    teachers.push(row);
  }

  let mut rooms = Vec::with_capacity(ROOMS.len());
  for (code, capacity, is_lab) in ROOMS {
    let row: Room = store
      .upsert(
        TENANT,
        &Filter::new().eq("code", *code),
        &Patch::new().set("capacity", *capacity).set("is_lab", *is_lab),
      )
      .await?;
    rooms.push(row);
  }

  for (t, s) in ELIGIBILITY {
    store
      .upsert::<TeacherSubject>(
        TENANT,
        &Filter::new()
          .eq("teacher_id", &teachers[*t].id)
          .eq("subject_id", &subjects[*s].id),
        &Patch::new(),
      )
      .await?;
  }

  // Full curriculum: every class takes every subject.
  for class in &classes {
    for subject in &subjects {
      store
        .upsert::<ClassSubject>(
          TENANT,
          &Filter::new().eq("class_id", &class.id).eq("subject_id", &subject.id),
          &Patch::new(),
        )
        .await?;
    }
  }

  // Dense availability grids; the solver treats an absent slot as
  // unavailable, so every (entity, day, period) gets a row.
  for teacher in &teachers {
    for day in 0..DAYS {
      for period in 0..periods_per_day {
        store
          .upsert::<TeacherAvailability>(
            TENANT,
            &Filter::new()
              .eq("teacher_id", &teacher.id)
              .eq("day", day)
              .eq("period", period),
            &Patch::new().set("available", true),
          )
          .await?;
      }
    }
  }
  for room in &rooms {
    for day in 0..DAYS {
      for period in 0..periods_per_day {
        store
          .upsert::<RoomAvailability>(
            TENANT,
            &Filter::new().eq("room_id", &room.id).eq("day", day).eq("period", period),
            &Patch::new().set("available", true),
          )
          .await?;
      }
    }
  }

  store.upsert::<Penalties>(TENANT, &Filter::new(), &Patch::new()).await?;

  tracing::info!(
    tenant = TENANT,
    classes = classes.len(),
    subjects = subjects.len(),
    teachers = teachers.len(),
    rooms = rooms.len(),
    periods_per_day,
    "demo tenant provisioned"
  );
  Ok(())
}
