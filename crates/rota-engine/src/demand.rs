//! Weekly demand rows and their backfill.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rota_core::{
  entities::{Class, ClassSubject, DemandForecast, DemandSource, NewDemandForecast, Subject},
  id::EntityId,
  store::{EntityStore, Filter, ListQuery, Patch},
};
use tracing::warn;

use crate::{
  error::{Error, Result},
  solver::SolverApi,
  wire::ForecastRequest,
};

/// Weekly periods the backfill assigns a lab subject.
pub const LAB_PERIODS: i64 = 2;
/// Weekly periods the backfill assigns any other subject.
pub const DEFAULT_PERIODS: i64 = 5;

fn week_filter(week_start: NaiveDate) -> Filter {
  Filter::new().eq("week_start", week_start.to_string())
}

fn source_value(source: DemandSource) -> &'static str {
  match source {
    DemandSource::Manual => "manual",
    DemandSource::Ml => "ml",
  }
}

/// Upsert one demand row on its (week, class, subject) natural key.
///
/// Concurrent calls against the same key converge on a single row, so
/// repeated backfills and forecast merges never raise duplicate errors.
pub async fn upsert_demand<S: EntityStore>(
  store: &S,
  tenant: &str,
  draft: &NewDemandForecast,
) -> Result<DemandForecast> {
  let key = Filter::new()
    .eq("week_start", draft.week_start.to_string())
    .eq("class_id", &draft.class_id)
    .eq("subject_id", &draft.subject_id);
  let patch = Patch::new()
    .set("periods_required", draft.periods_required)
    .set("source", source_value(draft.source));
  store.upsert(tenant, &key, &patch).await.map_err(Error::store)
}

/// Backfill missing demand rows for one week, then return the full week.
///
/// Every (class, taught subject) pair gets a row; pairs that already have
/// one keep their stored value, so operator edits and forecast results
/// survive repeat calls. A class with no curriculum edges takes every
/// tenant subject.
pub async fn ensure_demand<S: EntityStore>(
  store: &S,
  tenant: &str,
  week_start: NaiveDate,
) -> Result<Vec<DemandForecast>> {
  let week = ListQuery::matching(week_filter(week_start));
  let existing: Vec<DemandForecast> = store.list(tenant, &week).await.map_err(Error::store)?;
  let have: HashSet<(&EntityId, &EntityId)> =
    existing.iter().map(|d| (&d.class_id, &d.subject_id)).collect();

  let all = ListQuery::all();
  let classes: Vec<Class> = store.list(tenant, &all).await.map_err(Error::store)?;
  let subjects: Vec<Subject> = store.list(tenant, &all).await.map_err(Error::store)?;
  let curriculum: Vec<ClassSubject> = store.list(tenant, &all).await.map_err(Error::store)?;

  let lab: HashMap<&EntityId, bool> = subjects.iter().map(|s| (&s.id, s.is_lab)).collect();
  let mut taught: HashMap<&EntityId, Vec<&EntityId>> = HashMap::new();
  for edge in &curriculum {
    taught.entry(&edge.class_id).or_default().push(&edge.subject_id);
  }
  let every: Vec<&EntityId> = subjects.iter().map(|s| &s.id).collect();

  for class in &classes {
    let subs = taught.get(&class.id).unwrap_or(&every);
    for subject_id in subs {
      if have.contains(&(&class.id, *subject_id)) {
        continue;
      }
      let periods = if lab.get(*subject_id).copied().unwrap_or(false) {
        LAB_PERIODS
      } else {
        DEFAULT_PERIODS
      };
      let draft = NewDemandForecast {
        week_start,
        class_id: class.id.clone(),
        subject_id: (*subject_id).clone(),
        periods_required: periods,
        source: DemandSource::Manual,
      };
      upsert_demand(store, tenant, &draft).await?;
    }
  }

  store.list(tenant, &week).await.map_err(Error::store)
}

/// Pull fresh demand from the forecasting service, merge it in, then
/// backfill whatever the forecast did not cover.
///
/// A solve must stay runnable while the forecaster is down: transport and
/// protocol failures degrade to a warning and an empty item set.
pub async fn refresh_forecast<S, C>(
  store: &S,
  solver: &C,
  tenant: &str,
  week_start: NaiveDate,
) -> Result<Vec<DemandForecast>>
where
  S: EntityStore,
  C: SolverApi,
{
  let request = ForecastRequest { tenant: tenant.to_string(), week_start };
  let items = match solver.forecast(&request).await {
    Ok(resp) => resp.items,
    Err(e) => {
      warn!(tenant, %week_start, error = %e, "demand forecast unavailable, keeping stored rows");
      Vec::new()
    }
  };

  for item in &items {
    let draft = NewDemandForecast {
      week_start,
      class_id: item.class_id.clone(),
      subject_id: item.subject_id.clone(),
      periods_required: item.periods_required,
      source: DemandSource::Ml,
    };
    upsert_demand(store, tenant, &draft).await?;
  }

  ensure_demand(store, tenant, week_start).await
}
