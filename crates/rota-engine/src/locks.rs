//! Hard locks: user pins the solver must keep verbatim.

use rota_core::{
  entities::{HardLock, NewHardLock},
  store::EntityStore,
};

use crate::error::{Error, Result};

/// Record a pinned slot for its week.
///
/// Locks are append-only and constrain every subsequent solve for that
/// (tenant, week_start) until superseded by data changes; there is no
/// unlock operation.
pub async fn add_lock<S: EntityStore>(
  store: &S,
  tenant: &str,
  draft: &NewHardLock,
) -> Result<HardLock> {
  store.insert(tenant, draft).await.map_err(Error::store)
}
