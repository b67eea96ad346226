//! Engine error and result types.

use chrono::NaiveDate;

use crate::{normalize::UnmappedRef, solver::SolverError};

/// Failures of the solve pipeline and its supporting operations.
///
/// An infeasible week is not an error; it is reported through
/// [`crate::solve::SolveOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The storage backend failed underneath the engine.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A solve is already in flight for this (tenant, week).
  #[error("a solve is already running for tenant {tenant}, week {week_start}")]
  Busy { tenant: String, week_start: NaiveDate },

  /// The instance references rows that do not exist in this tenant.
  /// Raised before any network call; the caller fixes the data and retries.
  #[error("solve instance has {} unmapped reference(s)", .0.len())]
  Validation(Vec<UnmappedRef>),

  /// The external solver could not be reached or broke the wire contract.
  #[error(transparent)]
  Solver(#[from] SolverError),

  /// A requested row or solution does not exist.
  #[error("{0} not found")]
  NotFound(String),
}

impl Error {
  /// Wrap a backend error without naming the backend's error type.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }
}

pub type Result<T> = std::result::Result<T, Error>;
