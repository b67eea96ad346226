//! Solve orchestration for rota.
//!
//! Sits between the entity store and the external optimization service:
//! backfills weekly demand, maps native ids onto the dense `1..=N` index
//! space the solver expects, submits the instance over HTTP, and persists
//! the returned assignments back through the store under their native ids.
//!
//! Nothing in this crate schedules anything itself; the combinatorial work
//! lives entirely on the other side of [`SolverApi`].

pub mod demand;
pub mod enrich;
pub mod error;
pub mod locks;
pub mod normalize;
pub mod solve;
pub mod solver;
pub mod wire;

pub use error::{Error, Result};
pub use normalize::UnmappedRef;
pub use solve::{SolveGate, SolveOutcome, run_solve};
pub use solver::{HttpSolver, SolverApi, SolverError};

#[cfg(test)]
mod tests;
