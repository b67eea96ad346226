//! JSON REST API for rota.
//!
//! Exposes an axum [`Router`] backed by any [`rota_core::store::EntityStore`]
//! and any [`rota_engine::SolverApi`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rota_api::api_router(state.clone()))
//! ```

pub mod crud;
pub mod demand;
pub mod error;
pub mod optimize;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rota_core::store::EntityStore;
use rota_engine::{SolveGate, SolverApi};

pub use error::ApiError;

// ─── State ────────────────────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
pub struct ApiState<S, C> {
  pub store:          S,
  pub solver:         C,
  pub gate:           SolveGate,
  pub default_tenant: String,
}

impl<S, C> ApiState<S, C> {
  pub fn new(store: S, solver: C, default_tenant: impl Into<String>) -> Self {
    Self {
      store,
      solver,
      gate: SolveGate::new(),
      default_tenant: default_tenant.into(),
    }
  }

  /// Tenant for a request: the explicit parameter, else the configured
  /// default.
  pub fn tenant<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
    requested.unwrap_or(&self.default_tenant)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(state: Arc<ApiState<S, C>>) -> Router<()>
where
  S: EntityStore + 'static,
  C: SolverApi + 'static,
{
  Router::new()
    // Entity collections
    .route("/crud/{entity}", get(crud::list::<S, C>).post(crud::create::<S, C>))
    .route(
      "/crud/{entity}/{id}",
      get(crud::get_one::<S, C>)
        .put(crud::update_one::<S, C>)
        .delete(crud::delete_one::<S, C>),
    )
    // Demand
    .route(
      "/demand/forecast",
      get(demand::current::<S, C>).post(demand::refresh::<S, C>),
    )
    // Optimization
    .route("/optimize/solve", post(optimize::solve::<S, C>))
    .route("/optimize/solution/{id}", get(optimize::solution::<S, C>))
    .route("/optimize/lock", post(optimize::lock::<S, C>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
