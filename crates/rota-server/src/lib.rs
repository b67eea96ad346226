//! Server assembly for rota.
//!
//! Owns everything the binary needs around [`rota_api`]: configuration
//! loading, storage backend selection, demo provisioning, and the serve
//! loop. Application logic lives below this crate and never learns which
//! backend was opened.

pub mod seed;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Json, Router, routing::get};
use rota_api::ApiState;
use rota_core::store::EntityStore;
use rota_engine::SolverApi;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which storage technology the server opens at startup. Everything above
/// the [`EntityStore`] trait is indifferent to this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  Sqlite,
  File,
  Memory,
}

/// Runtime server configuration.
///
/// Loaded from a TOML file layered under `ROTA_*` environment variables;
/// every key has a coded default so the server runs with no file present.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub backend:         StoreBackend,
  /// SQLite database file (`backend = "sqlite"`).
  pub db_path:         PathBuf,
  /// Flat-file collection directory (`backend = "file"`).
  pub data_dir:        PathBuf,
  /// Base URL of the external optimization service.
  pub solver_url:      String,
  /// Tenant assumed when a request names none.
  pub default_tenant:  String,
  /// Periods per school day; provisioning builds availability grids this wide.
  pub periods_per_day: u8,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            4000,
      backend:         StoreBackend::Sqlite,
      db_path:         PathBuf::from("data/rota.db"),
      data_dir:        PathBuf::from("data/collections"),
      solver_url:      "http://127.0.0.1:8000".to_string(),
      default_tenant:  "demo".to_string(),
      periods_per_day: 8,
    }
  }
}

/// Load configuration from `path` (optional) and the environment.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("ROTA"))
    .build()
    .context("failed to read configuration")?;

  settings
    .try_deserialize()
    .context("failed to deserialize ServerConfig")
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full HTTP surface: a health probe at the root and the JSON API
/// nested under `/api`, with request tracing on everything.
pub fn app_router<S, C>(state: Arc<ApiState<S, C>>) -> Router<()>
where
  S: EntityStore + 'static,
  C: SolverApi + 'static,
{
  Router::new()
    .route("/", get(health))
    .nest("/api", rota_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
  Json(json!({
    "ok": true,
    "name": env!("CARGO_PKG_NAME"),
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

// ─── Serve loop ───────────────────────────────────────────────────────────────

/// Bind and serve until the process is stopped.
pub async fn serve<S, C>(config: &ServerConfig, state: Arc<ApiState<S, C>>) -> anyhow::Result<()>
where
  S: EntityStore + 'static,
  C: SolverApi + 'static,
{
  let app = app_router(state);
  let address = format!("{}:{}", config.host, config.port);

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("listening on http://{address}");

  axum::serve(listener, app).await.context("server error")
}
