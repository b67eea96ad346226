//! rota server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! configured storage backend, and serves the JSON API. With `--seed-demo`
//! the demo tenant is provisioned idempotently before serving.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use rota_api::ApiState;
use rota_core::store::EntityStore;
use rota_engine::HttpSolver;
use rota_server::{ServerConfig, StoreBackend, seed};
use rota_store_file::FileStore;
use rota_store_mem::MemStore;
use rota_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "rota timetabling server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Idempotently provision the `demo` tenant before serving.
  #[arg(long)]
  seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let config = rota_server::load_config(&cli.config)?;

  match config.backend {
    StoreBackend::Sqlite => {
      if let Some(parent) = config.db_path.parent()
        && !parent.as_os_str().is_empty()
      {
        std::fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {parent:?}"))?;
      }
      let store = SqliteStore::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open database at {:?}", config.db_path))?;
      run(&cli, &config, store).await
    }
    StoreBackend::File => {
      let store = FileStore::open(&config.data_dir)
        .await
        .with_context(|| format!("failed to open data directory {:?}", config.data_dir))?;
      run(&cli, &config, store).await
    }
    StoreBackend::Memory => run(&cli, &config, MemStore::new()).await,
  }
}

async fn run<S: EntityStore + 'static>(
  cli: &Cli,
  config: &ServerConfig,
  store: S,
) -> anyhow::Result<()> {
  if cli.seed_demo {
    seed::seed_demo(&store, config.periods_per_day)
      .await
      .context("demo provisioning failed")?;
  }

  let solver = HttpSolver::new(&config.solver_url);
  let state = Arc::new(ApiState::new(store, solver, config.default_tenant.clone()));

  rota_server::serve(config, state).await
}
