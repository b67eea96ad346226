//! HTTP client for the external optimization service.

use std::{future::Future, time::Duration};

use serde::{Serialize, de::DeserializeOwned};

use crate::wire::{ForecastRequest, ForecastResponse, SolveRequest, SolveResponse};

/// Failures talking to the solver.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
  /// The service could not be reached, timed out, or answered with a
  /// non-success status. Carries the raw payload when one was readable.
  #[error("solver transport: {0}")]
  Transport(String),

  /// The service answered 2xx but the payload broke the wire contract.
  #[error("solver protocol: {0}")]
  Protocol(String),
}

/// The external optimization service: one endpoint solving a prepared
/// instance, one forecasting weekly demand.
pub trait SolverApi: Send + Sync {
  fn solve<'a>(
    &'a self,
    request: &'a SolveRequest,
  ) -> impl Future<Output = Result<SolveResponse, SolverError>> + Send + 'a;

  fn forecast<'a>(
    &'a self,
    request: &'a ForecastRequest,
  ) -> impl Future<Output = Result<ForecastResponse, SolverError>> + Send + 'a;
}

const SOLVE_TIMEOUT: Duration = Duration::from_secs(120);
const FORECAST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`SolverApi`] over HTTP.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct HttpSolver {
  base_url: String,
  client:   reqwest::Client,
}

impl HttpSolver {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), client: reqwest::Client::new() }
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.base_url.trim_end_matches('/'))
  }

  async fn post<B, T>(&self, path: &str, body: &B, timeout: Duration) -> Result<T, SolverError>
  where
    B: Serialize,
    T: DeserializeOwned,
  {
    let resp = self
      .client
      .post(self.url(path))
      .timeout(timeout)
      .json(body)
      .send()
      .await
      .map_err(|e| SolverError::Transport(format!("{path}: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
      let payload = resp.text().await.unwrap_or_default();
      return Err(SolverError::Transport(format!("{path} → {status}: {payload}")));
    }
    resp
      .json()
      .await
      .map_err(|e| SolverError::Protocol(format!("{path}: {e}")))
  }
}

impl SolverApi for HttpSolver {
  async fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolverError> {
    self.post("/optimize/solve", request, SOLVE_TIMEOUT).await
  }

  async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResponse, SolverError> {
    self.post("/demand/forecast", request, FORECAST_TIMEOUT).await
  }
}
