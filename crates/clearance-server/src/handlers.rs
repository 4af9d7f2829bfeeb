//! HTTP request handlers for the discount engine.
//!
//! Exposes the engine configuration and the manual batch triggers using axum.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use clearance_domain::{CatalogSource, ConfigPatch, GlobalConfig, Regime, SignalSource};
use clearance_sweeper::{BatchReport, ConfigStore, Outcome, Sweeper, SweeperError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state
///
/// Manual triggers and the scheduled worker lock the same sweeper, so two
/// batches never run at once.
pub struct AppState<S, C> {
    /// Sweeper shared with the scheduled worker
    pub sweeper: Arc<Mutex<Sweeper<S, C>>>,
    /// Engine configuration, readable while a batch holds the sweeper
    pub config_store: ConfigStore,
    /// Whether the daily worker is running
    pub scheduler_running: Arc<AtomicBool>,
}

impl<S, C> AppState<S, C>
where
    S: SignalSource,
    C: CatalogSource,
{
    /// Wrap a sweeper for sharing between handlers and the worker
    pub fn new(sweeper: Sweeper<S, C>) -> Self {
        let config_store = sweeper.config_store().clone();
        Self {
            sweeper: Arc::new(Mutex::new(sweeper)),
            config_store,
            scheduler_running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<S, C> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            sweeper: Arc::clone(&self.sweeper),
            config_store: self.config_store.clone(),
            scheduler_running: Arc::clone(&self.scheduler_running),
        }
    }
}

/// Body of `POST /run`
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    /// Regime for this run only
    #[serde(default)]
    pub regime: Option<Regime>,
}

/// Body of `POST /products`
#[derive(Debug, Deserialize)]
pub struct ProductsRequest {
    /// Product codes to evaluate
    pub products: Vec<String>,
    /// Regime for this run only
    #[serde(default)]
    pub regime: Option<Regime>,
}

/// Query of `POST /products/:sku`
#[derive(Debug, Default, Deserialize)]
pub struct RegimeQuery {
    /// Regime for this evaluation only
    pub regime: Option<Regime>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Whether the daily worker is running
    pub scheduler_running: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed or empty request
    BadRequest(String),
    /// A collaborator could not be reached or answered badly
    Upstream(String),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<SweeperError> for AppError {
    fn from(e: SweeperError) -> Self {
        match e {
            SweeperError::InvalidRequest(msg) => AppError::BadRequest(msg),
            e @ SweeperError::CandidateFetch(_) => AppError::Upstream(e.to_string()),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

/// Parse a JSON body that may be omitted entirely
fn optional_body<T>(body: &Bytes) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid body: {}", e)))
}

fn report_response(report: BatchReport) -> Response {
    let status = if report.is_failed() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    (status, Json(report)).into_response()
}

/// GET /health - Liveness and scheduler state
async fn health_check<S, C>(State(state): State<AppState<S, C>>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        scheduler_running: state.scheduler_running.load(Ordering::Relaxed),
    })
}

/// GET /config/regime - Current engine configuration
async fn get_config<S, C>(State(state): State<AppState<S, C>>) -> Json<GlobalConfig> {
    Json(state.config_store.get_active_config())
}

/// PATCH /config/regime - Merge a partial configuration
async fn patch_config<S, C>(
    State(state): State<AppState<S, C>>,
    Json(patch): Json<ConfigPatch>,
) -> Json<GlobalConfig> {
    let updated = state.config_store.patch_config(patch);
    tracing::info!("Engine config updated, active regime {}", updated.active_regime);
    Json(updated)
}

/// POST /run - Full batch over every churn candidate
async fn run_all<S, C>(
    State(state): State<AppState<S, C>>,
    body: Bytes,
) -> Result<Response, AppError>
where
    S: SignalSource,
    C: CatalogSource,
{
    let request: RunRequest = optional_body(&body)?;
    let report = {
        let sweeper = state.sweeper.lock().await;
        sweeper.run_all(request.regime).await
    };
    Ok(report_response(report))
}

/// POST /products - Batch over an explicit product list
async fn run_products<S, C>(
    State(state): State<AppState<S, C>>,
    Json(request): Json<ProductsRequest>,
) -> Result<Response, AppError>
where
    S: SignalSource,
    C: CatalogSource,
{
    let report = {
        let sweeper = state.sweeper.lock().await;
        sweeper.run_products(&request.products, request.regime).await?
    };
    Ok(report_response(report))
}

/// POST /products/:sku - Evaluate and apply one product
async fn evaluate_product<S, C>(
    State(state): State<AppState<S, C>>,
    Path(sku): Path<String>,
    Query(query): Query<RegimeQuery>,
) -> Result<Response, AppError>
where
    S: SignalSource,
    C: CatalogSource,
{
    let result = {
        let sweeper = state.sweeper.lock().await;
        sweeper.evaluate_one(&sku, query.regime).await
    };

    match result {
        Ok(outcome) => Ok(Json(outcome).into_response()),
        Err(SweeperError::CandidateFetch(e)) => {
            let outcome = Outcome::error(sku.trim(), e.to_string());
            Ok((StatusCode::BAD_GATEWAY, Json(outcome)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Create the axum router with all routes
pub fn create_router<S, C>(state: AppState<S, C>) -> AxumRouter
where
    S: SignalSource + 'static,
    C: CatalogSource + 'static,
{
    AxumRouter::new()
        .route("/health", get(health_check::<S, C>))
        .route(
            "/config/regime",
            get(get_config::<S, C>).patch(patch_config::<S, C>),
        )
        .route("/run", post(run_all::<S, C>))
        .route("/products", post(run_products::<S, C>))
        .route("/products/:sku", post(evaluate_product::<S, C>))
        .with_state(state)
}
