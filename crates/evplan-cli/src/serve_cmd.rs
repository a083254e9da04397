//! `evplan serve`: JSON HTTP surface over the same pipeline and collection.
//!
//! ```text
//! POST   /generate-plan     FormInput JSON -> EventPlan JSON (persisted)
//! GET    /api/plans         all plans, newest first
//! DELETE /api/plans/{id}    204 whether or not the id existed
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use evplan_core::{FormInput, PlanError, PlanPipeline};
use evplan_store::{EventList, StoreError};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        let status = match err {
            PlanError::Validation { .. } => StatusCode::BAD_REQUEST,
            PlanError::Network(_) | PlanError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.user_message().to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::internal(format!("failed to save plans: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    list: Arc<Mutex<EventList>>,
    pipeline: PlanPipeline,
}

impl AppState {
    pub fn new(list: EventList, pipeline: PlanPipeline) -> Self {
        Self {
            list: Arc::new(Mutex::new(list)),
            pipeline,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/generate-plan", post(generate_plan))
        .route("/api/plans", get(list_plans))
        .route("/api/plans/{id}", delete(delete_plan))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(list: EventList, pipeline: PlanPipeline, bind: &str, port: u16) -> Result<()> {
    let app = build_router(AppState::new(list, pipeline));
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("evplan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("evplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C; shutting down");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn generate_plan(
    State(state): State<AppState>,
    Json(input): Json<FormInput>,
) -> Result<Response, AppError> {
    // The lock is only taken once the request has settled.
    let plan = state.pipeline.generate_plan(&input).await?;
    let mut list = state.list.lock().await;
    list.insert_front(plan.clone())?;
    Ok(Json(plan).into_response())
}

async fn list_plans(State(state): State<AppState>) -> Response {
    let list = state.list.lock().await;
    Json(list.all()).into_response()
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut list = state.list.lock().await;
    if !list.remove_by_id(id)? {
        tracing::debug!(id, "delete requested for unknown plan");
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
