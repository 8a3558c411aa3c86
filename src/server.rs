use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};

use crate::eta::estimate;
use crate::features::RawInputs;
use crate::metadata::FeatureMetadata;
use crate::model::Predictor;
use crate::part_of_day::{classify, PartOfDay};

// ---------- Server state ----------

/// Loaded once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn Predictor>,
    pub meta: Arc<FeatureMetadata>,
}

// ---------- Request/Response types ----------

#[derive(Debug, Deserialize)]
pub struct HourQuery {
    pub hour: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PartOfDayOut {
    pub hour: i64,
    pub part_of_day: PartOfDay,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictionOut {
    pub part_of_day: PartOfDay,
    pub eta_minutes: f64,
    pub eta_display: f64,
    pub message: String,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, e: impl ToString) -> ApiError {
    (status, Json(json!({ "error": e.to_string() })))
}

// ---------- Handlers ----------

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.predictor.name(),
        "version": state.predictor.version(),
    }))
}

pub async fn metadata(State(state): State<AppState>) -> Json<FeatureMetadata> {
    Json(state.meta.as_ref().clone())
}

pub async fn part_of_day(
    query: Result<Query<HourQuery>, QueryRejection>,
) -> Result<Json<PartOfDayOut>, ApiError> {
    let Query(q) = query.map_err(|e| api_error(e.status(), e.body_text()))?;
    Ok(Json(PartOfDayOut {
        hour: q.hour,
        part_of_day: classify(q.hour),
    }))
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<RawInputs>, JsonRejection>,
) -> Result<Json<PredictionOut>, ApiError> {
    let Json(payload) = payload.map_err(|e| api_error(e.status(), e.body_text()))?;
    state
        .meta
        .validate(&payload)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;

    let est = estimate(state.predictor.as_ref(), payload).map_err(|e| {
        tracing::error!(error = %e, model = state.predictor.name(), "prediction failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;

    Ok(Json(PredictionOut {
        part_of_day: est.part_of_day,
        eta_minutes: est.eta_minutes,
        eta_display: est.display_minutes(),
        message: est.message(),
    }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metadata", get(metadata))
        .route("/part-of-day", get(part_of_day))
        .route("/predict", post(predict))
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
