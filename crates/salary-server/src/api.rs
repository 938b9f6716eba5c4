//! HTTP API for predictions, form options, health checks and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use salary_core::{
    catalog::{
        self, ModelChoice, AGE_RANGE, DEFAULT_AGE, DEFAULT_EXPERIENCE, EXPERIENCE_RANGE,
        EXPERIENCE_STEP,
    },
    health::{ComponentStatus, HealthRegistry},
    InputError, PredictionError, Predictor, RawInput, FEATURE_COUNT,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub health_registry: HealthRegistry,
}

impl AppState {
    pub fn new(predictor: Predictor, health_registry: HealthRegistry) -> Self {
        Self {
            predictor,
            health_registry,
        }
    }
}

/// Body of a prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub age: u32,
    pub education: String,
    pub experience: f64,
    pub job_title: String,
    pub gender: String,
    /// Model label or alias; defaults to linear regression
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_salary: f64,
    pub formatted: String,
    pub model: ModelChoice,
    pub accuracy: u8,
    pub features: [f64; FEATURE_COUNT],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: ModelChoice,
    pub accuracy: u8,
    pub rating: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

/// Everything a form needs to offer valid choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub education_levels: Vec<String>,
    pub genders: Vec<String>,
    pub job_titles: Vec<String>,
    pub models: Vec<ModelInfo>,
    pub age: NumericBounds,
    pub experience: NumericBounds,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Request-boundary error, rendered as a JSON message
#[derive(Debug)]
pub enum ApiError {
    /// Body missing, not JSON, or not shaped like the request type
    MalformedBody(String),
    Prediction(PredictionError),
}

impl From<PredictionError> for ApiError {
    fn from(e: PredictionError) -> Self {
        Self::Prediction(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::MalformedBody(message) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid input: {}", message),
            ),
            ApiError::Prediction(e) => {
                let status = match &e {
                    PredictionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    PredictionError::ArtifactsUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    PredictionError::ModelInvocation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.to_string())
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Run one prediction
async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;

    let model = match request.model.as_deref() {
        Some(name) => name
            .parse::<ModelChoice>()
            .map_err(|e| PredictionError::InvalidInput(InputError::from(e)))?,
        None => ModelChoice::default(),
    };

    let input = RawInput::new(
        request.age,
        request.education,
        request.experience,
        request.job_title,
        request.gender,
    );
    let outcome = state.predictor.predict(&input, model).await?;

    Ok(Json(PredictResponse {
        predicted_salary: outcome.result.predicted_salary,
        formatted: outcome.result.formatted(),
        model,
        accuracy: model.accuracy_percent(),
        features: outcome.features.to_array(),
    }))
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Catalog of accepted inputs, offered only while predictions can be served
async fn options(State(state): State<Arc<AppState>>) -> Result<Json<OptionsResponse>, ApiError> {
    state
        .predictor
        .artifacts()
        .await
        .map_err(PredictionError::ArtifactsUnavailable)?;

    Ok(Json(OptionsResponse {
        education_levels: to_strings(&catalog::EDUCATION_LEVELS),
        genders: to_strings(&catalog::GENDERS),
        job_titles: to_strings(&catalog::JOB_TITLES),
        models: ModelChoice::ALL
            .iter()
            .map(|m| ModelInfo {
                name: *m,
                accuracy: m.accuracy_percent(),
                rating: m.accuracy_rating().to_string(),
            })
            .collect(),
        age: NumericBounds {
            min: *AGE_RANGE.start() as f64,
            max: *AGE_RANGE.end() as f64,
            step: 1.0,
            default: DEFAULT_AGE as f64,
        },
        experience: NumericBounds {
            min: *EXPERIENCE_RANGE.start(),
            max: *EXPERIENCE_RANGE.end(),
            step: EXPERIENCE_STEP,
            default: DEFAULT_EXPERIENCE,
        },
    }))
}

/// Health check response - 200 while serving (healthy or degraded), 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once artifacts are loaded
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("failed to encode metrics: {}", e).into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/options", get(options))
        .route("/api/v1/predict", post(predict))
        .with_state(state)
}

/// Start the API server
pub async fn serve(addr: String, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
