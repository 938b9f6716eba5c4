//! Integration tests for the prediction API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use salary_core::{
    artifacts::files,
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    ArtifactStore, Predictor,
};
use salary_server::{create_router, AppState};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Two-tree forest: job feature split, then age and education
const FOREST: &str = r#"{
    "n_features_in_": 7,
    "estimators_": [
        {
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [3, -2, -2],
            "threshold": [0.5, -2.0, -2.0],
            "value": [[[60000.0]], [[40000.0]], [[80000.0]]]
        },
        {
            "children_left": [1, 3, -1, -1, -1],
            "children_right": [2, 4, -1, -1, -1],
            "feature": [0, 1, -2, -2, -2],
            "threshold": [0.0, 1.5, -2.0, -2.0, -2.0],
            "value": [[[70000.0]], [[60000.0]], [[90000.0]], [[50000.0]], [[70000.0]]]
        }
    ]
}"#;

fn write_artifacts(dir: &Path) {
    std::fs::write(
        dir.join(files::LINEAR),
        r#"{"coef": [1000, 500, 2000, 4000, 0, 0, 0], "intercept": 60000}"#,
    )
    .unwrap();
    std::fs::write(dir.join(files::RANDOM_FOREST), FOREST).unwrap();
    std::fs::write(
        dir.join(files::JOB_TITLE_MAP),
        r#"{"Data Scientist": 90000, "Receptionist": 30000}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join(files::SCALER_AGE),
        r#"{"mean": [40.0], "scale": [10.0]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join(files::SCALER_EXPERIENCE),
        r#"{"mean": [10.0], "scale": [5.0]}"#,
    )
    .unwrap();
    std::fs::write(dir.join(files::SCALER_JOB), r#"{"mean": [60000], "scale": [20000]}"#)
        .unwrap();
}

async fn setup_test_app(dir: &Path) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::ARTIFACTS).await;
    health_registry.register(components::PREDICTOR).await;

    let predictor = Predictor::new(
        Arc::new(ArtifactStore::from_dir(dir)),
        health_registry.clone(),
        ServiceMetrics::new(),
        StructuredLogger::new("salary-predictor-test"),
    );

    let state = Arc::new(AppState::new(predictor, health_registry));
    let router = create_router(state.clone());

    (router, state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_predict(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    post_raw(app, body.to_string()).await
}

async fn post_raw(app: Router, body: String) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/predict")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn data_scientist(model: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "age": 30,
        "education": "Bachelor's",
        "experience": 5.0,
        "job_title": "Data Scientist",
        "gender": "Male",
    });
    if let Some(model) = model {
        body["model"] = serde_json::Value::from(model);
    }
    body
}

#[tokio::test]
async fn test_predict_linear_regression() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, body) = post_predict(app, data_scientist(Some("Linear Regression"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_salary"], 63500.0);
    assert_eq!(body["formatted"], "₹63,500.00/month");
    assert_eq!(body["model"], "Linear Regression");
    assert_eq!(body["accuracy"], 80);
    assert_eq!(
        body["features"],
        serde_json::json!([-1.0, 1.0, -1.0, 1.5, 0.0, 1.0, 0.0])
    );
}

#[tokio::test]
async fn test_predict_random_forest_by_alias() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, body) = post_predict(app, data_scientist(Some("random_forest"))).await;

    assert_eq!(status, StatusCode::OK);
    // Mean of the two trees: 80000 and 50000
    assert_eq!(body["predicted_salary"], 65000.0);
    assert_eq!(body["formatted"], "₹65,000.00/month");
    assert_eq!(body["model"], "Random Forest Regression");
    assert_eq!(body["accuracy"], 98);
}

#[tokio::test]
async fn test_predict_defaults_to_linear_regression() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, body) = post_predict(app, data_scientist(None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "Linear Regression");
}

#[tokio::test]
async fn test_predict_unknown_job_title_uses_fallback_mean() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, _state) = setup_test_app(dir.path()).await;

    let mut request = data_scientist(Some("Linear Regression"));
    request["job_title"] = serde_json::Value::from("Astronaut");
    let (status, body) = post_predict(app, request).await;

    // Table mean is 60000, so the scaled job feature is exactly zero
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"][3], 0.0);
    assert_eq!(body["predicted_salary"], 57500.0);
}

#[tokio::test]
async fn test_predict_unknown_model_returns_400() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, state) = setup_test_app(dir.path()).await;

    let (status, body) = post_predict(app, data_scientist(Some("Gradient Boosting"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Gradient Boosting"));
    // Rejected before the artifact set is touched
    assert!(!state.predictor.store().is_loaded());
}

#[tokio::test]
async fn test_predict_age_out_of_range_returns_400() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, _state) = setup_test_app(dir.path()).await;

    let mut request = data_scientist(None);
    request["age"] = serde_json::Value::from(17);
    let (status, body) = post_predict(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Age 17"));
}

#[tokio::test]
async fn test_predict_malformed_body_returns_400_json() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, state) = setup_test_app(dir.path()).await;

    let mut negative_age = data_scientist(None);
    negative_age["age"] = serde_json::Value::from(-3);
    let (status, body) = post_predict(app.clone(), negative_age).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid input"));

    let mut missing_experience = data_scientist(None);
    missing_experience
        .as_object_mut()
        .unwrap()
        .remove("experience");
    let (status, body) = post_predict(app.clone(), missing_experience).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("experience"));

    let (status, body) = post_raw(app, "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(!state.predictor.store().is_loaded());
}

#[tokio::test]
async fn test_predict_missing_artifacts_returns_503() {
    let dir = TempDir::new().unwrap();
    let (app, state) = setup_test_app(dir.path()).await;

    let (status, body) = post_predict(app.clone(), data_scientist(None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("Artifacts unavailable"));

    let (status, readiness) = get_json(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);

    let (status, health) = get_json(app.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["components"]["artifacts"]["status"], "unhealthy");

    // Artifacts showing up later are picked up by the next request
    write_artifacts(dir.path());
    let (status, body) = post_predict(app.clone(), data_scientist(None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_salary"], 63500.0);
    assert_eq!(state.predictor.store().load_attempts(), 2);

    let (status, _) = get_json(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_predict_model_failure_returns_422() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    // Nine coefficients cannot be applied to the seven-feature vector
    std::fs::write(
        dir.path().join(files::LINEAR),
        r#"{"coef": [1, 1, 1, 1, 1, 1, 1, 1, 1], "intercept": 0}"#,
    )
    .unwrap();
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, body) = post_predict(app, data_scientist(Some("Linear Regression"))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().starts_with("Linear Regression failed"));
}

#[tokio::test]
async fn test_repeated_model_failures_report_degraded_health() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    std::fs::write(
        dir.path().join(files::LINEAR),
        r#"{"coef": [1, 1, 1], "intercept": 0}"#,
    )
    .unwrap();
    let (app, _state) = setup_test_app(dir.path()).await;

    for _ in 0..3 {
        let (status, _) = post_predict(app.clone(), data_scientist(None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    let (status, health) = get_json(app.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["components"]["predictor"]["status"], "degraded");

    let (status, _) = get_json(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_predict(app.clone(), data_scientist(Some("random_forest"))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, health) = get_json(app, "/healthz").await;
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn test_options_lists_catalog() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, state) = setup_test_app(dir.path()).await;

    let (status, body) = get_json(app, "/api/v1/options").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["education_levels"].as_array().unwrap().len(), 4);
    assert_eq!(body["genders"], serde_json::json!(["Male", "Female", "Other"]));
    assert_eq!(body["job_titles"].as_array().unwrap().len(), 60);
    assert_eq!(body["models"][1]["name"], "Random Forest Regression");
    assert_eq!(body["models"][1]["rating"], "OPTIMAL");
    assert_eq!(body["experience"]["step"], 0.5);
    assert_eq!(body["age"]["min"], 18.0);
    assert!(state.predictor.store().is_loaded());
}

#[tokio::test]
async fn test_options_unavailable_without_artifacts() {
    let dir = TempDir::new().unwrap();
    let (app, state) = setup_test_app(dir.path()).await;

    let (status, body) = get_json(app.clone(), "/api/v1/options").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("Artifacts unavailable"));
    assert!(body.get("job_titles").is_none());

    write_artifacts(dir.path());
    let (status, _) = get_json(app, "/api/v1/options").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.predictor.store().load_attempts(), 2);
}

#[tokio::test]
async fn test_readyz_returns_503_before_first_load() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, readiness) = get_json(app, "/readyz").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["reason"], "Artifacts not yet loaded");
}

#[tokio::test]
async fn test_readyz_returns_ok_after_preload() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, state) = setup_test_app(dir.path()).await;

    state.predictor.artifacts().await.unwrap();
    let (status, readiness) = get_json(app, "/readyz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_healthz_includes_component_details() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, health) = get_json(app, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["artifacts"].is_object());
    assert!(health["components"]["predictor"].is_object());
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, _) = post_predict(app.clone(), data_scientist(None)).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("salary_predictor_prediction_latency_seconds_bucket"));
    assert!(metrics_text.contains("salary_predictor_predictions_total"));
    assert!(metrics_text.contains("salary_predictor_artifact_load_attempts_total"));
    assert!(metrics_text.contains("salary_predictor_artifacts_loaded"));
}
