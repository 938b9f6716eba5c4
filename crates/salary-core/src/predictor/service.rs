//! Request-level prediction pipeline
//!
//! Validates numeric input, encodes it against the shared artifact set and
//! dispatches to the selected regressor, keeping health, metrics and logs
//! in step.

use super::{encode, predict};
use crate::artifacts::{ArtifactStore, Artifacts};
use crate::catalog::ModelChoice;
use crate::error::{ArtifactError, PredictionError};
use crate::health::HealthRegistry;
use crate::models::{FeatureVector, PredictionResult, RawInput};
use crate::observability::{ServiceMetrics, StructuredLogger};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Prediction together with the vector it was computed from
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub result: PredictionResult,
    pub features: FeatureVector,
}

#[derive(Clone)]
pub struct Predictor {
    store: Arc<ArtifactStore>,
    health: HealthRegistry,
    metrics: ServiceMetrics,
    logger: StructuredLogger,
    /// Completed load attempts already reflected in health and metrics
    reported_loads: Arc<AtomicU64>,
}

impl Predictor {
    pub fn new(
        store: Arc<ArtifactStore>,
        health: HealthRegistry,
        metrics: ServiceMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            store,
            health,
            metrics,
            logger,
            reported_loads: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Get the artifact set, loading it if needed
    pub async fn artifacts(&self) -> Result<Arc<Artifacts>, ArtifactError> {
        let result = self.store.get().await;

        // Whichever caller sees a finished attempt first reports it, even
        // when the caller that started it has gone away
        let completed = self.store.completed_loads();
        let previous = self.reported_loads.fetch_max(completed, Ordering::AcqRel);
        let unreported = completed > previous;

        match &result {
            Ok(_) if unreported => {
                self.metrics.record_artifact_load(true);
                self.health.mark_artifacts_loaded().await;
                self.logger
                    .log_artifacts_loaded("artifact store", self.store.load_attempts());
            }
            Err(e) if unreported => {
                self.metrics.record_artifact_load(false);
                self.health.mark_artifacts_failed(e.to_string()).await;
                self.logger
                    .log_artifact_load_failed("artifact store", e.key(), &e.to_string());
            }
            _ => {}
        }

        result
    }

    /// Run one prediction request end to end
    pub async fn predict(
        &self,
        input: &RawInput,
        model: ModelChoice,
    ) -> Result<PredictionOutcome, PredictionError> {
        let outcome = self.run(input, model).await;

        match &outcome {
            Ok(_) => self.health.record_model_success().await,
            Err(e) => {
                if let PredictionError::ModelInvocation { message, .. } = e {
                    self.health.record_model_failure(message.as_str()).await;
                }
                self.metrics.inc_prediction_errors(e.kind());
                self.logger
                    .log_prediction_failed(model.label(), e.kind(), &e.to_string());
            }
        }
        outcome
    }

    async fn run(
        &self,
        input: &RawInput,
        model: ModelChoice,
    ) -> Result<PredictionOutcome, PredictionError> {
        input.validate()?;
        let artifacts = self.artifacts().await?;

        let start = Instant::now();
        let features = encode(input, &artifacts);
        let result = predict(model, &features, &artifacts)?;
        let elapsed = start.elapsed();

        self.metrics.observe_prediction_latency(elapsed.as_secs_f64());
        self.metrics.inc_predictions(model.label());
        self.logger
            .log_prediction(model.label(), result.predicted_salary, elapsed.as_micros());

        Ok(PredictionOutcome { result, features })
    }
}
