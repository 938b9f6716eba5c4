//! Liveness and readiness state for the salary predictor
//!
//! Two components are tracked. `artifacts` follows the outcome of each load
//! attempt and gates readiness. `predictor` turns degraded once the selected
//! regressor fails several requests in a row, and recovers on the next
//! successful prediction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Consecutive model failures before the predictor reports degraded
pub const DEGRADED_AFTER_FAILURES: u32 = 3;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Still serving, but recent requests failed
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn new(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::new(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

/// Body of `/healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status wins
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|c| c.status)
            .max_by_key(|status| match status {
                ComponentStatus::Healthy => 0,
                ComponentStatus::Degraded => 1,
                ComponentStatus::Unhealthy => 2,
            })
            .unwrap_or(ComponentStatus::Healthy)
    }
}

/// Body of `/readyz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const ARTIFACTS: &str = "artifacts";
    pub const PREDICTOR: &str = "predictor";
}

#[derive(Debug, Default)]
struct State {
    components: HashMap<String, ComponentHealth>,
    artifacts_loaded: bool,
    model_failures: u32,
}

/// Shared health state, updated from artifact loads and prediction outcomes
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    state: Arc<RwLock<State>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        let mut state = self.state.write().await;
        state
            .components
            .insert(name.to_string(), ComponentHealth::healthy());
    }

    /// Artifact set loaded: component healthy and service ready
    pub async fn mark_artifacts_loaded(&self) {
        let mut state = self.state.write().await;
        state.artifacts_loaded = true;
        state
            .components
            .insert(components::ARTIFACTS.to_string(), ComponentHealth::healthy());
    }

    /// Artifact load failed: predictions unavailable until a later load succeeds
    pub async fn mark_artifacts_failed(&self, error: impl Into<String>) {
        let mut state = self.state.write().await;
        state.artifacts_loaded = false;
        state.components.insert(
            components::ARTIFACTS.to_string(),
            ComponentHealth::unhealthy(error),
        );
    }

    /// A regressor failed to produce a prediction
    pub async fn record_model_failure(&self, message: impl Into<String>) {
        let mut state = self.state.write().await;
        state.model_failures = state.model_failures.saturating_add(1);

        if state.model_failures >= DEGRADED_AFTER_FAILURES {
            let message = format!(
                "{} consecutive model failures, last: {}",
                state.model_failures,
                message.into()
            );
            state.components.insert(
                components::PREDICTOR.to_string(),
                ComponentHealth::degraded(message),
            );
        }
    }

    /// A prediction succeeded; clears any failure streak
    pub async fn record_model_success(&self) {
        if self.state.read().await.model_failures == 0 {
            return;
        }

        let mut state = self.state.write().await;
        let was_degraded = state.model_failures >= DEGRADED_AFTER_FAILURES;
        state.model_failures = 0;
        if was_degraded {
            state
                .components
                .insert(components::PREDICTOR.to_string(), ComponentHealth::healthy());
        }
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.state.read().await.components.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    /// Ready once artifacts are loaded and no component is unhealthy
    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;

        let reason = if !state.artifacts_loaded {
            Some("Artifacts not yet loaded".to_string())
        } else {
            unhealthy_reason(&state.components)
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}

fn unhealthy_reason(components: &HashMap<String, ComponentHealth>) -> Option<String> {
    let mut failing: Vec<String> = components
        .iter()
        .filter(|(_, c)| c.status == ComponentStatus::Unhealthy)
        .map(|(name, c)| match &c.message {
            Some(message) => format!("{}: {}", name, message),
            None => name.clone(),
        })
        .collect();

    if failing.is_empty() {
        return None;
    }
    failing.sort();
    Some(format!("Component unhealthy ({})", failing.join("; ")))
}
