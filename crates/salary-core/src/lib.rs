//! Salary prediction library
//!
//! This crate provides the core functionality for:
//! - Loading the trained artifacts once and sharing them read-only
//! - Encoding user attributes into the regressors' feature vector
//! - Dispatching to the selected regressor
//! - Health checks and observability

pub mod artifacts;
pub mod catalog;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod output;
pub mod predictor;

pub use artifacts::{ArtifactPaths, ArtifactStore, Artifacts};
pub use catalog::ModelChoice;
pub use error::{ArtifactError, InputError, PredictionError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use predictor::{encode, predict, PredictionOutcome, Predictor, Regressor};
