//! Fitted univariate standard scaler

use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};

/// On-disk form, matching the attribute names of a fitted scikit-learn scaler
#[derive(Debug, Deserialize)]
struct ScalerFile {
    #[serde(default, alias = "mean_")]
    mean: Option<Vec<f64>>,
    #[serde(alias = "scale_")]
    scale: Vec<f64>,
}

/// `(x - mean) / scale` over a single feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StandardScaler {
    mean: f64,
    scale: f64,
}

impl StandardScaler {
    /// Build a scaler, rejecting values that cannot form a usable transform
    pub fn new(key: &'static str, mean: f64, scale: f64) -> Result<Self, ArtifactError> {
        if !mean.is_finite() {
            return Err(invalid(key, format!("mean {} is not finite", mean)));
        }
        if !scale.is_finite() || scale == 0.0 {
            return Err(invalid(key, format!("scale {} must be finite and non-zero", scale)));
        }
        Ok(Self { mean, scale })
    }

    /// Parse the JSON artifact form
    pub fn from_json(key: &'static str, bytes: &[u8]) -> Result<Self, ArtifactError> {
        let file: ScalerFile = serde_json::from_slice(bytes)
            .map_err(|e| invalid(key, format!("malformed scaler: {}", e)))?;

        let mean = match file.mean.as_deref() {
            None => 0.0,
            Some([m]) => *m,
            Some(other) => {
                return Err(invalid(
                    key,
                    format!("expected 1 mean value, found {}", other.len()),
                ))
            }
        };
        let scale = match file.scale.as_slice() {
            [s] => *s,
            other => {
                return Err(invalid(
                    key,
                    format!("expected 1 scale value, found {}", other.len()),
                ))
            }
        };

        Self::new(key, mean, scale)
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

fn invalid(key: &'static str, message: String) -> ArtifactError {
    ArtifactError::InvalidScaler { key, message }
}
