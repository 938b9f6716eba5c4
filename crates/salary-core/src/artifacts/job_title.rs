//! Job-title mean salary lookup
//!
//! The table may have been persisted as a title-to-mean mapping or as a bare
//! numeric array. Its shape is resolved once when artifacts load so requests
//! never re-inspect it.

use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Job-title mean used when the artifact has no usable shape
pub const FALLBACK_JOB_MEAN: f64 = 50_000.0;

#[derive(Debug, Clone, PartialEq)]
pub enum JobTitleResolver {
    /// Per-title means; unknown titles take the mean over all titles
    ByKey {
        means: HashMap<String, f64>,
        fallback_mean: f64,
    },
    /// Title information was lost; every title resolves to the array mean
    FlatMeanOnly(f64),
    /// Unrecognized artifact shape
    ConstantFallback(f64),
}

impl JobTitleResolver {
    /// Classify a deserialized artifact by shape
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                let means: Option<HashMap<String, f64>> = map
                    .iter()
                    .map(|(title, v)| v.as_f64().map(|mean| (title.clone(), mean)))
                    .collect();
                match means {
                    Some(means) if !means.is_empty() => Self::by_key(means),
                    Some(_) => {
                        warn!("Job-title table is an empty mapping, using constant fallback");
                        Self::ConstantFallback(FALLBACK_JOB_MEAN)
                    }
                    None => {
                        warn!("Job-title table has non-numeric values, using constant fallback");
                        Self::ConstantFallback(FALLBACK_JOB_MEAN)
                    }
                }
            }
            Value::Array(_) => {
                let mut values = Vec::new();
                if flatten_numbers(value, &mut values) && !values.is_empty() {
                    Self::FlatMeanOnly(mean(&values))
                } else {
                    warn!("Job-title array is empty or non-numeric, using constant fallback");
                    Self::ConstantFallback(FALLBACK_JOB_MEAN)
                }
            }
            other => {
                warn!(
                    kind = %value_kind(other),
                    "Unexpected job-title table shape, using constant fallback"
                );
                Self::ConstantFallback(FALLBACK_JOB_MEAN)
            }
        }
    }

    /// Build the keyed variant, precomputing the unseen-title mean
    pub fn by_key(means: HashMap<String, f64>) -> Self {
        let values: Vec<f64> = means.values().copied().collect();
        let fallback_mean = if values.is_empty() {
            FALLBACK_JOB_MEAN
        } else {
            mean(&values)
        };
        Self::ByKey {
            means,
            fallback_mean,
        }
    }

    /// Pre-scale mean salary for a title
    pub fn resolve(&self, job_title: &str) -> f64 {
        match self {
            Self::ByKey {
                means,
                fallback_mean,
            } => match means.get(job_title) {
                Some(mean) => *mean,
                None => {
                    debug!(job_title = %job_title, "Unseen job title, using mean of all titles");
                    *fallback_mean
                }
            },
            Self::FlatMeanOnly(mean) => *mean,
            Self::ConstantFallback(value) => *value,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::ByKey { .. } => "by_key",
            Self::FlatMeanOnly(_) => "flat_mean_only",
            Self::ConstantFallback(_) => "constant_fallback",
        }
    }
}

fn flatten_numbers(value: &Value, out: &mut Vec<f64>) -> bool {
    match value {
        Value::Array(items) => items.iter().all(|item| flatten_numbers(item, out)),
        Value::Number(n) => match n.as_f64() {
            Some(v) => {
                out.push(v);
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
