//! Salary prediction engine

mod encoder;
mod inference;
mod service;

pub use encoder::{encode, encode_education, encode_gender};
pub use inference::{load_regressor, ForestRegressor, LinearRegressor, OnnxRegressor};
pub use service::{PredictionOutcome, Predictor};

use crate::artifacts::Artifacts;
use crate::catalog::ModelChoice;
use crate::error::PredictionError;
use crate::models::{FeatureVector, PredictionResult};
use anyhow::Result;

/// A trained regressor treated as a black box over the feature vector
pub trait Regressor: Send + Sync {
    /// Predict one value from the features in training order
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Short description of the backend, for logs
    fn describe(&self) -> &str;
}

/// Run the selected regressor on an encoded vector
///
/// Failures and non-finite outputs surface as `ModelInvocation`; nothing is
/// retried or substituted.
pub fn predict(
    model: ModelChoice,
    features: &FeatureVector,
    artifacts: &Artifacts,
) -> Result<PredictionResult, PredictionError> {
    let regressor = artifacts.regressor(model);

    let value = regressor
        .predict(&features.to_array())
        .map_err(|e| PredictionError::ModelInvocation {
            model: model.label().to_string(),
            message: format!("{:#}", e),
        })?;

    if !value.is_finite() {
        return Err(PredictionError::ModelInvocation {
            model: model.label().to_string(),
            message: format!("model returned a non-finite value ({})", value),
        });
    }

    Ok(PredictionResult {
        predicted_salary: value,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{JobTitleResolver, StandardScaler};
    use crate::models::RawInput;

    struct FailingRegressor;

    impl Regressor for FailingRegressor {
        fn predict(&self, _features: &[f64]) -> Result<f64> {
            anyhow::bail!("input shape [1, 7] does not match [1, 9]")
        }

        fn describe(&self) -> &str {
            "failing"
        }
    }

    struct NanRegressor;

    impl Regressor for NanRegressor {
        fn predict(&self, _features: &[f64]) -> Result<f64> {
            Ok(f64::NAN)
        }

        fn describe(&self) -> &str {
            "nan"
        }
    }

    fn artifacts_with(
        linear: Box<dyn Regressor>,
        random_forest: Box<dyn Regressor>,
    ) -> Artifacts {
        Artifacts::from_parts(
            linear,
            random_forest,
            JobTitleResolver::FlatMeanOnly(60000.0),
            StandardScaler::new("scaler_age", 40.0, 10.0).unwrap(),
            StandardScaler::new("scaler_experience", 10.0, 5.0).unwrap(),
            StandardScaler::new("scaler_job", 60000.0, 20000.0).unwrap(),
        )
    }

    #[test]
    fn test_dispatch_selects_model() {
        let artifacts = artifacts_with(
            Box::new(LinearRegressor::new(vec![0.0; 7], 41000.0)),
            Box::new(LinearRegressor::new(vec![0.0; 7], 52000.0)),
        );
        let v = encode(
            &RawInput::new(30, "Bachelor's", 5.0, "Data Scientist", "Male"),
            &artifacts,
        );

        let linear = predict(ModelChoice::LinearRegression, &v, &artifacts).unwrap();
        assert_eq!(linear.predicted_salary, 41000.0);
        assert_eq!(linear.model, ModelChoice::LinearRegression);

        let forest = predict(ModelChoice::RandomForest, &v, &artifacts).unwrap();
        assert_eq!(forest.predicted_salary, 52000.0);
        assert_eq!(forest.model, ModelChoice::RandomForest);
    }

    #[test]
    fn test_model_failure_propagates() {
        let artifacts = artifacts_with(
            Box::new(FailingRegressor),
            Box::new(LinearRegressor::new(vec![0.0; 7], 1.0)),
        );
        let v = encode(&RawInput::new(30, "PhD", 5.0, "CEO", "Male"), &artifacts);

        let err = predict(ModelChoice::LinearRegression, &v, &artifacts).unwrap_err();
        match err {
            PredictionError::ModelInvocation { model, message } => {
                assert_eq!(model, "Linear Regression");
                assert!(message.contains("does not match"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_shape_mismatch_is_visible_error() {
        let artifacts = artifacts_with(
            Box::new(LinearRegressor::new(vec![1.0; 9], 0.0)),
            Box::new(LinearRegressor::new(vec![0.0; 7], 1.0)),
        );
        let v = encode(&RawInput::new(30, "PhD", 5.0, "CEO", "Male"), &artifacts);
        let err = predict(ModelChoice::LinearRegression, &v, &artifacts).unwrap_err();
        assert_eq!(err.kind(), "model_invocation");
    }

    #[test]
    fn test_non_finite_output_is_error() {
        let artifacts = artifacts_with(
            Box::new(LinearRegressor::new(vec![0.0; 7], 1.0)),
            Box::new(NanRegressor),
        );
        let v = encode(&RawInput::new(30, "PhD", 5.0, "CEO", "Male"), &artifacts);
        assert!(predict(ModelChoice::RandomForest, &v, &artifacts).is_err());
        assert!(predict(ModelChoice::LinearRegression, &v, &artifacts).is_ok());
    }
}
