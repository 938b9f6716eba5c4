//! Salary prediction command

use anyhow::{Context, Result};
use salary_core::{
    health::HealthRegistry, ArtifactStore, ModelChoice, Predictor, RawInput, ServiceMetrics,
    StructuredLogger, FEATURE_NAMES,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::Tabled;

use crate::client::{ApiClient, PredictRequest};
use crate::output::{color_accuracy, format_salary, print_info, OutputFormat};

/// Inputs collected from the command line
#[derive(Debug, Clone)]
pub struct PredictArgs {
    pub age: u32,
    pub education: String,
    pub experience: f64,
    pub job_title: String,
    pub gender: String,
    pub model: Option<String>,
}

/// Prediction as shown to the user, whichever side computed it
#[derive(Debug, Clone, Serialize)]
struct PredictionView {
    model: String,
    accuracy: u8,
    rating: String,
    predicted_salary: f64,
    formatted: String,
    features: Vec<f64>,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Predict through the server
pub async fn predict_remote(
    client: &ApiClient,
    args: PredictArgs,
    symbol: &str,
    verbose: bool,
    format: OutputFormat,
) -> Result<()> {
    let request = PredictRequest {
        age: args.age,
        education: args.education,
        experience: args.experience,
        job_title: args.job_title,
        gender: args.gender,
        model: args.model,
    };

    let response = client.predict(&request).await?;
    let rating = response
        .model
        .parse::<ModelChoice>()
        .map(|m| m.accuracy_rating().to_string())
        .unwrap_or_default();

    let view = PredictionView {
        formatted: format_salary(response.predicted_salary, symbol),
        model: response.model,
        accuracy: response.accuracy,
        rating,
        predicted_salary: response.predicted_salary,
        features: response.features,
    };
    render(&view, verbose, format)
}

/// Predict in-process from an artifact directory
pub async fn predict_local(
    artifact_dir: PathBuf,
    args: PredictArgs,
    symbol: &str,
    verbose: bool,
    format: OutputFormat,
) -> Result<()> {
    let model = match args.model.as_deref() {
        Some(name) => name.parse::<ModelChoice>()?,
        None => ModelChoice::default(),
    };

    let predictor = Predictor::new(
        Arc::new(ArtifactStore::from_dir(&artifact_dir)),
        HealthRegistry::new(),
        ServiceMetrics::new(),
        StructuredLogger::new("salary-cli"),
    );

    let input = RawInput::new(
        args.age,
        args.education,
        args.experience,
        args.job_title,
        args.gender,
    );
    let outcome = predictor
        .predict(&input, model)
        .await
        .with_context(|| format!("Prediction from {} failed", artifact_dir.display()))?;

    let salary = outcome.result.predicted_salary;
    let view = PredictionView {
        model: model.label().to_string(),
        accuracy: model.accuracy_percent(),
        rating: model.accuracy_rating().to_string(),
        predicted_salary: salary,
        formatted: format_salary(salary, symbol),
        features: outcome.features.to_array().to_vec(),
    };
    render(&view, verbose, format)
}

fn render(view: &PredictionView, verbose: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(view)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            let mut rows = vec![
                FieldRow {
                    field: "Model".to_string(),
                    value: view.model.clone(),
                },
                FieldRow {
                    field: "Accuracy".to_string(),
                    value: color_accuracy(view.accuracy, &view.rating),
                },
                FieldRow {
                    field: "Predicted salary".to_string(),
                    value: view.formatted.clone(),
                },
            ];

            if verbose {
                rows.extend(view.features.iter().zip(FEATURE_NAMES).map(|(value, name)| {
                    FieldRow {
                        field: name.to_string(),
                        value: format!("{:.4}", value),
                    }
                }));
            }

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            if !verbose {
                print_info("Use --verbose to show the encoded feature vector");
            }
        }
    }

    Ok(())
}
