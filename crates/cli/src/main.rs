//! Salary Predictor CLI
//!
//! A command-line tool for predicting monthly salaries, either through a
//! running salary server or directly from a local artifact directory.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{health, options, predict};
use salary_core::catalog::{DEFAULT_AGE, DEFAULT_EXPERIENCE};
use salary_core::output::DEFAULT_CURRENCY_SYMBOL;
use std::path::PathBuf;

/// Salary Predictor CLI
#[derive(Parser)]
#[command(name = "salary")]
#[command(author, version, about = "CLI for the Salary Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via SALARY_API_URL env var)
    #[arg(long, env = "SALARY_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Currency symbol for displayed salaries
    #[arg(long)]
    pub currency: Option<String>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict a monthly salary
    Predict {
        /// Age in years (18-65)
        #[arg(long, default_value_t = DEFAULT_AGE)]
        age: u32,

        /// Education level (High School, Bachelor's, Master's, PhD)
        #[arg(long)]
        education: String,

        /// Years of experience (0-40, in steps of 0.5)
        #[arg(long, default_value_t = DEFAULT_EXPERIENCE)]
        experience: f64,

        /// Job title
        #[arg(long)]
        job_title: String,

        /// Gender (Male, Female, Other)
        #[arg(long)]
        gender: String,

        /// Model to use (Linear Regression, Random Forest Regression)
        #[arg(long, short)]
        model: Option<String>,

        /// Predict locally from this artifact directory instead of the server
        #[arg(long)]
        artifact_dir: Option<PathBuf>,
    },

    /// List accepted input values and available models
    Options,

    /// Show server health and readiness
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let api_url = config.resolve_api_url(cli.api_url.as_deref());
    let symbol = cli
        .currency
        .or_else(|| config.currency_symbol.clone())
        .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

    match cli.command {
        Commands::Predict {
            age,
            education,
            experience,
            job_title,
            gender,
            model,
            artifact_dir,
        } => {
            let args = predict::PredictArgs {
                age,
                education,
                experience,
                job_title,
                gender,
                model: model.or_else(|| config.default_model.clone()),
            };

            match artifact_dir {
                Some(dir) => {
                    predict::predict_local(dir, args, &symbol, cli.verbose, cli.format).await?;
                }
                None => {
                    let client = client::ApiClient::new(&api_url)?;
                    predict::predict_remote(&client, args, &symbol, cli.verbose, cli.format)
                        .await?;
                }
            }
        }
        Commands::Options => {
            options::show_options(cli.format)?;
        }
        Commands::Health => {
            let client = client::ApiClient::new(&api_url)?;
            health::show_health(&client, cli.format).await?;
        }
    }

    Ok(())
}
