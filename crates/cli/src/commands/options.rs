//! Accepted input values and available models

use anyhow::Result;
use salary_core::catalog::{
    ModelChoice, AGE_RANGE, DEFAULT_AGE, DEFAULT_EXPERIENCE, EDUCATION_LEVELS, EXPERIENCE_RANGE,
    EXPERIENCE_STEP, GENDERS, JOB_TITLES,
};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{color_accuracy, OutputFormat};

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    name: String,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
}

#[derive(Serialize)]
struct ModelEntry {
    name: &'static str,
    accuracy: u8,
    rating: &'static str,
}

#[derive(Serialize)]
struct Catalog {
    education_levels: &'static [&'static str],
    genders: &'static [&'static str],
    job_titles: &'static [&'static str],
    models: Vec<ModelEntry>,
    age: [u32; 3],
    experience: [f64; 3],
}

/// Print the catalog of accepted inputs
pub fn show_options(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let catalog = Catalog {
                education_levels: &EDUCATION_LEVELS,
                genders: &GENDERS,
                job_titles: &JOB_TITLES,
                models: ModelChoice::ALL
                    .iter()
                    .map(|m| ModelEntry {
                        name: m.label(),
                        accuracy: m.accuracy_percent(),
                        rating: m.accuracy_rating(),
                    })
                    .collect(),
                age: [*AGE_RANGE.start(), *AGE_RANGE.end(), DEFAULT_AGE],
                experience: [
                    *EXPERIENCE_RANGE.start(),
                    *EXPERIENCE_RANGE.end(),
                    DEFAULT_EXPERIENCE,
                ],
            };
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        OutputFormat::Table => {
            let rows: Vec<ModelRow> = ModelChoice::ALL
                .iter()
                .map(|m| ModelRow {
                    name: m.label().to_string(),
                    accuracy: color_accuracy(m.accuracy_percent(), m.accuracy_rating()),
                })
                .collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            println!(
                "\nAge: {}-{} (default {})",
                AGE_RANGE.start(),
                AGE_RANGE.end(),
                DEFAULT_AGE
            );
            println!(
                "Experience: {:.1}-{:.1} years in steps of {} (default {:.1})",
                EXPERIENCE_RANGE.start(),
                EXPERIENCE_RANGE.end(),
                EXPERIENCE_STEP,
                DEFAULT_EXPERIENCE
            );
            println!("Education: {}", EDUCATION_LEVELS.join(", "));
            println!("Gender: {}", GENDERS.join(", "));
            println!("\nJob titles ({}):", JOB_TITLES.len());
            for title in JOB_TITLES {
                println!("  {}", title);
            }
        }
    }

    Ok(())
}
