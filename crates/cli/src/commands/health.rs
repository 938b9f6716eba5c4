//! Server health command

use anyhow::Result;
use salary_core::ComponentStatus;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_warning, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Show server health and readiness
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;
    let readiness = client.readiness().await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&serde_json::json!({
                "health": health,
                "readiness": readiness,
            }))?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            println!("Status: {}", color_status(status_label(health.status)));
            println!(
                "Ready:  {}",
                color_status(if readiness.ready { "ready" } else { "not ready" })
            );

            let mut rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, c)| ComponentRow {
                    name: name.clone(),
                    status: color_status(status_label(c.status)),
                    message: c.message.clone().unwrap_or_default(),
                })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            if let Some(reason) = readiness.reason {
                print_warning(&reason);
            }
        }
    }

    Ok(())
}

fn status_label(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "healthy",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "unhealthy",
    }
}
