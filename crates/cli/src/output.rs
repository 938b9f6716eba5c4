//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use salary_core::output::format_currency;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Monthly salary with the configured currency symbol
pub fn format_salary(amount: f64, symbol: &str) -> String {
    format!("{}/month", format_currency(amount, symbol))
}

/// Accuracy with its rating, colored by rating
pub fn color_accuracy(accuracy: u8, rating: &str) -> String {
    let formatted = format!("{}% ({})", accuracy, rating);
    match rating {
        "OPTIMAL" => formatted.green().to_string(),
        _ => formatted.yellow().to_string(),
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "ready" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" | "not ready" => status.red().to_string(),
        _ => status.to_string(),
    }
}
