//! Currency formatting for predicted salaries

/// Currency symbol shown when none is configured
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Format an amount with thousands separators and two decimals
pub fn format_currency(amount: f64, symbol: &str) -> String {
    if !amount.is_finite() {
        return format!("{}{}", symbol, amount);
    }
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.001 rounds to 0.00 and should not keep its sign
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, frac)
}

/// Format a monthly salary the way the prediction page shows it
pub fn format_monthly_salary(amount: f64) -> String {
    format!("{}/month", format_currency(amount, DEFAULT_CURRENCY_SYMBOL))
}
