/// Placeholder for values that are absent or not finite.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn format_money(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) if v < 0.0 => format!("-${:.2}", -v),
        Some(v) => format!("${:.2}", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `value` is a fraction: `0.2134` renders as `21.34%`.
pub fn format_percent(value: Option<f64>) -> String {
    match value.map(|v| v * 100.0).filter(|v| v.is_finite()) {
        Some(v) => format!("{:.2}%", v),
        None => NOT_AVAILABLE.to_string(),
    }
}
