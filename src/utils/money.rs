//! All monetary values are stored in cents to avoid floating-point drift.

/// Format cents as a dollar string with 2 decimal places
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
