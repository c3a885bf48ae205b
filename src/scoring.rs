//! Pure lead-qualification helpers used by the webhook and capture handlers.

use serde_json::Value;

/// JS-style truthiness over an optional JSON value.
///
/// The voice platform's structured-data fields arrive as free-form JSON;
/// presence scoring treats empty strings, zero and null as absent, matching
/// how the upstream form/analysis layer populates them.
pub fn is_truthy(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Renders a structured-data field for storage in a text column.
/// Strings pass through unquoted; other JSON values keep their literal form.
pub fn field_to_string(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Additive lead score over the structured fields extracted from a call.
///
/// Base 50; +10 email, +10 phone, +15 budget, +15 timeline; +20 for a "hot"
/// quality label, +10 for "warm" (checked in that order). Clamped to [0, 100].
pub fn calculate_lead_score(data: &crate::webhook_models::StructuredData) -> i32 {
    let mut score: i32 = 50;

    if is_truthy(&data.email) {
        score += 10;
    }
    if is_truthy(&data.phone) {
        score += 10;
    }
    if is_truthy(&data.budget) {
        score += 15;
    }
    if is_truthy(&data.timeline) {
        score += 15;
    }

    match data.lead_quality.as_ref().and_then(|v| v.as_str()) {
        Some("hot") => score += 20,
        Some("warm") => score += 10,
        _ => {}
    }

    score.clamp(0, 100)
}

/// Quote tier table: standard / premium / enterprise, default standard.
pub fn unit_price_for(service: Option<&str>) -> i64 {
    match service.map(|s| s.to_lowercase()).as_deref() {
        Some("premium") => 1000,
        Some("enterprise") => 2500,
        _ => 500,
    }
}

/// Weekday name for a caller-supplied date string (YYYY-MM-DD, with an
/// RFC 3339 fallback for fully qualified timestamps).
pub fn weekday_name(date: &str) -> Option<&'static str> {
    use chrono::{Datelike, NaiveDate, Weekday};

    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(date)
                .ok()
                .map(|dt| dt.date_naive())
        })?
        .weekday();

    Some(match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    })
}
