use chrono::{DateTime, NaiveDate};

/// Accepts `YYYY-MM-DD`, full RFC3339 timestamps, `YYYY-MM` and bare years.
pub fn parse_lenient(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Some(date);
    }
    raw.parse::<i32>().ok().and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}

/// "January 2024"; unparseable input is echoed back.
pub fn month_year(raw: &str) -> String {
    match parse_lenient(raw) {
        Some(date) => date.format("%B %Y").to_string(),
        None => raw.trim().to_string(),
    }
}

/// "January 2024 - Present" style range; empty when neither end is known.
pub fn date_range(start: Option<&str>, end: Option<&str>, current: bool) -> String {
    let start = start.map(month_year).unwrap_or_default();
    let end = if current {
        "Present".to_string()
    } else {
        end.map(month_year).unwrap_or_default()
    };
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => start,
        (true, false) => end,
        (false, false) => format!("{} - {}", start, end),
    }
}
