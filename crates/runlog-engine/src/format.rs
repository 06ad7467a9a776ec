// format.rs — Display helpers for paces, distances, and dates.

use chrono::{DateTime, Utc};

/// Format a pace in seconds per km as `m:ss` (whole seconds, truncated).
pub fn format_pace(secs_per_km: f64) -> String {
    if !secs_per_km.is_finite() || secs_per_km < 0.0 {
        return "--:--".to_string();
    }
    let total = secs_per_km.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format a distance in km with two decimals.
pub fn format_distance(km: f64) -> String {
    format!("{:.2}", km)
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a duration in seconds as `h:mm:ss`, or `m:ss` under an hour.
pub fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Parse `ss`, `mm:ss`, or `hh:mm:ss` into seconds.
pub fn parse_duration(input: &str) -> Result<u64, String> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(format!("invalid duration '{}' (expected ss, mm:ss or hh:mm:ss)", input));
    }

    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        let n: u64 = part
            .parse()
            .map_err(|_| format!("invalid duration '{}': '{}' is not a number", input, part))?;
        numbers.push(n);
    }

    // Every field after the leading one is a base-60 digit.
    if numbers.iter().skip(1).any(|&n| n >= 60) {
        return Err(format!("invalid duration '{}': minutes and seconds must be below 60", input));
    }

    numbers
        .iter()
        .try_fold(0u64, |acc, &n| acc.checked_mul(60)?.checked_add(n))
        .ok_or_else(|| format!("invalid duration '{}': duration too large", input))
}
