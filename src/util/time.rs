use chrono::{DateTime, Duration, NaiveDate, Utc};

// Start of a trailing window of `days` ending at `now`; saturates at the earliest representable instant.
pub fn window_cutoff(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

// Inclusive on both ends: `cutoff <= ts <= now`.
pub fn within_window(ts: DateTime<Utc>, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    cutoff <= ts && ts <= now
}

// Export format for posted dates.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
