use chrono::Duration;
use regex::Regex;
use std::sync::OnceLock;

fn timestamp_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"^\d{2}:\d{2}:\d{2}").expect("timestamp pattern is valid"))
}

/// Whether `value` starts with `hh:mm:ss`.
///
/// Only the prefix is checked, anything after it is left for ffmpeg to judge.
pub fn is_timestamp(value: &str) -> bool {
    timestamp_prefix().is_match(value)
}

/// Format whole seconds as `hh:mm:ss`; hours grow past 24 instead of wrapping.
///
/// `None` when the value is out of range for a duration.
pub fn seconds_to_timestamp(seconds: u64) -> Option<String> {
    let duration = i64::try_from(seconds).ok().and_then(Duration::try_seconds)?;
    Some(format!(
        "{:02}:{:02}:{:02}",
        duration.num_hours(),
        duration.num_minutes() % 60,
        duration.num_seconds() % 60
    ))
}
