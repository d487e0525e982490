//! Shared utility functions

use std::time::Duration;

/// Truncate a string to at most `max_chars` characters, ending in "..." if
/// anything was cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let suffix = "...";
    let keep = max_chars.saturating_sub(suffix.len());
    let head: String = s.chars().take(keep).collect();
    format!("{}{}", head, suffix)
}

/// Short human form of an age, e.g. "45s", "12m", "1h 05m"
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        _ => format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60),
    }
}
