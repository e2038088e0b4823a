//! Time formatting helpers for logs and CLI output.

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Describe an emission window starting at `start` (epoch seconds).
///
/// An open-ended window has no `end`.
pub fn format_window(start: u64, end: Option<u64>) -> String {
    match end {
        Some(end) if end > start => {
            format!("from {} for {}", start, format_duration(end - start))
        }
        Some(_) => format!("empty window at {}", start),
        None => format!("from {} (open-ended)", start),
    }
}
