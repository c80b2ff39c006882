//! Window naming
//!
//! A window is named by a human-readable tag derived from its start
//! timestamp: time-of-day with millisecond precision (`HHMMSS_mmm`), in UTC
//! so a given timestamp names the same window on every host. The tag names
//! both the image subdirectory and the index file, so the pair can never go
//! out of step.

use chrono::DateTime;

/// Derive the window tag for a start timestamp in epoch milliseconds.
pub fn window_tag(start_ms: f64) -> String {
    match DateTime::from_timestamp_millis(start_ms as i64) {
        Some(dt) => dt.format("%H%M%S_%3f").to_string(),
        // Timestamps outside chrono's representable range; keep it
        // deterministic and collision-free by naming the raw millisecond
        None => format!("{:.0}", start_ms),
    }
}

/// Image subdirectory name for a window tag.
pub fn burst_dir_name(tag: &str) -> String {
    format!("burst_{tag}")
}

/// Index file name for a window tag.
pub fn index_file_name(tag: &str) -> String {
    format!("burst_{tag}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_time_of_day_with_millis() {
        assert_eq!(window_tag(0.0), "000000_000");
        assert_eq!(window_tag(12_345.0), "000012_345");
        // 13:37:05.250 UTC
        assert_eq!(window_tag(49_025_250.0), "133705_250");
    }

    #[test]
    fn tag_names_both_artifacts() {
        let tag = window_tag(100.0);
        assert_eq!(burst_dir_name(&tag), "burst_000000_100");
        assert_eq!(index_file_name(&tag), "burst_000000_100.csv");
    }

    #[test]
    fn distinct_millis_yield_distinct_tags() {
        assert_ne!(window_tag(1_000.0), window_tag(1_001.0));
    }
}
