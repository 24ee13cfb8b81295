//! Human-readable sizes and transfer rates.
//!
//! All conversions are binary (1024-based), matching how the catalog page
//! prints sizes.

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)([\d.]+)\s*(KB|MB|GB)").expect("static size pattern"))
}

/// Parse a size such as `512.5 MB` into bytes.
///
/// Returns `0` when no number followed by a unit is found.
pub fn parse_size_bytes(raw: &str) -> u64 {
    let Some(caps) = size_pattern().captures(raw.trim()) else {
        return 0;
    };
    let Ok(value) = caps[1].parse::<f64>() else {
        return 0;
    };

    let multiplier = match caps[2].to_ascii_uppercase().as_str() {
        "KB" => KB,
        "MB" => MB,
        "GB" => GB,
        _ => return 0,
    };
    (value * multiplier) as u64
}

/// Whether a label carries one of the recognised size units.
pub fn has_size_unit(raw: &str) -> bool {
    let upper = raw.to_ascii_uppercase();
    ["KB", "MB", "GB"].iter().any(|unit| upper.contains(unit))
}

/// Format a byte count in the largest fitting unit.
///
/// Two decimals for KB and above, none for bytes.
pub fn format_size(bytes: u64) -> String {
    scaled(bytes as f64, "")
}

/// Format a throughput estimate: bytes so far divided by elapsed wall-clock time.
pub fn format_speed(bytes: u64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return "0 B/s".to_string();
    }
    scaled(bytes as f64 / secs, "/s")
}

fn scaled(value: f64, suffix: &str) -> String {
    if value >= GB {
        format!("{:.2} GB{suffix}", value / GB)
    } else if value >= MB {
        format!("{:.2} MB{suffix}", value / MB)
    } else if value >= KB {
        format!("{:.2} KB{suffix}", value / KB)
    } else {
        format!("{value:.0} B{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_megabytes() {
        assert_eq!(parse_size_bytes("512.5 MB"), 537_395_200);
    }

    #[test]
    fn test_parse_units_case_insensitive() {
        assert_eq!(parse_size_bytes("1 kb"), 1024);
        assert_eq!(parse_size_bytes("2GB"), 2 * 1024 * 1024 * 1024);
        assert_eq!(parse_size_bytes("  3.5 Mb "), 3_670_016);
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(parse_size_bytes(""), 0);
        assert_eq!(parse_size_bytes("12 bytes"), 0);
        assert_eq!(parse_size_bytes("1.2.3 MB"), 0);
        assert_eq!(parse_size_bytes("MB"), 0);
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(537_395_200), "512.50 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_parse_then_format_keeps_magnitude() {
        for raw in ["512.5 MB", "1.25 GB", "900 KB", "12.75 MB"] {
            let formatted = format_size(parse_size_bytes(raw));
            let (num, unit) = formatted.split_once(' ').unwrap();
            let (orig_num, orig_unit) = raw.split_once(' ').unwrap();
            assert_eq!(unit, orig_unit);
            let diff = num.parse::<f64>().unwrap() - orig_num.parse::<f64>().unwrap();
            assert!(diff.abs() < 0.01, "{raw} -> {formatted}");
        }
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(1000, Duration::ZERO), "0 B/s");
        assert_eq!(format_speed(500, Duration::from_secs(1)), "500 B/s");
        assert_eq!(format_speed(2 * 1024 * 1024, Duration::from_secs(2)), "1.00 MB/s");
    }

    #[test]
    fn test_size_unit_detection() {
        assert!(has_size_unit("12.3 MB"));
        assert!(has_size_unit("4 gb"));
        assert!(!has_size_unit("12345"));
    }
}
