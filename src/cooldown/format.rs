fn unit(value: u64, name: &str) -> String {
    if value == 1 {
        format!("{} {}", value, name)
    } else {
        format!("{} {}s", value, name)
    }
}

/// Human-readable remaining time, e.g. `1 minute 5 seconds` or `2 hours 1 minute`.
/// Seconds are dropped once the value reaches an hour.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        unit(seconds, "second")
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        let rest = seconds % 60;
        if rest > 0 {
            format!("{} {}", unit(minutes, "minute"), unit(rest, "second"))
        } else {
            unit(minutes, "minute")
        }
    } else {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        if minutes > 0 {
            format!("{} {}", unit(hours, "hour"), unit(minutes, "minute"))
        } else {
            unit(hours, "hour")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_scale() {
        assert_eq!(format_duration(0), "0 seconds");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(59), "59 seconds");
    }

    #[test]
    fn minutes_scale() {
        assert_eq!(format_duration(60), "1 minute");
        assert_eq!(format_duration(61), "1 minute 1 second");
        assert_eq!(format_duration(125), "2 minutes 5 seconds");
        assert_eq!(format_duration(3599), "59 minutes 59 seconds");
    }

    #[test]
    fn hours_scale_drops_seconds() {
        assert_eq!(format_duration(3600), "1 hour");
        assert_eq!(format_duration(3601), "1 hour");
        assert_eq!(format_duration(3661), "1 hour 1 minute");
        assert_eq!(format_duration(7322), "2 hours 2 minutes");
    }
}
