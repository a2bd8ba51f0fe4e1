//! Transport time formatting

/// Format a position in seconds as `m:ss`
///
/// Minutes are not capped, so an hour-long track reads `61:05`.
/// Negative or non-finite input reads as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(3665.2), "61:05");
    }

    #[test]
    fn unknown_values_read_as_zero() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }
}
