//! Time formatting and duration input parsing

use tracing::debug;

/// Format elapsed seconds as `HH:MM:SS`; hours are not capped
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format remaining seconds as `MM:SS`; minutes are not capped
pub fn format_ms(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Parse one minutes or seconds field. Anything that is not a non-negative
/// integer counts as 0.
pub fn parse_duration_field(input: &str) -> u64 {
    let trimmed = input.trim();
    match trimmed.parse::<i64>() {
        Ok(value) if value >= 0 => value as u64,
        Ok(value) => {
            debug!("Negative duration field {} replaced with 0", value);
            0
        }
        Err(_) => {
            if !trimmed.is_empty() {
                debug!("Unparsable duration field {:?} replaced with 0", trimmed);
            }
            0
        }
    }
}

/// Combine a minutes/seconds pair as typed by the user into total seconds
pub fn parse_duration_input(minutes: &str, seconds: &str) -> u64 {
    parse_duration_field(minutes)
        .saturating_mul(60)
        .saturating_add(parse_duration_field(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_format_pads_and_keeps_growing_hours() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3_661), "01:01:01");
        assert_eq!(format_hms(100 * 3600 + 59), "100:00:59");
    }

    #[test]
    fn countdown_format_pads_minutes_and_seconds() {
        assert_eq!(format_ms(0), "00:00");
        assert_eq!(format_ms(65), "01:05");
        assert_eq!(format_ms(3_600), "60:00");
    }

    #[test]
    fn bad_fields_fall_back_to_zero() {
        assert_eq!(parse_duration_field("abc"), 0);
        assert_eq!(parse_duration_field("-4"), 0);
        assert_eq!(parse_duration_field(""), 0);
        assert_eq!(parse_duration_field(" 7 "), 7);
    }

    #[test]
    fn minutes_and_seconds_are_combined() {
        assert_eq!(parse_duration_input("2", "30"), 150);
        assert_eq!(parse_duration_input("x", "30"), 30);
        assert_eq!(parse_duration_input("1", "-5"), 60);
    }
}
