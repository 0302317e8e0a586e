//! Display formatting for the recording and stats screens.

pub const METERS_TO_MILES: f64 = 0.000621371;

/// Elapsed time as `MM:SS`, zero-padded. Minutes keep growing past 99.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Distance in miles to one decimal place.
pub fn format_miles(meters: f64) -> String {
    format!("{:.1}", meters * METERS_TO_MILES)
}

/// Step total with thousands separators, for the home-screen stat boxes.
pub fn format_step_total(steps: u64) -> String {
    let digits = steps.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_zero_padded() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(9), "00:09");
        assert_eq!(format_elapsed(60), "01:00");
        assert_eq!(format_elapsed(615), "10:15");
        assert_eq!(format_elapsed(6000), "100:00");
    }

    #[test]
    fn one_mile_in_meters_formats_as_one_mile() {
        assert_eq!(format_miles(1609.34), "1.0");
        assert_eq!(format_miles(0.0), "0.0");
        assert_eq!(format_miles(804.67), "0.5");
    }

    #[test]
    fn step_totals_are_grouped() {
        assert_eq!(format_step_total(0), "0");
        assert_eq!(format_step_total(999), "999");
        assert_eq!(format_step_total(1000), "1,000");
        assert_eq!(format_step_total(1234567), "1,234,567");
    }
}
