//! Display formatting helpers

use chrono::NaiveDate;

/// `"Today, Feb 16"`, `"Yesterday, Feb 15"`, `"Tomorrow, Feb 17"`, or the
/// weekday name for any other date (`"Friday, Feb 20"`)
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    let relative = match (date - today).num_days() {
        0 => "Today".to_string(),
        -1 => "Yesterday".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%A").to_string(),
    };
    format!("{}, {}", relative, month_day(date))
}

/// `"Feb 16"`
pub fn month_day(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Whole-number display of a total
pub fn rounded(value: f64) -> i64 {
    value.round() as i64
}

/// Progress bar fill in percent, capped at 100; 0 when there is no goal
pub fn progress_pct(current: f64, goal: u32) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    ((current / goal as f64) * 100.0).clamp(0.0, 100.0)
}

/// Color class for a progress bar: ok below 85%, warn from 85%, over at 100%
pub fn progress_class(pct: f64) -> &'static str {
    if pct >= 100.0 {
        "bar-over"
    } else if pct >= 85.0 {
        "bar-warn"
    } else {
        "bar-ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        // Feb 2026: the 16th is a Monday
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    #[test]
    fn test_relative_labels() {
        assert_eq!(date_label(d(16), d(16)), "Today, Feb 16");
        assert_eq!(date_label(d(15), d(16)), "Yesterday, Feb 15");
        assert_eq!(date_label(d(17), d(16)), "Tomorrow, Feb 17");
        assert_eq!(date_label(d(20), d(16)), "Friday, Feb 20");
        assert_eq!(date_label(d(2), d(16)), "Monday, Feb 2");
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress_pct(50.0, 200), 25.0);
        assert_eq!(progress_pct(500.0, 200), 100.0);
        assert_eq!(progress_pct(10.0, 0), 0.0);

        assert_eq!(progress_class(84.9), "bar-ok");
        assert_eq!(progress_class(85.0), "bar-warn");
        assert_eq!(progress_class(100.0), "bar-over");
    }

    #[test]
    fn test_rounded() {
        assert_eq!(rounded(1149.6), 1150);
        assert_eq!(rounded(0.4), 0);
    }
}
