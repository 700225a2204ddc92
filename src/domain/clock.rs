use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

/// Time source injected into handlers so "today" is deterministic in tests.
/// Application code never calls `Utc::now()` directly.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub type SharedClock = Arc<dyn Clock>;

/// Calendar-day key for an instant. Day keys are always derived from the
/// instant's UTC date components, regardless of device or display zone.
pub fn day_key(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// `HH:MM` in the fixed display offset, or `-` when absent.
/// Presentation only; never use the output for comparisons.
pub fn format_display_time(instant: Option<DateTime<Utc>>, display_offset_minutes: i32) -> String {
    let Some(t) = instant else {
        return "-".to_string();
    };

    let offset = FixedOffset::east_opt(display_offset_minutes * 60)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));

    t.with_timezone(&offset).format("%H:%M").to_string()
}

/// Every day of the month containing `any_day`, ascending.
pub fn days_in_month(any_day: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(31);

    let Some(mut d) = NaiveDate::from_ymd_opt(any_day.year(), any_day.month(), 1) else {
        return days;
    };

    while d.month() == any_day.month() {
        days.push(d);
        d = match d.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_key_uses_utc_date() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap();
        assert_eq!(
            day_key(instant),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn display_time_in_fixed_offset() {
        // 09:00 UTC at +05:30 renders as 14:30.
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(format_display_time(Some(instant), 330), "14:30");
    }

    #[test]
    fn display_time_placeholder_when_absent() {
        assert_eq!(format_display_time(None, 330), "-");
    }

    #[test]
    fn month_days_are_complete_and_ascending() {
        let june = days_in_month(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(june.len(), 30);
        assert_eq!(june[0], NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(june[29], NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert!(june.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn month_days_handle_leap_february() {
        let feb = days_in_month(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.len(), 29);
    }

    #[test]
    fn month_days_restartable() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(days_in_month(day), days_in_month(day));
    }
}
