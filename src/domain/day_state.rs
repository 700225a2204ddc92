use chrono::NaiveDate;

use crate::model::attendance::AttendanceRecord;

/// Clock state of a single calendar day, derived from the user's full record
/// set. `is_clocked_in` and `is_completed` are mutually exclusive by
/// construction; any day other than today disables both clock actions.
#[derive(Debug)]
pub struct DayState<'a> {
    pub record: Option<&'a AttendanceRecord>,
    pub is_clocked_in: bool,
    pub is_completed: bool,
    pub can_clock_in: bool,
    pub can_clock_out: bool,
}

impl<'a> DayState<'a> {
    pub fn derive(
        records: &'a [AttendanceRecord],
        selected: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        // First row in store order wins if the backend ever returns two rows
        // for the same day. Uniqueness is the backend's invariant to enforce;
        // this is not a correctness guarantee for duplicate data.
        let record = records.iter().find(|r| r.date == selected);

        let is_clocked_in =
            record.is_some_and(|r| r.check_in_time.is_some() && r.check_out_time.is_none());
        let is_completed =
            record.is_some_and(|r| r.check_in_time.is_some() && r.check_out_time.is_some());

        let can_clock_in = selected == today && !is_clocked_in && !is_completed;
        let can_clock_out = is_clocked_in && !is_completed;

        Self {
            record,
            is_clocked_in,
            is_completed,
            can_clock_in,
            can_clock_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record(
        id: u64,
        date: &str,
        check_in: Option<&str>,
        check_out: Option<&str>,
    ) -> AttendanceRecord {
        let instant = |hhmm: &str| {
            NaiveDateTime::parse_from_str(&format!("{date} {hhmm}:00"), "%Y-%m-%d %H:%M:%S")
                .unwrap()
                .and_utc()
        };
        AttendanceRecord {
            id,
            user_id: 1,
            date: date.parse().unwrap(),
            check_in_time: check_in.map(instant),
            check_out_time: check_out.map(instant),
            latitude: None,
            longitude: None,
            status: Some("present".to_string()),
            working_hours: None,
            selfie_url: None,
            selfie_out_url: None,
            created_at: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn completed_day_disables_both_actions() {
        let records = vec![record(1, "2024-06-01", Some("09:00"), Some("17:00"))];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));

        assert!(state.is_completed);
        assert!(!state.is_clocked_in);
        assert!(!state.can_clock_in);
        assert!(!state.can_clock_out);
    }

    #[test]
    fn open_record_today_allows_clock_out_only() {
        let records = vec![record(1, "2024-06-01", Some("09:00"), None)];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));

        assert!(state.is_clocked_in);
        assert!(!state.can_clock_in);
        assert!(state.can_clock_out);
    }

    #[test]
    fn absent_today_allows_clock_in_only() {
        let records: Vec<AttendanceRecord> = vec![];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));

        assert!(state.record.is_none());
        assert!(state.can_clock_in);
        assert!(!state.can_clock_out);
    }

    #[test]
    fn clock_in_never_allowed_off_today() {
        // Regardless of the selected day's own state.
        let cases = vec![
            vec![],
            vec![record(1, "2024-06-01", None, None)],
            vec![record(1, "2024-06-01", Some("09:00"), None)],
            vec![record(1, "2024-06-01", Some("09:00"), Some("17:00"))],
        ];
        for records in cases {
            let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-02"));
            assert!(!state.can_clock_in);
        }
    }

    #[test]
    fn clocked_in_and_completed_are_mutually_exclusive() {
        let records = vec![
            record(1, "2024-06-01", Some("09:00"), Some("17:00")),
            record(2, "2024-06-02", Some("09:00"), None),
            record(3, "2024-06-03", None, None),
        ];
        for selected in ["2024-06-01", "2024-06-02", "2024-06-03", "2024-06-04"] {
            let state = DayState::derive(&records, day(selected), day("2024-06-02"));
            assert!(!(state.is_clocked_in && state.is_completed));
        }
    }

    #[test]
    fn first_record_in_store_order_wins_on_duplicates() {
        let records = vec![
            record(7, "2024-06-01", Some("09:00"), None),
            record(8, "2024-06-01", Some("10:00"), Some("18:00")),
        ];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));
        assert_eq!(state.record.map(|r| r.id), Some(7));
        assert!(state.is_clocked_in);
    }

    #[test]
    fn record_with_neither_time_permits_clock_in() {
        let records = vec![record(1, "2024-06-01", None, None)];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));

        assert!(state.record.is_some());
        assert!(!state.is_clocked_in);
        assert!(!state.is_completed);
        assert!(state.can_clock_in);
    }
}
