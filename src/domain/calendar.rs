use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::clock::days_in_month;
use crate::model::attendance::AttendanceRecord;

/// Fixed weekday header labels, Sunday first.
pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    Absent,
    Incomplete,
    Present,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayCell {
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub day: NaiveDate,
    pub classification: DayClass,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthGrid {
    #[schema(value_type = Vec<String>)]
    pub weekdays: [&'static str; 7],
    pub days: Vec<DayCell>,
}

/// Per-day classification, independent of every other day.
pub fn classify(record: Option<&AttendanceRecord>) -> DayClass {
    match record {
        None => DayClass::Absent,
        Some(r) if r.check_in_time.is_some() && r.check_out_time.is_none() => DayClass::Incomplete,
        // A record with neither instant set still classifies as present.
        Some(_) => DayClass::Present,
    }
}

/// Classified cells for every day of the month containing `selected`.
/// Pure and deterministic: same inputs, same grid.
pub fn month_grid(records: &[AttendanceRecord], selected: NaiveDate) -> MonthGrid {
    // Last-seen entry wins when duplicate days appear upstream; the index
    // never holds more than one record per day.
    let mut by_day: HashMap<NaiveDate, &AttendanceRecord> = HashMap::new();
    for r in records {
        by_day.insert(r.date, r);
    }

    let days = days_in_month(selected)
        .into_iter()
        .map(|day| DayCell {
            day,
            classification: classify(by_day.get(&day).copied()),
            is_selected: day == selected,
        })
        .collect();

    MonthGrid {
        weekdays: WEEKDAYS,
        days,
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
    fn empty_record_set_is_all_absent() {
        let grid = month_grid(&[], day("2024-06-15"));
        assert_eq!(grid.days.len(), 30);
        assert!(grid
            .days
            .iter()
            .all(|c| c.classification == DayClass::Absent));
    }

    #[test]
    fn classification_rules() {
        let records = vec![
            record(1, "2024-06-01", Some("09:00"), Some("17:00")),
            record(2, "2024-06-02", Some("09:00"), None),
            record(3, "2024-06-03", None, None),
        ];
        let grid = month_grid(&records, day("2024-06-01"));

        assert_eq!(grid.days[0].classification, DayClass::Present);
        assert_eq!(grid.days[1].classification, DayClass::Incomplete);
        // Record with neither instant set falls through to present.
        assert_eq!(grid.days[2].classification, DayClass::Present);
        assert_eq!(grid.days[3].classification, DayClass::Absent);
    }

    #[test]
    fn absent_days_unaffected_by_record_order() {
        let mut records = vec![
            record(1, "2024-06-10", Some("09:00"), Some("17:00")),
            record(2, "2024-06-20", Some("09:00"), None),
        ];
        let forward = month_grid(&records, day("2024-06-01"));
        records.reverse();
        let reversed = month_grid(&records, day("2024-06-01"));

        for (a, b) in forward.days.iter().zip(reversed.days.iter()) {
            assert_eq!(a.classification, b.classification);
        }
    }

    #[test]
    fn only_selected_day_is_marked() {
        let grid = month_grid(&[], day("2024-06-15"));
        let selected: Vec<_> = grid.days.iter().filter(|c| c.is_selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].day, day("2024-06-15"));
    }

    #[test]
    fn grid_is_idempotent() {
        let records = vec![record(1, "2024-06-01", Some("09:00"), None)];
        let first = month_grid(&records, day("2024-06-01"));
        let second = month_grid(&records, day("2024-06-01"));
        assert_eq!(first, second);
    }

    #[test]
    fn weekday_headers_are_fixed() {
        let grid = month_grid(&[], day("2024-06-15"));
        assert_eq!(
            grid.weekdays,
            ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
    }
}
