use chrono::{DateTime, Utc};
use strum::Display;
use thiserror::Error;

use crate::domain::day_state::DayState;

/// The two halves of an attendance transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ClockAction {
    In,
    Out,
}

/// Photo + timestamp pair gathered before a clock transaction commits.
/// `captured_at` is the authoritative transaction timestamp, recorded at the
/// moment of capture rather than at confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
    pub captured_at: DateTime<Utc>,
    pub photo_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ClockFlowError {
    #[error("Clock-in is allowed only for today")]
    NotToday,
    #[error("Already checked in today")]
    AlreadyClockedIn,
    #[error("Attendance already completed for today")]
    AlreadyCompleted,
    #[error("No active check-in found for today")]
    NotClockedIn,
    #[error("Photo evidence is required")]
    MissingEvidence,
    #[error("Clock session is not in a valid state for this step")]
    InvalidTransition,
}

/// Precondition gate for a clock action against today's derived state.
/// Refusal carries the user-facing reason; no side effect has happened yet.
pub fn authorize(action: ClockAction, state: &DayState<'_>) -> Result<(), ClockFlowError> {
    match action {
        ClockAction::In if state.can_clock_in => Ok(()),
        ClockAction::Out if state.can_clock_out => Ok(()),
        ClockAction::In | ClockAction::Out if state.is_completed => {
            Err(ClockFlowError::AlreadyCompleted)
        }
        ClockAction::In if state.is_clocked_in => Err(ClockFlowError::AlreadyClockedIn),
        ClockAction::In => Err(ClockFlowError::NotToday),
        ClockAction::Out => Err(ClockFlowError::NotClockedIn),
    }
}

/// Hours between check-in and check-out, rounded to 2 decimal places.
pub fn working_hours(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> f64 {
    let hours = (check_out - check_in).num_milliseconds() as f64 / 3_600_000.0;
    (hours * 100.0).round() / 100.0
}

/// Per-transaction session:
/// `Idle -> CapturingEvidence -> AwaitingConfirmation -> Committing`.
/// Cancelling from any state returns to `Idle` and discards all captured
/// evidence; the flow is not resumable once interrupted.
#[derive(Debug, PartialEq)]
pub enum ClockSession {
    Idle {
        action: ClockAction,
    },
    CapturingEvidence {
        action: ClockAction,
    },
    AwaitingConfirmation {
        action: ClockAction,
        evidence: Evidence,
    },
    Committing {
        action: ClockAction,
        evidence: Evidence,
        location: GeoFix,
    },
}

impl ClockSession {
    pub fn new(action: ClockAction) -> Self {
        ClockSession::Idle { action }
    }

    /// Step 1: the precondition check. Opens the capture phase only when the
    /// derived day state permits the action.
    pub fn begin_capture(self, state: &DayState<'_>) -> Result<Self, ClockFlowError> {
        match self {
            ClockSession::Idle { action } => {
                authorize(action, state)?;
                Ok(ClockSession::CapturingEvidence { action })
            }
            _ => Err(ClockFlowError::InvalidTransition),
        }
    }

    /// Step 2: evidence capture. A missing photo aborts with no artifact.
    pub fn attach_evidence(self, evidence: Evidence) -> Result<Self, ClockFlowError> {
        match self {
            ClockSession::CapturingEvidence { action } => {
                if evidence.photo_url.trim().is_empty() {
                    return Err(ClockFlowError::MissingEvidence);
                }
                Ok(ClockSession::AwaitingConfirmation { action, evidence })
            }
            _ => Err(ClockFlowError::InvalidTransition),
        }
    }

    /// Step 3: confirmation. Location is acquired here; up to this point the
    /// session is fully reversible with no backend effect.
    pub fn confirm(self, location: GeoFix) -> Result<Self, ClockFlowError> {
        match self {
            ClockSession::AwaitingConfirmation { action, evidence } => {
                Ok(ClockSession::Committing {
                    action,
                    evidence,
                    location,
                })
            }
            _ => Err(ClockFlowError::InvalidTransition),
        }
    }

    /// Abort from any state. All captured evidence is dropped.
    pub fn cancel(self) -> Self {
        let action = match self {
            ClockSession::Idle { action }
            | ClockSession::CapturingEvidence { action }
            | ClockSession::AwaitingConfirmation { action, .. }
            | ClockSession::Committing { action, .. } => action,
        };
        ClockSession::Idle { action }
    }

    /// Step 4: hand the confirmed payload to the store commit.
    pub fn into_commit(self) -> Result<(ClockAction, Evidence, GeoFix), ClockFlowError> {
        match self {
            ClockSession::Committing {
                action,
                evidence,
                location,
            } => Ok((action, evidence, location)),
            _ => Err(ClockFlowError::InvalidTransition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceRecord;
    use chrono::{NaiveDate, NaiveDateTime};

    fn instant(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn record(date: &str, check_in: Option<&str>, check_out: Option<&str>) -> AttendanceRecord {
        let at = |hhmm: &str| instant(&format!("{date} {hhmm}:00"));
        AttendanceRecord {
            id: 1,
            user_id: 1,
            date: date.parse().unwrap(),
            check_in_time: check_in.map(at),
            check_out_time: check_out.map(at),
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

    fn evidence() -> Evidence {
        Evidence {
            captured_at: instant("2024-06-01 09:00:00"),
            photo_url: "https://storage.example.com/selfies/abc.jpg".to_string(),
        }
    }

    fn geo() -> GeoFix {
        GeoFix {
            latitude: 22.5726,
            longitude: 88.3639,
        }
    }

    #[test]
    fn two_and_a_half_hours() {
        let h = working_hours(
            instant("2024-06-01 09:00:00"),
            instant("2024-06-01 11:30:00"),
        );
        assert_eq!(h, 2.5);
    }

    #[test]
    fn identical_instants_yield_zero() {
        let t = instant("2024-06-01 09:00:00");
        assert_eq!(working_hours(t, t), 0.00);
    }

    #[test]
    fn rounding_is_two_decimals() {
        // 100 minutes = 1.666... hours.
        let h = working_hours(
            instant("2024-06-01 09:00:00"),
            instant("2024-06-01 10:40:00"),
        );
        assert_eq!(h, 1.67);
    }

    #[test]
    fn happy_path_reaches_commit() {
        let records: Vec<AttendanceRecord> = vec![];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));

        let session = ClockSession::new(ClockAction::In)
            .begin_capture(&state)
            .and_then(|s| s.attach_evidence(evidence()))
            .and_then(|s| s.confirm(geo()))
            .unwrap();

        let (action, ev, loc) = session.into_commit().unwrap();
        assert_eq!(action, ClockAction::In);
        assert_eq!(ev, evidence());
        assert_eq!(loc, geo());
    }

    #[test]
    fn precondition_refuses_clock_in_on_completed_day() {
        let records = vec![record("2024-06-01", Some("09:00"), Some("17:00"))];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));

        let err = ClockSession::new(ClockAction::In)
            .begin_capture(&state)
            .unwrap_err();
        assert_eq!(err, ClockFlowError::AlreadyCompleted);
    }

    #[test]
    fn precondition_refuses_clock_out_without_open_record() {
        let records: Vec<AttendanceRecord> = vec![];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));

        let err = ClockSession::new(ClockAction::Out)
            .begin_capture(&state)
            .unwrap_err();
        assert_eq!(err, ClockFlowError::NotClockedIn);
    }

    #[test]
    fn clock_in_off_today_refused_as_not_today() {
        let records: Vec<AttendanceRecord> = vec![];
        let state = DayState::derive(&records, day("2024-05-31"), day("2024-06-01"));

        let err = ClockSession::new(ClockAction::In)
            .begin_capture(&state)
            .unwrap_err();
        assert_eq!(err, ClockFlowError::NotToday);
    }

    #[test]
    fn empty_photo_aborts_capture() {
        let records: Vec<AttendanceRecord> = vec![];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));

        let err = ClockSession::new(ClockAction::In)
            .begin_capture(&state)
            .and_then(|s| {
                s.attach_evidence(Evidence {
                    captured_at: instant("2024-06-01 09:00:00"),
                    photo_url: "  ".to_string(),
                })
            })
            .unwrap_err();
        assert_eq!(err, ClockFlowError::MissingEvidence);
    }

    #[test]
    fn cancel_discards_evidence_from_any_state() {
        let records: Vec<AttendanceRecord> = vec![];
        let state = DayState::derive(&records, day("2024-06-01"), day("2024-06-01"));

        let awaiting = ClockSession::new(ClockAction::In)
            .begin_capture(&state)
            .and_then(|s| s.attach_evidence(evidence()))
            .unwrap();

        let idle = awaiting.cancel();
        assert_eq!(
            idle,
            ClockSession::Idle {
                action: ClockAction::In
            }
        );
        // A cancelled session cannot resume mid-flow.
        assert_eq!(
            idle.attach_evidence(evidence()).unwrap_err(),
            ClockFlowError::InvalidTransition
        );
    }

    #[test]
    fn commit_requires_confirmation() {
        let session = ClockSession::new(ClockAction::Out);
        assert_eq!(
            session.into_commit().unwrap_err(),
            ClockFlowError::InvalidTransition
        );
    }
}
