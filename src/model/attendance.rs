use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One attendance row per (user, calendar day). Uniqueness of the pair is a
/// schema invariant; the client side never repairs duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "user_id": 42,
    "date": "2024-06-01",
    "check_in_time": "2024-06-01T09:00:00Z",
    "check_out_time": "2024-06-01T17:00:00Z",
    "latitude": 22.5726,
    "longitude": 88.3639,
    "status": "present",
    "working_hours": 8.0,
    "selfie_url": "https://storage.example.com/selfies/abc.jpg",
    "selfie_out_url": null,
    "created_at": "2024-06-01T09:00:01Z"
}))]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    /// Calendar-day key, the grouping and lookup unit for attendance.
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2024-06-01T09:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_in_time: Option<DateTime<Utc>>,

    #[schema(example = "2024-06-01T17:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_out_time: Option<DateTime<Utc>>,

    #[schema(example = 22.5726, nullable = true)]
    pub latitude: Option<f64>,

    #[schema(example = 88.3639, nullable = true)]
    pub longitude: Option<f64>,

    /// Free-text label written at check-in. Completeness is derived from the
    /// two instants, never read back from this column.
    #[schema(example = "present", nullable = true)]
    pub status: Option<String>,

    /// Hours between check-in and check-out, rounded to 2 decimals at
    /// check-out time.
    #[schema(example = 8.0, nullable = true)]
    pub working_hours: Option<f64>,

    #[schema(nullable = true)]
    pub selfie_url: Option<String>,

    #[schema(nullable = true)]
    pub selfie_out_url: Option<String>,

    #[schema(example = "2024-06-01T09:00:01Z", value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
