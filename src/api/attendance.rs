use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::domain::calendar::{MonthGrid, month_grid};
use crate::domain::clock::{SharedClock, day_key, format_display_time};
use crate::domain::clock_flow::{
    ClockAction, ClockFlowError, ClockSession, Evidence, GeoFix, working_hours,
};
use crate::domain::day_state::DayState;
use crate::domain::payroll::salary_estimate;
use crate::model::attendance::AttendanceRecord;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

/// Bulk read of the caller's attendance history, date descending. Clients
/// re-run this after every clock mutation; there is no incremental update.
async fn fetch_records(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time,
               latitude, longitude, status, working_hours,
               selfie_url, selfie_out_url, created_at
        FROM attendance
        WHERE user_id = ?
        ORDER BY date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

fn refusal(err: &ClockFlowError) -> HttpResponse {
    let body = serde_json::json!({ "message": err.to_string() });
    match err {
        ClockFlowError::AlreadyClockedIn
        | ClockFlowError::AlreadyCompleted
        | ClockFlowError::NotClockedIn => HttpResponse::Conflict().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "All attendance records for the caller, newest first", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let records = fetch_records(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(records))
}

#[derive(Deserialize, IntoParams)]
pub struct DayQuery {
    /// Selected calendar day; defaults to today.
    pub selected: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct DayStateResponse {
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub selected: NaiveDate,
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub today: NaiveDate,
    pub record: Option<AttendanceRecord>,
    pub is_clocked_in: bool,
    pub is_completed: bool,
    pub can_clock_in: bool,
    pub can_clock_out: bool,
    /// Display-only strings in the configured fixed offset; `-` when unset.
    #[schema(example = "09:00")]
    pub check_in_display: String,
    #[schema(example = "-")]
    pub check_out_display: String,
}

/// Derived clock state for one day
#[utoipa::path(
    get,
    path = "/api/v1/attendance/day",
    params(DayQuery),
    responses(
        (status = 200, description = "Derived day state", body = DayStateResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn day_state(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<SharedClock>,
    config: web::Data<Config>,
    query: web::Query<DayQuery>,
) -> actix_web::Result<impl Responder> {
    let today = day_key(clock.now_utc());
    let selected = query.selected.unwrap_or(today);

    let records = fetch_records(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let state = DayState::derive(&records, selected, today);
    let offset = config.display_offset_minutes;

    Ok(HttpResponse::Ok().json(DayStateResponse {
        selected,
        today,
        is_clocked_in: state.is_clocked_in,
        is_completed: state.is_completed,
        can_clock_in: state.can_clock_in,
        can_clock_out: state.can_clock_out,
        check_in_display: format_display_time(state.record.and_then(|r| r.check_in_time), offset),
        check_out_display: format_display_time(state.record.and_then(|r| r.check_out_time), offset),
        record: state.record.cloned(),
    }))
}

/// Month grid for the calendar view
#[utoipa::path(
    get,
    path = "/api/v1/attendance/calendar",
    params(DayQuery),
    responses(
        (status = 200, description = "Classified cells for the selected day's month", body = MonthGrid),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn calendar(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<SharedClock>,
    query: web::Query<DayQuery>,
) -> actix_web::Result<impl Responder> {
    let today = day_key(clock.now_utc());
    let selected = query.selected.unwrap_or(today);

    let records = fetch_records(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(month_grid(&records, selected)))
}

#[derive(Deserialize, ToSchema)]
pub struct ClockRequest {
    /// Instant the photo was captured; this is the authoritative transaction
    /// timestamp, not the time the request reaches the server.
    #[schema(example = "2024-06-01T09:00:00Z", value_type = String, format = "date-time")]
    pub captured_at: DateTime<Utc>,
    /// Reference to the uploaded front-camera capture.
    #[schema(example = "https://storage.example.com/selfies/abc.jpg")]
    pub photo_url: String,
    #[schema(example = 22.5726)]
    pub latitude: f64,
    #[schema(example = 88.3639)]
    pub longitude: f64,
}

fn run_session(
    action: ClockAction,
    state: &DayState<'_>,
    payload: &ClockRequest,
) -> Result<(Evidence, GeoFix), ClockFlowError> {
    let (_, evidence, location) = ClockSession::new(action)
        .begin_capture(state)?
        .attach_evidence(Evidence {
            captured_at: payload.captured_at,
            photo_url: payload.photo_url.clone(),
        })?
        .confirm(GeoFix {
            latitude: payload.latitude,
            longitude: payload.longitude,
        })?
        .into_commit()?;
    Ok((evidence, location))
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Evidence incomplete or not today's capture"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<SharedClock>,
    payload: web::Json<ClockRequest>,
) -> actix_web::Result<impl Responder> {
    let today = day_key(clock.now_utc());

    // The captured instant is the transaction timestamp; a capture from any
    // other day cannot open today's record.
    if day_key(payload.captured_at) != today {
        return Ok(refusal(&ClockFlowError::NotToday));
    }

    let records = fetch_records(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let state = DayState::derive(&records, today, today);

    let (evidence, location) = match run_session(ClockAction::In, &state, &payload) {
        Ok(ok) => ok,
        Err(e) => return Ok(refusal(&e)),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO attendance
            (user_id, date, check_in_time, latitude, longitude, status, selfie_url)
        VALUES (?, ?, ?, ?, ?, 'present', ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(today)
    .bind(evidence.captured_at)
    .bind(location.latitude)
    .bind(location.longitude)
    .bind(&evidence.photo_url)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully"
        }))),

        Err(e) => {
            // Unique (user_id, date) key: a concurrent duplicate check-in
            // loses here, not in client logic.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(serde_json::json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            error!(error = %e, user_id = auth.user_id, "Clock-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-out",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "working_hours": 8.0
        })),
        (status = 400, description = "Evidence incomplete"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<SharedClock>,
    payload: web::Json<ClockRequest>,
) -> actix_web::Result<impl Responder> {
    let today = day_key(clock.now_utc());

    let records = fetch_records(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let state = DayState::derive(&records, today, today);

    let (evidence, location) = match run_session(ClockAction::Out, &state, &payload) {
        Ok(ok) => ok,
        Err(e) => return Ok(refusal(&e)),
    };

    // can_clock_out implies an open record with a check-in instant.
    let Some((record_id, check_in_time)) = state
        .record
        .and_then(|r| r.check_in_time.map(|t| (r.id, t)))
    else {
        return Ok(refusal(&ClockFlowError::NotClockedIn));
    };

    let hours = working_hours(check_in_time, evidence.captured_at);

    // Conditional on the expected record id and an unset check-out, so a
    // retried or raced clock-out affects zero rows instead of overwriting.
    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out_time = ?, working_hours = ?,
            latitude = ?, longitude = ?, selfie_out_url = ?
        WHERE id = ? AND user_id = ? AND check_out_time IS NULL
        "#,
    )
    .bind(evidence.captured_at)
    .bind(hours)
    .bind(location.latitude)
    .bind(location.longitude)
    .bind(&evidence.photo_url)
    .bind(record_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Clock-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "message": "No active check-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "working_hours": hours
    })))
}

#[derive(Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Month as `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
    /// Monthly salary used for the estimate; omitted => no estimate.
    pub monthly_salary: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthSummary {
    #[schema(example = "2024-06")]
    pub month: String,
    #[schema(example = 21)]
    pub days_present: i64,
    #[schema(example = 168.5)]
    pub total_hours: f64,
    #[schema(example = 52656, nullable = true)]
    pub salary_estimate: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct SummarySql {
    days_present: i64,
    total_hours: Option<f64>,
}

/// Monthly hours and salary estimate
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Totals for the month", body = MonthSummary),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn month_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<SharedClock>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    let today = day_key(clock.now_utc());
    let month = query
        .month
        .clone()
        .unwrap_or_else(|| format!("{:04}-{:02}", today.year(), today.month()));

    let first_day = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| actix_web::error::ErrorBadRequest("month must be YYYY-MM"))?;

    let row = sqlx::query_as::<_, SummarySql>(
        r#"
        SELECT COUNT(*) AS days_present,
               SUM(working_hours) AS total_hours
        FROM attendance
        WHERE user_id = ?
          AND date >= ?
          AND date < ? + INTERVAL 1 MONTH
          AND check_in_time IS NOT NULL
        "#,
    )
    .bind(auth.user_id)
    .bind(first_day)
    .bind(first_day)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to summarize attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let total_hours = row.total_hours.unwrap_or(0.0);

    Ok(HttpResponse::Ok().json(MonthSummary {
        month,
        days_present: row.days_present,
        total_hours,
        salary_estimate: query
            .monthly_salary
            .map(|salary| salary_estimate(salary, total_hours)),
    }))
}
