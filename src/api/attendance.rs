use std::collections::HashSet;

use crate::auth::auth::AuthUser;
use crate::model::attendance::{Attendance, stored_status};
use crate::model::leave_request::leave_status;
use crate::services::face_verify::FaceVerifyClient;
use crate::services::storage::MediaStore;
use crate::timeline::{
    self, AttendanceDay, CalendarMark, DayRecord, LeaveSpan, Summary, aggregate,
    reconstruct_timeline,
};
use crate::utils::csvio;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    /// Base64 face capture, with or without a data-URL header
    #[schema(example = "data:image/jpeg;base64,...")]
    pub image_data: String,
}

#[derive(Serialize, ToSchema)]
pub struct ScanStatusResponse {
    #[schema(example = "Welcome! Please check in.")]
    pub message: String,
    /// true once both times are recorded for today
    pub disable_capture: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub summary: Summary,
    /// newest first
    pub days: Vec<DayRecord>,
}

#[derive(Deserialize, IntoParams)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct CalendarDay {
    #[schema(example = 6)]
    pub day: u32,
    pub status: Option<CalendarMark>,
}

#[derive(Deserialize, IntoParams)]
pub struct OverviewQuery {
    /// Filter by user type (student/faculty)
    pub user_type: Option<String>,
    /// Username substring search
    pub search: Option<String>,
    /// Restrict to a single user id
    pub user: Option<u64>,
    /// "attendance" or "leave" switches the response to CSV
    pub export: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OverviewUser {
    pub id: u64,
    pub username: String,
    pub enrollment_no: Option<String>,
    pub user_type: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserOverview {
    pub user: OverviewUser,
    pub summary: Summary,
    /// newest first
    pub records: Vec<DayRecord>,
}

/* =========================
Data access shared with the dashboard
========================= */

pub(crate) async fn fetch_attendance_days(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<Vec<AttendanceDay>, sqlx::Error> {
    let rows = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, user_id, date, check_in, check_out, status
        FROM attendance
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(Attendance::as_day).collect())
}

pub(crate) async fn approved_leave_spans(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<Vec<LeaveSpan>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (NaiveDate, NaiveDate)>(
        r#"
        SELECT start_date, end_date
        FROM leave_requests
        WHERE user_id = ? AND status = ?
        "#,
    )
    .bind(user_id)
    .bind(leave_status::APPROVED)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(start, end)| LeaveSpan { start, end })
        .collect())
}

pub(crate) async fn joined_at(pool: &MySqlPool, user_id: u64) -> Result<NaiveDate, sqlx::Error> {
    sqlx::query_scalar::<_, NaiveDate>("SELECT joined_at FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Insert an Absent placeholder for every day since enrollment that has no
/// row yet. Idempotent: the (user_id, date) unique key absorbs re-runs and
/// races with a concurrent check-in.
pub(crate) async fn auto_mark_absent(
    pool: &MySqlPool,
    user_id: u64,
    join_date: NaiveDate,
    today: NaiveDate,
) -> Result<(), sqlx::Error> {
    let existing: HashSet<NaiveDate> =
        sqlx::query_scalar::<_, NaiveDate>("SELECT date FROM attendance WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    for date in timeline::missing_dates(join_date, today, &existing) {
        sqlx::query(
            r#"
            INSERT INTO attendance (user_id, date, status)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE id = id
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(stored_status::ABSENT)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Message shown on the scan screen, plus whether further capture is
/// pointless today.
pub(crate) fn scan_state(row: Option<&AttendanceDay>) -> (String, bool) {
    match row {
        Some(AttendanceDay {
            check_in: Some(check_in),
            check_out: Some(check_out),
            ..
        }) => (
            format!(
                "Already checked in at {} and checked out at {}.",
                check_in.format("%H:%M:%S"),
                check_out.format("%H:%M:%S")
            ),
            true,
        ),
        Some(AttendanceDay {
            check_in: Some(check_in),
            check_out: None,
            ..
        }) => (
            format!(
                "Checked in at {}. You can check out now.",
                check_in.format("%H:%M:%S")
            ),
            false,
        ),
        _ => ("Welcome! Please check in.".to_string(), false),
    }
}

async fn today_row(pool: &MySqlPool, user_id: u64) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, user_id, date, check_in, check_out, status
        FROM attendance
        WHERE user_id = ? AND date = CURDATE()
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/* =========================
Check-in / check-out
========================= */

/// Face-verified check-in for today
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInReq,
    responses(
        (status = 200, description = "Checked in successfully"),
        (status = 400, description = "Face mismatch, bad image, or already checked in"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Face verification service unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    store: web::Data<MediaStore>,
    faces: web::Data<FaceVerifyClient>,
    payload: web::Json<CheckInReq>,
) -> actix_web::Result<impl Responder> {
    let profile = sqlx::query_scalar::<_, String>(
        "SELECT image_path FROM face_profiles WHERE user_id = ?",
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Face profile lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(profile) = profile else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No enrolled face found. Register your face first."
        })));
    };

    let bytes = match MediaStore::decode_capture(&payload.image_data) {
        Ok(b) => b,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": format!("Could not read capture: {}", e)
            })));
        }
    };

    let capture = store.save_pending(&auth.username, &bytes).map_err(|e| {
        error!(error = %e, "Failed to store capture");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let verdict = faces
        .verify(&store.absolute(&profile), &store.absolute(&capture))
        .await;

    // The capture only exists for the comparison.
    store.remove(&capture);

    match verdict {
        Ok(true) => {}
        Ok(false) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Face did not match. Please try again."
            })));
        }
        Err(e) => {
            error!(error = %e, user_id = auth.user_id, "Face verification failed");
            return Ok(HttpResponse::BadGateway().json(serde_json::json!({
                "message": "Face verification service unavailable"
            })));
        }
    }

    // Promote a backfilled Absent placeholder if one exists for today.
    let promoted = sqlx::query(
        r#"
        UPDATE attendance
        SET check_in = CURTIME(), status = ?
        WHERE user_id = ? AND date = CURDATE() AND check_in IS NULL
        "#,
    )
    .bind(stored_status::CHECKED_IN)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Check-in promote failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if promoted.rows_affected() == 0 {
        let inserted = sqlx::query(
            r#"
            INSERT INTO attendance (user_id, date, check_in, status)
            VALUES (?, CURDATE(), CURTIME(), ?)
            "#,
        )
        .bind(auth.user_id)
        .bind(stored_status::CHECKED_IN)
        .execute(pool.get_ref())
        .await;

        if let Err(e) = inserted {
            // Duplicate: a row with check_in already set exists for today.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            error!(error = %e, user_id = auth.user_id, "Check-in failed");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    }

    let check_in_time = sqlx::query_scalar::<_, Option<NaiveTime>>(
        "SELECT check_in FROM attendance WHERE user_id = ? AND date = CURDATE()",
    )
    .bind(auth.user_id)
    .fetch_one(pool.get_ref())
    .await
    .unwrap_or(None);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "check_in": check_in_time.map(|t| t.format("%H:%M:%S").to_string())
    })))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully"),
        (status = 400, description = "No active check-in found for today"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = CURTIME(), status = ?
        WHERE user_id = ?
        AND date = CURDATE()
        AND check_in IS NOT NULL
        AND check_out IS NULL
        "#,
    )
    .bind(stored_status::PRESENT)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active check-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully"
    })))
}

/// Today's scan-screen state
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    responses(
        (status = 200, description = "Today's check-in state", body = ScanStatusResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let row = today_row(pool.get_ref(), auth.user_id).await.map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Today lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let day = row.as_ref().map(Attendance::as_day);
    let (message, disable_capture) = scan_state(day.as_ref());

    Ok(HttpResponse::Ok().json(ScanStatusResponse {
        message,
        disable_capture,
    }))
}

/* =========================
Reports
========================= */

async fn build_report(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<(Vec<DayRecord>, Summary), sqlx::Error> {
    let today = Local::now().date_naive();
    let join_date = joined_at(pool, user_id).await?;

    auto_mark_absent(pool, user_id, join_date, today).await?;

    let rows = fetch_attendance_days(pool, user_id).await?;
    let leaves = approved_leave_spans(pool, user_id).await?;

    let mut days = reconstruct_timeline(join_date, today, &rows, &leaves);
    let summary = aggregate(&days);
    days.reverse(); // newest first, like every report screen

    Ok((days, summary))
}

/// Own attendance report
#[utoipa::path(
    get,
    path = "/api/v1/attendance/report",
    responses(
        (status = 200, description = "Full per-day report since enrollment", body = ReportResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let (days, summary) = build_report(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Report failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(ReportResponse { summary, days }))
}

fn report_csv_rows(days: &[DayRecord]) -> Vec<Vec<String>> {
    days.iter()
        .map(|day| {
            vec![
                day.date.format("%Y-%m-%d").to_string(),
                csvio::time_or_dashes(day.check_in),
                csvio::time_or_dashes(day.check_out),
                day.status.to_string(),
            ]
        })
        .collect()
}

/// Own attendance report as CSV
#[utoipa::path(
    get,
    path = "/api/v1/attendance/report/csv",
    responses(
        (status = 200, description = "CSV attachment"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn report_csv(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let (days, _) = build_report(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "CSV report failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let bytes = csvio::to_csv_bytes(
        &["Date", "Check In", "Check Out", "Status"],
        &report_csv_rows(&days),
    )
    .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}_attendance.csv\"", auth.username),
        ))
        .body(bytes))
}

/// Month calendar for the dashboard
#[utoipa::path(
    get,
    path = "/api/v1/attendance/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Per-day marks for one month"),
        (status = 400, description = "Invalid year/month"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn calendar(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<CalendarQuery>,
) -> actix_web::Result<impl Responder> {
    let today = Local::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid year/month"
        })));
    }

    let rows = fetch_attendance_days(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Calendar fetch failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    let leaves = approved_leave_spans(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Calendar leave fetch failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let days: Vec<CalendarDay> = timeline::calendar_marks(year, month, &rows, &leaves)
        .into_iter()
        .map(|(day, status)| CalendarDay { day, status })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "year": year,
        "month": month,
        "days": days
    })))
}

/* =========================
Admin: every user's reconstruction
========================= */

#[derive(sqlx::FromRow)]
struct OverviewUserRow {
    id: u64,
    username: String,
    enrollment_no: Option<String>,
    user_type: String,
    joined_at: NaiveDate,
}

/// All-users attendance overview (admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/users",
    params(OverviewQuery),
    responses(
        (status = 200, description = "Per-user timelines and summaries, or CSV when export is set"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn users_overview(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<OverviewQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();

    if let Some(user_type) = query.user_type.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND user_type = ?");
        binds.push(user_type.to_string());
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND username LIKE ?");
        binds.push(format!("%{}%", search));
    }
    if let Some(user_id) = query.user {
        where_sql.push_str(" AND id = ?");
        binds.push(user_id.to_string());
    }

    let sql = format!(
        "SELECT id, username, enrollment_no, user_type, joined_at FROM users{} ORDER BY username",
        where_sql
    );

    let mut users_q = sqlx::query_as::<_, OverviewUserRow>(&sql);
    for bind in &binds {
        users_q = users_q.bind(bind);
    }

    let users = users_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch users for overview");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let today = Local::now().date_naive();
    let mut overviews = Vec::with_capacity(users.len());

    for user in &users {
        let rows = fetch_attendance_days(pool.get_ref(), user.id)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = user.id, "Overview fetch failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
        let leaves = approved_leave_spans(pool.get_ref(), user.id)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = user.id, "Overview leave fetch failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

        let mut records = reconstruct_timeline(user.joined_at, today, &rows, &leaves);
        let summary = aggregate(&records);
        records.reverse();

        overviews.push(UserOverview {
            user: OverviewUser {
                id: user.id,
                username: user.username.clone(),
                enrollment_no: user.enrollment_no.clone(),
                user_type: user.user_type.clone(),
            },
            summary,
            records,
        });
    }

    match query.export.as_deref() {
        Some("attendance") => {
            let mut rows = Vec::new();
            for overview in &overviews {
                for record in &overview.records {
                    rows.push(vec![
                        overview.user.username.clone(),
                        overview.user.enrollment_no.clone().unwrap_or_else(|| "--".into()),
                        overview.user.user_type.clone(),
                        record.date.format("%Y-%m-%d").to_string(),
                        record.status.to_string(),
                        csvio::time_or_dashes(record.check_in),
                        csvio::time_or_dashes(record.check_out),
                    ]);
                }
            }
            let bytes = csvio::to_csv_bytes(
                &["Username", "Enrollment No", "User Type", "Date", "Status", "Check In", "Check Out"],
                &rows,
            )
            .map_err(actix_web::error::ErrorInternalServerError)?;

            Ok(csv_attachment("attendance_export.csv", bytes))
        }
        Some("leave") => {
            let mut rows = Vec::new();
            for user in &users {
                let leaves = sqlx::query_as::<_, crate::model::leave_request::LeaveRequest>(
                    r#"
                    SELECT id, user_id, start_date, end_date, leave_type, reason, status, created_at
                    FROM leave_requests
                    WHERE user_id = ? AND status = ?
                    ORDER BY start_date
                    "#,
                )
                .bind(user.id)
                .bind(leave_status::APPROVED)
                .fetch_all(pool.get_ref())
                .await
                .map_err(|e| {
                    error!(error = %e, user_id = user.id, "Leave export fetch failed");
                    actix_web::error::ErrorInternalServerError("Internal Server Error")
                })?;

                for leave in leaves {
                    rows.push(vec![
                        user.username.clone(),
                        user.enrollment_no.clone().unwrap_or_else(|| "--".into()),
                        user.user_type.clone(),
                        leave.start_date.format("%Y-%m-%d").to_string(),
                        leave.end_date.format("%Y-%m-%d").to_string(),
                        leave.reason,
                        leave.status,
                    ]);
                }
            }
            let bytes = csvio::to_csv_bytes(
                &["Username", "Enrollment No", "User Type", "From", "To", "Reason", "Status"],
                &rows,
            )
            .map_err(actix_web::error::ErrorInternalServerError)?;

            Ok(csv_attachment("leave_export.csv", bytes))
        }
        _ => Ok(HttpResponse::Ok().json(overviews)),
    }
}

fn csv_attachment(filename: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(check_in: Option<(u32, u32)>, check_out: Option<(u32, u32)>) -> AttendanceDay {
        AttendanceDay {
            date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            check_in: check_in.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            check_out: check_out.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
        }
    }

    #[test]
    fn scan_state_before_any_row() {
        let (message, disabled) = scan_state(None);
        assert_eq!(message, "Welcome! Please check in.");
        assert!(!disabled);
    }

    #[test]
    fn scan_state_placeholder_row_still_invites_check_in() {
        let row = day(None, None);
        let (message, disabled) = scan_state(Some(&row));
        assert_eq!(message, "Welcome! Please check in.");
        assert!(!disabled);
    }

    #[test]
    fn scan_state_after_check_in() {
        let row = day(Some((9, 30)), None);
        let (message, disabled) = scan_state(Some(&row));
        assert_eq!(message, "Checked in at 09:30:00. You can check out now.");
        assert!(!disabled);
    }

    #[test]
    fn scan_state_after_full_day_disables_capture() {
        let row = day(Some((9, 30)), Some((17, 0)));
        let (message, disabled) = scan_state(Some(&row));
        assert!(message.starts_with("Already checked in at 09:30:00"));
        assert!(disabled);
    }

    #[test]
    fn csv_rows_mirror_the_timeline() {
        let days = vec![DayRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            status: crate::timeline::DayStatus::CheckedInOnly,
            check_in: NaiveTime::from_hms_opt(9, 0, 0),
            check_out: None,
        }];
        let rows = report_csv_rows(&days);
        assert_eq!(
            rows,
            vec![vec![
                "2025-01-06".to_string(),
                "09:00:00".to_string(),
                "--".to_string(),
                "Present (Checked In Only)".to_string(),
            ]]
        );
    }
}
