use crate::api::attendance::{approved_leave_spans, fetch_attendance_days};
use crate::auth::auth::AuthUser;
use crate::timeline::{aggregate, reconstruct_timeline, round2};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

/// Users under this attendance percent are flagged on the dashboard.
const LOW_ATTENDANCE_THRESHOLD: f64 = 75.0;
const TOP_RANKED: usize = 3;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankedUser {
    pub username: String,
    pub user_type: String,
    #[schema(example = 87.5)]
    pub attendance_percent: f64,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    #[schema(example = "2025-01")]
    pub month: String,
    pub count: i64,
}

#[derive(Serialize, ToSchema)]
pub struct RecentAttendance {
    pub username: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Share of users with any attendance row today
    pub today_attendance_percent: f64,
    pub total_students: i64,
    pub total_faculty: i64,
    pub top_students: Vec<RankedUser>,
    pub top_faculty: Vec<RankedUser>,
    pub low_attendance_users: Vec<RankedUser>,
    pub student_monthly: Vec<MonthlyCount>,
    pub faculty_monthly: Vec<MonthlyCount>,
    pub recent: Vec<RecentAttendance>,
}

/// Reconstructed attendance percent for every user of one type. The same
/// core computation the per-user report uses, so dashboard rankings and
/// reports can never disagree.
async fn ranked_users(pool: &MySqlPool, user_type: &str) -> Result<Vec<RankedUser>, sqlx::Error> {
    let users = sqlx::query_as::<_, (u64, String, String, NaiveDate)>(
        "SELECT id, username, user_type, joined_at FROM users WHERE user_type = ?",
    )
    .bind(user_type)
    .fetch_all(pool)
    .await?;

    let today = Local::now().date_naive();
    let mut ranked = Vec::with_capacity(users.len());

    for (id, username, user_type, joined_at) in users {
        let rows = fetch_attendance_days(pool, id).await?;
        let leaves = approved_leave_spans(pool, id).await?;
        let summary = aggregate(&reconstruct_timeline(joined_at, today, &rows, &leaves));

        ranked.push(RankedUser {
            username,
            user_type,
            attendance_percent: summary.percent,
        });
    }

    Ok(ranked)
}

fn top_n(mut ranked: Vec<RankedUser>, n: usize) -> Vec<RankedUser> {
    ranked.sort_by(|a, b| {
        b.attendance_percent
            .partial_cmp(&a.attendance_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

fn below_threshold(ranked: &[RankedUser], threshold: f64) -> Vec<RankedUser> {
    ranked
        .iter()
        .filter(|u| u.attendance_percent < threshold)
        .cloned()
        .collect()
}

async fn monthly_counts(pool: &MySqlPool, user_type: &str) -> Result<Vec<MonthlyCount>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT DATE_FORMAT(a.date, '%Y-%m') AS month, COUNT(*) AS count
        FROM attendance a
        JOIN users u ON u.id = a.user_id
        WHERE u.user_type = ?
        GROUP BY month
        ORDER BY month
        "#,
    )
    .bind(user_type)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect())
}

/// Admin dashboard
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard metrics", body = DashboardResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let pool = pool.get_ref();

    let internal = |context: &'static str| {
        move |e: sqlx::Error| {
            error!(error = %e, "{}", context);
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        }
    };

    let today_rows =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE date = CURDATE()")
            .fetch_one(pool)
            .await
            .map_err(internal("Failed to count today's attendance"))?;

    let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(internal("Failed to count users"))?;

    let today_attendance_percent = if total_users > 0 {
        round2(today_rows as f64 / total_users as f64 * 100.0)
    } else {
        0.0
    };

    let total_students =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE user_type = 'student'")
            .fetch_one(pool)
            .await
            .map_err(internal("Failed to count students"))?;

    let total_faculty =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE user_type = 'faculty'")
            .fetch_one(pool)
            .await
            .map_err(internal("Failed to count faculty"))?;

    let students = ranked_users(pool, "student")
        .await
        .map_err(internal("Failed to rank students"))?;
    let faculty = ranked_users(pool, "faculty")
        .await
        .map_err(internal("Failed to rank faculty"))?;

    let mut low_attendance_users = below_threshold(&students, LOW_ATTENDANCE_THRESHOLD);
    low_attendance_users.extend(below_threshold(&faculty, LOW_ATTENDANCE_THRESHOLD));

    let student_monthly = monthly_counts(pool, "student")
        .await
        .map_err(internal("Failed to load student monthly counts"))?;
    let faculty_monthly = monthly_counts(pool, "faculty")
        .await
        .map_err(internal("Failed to load faculty monthly counts"))?;

    let recent = sqlx::query_as::<_, (String, NaiveDate, String)>(
        r#"
        SELECT u.username, a.date, a.status
        FROM attendance a
        JOIN users u ON u.id = a.user_id
        ORDER BY a.date DESC, a.id DESC
        LIMIT 5
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(internal("Failed to load recent attendance"))?
    .into_iter()
    .map(|(username, date, status)| RecentAttendance {
        username,
        date,
        status,
    })
    .collect();

    Ok(HttpResponse::Ok().json(DashboardResponse {
        today_attendance_percent,
        total_students,
        total_faculty,
        top_students: top_n(students, TOP_RANKED),
        top_faculty: top_n(faculty, TOP_RANKED),
        low_attendance_users,
        student_monthly,
        faculty_monthly,
        recent,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(username: &str, percent: f64) -> RankedUser {
        RankedUser {
            username: username.to_string(),
            user_type: "student".to_string(),
            attendance_percent: percent,
        }
    }

    #[test]
    fn top_n_orders_by_percent_desc() {
        let users = vec![ranked("a", 40.0), ranked("b", 90.0), ranked("c", 75.5), ranked("d", 88.0)];
        let top = top_n(users, 3);
        let names: Vec<&str> = top.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "c"]);
    }

    #[test]
    fn top_n_handles_short_lists() {
        let top = top_n(vec![ranked("a", 10.0)], 3);
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn threshold_is_strict() {
        let users = vec![ranked("low", 74.99), ranked("edge", 75.0), ranked("high", 99.0)];
        let low = below_threshold(&users, LOW_ATTENDANCE_THRESHOLD);
        let names: Vec<&str> = low.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["low"]);
    }
}
