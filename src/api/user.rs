use crate::auth::auth::AuthUser;
use crate::model::user::User;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Filter by user type (student/faculty)
    pub user_type: Option<String>,
    /// Filter by approval flag
    pub approved: Option<bool>,
    /// Search by username, email or enrollment number
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<User>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Str(String),
    Bool(bool),
}

/// Paginated user list (admin)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Paginated user list", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions: Vec<&str> = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(user_type) = query.user_type.as_deref().filter(|s| !s.is_empty()) {
        conditions.push("user_type = ?");
        bindings.push(FilterValue::Str(user_type.to_string()));
    }

    if let Some(approved) = query.approved {
        conditions.push("is_approved = ?");
        bindings.push(FilterValue::Bool(approved));
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        conditions.push("(username LIKE ? OR email LIKE ? OR enrollment_no LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM users{}", where_clause);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_q = match b {
            FilterValue::Str(s) => count_q.bind(s),
            FilterValue::Bool(v) => count_q.bind(*v),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count users");
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        r#"
        SELECT id, username, email, enrollment_no, user_type, role_id,
               is_approved, has_face_data, joined_at, last_login_at
        FROM users{}
        ORDER BY id DESC
        LIMIT ? OFFSET ?
        "#,
        where_clause
    );

    let mut data_q = sqlx::query_as::<_, User>(&data_sql);
    for b in &bindings {
        data_q = match b {
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Bool(v) => data_q.bind(*v),
        };
    }
    data_q = data_q.bind(per_page as i64).bind(offset as i64);

    let users = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch users");
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data: users,
        page,
        per_page,
        total,
    }))
}

/// Approve a user account (admin)
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/approve",
    params(
        ("user_id" = u64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User approved"),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn approve_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();

    let result = sqlx::query("UPDATE users SET is_approved = TRUE WHERE id = ?")
        .bind(user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "Failed to approve user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User approved"
    })))
}
