use crate::auth::auth::AuthUser;
use crate::model::master_record::MasterUserRecord;
use crate::services::storage::MediaStore;
use crate::utils::csvio;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

/// One CSV line of the master list. Unknown columns are ignored; missing
/// ones default to empty and get validated per row.
#[derive(Debug, Deserialize, PartialEq)]
pub struct MasterRow {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub enrollment_no: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub face_path: String,
}

#[derive(Serialize, ToSchema)]
pub struct ImportResult {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
}

#[derive(Deserialize, IntoParams)]
pub struct MasterQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Filter by user type (student/faculty)
    pub user_type: Option<String>,
    /// Search username / enrollment / email
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MasterListResponse {
    pub data: Vec<MasterUserRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Parse and sanitize uploaded CSV content. Rows without an enrollment
/// number or email are dropped; the second tuple element counts them.
pub(crate) fn parse_master_rows(text: &str) -> (Vec<MasterRow>, u32) {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut skipped = 0u32;

    for parsed in reader.deserialize::<MasterRow>() {
        let mut row = match parsed {
            Ok(row) => row,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        if row.enrollment_no.is_empty() || row.email.is_empty() {
            skipped += 1;
            continue;
        }

        row.user_type = row.user_type.to_lowercase();
        if row.user_type != "faculty" {
            row.user_type = "student".to_string();
        }

        rows.push(row);
    }

    (rows, skipped)
}

/// Import the authorized-users CSV (admin)
///
/// Body is the raw CSV with columns username, enrollment_no, email,
/// user_type, face_path. Rows upsert by enrollment number.
#[utoipa::path(
    post,
    path = "/api/v1/master-data/import",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import counts", body = ImportResult),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "MasterData"
)]
pub async fn import(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    store: web::Data<MediaStore>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let text = csvio::decode_csv_bytes(&body);
    let (rows, mut skipped) = parse_master_rows(&text);

    let mut created = 0u32;
    let mut updated = 0u32;

    for row in rows {
        let result = sqlx::query(
            r#"
            INSERT INTO master_user_records
                (username, enrollment_no, email, user_type, uploaded_by)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                username = VALUES(username),
                email = VALUES(email),
                user_type = VALUES(user_type),
                uploaded_by = VALUES(uploaded_by)
            "#,
        )
        .bind(&row.username)
        .bind(&row.enrollment_no)
        .bind(&row.email)
        .bind(&row.user_type)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await;

        match result {
            // MySQL reports 1 affected row for an insert, 2 for an update.
            Ok(done) if done.rows_affected() == 1 => created += 1,
            Ok(_) => updated += 1,
            Err(e) => {
                warn!(error = %e, enrollment_no = %row.enrollment_no, "Master row upsert failed");
                skipped += 1;
                continue;
            }
        }

        // A referenced face image becomes the user's default face. Missing
        // files only log; the row itself already imported.
        if !row.face_path.is_empty() {
            match store.copy_as_default(&row.username, &row.face_path) {
                Ok(rel) => {
                    if let Err(e) = sqlx::query(
                        "UPDATE master_user_records SET face_path = ? WHERE enrollment_no = ?",
                    )
                    .bind(&rel)
                    .bind(&row.enrollment_no)
                    .execute(pool.get_ref())
                    .await
                    {
                        warn!(error = %e, enrollment_no = %row.enrollment_no, "Face path update failed");
                    }
                }
                Err(e) => {
                    warn!(error = %e, face_path = %row.face_path, "Master face image not copied");
                }
            }
        }
    }

    Ok(HttpResponse::Ok().json(ImportResult {
        created,
        updated,
        skipped,
    }))
}

/// Paginated master list (admin)
#[utoipa::path(
    get,
    path = "/api/v1/master-data",
    params(MasterQuery),
    responses(
        (status = 200, description = "Paginated master records", body = MasterListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "MasterData"
)]
pub async fn list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MasterQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();

    if let Some(user_type) = query.user_type.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND user_type = ?");
        binds.push(user_type.to_string());
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND (username LIKE ? OR enrollment_no LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        binds.push(like.clone());
        binds.push(like.clone());
        binds.push(like);
    }

    let count_sql = format!("SELECT COUNT(*) FROM master_user_records{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_q = count_q.bind(bind);
    }
    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count master records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, username, enrollment_no, email, user_type, face_path, uploaded_by, created_at
        FROM master_user_records
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, MasterUserRecord>(&data_sql);
    for bind in &binds {
        data_q = data_q.bind(bind);
    }

    let records = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch master records");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(MasterListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}

/// Export the master list as CSV (admin)
#[utoipa::path(
    get,
    path = "/api/v1/master-data/export",
    responses(
        (status = 200, description = "CSV attachment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "MasterData"
)]
pub async fn export(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let records = sqlx::query_as::<_, MasterUserRecord>(
        r#"
        SELECT id, username, enrollment_no, email, user_type, face_path, uploaded_by, created_at
        FROM master_user_records
        ORDER BY enrollment_no
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch master records for export");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let rows: Vec<Vec<String>> = records
        .into_iter()
        .map(|r| {
            vec![
                r.username,
                r.enrollment_no,
                r.email,
                r.user_type,
                r.face_path.unwrap_or_default(),
            ]
        })
        .collect();

    let bytes = csvio::to_csv_bytes(
        &["username", "enrollment_no", "email", "user_type", "face_path"],
        &rows,
    )
    .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"master_users.csv\"",
        ))
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_rows() {
        let csv = "username,enrollment_no,email,user_type,face_path\n\
                   jdoe,EN-1,jdoe@campus.edu,Student,faces/jdoe.jpg\n";
        let (rows, skipped) = parse_master_rows(csv);
        assert_eq!(skipped, 0);
        assert_eq!(
            rows,
            vec![MasterRow {
                username: "jdoe".into(),
                enrollment_no: "EN-1".into(),
                email: "jdoe@campus.edu".into(),
                user_type: "student".into(), // lowercased
                face_path: "faces/jdoe.jpg".into(),
            }]
        );
    }

    #[test]
    fn skips_rows_missing_enrollment_or_email() {
        let csv = "username,enrollment_no,email,user_type,face_path\n\
                   a,,a@campus.edu,student,\n\
                   b,EN-2,,student,\n\
                   c,EN-3,c@campus.edu,faculty,\n";
        let (rows, skipped) = parse_master_rows(csv);
        assert_eq!(skipped, 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "c");
        assert_eq!(rows[0].user_type, "faculty");
    }

    #[test]
    fn unknown_user_type_defaults_to_student() {
        let csv = "username,enrollment_no,email,user_type,face_path\n\
                   d,EN-4,d@campus.edu,professor,\n";
        let (rows, _) = parse_master_rows(csv);
        assert_eq!(rows[0].user_type, "student");
    }

    #[test]
    fn missing_optional_columns_default_to_empty() {
        let csv = "enrollment_no,email\nEN-5,e@campus.edu\n";
        let (rows, skipped) = parse_master_rows(csv);
        assert_eq!(skipped, 0);
        assert_eq!(rows[0].username, "");
        assert_eq!(rows[0].face_path, "");
    }
}
