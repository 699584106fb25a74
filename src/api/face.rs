use crate::auth::auth::AuthUser;
use crate::model::face::{FaceChangeRequest, FaceProfile, request_status};
use crate::services::face_verify::FaceVerifyClient;
use crate::services::storage::MediaStore;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct FaceCaptureReq {
    /// Base64 face capture, with or without a data-URL header
    #[schema(example = "data:image/jpeg;base64,...")]
    pub image_data: String,
}

#[derive(Serialize, ToSchema)]
pub struct FaceViewResponse {
    pub has_face: bool,
    /// URL of the current approved face
    pub current: Option<String>,
    /// URL of the latest pending change request
    pub pending: Option<String>,
    /// URL of the latest rejected change request
    pub rejected: Option<String>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct FaceRequestRow {
    pub id: u64,
    pub user_id: u64,
    pub username: String,
    pub new_image_path: String,
    pub status: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

async fn current_profile(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<Option<FaceProfile>, sqlx::Error> {
    sqlx::query_as::<_, FaceProfile>(
        r#"
        SELECT id, user_id, image_path, uploaded_at
        FROM face_profiles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

async fn latest_request_path(
    pool: &MySqlPool,
    user_id: u64,
    status: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT new_image_path
        FROM face_change_requests
        WHERE user_id = ? AND status = ?
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(status)
    .fetch_optional(pool)
    .await
}

async fn set_profile(
    pool: &MySqlPool,
    user_id: u64,
    image_path: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO face_profiles (user_id, image_path)
        VALUES (?, ?)
        ON DUPLICATE KEY UPDATE image_path = VALUES(image_path)
        "#,
    )
    .bind(user_id)
    .bind(image_path)
    .execute(pool)
    .await?;

    sqlx::query("UPDATE users SET has_face_data = TRUE WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

async fn record_request(
    pool: &MySqlPool,
    user_id: u64,
    image_path: &str,
    status: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO face_change_requests (user_id, new_image_path, status)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(image_path)
    .bind(status)
    .execute(pool)
    .await?;

    Ok(())
}

/// Current, pending and rejected face images
#[utoipa::path(
    get,
    path = "/api/v1/face",
    responses(
        (status = 200, description = "Face image URLs for the caller", body = FaceViewResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Face"
)]
pub async fn face_view(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    store: web::Data<MediaStore>,
) -> actix_web::Result<impl Responder> {
    let current = current_profile(pool.get_ref(), auth.user_id)
        .await
        .map_err(internal("Face profile lookup failed"))?;
    let pending = latest_request_path(pool.get_ref(), auth.user_id, request_status::PENDING)
        .await
        .map_err(internal("Pending request lookup failed"))?;
    let rejected = latest_request_path(pool.get_ref(), auth.user_id, request_status::REJECTED)
        .await
        .map_err(internal("Rejected request lookup failed"))?;

    Ok(HttpResponse::Ok().json(FaceViewResponse {
        has_face: current.is_some(),
        current: current.map(|p| store.url_for(&p.image_path)),
        pending: pending.map(|p| store.url_for(&p)),
        rejected: rejected.map(|p| store.url_for(&p)),
    }))
}

/// Enroll or replace the caller's face
///
/// First capture enrolls directly. Later captures are compared against the
/// enrolled face: a match is auto-approved and becomes the new profile, a
/// mismatch is auto-rejected and the capture discarded.
#[utoipa::path(
    post,
    path = "/api/v1/face",
    request_body = FaceCaptureReq,
    responses(
        (status = 200, description = "Face registered or updated"),
        (status = 400, description = "Bad image or face mismatch"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Face verification service unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Face"
)]
pub async fn face_add(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    store: web::Data<MediaStore>,
    faces: web::Data<FaceVerifyClient>,
    payload: web::Json<FaceCaptureReq>,
) -> actix_web::Result<impl Responder> {
    let bytes = match MediaStore::decode_capture(&payload.image_data) {
        Ok(b) => b,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": format!("Could not read capture: {}", e)
            })));
        }
    };

    let profile = current_profile(pool.get_ref(), auth.user_id)
        .await
        .map_err(internal("Face profile lookup failed"))?;

    // First enrollment: no comparison possible, store directly.
    let Some(profile) = profile.map(|p| p.image_path) else {
        let rel = store
            .store_numbered(&auth.username, &bytes)
            .map_err(internal("Failed to store face image"))?;

        set_profile(pool.get_ref(), auth.user_id, &rel)
            .await
            .map_err(internal("Failed to create face profile"))?;

        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Face registered successfully!"
        })));
    };

    let pending = store
        .save_pending(&auth.username, &bytes)
        .map_err(internal("Failed to store capture"))?;

    let verdict = faces
        .verify(&store.absolute(&profile), &store.absolute(&pending))
        .await;

    match verdict {
        Ok(true) => {
            let adopted = store
                .adopt_numbered(&auth.username, &pending)
                .map_err(internal("Failed to store approved face"))?;
            store.remove(&pending);

            record_request(pool.get_ref(), auth.user_id, &adopted, request_status::APPROVED)
                .await
                .map_err(internal("Failed to record face change"))?;
            set_profile(pool.get_ref(), auth.user_id, &adopted)
                .await
                .map_err(internal("Failed to update face profile"))?;

            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "Face verified and updated successfully!"
            })))
        }
        Ok(false) => {
            // Record the rejection, then discard the unmatched capture.
            record_request(pool.get_ref(), auth.user_id, &pending, request_status::REJECTED)
                .await
                .map_err(internal("Failed to record face rejection"))?;
            store.remove(&pending);

            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Face did not match. Please try again."
            })))
        }
        Err(e) => {
            error!(error = %e, user_id = auth.user_id, "Face verification failed");
            store.remove(&pending);

            Ok(HttpResponse::BadGateway().json(serde_json::json!({
                "message": "Face verification service unavailable"
            })))
        }
    }
}

/// Pending face change requests (admin)
#[utoipa::path(
    get,
    path = "/api/v1/face/requests",
    responses(
        (status = 200, description = "Pending requests", body = [FaceRequestRow]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Face"
)]
pub async fn pending_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let requests = sqlx::query_as::<_, FaceRequestRow>(
        r#"
        SELECT r.id, r.user_id, u.username, r.new_image_path, r.status, r.created_at
        FROM face_change_requests r
        JOIN users u ON u.id = r.user_id
        WHERE r.status = ?
        ORDER BY r.created_at
        "#,
    )
    .bind(request_status::PENDING)
    .fetch_all(pool.get_ref())
    .await
    .map_err(internal("Failed to fetch face change requests"))?;

    Ok(HttpResponse::Ok().json(requests))
}

/// Approve a pending face change (admin)
#[utoipa::path(
    put,
    path = "/api/v1/face/requests/{request_id}/approve",
    params(
        ("request_id" = u64, Path, description = "Face change request ID")
    ),
    responses(
        (status = 200, description = "Face change approved"),
        (status = 400, description = "Request not found, already processed, or image missing"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Face"
)]
pub async fn approve_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    store: web::Data<MediaStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let request_id = path.into_inner();

    let request = sqlx::query_as::<_, FaceChangeRequest>(
        r#"
        SELECT id, user_id, new_image_path, status, created_at
        FROM face_change_requests
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(request_id)
    .bind(request_status::PENDING)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(internal("Failed to fetch face change request"))?;

    let Some(request) = request else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Request not found or already processed"
        })));
    };

    let username = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = ?")
        .bind(request.user_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(internal("Failed to fetch request owner"))?;

    let proposed = request.new_image_path.clone();

    let adopted = match store.adopt_numbered(&username, &proposed) {
        Ok(rel) => rel,
        Err(e) => {
            error!(error = %e, request_id, "Proposed face image unavailable");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Proposed image is missing"
            })));
        }
    };

    set_profile(pool.get_ref(), request.user_id, &adopted)
        .await
        .map_err(internal("Failed to update face profile"))?;

    let result = sqlx::query(
        r#"
        UPDATE face_change_requests
        SET status = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(request_status::APPROVED)
    .bind(request_id)
    .bind(request_status::PENDING)
    .execute(pool.get_ref())
    .await
    .map_err(internal("Failed to mark request approved"))?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Request not found or already processed"
        })));
    }

    store.remove(&proposed);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Face change approved"
    })))
}

/// Reject a pending face change (admin)
#[utoipa::path(
    put,
    path = "/api/v1/face/requests/{request_id}/reject",
    params(
        ("request_id" = u64, Path, description = "Face change request ID")
    ),
    responses(
        (status = 200, description = "Face change rejected"),
        (status = 400, description = "Request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Face"
)]
pub async fn reject_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    store: web::Data<MediaStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let request_id = path.into_inner();

    let proposed = sqlx::query_scalar::<_, String>(
        r#"
        SELECT new_image_path
        FROM face_change_requests
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(request_id)
    .bind(request_status::PENDING)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(internal("Failed to fetch face change request"))?;

    let Some(proposed) = proposed else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Request not found or already processed"
        })));
    };

    sqlx::query(
        r#"
        UPDATE face_change_requests
        SET status = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(request_status::REJECTED)
    .bind(request_id)
    .bind(request_status::PENDING)
    .execute(pool.get_ref())
    .await
    .map_err(internal("Failed to mark request rejected"))?;

    store.remove(&proposed);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Face change rejected"
    })))
}

fn internal<E: std::fmt::Display>(context: &'static str) -> impl Fn(E) -> actix_web::Error {
    move |e| {
        error!(error = %e, "{}", context);
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    }
}
