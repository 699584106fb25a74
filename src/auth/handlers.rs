use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::{master_record::MasterUserRecord, role::Role},
    models::{ChangePasswordReq, LoginReqDto, RegisterReq, TokenType, UserSql},
    services::storage::MediaStore,
    utils::username_lookup,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// Registration is closed: only people on the uploaded master list may
/// create an account, matched by (enrollment_no, user_type). A master face
/// image, when present, seeds the new user's face profile.
pub async fn register(
    user: web::Json<RegisterReq>,
    pool: web::Data<MySqlPool>,
    store: web::Data<MediaStore>,
) -> impl Responder {
    let username = user.username.trim();
    let enrollment_no = user.enrollment_no.trim();
    let user_type = user.user_type.trim().to_lowercase();

    if username.is_empty() || user.password.is_empty() || enrollment_no.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Username, password and enrollment number must not be empty"
        }));
    }

    if user.password.len() < MIN_PASSWORD_LEN {
        return HttpResponse::BadRequest().json(json!({
            "error": "Password must be at least 8 characters long"
        }));
    }

    if user_type != "student" && user_type != "faculty" {
        return HttpResponse::BadRequest().json(json!({
            "error": "user_type must be 'student' or 'faculty'"
        }));
    }

    if !username_lookup::is_available(username, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "error": "Username already taken"
        }));
    }

    // Authorized-list check; email always comes from the master record.
    let master = match sqlx::query_as::<_, MasterUserRecord>(
        r#"
        SELECT id, username, enrollment_no, email, user_type, face_path, uploaded_by, created_at
        FROM master_user_records
        WHERE enrollment_no = ? AND user_type = ?
        "#,
    )
    .bind(enrollment_no)
    .bind(&user_type)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(record)) => record,
        Ok(None) => {
            return HttpResponse::Forbidden().json(json!({
                "error": "Not found in authorized list. Contact admin."
            }));
        }
        Err(e) => {
            error!(error = %e, enrollment_no, "Master record lookup failed");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }));
        }
    };

    let hashed = hash_password(&user.password);
    let role = Role::from_user_type(&user_type);

    let result = sqlx::query(
        r#"
        INSERT INTO users
            (username, email, enrollment_no, password, user_type, role_id, is_approved, joined_at)
        VALUES (?, ?, ?, ?, ?, ?, TRUE, CURDATE())
        "#,
    )
    .bind(username)
    .bind(&master.email)
    .bind(enrollment_no)
    .bind(&hashed)
    .bind(&user_type)
    .bind(role as u8)
    .execute(pool.get_ref())
    .await;

    let user_id = match result {
        Ok(done) => done.last_insert_id(),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return HttpResponse::Conflict().json(json!({
                        "error": "Username or enrollment number already registered"
                    }));
                }
            }
            error!(error = %e, username, "Failed to insert user");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }));
        }
    };

    // Seed the face profile from the master image. Non-fatal: the user can
    // still enroll a face later.
    if let Some(face_path) = master.face_path.as_deref().filter(|p| !p.is_empty()) {
        match store.copy_as_default(username, face_path) {
            Ok(rel) => {
                let seeded = sqlx::query(
                    r#"
                    INSERT INTO face_profiles (user_id, image_path)
                    VALUES (?, ?)
                    ON DUPLICATE KEY UPDATE image_path = VALUES(image_path)
                    "#,
                )
                .bind(user_id)
                .bind(&rel)
                .execute(pool.get_ref())
                .await;

                match seeded {
                    Ok(_) => {
                        if let Err(e) =
                            sqlx::query("UPDATE users SET has_face_data = TRUE WHERE id = ?")
                                .bind(user_id)
                                .execute(pool.get_ref())
                                .await
                        {
                            warn!(error = %e, user_id, "Failed to flag face data");
                        }
                    }
                    Err(e) => warn!(error = %e, user_id, "Failed to seed face profile"),
                }
            }
            Err(e) => warn!(error = %e, username, "Master face image could not be copied"),
        }
    }

    username_lookup::remember(username).await;

    info!(user_id, username, "User registered from master list");

    HttpResponse::Created().json(json!({
        "message": "Verified from master list. Your account is now active."
    }))
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, username, password, role_id, is_approved
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(&user.username)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!("Verifying password");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    // Accounts not present in the master list never get this flag.
    if !db_user.is_approved {
        info!(user_id = db_user.id, "Login refused: account not approved");
        return HttpResponse::Forbidden().json(json!({
            "error": "Your account isn't verified in the master list."
        }));
    }

    debug!("Generating access token");

    let access_token = generate_access_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    debug!("Generating refresh token");

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    debug!("Updating last_login_at");

    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
        // intentionally not failing login
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    let record = match sqlx::query_as::<_, (u64, u64, bool)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (token_id, user_id) = match record {
        Some((id, user_id, revoked)) if !revoked => (id, user_id),
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // Rotation: the presented refresh token is spent either way.
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(token_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store rotated refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(serde_json::json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // revoke refresh token (idempotent)
    let _ = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = TRUE
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await;

    // success even if the token didn't exist
    HttpResponse::NoContent().finish()
}

/// Change the caller's own password.
pub async fn change_password(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ChangePasswordReq>,
) -> actix_web::Result<impl Responder> {
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "New password must be at least 8 characters long"
        })));
    }

    let current_hash =
        sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = ?")
            .bind(auth.user_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, user_id = auth.user_id, "Failed to fetch password hash");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    if verify_password(&payload.current_password, &current_hash).is_err() {
        return Ok(HttpResponse::Unauthorized().json(json!({
            "message": "Current password is incorrect"
        })));
    }

    let new_hash = hash_password(&payload.new_password);

    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(&new_hash)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to update password");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password updated successfully"
    })))
}
