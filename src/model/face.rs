use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current approved face image for a user. At most one row per user.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct FaceProfile {
    pub id: u64,
    pub user_id: u64,
    pub image_path: String,
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Proposed replacement face image. Pending until resolved; resolution is
/// terminal.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct FaceChangeRequest {
    pub id: u64,
    pub user_id: u64,
    pub new_image_path: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

pub mod request_status {
    pub const PENDING: &str = "Pending";
    pub const APPROVED: &str = "Approved";
    pub const REJECTED: &str = "Rejected";
}
