use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pre-authorized (enrollment, email) pair. Self-registration is validated
/// against these rows; the stored face path seeds the user's face profile.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct MasterUserRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "jdoe")]
    pub username: String,

    #[schema(example = "EN-2023-0042")]
    pub enrollment_no: String,

    #[schema(example = "jdoe@campus.edu")]
    pub email: String,

    #[schema(example = "student")]
    pub user_type: String,

    #[schema(example = "faces/jdoe/jdoe_default.jpg", nullable = true)]
    pub face_path: Option<String>,

    pub uploaded_by: Option<u64>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
