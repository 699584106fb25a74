use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "jdoe")]
    pub username: String,

    #[schema(example = "jdoe@campus.edu")]
    pub email: String,

    #[schema(example = "EN-2023-0042", nullable = true)]
    pub enrollment_no: Option<String>,

    #[schema(example = "student")]
    pub user_type: String,

    #[schema(example = 3)]
    pub role_id: u8,

    pub is_approved: bool,
    pub has_face_data: bool,

    #[schema(example = "2024-08-01", value_type = String, format = "date")]
    pub joined_at: NaiveDate,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_login_at: Option<DateTime<Utc>>,
}
