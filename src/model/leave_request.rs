use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveRequest {
    pub id: u64,
    pub user_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub reason: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

pub mod leave_status {
    pub const PENDING: &str = "Pending";
    pub const APPROVED: &str = "Approved";
    pub const REJECTED: &str = "Rejected";
}
