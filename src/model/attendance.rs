use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::timeline::AttendanceDay;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: u64,
    pub user_id: u64,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: String,
}

impl Attendance {
    pub fn as_day(&self) -> AttendanceDay {
        AttendanceDay {
            date: self.date,
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }
}

/// Stored status labels. The derived per-day status is computed by the
/// timeline module; these are only what the check-in/out flow writes.
pub mod stored_status {
    pub const ABSENT: &str = "Absent";
    pub const CHECKED_IN: &str = "Checked In";
    pub const PRESENT: &str = "Present";
}
