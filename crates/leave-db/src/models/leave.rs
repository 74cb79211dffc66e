use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct LeaveRecordModel {
    pub id: i64,
    pub employee_name: String,
    pub leave_type: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub applied_on: DateTime<Utc>,
    pub cancelled_by: Option<String>,
    pub cancelled_on: Option<DateTime<Utc>>,
}
