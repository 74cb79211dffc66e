use leave_core::{DomainError, LeaveRecord, Snowflake};

use crate::models::LeaveRecordModel;

use super::corrupt_column;

impl TryFrom<LeaveRecordModel> for LeaveRecord {
    type Error = DomainError;

    fn try_from(model: LeaveRecordModel) -> Result<Self, Self::Error> {
        Ok(LeaveRecord {
            id: Snowflake::new(model.id),
            employee_name: model.employee_name,
            leave_type: model
                .leave_type
                .parse()
                .map_err(|e| corrupt_column("leave_records", &e))?,
            start_date: model.start_date,
            end_date: model.end_date,
            status: model
                .status
                .parse()
                .map_err(|e| corrupt_column("leave_records", &e))?,
            applied_on: model.applied_on,
            cancelled_by: model.cancelled_by,
            cancelled_on: model.cancelled_on,
        })
    }
}
