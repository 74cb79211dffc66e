use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use leave_core::{
    LeaveQuery, LeaveRecord, LeaveRepository, LeaveStatus, LeaveStatusCounts, RepoResult,
    Snowflake, Visibility,
};

#[derive(Default)]
pub struct MemoryLeaveRepository {
    records: RwLock<BTreeMap<Snowflake, LeaveRecord>>,
}

impl MemoryLeaveRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaveRepository for MemoryLeaveRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<LeaveRecord>> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn find(&self, query: &LeaveQuery) -> RepoResult<Vec<LeaveRecord>> {
        Ok(query.apply(self.records.read().values()))
    }

    async fn count_by_status(&self, visibility: &Visibility) -> RepoResult<LeaveStatusCounts> {
        let mut counts = LeaveStatusCounts::default();
        for record in self.records.read().values().filter(|r| visibility.admits(r)) {
            counts.record(record.status, 1);
        }
        Ok(counts)
    }

    async fn create(&self, record: &LeaveRecord) -> RepoResult<()> {
        self.records.write().insert(record.id, record.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        record: &LeaveRecord,
        expected: &[LeaveStatus],
    ) -> RepoResult<bool> {
        let mut records = self.records.write();
        match records.get_mut(&record.id) {
            Some(stored) if expected.contains(&stored.status) => {
                // applied_on and employee_name are immutable
                stored.leave_type = record.leave_type;
                stored.start_date = record.start_date;
                stored.end_date = record.end_date;
                stored.status = record.status;
                stored.cancelled_by.clone_from(&record.cancelled_by);
                stored.cancelled_on = record.cancelled_on;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
