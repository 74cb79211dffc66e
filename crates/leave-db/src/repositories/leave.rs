//! PostgreSQL implementation of LeaveRepository
//!
//! Name matching uses `strpos`/`starts_with`/`right` instead of `LIKE`, so user
//! input never needs wildcard escaping.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use leave_core::{
    LeaveFilter, LeaveQuery, LeaveRecord, LeaveRepository, LeaveSortField, LeaveStatus,
    LeaveStatusCounts, NameMatch, RepoResult, Snowflake, Visibility,
};

use crate::models::LeaveRecordModel;

use super::error::map_db_error;

const LEAVE_COLUMNS: &str = "id, employee_name, leave_type, status, start_date, end_date, \
     applied_on, cancelled_by, cancelled_on";

#[derive(Clone)]
pub struct PgLeaveRepository {
    pool: PgPool,
}

impl PgLeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends ` AND ...` clauses; the builder must already end in a `WHERE TRUE`.
fn push_visibility(qb: &mut QueryBuilder<'_, Postgres>, visibility: &Visibility) {
    if let Visibility::OwnedBy(handle) = visibility {
        qb.push(" AND employee_name = ").push_bind(handle.clone());
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LeaveFilter) {
    for name in &filter.employee_name {
        match name {
            NameMatch::Exact(v) => {
                qb.push(" AND employee_name = ").push_bind(v.clone());
            }
            NameMatch::Contains(v) => {
                qb.push(" AND strpos(employee_name, ").push_bind(v.clone()).push(") > 0");
            }
            NameMatch::IContains(v) => {
                qb.push(" AND strpos(lower(employee_name), lower(")
                    .push_bind(v.clone())
                    .push(")) > 0");
            }
            NameMatch::StartsWith(v) => {
                qb.push(" AND starts_with(employee_name, ").push_bind(v.clone()).push(")");
            }
            NameMatch::EndsWith(v) => {
                qb.push(" AND right(employee_name, char_length(")
                    .push_bind(v.clone())
                    .push(")) = ")
                    .push_bind(v.clone());
            }
        }
    }

    if let Some(search) = &filter.search {
        qb.push(" AND strpos(lower(employee_name), lower(")
            .push_bind(search.clone())
            .push(")) > 0");
    }
    if let Some(leave_type) = filter.leave_type {
        qb.push(" AND leave_type = ").push_bind(leave_type.as_str());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }

    for (column, bounds) in [("start_date", &filter.start_date), ("end_date", &filter.end_date)] {
        if let Some(date) = bounds.exact {
            qb.push(format_args!(" AND {column} = ")).push_bind(date);
        }
        if let Some(date) = bounds.gte {
            qb.push(format_args!(" AND {column} >= ")).push_bind(date);
        }
        if let Some(date) = bounds.lte {
            qb.push(format_args!(" AND {column} <= ")).push_bind(date);
        }
    }
}

fn push_ordering(qb: &mut QueryBuilder<'_, Postgres>, filter: &LeaveFilter) {
    let ordering = filter.ordering;
    // byte-wise collation so the order matches the in-memory backend
    let key = match ordering.field {
        LeaveSortField::EmployeeName => "employee_name COLLATE \"C\"",
        field => field.column(),
    };
    let direction = if ordering.descending { "DESC" } else { "ASC" };
    qb.push(format_args!(" ORDER BY {key} {direction}, id ASC"));
}

#[async_trait]
impl LeaveRepository for PgLeaveRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<LeaveRecord>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_records WHERE id = $1");
        sqlx::query_as::<_, LeaveRecordModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(LeaveRecord::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find(&self, query: &LeaveQuery) -> RepoResult<Vec<LeaveRecord>> {
        if query.visibility == Visibility::Nothing {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_records WHERE TRUE"
        ));
        push_visibility(&mut qb, &query.visibility);
        push_filter(&mut qb, &query.filter);
        push_ordering(&mut qb, &query.filter);

        qb.build_query_as::<LeaveRecordModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(LeaveRecord::try_from)
            .collect()
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self, visibility: &Visibility) -> RepoResult<LeaveStatusCounts> {
        let mut counts = LeaveStatusCounts::default();
        if *visibility == Visibility::Nothing {
            return Ok(counts);
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT status, COUNT(*) FROM leave_records WHERE TRUE",
        );
        push_visibility(&mut qb, visibility);
        qb.push(" GROUP BY status");

        let rows = qb
            .build_query_as::<(String, i64)>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        for (status, count) in rows {
            let status: LeaveStatus = status
                .parse()
                .map_err(|e| leave_core::DomainError::DatabaseError(format!("corrupt status: {e}")))?;
            counts.record(status, count.max(0) as u64);
        }
        Ok(counts)
    }

    #[instrument(skip(self, record), fields(leave_id = %record.id))]
    async fn create(&self, record: &LeaveRecord) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO leave_records (id, employee_name, leave_type, status, start_date,
                                       end_date, applied_on, cancelled_by, cancelled_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(record.id.into_inner())
        .bind(&record.employee_name)
        .bind(record.leave_type.as_str())
        .bind(record.status.as_str())
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.applied_on)
        .bind(&record.cancelled_by)
        .bind(record.cancelled_on)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, record), fields(leave_id = %record.id, status = %record.status))]
    async fn update_if_status(
        &self,
        record: &LeaveRecord,
        expected: &[LeaveStatus],
    ) -> RepoResult<bool> {
        let expected: Vec<String> = expected.iter().map(|s| s.as_str().to_string()).collect();

        let result = sqlx::query(
            r"
            UPDATE leave_records
            SET leave_type = $2, start_date = $3, end_date = $4, status = $5,
                cancelled_by = $6, cancelled_on = $7
            WHERE id = $1 AND status = ANY($8)
            ",
        )
        .bind(record.id.into_inner())
        .bind(record.leave_type.as_str())
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.status.as_str())
        .bind(&record.cancelled_by)
        .bind(record.cancelled_on)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(params: &[(&str, &str)], visibility: &Visibility) -> String {
        let filter = LeaveFilter::from_params(params.iter().copied()).unwrap();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM leave_records WHERE TRUE");
        push_visibility(&mut qb, visibility);
        push_filter(&mut qb, &filter);
        push_ordering(&mut qb, &filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_default_query_orders_by_start_date_desc() {
        let sql = sql_for(&[], &Visibility::All);
        assert_eq!(
            sql,
            "SELECT 1 FROM leave_records WHERE TRUE ORDER BY start_date DESC, id ASC"
        );
    }

    #[test]
    fn test_owner_scope_and_filters_are_bound() {
        let sql = sql_for(
            &[
                ("employee_name__icontains", "ak"),
                ("status", "PENDING"),
                ("start_date__gte", "2024-01-01"),
                ("ordering", "employee_name"),
            ],
            &Visibility::OwnedBy("Akshay".to_string()),
        );
        assert_eq!(
            sql,
            "SELECT 1 FROM leave_records WHERE TRUE AND employee_name = $1 \
             AND strpos(lower(employee_name), lower($2)) > 0 AND status = $3 \
             AND start_date >= $4 ORDER BY employee_name COLLATE \"C\" ASC, id ASC"
        );
    }

    #[test]
    fn test_suffix_match_binds_twice() {
        let sql = sql_for(&[("employee_name__endswith", "vi")], &Visibility::All);
        assert!(sql.contains("right(employee_name, char_length($1)) = $2"));
    }

    #[test]
    fn test_repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgLeaveRepository>();
    }
}
