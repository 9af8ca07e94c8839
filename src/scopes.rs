//! # Query Scopes
//!
//! Composable query scopes over the `task_records` collection, for dashboards
//! and filters. Predicate composition only — every scope records a condition,
//! and the finishers assemble and execute the final query with `QueryBuilder`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskledger_core::models::TaskRecord;
//! use sqlx::PgPool;
//!
//! # async fn example(pool: &PgPool) -> Result<(), sqlx::Error> {
//! let stuck = TaskRecord::scope()
//!     .active()
//!     .no_linked_job()
//!     .with_userid("alice")
//!     .all(pool)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::constants::{TaskState, TaskStatus};
use crate::models::TaskRecord;

const BASE_QUERY: &str = "SELECT task_records.* FROM task_records";
const COUNT_QUERY: &str = "SELECT COUNT(*) FROM task_records";

/// Named filter sets combinable with OR through
/// [`TaskRecordScope::with_status_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Finished,
    Running,
    Queued,
    CompletedOk,
    CompletedWarn,
    CompletedError,
}

impl StatusFilter {
    /// SQL predicate for this filter set. Tokens come from the closed enums,
    /// so interpolation is injection-safe.
    fn condition(&self) -> String {
        let finished = TaskState::Finished.as_str();
        let queued = TaskState::Queued.as_str();
        match self {
            Self::Finished => format!("state = '{finished}'"),
            Self::Running => format!("state NOT IN ('{finished}', '{queued}')"),
            Self::Queued => format!("state = '{queued}'"),
            Self::CompletedOk => completed_condition(TaskStatus::Ok),
            Self::CompletedWarn => completed_condition(TaskStatus::Warn),
            Self::CompletedError => completed_condition(TaskStatus::Error),
        }
    }
}

fn completed_condition(status: TaskStatus) -> String {
    format!(
        "(state = '{}' AND status = '{}')",
        TaskState::Finished.as_str(),
        status.as_str()
    )
}

/// One recorded predicate. Token predicates are inlined (closed sets); user
/// data and timestamps go through bind parameters.
enum Condition {
    Fragment(String),
    Userid(String),
    Owner(String),
    UpdatedBefore(NaiveDateTime),
    UpdatedBetween(NaiveDateTime, NaiveDateTime),
}

impl TaskRecord {
    /// Start building a scoped query
    pub fn scope() -> TaskRecordScope {
        TaskRecordScope {
            conditions: Vec::new(),
        }
    }
}

/// Query builder for TaskRecord scopes
pub struct TaskRecordScope {
    conditions: Vec<Condition>,
}

impl TaskRecordScope {
    fn push(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Records a worker is (or should be) operating on
    pub fn active(self) -> Self {
        self.with_state(TaskState::Active)
    }

    /// Records whose last update is older than the cutoff
    pub fn timed_out(self, cutoff: NaiveDateTime) -> Self {
        self.older_than(cutoff)
    }

    /// Records whose last update is older than the cutoff
    pub fn older_than(self, cutoff: NaiveDateTime) -> Self {
        self.push(Condition::UpdatedBefore(cutoff))
    }

    /// Records with no job subsystem link
    pub fn no_linked_job(self) -> Self {
        self.push(Condition::Fragment("job_id IS NULL".to_string()))
    }

    pub fn with_userid(self, userid: &str) -> Self {
        self.push(Condition::Userid(userid.to_string()))
    }

    pub fn with_owner(self, owner: &str) -> Self {
        self.push(Condition::Owner(owner.to_string()))
    }

    pub fn with_updated_between(self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.push(Condition::UpdatedBetween(from, to))
    }

    pub fn with_state(self, state: TaskState) -> Self {
        self.push(Condition::Fragment(format!("state = '{}'", state.as_str())))
    }

    pub fn finished(self) -> Self {
        self.with_state(TaskState::Finished)
    }

    /// Records that are neither terminal nor parked on the queue
    pub fn running(self) -> Self {
        self.push(Condition::Fragment(StatusFilter::Running.condition()))
    }

    pub fn queued(self) -> Self {
        self.with_state(TaskState::Queued)
    }

    pub fn completed_ok(self) -> Self {
        self.push(Condition::Fragment(StatusFilter::CompletedOk.condition()))
    }

    pub fn completed_warn(self) -> Self {
        self.push(Condition::Fragment(StatusFilter::CompletedWarn.condition()))
    }

    pub fn completed_error(self) -> Self {
        self.push(Condition::Fragment(StatusFilter::CompletedError.condition()))
    }

    /// Running records that have not yet surfaced a definite status
    pub fn no_status_selected(self) -> Self {
        self.push(Condition::Fragment(format!(
            "{} AND status NOT IN ('{}', '{}', '{}')",
            StatusFilter::Running.condition(),
            TaskStatus::Ok.as_str(),
            TaskStatus::Error.as_str(),
            TaskStatus::Warn.as_str()
        )))
    }

    /// OR-combine named filter sets into a single condition.
    ///
    /// An empty slice adds no condition.
    pub fn with_status_in(self, filters: &[StatusFilter]) -> Self {
        if filters.is_empty() {
            return self;
        }
        let combined = filters
            .iter()
            .map(StatusFilter::condition)
            .collect::<Vec<_>>()
            .join(" OR ");
        self.push(Condition::Fragment(format!("({combined})")))
    }

    /// Assemble the recorded conditions onto a base query.
    fn build(self, base: &str) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(base.to_string());
        for (index, condition) in self.conditions.into_iter().enumerate() {
            query.push(if index == 0 { " WHERE " } else { " AND " });
            match condition {
                Condition::Fragment(sql) => {
                    query.push(sql);
                }
                Condition::Userid(userid) => {
                    query.push("userid = ").push_bind(userid);
                }
                Condition::Owner(owner) => {
                    query.push("owner_identity = ").push_bind(owner);
                }
                Condition::UpdatedBefore(cutoff) => {
                    query.push("updated_at < ").push_bind(cutoff);
                }
                Condition::UpdatedBetween(from, to) => {
                    query
                        .push("updated_at BETWEEN ")
                        .push_bind(from)
                        .push(" AND ")
                        .push_bind(to);
                }
            }
        }
        query
    }

    /// Build the final query and execute it
    pub async fn all(self, pool: &PgPool) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let mut query = self.build(BASE_QUERY);
        query.push(" ORDER BY id");
        query.build_query_as::<TaskRecord>().fetch_all(pool).await
    }

    /// Get a single result (first match)
    pub async fn first(self, pool: &PgPool) -> Result<Option<TaskRecord>, sqlx::Error> {
        let mut query = self.build(BASE_QUERY);
        query.push(" ORDER BY id LIMIT 1");
        query
            .build_query_as::<TaskRecord>()
            .fetch_optional(pool)
            .await
    }

    /// Count the number of results
    pub async fn count(self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        let mut query = self.build(COUNT_QUERY);
        query.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Check if any results exist
    pub async fn exists(self, pool: &PgPool) -> Result<bool, sqlx::Error> {
        let mut query = self.build(BASE_QUERY);
        query.push(" LIMIT 1");
        let result = query
            .build_query_as::<TaskRecord>()
            .fetch_optional(pool)
            .await?;
        Ok(result.is_some())
    }
}
