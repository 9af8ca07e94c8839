//! # TaskRecord Model
//!
//! The persisted record tracking one asynchronous unit of work's lifecycle.
//!
//! ## Overview
//!
//! A `TaskRecord` owns the coarse lifecycle state (Initialized → Queued →
//! Active → Finished), the outcome status that becomes authoritative once the
//! record is Finished, the latest progress message, an opaque context payload
//! for cross-step handoff, and the identity of the worker operating on the
//! task. Result payloads live out-of-line (see [`crate::models::binary_blob`])
//! with two legacy read tiers kept for records written by older platform
//! components.
//!
//! ## Database Schema
//!
//! Maps to the `task_records` table:
//! - `id`: primary key (BIGSERIAL)
//! - `state` / `status`: closed token sets (VARCHAR)
//! - `context_data`: JSONB caller payload
//! - `results`: legacy inline result encoding (TEXT)
//! - `job_id`: link to the external job subsystem
//! - `started_at`: stamped once, on first entry into Active
//! - `updated_at`: drives staleness detection for the timeout sweep
//!
//! ## Concurrency
//!
//! At most one worker is assumed to mutate a record at a time — the queue
//! subsystem serializes ownership. There is no optimistic locking; concurrent
//! writers race last-write-wins. `wait_for_task` reads the authoritative row
//! on every poll, never a cache.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::constants::{
    human_status, state_groups, TaskState, TaskStatus, DEFAULT_MESSAGE, DEFAULT_USERID,
    MESSAGE_TASK_COMPLETED_SUCCESSFULLY, MESSAGE_TASK_COMPLETED_UNSUCCESSFULLY,
};
use crate::error::Result;
use crate::models::binary_blob::{BinaryBlob, ResultFormat, TASK_RESULTS_BLOB_NAME};
use crate::models::report_result::ReportResult;
use crate::services::dispatch::{QueueGateway, QueueSubmission};
use crate::services::job::{CancelOutcome, JobGateway};

const COLUMNS: &str = "id, name, userid, state, status, message, pct_complete, context_data, \
                       results, job_id, owner_identity, started_at, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TaskRecord {
    pub id: i64,
    pub name: String,
    pub userid: String,
    pub state: String,
    pub status: String,
    pub message: String,
    pub pct_complete: Option<f64>,
    pub context_data: Option<Value>,
    /// Legacy inline result encoding; newer records store results out-of-line
    pub results: Option<String>,
    pub job_id: Option<i64>,
    pub owner_identity: Option<String>,
    pub started_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// New TaskRecord for creation. Unspecified fields take the standard
/// defaults: state Initialized, status Ok, message "Initialized", userid
/// "system".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTaskRecord {
    pub name: String,
    pub userid: Option<String>,
    pub state: Option<TaskState>,
    pub status: Option<TaskStatus>,
    pub message: Option<String>,
    pub context_data: Option<Value>,
    pub job_id: Option<i64>,
}

/// Why a delete request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRefusal {
    /// The record is in a non-terminal, non-queued state
    ActiveTask,
    /// The linked job is still running
    ActiveJob,
}

/// Outcome of a guarded delete. Refusal is a signal, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Refused(DeleteRefusal),
}

/// Options for the blocking wait loop. A zero timeout means unbounded.
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub sleep: Duration,
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            sleep: Duration::from_secs(1),
            timeout: Duration::ZERO,
        }
    }
}

/// Serializable predicate set for the bulk purge. Stands in for a free-form
/// SQL condition so purge submissions stay data-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurgeFilter {
    pub userid: Option<String>,
    pub state: Option<TaskState>,
    pub status: Option<TaskStatus>,
    pub name_prefix: Option<String>,
}

impl PurgeFilter {
    fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(userid) = &self.userid {
            builder.push(" AND userid = ").push_bind(userid.clone());
        }
        if let Some(state) = self.state {
            builder.push(" AND state = ").push_bind(state.as_str());
        }
        if let Some(status) = self.status {
            builder
                .push(" AND status = ")
                .push_bind(status.normalized().as_str());
        }
        if let Some(prefix) = &self.name_prefix {
            builder.push(" AND name LIKE ").push_bind(format!("{prefix}%"));
        }
    }
}

impl TaskRecord {
    /// Create a new task record with defaults applied.
    pub async fn create(pool: &PgPool, new_record: NewTaskRecord) -> Result<TaskRecord> {
        let state = new_record.state.unwrap_or(TaskState::Initialized);
        let status = new_record.status.unwrap_or(TaskStatus::Ok).normalized();
        let message = new_record
            .message
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
        let userid = new_record
            .userid
            .unwrap_or_else(|| DEFAULT_USERID.to_string());

        let record = sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            INSERT INTO task_records (name, userid, state, status, message, context_data, job_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&new_record.name)
        .bind(&userid)
        .bind(state.as_str())
        .bind(status.as_str())
        .bind(&message)
        .bind(&new_record.context_data)
        .bind(new_record.job_id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Find a task record by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<TaskRecord>> {
        let record = sqlx::query_as::<_, TaskRecord>(&format!(
            "SELECT {COLUMNS} FROM task_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Reload this record from the authoritative store.
    pub async fn reload(&mut self, pool: &PgPool) -> Result<()> {
        if let Some(fresh) = Self::find_by_id(pool, self.id).await? {
            *self = fresh;
        }
        Ok(())
    }

    // ========================================================================
    // STATUS UPDATE OPERATIONS
    // ========================================================================

    /// Transition state, status, and message in one write.
    ///
    /// `Expired` normalizes to `Error` before persisting. Entering Active
    /// stamps `started_at` exactly once and lazily assigns `owner_identity`
    /// from the injected parameter; neither is ever overwritten.
    pub async fn update_status(
        &mut self,
        pool: &PgPool,
        state: TaskState,
        status: TaskStatus,
        message: impl Into<String>,
        owner: Option<&str>,
    ) -> Result<()> {
        let status = status.normalized();
        let message = message.into();
        info!(
            task_id = self.id,
            state = %state,
            status = %status,
            message = %message,
            "task status update"
        );

        let entering_active = state == TaskState::Active;
        let updated = sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            UPDATE task_records
            SET state = $2,
                status = $3,
                message = $4,
                started_at = CASE WHEN $5 THEN COALESCE(started_at, NOW()) ELSE started_at END,
                owner_identity = COALESCE(owner_identity, $6),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(state.as_str())
        .bind(status.as_str())
        .bind(&message)
        .bind(entering_active)
        .bind(owner)
        .fetch_one(pool)
        .await?;

        *self = updated;
        Ok(())
    }

    /// Id-keyed `update_status`; not-found is a no-op returning `None`.
    pub async fn update_status_by_id(
        pool: &PgPool,
        id: i64,
        state: TaskState,
        status: TaskStatus,
        message: &str,
        owner: Option<&str>,
    ) -> Result<Option<TaskRecord>> {
        match Self::find_by_id(pool, id).await? {
            Some(mut task) => {
                task.update_status(pool, state, status, message, owner).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Update the progress/result message only.
    pub async fn update_message(&mut self, pool: &PgPool, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        info!(task_id = self.id, message = %message, "task message update");

        let updated = sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            UPDATE task_records
            SET message = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(&message)
        .fetch_one(pool)
        .await?;

        *self = updated;
        Ok(())
    }

    /// Id-keyed `update_message`; not-found is a no-op returning `None`.
    pub async fn update_message_by_id(
        pool: &PgPool,
        id: i64,
        message: &str,
    ) -> Result<Option<TaskRecord>> {
        match Self::find_by_id(pool, id).await? {
            Some(mut task) => {
                task.update_message(pool, message).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Replace the opaque context payload wholesale.
    pub async fn update_context(&mut self, pool: &PgPool, context: Value) -> Result<()> {
        let updated = sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            UPDATE task_records
            SET context_data = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(context)
        .fetch_one(pool)
        .await?;

        *self = updated;
        Ok(())
    }

    // ========================================================================
    // BEST-EFFORT PROGRESS REPORTERS
    //
    // Invoked from inside a larger job's execution; a storage failure here
    // must not abort that job, so failures are logged and swallowed.
    // ========================================================================

    /// Report incremental progress: message, percentage, and status forced Ok.
    pub async fn info(&mut self, pool: &PgPool, message: impl Into<String>, pct_complete: f64) {
        let message = message.into();
        if let Err(e) = self
            .set_message_and_status(pool, &message, Some(pct_complete), TaskStatus::Ok)
            .await
        {
            warn!(task_id = self.id, error = %e, "progress update failed; continuing");
        }
    }

    /// Report a warning: message plus status Warn.
    pub async fn warn(&mut self, pool: &PgPool, message: impl Into<String>) {
        let message = message.into();
        if let Err(e) = self
            .set_message_and_status(pool, &message, None, TaskStatus::Warn)
            .await
        {
            warn!(task_id = self.id, error = %e, "warning update failed; continuing");
        }
    }

    /// Report an error: message plus status Error.
    pub async fn error(&mut self, pool: &PgPool, message: impl Into<String>) {
        let message = message.into();
        if let Err(e) = self
            .set_message_and_status(pool, &message, None, TaskStatus::Error)
            .await
        {
            warn!(task_id = self.id, error = %e, "error update failed; continuing");
        }
    }

    /// Id-keyed `info`; not-found is a no-op.
    pub async fn info_by_id(pool: &PgPool, id: i64, message: &str, pct_complete: f64) -> Result<()> {
        if let Some(mut task) = Self::find_by_id(pool, id).await? {
            task.info(pool, message, pct_complete).await;
        }
        Ok(())
    }

    /// Id-keyed `warn`; not-found is a no-op.
    pub async fn warn_by_id(pool: &PgPool, id: i64, message: &str) -> Result<()> {
        if let Some(mut task) = Self::find_by_id(pool, id).await? {
            task.warn(pool, message).await;
        }
        Ok(())
    }

    /// Id-keyed `error`; not-found is a no-op.
    pub async fn error_by_id(pool: &PgPool, id: i64, message: &str) -> Result<()> {
        if let Some(mut task) = Self::find_by_id(pool, id).await? {
            task.error(pool, message).await;
        }
        Ok(())
    }

    async fn set_message_and_status(
        &mut self,
        pool: &PgPool,
        message: &str,
        pct_complete: Option<f64>,
        status: TaskStatus,
    ) -> Result<()> {
        let updated = sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            UPDATE task_records
            SET message = $2,
                pct_complete = COALESCE($3, pct_complete),
                status = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(message)
        .bind(pct_complete)
        .bind(status.normalized().as_str())
        .fetch_one(pool)
        .await?;

        *self = updated;
        Ok(())
    }

    // ========================================================================
    // STATE MARKS
    // ========================================================================

    pub async fn state_initialized(&mut self, pool: &PgPool) -> Result<()> {
        self.set_state_only(pool, TaskState::Initialized).await
    }

    pub async fn state_queued(&mut self, pool: &PgPool) -> Result<()> {
        self.set_state_only(pool, TaskState::Queued).await
    }

    /// Enter Active: stamps `started_at` on first entry and lazily assigns the
    /// owning worker identity, exactly like `update_status`.
    pub async fn state_active(&mut self, pool: &PgPool, owner: Option<&str>) -> Result<()> {
        let updated = sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            UPDATE task_records
            SET state = $2,
                started_at = COALESCE(started_at, NOW()),
                owner_identity = COALESCE(owner_identity, $3),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(TaskState::Active.as_str())
        .bind(owner)
        .fetch_one(pool)
        .await?;

        *self = updated;
        Ok(())
    }

    pub async fn state_finished(&mut self, pool: &PgPool) -> Result<()> {
        self.set_state_only(pool, TaskState::Finished).await
    }

    pub async fn state_initialized_by_id(pool: &PgPool, id: i64) -> Result<Option<TaskRecord>> {
        match Self::find_by_id(pool, id).await? {
            Some(mut task) => {
                task.state_initialized(pool).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    pub async fn state_queued_by_id(pool: &PgPool, id: i64) -> Result<Option<TaskRecord>> {
        match Self::find_by_id(pool, id).await? {
            Some(mut task) => {
                task.state_queued(pool).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    pub async fn state_active_by_id(
        pool: &PgPool,
        id: i64,
        owner: Option<&str>,
    ) -> Result<Option<TaskRecord>> {
        match Self::find_by_id(pool, id).await? {
            Some(mut task) => {
                task.state_active(pool, owner).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    pub async fn state_finished_by_id(pool: &PgPool, id: i64) -> Result<Option<TaskRecord>> {
        match Self::find_by_id(pool, id).await? {
            Some(mut task) => {
                task.state_finished(pool).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    async fn set_state_only(&mut self, pool: &PgPool, state: TaskState) -> Result<()> {
        let updated = sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            UPDATE task_records
            SET state = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(state.as_str())
        .fetch_one(pool)
        .await?;

        *self = updated;
        Ok(())
    }

    // ========================================================================
    // READ-SIDE VIEWS
    // ========================================================================

    /// `status` token iff the record is Finished, else the `state` token.
    pub fn state_or_status(&self) -> &str {
        if self.state == TaskState::Finished.as_str() {
            &self.status
        } else {
            &self.state
        }
    }

    /// Display string for dashboards; unmapped tokens yield "Unknown".
    pub fn human_status(&self) -> &'static str {
        human_status(self.state_or_status())
    }

    /// True unless the record is parked on the queue or already terminal.
    pub fn is_active(&self) -> bool {
        !state_groups::INACTIVE_STATES
            .iter()
            .any(|state| self.state == state.as_str())
    }

    // ========================================================================
    // RESULT PAYLOADS
    //
    // Three storage tiers, resolved by presence: the legacy inline column,
    // a linked report result, then the binary blob store. Writes always use
    // the newest tier.
    // ========================================================================

    /// Resolve the task's result payload, if any.
    pub async fn task_results(&self, pool: &PgPool) -> Result<Option<Value>> {
        // Legacy records saved results inline in the results column
        if let Some(raw) = &self.results {
            return Ok(Some(serde_json::from_str(raw)?));
        }

        if let Some(report) = ReportResult::find_for_task(pool, self.id).await? {
            return Ok(report.report_data);
        }

        if let Some(blob) = BinaryBlob::find_for_task(pool, self.id, TASK_RESULTS_BLOB_NAME).await? {
            return Ok(Some(blob.decode_value()?));
        }

        Ok(None)
    }

    /// Store a result payload via the newest encoding (YAML-tagged blob).
    pub async fn set_task_results(&self, pool: &PgPool, value: &Value) -> Result<()> {
        BinaryBlob::upsert(pool, self.id, TASK_RESULTS_BLOB_NAME, ResultFormat::Yaml, value)
            .await?;
        Ok(())
    }

    /// True iff status is Ok and a non-blank result is retrievable.
    pub async fn results_ready(&self, pool: &PgPool) -> Result<bool> {
        if self.status != TaskStatus::Ok.as_str() {
            return Ok(false);
        }
        Ok(self
            .task_results(pool)
            .await?
            .is_some_and(|value| !value_is_blank(&value)))
    }

    // ========================================================================
    // QUEUE COMPLETION CALLBACKS
    // ========================================================================

    /// Completion callback posted by queue workers.
    ///
    /// An Ok status (case-insensitive) forces the standard success message;
    /// otherwise a blank message is replaced with the standard failure
    /// message. The result payload, when present, is stored before the status
    /// write.
    pub async fn queue_callback(
        &mut self,
        pool: &PgPool,
        state: TaskState,
        status_token: &str,
        message: &str,
        result: Option<&Value>,
    ) -> Result<()> {
        let message = completion_message(status_token, message);

        if let Some(value) = result {
            self.set_task_results(pool, value).await?;
        }

        let status = TaskStatus::parse_token(status_token);
        self.update_status(pool, state, status, message, None).await
    }

    /// Exception-path completion callback: only acts when the reported status
    /// is not Ok, and always classifies the outcome as Error.
    pub async fn queue_callback_on_exceptions(
        &mut self,
        pool: &PgPool,
        state: TaskState,
        status_token: &str,
        message: &str,
        result: Option<&Value>,
    ) -> Result<()> {
        if TaskStatus::Ok.matches(status_token) {
            return Ok(());
        }

        if let Some(value) = result {
            self.set_task_results(pool, value).await?;
        }

        self.update_status(pool, state, TaskStatus::Error, message, None)
            .await
    }

    // ========================================================================
    // CANCELLATION AND DELETION
    // ========================================================================

    /// Delegate cancellation to the linked job, when one exists. The task
    /// itself has no cancel operation.
    pub async fn process_cancel(&self, jobs: &dyn JobGateway) -> Result<CancelOutcome> {
        match self.job_id {
            Some(job_id) => {
                jobs.cancel(job_id).await?;
                info!(task_id = self.id, job_id = job_id, "task cancellation delegated to job");
                Ok(CancelOutcome::Cancelled)
            }
            None => {
                info!(task_id = self.id, "task has no linked job; cannot cancel");
                Ok(CancelOutcome::NotCancelable)
            }
        }
    }

    /// Guarded delete: refused while the record is active or its linked job
    /// is still running. Result rows cascade with the record.
    pub async fn destroy(&self, pool: &PgPool, jobs: &dyn JobGateway) -> Result<DeleteOutcome> {
        if self.is_active() {
            warn!(task_id = self.id, "task is active, delete not allowed");
            return Ok(DeleteOutcome::Refused(DeleteRefusal::ActiveTask));
        }

        if let Some(job_id) = self.job_id {
            if jobs.is_active(job_id).await? {
                warn!(
                    task_id = self.id,
                    job_id = job_id,
                    "delete not allowed: task has active job"
                );
                return Ok(DeleteOutcome::Refused(DeleteRefusal::ActiveJob));
            }
        }

        sqlx::query("DELETE FROM task_records WHERE id = $1")
            .bind(self.id)
            .execute(pool)
            .await?;

        info!(task_id = self.id, "task deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Queue a bulk purge of records older than `cutoff` matching `filter`,
    /// to run as a detached background job.
    pub async fn delete_older(
        queue: &dyn QueueGateway,
        cutoff: NaiveDateTime,
        filter: &PurgeFilter,
    ) -> Result<()> {
        info!(cutoff = %cutoff, "queuing deletion of tasks older than cutoff");

        let submission = QueueSubmission::new("TaskRecord", "destroy_older_by_condition")
            .with_args(vec![
                serde_json::to_value(cutoff)?,
                serde_json::to_value(filter)?,
            ]);
        queue.enqueue(submission).await
    }

    /// Queue deletion of specific records by id.
    pub async fn delete_by_ids(queue: &dyn QueueGateway, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        info!(ids = ?ids, "queuing deletion of tasks by id");

        let submission = QueueSubmission::new("TaskRecord", "destroy_by_ids")
            .with_args(vec![serde_json::to_value(ids)?]);
        queue.enqueue(submission).await
    }

    /// Execute a bulk purge. Guard checks apply per record, so active records
    /// (and records with active jobs) survive the pass; re-running over
    /// already-deleted records is a no-op. Returns the number deleted.
    pub async fn destroy_older_by_condition(
        pool: &PgPool,
        jobs: &dyn JobGateway,
        cutoff: NaiveDateTime,
        filter: &PurgeFilter,
    ) -> Result<u64> {
        info!(cutoff = %cutoff, "destroying tasks older than cutoff");

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM task_records WHERE updated_at < "
        ));
        builder.push_bind(cutoff);
        filter.apply(&mut builder);

        let candidates = builder.build_query_as::<TaskRecord>().fetch_all(pool).await?;

        let mut deleted = 0u64;
        for task in candidates {
            if matches!(task.destroy(pool, jobs).await?, DeleteOutcome::Deleted) {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Execute deletion of specific records by id, with guard checks.
    pub async fn destroy_by_ids(pool: &PgPool, jobs: &dyn JobGateway, ids: &[i64]) -> Result<u64> {
        let mut deleted = 0u64;
        for &id in ids {
            if let Some(task) = Self::find_by_id(pool, id).await? {
                if matches!(task.destroy(pool, jobs).await?, DeleteOutcome::Deleted) {
                    deleted += 1;
                }
            }
        }
        Ok(deleted)
    }

    // ========================================================================
    // MAINTENANCE SWEEP
    // ========================================================================

    /// Force-finish Active records whose last update is older than `timeout`
    /// and which have no linked job. Intended to run periodically; re-running
    /// over already-finished records is a no-op. Returns the number swept.
    pub async fn update_status_for_timed_out_active_tasks(
        pool: &PgPool,
        timeout: Duration,
    ) -> Result<u64> {
        let cutoff = Utc::now().naive_utc() - chrono::Duration::seconds(timeout.as_secs() as i64);

        let stale = Self::scope()
            .active()
            .timed_out(cutoff)
            .no_linked_job()
            .all(pool)
            .await?;

        let mut swept = 0u64;
        for mut task in stale {
            let message = format!(
                "Task [{}] timed out - not active for more than {} seconds",
                task.id,
                timeout.as_secs()
            );
            task.update_status(pool, TaskState::Finished, TaskStatus::Error, message, None)
                .await?;
            swept += 1;
        }

        if swept > 0 {
            info!(swept = swept, "timed out stale active tasks");
        }
        Ok(swept)
    }

    // ========================================================================
    // BLOCKING WAIT
    // ========================================================================

    /// Poll the record until it reaches Finished or the timeout elapses.
    ///
    /// Every poll issues a fresh query against the authoritative store — there
    /// is no cached read path that could hide external updates. On timeout the
    /// record is force-finished with status Timeout and returned. A zero
    /// timeout waits indefinitely; an unknown id returns `None`.
    pub async fn wait_for_task(
        pool: &PgPool,
        id: i64,
        options: WaitOptions,
    ) -> Result<Option<TaskRecord>> {
        let Some(mut task) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let deadline = (!options.timeout.is_zero()).then(|| Instant::now() + options.timeout);

        while task.state != TaskState::Finished.as_str() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                Self::update_status_by_id(
                    pool,
                    id,
                    TaskState::Finished,
                    TaskStatus::Timeout,
                    "Timed out stalled task.",
                    None,
                )
                .await?;
                task.reload(pool).await?;
                break;
            }

            tokio::time::sleep(options.sleep).await;
            task.reload(pool).await?;
        }

        Ok(Some(task))
    }
}

/// Select the message recorded by a completion callback.
fn completion_message(status_token: &str, message: &str) -> String {
    if TaskStatus::Ok.matches(status_token) {
        MESSAGE_TASK_COMPLETED_SUCCESSFULLY.to_string()
    } else if message.trim().is_empty() {
        MESSAGE_TASK_COMPLETED_UNSUCCESSFULLY.to_string()
    } else {
        message.to_string()
    }
}

fn value_is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}
