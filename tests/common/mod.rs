//! Shared factories and mock gateways for the integration suite.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Mutex;

use taskledger_core::error::Result;
use taskledger_core::models::{NewTaskRecord, TaskRecord};
use taskledger_core::services::{JobGateway, QueueGateway, QueueSubmission};

/// Queue gateway that records submissions instead of dispatching them.
pub struct RecordingQueue {
    pub submissions: Mutex<Vec<QueueSubmission>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl QueueGateway for RecordingQueue {
    async fn enqueue(&self, submission: QueueSubmission) -> Result<()> {
        self.submissions.lock().expect("queue mutex").push(submission);
        Ok(())
    }

    fn gateway_name(&self) -> &'static str {
        "recording-queue"
    }
}

/// Job gateway with a fixed activity answer; records cancel requests.
pub struct StaticJobs {
    active: bool,
    pub cancelled: Mutex<Vec<i64>>,
}

impl StaticJobs {
    pub fn active() -> Self {
        Self {
            active: true,
            cancelled: Mutex::new(Vec::new()),
        }
    }

    pub fn idle() -> Self {
        Self {
            active: false,
            cancelled: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl JobGateway for StaticJobs {
    async fn is_active(&self, _job_id: i64) -> Result<bool> {
        Ok(self.active)
    }

    async fn cancel(&self, job_id: i64) -> Result<()> {
        self.cancelled.lock().expect("jobs mutex").push(job_id);
        Ok(())
    }

    fn gateway_name(&self) -> &'static str {
        "static-jobs"
    }
}

/// Create a task record with defaults.
pub async fn create_task(pool: &PgPool, name: &str) -> Result<TaskRecord> {
    TaskRecord::create(
        pool,
        NewTaskRecord {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Push a record's `updated_at` into the past.
pub async fn backdate(pool: &PgPool, id: i64, seconds: f64) -> Result<()> {
    sqlx::query(
        "UPDATE task_records SET updated_at = NOW() - make_interval(secs => $2) WHERE id = $1",
    )
    .bind(id)
    .bind(seconds)
    .execute(pool)
    .await?;
    Ok(())
}

/// Attach a job subsystem link to a record.
pub async fn link_job(pool: &PgPool, id: i64, job_id: i64) -> Result<()> {
    sqlx::query("UPDATE task_records SET job_id = $2 WHERE id = $1")
        .bind(id)
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}
