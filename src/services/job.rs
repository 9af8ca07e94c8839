//! # Job Subsystem Contract
//!
//! A task record may be linked to a job owned by the platform's job
//! subsystem. That subsystem is external to this crate; the lifecycle manager
//! only needs two questions answered about a linked job — is it active (the
//! delete guard), and can it be cancelled (cancellation delegation). This
//! trait is that contract.

use async_trait::async_trait;

use crate::error::{Result, TaskLedgerError};

/// Outcome of a cancellation request routed through the task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The linked job accepted the cancel request
    Cancelled,
    /// No linked job exists; the task itself has no cancel operation
    NotCancelable,
}

#[async_trait]
pub trait JobGateway: Send + Sync {
    /// Whether the job is still running in the job subsystem.
    async fn is_active(&self, job_id: i64) -> Result<bool>;

    /// Request cancellation of the job.
    async fn cancel(&self, job_id: i64) -> Result<()>;

    /// Gateway name for identification in logs
    fn gateway_name(&self) -> &'static str;
}

/// Gateway for deployments without a job subsystem: no job is ever active,
/// and cancellation has nowhere to go.
pub struct NoJobs;

#[async_trait]
impl JobGateway for NoJobs {
    async fn is_active(&self, _job_id: i64) -> Result<bool> {
        Ok(false)
    }

    async fn cancel(&self, job_id: i64) -> Result<()> {
        Err(TaskLedgerError::Job(format!(
            "no job subsystem configured; cannot cancel job {job_id}"
        )))
    }

    fn gateway_name(&self) -> &'static str {
        "no-jobs"
    }
}
