//! # Action Dispatch
//!
//! Submission of units of work to the platform's queue subsystem, with a
//! callback descriptor that routes completion back onto the task lifecycle
//! manager.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ ActionDispatcher│    │ Queue Subsystem │    │ Worker          │
//! │ (creates task,  │───▶│ (QueueGateway   │───▶│ (runs action,   │
//! │  attaches       │    │  impl)          │    │  posts callback │
//! │  callback)      │    │                 │    │  to TaskRecord) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! The queue subsystem itself lives elsewhere; this crate only defines the
//! submission shape and the gateway trait. Workers deliver completion by
//! invoking `TaskRecord::queue_callback` (or its exception-guarded variant)
//! with the descriptor carried in the submission.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::constants::{TaskState, TaskStatus};
use crate::error::Result;
use crate::models::task_record::{NewTaskRecord, TaskRecord};

/// Where and how to deliver task completion: the component to call back into,
/// the record it concerns, the method to invoke, and leading arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackDescriptor {
    pub component: String,
    pub instance_id: i64,
    pub method: String,
    pub args: Vec<Value>,
}

/// A unit-of-work submission for the queue subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSubmission {
    /// Correlation id for queue-side tracing
    pub submission_uuid: Uuid,
    /// Component that owns the method to run
    pub class_name: String,
    /// Method to run on the worker
    pub method_name: String,
    /// Positional arguments, JSON-encoded
    pub args: Vec<Value>,
    /// Queue name override (if different from default)
    pub queue_name: Option<String>,
    /// How long the queue may wait before pulling the plug on the action
    pub msg_timeout_seconds: Option<u64>,
    /// Completion callback, delivered by the worker when the action finishes
    pub callback: Option<CallbackDescriptor>,
    /// Timestamp when the submission was built
    pub requested_at: DateTime<Utc>,
}

impl QueueSubmission {
    pub fn new<S: Into<String>>(class_name: S, method_name: S) -> Self {
        Self {
            submission_uuid: Uuid::new_v4(),
            class_name: class_name.into(),
            method_name: method_name.into(),
            args: Vec::new(),
            queue_name: None,
            msg_timeout_seconds: None,
            callback: None,
            requested_at: Utc::now(),
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_queue<S: Into<String>>(mut self, queue_name: S) -> Self {
        self.queue_name = Some(queue_name.into());
        self
    }

    pub fn with_msg_timeout(mut self, seconds: u64) -> Self {
        self.msg_timeout_seconds = Some(seconds);
        self
    }

    pub fn with_callback(mut self, callback: CallbackDescriptor) -> Self {
        self.callback = Some(callback);
        self
    }
}

/// Trait for implementing queue subsystem gateways
///
/// Implementations bridge to whatever dispatch mechanism the deployment uses;
/// test suites substitute a recording mock.
#[async_trait]
pub trait QueueGateway: Send + Sync {
    /// Accept a submission for asynchronous execution
    async fn enqueue(&self, submission: QueueSubmission) -> Result<()>;

    /// Gateway name for identification in logs
    fn gateway_name(&self) -> &'static str;
}

/// A request to run a named action asynchronously on behalf of a user.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    /// Human-friendly name of the action to run
    pub action: String,
    /// The user the action is being run for
    pub userid: String,
    /// Component that implements the action
    pub class_name: String,
    /// Method to invoke on the worker
    pub method_name: String,
    /// Positional arguments; when the first is an object, the created task id
    /// is injected into it under `"task_id"`
    pub args: Vec<Value>,
    pub queue_name: Option<String>,
    pub msg_timeout_seconds: Option<u64>,
}

impl ActionRequest {
    pub fn new<S: Into<String>>(action: S, userid: S, class_name: S, method_name: S) -> Self {
        Self {
            action: action.into(),
            userid: userid.into(),
            class_name: class_name.into(),
            method_name: method_name.into(),
            args: Vec::new(),
            queue_name: None,
            msg_timeout_seconds: None,
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_queue<S: Into<String>>(mut self, queue_name: S) -> Self {
        self.queue_name = Some(queue_name.into());
        self
    }

    pub fn with_msg_timeout(mut self, seconds: u64) -> Self {
        self.msg_timeout_seconds = Some(seconds);
        self
    }
}

/// Creates tracking records for queued actions and hands the work to the
/// queue subsystem.
pub struct ActionDispatcher {
    pool: PgPool,
}

impl ActionDispatcher {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit an action with a completion callback.
    ///
    /// Creates a task record in state Queued, attaches a callback descriptor
    /// that routes completion back through `TaskRecord::queue_callback` with a
    /// leading "Finished" argument, injects the task id into the action's
    /// option map, and enqueues. Returns the task id for the caller's UI.
    pub async fn submit_action_with_callback(
        &self,
        queue: &dyn QueueGateway,
        request: ActionRequest,
    ) -> Result<i64> {
        let message = format!(
            "Queued the action: [{}] being run for user: [{}]",
            request.action, request.userid
        );

        let task = TaskRecord::create(
            &self.pool,
            NewTaskRecord {
                name: request.action.clone(),
                userid: Some(request.userid.clone()),
                state: Some(TaskState::Queued),
                status: Some(TaskStatus::Ok),
                message: Some(message.clone()),
                ..Default::default()
            },
        )
        .await?;

        let callback = CallbackDescriptor {
            component: "TaskRecord".to_string(),
            instance_id: task.id,
            method: "queue_callback".to_string(),
            args: vec![Value::String(TaskState::Finished.to_string())],
        };

        let mut args = request.args;
        if let Some(Value::Object(method_opts)) = args.first_mut() {
            method_opts.insert("task_id".to_string(), Value::from(task.id));
        }

        let mut submission = QueueSubmission::new(request.class_name, request.method_name)
            .with_args(args)
            .with_callback(callback);
        submission.queue_name = request.queue_name;
        submission.msg_timeout_seconds = request.msg_timeout_seconds;

        queue.enqueue(submission).await?;

        info!(task_id = task.id, gateway = queue.gateway_name(), "{message}");
        Ok(task.id)
    }
}
