#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # TaskLedger Core
//!
//! Persistence-backed task lifecycle tracking core for an asynchronous
//! orchestration platform.
//!
//! ## Overview
//!
//! TaskLedger Core owns the record that tracks one asynchronous unit of work
//! from creation to completion: its lifecycle state, outcome status, progress
//! messages, opaque result payloads, and the identity of the worker operating
//! on it. The job subsystem that executes work and the queue subsystem that
//! dispatches it live elsewhere — this crate reaches them only through the
//! trait contracts in [`services`].
//!
//! ## Module Organization
//!
//! - [`models`] - The `TaskRecord` lifecycle model and its result stores
//! - [`scopes`] - Composable query scopes for dashboards and filters
//! - [`services`] - Queue and job subsystem contracts, action dispatch
//! - [`database`] - Connection pooling and schema migrations
//! - [`config`] - Configuration loading and task tunables
//! - [`constants`] - Lifecycle state and status tokens
//! - [`error`] - Structured error handling
//!
//! ## Concurrency Model
//!
//! At most one worker is assumed to mutate a given record at a time; this is
//! serialized by the platform's queue subsystem, not by this crate. Concurrent
//! writers race last-write-wins at the storage layer — there is deliberately
//! no optimistic locking here. The only blocking operation is
//! [`models::TaskRecord::wait_for_task`], a poll loop whose every read goes to
//! the authoritative store.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taskledger_core::models::{NewTaskRecord, TaskRecord};
//! use taskledger_core::constants::{TaskState, TaskStatus};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let mut task = TaskRecord::create(
//!     pool,
//!     NewTaskRecord {
//!         name: "Provision VM".to_string(),
//!         userid: Some("alice".to_string()),
//!         ..Default::default()
//!     },
//! )
//! .await?;
//!
//! task.state_active(pool, Some("server-1")).await?;
//! task.update_status(pool, TaskState::Finished, TaskStatus::Ok, "done", None)
//!     .await?;
//! assert_eq!(task.human_status(), "Complete");
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! The integration suite uses SQLx native testing with automatic database
//! isolation per test:
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod scopes;
pub mod services;

pub use error::{Result, TaskLedgerError};
