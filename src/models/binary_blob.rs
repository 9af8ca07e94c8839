//! # BinaryBlob Model
//!
//! Out-of-line storage for large opaque task results. Each blob declares its
//! serialization format through a closed tag set; a stored tag outside that
//! set is a data-integrity error, never a dynamic type lookup.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::error::{Result, TaskLedgerError};

/// Blob name under which a task's result payload is stored.
pub const TASK_RESULTS_BLOB_NAME: &str = "task_results";

/// Supported result encodings.
///
/// `Yaml` is the write-path encoding; `Json` is the generic fallback kept for
/// payloads marshaled by older platform components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultFormat {
    Yaml,
    Json,
}

impl ResultFormat {
    /// The tag persisted in the `data_type` column.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }

    /// Resolve a stored tag. Unknown tags are rejected.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "YAML" => Ok(Self::Yaml),
            "JSON" => Ok(Self::Json),
            other => Err(TaskLedgerError::ResultEncoding(format!(
                "unknown result format tag: {other}"
            ))),
        }
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match self {
            Self::Yaml => serde_yaml::to_string(value)
                .map(String::into_bytes)
                .map_err(|e| TaskLedgerError::ResultEncoding(e.to_string())),
            Self::Json => Ok(serde_json::to_vec(value)?),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        match self {
            Self::Yaml => serde_yaml::from_slice(bytes)
                .map_err(|e| TaskLedgerError::ResultEncoding(e.to_string())),
            Self::Json => Ok(serde_json::from_slice(bytes)?),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BinaryBlob {
    pub id: i64,
    pub task_id: i64,
    pub name: String,
    pub data_type: String,
    pub payload: Vec<u8>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl BinaryBlob {
    /// Insert or replace the named blob for a task.
    pub async fn upsert(
        pool: &PgPool,
        task_id: i64,
        name: &str,
        format: ResultFormat,
        value: &Value,
    ) -> Result<BinaryBlob> {
        let payload = format.encode(value)?;

        let blob = sqlx::query_as::<_, BinaryBlob>(
            r#"
            INSERT INTO binary_blobs (task_id, name, data_type, payload, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (task_id, name)
            DO UPDATE SET data_type = EXCLUDED.data_type,
                          payload = EXCLUDED.payload,
                          updated_at = NOW()
            RETURNING id, task_id, name, data_type, payload, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(name)
        .bind(format.tag())
        .bind(payload)
        .fetch_one(pool)
        .await?;

        Ok(blob)
    }

    /// Find the named blob for a task.
    pub async fn find_for_task(
        pool: &PgPool,
        task_id: i64,
        name: &str,
    ) -> Result<Option<BinaryBlob>> {
        let blob = sqlx::query_as::<_, BinaryBlob>(
            r#"
            SELECT id, task_id, name, data_type, payload, created_at, updated_at
            FROM binary_blobs
            WHERE task_id = $1 AND name = $2
            "#,
        )
        .bind(task_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(blob)
    }

    /// Decode the payload under its declared format.
    pub fn decode_value(&self) -> Result<Value> {
        ResultFormat::from_tag(&self.data_type)?.decode(&self.payload)
    }
}
