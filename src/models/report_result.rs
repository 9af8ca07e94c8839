//! Report result link: the middle tier of task result storage, a structured
//! report payload persisted by the platform's reporting component.

use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ReportResult {
    pub id: i64,
    pub task_id: i64,
    pub report_data: Option<Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewReportResult {
    pub task_id: i64,
    pub report_data: Option<Value>,
}

impl ReportResult {
    pub async fn create(pool: &PgPool, new_result: NewReportResult) -> Result<ReportResult> {
        let result = sqlx::query_as::<_, ReportResult>(
            r#"
            INSERT INTO report_results (task_id, report_data, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            RETURNING id, task_id, report_data, created_at, updated_at
            "#,
        )
        .bind(new_result.task_id)
        .bind(new_result.report_data)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    pub async fn find_for_task(pool: &PgPool, task_id: i64) -> Result<Option<ReportResult>> {
        let result = sqlx::query_as::<_, ReportResult>(
            r#"
            SELECT id, task_id, report_data, created_at, updated_at
            FROM report_results
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

        Ok(result)
    }
}
