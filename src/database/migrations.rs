//! # Database Migration System
//!
//! Incremental schema migrations with version tracking. Migrations are
//! discovered from the `migrations/` directory using a timestamp-based naming
//! convention: `YYYYMMDDHHMMSS_description.sql`. Applying an already-applied
//! migration is a no-op, so running the migrator repeatedly is safe.
//!
//! The integration test suite does not go through this module — `#[sqlx::test]`
//! provisions an isolated database per test and applies `migrations/` itself.

use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Represents a single database migration file.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version timestamp (YYYYMMDDHHMMSS format)
    pub version: String,
    /// Human-readable migration name
    pub name: String,
    /// Full path to the SQL file
    pub path: PathBuf,
}

/// Manages database schema migrations.
pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Run all outstanding migrations in version order.
    pub async fn run_all(pool: &PgPool) -> Result<(), sqlx::Error> {
        Self::ensure_migration_table(pool).await?;

        let migrations = Self::discover_migrations()?;
        let applied = Self::get_applied_migrations(pool).await?;

        for migration in migrations.values() {
            if !applied.contains(&migration.version) {
                tracing::info!(
                    version = %migration.version,
                    name = %migration.name,
                    "Applying migration"
                );
                Self::run_migration(pool, &migration.path).await?;
                Self::record_migration(pool, &migration.version).await?;
            }
        }

        Ok(())
    }

    /// Discover all migration files in the migrations directory
    fn discover_migrations() -> Result<BTreeMap<String, Migration>, sqlx::Error> {
        let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let migrations_dir = project_root.join("migrations");

        if !migrations_dir.exists() {
            return Ok(BTreeMap::new());
        }

        let mut migrations = BTreeMap::new();

        for entry in fs::read_dir(migrations_dir).map_err(sqlx::Error::Io)? {
            let entry = entry.map_err(sqlx::Error::Io)?;
            let path = entry.path();

            if path.is_file() && path.extension().is_some_and(|s| s == "sql") {
                if let Some(filename) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Some((version, name)) = Self::parse_migration_filename(filename) {
                        migrations.insert(version.clone(), Migration { version, name, path });
                    }
                }
            }
        }

        Ok(migrations)
    }

    /// Parse migration filename to extract version and name
    fn parse_migration_filename(filename: &str) -> Option<(String, String)> {
        // Expected format: YYYYMMDDHHMMSS_migration_name
        if filename.len() < 15 {
            return None;
        }

        let (version_part, name_part) = filename.split_at(14);

        if !version_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let name = name_part
            .strip_prefix('_')
            .unwrap_or(name_part)
            .replace('_', " ");

        Some((version_part.to_string(), name))
    }

    /// Ensure migration tracking table exists
    async fn ensure_migration_table(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS taskledger_schema_migrations (
                version VARCHAR(14) PRIMARY KEY,
                applied_at TIMESTAMP WITHOUT TIME ZONE DEFAULT NOW()
            )
        "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get list of applied migration versions
    async fn get_applied_migrations(
        pool: &PgPool,
    ) -> Result<std::collections::HashSet<String>, sqlx::Error> {
        let rows = sqlx::query("SELECT version FROM taskledger_schema_migrations")
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("version"))
            .collect())
    }

    /// Record that a migration has been applied
    async fn record_migration(pool: &PgPool, version: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO taskledger_schema_migrations (version) VALUES ($1)")
            .bind(version)
            .execute(pool)
            .await?;

        Ok(())
    }

    async fn run_migration(pool: &PgPool, migration_path: &Path) -> Result<(), sqlx::Error> {
        let sql = std::fs::read_to_string(migration_path).map_err(sqlx::Error::Io)?;

        sqlx::raw_sql(&sql).execute(pool).await?;

        Ok(())
    }
}
