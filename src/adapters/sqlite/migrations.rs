//! Versioned schema migrations embedded in the binary.
//!
//! Applied versions are recorded in `schema_migrations`; each migration's
//! DDL and its version row commit in one transaction.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration {version} failed: {source}")]
    Apply {
        version: i64,
        #[source]
        source: sqlx::Error,
    },
    #[error("Failed to read schema version: {0}")]
    Version(#[source] sqlx::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub sql: &'static str,
}

/// Every migration shipped with the service, in version order.
pub const EMBEDDED_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "conditions, meals, workouts and progress tables",
    sql: include_str!("../../../migrations/001_initial_schema.sql"),
}];

pub struct Migrator {
    pool: SqlitePool,
}

impl Migrator {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply every migration newer than the recorded version and return how
    /// many ran.
    pub async fn run(&self, migrations: &[Migration]) -> Result<usize, MigrationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(MigrationError::Version)?;

        let current = self.current_version().await?;
        let mut applied = 0;
        for migration in migrations.iter().filter(|m| m.version > current) {
            self.apply(migration).await?;
            info!(version = migration.version, description = migration.description, "Schema migrated");
            applied += 1;
        }
        Ok(applied)
    }

    /// Highest applied version, 0 for a fresh database.
    pub async fn current_version(&self) -> Result<i64, MigrationError> {
        let (version,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(MigrationError::Version)?;
        Ok(version)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), MigrationError> {
        let failed = |source| MigrationError::Apply {
            version: migration.version,
            source,
        };

        let mut tx = self.pool.begin().await.map_err(failed)?;
        sqlx::raw_sql(migration.sql).execute(&mut *tx).await.map_err(failed)?;
        sqlx::query("INSERT INTO schema_migrations (version, description) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        tx.commit().await.map_err(failed)
    }
}
