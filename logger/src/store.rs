use std::{path::Path, time::Duration};

use logbook_common::Environment;
use sqlx::{
    migrate::{MigrateError, Migrator},
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    ConnectOptions, SqlitePool,
};
use tracing::info;

pub static MIGRATIONS: Migrator = sqlx::migrate!("./migrations");

/// How long a statement waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a request waits for a free connection before failing
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle on the SQLite database holding the `logs` table.
///
/// Cheap to clone: clones share the same connection pool. Construct it once at startup and hand
/// it to whatever needs it.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens the database file at `path`, creating it and its parent directories when missing.
    pub async fn open(path: &Path, environment: Environment) -> Result<Self, sqlx::Error> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        if environment.is_production() {
            options = options.disable_statement_logging();
        }

        let pool = SqlitePoolOptions::new()
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        info!(
            "state db: {}",
            std::fs::canonicalize(path)?.to_string_lossy()
        );

        Ok(Self { pool })
    }

    /// A utility for creating an in-memory database for testing.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        // Every connection to `:memory:` opens a fresh database, so the pool must hold exactly one
        // connection and never recycle it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    /// Creates the `logs` table and its indices. Running it again is a no-op.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        MIGRATIONS.run(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for in-flight statements and closes every connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
