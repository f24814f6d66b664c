use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logbook_common::models::log::{InvalidLog, Metadata};
use sqlx::{migrate::MigrateError, FromRow, QueryBuilder};
use thiserror::Error;

use crate::{metadata, store::Store};

pub type LogId = u32;

/// Page size used when a listing does not ask for one
pub const DEFAULT_LIMIT: u32 = 50;

const COLUMNS: &str = "id, service_name, level, message, metadata, created_at, updated_at";

#[derive(Error, Debug)]
pub enum DalError {
    #[error("invalid log: {0}")]
    Validation(#[from] InvalidLog),
    #[error("log not found")]
    NotFound,
    #[error("database request failed: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("running migrations failed: {0}")]
    Migration(#[from] MigrateError),
}

#[async_trait]
pub trait Dal: Send + Sync {
    /// Store a new log
    async fn create_log(&self, log: NewLog) -> Result<Log, DalError>;

    /// Get a log that has not been deleted
    async fn get_log(&self, id: LogId) -> Result<Log, DalError>;

    /// Get a page of logs, newest first, along with how many logs match the filters in total
    async fn get_logs(&self, filters: LogFilters) -> Result<(Vec<Log>, u64), DalError>;

    /// Soft delete a log. Deleting a missing or already deleted log is [DalError::NotFound].
    async fn delete_log(&self, id: LogId) -> Result<(), DalError>;

    /// Make sure the schema exists
    async fn migrate(&self) -> Result<(), DalError>;
}

/// A log as handed in by a front-end.
///
/// `level` is kept as text: front-ends validate it, the repository stores whatever it gets.
#[derive(Clone, Debug, PartialEq)]
pub struct NewLog {
    pub service_name: String,
    pub level: String,
    pub message: String,
    pub metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilters {
    /// Exact match. `None` and the empty string match every service.
    pub service_name: Option<String>,
    /// Exact match. `None` and the empty string match every level.
    pub level: Option<String>,
    /// Zero means [DEFAULT_LIMIT]
    pub limit: u32,
    pub offset: u32,
}

impl LogFilters {
    /// The page size that will actually be used
    pub fn limit(&self) -> u32 {
        if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit
        }
    }

    fn push_predicate(&self, builder: &mut QueryBuilder<'_, sqlx::Sqlite>) {
        builder.push(" WHERE deleted_at IS NULL");

        if let Some(service_name) = non_empty(&self.service_name) {
            builder
                .push(" AND service_name = ")
                .push_bind(service_name.to_string());
        }

        if let Some(level) = non_empty(&self.level) {
            builder.push(" AND level = ").push_bind(level.to_string());
        }
    }
}

fn non_empty(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().filter(|value| !value.is_empty())
}

#[derive(Clone, Debug, PartialEq)]
pub struct Log {
    pub id: LogId,
    pub service_name: String,
    pub level: String,
    pub message: String,
    pub metadata: Metadata,
    /// The stored metadata was corrupt and has been replaced by an empty map
    pub metadata_unparseable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct LogRow {
    id: LogId,
    service_name: String,
    level: String,
    message: String,
    metadata: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LogRow> for Log {
    fn from(row: LogRow) -> Self {
        let decoded = metadata::decode(row.metadata.as_deref());

        Self {
            id: row.id,
            service_name: row.service_name,
            level: row.level,
            message: row.message,
            metadata: decoded.metadata,
            metadata_unparseable: decoded.unparseable,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// [Dal] over a [Store]. Holds no state of its own, so clones can be handed to every front-end.
#[derive(Clone, Debug)]
pub struct LogRepository {
    store: Store,
}

impl LogRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Dal for LogRepository {
    async fn create_log(&self, log: NewLog) -> Result<Log, DalError> {
        if log.service_name.is_empty() {
            return Err(InvalidLog::MissingServiceName.into());
        }

        if log.message.is_empty() {
            return Err(InvalidLog::MissingMessage.into());
        }

        // Both timestamps come from the service clock and are bound into the insert
        let now = Utc::now();

        let row: LogRow = sqlx::query_as(&format!(
            "INSERT INTO logs (service_name, level, message, metadata, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING {COLUMNS}"
        ))
        .bind(log.service_name)
        .bind(log.level)
        .bind(log.message)
        .bind(metadata::encode(log.metadata))
        .bind(now)
        .fetch_one(self.store.pool())
        .await?;

        Ok(row.into())
    }

    async fn get_log(&self, id: LogId) -> Result<Log, DalError> {
        sqlx::query_as::<_, LogRow>(&format!(
            "SELECT {COLUMNS} FROM logs WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?
        .map(Log::from)
        .ok_or(DalError::NotFound)
    }

    async fn get_logs(&self, filters: LogFilters) -> Result<(Vec<Log>, u64), DalError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM logs");
        filters.push_predicate(&mut count);

        let mut page = QueryBuilder::new(format!("SELECT {COLUMNS} FROM logs"));
        filters.push_predicate(&mut page);
        page.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(filters.limit()))
            .push(" OFFSET ")
            .push_bind(i64::from(filters.offset));

        // Count and page have to come from the same snapshot
        let mut tx = self.store.pool().begin().await?;

        let total: i64 = count.build_query_scalar().fetch_one(&mut *tx).await?;
        let rows: Vec<LogRow> = page.build_query_as().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        Ok((
            rows.into_iter().map(Log::from).collect(),
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn delete_log(&self, id: LogId) -> Result<(), DalError> {
        let rows_affected = sqlx::query(
            "UPDATE logs SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(self.store.pool())
        .await?
        .rows_affected();

        if rows_affected > 0 {
            Ok(())
        } else {
            Err(DalError::NotFound)
        }
    }

    async fn migrate(&self) -> Result<(), DalError> {
        self.store.migrate().await?;

        Ok(())
    }
}
