use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Free-form attributes attached to a log record
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Why an incoming log was refused before reaching storage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidLog {
    #[error("service_name is required")]
    MissingServiceName,
    #[error("message is required")]
    MissingMessage,
    #[error("level must be one of debug, info, warn, error (got `{0}`)")]
    UnknownLevel(String),
}

/// Checks the fields every front-end has to enforce on a new log and returns its level.
pub fn validate_new_log(service_name: &str, level: &str, message: &str) -> Result<Level, InvalidLog> {
    if service_name.is_empty() {
        return Err(InvalidLog::MissingServiceName);
    }

    if message.is_empty() {
        return Err(InvalidLog::MissingMessage);
    }

    level
        .parse()
        .map_err(|_| InvalidLog::UnknownLevel(level.to_string()))
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateLogRequest {
    pub service_name: String,
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LogResponse {
    pub id: u32,
    pub service_name: String,
    pub level: String,
    pub message: String,
    pub metadata: Option<Metadata>,
    /// Set when the stored metadata could not be decoded and was dropped from this response
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub metadata_unparseable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LogsQuery {
    pub service_name: Option<String>,
    pub level: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LogsResponse {
    pub data: Vec<LogResponse>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteLogResponse {
    pub message: String,
}
