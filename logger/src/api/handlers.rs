use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use logbook_common::models::log::{
    validate_new_log, CreateLogRequest, DeleteLogResponse, LogResponse, LogsQuery, LogsResponse,
};
use tracing::{field, instrument, warn, Span};

use crate::{
    dal::{Log, LogFilters, LogId, NewLog},
    error::Error,
};

use super::DalState;

#[instrument(skip_all, fields(log.service_name = field::Empty, log.level = field::Empty))]
pub(super) async fn create_log(
    State(dal): State<DalState>,
    request: Result<Json<CreateLogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LogResponse>), Error> {
    let Json(request) = request?;

    let span = Span::current();
    span.record("log.service_name", request.service_name.as_str());
    span.record("log.level", request.level.as_str());

    let level = validate_new_log(&request.service_name, &request.level, &request.message)?;

    let log = dal
        .create_log(NewLog {
            service_name: request.service_name,
            level: level.to_string(),
            message: request.message,
            metadata: request.metadata,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(log.into())))
}

#[instrument(skip_all)]
pub(super) async fn get_logs(
    State(dal): State<DalState>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<LogsResponse>, Error> {
    let Query(query) = query?;

    let filters = LogFilters {
        service_name: query.service_name,
        level: query.level,
        limit: query.limit.unwrap_or_default(),
        offset: query.offset.unwrap_or_default(),
    };
    let (limit, offset) = (filters.limit(), filters.offset);

    let (logs, total) = dal.get_logs(filters).await?;

    Ok(Json(LogsResponse {
        data: logs.into_iter().map(to_response).collect(),
        total,
        limit,
        offset,
    }))
}

#[instrument(skip_all, fields(log.id = field::Empty))]
pub(super) async fn get_log(
    State(dal): State<DalState>,
    id: Result<Path<LogId>, PathRejection>,
) -> Result<Json<LogResponse>, Error> {
    let Path(id) = id?;
    Span::current().record("log.id", id);

    Ok(Json(to_response(dal.get_log(id).await?)))
}

#[instrument(skip_all, fields(log.id = field::Empty))]
pub(super) async fn delete_log(
    State(dal): State<DalState>,
    id: Result<Path<LogId>, PathRejection>,
) -> Result<Json<DeleteLogResponse>, Error> {
    let Path(id) = id?;
    Span::current().record("log.id", id);

    dal.delete_log(id).await?;

    Ok(Json(DeleteLogResponse {
        message: "log deleted successfully".to_string(),
    }))
}

fn to_response(log: Log) -> LogResponse {
    if log.metadata_unparseable {
        warn!(log.id = log.id, "stored metadata could not be decoded");
    }

    log.into()
}

impl From<Log> for LogResponse {
    fn from(log: Log) -> Self {
        Self {
            id: log.id,
            service_name: log.service_name,
            level: log.level,
            message: log.message,
            metadata: (!log.metadata.is_empty()).then_some(log.metadata),
            metadata_unparseable: log.metadata_unparseable,
            created_at: log.created_at,
            updated_at: log.updated_at,
        }
    }
}
