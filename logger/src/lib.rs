use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use logbook_common::models::log::validate_new_log;
use logbook_proto::logs::{
    logs_service_server::LogsService, CreateLogRequest, CreateLogResponse, DeleteLogRequest,
    DeleteLogResponse, GetLogRequest, GetLogsRequest, GetLogsResponse, LogResponse,
};
use tonic::{Request, Response, Status};
use tracing::{error, instrument, warn};

pub mod api;
pub mod args;
pub mod dal;
pub mod error;
pub mod metadata;
pub mod store;

pub use args::Args;
pub use dal::{Dal, DalError, Log, LogFilters, LogRepository, NewLog};
pub use store::Store;

/// gRPC front-end of the log repository
pub struct Service<D> {
    dal: D,
}

impl<D> Service<D>
where
    D: Dal + 'static,
{
    pub fn new(dal: D) -> Self {
        Self { dal }
    }
}

#[async_trait]
impl<D> LogsService for Service<D>
where
    D: Dal + 'static,
{
    #[instrument(skip_all, fields(log.service_name = %request.get_ref().service_name))]
    async fn create_log(
        &self,
        request: Request<CreateLogRequest>,
    ) -> Result<Response<CreateLogResponse>, Status> {
        let request = request.into_inner();

        let level = validate_new_log(&request.service_name, &request.level, &request.message)
            .map_err(|error| Status::invalid_argument(error.to_string()))?;

        let log = self
            .dal
            .create_log(NewLog {
                service_name: request.service_name,
                level: level.to_string(),
                message: request.message,
                metadata: metadata::from_wire(request.metadata),
            })
            .await?;

        Ok(Response::new(log.into()))
    }

    #[instrument(skip_all)]
    async fn get_logs(
        &self,
        request: Request<GetLogsRequest>,
    ) -> Result<Response<GetLogsResponse>, Status> {
        let request = request.into_inner();

        // Negative paging values are treated as unset
        let filters = LogFilters {
            service_name: Some(request.service_name),
            level: Some(request.level),
            limit: u32::try_from(request.limit).unwrap_or_default(),
            offset: u32::try_from(request.offset).unwrap_or_default(),
        };

        let (logs, total) = self.dal.get_logs(filters).await?;

        Ok(Response::new(GetLogsResponse {
            logs: logs.into_iter().map(to_response).collect(),
            total: i64::try_from(total).unwrap_or(i64::MAX),
        }))
    }

    #[instrument(skip_all, fields(log.id = request.get_ref().id))]
    async fn get_log(
        &self,
        request: Request<GetLogRequest>,
    ) -> Result<Response<LogResponse>, Status> {
        let log = self.dal.get_log(request.into_inner().id).await?;

        Ok(Response::new(to_response(log)))
    }

    #[instrument(skip_all, fields(log.id = request.get_ref().id))]
    async fn delete_log(
        &self,
        request: Request<DeleteLogRequest>,
    ) -> Result<Response<DeleteLogResponse>, Status> {
        self.dal.delete_log(request.into_inner().id).await?;

        Ok(Response::new(DeleteLogResponse {
            message: "log deleted successfully".to_string(),
        }))
    }
}

impl From<DalError> for Status {
    fn from(error: DalError) -> Self {
        match error {
            DalError::Validation(error) => Status::invalid_argument(error.to_string()),
            DalError::NotFound => Status::not_found("log not found"),
            DalError::Storage(_) | DalError::Migration(_) => {
                error!(error = %error, "logs database request failed");

                Status::internal("failed to interact with logs database")
            }
        }
    }
}

fn to_response(log: Log) -> LogResponse {
    if log.metadata_unparseable {
        warn!(log.id = log.id, "stored metadata could not be decoded");
    }

    log.into()
}

fn to_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl From<Log> for LogResponse {
    fn from(log: Log) -> Self {
        Self {
            id: log.id,
            metadata: metadata::to_wire(&log.metadata),
            service_name: log.service_name,
            level: log.level,
            message: log.message,
            created_at: to_timestamp(log.created_at),
        }
    }
}

impl From<Log> for CreateLogResponse {
    fn from(log: Log) -> Self {
        Self {
            id: log.id,
            metadata: metadata::to_wire(&log.metadata),
            service_name: log.service_name,
            level: log.level,
            message: log.message,
            created_at: to_timestamp(log.created_at),
        }
    }
}
