use std::{process::exit, time::Duration};

use clap::Parser;
use logbook_common::backends::tracing::setup_tracing;
use logbook_logger::{api, Args, Dal, LogRepository, Service, Store};
use logbook_proto::logs::logs_service_server::LogsServiceServer;
use tonic::transport::Server;
use tracing::{debug_span, error, info, trace};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_tracing(tracing_subscriber::registry(), "logger", args.environment);

    trace!(args = ?args, "parsed args");

    let store = match Store::open(&args.state, args.environment).await {
        Ok(store) => store,
        Err(error) => {
            error!(error = %error, path = %args.state.display(), "failed to open logs database");
            exit(1);
        }
    };

    let repository = LogRepository::new(store.clone());

    if let Err(error) = repository.migrate().await {
        error!(error = %error, "failed to migrate logs database");
        exit(1);
    }

    let router = api::make_router(repository.clone());

    let grpc = Server::builder()
        .http2_keepalive_interval(Some(Duration::from_secs(60)))
        .trace_fn(|request| debug_span!("grpc", uri = %request.uri()))
        .add_service(LogsServiceServer::new(Service::new(repository)))
        .serve(args.grpc_address);

    info!(address = %args.grpc_address, "binding gRPC API");

    tokio::select! {
        result = api::serve(router, args.http_address) => {
            error!(error = ?result.err(), "HTTP API stopped");
        },
        result = grpc => {
            error!(error = ?result.err(), "gRPC API stopped");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            store.close().await;

            return;
        },
    }

    exit(1);
}
