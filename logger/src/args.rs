use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use logbook_common::Environment;

#[derive(Parser, Debug)]
pub struct Args {
    /// Path of the SQLite database file. Created along with its directory when missing.
    #[arg(long, env = "DATABASE_PATH", default_value = "./data/logs.db")]
    pub state: PathBuf,

    /// Address to serve the HTTP API on
    #[arg(long, env = "HTTP_ADDRESS", default_value = "0.0.0.0:3002")]
    pub http_address: SocketAddr,

    /// Address to serve the gRPC API on
    #[arg(long, env = "GRPC_ADDRESS", default_value = "0.0.0.0:50052")]
    pub grpc_address: SocketAddr,

    /// Environment the service runs in. Only changes log verbosity and format.
    #[arg(long, env = "ENVIRONMENT", default_value_t = Environment::Development)]
    pub environment: Environment,
}
