//! gRPC definitions of the logs service.
//!
//! The code under `src/generated` is committed. After editing `logs.proto`, regenerate it with
//! `cargo test -p logbook-proto -- --ignored bootstrap`. CI runs the same command, which fails
//! when the committed code is out of date. It needs `protoc` on the `PATH`.

mod generated;

// useful re-exports if types are needed in other crates
pub use prost;
pub use tonic;

pub mod logs {
    pub use super::generated::logs::*;
}
