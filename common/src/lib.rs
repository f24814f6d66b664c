#[cfg(feature = "backend")]
pub mod backends;
pub mod environment;
pub mod models;

pub use environment::Environment;
