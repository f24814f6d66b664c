use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which environment a service is running in. Only changes how verbose the service is.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Display, Serialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Filter directive used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Development => "info",
            Self::Production => "warn",
        }
    }
}
