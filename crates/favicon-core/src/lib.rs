pub mod app_config;
pub mod assets;
pub mod config;
pub mod overrides;

pub use app_config::{AppConfig, Environment};
pub use assets::Sentinel;
pub use config::{load_app_config, load_app_config_from_env};
pub use overrides::{load_overrides, OverrideEntry, OverrideTable};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read overrides file {path}: {source}")]
    OverridesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse overrides file: {0}")]
    OverridesFileParse(#[from] serde_yaml::Error),

    #[error("overrides validation failed: {0}")]
    Validation(String),
}
