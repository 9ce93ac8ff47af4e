mod config;

pub use config::{APP_NAME, AppConfigExt, ConfigError};
