//! Scanner configuration persistence.

use ornalens_types::ScannerConfig;

pub const APP_NAME: &str = "ornalens";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to store config: {0}")]
    Store(#[from] confy::ConfyError),
}

/// Load/save for [`ScannerConfig`] through the platform config directory.
pub trait AppConfigExt: Sized {
    fn load() -> Self;
    fn save(&self) -> Result<(), ConfigError>;
}

impl AppConfigExt for ScannerConfig {
    fn load() -> Self {
        match confy::load(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, None, self)?;
        Ok(())
    }
}
