pub mod settings;

use log::info;

pub use settings::{AppSettings, AuthConfig};

/// Initialize application configuration
pub fn init_config() -> Result<AppSettings, crate::error::AppError> {
    info!("Initializing application configuration from environment");
    let config = AppSettings::from_env()?;
    Ok(config)
}
