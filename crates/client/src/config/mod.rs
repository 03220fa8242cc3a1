use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    local_state,
};

const DEFAULT_CONFIG_PATH: &str = "config/tally.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub session_path: String,
    /// Mark the stored credential `Secure`; turn on in production.
    pub secure_cookie: bool,
    pub timezone: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            session_path: local_state::default_session_path().to_string(),
            secure_cookie: false,
            timezone: "UTC".to_string(),
            log_level: "info".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Invalid(format!("unknown timezone: {}", self.timezone)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub session_path: Option<String>,
    pub timezone: Option<String>,
    pub log_level: Option<String>,
}

/// Layer: defaults, then the TOML file (optional), then `TALLY_*`
/// environment variables, then `overrides`.
pub fn load(config_path: Option<&str>, overrides: Overrides) -> Result<AppConfig> {
    let config_path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("TALLY"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = overrides.base_url {
        settings.base_url = base_url;
    }
    if let Some(session_path) = overrides.session_path {
        settings.session_path = session_path;
    }
    if let Some(timezone) = overrides.timezone {
        settings.timezone = timezone;
    }
    if let Some(log_level) = overrides.log_level {
        settings.log_level = log_level;
    }

    settings.timezone()?;
    Ok(settings)
}
