use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub reminders: ReminderConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    /// Zone used for users that never configured one.
    pub default_timezone: String,
    /// Per-schedule iteration cap for range expansion.
    pub max_steps: usize,
    /// Number of users evaluated concurrently during a tick.
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_path: String,
    pub outbox_path: String,
}

impl Settings {
    /// ## Summary
    /// Returns a config builder pre-populated with every default value.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be registered.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", "info")?
            .set_default("reminders.default_timezone", "UTC")?
            .set_default("reminders.max_steps", 1000)?
            .set_default("reminders.concurrency", 8)?
            .set_default("storage.data_path", "data/remedi.json")?
            .set_default("storage.outbox_path", "data/notifications.jsonl")?)
    }

    /// ## Summary
    /// Loads configuration from environment variables and `config.toml` into a `Settings`.
    /// Environment variables (`REMEDI__SECTION__KEY`) take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or validating it fails.
    pub fn load() -> Result<Self> {
        let settings = Self::builder()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env
            .add_source(
                config::Environment::with_prefix("REMEDI")
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks values the deserializer cannot express.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if a limit is zero or the default timezone is blank.
    pub fn validate(&self) -> CoreResult<()> {
        if self.reminders.max_steps == 0 {
            return Err(CoreError::ConfigError(
                "reminders.max_steps must be positive".to_string(),
            ));
        }
        if self.reminders.concurrency == 0 {
            return Err(CoreError::ConfigError(
                "reminders.concurrency must be positive".to_string(),
            ));
        }
        if self.reminders.default_timezone.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "reminders.default_timezone must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
