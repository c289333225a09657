//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `huemqtt.toml` in the working directory, or the file named by
//! `HUEMQTT_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use huemqtt_adapter_hue_reqwest::HueClientConfig;
use huemqtt_adapter_hue_reqwest::config::DEFAULT_DISCOVERY_URL;
use huemqtt_adapter_mqtt_rumqttc::MqttConfig;
use huemqtt_app::services::pairing::DEFAULT_DEVICE_TYPE;
use huemqtt_app::services::poller::PollSettings;
use huemqtt_domain::credentials::CredentialRecord;
use huemqtt_domain::error::ValidationError;
use huemqtt_domain::topic::Topics;

const DEFAULT_PATH: &str = "huemqtt.toml";

/// Longest accepted refresh interval: one day.
const MAX_REFRESH_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection and topic root.
    pub mqtt: MqttConfig,
    /// Device bridge settings.
    pub hue: HueConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Device bridge configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HueConfig {
    /// Bridge address. Discovered when unset.
    pub ip: Option<String>,
    /// Application username. Registered when unset.
    pub username: Option<String>,
    /// Seconds between poll cycles.
    pub refresh_interval_secs: u64,
    /// Application identifier sent when registering.
    pub device_type: String,
    /// Local state file holding the pairing result.
    pub state_file: PathBuf,
    /// Keep polling after a failed lights fetch.
    pub reschedule_on_failure: bool,
    /// Per-request timeout in seconds. No timeout when unset.
    pub request_timeout_secs: Option<u64>,
    /// N-UPnP discovery endpoint.
    pub discovery_url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `huemqtt.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HUEMQTT_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HUEMQTT_MQTT_HOST") {
            self.mqtt.host = val;
        }
        if let Some(port) = var("HUEMQTT_MQTT_PORT").and_then(|val| val.parse().ok()) {
            self.mqtt.port = port;
        }
        if let Some(val) = var("HUEMQTT_MQTT_USERNAME") {
            self.mqtt.username = Some(val);
        }
        if let Some(val) = var("HUEMQTT_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Some(val) = var("HUEMQTT_TOPIC") {
            self.mqtt.topic = val;
        }
        if let Some(val) = var("HUEMQTT_HUE_IP") {
            self.hue.ip = Some(val);
        }
        if let Some(val) = var("HUEMQTT_HUE_USERNAME") {
            self.hue.username = Some(val);
        }
        if let Some(secs) = var("HUEMQTT_REFRESH_INTERVAL").and_then(|val| val.parse().ok()) {
            self.hue.refresh_interval_secs = secs;
        }
        if let Some(val) = var("HUEMQTT_STATE_FILE") {
            self.hue.state_file = PathBuf::from(val);
        }
        if let Some(val) = var("HUEMQTT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.port == 0 {
            return Err(ConfigError::Validation("mqtt port must be non-zero".to_string()));
        }
        if self.hue.refresh_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "refresh interval must be non-zero".to_string(),
            ));
        }
        if self.hue.refresh_interval_secs > MAX_REFRESH_INTERVAL_SECS {
            return Err(ConfigError::Validation(format!(
                "refresh interval must not exceed {MAX_REFRESH_INTERVAL_SECS} seconds"
            )));
        }
        self.topics()?;
        Ok(())
    }

    /// Topic layout under the configured root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Topic`] for an unusable root.
    pub fn topics(&self) -> Result<Topics, ConfigError> {
        Topics::new(self.mqtt.topic.clone()).map_err(ConfigError::Topic)
    }
}

impl HueConfig {
    /// Poller timing.
    #[must_use]
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            refresh_interval: Duration::from_secs(self.refresh_interval_secs),
            reschedule_on_failure: self.reschedule_on_failure,
        }
    }

    /// HTTP settings for the bridge adapter.
    #[must_use]
    pub fn client_config(&self) -> HueClientConfig {
        HueClientConfig {
            discovery_url: self.discovery_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    /// Pairing information supplied by configuration.
    #[must_use]
    pub fn credentials(&self) -> CredentialRecord {
        CredentialRecord {
            address: self.ip.clone(),
            username: self.username.clone(),
        }
    }
}

impl Default for HueConfig {
    fn default() -> Self {
        Self {
            ip: None,
            username: None,
            refresh_interval_secs: 15,
            device_type: DEFAULT_DEVICE_TYPE.to_string(),
            state_file: PathBuf::from("config/local.json"),
            reschedule_on_failure: false,
            request_timeout_secs: None,
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "huemqttd=info,huemqtt=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// The topic root cannot be used.
    #[error("invalid configuration")]
    Topic(#[source] ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
