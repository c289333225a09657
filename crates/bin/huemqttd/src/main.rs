//! # huemqttd — Hue ⇄ MQTT bridge daemon
//!
//! Composition root that wires all adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Install the tracing subscriber
//! - Connect to the broker and start the bridge runtime
//! - Pair with the bridge (discovery, registration) while the bus is served
//! - Handle graceful shutdown (SIGINT)
//! - Map fatal failures to process exit codes
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::error::Error as StdError;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use huemqtt_adapter_hue_reqwest::{HueClient, HueError, HuePairing};
use huemqtt_adapter_storage_json::JsonFileStore;
use huemqtt_app::runtime::BridgeRuntime;
use huemqtt_app::services::pairing::{PairingError, PairingService};

use crate::config::{Config, ConfigError};

/// Fatal startup and runtime failures.
#[derive(Debug, thiserror::Error)]
enum DaemonError {
    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("failed to build the bridge HTTP client")]
    Client(#[source] HueError),

    #[error("pairing failed")]
    Pairing(#[from] PairingError),
}

impl DaemonError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Client(_) => 1,
            Self::Pairing(err) => err.exit_code(),
        }
    }
}

/// `err` followed by each of its sources, separated by `: `.
fn report(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("huemqttd: {}", report(&err));
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|err| {
        eprintln!("huemqttd: invalid log filter {:?}: {err}", config.logging.filter);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %report(&err), "huemqttd stopped");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(config: Config) -> Result<(), DaemonError> {
    let topics = config.topics()?;
    let client_config = config.hue.client_config();
    let http = client_config.http_client().map_err(DaemonError::Client)?;

    let connection = huemqtt_adapter_mqtt_rumqttc::connect(&config.mqtt, &topics);
    let runtime = BridgeRuntime::new(
        topics,
        connection.publisher.clone(),
        config.hue.poll_settings(),
    );

    let pairing = PairingService::new(
        HuePairing::new(http.clone(), client_config.discovery_url),
        JsonFileStore::new(&config.hue.state_file),
        &config.hue.device_type,
    );
    let configured = config.hue.credentials();
    let paired = async move {
        let credentials = pairing.ensure_credentials(configured).await?;
        tracing::info!(address = %credentials.address, "bridge credentials ready");
        Ok::<_, PairingError>(HueClient::new(http, &credentials))
    };

    tracing::info!(
        refresh_interval_secs = config.hue.refresh_interval_secs,
        "huemqttd starting"
    );
    let result = tokio::select! {
        result = runtime.run(paired, connection.events) => result.map_err(DaemonError::from),
        () = shutdown_signal() => Ok(()),
    };
    connection.task.abort();
    result
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
