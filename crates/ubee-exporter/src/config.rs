//! Exporter settings.
//!
//! Values come from command-line flags, then their `UBEE_*` environment
//! variables, then the optional YAML/TOML config file, then the defaults
//! below. The file layout matches the `modem`/`telemetry` sections used by
//! existing cable-modem exporter deployments.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use ubee_core::error::AppError;
use ubee_core::models::Credentials;

pub const DEFAULT_MODEM_ADDRESS: &str = "192.168.178.1";
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:9527";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug, Default)]
#[command(
    name = "ubee-exporter",
    version,
    about = "Prometheus exporter for the Ubee UVW320B cable modem"
)]
pub struct Cli {
    /// YAML or TOML file with `modem` and `telemetry` sections
    #[arg(long, env = "UBEE_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Modem address as host[:port] [default: 192.168.178.1]
    #[arg(long, env = "UBEE_MODEM_ADDRESS")]
    pub modem_address: Option<String>,

    /// Username for the modem web UI
    #[arg(long, env = "UBEE_MODEM_USERNAME")]
    pub modem_username: Option<String>,

    /// Password for the modem web UI
    #[arg(long, env = "UBEE_MODEM_PASSWORD", hide_env_values = true)]
    pub modem_password: Option<String>,

    /// Address the exporter listens on [default: 0.0.0.0:9527]
    #[arg(long, env = "UBEE_LISTEN_ADDRESS")]
    pub listen_address: Option<String>,

    /// Path under which metrics are served [default: /metrics]
    #[arg(long, env = "UBEE_METRICS_PATH")]
    pub metrics_path: Option<String>,

    /// Timeout for each request to the modem, in seconds [default: 30]
    #[arg(long, env = "UBEE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// Contents of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub modem: ModemSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModemSettings {
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub listen_address: Option<String>,
    pub metrics_path: Option<String>,
}

impl FileSettings {
    /// Load a config file; the format follows the file extension.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| {
                AppError::ConfigError(format!(
                    "cannot load config file '{}': {e}",
                    path.display()
                ))
            })
    }
}

/// Validated exporter settings.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub modem_address: String,
    pub credentials: Credentials,
    pub listen_address: SocketAddr,
    pub metrics_path: String,
    pub timeout: Duration,
}

impl TryFrom<Cli> for ExporterConfig {
    type Error = AppError;

    fn try_from(cli: Cli) -> Result<Self, AppError> {
        let file = match &cli.config_file {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };
        Self::resolve(cli, file)
    }
}

impl ExporterConfig {
    /// Merge flags over file settings over defaults, then validate.
    pub fn resolve(cli: Cli, file: FileSettings) -> Result<Self, AppError> {
        let modem_address = cli
            .modem_address
            .or(file.modem.address)
            .unwrap_or_else(|| DEFAULT_MODEM_ADDRESS.to_string())
            .trim()
            .to_string();
        if modem_address.is_empty() {
            return Err(AppError::ConfigError("modem address must not be empty".into()));
        }
        if modem_address.contains("://") || modem_address.contains('/') {
            return Err(AppError::ConfigError(format!(
                "modem address '{modem_address}' must be host[:port], without scheme or path"
            )));
        }

        let username = cli
            .modem_username
            .or(file.modem.username)
            .ok_or_else(|| AppError::ConfigError("modem username is required".into()))?;
        if username.trim().is_empty() {
            return Err(AppError::ConfigError("modem username must not be empty".into()));
        }
        let password = cli
            .modem_password
            .or(file.modem.password)
            .ok_or_else(|| AppError::ConfigError("modem password is required".into()))?;

        let listen_address = cli
            .listen_address
            .or(file.telemetry.listen_address)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_string());
        let listen_address = parse_listen_address(&listen_address)?;

        let metrics_path = cli
            .metrics_path
            .or(file.telemetry.metrics_path)
            .unwrap_or_else(|| DEFAULT_METRICS_PATH.to_string());
        if !metrics_path.starts_with('/') || metrics_path == "/" {
            return Err(AppError::ConfigError(format!(
                "metrics path '{metrics_path}' must start with '/' and not be the root"
            )));
        }

        let timeout_secs = cli
            .timeout_secs
            .or(file.modem.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(AppError::ConfigError("timeout must be at least 1 second".into()));
        }

        Ok(Self {
            modem_address,
            credentials: Credentials::new(username, password),
            listen_address,
            metrics_path,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Accepts `host:port`, plus the `:port` shorthand for all interfaces.
fn parse_listen_address(text: &str) -> Result<SocketAddr, AppError> {
    let full = match text.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => text.to_string(),
    };
    full.parse::<SocketAddr>()
        .map_err(|e| AppError::ConfigError(format!("invalid listen address '{text}': {e}")))
}
