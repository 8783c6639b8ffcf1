//! Daemon configuration, read once from the environment at startup

use queue_manager_core::error::AppError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "~/.queue-manager/queue.db";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

pub const ENV_DB_PATH: &str = "QUEUE_MANAGER_DB_PATH";
pub const ENV_RPC_HOST: &str = "QUEUE_MANAGER_RPC_HOST";
pub const ENV_RPC_PORT: &str = "QUEUE_MANAGER_RPC_PORT";
pub const ENV_LOG_FORMAT: &str = "QUEUE_MANAGER_LOG_FORMAT";
pub const ENV_SHUTDOWN_TIMEOUT: &str = "QUEUE_MANAGER_SHUTDOWN_TIMEOUT_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Development: human-readable, colored
    Pretty,
    /// Production: one JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "{} must be 'pretty' or 'json', got '{}'",
                ENV_LOG_FORMAT, other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: PathBuf,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub log_format: LogFormat,
    pub shutdown_timeout: Duration,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup(ENV_DB_PATH).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db_path = PathBuf::from(shellexpand::tilde(&db_path).into_owned());

        let rpc_host = lookup(ENV_RPC_HOST).unwrap_or_else(|| DEFAULT_RPC_HOST.to_string());

        let rpc_port = match lookup(ENV_RPC_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                AppError::Config(format!("{} '{}' is not a port: {}", ENV_RPC_PORT, raw, e))
            })?,
            None => DEFAULT_RPC_PORT,
        };

        let log_format = match lookup(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse()?,
            None => LogFormat::Pretty,
        };

        let shutdown_secs = match lookup(ENV_SHUTDOWN_TIMEOUT) {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                AppError::Config(format!(
                    "{} '{}' is not a number of seconds: {}",
                    ENV_SHUTDOWN_TIMEOUT, raw, e
                ))
            })?,
            None => DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        };

        Ok(Self {
            db_path,
            rpc_host,
            rpc_port,
            log_format,
            shutdown_timeout: Duration::from_secs(shutdown_secs),
        })
    }
}
