//! Command-line and environment configuration.
//!
//! Every flag has an environment fallback; `main` loads a `.env` file first
//! so either source works.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use countdown_deadlines::{DeadlineSource, LoadError, SourceFormat};

/// Prometheus exporter for deadline countdowns.
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown-exporter", version, about)]
pub struct Cli {
    /// Path to the deadlines file.
    #[arg(long, env = "COUNTDOWN_EXPTR_DEADLINES_FILE", default_value = "deadlines.yaml")]
    pub deadlines_file: PathBuf,

    /// Serialization of the deadlines file: "yaml" or "json".
    #[arg(long, env = "COUNTDOWN_EXPTR_DEADLINES_FILE_TYPE", default_value = "yaml")]
    pub deadlines_file_type: String,

    /// HTTP port for `/metrics`.
    #[arg(long, env = "COUNTDOWN_EXPTR_HTTP_PORT", default_value_t = 9208)]
    pub port: u16,

    /// Address to bind the HTTP server to.
    #[arg(long, env = "COUNTDOWN_EXPTR_HTTP_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Seconds between evaluations of the active deadlines.
    #[arg(long, env = "COUNTDOWN_EXPTR_CHECK_INTERVAL_SECS", default_value_t = 60)]
    pub check_interval: u64,

    /// Reload automatically when the deadlines file changes on disk.
    #[arg(long, env = "COUNTDOWN_EXPTR_WATCH")]
    pub watch: bool,
}

/// Invalid combination of otherwise well-formed settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid deadlines file type: {0}")]
    FileType(#[from] LoadError),

    #[error("check interval must be at least one second")]
    ZeroInterval,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    pub source: DeadlineSource,
    pub listen_addr: SocketAddr,
    pub check_interval: Duration,
    pub watch: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<ExporterConfig, ConfigError> {
        let format: SourceFormat = self.deadlines_file_type.parse()?;
        if self.check_interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(ExporterConfig {
            source: DeadlineSource::new(self.deadlines_file, format),
            listen_addr: SocketAddr::new(self.host, self.port),
            check_interval: Duration::from_secs(self.check_interval),
            watch: self.watch,
        })
    }
}
