//! K-104 time-sync polling client.
//!
//! Polls the device on 5-second wall-clock boundaries and logs each
//! response, reconnecting with a fixed delay after failures.

use std::path::PathBuf;

use clap::Parser;
use k104_timesync as app;

use app::client::TimeClient;
use app::config::{AppConfig, ConfigLoadResult, Proto};

/// Poll a K-104 time-sync device on 5-second boundaries.
#[derive(Parser)]
#[command(name = "k104-client")]
struct Cli {
    /// Device host
    #[arg(long)]
    host: Option<String>,

    /// Device port
    #[arg(long)]
    port: Option<u16>,

    /// Transport protocol
    #[arg(long, value_enum)]
    proto: Option<Proto>,

    /// Response timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Reconnect delay in seconds
    #[arg(long)]
    retry: Option<f64>,

    /// Log file written in addition to stdout
    #[arg(long)]
    log: Option<PathBuf>,

    /// Config file providing defaults for the flags above
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut wrote_default_config = None;
    let mut config = match &cli.config {
        Some(path) => match AppConfig::try_load(path) {
            ConfigLoadResult::Loaded(config) => config,
            ConfigLoadResult::Missing => {
                // First run: persist the defaults so the file can be edited.
                let config = AppConfig::default();
                config
                    .save(path)
                    .map_err(|e| anyhow::anyhow!("cannot write default config: {e}"))?;
                wrote_default_config = Some(path.clone());
                config
            }
            ConfigLoadResult::Invalid(e) => anyhow::bail!("config invalid: {e}"),
        },
        None => AppConfig::default(),
    };

    // CLI flags override config file values.
    if let Some(host) = cli.host {
        config.connection.host = host;
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }
    if let Some(proto) = cli.proto {
        config.connection.proto = proto;
    }
    if let Some(timeout) = cli.timeout {
        config.timing.timeout_secs = timeout;
    }
    if let Some(retry) = cli.retry {
        config.timing.retry_secs = retry;
    }
    if let Some(log) = cli.log {
        config.log.file = Some(log);
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config invalid: {e}"))?;

    let _guard = app::logging::init(config.log.file.as_deref())?;
    if let Some(path) = wrote_default_config {
        tracing::info!("wrote default config to {}", path.display());
    }

    let mut client = TimeClient::new(config);
    tokio::select! {
        res = client.run() => res.map_err(Into::into),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("stopped by user");
            Ok(())
        }
    }
}
