//! K-104 device emulator.
//!
//! Answers time polls over TCP or UDP, degrading to plain text when a
//! request fails to decode.

use std::path::PathBuf;

use clap::Parser;
use k104_timesync as app;

use app::config::Proto;
use app::emulator::Emulator;

/// Emulate a K-104 time-sync device.
#[derive(Parser)]
#[command(name = "k104-emulator")]
struct Cli {
    /// Bind host
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(long, default_value_t = 9000)]
    port: u16,

    /// Transport protocol
    #[arg(long, value_enum, default_value_t = Proto::Tcp)]
    proto: Proto,

    /// Log file written in addition to stdout
    #[arg(long)]
    log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = app::logging::init(cli.log.as_deref())?;

    let emulator = Emulator::new(cli.host, cli.port, cli.proto);
    tokio::select! {
        res = emulator.run() => res.map_err(Into::into),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("stopped by user");
            Ok(())
        }
    }
}
