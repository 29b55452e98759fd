//! K-104 device emulator: answers time polls over TCP or UDP.
//!
//! A request that fails to decode gets a plain text time response
//! instead of an error; the emulator never rejects a caller.

mod responses;
mod tcp;
mod udp;

use tokio::net::{TcpListener, UdpSocket};
use tracing::info;

use crate::config::Proto;
use crate::error::Result;

pub use tcp::serve_tcp;
pub use udp::serve_udp;

/// Boot-time emulator settings.
pub struct Emulator {
    host: String,
    port: u16,
    proto: Proto,
}

impl Emulator {
    pub fn new(host: impl Into<String>, port: u16, proto: Proto) -> Self {
        Self {
            host: host.into(),
            port,
            proto,
        }
    }

    /// Bind the configured transport and serve until the task is
    /// cancelled from outside.
    pub async fn run(&self) -> Result<()> {
        info!(
            "starting emulator on {}:{} proto={}",
            self.host, self.port, self.proto
        );
        match self.proto {
            Proto::Tcp => {
                let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;
                info!("TCP server listening on {}", listener.local_addr()?);
                serve_tcp(listener).await
            }
            Proto::Udp => {
                let socket = UdpSocket::bind((self.host.as_str(), self.port)).await?;
                info!("UDP server listening on {}", socket.local_addr()?);
                serve_udp(socket).await
            }
        }
    }
}
