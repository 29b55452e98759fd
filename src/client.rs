//! Polling client: one request per 5-second tick, reconnect on failure.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, Proto};
use crate::error::{AppError, Result};
use crate::ft12::{self, CONTROL_REQUEST, DEFAULT_ADDRESS, Frame, HEADER_SIZE, START};
use crate::schedule::next_tick_delay;

/// Request payload sent on every tick.
const REQUEST_PAYLOAD: &[u8] = b"REQTIME";

/// Bound on the TCP connect attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-byte bound while draining a non-frame (text) response.
const TEXT_BYTE_TIMEOUT: Duration = Duration::from_millis(200);

/// Settle pause after a completed exchange.
const POST_POLL_PAUSE: Duration = Duration::from_millis(50);

/// What one poll produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A well-formed telegram.
    Frame(Frame),
    /// Non-frame traffic surfaced as text.
    Text(String),
    /// No reply within the read timeout (UDP only).
    Timeout,
}

impl PollOutcome {
    /// Rendering used for the poll log line.
    pub fn display_text(&self) -> String {
        match self {
            PollOutcome::Frame(frame) => frame.payload_text(),
            PollOutcome::Text(text) => text.trim().to_string(),
            PollOutcome::Timeout => "<timeout>".to_string(),
        }
    }
}

/// Time-sync polling client for one device.
///
/// Owns at most one transport at a time. A TCP stream is dropped and
/// re-established after any I/O or decode failure; the UDP socket
/// survives lost replies since there is no connection to lose.
pub struct TimeClient {
    tcp: Option<TcpStream>,
    udp: Option<UdpSocket>,
    last_success: Option<DateTime<Local>>,
    config: AppConfig,
}

impl TimeClient {
    pub fn new(config: AppConfig) -> Self {
        Self {
            tcp: None,
            udp: None,
            last_success: None,
            config,
        }
    }

    fn addr(&self) -> String {
        format!(
            "{}:{}",
            self.config.connection.host, self.config.connection.port
        )
    }

    /// Poll indefinitely: wait for the next 5-second tick, exchange one
    /// request/response, log the outcome. Runs until the task is
    /// cancelled from outside.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "client starting; target {} proto={} timeout={:.1}s retry={:.1}s",
            self.addr(),
            self.config.connection.proto,
            self.config.timing.timeout_secs,
            self.config.timing.retry_secs,
        );

        loop {
            if let Err(e) = self.ensure_transport().await {
                warn!(
                    "connect failed: {e}; retrying in {:.1}s",
                    self.config.timing.retry_secs
                );
                tokio::time::sleep(self.config.timing.retry_delay()).await;
                continue;
            }

            tokio::time::sleep(next_tick_delay()).await;

            match self.poll_once().await {
                Ok(outcome) => {
                    if !matches!(outcome, PollOutcome::Timeout) {
                        self.last_success = Some(Local::now());
                    }
                    let ts = Local::now().format("%Y-%m-%dT%H:%M:%S");
                    info!("{ts} | {}", outcome.display_text());
                }
                Err(e) => {
                    match &self.last_success {
                        Some(t) => warn!(
                            "comm error: {e} (last success {})",
                            t.format("%Y-%m-%dT%H:%M:%S")
                        ),
                        None => warn!("comm error: {e}"),
                    }
                    self.disconnect();
                    tokio::time::sleep(self.config.timing.retry_delay()).await;
                    continue;
                }
            }

            tokio::time::sleep(POST_POLL_PAUSE).await;
        }
    }

    /// Establish the transport if none is held.
    async fn ensure_transport(&mut self) -> Result<()> {
        match self.config.connection.proto {
            Proto::Tcp if self.tcp.is_none() => {
                let addr = self.addr();
                info!("TCP connecting to {addr} (timeout={CONNECT_TIMEOUT:?})");
                let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr))
                    .await
                    .map_err(|_| AppError::timeout(format!("connect timeout to {addr}")))?
                    .map_err(|e| AppError::connection(format!("connect to {addr} failed: {e}")))?;
                info!("connected TCP to {addr}");
                self.tcp = Some(stream);
            }
            Proto::Udp if self.udp.is_none() => {
                let socket = UdpSocket::bind("0.0.0.0:0").await?;
                info!("UDP socket ready");
                self.udp = Some(socket);
            }
            _ => {}
        }
        Ok(())
    }

    /// Drop the TCP stream after a failure. The UDP socket is kept.
    fn disconnect(&mut self) {
        self.tcp = None;
    }

    async fn poll_once(&mut self) -> Result<PollOutcome> {
        match self.config.connection.proto {
            Proto::Tcp => self.poll_tcp().await,
            Proto::Udp => self.poll_udp().await,
        }
    }

    async fn poll_tcp(&mut self) -> Result<PollOutcome> {
        let request = ft12::encode(REQUEST_PAYLOAD, CONTROL_REQUEST, DEFAULT_ADDRESS)?;
        let read_timeout = self.config.timing.timeout();
        let stream = self
            .tcp
            .as_mut()
            .ok_or_else(|| AppError::connection("not connected"))?;

        debug!("TX ({} bytes): {:02X?}", request.len(), request);
        stream.write_all(&request).await?;

        // Exact header first; a non-frame reply falls back to a text line.
        let mut header = [0u8; HEADER_SIZE];
        read_exact_timed(stream, &mut header, read_timeout).await?;
        if header[0] != START || header[3] != START {
            let line = read_text_tail(stream, &header).await;
            return Ok(PollOutcome::Text(line));
        }

        let len = header[1] as usize;
        let mut tail = vec![0u8; len + 2];
        read_exact_timed(stream, &mut tail, read_timeout).await?;

        let mut full = Vec::with_capacity(HEADER_SIZE + tail.len());
        full.extend_from_slice(&header);
        full.extend_from_slice(&tail);
        debug!("RX ({} bytes): {:02X?}", full.len(), full);

        let frame = ft12::decode(&full)?;
        Ok(PollOutcome::Frame(frame))
    }

    async fn poll_udp(&mut self) -> Result<PollOutcome> {
        let request = ft12::encode(REQUEST_PAYLOAD, CONTROL_REQUEST, DEFAULT_ADDRESS)?;
        let addr = self.addr();
        let read_timeout = self.config.timing.timeout();
        let socket = self
            .udp
            .as_ref()
            .ok_or_else(|| AppError::connection("no UDP socket"))?;

        debug!("TX ({} bytes): {:02X?}", request.len(), request);
        socket.send_to(&request, addr.as_str()).await?;

        let mut buf = vec![0u8; 8192];
        match timeout(read_timeout, socket.recv_from(&mut buf)).await {
            Err(_) => Ok(PollOutcome::Timeout),
            Ok(Err(e)) => Err(AppError::Io(e)),
            Ok(Ok((n, _peer))) => {
                let datagram = &buf[..n];
                debug!("RX ({n} bytes): {:02X?}", datagram);
                match ft12::decode(datagram) {
                    Ok(frame) => Ok(PollOutcome::Frame(frame)),
                    // A lone malformed reply degrades to text; the socket
                    // stays usable for the next tick.
                    Err(_) => Ok(PollOutcome::Text(
                        String::from_utf8_lossy(datagram).into_owned(),
                    )),
                }
            }
        }
    }
}

/// Read exactly `buf.len()` bytes within `window`, mapping EOF to a
/// connection-closed error.
async fn read_exact_timed(stream: &mut TcpStream, buf: &mut [u8], window: Duration) -> Result<()> {
    match timeout(window, stream.read_exact(buf)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(AppError::ConnectionClosed)
        }
        Ok(Err(e)) => Err(AppError::Io(e)),
        Err(_) => Err(AppError::timeout("read timeout")),
    }
}

/// Drain a text reply that began with a non-frame header: one byte at a
/// time on a short per-byte window, stopping at the newline or the first
/// stall.
async fn read_text_tail(stream: &mut TcpStream, head: &[u8]) -> String {
    let mut bytes = head.to_vec();
    loop {
        let mut byte = [0u8; 1];
        match timeout(TEXT_BYTE_TIMEOUT, stream.read_exact(&mut byte)).await {
            Ok(Ok(_)) => {
                bytes.push(byte[0]);
                if byte[0] == b'\n' {
                    break;
                }
            }
            _ => break,
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_variants() {
        let frame = Frame {
            control: 0x73,
            address: 0x01,
            payload: b"TIME:2026-08-05 10:15:00".to_vec(),
        };
        assert_eq!(
            PollOutcome::Frame(frame).display_text(),
            "TIME:2026-08-05 10:15:00"
        );
        assert_eq!(
            PollOutcome::Text("TIME:2026-08-05 10:15:00\n".to_string()).display_text(),
            "TIME:2026-08-05 10:15:00"
        );
        assert_eq!(PollOutcome::Timeout.display_text(), "<timeout>");
    }
}
