//! Per-connection TCP handling: reassemble, answer, repeat.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use super::responses::{framed_time_reply, text_time_reply};
use crate::error::Result;
use crate::ft12::{Reassembler, Unit};

/// Accept connections forever, one task per connection.
pub async fn serve_tcp(listener: TcpListener) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer).await {
                warn!("connection error ({peer}): {e}");
            }
        });
    }
}

/// Read chunks into this connection's reassembler and answer every
/// complete unit in arrival order.
async fn handle_connection(mut stream: TcpStream, peer: SocketAddr) -> Result<()> {
    info!("TCP conn from {peer}");
    let mut reassembler = Reassembler::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        info!("received ({peer}): {:02X?}", &chunk[..n]);
        for unit in reassembler.push(&chunk[..n]) {
            let reply = reply_for(&unit, peer);
            stream.write_all(&reply).await?;
            info!("sent ({peer}): {:02X?}", reply);
        }
    }
    info!("connection closed {peer}");
    Ok(())
}

fn reply_for(unit: &Unit, peer: SocketAddr) -> Vec<u8> {
    match unit {
        Unit::Frame(frame) => {
            info!(
                "parsed request from {peer}: control=0x{:02X} addr=0x{:02X} payload={:?}",
                frame.control,
                frame.address,
                frame.payload_text(),
            );
            framed_time_reply(frame.address)
        }
        Unit::Corrupt { error, .. } => {
            warn!("frame parse failed ({peer}): {error}; fallback to text");
            text_time_reply()
        }
        Unit::Line(line) => {
            let text = String::from_utf8_lossy(line);
            let command = text.trim();
            if command.eq_ignore_ascii_case("GETTIME") {
                info!("text command from {peer}: {command:?}");
            } else {
                info!("text line from {peer}: {command:?}");
            }
            text_time_reply()
        }
    }
}
