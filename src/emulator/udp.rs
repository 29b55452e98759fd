//! Stateless per-datagram UDP handling.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{info, warn};

use super::responses::{framed_time_reply, text_time_reply};
use crate::error::Result;
use crate::ft12::{self, START};

/// Answer datagrams forever. Each one is an independent unit; no state
/// is shared between them.
pub async fn serve_udp(socket: UdpSocket) -> Result<()> {
    let mut buf = vec![0u8; 8192];
    loop {
        let (n, peer) = socket.recv_from(&mut buf).await?;
        let datagram = &buf[..n];
        info!("UDP received from {peer}: {:02X?}", datagram);
        let reply = reply_for(datagram, peer);
        socket.send_to(&reply, peer).await?;
        info!("UDP sent to {peer}: {:02X?}", reply);
    }
}

fn reply_for(datagram: &[u8], peer: SocketAddr) -> Vec<u8> {
    if datagram.first() == Some(&START) && datagram.len() >= 6 {
        match ft12::decode(datagram) {
            Ok(frame) => {
                info!(
                    "parsed request from {peer}: control=0x{:02X} addr=0x{:02X} payload={:?}",
                    frame.control,
                    frame.address,
                    frame.payload_text(),
                );
                return framed_time_reply(frame.address);
            }
            Err(e) => {
                warn!("frame parse failed ({peer}): {e}; fallback to text");
                return text_time_reply();
            }
        }
    }

    let text = String::from_utf8_lossy(datagram);
    let command = text.trim();
    if command.eq_ignore_ascii_case("GETTIME") {
        info!("UDP text command from {peer}: {command:?}");
    } else {
        info!("UDP text from {peer}: {command:?}");
    }
    text_time_reply()
}
