//! Canonical time responses.

use chrono::Local;

use crate::ft12::{CONTROL_RESPONSE, encode};

/// Timestamp rendering shared by both response forms.
fn now_text() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Plain-text reply: `TIME:<YYYY-MM-DD HH:MM:SS>` with trailing newline.
pub(super) fn text_time_reply() -> Vec<u8> {
    format!("TIME:{}\n", now_text()).into_bytes()
}

/// Framed reply carrying the same string (no newline) as payload, with
/// the requester's address echoed back.
pub(super) fn framed_time_reply(address: u8) -> Vec<u8> {
    let payload = format!("TIME:{}", now_text()).into_bytes();
    // The payload is a 24-byte timestamp, far under the length-byte cap.
    encode(&payload, CONTROL_RESPONSE, address).unwrap_or_else(|_| text_time_reply())
}
