//! Telegram building and parsing with checksum verification.

use thiserror::Error;

use super::types::{END, FRAME_OVERHEAD, Frame, HEADER_SIZE, MAX_PAYLOAD, START};

/// Telegram codec failures. All decode errors are recoverable; callers
/// fall back to text handling or log and continue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame too short: {len} bytes")]
    TooShort { len: usize },

    #[error("invalid start bytes")]
    BadStart,

    #[error("length bytes mismatch ({first} != {second})")]
    LengthMismatch { first: u8, second: u8 },

    #[error("frame length {actual} != expected {expected}")]
    SizeMismatch { actual: usize, expected: usize },

    #[error("checksum mismatch (got 0x{got:02X}, want 0x{want:02X})")]
    ChecksumMismatch { got: u8, want: u8 },

    #[error("invalid end byte")]
    BadEnd,

    #[error("payload too long: {len} bytes")]
    PayloadTooLong { len: usize },
}

/// Arithmetic checksum over control, address and payload, modulo 256.
pub(crate) fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Serialize a telegram: `START L L START control address payload.. CS END`
/// with `L = 2 + payload.len()`.
///
/// Succeeds for every payload up to [`MAX_PAYLOAD`] bytes; longer payloads
/// would overflow the length byte and are rejected.
pub fn encode(payload: &[u8], control: u8, address: u8) -> Result<Vec<u8>, FrameError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLong { len: payload.len() });
    }
    let len = (2 + payload.len()) as u8;

    let mut frame = Vec::with_capacity(len as usize + FRAME_OVERHEAD);
    frame.push(START);
    frame.push(len);
    frame.push(len);
    frame.push(START);
    frame.push(control);
    frame.push(address);
    frame.extend_from_slice(payload);
    frame.push(checksum(&frame[HEADER_SIZE..]));
    frame.push(END);
    Ok(frame)
}

/// Parse one complete telegram. Total over any byte slice and
/// all-or-nothing: the first failing check determines the error.
pub fn decode(buf: &[u8]) -> Result<Frame, FrameError> {
    if buf.len() < FRAME_OVERHEAD {
        return Err(FrameError::TooShort { len: buf.len() });
    }
    if buf[0] != START || buf[3] != START {
        return Err(FrameError::BadStart);
    }
    let (first, second) = (buf[1], buf[2]);
    if first != second {
        return Err(FrameError::LengthMismatch { first, second });
    }
    let len = first as usize;
    let expected = len + FRAME_OVERHEAD;
    if buf.len() != expected {
        return Err(FrameError::SizeMismatch {
            actual: buf.len(),
            expected,
        });
    }
    let body = &buf[HEADER_SIZE..HEADER_SIZE + len];
    let sent = buf[HEADER_SIZE + len];
    let calc = checksum(body);
    if sent != calc {
        return Err(FrameError::ChecksumMismatch {
            got: sent,
            want: calc,
        });
    }
    if buf[expected - 1] != END {
        return Err(FrameError::BadEnd);
    }

    // A length byte below 2 cannot carry control + address; the slice is
    // empty rather than underflowing.
    let payload = if len >= 2 {
        buf[HEADER_SIZE + 2..HEADER_SIZE + len].to_vec()
    } else {
        Vec::new()
    };
    Ok(Frame {
        control: buf[4],
        address: buf[5],
        payload,
    })
}
