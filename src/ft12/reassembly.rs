//! Stream reassembly: raw byte chunks in, complete protocol units out.

use bytes::BytesMut;
use tracing::warn;

use super::codec::{self, FrameError};
use super::types::{FRAME_OVERHEAD, Frame, START};

/// One complete unit extracted from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// A telegram that decoded cleanly.
    Frame(Frame),
    /// A telegram-sized extent that failed to decode. The caller decides
    /// the fallback.
    Corrupt { bytes: Vec<u8>, error: FrameError },
    /// A newline-terminated text line, terminator included.
    Line(Vec<u8>),
}

/// Accumulates arbitrarily-chunked input and extracts complete telegrams
/// or text lines, resynchronizing one byte at a time on corrupt headers.
///
/// One reassembler per connection. Bytes that do not yet form a complete
/// unit stay buffered for the next push; the buffer is deliberately
/// uncapped. Drop the reassembler when its connection closes.
#[derive(Debug)]
pub struct Reassembler {
    buf: BytesMut,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
        }
    }

    /// Append a chunk and drain every complete unit it unlocks, in
    /// arrival order. No unit spans two calls and no byte is lost or
    /// duplicated.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Unit> {
        self.buf.extend_from_slice(chunk);

        let mut units = Vec::new();
        loop {
            if self.buf.is_empty() {
                break;
            }
            if self.buf[0] == START {
                if self.buf.len() < FRAME_OVERHEAD {
                    // Header incomplete; wait for the next chunk.
                    break;
                }
                let (first, second) = (self.buf[1], self.buf[2]);
                if first != second {
                    warn!("length bytes mismatch ({first} != {second}), resync");
                    let _ = self.buf.split_to(1);
                    continue;
                }
                let expected = first as usize + FRAME_OVERHEAD;
                if self.buf.len() < expected {
                    // Frame incomplete; wait for the next chunk.
                    break;
                }
                let raw = self.buf.split_to(expected);
                match codec::decode(&raw) {
                    Ok(frame) => units.push(Unit::Frame(frame)),
                    Err(error) => units.push(Unit::Corrupt {
                        bytes: raw.to_vec(),
                        error,
                    }),
                }
            } else if let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
                let line = self.buf.split_to(idx + 1);
                units.push(Unit::Line(line.to_vec()));
            } else {
                // No newline yet; wait for the next chunk.
                break;
            }
        }
        units
    }

    /// Bytes held back waiting for more input.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
