//! FT1.2-style telegram protocol engine.
//!
//! Implements the fixed-layout binary telegram spoken by K-104 time-sync
//! adapters, plus stream reassembly for arbitrarily-chunked TCP input.

mod codec;
mod reassembly;
mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use codec::{FrameError, decode, encode};
pub use reassembly::{Reassembler, Unit};
pub use types::{
    CONTROL_REQUEST, CONTROL_RESPONSE, DEFAULT_ADDRESS, END, Frame, MAX_PAYLOAD, START,
};

pub(crate) use types::HEADER_SIZE;
