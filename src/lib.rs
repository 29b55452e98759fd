pub mod client;
pub mod config;
pub mod emulator;
pub mod error;
pub mod ft12;
pub mod logging;
pub mod schedule;

pub use error::{AppError, Result};
