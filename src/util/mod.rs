//! # Utility Modules
//!
//! Common helpers used throughout the crate, currently hex formatting for
//! payload dumps in diagnostics.

pub mod hex;

// Re-export commonly used functions
pub use hex::{encode_hex, format_hex_compact};
