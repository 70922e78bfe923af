//! # Hex Formatting Utilities
//!
//! Helpers for rendering payload bytes in log output. Encoding goes
//! through the `hex` crate; the compact form matches the spaced uppercase
//! dump shown next to every received packet.

/// Encode bytes to lowercase hex string.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Format hex data for compact display (useful for logs).
///
/// Formats data as "48 65 6C 6C" with spaces between bytes.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
