//! Radio and control-loop constants.
//!
//! Defaults describe a point-to-point LoRa link on a single fixed channel.
//! The framing parameters (coding rate, sync word, preamble, explicit
//! header, 2-byte CRC) follow the LoRaWAN-compatible settings the node was
//! deployed with; frequency, bandwidth and spreading factor are per-channel
//! choices surfaced through [`RadioConfig`](crate::link::RadioConfig).

use std::time::Duration;

/// Default carrier frequency in Hz (US 915 MHz band, single channel).
pub const DEFAULT_FREQUENCY_HZ: u32 = 915_000_000;

/// Default channel bandwidth in Hz.
pub const DEFAULT_BANDWIDTH_HZ: u32 = 125_000;

/// Default spreading factor (SF7: shortest airtime at full sensitivity).
pub const DEFAULT_SPREADING_FACTOR: u8 = 7;

/// Default coding rate denominator (5 selects CR 4/5).
pub const DEFAULT_CODING_RATE: u8 = 5;

/// Default sync word (0x34, the public LoRaWAN sync word).
pub const DEFAULT_SYNC_WORD: u8 = 0x34;

/// Default TX output power in dBm.
pub const DEFAULT_OUTPUT_POWER_DBM: i8 = 0;

/// Default preamble length in symbols.
pub const DEFAULT_PREAMBLE_SYMBOLS: u16 = 8;

/// PA over-current protection limit in mA (the SX126x maximum).
pub const PA_CURRENT_LIMIT_MA: f32 = 140.0;

/// Width of the CRC field the modem appends, in bytes.
pub const CRC_LENGTH_BYTES: u8 = 2;

/// Largest payload the modem FIFO accepts, in bytes.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Payload sent on a transmit request until the caller supplies another.
pub const DEFAULT_TX_PAYLOAD: &[u8] = b"CS433 - Hello World!";

/// Interval between housekeeping passes of the dispatch loop.
pub const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(1);

/// How long the dispatch loop yields when an iteration consumed nothing.
pub const POLL_IDLE_SLEEP: Duration = Duration::from_millis(1);
