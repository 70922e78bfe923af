//! Radio driver abstraction.
//!
//! The node never talks to hardware directly; it drives a
//! [`RadioDriver`], which owns the register-level details while the node
//! owns the sequencing. Production builds wire in a real SX126x-class
//! driver; tests and demos use [`MockRadio`](crate::link::MockRadio).

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BANDWIDTH_HZ, DEFAULT_CODING_RATE, DEFAULT_FREQUENCY_HZ, DEFAULT_OUTPUT_POWER_DBM,
    DEFAULT_PREAMBLE_SYMBOLS, DEFAULT_SPREADING_FACTOR, DEFAULT_SYNC_WORD,
};
use crate::error::RadioError;

/// Modem parameters applied once at boot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// Carrier frequency in Hz.
    pub frequency_hz: u32,
    /// Channel bandwidth in Hz.
    pub bandwidth_hz: u32,
    /// LoRa spreading factor (7..=12).
    pub spreading_factor: u8,
    /// Coding rate denominator (5 selects CR 4/5).
    pub coding_rate: u8,
    /// Sync word; 0x34 is the public LoRaWAN word.
    pub sync_word: u8,
    /// TX output power in dBm.
    pub output_power_dbm: i8,
    /// Preamble length in symbols.
    pub preamble_symbols: u16,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            bandwidth_hz: DEFAULT_BANDWIDTH_HZ,
            spreading_factor: DEFAULT_SPREADING_FACTOR,
            coding_rate: DEFAULT_CODING_RATE,
            sync_word: DEFAULT_SYNC_WORD,
            output_power_dbm: DEFAULT_OUTPUT_POWER_DBM,
            preamble_symbols: DEFAULT_PREAMBLE_SYMBOLS,
        }
    }
}

/// A packet delivered by the modem, with the signal strength it arrived
/// at.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedPacket {
    /// Raw payload bytes (header and CRC already stripped by the modem).
    pub payload: Vec<u8>,
    /// RSSI of the reception in dBm.
    pub rssi_dbm: f32,
}

/// Interface to the physical transceiver.
///
/// All calls are synchronous and must only ever be made from the
/// dispatch loop: the hardware is half-duplex, cannot service two
/// operations at once, and the driver is not reentrant.
pub trait RadioDriver {
    /// One-time modem configuration.
    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError>;

    /// Sets the PA over-current protection limit in mA.
    fn set_current_limit(&mut self, limit_ma: f32) -> Result<(), RadioError>;

    /// Hands RF switch control (DIO2 on SX126x parts) to the modem.
    fn set_rf_switch_mode(&mut self, enabled: bool) -> Result<(), RadioError>;

    /// Selects explicit (variable-length) header mode.
    fn set_explicit_header(&mut self) -> Result<(), RadioError>;

    /// Sets the width of the CRC field in bytes.
    fn set_crc_length(&mut self, bytes: u8) -> Result<(), RadioError>;

    /// Arms continuous reception. Called once at boot and again after
    /// every read and every transmit; the receiver must never be left
    /// idle.
    fn start_receive(&mut self) -> Result<(), RadioError>;

    /// Fetches the payload behind the most recent receive interrupt.
    /// Drops the modem out of receive mode until the next
    /// [`start_receive`](Self::start_receive).
    fn read_data(&mut self) -> Result<Vec<u8>, RadioError>;

    /// Transmits a payload, blocking until it is on the air or the
    /// hardware window expires. Leaves the modem out of receive mode
    /// either way.
    fn transmit(&mut self, payload: &[u8]) -> Result<(), RadioError>;

    /// RSSI of the most recently received packet, in dBm.
    fn signal_strength_dbm(&mut self) -> f32;
}
