//! # Radio Error Handling
//!
//! This module defines the error types of the crate: [`RadioError`], the
//! per-operation failure tags a transceiver driver reports (a successful
//! call simply returns `Ok`), and [`FatalError`], the terminal outcome
//! that halts the dispatch loop when the radio cannot be brought into, or
//! back into, a usable listening state.

use std::fmt;
use thiserror::Error;

/// Failure tags reported by the radio driver for a single operation.
///
/// Covers the conditions a sub-GHz transceiver surfaces in normal use:
/// receive window expiry, payload corruption, an oversized transmit
/// buffer, a stalled transmission, and a catch-all carrying the driver's
/// raw status code.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// No packet arrived within the receive window.
    #[error("RX timeout")]
    RxTimeout,

    /// A packet arrived but failed the modem CRC check.
    #[error("CRC mismatch")]
    CrcMismatch,

    /// The outgoing payload exceeds the modem's maximum packet length.
    #[error("packet too long")]
    PacketTooLong,

    /// The transmission did not complete within the hardware window.
    #[error("TX timeout")]
    TxTimeout,

    /// Any other driver status, carried as the raw code.
    #[error("driver status code {0}")]
    Other(i16),
}

impl RadioError {
    /// Raw driver status code, following the conventional negative codes
    /// of SX126x driver libraries.
    pub fn code(self) -> i16 {
        match self {
            RadioError::PacketTooLong => -4,
            RadioError::TxTimeout => -5,
            RadioError::RxTimeout => -6,
            RadioError::CrcMismatch => -7,
            RadioError::Other(code) => code,
        }
    }
}

/// The one-time setup and re-arm calls, named so a fatal diagnostic can
/// say exactly which step died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    /// Base modem configuration (frequency, bandwidth, SF, framing).
    Configure,
    /// PA over-current protection limit.
    CurrentLimit,
    /// Routing RF switch control to the modem.
    RfSwitchMode,
    /// Explicit (variable-length) header mode.
    ExplicitHeader,
    /// CRC field width.
    CrcLength,
    /// First arming of continuous reception at boot.
    InitialReceive,
    /// Re-arming reception after a read or a transmit.
    ResumeReceive,
}

impl SetupStep {
    /// Human-readable step name used in fatal diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            SetupStep::Configure => "radio initialization",
            SetupStep::CurrentLimit => "current limit initialization",
            SetupStep::RfSwitchMode => "RF switch initialization",
            SetupStep::ExplicitHeader => "explicit header initialization",
            SetupStep::CrcLength => "CRC initialization",
            SetupStep::InitialReceive => "starting reception",
            SetupStep::ResumeReceive => "resuming reception",
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Terminal failure: the radio cannot be brought into (or back into) a
/// usable listening state, so the dispatch loop halts permanently.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{step} failed: {source}")]
pub struct FatalError {
    /// The setup or re-arm step that failed.
    pub step: SetupStep,
    /// The driver failure behind it.
    pub source: RadioError,
}
