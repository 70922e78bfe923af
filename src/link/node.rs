//! Dispatch loop and radio mode state machine.
//!
//! [`LoraNode`] owns one half-duplex transceiver exclusively and
//! arbitrates it between two interrupt-driven demands: packets arriving
//! on the air and transmissions requested by the user. Interrupt handlers
//! only raise flags on the shared [`EventLatch`]; all radio work happens
//! here, one event at a time, with the receive side sampled before the
//! transmit side in every iteration.
//!
//! Two invariants shape the code. The receiver is never left idle: every
//! read and every transmit is followed by a forced re-arm, and a re-arm
//! that fails is fatal. And no path leaves the mode machine in
//! `Transmitting` across iterations; a packet-ready flag raised while the
//! PA was keyed is a phantom and is discarded, never processed against
//! stale state.

use log::debug;
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::constants::{
    CRC_LENGTH_BYTES, DEFAULT_TX_PAYLOAD, HOUSEKEEPING_INTERVAL, PA_CURRENT_LIMIT_MA,
    POLL_IDLE_SLEEP,
};
use crate::error::{FatalError, RadioError, SetupStep};
use crate::link::classify::{self, Outcome, RxFault, TxFault};
use crate::link::event::{Event, EventLatch};
use crate::link::radio::{RadioConfig, RadioDriver, ReceivedPacket};
use crate::link::sink::DiagnosticSink;
use crate::logging::LogThrottle;
use crate::util::hex::{encode_hex, format_hex_compact};

/// Whether the transceiver is parked in receive or mid-transmission.
///
/// Exactly one mode is active at a time and the hardware mirrors it.
/// Only the dispatch loop moves between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioMode {
    /// Continuous reception armed.
    Listening,
    /// A synchronous transmit is in flight.
    Transmitting,
}

/// Counters accumulated by the dispatch loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// Packets read and delivered.
    pub packets_received: u64,
    /// Reads that ended in a CRC mismatch.
    pub crc_errors: u64,
    /// Reads that ended in an RX timeout.
    pub rx_timeouts: u64,
    /// Reads that failed with any other driver code.
    pub rx_other_errors: u64,
    /// Transmissions completed.
    pub packets_transmitted: u64,
    /// Transmit attempts that failed recoverably.
    pub tx_failures: u64,
    /// Receive flags discarded because they raced a transmit.
    pub stale_rx_flags: u64,
}

impl LinkStats {
    /// One-line summary for periodic stats logging.
    pub fn summary(&self) -> String {
        format!(
            "received={}, crc_errors={}, rx_timeouts={}, rx_other={}, transmitted={}, tx_failures={}, stale_rx_flags={}",
            self.packets_received,
            self.crc_errors,
            self.rx_timeouts,
            self.rx_other_errors,
            self.packets_transmitted,
            self.tx_failures,
            self.stale_rx_flags
        )
    }
}

/// Control loop for one half-duplex LoRa transceiver.
///
/// Generic over the radio driver and the diagnostic sink so tests can
/// substitute [`MockRadio`](crate::link::MockRadio) and
/// [`MemorySink`](crate::link::MemorySink) for the real collaborators.
pub struct LoraNode<R, S> {
    radio: R,
    sink: S,
    latch: Arc<EventLatch>,
    config: RadioConfig,
    mode: RadioMode,
    started: bool,
    pending_tx: Vec<u8>,
    stats: LinkStats,
    fatal: Option<FatalError>,
    next_housekeeping: Instant,
    timeout_throttle: LogThrottle,
}

impl<R: RadioDriver, S: DiagnosticSink> LoraNode<R, S> {
    /// Creates the node. The radio is untouched until [`start`](Self::start)
    /// runs the one-time setup sequence.
    pub fn new(radio: R, sink: S, latch: Arc<EventLatch>, config: RadioConfig) -> Self {
        Self {
            radio,
            sink,
            latch,
            config,
            mode: RadioMode::Listening,
            started: false,
            pending_tx: DEFAULT_TX_PAYLOAD.to_vec(),
            stats: LinkStats::default(),
            fatal: None,
            next_housekeeping: Instant::now() + HOUSEKEEPING_INTERVAL,
            timeout_throttle: LogThrottle::new(1000, 3),
        }
    }

    /// One-time radio bring-up: configuration, current limit, RF switch
    /// routing, framing, and the initial arm of continuous reception.
    ///
    /// On success the node is listening and ready to poll. On failure the
    /// failing step and the driver's raw code are logged and the node
    /// halts permanently.
    pub fn start(&mut self) -> Result<(), FatalError> {
        if let Some(fatal) = self.fatal {
            return Err(fatal);
        }
        if self.started {
            return Ok(());
        }

        self.sink.log("Initializing radio...");
        match self.bring_up() {
            Ok(()) => {
                self.started = true;
                self.mode = RadioMode::Listening;
                self.sink.log("Radio initialized, receiver armed");
                Ok(())
            }
            Err(fatal) => {
                self.halt(fatal);
                Err(fatal)
            }
        }
    }

    fn bring_up(&mut self) -> Result<(), FatalError> {
        let config = self.config;
        self.try_setup(SetupStep::Configure, |radio| radio.configure(&config))?;
        self.try_setup(SetupStep::CurrentLimit, |radio| {
            radio.set_current_limit(PA_CURRENT_LIMIT_MA)
        })?;
        self.try_setup(SetupStep::RfSwitchMode, |radio| {
            radio.set_rf_switch_mode(true)
        })?;
        self.try_setup(SetupStep::ExplicitHeader, |radio| {
            radio.set_explicit_header()
        })?;
        self.try_setup(SetupStep::CrcLength, |radio| {
            radio.set_crc_length(CRC_LENGTH_BYTES)
        })?;
        self.try_setup(SetupStep::InitialReceive, |radio| radio.start_receive())?;
        Ok(())
    }

    fn try_setup(
        &mut self,
        step: SetupStep,
        op: impl FnOnce(&mut R) -> Result<(), RadioError>,
    ) -> Result<(), FatalError> {
        match classify::classify_setup(step, op(&mut self.radio)) {
            Outcome::Fatal(fatal) => {
                self.sink.log(&format!(
                    "ERROR!!! {} failed with error code {}",
                    fatal.step,
                    fatal.source.code()
                ));
                Err(fatal)
            }
            _ => Ok(()),
        }
    }

    /// One pass of the dispatch loop: sample the receive flag, then the
    /// transmit flag, then run due housekeeping. Returns `true` if any
    /// event was consumed.
    ///
    /// A halted node performs no radio work and returns `false`; a node
    /// that has not been started yet behaves the same.
    pub fn poll_once(&mut self) -> bool {
        if self.fatal.is_some() || !self.started {
            return false;
        }

        let mut worked = false;

        // Receive before transmit: a packet already latched in the modem
        // FIFO beats a queued transmission.
        if self.latch.consume(Event::PacketReady) {
            worked = true;
            if let Err(fatal) = self.handle_packet_ready() {
                self.halt(fatal);
                return worked;
            }
        }

        if self.latch.consume(Event::TransmitRequested) {
            worked = true;
            if let Err(fatal) = self.handle_transmit_request() {
                self.halt(fatal);
                return worked;
            }
        }

        self.housekeeping();
        worked
    }

    /// Drives the node until a fatal error halts it, performing the
    /// one-time bring-up first if needed. Never returns while the link
    /// is healthy.
    pub fn run_until_halt(&mut self) -> FatalError {
        if !self.started {
            if let Err(fatal) = self.start() {
                return fatal;
            }
        }
        loop {
            if let Some(fatal) = self.fatal {
                return fatal;
            }
            if !self.poll_once() {
                // Keep the poll tight without pegging a host CPU
                thread::sleep(POLL_IDLE_SLEEP);
            }
        }
    }

    fn handle_packet_ready(&mut self) -> Result<(), FatalError> {
        let read = self.radio.read_data();
        match classify::classify_read(&read) {
            Outcome::Success => {
                let payload = read.unwrap_or_default();
                let packet = ReceivedPacket {
                    rssi_dbm: self.radio.signal_strength_dbm(),
                    payload,
                };
                self.stats.packets_received += 1;
                self.emit_packet(&packet);
            }
            Outcome::RecoverableRx(fault) => self.note_rx_fault(fault),
            // classify_read only produces the two arms above
            _ => {}
        }

        // The read dropped the modem out of receive mode; arm it again
        // before this iteration ends.
        self.rearm(SetupStep::ResumeReceive)
    }

    fn handle_transmit_request(&mut self) -> Result<(), FatalError> {
        self.sink
            .log(&format!("Transmitting {} bytes...", self.pending_tx.len()));
        debug!("TX payload: {}", encode_hex(&self.pending_tx));

        // The transmit owns the hardware for its whole duration.
        self.mode = RadioMode::Transmitting;
        let result = self.radio.transmit(&self.pending_tx);
        self.mode = RadioMode::Listening;

        match classify::classify_transmit(&result) {
            Outcome::Success => {
                self.stats.packets_transmitted += 1;
                self.sink.log("Transmit complete");
            }
            Outcome::RecoverableTx(fault) => self.note_tx_fault(fault),
            _ => {}
        }

        // A receive flag raised while the PA was keyed is a phantom: the
        // modem was not listening, so there is no packet behind it.
        if self.latch.consume(Event::PacketReady) {
            self.stats.stale_rx_flags += 1;
            debug!("Discarding receive flag raised during transmit");
        }

        self.rearm(SetupStep::ResumeReceive)
    }

    fn rearm(&mut self, step: SetupStep) -> Result<(), FatalError> {
        self.try_setup(step, |radio| radio.start_receive())
    }

    fn emit_packet(&mut self, packet: &ReceivedPacket) {
        self.sink.log(&format!(
            "Received packet! Data: {}",
            String::from_utf8_lossy(&packet.payload)
        ));
        self.sink
            .log(&format!("  [{}]", format_hex_compact(&packet.payload)));
        self.sink
            .log(&format!("  RSSI: {:.1} dBm", packet.rssi_dbm));
    }

    fn note_rx_fault(&mut self, fault: RxFault) {
        match fault {
            RxFault::Timeout => {
                self.stats.rx_timeouts += 1;
                // An idle channel raises these continuously
                if self.timeout_throttle.allow() {
                    self.sink.log("Receive timeout, no packet in window");
                }
            }
            RxFault::Corrupt => {
                self.stats.crc_errors += 1;
                self.sink.log("Receive CRC error, payload discarded");
            }
            RxFault::Other(code) => {
                self.stats.rx_other_errors += 1;
                self.sink.log(&format!("Receive failed, code {code}"));
            }
        }
    }

    fn note_tx_fault(&mut self, fault: TxFault) {
        self.stats.tx_failures += 1;
        match fault {
            TxFault::TooLong | TxFault::Timeout => {
                self.sink.log(&format!("Transmit failed: {}", fault.label()));
            }
            TxFault::Other(code) => {
                self.sink.log(&format!("Transmit failed, code {code}"));
            }
        }
    }

    fn housekeeping(&mut self) {
        let now = Instant::now();
        if now >= self.next_housekeeping {
            self.next_housekeeping += HOUSEKEEPING_INTERVAL;
            debug!("Link stats: {}", self.stats.summary());
        }
    }

    fn halt(&mut self, fatal: FatalError) {
        // Terminal: keep the diagnostic, refuse all further radio work
        self.fatal = Some(fatal);
    }

    /// Current mode of the state machine.
    pub fn mode(&self) -> RadioMode {
        self.mode
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Whether a fatal error has permanently stopped the node.
    pub fn is_halted(&self) -> bool {
        self.fatal.is_some()
    }

    /// The fatal error that halted the node, if any.
    pub fn fatal_error(&self) -> Option<FatalError> {
        self.fatal
    }

    /// Handle for wiring interrupt sources to this node.
    pub fn latch(&self) -> Arc<EventLatch> {
        Arc::clone(&self.latch)
    }

    /// The payload sent on the next transmit request.
    pub fn pending_payload(&self) -> &[u8] {
        &self.pending_tx
    }

    /// Replaces the payload sent on transmit requests.
    pub fn set_pending_payload(&mut self, payload: Vec<u8>) {
        self.pending_tx = payload;
    }

    /// The modem configuration this node was built with.
    pub fn config(&self) -> &RadioConfig {
        &self.config
    }
}
