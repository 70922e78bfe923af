//! # lora-node-rs - Interrupt-Driven Half-Duplex LoRa Node Control
//!
//! The lora-node-rs crate coordinates a single half-duplex LoRa
//! transceiver between two interrupt-driven events, packet arrival and
//! user-requested transmission, without threads and without blocking in
//! interrupt context. Interrupt handlers raise flags on an
//! [`EventLatch`]; a cooperative dispatch loop consumes them one at a
//! time, always sampling the receive side first, and re-arms continuous
//! reception after every read and every transmit.
//!
//! ## Features
//!
//! - Lossless interrupt-to-loop signaling over atomic single-bit latches
//! - A two-mode radio state machine that never strands the receiver
//! - Outcome classification separating per-packet faults from fatal
//!   bring-up and re-arm failures
//! - A typed terminal halted state that tests can inspect
//! - Pluggable radio driver and diagnostic sink, with a scripted mock
//!   radio and an in-memory sink included
//! - Link statistics with periodic housekeeping reports
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use lora_node_rs::{Event, EventLatch, LoraNode, MemorySink, MockRadio, RadioConfig};
//!
//! let radio = MockRadio::new();
//! radio.queue_packet(b"Hello World!");
//! radio.set_rssi(-42.0);
//!
//! let latch = Arc::new(EventLatch::new());
//! let sink = MemorySink::new();
//! let mut node = LoraNode::new(radio, sink.clone(), Arc::clone(&latch), RadioConfig::default());
//! node.start().expect("radio bring-up");
//!
//! // Interrupt context: raise the flag, nothing else
//! latch.signal(Event::PacketReady);
//!
//! // Main loop: consume and process
//! node.poll_once();
//! assert_eq!(node.stats().packets_received, 1);
//! assert!(sink.contains("Hello World!"));
//! ```

use std::sync::Arc;

pub mod constants;
pub mod error;
pub mod link;
pub mod logging;
pub mod util;

pub use crate::error::{FatalError, RadioError, SetupStep};
pub use crate::logging::{init_logger, log_debug, log_error, log_info, log_warn};

// Core link types
pub use link::{
    DiagnosticSink, Event, EventLatch, LinkStats, LogSink, LoraNode, MemorySink, MockRadio,
    Outcome, RadioConfig, RadioDriver, RadioMode, ReceivedPacket, RxFault, TxFault,
};

/// Brings up the radio and drives the dispatch loop until a fatal error
/// halts it.
///
/// Convenience wrapper over [`LoraNode::new`] and
/// [`LoraNode::run_until_halt`] for firmware-style entry points that own
/// the whole process. Returns the fatal error once the node halts; it
/// does not return while the link is healthy.
pub fn run_node<R: RadioDriver, S: DiagnosticSink>(
    radio: R,
    sink: S,
    latch: Arc<EventLatch>,
    config: RadioConfig,
) -> FatalError {
    let mut node = LoraNode::new(radio, sink, latch, config);
    node.run_until_halt()
}
