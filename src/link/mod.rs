//! Half-duplex link control.
//!
//! Everything the node needs to share one transceiver between incoming
//! packets and user-requested transmissions: the interrupt latch, the
//! driver abstraction, outcome classification, diagnostics, and the
//! dispatch loop itself.

pub mod classify;
pub mod event;
pub mod node;
pub mod radio;
pub mod radio_mock;
pub mod sink;

// Re-export the types callers wire together
pub use classify::{classify_read, classify_setup, classify_transmit, Outcome, RxFault, TxFault};
pub use event::{Event, EventLatch};
pub use node::{LinkStats, LoraNode, RadioMode};
pub use radio::{RadioConfig, RadioDriver, ReceivedPacket};
pub use radio_mock::{MockRadio, SetupCall};
pub use sink::{DiagnosticSink, LogSink, MemorySink};
