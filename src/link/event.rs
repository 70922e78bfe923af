//! Interrupt-to-loop event signaling.
//!
//! Two independent single-bit latches connect the interrupt sources to
//! the dispatch loop: one for "a packet finished arriving", one for "the
//! user requested a transmission". Each flag has exactly one writer (its
//! interrupt handler) and one reader (the loop). [`EventLatch::signal`]
//! is a single atomic store and nothing else, because interrupt context
//! must not log, allocate, or touch the radio; [`EventLatch::consume`] is
//! a single atomic swap, so a flag raised between read and clear cannot
//! be lost.

use std::sync::atomic::{AtomicBool, Ordering};

/// The interrupt-driven event sources the node reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// The modem latched a complete incoming packet (or a failed
    /// reception that still raised the done interrupt).
    PacketReady,
    /// The user input edge requested a transmission.
    TransmitRequested,
}

/// One latch per event source.
///
/// Shared with interrupt handlers as `Arc<EventLatch>`; the dispatch
/// loop holds its own handle and is the only clearer.
#[derive(Debug, Default)]
pub struct EventLatch {
    packet_ready: AtomicBool,
    transmit_requested: AtomicBool,
}

impl EventLatch {
    /// Creates a latch with both flags clear.
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, event: Event) -> &AtomicBool {
        match event {
            Event::PacketReady => &self.packet_ready,
            Event::TransmitRequested => &self.transmit_requested,
        }
    }

    /// Marks an event pending. Interrupt-context safe.
    ///
    /// Signaling an already-pending event leaves it pending; multiple
    /// firings before the next [`consume`](Self::consume) coalesce into
    /// one.
    pub fn signal(&self, event: Event) {
        self.flag(event).store(true, Ordering::Release);
    }

    /// Atomically reads and clears a flag, returning whether it was set.
    ///
    /// Loop-side only. Consuming a clear flag returns `false` and has no
    /// effect.
    pub fn consume(&self, event: Event) -> bool {
        self.flag(event).swap(false, Ordering::AcqRel)
    }

    /// Non-destructive view of a flag, for diagnostics.
    pub fn is_pending(&self, event: Event) -> bool {
        self.flag(event).load(Ordering::Acquire)
    }
}
