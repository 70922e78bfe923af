//! Integration tests for the dispatch loop against the scripted radio.
//!
//! Each test wires a [`LoraNode`] to a [`MockRadio`] and a
//! [`MemorySink`], raises flags the way the interrupt handlers would,
//! and asserts on driver call order, diagnostics, statistics, and the
//! terminal halted state.

use std::sync::Arc;

use lora_node_rs::link::radio_mock::SetupCall;
use lora_node_rs::{
    run_node, Event, EventLatch, LoraNode, MemorySink, MockRadio, RadioConfig, RadioError,
    RadioMode, SetupStep,
};

const SETUP_CALLS: [&str; 6] = [
    "configure",
    "set_current_limit",
    "set_rf_switch_mode",
    "set_explicit_header",
    "set_crc_length",
    "start_receive",
];

fn fresh_node() -> (MockRadio, MemorySink, LoraNode<MockRadio, MemorySink>) {
    let mock = MockRadio::new();
    let sink = MemorySink::new();
    let latch = Arc::new(EventLatch::new());
    let node = LoraNode::new(mock.clone(), sink.clone(), latch, RadioConfig::default());
    (mock, sink, node)
}

fn started_node() -> (MockRadio, MemorySink, LoraNode<MockRadio, MemorySink>) {
    let (mock, sink, mut node) = fresh_node();
    node.start().expect("radio bring-up");
    (mock, sink, node)
}

/// Bring-up runs the full setup sequence in order and arms reception.
#[test]
fn test_bring_up_sequence() {
    let (mock, sink, mut node) = fresh_node();

    node.start().unwrap();

    assert_eq!(mock.call_log(), SETUP_CALLS.to_vec());
    assert_eq!(mock.last_config(), Some(RadioConfig::default()));
    assert!(mock.is_receiving());
    assert_eq!(node.mode(), RadioMode::Listening);
    assert!(!node.is_halted());
    assert!(sink.contains("Initializing radio"));
    assert!(sink.contains("receiver armed"));
}

/// A failure in any one-time setup step is fatal: the sequence stops at
/// the failing call, the step is named in the diagnostic, and the node
/// refuses all further work.
#[test]
fn test_setup_failure_halts_at_failing_step() {
    let (mock, sink, mut node) = fresh_node();
    mock.fail_setup(SetupCall::CrcLength, RadioError::Other(-2));

    let fatal = node.start().unwrap_err();
    assert_eq!(fatal.step, SetupStep::CrcLength);
    assert_eq!(fatal.source, RadioError::Other(-2));

    // nothing after the failing call
    assert_eq!(mock.call_log(), &SETUP_CALLS[..5]);
    assert!(node.is_halted());
    assert!(sink.contains("ERROR!!!"));
    assert!(sink.contains("CRC initialization failed"));
    assert!(sink.contains("with error code -2"));

    // a halted node is inert
    let calls_before = mock.call_log().len();
    let lines_before = sink.len();
    node.latch().signal(Event::PacketReady);
    assert!(!node.poll_once());
    assert_eq!(mock.call_log().len(), calls_before);
    assert_eq!(sink.len(), lines_before);
}

/// Packet arrival: read, emit payload text, hex dump and RSSI, then
/// re-arm before the iteration ends.
#[test]
fn test_packet_delivery() {
    let (mock, sink, mut node) = started_node();
    mock.queue_packet(b"Hello World!");
    mock.set_rssi(-42.0);

    node.latch().signal(Event::PacketReady);
    assert!(node.poll_once());

    assert!(sink.contains("Received packet! Data: Hello World!"));
    assert!(sink.contains("48 65 6C 6C 6F"));
    assert!(sink.contains("RSSI: -42.0 dBm"));
    assert_eq!(node.stats().packets_received, 1);

    // initial arm plus the forced re-arm
    assert_eq!(mock.start_receive_count(), 2);
    assert!(mock.is_receiving());
    assert!(!node.latch().is_pending(Event::PacketReady));
}

/// An RX timeout is a recoverable outcome: logged as a timeout, counted,
/// and followed by a re-arm.
#[test]
fn test_rx_timeout_is_recoverable() {
    let (mock, sink, mut node) = started_node();
    mock.queue_read_error(RadioError::RxTimeout);

    node.latch().signal(Event::PacketReady);
    assert!(node.poll_once());

    assert!(sink.contains("timeout"));
    assert!(!sink.contains("Received packet!"));
    assert_eq!(node.stats().rx_timeouts, 1);
    assert!(!node.is_halted());
    assert!(mock.is_receiving());
}

/// A CRC mismatch discards the payload but keeps the loop alive.
#[test]
fn test_rx_crc_error_is_recoverable() {
    let (mock, sink, mut node) = started_node();
    mock.queue_read_error(RadioError::CrcMismatch);

    node.latch().signal(Event::PacketReady);
    assert!(node.poll_once());

    assert!(sink.contains("CRC error"));
    assert_eq!(node.stats().crc_errors, 1);
    assert!(!node.is_halted());
    assert!(mock.is_receiving());
}

/// Unrecognized read failures surface the raw driver code.
#[test]
fn test_rx_other_error_logs_raw_code() {
    let (mock, sink, mut node) = started_node();
    mock.queue_read_error(RadioError::Other(-707));

    node.latch().signal(Event::PacketReady);
    assert!(node.poll_once());

    assert!(sink.contains("Receive failed, code -707"));
    assert_eq!(node.stats().rx_other_errors, 1);
    assert!(!node.is_halted());
}

/// A transmit request sends the pending payload and returns to
/// listening with the receiver re-armed.
#[test]
fn test_transmit_request() {
    let (mock, sink, mut node) = started_node();

    node.latch().signal(Event::TransmitRequested);
    assert!(node.poll_once());

    assert_eq!(mock.transmitted(), vec![b"CS433 - Hello World!".to_vec()]);
    assert!(sink.contains("Transmitting 20 bytes"));
    assert!(sink.contains("Transmit complete"));
    assert_eq!(node.stats().packets_transmitted, 1);
    assert_eq!(node.mode(), RadioMode::Listening);
    assert_eq!(mock.start_receive_count(), 2);
    assert!(mock.is_receiving());
}

/// The pending payload is caller-replaceable and reused across requests.
#[test]
fn test_pending_payload_is_replaceable_and_reused() {
    let (mock, _sink, mut node) = started_node();
    node.set_pending_payload(b"beacon".to_vec());

    node.latch().signal(Event::TransmitRequested);
    assert!(node.poll_once());
    node.latch().signal(Event::TransmitRequested);
    assert!(node.poll_once());

    assert_eq!(
        mock.transmitted(),
        vec![b"beacon".to_vec(), b"beacon".to_vec()]
    );
    assert_eq!(node.pending_payload(), b"beacon");
}

/// An oversized payload fails recoverably; the loop keeps serving
/// events afterwards.
#[test]
fn test_oversized_transmit_is_recoverable() {
    let (mock, sink, mut node) = started_node();
    node.set_pending_payload(vec![0xAA; 300]);

    node.latch().signal(Event::TransmitRequested);
    assert!(node.poll_once());

    assert!(sink.contains("Transmit failed: packet too long"));
    assert!(mock.transmitted().is_empty());
    assert_eq!(node.stats().tx_failures, 1);
    assert!(!node.is_halted());
    assert_eq!(node.mode(), RadioMode::Listening);
    assert!(mock.is_receiving());

    // still alive: a later reception goes through
    mock.queue_packet(b"still here");
    node.latch().signal(Event::PacketReady);
    assert!(node.poll_once());
    assert_eq!(node.stats().packets_received, 1);
}

/// A receive flag raised while the PA is keyed is a phantom: it is
/// cleared without a read and never processed against stale state.
#[test]
fn test_stale_receive_flag_discarded_after_transmit() {
    let (mock, sink, mut node) = started_node();
    mock.signal_on_transmit(node.latch(), Event::PacketReady);

    node.latch().signal(Event::TransmitRequested);
    assert!(node.poll_once());

    assert_eq!(node.stats().stale_rx_flags, 1);
    assert!(!node.latch().is_pending(Event::PacketReady));
    assert!(!mock.call_log().contains(&"read_data"));
    assert!(!sink.contains("Received packet!"));
    assert_eq!(node.stats().packets_received, 0);
}

/// With both flags pending, the receive side is always served first.
#[test]
fn test_receive_served_before_transmit() {
    let (mock, _sink, mut node) = started_node();
    mock.queue_packet(b"first");

    node.latch().signal(Event::TransmitRequested);
    node.latch().signal(Event::PacketReady);
    assert!(node.poll_once());

    let calls = mock.call_log();
    let read_at = calls.iter().position(|c| *c == "read_data").unwrap();
    let tx_at = calls.iter().position(|c| *c == "transmit").unwrap();
    assert!(read_at < tx_at);

    // one re-arm per handled event, on top of the initial arm
    assert_eq!(mock.start_receive_count(), 3);
    assert_eq!(node.stats().packets_received, 1);
    assert_eq!(node.stats().packets_transmitted, 1);
}

/// An empty iteration consumes nothing and touches no hardware.
#[test]
fn test_idle_poll_is_a_no_op() {
    let (mock, _sink, mut node) = started_node();
    let calls_before = mock.call_log().len();

    assert!(!node.poll_once());
    assert_eq!(mock.call_log().len(), calls_before);
}

/// A re-arm failure after a read halts the node permanently; nothing is
/// logged and no driver call is made afterwards.
#[test]
fn test_rearm_failure_after_read_is_fatal() {
    let (mock, sink, mut node) = started_node();
    mock.queue_packet(b"hi");
    mock.fail_start_receive_nth(1, RadioError::Other(-1));

    node.latch().signal(Event::PacketReady);
    assert!(node.poll_once());

    assert!(node.is_halted());
    let fatal = node.fatal_error().unwrap();
    assert_eq!(fatal.step, SetupStep::ResumeReceive);
    assert_eq!(fatal.source, RadioError::Other(-1));
    assert!(sink.contains("ERROR!!!"));
    assert!(sink.contains("resuming reception failed"));
    assert!(sink.contains("with error code -1"));

    let lines_before = sink.len();
    let calls_before = mock.call_log().len();
    node.latch().signal(Event::PacketReady);
    node.latch().signal(Event::TransmitRequested);
    assert!(!node.poll_once());
    assert_eq!(sink.len(), lines_before);
    assert_eq!(mock.call_log().len(), calls_before);
}

/// A re-arm failure after a transmit is just as fatal.
#[test]
fn test_rearm_failure_after_transmit_is_fatal() {
    let (mock, _sink, mut node) = started_node();
    mock.fail_start_receive_nth(1, RadioError::Other(-2));

    node.latch().signal(Event::TransmitRequested);
    assert!(node.poll_once());

    assert!(node.is_halted());
    assert_eq!(node.fatal_error().unwrap().step, SetupStep::ResumeReceive);
    // the transmit itself still went out
    assert_eq!(node.stats().packets_transmitted, 1);
}

/// `run_until_halt` drives the loop through events and hands back the
/// fatal error once the node dies.
#[test]
fn test_run_until_halt_returns_the_fatal_error() {
    let (mock, _sink, mut node) = fresh_node();
    mock.queue_read_error(RadioError::RxTimeout);
    mock.fail_start_receive_nth(1, RadioError::Other(-3));
    node.latch().signal(Event::PacketReady);

    let fatal = node.run_until_halt();
    assert_eq!(fatal.step, SetupStep::ResumeReceive);
    assert_eq!(fatal.source, RadioError::Other(-3));
    assert_eq!(node.fatal_error(), Some(fatal));
}

/// The `run_node` entry point surfaces bring-up failures directly.
#[test]
fn test_run_node_surfaces_setup_failure() {
    let mock = MockRadio::new();
    mock.fail_setup(SetupCall::Configure, RadioError::Other(-2));
    let sink = MemorySink::new();
    let latch = Arc::new(EventLatch::new());

    let fatal = run_node(mock, sink.clone(), latch, RadioConfig::default());
    assert_eq!(fatal.step, SetupStep::Configure);
    assert!(sink.contains("radio initialization failed"));
}
