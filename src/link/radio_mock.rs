//! Scripted radio driver for tests and demos.
//!
//! Fails the way real drivers fail: any one-time setup call can be
//! primed to return an error, `read_data` outcomes are served from a
//! script queue, oversized transmits hit the same length check the
//! hardware applies, and a receive interrupt can be made to fire while
//! the PA is keyed (the race the dispatch loop must discard).

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::constants::MAX_PAYLOAD_LEN;
use crate::error::RadioError;
use crate::link::event::{Event, EventLatch};
use crate::link::radio::{RadioConfig, RadioDriver};

/// One-time setup calls that can be primed to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupCall {
    Configure,
    CurrentLimit,
    RfSwitchMode,
    ExplicitHeader,
    CrcLength,
}

#[derive(Default)]
struct MockRadioState {
    read_script: VecDeque<Result<Vec<u8>, RadioError>>,
    transmit_script: VecDeque<Result<(), RadioError>>,
    setup_failures: HashMap<SetupCall, RadioError>,
    receive_failures: HashMap<u64, RadioError>,
    start_receive_calls: u64,
    transmitted: Vec<Vec<u8>>,
    calls: Vec<&'static str>,
    rssi_dbm: f32,
    config: Option<RadioConfig>,
    receiving: bool,
    signal_on_transmit: Option<(Arc<EventLatch>, Event)>,
}

/// Shared-state mock transceiver.
///
/// Clones share one state, so a test can keep a handle for scripting and
/// assertions while the node owns another.
#[derive(Clone, Default)]
pub struct MockRadio {
    state: Arc<Mutex<MockRadioState>>,
}

impl MockRadio {
    /// Creates an idle mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reception delivering `payload`.
    pub fn queue_packet(&self, payload: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .read_script
            .push_back(Ok(payload.to_vec()));
    }

    /// Queues a failed reception.
    pub fn queue_read_error(&self, err: RadioError) {
        self.state.lock().unwrap().read_script.push_back(Err(err));
    }

    /// Queues a failed transmission (unscripted transmits succeed).
    pub fn queue_transmit_error(&self, err: RadioError) {
        self.state
            .lock()
            .unwrap()
            .transmit_script
            .push_back(Err(err));
    }

    /// Primes one setup call to fail once.
    pub fn fail_setup(&self, call: SetupCall, err: RadioError) {
        self.state.lock().unwrap().setup_failures.insert(call, err);
    }

    /// Primes the `nth` `start_receive` call (0 = the initial arm at
    /// boot) to fail.
    pub fn fail_start_receive_nth(&self, nth: u64, err: RadioError) {
        self.state.lock().unwrap().receive_failures.insert(nth, err);
    }

    /// Primes the next `start_receive` call to fail.
    pub fn fail_next_start_receive(&self, err: RadioError) {
        let mut state = self.state.lock().unwrap();
        let next = state.start_receive_calls;
        state.receive_failures.insert(next, err);
    }

    /// Raises `event` on `latch` in the middle of every transmit,
    /// mimicking an interrupt that fires while the PA is keyed.
    pub fn signal_on_transmit(&self, latch: Arc<EventLatch>, event: Event) {
        self.state.lock().unwrap().signal_on_transmit = Some((latch, event));
    }

    /// Sets the RSSI reported for received packets.
    pub fn set_rssi(&self, rssi_dbm: f32) {
        self.state.lock().unwrap().rssi_dbm = rssi_dbm;
    }

    /// Payloads that made it onto the air, in order.
    pub fn transmitted(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().transmitted.clone()
    }

    /// Driver calls in the order they were made (getters excluded).
    pub fn call_log(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    /// How many times reception has been armed.
    pub fn start_receive_count(&self) -> u64 {
        self.state.lock().unwrap().start_receive_calls
    }

    /// Whether the modem is currently armed for reception.
    pub fn is_receiving(&self) -> bool {
        self.state.lock().unwrap().receiving
    }

    /// The configuration applied by `configure`, if any.
    pub fn last_config(&self) -> Option<RadioConfig> {
        self.state.lock().unwrap().config
    }

    fn setup_call(&self, name: &'static str, call: SetupCall) -> Result<(), RadioError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(name);
        match state.setup_failures.remove(&call) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl RadioDriver for MockRadio {
    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("configure");
        if let Some(err) = state.setup_failures.remove(&SetupCall::Configure) {
            return Err(err);
        }
        state.config = Some(*config);
        Ok(())
    }

    fn set_current_limit(&mut self, _limit_ma: f32) -> Result<(), RadioError> {
        self.setup_call("set_current_limit", SetupCall::CurrentLimit)
    }

    fn set_rf_switch_mode(&mut self, _enabled: bool) -> Result<(), RadioError> {
        self.setup_call("set_rf_switch_mode", SetupCall::RfSwitchMode)
    }

    fn set_explicit_header(&mut self) -> Result<(), RadioError> {
        self.setup_call("set_explicit_header", SetupCall::ExplicitHeader)
    }

    fn set_crc_length(&mut self, _bytes: u8) -> Result<(), RadioError> {
        self.setup_call("set_crc_length", SetupCall::CrcLength)
    }

    fn start_receive(&mut self) -> Result<(), RadioError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("start_receive");
        let nth = state.start_receive_calls;
        state.start_receive_calls += 1;
        // a failed arm leaves the receiver idle
        state.receiving = false;
        if let Some(err) = state.receive_failures.remove(&nth) {
            return Err(err);
        }
        state.receiving = true;
        Ok(())
    }

    fn read_data(&mut self) -> Result<Vec<u8>, RadioError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("read_data");
        // A completed read needs a fresh arm, success or not
        state.receiving = false;
        state
            .read_script
            .pop_front()
            .unwrap_or(Err(RadioError::RxTimeout))
    }

    fn transmit(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("transmit");
        state.receiving = false;
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(RadioError::PacketTooLong);
        }
        if let Some((latch, event)) = &state.signal_on_transmit {
            latch.signal(*event);
        }
        let result = state.transmit_script.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            state.transmitted.push(payload.to_vec());
        }
        result
    }

    fn signal_strength_dbm(&mut self) -> f32 {
        self.state.lock().unwrap().rssi_dbm
    }
}
