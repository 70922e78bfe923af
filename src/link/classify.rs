//! Driver-outcome classification.
//!
//! Maps the result of a single driver call onto the node's recovery
//! policy. Per-packet faults (timeouts, corrupt payloads, an oversized
//! or stalled transmit) are bounded events under real RF conditions and
//! never stop the loop. A failed setup or re-arm call means the radio
//! cannot listen at all, which retrying from the loop will not fix, so
//! those classify as fatal.

use crate::error::{FatalError, RadioError, SetupStep};

/// Recovery policy for one driver outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation completed.
    Success,
    /// A receive-side fault contained within this iteration.
    RecoverableRx(RxFault),
    /// A transmit-side fault contained within this iteration.
    RecoverableTx(TxFault),
    /// The radio is unusable; the loop must halt.
    Fatal(FatalError),
}

impl Outcome {
    /// Human-readable category for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::RecoverableRx(fault) => fault.label(),
            Outcome::RecoverableTx(fault) => fault.label(),
            Outcome::Fatal(_) => "fatal",
        }
    }

    /// Whether the loop may keep running after this outcome.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Outcome::Fatal(_))
    }
}

/// Receive-side fault categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxFault {
    /// Nothing arrived within the receive window.
    Timeout,
    /// The payload failed the modem CRC check and was discarded.
    Corrupt,
    /// Any other driver code, carried raw.
    Other(i16),
}

impl RxFault {
    /// Log label for this fault.
    pub fn label(self) -> &'static str {
        match self {
            RxFault::Timeout => "timeout",
            RxFault::Corrupt => "CRC error",
            RxFault::Other(_) => "receive error",
        }
    }
}

impl From<RadioError> for RxFault {
    fn from(err: RadioError) -> Self {
        match err {
            RadioError::RxTimeout => RxFault::Timeout,
            RadioError::CrcMismatch => RxFault::Corrupt,
            other => RxFault::Other(other.code()),
        }
    }
}

/// Transmit-side fault categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxFault {
    /// The payload exceeds the modem maximum.
    TooLong,
    /// The hardware transmit window expired.
    Timeout,
    /// Any other driver code, carried raw.
    Other(i16),
}

impl TxFault {
    /// Log label for this fault.
    pub fn label(self) -> &'static str {
        match self {
            TxFault::TooLong => "packet too long",
            TxFault::Timeout => "TX timeout",
            TxFault::Other(_) => "transmit error",
        }
    }
}

impl From<RadioError> for TxFault {
    fn from(err: RadioError) -> Self {
        match err {
            RadioError::PacketTooLong => TxFault::TooLong,
            RadioError::TxTimeout => TxFault::Timeout,
            other => TxFault::Other(other.code()),
        }
    }
}

/// Classifies the outcome of a read attempt.
pub fn classify_read<T>(result: &Result<T, RadioError>) -> Outcome {
    match result {
        Ok(_) => Outcome::Success,
        Err(err) => Outcome::RecoverableRx(RxFault::from(*err)),
    }
}

/// Classifies the outcome of a transmit attempt.
pub fn classify_transmit<T>(result: &Result<T, RadioError>) -> Outcome {
    match result {
        Ok(_) => Outcome::Success,
        Err(err) => Outcome::RecoverableTx(TxFault::from(*err)),
    }
}

/// Classifies a one-time setup or re-arm call. There is no recoverable
/// arm here: any failure is fatal.
pub fn classify_setup(step: SetupStep, result: Result<(), RadioError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Success,
        Err(source) => Outcome::Fatal(FatalError { step, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_success() {
        let result: Result<Vec<u8>, RadioError> = Ok(vec![0x01]);
        assert_eq!(classify_read(&result), Outcome::Success);
    }

    #[test]
    fn test_read_faults_stay_on_rx_side() {
        assert_eq!(
            classify_read::<()>(&Err(RadioError::RxTimeout)),
            Outcome::RecoverableRx(RxFault::Timeout)
        );
        assert_eq!(
            classify_read::<()>(&Err(RadioError::CrcMismatch)),
            Outcome::RecoverableRx(RxFault::Corrupt)
        );
        // TX-flavored codes arriving on a read are just "other" here
        assert_eq!(
            classify_read::<()>(&Err(RadioError::PacketTooLong)),
            Outcome::RecoverableRx(RxFault::Other(-4))
        );
        assert_eq!(
            classify_read::<()>(&Err(RadioError::Other(-707))),
            Outcome::RecoverableRx(RxFault::Other(-707))
        );
    }

    #[test]
    fn test_transmit_faults_stay_on_tx_side() {
        assert_eq!(classify_transmit::<()>(&Ok(())), Outcome::Success);
        assert_eq!(
            classify_transmit::<()>(&Err(RadioError::PacketTooLong)),
            Outcome::RecoverableTx(TxFault::TooLong)
        );
        assert_eq!(
            classify_transmit::<()>(&Err(RadioError::TxTimeout)),
            Outcome::RecoverableTx(TxFault::Timeout)
        );
        assert_eq!(
            classify_transmit::<()>(&Err(RadioError::RxTimeout)),
            Outcome::RecoverableTx(TxFault::Other(-6))
        );
    }

    #[test]
    fn test_setup_failure_is_fatal_and_names_the_step() {
        let outcome = classify_setup(SetupStep::ResumeReceive, Err(RadioError::Other(-2)));
        assert!(!outcome.is_recoverable());
        assert_eq!(
            outcome,
            Outcome::Fatal(FatalError {
                step: SetupStep::ResumeReceive,
                source: RadioError::Other(-2),
            })
        );
        assert_eq!(classify_setup(SetupStep::Configure, Ok(())), Outcome::Success);
    }

    #[test]
    fn test_labels() {
        assert_eq!(RxFault::Timeout.label(), "timeout");
        assert_eq!(RxFault::Corrupt.label(), "CRC error");
        assert_eq!(TxFault::TooLong.label(), "packet too long");
        assert_eq!(
            classify_read::<()>(&Err(RadioError::CrcMismatch)).label(),
            "CRC error"
        );
        assert_eq!(Outcome::Success.label(), "success");
    }
}
