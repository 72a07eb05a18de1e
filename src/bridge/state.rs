// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Transfer state machine and progress reporting.

use alloy_primitives::TxHash;
use std::fmt;
use std::time::SystemTime;
use tracing::{info, warn};

use crate::error::{BridgeError, Result};
use crate::traits::ProgressObserver;

/// Lifecycle of one CCTP transfer.
///
/// Progress only moves forward:
///
/// ```text
/// Pending -> Burning -> AwaitingAttestation -> AttestationReceived -> Minting -> Completed
/// ```
///
/// `Failed` is reachable from every state except `Completed` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    Pending,
    Burning,
    AwaitingAttestation,
    AttestationReceived,
    Minting,
    Completed,
    Failed,
}

impl TransferState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Burning => "burning",
            Self::AwaitingAttestation => "awaiting_attestation",
            Self::AttestationReceived => "attestation_received",
            Self::Minting => "minting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Completed | Self::Failed, _) => false,
            (_, Self::Failed) => true,
            (Self::Pending, Self::Burning)
            | (Self::Burning, Self::AwaitingAttestation)
            | (Self::AwaitingAttestation, Self::AttestationReceived)
            | (Self::AttestationReceived, Self::Minting)
            | (Self::Minting, Self::Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One state change, delivered to the [`ProgressObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub timestamp: SystemTime,
    pub state: TransferState,
    pub message: String,
    pub tx_hash: Option<TxHash>,
}

/// Default observer that forwards progress to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_progress(&self, event: &ProgressEvent) {
        match event.state {
            TransferState::Failed => warn!(
                state = %event.state,
                message = %event.message,
                event = "transfer_progress"
            ),
            _ => info!(
                state = %event.state,
                message = %event.message,
                tx_hash = ?event.tx_hash,
                event = "transfer_progress"
            ),
        }
    }
}

/// Tracks the state of a single pipeline run and reports every change.
pub(crate) struct ProgressTracker<'a> {
    state: TransferState,
    observer: &'a dyn ProgressObserver,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn starting_at(state: TransferState, observer: &'a dyn ProgressObserver) -> Self {
        Self { state, observer }
    }

    pub(crate) fn state(&self) -> TransferState {
        self.state
    }

    pub(crate) fn advance(
        &mut self,
        next: TransferState,
        message: impl Into<String>,
        tx_hash: Option<TxHash>,
    ) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(BridgeError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        self.observer.on_progress(&ProgressEvent {
            timestamp: SystemTime::now(),
            state: next,
            message: message.into(),
            tx_hash,
        });
        Ok(())
    }

    /// Moves to `Failed` unless the run already ended; the error is returned as-is.
    pub(crate) fn fail(&mut self, error: BridgeError) -> BridgeError {
        if !self.state.is_terminal() {
            self.state = TransferState::Failed;
            self.observer.on_progress(&ProgressEvent {
                timestamp: SystemTime::now(),
                state: TransferState::Failed,
                message: error.to_string(),
                tx_hash: None,
            });
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingObserver;
    use rstest::rstest;

    #[rstest]
    #[case(TransferState::Pending, TransferState::Burning, true)]
    #[case(TransferState::Burning, TransferState::AwaitingAttestation, true)]
    #[case(TransferState::AwaitingAttestation, TransferState::AttestationReceived, true)]
    #[case(TransferState::AttestationReceived, TransferState::Minting, true)]
    #[case(TransferState::Minting, TransferState::Completed, true)]
    #[case(TransferState::Burning, TransferState::Pending, false)]
    #[case(TransferState::Pending, TransferState::Minting, false)]
    #[case(TransferState::Minting, TransferState::Burning, false)]
    #[case(TransferState::Completed, TransferState::Failed, false)]
    #[case(TransferState::Failed, TransferState::Pending, false)]
    fn test_transitions(
        #[case] from: TransferState,
        #[case] to: TransferState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_failed_reachable_from_every_non_terminal_state() {
        for state in [
            TransferState::Pending,
            TransferState::Burning,
            TransferState::AwaitingAttestation,
            TransferState::AttestationReceived,
            TransferState::Minting,
        ] {
            assert!(state.can_transition_to(TransferState::Failed), "{state}");
        }
    }

    #[test]
    fn test_tracker_emits_events_in_order() {
        let observer = RecordingObserver::new();
        let mut tracker = ProgressTracker::starting_at(TransferState::Pending, &observer);

        tracker.advance(TransferState::Burning, "burning", None).unwrap();
        tracker
            .advance(TransferState::AwaitingAttestation, "burned", Some(TxHash::ZERO))
            .unwrap();
        let err = tracker.advance(TransferState::Completed, "skip", None);

        assert!(matches!(err, Err(BridgeError::InvalidTransition { .. })));
        assert_eq!(
            observer.states(),
            vec![TransferState::Burning, TransferState::AwaitingAttestation]
        );
        assert_eq!(observer.events()[1].tx_hash, Some(TxHash::ZERO));
    }

    #[test]
    fn test_fail_is_reported_once() {
        let observer = RecordingObserver::new();
        let mut tracker = ProgressTracker::starting_at(TransferState::Burning, &observer);

        let _ = tracker.fail(BridgeError::Cancelled);
        let _ = tracker.fail(BridgeError::Cancelled);

        assert_eq!(tracker.state(), TransferState::Failed);
        assert_eq!(observer.states(), vec![TransferState::Failed]);
    }
}
