// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Submit-and-wait helpers shared by the CCTP and Gateway engines.

use alloy_primitives::TxHash;
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

use crate::error::{BridgeError, Result};
use crate::poller::{BackoffConfig, BackoffPoller, CancellationToken, PollError};
use crate::spans;
use crate::traits::{ChainClient, Clock, TxReceipt};

/// Polls for the receipt of `tx_hash` until it is mined.
///
/// RPC errors while polling are logged and treated as "not mined yet"; the
/// wait is bounded by `config`. The returned receipt may describe a reverted
/// transaction, check [`TxReceipt::success`].
pub async fn confirm_transaction(
    client: &dyn ChainClient,
    poller: &BackoffPoller,
    config: &BackoffConfig,
    cancel: &CancellationToken,
    tx_hash: TxHash,
) -> Result<TxReceipt> {
    let span = spans::confirm_transaction(tx_hash, client.chain());

    async move {
        let outcome = poller
            .poll(config, cancel, |attempt| async move {
                match client.get_transaction_receipt(tx_hash).await {
                    Ok(receipt) => Ok::<_, BridgeError>(receipt),
                    Err(e) => {
                        warn!(
                            attempt = attempt,
                            error = %e,
                            event = "receipt_lookup_failed"
                        );
                        Ok(None)
                    }
                }
            })
            .await;

        match outcome {
            Ok(receipt) => {
                debug!(
                    block_number = ?receipt.block_number,
                    success = receipt.success,
                    event = "transaction_confirmed"
                );
                Ok(receipt)
            }
            Err(PollError::Timeout { cause, .. }) => {
                Err(BridgeError::ConfirmationTimeout { tx_hash, cause })
            }
            Err(PollError::Cancelled) => Err(BridgeError::Cancelled),
            Err(PollError::Probe(e)) => Err(e),
        }
    }
    .instrument(span)
    .await
}

/// A chain client paired with the polling setup needed to wait for receipts.
#[derive(Clone)]
pub(crate) struct TransactionSender {
    client: Arc<dyn ChainClient>,
    poller: BackoffPoller,
    confirmation: BackoffConfig,
    cancel: CancellationToken,
}

impl TransactionSender {
    pub(crate) fn new(
        client: Arc<dyn ChainClient>,
        clock: Arc<dyn Clock>,
        confirmation: BackoffConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            poller: BackoffPoller::new(clock),
            confirmation,
            cancel,
        }
    }

    /// Signs and submits `tx`, then waits for a successful receipt.
    ///
    /// A reverted receipt is [`BridgeError::TransactionReverted`].
    pub(crate) async fn send_and_confirm(
        &self,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
        label: &'static str,
    ) -> Result<TxReceipt> {
        if self.cancel.is_cancelled() {
            return Err(BridgeError::Cancelled);
        }

        let tx_hash = self.client.send_transaction(signer, tx).await?;
        info!(
            tx_hash = %tx_hash,
            chain = %self.client.chain(),
            label = label,
            event = "transaction_sent"
        );

        let receipt = confirm_transaction(
            self.client.as_ref(),
            &self.poller,
            &self.confirmation,
            &self.cancel,
            tx_hash,
        )
        .await?;

        if !receipt.success {
            warn!(tx_hash = %tx_hash, label = label, event = "transaction_reverted");
            return Err(BridgeError::TransactionReverted { tx_hash });
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::SupportedChain;
    use crate::poller::TimeoutCause;
    use crate::testing::{test_signer, FakeChainClient, FakeClock};
    use alloy_primitives::b256;
    use std::time::Duration;

    fn quick() -> BackoffConfig {
        BackoffConfig::default()
            .with_initial_delay(Duration::from_secs(1))
            .with_max_attempts(3)
    }

    #[tokio::test]
    async fn test_confirm_returns_existing_receipt() {
        let client = FakeChainClient::new(SupportedChain::Sepolia);
        let hash = b256!("00000000000000000000000000000000000000000000000000000000000000aa");
        client.insert_receipt(hash, true, vec![]);
        let poller = BackoffPoller::new(Arc::new(FakeClock::new()));

        let receipt = confirm_transaction(
            &client,
            &poller,
            &quick(),
            &CancellationToken::new(),
            hash,
        )
        .await
        .unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.transaction_hash, hash);
    }

    #[tokio::test]
    async fn test_confirm_times_out_when_never_mined() {
        let client = FakeChainClient::new(SupportedChain::Sepolia);
        let clock = FakeClock::new();
        let poller = BackoffPoller::new(Arc::new(clock.clone()));

        let err = confirm_transaction(
            &client,
            &poller,
            &quick(),
            &CancellationToken::new(),
            TxHash::ZERO,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            BridgeError::ConfirmationTimeout {
                cause: TimeoutCause::MaxAttempts,
                ..
            }
        ));
        assert_eq!(clock.sleep_count(), 2);
    }

    #[tokio::test]
    async fn test_sender_reports_revert() {
        let client = Arc::new(FakeChainClient::new(SupportedChain::Sepolia));
        let target = alloy_primitives::address!("00000000000000000000000000000000000000aa");
        client.revert_calls_to(target);
        let sender = TransactionSender::new(
            client.clone(),
            Arc::new(FakeClock::new()),
            quick(),
            CancellationToken::new(),
        );
        let tx = TransactionRequest::default().to(target);

        let err = sender
            .send_and_confirm(&test_signer(), tx, "test")
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::TransactionReverted { .. }));
    }
}
