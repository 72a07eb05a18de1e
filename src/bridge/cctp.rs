// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::{Bytes, TxHash};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolEvent;
use bon::Builder;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn, Instrument};

use super::config::TransferConfig;
use super::confirm::TransactionSender;
use super::state::{ProgressTracker, TracingObserver, TransferState};
use super::types::{Attestation, BurnResult, MintResult, TransferIntent, TransferResult};
use crate::chain::SupportedChain;
use crate::contracts::{
    DepositForBurnArgs, Erc20Contract, MessageSent, MessageTransmitterV2Contract,
    TokenMessengerV2Contract,
};
use crate::error::{BridgeError, Result, TransferStage};
use crate::poller::{BackoffPoller, CancellationToken, PollError};
use crate::protocol::{AttestationStatus, MessageHeader};
use crate::provider::ProviderConfig;
use crate::providers::TokioClock;
use crate::spans;
use crate::traits::{AttestationProvider, ChainClient, Clock, ProgressObserver, TxReceipt};

/// Attestations already fetched, keyed by burn transaction hash.
///
/// The first stored value wins, so every later lookup for a burn returns the
/// same attestation.
#[derive(Debug, Clone, Default)]
pub struct AttestationCache {
    entries: Arc<Mutex<HashMap<TxHash, Attestation>>>,
}

impl AttestationCache {
    pub fn get(&self, burn_tx_hash: &TxHash) -> Option<Attestation> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(burn_tx_hash)
            .cloned()
    }

    /// Stores `attestation` unless one is already cached, and returns the cached value.
    pub fn insert(&self, burn_tx_hash: TxHash, attestation: Attestation) -> Attestation {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(burn_tx_hash)
            .or_insert(attestation)
            .clone()
    }
}

/// Drives burn, attestation and mint for one source/destination pair.
///
/// Every step reports its state changes to the configured
/// [`ProgressObserver`]. Steps can be run one at a time ([`burn`](Self::burn),
/// [`await_attestation`](Self::await_attestation), [`mint`](Self::mint)) or as
/// a pipeline ([`transfer`](Self::transfer)). An interrupted transfer is
/// picked up again with [`resume`](Self::resume), which starts at the
/// attestation and never submits another burn.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use usdc_bridge_rs::{CctpTransferEngine, SupportedChain, TransferIntent};
/// use usdc_bridge_rs::providers::{AlloyChainClient, IrisAttestationProvider};
/// use alloy_provider::ProviderBuilder;
/// use alloy_signer_local::PrivateKeySigner;
/// use alloy_primitives::U256;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sepolia = ProviderBuilder::new().connect("https://rpc.sepolia.org").await?;
/// let arc = ProviderBuilder::new().connect("https://rpc.testnet.arc.network").await?;
/// let signer: PrivateKeySigner = std::env::var("PRIVATE_KEY")?.parse()?;
///
/// let engine = CctpTransferEngine::builder()
///     .source(Arc::new(AlloyChainClient::new(SupportedChain::Sepolia, sepolia)))
///     .destination(Arc::new(AlloyChainClient::new(SupportedChain::ArcTestnet, arc)))
///     .attestation_provider(Arc::new(IrisAttestationProvider::sandbox()))
///     .build();
///
/// let intent = TransferIntent::new(
///     U256::from(10_000_000u64),
///     signer.address(),
///     SupportedChain::Sepolia,
///     SupportedChain::ArcTestnet,
/// )?;
/// let result = engine.transfer(&intent, &signer).await?;
/// println!("minted in {}", result.mint_tx_hash);
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct CctpTransferEngine {
    source: Arc<dyn ChainClient>,
    destination: Arc<dyn ChainClient>,
    attestation_provider: Arc<dyn AttestationProvider>,
    #[builder(default = Arc::new(TokioClock) as Arc<dyn Clock>)]
    clock: Arc<dyn Clock>,
    #[builder(default = Arc::new(TracingObserver) as Arc<dyn ProgressObserver>)]
    observer: Arc<dyn ProgressObserver>,
    #[builder(default)]
    config: TransferConfig,
    #[builder(default)]
    provider_config: ProviderConfig,
    #[builder(default)]
    cancel: CancellationToken,
    #[builder(default)]
    attestations: AttestationCache,
}

impl fmt::Debug for CctpTransferEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CctpTransferEngine")
            .field("source", &self.source.chain())
            .field("destination", &self.destination.chain())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CctpTransferEngine {
    pub fn source_chain(&self) -> SupportedChain {
        self.source.chain()
    }

    pub fn destination_chain(&self) -> SupportedChain {
        self.destination.chain()
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Token that stops attestation polling and confirmation waits.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn attestation_cache(&self) -> &AttestationCache {
        &self.attestations
    }

    fn sender(&self, client: &Arc<dyn ChainClient>) -> TransactionSender {
        TransactionSender::new(
            client.clone(),
            self.clock.clone(),
            self.provider_config.confirmation,
            self.cancel.clone(),
        )
    }

    fn check_route(&self, intent: &TransferIntent) -> Result<()> {
        if intent.source_chain() != self.source_chain()
            || intent.destination_chain() != self.destination_chain()
        {
            return Err(BridgeError::InvalidConfig(format!(
                "engine bridges {} to {}, intent asks for {} to {}",
                self.source_chain(),
                self.destination_chain(),
                intent.source_chain(),
                intent.destination_chain()
            )));
        }
        if self.config.finality.is_fast() && self.config.max_fee >= intent.amount() {
            return Err(BridgeError::InvalidConfig(format!(
                "max fee {} must be below the transfer amount {}",
                self.config.max_fee,
                intent.amount()
            )));
        }
        Ok(())
    }

    /// Approves the token messenger if needed, burns on the source chain and
    /// captures the emitted message.
    ///
    /// State: `Pending -> Burning -> AwaitingAttestation`.
    pub async fn burn(
        &self,
        intent: &TransferIntent,
        signer: &PrivateKeySigner,
    ) -> Result<BurnResult> {
        let mut progress = ProgressTracker::starting_at(TransferState::Pending, &*self.observer);
        let result = self.run_burn(&mut progress, intent, signer).await;
        result.map_err(|e| progress.fail(e))
    }

    /// Waits for the attestation of `burn_tx_hash`.
    ///
    /// Only the hash is needed: the message is re-read from the burn receipt.
    /// A burn whose attestation was fetched before is answered from the cache.
    ///
    /// State: `AwaitingAttestation -> AttestationReceived`.
    pub async fn await_attestation(&self, burn_tx_hash: TxHash) -> Result<Attestation> {
        let mut progress =
            ProgressTracker::starting_at(TransferState::AwaitingAttestation, &*self.observer);
        let result = self.run_attestation(&mut progress, burn_tx_hash).await;
        result.map_err(|e| progress.fail(e))
    }

    /// Submits `receiveMessage` on the destination chain.
    ///
    /// Fails with [`BridgeError::AlreadyMinted`] when the message nonce was
    /// already consumed, without sending anything.
    ///
    /// State: `AttestationReceived -> Minting -> Completed`.
    pub async fn mint(
        &self,
        attestation: &Attestation,
        signer: &PrivateKeySigner,
    ) -> Result<MintResult> {
        let mut progress =
            ProgressTracker::starting_at(TransferState::AttestationReceived, &*self.observer);
        let result = self.run_mint(&mut progress, attestation, signer).await;
        result.map_err(|e| progress.fail(e))
    }

    /// Burn, attestation and mint in sequence, stopping at the first failure.
    pub async fn transfer(
        &self,
        intent: &TransferIntent,
        signer: &PrivateKeySigner,
    ) -> Result<TransferResult> {
        info!(
            source_chain = %intent.source_chain(),
            destination_chain = %intent.destination_chain(),
            amount = %intent.amount(),
            recipient = %intent.recipient(),
            finality = %self.config.finality,
            event = "full_transfer_initiated"
        );

        let mut progress = ProgressTracker::starting_at(TransferState::Pending, &*self.observer);
        let result = self.run_transfer(&mut progress, intent, signer).await;
        let result = result.map_err(|e| progress.fail(e))?;

        info!(
            burn_tx_hash = %result.burn_tx_hash,
            mint_tx_hash = %result.mint_tx_hash,
            event = "full_transfer_completed"
        );
        Ok(result)
    }

    /// Finishes a transfer whose burn already happened.
    ///
    /// Re-entering with the same hash after a successful mint fails with
    /// [`BridgeError::AlreadyMinted`] instead of minting twice.
    pub async fn resume(
        &self,
        burn_tx_hash: TxHash,
        signer: &PrivateKeySigner,
    ) -> Result<TransferResult> {
        info!(burn_tx_hash = %burn_tx_hash, event = "transfer_resume_initiated");

        let mut progress =
            ProgressTracker::starting_at(TransferState::AwaitingAttestation, &*self.observer);
        let result = async {
            let attestation = self.run_attestation(&mut progress, burn_tx_hash).await?;
            let mint = self.run_mint(&mut progress, &attestation, signer).await?;
            Ok::<_, BridgeError>(TransferResult {
                source_chain: self.source_chain(),
                destination_chain: self.destination_chain(),
                approve_tx_hash: None,
                burn_tx_hash,
                mint_tx_hash: mint.mint_tx_hash,
                nonce: MessageHeader::assigned_nonce(&attestation.encoded_message),
            })
        }
        .await;
        result.map_err(|e| progress.fail(e))
    }

    async fn run_transfer(
        &self,
        progress: &mut ProgressTracker<'_>,
        intent: &TransferIntent,
        signer: &PrivateKeySigner,
    ) -> Result<TransferResult> {
        let burn = self.run_burn(progress, intent, signer).await?;
        let attestation = self.run_attestation(progress, burn.burn_tx_hash).await?;
        let mint = self.run_mint(progress, &attestation, signer).await?;

        Ok(TransferResult {
            source_chain: intent.source_chain(),
            destination_chain: intent.destination_chain(),
            approve_tx_hash: burn.approve_tx_hash,
            burn_tx_hash: burn.burn_tx_hash,
            mint_tx_hash: mint.mint_tx_hash,
            nonce: MessageHeader::assigned_nonce(&attestation.encoded_message).or(burn.nonce),
        })
    }

    async fn run_burn(
        &self,
        progress: &mut ProgressTracker<'_>,
        intent: &TransferIntent,
        signer: &PrivateKeySigner,
    ) -> Result<BurnResult> {
        self.check_route(intent)?;

        let span = spans::burn(
            intent.source_chain(),
            intent.destination_chain(),
            &intent.amount(),
            &intent.recipient(),
        );
        let result = self
            .burn_steps(progress, intent, signer)
            .instrument(span.clone())
            .await;
        if let Err(e) = &result {
            span.in_scope(|| spans::record_error(e));
        }
        result
    }

    async fn burn_steps(
        &self,
        progress: &mut ProgressTracker<'_>,
        intent: &TransferIntent,
        signer: &PrivateKeySigner,
    ) -> Result<BurnResult> {
        let source = self.source_chain();
        let owner = signer.address();
        let messenger = TokenMessengerV2Contract::new(source.token_messenger());
        let usdc = Erc20Contract::new(source.usdc_address(), self.source.clone());
        let sender = self.sender(&self.source);

        progress.advance(
            TransferState::Burning,
            format!("Burning {} USDC units on {source}", intent.amount()),
            None,
        )?;

        let allowance = usdc
            .allowance(owner, messenger.address())
            .await
            .map_err(|e| e.at_stage(TransferStage::Approve))?;

        let approve_tx_hash = if allowance < intent.amount() {
            info!(
                allowance = %allowance,
                amount = %intent.amount(),
                spender = %messenger.address(),
                event = "approval_required"
            );
            let tx = usdc.approve_transaction(owner, messenger.address(), intent.amount());
            let receipt = sender
                .send_and_confirm(signer, tx, "approve")
                .await
                .map_err(|e| e.at_stage(TransferStage::Approve))?;
            Some(receipt.transaction_hash)
        } else {
            debug!(allowance = %allowance, event = "approval_skipped");
            None
        };

        let args = DepositForBurnArgs {
            amount: intent.amount(),
            destination_domain: intent.destination_chain().domain(),
            mint_recipient: intent.recipient(),
            burn_token: usdc.address(),
            destination_caller: self.config.destination_caller,
            max_fee: self.config.max_fee,
            min_finality_threshold: self.config.finality,
        };

        info!(
            from_address = %owner,
            recipient = %intent.recipient(),
            amount = %intent.amount(),
            destination_domain = args.destination_domain.as_u32(),
            finality = %self.config.finality,
            event = "burn_transaction_initiated"
        );

        let tx = messenger.deposit_for_burn_transaction(owner, &args);
        let receipt = sender
            .send_and_confirm(signer, tx, "deposit_for_burn")
            .await
            .map_err(|e| e.at_stage(TransferStage::Burn))?;
        let burn_tx_hash = receipt.transaction_hash;

        info!(
            burn_tx_hash = %burn_tx_hash,
            block_number = ?receipt.block_number,
            event = "burn_transaction_sent"
        );

        let message = extract_message_sent(&receipt, source)?;
        let nonce = MessageHeader::assigned_nonce(&message);

        progress.advance(
            TransferState::AwaitingAttestation,
            "Burn confirmed, waiting for attestation",
            Some(burn_tx_hash),
        )?;

        Ok(BurnResult {
            approve_tx_hash,
            burn_tx_hash,
            nonce,
            message,
        })
    }

    async fn run_attestation(
        &self,
        progress: &mut ProgressTracker<'_>,
        burn_tx_hash: TxHash,
    ) -> Result<Attestation> {
        let span = spans::await_attestation(
            burn_tx_hash,
            self.source_chain(),
            self.config.attestation.max_attempts,
        );
        let result = self
            .attestation_steps(progress, burn_tx_hash)
            .instrument(span.clone())
            .await;
        if let Err(e) = &result {
            span.in_scope(|| spans::record_error(e));
        }
        result
    }

    async fn attestation_steps(
        &self,
        progress: &mut ProgressTracker<'_>,
        burn_tx_hash: TxHash,
    ) -> Result<Attestation> {
        if let Some(cached) = self.attestations.get(&burn_tx_hash) {
            debug!(burn_tx_hash = %burn_tx_hash, event = "attestation_cache_hit");
            progress.advance(
                TransferState::AttestationReceived,
                "Attestation already available",
                Some(burn_tx_hash),
            )?;
            return Ok(cached);
        }

        let log_message = self.message_from_burn(burn_tx_hash).await?;
        let domain = self.source_chain().domain();
        let provider = &self.attestation_provider;

        let outcome = BackoffPoller::new(self.clock.clone())
            .poll(&self.config.attestation, &self.cancel, |attempt| async move {
                match provider.get_attestation(domain, burn_tx_hash).await {
                    Err(BridgeError::AttestationNotFound) => {
                        debug!(attempt = attempt, event = "attestation_not_found");
                        Ok(None)
                    }
                    Err(e) => Err(e),
                    Ok(response) => match response.status {
                        AttestationStatus::Complete => match response.attestation {
                            Some(signature) => Ok(Some((signature, response.message))),
                            None => {
                                debug!(attempt = attempt, event = "attestation_complete_without_data");
                                Ok(None)
                            }
                        },
                        AttestationStatus::Failed => Err(BridgeError::AttestationFailed {
                            reason: format!("attestation service rejected burn {burn_tx_hash}"),
                        }),
                        status => {
                            debug!(attempt = attempt, status = ?status, event = "attestation_pending");
                            Ok(None)
                        }
                    },
                }
            })
            .await;

        let (signature, attested_message) = match outcome {
            Ok(found) => found,
            Err(PollError::Timeout {
                cause,
                attempts,
                elapsed,
            }) => {
                return Err(BridgeError::AttestationTimeout {
                    cause,
                    attempts,
                    elapsed,
                })
            }
            Err(PollError::Cancelled) => return Err(BridgeError::Cancelled),
            Err(PollError::Probe(e)) => return Err(e),
        };

        let attestation = self.attestations.insert(
            burn_tx_hash,
            Attestation {
                signature,
                encoded_message: attested_message.unwrap_or(log_message),
            },
        );

        info!(
            burn_tx_hash = %burn_tx_hash,
            attestation_len = attestation.signature.len(),
            message_len = attestation.encoded_message.len(),
            event = "attestation_received"
        );

        progress.advance(
            TransferState::AttestationReceived,
            "Attestation received",
            Some(burn_tx_hash),
        )?;
        Ok(attestation)
    }

    async fn message_from_burn(&self, burn_tx_hash: TxHash) -> Result<Bytes> {
        let source = self.source_chain();
        let receipt = self
            .source
            .get_transaction_receipt(burn_tx_hash)
            .await
            .map_err(|e| e.at_stage(TransferStage::Attestation))?
            .ok_or_else(|| {
                BridgeError::transfer_failed(
                    TransferStage::Attestation,
                    format!("burn transaction {burn_tx_hash} not found on {source}"),
                )
            })?;

        if !receipt.success {
            return Err(BridgeError::transfer_failed(
                TransferStage::Attestation,
                format!("burn transaction {burn_tx_hash} reverted"),
            ));
        }

        extract_message_sent(&receipt, source)
    }

    async fn run_mint(
        &self,
        progress: &mut ProgressTracker<'_>,
        attestation: &Attestation,
        signer: &PrivateKeySigner,
    ) -> Result<MintResult> {
        let span = spans::mint(self.destination_chain(), attestation.signature.len());
        let result = self
            .mint_steps(progress, attestation, signer)
            .instrument(span.clone())
            .await;
        if let Err(e) = &result {
            span.in_scope(|| spans::record_error(e));
        }
        result
    }

    async fn mint_steps(
        &self,
        progress: &mut ProgressTracker<'_>,
        attestation: &Attestation,
        signer: &PrivateKeySigner,
    ) -> Result<MintResult> {
        let destination = self.destination_chain();
        let transmitter = MessageTransmitterV2Contract::new(
            destination.message_transmitter(),
            self.destination.clone(),
        );

        progress.advance(
            TransferState::Minting,
            format!("Minting on {destination}"),
            None,
        )?;

        if let Some(nonce) = MessageHeader::assigned_nonce(&attestation.encoded_message) {
            let received = transmitter
                .is_message_received(nonce)
                .await
                .map_err(|e| e.at_stage(TransferStage::Mint))?;
            if received {
                warn!(nonce = %nonce, event = "message_already_received");
                return Err(BridgeError::AlreadyMinted { nonce });
            }
        }

        let tx = transmitter.receive_message_transaction(
            attestation.encoded_message.clone(),
            attestation.signature.clone(),
            signer.address(),
        );
        let receipt = self
            .sender(&self.destination)
            .send_and_confirm(signer, tx, "receive_message")
            .await
            .map_err(|e| e.at_stage(TransferStage::Mint))?;
        let mint_tx_hash = receipt.transaction_hash;

        info!(
            mint_tx_hash = %mint_tx_hash,
            destination_chain = %destination,
            event = "mint_transaction_sent"
        );

        progress.advance(
            TransferState::Completed,
            "Transfer completed",
            Some(mint_tx_hash),
        )?;
        Ok(MintResult { mint_tx_hash })
    }
}

/// Payload of the `MessageSent` event `chain`'s MessageTransmitter emitted in a
/// burn receipt.
fn extract_message_sent(receipt: &TxReceipt, chain: SupportedChain) -> Result<Bytes> {
    let span = spans::get_message_sent_event(receipt.transaction_hash, chain);
    let _guard = span.enter();

    let transmitter = chain.message_transmitter();
    for log in &receipt.logs {
        if log.address == transmitter
            && log.topics().first() == Some(&MessageSent::SIGNATURE_HASH)
        {
            let event = MessageSent::decode_log_data(&log.data)?;
            debug!(
                message_len = event.message.len(),
                event = "message_sent_event_found"
            );
            return Ok(event.message);
        }
    }

    let available_logs: Vec<String> = receipt
        .logs
        .iter()
        .filter_map(|log| log.topics().first().map(|topic| topic.to_string()))
        .collect();
    spans::record_error_with_context(
        "MessageSentEventNotFound",
        "MessageSent event not found in transaction logs",
        Some(&format!("available_topics={}", available_logs.join(","))),
    );
    error!(
        tx_hash = %receipt.transaction_hash,
        available_logs = ?available_logs,
        event = "message_sent_event_not_found"
    );

    Err(BridgeError::EventNotFound {
        event: "MessageSent",
        tx_hash: receipt.transaction_hash,
    })
}
