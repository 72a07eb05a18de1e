// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Fakes for the engine traits
//!
//! In-memory implementations of [`ChainClient`], [`AttestationProvider`],
//! [`GatewayApi`], [`Clock`] and [`ProgressObserver`] for driving the engines
//! through adversarial scenarios without a node or Circle's services:
//!
//! - allowances that already cover a transfer
//! - burns whose receipts lack `MessageSent`
//! - reverted transactions
//! - attestations that stay pending until the poller gives up
//! - messages already received on the destination chain
//!
//! All fakes are cheap to clone and share their state between clones, so a
//! test can hand one copy to an engine and keep another for assertions.

use alloy_primitives::{keccak256, Address, Bytes, FixedBytes, Log, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::bridge::{ProgressEvent, TransferState};
use crate::chain::SupportedChain;
use crate::contracts::erc20::Erc20;
use crate::contracts::message_transmitter::MessageTransmitterV2;
use crate::contracts::MessageSent;
use crate::error::{BridgeError, Result};
use crate::protocol::{
    AttestationResponse, AttestationStatus, DomainId, GatewayBalances, GatewayTransferRequest,
    MessageHeader,
};
use crate::traits::{AttestationProvider, ChainClient, Clock, GatewayApi, ProgressObserver, TxReceipt};

/// Well-known development key (first anvil account).
const TEST_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Deterministic signer for tests.
pub fn test_signer() -> PrivateKeySigner {
    TEST_PRIVATE_KEY
        .parse()
        .expect("hard-coded development key parses")
}

/// A CCTP message from `source` to `destination` with the given nonce and an empty body.
pub fn cctp_message(
    source: SupportedChain,
    destination: SupportedChain,
    nonce: FixedBytes<32>,
) -> Bytes {
    MessageHeader {
        version: 1,
        source_domain: source.domain(),
        destination_domain: destination.domain(),
        nonce,
        sender: source.token_messenger().into_word(),
        recipient: destination.token_messenger().into_word(),
        destination_caller: FixedBytes::ZERO,
        min_finality_threshold: 2000,
        finality_threshold_executed: 0,
    }
    .encode()
}

/// `MessageSent(message)` as `chain`'s MessageTransmitter emits it during a burn.
pub fn message_sent_log(chain: SupportedChain, message: Bytes) -> Log {
    Log {
        address: chain.message_transmitter(),
        data: MessageSent { message }.encode_log_data(),
    }
}

// ============================================================================
// Fake Chain Client
// ============================================================================

/// A transaction submitted through [`FakeChainClient::send_transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    pub hash: TxHash,
    pub from: Address,
    pub to: Address,
    pub input: Bytes,
}

#[derive(Debug, Default)]
struct ChainState {
    block_number: u64,
    sent_count: u64,
    native_balances: HashMap<Address, U256>,
    token_balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    used_nonces: HashSet<FixedBytes<32>>,
    receipts: HashMap<TxHash, TxReceipt>,
    reverting: HashSet<Address>,
    scripted_logs: HashMap<Address, Vec<Log>>,
    sent: Vec<SentTransaction>,
    unavailable: Option<String>,
}

/// A single in-memory chain.
///
/// Reads understand `allowance`, `balanceOf` and `usedNonces`. Sending a
/// transaction mines it immediately: `approve` updates the allowance,
/// `receiveMessage` marks the message nonce as used, and any logs scripted
/// with [`set_logs_for`](Self::set_logs_for) are attached to the receipt.
#[derive(Debug, Clone)]
pub struct FakeChainClient {
    chain: SupportedChain,
    state: Arc<Mutex<ChainState>>,
}

impl FakeChainClient {
    pub fn new(chain: SupportedChain) -> Self {
        Self {
            chain,
            state: Arc::new(Mutex::new(ChainState {
                block_number: 1_000,
                ..ChainState::default()
            })),
        }
    }

    pub fn set_block_number(&self, block_number: u64) {
        self.state.lock().unwrap().block_number = block_number;
    }

    pub fn set_native_balance(&self, owner: Address, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .native_balances
            .insert(owner, amount);
    }

    /// Sets `owner`'s balance of this chain's USDC token.
    pub fn set_usdc_balance(&self, owner: Address, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .token_balances
            .insert((self.chain.usdc_address(), owner), amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, owner, spender), amount);
    }

    /// Marks `nonce` as already consumed by the message transmitter.
    pub fn mark_nonce_used(&self, nonce: FixedBytes<32>) {
        self.state.lock().unwrap().used_nonces.insert(nonce);
    }

    pub fn is_nonce_used(&self, nonce: FixedBytes<32>) -> bool {
        self.state.lock().unwrap().used_nonces.contains(&nonce)
    }

    /// Stores a mined receipt for `tx_hash`.
    pub fn insert_receipt(&self, tx_hash: TxHash, success: bool, logs: Vec<Log>) {
        let mut state = self.state.lock().unwrap();
        let block_number = Some(state.block_number);
        state.receipts.insert(
            tx_hash,
            TxReceipt {
                transaction_hash: tx_hash,
                block_number,
                success,
                logs,
            },
        );
    }

    /// Every later transaction sent to `target` reverts.
    pub fn revert_calls_to(&self, target: Address) {
        self.state.lock().unwrap().reverting.insert(target);
    }

    /// Logs attached to the receipt of every later transaction sent to `target`.
    pub fn set_logs_for(&self, target: Address, logs: Vec<Log>) {
        self.state.lock().unwrap().scripted_logs.insert(target, logs);
    }

    /// Makes every RPC method fail with a provider error.
    pub fn set_unavailable(&self, reason: impl Into<String>) {
        self.state.lock().unwrap().unavailable = Some(reason.into());
    }

    pub fn sent_transactions(&self) -> Vec<SentTransaction> {
        self.state.lock().unwrap().sent.clone()
    }

    fn check_available(state: &ChainState) -> Result<()> {
        match &state.unavailable {
            Some(reason) => Err(BridgeError::Provider(reason.clone())),
            None => Ok(()),
        }
    }
}

fn target_and_input(tx: &TransactionRequest) -> (Address, Bytes) {
    let to = tx
        .to
        .and_then(|kind| kind.to().copied())
        .unwrap_or_default();
    let input = tx.input.input().cloned().unwrap_or_default();
    (to, input)
}

fn has_selector(input: &[u8], selector: [u8; 4]) -> bool {
    input.len() >= 4 && input[..4] == selector
}

#[async_trait]
impl ChainClient for FakeChainClient {
    fn chain(&self) -> SupportedChain {
        self.chain
    }

    async fn get_block_number(&self) -> Result<u64> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state.block_number)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state
            .native_balances
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        let (to, input) = target_and_input(&tx);

        let value = if has_selector(&input, Erc20::allowanceCall::SELECTOR) {
            let call = Erc20::allowanceCall::abi_decode(&input)?;
            state
                .allowances
                .get(&(to, call.owner, call.spender))
                .copied()
                .unwrap_or_default()
        } else if has_selector(&input, Erc20::balanceOfCall::SELECTOR) {
            let call = Erc20::balanceOfCall::abi_decode(&input)?;
            state
                .token_balances
                .get(&(to, call.account))
                .copied()
                .unwrap_or_default()
        } else if has_selector(&input, MessageTransmitterV2::usedNoncesCall::SELECTOR) {
            let call = MessageTransmitterV2::usedNoncesCall::abi_decode(&input)?;
            U256::from(u8::from(state.used_nonces.contains(&call.nonce)))
        } else {
            return Err(BridgeError::Provider(format!(
                "unsupported call to {to} on {}",
                self.chain
            )));
        };

        Ok(Bytes::from(value.abi_encode()))
    }

    async fn send_transaction(
        &self,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
    ) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        let from = signer.address();
        let (to, input) = target_and_input(&tx);

        state.sent_count += 1;
        state.block_number += 1;
        let hash = keccak256((self.chain.chain_id(), state.sent_count).abi_encode());

        let success = !state.reverting.contains(&to);
        let mut logs = Vec::new();
        if success {
            if has_selector(&input, Erc20::approveCall::SELECTOR) {
                let call = Erc20::approveCall::abi_decode(&input)?;
                state.allowances.insert((to, from, call.spender), call.amount);
            } else if has_selector(&input, MessageTransmitterV2::receiveMessageCall::SELECTOR) {
                let call = MessageTransmitterV2::receiveMessageCall::abi_decode(&input)?;
                if let Some(nonce) = MessageHeader::assigned_nonce(&call.message) {
                    state.used_nonces.insert(nonce);
                }
            }
            logs = state
                .scripted_logs
                .get(&to)
                .cloned()
                .unwrap_or_default();
        }

        let block_number = Some(state.block_number);
        state.receipts.insert(
            hash,
            TxReceipt {
                transaction_hash: hash,
                block_number,
                success,
                logs,
            },
        );
        state.sent.push(SentTransaction {
            hash,
            from,
            to,
            input,
        });

        Ok(hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state.receipts.get(&tx_hash).cloned())
    }
}

// ============================================================================
// Fake Attestation Provider
// ============================================================================

/// One scripted answer of [`FakeAttestationProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationReply {
    Response(AttestationResponse),
    /// HTTP 404
    NotFound,
    /// Any other non-success HTTP status
    Http { status: u16, body: String },
}

impl AttestationReply {
    pub fn pending() -> Self {
        Self::Response(AttestationResponse::pending())
    }

    pub fn complete(message: Bytes, attestation: Bytes) -> Self {
        Self::Response(AttestationResponse {
            status: AttestationStatus::Complete,
            message: Some(message),
            attestation: Some(attestation),
        })
    }

    pub fn failed() -> Self {
        Self::Response(AttestationResponse {
            status: AttestationStatus::Failed,
            message: None,
            attestation: None,
        })
    }
}

#[derive(Debug, Default)]
struct AttestationScript {
    replies: Vec<AttestationReply>,
    calls: Vec<(DomainId, TxHash)>,
}

/// Replays a scripted sequence of attestation API answers.
///
/// Each request consumes the next reply; once the script is exhausted the
/// last reply repeats. An empty script answers 404 forever.
#[derive(Debug, Clone, Default)]
pub struct FakeAttestationProvider {
    script: Arc<Mutex<AttestationScript>>,
}

impl FakeAttestationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<AttestationReply>) -> Self {
        let provider = Self::new();
        provider.script.lock().unwrap().replies = replies;
        provider
    }

    pub fn push(&self, reply: AttestationReply) {
        self.script.lock().unwrap().replies.push(reply);
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }

    pub fn requests(&self) -> Vec<(DomainId, TxHash)> {
        self.script.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_attestation(
        &self,
        source_domain: DomainId,
        tx_hash: TxHash,
    ) -> Result<AttestationResponse> {
        let mut script = self.script.lock().unwrap();
        let index = script.calls.len();
        script.calls.push((source_domain, tx_hash));

        let reply = script
            .replies
            .get(index)
            .or_else(|| script.replies.last())
            .cloned()
            .unwrap_or(AttestationReply::NotFound);

        match reply {
            AttestationReply::Response(response) => Ok(response),
            AttestationReply::NotFound => Err(BridgeError::AttestationNotFound),
            AttestationReply::Http { status, body } => {
                Err(BridgeError::AttestationHttp { status, body })
            }
        }
    }
}

// ============================================================================
// Fake Gateway API
// ============================================================================

#[derive(Debug, Default)]
struct GatewayState {
    balances: GatewayBalances,
    submission_error: Option<String>,
    attestation: Bytes,
    submitted: Vec<GatewayTransferRequest>,
}

/// In-memory Gateway API with fixed balances.
#[derive(Debug, Clone)]
pub struct FakeGatewayApi {
    state: Arc<Mutex<GatewayState>>,
}

impl Default for FakeGatewayApi {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(GatewayState {
                attestation: Bytes::from_static(&[0xa7; 65]),
                ..GatewayState::default()
            })),
        }
    }
}

impl FakeGatewayApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, chain: SupportedChain, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(chain.domain(), amount);
    }

    /// Every later submission fails with `message`.
    pub fn fail_submissions(&self, message: impl Into<String>) {
        self.state.lock().unwrap().submission_error = Some(message.into());
    }

    pub fn set_attestation(&self, attestation: Bytes) {
        self.state.lock().unwrap().attestation = attestation;
    }

    pub fn submitted(&self) -> Vec<GatewayTransferRequest> {
        self.state.lock().unwrap().submitted.clone()
    }
}

#[async_trait]
impl GatewayApi for FakeGatewayApi {
    async fn get_balances(
        &self,
        _depositor: Address,
        domains: &[DomainId],
    ) -> Result<GatewayBalances> {
        let state = self.state.lock().unwrap();
        Ok(domains
            .iter()
            .fold(GatewayBalances::new(), |acc, domain| {
                acc.with_balance(*domain, state.balances.get(*domain))
            }))
    }

    async fn submit_transfer(&self, request: &GatewayTransferRequest) -> Result<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(request.clone());
        match &state.submission_error {
            Some(message) => Err(BridgeError::Provider(message.clone())),
            None => Ok(state.attestation.clone()),
        }
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
///
/// `sleep` returns immediately and advances `now` by the requested duration.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }

    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }

    /// Durations passed to `sleep`, in call order
    pub fn sleep_log(&self) -> Vec<Duration> {
        self.sleep_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}

// ============================================================================
// Recording Observer
// ============================================================================

/// Collects every progress event it receives.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<TransferState> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.state)
            .collect()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_network::TransactionBuilder;

    #[tokio::test]
    async fn test_fake_clock_tracks_sleep_calls() {
        let clock = FakeClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(60)).await;
        clock.sleep(Duration::from_secs(120)).await;

        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(180));
        assert_eq!(clock.now() - start, Duration::from_secs(180));
    }

    #[tokio::test]
    async fn test_attestation_script_repeats_last_reply() {
        let provider = FakeAttestationProvider::with_replies(vec![
            AttestationReply::NotFound,
            AttestationReply::pending(),
        ]);

        let first = provider
            .get_attestation(DomainId::Ethereum, TxHash::ZERO)
            .await;
        assert!(matches!(first, Err(BridgeError::AttestationNotFound)));

        for _ in 0..3 {
            let next = provider
                .get_attestation(DomainId::Ethereum, TxHash::ZERO)
                .await
                .unwrap();
            assert_eq!(next.status, AttestationStatus::Pending);
        }
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn test_empty_script_is_not_found() {
        let provider = FakeAttestationProvider::new();
        let result = provider
            .get_attestation(DomainId::Ethereum, TxHash::ZERO)
            .await;
        assert!(matches!(result, Err(BridgeError::AttestationNotFound)));
    }

    #[tokio::test]
    async fn test_send_applies_approve_and_scripted_logs() {
        let client = FakeChainClient::new(SupportedChain::Sepolia);
        let signer = test_signer();
        let usdc = SupportedChain::Sepolia.usdc_address();
        let spender = SupportedChain::Sepolia.token_messenger();
        client.set_logs_for(
            usdc,
            vec![message_sent_log(SupportedChain::Sepolia, Bytes::from_static(&[1]))],
        );

        let call = Erc20::approveCall {
            spender,
            amount: U256::from(7u64),
        };
        let tx = TransactionRequest::default()
            .with_to(usdc)
            .with_input(call.abi_encode());
        let hash = client.send_transaction(&signer, tx).await.unwrap();

        let receipt = client.get_transaction_receipt(hash).await.unwrap().unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.logs.len(), 1);

        let allowance = Erc20::allowanceCall {
            owner: signer.address(),
            spender,
        };
        let output = client
            .call(
                TransactionRequest::default()
                    .with_to(usdc)
                    .with_input(allowance.abi_encode()),
            )
            .await
            .unwrap();
        assert_eq!(
            Erc20::allowanceCall::abi_decode_returns(&output).unwrap(),
            U256::from(7u64)
        );
    }

    #[tokio::test]
    async fn test_unavailable_client_fails_reads() {
        let client = FakeChainClient::new(SupportedChain::Sepolia);
        client.set_unavailable("connection refused");
        assert!(matches!(
            client.get_block_number().await,
            Err(BridgeError::Provider(_))
        ));
    }
}
