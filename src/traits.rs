// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Core trait abstractions for the transfer engines.
//!
//! The engines never talk to an RPC node, Circle's APIs or the system clock
//! directly. Every external collaborator sits behind one of the traits in this
//! module and is injected at construction time, so a single process can run
//! isolated engines per transfer (or per test) and swap in the fakes from
//! [`crate::testing`].
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use usdc_bridge_rs::{Clock};
//! use std::time::{Duration, Instant};
//!
//! struct InstantClock;
//!
//! #[async_trait::async_trait]
//! impl Clock for InstantClock {
//!     async fn sleep(&self, _duration: Duration) {}
//!     fn now(&self) -> Instant { Instant::now() }
//! }
//! ```

use alloy_primitives::{Address, Bytes, Log, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::bridge::ProgressEvent;
use crate::chain::SupportedChain;
use crate::error::Result;
use crate::protocol::{AttestationResponse, DomainId, GatewayBalances, GatewayTransferRequest};

/// Network-agnostic view of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    /// `false` when the transaction reverted
    pub success: bool,
    pub logs: Vec<Log>,
}

/// Per-chain RPC capability set required by the engines.
///
/// Implementations must be safe to share between concurrently running
/// transfers; the production [`AlloyChainClient`](crate::providers::AlloyChainClient)
/// wraps a cloneable connection pool.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Allowances that already cover the amount (approval skipped)
/// - Burn receipts without the expected events
/// - Reverted transactions
/// - Messages that were already received on the destination chain
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The chain this client is connected to.
    fn chain(&self) -> SupportedChain;

    /// Gets the current block number.
    async fn get_block_number(&self) -> Result<u64>;

    /// Native gas-token balance of `address`.
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Executes a read-only call and returns the raw return data.
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes>;

    /// Signs `tx` with `signer` and submits it, returning the transaction hash.
    ///
    /// This does not wait for inclusion.
    async fn send_transaction(
        &self,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
    ) -> Result<TxHash>;

    /// Fetches the receipt for `tx_hash`.
    ///
    /// Returns `None` if the transaction is not found or not yet mined.
    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>>;
}

/// Trait for attestation retrieval from Circle's Iris API.
///
/// Implementations return [`BridgeError::AttestationNotFound`](crate::BridgeError::AttestationNotFound)
/// for HTTP 404 (the attestation does not exist yet) and a hard error for any
/// other non-success status.
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Fetches attestation status and data for the burn transaction `tx_hash`
    /// emitted on `source_domain`.
    async fn get_attestation(
        &self,
        source_domain: DomainId,
        tx_hash: TxHash,
    ) -> Result<AttestationResponse>;
}

/// Trait for Circle Gateway API operations.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Queries unified-balance deposits of `depositor` on every domain in `domains`
    /// with a single request.
    async fn get_balances(&self, depositor: Address, domains: &[DomainId])
        -> Result<GatewayBalances>;

    /// Submits a batch of signed burn intents and returns the settlement attestation.
    async fn submit_transfer(&self, request: &GatewayTransferRequest) -> Result<Bytes>;
}

/// Trait for time-based operations.
///
/// Abstracts sleep and time queries, enabling fast-forward testing where tests
/// can instantly advance through polling loops and timeouts without actually
/// waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    fn now(&self) -> Instant;
}

/// Receives progress events as a transfer moves through its states.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}
