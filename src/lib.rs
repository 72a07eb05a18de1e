// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! # usdc-bridge-rs
//!
//! Cross-chain USDC transfers through Circle's CCTP v2 and Circle Gateway.
//!
//! The crate is organised in three layers:
//!
//! - [`CctpTransferEngine`] runs one CCTP transfer: approve and burn on the
//!   source chain, poll the attestation service, mint on the destination.
//! - [`GatewayRoutingEngine`](gateway::GatewayRoutingEngine) spends a unified
//!   Gateway balance spread over several chains.
//! - [`TransferOrchestrator`] validates requests, runs the engines under a
//!   deadline and reports every result, including failures, as a
//!   [`TransferOutcome`].
//!
//! Every external collaborator (RPC node, attestation API, Gateway API, clock)
//! is injected through the traits in [`traits`], so engines can be built per
//! transfer and driven by the fakes in [`testing`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use usdc_bridge_rs::config::EngineConfig;
//! use usdc_bridge_rs::orchestrator::{TransferOptions, TransferRequest};
//! use usdc_bridge_rs::TransferOrchestrator;
//! use alloy_primitives::U256;
//! use alloy_signer_local::PrivateKeySigner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::from_env()?;
//! let (source, destination) = config.connect_chains();
//!
//! let orchestrator = TransferOrchestrator::builder()
//!     .source(source)
//!     .destination(destination)
//!     .attestation_provider(Arc::new(config.attestation_provider()))
//!     .config(config.orchestrator_config())
//!     .build();
//!
//! let signer: PrivateKeySigner = std::env::var("PRIVATE_KEY")?.parse()?;
//! let request = TransferRequest::new(
//!     U256::from(10_000_000u64),
//!     "0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d",
//! );
//!
//! let outcome = orchestrator
//!     .transfer(&request, &signer, TransferOptions::default())
//!     .await;
//! if let Some(error) = &outcome.error {
//!     eprintln!("{}: {}", error.kind, error.message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Recovering a Transfer
//!
//! A transfer that fails after its burn reports the burn hash in
//! [`OutcomeError::burn_tx_hash`](orchestrator::OutcomeError). Passing it to
//! [`TransferOrchestrator::resume`] finishes the transfer without burning
//! again; a message that was already received is reported as
//! [`BridgeError::AlreadyMinted`].

pub mod bridge;
pub mod chain;
pub mod config;
pub mod contracts;
mod error;
pub mod gateway;
pub mod orchestrator;
pub mod poller;
pub mod protocol;
pub mod provider;
pub mod providers;
pub mod spans;
pub mod testing;
pub mod traits;

pub use bridge::{
    Attestation, AttestationCache, BurnResult, CctpTransferEngine, MintResult, ProgressEvent,
    TracingObserver, TransferConfig, TransferIntent, TransferResult, TransferState,
};
pub use chain::SupportedChain;
pub use error::{BridgeError, GatewayStage, Result, TransferStage, ValidationError};
pub use gateway::{plan_route, GatewayRoutingEngine, TransferRoute};
pub use orchestrator::{TransferOrchestrator, TransferOutcome};
pub use poller::{BackoffConfig, BackoffPoller, CancellationToken, PollError, TimeoutCause};
pub use protocol::{DomainId, FinalityThreshold};
pub use provider::{calculate_gas_price_with_buffer, ProviderConfig};
pub use traits::{AttestationProvider, ChainClient, Clock, GatewayApi, ProgressObserver, TxReceipt};
