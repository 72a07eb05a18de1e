// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::{Address, Bytes, FixedBytes, TxHash, U256};
use serde::Serialize;

use crate::chain::SupportedChain;
use crate::error::ValidationError;

/// A request to move `amount` atomic USDC units to `recipient`.
///
/// Fields are private so a constructed intent always has a positive amount
/// and two distinct chains.
///
/// ```rust
/// use usdc_bridge_rs::{SupportedChain, TransferIntent};
/// use alloy_primitives::{address, U256};
///
/// let intent = TransferIntent::new(
///     U256::from(10_000_000u64),
///     address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d"),
///     SupportedChain::Sepolia,
///     SupportedChain::ArcTestnet,
/// )?;
/// assert_eq!(intent.amount(), U256::from(10_000_000u64));
/// # Ok::<(), usdc_bridge_rs::ValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferIntent {
    amount: U256,
    recipient: Address,
    source_chain: SupportedChain,
    destination_chain: SupportedChain,
}

impl TransferIntent {
    pub fn new(
        amount: U256,
        recipient: Address,
        source_chain: SupportedChain,
        destination_chain: SupportedChain,
    ) -> Result<Self, ValidationError> {
        if amount.is_zero() {
            return Err(ValidationError::NonPositiveAmount);
        }
        if source_chain == destination_chain {
            return Err(ValidationError::SameChain(source_chain.to_string()));
        }
        Ok(Self {
            amount,
            recipient,
            source_chain,
            destination_chain,
        })
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    pub fn source_chain(&self) -> SupportedChain {
        self.source_chain
    }

    pub fn destination_chain(&self) -> SupportedChain {
        self.destination_chain
    }
}

/// Outcome of the source-chain half of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnResult {
    /// Set only when the existing allowance did not cover the amount
    pub approve_tx_hash: Option<TxHash>,
    pub burn_tx_hash: TxHash,
    /// Present only when the emitted message already carries a nonce
    pub nonce: Option<FixedBytes<32>>,
    /// `MessageSent` payload
    pub message: Bytes,
}

/// Attestation for one burn, ready to be submitted with `receiveMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub signature: Bytes,
    pub encoded_message: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintResult {
    pub mint_tx_hash: TxHash,
}

/// Every transaction produced by a completed transfer or resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferResult {
    pub source_chain: SupportedChain,
    pub destination_chain: SupportedChain,
    /// `None` when the transfer was resumed from a burn hash
    pub approve_tx_hash: Option<TxHash>,
    pub burn_tx_hash: TxHash,
    pub mint_tx_hash: TxHash,
    pub nonce: Option<FixedBytes<32>>,
}
