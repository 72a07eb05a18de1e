// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::{FixedBytes, TxHash, U256};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::poller::TimeoutCause;

/// Pipeline stage a CCTP failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStage {
    Approve,
    Burn,
    Attestation,
    Mint,
}

impl TransferStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Burn => "burn",
            Self::Attestation => "attestation",
            Self::Mint => "mint",
        }
    }
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of a Gateway transfer or deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayStage {
    Balance,
    Approve,
    Deposit,
    Sign,
    Submit,
    Mint,
}

impl GatewayStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Approve => "approve",
            Self::Deposit => "deposit",
            Self::Sign => "sign",
            Self::Submit => "submit",
            Self::Mint => "mint",
        }
    }
}

impl fmt::Display for GatewayStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precondition failures detected before any on-chain call. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid recipient address: {0}")]
    InvalidAddress(String),

    #[error("Amount must be a positive integer")]
    NonPositiveAmount,

    #[error("Insufficient USDC balance: have {available}, need {required}")]
    InsufficientBalance { available: U256, required: U256 },

    #[error("No single source chain can cover the transfer fee of {fee}")]
    FeeNotCovered { fee: U256 },

    #[error("Insufficient gas balance on {chain}: have {available}, need at least {required}")]
    InsufficientGas {
        chain: String,
        available: U256,
        required: U256,
    },

    #[error("Source and destination chain are the same: {0}")]
    SameChain(String),
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Chain not supported: {chain}")]
    ChainNotSupported { chain: String },

    #[error("Transfer failed during {stage}: {message}")]
    TransferFailed {
        stage: TransferStage,
        message: String,
    },

    #[error("{event} event not found in logs of transaction {tx_hash}")]
    EventNotFound {
        event: &'static str,
        tx_hash: TxHash,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Attestation not found (will retry)")]
    AttestationNotFound,

    #[error("Attestation service returned HTTP {status}: {body}")]
    AttestationHttp { status: u16, body: String },

    #[error("Timeout waiting for attestation ({cause}) after {attempts} attempts in {elapsed:?}")]
    AttestationTimeout {
        cause: TimeoutCause,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("Timeout waiting for confirmation of {tx_hash} ({cause})")]
    ConfirmationTimeout {
        tx_hash: TxHash,
        cause: TimeoutCause,
    },

    #[error("Transaction {tx_hash} reverted")]
    TransactionReverted { tx_hash: TxHash },

    #[error("Message with nonce {nonce} was already received on the destination chain")]
    AlreadyMinted { nonce: FixedBytes<32> },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline of {deadline:?} exceeded during {stage}")]
    DeadlineExceeded { stage: String, deadline: Duration },

    #[error("Insufficient Gateway balance: requested {requested}, available {available}")]
    GatewayInsufficientBalance { requested: U256, available: U256 },

    #[error("Gateway deposit of {amount} is below the minimum of {minimum}")]
    GatewayDepositTooSmall { amount: U256, minimum: U256 },

    #[error("Gateway transfer failed during {stage}: {message}")]
    GatewayTransferFailed { stage: GatewayStage, message: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Signing error: {0}")]
    Signer(#[from] alloy_signer::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

impl BridgeError {
    /// Short machine-readable kind, used when errors cross the orchestrator boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::ChainNotSupported { .. } => "chain_not_supported",
            Self::TransferFailed { .. } => "transfer_failed",
            Self::EventNotFound { .. } => "event_not_found",
            Self::Network(_) => "network",
            Self::Provider(_) => "provider",
            Self::AttestationFailed { .. } => "attestation_failed",
            Self::AttestationNotFound => "attestation_not_found",
            Self::AttestationHttp { .. } => "attestation_http",
            Self::AttestationTimeout { .. } => "attestation_timeout",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::TransactionReverted { .. } => "transaction_reverted",
            Self::AlreadyMinted { .. } => "already_minted",
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::GatewayInsufficientBalance { .. } => "gateway_insufficient_balance",
            Self::GatewayDepositTooSmall { .. } => "gateway_deposit_too_small",
            Self::GatewayTransferFailed { .. } => "gateway_transfer_failed",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::InvalidConfig(_) => "invalid_config",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::Rpc(_) => "rpc",
            Self::Abi(_) => "abi",
            Self::Signer(_) => "signer",
            Self::Json(_) => "json",
            Self::Hex(_) => "hex",
        }
    }

    pub(crate) fn transfer_failed(stage: TransferStage, err: impl fmt::Display) -> Self {
        Self::TransferFailed {
            stage,
            message: err.to_string(),
        }
    }

    pub(crate) fn gateway_failed(stage: GatewayStage, err: impl fmt::Display) -> Self {
        Self::GatewayTransferFailed {
            stage,
            message: err.to_string(),
        }
    }

    /// Tags low-level submission and confirmation failures with the CCTP stage.
    ///
    /// Errors that already carry their own meaning (cancellation, missing
    /// events, attestation outcomes, already-minted) pass through unchanged.
    pub(crate) fn at_stage(self, stage: TransferStage) -> Self {
        match self {
            Self::Rpc(_)
            | Self::Provider(_)
            | Self::Signer(_)
            | Self::Abi(_)
            | Self::Network(_)
            | Self::Json(_)
            | Self::Hex(_)
            | Self::ConfirmationTimeout { .. }
            | Self::TransactionReverted { .. } => Self::transfer_failed(stage, self),
            other => other,
        }
    }

    /// Wraps any failure inside a Gateway operation with its stage.
    pub(crate) fn at_gateway_stage(self, stage: GatewayStage) -> Self {
        match self {
            Self::GatewayTransferFailed { .. }
            | Self::Cancelled
            | Self::DeadlineExceeded { .. } => self,
            other => Self::gateway_failed(stage, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_failed_display_includes_stage() {
        let err = BridgeError::transfer_failed(TransferStage::Burn, "execution reverted");
        assert_eq!(
            err.to_string(),
            "Transfer failed during burn: execution reverted"
        );
        assert_eq!(err.kind(), "transfer_failed");
    }

    #[test]
    fn test_gateway_failed_wraps_stage_and_message() {
        let err = BridgeError::gateway_failed(GatewayStage::Submit, "HTTP 500");
        assert!(matches!(
            err,
            BridgeError::GatewayTransferFailed {
                stage: GatewayStage::Submit,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Gateway transfer failed during submit: HTTP 500");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: BridgeError = ValidationError::NonPositiveAmount.into();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_at_stage_wraps_provider_errors_only() {
        let wrapped = BridgeError::Provider("nonce too low".into()).at_stage(TransferStage::Mint);
        assert!(matches!(
            wrapped,
            BridgeError::TransferFailed {
                stage: TransferStage::Mint,
                ..
            }
        ));

        let passthrough = BridgeError::Cancelled.at_stage(TransferStage::Burn);
        assert!(matches!(passthrough, BridgeError::Cancelled));
    }

    #[test]
    fn test_at_gateway_stage_does_not_double_wrap() {
        let inner = BridgeError::gateway_failed(GatewayStage::Sign, "bad key");
        let err = inner.at_gateway_stage(GatewayStage::Submit);
        assert!(matches!(
            err,
            BridgeError::GatewayTransferFailed {
                stage: GatewayStage::Sign,
                ..
            }
        ));

        let wrapped = BridgeError::AttestationNotFound.at_gateway_stage(GatewayStage::Mint);
        assert_eq!(wrapped.kind(), "gateway_transfer_failed");
    }

    #[test]
    fn test_timeout_cause_in_message() {
        let err = BridgeError::AttestationTimeout {
            cause: TimeoutCause::MaxAttempts,
            attempts: 5,
            elapsed: Duration::from_secs(10),
        };
        assert!(err.to_string().contains("max_attempts"));
    }
}
