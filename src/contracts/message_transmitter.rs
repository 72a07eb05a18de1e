// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! MessageTransmitterV2 bindings
//!
//! The source-chain transmitter emits `MessageSent(bytes)` during a burn; the
//! destination-chain transmitter verifies the attestation in `receiveMessage`
//! and records the consumed nonce in `usedNonces`.

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::traits::ChainClient;

pub use MessageTransmitterV2::MessageSent;

#[derive(Clone)]
pub struct MessageTransmitterV2Contract {
    address: Address,
    client: Arc<dyn ChainClient>,
}

impl MessageTransmitterV2Contract {
    pub fn new(address: Address, client: Arc<dyn ChainClient>) -> Self {
        Self { address, client }
    }

    /// Unsigned `receiveMessage(message, attestation)` sent from `from_address`.
    pub fn receive_message_transaction(
        &self,
        message: Bytes,
        attestation: Bytes,
        from_address: Address,
    ) -> TransactionRequest {
        info!(
            message_len = message.len(),
            attestation_len = attestation.len(),
            from_address = %from_address,
            contract_address = %self.address,
            event = "receive_message_transaction_created"
        );

        let call = MessageTransmitterV2::receiveMessageCall {
            message,
            attestation,
        };
        TransactionRequest::default()
            .with_from(from_address)
            .with_to(self.address)
            .with_input(call.abi_encode())
    }

    /// Whether the message with `nonce` was already received on this chain.
    pub async fn is_message_received(&self, nonce: FixedBytes<32>) -> Result<bool> {
        let call = MessageTransmitterV2::usedNoncesCall { nonce };
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(call.abi_encode());

        let output = self.client.call(tx).await?;
        let used = MessageTransmitterV2::usedNoncesCall::abi_decode_returns(&output)?;

        debug!(
            nonce = %nonce,
            used = %used,
            contract_address = %self.address,
            event = "used_nonce_checked"
        );

        Ok(used != U256::ZERO)
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

sol!(
    #[allow(missing_docs)]
    contract MessageTransmitterV2 {
        event MessageSent(bytes message);

        function receiveMessage(bytes message, bytes attestation) external returns (bool success);
        function usedNonces(bytes32 nonce) external view returns (uint256);
    }
);
