// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Gateway wallet and minter bindings
//!
//! Deposits into the wallet contract credit the depositor's unified balance;
//! the minter releases USDC on the destination once the Gateway API has
//! attested a batch of burn intents.

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use tracing::info;

use crate::protocol::DomainId;

#[derive(Debug, Clone, Copy)]
pub struct GatewayWalletContract {
    address: Address,
}

impl GatewayWalletContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Unsigned `deposit(amount, srcDomain)`; the wallet must already be approved.
    pub fn deposit_transaction(
        &self,
        from: Address,
        amount: U256,
        source_domain: DomainId,
    ) -> TransactionRequest {
        info!(
            from = %from,
            amount = %amount,
            source_domain = source_domain.as_u32(),
            contract_address = %self.address,
            event = "gateway_deposit_transaction_created"
        );

        let call = GatewayWallet::depositCall {
            amount,
            srcDomain: source_domain.as_u32(),
        };
        TransactionRequest::default()
            .with_from(from)
            .with_to(self.address)
            .with_input(call.abi_encode())
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GatewayMinterContract {
    address: Address,
}

impl GatewayMinterContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Unsigned `gatewayMint(burnIntents, signatures, attestation)`.
    pub fn gateway_mint_transaction(
        &self,
        from: Address,
        burn_intents: Vec<Bytes>,
        signatures: Vec<Bytes>,
        attestation: Bytes,
    ) -> TransactionRequest {
        info!(
            from = %from,
            intents = burn_intents.len(),
            attestation_len = attestation.len(),
            contract_address = %self.address,
            event = "gateway_mint_transaction_created"
        );

        let call = GatewayMinter::gatewayMintCall {
            burnIntents: burn_intents,
            signatures,
            attestation,
        };
        TransactionRequest::default()
            .with_from(from)
            .with_to(self.address)
            .with_input(call.abi_encode())
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

sol!(
    #[allow(missing_docs)]
    contract GatewayWallet {
        function deposit(uint256 amount, uint32 srcDomain) external;
    }
);

sol!(
    #[allow(missing_docs)]
    contract GatewayMinter {
        function gatewayMint(bytes[] burnIntents, bytes[] signatures, bytes attestation) external;
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_gateway_mint_keeps_intent_order() {
        let minter = GatewayMinterContract::new(address!("0022222ABE238Cc2C7Bb1f21003F0a260052475B"));
        let intents = vec![Bytes::from_static(&[1]), Bytes::from_static(&[2])];
        let signatures = vec![Bytes::from_static(&[0xa1]), Bytes::from_static(&[0xa2])];

        let tx = minter.gateway_mint_transaction(
            Address::ZERO,
            intents.clone(),
            signatures.clone(),
            Bytes::from_static(&[0xff]),
        );
        let call = GatewayMinter::gatewayMintCall::abi_decode(tx.input.input().unwrap()).unwrap();

        assert_eq!(call.burnIntents, intents);
        assert_eq!(call.signatures, signatures);
        assert_eq!(call.attestation, Bytes::from_static(&[0xff]));
    }

    #[test]
    fn test_deposit_encodes_domain() {
        let wallet = GatewayWalletContract::new(address!("0077777d7EBA4688BDeF3E311b846F25870A19B9"));
        let tx = wallet.deposit_transaction(Address::ZERO, U256::from(7u64), DomainId::Arc);
        let call = GatewayWallet::depositCall::abi_decode(tx.input.input().unwrap()).unwrap();
        assert_eq!(call.amount, U256::from(7u64));
        assert_eq!(call.srcDomain, 26);
    }
}
