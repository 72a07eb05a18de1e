// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! TokenMessengerV2 bindings
//!
//! `depositForBurn` burns USDC on the source chain and emits the cross-chain
//! message that the attestation service signs.

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use tracing::info;

use crate::protocol::{DomainId, FinalityThreshold};
use crate::spans;

/// Arguments of a CCTP v2 burn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositForBurnArgs {
    pub amount: U256,
    pub destination_domain: DomainId,
    pub mint_recipient: Address,
    pub burn_token: Address,
    /// `Address::ZERO` lets anyone relay the mint.
    pub destination_caller: Address,
    pub max_fee: U256,
    pub min_finality_threshold: FinalityThreshold,
}

#[derive(Debug, Clone, Copy)]
pub struct TokenMessengerV2Contract {
    address: Address,
}

impl TokenMessengerV2Contract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Unsigned `depositForBurn` with the seven v2 parameters.
    ///
    /// Addresses placed in `bytes32` slots are left-padded with zeros.
    pub fn deposit_for_burn_transaction(
        &self,
        from_address: Address,
        args: &DepositForBurnArgs,
    ) -> TransactionRequest {
        let span = spans::deposit_for_burn(
            &from_address,
            &args.mint_recipient,
            args.destination_domain.as_u32(),
            &args.burn_token,
            &args.amount,
        );
        let _guard = span.enter();

        info!(
            from_address = %from_address,
            recipient = %args.mint_recipient,
            destination_domain = args.destination_domain.as_u32(),
            token_address = %args.burn_token,
            amount = %args.amount,
            max_fee = %args.max_fee,
            finality = args.min_finality_threshold.as_u32(),
            contract_address = %self.address,
            event = "deposit_for_burn_transaction_created"
        );

        let call = TokenMessengerV2::depositForBurnCall {
            amount: args.amount,
            destinationDomain: args.destination_domain.as_u32(),
            mintRecipient: args.mint_recipient.into_word(),
            burnToken: args.burn_token,
            destinationCaller: args.destination_caller.into_word(),
            maxFee: args.max_fee,
            minFinalityThreshold: args.min_finality_threshold.as_u32(),
        };

        TransactionRequest::default()
            .with_from(from_address)
            .with_to(self.address)
            .with_input(call.abi_encode())
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

sol!(
    #[allow(clippy::too_many_arguments)]
    #[allow(missing_docs)]
    contract TokenMessengerV2 {
        event DepositForBurn(
            address indexed burnToken,
            uint256 amount,
            address indexed depositor,
            bytes32 mintRecipient,
            uint32 destinationDomain,
            bytes32 destinationTokenMessenger,
            bytes32 destinationCaller,
            uint256 maxFee,
            uint32 indexed minFinalityThreshold,
            bytes hookData
        );

        function depositForBurn(
            uint256 amount,
            uint32 destinationDomain,
            bytes32 mintRecipient,
            address burnToken,
            bytes32 destinationCaller,
            uint256 maxFee,
            uint32 minFinalityThreshold
        ) external returns (uint64 nonce);
    }
);
