// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! EIP-712 burn intents
//!
//! A burn intent authorizes Gateway to debit the depositor's balance on one
//! source domain. It is signed as typed data under the `GatewayWallet`
//! domain and submitted ABI-encoded next to its signature.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{eip712_domain, sol, Eip712Domain, SolStruct, SolValue};
use tracing::debug;

use super::route::SourceAllocation;
use crate::chain::SupportedChain;
use crate::error::{BridgeError, GatewayStage, Result};

/// Version of the transfer spec layout.
pub const TRANSFER_SPEC_VERSION: u32 = 1;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct TransferSpec {
        uint32 version;
        uint32 sourceDomain;
        uint32 destinationDomain;
        bytes32 sourceContract;
        bytes32 destinationContract;
        bytes32 sourceToken;
        bytes32 destinationToken;
        bytes32 sourceDepositor;
        bytes32 destinationRecipient;
        bytes32 sourceSigner;
        bytes32 destinationCaller;
        uint256 value;
        bytes32 salt;
        bytes hookData;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct BurnIntent {
        uint256 maxBlockHeight;
        uint256 maxFee;
        TransferSpec spec;
    }
}

/// Typed-data domain every burn intent is signed under.
pub fn gateway_eip712_domain() -> Eip712Domain {
    eip712_domain! {
        name: "GatewayWallet",
        version: "1",
    }
}

/// Inputs for one burn intent.
#[derive(Debug, Clone, Copy)]
pub struct BurnIntentParams {
    pub allocation: SourceAllocation,
    pub destination_chain: SupportedChain,
    pub depositor: Address,
    pub recipient: Address,
    pub max_block_height: u64,
    pub max_fee: U256,
    pub salt: B256,
}

impl BurnIntent {
    /// Builds the intent; every address is left-padded into its `bytes32` slot.
    pub fn from_params(params: &BurnIntentParams) -> Self {
        let source = params.allocation.chain;
        let destination = params.destination_chain;

        Self {
            maxBlockHeight: U256::from(params.max_block_height),
            maxFee: params.max_fee,
            spec: TransferSpec {
                version: TRANSFER_SPEC_VERSION,
                sourceDomain: params.allocation.domain.as_u32(),
                destinationDomain: destination.domain().as_u32(),
                sourceContract: source.gateway_wallet().into_word(),
                destinationContract: destination.gateway_minter().into_word(),
                sourceToken: source.usdc_address().into_word(),
                destinationToken: destination.usdc_address().into_word(),
                sourceDepositor: params.depositor.into_word(),
                destinationRecipient: params.recipient.into_word(),
                sourceSigner: params.depositor.into_word(),
                destinationCaller: B256::ZERO,
                value: params.allocation.amount,
                salt: params.salt,
                hookData: Bytes::new(),
            },
        }
    }
}

/// A burn intent with its encoding and signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedBurnIntent {
    pub source_chain: SupportedChain,
    pub intent: BurnIntent,
    /// ABI encoding of `intent`, as submitted and passed to `gatewayMint`
    pub encoded: Bytes,
    /// EIP-712 digest that was signed
    pub signing_hash: B256,
    /// 65-byte `r || s || v` signature
    pub signature: Bytes,
}

/// Signs `intent` as EIP-712 typed data.
pub async fn sign_burn_intent(
    source_chain: SupportedChain,
    intent: BurnIntent,
    signer: &PrivateKeySigner,
) -> Result<SignedBurnIntent> {
    let signing_hash = intent.eip712_signing_hash(&gateway_eip712_domain());
    let signature = signer
        .sign_hash(&signing_hash)
        .await
        .map_err(|e| BridgeError::gateway_failed(GatewayStage::Sign, e))?;
    let encoded = Bytes::from(intent.abi_encode());

    debug!(
        source_chain = %source_chain,
        signing_hash = %signing_hash,
        encoded_len = encoded.len(),
        event = "burn_intent_signed"
    );

    Ok(SignedBurnIntent {
        source_chain,
        intent,
        encoded,
        signing_hash,
        signature: Bytes::from(signature.as_bytes().to_vec()),
    })
}

/// Salt of one allocation's intent within the transfer attempt identified by
/// `attempt`.
///
/// The salt is a pure function of its inputs; a fresh `attempt` per transfer
/// keeps intents of repeated transfers distinct.
pub fn intent_salt(
    attempt: B256,
    depositor: Address,
    allocation: &SourceAllocation,
    index: usize,
) -> B256 {
    keccak256(
        (
            attempt,
            depositor,
            allocation.domain.as_u32(),
            allocation.amount,
            U256::from(index),
        )
            .abi_encode(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DomainId;
    use crate::testing::test_signer;
    use alloy_primitives::{address, Signature};

    fn params() -> BurnIntentParams {
        BurnIntentParams {
            allocation: SourceAllocation {
                chain: SupportedChain::Sepolia,
                domain: DomainId::Ethereum,
                amount: U256::from(5_000_000u64),
            },
            destination_chain: SupportedChain::ArcTestnet,
            depositor: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            recipient: address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d"),
            max_block_height: 1_010_000,
            max_fee: U256::from(10_000u64),
            salt: B256::repeat_byte(0x42),
        }
    }

    #[test]
    fn test_intent_binds_domains_and_pads_addresses() {
        let intent = BurnIntent::from_params(&params());

        assert_eq!(intent.spec.sourceDomain, 0);
        assert_eq!(intent.spec.destinationDomain, 26);
        assert_eq!(
            intent.spec.destinationRecipient,
            address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d").into_word()
        );
        assert_eq!(&intent.spec.destinationRecipient[..12], &[0u8; 12]);
        assert_eq!(intent.maxBlockHeight, U256::from(1_010_000u64));
    }

    #[test]
    fn test_encoding_round_trips() {
        let intent = BurnIntent::from_params(&params());
        let decoded = BurnIntent::abi_decode(&intent.abi_encode()).unwrap();
        assert_eq!(decoded, intent);
    }

    #[test]
    fn test_type_string() {
        insta::assert_snapshot!(
            BurnIntent::eip712_encode_type(),
            @"BurnIntent(uint256 maxBlockHeight,uint256 maxFee,TransferSpec spec)TransferSpec(uint32 version,uint32 sourceDomain,uint32 destinationDomain,bytes32 sourceContract,bytes32 destinationContract,bytes32 sourceToken,bytes32 destinationToken,bytes32 sourceDepositor,bytes32 destinationRecipient,bytes32 sourceSigner,bytes32 destinationCaller,uint256 value,bytes32 salt,bytes hookData)"
        );
    }

    #[tokio::test]
    async fn test_signature_recovers_signer() {
        let signer = test_signer();
        let intent = BurnIntent::from_params(&params());

        let signed = sign_burn_intent(SupportedChain::Sepolia, intent, &signer)
            .await
            .unwrap();

        assert_eq!(signed.signature.len(), 65);
        let signature = Signature::from_raw(&signed.signature).unwrap();
        let recovered = signature
            .recover_address_from_prehash(&signed.signing_hash)
            .unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn test_salt_is_reproducible_per_attempt() {
        let allocation = params().allocation;
        let depositor = params().depositor;
        let attempt = B256::repeat_byte(0x01);

        assert_eq!(
            intent_salt(attempt, depositor, &allocation, 0),
            intent_salt(attempt, depositor, &allocation, 0)
        );
        assert_ne!(
            intent_salt(attempt, depositor, &allocation, 0),
            intent_salt(attempt, depositor, &allocation, 1)
        );
        assert_ne!(
            intent_salt(attempt, depositor, &allocation, 0),
            intent_salt(B256::repeat_byte(0x02), depositor, &allocation, 0)
        );
    }
}
