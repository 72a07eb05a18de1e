// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use bon::Builder;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, Instrument};

use super::intent::{intent_salt, sign_burn_intent, BurnIntent, BurnIntentParams, SignedBurnIntent};
use super::route::{
    self, TransferRoute, UnifiedBalance, GATEWAY_INTENT_BLOCK_WINDOW, GATEWAY_MINIMUM_DEPOSIT,
    GATEWAY_TRANSFER_FEE,
};
use crate::bridge::TransactionSender;
use crate::chain::SupportedChain;
use crate::contracts::{Erc20Contract, GatewayMinterContract, GatewayWalletContract};
use crate::error::{BridgeError, GatewayStage, Result};
use crate::poller::CancellationToken;
use crate::protocol::{DomainId, GatewayTransferRequest};
use crate::provider::ProviderConfig;
use crate::providers::TokioClock;
use crate::spans;
use crate::traits::{ChainClient, Clock, GatewayApi};

/// A deposit into the Gateway wallet on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositParams {
    pub chain: SupportedChain,
    pub amount: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositResult {
    pub chain: SupportedChain,
    /// Set only when the existing allowance did not cover the amount
    pub approve_tx_hash: Option<TxHash>,
    pub deposit_tx_hash: TxHash,
}

/// A settled Gateway transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTransferResult {
    pub destination_chain: SupportedChain,
    pub total_amount: U256,
    pub fee: U256,
    pub intents: Vec<SignedBurnIntent>,
    pub attestation: Bytes,
    pub mint_tx_hash: TxHash,
}

/// Unified-balance transfers through Circle Gateway.
///
/// One [`ChainClient`] is registered per chain the engine may touch: sources
/// need one for their block height, deposits for approval and `deposit`, and
/// the destination for `gatewayMint`.
#[derive(Builder)]
pub struct GatewayRoutingEngine {
    api: Arc<dyn GatewayApi>,
    #[builder(default)]
    chains: Vec<Arc<dyn ChainClient>>,
    #[builder(default = Arc::new(TokioClock) as Arc<dyn Clock>)]
    clock: Arc<dyn Clock>,
    #[builder(default)]
    provider_config: ProviderConfig,
    #[builder(default)]
    cancel: CancellationToken,
}

impl fmt::Debug for GatewayRoutingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chains: Vec<_> = self.chains.iter().map(|c| c.chain()).collect();
        f.debug_struct("GatewayRoutingEngine")
            .field("chains", &chains)
            .finish_non_exhaustive()
    }
}

impl GatewayRoutingEngine {
    /// Chains with a registered client, in registration order.
    pub fn chains(&self) -> Vec<SupportedChain> {
        self.chains.iter().map(|client| client.chain()).collect()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn client(&self, chain: SupportedChain) -> Result<&Arc<dyn ChainClient>> {
        self.chains
            .iter()
            .find(|client| client.chain() == chain)
            .ok_or_else(|| BridgeError::ChainNotSupported {
                chain: format!("{chain} (no client registered)"),
            })
    }

    fn sender(&self, client: &Arc<dyn ChainClient>) -> TransactionSender {
        TransactionSender::new(
            client.clone(),
            self.clock.clone(),
            self.provider_config.confirmation,
            self.cancel.clone(),
        )
    }

    /// Gateway deposits of `depositor` on each of `chains`, fetched in one request.
    pub async fn get_unified_balance(
        &self,
        depositor: Address,
        chains: &[SupportedChain],
    ) -> Result<UnifiedBalance> {
        let mut domains: Vec<DomainId> = chains.iter().map(|chain| chain.domain()).collect();
        domains.sort();
        domains.dedup();

        let balances = self
            .api
            .get_balances(depositor, &domains)
            .await
            .map_err(|e| e.at_gateway_stage(GatewayStage::Balance))?;
        let unified = UnifiedBalance::from_chains(chains, &balances);

        debug!(
            depositor = %depositor,
            chains = chains.len(),
            total = %unified.total,
            event = "unified_balance_retrieved"
        );
        Ok(unified)
    }

    /// Reads balances on `candidates` and plans a route to `destination_chain`.
    ///
    /// See [`route::plan_route`] for the allocation rules.
    pub async fn plan_route(
        &self,
        amount: U256,
        destination_chain: SupportedChain,
        depositor: Address,
        candidates: &[SupportedChain],
    ) -> Result<TransferRoute> {
        let unified = self.get_unified_balance(depositor, candidates).await?;
        route::plan_route(amount, destination_chain, &unified.balances)
    }

    /// Moves `amount` USDC from the signer's wallet into the Gateway wallet on
    /// `params.chain`, approving first when the allowance is short.
    pub async fn deposit(
        &self,
        params: &DepositParams,
        signer: &PrivateKeySigner,
    ) -> Result<DepositResult> {
        if params.amount < GATEWAY_MINIMUM_DEPOSIT {
            return Err(BridgeError::GatewayDepositTooSmall {
                amount: params.amount,
                minimum: GATEWAY_MINIMUM_DEPOSIT,
            });
        }

        let span = spans::gateway_deposit(params.chain, &params.amount);
        let result = self
            .deposit_steps(params, signer)
            .instrument(span.clone())
            .await;
        if let Err(e) = &result {
            span.in_scope(|| spans::record_error(e));
        }
        result
    }

    async fn deposit_steps(
        &self,
        params: &DepositParams,
        signer: &PrivateKeySigner,
    ) -> Result<DepositResult> {
        let client = self
            .client(params.chain)
            .map_err(|e| e.at_gateway_stage(GatewayStage::Deposit))?;
        let owner = signer.address();
        let wallet = GatewayWalletContract::new(params.chain.gateway_wallet());
        let usdc = Erc20Contract::new(params.chain.usdc_address(), client.clone());
        let sender = self.sender(client);

        let allowance = usdc
            .allowance(owner, wallet.address())
            .await
            .map_err(|e| e.at_gateway_stage(GatewayStage::Approve))?;

        let approve_tx_hash = if allowance < params.amount {
            let tx = usdc.approve_transaction(owner, wallet.address(), params.amount);
            let receipt = sender
                .send_and_confirm(signer, tx, "approve")
                .await
                .map_err(|e| e.at_gateway_stage(GatewayStage::Approve))?;
            Some(receipt.transaction_hash)
        } else {
            debug!(allowance = %allowance, event = "approval_skipped");
            None
        };

        let tx = wallet.deposit_transaction(owner, params.amount, params.chain.domain());
        let receipt = sender
            .send_and_confirm(signer, tx, "gateway_deposit")
            .await
            .map_err(|e| e.at_gateway_stage(GatewayStage::Deposit))?;

        info!(
            chain = %params.chain,
            amount = %params.amount,
            deposit_tx_hash = %receipt.transaction_hash,
            event = "gateway_deposit_confirmed"
        );

        Ok(DepositResult {
            chain: params.chain,
            approve_tx_hash,
            deposit_tx_hash: receipt.transaction_hash,
        })
    }

    /// Signs one burn intent per allocation, submits them as one batch and
    /// mints on the destination chain.
    ///
    /// Either every intent settles and the mint is confirmed, or the call
    /// fails with [`BridgeError::GatewayTransferFailed`] naming the stage.
    pub async fn execute_transfer(
        &self,
        route: &TransferRoute,
        recipient: Address,
        signer: &PrivateKeySigner,
    ) -> Result<GatewayTransferResult> {
        let span = spans::gateway_transfer(
            route.destination_chain,
            &route.total_amount,
            route.source_allocations.len(),
        );
        let result = self
            .transfer_steps(route, recipient, signer)
            .instrument(span.clone())
            .await;
        if let Err(e) = &result {
            span.in_scope(|| spans::record_error(e));
        }
        result
    }

    async fn transfer_steps(
        &self,
        route: &TransferRoute,
        recipient: Address,
        signer: &PrivateKeySigner,
    ) -> Result<GatewayTransferResult> {
        check_route(route)?;
        let destination = self
            .client(route.destination_chain)
            .map_err(|e| e.at_gateway_stage(GatewayStage::Mint))?;
        let depositor = signer.address();
        let attempt = B256::random();

        let mut intents = Vec::with_capacity(route.source_allocations.len());
        for (index, allocation) in route.source_allocations.iter().enumerate() {
            let signed = async {
                let source = self.client(allocation.chain)?;
                let block_number = source.get_block_number().await?;
                let params = BurnIntentParams {
                    allocation: *allocation,
                    destination_chain: route.destination_chain,
                    depositor,
                    recipient,
                    max_block_height: block_number.saturating_add(GATEWAY_INTENT_BLOCK_WINDOW),
                    max_fee: route.max_fee_for(allocation.chain),
                    salt: intent_salt(attempt, depositor, allocation, index),
                };
                sign_burn_intent(allocation.chain, BurnIntent::from_params(&params), signer).await
            }
            .await
            .map_err(|e| e.at_gateway_stage(GatewayStage::Sign))?;
            intents.push(signed);
        }

        let request = GatewayTransferRequest {
            burn_intents: intents.iter().map(|i| i.encoded.clone()).collect(),
            signatures: intents.iter().map(|i| i.signature.clone()).collect(),
        };

        info!(
            intents = intents.len(),
            total_amount = %route.total_amount,
            destination_chain = %route.destination_chain,
            event = "gateway_transfer_submitted"
        );

        let attestation = self
            .api
            .submit_transfer(&request)
            .await
            .map_err(|e| e.at_gateway_stage(GatewayStage::Submit))?;

        let minter = GatewayMinterContract::new(route.destination_chain.gateway_minter());
        let tx = minter.gateway_mint_transaction(
            depositor,
            request.burn_intents,
            request.signatures,
            attestation.clone(),
        );
        let receipt = self
            .sender(destination)
            .send_and_confirm(signer, tx, "gateway_mint")
            .await
            .map_err(|e| e.at_gateway_stage(GatewayStage::Mint))?;

        info!(
            mint_tx_hash = %receipt.transaction_hash,
            destination_chain = %route.destination_chain,
            event = "gateway_mint_confirmed"
        );

        Ok(GatewayTransferResult {
            destination_chain: route.destination_chain,
            total_amount: route.total_amount,
            fee: route.estimated_fee,
            intents,
            attestation,
            mint_tx_hash: receipt.transaction_hash,
        })
    }
}

/// Rejects routes that could not have come from [`route::plan_route`].
fn check_route(route: &TransferRoute) -> Result<()> {
    let invalid = |reason: &str| Err(BridgeError::gateway_failed(GatewayStage::Sign, reason));

    if route.source_allocations.is_empty() {
        return invalid("route has no source allocations");
    }
    if route
        .source_allocations
        .iter()
        .any(|a| a.chain == route.destination_chain)
    {
        return invalid("route draws from its destination chain");
    }
    let sum = route
        .source_allocations
        .iter()
        .fold(U256::ZERO, |acc, a| acc.saturating_add(a.amount));
    if sum != route.total_amount {
        return invalid("allocations do not add up to the route total");
    }
    match route.fee_source {
        Some(chain) if route.source_allocations.iter().any(|a| a.chain == chain) => Ok(()),
        _ => invalid("route has no source able to pay the transfer fee"),
    }
}
