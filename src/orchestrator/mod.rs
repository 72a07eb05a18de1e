// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Entry points for callers outside the crate
//!
//! [`TransferOrchestrator`] validates requests, runs the engines under an
//! overall deadline and turns every failure into a [`TransferOutcome`]. None
//! of its operations return `Err`.

mod outcome;
mod validation;

pub use outcome::{OutcomeError, TransferOutcome};
pub use validation::{
    parse_recipient, validate_transfer, AccountBalances, TransferRequest, ValidatedTransfer,
};

use alloy_primitives::{Address, TxHash, U256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use bon::Builder;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{error, info, warn, Instrument};

use crate::bridge::{CctpTransferEngine, TracingObserver, TransferConfig, TransferResult};
use crate::chain::SupportedChain;
use crate::contracts::Erc20Contract;
use crate::error::{BridgeError, Result, ValidationError};
use crate::gateway::{
    plan_route, DepositParams, DepositResult, GatewayRoutingEngine, GatewayTransferResult,
    UnifiedBalance,
};
use crate::poller::CancellationToken;
use crate::provider::ProviderConfig;
use crate::providers::TokioClock;
use crate::spans;
use crate::traits::{AttestationProvider, ChainClient, Clock, ProgressObserver};

/// Default budget for one orchestrated operation (45 minutes).
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(45 * 60);

/// Default minimum gas-token balance on the source chain (0.0005 native units).
pub const DEFAULT_MIN_GAS_BALANCE: U256 = U256::from_limbs([500_000_000_000_000, 0, 0, 0]);

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Upper bound for a whole `transfer`, `resume` or Gateway call
    pub deadline: Duration,
    /// Finality, fee cap and attestation polling for CCTP transfers
    pub transfer: TransferConfig,
    pub provider: ProviderConfig,
    /// Gas-token balance the sender must hold on the source chain
    pub min_gas_balance: U256,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            transfer: TransferConfig::default(),
            provider: ProviderConfig::default(),
            min_gas_balance: DEFAULT_MIN_GAS_BALANCE,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_transfer(mut self, transfer: TransferConfig) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_min_gas_balance(mut self, min_gas_balance: U256) -> Self {
        self.min_gas_balance = min_gas_balance;
        self
    }
}

/// Caller switches for `transfer` and `gateway_transfer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder)]
pub struct TransferOptions {
    /// The caller already confirmed with the user; recorded in logs only
    #[builder(default)]
    pub skip_confirm: bool,
    /// Stop after validation without sending anything
    #[builder(default)]
    pub dry_run: bool,
}

/// A Gateway transfer as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTransferOrder {
    pub amount: U256,
    pub recipient: String,
    pub destination_chain: SupportedChain,
    /// Chains whose deposits may be spent
    pub source_chains: Vec<SupportedChain>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainBalance {
    pub chain: SupportedChain,
    pub usdc: U256,
    pub gas: U256,
}

/// Balances of one address across the configured chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountStatus {
    pub address: Address,
    pub chains: Vec<ChainBalance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<UnifiedBalance>,
}

/// Validates, sequences and reports transfers for one source/destination pair.
///
/// Each call gets its own [`CancellationToken`]; when the deadline passes the
/// token is cancelled and the outcome carries a `deadline_exceeded` error.
///
/// Two concurrent transfers signed by the same key are not serialized here.
/// Callers that share a key across requests must queue them per account.
#[derive(Builder)]
pub struct TransferOrchestrator {
    source: Arc<dyn ChainClient>,
    destination: Arc<dyn ChainClient>,
    attestation_provider: Arc<dyn AttestationProvider>,
    gateway: Option<Arc<GatewayRoutingEngine>>,
    #[builder(default = Arc::new(TokioClock) as Arc<dyn Clock>)]
    clock: Arc<dyn Clock>,
    #[builder(default = Arc::new(TracingObserver) as Arc<dyn ProgressObserver>)]
    observer: Arc<dyn ProgressObserver>,
    #[builder(default)]
    config: OrchestratorConfig,
}

impl fmt::Debug for TransferOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOrchestrator")
            .field("source", &self.source.chain())
            .field("destination", &self.destination.chain())
            .field("gateway", &self.gateway)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TransferOrchestrator {
    pub fn source_chain(&self) -> SupportedChain {
        self.source.chain()
    }

    pub fn destination_chain(&self) -> SupportedChain {
        self.destination.chain()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// A fresh engine per call; its attestation cache is dropped with it.
    fn engine(&self, cancel: CancellationToken) -> CctpTransferEngine {
        CctpTransferEngine::builder()
            .source(self.source.clone())
            .destination(self.destination.clone())
            .attestation_provider(self.attestation_provider.clone())
            .clock(self.clock.clone())
            .observer(self.observer.clone())
            .config(self.config.transfer)
            .provider_config(self.config.provider.clone())
            .cancel(cancel)
            .build()
    }

    fn gateway(&self) -> Result<&GatewayRoutingEngine> {
        self.gateway
            .as_deref()
            .ok_or_else(|| BridgeError::InvalidConfig("no Gateway engine configured".into()))
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        cancel: &CancellationToken,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.deadline, work).await {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                warn!(
                    operation = operation,
                    deadline_secs = self.config.deadline.as_secs(),
                    event = "deadline_exceeded"
                );
                Err(BridgeError::DeadlineExceeded {
                    stage: operation.to_string(),
                    deadline: self.config.deadline,
                })
            }
        }
    }

    /// USDC and gas-token balances of `owner` on the source chain.
    pub async fn account_balances(&self, owner: Address) -> Result<AccountBalances> {
        chain_balances(&self.source, owner)
            .await
            .map(|balance| AccountBalances {
                usdc: balance.usdc,
                gas: balance.gas,
            })
    }

    /// Reads the sender's balances and checks `request` against them.
    pub async fn validate(
        &self,
        request: &TransferRequest,
        owner: Address,
    ) -> Result<ValidatedTransfer> {
        let balances = self.account_balances(owner).await?;
        let validated = validate_transfer(
            request,
            self.source_chain(),
            self.destination_chain(),
            balances,
            self.config.min_gas_balance,
        )?;
        Ok(validated)
    }

    /// Validates `request` and runs burn, attestation and mint.
    pub async fn transfer(
        &self,
        request: &TransferRequest,
        signer: &PrivateKeySigner,
        options: TransferOptions,
    ) -> TransferOutcome<TransferResult> {
        let span = spans::orchestrate("transfer", self.source_chain());

        async move {
            info!(
                amount = %request.amount,
                recipient = %request.recipient,
                skip_confirm = options.skip_confirm,
                dry_run = options.dry_run,
                event = "orchestrated_transfer_started"
            );

            let cancel = CancellationToken::new();
            let burn_tx_hash = OnceLock::new();
            let work = self.run_transfer(request, signer, options, &cancel, &burn_tx_hash);
            let result = self.with_deadline("transfer", &cancel, work).await;
            self.cctp_outcome(result, burn_tx_hash.get().copied())
        }
        .instrument(span)
        .await
    }

    async fn run_transfer(
        &self,
        request: &TransferRequest,
        signer: &PrivateKeySigner,
        options: TransferOptions,
        cancel: &CancellationToken,
        burn_tx_hash: &OnceLock<TxHash>,
    ) -> Result<Option<TransferResult>> {
        let validated = self.validate(request, signer.address()).await?;
        if options.dry_run {
            info!(
                amount = %validated.intent.amount(),
                usdc_balance = %validated.balances.usdc,
                event = "dry_run_validated"
            );
            return Ok(None);
        }

        let engine = self.engine(cancel.clone());
        let burn = engine.burn(&validated.intent, signer).await?;
        let _ = burn_tx_hash.set(burn.burn_tx_hash);

        let attestation = engine.await_attestation(burn.burn_tx_hash).await?;
        let mint = engine.mint(&attestation, signer).await?;

        Ok(Some(TransferResult {
            source_chain: validated.intent.source_chain(),
            destination_chain: validated.intent.destination_chain(),
            approve_tx_hash: burn.approve_tx_hash,
            burn_tx_hash: burn.burn_tx_hash,
            mint_tx_hash: mint.mint_tx_hash,
            nonce: crate::protocol::MessageHeader::assigned_nonce(&attestation.encoded_message)
                .or(burn.nonce),
        }))
    }

    /// Finishes a transfer from its burn hash without burning again.
    pub async fn resume(
        &self,
        burn_tx_hash: TxHash,
        signer: &PrivateKeySigner,
    ) -> TransferOutcome<TransferResult> {
        let span = spans::orchestrate("resume", self.source_chain());

        async move {
            info!(burn_tx_hash = %burn_tx_hash, event = "orchestrated_resume_started");

            let cancel = CancellationToken::new();
            let engine = self.engine(cancel.clone());
            let work = async { engine.resume(burn_tx_hash, signer).await.map(Some) };
            let result = self.with_deadline("resume", &cancel, work).await;
            self.cctp_outcome(result, Some(burn_tx_hash))
        }
        .instrument(span)
        .await
    }

    fn cctp_outcome(
        &self,
        result: Result<Option<TransferResult>>,
        burn_tx_hash: Option<TxHash>,
    ) -> TransferOutcome<TransferResult> {
        match result {
            Ok(Some(transfer)) => {
                let mut urls = Vec::new();
                if let Some(approve) = transfer.approve_tx_hash {
                    urls.push(transfer.source_chain.explorer_tx_url(approve));
                }
                urls.push(transfer.source_chain.explorer_tx_url(transfer.burn_tx_hash));
                urls.push(transfer.destination_chain.explorer_tx_url(transfer.mint_tx_hash));
                TransferOutcome::succeeded(transfer, urls)
            }
            Ok(None) => TransferOutcome::dry_run(),
            Err(e) => {
                spans::record_error(&e);
                error!(
                    error = %e,
                    kind = e.kind(),
                    burn_tx_hash = ?burn_tx_hash,
                    event = "orchestrated_operation_failed"
                );
                let urls = burn_tx_hash
                    .map(|hash| vec![self.source_chain().explorer_tx_url(hash)])
                    .unwrap_or_default();
                TransferOutcome::failed(OutcomeError::from_error(&e, burn_tx_hash), urls)
            }
        }
    }

    /// Spends unified Gateway balance from `order.source_chains` on `order.destination_chain`.
    ///
    /// The spendable balance must cover the amount plus the flat transfer fee.
    pub async fn gateway_transfer(
        &self,
        order: &GatewayTransferOrder,
        signer: &PrivateKeySigner,
        options: TransferOptions,
    ) -> TransferOutcome<GatewayTransferResult> {
        let span = spans::orchestrate("gateway_transfer", order.destination_chain);

        async move {
            info!(
                amount = %order.amount,
                destination_chain = %order.destination_chain,
                sources = order.source_chains.len(),
                dry_run = options.dry_run,
                event = "orchestrated_gateway_transfer_started"
            );

            let cancel = CancellationToken::new();
            let work = self.run_gateway_transfer(order, signer, options);
            match self.with_deadline("gateway_transfer", &cancel, work).await {
                Ok(Some(result)) => {
                    let url = result.destination_chain.explorer_tx_url(result.mint_tx_hash);
                    TransferOutcome::succeeded(result, vec![url])
                }
                Ok(None) => TransferOutcome::dry_run(),
                Err(e) => failed_outcome(&e),
            }
        }
        .instrument(span)
        .await
    }

    async fn run_gateway_transfer(
        &self,
        order: &GatewayTransferOrder,
        signer: &PrivateKeySigner,
        options: TransferOptions,
    ) -> Result<Option<GatewayTransferResult>> {
        let gateway = self.gateway()?;
        let recipient = parse_recipient(&order.recipient)?;
        if order.amount.is_zero() {
            return Err(ValidationError::NonPositiveAmount.into());
        }

        let unified = gateway
            .get_unified_balance(signer.address(), &order.source_chains)
            .await?;
        let route = plan_route(order.amount, order.destination_chain, &unified.balances)?;

        let spendable = unified
            .balances
            .iter()
            .filter(|entry| entry.chain != order.destination_chain)
            .fold(U256::ZERO, |acc, entry| acc.saturating_add(entry.balance));
        let required = order.amount.saturating_add(route.estimated_fee);
        if spendable < required {
            return Err(ValidationError::InsufficientBalance {
                available: spendable,
                required,
            }
            .into());
        }
        if route.fee_source.is_none() {
            return Err(ValidationError::FeeNotCovered {
                fee: route.estimated_fee,
            }
            .into());
        }

        if options.dry_run {
            info!(
                sources = route.source_allocations.len(),
                fee = %route.estimated_fee,
                event = "dry_run_validated"
            );
            return Ok(None);
        }

        gateway
            .execute_transfer(&route, recipient, signer)
            .await
            .map(Some)
    }

    /// Deposits into the Gateway wallet so the funds join the unified balance.
    pub async fn gateway_deposit(
        &self,
        params: &DepositParams,
        signer: &PrivateKeySigner,
    ) -> TransferOutcome<DepositResult> {
        let span = spans::orchestrate("gateway_deposit", params.chain);

        async move {
            let cancel = CancellationToken::new();
            let work = async { self.gateway()?.deposit(params, signer).await };
            match self.with_deadline("gateway_deposit", &cancel, work).await {
                Ok(deposit) => {
                    let mut urls = Vec::new();
                    if let Some(approve) = deposit.approve_tx_hash {
                        urls.push(deposit.chain.explorer_tx_url(approve));
                    }
                    urls.push(deposit.chain.explorer_tx_url(deposit.deposit_tx_hash));
                    TransferOutcome::succeeded(deposit, urls)
                }
                Err(e) => failed_outcome(&e),
            }
        }
        .instrument(span)
        .await
    }

    /// USDC and gas balances of `address` on both chains, plus its Gateway
    /// unified balance when a Gateway engine is configured.
    pub async fn get_status(&self, address: Address) -> TransferOutcome<AccountStatus> {
        let span = spans::orchestrate("get_status", self.source_chain());

        async move {
            let cancel = CancellationToken::new();
            let work = async {
                let mut chains = Vec::with_capacity(2);
                for client in [&self.source, &self.destination] {
                    chains.push(chain_balances(client, address).await?);
                }

                let gateway = match &self.gateway {
                    Some(gateway) => Some(
                        gateway
                            .get_unified_balance(address, &gateway.chains())
                            .await?,
                    ),
                    None => None,
                };

                Ok(AccountStatus {
                    address,
                    chains,
                    gateway,
                })
            };

            match self.with_deadline("get_status", &cancel, work).await {
                Ok(status) => TransferOutcome::succeeded(status, Vec::new()),
                Err(e) => failed_outcome(&e),
            }
        }
        .instrument(span)
        .await
    }
}

async fn chain_balances(client: &Arc<dyn ChainClient>, owner: Address) -> Result<ChainBalance> {
    let chain = client.chain();
    let usdc = Erc20Contract::new(chain.usdc_address(), client.clone())
        .balance_of(owner)
        .await?;
    let gas = client.get_balance(owner).await?;
    Ok(ChainBalance { chain, usdc, gas })
}

fn failed_outcome<T>(error: &BridgeError) -> TransferOutcome<T> {
    spans::record_error(error);
    error!(
        error = %error,
        kind = error.kind(),
        event = "orchestrated_operation_failed"
    );
    TransferOutcome::failed(OutcomeError::from_error(error, None), Vec::new())
}
