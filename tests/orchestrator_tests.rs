// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Orchestrated CCTP and Gateway operations through the in-memory fakes.

use alloy_primitives::{Bytes, FixedBytes, U256};
use alloy_signer::Signer;
use std::sync::Arc;
use std::time::Duration;
use usdc_bridge_rs::gateway::{DepositParams, GATEWAY_TRANSFER_FEE};
use usdc_bridge_rs::orchestrator::{
    GatewayTransferOrder, OrchestratorConfig, TransferOptions, TransferRequest,
};
use usdc_bridge_rs::testing::{
    cctp_message, message_sent_log, test_signer, AttestationReply, FakeAttestationProvider,
    FakeChainClient, FakeClock, FakeGatewayApi,
};
use usdc_bridge_rs::{
    BackoffConfig, ChainClient, GatewayRoutingEngine, SupportedChain, TransferConfig,
    TransferOrchestrator,
};

const SOURCE: SupportedChain = SupportedChain::Sepolia;
const DESTINATION: SupportedChain = SupportedChain::ArcTestnet;
const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d";

fn usdc(whole: u64) -> U256 {
    U256::from(whole * 1_000_000)
}

fn one_ether() -> U256 {
    U256::from(10u64).pow(U256::from(18u64))
}

fn complete() -> AttestationReply {
    AttestationReply::complete(
        cctp_message(SOURCE, DESTINATION, FixedBytes::repeat_byte(0x42)),
        Bytes::from(vec![0x5a; 65]),
    )
}

fn quick_config() -> OrchestratorConfig {
    OrchestratorConfig::default().with_transfer(
        TransferConfig::default().with_attestation(
            BackoffConfig::default()
                .with_initial_delay(Duration::from_secs(1))
                .with_max_attempts(3),
        ),
    )
}

struct Harness {
    source: FakeChainClient,
    destination: FakeChainClient,
    attestations: FakeAttestationProvider,
}

impl Harness {
    /// A funded sender whose burns emit `MessageSent`.
    fn funded(replies: Vec<AttestationReply>) -> Self {
        let signer = test_signer();
        let source = FakeChainClient::new(SOURCE);
        source.set_usdc_balance(signer.address(), usdc(100));
        source.set_native_balance(signer.address(), one_ether());
        source.set_logs_for(
            SOURCE.token_messenger(),
            vec![message_sent_log(
                SOURCE,
                cctp_message(SOURCE, DESTINATION, FixedBytes::ZERO),
            )],
        );
        Self {
            source,
            destination: FakeChainClient::new(DESTINATION),
            attestations: FakeAttestationProvider::with_replies(replies),
        }
    }

    fn orchestrator(&self) -> TransferOrchestrator {
        self.orchestrator_with(quick_config(), None)
    }

    fn orchestrator_with(
        &self,
        config: OrchestratorConfig,
        gateway: Option<Arc<GatewayRoutingEngine>>,
    ) -> TransferOrchestrator {
        TransferOrchestrator::builder()
            .source(Arc::new(self.source.clone()))
            .destination(Arc::new(self.destination.clone()))
            .attestation_provider(Arc::new(self.attestations.clone()))
            .maybe_gateway(gateway)
            .clock(Arc::new(FakeClock::new()))
            .config(config)
            .build()
    }
}

#[tokio::test]
async fn test_transfer_succeeds_with_explorer_links() {
    let harness = Harness::funded(vec![complete()]);
    let request = TransferRequest::new(usdc(10), RECIPIENT);

    let outcome = harness
        .orchestrator()
        .transfer(&request, &test_signer(), TransferOptions::default())
        .await;

    assert!(outcome.success, "{:?}", outcome.error);
    let result = outcome.result.unwrap();
    assert_eq!(outcome.explorer_urls.len(), 3);
    assert_eq!(
        outcome.explorer_urls[1],
        SOURCE.explorer_tx_url(result.burn_tx_hash)
    );
    assert_eq!(
        outcome.explorer_urls[2],
        DESTINATION.explorer_tx_url(result.mint_tx_hash)
    );
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let harness = Harness::funded(vec![complete()]);
    let request = TransferRequest::new(usdc(10), RECIPIENT);
    let options = TransferOptions::builder().dry_run(true).build();

    let outcome = harness
        .orchestrator()
        .transfer(&request, &test_signer(), options)
        .await;

    assert!(outcome.success);
    assert!(outcome.dry_run);
    assert!(outcome.result.is_none());
    assert!(harness.source.sent_transactions().is_empty());
    assert_eq!(harness.attestations.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_recipient_is_reported_not_thrown() {
    let harness = Harness::funded(vec![complete()]);
    let request = TransferRequest::new(usdc(10), "0x1234");

    let outcome = harness
        .orchestrator()
        .transfer(&request, &test_signer(), TransferOptions::default())
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.error_kind(), Some("validation"));
    assert!(harness.source.sent_transactions().is_empty());
}

#[tokio::test]
async fn test_insufficient_balance_is_a_validation_error() {
    let harness = Harness::funded(vec![complete()]);
    let request = TransferRequest::new(usdc(500), RECIPIENT);

    let outcome = harness
        .orchestrator()
        .transfer(&request, &test_signer(), TransferOptions::default())
        .await;

    let error = outcome.error.unwrap();
    assert_eq!(error.kind, "validation");
    insta::assert_snapshot!(
        error.message,
        @"Validation failed: Insufficient USDC balance: have 100000000, need 500000000"
    );
}

#[tokio::test]
async fn test_unreachable_rpc_is_reported() {
    let harness = Harness::funded(vec![complete()]);
    harness.source.set_unavailable("connection refused");
    let request = TransferRequest::new(usdc(10), RECIPIENT);

    let outcome = harness
        .orchestrator()
        .transfer(&request, &test_signer(), TransferOptions::default())
        .await;

    assert_eq!(outcome.error_kind(), Some("provider"));
}

#[tokio::test]
async fn test_attestation_timeout_keeps_burn_for_resume() {
    let harness = Harness::funded(vec![AttestationReply::NotFound]);
    let orchestrator = harness.orchestrator();
    let request = TransferRequest::new(usdc(10), RECIPIENT);

    let outcome = orchestrator
        .transfer(&request, &test_signer(), TransferOptions::default())
        .await;

    let error = outcome.error.unwrap();
    assert_eq!(error.kind, "attestation_timeout");
    let burn_tx_hash = error.burn_tx_hash.unwrap();
    assert_eq!(
        outcome.explorer_urls,
        vec![SOURCE.explorer_tx_url(burn_tx_hash)]
    );
    assert!(harness.destination.sent_transactions().is_empty());

    harness.attestations.push(complete());
    let resumed = orchestrator.resume(burn_tx_hash, &test_signer()).await;

    assert!(resumed.success, "{:?}", resumed.error);
    assert_eq!(resumed.result.unwrap().burn_tx_hash, burn_tx_hash);
    assert_eq!(harness.source.sent_transactions().len(), 2);
    assert_eq!(harness.destination.sent_transactions().len(), 1);
}

#[tokio::test]
async fn test_calls_do_not_share_attestations() {
    let harness = Harness::funded(vec![complete()]);
    let orchestrator = harness.orchestrator();
    let request = TransferRequest::new(usdc(10), RECIPIENT);

    let outcome = orchestrator
        .transfer(&request, &test_signer(), TransferOptions::default())
        .await;
    let burn_tx_hash = outcome.result.unwrap().burn_tx_hash;
    assert_eq!(harness.attestations.call_count(), 1);

    let resumed = orchestrator.resume(burn_tx_hash, &test_signer()).await;

    assert_eq!(resumed.error_kind(), Some("already_minted"));
    assert_eq!(harness.attestations.call_count(), 2);
    assert_eq!(harness.destination.sent_transactions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_cancels_attestation_wait() {
    let harness = Harness::funded(vec![AttestationReply::NotFound]);
    let orchestrator = TransferOrchestrator::builder()
        .source(Arc::new(harness.source.clone()))
        .destination(Arc::new(harness.destination.clone()))
        .attestation_provider(Arc::new(harness.attestations.clone()))
        .config(OrchestratorConfig::default().with_deadline(Duration::from_secs(60)))
        .build();
    let request = TransferRequest::new(usdc(10), RECIPIENT);

    let outcome = orchestrator
        .transfer(&request, &test_signer(), TransferOptions::default())
        .await;

    let error = outcome.error.unwrap();
    assert_eq!(error.kind, "deadline_exceeded");
    assert!(error.burn_tx_hash.is_some());
    assert!(harness.destination.sent_transactions().is_empty());
}

#[tokio::test]
async fn test_status_reads_both_chains() {
    let harness = Harness::funded(vec![]);
    let signer = test_signer();
    harness.destination.set_usdc_balance(signer.address(), usdc(3));

    let outcome = harness.orchestrator().get_status(signer.address()).await;

    let status = outcome.result.unwrap();
    assert_eq!(status.chains.len(), 2);
    assert_eq!(status.chains[0].chain, SOURCE);
    assert_eq!(status.chains[0].usdc, usdc(100));
    assert_eq!(status.chains[0].gas, one_ether());
    assert_eq!(status.chains[1].usdc, usdc(3));
    assert!(status.gateway.is_none());
}

fn gateway_setup() -> (FakeGatewayApi, FakeChainClient, Arc<GatewayRoutingEngine>) {
    let api = FakeGatewayApi::new();
    api.set_balance(SupportedChain::Sepolia, usdc(20));
    api.set_balance(SupportedChain::AvalancheFuji, usdc(15));
    let destination = FakeChainClient::new(SupportedChain::BaseSepolia);

    let engine = GatewayRoutingEngine::builder()
        .api(Arc::new(api.clone()))
        .chains(vec![
            Arc::new(FakeChainClient::new(SupportedChain::Sepolia)) as Arc<dyn ChainClient>,
            Arc::new(FakeChainClient::new(SupportedChain::AvalancheFuji)) as Arc<dyn ChainClient>,
            Arc::new(destination.clone()) as Arc<dyn ChainClient>,
        ])
        .clock(Arc::new(FakeClock::new()))
        .build();
    (api, destination, Arc::new(engine))
}

fn gateway_order(amount: U256) -> GatewayTransferOrder {
    GatewayTransferOrder {
        amount,
        recipient: RECIPIENT.to_string(),
        destination_chain: SupportedChain::BaseSepolia,
        source_chains: vec![SupportedChain::Sepolia, SupportedChain::AvalancheFuji],
    }
}

#[tokio::test]
async fn test_gateway_transfer_spends_two_sources() {
    let harness = Harness::funded(vec![]);
    let (api, destination, gateway) = gateway_setup();
    let orchestrator = harness.orchestrator_with(quick_config(), Some(gateway));

    let outcome = orchestrator
        .gateway_transfer(&gateway_order(usdc(30)), &test_signer(), TransferOptions::default())
        .await;

    assert!(outcome.success, "{:?}", outcome.error);
    let result = outcome.result.unwrap();
    assert_eq!(result.intents.len(), 2);
    assert_eq!(result.fee, GATEWAY_TRANSFER_FEE);

    let submitted = api.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].burn_intents.len(), 2);
    assert_eq!(submitted[0].signatures.len(), 2);

    let minted = destination.sent_transactions();
    assert_eq!(minted.len(), 1);
    assert_eq!(minted[0].to, SupportedChain::BaseSepolia.gateway_minter());
}

#[tokio::test]
async fn test_gateway_transfer_requires_fee_headroom() {
    let harness = Harness::funded(vec![]);
    let (api, _, gateway) = gateway_setup();
    let orchestrator = harness.orchestrator_with(quick_config(), Some(gateway));

    let outcome = orchestrator
        .gateway_transfer(&gateway_order(usdc(35)), &test_signer(), TransferOptions::default())
        .await;

    assert_eq!(outcome.error_kind(), Some("validation"));
    assert!(api.submitted().is_empty());
}

#[tokio::test]
async fn test_gateway_fee_is_authorized_once() {
    let harness = Harness::funded(vec![]);
    let (api, _, gateway) = gateway_setup();
    let orchestrator = harness.orchestrator_with(quick_config(), Some(gateway));

    let outcome = orchestrator
        .gateway_transfer(&gateway_order(usdc(30)), &test_signer(), TransferOptions::default())
        .await;

    let result = outcome.result.unwrap();
    let fees: Vec<_> = result
        .intents
        .iter()
        .map(|i| (i.source_chain, i.intent.maxFee))
        .collect();
    assert_eq!(
        fees,
        vec![
            (SupportedChain::Sepolia, U256::ZERO),
            (SupportedChain::AvalancheFuji, GATEWAY_TRANSFER_FEE),
        ]
    );
    assert_eq!(api.submitted().len(), 1);
}

#[tokio::test]
async fn test_gateway_transfer_with_drained_sources_needs_fee_payer() {
    let harness = Harness::funded(vec![]);
    // Together the two dust balances exceed the fee, but neither covers it.
    let api = FakeGatewayApi::new();
    api.set_balance(SupportedChain::Sepolia, usdc(20));
    api.set_balance(SupportedChain::AvalancheFuji, U256::from(6_000u64));
    api.set_balance(SupportedChain::ArcTestnet, U256::from(6_000u64));
    let gateway = GatewayRoutingEngine::builder()
        .api(Arc::new(api.clone()))
        .chains(vec![
            Arc::new(FakeChainClient::new(SupportedChain::Sepolia)) as Arc<dyn ChainClient>,
            Arc::new(FakeChainClient::new(SupportedChain::AvalancheFuji)) as Arc<dyn ChainClient>,
            Arc::new(FakeChainClient::new(SupportedChain::ArcTestnet)) as Arc<dyn ChainClient>,
            Arc::new(FakeChainClient::new(SupportedChain::BaseSepolia)) as Arc<dyn ChainClient>,
        ])
        .clock(Arc::new(FakeClock::new()))
        .build();
    let orchestrator = harness.orchestrator_with(quick_config(), Some(Arc::new(gateway)));
    let order = GatewayTransferOrder {
        source_chains: vec![
            SupportedChain::Sepolia,
            SupportedChain::AvalancheFuji,
            SupportedChain::ArcTestnet,
        ],
        ..gateway_order(usdc(20))
    };

    let outcome = orchestrator
        .gateway_transfer(&order, &test_signer(), TransferOptions::default())
        .await;

    assert_eq!(outcome.error_kind(), Some("validation"));
    insta::assert_snapshot!(
        outcome.error.unwrap().message,
        @"Validation failed: No single source chain can cover the transfer fee of 10000"
    );
    assert!(api.submitted().is_empty());
}

#[tokio::test]
async fn test_gateway_transfer_beyond_balance() {
    let harness = Harness::funded(vec![]);
    let (api, _, gateway) = gateway_setup();
    let orchestrator = harness.orchestrator_with(quick_config(), Some(gateway));

    let outcome = orchestrator
        .gateway_transfer(&gateway_order(usdc(50)), &test_signer(), TransferOptions::default())
        .await;

    assert_eq!(outcome.error_kind(), Some("gateway_insufficient_balance"));
    assert!(api.submitted().is_empty());
}

#[tokio::test]
async fn test_gateway_dry_run_only_plans() {
    let harness = Harness::funded(vec![]);
    let (api, destination, gateway) = gateway_setup();
    let orchestrator = harness.orchestrator_with(quick_config(), Some(gateway));
    let options = TransferOptions::builder().dry_run(true).build();

    let outcome = orchestrator
        .gateway_transfer(&gateway_order(usdc(30)), &test_signer(), options)
        .await;

    assert!(outcome.success && outcome.dry_run);
    assert!(api.submitted().is_empty());
    assert!(destination.sent_transactions().is_empty());
}

#[tokio::test]
async fn test_gateway_operations_without_engine() {
    let harness = Harness::funded(vec![]);

    let outcome = harness
        .orchestrator()
        .gateway_deposit(
            &DepositParams {
                chain: SOURCE,
                amount: usdc(5),
            },
            &test_signer(),
        )
        .await;

    assert_eq!(outcome.error_kind(), Some("invalid_config"));
}

#[tokio::test]
async fn test_status_includes_unified_balance() {
    let harness = Harness::funded(vec![]);
    let (_, _, gateway) = gateway_setup();
    let orchestrator = harness.orchestrator_with(quick_config(), Some(gateway));

    let outcome = orchestrator.get_status(test_signer().address()).await;

    let unified = outcome.result.unwrap().gateway.unwrap();
    assert_eq!(unified.total, usdc(35));
    assert_eq!(unified.balances.len(), 3);
}
