// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Environment configuration
//!
//! [`EngineConfig::from_env`] reads a `.env` file (if present) and the process
//! environment:
//!
//! | variable                   | required | meaning                                     |
//! |----------------------------|----------|---------------------------------------------|
//! | `SOURCE_RPC_URL`           | yes      | JSON-RPC endpoint of the source chain       |
//! | `DESTINATION_RPC_URL`      | yes      | JSON-RPC endpoint of the destination chain  |
//! | `SOURCE_CHAIN`             | yes      | e.g. `sepolia`, `base-sepolia`              |
//! | `DESTINATION_CHAIN`        | yes      |                                             |
//! | `ATTESTATION_API_URL`      | no       | overrides the Iris deployment               |
//! | `GATEWAY_API_URL`          | no       | overrides the Gateway deployment            |
//! | `FAST_TRANSFER`            | no       | `true` selects fast finality                |
//! | `MAX_FEE`                  | no       | fast-transfer fee cap, atomic USDC          |
//! | `ATTESTATION_TIMEOUT_SECS` | no       | total attestation polling budget            |
//! | `TRANSFER_DEADLINE_SECS`   | no       | deadline of one orchestrated operation      |

use alloy_primitives::U256;
use alloy_provider::ProviderBuilder;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::bridge::TransferConfig;
use crate::chain::{SupportedChain, GATEWAY_API_MAINNET, GATEWAY_API_TESTNET, IRIS_API_MAINNET, IRIS_API_TESTNET};
use crate::error::{BridgeError, Result};
use crate::orchestrator::{OrchestratorConfig, DEFAULT_DEADLINE};
use crate::protocol::FinalityThreshold;
use crate::provider::ProviderConfig;
use crate::providers::{AlloyChainClient, GatewayHttpClient, IrisAttestationProvider};
use crate::traits::ChainClient;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub source_rpc_url: Url,
    pub destination_rpc_url: Url,
    pub source_chain: SupportedChain,
    pub destination_chain: SupportedChain,
    pub attestation_api_url: Option<String>,
    pub gateway_api_url: Option<String>,
    pub fast_transfer: bool,
    pub max_fee: U256,
    /// Replaces the total timeout of the finality's attestation schedule
    pub attestation_timeout: Option<Duration>,
    pub deadline: Duration,
}

impl EngineConfig {
    /// Loads `.env` and reads the variables listed in the module docs.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), event = "dotenv_loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| BridgeError::InvalidConfig(format!("{key} is not set")))
        };
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let url = |key: &str| -> Result<Url> {
            let raw = required(key)?;
            Url::parse(raw.trim())
                .map_err(|e| BridgeError::InvalidConfig(format!("{key}: invalid URL {raw:?}: {e}")))
        };
        let chain = |key: &str| -> Result<SupportedChain> {
            required(key)?
                .parse()
                .map_err(|e: BridgeError| BridgeError::InvalidConfig(format!("{key}: {e}")))
        };
        let seconds = |key: &str| -> Result<Option<Duration>> {
            optional(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map(Duration::from_secs)
                        .map_err(|_| BridgeError::InvalidConfig(format!("{key}: expected seconds, got {raw:?}")))
                })
                .transpose()
        };

        let fast_transfer = match optional("FAST_TRANSFER") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                BridgeError::InvalidConfig(format!("FAST_TRANSFER: expected true or false, got {raw:?}"))
            })?,
        };

        let max_fee = match optional("MAX_FEE") {
            None => U256::ZERO,
            Some(raw) => U256::from_str_radix(raw.trim(), 10).map_err(|_| {
                BridgeError::InvalidConfig(format!("MAX_FEE: expected atomic USDC, got {raw:?}"))
            })?,
        };

        let config = Self {
            source_rpc_url: url("SOURCE_RPC_URL")?,
            destination_rpc_url: url("DESTINATION_RPC_URL")?,
            source_chain: chain("SOURCE_CHAIN")?,
            destination_chain: chain("DESTINATION_CHAIN")?,
            attestation_api_url: optional("ATTESTATION_API_URL"),
            gateway_api_url: optional("GATEWAY_API_URL"),
            fast_transfer,
            max_fee,
            attestation_timeout: seconds("ATTESTATION_TIMEOUT_SECS")?,
            deadline: seconds("TRANSFER_DEADLINE_SECS")?.unwrap_or(DEFAULT_DEADLINE),
        };

        if config.source_chain == config.destination_chain {
            return Err(BridgeError::InvalidConfig(format!(
                "SOURCE_CHAIN and DESTINATION_CHAIN are both {}",
                config.source_chain
            )));
        }
        if config.source_chain.is_testnet() != config.destination_chain.is_testnet() {
            return Err(BridgeError::InvalidConfig(
                "cannot transfer between a testnet and a mainnet".into(),
            ));
        }

        Ok(config)
    }

    pub fn finality(&self) -> FinalityThreshold {
        FinalityThreshold::from_fast_flag(self.fast_transfer)
    }

    pub fn transfer_config(&self) -> TransferConfig {
        let config = TransferConfig::default()
            .with_finality(self.finality())
            .with_max_fee(self.max_fee);
        match self.attestation_timeout {
            Some(timeout) => {
                let schedule = config.attestation.with_total_timeout(timeout);
                config.with_attestation(schedule)
            }
            None => config,
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let provider = if self.fast_transfer {
            ProviderConfig::fast_transfer()
        } else {
            ProviderConfig::default()
        };
        OrchestratorConfig::default()
            .with_deadline(self.deadline)
            .with_transfer(self.transfer_config())
            .with_provider(provider)
    }

    /// Iris client for the configured environment, or the override.
    pub fn attestation_provider(&self) -> IrisAttestationProvider {
        match &self.attestation_api_url {
            Some(url) => IrisAttestationProvider::new(url.clone()),
            None if self.source_chain.is_testnet() => IrisAttestationProvider::new(IRIS_API_TESTNET),
            None => IrisAttestationProvider::new(IRIS_API_MAINNET),
        }
    }

    /// Gateway client for the configured environment, or the override.
    pub fn gateway_api(&self) -> GatewayHttpClient {
        match &self.gateway_api_url {
            Some(url) => GatewayHttpClient::new(url.clone()),
            None if self.source_chain.is_testnet() => GatewayHttpClient::new(GATEWAY_API_TESTNET),
            None => GatewayHttpClient::new(GATEWAY_API_MAINNET),
        }
    }

    /// HTTP chain clients for the source and destination RPC endpoints.
    pub fn connect_chains(&self) -> (Arc<dyn ChainClient>, Arc<dyn ChainClient>) {
        let provider_config = self.orchestrator_config().provider;
        let source = ProviderBuilder::new().connect_http(self.source_rpc_url.clone());
        let destination = ProviderBuilder::new().connect_http(self.destination_rpc_url.clone());
        (
            Arc::new(AlloyChainClient::with_config(
                self.source_chain,
                source,
                provider_config.clone(),
            )),
            Arc::new(AlloyChainClient::with_config(
                self.destination_chain,
                destination,
                provider_config,
            )),
        )
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
