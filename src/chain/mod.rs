// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Chains the engines can move USDC between
//!
//! [`SupportedChain`] ties together everything the engines need to know about a
//! network: its EVM chain id, protocol domain, USDC address, the CCTP v2 and
//! Gateway contract addresses of its environment and its block explorer.

pub mod addresses;

use alloy_chains::NamedChain;
use alloy_primitives::{Address, TxHash};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;
use crate::protocol::DomainId;
use addresses::*;

/// Iris attestation API, production.
pub const IRIS_API_MAINNET: &str = "https://iris-api.circle.com";
/// Iris attestation API, sandbox.
pub const IRIS_API_TESTNET: &str = "https://iris-api-sandbox.circle.com";
/// Gateway API, mainnet.
pub const GATEWAY_API_MAINNET: &str = "https://gateway-api.circle.com";
/// Gateway API, testnet.
pub const GATEWAY_API_TESTNET: &str = "https://gateway-api-testnet.circle.com";

const ARC_TESTNET_EXPLORER: &str = "https://testnet.arcscan.app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupportedChain {
    Ethereum,
    Base,
    Avalanche,
    Sepolia,
    BaseSepolia,
    AvalancheFuji,
    ArcTestnet,
}

impl SupportedChain {
    pub const ALL: [Self; 7] = [
        Self::Ethereum,
        Self::Base,
        Self::Avalanche,
        Self::Sepolia,
        Self::BaseSepolia,
        Self::AvalancheFuji,
        Self::ArcTestnet,
    ];

    /// Stable identifier, also accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Base => "base",
            Self::Avalanche => "avalanche",
            Self::Sepolia => "sepolia",
            Self::BaseSepolia => "base-sepolia",
            Self::AvalancheFuji => "avalanche-fuji",
            Self::ArcTestnet => "arc-testnet",
        }
    }

    pub const fn chain_id(self) -> u64 {
        match self {
            Self::Ethereum => 1,
            Self::Base => 8453,
            Self::Avalanche => 43114,
            Self::Sepolia => 11155111,
            Self::BaseSepolia => 84532,
            Self::AvalancheFuji => 43113,
            Self::ArcTestnet => 5042002,
        }
    }

    /// The `alloy-chains` counterpart, if that registry knows the chain.
    pub const fn named_chain(self) -> Option<NamedChain> {
        match self {
            Self::Ethereum => Some(NamedChain::Mainnet),
            Self::Base => Some(NamedChain::Base),
            Self::Avalanche => Some(NamedChain::Avalanche),
            Self::Sepolia => Some(NamedChain::Sepolia),
            Self::BaseSepolia => Some(NamedChain::BaseSepolia),
            Self::AvalancheFuji => Some(NamedChain::AvalancheFuji),
            Self::ArcTestnet => None,
        }
    }

    pub const fn is_testnet(self) -> bool {
        matches!(
            self,
            Self::Sepolia | Self::BaseSepolia | Self::AvalancheFuji | Self::ArcTestnet
        )
    }

    /// CCTP and Gateway domain.
    pub const fn domain(self) -> DomainId {
        match self {
            Self::Ethereum | Self::Sepolia => DomainId::Ethereum,
            Self::Base | Self::BaseSepolia => DomainId::Base,
            Self::Avalanche | Self::AvalancheFuji => DomainId::Avalanche,
            Self::ArcTestnet => DomainId::Arc,
        }
    }

    pub const fn usdc_address(self) -> Address {
        match self {
            Self::Ethereum => ETHEREUM_USDC,
            Self::Base => BASE_USDC,
            Self::Avalanche => AVALANCHE_USDC,
            Self::Sepolia => SEPOLIA_USDC,
            Self::BaseSepolia => BASE_SEPOLIA_USDC,
            Self::AvalancheFuji => AVALANCHE_FUJI_USDC,
            Self::ArcTestnet => ARC_TESTNET_USDC,
        }
    }

    /// Whether the native gas token is USDC itself.
    pub const fn gas_token_is_usdc(self) -> bool {
        matches!(self, Self::ArcTestnet)
    }

    pub const fn token_messenger(self) -> Address {
        if self.is_testnet() {
            CCTP_V2_TOKEN_MESSENGER_TESTNET
        } else {
            CCTP_V2_TOKEN_MESSENGER_MAINNET
        }
    }

    pub const fn message_transmitter(self) -> Address {
        if self.is_testnet() {
            CCTP_V2_MESSAGE_TRANSMITTER_TESTNET
        } else {
            CCTP_V2_MESSAGE_TRANSMITTER_MAINNET
        }
    }

    pub const fn gateway_wallet(self) -> Address {
        if self.is_testnet() {
            GATEWAY_WALLET_TESTNET
        } else {
            GATEWAY_WALLET_MAINNET
        }
    }

    pub const fn gateway_minter(self) -> Address {
        if self.is_testnet() {
            GATEWAY_MINTER_TESTNET
        } else {
            GATEWAY_MINTER_MAINNET
        }
    }

    pub const fn iris_api_url(self) -> &'static str {
        if self.is_testnet() {
            IRIS_API_TESTNET
        } else {
            IRIS_API_MAINNET
        }
    }

    pub const fn gateway_api_url(self) -> &'static str {
        if self.is_testnet() {
            GATEWAY_API_TESTNET
        } else {
            GATEWAY_API_MAINNET
        }
    }

    /// Block explorer root, without a trailing slash.
    pub fn explorer_url(self) -> &'static str {
        self.named_chain()
            .and_then(|chain| chain.etherscan_urls())
            .map(|(_api, base)| base.trim_end_matches('/'))
            .unwrap_or(ARC_TESTNET_EXPLORER)
    }

    pub fn explorer_tx_url(self, tx_hash: TxHash) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_url())
    }
}

impl fmt::Display for SupportedChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SupportedChain {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let chain = match normalized.as_str() {
            "ethereum" | "mainnet" => Self::Ethereum,
            "base" => Self::Base,
            "avalanche" => Self::Avalanche,
            "sepolia" | "ethereum-sepolia" => Self::Sepolia,
            "base-sepolia" => Self::BaseSepolia,
            "avalanche-fuji" | "fuji" => Self::AvalancheFuji,
            "arc" | "arc-testnet" => Self::ArcTestnet,
            _ => {
                return Err(BridgeError::ChainNotSupported {
                    chain: s.to_string(),
                })
            }
        };
        Ok(chain)
    }
}
