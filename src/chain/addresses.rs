// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Contract addresses for USDC, CCTP v2 and Gateway
//!
//! CCTP v2 and Gateway deploy to the same address on every chain of an
//! environment, so only USDC differs per chain.

use alloy_primitives::{address, Address};

// =============================================================================
// USDC
// =============================================================================

/// <https://etherscan.io/token/0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48>
pub const ETHEREUM_USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

/// <https://basescan.org/token/0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913>
pub const BASE_USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// <https://snowtrace.io/token/0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E>
pub const AVALANCHE_USDC: Address = address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E");

/// <https://sepolia.etherscan.io/token/0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238>
pub const SEPOLIA_USDC: Address = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");

/// <https://sepolia.basescan.org/token/0x036CbD53842c5426634e7929541eC2318f3dCF7e>
pub const BASE_SEPOLIA_USDC: Address = address!("036CbD53842c5426634e7929541eC2318f3dCF7e");

/// <https://testnet.snowtrace.io/token/0x5425890298aed601595a70AB815c96711a31Bc65>
pub const AVALANCHE_FUJI_USDC: Address = address!("5425890298aed601595a70AB815c96711a31Bc65");

/// Arc uses USDC as its gas token; this is its ERC-20 interface.
pub const ARC_TESTNET_USDC: Address = address!("3600000000000000000000000000000000000000");

// =============================================================================
// CCTP v2
// =============================================================================
//
// Reference: <https://developers.circle.com/cctp/evm-smart-contracts>

pub const CCTP_V2_TOKEN_MESSENGER_MAINNET: Address =
    address!("28b5a0e9C621a5BadaA536219b3a228C8168cf5d");

pub const CCTP_V2_MESSAGE_TRANSMITTER_MAINNET: Address =
    address!("81D40F21F12A8F0E3252Bccb954D722d4c464B64");

pub const CCTP_V2_TOKEN_MESSENGER_TESTNET: Address =
    address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");

pub const CCTP_V2_MESSAGE_TRANSMITTER_TESTNET: Address =
    address!("E737e5cEBEEBa77EFE34D4aa090756590b1CE275");

// =============================================================================
// Gateway
// =============================================================================
//
// Reference: <https://developers.circle.com/gateway/references/contract-addresses>

pub const GATEWAY_WALLET_MAINNET: Address = address!("77777777Dcc4d5A8B6E418Fd04D8997ef11000eE");

pub const GATEWAY_MINTER_MAINNET: Address = address!("2222222d7164433c4C09B0b0D809a9b52C04C205");

pub const GATEWAY_WALLET_TESTNET: Address = address!("0077777d7EBA4688BDeF3E311b846F25870A19B9");

pub const GATEWAY_MINTER_TESTNET: Address = address!("0022222ABE238Cc2C7Bb1f21003F0a260052475B");
