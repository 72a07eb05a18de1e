// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Contract bindings
//!
//! `sol!`-generated call and event types with thin wrappers that build
//! unsigned [`TransactionRequest`](alloy_rpc_types::TransactionRequest)s and
//! decode read-only calls made through a [`ChainClient`](crate::ChainClient).
//!
//! - [`Erc20Contract`]: allowance, approve, balanceOf
//! - [`TokenMessengerV2Contract`]: `depositForBurn`
//! - [`MessageTransmitterV2Contract`]: `receiveMessage`, `usedNonces`, `MessageSent`
//! - [`GatewayWalletContract`] / [`GatewayMinterContract`]: `deposit`, `gatewayMint`

pub mod erc20;
pub mod gateway;
pub mod message_transmitter;
pub mod token_messenger;

pub use erc20::Erc20Contract;
pub use gateway::{GatewayMinterContract, GatewayWalletContract};
pub use message_transmitter::{MessageSent, MessageTransmitterV2Contract};
pub use token_messenger::{DepositForBurnArgs, TokenMessengerV2Contract};
