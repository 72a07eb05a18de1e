// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Circle Gateway unified-balance transfers
//!
//! - [`plan_route`]: pure greedy allocation of an amount across source chains
//! - [`BurnIntent`]: EIP-712 typed intent, one per source allocation
//! - [`GatewayRoutingEngine`]: balance lookup, deposit, and batch settlement

mod engine;
mod intent;
mod route;

pub use engine::{DepositParams, DepositResult, GatewayRoutingEngine, GatewayTransferResult};
pub use intent::{
    gateway_eip712_domain, intent_salt, sign_burn_intent, BurnIntent, BurnIntentParams,
    SignedBurnIntent, TransferSpec, TRANSFER_SPEC_VERSION,
};
pub use route::{
    plan_route, GatewayDomainBalance, SourceAllocation, TransferRoute, UnifiedBalance,
    GATEWAY_INTENT_BLOCK_WINDOW, GATEWAY_MINIMUM_DEPOSIT, GATEWAY_TRANSFER_FEE,
};
