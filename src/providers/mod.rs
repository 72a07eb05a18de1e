// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Production implementations of the injected traits.
//!
//! These talk to real RPC nodes, Circle's Iris and Gateway APIs and the Tokio
//! timer. Tests use the fakes in [`crate::testing`] instead.

mod alloy;
mod gateway;
mod iris;
mod tokio_clock;

pub use self::alloy::AlloyChainClient;
pub use self::gateway::GatewayHttpClient;
pub use self::iris::IrisAttestationProvider;
pub use self::tokio_clock::TokioClock;
