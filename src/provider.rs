// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Gas helpers and settings for submitting transfer transactions.
//!
//! Burns, mints and Gateway deposits touch several contracts, so gas estimates
//! are padded before submission. [`ProviderConfig`] also bounds how long the
//! engines wait for a submitted transaction to be mined.

use crate::error::{BridgeError, Result};
use crate::poller::BackoffConfig;
use alloy_network::Ethereum;
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use std::time::Duration;

/// Default gas buffer percentage (20%)
pub const DEFAULT_GAS_BUFFER_PERCENT: u64 = 20;

/// Default priority-fee buffer percentage (10%)
pub const DEFAULT_FEE_BUFFER_PERCENT: u64 = 10;

/// Pads `estimate` by `buffer_percent`, saturating on overflow.
///
/// ```rust
/// use usdc_bridge_rs::provider::apply_gas_buffer;
///
/// assert_eq!(apply_gas_buffer(100_000, 20), 120_000);
/// ```
pub fn apply_gas_buffer(estimate: u64, buffer_percent: u64) -> u64 {
    estimate.saturating_mul(100u64.saturating_add(buffer_percent)) / 100
}

/// Estimates gas for `tx` and applies a safety buffer (20% when `None`).
pub async fn estimate_gas_with_buffer<P: Provider<Ethereum>>(
    provider: &P,
    tx: &TransactionRequest,
    buffer_percent: Option<u64>,
) -> Result<u64> {
    let buffer = buffer_percent.unwrap_or(DEFAULT_GAS_BUFFER_PERCENT);

    let estimate = provider
        .estimate_gas(tx.clone())
        .await
        .map_err(|e| BridgeError::Provider(format!("Gas estimation failed: {e}")))?;

    Ok(apply_gas_buffer(estimate, buffer))
}

/// EIP-1559 fee pair with the priority fee padded by `buffer_percent`.
///
/// Returns `(max_fee_per_gas, max_priority_fee_per_gas)`, where the max fee is
/// `2 * base_fee + buffered_priority`.
///
/// ```rust
/// use usdc_bridge_rs::calculate_gas_price_with_buffer;
///
/// let (max_fee, priority) = calculate_gas_price_with_buffer(30_000_000_000, 2_000_000_000, 20);
/// assert_eq!(priority, 2_400_000_000);
/// assert_eq!(max_fee, 62_400_000_000);
/// ```
pub fn calculate_gas_price_with_buffer(
    base_fee: u128,
    max_priority_fee: u128,
    buffer_percent: u64,
) -> (u128, u128) {
    let buffered_priority =
        max_priority_fee.saturating_mul(100 + buffer_percent as u128) / 100;
    let max_fee = base_fee.saturating_mul(2).saturating_add(buffered_priority);
    (max_fee, buffered_priority)
}

/// Settings for submitting and confirming transactions.
///
/// ```rust
/// use usdc_bridge_rs::ProviderConfig;
/// use std::time::Duration;
///
/// let config = ProviderConfig::default()
///     .with_gas_buffer_percent(30)
///     .with_confirmation_timeout(Duration::from_secs(120));
/// assert_eq!(config.confirmation.total_timeout, Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Padding applied to gas estimates
    pub gas_buffer_percent: u64,
    /// Padding applied to the priority fee
    pub fee_buffer_percent: u64,
    /// Receipt polling while waiting for a transaction to be mined
    pub confirmation: BackoffConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            gas_buffer_percent: DEFAULT_GAS_BUFFER_PERCENT,
            fee_buffer_percent: DEFAULT_FEE_BUFFER_PERCENT,
            confirmation: BackoffConfig::default()
                .with_initial_delay(Duration::from_secs(1))
                .with_max_delay(Duration::from_secs(6))
                .with_max_attempts(200)
                .with_total_timeout(Duration::from_secs(5 * 60)),
        }
    }
}

impl ProviderConfig {
    /// Tighter receipt polling for chains with sub-second blocks.
    pub fn fast_transfer() -> Self {
        let default = Self::default();
        Self {
            confirmation: default
                .confirmation
                .with_initial_delay(Duration::from_millis(500))
                .with_max_delay(Duration::from_secs(2))
                .with_total_timeout(Duration::from_secs(90)),
            ..default
        }
    }

    /// Larger buffers and a longer confirmation window for congested chains.
    pub fn high_reliability() -> Self {
        let default = Self::default();
        Self {
            gas_buffer_percent: 50,
            fee_buffer_percent: 25,
            confirmation: default
                .confirmation
                .with_max_delay(Duration::from_secs(15))
                .with_total_timeout(Duration::from_secs(15 * 60)),
        }
    }

    pub fn with_gas_buffer_percent(mut self, percent: u64) -> Self {
        self.gas_buffer_percent = percent;
        self
    }

    pub fn with_fee_buffer_percent(mut self, percent: u64) -> Self {
        self.fee_buffer_percent = percent;
        self
    }

    pub fn with_confirmation(mut self, confirmation: BackoffConfig) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation.total_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100_000, 20, 120_000)]
    #[case(100_000, 0, 100_000)]
    #[case(21_000, 50, 31_500)]
    #[case(u64::MAX, 20, u64::MAX / 100)]
    fn test_apply_gas_buffer(#[case] estimate: u64, #[case] buffer: u64, #[case] expected: u64) {
        assert_eq!(apply_gas_buffer(estimate, buffer), expected);
    }

    #[test]
    fn test_gas_price_with_zero_buffer() {
        let (max_fee, priority) = calculate_gas_price_with_buffer(30, 2, 0);
        assert_eq!(priority, 2);
        assert_eq!(max_fee, 62);
    }

    #[test]
    fn test_provider_config_default() {
        let config = ProviderConfig::default();
        assert_eq!(config.gas_buffer_percent, 20);
        assert_eq!(config.confirmation.total_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_provider_config_presets() {
        assert!(
            ProviderConfig::fast_transfer().confirmation.total_timeout
                < ProviderConfig::default().confirmation.total_timeout
        );
        assert_eq!(ProviderConfig::high_reliability().gas_buffer_percent, 50);
    }
}
