// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::{Address, U256};

use crate::poller::BackoffConfig;
use crate::protocol::FinalityThreshold;

/// Settings for a CCTP transfer: finality, fee cap and attestation polling.
///
/// # Examples
///
/// ```rust
/// use usdc_bridge_rs::{FinalityThreshold, TransferConfig};
/// use alloy_primitives::U256;
///
/// // Standard finality, no fee, ~40 minute attestation budget
/// let config = TransferConfig::default();
/// assert_eq!(config.finality, FinalityThreshold::Standard);
///
/// // Fast finality with a fee cap of 0.5 USDC
/// let config = TransferConfig::fast_transfer(U256::from(500_000u64));
/// assert!(config.finality.is_fast());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferConfig {
    /// Minimum finality the attestation service must observe before signing
    pub finality: FinalityThreshold,
    /// Maximum fee, in atomic USDC, the burn is willing to pay for fast settlement
    pub max_fee: U256,
    /// Only this address may relay the mint; `Address::ZERO` allows anyone
    pub destination_caller: Address,
    /// Attestation polling schedule
    pub attestation: BackoffConfig,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            finality: FinalityThreshold::Standard,
            max_fee: U256::ZERO,
            destination_caller: Address::ZERO,
            attestation: FinalityThreshold::Standard.attestation_backoff(),
        }
    }
}

impl TransferConfig {
    /// Fast finality with a fee cap and the matching attestation schedule.
    pub fn fast_transfer(max_fee: U256) -> Self {
        Self::default()
            .with_finality(FinalityThreshold::Fast)
            .with_max_fee(max_fee)
    }

    /// Sets the finality threshold and switches to its attestation schedule.
    pub fn with_finality(mut self, finality: FinalityThreshold) -> Self {
        self.finality = finality;
        self.attestation = finality.attestation_backoff();
        self
    }

    pub fn with_max_fee(mut self, max_fee: U256) -> Self {
        self.max_fee = max_fee;
        self
    }

    pub fn with_destination_caller(mut self, caller: Address) -> Self {
        self.destination_caller = caller;
        self
    }

    pub fn with_attestation(mut self, attestation: BackoffConfig) -> Self {
        self.attestation = attestation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_is_standard_without_fee() {
        let config = TransferConfig::default();
        assert_eq!(config.max_fee, U256::ZERO);
        assert_eq!(config.attestation, BackoffConfig::standard_transfer());
    }

    #[test]
    fn test_finality_switches_schedule() {
        let config = TransferConfig::fast_transfer(U256::from(100u64));
        assert_eq!(config.finality, FinalityThreshold::Fast);
        assert_eq!(config.attestation, BackoffConfig::fast_transfer());
    }

    #[test]
    fn test_custom_schedule_after_finality() {
        let schedule = BackoffConfig::default().with_total_timeout(Duration::from_secs(5));
        let config = TransferConfig::default()
            .with_finality(FinalityThreshold::Fast)
            .with_attestation(schedule);
        assert_eq!(config.attestation, schedule);
    }
}
