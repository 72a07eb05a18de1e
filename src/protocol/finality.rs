// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! CCTP v2 finality thresholds
//!
//! The burn call names the minimum finality the attestation service must
//! observe before signing. Lower thresholds attest sooner and may carry a fee
//! bounded by the burn's `maxFee`.
//!
//! Reference: <https://developers.circle.com/cctp/technical-guide>

use std::fmt;

use crate::poller::BackoffConfig;

/// Finality threshold passed as `minFinalityThreshold` to `depositForBurn`
///
/// ```rust
/// use usdc_bridge_rs::FinalityThreshold;
///
/// assert_eq!(FinalityThreshold::Fast.as_u32(), 1000);
/// assert_eq!(FinalityThreshold::default(), FinalityThreshold::Standard);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum FinalityThreshold {
    /// Attest at the "confirmed" level, usually under 30 seconds
    Fast = 1000,
    /// Attest at the "finalized" level, 13-19 minutes on Ethereum and its L2s
    #[default]
    Standard = 2000,
}

impl FinalityThreshold {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1000 => Some(Self::Fast),
            2000 => Some(Self::Standard),
            _ => None,
        }
    }

    /// `Fast` when `fast` is set, `Standard` otherwise.
    #[inline]
    pub const fn from_fast_flag(fast: bool) -> Self {
        if fast {
            Self::Fast
        } else {
            Self::Standard
        }
    }

    #[inline]
    pub const fn is_fast(self) -> bool {
        matches!(self, Self::Fast)
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Standard => "standard",
        }
    }

    /// Attestation polling preset sized for this threshold.
    pub fn attestation_backoff(self) -> BackoffConfig {
        match self {
            Self::Fast => BackoffConfig::fast_transfer(),
            Self::Standard => BackoffConfig::standard_transfer(),
        }
    }
}

impl From<FinalityThreshold> for u32 {
    #[inline]
    fn from(threshold: FinalityThreshold) -> Self {
        threshold.as_u32()
    }
}

impl fmt::Display for FinalityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_values() {
        assert_eq!(FinalityThreshold::Fast.as_u32(), 1000);
        assert_eq!(FinalityThreshold::Standard.as_u32(), 2000);
        assert_eq!(FinalityThreshold::from_u32(1500), None);
    }

    #[test]
    fn test_from_fast_flag() {
        assert_eq!(FinalityThreshold::from_fast_flag(true), FinalityThreshold::Fast);
        assert_eq!(
            FinalityThreshold::from_fast_flag(false),
            FinalityThreshold::Standard
        );
    }

    #[test]
    fn test_fast_backoff_is_tighter() {
        let fast = FinalityThreshold::Fast.attestation_backoff();
        let standard = FinalityThreshold::Standard.attestation_backoff();
        assert!(fast.total_timeout < standard.total_timeout);
        assert!(fast.initial_delay < standard.initial_delay);
    }

    #[test]
    fn test_display() {
        assert_eq!(FinalityThreshold::Fast.to_string(), "fast (1000)");
    }
}
