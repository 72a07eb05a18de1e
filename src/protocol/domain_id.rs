// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Protocol domain identifiers
//!
//! CCTP and Gateway both address chains by a numeric domain rather than the
//! EVM chain id. Testnets share the domain of their mainnet (Sepolia is domain
//! 0 like Ethereum).
//!
//! Reference: <https://developers.circle.com/cctp/supported-domains>

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain identifier shared by CCTP and Gateway
///
/// # Example
///
/// ```rust
/// use usdc_bridge_rs::DomainId;
///
/// assert_eq!(DomainId::Base.as_u32(), 6);
/// assert_eq!(DomainId::from_u32(26), Some(DomainId::Arc));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "u32", try_from = "u32")]
#[repr(u32)]
pub enum DomainId {
    /// Ethereum mainnet and Sepolia (0)
    Ethereum = 0,
    /// Avalanche C-Chain and Fuji (1)
    Avalanche = 1,
    /// OP Mainnet (2)
    Optimism = 2,
    /// Arbitrum One (3)
    Arbitrum = 3,
    /// Base and Base Sepolia (6)
    Base = 6,
    /// Polygon PoS (7)
    Polygon = 7,
    /// Arc testnet (26)
    Arc = 26,
}

impl DomainId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Ethereum),
            1 => Some(Self::Avalanche),
            2 => Some(Self::Optimism),
            3 => Some(Self::Arbitrum),
            6 => Some(Self::Base),
            7 => Some(Self::Polygon),
            26 => Some(Self::Arc),
            _ => None,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Avalanche => "Avalanche",
            Self::Optimism => "Optimism",
            Self::Arbitrum => "Arbitrum",
            Self::Base => "Base",
            Self::Polygon => "Polygon",
            Self::Arc => "Arc",
        }
    }
}

impl From<DomainId> for u32 {
    #[inline]
    fn from(domain: DomainId) -> Self {
        domain.as_u32()
    }
}

impl TryFrom<u32> for DomainId {
    type Error = InvalidDomainId;

    #[inline]
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(InvalidDomainId(value))
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// Returned when a u32 does not name a known domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDomainId(pub u32);

impl fmt::Display for InvalidDomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown domain id: {}", self.0)
    }
}

impl std::error::Error for InvalidDomainId {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DomainId::Ethereum, 0)]
    #[case(DomainId::Avalanche, 1)]
    #[case(DomainId::Base, 6)]
    #[case(DomainId::Arc, 26)]
    fn test_domain_values(#[case] domain: DomainId, #[case] value: u32) {
        assert_eq!(domain.as_u32(), value);
        assert_eq!(DomainId::try_from(value), Ok(domain));
    }

    #[rstest]
    #[case(4)]
    #[case(5)]
    #[case(27)]
    #[case(999)]
    fn test_unknown_domains_rejected(#[case] value: u32) {
        assert_eq!(DomainId::try_from(value), Err(InvalidDomainId(value)));
    }

    #[test]
    fn test_serde_as_number() {
        assert_eq!(serde_json::to_string(&DomainId::Arc).unwrap(), "26");
        let parsed: DomainId = serde_json::from_str("6").unwrap();
        assert_eq!(parsed, DomainId::Base);
        assert!(serde_json::from_str::<DomainId>("42").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(DomainId::Ethereum.to_string(), "Ethereum (0)");
        assert_eq!(DomainId::Arc.to_string(), "Arc (26)");
    }
}
