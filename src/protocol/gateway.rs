// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Gateway API wire types
//!
//! - `GET /v1/balances?address=&domains=` returns `{ "balances": { "<domain>": "<amount>" } }`
//! - `POST /v1/transfer` takes `{ "burnIntents": [...], "signatures": [...] }` and
//!   returns `{ "attestation": "0x..." }`

use alloy_primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::DomainId;
use crate::error::{BridgeError, GatewayStage, Result};

/// Decimal places of USDC.
pub const USDC_DECIMALS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct GatewayBalancesResponse {
    #[serde(default)]
    pub balances: HashMap<String, String>,
}

/// Unified-balance deposits per domain, in atomic units.
///
/// Domains absent from the map hold zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayBalances {
    balances: BTreeMap<DomainId, U256>,
}

impl GatewayBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, domain: DomainId, amount: U256) -> Self {
        self.insert(domain, amount);
        self
    }

    pub fn insert(&mut self, domain: DomainId, amount: U256) {
        self.balances.insert(domain, amount);
    }

    pub fn get(&self, domain: DomainId) -> U256 {
        self.balances.get(&domain).copied().unwrap_or(U256::ZERO)
    }

    pub fn total(&self) -> U256 {
        self.balances
            .values()
            .fold(U256::ZERO, |acc, amount| acc.saturating_add(*amount))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DomainId, U256)> + '_ {
        self.balances.iter().map(|(domain, amount)| (*domain, *amount))
    }

    /// Converts the API response, skipping domains this crate does not know.
    pub fn from_response(response: GatewayBalancesResponse) -> Result<Self> {
        let mut balances = Self::new();
        for (key, amount) in response.balances {
            let domain = key
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(DomainId::from_u32);
            let Some(domain) = domain else {
                debug!(domain = %key, event = "gateway_balance_unknown_domain_skipped");
                continue;
            };
            balances.insert(domain, parse_usdc_amount(&amount)?);
        }
        Ok(balances)
    }
}

/// Parses a decimal USDC amount string into atomic units.
///
/// Every string is read as whole USDC with up to six fraction digits, so
/// `"10"` and `"10.000000"` are both 10_000_000.
pub fn parse_usdc_amount(raw: &str) -> Result<U256> {
    let raw = raw.trim();
    let invalid = || BridgeError::gateway_failed(GatewayStage::Balance, format!("invalid amount {raw:?}"));

    if raw.is_empty() {
        return Err(invalid());
    }

    let digits = match raw.split_once('.') {
        None => format!("{raw}{:0<width$}", "", width = USDC_DECIMALS),
        Some((whole, fraction)) => {
            if fraction.len() > USDC_DECIMALS || (whole.is_empty() && fraction.is_empty()) {
                return Err(invalid());
            }
            let whole = if whole.is_empty() { "0" } else { whole };
            format!("{whole}{fraction:0<width$}", width = USDC_DECIMALS)
        }
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    U256::from_str_radix(&digits, 10).map_err(|_| invalid())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTransferRequest {
    /// ABI-encoded burn intents, one per source allocation.
    pub burn_intents: Vec<Bytes>,
    /// EIP-712 signatures, index-aligned with `burn_intents`.
    pub signatures: Vec<Bytes>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayTransferResponse {
    pub attestation: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("10", 10_000_000)]
    #[case("10.000000", 10_000_000)]
    #[case("1.5", 1_500_000)]
    #[case("20.000000", 20_000_000)]
    #[case(".25", 250_000)]
    #[case(" 3. ", 3_000_000)]
    fn test_parse_usdc_amount(#[case] raw: &str, #[case] expected: u64) {
        assert_eq!(parse_usdc_amount(raw).unwrap(), U256::from(expected));
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("1.0000001")]
    #[case("-1")]
    #[case("1e6")]
    fn test_parse_usdc_amount_rejects(#[case] raw: &str) {
        assert!(parse_usdc_amount(raw).is_err());
    }

    #[test]
    fn test_balances_from_response() {
        let response: GatewayBalancesResponse = serde_json::from_str(
            r#"{"balances": {"0": "20.0", "26": "15", "99": "1.0"}}"#,
        )
        .unwrap();
        let balances = GatewayBalances::from_response(response).unwrap();

        assert_eq!(balances.get(DomainId::Ethereum), U256::from(20_000_000u64));
        assert_eq!(balances.get(DomainId::Arc), U256::from(15_000_000u64));
        assert_eq!(balances.get(DomainId::Base), U256::ZERO);
        assert_eq!(balances.total(), U256::from(35_000_000u64));
    }

    #[test]
    fn test_transfer_request_shape() {
        let request = GatewayTransferRequest {
            burn_intents: vec![Bytes::from_static(&[0x01, 0x02])],
            signatures: vec![Bytes::from_static(&[0xff])],
        };
        insta::assert_snapshot!(
            serde_json::to_string(&request).unwrap(),
            @r#"{"burnIntents":["0x0102"],"signatures":["0xff"]}"#
        );
    }
}
