// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Preconditions checked before any transaction is sent.

use alloy_primitives::{Address, U256};
use std::str::FromStr;

use crate::bridge::TransferIntent;
use crate::chain::SupportedChain;
use crate::error::ValidationError;

/// A transfer as requested by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Atomic USDC units
    pub amount: U256,
    /// Hex address, with or without `0x`
    pub recipient: String,
}

impl TransferRequest {
    pub fn new(amount: U256, recipient: impl Into<String>) -> Self {
        Self {
            amount,
            recipient: recipient.into(),
        }
    }
}

/// Balances of the sending account on the source chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountBalances {
    pub usdc: U256,
    /// Native gas token, in wei
    pub gas: U256,
}

/// A request that passed every check, ready for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub intent: TransferIntent,
    pub balances: AccountBalances,
}

/// Parses a recipient address, rejecting malformed input and the zero address.
///
/// ```rust
/// use usdc_bridge_rs::orchestrator::parse_recipient;
///
/// assert!(parse_recipient("0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d").is_ok());
/// assert!(parse_recipient("0x1234").is_err());
/// ```
pub fn parse_recipient(raw: &str) -> Result<Address, ValidationError> {
    let trimmed = raw.trim();
    let address =
        Address::from_str(trimmed).map_err(|_| ValidationError::InvalidAddress(raw.to_string()))?;
    if address.is_zero() {
        return Err(ValidationError::InvalidAddress(raw.to_string()));
    }
    Ok(address)
}

/// Checks `request` against the sender's balances.
///
/// Order: recipient format, amount, chain pair, USDC balance, gas balance.
/// The first failing check is returned.
pub fn validate_transfer(
    request: &TransferRequest,
    source_chain: SupportedChain,
    destination_chain: SupportedChain,
    balances: AccountBalances,
    min_gas_balance: U256,
) -> Result<ValidatedTransfer, ValidationError> {
    let recipient = parse_recipient(&request.recipient)?;
    let intent = TransferIntent::new(request.amount, recipient, source_chain, destination_chain)?;

    if balances.usdc < request.amount {
        return Err(ValidationError::InsufficientBalance {
            available: balances.usdc,
            required: request.amount,
        });
    }

    if balances.gas < min_gas_balance {
        return Err(ValidationError::InsufficientGas {
            chain: source_chain.to_string(),
            available: balances.gas,
            required: min_gas_balance,
        });
    }

    Ok(ValidatedTransfer { intent, balances })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d";

    fn funded() -> AccountBalances {
        AccountBalances {
            usdc: U256::from(100_000_000u64),
            gas: U256::from(10u64).pow(U256::from(18u64)),
        }
    }

    fn validate(request: &TransferRequest, balances: AccountBalances) -> Result<ValidatedTransfer, ValidationError> {
        validate_transfer(
            request,
            SupportedChain::Sepolia,
            SupportedChain::ArcTestnet,
            balances,
            U256::from(1_000_000_000_000_000u64),
        )
    }

    #[rstest]
    #[case("")]
    #[case("not-an-address")]
    #[case("0x742d35Cc6634C0532925a3b844Bc9e7595f8fA")]
    #[case("0x0000000000000000000000000000000000000000")]
    fn test_invalid_recipients(#[case] raw: &str) {
        assert!(matches!(
            parse_recipient(raw),
            Err(ValidationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_recipient_without_prefix() {
        let parsed = parse_recipient("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d").unwrap();
        assert_eq!(parsed, parse_recipient(RECIPIENT).unwrap());
    }

    #[test]
    fn test_valid_transfer() {
        let request = TransferRequest::new(U256::from(10_000_000u64), RECIPIENT);
        let validated = validate(&request, funded()).unwrap();
        assert_eq!(validated.intent.amount(), U256::from(10_000_000u64));
        assert_eq!(validated.intent.destination_chain(), SupportedChain::ArcTestnet);
    }

    #[test]
    fn test_zero_amount() {
        let request = TransferRequest::new(U256::ZERO, RECIPIENT);
        assert_eq!(
            validate(&request, funded()).unwrap_err(),
            ValidationError::NonPositiveAmount
        );
    }

    #[test]
    fn test_insufficient_usdc() {
        let request = TransferRequest::new(U256::from(200_000_000u64), RECIPIENT);
        assert!(matches!(
            validate(&request, funded()),
            Err(ValidationError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_insufficient_gas() {
        let request = TransferRequest::new(U256::from(1u64), RECIPIENT);
        let balances = AccountBalances {
            gas: U256::ZERO,
            ..funded()
        };
        assert!(matches!(
            validate(&request, balances),
            Err(ValidationError::InsufficientGas { .. })
        ));
    }
}
