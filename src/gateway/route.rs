// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Source selection for Gateway transfers.

use alloy_primitives::U256;
use serde::Serialize;
use tracing::debug;

use crate::chain::SupportedChain;
use crate::error::{BridgeError, Result, ValidationError};
use crate::protocol::{DomainId, GatewayBalances};

/// Flat fee charged per Gateway transfer, in atomic USDC (0.01 USDC).
///
/// The fee does not depend on how many source chains a route draws from.
/// It is the `maxFee` of the one burn intent drawn on the route's
/// `fee_source`; every other intent carries a zero `maxFee`.
pub const GATEWAY_TRANSFER_FEE: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// Smallest accepted deposit into the Gateway wallet, in atomic USDC (1 USDC).
pub const GATEWAY_MINIMUM_DEPOSIT: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

/// Blocks a signed burn intent stays valid for on its source chain.
pub const GATEWAY_INTENT_BLOCK_WINDOW: u64 = 10_000;

/// Unified-balance deposit held on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GatewayDomainBalance {
    pub chain: SupportedChain,
    pub domain: DomainId,
    pub balance: U256,
}

impl GatewayDomainBalance {
    pub fn new(chain: SupportedChain, balance: U256) -> Self {
        Self {
            chain,
            domain: chain.domain(),
            balance,
        }
    }
}

/// Per-chain deposits and their sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedBalance {
    pub balances: Vec<GatewayDomainBalance>,
    pub total: U256,
}

impl UnifiedBalance {
    /// One entry per chain in `chains`, in that order, read from `balances`.
    pub fn from_chains(chains: &[SupportedChain], balances: &GatewayBalances) -> Self {
        let balances: Vec<_> = chains
            .iter()
            .map(|chain| GatewayDomainBalance::new(*chain, balances.get(chain.domain())))
            .collect();
        let total = balances
            .iter()
            .fold(U256::ZERO, |acc, entry| acc.saturating_add(entry.balance));
        Self { balances, total }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceAllocation {
    pub chain: SupportedChain,
    pub domain: DomainId,
    pub amount: U256,
}

/// Where the funds of one Gateway transfer come from.
///
/// `source_allocations` sum to `total_amount` and never include the
/// destination chain. `fee_source` is the allocated chain whose balance still
/// covers `estimated_fee` after its allocation, if there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRoute {
    pub destination_chain: SupportedChain,
    pub source_allocations: Vec<SourceAllocation>,
    pub total_amount: U256,
    pub estimated_fee: U256,
    pub fee_source: Option<SupportedChain>,
}

impl TransferRoute {
    /// Fee authorized by the burn intent drawn on `chain`.
    pub fn max_fee_for(&self, chain: SupportedChain) -> U256 {
        if self.fee_source == Some(chain) {
            self.estimated_fee
        } else {
            U256::ZERO
        }
    }
}

/// Plans a greedy allocation of `amount` across `candidates`.
///
/// The destination chain and chains without funds are dropped; the rest are
/// drained largest balance first. Equal balances keep their order in
/// `candidates`. When every allocated chain is drained, one fee's worth of
/// the last allocation moves to the next unused chain so that a single
/// source still covers the flat fee.
///
/// ```rust
/// use usdc_bridge_rs::gateway::{plan_route, GatewayDomainBalance};
/// use usdc_bridge_rs::SupportedChain;
/// use alloy_primitives::U256;
///
/// let candidates = [
///     GatewayDomainBalance::new(SupportedChain::Sepolia, U256::from(20_000_000u64)),
///     GatewayDomainBalance::new(SupportedChain::ArcTestnet, U256::from(15_000_000u64)),
/// ];
/// let route = plan_route(U256::from(30_000_000u64), SupportedChain::BaseSepolia, &candidates)?;
/// assert_eq!(route.source_allocations.len(), 2);
/// assert_eq!(route.source_allocations[0].chain, SupportedChain::Sepolia);
/// assert_eq!(route.source_allocations[1].amount, U256::from(10_000_000u64));
/// # Ok::<(), usdc_bridge_rs::BridgeError>(())
/// ```
pub fn plan_route(
    amount: U256,
    destination_chain: SupportedChain,
    candidates: &[GatewayDomainBalance],
) -> Result<TransferRoute> {
    if amount.is_zero() {
        return Err(ValidationError::NonPositiveAmount.into());
    }

    let mut eligible: Vec<&GatewayDomainBalance> = candidates
        .iter()
        .filter(|c| c.chain != destination_chain && !c.balance.is_zero())
        .collect();

    let available = eligible
        .iter()
        .fold(U256::ZERO, |acc, c| acc.saturating_add(c.balance));
    if available < amount {
        return Err(BridgeError::GatewayInsufficientBalance {
            requested: amount,
            available,
        });
    }

    // Stable: ties keep candidate order.
    eligible.sort_by(|a, b| b.balance.cmp(&a.balance));

    let mut remaining = amount;
    let mut source_allocations = Vec::new();
    let mut fee_source = None;
    let mut unused = eligible.into_iter();
    for candidate in unused.by_ref() {
        let take = remaining.min(candidate.balance);
        if fee_source.is_none() && candidate.balance - take >= GATEWAY_TRANSFER_FEE {
            fee_source = Some(candidate.chain);
        }
        source_allocations.push(SourceAllocation {
            chain: candidate.chain,
            domain: candidate.domain,
            amount: take,
        });
        remaining -= take;
        if remaining.is_zero() {
            break;
        }
    }

    // Every allocated chain is drained: hand one fee's worth of the last
    // allocation to the next unused chain so the last chain can pay the fee.
    if fee_source.is_none() {
        let next = unused.next().filter(|c| c.balance >= GATEWAY_TRANSFER_FEE);
        let last = source_allocations
            .last_mut()
            .filter(|last| last.amount > GATEWAY_TRANSFER_FEE);
        if let (Some(next), Some(last)) = (next, last) {
            last.amount -= GATEWAY_TRANSFER_FEE;
            fee_source = Some(last.chain);
            source_allocations.push(SourceAllocation {
                chain: next.chain,
                domain: next.domain,
                amount: GATEWAY_TRANSFER_FEE,
            });
        }
    }

    debug!(
        amount = %amount,
        destination_chain = %destination_chain,
        sources = source_allocations.len(),
        fee_source = ?fee_source,
        event = "gateway_route_planned"
    );

    Ok(TransferRoute {
        destination_chain,
        source_allocations,
        total_amount: amount,
        estimated_fee: GATEWAY_TRANSFER_FEE,
        fee_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn usdc(whole: u64) -> U256 {
        U256::from(whole * 1_000_000)
    }

    fn balance(chain: SupportedChain, whole: u64) -> GatewayDomainBalance {
        GatewayDomainBalance::new(chain, usdc(whole))
    }

    #[test]
    fn test_single_source() {
        let route = plan_route(
            usdc(10),
            SupportedChain::BaseSepolia,
            &[balance(SupportedChain::Sepolia, 50)],
        )
        .unwrap();

        assert_eq!(
            route.source_allocations,
            vec![SourceAllocation {
                chain: SupportedChain::Sepolia,
                domain: DomainId::Ethereum,
                amount: usdc(10),
            }]
        );
    }

    #[test]
    fn test_largest_balance_first() {
        let route = plan_route(
            usdc(30),
            SupportedChain::BaseSepolia,
            &[
                balance(SupportedChain::ArcTestnet, 15),
                balance(SupportedChain::Sepolia, 20),
            ],
        )
        .unwrap();

        let allocations: Vec<_> = route
            .source_allocations
            .iter()
            .map(|a| (a.chain, a.amount))
            .collect();
        assert_eq!(
            allocations,
            vec![
                (SupportedChain::Sepolia, usdc(20)),
                (SupportedChain::ArcTestnet, usdc(10)),
            ]
        );
    }

    #[test]
    fn test_destination_excluded_even_with_funds() {
        let route = plan_route(
            usdc(5),
            SupportedChain::BaseSepolia,
            &[
                balance(SupportedChain::BaseSepolia, 100),
                balance(SupportedChain::Sepolia, 10),
            ],
        )
        .unwrap();

        assert_eq!(route.source_allocations.len(), 1);
        assert_eq!(route.source_allocations[0].chain, SupportedChain::Sepolia);
    }

    #[test]
    fn test_destination_funds_do_not_count_toward_available() {
        let err = plan_route(
            usdc(20),
            SupportedChain::BaseSepolia,
            &[
                balance(SupportedChain::BaseSepolia, 100),
                balance(SupportedChain::Sepolia, 10),
            ],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            BridgeError::GatewayInsufficientBalance { available, .. } if available == usdc(10)
        ));
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let err = plan_route(U256::ZERO, SupportedChain::BaseSepolia, &[]).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Validation(ValidationError::NonPositiveAmount)
        ));
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn test_fee_is_flat_regardless_of_source_count(#[case] sources: usize) {
        let chains = [
            SupportedChain::Sepolia,
            SupportedChain::ArcTestnet,
            SupportedChain::AvalancheFuji,
        ];
        let candidates: Vec<_> = chains[..sources].iter().map(|c| balance(*c, 10)).collect();
        let amount = usdc(10 * sources as u64 - 1);

        let route = plan_route(amount, SupportedChain::BaseSepolia, &candidates).unwrap();

        assert_eq!(route.source_allocations.len(), sources);
        assert_eq!(route.estimated_fee, GATEWAY_TRANSFER_FEE);
        let authorized = route
            .source_allocations
            .iter()
            .fold(U256::ZERO, |acc, a| acc + route.max_fee_for(a.chain));
        assert_eq!(authorized, GATEWAY_TRANSFER_FEE);
    }

    #[test]
    fn test_fee_source_is_the_chain_with_headroom() {
        let route = plan_route(
            usdc(30),
            SupportedChain::BaseSepolia,
            &[
                balance(SupportedChain::Sepolia, 20),
                balance(SupportedChain::ArcTestnet, 15),
            ],
        )
        .unwrap();

        assert_eq!(route.fee_source, Some(SupportedChain::ArcTestnet));
        assert_eq!(route.max_fee_for(SupportedChain::Sepolia), U256::ZERO);
        assert_eq!(
            route.max_fee_for(SupportedChain::ArcTestnet),
            GATEWAY_TRANSFER_FEE
        );
    }

    #[test]
    fn test_drained_route_borrows_from_next_chain_for_fee() {
        let route = plan_route(
            usdc(20),
            SupportedChain::BaseSepolia,
            &[
                balance(SupportedChain::Sepolia, 20),
                balance(SupportedChain::AvalancheFuji, 15),
            ],
        )
        .unwrap();

        let allocations: Vec<_> = route
            .source_allocations
            .iter()
            .map(|a| (a.chain, a.amount))
            .collect();
        assert_eq!(
            allocations,
            vec![
                (SupportedChain::Sepolia, usdc(20) - GATEWAY_TRANSFER_FEE),
                (SupportedChain::AvalancheFuji, GATEWAY_TRANSFER_FEE),
            ]
        );
        assert_eq!(route.fee_source, Some(SupportedChain::Sepolia));
    }

    #[test]
    fn test_drained_sources_leave_no_fee_source() {
        let route = plan_route(
            usdc(30),
            SupportedChain::BaseSepolia,
            &[
                balance(SupportedChain::Sepolia, 20),
                balance(SupportedChain::ArcTestnet, 10),
            ],
        )
        .unwrap();

        assert_eq!(route.source_allocations.len(), 2);
        assert_eq!(route.fee_source, None);
    }

    #[test]
    fn test_unified_balance_from_chains() {
        let balances = GatewayBalances::new()
            .with_balance(DomainId::Ethereum, usdc(3))
            .with_balance(DomainId::Arc, usdc(4));

        let unified = UnifiedBalance::from_chains(
            &[SupportedChain::Sepolia, SupportedChain::ArcTestnet, SupportedChain::BaseSepolia],
            &balances,
        );

        assert_eq!(unified.total, usdc(7));
        assert_eq!(unified.balances[2].balance, U256::ZERO);
    }
}
