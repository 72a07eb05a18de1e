// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! ERC20 bindings for allowance, approval and balance reads
//!
//! Both the CCTP burn and the Gateway deposit pull USDC with `transferFrom`,
//! so the spender must be approved first.

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::traits::ChainClient;

/// ERC20 contract wrapper
///
/// # Example
///
/// ```rust,ignore
/// let usdc = Erc20Contract::new(chain.usdc_address(), client.clone());
/// if usdc.allowance(owner, spender).await? < amount {
///     let tx = usdc.approve_transaction(owner, spender, amount);
///     // sign and send
/// }
/// ```
#[derive(Clone)]
pub struct Erc20Contract {
    address: Address,
    client: Arc<dyn ChainClient>,
}

impl Erc20Contract {
    pub fn new(address: Address, client: Arc<dyn ChainClient>) -> Self {
        Self { address, client }
    }

    /// Amount `spender` may pull from `owner`.
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        let call = Erc20::allowanceCall { owner, spender };
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(call.abi_encode());

        let output = self.client.call(tx).await?;
        let allowance = Erc20::allowanceCall::abi_decode_returns(&output)?;

        debug!(
            owner = %owner,
            spender = %spender,
            allowance = %allowance,
            contract_address = %self.address,
            event = "allowance_retrieved"
        );

        Ok(allowance)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        let call = Erc20::balanceOfCall { account };
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(call.abi_encode());

        let output = self.client.call(tx).await?;
        let balance = Erc20::balanceOfCall::abi_decode_returns(&output)?;

        debug!(
            account = %account,
            balance = %balance,
            contract_address = %self.address,
            event = "balance_retrieved"
        );

        Ok(balance)
    }

    /// Unsigned `approve(spender, amount)` sent from `from`.
    pub fn approve_transaction(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> TransactionRequest {
        info!(
            from = %from,
            spender = %spender,
            amount = %amount,
            contract_address = %self.address,
            event = "approve_transaction_created"
        );

        let call = Erc20::approveCall { spender, amount };
        TransactionRequest::default()
            .with_from(from)
            .with_to(self.address)
            .with_input(call.abi_encode())
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

sol!(
    #[allow(missing_docs)]
    contract Erc20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
);
