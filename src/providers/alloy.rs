// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Alloy-backed [`ChainClient`].

use alloy_network::{Ethereum, EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use crate::chain::SupportedChain;
use crate::error::{BridgeError, Result};
use crate::provider::{calculate_gas_price_with_buffer, estimate_gas_with_buffer, ProviderConfig};
use crate::traits::{ChainClient, TxReceipt};

/// Production [`ChainClient`] wrapping an Alloy [`Provider`].
///
/// The provider is cloned per client and shared by every transfer that uses
/// it, so its connection pool must tolerate concurrent requests (the default
/// reqwest transport does). Transactions are filled here (nonce, chain id,
/// EIP-1559 fees, buffered gas limit), signed locally with the caller's key
/// and submitted as raw envelopes.
///
/// ```rust,no_run
/// use usdc_bridge_rs::providers::AlloyChainClient;
/// use usdc_bridge_rs::SupportedChain;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("https://rpc.sepolia.org").await?;
/// let client = AlloyChainClient::new(SupportedChain::Sepolia, provider);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AlloyChainClient<P> {
    chain: SupportedChain,
    provider: P,
    config: ProviderConfig,
}

impl<P> AlloyChainClient<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(chain: SupportedChain, provider: P) -> Self {
        Self::with_config(chain, provider, ProviderConfig::default())
    }

    pub fn with_config(chain: SupportedChain, provider: P, config: ProviderConfig) -> Self {
        Self {
            chain,
            provider,
            config,
        }
    }

    pub fn inner(&self) -> &P {
        &self.provider
    }

    async fn fill(&self, from: Address, tx: TransactionRequest) -> Result<TransactionRequest> {
        let mut tx = tx.with_from(from).with_chain_id(self.chain.chain_id());

        let nonce = self.provider.get_transaction_count(from).pending().await?;
        tx.set_nonce(nonce);

        let fees = self.provider.estimate_eip1559_fees().await?;
        // The estimator prices max fee as twice the base fee plus the tip.
        let base_fee = fees
            .max_fee_per_gas
            .saturating_sub(fees.max_priority_fee_per_gas)
            / 2;
        let (max_fee, priority_fee) = calculate_gas_price_with_buffer(
            base_fee,
            fees.max_priority_fee_per_gas,
            self.config.fee_buffer_percent,
        );
        tx.set_max_fee_per_gas(max_fee.max(fees.max_fee_per_gas));
        tx.set_max_priority_fee_per_gas(priority_fee);

        let gas_limit =
            estimate_gas_with_buffer(&self.provider, &tx, Some(self.config.gas_buffer_percent))
                .await?;
        tx.set_gas_limit(gas_limit);

        trace!(
            nonce = nonce,
            gas_limit = gas_limit,
            max_fee_per_gas = max_fee,
            event = "transaction_filled"
        );

        Ok(tx)
    }
}

#[async_trait]
impl<P> ChainClient for AlloyChainClient<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    fn chain(&self) -> SupportedChain {
        self.chain
    }

    #[instrument(skip(self), fields(chain = %self.chain))]
    async fn get_block_number(&self) -> Result<u64> {
        let block_number = self.provider.get_block_number().await?;
        trace!(block_number = block_number, "Current block number retrieved");
        Ok(block_number)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        Ok(self.provider.call(tx).await?)
    }

    #[instrument(skip(self, signer, tx), fields(chain = %self.chain, from = %signer.address()))]
    async fn send_transaction(
        &self,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
    ) -> Result<TxHash> {
        let tx = self.fill(signer.address(), tx).await?;

        let mut signer = signer.clone();
        signer.set_chain_id(Some(self.chain.chain_id()));
        let wallet = EthereumWallet::from(signer);

        let envelope = tx
            .build(&wallet)
            .await
            .map_err(|e| BridgeError::Provider(format!("Failed to sign transaction: {e}")))?;

        let pending = self.provider.send_tx_envelope(envelope).await?;
        let tx_hash = *pending.tx_hash();

        debug!(tx_hash = %tx_hash, event = "raw_transaction_submitted");
        Ok(tx_hash)
    }

    #[instrument(skip(self), fields(chain = %self.chain, tx_hash = %tx_hash))]
    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>> {
        let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? else {
            trace!("Transaction receipt not found");
            return Ok(None);
        };

        debug!("Transaction receipt found");
        Ok(Some(TxReceipt {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            success: receipt.status(),
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        }))
    }
}
