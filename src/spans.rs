// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Tracing span helpers for transfer operations
//!
//! Span names are static and prefixed with `usdc_bridge.`; dynamic data goes
//! into structured fields. Spans that can fail declare empty `error.*` fields
//! that [`record_error`] fills in, plus an `otel.status_code` that flips to
//! `ERROR`.
//!
//! # Example
//!
//! ```rust,no_run
//! use usdc_bridge_rs::{spans, SupportedChain};
//! use alloy_primitives::TxHash;
//!
//! let span = spans::await_attestation(TxHash::ZERO, SupportedChain::Sepolia, 120);
//! let _guard = span.enter();
//! ```

use alloy_primitives::{Address, TxHash, U256};
use tracing::Span;
use url::Url;

use crate::chain::SupportedChain;
use crate::error::BridgeError;

/// Burn on the source chain, including any approval.
///
/// Children: `usdc_bridge.confirm_transaction`, `usdc_bridge.get_message_sent_event`
#[inline]
pub fn burn(
    source_chain: SupportedChain,
    destination_chain: SupportedChain,
    amount: &U256,
    recipient: &Address,
) -> Span {
    tracing::info_span!(
        "usdc_bridge.burn",
        source_chain = %source_chain,
        destination_chain = %destination_chain,
        amount = %amount,
        recipient = %recipient,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Creation of the `depositForBurn` transaction request.
#[inline]
pub fn deposit_for_burn(
    from_address: &Address,
    recipient: &Address,
    destination_domain: u32,
    token_address: &Address,
    amount: &U256,
) -> Span {
    tracing::debug_span!(
        "usdc_bridge.deposit_for_burn",
        from_address = %from_address,
        recipient = %recipient,
        destination_domain = destination_domain,
        token_address = %token_address,
        amount = %amount,
    )
}

/// Extraction of `MessageSent` from a burn receipt.
#[inline]
pub fn get_message_sent_event(tx_hash: TxHash, source_chain: SupportedChain) -> Span {
    tracing::info_span!(
        "usdc_bridge.get_message_sent_event",
        tx_hash = %tx_hash,
        source_chain = %source_chain,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Attestation polling for one burn.
///
/// Children: `usdc_bridge.get_attestation` per attempt
#[inline]
pub fn await_attestation(
    burn_tx_hash: TxHash,
    source_chain: SupportedChain,
    max_attempts: u32,
) -> Span {
    tracing::info_span!(
        "usdc_bridge.await_attestation",
        burn_tx_hash = %burn_tx_hash,
        source_chain = %source_chain,
        max_attempts = max_attempts,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Single attestation API request.
#[inline]
pub fn get_attestation(url: &Url) -> Span {
    tracing::debug_span!("usdc_bridge.get_attestation", url = %url)
}

/// Mint on the destination chain.
#[inline]
pub fn mint(destination_chain: SupportedChain, attestation_length: usize) -> Span {
    tracing::info_span!(
        "usdc_bridge.mint",
        destination_chain = %destination_chain,
        attestation_length_bytes = attestation_length,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Waiting for a submitted transaction to be mined.
#[inline]
pub fn confirm_transaction(tx_hash: TxHash, chain: SupportedChain) -> Span {
    tracing::debug_span!(
        "usdc_bridge.confirm_transaction",
        tx_hash = %tx_hash,
        chain = %chain,
    )
}

/// Gateway route execution: sign, submit, mint.
#[inline]
pub fn gateway_transfer(
    destination_chain: SupportedChain,
    amount: &U256,
    sources: usize,
) -> Span {
    tracing::info_span!(
        "usdc_bridge.gateway_transfer",
        destination_chain = %destination_chain,
        amount = %amount,
        sources = sources,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Gateway deposit on one chain.
#[inline]
pub fn gateway_deposit(chain: SupportedChain, amount: &U256) -> Span {
    tracing::info_span!(
        "usdc_bridge.gateway_deposit",
        chain = %chain,
        amount = %amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Top-level orchestrator entry point.
#[inline]
pub fn orchestrate(operation: &'static str, source_chain: SupportedChain) -> Span {
    tracing::info_span!(
        "usdc_bridge.orchestrate",
        operation = operation,
        source_chain = %source_chain,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// HTTP request to a Circle API.
#[inline]
pub fn http_request(method: &str, url: &Url) -> Span {
    tracing::trace_span!("usdc_bridge.http_request", http.method = method, http.url = %url)
}

/// Records `error` on the current span.
pub fn record_error(error: &BridgeError) {
    let current_span = Span::current();
    current_span.record("error.type", error.kind());
    current_span.record("error.message", error.to_string());
    current_span.record("otel.status_code", "ERROR");
}

/// Records an error with free-form context on the current span.
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
