// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::TxHash;
use serde::Serialize;

use crate::error::BridgeError;

/// Failure as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeError {
    /// Machine-readable kind, see [`BridgeError::kind`]
    pub kind: &'static str,
    pub message: String,
    /// Burn to hand to `resume` when the failure happened after the burn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burn_tx_hash: Option<TxHash>,
}

impl OutcomeError {
    pub fn from_error(error: &BridgeError, burn_tx_hash: Option<TxHash>) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            burn_tx_hash,
        }
    }
}

/// Result object returned by every orchestrator operation.
///
/// Exactly one of `result` and `error` is set, except for dry runs, which
/// succeed without a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome<T> {
    pub success: bool,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explorer_urls: Vec<String>,
}

impl<T> TransferOutcome<T> {
    pub fn succeeded(result: T, explorer_urls: Vec<String>) -> Self {
        Self {
            success: true,
            dry_run: false,
            result: Some(result),
            error: None,
            explorer_urls,
        }
    }

    pub fn dry_run() -> Self {
        Self {
            success: true,
            dry_run: true,
            result: None,
            error: None,
            explorer_urls: Vec::new(),
        }
    }

    pub fn failed(error: OutcomeError, explorer_urls: Vec<String>) -> Self {
        Self {
            success: false,
            dry_run: false,
            result: None,
            error: Some(error),
            explorer_urls,
        }
    }

    pub fn error_kind(&self) -> Option<&'static str> {
        self.error.as_ref().map(|e| e.kind)
    }
}
