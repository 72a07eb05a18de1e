// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! CCTP burn, attestation and mint
//!
//! [`CctpTransferEngine`] drives one transfer through the [`TransferState`]
//! machine and reports progress to a [`ProgressObserver`](crate::ProgressObserver).

mod cctp;
mod config;
mod confirm;
mod state;
mod types;

pub(crate) use confirm::TransactionSender;

pub use cctp::{AttestationCache, CctpTransferEngine};
pub use config::TransferConfig;
pub use confirm::confirm_transaction;
pub use state::{ProgressEvent, TracingObserver, TransferState};
pub use types::{Attestation, BurnResult, MintResult, TransferIntent, TransferResult};
