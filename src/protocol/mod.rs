// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Protocol-level types shared by the CCTP and Gateway engines
//!
//! Domain identifiers, finality thresholds, the CCTP message header and the
//! JSON shapes of the attestation and Gateway services.

mod attestation;
mod domain_id;
mod finality;
mod gateway;
mod message;

pub use attestation::{AttestationResponse, AttestationStatus, IrisMessagesResponse};
pub use domain_id::{DomainId, InvalidDomainId};
pub use finality::FinalityThreshold;
pub use gateway::{
    parse_usdc_amount, GatewayBalances, GatewayBalancesResponse, GatewayTransferRequest,
    GatewayTransferResponse, USDC_DECIMALS,
};
pub use message::MessageHeader;
