// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! CCTP v2 message header
//!
//! Every message emitted through `MessageSent(bytes)` starts with a fixed
//! 148-byte header:
//!
//! | field                     | type    | bytes   |
//! |---------------------------|---------|---------|
//! | version                   | uint32  | 0..4    |
//! | sourceDomain              | uint32  | 4..8    |
//! | destinationDomain         | uint32  | 8..12   |
//! | nonce                     | bytes32 | 12..44  |
//! | sender                    | bytes32 | 44..76  |
//! | recipient                 | bytes32 | 76..108 |
//! | destinationCaller         | bytes32 | 108..140|
//! | minFinalityThreshold      | uint32  | 140..144|
//! | finalityThresholdExecuted | uint32  | 144..148|
//!
//! The nonce is zero in the message logged on the source chain; the
//! attestation service fills it in when it signs.

use alloy_primitives::{Bytes, FixedBytes};

use super::DomainId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u32,
    pub source_domain: DomainId,
    pub destination_domain: DomainId,
    pub nonce: FixedBytes<32>,
    pub sender: FixedBytes<32>,
    pub recipient: FixedBytes<32>,
    pub destination_caller: FixedBytes<32>,
    pub min_finality_threshold: u32,
    pub finality_threshold_executed: u32,
}

const NONCE_RANGE: std::ops::Range<usize> = 12..44;

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl MessageHeader {
    pub const SIZE: usize = 148;

    pub fn encode(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&self.source_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(&self.destination_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(self.nonce.as_slice());
        bytes.extend_from_slice(self.sender.as_slice());
        bytes.extend_from_slice(self.recipient.as_slice());
        bytes.extend_from_slice(self.destination_caller.as_slice());
        bytes.extend_from_slice(&self.min_finality_threshold.to_be_bytes());
        bytes.extend_from_slice(&self.finality_threshold_executed.to_be_bytes());
        Bytes::from(bytes)
    }

    /// Parses the header at the start of `bytes`.
    ///
    /// Returns `None` when fewer than [`MessageHeader::SIZE`] bytes are given
    /// or a domain is unknown.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }

        Some(Self {
            version: read_u32(bytes, 0),
            source_domain: DomainId::from_u32(read_u32(bytes, 4))?,
            destination_domain: DomainId::from_u32(read_u32(bytes, 8))?,
            nonce: FixedBytes::from_slice(&bytes[NONCE_RANGE]),
            sender: FixedBytes::from_slice(&bytes[44..76]),
            recipient: FixedBytes::from_slice(&bytes[76..108]),
            destination_caller: FixedBytes::from_slice(&bytes[108..140]),
            min_finality_threshold: read_u32(bytes, 140),
            finality_threshold_executed: read_u32(bytes, 144),
        })
    }

    /// Nonce of `message` if the service has assigned one.
    ///
    /// Unlike [`decode`](Self::decode) this does not validate the domains.
    pub fn assigned_nonce(message: &[u8]) -> Option<FixedBytes<32>> {
        if message.len() < Self::SIZE {
            return None;
        }
        let nonce = FixedBytes::<32>::from_slice(&message[NONCE_RANGE]);
        (!nonce.is_zero()).then_some(nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    fn header(nonce: FixedBytes<32>) -> MessageHeader {
        MessageHeader {
            version: 1,
            source_domain: DomainId::Ethereum,
            destination_domain: DomainId::Arc,
            nonce,
            sender: address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA").into_word(),
            recipient: address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA").into_word(),
            destination_caller: FixedBytes::ZERO,
            min_finality_threshold: 2000,
            finality_threshold_executed: 0,
        }
    }

    #[test]
    fn test_decode_reads_encoded_fields() {
        let original = header(b256!(
            "00000000000000000000000000000000000000000000000000000000000000ff"
        ));
        let encoded = original.encode();

        assert_eq!(encoded.len(), MessageHeader::SIZE);
        assert_eq!(MessageHeader::decode(&encoded), Some(original));
    }

    #[test]
    fn test_decode_ignores_trailing_body() {
        let mut bytes = header(FixedBytes::ZERO).encode().to_vec();
        bytes.extend_from_slice(&[0xab; 64]);
        let decoded = MessageHeader::decode(&bytes).unwrap();
        assert_eq!(decoded.destination_domain, DomainId::Arc);
    }

    #[test]
    fn test_decode_rejects_short_input() {
        assert_eq!(MessageHeader::decode(&[0u8; 100]), None);
    }

    #[test]
    fn test_assigned_nonce() {
        let unassigned = header(FixedBytes::ZERO).encode();
        assert_eq!(MessageHeader::assigned_nonce(&unassigned), None);

        let nonce = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let assigned = header(nonce).encode();
        assert_eq!(MessageHeader::assigned_nonce(&assigned), Some(nonce));
    }
}
