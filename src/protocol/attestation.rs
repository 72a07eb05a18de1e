// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::{hex::FromHex, Bytes};
use serde::{Deserialize, Deserializer};

/// Body of `GET /v2/messages/{sourceDomain}?transactionHash={hash}`
///
/// A single burn transaction can emit several messages, so the service wraps
/// them in an array. An empty array means the burn has not been indexed yet.
///
/// ```json
/// { "messages": [ { "status": "complete", "message": "0x...", "attestation": "0x..." } ] }
/// ```
#[derive(Debug, Deserialize)]
pub struct IrisMessagesResponse {
    #[serde(default)]
    pub messages: Vec<AttestationResponse>,
}

impl IrisMessagesResponse {
    /// The first message of the burn, or a synthetic pending entry when none is indexed yet.
    pub fn into_first(self) -> AttestationResponse {
        self.messages
            .into_iter()
            .next()
            .unwrap_or_else(AttestationResponse::pending)
    }
}

/// Attestation state for one burn message
///
/// `message` is the attested message as the service sees it. Once the
/// attestation is complete it carries the nonce assigned by the service,
/// which the message captured from the burn logs does not.
///
/// **API quirk**: the service sometimes returns the string `"PENDING"` instead
/// of `null` for `message` and `attestation`; both deserialize to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    pub status: AttestationStatus,
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub message: Option<Bytes>,
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,
}

impl AttestationResponse {
    pub fn pending() -> Self {
        Self {
            status: AttestationStatus::Pending,
            message: None,
            attestation: None,
        }
    }

    /// Attestation bytes, present only when the status is `complete`.
    pub fn completed_attestation(&self) -> Option<&Bytes> {
        match self.status {
            AttestationStatus::Complete => self.attestation.as_ref(),
            _ => None,
        }
    }
}

/// Accepts hex with or without `0x`; maps null, empty and "PENDING" to `None`.
fn deserialize_optional_bytes_or_pending<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => Bytes::from_hex(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_complete_message() {
        let json = r#"{
            "messages": [
                { "status": "complete", "message": "0xdeadbeef", "attestation": "0x1234abcd" }
            ]
        }"#;
        let response: IrisMessagesResponse = serde_json::from_str(json).unwrap();
        let first = response.into_first();

        assert_eq!(first.status, AttestationStatus::Complete);
        assert_eq!(first.message.unwrap().to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            first.attestation.unwrap().to_vec(),
            vec![0x12, 0x34, 0xab, 0xcd]
        );
    }

    #[rstest]
    #[case::pending_upper(r#""PENDING""#)]
    #[case::pending_lower(r#""pending""#)]
    #[case::null("null")]
    #[case::empty(r#""""#)]
    fn test_placeholder_attestation_is_none(#[case] value: &str) {
        let json = format!(r#"{{"status":"pending","message":{value},"attestation":{value}}}"#);
        let response: AttestationResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(response.status, AttestationStatus::Pending);
        assert!(response.message.is_none());
        assert!(response.attestation.is_none());
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let response: AttestationResponse =
            serde_json::from_str(r#"{"status":"pending_confirmations"}"#).unwrap();
        assert_eq!(response.status, AttestationStatus::PendingConfirmations);
        assert!(response.attestation.is_none());
    }

    #[test]
    fn test_hex_without_prefix() {
        let response: AttestationResponse =
            serde_json::from_str(r#"{"status":"complete","attestation":"deadbeef"}"#).unwrap();
        assert_eq!(
            response.completed_attestation().unwrap().to_vec(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn test_invalid_hex_fails() {
        let result =
            serde_json::from_str::<AttestationResponse>(r#"{"status":"complete","attestation":"zz"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_messages_is_pending() {
        let response: IrisMessagesResponse = serde_json::from_str(r#"{"messages":[]}"#).unwrap();
        assert_eq!(response.into_first(), AttestationResponse::pending());
    }

    #[test]
    fn test_attestation_ignored_until_complete() {
        let response: AttestationResponse =
            serde_json::from_str(r#"{"status":"pending","attestation":"0x01"}"#).unwrap();
        assert!(response.completed_attestation().is_none());
    }
}
