// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Circle Iris API attestation provider.

use alloy_primitives::TxHash;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, Instrument};
use url::Url;

use crate::chain::{IRIS_API_MAINNET, IRIS_API_TESTNET};
use crate::error::{BridgeError, Result};
use crate::protocol::{AttestationResponse, DomainId, IrisMessagesResponse};
use crate::spans;
use crate::traits::AttestationProvider;

/// [`AttestationProvider`] backed by Circle's Iris v2 API.
///
/// Status handling:
/// - 404: the burn is not indexed yet, returned as
///   [`BridgeError::AttestationNotFound`] so the poller keeps waiting
/// - any other non-success status: [`BridgeError::AttestationHttp`], which
///   stops polling
/// - 200 with an empty `messages` array: reported as pending
///
/// ```rust,no_run
/// use usdc_bridge_rs::providers::IrisAttestationProvider;
/// use usdc_bridge_rs::{AttestationProvider, DomainId};
/// use alloy_primitives::TxHash;
///
/// # async fn example() -> usdc_bridge_rs::Result<()> {
/// let iris = IrisAttestationProvider::sandbox();
/// let response = iris.get_attestation(DomainId::Ethereum, TxHash::ZERO).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IrisAttestationProvider {
    base_url: String,
    client: Client,
}

impl IrisAttestationProvider {
    /// Creates a provider for the Iris deployment at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    pub fn production() -> Self {
        Self::new(IRIS_API_MAINNET)
    }

    pub fn sandbox() -> Self {
        Self::new(IRIS_API_TESTNET)
    }

    /// `{base}/v2/messages/{domain}?transactionHash={hash}`
    pub fn messages_url(&self, source_domain: DomainId, tx_hash: TxHash) -> Result<Url> {
        let raw = format!(
            "{}/v2/messages/{}",
            self.base_url.trim_end_matches('/'),
            source_domain.as_u32()
        );
        let mut url = Url::parse(&raw).map_err(|e| BridgeError::InvalidUrl {
            reason: format!("{raw}: {e}"),
        })?;
        url.query_pairs_mut()
            .append_pair("transactionHash", &tx_hash.to_string());
        Ok(url)
    }
}

#[async_trait]
impl AttestationProvider for IrisAttestationProvider {
    async fn get_attestation(
        &self,
        source_domain: DomainId,
        tx_hash: TxHash,
    ) -> Result<AttestationResponse> {
        let url = self.messages_url(source_domain, tx_hash)?;
        let span = spans::get_attestation(&url);

        async move {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                debug!(event = "attestation_not_indexed");
                return Err(BridgeError::AttestationNotFound);
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                debug!(
                    status_code = status.as_u16(),
                    event = "attestation_http_error"
                );
                return Err(BridgeError::AttestationHttp {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.bytes().await?;
            let parsed: IrisMessagesResponse = serde_json::from_slice(&body)?;
            let attestation = parsed.into_first();

            debug!(status = ?attestation.status, event = "attestation_response_parsed");
            Ok(attestation)
        }
        .instrument(span)
        .await
    }
}
