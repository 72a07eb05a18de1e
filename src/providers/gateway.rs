// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Circle Gateway HTTP client.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, Instrument};
use url::Url;

use crate::chain::{GATEWAY_API_MAINNET, GATEWAY_API_TESTNET};
use crate::error::{BridgeError, GatewayStage, Result};
use crate::protocol::{
    DomainId, GatewayBalances, GatewayBalancesResponse, GatewayTransferRequest,
    GatewayTransferResponse,
};
use crate::spans;
use crate::traits::GatewayApi;

/// [`GatewayApi`] backed by Circle's Gateway REST API.
///
/// Every failure is reported as [`BridgeError::GatewayTransferFailed`] tagged
/// with the stage (`balance` or `submit`) it happened in.
#[derive(Debug, Clone)]
pub struct GatewayHttpClient {
    base_url: String,
    client: Client,
}

impl GatewayHttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(GATEWAY_API_MAINNET)
    }

    pub fn testnet() -> Self {
        Self::new(GATEWAY_API_TESTNET)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        Url::parse(&raw).map_err(|e| BridgeError::InvalidUrl {
            reason: format!("{raw}: {e}"),
        })
    }

    /// `{base}/v1/balances?address={depositor}&domains={d1,d2,...}`
    pub fn balances_url(&self, depositor: Address, domains: &[DomainId]) -> Result<Url> {
        let mut url = self.endpoint("v1/balances")?;
        let domains = domains
            .iter()
            .map(|domain| domain.as_u32().to_string())
            .collect::<Vec<_>>()
            .join(",");
        url.query_pairs_mut()
            .append_pair("address", &depositor.to_string())
            .append_pair("domains", &domains);
        Ok(url)
    }

    async fn read_error(stage: GatewayStage, response: reqwest::Response) -> BridgeError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        BridgeError::gateway_failed(stage, format!("HTTP {}: {body}", status.as_u16()))
    }
}

#[async_trait]
impl GatewayApi for GatewayHttpClient {
    async fn get_balances(
        &self,
        depositor: Address,
        domains: &[DomainId],
    ) -> Result<GatewayBalances> {
        let url = self.balances_url(depositor, domains)?;
        let span = spans::http_request("GET", &url);

        async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| BridgeError::gateway_failed(GatewayStage::Balance, e))?;

            if !response.status().is_success() {
                return Err(Self::read_error(GatewayStage::Balance, response).await);
            }

            let body: GatewayBalancesResponse = response
                .json()
                .await
                .map_err(|e| BridgeError::gateway_failed(GatewayStage::Balance, e))?;
            let balances = GatewayBalances::from_response(body)?;

            debug!(
                depositor = %depositor,
                total = %balances.total(),
                event = "gateway_balances_retrieved"
            );
            Ok(balances)
        }
        .instrument(span)
        .await
    }

    async fn submit_transfer(&self, request: &GatewayTransferRequest) -> Result<Bytes> {
        let url = self.endpoint("v1/transfer")?;
        let span = spans::http_request("POST", &url);

        async move {
            let response = self
                .client
                .post(url)
                .json(request)
                .send()
                .await
                .map_err(|e| BridgeError::gateway_failed(GatewayStage::Submit, e))?;

            if !response.status().is_success() {
                return Err(Self::read_error(GatewayStage::Submit, response).await);
            }

            let body: GatewayTransferResponse = response
                .json()
                .await
                .map_err(|e| BridgeError::gateway_failed(GatewayStage::Submit, e))?;

            debug!(
                intents = request.burn_intents.len(),
                attestation_len = body.attestation.len(),
                event = "gateway_transfer_attested"
            );
            Ok(body.attestation)
        }
        .instrument(span)
        .await
    }
}
