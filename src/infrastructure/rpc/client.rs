use crate::domain::model::{de_string_or_u64, RawUtxo};
use crate::foundation::{Network, Result, UtxoError, HTTP_REQUEST_TIMEOUT_SECS};
use crate::infrastructure::rpc::ChainRpc;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockDagInfo {
    #[serde(default, deserialize_with = "de_string_or_u64")]
    virtual_daa_score: Option<u64>,
}

/// REST client for the public Kaspa API. Binds to IPv4 explicitly so
/// dual-stack hosts with broken IPv6 routes do not stall every request
/// into the 10 s timeout.
pub struct KaspaRestClient {
    http: reqwest::Client,
}

impl KaspaRestClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| UtxoError::NetworkError(format!("http client build failed: {}", err)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ChainRpc for KaspaRestClient {
    async fn utxos_by_address(&self, address: &str, network: Network) -> Result<Vec<RawUtxo>> {
        let url = format!("{}/addresses/{}/utxos", network.api_base_url(), address);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| UtxoError::NetworkError(format!("utxos_by_address failed url={} error={}", url, err)))?;
        if !response.status().is_success() {
            return Err(UtxoError::NetworkError(format!(
                "utxos_by_address failed url={} status={}",
                url,
                response.status()
            )));
        }
        let utxos: Vec<RawUtxo> = response
            .json()
            .await
            .map_err(|err| UtxoError::ParseError(format!("utxos_by_address decode failed url={} error={}", url, err)))?;
        debug!("utxos_by_address url={} count={}", url, utxos.len());
        Ok(utxos)
    }

    async fn virtual_daa_score(&self, network: Network) -> Result<u64> {
        let url = format!("{}/info/blockdag", network.api_base_url());
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| UtxoError::NetworkError(format!("blockdag info failed url={} error={}", url, err)))?;
        if !response.status().is_success() {
            return Err(UtxoError::NetworkError(format!("blockdag info failed url={} status={}", url, response.status())));
        }
        let info: BlockDagInfo = response
            .json()
            .await
            .map_err(|err| UtxoError::ParseError(format!("blockdag info decode failed url={} error={}", url, err)))?;
        info.virtual_daa_score
            .ok_or_else(|| UtxoError::ParseError(format!("blockdag info missing virtualDaaScore url={}", url)))
    }

    async fn transaction_exists(&self, transaction_id: &str, network: Network) -> Result<bool> {
        let url = format!("{}/transactions/{}", network.api_base_url(), transaction_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| UtxoError::NetworkError(format!("transaction lookup failed url={} error={}", url, err)))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(UtxoError::NetworkError(format!(
                "transaction lookup failed url={} status={}",
                url,
                response.status()
            )));
        }
        Ok(true)
    }
}
