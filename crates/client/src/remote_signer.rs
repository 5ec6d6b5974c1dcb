//! Signer that delegates to a signer-proxy over JSON-RPC.
//!
//! The proxy receives `eth_signTransaction` and answers with the signed raw
//! transaction, so the recovering key never has to live on this machine.

use crate::ClientError;
use alloy_primitives::{Address, Bytes};
use alloy_rpc_types::eth::TransactionRequest;
use eyre::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote signer bound to one account on one chain.
#[derive(Debug, Clone)]
pub struct RemoteSigner {
    client: reqwest::Client,
    proxy_url: String,
    address: Address,
    chain_id: u64,
}

impl RemoteSigner {
    /// * `proxy_url` - signer-proxy endpoint, e.g. `http://localhost:9060`
    /// * `address` - account the proxy signs for
    /// * `chain_id` - chain used for EIP-155 replay protection
    pub fn new(
        proxy_url: impl Into<String>,
        address: Address,
        chain_id: u64,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Connection(format!("signer-proxy client: {e}")))?;

        Ok(Self {
            client,
            proxy_url: proxy_url.into(),
            address,
            chain_id,
        })
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a filled transaction; the result is ready for `eth_sendRawTransaction`.
    pub async fn sign_transaction(&self, tx: TransactionRequest) -> Result<Bytes> {
        if tx.from.is_some_and(|from| from != self.address) {
            bail!("transaction sender does not match remote signer {}", self.address);
        }

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_signTransaction",
            params: [tx],
            id: 1,
        };

        let response = self
            .client
            .post(&self.proxy_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            bail!("signer-proxy returned {status}: {body}");
        }

        decode_signed(response.json().await?)
    }
}

fn decode_signed(response: JsonRpcResponse<SignedTransaction>) -> Result<Bytes> {
    match (response.result, response.error) {
        (Some(signed), _) => Ok(signed.raw.parse()?),
        (None, Some(error)) => bail!("JSON-RPC error {}: {}", error.code, error.message),
        (None, None) => bail!("signer-proxy returned neither result nor error"),
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
    id: u32,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// `eth_signTransaction` result.
#[derive(Debug, Deserialize)]
struct SignedTransaction {
    /// Hex-encoded EIP-2718 envelope
    raw: String,
}
