//! RPC providers and the signing wallet used by the recovery flow.
//!
//! The wallet stands in for the browser wallet of a dapp: it knows the
//! connected account and can sign a transaction request. Signing is either
//! local (private key) or delegated to a signer-proxy.

mod remote_signer;

use alloy_consensus::TxEnvelope;
use alloy_network::{eip2718::Encodable2718, EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
pub use remote_signer::RemoteSigner;
use std::{fmt, future::Future, pin::Pin, sync::Arc};
use thiserror::Error;

/// A function that signs a transaction request and returns signed bytes.
pub type SignerFn = Arc<
    dyn Fn(TransactionRequest) -> Pin<Box<dyn Future<Output = eyre::Result<Bytes>> + Send>>
        + Send
        + Sync,
>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error talking to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The node returned a block without the expected fields
    #[error("Missing block data: {0}")]
    MissingBlockData(String),
}

/// Create an HTTP provider from url.
pub async fn create_provider(
    rpc_url: &str,
) -> Result<impl Provider + Clone + 'static, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Chain id the provider is connected to.
pub async fn connected_chain_id<P: Provider>(provider: &P) -> Result<u64, ClientError> {
    provider
        .get_chain_id()
        .await
        .map_err(|e| ClientError::Connection(e.to_string()))
}

/// Base fee of the latest block.
///
/// Fails on pre-London chains where blocks carry no base fee.
pub async fn latest_base_fee<P: Provider>(provider: &P) -> Result<u64, ClientError> {
    let block = provider
        .get_block_by_number(alloy_rpc_types::BlockNumberOrTag::Latest)
        .await
        .map_err(|e| ClientError::Connection(e.to_string()))?
        .ok_or_else(|| ClientError::MissingBlockData("latest block not found".to_string()))?;

    block
        .header
        .base_fee_per_gas
        .ok_or_else(|| ClientError::MissingBlockData("latest block has no base fee".to_string()))
}

/// The connected account and its signing capability.
#[derive(Clone)]
pub struct Wallet {
    address: Address,
    signer: SignerFn,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Wallet over an arbitrary signing function.
    pub fn from_parts(address: Address, signer: SignerFn) -> Self {
        Self { address, signer }
    }

    /// Wallet signing locally with a private key.
    ///
    /// The provider fills nonce, fees and gas before signing.
    pub fn local<P>(private_key: &str, chain_id: u64, provider: P) -> Result<Self, ClientError>
    where
        P: Provider + Clone + 'static,
    {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;
        let address = signer.address();

        Ok(Self {
            address,
            signer: local_signer_fn(signer, chain_id, provider),
        })
    }

    /// Wallet delegating signatures to a signer-proxy.
    pub fn remote<P>(remote: RemoteSigner, provider: P) -> Self
    where
        P: Provider + Clone + 'static,
    {
        let address = remote.address();
        let chain_id = remote.chain_id();

        let signer: SignerFn = Arc::new(move |tx| {
            let remote = remote.clone();
            let provider = provider.clone();
            Box::pin(async move {
                let filled_tx = fill_transaction(tx, &provider, address, chain_id).await?;
                remote.sign_transaction(filled_tx).await
            })
        });

        Self { address, signer }
    }

    /// Account the wallet signs for.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Sign a transaction request, returning EIP-2718 encoded bytes.
    pub async fn sign(&self, tx: TransactionRequest) -> eyre::Result<Bytes> {
        (self.signer)(tx).await
    }
}

fn local_signer_fn<P>(signer: PrivateKeySigner, chain_id: u64, provider: P) -> SignerFn
where
    P: Provider + Clone + 'static,
{
    let from_address = signer.address();
    let wallet = EthereumWallet::from(signer);

    Arc::new(move |tx: TransactionRequest| {
        let wallet = wallet.clone();
        let provider = provider.clone();
        Box::pin(async move {
            let filled_tx = fill_transaction(tx, &provider, from_address, chain_id).await?;

            let tx_envelope: TxEnvelope = filled_tx
                .build(&wallet)
                .await
                .map_err(|e| eyre::eyre!("{}", e))?;

            let mut encoded = Vec::new();
            tx_envelope.encode_2718(&mut encoded);
            Ok(Bytes::from(encoded))
        })
    })
}

/// Fill missing transaction fields using the provider.
pub async fn fill_transaction<P>(
    mut tx: TransactionRequest,
    provider: &P,
    from: Address,
    chain_id: u64,
) -> eyre::Result<TransactionRequest>
where
    P: Provider,
{
    if tx.from.is_none() {
        tx.from = Some(from);
    }

    if tx.chain_id.is_none() {
        tx.chain_id = Some(chain_id);
    }

    if tx.nonce.is_none() {
        let nonce = provider.get_transaction_count(from).await?;
        tx.nonce = Some(nonce);
    }

    // Fees first, gas estimation may depend on them
    if tx.max_fee_per_gas.is_none() || tx.max_priority_fee_per_gas.is_none() {
        let fee_estimate = provider.estimate_eip1559_fees().await?;
        if tx.max_fee_per_gas.is_none() {
            tx.max_fee_per_gas = Some(fee_estimate.max_fee_per_gas);
        }
        if tx.max_priority_fee_per_gas.is_none() {
            tx.max_priority_fee_per_gas = Some(fee_estimate.max_priority_fee_per_gas);
        }
    }

    if tx.gas.is_none() {
        let gas_estimate = provider.estimate_gas(tx.clone()).await?;
        // 20% buffer
        tx.gas = Some(gas_estimate + gas_estimate / 5);
    }

    Ok(tx)
}
