//! Chain registry for retryable-ticket recovery.
//!
//! Each supported source (L1) chain is linked to exactly one target (L2)
//! chain. A link carries the endpoints and the bridge contract addresses
//! needed to inspect the aliased balance and to submit a ticket.

use alloy_primitives::{address, Address};
use thiserror::Error;

/// Placeholder substituted with the L1 RPC provider API key.
pub const API_KEY_PLACEHOLDER: &str = "{key}";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The chain id is not part of the registry
    #[error("Unsupported chain id {0}. This chain is not supported by this tool")]
    UnsupportedChain(u64),

    /// The L1 endpoint needs an API key but none was provided
    #[error("Missing API key for the L1 RPC provider")]
    MissingApiKey,
}

/// Link between a source chain and the L2 that receives its retryables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    /// L1 chain id
    pub source_chain_id: u64,
    /// L2 chain id
    pub target_chain_id: u64,
    /// Public L2 RPC endpoint
    pub target_rpc_url: String,
    /// L1 RPC endpoint, may contain [`API_KEY_PLACEHOLDER`]
    pub source_rpc_template: String,
    /// Delayed inbox on L1
    pub inbox: Address,
    /// Bridge on L1 (emits `MessageDelivered`)
    pub bridge: Address,
}

impl ChainLink {
    /// Ethereum mainnet to Arbitrum One.
    pub fn arbitrum_one() -> Self {
        Self {
            source_chain_id: 1,
            target_chain_id: 42161,
            target_rpc_url: "https://arb1.arbitrum.io/rpc".to_string(),
            source_rpc_template: "https://mainnet.infura.io/v3/{key}".to_string(),
            // https://etherscan.io/address/0x4Dbd4fc535Ac27206064B68FfCf827b0A60BAB3f
            inbox: address!("0x4Dbd4fc535Ac27206064B68FfCf827b0A60BAB3f"),
            bridge: address!("0x8315177aB297bA92A06054cE80a67Ed4DBd7ed3a"),
        }
    }

    /// Goerli to Arbitrum Goerli.
    pub fn arbitrum_goerli() -> Self {
        Self {
            source_chain_id: 5,
            target_chain_id: 421613,
            target_rpc_url: "https://goerli-rollup.arbitrum.io/rpc".to_string(),
            source_rpc_template: "https://goerli.infura.io/v3/{key}".to_string(),
            inbox: address!("0x6BEbC4925716945D46F0Ec336D5C2564F419682C"),
            bridge: address!("0xaf4159A80B6Cc41ED517DB1c453d1Ef5C2e4dB72"),
        }
    }

    /// Render the L1 endpoint for this link.
    ///
    /// Fails when the template expects a key and `api_key` is empty.
    pub fn source_rpc_url(&self, api_key: &str) -> Result<String, ConfigError> {
        if !self.source_rpc_template.contains(API_KEY_PLACEHOLDER) {
            return Ok(self.source_rpc_template.clone());
        }

        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(self
            .source_rpc_template
            .replace(API_KEY_PLACEHOLDER, api_key.trim()))
    }
}

/// Fixed table of supported chain links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistry {
    links: Vec<ChainLink>,
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ChainRegistry {
    /// Registry with the built-in links (mainnet and Goerli).
    pub fn builtin() -> Self {
        Self {
            links: vec![ChainLink::arbitrum_one(), ChainLink::arbitrum_goerli()],
        }
    }

    /// All registered links.
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    /// Whether `source_chain_id` is part of the registry.
    pub fn is_supported(&self, source_chain_id: u64) -> bool {
        self.links
            .iter()
            .any(|l| l.source_chain_id == source_chain_id)
    }

    /// Full link for a source chain.
    pub fn link(&self, source_chain_id: u64) -> Result<&ChainLink, ConfigError> {
        self.links
            .iter()
            .find(|l| l.source_chain_id == source_chain_id)
            .ok_or(ConfigError::UnsupportedChain(source_chain_id))
    }

    /// Target chain id for a source chain.
    pub fn resolve_target_chain(&self, source_chain_id: u64) -> Result<u64, ConfigError> {
        self.link(source_chain_id).map(|l| l.target_chain_id)
    }

    /// L2 RPC endpoint for a target chain.
    pub fn resolve_l2_endpoint(&self, target_chain_id: u64) -> Result<&str, ConfigError> {
        self.links
            .iter()
            .find(|l| l.target_chain_id == target_chain_id)
            .map(|l| l.target_rpc_url.as_str())
            .ok_or(ConfigError::UnsupportedChain(target_chain_id))
    }

    /// L1 RPC endpoint for a source chain with the API key filled in.
    pub fn l1_rpc_url(&self, source_chain_id: u64, api_key: &str) -> Result<String, ConfigError> {
        self.link(source_chain_id)?.source_rpc_url(api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target_chain() {
        let registry = ChainRegistry::builtin();
        assert_eq!(registry.resolve_target_chain(1), Ok(42161));
        assert_eq!(registry.resolve_target_chain(5), Ok(421613));
    }

    #[test]
    fn test_resolve_unknown_chain() {
        let registry = ChainRegistry::builtin();
        assert_eq!(
            registry.resolve_target_chain(999),
            Err(ConfigError::UnsupportedChain(999))
        );
        assert!(!registry.is_supported(999));
    }

    #[test]
    fn test_resolve_l2_endpoint() {
        let registry = ChainRegistry::builtin();
        assert_eq!(
            registry.resolve_l2_endpoint(42161),
            Ok("https://arb1.arbitrum.io/rpc")
        );
        assert_eq!(
            registry.resolve_l2_endpoint(421613),
            Ok("https://goerli-rollup.arbitrum.io/rpc")
        );
        // source ids are not target ids
        assert_eq!(
            registry.resolve_l2_endpoint(1),
            Err(ConfigError::UnsupportedChain(1))
        );
    }

    #[test]
    fn test_l1_rpc_url() {
        let registry = ChainRegistry::builtin();
        assert_eq!(
            registry.l1_rpc_url(1, "abc123").unwrap(),
            "https://mainnet.infura.io/v3/abc123"
        );
        assert_eq!(
            registry.l1_rpc_url(5, " "),
            Err(ConfigError::MissingApiKey)
        );
    }

    #[test]
    fn test_l1_rpc_url_without_placeholder() {
        let link = ChainLink {
            source_rpc_template: "http://localhost:8545".to_string(),
            ..ChainLink::arbitrum_one()
        };
        assert_eq!(link.source_rpc_url("").unwrap(), "http://localhost:8545");
    }

    #[test]
    fn test_links_are_unique() {
        let registry = ChainRegistry::builtin();
        let links = registry.links();
        assert_eq!(links.len(), 2);

        for (i, a) in links.iter().enumerate() {
            for b in &links[i + 1..] {
                assert_ne!(a.source_chain_id, b.source_chain_id);
                assert_ne!(a.target_chain_id, b.target_chain_id);
            }
        }
    }
}
