//! Common test setup utilities shared across integration tests.
#![allow(dead_code)] // used in ignored tests

use alloy_provider::Provider;
use config::{ChainLink, ChainRegistry};
use recovery::settings::Config;
use serde::Deserialize;

/// Local configuration with secrets (git-ignored file)
#[derive(Debug, Deserialize)]
struct LocalConfig {
    private_key: Option<String>,
    infura_key: Option<String>,
}

fn load_local_config() -> Option<LocalConfig> {
    let contents = std::fs::read_to_string("tests/test-config.local.toml").ok()?;
    toml::from_str(&contents).ok()
}

/// Load `tests/test-config.toml`, or the defaults when it does not exist.
pub fn load_test_config() -> Config {
    let config_path = std::path::Path::new("tests/test-config.toml");
    if config_path.exists() {
        Config::from_file(config_path).expect("Failed to load tests/test-config.toml.")
    } else {
        Config::default()
    }
}

/// Load the private key of the recovering account.
///
/// Tries PRIVATE_KEY, then `tests/test-config.local.toml`.
pub fn load_private_key() -> Option<String> {
    if let Ok(pk) = std::env::var("PRIVATE_KEY") {
        eprintln!("✓ Loaded private key from PRIVATE_KEY environment variable");
        return Some(pk);
    }

    let key = load_local_config().and_then(|c| c.private_key);
    if key.is_none() {
        eprintln!("⚠ No private key found in PRIVATE_KEY or tests/test-config.local.toml");
    }
    key
}

/// Load the L1 RPC API key. Panics if not found.
pub fn load_infura_key() -> String {
    std::env::var("INFURA_KEY")
        .ok()
        .or_else(|| load_local_config().and_then(|c| c.infura_key))
        .expect("Set INFURA_KEY or infura_key in tests/test-config.local.toml")
}

/// Link of a built-in source chain.
pub fn link(source_chain_id: u64) -> ChainLink {
    ChainRegistry::builtin()
        .link(source_chain_id)
        .expect("Chain not in registry")
        .clone()
}

/// Provider for a plain url.
pub async fn setup_provider(url: &str) -> impl Provider + Clone {
    client::create_provider(url)
        .await
        .expect("Failed to create provider")
}

/// L1 provider of a source chain, needs the API key.
pub async fn setup_l1_provider(source_chain_id: u64) -> impl Provider + Clone {
    let url = link(source_chain_id)
        .source_rpc_url(&load_infura_key())
        .expect("Failed to render L1 RPC url");
    setup_provider(&url).await
}

/// L2 provider of a source chain's target.
pub async fn setup_l2_provider(source_chain_id: u64) -> impl Provider + Clone {
    setup_provider(&link(source_chain_id).target_rpc_url).await
}
