//! Configuration types for aliased-balance recovery.
//!
//! This crate provides:
//! - The chain registry linking each supported L1 to its Arbitrum-style L2
//! - Bridge contract addresses and RPC endpoints per link
//! - Lookup errors for unsupported networks

pub mod network;

pub use network::{ChainLink, ChainRegistry, ConfigError, API_KEY_PLACEHOLDER};
