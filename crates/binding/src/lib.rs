//! Contract bindings for all external contracts.
//!
//! This crate consolidates the Solidity interfaces of the Arbitrum bridge
//! used across the project:
//! - Inbox and Bridge (L1 side of retryable tickets)
//! - NodeInterface and ArbRetryableTx (L2 precompiles)
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod arbitrum;
