//! Balance inspection for stranded funds.
//!
//! This crate queries native balances on the target chain, either for a
//! plain address or for the L2 alias of an L1 account.

pub mod monitor;

use alloy_primitives::{utils::format_ether, Address, U256};
use serde::{Deserialize, Serialize};
use std::{fmt, future::Future};
use thiserror::Error;

/// Native balance of an address, taken once.
///
/// A re-check yields a new snapshot; snapshots are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// L1 account the query was made for
    pub origin: Address,
    /// Address whose balance was read (the alias for aliased queries)
    pub address: Address,
    /// Balance in wei
    pub amount: U256,
    /// Whether the query completed
    pub checked: bool,
}

impl BalanceSnapshot {
    /// Whether there is anything to recover.
    pub fn has_funds(&self) -> bool {
        self.checked && self.amount > U256::ZERO
    }
}

impl fmt::Display for BalanceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.origin == self.address {
            write!(f, "{} ETH on {}", format_ether(self.amount), self.address)
        } else {
            write!(
                f,
                "{} ETH on {} (Alias of {})",
                format_ether(self.amount),
                self.address,
                self.origin
            )
        }
    }
}

/// Balance query to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceQuery {
    /// Native ETH balance of an address
    Native {
        /// Account address
        address: Address,
    },
    /// Native ETH balance of the L2 alias of an L1 account
    Aliased {
        /// Unaliased L1 account
        origin: Address,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// The RPC call failed or timed out
    #[error("Balance query for {address} failed: {reason}")]
    Rpc { address: Address, reason: String },
}

/// Trait for monitoring balances on a blockchain.
pub trait Monitor: Send + Sync {
    /// Query a single balance.
    fn query_balance(
        &self,
        query: BalanceQuery,
    ) -> impl Future<Output = Result<BalanceSnapshot, BalanceError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn snapshot(amount: u64) -> BalanceSnapshot {
        BalanceSnapshot {
            origin: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            address: retryable::apply_alias(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")),
            amount: U256::from(amount),
            checked: true,
        }
    }

    #[test]
    fn test_has_funds() {
        assert!(snapshot(1).has_funds());
        assert!(!snapshot(0).has_funds());

        let mut unchecked = snapshot(10);
        unchecked.checked = false;
        assert!(!unchecked.has_funds());
    }

    #[test]
    fn test_display_mentions_alias() {
        let text = snapshot(5_000_000_000_000_000).to_string();
        assert!(text.starts_with("0.005"));
        assert!(text.contains("Alias of"));
    }

    #[test]
    fn test_query_serde() {
        let query = BalanceQuery::Aliased {
            origin: Address::repeat_byte(0x11),
        };
        let json = serde_json::to_string(&query).unwrap();
        let back: BalanceQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }
}
