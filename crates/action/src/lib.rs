//! Recovery of funds stranded on an aliased L2 address.

mod error;
pub mod estimate;
pub mod recover;
pub mod submit;

use alloy_primitives::{TxHash, U256};
use alloy_rpc_types_eth::Log;
pub use error::RecoveryError;
pub use estimate::{EstimateOptions, FeeEstimator, GasEstimate, RetryableGasEstimator};
pub use recover::{
    compute_l2_call_value, validate_destination, RecoverAction, RecoveryRequest, RetryableTicket,
    TicketSubmitter,
};
use std::future::Future;
pub use submit::L1Submitter;

/// Trait for executable onchain actions.
pub trait Action: Send + Sync {
    /// Check the preconditions of the action without touching the chain.
    fn is_ready(&self) -> Result<(), RecoveryError>;

    /// Execute the action once.
    fn execute(self) -> impl Future<Output = Result<SubmissionOutcome, RecoveryError>> + Send;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

/// Confirmed L1 transaction of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: u64,
    /// Call value the ticket forwards to the destination on L2
    pub l2_call_value: U256,
    /// Receipt logs, needed to follow the ticket on L2
    pub logs: Vec<Log>,
}
