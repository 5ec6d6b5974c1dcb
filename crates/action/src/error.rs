use alloy_primitives::U256;
use thiserror::Error;

/// Failures of one recovery attempt.
///
/// None of these are fatal; the caller turns them into a user message and
/// decides whether the attempt can be repeated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    /// Connected network is not in the registry
    #[error("Chain {0} is not supported. Please connect to a supported network")]
    UnsupportedChain(u64),

    /// Malformed destination address
    #[error("Please input a valid destination address ({0})")]
    InvalidInput(String),

    /// An RPC call failed (balance, base fee, receipt)
    #[error("Network error: {0}")]
    Network(String),

    /// Gas or fee estimation failed
    #[error("Gas estimation failed: {0}")]
    Estimation(String),

    /// Signing, broadcast or execution of the L1 transaction failed
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Fees of the ticket exceed the stranded balance
    #[error("Balance of {balance} wei does not cover ticket fees of {fees} wei")]
    InsufficientBalance { balance: U256, fees: U256 },

    /// No positive balance was found on the aliased address
    #[error("No funds to recover on {0}")]
    NothingToRecover(alloy_primitives::Address),

    /// Another submission of this session has not finished
    #[error("A recovery transaction is already being submitted")]
    SubmissionInProgress,
}

impl RecoveryError {
    /// Whether repeating the same action later can succeed without user changes.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Estimation(_) | Self::Submission(_)
        )
    }
}
