//! User facing outcome of a recovery attempt.

use action::RecoveryError;
use alloy_primitives::TxHash;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Success,
    Failure,
}

/// Plain text outcome of a recovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: ReportKind,
    pub transaction_hash: Option<TxHash>,
    pub explorer_url: Option<String>,
    pub message: String,
    /// Failure clears up without user changes, running again may succeed
    pub retryable: bool,
}

impl Report {
    /// Ticket submitted; links the L1 hash on the explorer.
    pub fn success(tx_hash: TxHash, explorer_base: &str) -> Self {
        let explorer_url = format!("{}/{tx_hash}", explorer_base.trim_end_matches('/'));
        let message = format!(
            "L1 submission transaction receipt is: {tx_hash}. \
             Follow the transaction in the Retryables Dashboard: {explorer_url}"
        );

        Self {
            kind: ReportKind::Success,
            transaction_hash: Some(tx_hash),
            explorer_url: Some(explorer_url),
            message,
            retryable: false,
        }
    }

    pub fn failure(error: &RecoveryError) -> Self {
        Self {
            kind: ReportKind::Failure,
            transaction_hash: None,
            explorer_url: None,
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == ReportKind::Success
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ReportKind::Success => write!(f, "{}", self.message),
            ReportKind::Failure if self.retryable => {
                write!(f, "Error: {}. Please try again", self.message)
            }
            ReportKind::Failure => write!(f, "Error: {}", self.message),
        }
    }
}
