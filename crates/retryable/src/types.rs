use alloy_primitives::{Address, Bytes, B256, U256};
use std::fmt;

/// Hash of the ticket creation transaction on L2.
pub type TicketId = B256;

/// A retryable submission as recorded by the L1 bridge and inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryableMessage {
    /// Delayed inbox message number
    pub message_number: U256,
    /// Sender as seen on L2 (already aliased by the inbox)
    pub sender: Address,
    /// L1 base fee recorded in `MessageDelivered`
    pub l1_base_fee: U256,
    pub payload: RetryablePayload,
}

/// Fields of a retryable packed into `InboxMessageDelivered.data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryablePayload {
    pub dest_address: Address,
    pub l2_call_value: U256,
    /// `msg.value` of the L1 transaction
    pub l1_value: U256,
    pub max_submission_fee: U256,
    pub excess_fee_refund_address: Address,
    pub call_value_refund_address: Address,
    pub gas_limit: U256,
    pub max_fee_per_gas: U256,
    pub data: Bytes,
}

/// Where a ticket stands on L2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryableStatus {
    /// No creation receipt on L2 yet
    NotYetCreated,
    /// Creation reverted, funds went to the refund addresses
    CreationFailed,
    /// Created, auto-redeem outcome not visible yet
    Pending,
    /// Created but the auto-redeem failed; the ticket can be redeemed manually
    FundsDepositedOnL2 { ticket_id: TicketId },
    /// Auto-redeem succeeded
    Redeemed { retry_tx_hash: B256 },
}

impl RetryableStatus {
    /// Whether waiting longer can change the status.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::NotYetCreated | Self::Pending)
    }
}

impl fmt::Display for RetryableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotYetCreated => write!(f, "not yet created on L2"),
            Self::CreationFailed => write!(f, "creation failed on L2"),
            Self::Pending => write!(f, "created on L2, redeem pending"),
            Self::FundsDepositedOnL2 { ticket_id } => write!(
                f,
                "funds deposited on L2, auto-redeem failed; redeem ticket {ticket_id} manually"
            ),
            Self::Redeemed { retry_tx_hash } => write!(f, "redeemed on L2 in {retry_tx_hash}"),
        }
    }
}
