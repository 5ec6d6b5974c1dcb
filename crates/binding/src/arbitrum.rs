//! Arbitrum bridge contract bindings.
//!
//! Includes contracts for L1→L2 retryable tickets:
//! - Inbox (L1, ticket submission and submission fee)
//! - Bridge (L1, delayed message accounting)
//! - NodeInterface (L2 virtual contract, gas estimation)
//! - ArbRetryableTx (L2 precompile, redeem scheduling)

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// Address of the NodeInterface virtual contract on every Arbitrum chain.
pub const NODE_INTERFACE: Address = address!("0x00000000000000000000000000000000000000C8");

/// Address of the ArbRetryableTx precompile on every Arbitrum chain.
pub const ARB_RETRYABLE_TX: Address = address!("0x000000000000000000000000000000000000006E");

/// Delayed message kind of a retryable submission.
pub const L1_MESSAGE_TYPE_SUBMIT_RETRYABLE_TX: u8 = 9;

sol! {
    /// Inbox - entry point on L1 for delayed messages and retryables
    /// See: https://github.com/OffchainLabs/nitro-contracts/blob/main/src/bridge/Inbox.sol
    #[sol(rpc)]
    #[allow(clippy::too_many_arguments)]
    interface IInbox {
        /// Emitted with the full message payload of every delayed message
        event InboxMessageDelivered(uint256 indexed messageNum, bytes data);

        /// Create a retryable ticket without checking that `l2CallValue` is
        /// covered by `msg.value`, and without aliasing the refund addresses
        function unsafeCreateRetryableTicket(
            address to,
            uint256 l2CallValue,
            uint256 maxSubmissionCost,
            address excessFeeRefundAddress,
            address callValueRefundAddress,
            uint256 gasLimit,
            uint256 maxFeePerGas,
            bytes calldata data
        ) external payable returns (uint256);

        /// Fee to submit a retryable with `dataLength` bytes of calldata
        function calculateRetryableSubmissionFee(uint256 dataLength, uint256 baseFee)
            external view returns (uint256);
    }

    /// Bridge - holds the delayed inbox accumulator on L1
    #[sol(rpc)]
    interface IBridge {
        /// Emitted for every message enqueued to the delayed inbox.
        /// `sender` is already aliased for messages coming from the Inbox.
        event MessageDelivered(
            uint256 indexed messageIndex,
            bytes32 indexed beforeInboxAcc,
            address inbox,
            uint8 kind,
            address sender,
            bytes32 messageDataHash,
            uint256 baseFeeL1,
            uint64 timestamp
        );
    }

    /// NodeInterface - virtual contract answered by the Arbitrum node
    #[sol(rpc)]
    interface INodeInterface {
        /// Simulate the L2 side of a retryable; only meaningful with eth_estimateGas
        function estimateRetryableTicket(
            address sender,
            uint256 deposit,
            address to,
            uint256 l2CallValue,
            address excessFeeRefundAddress,
            address callValueRefundAddress,
            bytes calldata data
        ) external;
    }

    /// ArbRetryableTx - precompile managing retryable tickets on L2
    #[sol(rpc)]
    interface IArbRetryableTx {
        /// Emitted when a redeem (automatic or manual) is scheduled
        event RedeemScheduled(
            bytes32 indexed ticketId,
            bytes32 indexed retryTxHash,
            uint64 indexed sequenceNum,
            uint64 donatedGas,
            address gasDonor,
            uint256 maxRefund,
            uint256 submissionFeeRefund
        );
    }
}
