use crate::types::{RetryableMessage, TicketId};
use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_rlp::{Encodable, Header};

/// Arbitrum transaction type of a retryable submission.
pub const SUBMIT_RETRYABLE_TX_TYPE: u8 = 0x69;

/// Encode the L2 submit-retryable transaction for `message`.
///
/// ArbOS treats a zero destination as "no destination", so it is encoded
/// as an empty string rather than 20 zero bytes.
pub fn encode_submit_retryable(l2_chain_id: u64, message: &RetryableMessage) -> Vec<u8> {
    let payload = &message.payload;

    let message_number = B256::from(message.message_number);
    let dest = if payload.dest_address.is_zero() {
        Bytes::new()
    } else {
        Bytes::copy_from_slice(payload.dest_address.as_slice())
    };
    let chain_id = U256::from(l2_chain_id);

    let fields: [&dyn Encodable; 13] = [
        &chain_id,
        &message_number,
        &message.sender,
        &message.l1_base_fee,
        &payload.l1_value,
        &payload.max_fee_per_gas,
        &payload.gas_limit,
        &dest,
        &payload.l2_call_value,
        &payload.call_value_refund_address,
        &payload.max_submission_fee,
        &payload.excess_fee_refund_address,
        &payload.data,
    ];

    let payload_length = fields.iter().map(|f| f.length()).sum();
    let header = Header {
        list: true,
        payload_length,
    };

    let mut out = Vec::with_capacity(1 + header.length() + payload_length);
    out.push(SUBMIT_RETRYABLE_TX_TYPE);
    header.encode(&mut out);
    for field in fields {
        field.encode(&mut out);
    }

    out
}

/// Hash of the ticket creation transaction the L2 derives from `message`.
pub fn retryable_creation_id(l2_chain_id: u64, message: &RetryableMessage) -> TicketId {
    keccak256(encode_submit_retryable(l2_chain_id, message))
}
