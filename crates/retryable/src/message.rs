//! Retryable messages carried by an L1 submission receipt.
//!
//! A ticket submission emits `MessageDelivered` on the Bridge (message
//! number, aliased sender, L1 base fee) and `InboxMessageDelivered` on the
//! Inbox (packed ticket fields). Both are needed to identify the ticket on L2.

use crate::types::{RetryableMessage, RetryablePayload};
use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use binding::arbitrum::{IBridge, IInbox, L1_MESSAGE_TYPE_SUBMIT_RETRYABLE_TX};
use std::collections::HashMap;
use thiserror::Error;

const WORD: usize = 32;
/// Fixed words before the calldata: 8 fields plus the data length.
const HEADER_WORDS: usize = 9;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("retryable payload too short: {0} bytes")]
    PayloadTooShort(usize),

    #[error("retryable calldata length {0} exceeds payload")]
    DataLengthMismatch(U256),

    #[error("no retryable message found in receipt")]
    NotFound,

    #[error("inbox message {0} has no matching bridge event")]
    MissingBridgeEvent(U256),
}

fn word(payload: &[u8], index: usize) -> &[u8] {
    &payload[index * WORD..(index + 1) * WORD]
}

fn word_u256(payload: &[u8], index: usize) -> U256 {
    U256::from_be_slice(word(payload, index))
}

fn word_address(payload: &[u8], index: usize) -> Address {
    Address::from_slice(&word(payload, index)[WORD - 20..])
}

/// Decode the `abi.encodePacked` retryable fields of `InboxMessageDelivered`.
pub fn decode_retryable_payload(payload: &[u8]) -> Result<RetryablePayload, MessageError> {
    let header_len = HEADER_WORDS * WORD;
    if payload.len() < header_len {
        return Err(MessageError::PayloadTooShort(payload.len()));
    }

    let data_length = word_u256(payload, 8);
    let data_end = usize::try_from(data_length)
        .ok()
        .and_then(|len| header_len.checked_add(len))
        .filter(|end| *end <= payload.len())
        .ok_or(MessageError::DataLengthMismatch(data_length))?;

    Ok(RetryablePayload {
        dest_address: word_address(payload, 0),
        l2_call_value: word_u256(payload, 1),
        l1_value: word_u256(payload, 2),
        max_submission_fee: word_u256(payload, 3),
        excess_fee_refund_address: word_address(payload, 4),
        call_value_refund_address: word_address(payload, 5),
        gas_limit: word_u256(payload, 6),
        max_fee_per_gas: word_u256(payload, 7),
        data: Bytes::copy_from_slice(&payload[header_len..data_end]),
    })
}

/// Collect the retryable messages emitted by `bridge` and `inbox` in `logs`.
///
/// Messages are returned in inbox log order.
pub fn parse_retryable_messages(
    logs: &[Log],
    bridge: Address,
    inbox: Address,
) -> Result<Vec<RetryableMessage>, MessageError> {
    let mut delivered = HashMap::new();
    let mut payloads = Vec::new();

    for log in logs {
        let emitter = log.inner.address;

        if emitter == bridge {
            if let Ok(event) = IBridge::MessageDelivered::decode_log(&log.inner) {
                if event.kind == L1_MESSAGE_TYPE_SUBMIT_RETRYABLE_TX && event.inbox == inbox {
                    delivered.insert(event.messageIndex, (event.sender, event.baseFeeL1));
                }
            }
        } else if emitter == inbox {
            if let Ok(event) = IInbox::InboxMessageDelivered::decode_log(&log.inner) {
                payloads.push((event.messageNum, event.data.data.clone()));
            }
        }
    }

    if payloads.is_empty() {
        return Err(MessageError::NotFound);
    }

    payloads
        .into_iter()
        .map(|(message_number, data)| {
            let (sender, l1_base_fee) = delivered
                .get(&message_number)
                .copied()
                .ok_or(MessageError::MissingBridgeEvent(message_number))?;

            Ok(RetryableMessage {
                message_number,
                sender,
                l1_base_fee,
                payload: decode_retryable_payload(&data)?,
            })
        })
        .collect()
}
