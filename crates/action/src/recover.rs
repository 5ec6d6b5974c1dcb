//! Recovery of an aliased L2 balance through `unsafeCreateRetryableTicket`.
//!
//! The funds already sit on the aliased address, so the L1 transaction
//! carries no value: the ticket spends the aliased balance for its fees and
//! forwards the rest to the destination as `l2CallValue`. The unsafe entry
//! point is required because the regular one insists that `msg.value`
//! covers `l2CallValue`.

use crate::{estimate::GasEstimate, Action, RecoveryError, SubmissionOutcome};
use alloy_primitives::{utils::format_ether, Address, Bytes, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use binding::arbitrum::IInbox;
use retryable::{apply_alias, parse_address};
use std::future::Future;
use tracing::info;

/// Funds to move from the alias of `source_address` to `destination_address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryRequest {
    /// Unaliased L1 account, the sender of the ticket
    pub source_address: Address,
    /// Receiver of the funds on L2, also refund address for all fees
    pub destination_address: Address,
    /// Aliased balance to recover
    pub amount: U256,
}

impl RecoveryRequest {
    /// Build a request from user input, validating the destination first.
    pub fn new(
        source_address: Address,
        destination: &str,
        amount: U256,
    ) -> Result<Self, RecoveryError> {
        Ok(Self {
            source_address,
            destination_address: validate_destination(destination)?,
            amount,
        })
    }

    /// Address holding the funds on L2.
    pub fn aliased_address(&self) -> Address {
        apply_alias(self.source_address)
    }
}

/// Parse a destination address typed by the user.
pub fn validate_destination(input: &str) -> Result<Address, RecoveryError> {
    let address = parse_address(input).map_err(|e| RecoveryError::InvalidInput(e.to_string()))?;

    if address.is_zero() {
        return Err(RecoveryError::InvalidInput(
            "the zero address cannot receive funds".to_string(),
        ));
    }

    Ok(address)
}

/// `balance - max_submission_cost - gas_limit * max_fee_per_gas`.
///
/// Fails instead of wrapping when the fees exceed the balance.
pub fn compute_l2_call_value(balance: U256, estimate: &GasEstimate) -> Result<U256, RecoveryError> {
    let fees = estimate.fees().ok_or_else(|| {
        RecoveryError::Estimation("ticket fees overflow 256 bits".to_string())
    })?;

    balance
        .checked_sub(fees)
        .ok_or(RecoveryError::InsufficientBalance { balance, fees })
}

/// Arguments of one `unsafeCreateRetryableTicket` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryableTicket {
    /// Inbox the ticket is sent to
    pub inbox: Address,
    /// Unaliased sender of the L1 transaction
    pub from: Address,
    pub to: Address,
    pub l2_call_value: U256,
    pub max_submission_cost: U256,
    pub excess_fee_refund_address: Address,
    pub call_value_refund_address: Address,
    pub gas_limit: U256,
    pub max_fee_per_gas: U256,
    pub data: Bytes,
}

impl RetryableTicket {
    /// Ticket moving the whole aliased balance, net of fees, to the destination.
    pub fn for_recovery(
        inbox: Address,
        request: &RecoveryRequest,
        estimate: &GasEstimate,
    ) -> Result<Self, RecoveryError> {
        let l2_call_value = compute_l2_call_value(request.amount, estimate)?;
        let destination = request.destination_address;

        Ok(Self {
            inbox,
            from: request.source_address,
            to: destination,
            l2_call_value,
            max_submission_cost: estimate.max_submission_cost,
            excess_fee_refund_address: destination,
            call_value_refund_address: destination,
            gas_limit: estimate.gas_limit,
            max_fee_per_gas: estimate.max_fee_per_gas,
            data: Bytes::new(),
        })
    }

    /// ABI encoded `unsafeCreateRetryableTicket` call.
    pub fn calldata(&self) -> Bytes {
        IInbox::unsafeCreateRetryableTicketCall {
            to: self.to,
            l2CallValue: self.l2_call_value,
            maxSubmissionCost: self.max_submission_cost,
            excessFeeRefundAddress: self.excess_fee_refund_address,
            callValueRefundAddress: self.call_value_refund_address,
            gasLimit: self.gas_limit,
            maxFeePerGas: self.max_fee_per_gas,
            data: self.data.clone(),
        }
        .abi_encode()
        .into()
    }

    /// L1 transaction carrying the ticket, with zero value.
    pub fn transaction_request(&self) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.from),
            to: Some(self.inbox.into()),
            value: Some(U256::ZERO),
            input: self.calldata().into(),
            ..Default::default()
        }
    }
}

/// Sends a ticket to L1 and waits for its inclusion.
pub trait TicketSubmitter: Send + Sync {
    /// Submit once; never retries.
    fn submit(
        &self,
        ticket: &RetryableTicket,
    ) -> impl Future<Output = Result<SubmissionOutcome, RecoveryError>> + Send;
}

/// Submits one recovery ticket.
pub struct RecoverAction<'a, S> {
    submitter: &'a S,
    inbox: Address,
    request: RecoveryRequest,
    estimate: GasEstimate,
}

impl<'a, S> RecoverAction<'a, S>
where
    S: TicketSubmitter,
{
    pub const fn new(
        submitter: &'a S,
        inbox: Address,
        request: RecoveryRequest,
        estimate: GasEstimate,
    ) -> Self {
        Self {
            submitter,
            inbox,
            request,
            estimate,
        }
    }

    /// Ticket this action would submit.
    pub fn ticket(&self) -> Result<RetryableTicket, RecoveryError> {
        RetryableTicket::for_recovery(self.inbox, &self.request, &self.estimate)
    }
}

impl<S> Action for RecoverAction<'_, S>
where
    S: TicketSubmitter,
{
    fn is_ready(&self) -> Result<(), RecoveryError> {
        if self.inbox.is_zero() {
            return Err(RecoveryError::InvalidInput("inbox address is zero".to_string()));
        }

        if self.request.destination_address.is_zero() {
            return Err(RecoveryError::InvalidInput(
                "the zero address cannot receive funds".to_string(),
            ));
        }

        if self.request.amount.is_zero() {
            return Err(RecoveryError::NothingToRecover(
                self.request.aliased_address(),
            ));
        }

        compute_l2_call_value(self.request.amount, &self.estimate).map(|_| ())
    }

    async fn execute(self) -> Result<SubmissionOutcome, RecoveryError> {
        self.is_ready()?;

        let ticket = self.ticket()?;
        info!(
            from = %ticket.from,
            alias = %self.request.aliased_address(),
            to = %ticket.to,
            l2_call_value = %ticket.l2_call_value,
            max_submission_cost = %ticket.max_submission_cost,
            gas_limit = %ticket.gas_limit,
            max_fee_per_gas = %ticket.max_fee_per_gas,
            "Submitting recovery ticket"
        );

        let outcome = self.submitter.submit(&ticket).await?;
        info!(
            tx_hash = %outcome.tx_hash,
            block_number = outcome.block_number,
            gas_used = outcome.gas_used,
            "Recovery ticket included on L1"
        );

        Ok(outcome)
    }

    fn description(&self) -> String {
        format!(
            "Move {} ETH from {} to {}",
            format_ether(self.request.amount),
            self.request.aliased_address(),
            self.request.destination_address
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, TxHash};
    use std::sync::Mutex;

    const INBOX: Address = Address::repeat_byte(0x1b);
    const DESTINATION: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[derive(Default)]
    struct RecordingSubmitter {
        tickets: Mutex<Vec<RetryableTicket>>,
    }

    impl TicketSubmitter for RecordingSubmitter {
        async fn submit(&self, ticket: &RetryableTicket) -> Result<SubmissionOutcome, RecoveryError> {
            self.tickets.lock().unwrap().push(ticket.clone());
            Ok(SubmissionOutcome {
                tx_hash: TxHash::repeat_byte(0xab),
                block_number: Some(100),
                gas_used: 90_000,
                l2_call_value: ticket.l2_call_value,
                logs: Vec::new(),
            })
        }
    }

    fn estimate(max_submission_cost: u64, gas_limit: u64, max_fee_per_gas: u64) -> GasEstimate {
        GasEstimate {
            max_submission_cost: U256::from(max_submission_cost),
            gas_limit: U256::from(gas_limit),
            max_fee_per_gas: U256::from(max_fee_per_gas),
            total_deposit: U256::ZERO,
        }
    }

    fn request(amount: u64) -> RecoveryRequest {
        RecoveryRequest::new(Address::repeat_byte(0x11), DESTINATION, U256::from(amount)).unwrap()
    }

    #[test]
    fn test_compute_l2_call_value() {
        let value = compute_l2_call_value(U256::from(1_000_000), &estimate(100, 21_000, 10));
        assert_eq!(value, Ok(U256::from(789_900)));
    }

    #[test]
    fn test_compute_l2_call_value_exact_fees() {
        let value = compute_l2_call_value(U256::from(210_100), &estimate(100, 21_000, 10));
        assert_eq!(value, Ok(U256::ZERO));
    }

    #[test]
    fn test_compute_l2_call_value_insufficient() {
        let value = compute_l2_call_value(U256::from(1_000), &estimate(100, 21_000, 10));
        assert_eq!(
            value,
            Err(RecoveryError::InsufficientBalance {
                balance: U256::from(1_000),
                fees: U256::from(210_100),
            })
        );
    }

    #[test]
    fn test_validate_destination() {
        assert_eq!(
            validate_destination(DESTINATION),
            Ok(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"))
        );

        for bad in [
            "",
            "f39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb922",
            "0xg39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "0x0000000000000000000000000000000000000000",
        ] {
            assert!(
                matches!(validate_destination(bad), Err(RecoveryError::InvalidInput(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_ticket_parameters() {
        let request = request(5_000_000_000_000_000);
        let ticket = RetryableTicket::for_recovery(
            INBOX,
            &request,
            &estimate(1_000_000_000_000, 21_000, 1_000_000_000),
        )
        .unwrap();

        assert_eq!(ticket.l2_call_value, U256::from(4_978_000_000_000_000u64));
        assert_eq!(ticket.from, Address::repeat_byte(0x11));
        assert_eq!(ticket.to, request.destination_address);
        assert_eq!(ticket.excess_fee_refund_address, request.destination_address);
        assert_eq!(ticket.call_value_refund_address, request.destination_address);
        assert!(ticket.data.is_empty());

        let tx = ticket.transaction_request();
        assert_eq!(tx.value, Some(U256::ZERO));
        assert_eq!(tx.from, Some(Address::repeat_byte(0x11)));
        assert_eq!(tx.to, Some(INBOX.into()));
    }

    #[test]
    fn test_calldata_round_trip() {
        let ticket = RetryableTicket::for_recovery(
            INBOX,
            &request(1_000_000),
            &estimate(100, 21_000, 10),
        )
        .unwrap();

        let calldata = ticket.calldata();
        assert_eq!(
            &calldata[..4],
            IInbox::unsafeCreateRetryableTicketCall::SELECTOR.as_slice()
        );

        let decoded = IInbox::unsafeCreateRetryableTicketCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.l2CallValue, U256::from(789_900));
        assert_eq!(decoded.maxSubmissionCost, U256::from(100));
        assert_eq!(decoded.gasLimit, U256::from(21_000));
        assert_eq!(decoded.maxFeePerGas, U256::from(10));
        assert_eq!(decoded.to, ticket.to);
    }

    #[tokio::test]
    async fn test_execute_submits_ticket() {
        let submitter = RecordingSubmitter::default();
        let action = RecoverAction::new(
            &submitter,
            INBOX,
            request(5_000_000_000_000_000),
            estimate(1_000_000_000_000, 21_000, 1_000_000_000),
        );
        assert!(action.description().starts_with("Move 0.005"));

        let outcome = action.execute().await.unwrap();
        assert_eq!(outcome.tx_hash, TxHash::repeat_byte(0xab));
        assert_eq!(outcome.l2_call_value, U256::from(4_978_000_000_000_000u64));

        let tickets = submitter.tickets.lock().unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].l2_call_value, U256::from(4_978_000_000_000_000u64));
    }

    #[tokio::test]
    async fn test_execute_refuses_insufficient_balance() {
        let submitter = RecordingSubmitter::default();
        let action = RecoverAction::new(&submitter, INBOX, request(1_000), estimate(100, 21_000, 10));

        let err = action.execute().await.unwrap_err();
        assert!(matches!(err, RecoveryError::InsufficientBalance { .. }));
        assert!(submitter.tickets.lock().unwrap().is_empty());
    }

    #[test]
    fn test_is_ready_rejects_zero_inbox() {
        let submitter = RecordingSubmitter::default();
        let action = RecoverAction::new(
            &submitter,
            Address::ZERO,
            request(1_000_000),
            estimate(100, 21_000, 10),
        );
        assert!(matches!(action.is_ready(), Err(RecoveryError::InvalidInput(_))));
    }

    #[test]
    fn test_is_ready_rejects_empty_balance() {
        let submitter = RecordingSubmitter::default();
        let action = RecoverAction::new(&submitter, INBOX, request(0), estimate(100, 21_000, 10));
        assert_eq!(
            action.is_ready(),
            Err(RecoveryError::NothingToRecover(apply_alias(Address::repeat_byte(0x11))))
        );
    }

    #[test]
    fn test_is_ready_rejects_overflowing_fees() {
        let submitter = RecordingSubmitter::default();
        let overflowing = GasEstimate {
            gas_limit: U256::MAX,
            ..estimate(100, 21_000, 2)
        };
        let action = RecoverAction::new(&submitter, INBOX, request(1_000_000), overflowing);
        assert!(matches!(action.is_ready(), Err(RecoveryError::Estimation(_))));
    }
}
