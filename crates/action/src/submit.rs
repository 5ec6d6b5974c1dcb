use crate::{recover::TicketSubmitter, RecoveryError, RetryableTicket, SubmissionOutcome};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionReceipt;
use client::Wallet;
use tracing::{debug, info};

/// Signs tickets with the connected wallet and sends them to L1.
pub struct L1Submitter<P> {
    provider: P,
    wallet: Wallet,
}

impl<P> L1Submitter<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, wallet: Wallet) -> Self {
        Self { provider, wallet }
    }

    /// Account tickets are sent from.
    pub const fn account(&self) -> alloy_primitives::Address {
        self.wallet.address()
    }
}

impl<P> TicketSubmitter for L1Submitter<P>
where
    P: Provider + Clone,
{
    async fn submit(&self, ticket: &RetryableTicket) -> Result<SubmissionOutcome, RecoveryError> {
        // the aliased balance belongs to the sender, any other account would
        // create a ticket spending its own alias
        if self.wallet.address() != ticket.from {
            return Err(RecoveryError::Submission(format!(
                "wallet account {} is not the ticket sender {}",
                self.wallet.address(),
                ticket.from
            )));
        }

        let signed_tx = self
            .wallet
            .sign(ticket.transaction_request())
            .await
            .map_err(|e| RecoveryError::Submission(format!("signing: {e}")))?;

        let pending = self
            .provider
            .send_raw_transaction(&signed_tx)
            .await
            .map_err(|e| RecoveryError::Submission(format!("broadcast: {e}")))?;
        debug!(tx_hash = %pending.tx_hash(), "Recovery ticket broadcast");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| RecoveryError::Network(format!("receipt: {e}")))?;

        outcome_from_receipt(&receipt, ticket)
    }
}

/// Outcome of `ticket` from its L1 receipt; a revert fails the submission.
fn outcome_from_receipt(
    receipt: &TransactionReceipt,
    ticket: &RetryableTicket,
) -> Result<SubmissionOutcome, RecoveryError> {
    if !receipt.status() {
        return Err(RecoveryError::Submission(format!(
            "transaction {} reverted",
            receipt.transaction_hash
        )));
    }

    info!(
        tx_hash = %receipt.transaction_hash,
        block_number = receipt.block_number,
        gas_used = receipt.gas_used,
        "Recovery ticket confirmed"
    );

    Ok(SubmissionOutcome {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        l2_call_value: ticket.l2_call_value,
        logs: receipt.logs().to_vec(),
    })
}
