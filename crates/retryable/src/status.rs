use crate::types::{RetryableStatus, TicketId};
use alloy_primitives::B256;
use alloy_provider::Provider;
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use binding::arbitrum::{IArbRetryableTx, ARB_RETRYABLE_TX};
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, info, warn};

/// Find the auto-redeem scheduled for `ticket_id` in a creation receipt.
pub fn find_redeem_scheduled(logs: &[Log], ticket_id: TicketId) -> Option<B256> {
    logs.iter()
        .filter(|log| log.inner.address == ARB_RETRYABLE_TX)
        .filter_map(|log| IArbRetryableTx::RedeemScheduled::decode_log(&log.inner).ok())
        .find(|event| event.ticketId == ticket_id)
        .map(|event| event.retryTxHash)
}

/// Follows retryable tickets on the L2.
pub struct RetryableStateProvider<P> {
    l2_provider: P,
    poll_interval: Duration,
    max_attempts: usize,
}

impl<P> RetryableStateProvider<P>
where
    P: Provider + Clone,
{
    pub const fn new(l2_provider: P) -> Self {
        Self {
            l2_provider,
            poll_interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }

    /// Override polling; backoff starts at `poll_interval` and doubles up to 30s.
    pub const fn with_polling(mut self, poll_interval: Duration, max_attempts: usize) -> Self {
        self.poll_interval = poll_interval;
        self.max_attempts = max_attempts;
        self
    }

    /// Single look at the ticket state, no waiting.
    pub async fn query_status(&self, ticket_id: TicketId) -> eyre::Result<RetryableStatus> {
        let Some(creation) = self.l2_provider.get_transaction_receipt(ticket_id).await? else {
            return Ok(RetryableStatus::NotYetCreated);
        };

        if !creation.status() {
            return Ok(RetryableStatus::CreationFailed);
        }

        let Some(retry_tx_hash) = find_redeem_scheduled(creation.logs(), ticket_id) else {
            // no auto-redeem was scheduled, the ticket waits for a manual redeem
            return Ok(RetryableStatus::FundsDepositedOnL2 { ticket_id });
        };

        let Some(redeem) = self
            .l2_provider
            .get_transaction_receipt(retry_tx_hash)
            .await?
        else {
            return Ok(RetryableStatus::Pending);
        };

        if redeem.status() {
            Ok(RetryableStatus::Redeemed { retry_tx_hash })
        } else {
            Ok(RetryableStatus::FundsDepositedOnL2 { ticket_id })
        }
    }

    /// Wait until the ticket reaches a terminal state on L2.
    ///
    /// Returns the last observed status if polling gives up first.
    pub async fn wait_for_l2_execution(&self, ticket_id: TicketId) -> eyre::Result<RetryableStatus> {
        let poll_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor((poll_ms / 2).max(1))
            .max_delay(Duration::from_secs(30))
            .take(self.max_attempts);

        let result = Retry::spawn(strategy, || async {
            match self.query_status(ticket_id).await {
                Ok(status) if status.is_terminal() => Ok(status),
                Ok(status) => {
                    debug!(ticket_id = %ticket_id, status = ?status, "Ticket not final yet");
                    Err(Some(status))
                }
                Err(e) => {
                    warn!(ticket_id = %ticket_id, error = %e, "Ticket status query failed, will retry");
                    Err(None)
                }
            }
        })
        .await;

        match result {
            Ok(status) => {
                info!(ticket_id = %ticket_id, status = ?status, "Ticket reached final state");
                Ok(status)
            }
            Err(Some(status)) => {
                warn!(ticket_id = %ticket_id, status = ?status, "Gave up waiting for ticket");
                Ok(status)
            }
            Err(None) => eyre::bail!("could not query ticket {ticket_id} on L2"),
        }
    }
}
