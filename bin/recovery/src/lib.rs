pub mod metrics;
pub mod report;
pub mod session;
pub mod settings;

use alloy_provider::Provider;
use alloy_rpc_types_eth::Log;
use config::ChainLink;
use retryable::{
    parse_retryable_messages, retryable_creation_id, RetryableStateProvider, RetryableStatus,
    TicketId,
};
use settings::TrackingConfig;
use tracing::info;

/// Follow every ticket created by an L1 receipt until it settles on L2.
pub async fn track_tickets<P>(
    l2_provider: P,
    link: &ChainLink,
    logs: &[Log],
    tracking: &TrackingConfig,
) -> eyre::Result<Vec<(TicketId, RetryableStatus)>>
where
    P: Provider + Clone,
{
    let messages = parse_retryable_messages(logs, link.bridge, link.inbox)?;
    let state = RetryableStateProvider::new(l2_provider)
        .with_polling(tracking.poll_interval(), tracking.max_attempts);

    let mut statuses = Vec::with_capacity(messages.len());
    for message in &messages {
        let ticket_id = retryable_creation_id(link.target_chain_id, message);
        info!(
            ticket_id = %ticket_id,
            message_number = %message.message_number,
            "Waiting for ticket on L2"
        );

        let status = state.wait_for_l2_execution(ticket_id).await?;
        statuses.push((ticket_id, status));
    }

    Ok(statuses)
}
