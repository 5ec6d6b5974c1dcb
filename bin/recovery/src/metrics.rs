//! Prometheus metrics for the recovery tool.
//!
//! All metrics are aggregated in the [`Metrics`] struct.

use action::RecoveryError;
use alloy_primitives::U256;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use retryable::RetryableStatus;
use std::time::Duration;

/// Aggregated metrics of the recovery tool.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Label of an error in the `reason` dimension.
pub const fn error_kind(error: &RecoveryError) -> &'static str {
    match error {
        RecoveryError::UnsupportedChain(_) => "unsupported_chain",
        RecoveryError::InvalidInput(_) => "invalid_input",
        RecoveryError::Network(_) => "network",
        RecoveryError::Estimation(_) => "estimation",
        RecoveryError::Submission(_) => "submission",
        RecoveryError::InsufficientBalance { .. } => "insufficient_balance",
        RecoveryError::NothingToRecover(_) => "nothing_to_recover",
        RecoveryError::SubmissionInProgress => "in_progress",
    }
}

const fn status_label(status: &RetryableStatus) -> &'static str {
    match status {
        RetryableStatus::NotYetCreated => "not_yet_created",
        RetryableStatus::CreationFailed => "creation_failed",
        RetryableStatus::Pending => "pending",
        RetryableStatus::FundsDepositedOnL2 { .. } => "funds_deposited_on_l2",
        RetryableStatus::Redeemed { .. } => "redeemed",
    }
}

fn wei_to_f64(amount: U256) -> f64 {
    u128::try_from(amount).unwrap_or(u128::MAX) as f64
}

/// Whole gwei in `amount`, the counter unit; u64 gwei spans 18 billion ETH.
fn wei_to_gwei(amount: U256) -> u64 {
    u64::try_from(amount / U256::from(1_000_000_000u64)).unwrap_or(u64::MAX)
}

impl Metrics {
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "recovery_balance_checks_total",
            "Total number of aliased balance checks"
        );
        describe_counter!(
            "recovery_balance_check_failures_total",
            "Total number of failed aliased balance checks"
        );
        describe_gauge!(
            "recovery_aliased_balance_wei",
            "Last observed balance of the aliased address in wei"
        );

        describe_counter!(
            "recovery_submissions_total",
            "Total number of ticket submissions by outcome"
        );
        describe_counter!(
            "recovery_failures_total",
            "Total number of failed recovery attempts by reason"
        );
        describe_histogram!(
            "recovery_submission_duration_seconds",
            "Time from estimation to L1 confirmation in seconds"
        );
        describe_counter!(
            "recovery_recovered_gwei_total",
            "Total call value forwarded to destinations in gwei"
        );

        describe_counter!(
            "recovery_tickets_total",
            "Total number of tracked tickets by final L2 status"
        );
    }

    /// Record a balance check, `None` when the query failed.
    pub fn record_balance_check(&self, amount: Option<U256>) {
        counter!("recovery_balance_checks_total").increment(1);

        match amount {
            Some(amount) => gauge!("recovery_aliased_balance_wei").set(wei_to_f64(amount)),
            None => counter!("recovery_balance_check_failures_total").increment(1),
        }
    }

    /// Record a confirmed ticket submission.
    pub fn record_submission_success(&self, l2_call_value: U256, duration: Duration) {
        counter!("recovery_submissions_total", "outcome" => "success").increment(1);
        histogram!("recovery_submission_duration_seconds").record(duration.as_secs_f64());
        counter!("recovery_recovered_gwei_total").increment(wei_to_gwei(l2_call_value));
    }

    /// Record a failed recovery attempt.
    pub fn record_failure(&self, error: &RecoveryError) {
        if matches!(error, RecoveryError::Submission(_)) {
            counter!("recovery_submissions_total", "outcome" => "failure").increment(1);
        }
        counter!("recovery_failures_total", "reason" => error_kind(error)).increment(1);
    }

    /// Record the final L2 status of a ticket.
    pub fn record_ticket_status(&self, status: &RetryableStatus) {
        counter!("recovery_tickets_total", "status" => status_label(status)).increment(1);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
