//! Gas and fee estimation for a recovery ticket.
//!
//! Mirrors the bridge SDK estimator: the submission fee comes from the
//! Inbox on L1 for the current L1 base fee, the gas price from the L2 node,
//! and the gas limit from simulating the ticket through `NodeInterface`.
//! Each figure gets a percentage of headroom.

use crate::{recover::RecoveryRequest, RecoveryError};
use alloy_primitives::{utils::parse_ether, Address, Bytes, U256};
use alloy_provider::Provider;
use binding::arbitrum::{IInbox, INodeInterface, NODE_INTERFACE};
use retryable::apply_alias;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

/// Parameters of one ticket submission.
///
/// Never cached: base fee and gas price drift between estimate and send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    /// Maximum fee for storing the ticket on L2
    pub max_submission_cost: U256,
    /// L2 gas limit of the auto-redeem
    pub gas_limit: U256,
    /// L2 price bid per gas
    pub max_fee_per_gas: U256,
    /// What a regular deposit would send: gas, submission and call value
    pub total_deposit: U256,
}

impl GasEstimate {
    /// Fees the ticket consumes: `max_submission_cost + gas_limit * max_fee_per_gas`.
    pub fn fees(&self) -> Option<U256> {
        self.gas_limit
            .checked_mul(self.max_fee_per_gas)?
            .checked_add(self.max_submission_cost)
    }
}

/// Headroom applied on top of raw estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateOptions {
    /// Percent added to the Inbox submission fee
    pub submission_fee_percent_increase: u64,
    /// Percent added to the L2 gas price
    pub gas_price_percent_increase: u64,
    /// Percent added to the simulated gas limit
    pub gas_limit_percent_increase: u64,
    /// Lower bound of the gas limit
    pub min_gas_limit: u64,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            submission_fee_percent_increase: 300,
            gas_price_percent_increase: 200,
            gas_limit_percent_increase: 0,
            min_gas_limit: 0,
        }
    }
}

/// Raw figures as returned by the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEstimate {
    pub submission_fee: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
}

fn percent_increase(value: U256, percent: u64) -> U256 {
    value.saturating_add(value.saturating_mul(U256::from(percent)) / U256::from(100))
}

impl EstimateOptions {
    /// Apply headroom and compute the total deposit for `l2_call_value`.
    pub fn apply(&self, raw: RawEstimate, l2_call_value: U256) -> GasEstimate {
        let max_submission_cost =
            percent_increase(raw.submission_fee, self.submission_fee_percent_increase);
        let max_fee_per_gas = percent_increase(raw.gas_price, self.gas_price_percent_increase);
        let gas_limit = percent_increase(raw.gas_limit, self.gas_limit_percent_increase)
            .max(U256::from(self.min_gas_limit));

        let total_deposit = gas_limit
            .saturating_mul(max_fee_per_gas)
            .saturating_add(max_submission_cost)
            .saturating_add(l2_call_value);

        GasEstimate {
            max_submission_cost,
            gas_limit,
            max_fee_per_gas,
            total_deposit,
        }
    }
}

/// Estimates the parameters of a recovery ticket.
pub trait FeeEstimator: Send + Sync {
    /// Estimate from fresh chain state.
    fn estimate(
        &self,
        request: &RecoveryRequest,
    ) -> impl Future<Output = Result<GasEstimate, RecoveryError>> + Send;
}

/// Estimator backed by L1 and L2 RPC endpoints.
pub struct RetryableGasEstimator<P1, P2> {
    l1_provider: P1,
    l2_provider: P2,
    inbox: Address,
    options: EstimateOptions,
}

impl<P1, P2> RetryableGasEstimator<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub const fn new(
        l1_provider: P1,
        l2_provider: P2,
        inbox: Address,
        options: EstimateOptions,
    ) -> Self {
        Self {
            l1_provider,
            l2_provider,
            inbox,
            options,
        }
    }

    /// Estimate for a given L1 base fee.
    pub async fn estimate_with_base_fee(
        &self,
        request: &RecoveryRequest,
        l1_base_fee: U256,
    ) -> Result<GasEstimate, RecoveryError> {
        let data = Bytes::new();
        let destination = request.destination_address;
        let l2_call_value = request.amount;
        // the node simulates a deposit large enough to cover any gas
        let deposit = parse_ether("1")
            .map_err(|e| RecoveryError::Estimation(e.to_string()))?
            .saturating_add(l2_call_value);

        let inbox = IInbox::new(self.inbox, &self.l1_provider);
        let node_interface = INodeInterface::new(NODE_INTERFACE, &self.l2_provider);

        let submission_fee_call =
            inbox.calculateRetryableSubmissionFee(U256::from(data.len()), l1_base_fee);
        let gas_limit_call = node_interface.estimateRetryableTicket(
            apply_alias(request.source_address),
            deposit,
            destination,
            l2_call_value,
            destination,
            destination,
            data.clone(),
        );

        let (submission_fee, gas_price, gas_limit) = tokio::try_join!(
            async {
                submission_fee_call
                    .call()
                    .await
                    .map_err(|e| RecoveryError::Estimation(format!("submission fee: {e}")))
            },
            async {
                self.l2_provider
                    .get_gas_price()
                    .await
                    .map_err(|e| RecoveryError::Estimation(format!("gas price: {e}")))
            },
            async {
                gas_limit_call
                    .estimate_gas()
                    .await
                    .map_err(|e| RecoveryError::Estimation(format!("gas limit: {e}")))
            },
        )?;

        let raw = RawEstimate {
            submission_fee,
            gas_price: U256::from(gas_price),
            gas_limit: U256::from(gas_limit),
        };
        debug!(l1_base_fee = %l1_base_fee, raw = ?raw, "Raw retryable estimate");

        Ok(self.options.apply(raw, l2_call_value))
    }
}

impl<P1, P2> FeeEstimator for RetryableGasEstimator<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    async fn estimate(&self, request: &RecoveryRequest) -> Result<GasEstimate, RecoveryError> {
        // always fresh, a stale base fee skews the submission cost
        let l1_base_fee = client::latest_base_fee(&self.l1_provider)
            .await
            .map_err(|e| RecoveryError::Estimation(format!("L1 base fee: {e}")))?;

        self.estimate_with_base_fee(request, U256::from(l1_base_fee))
            .await
    }
}
