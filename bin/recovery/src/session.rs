//! One recovery session for a connected account on a connected chain.
//!
//! ```text
//! Empty -> BalanceChecking -> NoFunds
//!                          -> FundsFound -> Submitting -> Submitted
//!                                                      -> SubmitFailed -> Submitting
//! ```
//!
//! An account or chain change replaces the context, the collaborators built
//! for it and the state.

use action::{
    Action, FeeEstimator, RecoverAction, RecoveryError, RecoveryRequest, RetryableTicket,
    SubmissionOutcome, TicketSubmitter,
};
use alloy_primitives::Address;
use balance::{BalanceQuery, BalanceSnapshot, Monitor};
use config::{ChainLink, ChainRegistry};
use retryable::apply_alias;
use tracing::{info, warn};

/// Account and chain the session works for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Connected L1 account
    pub account: Address,
    /// Link of the connected L1 chain
    pub link: ChainLink,
}

impl SessionContext {
    /// Resolve the chain link for `source_chain_id`.
    pub fn resolve(
        registry: &ChainRegistry,
        account: Address,
        source_chain_id: u64,
    ) -> Result<Self, RecoveryError> {
        let link = registry
            .link(source_chain_id)
            .map_err(|_| RecoveryError::UnsupportedChain(source_chain_id))?
            .clone();

        Ok(Self { account, link })
    }

    pub fn aliased_address(&self) -> Address {
        apply_alias(self.account)
    }

    pub const fn source_chain_id(&self) -> u64 {
        self.link.source_chain_id
    }

    pub const fn target_chain_id(&self) -> u64 {
        self.link.target_chain_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryState {
    Empty,
    BalanceChecking,
    NoFunds(BalanceSnapshot),
    FundsFound(BalanceSnapshot),
    Submitting(BalanceSnapshot),
    Submitted {
        snapshot: BalanceSnapshot,
        outcome: SubmissionOutcome,
    },
    SubmitFailed {
        snapshot: BalanceSnapshot,
        error: RecoveryError,
    },
}

impl RecoveryState {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::BalanceChecking => "balance_checking",
            Self::NoFunds(_) => "no_funds",
            Self::FundsFound(_) => "funds_found",
            Self::Submitting(_) => "submitting",
            Self::Submitted { .. } => "submitted",
            Self::SubmitFailed { .. } => "submit_failed",
        }
    }

    /// Last balance seen by the session.
    pub const fn snapshot(&self) -> Option<&BalanceSnapshot> {
        match self {
            Self::Empty | Self::BalanceChecking => None,
            Self::NoFunds(snapshot)
            | Self::FundsFound(snapshot)
            | Self::Submitting(snapshot)
            | Self::Submitted { snapshot, .. }
            | Self::SubmitFailed { snapshot, .. } => Some(snapshot),
        }
    }
}

/// Drives balance check and ticket submission for one context.
pub struct Session<M, E, S> {
    context: SessionContext,
    state: RecoveryState,
    monitor: M,
    estimator: E,
    submitter: S,
}

impl<M, E, S> Session<M, E, S>
where
    M: Monitor,
    E: FeeEstimator,
    S: TicketSubmitter,
{
    pub const fn new(context: SessionContext, monitor: M, estimator: E, submitter: S) -> Self {
        Self {
            context,
            state: RecoveryState::Empty,
            monitor,
            estimator,
            submitter,
        }
    }

    pub const fn context(&self) -> &SessionContext {
        &self.context
    }

    pub const fn state(&self) -> &RecoveryState {
        &self.state
    }

    /// Switch to another account or chain.
    ///
    /// Monitor, estimator and submitter are bound to the endpoints and the
    /// wallet of one context, so they are replaced together with it.
    pub fn reset(&mut self, context: SessionContext, monitor: M, estimator: E, submitter: S) {
        if context != self.context {
            info!(
                account = %context.account,
                chain_id = context.source_chain_id(),
                "Session context changed"
            );
        }

        *self = Self::new(context, monitor, estimator, submitter);
    }

    /// Read the balance of the aliased address.
    ///
    /// A zero balance is a valid outcome and leaves the session in `NoFunds`.
    pub async fn check_balance(&mut self) -> Result<BalanceSnapshot, RecoveryError> {
        if matches!(self.state, RecoveryState::Submitting(_)) {
            return Err(RecoveryError::SubmissionInProgress);
        }

        self.state = RecoveryState::BalanceChecking;
        let query = BalanceQuery::Aliased {
            origin: self.context.account,
        };

        match self.monitor.query_balance(query).await {
            Ok(snapshot) => {
                info!(%snapshot, "Aliased balance checked");
                self.state = if snapshot.has_funds() {
                    RecoveryState::FundsFound(snapshot.clone())
                } else {
                    RecoveryState::NoFunds(snapshot.clone())
                };
                Ok(snapshot)
            }
            Err(e) => {
                self.state = RecoveryState::Empty;
                Err(RecoveryError::Network(e.to_string()))
            }
        }
    }

    fn recoverable_snapshot(&self) -> Result<BalanceSnapshot, RecoveryError> {
        match &self.state {
            RecoveryState::FundsFound(snapshot) | RecoveryState::SubmitFailed { snapshot, .. } => {
                Ok(snapshot.clone())
            }
            RecoveryState::Submitting(_) => Err(RecoveryError::SubmissionInProgress),
            _ => Err(RecoveryError::NothingToRecover(
                self.context.aliased_address(),
            )),
        }
    }

    fn request(
        &self,
        snapshot: &BalanceSnapshot,
        destination: &str,
    ) -> Result<RecoveryRequest, RecoveryError> {
        RecoveryRequest::new(self.context.account, destination, snapshot.amount)
    }

    /// Estimate and build the ticket without sending it.
    pub async fn prepare(&self, destination: &str) -> Result<RetryableTicket, RecoveryError> {
        let snapshot = self.recoverable_snapshot()?;
        let request = self.request(&snapshot, destination)?;
        let estimate = self.estimator.estimate(&request).await?;

        RetryableTicket::for_recovery(self.context.link.inbox, &request, &estimate)
    }

    /// Submit a ticket moving the aliased balance to `destination`.
    ///
    /// Every attempt estimates again; a failed attempt can be repeated.
    pub async fn recover(&mut self, destination: &str) -> Result<SubmissionOutcome, RecoveryError> {
        let snapshot = self.recoverable_snapshot()?;
        let request = self.request(&snapshot, destination)?;

        self.state = RecoveryState::Submitting(snapshot.clone());
        let result = self.submit(request).await;

        self.state = match &result {
            Ok(outcome) => RecoveryState::Submitted {
                snapshot,
                outcome: outcome.clone(),
            },
            Err(error) => {
                warn!(error = %error, "Recovery submission failed");
                RecoveryState::SubmitFailed {
                    snapshot,
                    error: error.clone(),
                }
            }
        };

        result
    }

    async fn submit(&self, request: RecoveryRequest) -> Result<SubmissionOutcome, RecoveryError> {
        let estimate = self.estimator.estimate(&request).await?;
        let action = RecoverAction::new(&self.submitter, self.context.link.inbox, request, estimate);
        info!(action = %action.description(), "Executing recovery");

        action.execute().await
    }
}
