use crate::{BalanceError, BalanceQuery, BalanceSnapshot, Monitor};
use alloy_primitives::Address;
use alloy_provider::Provider;
use retryable::apply_alias;
use tracing::{debug, warn};

/// Balance monitor over an L2 provider.
pub struct BalanceMonitor<P> {
    provider: P,
}

impl<P> BalanceMonitor<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    async fn query_native(
        &self,
        origin: Address,
        address: Address,
    ) -> Result<BalanceSnapshot, BalanceError> {
        debug!(address = %address, origin = %origin, "Querying native balance");

        let amount = self
            .provider
            .get_balance(address)
            .await
            .map_err(|e| BalanceError::Rpc {
                address,
                reason: e.to_string(),
            })?;

        Ok(BalanceSnapshot {
            origin,
            address,
            amount,
            checked: true,
        })
    }

    async fn query_aliased(&self, origin: Address) -> Result<BalanceSnapshot, BalanceError> {
        let aliased = apply_alias(origin);
        let snapshot = self.query_native(origin, aliased).await?;

        if !snapshot.has_funds() {
            warn!(
                address = %origin,
                alias = %aliased,
                "Address does not have funds on L2"
            );
        }

        Ok(snapshot)
    }
}

impl<P> Monitor for BalanceMonitor<P>
where
    P: Provider + Clone,
{
    async fn query_balance(&self, query: BalanceQuery) -> Result<BalanceSnapshot, BalanceError> {
        match query {
            BalanceQuery::Native { address } => self.query_native(address, address).await,
            BalanceQuery::Aliased { origin } => self.query_aliased(origin).await,
        }
    }
}
