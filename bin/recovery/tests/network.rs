//! Read-only integration tests against live endpoints.
//!
//! Run with:
//! ```bash
//! INFURA_KEY=... cargo test --package recovery --test network -- --ignored
//! ```

#[path = "setup.rs"]
mod setup;

use action::{FeeEstimator, RecoveryRequest, RetryableGasEstimator};
use alloy_primitives::{address, utils::parse_ether, Address, U256};
use balance::{monitor::BalanceMonitor, BalanceQuery, Monitor};
use retryable::apply_alias;
use setup::{link, load_test_config, setup_l1_provider, setup_l2_provider};

const ORIGIN: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const DESTINATION: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

#[tokio::test]
#[ignore = "requires network access to the public Arbitrum RPC"]
async fn test_l2_endpoint_serves_target_chain() {
    let provider = setup_l2_provider(1).await;

    let chain_id = client::connected_chain_id(&provider)
        .await
        .expect("Failed to query L2 chain id");

    assert_eq!(chain_id, 42161);
}

#[tokio::test]
#[ignore = "requires network access to the public Arbitrum RPC"]
async fn test_aliased_balance_query() {
    let monitor = BalanceMonitor::new(setup_l2_provider(1).await);

    let snapshot = monitor
        .query_balance(BalanceQuery::Aliased { origin: ORIGIN })
        .await
        .expect("Failed to query aliased balance");

    println!("✓ {snapshot}");
    assert!(snapshot.checked);
    assert_eq!(snapshot.origin, ORIGIN);
    assert_eq!(snapshot.address, apply_alias(ORIGIN));
}

#[tokio::test]
#[ignore = "requires INFURA_KEY and network access"]
async fn test_mainnet_l1_base_fee() {
    let provider = setup_l1_provider(1).await;

    let base_fee = client::latest_base_fee(&provider)
        .await
        .expect("Failed to read L1 base fee");

    assert!(base_fee > 0);
}

#[tokio::test]
#[ignore = "requires INFURA_KEY and network access"]
async fn test_mainnet_ticket_estimate() {
    let config = load_test_config();
    let estimator = RetryableGasEstimator::new(
        setup_l1_provider(1).await,
        setup_l2_provider(1).await,
        link(1).inbox,
        config.estimation,
    );

    let amount = parse_ether("0.01").unwrap();
    let request = RecoveryRequest::new(ORIGIN, DESTINATION, amount).unwrap();

    let estimate = estimator
        .estimate(&request)
        .await
        .expect("Failed to estimate ticket");

    println!("✓ Estimate: {estimate:?}");
    assert!(estimate.gas_limit > U256::ZERO);
    assert!(estimate.max_fee_per_gas > U256::ZERO);
    assert!(estimate.max_submission_cost > U256::ZERO);
    assert!(estimate.total_deposit > amount);
}
