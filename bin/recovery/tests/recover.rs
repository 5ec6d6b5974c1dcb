//! End-to-end recovery against a live chain.

#[path = "setup.rs"]
mod setup;

use action::{L1Submitter, RetryableGasEstimator};
use balance::monitor::BalanceMonitor;
use client::Wallet;
use config::ChainRegistry;
use recovery::{
    report::Report,
    session::{RecoveryState, Session, SessionContext},
    track_tickets,
};
use setup::{load_private_key, load_test_config, setup_l1_provider, setup_l2_provider};

/// L1 chain the recovery runs on, Goerli unless overridden.
fn test_chain_id() -> u64 {
    std::env::var("RECOVERY_CHAIN_ID")
        .ok()
        .and_then(|id| id.parse().ok())
        .unwrap_or(5)
}

#[tokio::test]
#[ignore = "requires funds on the aliased address and submits actual transaction"]
async fn test_recover_aliased_balance() {
    let config = load_test_config();
    let chain_id = test_chain_id();
    let registry = ChainRegistry::builtin();
    let destination =
        std::env::var("RECOVERY_DESTINATION").expect("Set RECOVERY_DESTINATION to an L2 address");

    let l1_provider = setup_l1_provider(chain_id).await;
    let l2_provider = setup_l2_provider(chain_id).await;

    let private_key = load_private_key().expect("Private key required for signing");
    let wallet = Wallet::local(&private_key, chain_id, l1_provider.clone()).unwrap();
    let context = SessionContext::resolve(&registry, wallet.address(), chain_id).unwrap();
    let link = context.link.clone();

    let mut session = Session::new(
        context,
        BalanceMonitor::new(l2_provider.clone()),
        RetryableGasEstimator::new(
            l1_provider.clone(),
            l2_provider.clone(),
            link.inbox,
            config.estimation,
        ),
        L1Submitter::new(l1_provider, wallet),
    );

    let snapshot = session.check_balance().await.expect("Balance check failed");
    println!("✓ {snapshot}");
    assert!(snapshot.has_funds(), "Nothing to recover on {}", snapshot.address);

    let outcome = session
        .recover(&destination)
        .await
        .expect("Recovery submission failed");
    println!("✓ {}", Report::success(outcome.tx_hash, &config.explorer_url));
    assert!(matches!(session.state(), RecoveryState::Submitted { .. }));

    let statuses = track_tickets(l2_provider, &link, &outcome.logs, &config.tracking)
        .await
        .expect("Failed to track ticket");
    assert_eq!(statuses.len(), 1);
    println!("✓ Ticket {}: {}", statuses[0].0, statuses[0].1);
}
