use action::{validate_destination, L1Submitter, RecoveryError, RetryableGasEstimator};
use alloy_primitives::{Address, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types_eth::Log;
use balance::{monitor::BalanceMonitor, BalanceQuery, Monitor};
use clap::{Parser, Subcommand};
use client::{RemoteSigner, Wallet};
use config::{ChainLink, ChainRegistry};
use recovery::{
    metrics::{error_kind, install_prometheus_exporter, Metrics},
    report::Report,
    session::{Session, SessionContext},
    settings::{require_api_key, Config},
    track_tickets,
};
use retryable::parse_address;
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tokio::time;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "alias-recovery",
    version,
    about = "Recover ETH stranded on the L2 alias of an L1 account"
)]
struct Cli {
    /// Config file, `recovery.toml` is read when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// L1 chain to connect to
    #[arg(long, global = true, default_value_t = 1)]
    chain_id: u64,

    /// API key of the L1 RPC provider
    #[arg(long, global = true, env = "INFURA_KEY", hide_env_values = true)]
    infura_key: Option<String>,

    /// Private key of the L1 account
    #[arg(long, global = true, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Signer-proxy url, used instead of a private key
    #[arg(long, global = true, requires = "signer_address")]
    remote_signer: Option<String>,

    /// Account the signer-proxy signs for
    #[arg(long, global = true)]
    signer_address: Option<String>,

    /// L1 account to inspect when no signer is configured
    #[arg(long, global = true)]
    account: Option<String>,

    /// Serve Prometheus metrics on this port
    #[arg(long, global = true)]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the balance of the aliased address
    Check,

    /// Move the aliased balance to a destination on L2
    Recover {
        /// Receiver of the funds on L2
        #[arg(long)]
        destination: String,

        /// Estimate and print the ticket without sending it
        #[arg(long)]
        dry_run: bool,

        /// Follow the ticket until it settles on L2
        #[arg(long)]
        wait: bool,
    },

    /// Re-check the aliased balance periodically
    Watch {
        /// Seconds between checks
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },

    /// Follow the tickets created by an L1 transaction
    Status {
        /// L1 transaction hash
        #[arg(long)]
        tx: String,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(port) = cli.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Prometheus exporter listening");
    }
    let metrics = Metrics::new();

    let config = Config::load(cli.config.as_deref())?;
    let registry = ChainRegistry::builtin();
    let api_key = require_api_key(cli.infura_key.as_deref())?;

    if !registry.is_supported(cli.chain_id) {
        let code = fail(&metrics, &RecoveryError::UnsupportedChain(cli.chain_id));
        let supported: Vec<String> = registry
            .links()
            .iter()
            .map(|link| link.source_chain_id.to_string())
            .collect();
        println!("Supported L1 chains: {}", supported.join(", "));
        return Ok(code);
    }

    let l1_rpc_url = registry.l1_rpc_url(cli.chain_id, &api_key)?;

    let l1_provider = client::create_provider(&l1_rpc_url).await?;
    let chain_id = client::connected_chain_id(&l1_provider).await?;
    if chain_id != cli.chain_id {
        eyre::bail!(
            "L1 endpoint serves chain {chain_id}, expected chain {}",
            cli.chain_id
        );
    }

    let link = registry.link(chain_id)?.clone();
    let l2_provider =
        client::create_provider(registry.resolve_l2_endpoint(link.target_chain_id)?).await?;
    info!(
        source_chain_id = link.source_chain_id,
        target_chain_id = link.target_chain_id,
        inbox = %link.inbox,
        "Connected"
    );

    let wallet = build_wallet(&cli, chain_id, l1_provider.clone())?;
    let account = resolve_account(wallet.as_ref(), cli.account.as_deref())?;

    match cli.command {
        Command::Check => {
            let account = account.ok_or_else(missing_account)?;
            let monitor = BalanceMonitor::new(l2_provider);

            match monitor
                .query_balance(BalanceQuery::Aliased { origin: account })
                .await
            {
                Ok(snapshot) => {
                    metrics.record_balance_check(Some(snapshot.amount));
                    println!("{snapshot}");
                    if !snapshot.has_funds() {
                        println!("Address does not have funds on L2");
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    metrics.record_balance_check(None);
                    Ok(fail(&metrics, &RecoveryError::Network(e.to_string())))
                }
            }
        }

        Command::Watch { interval } => {
            let account = account.ok_or_else(missing_account)?;
            let monitor = BalanceMonitor::new(l2_provider);
            let query = BalanceQuery::Aliased { origin: account };

            info!(account = %account, interval, "Watching aliased balance");
            let mut interval = time::interval(Duration::from_secs(interval.max(1)));

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("Stopping watch");
                        return Ok(ExitCode::SUCCESS);
                    }
                    _ = interval.tick() => {}
                }

                match monitor.query_balance(query.clone()).await {
                    Ok(snapshot) => {
                        metrics.record_balance_check(Some(snapshot.amount));
                        if snapshot.has_funds() {
                            info!(%snapshot, "Funds found on aliased address");
                        } else {
                            debug!(address = %snapshot.address, "No funds yet");
                        }
                    }
                    Err(e) => {
                        metrics.record_balance_check(None);
                        error!(error = %e, "Failed to query aliased balance");
                    }
                }
            }
        }

        Command::Recover {
            destination,
            dry_run,
            wait,
        } => {
            let Some(wallet) = wallet else {
                eyre::bail!("recover needs a signer, pass --private-key or --remote-signer");
            };
            let context = SessionContext::resolve(&registry, wallet.address(), chain_id)?;

            let estimator = RetryableGasEstimator::new(
                l1_provider.clone(),
                l2_provider.clone(),
                link.inbox,
                config.estimation,
            );
            let submitter = L1Submitter::new(l1_provider, wallet);
            let monitor = BalanceMonitor::new(l2_provider.clone());
            let mut session = Session::new(context, monitor, estimator, submitter);

            let snapshot = match session.check_balance().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    metrics.record_balance_check(None);
                    return Ok(fail(&metrics, &e));
                }
            };
            metrics.record_balance_check(Some(snapshot.amount));
            println!("{snapshot}");

            if !snapshot.has_funds() {
                println!("Address does not have funds on L2");
                return Ok(ExitCode::SUCCESS);
            }

            if dry_run {
                return match session.prepare(&destination).await {
                    Ok(ticket) => {
                        println!("Dry run, ticket not sent");
                        println!("  inbox:                {}", ticket.inbox);
                        println!("  from:                 {}", ticket.from);
                        println!("  to:                   {}", ticket.to);
                        println!("  l2 call value:        {}", ticket.l2_call_value);
                        println!("  max submission cost:  {}", ticket.max_submission_cost);
                        println!("  gas limit:            {}", ticket.gas_limit);
                        println!("  max fee per gas:      {}", ticket.max_fee_per_gas);
                        println!("  calldata:             {}", ticket.calldata());
                        Ok(ExitCode::SUCCESS)
                    }
                    Err(e) => Ok(fail(&metrics, &e)),
                };
            }

            let started = time::Instant::now();
            match session.recover(&destination).await {
                Ok(outcome) => {
                    metrics.record_submission_success(outcome.l2_call_value, started.elapsed());
                    println!("{}", Report::success(outcome.tx_hash, &config.explorer_url));

                    if wait {
                        print_ticket_statuses(
                            l2_provider.clone(),
                            &link,
                            &outcome.logs,
                            &config,
                            &metrics,
                        )
                        .await?;

                        let address = validate_destination(&destination)?;
                        let balance = BalanceMonitor::new(l2_provider)
                            .query_balance(BalanceQuery::Native { address })
                            .await?;
                        println!("Destination balance: {balance}");
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => Ok(fail(&metrics, &e)),
            }
        }

        Command::Status { tx } => {
            let tx_hash: TxHash = tx
                .trim()
                .parse()
                .map_err(|e| eyre::eyre!("Invalid transaction hash {tx}: {e}"))?;

            let receipt = l1_provider
                .get_transaction_receipt(tx_hash)
                .await?
                .ok_or_else(|| eyre::eyre!("Transaction {tx_hash} not found on chain {chain_id}"))?;

            print_ticket_statuses(l2_provider, &link, receipt.logs(), &config, &metrics).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_wallet<P>(cli: &Cli, chain_id: u64, provider: P) -> eyre::Result<Option<Wallet>>
where
    P: Provider + Clone + 'static,
{
    if let Some(proxy_url) = &cli.remote_signer {
        let address = parse_address(cli.signer_address.as_deref().unwrap_or_default())?;
        let remote = RemoteSigner::new(proxy_url.clone(), address, chain_id)?;
        return Ok(Some(Wallet::remote(remote, provider)));
    }

    match cli.private_key.as_deref() {
        Some(private_key) => Ok(Some(Wallet::local(private_key, chain_id, provider)?)),
        None => Ok(None),
    }
}

/// The signer account wins over `--account`.
fn resolve_account(wallet: Option<&Wallet>, account: Option<&str>) -> eyre::Result<Option<Address>> {
    let account = account.map(parse_address).transpose()?;

    match (wallet, account) {
        (Some(wallet), Some(account)) if wallet.address() != account => {
            warn!(
                signer = %wallet.address(),
                account = %account,
                "Ignoring --account, using the signer account"
            );
            Ok(Some(wallet.address()))
        }
        (Some(wallet), _) => Ok(Some(wallet.address())),
        (None, account) => Ok(account),
    }
}

fn missing_account() -> eyre::Report {
    eyre::eyre!("No account, pass --private-key, --remote-signer or --account")
}

async fn print_ticket_statuses<P>(
    l2_provider: P,
    link: &ChainLink,
    logs: &[Log],
    config: &Config,
    metrics: &Metrics,
) -> eyre::Result<()>
where
    P: Provider + Clone,
{
    for (ticket_id, status) in track_tickets(l2_provider, link, logs, &config.tracking).await? {
        metrics.record_ticket_status(&status);
        println!("Ticket {ticket_id}: {status}");
    }

    Ok(())
}

fn fail(metrics: &Metrics, error: &RecoveryError) -> ExitCode {
    metrics.record_failure(error);

    let report = Report::failure(error);
    error!(reason = error_kind(error), "{}", report.message);
    println!("{report}");

    ExitCode::FAILURE
}
