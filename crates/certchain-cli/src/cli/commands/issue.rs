use std::sync::Arc;

use anyhow::Context;
use certchain_core::{
    HttpWalletAgent, IssuanceError, IssuanceOrchestrator, IssuanceOutcome, IssueForm,
    WalletSession,
};
use serde_json::json;
use tracing::{info, warn};

use super::super::args::{GlobalArgs, IssueArgs};
use super::load_config;
use super::output::print_json;
use crate::exit_codes::{
    EXIT_CANCELLED, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS, EXIT_TIMED_OUT,
    EXIT_TRANSPORT_ERROR,
};

pub async fn run(args: IssueArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let mut config = load_config(global)?;
    if let Some(url) = args.wallet_url {
        config = config.with_wallet_url(url);
        config.validate().context("invalid --wallet-url")?;
    }

    let agent = HttpWalletAgent::new(&config.wallet_url)
        .with_context(|| format!("failed to set up wallet agent at {}", config.wallet_url))?;
    let session = Arc::new(WalletSession::new(
        Arc::new(agent),
        config.network,
        config.app.clone(),
    ));

    // An unreachable wallet leaves the session disconnected; submit reports it.
    match session.connect().await {
        Ok(Some(_)) => info!(network = %config.network, "wallet session loaded"),
        Ok(None) => info!("wallet has no signed-in user"),
        Err(e) => warn!(error = %e, "could not load wallet session"),
    }

    let orchestrator = IssuanceOrchestrator::from_config(session, &config);
    let mut form = IssueForm::new(
        args.student,
        args.course,
        args.organization,
        args.validity_days,
    );

    let outcome = orchestrator.submit(&mut form).await;
    report(&outcome, global.json)?;
    Ok(exit_code(&outcome))
}

fn report(outcome: &IssuanceOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        let status = match outcome {
            IssuanceOutcome::Approved { .. } => "approved",
            IssuanceOutcome::Cancelled => "cancelled",
            IssuanceOutcome::TimedOut => "timed_out",
            IssuanceOutcome::Failed(_) => "failed",
        };
        return print_json(&json!({
            "status": status,
            "tx_id": outcome.tx_id(),
            "message": outcome.message(),
            "retryable": outcome.is_retryable(),
        }));
    }

    match outcome {
        IssuanceOutcome::Approved { tx_id } => {
            println!("{}", outcome.message());
            println!("  Transaction: {tx_id}");
        }
        IssuanceOutcome::Failed(_) => eprintln!("error: {}", outcome.message()),
        _ => eprintln!("{}", outcome.message()),
    }
    Ok(())
}

fn exit_code(outcome: &IssuanceOutcome) -> i32 {
    match outcome {
        IssuanceOutcome::Approved { .. } => EXIT_SUCCESS,
        IssuanceOutcome::Cancelled => EXIT_CANCELLED,
        IssuanceOutcome::TimedOut => EXIT_TIMED_OUT,
        IssuanceOutcome::Failed(e) => match e {
            IssuanceError::NotConnected | IssuanceError::IncompleteConnection => EXIT_CONFIG_ERROR,
            IssuanceError::Wallet(_) => EXIT_TRANSPORT_ERROR,
            IssuanceError::Validation { .. } | IssuanceError::Encode(_) | IssuanceError::Busy => {
                EXIT_FAILURE
            }
        },
    }
}
