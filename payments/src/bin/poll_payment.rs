//! Track a payment until it settles.
//!
//! Usage: `poll-payment <reference>`
//!
//! Reads `TRAILS_*` settings from the environment (or `.env`), polls the
//! status endpoint and prints the traveller-facing message. Ctrl-C cancels
//! the session. Exits non-zero unless the payment succeeded.

use anyhow::{bail, Context};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trails_payments::{CheckoutClient, PaymentError, PaymentStatusPoller, PaymentsConfig};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trails_payments=info,poll_payment=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(reference) = std::env::args().nth(1) else {
        bail!("usage: poll-payment <reference>");
    };

    let config = PaymentsConfig::from_env();
    let options = config.poll_options();
    info!(
        api_base = %config.api_base,
        max_attempts = options.max_attempts,
        interval_ms = config.poll.interval_ms,
        max_wait_secs = options.max_wait().as_secs(),
        "Configuration loaded"
    );

    let client = CheckoutClient::new(&config).context("building HTTP client")?;
    let poller = PaymentStatusPoller::new(Arc::new(client));
    let handle = poller
        .spawn(reference, options)
        .context("starting poll session")?;

    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            cancel.cancel();
        }
    });

    match handle.wait().await {
        Ok(report) => {
            println!("{}", report.message);
            Ok(if report.is_successful() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        },
        Err(PaymentError::Cancelled(reference)) => {
            println!("Stopped tracking payment {reference}.");
            Ok(ExitCode::from(130))
        },
        Err(err) => Err(err).context("polling payment status"),
    }
}
