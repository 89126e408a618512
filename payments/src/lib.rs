//! # Tales and Trails Payments
//!
//! Checkout and payment status tracking for card and mobile-money payments.
//!
//! - [`client::CheckoutClient`]: creates payments and reads their status over HTTP
//! - [`poller::PaymentStatusPoller`]: cancellable, bounded status polling sessions
//! - [`config::PaymentsConfig`]: environment-driven configuration
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trails_payments::{CheckoutClient, CheckoutRequest, MomoProvider, PaymentStatusPoller, PaymentsConfig};
//!
//! let config = PaymentsConfig::from_env();
//! let client = Arc::new(CheckoutClient::new(&config)?);
//!
//! let request = CheckoutRequest::mobile_money(quote.total, MomoProvider::Mtn, "024 123 4567", "Kakum for 4")?;
//! let payment = client.create_checkout(&request).await?;
//!
//! let poller = PaymentStatusPoller::new(client);
//! let report = poller.spawn(payment.reference, config.poll_options())?.wait().await?;
//! println!("{}", report.message);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod status;

pub use client::{CheckoutClient, CheckoutRequest, MomoProvider, PaymentMethod, PaymentSummary};
pub use config::PaymentsConfig;
pub use error::{PaymentError, Result};
pub use poller::{CancelToken, PaymentStatusPoller, PollHandle, PollOptions, StatusSource};
pub use status::{PaymentPollState, PaymentStatus, PollOutcome, PollReport};
