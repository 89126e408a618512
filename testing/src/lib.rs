//! # Tales and Trails Testing
//!
//! Testing utilities shared by the workspace crates.
//!
//! This crate provides:
//! - Mock implementations of injected seams ([`StatusSource`](trails_payments::StatusSource),
//!   [`Navigator`](trails_core::tickets::Navigator))
//! - Fixtures for destinations and ticket registries
//! - proptest strategies for tier sets
//!
//! ## Example
//!
//! ```ignore
//! use trails_testing::{fixtures, mocks::ScriptedStatusSource};
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_payment_settles() {
//!     let source = Arc::new(ScriptedStatusSource::new([Pending, Successful]));
//!     let poller = PaymentStatusPoller::new(source.clone());
//!     let report = poller.spawn("TT-1", options)?.wait().await?;
//!     assert_eq!(source.calls(), 2);
//! }
//! ```

pub mod fixtures;
pub mod mocks;
pub mod properties;

pub use mocks::{RecordingNavigator, ScriptedStatusSource, Step};

/// Install a test subscriber that honours `RUST_LOG`.
///
/// Safe to call from many tests; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
