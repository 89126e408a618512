//! # Tales and Trails Core
//!
//! Booking logic shared by the Tales and Trails Ghana services.
//!
//! This crate provides:
//! - [`money::Money`]: exact cedi amounts
//! - [`pricing`]: group-size tiered pricing and group-size picker options
//! - [`booking`]: booking quotes with selected add-ons
//! - [`tickets`]: ticket ID validation and redirect routing over an injected registry
//!
//! Everything here is synchronous and free of I/O. Payment checkout and status
//! polling live in `trails-payments`.
//!
//! ## Example
//!
//! ```
//! use trails_core::money::Money;
//! use trails_core::pricing::{DestinationPricing, PricingTier};
//!
//! let pricing = DestinationPricing {
//!     base_price: "120.00".parse().unwrap(),
//!     max_group_size: 15,
//!     has_tiered_pricing: true,
//!     tiers: vec![PricingTier::new(1, 5, None, "80.00".parse().unwrap())],
//! };
//!
//! let quote = pricing.resolve(6).unwrap();
//! assert_eq!(quote.savings_per_person, Money::from_pesewas(4_000));
//! ```

pub mod booking;
pub mod error;
pub mod money;
pub mod pricing;
pub mod tickets;

pub use error::{Result, TrailsError};
pub use money::Money;
