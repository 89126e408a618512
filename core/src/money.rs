//! Money value object.
//!
//! Amounts are held as an integer count of pesewas (1/100 of a Ghana cedi) so
//! that tier comparisons and savings are exact. The backend REST API sends
//! decimals as strings (`"120.00"`), so deserialization accepts both strings
//! and JSON numbers.

use crate::error::{Result, TrailsError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Currency code used for every amount in the system
pub const CURRENCY: &str = "GHS";

/// Represents money in pesewas to avoid floating-point arithmetic errors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Zero cedis
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from pesewas
    #[must_use]
    pub const fn from_pesewas(pesewas: u64) -> Self {
        Self(pesewas)
    }

    /// Creates a `Money` value from whole cedis, or `None` on overflow
    #[must_use]
    pub const fn from_cedis(cedis: u64) -> Option<Self> {
        match cedis.checked_mul(100) {
            Some(pesewas) => Some(Self(pesewas)),
            None => None,
        }
    }

    /// Returns the amount in pesewas
    #[must_use]
    pub const fn pesewas(&self) -> u64 {
        self.0
    }

    /// Returns the amount in whole cedis (rounded down)
    #[must_use]
    pub const fn cedis(&self) -> u64 {
        self.0 / 100
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Subtracts two money amounts (returns None if result would be negative)
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        if self.0 >= other.0 {
            Some(Self(self.0 - other.0))
        } else {
            None
        }
    }

    /// Subtracts two money amounts, clamping at zero
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY} {}.{:02}", self.cedis(), self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = TrailsError;

    /// Parses a non-negative decimal with at most two fractional digits.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TrailsError::invalid(format!("'{s}' is not a valid amount"));
        let trimmed = s.trim();
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let cedis: u64 = whole.parse().map_err(|_| invalid())?;
        let pesewas: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        cedis
            .checked_mul(100)
            .and_then(|base| base.checked_add(pesewas))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}.{:02}", self.cedis(), self.0 % 100))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Integer(u64),
    Float(f64),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => text.parse().map_err(serde::de::Error::custom),
            RawAmount::Integer(cedis) => Self::from_cedis(cedis)
                .ok_or_else(|| serde::de::Error::custom("amount overflows")),
            RawAmount::Float(value) => {
                if !value.is_finite() || value < 0.0 {
                    return Err(serde::de::Error::custom(format!(
                        "{value} is not a valid amount"
                    )));
                }
                // Two-decimal rendering rounds to the nearest pesewa
                format!("{value:.2}").parse().map_err(serde::de::Error::custom)
            },
        }
    }
}
