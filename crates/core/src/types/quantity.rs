//! Cart and order line quantities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative quantities are not allowed on a line item.
    #[error("quantity must be at least {min}")]
    TooSmall {
        /// Smallest accepted quantity.
        min: u32,
    },
    /// Quantity exceeds the per-line limit.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
    },
}

/// A line-item quantity, always in `1..=Quantity::MAX`.
///
/// ```
/// use shopdemo_core::Quantity;
///
/// assert_eq!(Quantity::new(3).unwrap().get(), 3);
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(-2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// The quantity used when a request does not specify one.
    pub const ONE: Self = Self(1);

    /// Upper bound for a single line, well inside `INTEGER` range even after
    /// repeated add-to-cart increments.
    pub const MAX: u32 = 10_000;

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::TooSmall` below 1 and `QuantityError::TooLarge`
    /// above [`Quantity::MAX`].
    pub fn new(raw: i64) -> Result<Self, QuantityError> {
        if raw < 1 {
            return Err(QuantityError::TooSmall { min: 1 });
        }
        u32::try_from(raw)
            .ok()
            .filter(|q| *q <= Self::MAX)
            .map(Self)
            .ok_or(QuantityError::TooLarge { max: Self::MAX })
    }

    /// The quantity as a `u32`.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The quantity as an `i32`, for binding to `INTEGER` columns.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // bounded by Quantity::MAX
    pub const fn as_i32(self) -> i32 {
        self.0 as i32
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
