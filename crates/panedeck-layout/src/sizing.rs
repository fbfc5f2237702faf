#![forbid(unsafe_code)]

//! Proportional sizing math.
//!
//! Every sibling in a row/column layout carries a [`FlexBasis`]: either a
//! percentage of the *flexible* space of its container (the extent left after
//! fixed-pixel siblings and resizer gaps are taken out) or a fixed pixel
//! extent, which is what collapsed content uses.
//!
//! # Invariants
//!
//! 1. After [`normalize_shares`] the percentage entries sum to 100 within
//!    [`PERCENT_EPSILON`], with the rounding error absorbed by one entry.
//! 2. [`normalize_shares`] is idempotent.
//! 3. [`distribute`] never produces negative shares.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tolerance for the "sums to 100%" invariant, in percentage points.
pub const PERCENT_EPSILON: f64 = 0.01;

/// Shares within this many points of each other are considered the same size.
pub const SAME_SIZE_EPSILON: f64 = 0.1;

/// A share of space assigned to one sibling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FlexBasis {
    /// Percentage (0..=100) of the container's flexible space.
    Percent(f64),
    /// Fixed extent in pixels.
    Pixels(f64),
}

impl FlexBasis {
    /// The whole container.
    pub const FULL: Self = Self::Percent(100.0);

    #[must_use]
    pub const fn as_percent(self) -> Option<f64> {
        match self {
            Self::Percent(value) => Some(value),
            Self::Pixels(_) => None,
        }
    }

    #[must_use]
    pub const fn as_pixels(self) -> Option<f64> {
        match self {
            Self::Pixels(value) => Some(value),
            Self::Percent(_) => None,
        }
    }

    #[must_use]
    pub const fn is_fixed(self) -> bool {
        matches!(self, Self::Pixels(_))
    }

    /// Resolve to pixels against the container's flexible extent.
    #[must_use]
    pub fn resolve(self, flexible_extent: f64) -> f64 {
        match self {
            Self::Percent(value) => percent_to_px(value, flexible_extent),
            Self::Pixels(value) => value,
        }
    }

    /// Whether this basis is a percentage indistinguishable from zero.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        matches!(self, Self::Percent(value) if value < SAME_SIZE_EPSILON)
    }
}

impl Default for FlexBasis {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for FlexBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(value) => write!(f, "{}%", round4(*value)),
            Self::Pixels(value) => write!(f, "{}px", round4(*value)),
        }
    }
}

/// Error for flex-basis strings that are neither `N%` nor `Npx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexBasisParseError {
    pub input: String,
}

impl fmt::Display for FlexBasisParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid flex basis {:?}", self.input)
    }
}

impl std::error::Error for FlexBasisParseError {}

impl FromStr for FlexBasis {
    type Err = FlexBasisParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || FlexBasisParseError {
            input: s.to_string(),
        };
        let (number, pixels) = if let Some(rest) = trimmed.strip_suffix('%') {
            (rest, false)
        } else if let Some(rest) = trimmed.strip_suffix("px") {
            (rest, true)
        } else {
            (trimmed, false)
        };
        let value: f64 = number.trim().parse().map_err(|_| err())?;
        if !value.is_finite() || value < 0.0 {
            return Err(err());
        }
        Ok(if pixels {
            Self::Pixels(value)
        } else {
            Self::Percent(value)
        })
    }
}

impl TryFrom<String> for FlexBasis {
    type Error = FlexBasisParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FlexBasis> for String {
    fn from(value: FlexBasis) -> Self {
        value.to_string()
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Convert a pixel extent into a percentage of `total`.
#[must_use]
pub fn px_to_percent(px: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    px / total * 100.0
}

/// Convert a percentage of `total` into pixels.
#[must_use]
pub fn percent_to_px(percent: f64, total: f64) -> f64 {
    total.max(0.0) * percent / 100.0
}

/// Whether two percentages are within [`SAME_SIZE_EPSILON`].
#[must_use]
pub fn same_size(a: f64, b: f64) -> bool {
    (a - b).abs() <= SAME_SIZE_EPSILON
}

/// Add `amount` (positive or negative) across `shares`, proportionally to
/// each share's current value. Shares that are all zero receive an even
/// split. Donation never drives a share below zero; whatever cannot be taken
/// is left undistributed and returned.
pub fn distribute(shares: &mut [f64], amount: f64) -> f64 {
    if shares.is_empty() || amount == 0.0 {
        return amount;
    }
    let total: f64 = shares.iter().sum();
    if amount > 0.0 {
        if total <= 0.0 {
            let each = amount / shares.len() as f64;
            for share in shares.iter_mut() {
                *share += each;
            }
        } else {
            for share in shares.iter_mut() {
                *share += amount * (*share / total);
            }
        }
        return 0.0;
    }
    let wanted = -amount;
    if total <= 0.0 {
        return amount;
    }
    let taken = wanted.min(total);
    for share in shares.iter_mut() {
        *share = (*share - taken * (*share / total)).max(0.0);
    }
    -(wanted - taken)
}

/// Scale `shares` so they sum to 100 while keeping `protected` (if any) at
/// its current value. The protected share is capped at 100.
///
/// Entries that are `None` are fixed-size and do not participate.
pub fn normalize_shares(shares: &mut [Option<f64>], protected: Option<usize>) {
    let active: Vec<usize> = shares
        .iter()
        .enumerate()
        .filter_map(|(index, share)| share.map(|_| index))
        .collect();
    if active.is_empty() {
        return;
    }
    if active.len() == 1 {
        shares[active[0]] = Some(100.0);
        return;
    }

    let protected = protected.filter(|index| active.contains(index));
    let reserved = protected
        .and_then(|index| shares[index])
        .map_or(0.0, |value| value.clamp(0.0, 100.0));
    if let Some(index) = protected {
        shares[index] = Some(reserved);
    }

    let others: Vec<usize> = active
        .iter()
        .copied()
        .filter(|index| Some(*index) != protected)
        .collect();
    let others_sum: f64 = others.iter().filter_map(|index| shares[*index]).sum();
    let target = 100.0 - reserved;
    if (others_sum - target).abs() > PERCENT_EPSILON {
        if others_sum <= 0.0 {
            let each = target / others.len() as f64;
            for index in &others {
                shares[*index] = Some(each);
            }
        } else {
            let scale = target / others_sum;
            for index in &others {
                shares[*index] = shares[*index].map(|value| value * scale);
            }
        }
    }

    absorb_error(shares, others.last().copied());
}

/// Push the whole rounding error of the active shares into `sink`.
pub fn absorb_error(shares: &mut [Option<f64>], sink: Option<usize>) {
    let Some(sink) = sink else {
        return;
    };
    let sum: f64 = shares.iter().flatten().sum();
    let error = 100.0 - sum;
    if error.abs() > PERCENT_EPSILON {
        if let Some(value) = shares[sink].as_mut() {
            *value = (*value + error).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(shares: &[Option<f64>]) -> f64 {
        shares.iter().flatten().sum()
    }

    #[test]
    fn flex_basis_parses_and_formats() {
        assert_eq!("40%".parse::<FlexBasis>(), Ok(FlexBasis::Percent(40.0)));
        assert_eq!(" 36px".parse::<FlexBasis>(), Ok(FlexBasis::Pixels(36.0)));
        assert_eq!("12.5".parse::<FlexBasis>(), Ok(FlexBasis::Percent(12.5)));
        assert!("auto".parse::<FlexBasis>().is_err());
        assert!("-3%".parse::<FlexBasis>().is_err());
        assert_eq!(FlexBasis::Percent(100.0 / 3.0).to_string(), "33.3333%");
        assert_eq!(FlexBasis::Pixels(36.0).to_string(), "36px");
    }

    #[test]
    fn flex_basis_serializes_as_string() {
        let json = serde_json::to_string(&FlexBasis::Pixels(40.0)).expect("serialize");
        assert_eq!(json, "\"40px\"");
        let back: FlexBasis = serde_json::from_str("\"25%\"").expect("deserialize");
        assert_eq!(back, FlexBasis::Percent(25.0));
    }

    #[test]
    fn px_percent_conversions() {
        assert_eq!(px_to_percent(200.0, 800.0), 25.0);
        assert_eq!(px_to_percent(200.0, 0.0), 0.0);
        assert_eq!(percent_to_px(25.0, 800.0), 200.0);
        assert_eq!(FlexBasis::Percent(50.0).resolve(300.0), 150.0);
        assert_eq!(FlexBasis::Pixels(36.0).resolve(300.0), 36.0);
    }

    #[test]
    fn distribute_is_proportional() {
        let mut shares = [20.0, 60.0];
        assert_eq!(distribute(&mut shares, 20.0), 0.0);
        assert!((shares[0] - 25.0).abs() < 1e-9);
        assert!((shares[1] - 75.0).abs() < 1e-9);

        let mut zero = [0.0, 0.0];
        distribute(&mut zero, 10.0);
        assert_eq!(zero, [5.0, 5.0]);
    }

    #[test]
    fn distribute_donation_stops_at_zero() {
        let mut shares = [10.0, 10.0];
        let left = distribute(&mut shares, -30.0);
        assert_eq!(shares, [0.0, 0.0]);
        assert!((left + 10.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_keeps_protected_share() {
        let mut shares = [Some(40.0), Some(100.0), None];
        normalize_shares(&mut shares, Some(0));
        assert_eq!(shares[0], Some(40.0));
        assert!((shares[1].unwrap_or_default() - 60.0).abs() < 1e-9);
        assert_eq!(shares[2], None);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut shares = [Some(10.0), Some(33.3), Some(33.3)];
        normalize_shares(&mut shares, None);
        let once = shares;
        normalize_shares(&mut shares, None);
        assert_eq!(once, shares);
        assert!((sum(&shares) - 100.0).abs() <= PERCENT_EPSILON);
    }

    #[test]
    fn normalize_single_active_fills() {
        let mut shares = [None, Some(12.0)];
        normalize_shares(&mut shares, None);
        assert_eq!(shares, [None, Some(100.0)]);
    }
}
