use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Every ledger amount and every balance is a `MoneyCents`, so sums never
/// drift the way floating point totals do.
///
/// The value is signed:
/// - positive = the member owes more (guest fee, upward adjustment)
/// - negative = the member owes less (payment, downward adjustment)
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let fee = MoneyCents::new(20_00);
/// assert_eq!(fee.cents(), 2000);
/// assert_eq!(fee.to_string(), "$20.00");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator, an
/// optional `$`, and rejects more than 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("15".parse::<MoneyCents>().unwrap().cents(), 1500);
/// assert_eq!("$7,5".parse::<MoneyCents>().unwrap().cents(), 750);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Balances are never displayed below zero, even when overpayments leave
    /// the raw ledger sum negative.
    #[must_use]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 { Self::ZERO } else { self }
    }

    /// Largest magnitude a single ledger entry or target balance may carry
    /// ($1,000,000.00).
    pub const MAX_ENTRY: MoneyCents = MoneyCents(100_000_000);

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Sums `amounts`, failing instead of wrapping when the total leaves the
    /// `i64` range.
    pub fn checked_sum<I>(amounts: I) -> Option<MoneyCents>
    where
        I: IntoIterator<Item = MoneyCents>,
    {
        amounts
            .into_iter()
            .try_fold(MoneyCents::ZERO, MoneyCents::checked_add)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let dollars = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}${dollars}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator, an optional leading `+`/`-`
    /// and an optional `$` after the sign.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::Validation("empty amount".to_string());
        let invalid = || EngineError::Validation("invalid amount".to_string());
        let overflow = || EngineError::Validation("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        let rest = rest.strip_prefix('$').unwrap_or(rest).trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let dollars_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if dollars_str.is_empty() || !dollars_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let dollars: i64 = dollars_str.parse().map_err(|_| overflow())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::Validation("too many decimals".to_string())),
                }
            }
        };

        let total = dollars
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        let signed = if sign < 0 {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(MoneyCents(signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_dollars() {
        assert_eq!(MoneyCents::new(0).to_string(), "$0.00");
        assert_eq!(MoneyCents::new(5).to_string(), "$0.05");
        assert_eq!(MoneyCents::new(2000).to_string(), "$20.00");
        assert_eq!(MoneyCents::new(-1550).to_string(), "-$15.50");
    }

    #[test]
    fn parse_accepts_dot_comma_and_dollar_sign() {
        assert_eq!("20".parse::<MoneyCents>().unwrap().cents(), 2000);
        assert_eq!("20.5".parse::<MoneyCents>().unwrap().cents(), 2050);
        assert_eq!("20,05".parse::<MoneyCents>().unwrap().cents(), 2005);
        assert_eq!("$15".parse::<MoneyCents>().unwrap().cents(), 1500);
        assert_eq!("-$0.01".parse::<MoneyCents>().unwrap().cents(), -1);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<MoneyCents>().is_err());
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("ten".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn clamp_hides_overpayment() {
        assert_eq!(MoneyCents::new(-500).clamp_non_negative(), MoneyCents::ZERO);
        assert_eq!(MoneyCents::new(500).clamp_non_negative().cents(), 500);
    }

    #[test]
    fn sum_of_entries() {
        let total: MoneyCents = [2000, -1500, 250].into_iter().map(MoneyCents::new).sum();
        assert_eq!(total.cents(), 750);
    }

    #[test]
    fn checked_sum_reports_overflow() {
        let amounts = [i64::MAX, 1].map(MoneyCents::new);
        assert_eq!(MoneyCents::checked_sum(amounts), None);
        let amounts = [2000, -1500].map(MoneyCents::new);
        assert_eq!(MoneyCents::checked_sum(amounts), Some(MoneyCents::new(500)));
    }
}
