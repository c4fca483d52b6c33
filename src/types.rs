//! Domain-specific newtypes for type safety.
//!
//! Uses `derive_more` to eliminate arithmetic boilerplate while keeping money
//! amounts distinct from plain floats.

use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;

use derive_more::{Add as DeriveAdd, From, Into};
use serde::{Deserialize, Serialize};

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹', '₩', '₽', '₺', '¢'];

/// A monetary amount in the sheet's currency.
///
/// Plain `f64` semantics: no rounding or overflow handling beyond IEEE rules.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, PartialOrd, DeriveAdd, From, Into, Serialize, Deserialize,
)]
pub struct Money(pub f64);

impl Money {
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Parse a spreadsheet money cell such as `"$1,200.50"` or `"€ 50"`.
    ///
    /// Currency symbols, thousands separators and whitespace are stripped.
    /// Whatever remains must be a plain signed decimal; any other text (a
    /// note such as `"2 x $500"`, an exponent, a second number) counts as zero.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|c| !(CURRENCY_SYMBOLS.contains(c) || *c == ',' || c.is_whitespace()))
            .collect();
        let digits = cleaned.strip_prefix('-').unwrap_or(&cleaned);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Self::ZERO;
        }
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map_or(Self::ZERO, Self)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    /// Formats as `$1,250.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0.0 { "-" } else { "" };
        let fixed = format!("{:.2}", self.0.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        write!(f, "{sign}${grouped}.{cents}")
    }
}
