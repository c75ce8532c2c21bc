//! Calendar-month period identifiers
//!
//! A [`PeriodKey`] is the `YYYY-MM` label every forecast and actual value is
//! keyed by. Month arithmetic is plain integer arithmetic, so no timezone or
//! day-of-month can shift a period.

use crate::{MathError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, displayed and parsed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Create a new period from a year (0-9999) and a month (1-12)
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(0..=9999).contains(&year) {
            return Err(MathError::InvalidPeriod(format!(
                "year {} is outside 0000-9999",
                year
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(MathError::InvalidPeriod(format!(
                "month {} is outside 1-12",
                month
            )));
        }

        Ok(Self { year, month })
    }

    /// The period containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift the period by a signed number of months
    ///
    /// ```
    /// use forecast_math::PeriodKey;
    ///
    /// let dec: PeriodKey = "2024-12".parse().unwrap();
    /// assert_eq!(dec.add_months(1).to_string(), "2025-01");
    /// assert_eq!(dec.add_months(-12).to_string(), "2023-12");
    /// ```
    pub fn add_months(self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Signed number of months from `earlier` to `self`
    pub fn months_since(&self, earlier: &PeriodKey) -> i32 {
        (self.year - earlier.year) * 12 + (self.month as i32 - earlier.month as i32)
    }

    /// First calendar day of the period
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(MathError::InvalidPeriod(format!(
                "'{}' is not in YYYY-MM format",
                s
            )));
        }

        let year = s[..4]
            .parse::<i32>()
            .map_err(|e| MathError::InvalidPeriod(format!("'{}': {}", s, e)))?;
        let month = s[5..]
            .parse::<u32>()
            .map_err(|e| MathError::InvalidPeriod(format!("'{}': {}", s, e)))?;

        Self::new(year, month)
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = MathError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}
