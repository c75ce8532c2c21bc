//! Ordered monthly series
//!
//! [`PeriodSeries`] maps each [`PeriodKey`] to a value and always iterates in
//! calendar order, so callers never have to sort keys themselves.

use crate::period::PeriodKey;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

/// A time-ordered mapping of period to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodSeries(BTreeMap<PeriodKey, f64>);

impl PeriodSeries {
    /// Create an empty series
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a series from `(YYYY-MM, value)` pairs, failing on the first malformed key
    pub fn parse_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut series = Self::new();
        for (label, value) in pairs {
            series.insert(label.as_ref().parse()?, value);
        }
        Ok(series)
    }

    /// Build a series of consecutive months starting at `start`
    pub fn consecutive(start: PeriodKey, values: &[f64]) -> Self {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start.add_months(i as i32), v))
            .collect()
    }

    /// Insert a value, returning the previous one for that period
    pub fn insert(&mut self, period: PeriodKey, value: f64) -> Option<f64> {
        self.0.insert(period, value)
    }

    pub fn get(&self, period: &PeriodKey) -> Option<f64> {
        self.0.get(period).copied()
    }

    /// Value for the period, treating a missing entry as 0
    pub fn get_or_zero(&self, period: &PeriodKey) -> f64 {
        self.get(period).unwrap_or(0.0)
    }

    pub fn contains(&self, period: &PeriodKey) -> bool {
        self.0.contains_key(period)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PeriodKey, f64> {
        self.0.iter()
    }

    /// Periods in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &PeriodKey> {
        self.0.keys()
    }

    /// Values in period order
    pub fn values(&self) -> Vec<f64> {
        self.0.values().copied().collect()
    }

    pub fn first_period(&self) -> Option<PeriodKey> {
        self.0.keys().next().copied()
    }

    pub fn last_period(&self) -> Option<PeriodKey> {
        self.0.keys().next_back().copied()
    }

    /// The trailing `count` periods (the whole series if shorter)
    pub fn tail(&self, count: usize) -> Self {
        let skip = self.len().saturating_sub(count);
        self.0.iter().skip(skip).map(|(k, v)| (*k, *v)).collect()
    }

    /// Overlay `other` onto this series; entries of `other` win on collision
    pub fn merge(&mut self, other: &PeriodSeries) {
        self.0.extend(other.iter().map(|(k, v)| (*k, *v)));
    }

    /// Every period present in either series, in ascending order
    pub fn union_keys(&self, other: &PeriodSeries) -> BTreeSet<PeriodKey> {
        self.0.keys().chain(other.keys()).copied().collect()
    }

    pub fn sum(&self) -> f64 {
        self.0.values().sum()
    }
}

impl FromIterator<(PeriodKey, f64)> for PeriodSeries {
    fn from_iter<T: IntoIterator<Item = (PeriodKey, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(PeriodKey, f64)> for PeriodSeries {
    fn extend<T: IntoIterator<Item = (PeriodKey, f64)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl From<BTreeMap<PeriodKey, f64>> for PeriodSeries {
    fn from(map: BTreeMap<PeriodKey, f64>) -> Self {
        Self(map)
    }
}

impl<'a> IntoIterator for &'a PeriodSeries {
    type Item = (&'a PeriodKey, &'a f64);
    type IntoIter = btree_map::Iter<'a, PeriodKey, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
