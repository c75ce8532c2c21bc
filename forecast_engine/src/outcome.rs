//! Typed results of analytics operations
//!
//! Operations that decline to run because their inputs do not allow it report
//! an [`Outcome::Skipped`] with the reason, so callers can tell "nothing was
//! computed" apart from "a zero was computed".

use crate::model::ForecastModule;
use std::fmt;

/// Why an operation left its input unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The line carries no actual values at all
    NoActuals,
    /// Fewer historical values than the prediction needs
    InsufficientHistory { available: usize, required: usize },
    /// No line of the version could be predicted
    NothingGenerated,
    /// Snapshots are only taken for rolling forecasts
    NotRolling,
    /// The forecast has no active version to snapshot
    NoActiveVersion,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoActuals => write!(f, "line has no actual values"),
            SkipReason::InsufficientHistory {
                available,
                required,
            } => write!(
                f,
                "insufficient history: {} values available, {} required",
                available, required
            ),
            SkipReason::NothingGenerated => write!(f, "no line could be predicted"),
            SkipReason::NotRolling => write!(f, "forecast is not rolling"),
            SkipReason::NoActiveVersion => write!(f, "forecast has no active version"),
        }
    }
}

/// Either the produced value or the reason nothing was produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Applied(T),
    Skipped(SkipReason),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Skipped(reason) => Some(*reason),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Applied(value) => Outcome::Applied(f(value)),
            Outcome::Skipped(reason) => Outcome::Skipped(reason),
        }
    }
}

/// A replaced forecast module plus what changed in it
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleUpdate<T> {
    pub module: ForecastModule,
    pub detail: T,
}

impl<T> ModuleUpdate<T> {
    /// Hand the new module to the state owner and keep the detail
    pub fn commit<F: FnOnce(ForecastModule)>(self, on_update: F) -> T {
        on_update(self.module);
        self.detail
    }
}

impl<T> Outcome<ModuleUpdate<T>> {
    /// Hand the new module to `on_update` if the operation applied
    ///
    /// The callback runs at most once and receives the whole replaced module.
    pub fn commit<F: FnOnce(ForecastModule)>(self, on_update: F) -> Outcome<T> {
        self.map(|update| update.commit(on_update))
    }
}
