//! Set weight: kilograms as a decimal with precision 6 and scale 2.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

lazy_static! {
    static ref WEIGHT_REGEX: Regex = Regex::new(r"^([0-9]+)(?:\.([0-9]{1,2}))?$").unwrap();
}

/// Stored as an integer count of hundredths of a kilogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Weight(i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeightError {
    #[error("Weight is required")]
    Empty,
    #[error("Weight must be a number with at most two decimal places")]
    Malformed,
    #[error("Weight must be between 0 and 9999.99 kg")]
    OutOfRange,
}

impl Weight {
    pub const MAX_HUNDREDTHS: i64 = 999_999;

    pub fn from_hundredths(hundredths: i64) -> Result<Self, WeightError> {
        if (0..=Self::MAX_HUNDREDTHS).contains(&hundredths) {
            Ok(Self(hundredths))
        } else {
            Err(WeightError::OutOfRange)
        }
    }

    pub fn hundredths(self) -> i64 {
        self.0
    }
}

impl FromStr for Weight {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(WeightError::Empty);
        }

        let caps = WEIGHT_REGEX.captures(s).ok_or(WeightError::Malformed)?;
        let whole: i64 = caps[1].parse().map_err(|_| WeightError::OutOfRange)?;
        let fraction = match caps.get(2) {
            Some(m) if m.as_str().len() == 1 => m.as_str().parse::<i64>().unwrap_or(0) * 10,
            Some(m) => m.as_str().parse::<i64>().unwrap_or(0),
            None => 0,
        };

        let hundredths = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(fraction))
            .ok_or(WeightError::OutOfRange)?;
        Self::from_hundredths(hundredths)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
