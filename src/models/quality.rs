//! Recall quality grade reported by the user after seeing a card.
//!
//! - 0: complete blackout
//! - 1: incorrect, answer recognised once shown
//! - 2: incorrect, answer seemed easy once shown
//! - 3: correct with serious difficulty
//! - 4: correct after hesitation
//! - 5: perfect recall

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A quality grade guaranteed to be in 0..=5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 5;
    /// Lowest grade that counts as a successful recall.
    pub const PASSING: u8 = 3;

    /// Clamps any integer into 0..=5.
    pub fn clamped(raw: i64) -> Self {
        let clamped = raw.clamp(Self::MIN as i64, Self::MAX as i64);
        if clamped != raw {
            tracing::warn!(raw, clamped, "quality out of bounds, clamping to 0-5");
        }
        Quality(clamped as u8)
    }

    /// Clamping or strict parsing, chosen by the caller.
    pub fn parse(raw: i64, strict: bool) -> Result<Self, ValidationError> {
        if strict {
            Self::try_from(raw)
        } else {
            Ok(Self::clamped(raw))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// A failed recall, which resets repetition progress.
    pub fn is_lapse(self) -> bool {
        self.0 < Self::PASSING
    }
}

impl TryFrom<i64> for Quality {
    type Error = ValidationError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&raw) {
            Ok(Quality(raw as u8))
        } else {
            Err(ValidationError::InvalidQuality(raw))
        }
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
