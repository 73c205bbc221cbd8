//! Pass/fail verdicts as exit-status bit flags.
//!
//! | Bit | Value | Meaning |
//! |-----|-------|---------|
//! | 0 | 1 | left below minimum |
//! | 1 | 2 | left above maximum |
//! | 2 | 4 | right below minimum |
//! | 3 | 8 | right above maximum |

use serde::Serialize;
use sonoqc_core::Channel;
use std::ops::{BitOr, BitOrAssign};

/// Set of limit violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FailFlags(u8);

impl FailFlags {
    /// No violation.
    pub const NONE: Self = Self(0);
    /// Left channel below its minimum.
    pub const LEFT_BELOW_MIN: Self = Self(1);
    /// Left channel above its maximum.
    pub const LEFT_ABOVE_MAX: Self = Self(2);
    /// Right channel below its minimum.
    pub const RIGHT_BELOW_MIN: Self = Self(4);
    /// Right channel above its maximum.
    pub const RIGHT_ABOVE_MAX: Self = Self(8);

    /// Below-minimum flag for `channel`.
    pub fn below_min(channel: Channel) -> Self {
        match channel {
            Channel::Left => Self::LEFT_BELOW_MIN,
            Channel::Right => Self::RIGHT_BELOW_MIN,
        }
    }

    /// Above-maximum flag for `channel`.
    pub fn above_max(channel: Channel) -> Self {
        match channel {
            Channel::Left => Self::LEFT_ABOVE_MAX,
            Channel::Right => Self::RIGHT_ABOVE_MAX,
        }
    }

    /// Raw bit value, suitable as a process exit status.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Whether no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FailFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FailFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

/// Optional lower and upper limit for one measured value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Limits {
    /// Values strictly below this fail.
    pub min: Option<f64>,
    /// Values strictly above this fail.
    pub max: Option<f64>,
}

impl Limits {
    /// Limits with only an upper bound.
    pub fn max(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Limits with both bounds.
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Flags raised by `value` measured on `channel`.
    pub fn evaluate(&self, channel: Channel, value: f64) -> FailFlags {
        let mut flags = FailFlags::NONE;
        if self.min.is_some_and(|min| value < min) {
            flags |= FailFlags::below_min(channel);
        }
        if self.max.is_some_and(|max| value > max) {
            flags |= FailFlags::above_max(channel);
        }
        if !flags.is_empty() {
            tracing::info!(%channel, value, min = ?self.min, max = ?self.max, "limit violated");
        }
        flags
    }
}
