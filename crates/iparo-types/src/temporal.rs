use std::fmt;
use std::ops::{Add, Sub};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Number of microseconds in common time units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Microseconds per unit.
    pub const fn micros(self) -> i64 {
        match self {
            Self::Milliseconds => 1_000,
            Self::Seconds => 1_000_000,
            Self::Minutes => 60_000_000,
            Self::Hours => 3_600_000_000,
            Self::Days => 86_400_000_000,
        }
    }
}

/// Capture time of a snapshot, in microseconds since the UNIX epoch.
///
/// Timestamps are plain integers so that interpolation between two captures
/// can be done exactly. Within a resource, timestamps never decrease as the
/// sequence number grows.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The UNIX epoch.
    pub const EPOCH: Self = Self(0);

    /// Wrap a raw microsecond count.
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Build from whole seconds.
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * TimeUnit::Seconds.micros())
    }

    /// Build from a count of `unit`.
    pub const fn from_units(count: i64, unit: TimeUnit) -> Self {
        Self(count * unit.micros())
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as i64;
        Self(micros)
    }

    /// Raw microsecond count.
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Signed distance `self - earlier`, in microseconds.
    pub const fn micros_since(self, earlier: Self) -> i64 {
        self.0 - earlier.0
    }

    /// Shift by a signed number of microseconds, saturating at the i64 range.
    pub const fn offset(self, micros: i64) -> Self {
        Self(self.0.saturating_add(micros))
    }
}

impl Add<i64> for Timestamp {
    type Output = Self;

    fn add(self, micros: i64) -> Self {
        self.offset(micros)
    }
}

impl Sub<i64> for Timestamp {
    type Output = Self;

    fn sub(self, micros: i64) -> Self {
        self.offset(micros.saturating_neg())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}us)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
