use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a timestamp lookup resolves a target that falls between two captures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The capture nearest in time; exact midpoints resolve to the earlier one.
    #[default]
    Closest,
    /// The latest capture taken at or before the target.
    LatestBefore,
    /// The earliest capture taken at or after the target.
    EarliestAfter,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closest => write!(f, "closest"),
            Self::LatestBefore => write!(f, "latest_before"),
            Self::EarliestAfter => write!(f, "earliest_after"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "closest" => Ok(Self::Closest),
            "latest_before" | "before" => Ok(Self::LatestBefore),
            "earliest_after" | "after" => Ok(Self::EarliestAfter),
            other => Err(format!("unknown lookup mode: {other}")),
        }
    }
}
