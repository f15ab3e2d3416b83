use std::fmt;
use std::str::FromStr;

use iparo_sdk::{NamingCounts, OpCounts};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution, Max, Min};

/// A lookup replayed against a populated archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Resolve the head.
    Latest,
    /// Walk to sequence 0.
    First,
    /// Walk to a uniformly chosen sequence number.
    Nth,
    /// Closest match for a uniformly chosen instant inside the history.
    Time,
    /// Enumerate every snapshot.
    List,
}

impl Operation {
    pub const ALL: [Self; 5] = [Self::Latest, Self::First, Self::Nth, Self::Time, Self::List];

    pub fn name(self) -> &'static str {
        match self {
            Self::Latest => "Latest",
            Self::First => "First",
            Self::Nth => "Nth",
            Self::Time => "Time",
            Self::List => "List",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown operation `{s}`"))
    }
}

/// Operation counts for one iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpSample {
    pub naming_gets: u64,
    pub naming_updates: u64,
    pub stores: u64,
    pub retrieves: u64,
}

impl OpSample {
    pub fn from_counts(naming: NamingCounts, store: OpCounts) -> Self {
        Self {
            naming_gets: naming.gets,
            naming_updates: naming.updates,
            stores: store.stores,
            retrieves: store.retrieves,
        }
    }
}

/// Mean, spread, minimum and maximum of one counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    /// Sample standard deviation; zero for fewer than two values.
    pub std_dev: f64,
    pub min: u64,
    pub max: u64,
}

impl Stats {
    pub fn of<I: IntoIterator<Item = u64>>(values: I) -> Self {
        let values: Vec<f64> = values.into_iter().map(|v| v as f64).collect();
        if values.is_empty() {
            return Self::default();
        }
        let data = Data::new(values);
        Self {
            mean: data.mean().unwrap_or_default(),
            std_dev: data.std_dev().filter(|s| s.is_finite()).unwrap_or_default(),
            min: data.min() as u64,
            max: data.max() as u64,
        }
    }
}

/// Per-counter statistics over a run of samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub naming_gets: Stats,
    pub naming_updates: Stats,
    pub stores: Stats,
    pub retrieves: Stats,
}

impl Summary {
    pub fn of(samples: &[OpSample]) -> Self {
        Self {
            naming_gets: Stats::of(samples.iter().map(|s| s.naming_gets)),
            naming_updates: Stats::of(samples.iter().map(|s| s.naming_updates)),
            stores: Stats::of(samples.iter().map(|s| s.stores)),
            retrieves: Stats::of(samples.iter().map(|s| s.retrieves)),
        }
    }
}
