//! Synthetic capture histories.

use std::fmt;
use std::str::FromStr;

use iparo_sdk::{TimeUnit, Timestamp};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use tracing::debug;

use crate::error::{SimError, SimResult};

/// Number of versions to generate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionVolume {
    Single,
    Small,
    #[default]
    Medium,
    Large,
    HyperLarge,
}

impl VersionVolume {
    pub const ALL: [Self; 5] = [
        Self::Single,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::HyperLarge,
    ];

    pub const fn count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Small => 10,
            Self::Medium => 100,
            Self::Large => 1_000,
            Self::HyperLarge => 10_000,
        }
    }
}

impl fmt::Display for VersionVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::HyperLarge => "hyper_large",
        };
        write!(f, "{name}")
    }
}

impl FromStr for VersionVolume {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|v| v.to_string() == wanted || v.count().to_string() == wanted)
            .ok_or_else(|| format!("unknown version volume `{s}`"))
    }
}

fn default_interval() -> f64 {
    1_000.0
}

/// How capture times are spread out. All values are in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionDensity {
    /// Evenly over `[0, interval]`.
    Uniform {
        #[serde(default = "default_interval")]
        interval: f64,
    },
    /// Density `1 + slope * (t - 1/2)` over the normalized interval;
    /// `slope` lies in `[-2, 2]`.
    Linear {
        slope: f64,
        #[serde(default = "default_interval")]
        interval: f64,
    },
    /// Reciprocal density: many early captures thinning out (`param > 1`)
    /// or the reverse (`param < 1`).
    BigHeadLongTail {
        param: f64,
        #[serde(default = "default_interval")]
        interval: f64,
    },
    /// A weighted mixture of normals truncated at zero, given as
    /// `(weight, mean, standard deviation)`.
    Multipeak { peaks: Vec<(f64, f64, f64)> },
}

impl Default for VersionDensity {
    fn default() -> Self {
        Self::Uniform {
            interval: default_interval(),
        }
    }
}

impl VersionDensity {
    pub fn validate(&self) -> SimResult<()> {
        let bad = |msg: &str| Err(SimError::Config(format!("{self}: {msg}")));
        match self {
            Self::Uniform { interval }
            | Self::Linear { interval, .. }
            | Self::BigHeadLongTail { interval, .. }
                if !(*interval > 0.0) =>
            {
                bad("interval must be positive")
            }
            Self::Linear { slope, .. } if !(-2.0..=2.0).contains(slope) => {
                bad("slope must lie in [-2, 2]")
            }
            Self::BigHeadLongTail { param, .. } if !(*param > 0.0) || *param == 1.0 => {
                bad("param must be positive and not 1")
            }
            Self::Multipeak { peaks } if peaks.is_empty() => bad("at least one peak is required"),
            Self::Multipeak { peaks }
                if peaks.iter().any(|(w, mean, sd)| {
                    !(*w >= 0.0) || !(*sd >= 0.0) || !w.is_finite() || !mean.is_finite() || !sd.is_finite()
                }) =>
            {
                bad("weights, means and standard deviations must be finite, weights and deviations non-negative")
            }
            Self::Multipeak { peaks } if !(peaks.iter().map(|p| p.0).sum::<f64>() > 0.0) => {
                bad("weights must not all be zero")
            }
            _ => Ok(()),
        }
    }

    /// Inverse CDF of the interval densities at quantile `q` in `[0, 1]`.
    fn quantile(&self, q: f64) -> f64 {
        match *self {
            Self::Uniform { interval } => q * interval,
            Self::Linear { slope, interval } => {
                // Solve t + (slope/2)(t^2 - t) = q in the form that stays
                // finite when slope is 0.
                if q <= 0.0 {
                    return 0.0;
                }
                let b = 1.0 - slope / 2.0;
                let t = 2.0 * q / (b + (b * b + 2.0 * slope * q).sqrt());
                t * interval
            }
            Self::BigHeadLongTail { param, interval } => interval * (param.powf(q) - 1.0) / (param - 1.0),
            Self::Multipeak { .. } => 0.0,
        }
    }

    /// `n` offsets from the start, in seconds, sorted ascending.
    pub fn offsets(&self, n: usize, rng: &mut StdRng) -> SimResult<Vec<f64>> {
        let mut offsets: Vec<f64> = match self {
            Self::Multipeak { peaks } => {
                let mixture = Mixture::new(peaks)?;
                (0..n).map(|_| mixture.sample(rng)).collect()
            }
            _ => {
                let last = n.saturating_sub(1).max(1) as f64;
                (0..n).map(|i| self.quantile(i as f64 / last)).collect()
            }
        };
        offsets.sort_by(f64::total_cmp);
        Ok(offsets)
    }
}

/// Weighted normal peaks, truncated at zero.
struct Mixture {
    choose: WeightedIndex<f64>,
    /// Mean and distribution of each peak; a zero deviation is a point mass.
    peaks: Vec<(f64, Option<Normal>)>,
}

impl Mixture {
    fn new(peaks: &[(f64, f64, f64)]) -> SimResult<Self> {
        let choose = WeightedIndex::new(peaks.iter().map(|p| p.0))
            .map_err(|e| SimError::Config(format!("peak weights: {e}")))?;
        let peaks = peaks
            .iter()
            .map(|&(_, mean, sd)| {
                if sd == 0.0 {
                    return Ok((mean, None));
                }
                Normal::new(mean, sd)
                    .map(|normal| (mean, Some(normal)))
                    .map_err(|e| SimError::Config(format!("peak ({mean}, {sd}): {e}")))
            })
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Self { choose, peaks })
    }

    fn sample(&self, rng: &mut StdRng) -> f64 {
        let (mean, normal) = &self.peaks[self.choose.sample(rng)];
        let Some(normal) = normal else {
            return mean.max(0.0);
        };
        // Rejection keeps the truncation at zero; give up on hopeless peaks.
        for _ in 0..100 {
            let x = normal.sample(rng);
            if x >= 0.0 {
                return x;
            }
        }
        0.0
    }
}

impl fmt::Display for VersionDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform { .. } => write!(f, "Uniform"),
            Self::Linear { slope, .. } => write!(f, "Linear ({slope})"),
            Self::BigHeadLongTail { param, .. } => write!(f, "BHLT ({param})"),
            Self::Multipeak { peaks } => write!(f, "Multipeak ({} peaks)", peaks.len()),
        }
    }
}

/// Produces ordered `(timestamp, content)` pairs for a resource.
pub struct VersionGenerator {
    density: VersionDensity,
    start: Timestamp,
    rng: StdRng,
}

impl VersionGenerator {
    pub fn new(density: VersionDensity, start: Timestamp, seed: u64) -> Self {
        Self {
            density,
            start,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self, count: usize, key: &str) -> SimResult<Vec<(Timestamp, Vec<u8>)>> {
        let seconds = TimeUnit::Seconds.micros() as f64;
        let versions: Vec<_> = self
            .density
            .offsets(count, &mut self.rng)?
            .into_iter()
            .enumerate()
            .map(|(i, offset)| {
                let ts = self.start + (offset * seconds).floor() as i64;
                (ts, format!("Node {i}").into_bytes())
            })
            .collect();
        debug!(key, count, density = %self.density, "generated versions");
        Ok(versions)
    }
}
