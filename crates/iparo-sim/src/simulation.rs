use std::path::Path;

use iparo_sdk::{Archive, ArchiveConfig, LinkingStrategy, Mode, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::density::{VersionDensity, VersionGenerator, VersionVolume};
use crate::error::{SimError, SimResult};
use crate::operation::{OpSample, Operation, Stats, Summary};

/// Capture time of the first generated version.
pub const START: Timestamp = Timestamp::from_secs(1_700_000_000);

/// Parameters of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub strategy: LinkingStrategy,
    pub density: VersionDensity,
    pub volume: VersionVolume,
    /// Rounds per lookup operation.
    pub iterations: usize,
    pub operations: Vec<Operation>,
    pub resource_key: String,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            strategy: LinkingStrategy::Single,
            density: VersionDensity::default(),
            volume: VersionVolume::default(),
            iterations: 100,
            operations: Operation::ALL.to_vec(),
            resource_key: "example.com".to_string(),
            seed: 0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimResult<()> {
        self.strategy
            .validate()
            .map_err(|e| SimError::Config(e.to_string()))?;
        self.density.validate()?;
        if self.resource_key.is_empty() {
            return Err(SimError::Config("resource_key must not be empty".into()));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> SimResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

/// Counts for writing one version.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreSample {
    pub seq: u64,
    pub links: usize,
    pub counts: OpSample,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationReport {
    pub operation: Operation,
    pub samples: Vec<OpSample>,
    pub summary: Summary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub strategy: String,
    pub density: String,
    pub versions: usize,
    /// Snapshots held by the content store after the run.
    pub stored_snapshots: usize,
    pub stored_bytes: u64,
    /// Naming history records written during the run.
    pub history_records: usize,
    pub stores: Vec<StoreSample>,
    pub store_summary: Summary,
    pub link_summary: Stats,
    pub operations: Vec<OperationReport>,
}

/// Writes a synthetic history with one strategy and measures lookups.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn run(&self) -> SimResult<SimulationReport> {
        let config = &self.config;
        let key = config.resource_key.as_str();
        let archive = Archive::in_memory(ArchiveConfig {
            strategy: config.strategy.clone(),
            clamp_clock: false,
            seed: Some(config.seed),
        })?;

        let count = config.volume.count();
        let versions =
            VersionGenerator::new(config.density.clone(), START, config.seed).generate(count, key)?;
        info!(strategy = %config.strategy, density = %config.density, count, "storing versions");

        let mut stores = Vec::with_capacity(count);
        for (seq, (timestamp, content)) in versions.iter().enumerate() {
            archive.reset_counts();
            let id = archive.create_snapshot_at(key, content.clone(), *timestamp)?;
            let counts = sample(&archive);
            let links = archive.retrieve(&id)?.links.len();
            stores.push(StoreSample {
                seq: seq as u64,
                links,
                counts,
            });
        }

        let (first_ts, last_ts) = match (versions.first(), versions.last()) {
            (Some(first), Some(last)) => (first.0, last.0),
            _ => (START, START),
        };

        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        let mut operations = Vec::with_capacity(config.operations.len());
        for &operation in &config.operations {
            info!(%operation, iterations = config.iterations, "running operation");
            let mut samples = Vec::with_capacity(config.iterations);
            for _ in 0..config.iterations {
                archive.reset_counts();
                match operation {
                    Operation::Latest => {
                        archive.get_latest(key)?;
                    }
                    Operation::First => {
                        archive.get_first(key)?;
                    }
                    Operation::Nth => {
                        let n = rng.gen_range(0..count as u64);
                        archive.get_nth(key, n)?;
                    }
                    Operation::Time => {
                        let span = last_ts.micros_since(first_ts);
                        let target = first_ts + rng.gen_range(0..=span);
                        archive.get_at_time(key, target, Mode::Closest)?;
                    }
                    Operation::List => {
                        archive.list_all(key)?;
                    }
                }
                samples.push(sample(&archive));
            }
            let summary = Summary::of(&samples);
            debug!(%operation, mean_retrieves = summary.retrieves.mean, "operation finished");
            operations.push(OperationReport {
                operation,
                samples,
                summary,
            });
        }

        let store_counts: Vec<OpSample> = stores.iter().map(|s| s.counts).collect();
        Ok(SimulationReport {
            strategy: archive.strategy().to_string(),
            density: config.density.to_string(),
            versions: count,
            stored_snapshots: archive.store().len(),
            stored_bytes: archive.store().total_bytes(),
            history_records: archive.naming().history_len(),
            store_summary: Summary::of(&store_counts),
            link_summary: Stats::of(stores.iter().map(|s| s.links as u64)),
            stores,
            operations,
        })
    }
}

fn sample(archive: &Archive) -> OpSample {
    OpSample::from_counts(archive.naming_counts(), archive.store_counts())
}
