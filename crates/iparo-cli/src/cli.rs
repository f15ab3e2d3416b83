use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use iparo_sdk::LinkingStrategy;
use iparo_sim::{Operation, VersionDensity, VersionVolume};

#[derive(Parser)]
#[command(
    name = "iparo",
    about = "IPARO archive: compare snapshot linking strategies by simulation",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a synthetic history with one strategy and measure lookups
    Simulate(SimulateArgs),
    /// Run the same history through every built-in strategy
    Compare(CompareArgs),
    /// List the available linking strategies
    Strategies,
}

#[derive(Args, Clone, Debug)]
pub struct WorkloadArgs {
    /// TOML file with a full simulation configuration; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of versions: single, small, medium, large, hyper_large (or 1, 10, ...)
    #[arg(long)]
    pub volume: Option<VersionVolume>,

    /// Capture-time density: uniform[:interval], linear:slope[,interval], bhlt:param[,interval]
    #[arg(long, value_parser = parse_density)]
    pub density: Option<VersionDensity>,

    /// Comma-separated lookups to replay: latest, first, nth, time, list
    #[arg(long, value_delimiter = ',')]
    pub operations: Option<Vec<Operation>>,

    /// Rounds per lookup
    #[arg(long)]
    pub iterations: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Resource key the history is stored under
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Strategy in compact form, e.g. single, k_previous:3, temporally_min_gap:10m
    #[arg(long)]
    pub strategy: Option<LinkingStrategy>,

    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Also print per-iteration samples
    #[arg(long)]
    pub samples: bool,
}

#[derive(Args, Clone, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,
}

/// Parse the compact density form used on the command line.
pub fn parse_density(s: &str) -> Result<VersionDensity, String> {
    let (kind, params) = s.split_once(':').unwrap_or((s, ""));
    let values = params
        .split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.trim().parse::<f64>().map_err(|_| format!("invalid number `{p}`")))
        .collect::<Result<Vec<f64>, String>>()?;
    let interval = |i: usize| values.get(i).copied().unwrap_or(1_000.0);
    let first = || {
        values
            .first()
            .copied()
            .ok_or_else(|| format!("density `{kind}` needs a parameter"))
    };

    let density = match kind.trim().to_ascii_lowercase().as_str() {
        "uniform" => VersionDensity::Uniform { interval: interval(0) },
        "linear" => VersionDensity::Linear {
            slope: first()?,
            interval: interval(1),
        },
        "bhlt" | "big_head_long_tail" => VersionDensity::BigHeadLongTail {
            param: first()?,
            interval: interval(1),
        },
        other => return Err(format!("unknown density `{other}` (multipeak needs --config)")),
    };
    density.validate().map_err(|e| e.to_string())?;
    Ok(density)
}
