use anyhow::Context;
use colored::Colorize;
use iparo_sdk::LinkingStrategy;
use iparo_sim::{Simulation, SimulationConfig, SimulationReport, Stats};
use tracing::info;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Simulate(args) => cmd_simulate(args, cli.format),
        Command::Compare(args) => cmd_compare(args, cli.format),
        Command::Strategies => cmd_strategies(cli.format),
    }
}

fn build_config(workload: &WorkloadArgs) -> anyhow::Result<SimulationConfig> {
    let mut config = match &workload.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(volume) = workload.volume {
        config.volume = volume;
    }
    if let Some(density) = &workload.density {
        config.density = density.clone();
    }
    if let Some(operations) = &workload.operations {
        config.operations = operations.clone();
    }
    if let Some(iterations) = workload.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = workload.seed {
        config.seed = seed;
    }
    if let Some(key) = &workload.key {
        config.resource_key = key.clone();
    }
    Ok(config)
}

fn run(config: SimulationConfig) -> anyhow::Result<SimulationReport> {
    let strategy = config.strategy.to_string();
    let report = Simulation::new(config)?
        .run()
        .with_context(|| format!("simulating {strategy}"))?;
    Ok(report)
}

fn cmd_simulate(args: SimulateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = build_config(&args.workload)?;
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    let report = run(config)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report, args.samples),
    }
    Ok(())
}

fn cmd_compare(args: CompareArgs, format: OutputFormat) -> anyhow::Result<()> {
    let base = build_config(&args.workload)?;
    let mut reports = Vec::new();
    for strategy in LinkingStrategy::catalog() {
        info!(%strategy, "comparing");
        reports.push(run(SimulationConfig {
            strategy,
            ..base.clone()
        })?);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            println!(
                "{} versions, {} density, {} iterations\n",
                base.volume.count().to_string().bold(),
                base.density.to_string().cyan(),
                base.iterations
            );
            print!("{} {}", format!("{:<44}", "Strategy").bold(), format!("{:>8}", "Links").bold());
            for op in &base.operations {
                print!(" {}", format!("{:>10}", op.name()).bold());
            }
            println!();
            for report in &reports {
                print!("{:<44} {:>8.2}", report.strategy, report.link_summary.mean);
                for op in &report.operations {
                    print!(" {:>10.2}", op.summary.retrieves.mean);
                }
                println!();
            }
            println!("\n{}", "Columns after Links are mean retrieves per lookup.".dimmed());
        }
    }
    Ok(())
}

fn cmd_strategies(format: OutputFormat) -> anyhow::Result<()> {
    let catalog = LinkingStrategy::catalog();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
        OutputFormat::Text => {
            for strategy in &catalog {
                println!(
                    "  {} {}",
                    format!("{:<44}", strategy.to_string()).yellow(),
                    serde_json::to_string(strategy)?.dimmed()
                );
            }
        }
    }
    Ok(())
}

fn stats_line(label: &str, stats: &Stats) -> String {
    format!(
        "  {:<16} mean {:>10.2}  sd {:>9.2}  min {:>8}  max {:>8}",
        label, stats.mean, stats.std_dev, stats.min, stats.max
    )
}

fn print_report(report: &SimulationReport, samples: bool) {
    println!(
        "{} {} ({} versions, {})",
        "✓".green().bold(),
        report.strategy.yellow().bold(),
        report.versions,
        report.density.cyan()
    );

    println!("\n{}", "Store".bold());
    println!(
        "  {} snapshots, {} bytes, {} history records",
        report.stored_snapshots, report.stored_bytes, report.history_records
    );
    println!("{}", stats_line("links", &report.link_summary));
    println!("{}", stats_line("retrieves", &report.store_summary.retrieves));
    println!("{}", stats_line("naming gets", &report.store_summary.naming_gets));

    for op in &report.operations {
        println!("\n{}", op.operation.name().bold());
        println!("{}", stats_line("retrieves", &op.summary.retrieves));
        println!("{}", stats_line("naming gets", &op.summary.naming_gets));
        if samples {
            for (i, s) in op.samples.iter().enumerate() {
                println!(
                    "    {:>4}: gets {} updates {} stores {} retrieves {}",
                    i + 1,
                    s.naming_gets,
                    s.naming_updates,
                    s.stores,
                    s.retrieves
                );
            }
        }
    }
}
