// Clip Sampler CLI binary

use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand};
use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use clip_sampler_lib::config::NullPolicy;
use clip_sampler_lib::constants::*;
use clip_sampler_lib::report::bucket_proportions;
use clip_sampler_lib::{DistributionReport, FetchPlan, PlanOptions, SamplerConfig, Table, WeightedSampler};

#[derive(Parser)]
#[command(name = "clipsampler")]
#[command(about = "Clip Sampler - Diversity-balanced sampling of video clip manifests", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (debug, info, warn, error); RUST_LOG is used when absent
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, weight and sample a clip manifest
    Sample {
        /// Candidate manifest (CSV)
        #[arg(long)]
        metadata: PathBuf,
        /// Output manifest (CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of clips to sample
        #[arg(short = 'n', long)]
        num: Option<i64>,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
        /// Sampler configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Bottom aesthetic share dropped among Bright clips
        #[arg(long)]
        aesthetic_q_bright: Option<f64>,
        /// Bottom aesthetic share dropped among all other clips, replacing any
        /// per-label quantiles from the config file except Bright
        #[arg(long)]
        aesthetic_q_dark: Option<f64>,
        /// Drop rows with missing or invalid values instead of failing
        #[arg(long)]
        drop_invalid_rows: bool,
        /// Filter and weight only; print bucket proportions and write nothing
        #[arg(long)]
        dry_run: bool,
        /// Also write a distribution report of the sample (JSON)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Summarize the field distributions of a manifest
    Report {
        /// Manifest (CSV)
        manifest: PathBuf,
        /// Write the report as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Plan which group archives a sampled manifest needs
    Plan {
        /// Sampled manifest (CSV)
        manifest: PathBuf,
        /// Only plan for the first N rows
        #[arg(short = 'n', long)]
        num: Option<usize>,
        /// Shuffle rows before taking the first N
        #[arg(long)]
        shuffle: bool,
        /// Shuffle seed
        #[arg(long, default_value_t = DEFAULT_SHUFFLE_SEED)]
        seed: u64,
        /// Write the plan as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default sampler configuration as JSON
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Sample {
            metadata, output, num, seed, config, aesthetic_q_bright, aesthetic_q_dark,
            drop_invalid_rows, dry_run, report,
        } => {
            let config = build_config(config, num, seed, aesthetic_q_bright, aesthetic_q_dark, drop_invalid_rows)?;
            if dry_run {
                cmd_dry_run(metadata, config)
            } else {
                cmd_sample(metadata, output, config, report)
            }
        }
        Commands::Report { manifest, output, json } => cmd_report(manifest, output, json),
        Commands::Plan { manifest, num, shuffle, seed, output } => cmd_plan(manifest, num, shuffle, seed, output),
        Commands::Config => cmd_config(),
    }
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => {
            let level = level.to_lowercase();
            if !matches!(level.as_str(), "debug" | "info" | "warn" | "error") {
                bail!("Invalid log level: {}. Use debug, info, warn, or error.", level);
            }
            EnvFilter::new(level)
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Defaults, then the config file, then command-line overrides
fn build_config(
    path: Option<PathBuf>,
    num: Option<i64>,
    seed: Option<u64>,
    q_bright: Option<f64>,
    q_dark: Option<f64>,
    drop_invalid_rows: bool,
) -> Result<SamplerConfig> {
    let mut config = match path {
        Some(path) => SamplerConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SamplerConfig::default(),
    };

    if let Some(n) = num {
        config.target_size = n;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(q) = q_bright {
        config.filter.set_quantile(BRIGHT_LABEL, q);
    }
    if let Some(q) = q_dark {
        config.filter.set_quantile_except(BRIGHT_LABEL, q);
    }
    if drop_invalid_rows {
        config.null_policy = NullPolicy::Drop;
    }

    config.validate()?;
    Ok(config)
}

fn cmd_sample(metadata: PathBuf, output: Option<PathBuf>, config: SamplerConfig, report: Option<PathBuf>) -> Result<()> {
    let Some(output) = output else {
        bail!("--output is required unless --dry-run is given");
    };

    let table = Table::read_csv(&metadata)?;
    let sampler = WeightedSampler::new(config)?;
    let outcome = sampler.run(&table)?;
    outcome.table.write_csv(&output)?;

    let stats = outcome.stats();
    println!("Sampled {} clips from {}", stats.selected, metadata.display());
    println!();
    println!("  Input rows:         {}", stats.input_rows);
    println!("  Dropped invalid:    {}", stats.dropped_invalid);
    println!("  Dropped short:      {}", stats.dropped_short);
    println!("  Dropped aesthetic:  {}", stats.dropped_aesthetic);
    println!("  Candidates:         {}", stats.candidates);
    println!("  Selected:           {}", stats.selected);
    println!();
    println!("Written to {}", output.display());

    if let Some(path) = report {
        let report = DistributionReport::from_table(&outcome.table);
        write_json(&path, &serde_json::to_string_pretty(&report)?)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn cmd_dry_run(metadata: PathBuf, config: SamplerConfig) -> Result<()> {
    let table = Table::read_csv(&metadata)?;
    let sampler = WeightedSampler::new(config)?;
    let candidates = sampler.prepare(&table)?;

    println!("Dry run: {} candidates of {} rows", candidates.clips.len(), table.len());
    println!();
    println!("{:<12}  {:>8}  {:>12}  {:>8}", "Bucket", "Cutoff", "Candidates", "Kept");
    println!("{}", "-".repeat(46));
    for (label, cutoff) in &candidates.cutoffs {
        println!("{:<12}  {:>8.4}  {:>12}  {:>8}", label, cutoff.cutoff, cutoff.candidates, cutoff.kept);
    }

    for (axis, props) in bucket_proportions(&candidates) {
        println!();
        println!("{}:", axis);
        for (bucket, share) in props {
            println!("  {:<6} {:>6.2}%", bucket, share * 100.0);
        }
    }

    Ok(())
}

fn cmd_report(manifest: PathBuf, output: Option<PathBuf>, json: bool) -> Result<()> {
    let table = Table::read_csv(&manifest)?;
    let report = DistributionReport::from_table(&table);

    if let Some(path) = output {
        write_json(&path, &serde_json::to_string_pretty(&report)?)?;
        println!("Report written to {}", path.display());
    } else if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    Ok(())
}

fn cmd_plan(manifest: PathBuf, num: Option<usize>, shuffle: bool, seed: u64, output: Option<PathBuf>) -> Result<()> {
    let table = Table::read_csv(&manifest)?;
    let options = PlanOptions {
        limit: num,
        shuffle_seed: shuffle.then_some(seed),
    };
    let plan = FetchPlan::from_table(&table, &options)?;

    println!("{:<16}  {:>8}  {:>12}", "Group", "Videos", "Annotations");
    println!("{}", "-".repeat(40));
    for (gid, group) in &plan.groups {
        println!("{:<16}  {:>8}  {:>12}", gid, group.videos.len(), group.annotation_prefixes.len());
    }
    println!();
    println!(
        "{} groups, {} archives from {} rows ({} skipped)",
        plan.groups.len(), plan.archive_paths().len(), plan.rows_considered, plan.rows_skipped
    );

    if let Some(path) = output {
        plan.write_json(&path)?;
        println!("Plan written to {}", path.display());
    }

    Ok(())
}

fn cmd_config() -> Result<()> {
    println!("{}", SamplerConfig::default().to_json()?);
    Ok(())
}

fn write_json(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
