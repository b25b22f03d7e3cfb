//! census_dkl: file-to-file driver for the divergence pipeline
//!
//! ## Stages
//!
//! ```text
//! raw counts ──totals──► joined ──divergence──► dkl ──mutual-info──► mi
//! ```
//!
//! All tables are Parquet files. `run` chains divergence and mutual-info.
//! Set `RUST_LOG=debug` to see degenerate-group tallies.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use census_dkl::{
    check_invariants, derive_totals, read_parquet_path, write_parquet_path, Category,
    DivergenceCalculator, Frame, MutualInformationSummarizer, PipelineConfig, SummaryConfig,
    SyntheticMetro, VintageRegistry,
};

#[derive(Parser)]
#[command(name = "census_dkl", version, about = "Block-group DKL segregation measures and metro MI summaries")]
struct Cli {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive block, county and metro totals from raw block counts
    Totals(IoArgs),
    /// Report rows whose stored totals disagree with block counts
    Check(InputArgs),
    /// Append probability terms and dkl_block / dkl_bin to a joined table
    Divergence(IoArgs),
    /// Summarise a divergence table to one MI row per (metro, category)
    MutualInfo(MutualInfoArgs),
    /// Divergence followed by mutual-info
    Run(RunArgs),
    /// List the supported survey vintages
    Vintages,
    /// Generate a synthetic metro of raw block counts
    Synthetic(SyntheticArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Input Parquet file
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Args)]
struct IoArgs {
    /// Input Parquet file
    #[arg(short, long)]
    input: PathBuf,
    /// Output Parquet file
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct MutualInfoArgs {
    #[command(flatten)]
    io: IoArgs,
    /// Extra display columns to carry onto each summary row
    #[arg(long, value_delimiter = ',')]
    passthrough: Vec<String>,
}

#[derive(Args)]
struct RunArgs {
    /// Joined input table (block counts plus totals)
    #[arg(short, long)]
    input: PathBuf,
    /// Divergence output
    #[arg(long)]
    dkl_output: PathBuf,
    /// Mutual-information output
    #[arg(long)]
    mi_output: PathBuf,
    /// Extra display columns to carry onto each summary row
    #[arg(long, value_delimiter = ',')]
    passthrough: Vec<String>,
    /// Survey vintage the input belongs to (e.g. 2015, 2010dec)
    #[arg(long, requires = "category")]
    vintage: Option<String>,
    /// Category slug the input holds (race, income, educ, empl)
    #[arg(long, requires = "vintage")]
    category: Option<String>,
}

#[derive(Args)]
struct SyntheticArgs {
    /// Output Parquet file
    #[arg(short, long)]
    output: PathBuf,
    /// Segregation level in [0, 1]
    #[arg(long)]
    segregation: Option<f64>,
    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,
    /// Category slug (race, income, educ, empl)
    #[arg(long)]
    category: Option<String>,
    /// Also derive totals so the output can go straight to `divergence`
    #[arg(long)]
    with_totals: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Command::Totals(args) => {
            let input = load(&args.input)?;
            let joined = derive_totals(&input)?;
            save(&joined, &args.output)
        }
        Command::Check(args) => {
            let input = load(&args.input)?;
            let report = check_invariants(&input)?;
            println!("rows checked:                 {}", report.rows_checked);
            println!("block_group_total mismatches: {}", report.block_group_total_mismatches);
            println!("metro_bin_total mismatches:   {}", report.metro_bin_total_mismatches);
            println!("metro_group_total mismatches: {}", report.metro_group_total_mismatches);
            println!("bin total > group total:      {}", report.bin_exceeds_group);
            if !report.is_consistent() {
                bail!("{} is inconsistent", args.input.display());
            }
            Ok(())
        }
        Command::Divergence(args) => {
            let input = load(&args.input)?;
            let dkl = divergence(&input)?;
            save(&dkl, &args.output)
        }
        Command::MutualInfo(args) => {
            let input = load(&args.io.input)?;
            let mi = mutual_info(&input, &config.summary, args.passthrough)?;
            save(&mi, &args.io.output)
        }
        Command::Run(args) => run(args, &config),
        Command::Vintages => {
            print_vintages(&VintageRegistry::standard());
            Ok(())
        }
        Command::Synthetic(args) => synthetic(args, &config),
    }
}

fn run(args: RunArgs, config: &PipelineConfig) -> Result<()> {
    if let (Some(vintage), Some(category)) = (&args.vintage, &args.category) {
        let category: Category = category.parse()?;
        let registry = VintageRegistry::standard();
        if !registry.supports(vintage, category)? {
            warn!(%vintage, %category, "category not available for vintage, skipping");
            return Ok(());
        }
    }

    let input = load(&args.input)?;
    let dkl = divergence(&input)?;
    save(&dkl, &args.dkl_output)?;

    let mi = mutual_info(&dkl, &config.summary, args.passthrough)?;
    save(&mi, &args.mi_output)
}

fn divergence(input: &Frame) -> Result<Frame> {
    let (dkl, diagnostics) = DivergenceCalculator::new().compute_with_diagnostics(input)?;
    if diagnostics.has_degenerate_rows() {
        info!(
            zero_metro_group_total = diagnostics.zero_metro_group_total,
            zero_metro_bin_total = diagnostics.zero_metro_bin_total,
            zero_block_group_total = diagnostics.zero_block_group_total,
            "zero denominators resolved to 0"
        );
    }
    Ok(dkl)
}

fn mutual_info(input: &Frame, base: &SummaryConfig, extra: Vec<String>) -> Result<Frame> {
    let mut summary_config = base.clone();
    summary_config.passthrough_columns.extend(extra);
    summary_config.validate()?;

    let summary = MutualInformationSummarizer::new(summary_config).summarize(input)?;
    if summary.degenerate_groups > 0 {
        info!(groups = summary.degenerate_groups, "zero-population groups reported as mi = 0");
    }
    Ok(summary.to_frame()?)
}

fn synthetic(args: SyntheticArgs, config: &PipelineConfig) -> Result<()> {
    let mut synthetic = config.synthetic.clone();
    if let Some(s) = args.segregation {
        synthetic.segregation = s;
    }
    if args.seed.is_some() {
        synthetic.seed = args.seed;
    }
    if let Some(category) = &args.category {
        synthetic.category = category.parse()?;
    }

    let raw = SyntheticMetro::new(synthetic)?.generate()?;
    let frame = if args.with_totals { derive_totals(&raw)? } else { raw };
    save(&frame, &args.output)
}

fn print_vintages(registry: &VintageRegistry) {
    println!("{:<10} {:<8} {:<11} categories", "vintage", "dataset", "delineation");
    for v in registry.iter() {
        let categories: Vec<&str> = v.categories.iter().map(|c| c.slug()).collect();
        println!(
            "{:<10} {:<8} {:<11} {}",
            v.key,
            v.dataset.to_string(),
            v.delineation_year,
            categories.join(", ")
        );
    }
}

fn load(path: &Path) -> Result<Frame> {
    if !path.exists() {
        error!(path = %path.display(), "input file not found");
        bail!("input file not found: {}", path.display());
    }
    let frame = read_parquet_path(path).with_context(|| format!("reading {}", path.display()))?;
    info!(path = %path.display(), rows = frame.n_rows(), columns = frame.n_columns(), "loaded");
    Ok(frame)
}

fn save(frame: &Frame, path: &Path) -> Result<()> {
    write_parquet_path(frame, path).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), rows = frame.n_rows(), "saved");
    Ok(())
}
