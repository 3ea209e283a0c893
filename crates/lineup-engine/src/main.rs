// Command-line entry point.
//
// Usage:
//   lineup-optimize <roster.json> <projections.csv> --week N --year Y
//                   [--format ppr|half_ppr|standard] [--config engine.toml]
//                   [--waivers pool.csv]
//
// Prints the optimization result (and waiver recommendations when a pool is
// given) as JSON on stdout. Logs go to stderr, filtered by RUST_LOG.

use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::info;

use lineup_engine::config::{load_config_from, EngineConfig};
use lineup_engine::optimizer::{LineupEngine, OptimizationResult};
use lineup_engine::provider::{CsvProjectionSource, CsvWaiverPool, JsonRosterProvider};
use lineup_engine::waiver::WaiverRecommendation;

#[derive(Debug, Default)]
struct Args {
    roster: PathBuf,
    projections: PathBuf,
    week: u32,
    year: u32,
    format: Option<String>,
    config: Option<PathBuf>,
    waivers: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report {
    lineup: OptimizationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    waivers: Option<Vec<WaiverRecommendation>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    info!("scoring format default: {}", config.scoring_format.label());

    let engine = LineupEngine::new(
        CsvProjectionSource::new(&args.projections),
        JsonRosterProvider::new(&args.roster),
        config,
    );

    let lineup = engine
        .optimize(args.week, args.year, args.format.as_deref())
        .await
        .context("lineup optimization failed")?;

    let waivers = match &args.waivers {
        Some(path) => {
            let pool = CsvWaiverPool::new(path);
            let recs = engine
                .waiver_recommendations(&pool, args.week, args.year, args.format.as_deref())
                .await
                .context("waiver recommendations failed")?;
            Some(recs)
        }
        None => None,
    };

    let report = Report { lineup, waivers };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut week = None;
    let mut year = None;

    while let Some(arg) = raw.next() {
        let mut value = |flag: &str| raw.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--week" => week = Some(value("--week")?.parse::<u32>().context("invalid --week")?),
            "--year" => year = Some(value("--year")?.parse::<u32>().context("invalid --year")?),
            "--format" => args.format = Some(value("--format")?),
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            "--waivers" => args.waivers = Some(PathBuf::from(value("--waivers")?)),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => positional.push(PathBuf::from(&arg)),
        }
    }

    let [roster, projections]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected <roster.json> <projections.csv>"))?;
    args.roster = roster;
    args.projections = projections;
    args.week = week.context("--week is required")?;
    args.year = year.context("--year is required")?;
    Ok(args)
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lineup_engine=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
