use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gridiron_edge::backtest::{PickResult, backtest_weeks, run_backtest};
use gridiron_edge::config::{LAST_REGULAR_WEEK, ModelConfig};
use gridiron_edge::enrich::NoEnrichment;
use gridiron_edge::play_source::{LocalFiles, PlaySource, ScheduleSource};

/// Walk a season week by week, picking each slate from prior weeks only.
#[derive(Parser, Debug)]
#[command(name = "backtest", version)]
struct Args {
    #[arg(long)]
    plays: PathBuf,
    #[arg(long)]
    schedule: PathBuf,
    #[arg(long)]
    season: i32,
    #[arg(long, default_value_t = 2)]
    from_week: u32,
    #[arg(long, default_value_t = LAST_REGULAR_WEEK)]
    to_week: u32,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print every graded game, not just the summary
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = ModelConfig::resolve(args.config.as_deref())?;
    let source = LocalFiles::new(&args.plays).with_schedule(&args.schedule);
    let plays = source.fetch_season_plays(args.season)?;
    let schedule = source.fetch_schedule()?;

    let (report, graded) = run_backtest(
        &plays,
        &schedule,
        args.season,
        args.from_week,
        args.to_week,
        &cfg,
        &[&NoEnrichment],
    )?;

    if args.verbose {
        for g in &graded {
            let mark = match g.result {
                PickResult::Hit => "HIT",
                PickResult::Miss => "MISS",
                PickResult::Push => "PUSH",
                PickResult::NoCall => "-",
                PickResult::Insufficient => "n/a",
                PickResult::Pending => "?",
            };
            println!(
                "wk{:>2} {:>4} @ {:<4} {:<18} margin={:<5} {}",
                g.week,
                g.away_team,
                g.home_team,
                g.verdict.label(),
                g.home_margin.map(|m| m.to_string()).unwrap_or_default(),
                mark,
            );
        }
    }

    let weeks = backtest_weeks(args.from_week, args.to_week);
    println!("Backtest {} weeks {}..={}", args.season, weeks.start(), weeks.end());
    println!(
        "games={} directional={} hits={} misses={} pushes={} no_calls={} insufficient={} pending={}",
        report.games,
        report.directional,
        report.hits,
        report.misses,
        report.pushes,
        report.no_calls,
        report.insufficient,
        report.pending,
    );
    match report.accuracy() {
        Some(acc) => println!("accuracy={:.1}%", acc * 100.0),
        None => println!("accuracy=n/a (no decided directional picks)"),
    }
    Ok(())
}
