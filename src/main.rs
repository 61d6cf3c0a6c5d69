use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridiron_edge::config::{ModelConfig, validate_week};
use gridiron_edge::enrich::{CoverageGradeOverlay, NoEnrichment, UnitEnricher};
use gridiron_edge::export::write_workbook;
use gridiron_edge::picks::{GamePick, WeekModel, compute_week_picks};
use gridiron_edge::play_source::{LocalFiles, PlaySource, ScheduleSource};
use gridiron_edge::unit_metrics::OffenseUnit;

#[derive(Parser, Debug)]
#[command(name = "gridiron_edge", version, about = "Unit-vs-unit NFL matchup edges and game verdicts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the scored offense and defense unit tables
    Units {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        json: bool,
    },
    /// Pick every regular-season game of a week
    Picks {
        #[command(flatten)]
        data: DataArgs,
        /// Schedule JSON (array of games)
        #[arg(long)]
        schedule: PathBuf,
        /// Model config JSON; GRIDIRON_* env vars override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write unit tables and picks to an XLSX workbook
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Parquet or JSON play log, or a directory of play_by_play_{season} files
    #[arg(long)]
    plays: PathBuf,
    #[arg(long)]
    season: i32,
    #[arg(long)]
    week: u32,
    /// JSON map of team -> {CoverageDB|CoverageLB -> grade}
    #[arg(long)]
    coverage_grades: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Units { data, json } => run_units(&data, json),
        Command::Picks {
            data,
            schedule,
            config,
            export,
            json,
        } => run_picks(&data, &schedule, config.as_deref(), export.as_deref(), json),
    }
}

fn load_overlay(path: Option<&Path>) -> Result<Option<CoverageGradeOverlay>> {
    path.map(CoverageGradeOverlay::load).transpose()
}

fn enrichers(overlay: Option<&CoverageGradeOverlay>) -> Vec<&dyn UnitEnricher> {
    match overlay {
        Some(o) => vec![o as &dyn UnitEnricher],
        None => vec![&NoEnrichment as &dyn UnitEnricher],
    }
}

fn run_units(data: &DataArgs, json: bool) -> Result<()> {
    validate_week(data.week)?;
    let plays = LocalFiles::new(&data.plays).fetch_season_plays(data.season)?;
    let overlay = load_overlay(data.coverage_grades.as_deref())?;
    let model = WeekModel::build(&plays, data.season, data.week, &enrichers(overlay.as_ref()));

    if json {
        let out = serde_json::json!({
            "season": model.season,
            "week": model.week,
            "enrichments_applied": model.enrichments_applied,
            "offense": model.offense,
            "defense": model.defense,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if model.is_empty() {
        println!("Insufficient data: no regular-season plays for {} through week {}", data.season, data.week);
        return Ok(());
    }
    println!("Offense units, {} through week {}", model.season, model.week);
    println!("{:<5} {:<4} {:>8} {:>8} {:>8} {:>8} {:>8} {:>7}", "Team", "Unit", "EPA", "Succ", "Expl", "PBW", "RBW", "Score");
    for row in &model.offense {
        let m = &row.metric;
        println!(
            "{:<5} {:<4} {:>8} {:>8} {:>8} {:>8} {:>8} {:>7}",
            m.team,
            m.unit.label(),
            fmt_opt(m.epa_per_play, 3),
            fmt_opt(m.success_rate, 3),
            fmt_opt(m.explosive_rate, 3),
            fmt_opt(m.pass_block_win, 3),
            fmt_opt(m.run_block_win, 3),
            fmt_opt(row.score, 3),
        );
    }
    println!();
    println!("Defense units");
    println!("{:<5} {:<11} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>7}", "Team", "Unit", "EPA", "Succ", "Expl", "Press", "Stop", "Cov", "Score");
    for row in &model.defense {
        let m = &row.metric;
        println!(
            "{:<5} {:<11} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>7}",
            m.team,
            m.unit.label(),
            fmt_opt(m.epa_allowed, 3),
            fmt_opt(m.success_allowed, 3),
            fmt_opt(m.explosive_allowed, 3),
            fmt_opt(m.pressure_rate, 3),
            fmt_opt(m.run_stop_win, 3),
            fmt_opt(m.coverage_grade, 1),
            fmt_opt(row.score, 3),
        );
    }
    Ok(())
}

fn run_picks(
    data: &DataArgs,
    schedule: &Path,
    config: Option<&Path>,
    export: Option<&Path>,
    json: bool,
) -> Result<()> {
    let cfg = ModelConfig::resolve(config)?;
    let source = LocalFiles::new(&data.plays).with_schedule(schedule);
    let plays = source.fetch_season_plays(data.season)?;
    let games = source.fetch_schedule()?;
    let overlay = load_overlay(data.coverage_grades.as_deref())?;

    let (model, picks) = compute_week_picks(
        &plays,
        &games,
        data.season,
        data.week,
        &cfg,
        &enrichers(overlay.as_ref()),
    )?;

    if let Some(path) = export {
        let report = write_workbook(path, &model, &picks)
            .with_context(|| format!("export week {} picks", data.week))?;
        info!(path = %path.display(), picks = report.picks, "workbook written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&picks)?);
        return Ok(());
    }

    if picks.is_empty() {
        println!("No regular-season games for {} week {}", data.season, data.week);
    }
    for pick in &picks {
        print_pick(pick);
    }
    Ok(())
}

fn print_pick(pick: &GamePick) {
    println!("{}", pick.label);
    println!("  {}  (net {})", pick.headline, fmt_opt(pick.net_edge, 3));
    println!("  {:<5} {:>8} {:>8} {:>8} {:>8}", "Unit", "Home raw", "Home adj", "Away raw", "Away adj");
    for unit in OffenseUnit::ALL {
        println!(
            "  {:<5} {:>8} {:>8} {:>8} {:>8}",
            unit.label(),
            fmt_opt(pick.home.raw.get(unit), 3),
            fmt_opt(pick.home.adjusted.get(unit), 3),
            fmt_opt(pick.away.raw.get(unit), 3),
            fmt_opt(pick.away.adjusted.get(unit), 3),
        );
    }
    println!(
        "  TTF {:.3} / {:.3}   team edge {} / {}",
        pick.home.ttf,
        pick.away.ttf,
        fmt_opt(pick.home.edge, 3),
        fmt_opt(pick.away.edge, 3),
    );
    println!();
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| "-".to_string())
}
