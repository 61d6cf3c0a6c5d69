use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::{Field, Row};
use parquet::schema::types::{Type, TypePtr};
use tracing::{debug, warn};

use crate::plays::{PlayRecord, PlayType, SeasonType};
use crate::schedule::ScheduledGame;

const REQUIRED_COLUMNS: &[&str] = &[
    "season",
    "week",
    "season_type",
    "posteam",
    "defteam",
    "play_type",
    "epa",
    "yards_gained",
];
const OPTIONAL_COLUMNS: &[&str] = &["air_yards", "sack"];

/// Provides a full season of play-by-play. Retries and fallbacks between
/// providers live behind this trait.
pub trait PlaySource {
    fn fetch_season_plays(&self, season: i32) -> Result<Vec<PlayRecord>>;
}

pub trait ScheduleSource {
    fn fetch_schedule(&self) -> Result<Vec<ScheduledGame>>;
}

/// Play logs and schedules already on disk.
///
/// `plays` is either a single parquet/JSON file or a directory holding
/// `play_by_play_{season}.parquet` (or `.json`).
#[derive(Debug, Clone)]
pub struct LocalFiles {
    pub plays: PathBuf,
    pub schedule: Option<PathBuf>,
}

impl LocalFiles {
    pub fn new(plays: impl Into<PathBuf>) -> Self {
        Self {
            plays: plays.into(),
            schedule: None,
        }
    }

    pub fn with_schedule(mut self, schedule: impl Into<PathBuf>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    fn season_file(&self, season: i32) -> Option<PathBuf> {
        if !self.plays.is_dir() {
            return Some(self.plays.clone());
        }
        ["parquet", "json"]
            .iter()
            .map(|ext| self.plays.join(format!("play_by_play_{season}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl PlaySource for LocalFiles {
    fn fetch_season_plays(&self, season: i32) -> Result<Vec<PlayRecord>> {
        let Some(path) = self.season_file(season) else {
            warn!(season, dir = %self.plays.display(), "no play-by-play file for season");
            return Ok(Vec::new());
        };
        load_plays(&path)
    }
}

impl ScheduleSource for LocalFiles {
    fn fetch_schedule(&self) -> Result<Vec<ScheduledGame>> {
        let path = self
            .schedule
            .as_deref()
            .ok_or_else(|| anyhow!("no schedule file configured"))?;
        load_schedule_json(path)
    }
}

pub fn load_plays(path: &Path) -> Result<Vec<PlayRecord>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        load_plays_json(path)
    } else {
        load_plays_parquet(path)
    }
}

pub fn load_plays_json(path: &Path) -> Result<Vec<PlayRecord>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let plays: Vec<PlayRecord> =
        serde_json::from_str(&raw).with_context(|| format!("parse plays {}", path.display()))?;
    debug!(rows = plays.len(), path = %path.display(), "loaded json plays");
    Ok(plays)
}

pub fn load_schedule_json(path: &Path) -> Result<Vec<ScheduledGame>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse schedule {}", path.display()))
}

/// Read an nflverse play-by-play parquet file.
///
/// Only the columns the aggregator needs are projected. Rows without a
/// usable season, week, season type or play type are skipped.
pub fn load_plays_parquet(path: &Path) -> Result<Vec<PlayRecord>> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = SerializedFileReader::new(file).context("open parquet reader plays")?;
    let schema = reader.metadata().file_metadata().schema();

    let mut fields: Vec<TypePtr> = Vec::new();
    for name in REQUIRED_COLUMNS {
        let field = schema
            .get_fields()
            .iter()
            .find(|f| f.name() == *name)
            .ok_or_else(|| anyhow!("play-by-play file {} lacks column `{name}`", path.display()))?;
        fields.push(field.clone());
    }
    for name in OPTIONAL_COLUMNS {
        if let Some(field) = schema.get_fields().iter().find(|f| f.name() == *name) {
            fields.push(field.clone());
        }
    }
    let projection = Type::group_type_builder(schema.name())
        .with_fields(fields)
        .build()
        .context("build parquet projection")?;

    let iter = reader
        .get_row_iter(Some(projection))
        .context("iterate play rows")?;

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for row in iter {
        let Ok(row) = row else {
            skipped += 1;
            continue;
        };
        match play_from_row(&row) {
            Some(play) => out.push(play),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, path = %path.display(), "skipped unreadable play rows");
    }
    debug!(rows = out.len(), path = %path.display(), "loaded parquet plays");
    Ok(out)
}

fn play_from_row(row: &Row) -> Option<PlayRecord> {
    let mut season = None;
    let mut week = None;
    let mut season_type = None;
    let mut play_type = None;
    let mut offense = String::new();
    let mut defense = String::new();
    let mut epa = None;
    let mut yards_gained = None;
    let mut air_yards = None;
    let mut sack = None;

    for (name, field) in row.get_column_iter() {
        match name.as_str() {
            "season" => season = field_i64(field).and_then(|v| i32::try_from(v).ok()),
            "week" => week = field_i64(field).and_then(|v| u32::try_from(v).ok()),
            "season_type" => season_type = field_str(field).and_then(SeasonType::from_label),
            "play_type" => play_type = field_str(field).map(PlayType::from_label),
            // a null team stays empty and is left out of that side's grouping
            "posteam" => offense = field_str(field).unwrap_or_default().trim().to_string(),
            "defteam" => defense = field_str(field).unwrap_or_default().trim().to_string(),
            "epa" => epa = field_f64(field),
            "yards_gained" => yards_gained = field_f64(field),
            "air_yards" => air_yards = field_f64(field),
            "sack" => sack = field_f64(field),
            _ => {}
        }
    }

    Some(PlayRecord {
        season: season?,
        week: week?,
        season_type: season_type?,
        offense,
        defense,
        // nflverse leaves play_type null on timeouts and period ends
        play_type: play_type.unwrap_or(PlayType::Other),
        epa,
        yards_gained: yards_gained.unwrap_or(f64::NAN),
        air_yards,
        sack,
    })
}

fn field_f64(field: &Field) -> Option<f64> {
    let v = match field {
        Field::Double(v) => *v,
        Field::Float(v) => f64::from(*v),
        Field::Long(v) => *v as f64,
        Field::Int(v) => f64::from(*v),
        Field::Short(v) => f64::from(*v),
        Field::Byte(v) => f64::from(*v),
        Field::Bool(v) => f64::from(u8::from(*v)),
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn field_i64(field: &Field) -> Option<i64> {
    match field {
        Field::Long(v) => Some(*v),
        Field::Int(v) => Some(i64::from(*v)),
        Field::Short(v) => Some(i64::from(*v)),
        Field::Double(v) if v.fract() == 0.0 => Some(*v as i64),
        Field::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_str(field: &Field) -> Option<&str> {
    match field {
        Field::Str(s) => Some(s.as_str()),
        _ => None,
    }
}
