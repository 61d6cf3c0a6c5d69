use serde::{Deserialize, Deserializer, Serialize};

/// Air yards at or beyond this mark make a pass explosive.
pub const EXPLOSIVE_PASS_AIR_YARDS: f64 = 20.0;
/// Rushing gain at or beyond this mark makes a run explosive.
pub const EXPLOSIVE_RUN_YARDS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeasonType {
    Reg,
    Post,
    Pre,
}

impl SeasonType {
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "REG" => Some(Self::Reg),
            "POST" => Some(Self::Post),
            "PRE" => Some(Self::Pre),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayType {
    Pass,
    Run,
    #[default]
    #[serde(other)]
    Other,
}

impl PlayType {
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pass" => Self::Pass,
            "run" => Self::Run,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub season: i32,
    pub week: u32,
    pub season_type: SeasonType,
    // nflverse leaves team codes and play_type null on game-start and
    // period-end rows; those load as "" and Other instead of failing the file
    #[serde(alias = "posteam", default, deserialize_with = "null_as_default")]
    pub offense: String,
    #[serde(alias = "defteam", default, deserialize_with = "null_as_default")]
    pub defense: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub play_type: PlayType,
    #[serde(default)]
    pub epa: Option<f64>,
    #[serde(default = "unknown_yards", deserialize_with = "null_as_nan")]
    pub yards_gained: f64,
    #[serde(default)]
    pub air_yards: Option<f64>,
    #[serde(default)]
    pub sack: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn unknown_yards() -> f64 {
    f64::NAN
}

/// A pass or run with a usable EPA, plus the derived outcome flags.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPlay<'a> {
    pub offense: &'a str,
    pub defense: &'a str,
    pub play_type: PlayType,
    pub epa: f64,
    pub yards_gained: f64,
    pub sacked: bool,
    pub success: bool,
    pub explosive: bool,
}

impl NormalizedPlay<'_> {
    pub fn is_pass(&self) -> bool {
        self.play_type == PlayType::Pass
    }

    pub fn is_run(&self) -> bool {
        self.play_type == PlayType::Run
    }

    pub fn stuffed(&self) -> bool {
        self.is_run() && self.yards_gained <= 0.0
    }
}

/// Regular-season passes and runs of `season` through `through_week` (inclusive)
/// that carry an EPA value.
pub fn normalize_plays(plays: &[PlayRecord], season: i32, through_week: u32) -> Vec<NormalizedPlay<'_>> {
    plays
        .iter()
        .filter(|p| p.season == season && p.week <= through_week)
        .filter(|p| p.season_type == SeasonType::Reg)
        .filter_map(normalize_play)
        .collect()
}

fn normalize_play(play: &PlayRecord) -> Option<NormalizedPlay<'_>> {
    if !matches!(play.play_type, PlayType::Pass | PlayType::Run) {
        return None;
    }
    let epa = play.epa.filter(|v| !v.is_nan())?;
    Some(NormalizedPlay {
        offense: play.offense.as_str(),
        defense: play.defense.as_str(),
        play_type: play.play_type,
        epa,
        yards_gained: play.yards_gained,
        sacked: play.sack.is_some_and(|s| s.is_finite() && s != 0.0),
        success: epa > 0.0,
        explosive: is_explosive(play),
    })
}

fn is_explosive(play: &PlayRecord) -> bool {
    match play.play_type {
        // Missing air yards never qualify.
        PlayType::Pass => play.air_yards.is_some_and(|ay| ay >= EXPLOSIVE_PASS_AIR_YARDS),
        PlayType::Run => play.yards_gained >= EXPLOSIVE_RUN_YARDS,
        PlayType::Other => false,
    }
}
