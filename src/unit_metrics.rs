use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plays::{NormalizedPlay, PlayRecord, normalize_plays};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OffenseUnit {
    #[serde(rename = "QB")]
    Qb,
    #[serde(rename = "RB")]
    Rb,
    #[serde(rename = "WR")]
    Wr,
    #[serde(rename = "TE")]
    Te,
    #[serde(rename = "OL")]
    Ol,
}

impl OffenseUnit {
    pub const ALL: [OffenseUnit; 5] = [Self::Qb, Self::Rb, Self::Wr, Self::Te, Self::Ol];
    pub const SKILL: [OffenseUnit; 4] = [Self::Qb, Self::Rb, Self::Wr, Self::Te];

    pub fn label(self) -> &'static str {
        match self {
            Self::Qb => "QB",
            Self::Rb => "RB",
            Self::Wr => "WR",
            Self::Te => "TE",
            Self::Ol => "OL",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|u| u.label().eq_ignore_ascii_case(raw.trim()))
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefenseUnit {
    PassRush,
    RunDefense,
    #[serde(rename = "CoverageDB")]
    CoverageDb,
    #[serde(rename = "CoverageLB")]
    CoverageLb,
    #[serde(rename = "DL")]
    Dl,
}

impl DefenseUnit {
    pub const ALL: [DefenseUnit; 5] = [
        Self::PassRush,
        Self::RunDefense,
        Self::CoverageDb,
        Self::CoverageLb,
        Self::Dl,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::PassRush => "PassRush",
            Self::RunDefense => "RunDefense",
            Self::CoverageDb => "CoverageDB",
            Self::CoverageLb => "CoverageLB",
            Self::Dl => "DL",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|u| u.label().eq_ignore_ascii_case(raw.trim()))
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffenseRates {
    pub epa_per_play: f64,
    pub success_rate: f64,
    pub explosive_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffenseUnitMetric {
    pub team: String,
    pub unit: OffenseUnit,
    pub epa_per_play: Option<f64>,
    pub success_rate: Option<f64>,
    pub explosive_rate: Option<f64>,
    pub pass_block_win: Option<f64>,
    pub run_block_win: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseUnitMetric {
    pub team: String,
    pub unit: DefenseUnit,
    pub epa_allowed: Option<f64>,
    pub success_allowed: Option<f64>,
    pub explosive_allowed: Option<f64>,
    pub pressure_rate: Option<f64>,
    pub run_stop_win: Option<f64>,
    pub coverage_grade: Option<f64>,
}

impl DefenseUnitMetric {
    fn empty(team: &str, unit: DefenseUnit) -> Self {
        Self {
            team: team.to_string(),
            unit,
            epa_allowed: None,
            success_allowed: None,
            explosive_allowed: None,
            pressure_rate: None,
            run_stop_win: None,
            coverage_grade: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitTables {
    pub offense: Vec<OffenseUnitMetric>,
    pub defense: Vec<DefenseUnitMetric>,
}

impl UnitTables {
    pub fn is_empty(&self) -> bool {
        self.offense.is_empty() && self.defense.is_empty()
    }

    pub fn offense_row(&self, team: &str, unit: OffenseUnit) -> Option<&OffenseUnitMetric> {
        self.offense.iter().find(|r| r.unit == unit && r.team == team)
    }

    pub fn defense_row(&self, team: &str, unit: DefenseUnit) -> Option<&DefenseUnitMetric> {
        self.defense.iter().find(|r| r.unit == unit && r.team == team)
    }
}

/// Supplies the rate triple carried by each skill-position row.
///
/// Play-by-play logs do not attribute rates per position, so the default
/// broadcasts the team-wide triple to QB, RB, WR and TE alike.
pub trait SkillRateSource {
    fn rates(&self, team: &str, unit: OffenseUnit, team_wide: OffenseRates) -> OffenseRates;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TeamWideBroadcast;

impl SkillRateSource for TeamWideBroadcast {
    fn rates(&self, _team: &str, _unit: OffenseUnit, team_wide: OffenseRates) -> OffenseRates {
        team_wide
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SideTally {
    plays: usize,
    epa_sum: f64,
    successes: usize,
    explosives: usize,
    passes: usize,
    sacks: usize,
    runs: usize,
    stuffs: usize,
}

impl SideTally {
    fn push(&mut self, play: &NormalizedPlay<'_>) {
        self.plays += 1;
        self.epa_sum += play.epa;
        self.successes += usize::from(play.success);
        self.explosives += usize::from(play.explosive);
        if play.is_pass() {
            self.passes += 1;
            self.sacks += usize::from(play.sacked);
        } else if play.is_run() {
            self.runs += 1;
            self.stuffs += usize::from(play.stuffed());
        }
    }

    fn rates(&self) -> OffenseRates {
        let n = self.plays.max(1) as f64;
        OffenseRates {
            epa_per_play: self.epa_sum / n,
            success_rate: self.successes as f64 / n,
            explosive_rate: self.explosives as f64 / n,
        }
    }

    fn sack_rate(&self) -> Option<f64> {
        (self.passes > 0).then(|| self.sacks as f64 / self.passes.max(1) as f64)
    }

    fn stuff_rate(&self) -> Option<f64> {
        (self.runs > 0).then(|| self.stuffs as f64 / self.runs.max(1) as f64)
    }
}

/// Aggregate a season's play log into per-team offense and defense unit rows,
/// using regular-season plays through `through_week`.
pub fn compute_team_unit_metrics(plays: &[PlayRecord], season: i32, through_week: u32) -> UnitTables {
    compute_team_unit_metrics_with(plays, season, through_week, &TeamWideBroadcast)
}

pub fn compute_team_unit_metrics_with(
    plays: &[PlayRecord],
    season: i32,
    through_week: u32,
    skill_rates: &dyn SkillRateSource,
) -> UnitTables {
    let kept = normalize_plays(plays, season, through_week);
    debug!(
        total = plays.len(),
        kept = kept.len(),
        season,
        through_week,
        "filtered play log"
    );

    let mut by_offense: BTreeMap<&str, SideTally> = BTreeMap::new();
    let mut by_defense: BTreeMap<&str, SideTally> = BTreeMap::new();
    for play in &kept {
        if !play.offense.is_empty() {
            by_offense.entry(play.offense).or_default().push(play);
        }
        if !play.defense.is_empty() {
            by_defense.entry(play.defense).or_default().push(play);
        }
    }

    let offense = offense_rows(&by_offense, skill_rates);
    let defense = defense_rows(&by_defense);
    debug!(
        offense_teams = by_offense.len(),
        defense_teams = by_defense.len(),
        "aggregated unit metrics"
    );
    UnitTables { offense, defense }
}

fn offense_rows(
    by_team: &BTreeMap<&str, SideTally>,
    skill_rates: &dyn SkillRateSource,
) -> Vec<OffenseUnitMetric> {
    let mut out = Vec::with_capacity(by_team.len() * OffenseUnit::ALL.len());
    for (team, tally) in by_team {
        let team_wide = tally.rates();
        for unit in OffenseUnit::SKILL {
            let rates = skill_rates.rates(team, unit, team_wide);
            out.push(OffenseUnitMetric {
                team: (*team).to_string(),
                unit,
                epa_per_play: Some(rates.epa_per_play),
                success_rate: Some(rates.success_rate),
                explosive_rate: Some(rates.explosive_rate),
                pass_block_win: None,
                run_block_win: None,
            });
        }
        out.push(OffenseUnitMetric {
            team: (*team).to_string(),
            unit: OffenseUnit::Ol,
            epa_per_play: None,
            success_rate: None,
            explosive_rate: None,
            pass_block_win: tally.sack_rate().map(|r| 1.0 - r),
            run_block_win: tally.stuff_rate().map(|r| 1.0 - r),
        });
    }
    out
}

fn defense_rows(by_team: &BTreeMap<&str, SideTally>) -> Vec<DefenseUnitMetric> {
    let mut out = Vec::with_capacity(by_team.len() * DefenseUnit::ALL.len());
    for (team, tally) in by_team {
        let allowed = tally.rates();
        let pressure = tally.sack_rate();
        let run_stop = tally.stuff_rate();
        for unit in DefenseUnit::ALL {
            let mut row = DefenseUnitMetric::empty(team, unit);
            match unit {
                DefenseUnit::PassRush => row.pressure_rate = pressure,
                DefenseUnit::RunDefense => {
                    row.explosive_allowed = Some(allowed.explosive_rate);
                    row.run_stop_win = run_stop;
                }
                DefenseUnit::CoverageDb | DefenseUnit::CoverageLb => {
                    row.epa_allowed = Some(allowed.epa_per_play);
                    row.success_allowed = Some(allowed.success_rate);
                    row.explosive_allowed = Some(allowed.explosive_rate);
                }
                DefenseUnit::Dl => row.run_stop_win = run_stop,
            }
            out.push(row);
        }
    }
    out
}
