use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::normalize::{Direction, normalize_by};
use crate::unit_metrics::{DefenseUnit, DefenseUnitMetric, OffenseUnit, OffenseUnitMetric, UnitTables};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OffenseNormalized {
    pub epa: Option<f64>,
    pub success: Option<f64>,
    pub explosive: Option<f64>,
    pub pass_block_win: Option<f64>,
    pub run_block_win: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DefenseNormalized {
    pub epa_allowed: Option<f64>,
    pub success_allowed: Option<f64>,
    pub explosive_allowed: Option<f64>,
    pub pressure: Option<f64>,
    pub run_stop_win: Option<f64>,
    pub coverage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredOffenseRow {
    pub metric: OffenseUnitMetric,
    pub normalized: OffenseNormalized,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDefenseRow {
    pub metric: DefenseUnitMetric,
    pub normalized: DefenseNormalized,
    pub score: Option<f64>,
}

pub fn score_offense(rows: &[OffenseUnitMetric]) -> Vec<ScoredOffenseRow> {
    let epa = normalize_by(rows, |r| r.epa_per_play, Direction::HigherBetter);
    let success = normalize_by(rows, |r| r.success_rate, Direction::HigherBetter);
    let explosive = normalize_by(rows, |r| r.explosive_rate, Direction::HigherBetter);
    let pbw = normalize_by(rows, |r| r.pass_block_win, Direction::HigherBetter);
    let rbw = normalize_by(rows, |r| r.run_block_win, Direction::HigherBetter);

    rows.iter()
        .enumerate()
        .map(|(i, metric)| {
            let normalized = OffenseNormalized {
                epa: epa[i],
                success: success[i],
                explosive: explosive[i],
                pass_block_win: pbw[i],
                run_block_win: rbw[i],
            };
            ScoredOffenseRow {
                metric: metric.clone(),
                normalized,
                score: offense_unit_score(metric.unit, &normalized),
            }
        })
        .collect()
}

pub fn score_defense(rows: &[DefenseUnitMetric]) -> Vec<ScoredDefenseRow> {
    let epa_allowed = normalize_by(rows, |r| r.epa_allowed, Direction::LowerBetter);
    let success_allowed = normalize_by(rows, |r| r.success_allowed, Direction::LowerBetter);
    let explosive_allowed = normalize_by(rows, |r| r.explosive_allowed, Direction::LowerBetter);
    let pressure = normalize_by(rows, |r| r.pressure_rate, Direction::HigherBetter);
    let run_stop_win = normalize_by(rows, |r| r.run_stop_win, Direction::HigherBetter);
    let coverage = normalize_by(rows, |r| r.coverage_grade, Direction::HigherBetter);

    rows.iter()
        .enumerate()
        .map(|(i, metric)| {
            let normalized = DefenseNormalized {
                epa_allowed: epa_allowed[i],
                success_allowed: success_allowed[i],
                explosive_allowed: explosive_allowed[i],
                pressure: pressure[i],
                run_stop_win: run_stop_win[i],
                coverage: coverage[i],
            };
            ScoredDefenseRow {
                metric: metric.clone(),
                normalized,
                score: defense_unit_score(metric.unit, &normalized),
            }
        })
        .collect()
}

pub fn offense_unit_score(unit: OffenseUnit, n: &OffenseNormalized) -> Option<f64> {
    match unit {
        OffenseUnit::Ol => mean_present(&[n.pass_block_win, n.run_block_win]),
        OffenseUnit::Qb | OffenseUnit::Rb | OffenseUnit::Wr | OffenseUnit::Te => {
            mean_present(&[n.epa, n.success, n.explosive])
        }
    }
}

pub fn defense_unit_score(unit: DefenseUnit, n: &DefenseNormalized) -> Option<f64> {
    match unit {
        DefenseUnit::PassRush => mean_present(&[n.pressure]),
        DefenseUnit::RunDefense => {
            mean_present(&[n.run_stop_win, n.explosive_allowed, n.success_allowed])
        }
        DefenseUnit::CoverageDb | DefenseUnit::CoverageLb => mean_present(&[
            n.coverage,
            n.epa_allowed,
            n.success_allowed,
            n.explosive_allowed,
        ]),
        DefenseUnit::Dl => mean_present(&[n.run_stop_win]),
    }
}

/// Mean of the present values; absent (not zero) when nothing is present.
fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.iter().flatten() {
        sum += v;
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}

#[derive(Debug, Clone, Default)]
pub struct UnitScores {
    offense: HashMap<String, [Option<f64>; 5]>,
    defense: HashMap<String, [Option<f64>; 5]>,
}

impl UnitScores {
    pub fn from_scored(offense: &[ScoredOffenseRow], defense: &[ScoredDefenseRow]) -> Self {
        let mut out = Self::default();
        for row in offense {
            let slots = out.offense.entry(row.metric.team.clone()).or_default();
            slots[row.metric.unit.index()] = row.score;
        }
        for row in defense {
            let slots = out.defense.entry(row.metric.team.clone()).or_default();
            slots[row.metric.unit.index()] = row.score;
        }
        debug!(
            offense_teams = out.offense.len(),
            defense_teams = out.defense.len(),
            "built unit score maps"
        );
        out
    }

    pub fn from_tables(tables: &UnitTables) -> Self {
        Self::from_scored(&score_offense(&tables.offense), &score_defense(&tables.defense))
    }

    pub fn offense(&self, team: &str, unit: OffenseUnit) -> Option<f64> {
        self.offense.get(team).and_then(|slots| slots[unit.index()])
    }

    pub fn defense(&self, team: &str, unit: DefenseUnit) -> Option<f64> {
        self.defense.get(team).and_then(|slots| slots[unit.index()])
    }

    pub fn insert_offense(&mut self, team: &str, unit: OffenseUnit, score: Option<f64>) {
        self.offense.entry(team.to_string()).or_default()[unit.index()] = score;
    }

    pub fn insert_defense(&mut self, team: &str, unit: DefenseUnit, score: Option<f64>) {
        self.defense.entry(team.to_string()).or_default()[unit.index()] = score;
    }

    pub fn is_empty(&self) -> bool {
        self.offense.is_empty() && self.defense.is_empty()
    }
}
