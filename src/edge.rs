use serde::{Deserialize, Serialize};

use crate::matchup::{ShareWeights, UnitEdges, unit_edges};
use crate::unit_metrics::OffenseUnit;
use crate::unit_scores::UnitScores;

const TTF_BASE: f64 = 0.6;
const TTF_SLOPE: f64 = 0.4;
const TTF_MIN: f64 = 0.2;
const TTF_MAX: f64 = 1.0;

/// Roll-up weights for the five offensive units. Zero drops a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitWeights {
    pub qb: f64,
    pub rb: f64,
    pub wr: f64,
    pub te: f64,
    pub ol: f64,
}

impl Default for UnitWeights {
    fn default() -> Self {
        Self {
            qb: 1.2,
            rb: 0.7,
            wr: 1.1,
            te: 0.6,
            ol: 1.1,
        }
    }
}

impl UnitWeights {
    pub fn get(&self, unit: OffenseUnit) -> f64 {
        match unit {
            OffenseUnit::Qb => self.qb,
            OffenseUnit::Rb => self.rb,
            OffenseUnit::Wr => self.wr,
            OffenseUnit::Te => self.te,
            OffenseUnit::Ol => self.ol,
        }
    }

    pub fn only(unit: OffenseUnit, weight: f64) -> Self {
        let mut w = Self {
            qb: 0.0,
            rb: 0.0,
            wr: 0.0,
            te: 0.0,
            ol: 0.0,
        };
        match unit {
            OffenseUnit::Qb => w.qb = weight,
            OffenseUnit::Rb => w.rb = weight,
            OffenseUnit::Wr => w.wr = weight,
            OffenseUnit::Te => w.te = weight,
            OffenseUnit::Ol => w.ol = weight,
        }
        w
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamEdge {
    pub edge: Option<f64>,
    pub raw: UnitEdges,
    pub adjusted: UnitEdges,
    pub ttf: f64,
}

/// Trench-to-finish factor: how much of the passing-game edge survives
/// the line battle. Neutral 1.0 when the OL edge is unknown.
pub fn trench_to_finish(ol_edge: Option<f64>, dep_strength: f64) -> f64 {
    match ol_edge {
        None => 1.0,
        Some(e) => (TTF_BASE + TTF_SLOPE * e * dep_strength).clamp(TTF_MIN, TTF_MAX),
    }
}

pub fn apply_ttf(raw: &UnitEdges, ttf: f64) -> UnitEdges {
    UnitEdges {
        qb: raw.qb.map(|v| v * ttf),
        rb: raw.rb,
        wr: raw.wr.map(|v| v * ttf),
        te: raw.te.map(|v| v * ttf),
        ol: raw.ol,
    }
}

pub fn weighted_team_edge(edges: &UnitEdges, weights: &UnitWeights) -> Option<f64> {
    let mut total = 0.0;
    let mut wsum = 0.0;
    let mut qualifying = Vec::with_capacity(OffenseUnit::ALL.len());
    for (unit, edge) in edges.iter() {
        let w = weights.get(unit);
        let Some(v) = edge else { continue };
        if w > 0.0 {
            total += w * v;
            wsum += w;
            qualifying.push(v);
        }
    }
    match qualifying.as_slice() {
        [] => None,
        // a lone unit is returned untouched so w * v / w rounding never leaks in
        [only] => Some(*only),
        _ => Some(total / wsum),
    }
}

pub fn adjusted_edge(
    scores: &UnitScores,
    offense: &str,
    defense: &str,
    dep_strength: f64,
    weights: &UnitWeights,
    shares: &ShareWeights,
) -> TeamEdge {
    let raw = unit_edges(scores, offense, defense, shares);
    let ttf = trench_to_finish(raw.ol, dep_strength);
    let adjusted = apply_ttf(&raw, ttf);
    TeamEdge {
        edge: weighted_team_edge(&adjusted, weights),
        raw,
        adjusted,
        ttf,
    }
}
