use serde::{Deserialize, Serialize};

use crate::unit_metrics::{DefenseUnit, OffenseUnit};
use crate::unit_scores::UnitScores;

/// How each offensive unit's opponent blend is split between two defensive units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareWeights {
    /// QB: coverage (DB) share; the rest goes to the pass rush.
    pub qb_cov_share: f64,
    /// RB: run defense share; the rest goes to linebacker coverage.
    pub rb_run_share: f64,
    /// TE: linebacker coverage share; the rest goes to DB coverage.
    pub te_covlb_share: f64,
    /// OL: pass rush share; the rest goes to run defense.
    pub ol_pass_share: f64,
}

impl Default for ShareWeights {
    fn default() -> Self {
        Self {
            qb_cov_share: 0.60,
            rb_run_share: 0.65,
            te_covlb_share: 0.55,
            ol_pass_share: 0.60,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitEdges {
    pub qb: Option<f64>,
    pub rb: Option<f64>,
    pub wr: Option<f64>,
    pub te: Option<f64>,
    pub ol: Option<f64>,
}

impl UnitEdges {
    pub fn get(&self, unit: OffenseUnit) -> Option<f64> {
        match unit {
            OffenseUnit::Qb => self.qb,
            OffenseUnit::Rb => self.rb,
            OffenseUnit::Wr => self.wr,
            OffenseUnit::Te => self.te,
            OffenseUnit::Ol => self.ol,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (OffenseUnit, Option<f64>)> + '_ {
        OffenseUnit::ALL.into_iter().map(|u| (u, self.get(u)))
    }
}

pub fn unit_edges(scores: &UnitScores, offense: &str, defense: &str, shares: &ShareWeights) -> UnitEdges {
    let off = |unit| scores.offense(offense, unit);
    let def = |unit| scores.defense(defense, unit);

    UnitEdges {
        qb: blended_edge(
            off(OffenseUnit::Qb),
            def(DefenseUnit::CoverageDb),
            def(DefenseUnit::PassRush),
            shares.qb_cov_share,
        ),
        rb: blended_edge(
            off(OffenseUnit::Rb),
            def(DefenseUnit::RunDefense),
            def(DefenseUnit::CoverageLb),
            shares.rb_run_share,
        ),
        // Unlike the blended units, WR needs both sides present.
        wr: match (off(OffenseUnit::Wr), def(DefenseUnit::CoverageDb)) {
            (Some(o), Some(d)) => Some(o - d),
            _ => None,
        },
        te: blended_edge(
            off(OffenseUnit::Te),
            def(DefenseUnit::CoverageLb),
            def(DefenseUnit::CoverageDb),
            shares.te_covlb_share,
        ),
        ol: blended_edge(
            off(OffenseUnit::Ol),
            def(DefenseUnit::PassRush),
            def(DefenseUnit::RunDefense),
            shares.ol_pass_share,
        ),
    }
}

/// `off - (primary * share + secondary * (1 - share))`, where an absent
/// defensive term subtracts nothing. Absent only when `off` is.
fn blended_edge(off: Option<f64>, primary: Option<f64>, secondary: Option<f64>, share: f64) -> Option<f64> {
    let off = off?;
    let primary_term = primary.map_or(0.0, |d| d * share);
    let secondary_term = secondary.map_or(0.0, |d| d * (1.0 - share));
    Some(off - primary_term - secondary_term)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-12)
    }

    fn scores() -> UnitScores {
        let mut s = UnitScores::default();
        for (unit, v) in [
            (OffenseUnit::Qb, 0.8),
            (OffenseUnit::Rb, 0.6),
            (OffenseUnit::Wr, 0.7),
            (OffenseUnit::Te, 0.5),
            (OffenseUnit::Ol, 0.9),
        ] {
            s.insert_offense("KC", unit, Some(v));
        }
        for (unit, v) in [
            (DefenseUnit::PassRush, 0.4),
            (DefenseUnit::RunDefense, 0.3),
            (DefenseUnit::CoverageDb, 0.5),
            (DefenseUnit::CoverageLb, 0.2),
            (DefenseUnit::Dl, 0.1),
        ] {
            s.insert_defense("BUF", unit, Some(v));
        }
        s
    }

    #[test]
    fn blends_defensive_units_by_share() {
        let shares = ShareWeights::default();
        let e = unit_edges(&scores(), "KC", "BUF", &shares);
        assert!(close(e.qb, 0.8 - (0.5 * 0.6 + 0.4 * 0.4)));
        assert!(close(e.rb, 0.6 - (0.3 * 0.65 + 0.2 * 0.35)));
        assert!(close(e.wr, 0.7 - 0.5));
        assert!(close(e.te, 0.5 - (0.2 * 0.55 + 0.5 * 0.45)));
        assert!(close(e.ol, 0.9 - (0.4 * 0.6 + 0.3 * 0.4)));
    }

    #[test]
    fn missing_defense_term_subtracts_nothing_except_for_wr() {
        let mut s = scores();
        s.insert_defense("BUF", DefenseUnit::CoverageDb, None);
        let e = unit_edges(&s, "KC", "BUF", &ShareWeights::default());
        assert!(close(e.qb, 0.8 - 0.4 * 0.4));
        assert_eq!(e.wr, None);
        assert!(close(e.te, 0.5 - 0.2 * 0.55));
    }

    #[test]
    fn unknown_teams_read_as_absent() {
        let e = unit_edges(&scores(), "NYJ", "BUF", &ShareWeights::default());
        assert_eq!(e, UnitEdges::default());

        let e = unit_edges(&scores(), "KC", "NYJ", &ShareWeights::default());
        assert_eq!(e.qb, Some(0.8));
        assert_eq!(e.ol, Some(0.9));
        assert_eq!(e.wr, None);
    }
}
