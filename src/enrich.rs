use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::unit_metrics::{DefenseUnit, UnitTables};

#[derive(Debug, Clone)]
pub struct Enriched {
    pub tables: UnitTables,
    pub applied: bool,
}

/// Post-aggregation hook that may fill columns the play log cannot
/// produce (for example external coverage grades). Runs before
/// normalization.
pub trait UnitEnricher: Send + Sync {
    fn name(&self) -> &str;
    fn enrich(&self, tables: UnitTables) -> Enriched;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

impl UnitEnricher for NoEnrichment {
    fn name(&self) -> &str {
        "none"
    }

    fn enrich(&self, tables: UnitTables) -> Enriched {
        Enriched {
            tables,
            applied: false,
        }
    }
}

/// External coverage grades keyed by team, then by coverage unit label
/// (`CoverageDB` / `CoverageLB`).
///
/// Labels match case-insensitively. When several spellings name the same
/// unit, the canonical one wins, otherwise the first in sorted order.
#[derive(Debug, Clone, Default)]
pub struct CoverageGradeOverlay {
    grades: HashMap<(String, DefenseUnit), f64>,
}

impl CoverageGradeOverlay {
    pub fn new(grades: HashMap<String, HashMap<String, f64>>) -> Self {
        let mut resolved = HashMap::new();
        let teams: BTreeMap<String, HashMap<String, f64>> = grades.into_iter().collect();
        for (team, units) in teams {
            let labels: BTreeMap<String, f64> = units.into_iter().collect();
            let mut chosen: BTreeMap<DefenseUnit, (String, f64)> = BTreeMap::new();
            for (label, grade) in labels {
                let unit = match DefenseUnit::from_label(&label) {
                    Some(unit @ (DefenseUnit::CoverageDb | DefenseUnit::CoverageLb)) => unit,
                    _ => {
                        warn!(team = %team, unit = %label, "ignoring grade for non-coverage unit");
                        continue;
                    }
                };
                if !grade.is_finite() {
                    warn!(team = %team, unit = %label, "ignoring non-finite coverage grade");
                    continue;
                }
                let earlier = chosen.get(&unit).map(|(kept, _)| kept.clone());
                match earlier {
                    None => {
                        chosen.insert(unit, (label, grade));
                    }
                    Some(earlier) if label == unit.label() => {
                        warn!(team = %team, ignored = %earlier, kept = %label, "duplicate coverage grade label");
                        chosen.insert(unit, (label, grade));
                    }
                    Some(earlier) => {
                        warn!(team = %team, ignored = %label, kept = %earlier, "duplicate coverage grade label");
                    }
                }
            }
            for (unit, (_, grade)) in chosen {
                resolved.insert((team.clone(), unit), grade);
            }
        }
        Self { grades: resolved }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let grades = serde_json::from_str(&raw)
            .with_context(|| format!("parse coverage grades {}", path.display()))?;
        Ok(Self::new(grades))
    }

    fn grade_for(&self, team: &str, unit: DefenseUnit) -> Option<f64> {
        self.grades.get(&(team.to_string(), unit)).copied()
    }
}

impl UnitEnricher for CoverageGradeOverlay {
    fn name(&self) -> &str {
        "coverage-grades"
    }

    fn enrich(&self, mut tables: UnitTables) -> Enriched {
        let teams: BTreeSet<&str> = self.grades.keys().map(|(team, _)| team.as_str()).collect();
        for team in teams {
            if !tables.defense.iter().any(|r| r.team == team) {
                warn!(team = %team, "coverage grade for a team with no defensive plays");
            }
        }

        let mut filled = 0usize;
        for row in &mut tables.defense {
            if let Some(grade) = self.grade_for(&row.team, row.unit) {
                row.coverage_grade = Some(grade);
                filled += 1;
            }
        }
        debug!(filled, "applied coverage grades");
        Enriched {
            tables,
            applied: filled > 0,
        }
    }
}

pub fn apply_enrichers(mut tables: UnitTables, enrichers: &[&dyn UnitEnricher]) -> (UnitTables, Vec<String>) {
    let mut applied = Vec::new();
    for enricher in enrichers {
        let out = enricher.enrich(tables);
        tables = out.tables;
        if out.applied {
            applied.push(enricher.name().to_string());
        }
    }
    (tables, applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plays::{PlayRecord, PlayType, SeasonType};
    use crate::unit_metrics::compute_team_unit_metrics;

    fn tables() -> UnitTables {
        let plays = vec![PlayRecord {
            season: 2025,
            week: 1,
            season_type: SeasonType::Reg,
            offense: "KC".to_string(),
            defense: "BUF".to_string(),
            play_type: PlayType::Pass,
            epa: Some(0.4),
            yards_gained: 9.0,
            air_yards: Some(7.0),
            sack: Some(0.0),
        }];
        compute_team_unit_metrics(&plays, 2025, 1)
    }

    #[test]
    fn no_enrichment_is_identity() {
        let before = tables();
        let out = NoEnrichment.enrich(before.clone());
        assert!(!out.applied);
        assert_eq!(out.tables, before);
    }

    #[test]
    fn overlay_fills_coverage_rows_only() {
        let mut units = HashMap::new();
        units.insert("CoverageDB".to_string(), 72.5);
        units.insert("PassRush".to_string(), 90.0);
        let mut grades = HashMap::new();
        grades.insert("BUF".to_string(), units);
        let overlay = CoverageGradeOverlay::new(grades);

        let out = overlay.enrich(tables());
        assert!(out.applied);
        let db = out.tables.defense_row("BUF", DefenseUnit::CoverageDb).unwrap();
        assert_eq!(db.coverage_grade, Some(72.5));
        let lb = out.tables.defense_row("BUF", DefenseUnit::CoverageLb).unwrap();
        assert_eq!(lb.coverage_grade, None);
        let rush = out.tables.defense_row("BUF", DefenseUnit::PassRush).unwrap();
        assert_eq!(rush.coverage_grade, None);
    }

    #[test]
    fn canonical_label_wins_over_case_variants() {
        for _ in 0..16 {
            let units: HashMap<String, f64> = [
                ("COVERAGEDB".to_string(), 5.0),
                ("coveragedb".to_string(), 10.0),
                ("CoverageDB".to_string(), 72.5),
                ("COVERAGELB".to_string(), 40.0),
                ("coveragelb".to_string(), 35.0),
                ("CoverageLB".to_string(), f64::NAN),
            ]
            .into_iter()
            .collect();
            let overlay = CoverageGradeOverlay::new([("BUF".to_string(), units)].into_iter().collect());
            let out = overlay.enrich(tables());
            let db = out.tables.defense_row("BUF", DefenseUnit::CoverageDb).unwrap();
            assert_eq!(db.coverage_grade, Some(72.5));
            // the canonical LB grade is unusable, so the first sorted spelling stands
            let lb = out.tables.defense_row("BUF", DefenseUnit::CoverageLb).unwrap();
            assert_eq!(lb.coverage_grade, Some(40.0));
        }
    }

    #[test]
    fn chain_reports_applied_names() {
        let mut units = HashMap::new();
        units.insert("CoverageLB".to_string(), 60.0);
        let overlay = CoverageGradeOverlay::new([("BUF".to_string(), units)].into_iter().collect());
        let (out, applied) = apply_enrichers(tables(), &[&NoEnrichment, &overlay]);
        assert_eq!(applied, vec!["coverage-grades".to_string()]);
        assert!(out.defense_row("BUF", DefenseUnit::CoverageLb).unwrap().coverage_grade.is_some());

        let (_, applied) = apply_enrichers(tables(), &[&CoverageGradeOverlay::default()]);
        assert!(applied.is_empty());
    }
}
