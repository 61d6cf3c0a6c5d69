use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ConfigError, ModelConfig, validate_week};
use crate::edge::{TeamEdge, adjusted_edge};
use crate::enrich::{UnitEnricher, apply_enrichers};
use crate::plays::PlayRecord;
use crate::schedule::{ScheduledGame, week_slate};
use crate::unit_metrics::{UnitTables, compute_team_unit_metrics};
use crate::unit_scores::{ScoredDefenseRow, ScoredOffenseRow, UnitScores, score_defense, score_offense};
use crate::verdict::{Verdict, classify, net_edge};

/// Aggregated, enriched and scored unit tables for one (season, week).
/// Read-only once built, so games can be picked in parallel against it.
#[derive(Debug, Clone)]
pub struct WeekModel {
    pub season: i32,
    pub week: u32,
    pub offense: Vec<ScoredOffenseRow>,
    pub defense: Vec<ScoredDefenseRow>,
    pub enrichments_applied: Vec<String>,
    scores: UnitScores,
}

#[derive(Debug, Clone, Serialize)]
pub struct GamePick {
    pub home_team: String,
    pub away_team: String,
    pub gameday: String,
    pub label: String,
    /// Home offense against the away defense.
    pub home: TeamEdge,
    /// Away offense against the home defense.
    pub away: TeamEdge,
    pub net_edge: Option<f64>,
    pub verdict: Verdict,
    pub headline: String,
}

impl WeekModel {
    pub fn build(plays: &[PlayRecord], season: i32, week: u32, enrichers: &[&dyn UnitEnricher]) -> Self {
        let tables = compute_team_unit_metrics(plays, season, week);
        Self::from_tables(tables, season, week, enrichers)
    }

    pub fn from_tables(
        tables: UnitTables,
        season: i32,
        week: u32,
        enrichers: &[&dyn UnitEnricher],
    ) -> Self {
        let (tables, enrichments_applied) = apply_enrichers(tables, enrichers);
        let offense = score_offense(&tables.offense);
        let defense = score_defense(&tables.defense);
        let scores = UnitScores::from_scored(&offense, &defense);
        info!(
            season,
            week,
            offense_rows = offense.len(),
            defense_rows = defense.len(),
            "week model built"
        );
        Self {
            season,
            week,
            offense,
            defense,
            enrichments_applied,
            scores,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.offense.is_empty() && self.defense.is_empty()
    }

    pub fn scores(&self) -> &UnitScores {
        &self.scores
    }

    pub fn side(&self, offense: &str, defense: &str, cfg: &ModelConfig) -> TeamEdge {
        adjusted_edge(
            &self.scores,
            offense,
            defense,
            cfg.dep_strength,
            &cfg.unit_weights,
            &cfg.shares,
        )
    }

    pub fn pick(&self, home: &str, away: &str, cfg: &ModelConfig) -> GamePick {
        let home_side = self.side(home, away, cfg);
        let away_side = self.side(away, home, cfg);
        let net = net_edge(home_side.edge, away_side.edge);
        let verdict = classify(net, cfg.close_margin);
        GamePick {
            home_team: home.to_string(),
            away_team: away.to_string(),
            gameday: String::new(),
            label: format!("{away} @ {home}"),
            home: home_side,
            away: away_side,
            net_edge: net,
            verdict,
            headline: verdict.headline(home, away),
        }
    }

    pub fn pick_game(&self, game: &ScheduledGame, cfg: &ModelConfig) -> GamePick {
        let mut pick = self.pick(&game.home_team, &game.away_team, cfg);
        pick.gameday = game.gameday.clone();
        pick.label = game.label();
        pick
    }

    pub fn picks(&self, games: &[ScheduledGame], cfg: &ModelConfig) -> Vec<GamePick> {
        games.par_iter().map(|g| self.pick_game(g, cfg)).collect()
    }
}

pub fn compute_week_picks(
    plays: &[PlayRecord],
    schedule: &[ScheduledGame],
    season: i32,
    week: u32,
    cfg: &ModelConfig,
    enrichers: &[&dyn UnitEnricher],
) -> Result<(WeekModel, Vec<GamePick>), ConfigError> {
    cfg.validate()?;
    validate_week(week)?;

    let model = WeekModel::build(plays, season, week, enrichers);
    let slate = week_slate(schedule, season, week);
    if slate.is_empty() {
        warn!(season, week, "no regular-season games scheduled");
    }
    if model.is_empty() {
        warn!(season, week, "no plays survived filtering; every pick is insufficient data");
    }
    let picks = model.picks(&slate, cfg);
    info!(season, week, games = picks.len(), "picks computed");
    Ok((model, picks))
}
