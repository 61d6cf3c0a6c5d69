use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ConfigError, LAST_REGULAR_WEEK, ModelConfig, validate_week};
use crate::enrich::UnitEnricher;
use crate::picks::WeekModel;
use crate::plays::PlayRecord;
use crate::schedule::{ScheduledGame, week_slate};
use crate::verdict::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickResult {
    Hit,
    Miss,
    /// Directional call on a game that ended level.
    Push,
    NoCall,
    Insufficient,
    Pending,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradedPick {
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
    pub net_edge: Option<f64>,
    pub verdict: Verdict,
    pub home_margin: Option<i32>,
    pub result: PickResult,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestReport {
    pub games: usize,
    pub directional: usize,
    pub hits: usize,
    pub misses: usize,
    pub pushes: usize,
    pub no_calls: usize,
    pub insufficient: usize,
    pub pending: usize,
}

impl BacktestReport {
    pub fn accuracy(&self) -> Option<f64> {
        let decided = self.hits + self.misses;
        (decided > 0).then(|| self.hits as f64 / decided as f64)
    }

    fn record(&mut self, result: PickResult) {
        self.games += 1;
        match result {
            PickResult::Hit => {
                self.directional += 1;
                self.hits += 1;
            }
            PickResult::Miss => {
                self.directional += 1;
                self.misses += 1;
            }
            PickResult::Push => {
                self.directional += 1;
                self.pushes += 1;
            }
            PickResult::NoCall => self.no_calls += 1,
            PickResult::Insufficient => self.insufficient += 1,
            PickResult::Pending => self.pending += 1,
        }
    }
}

pub fn grade(verdict: Verdict, home_margin: Option<i32>) -> PickResult {
    match (verdict, home_margin) {
        (Verdict::InsufficientData, _) => PickResult::Insufficient,
        (Verdict::TooClose, _) => PickResult::NoCall,
        (_, None) => PickResult::Pending,
        (_, Some(0)) => PickResult::Push,
        (Verdict::HomeFavored, Some(m)) => {
            if m > 0 {
                PickResult::Hit
            } else {
                PickResult::Miss
            }
        }
        (Verdict::AwayFavored, Some(m)) => {
            if m < 0 {
                PickResult::Hit
            } else {
                PickResult::Miss
            }
        }
    }
}

/// Weeks a backtest actually grades. Week 1 has no prior data to learn
/// from and nothing past the regular season is picked.
pub fn backtest_weeks(from_week: u32, to_week: u32) -> RangeInclusive<u32> {
    from_week.max(2)..=to_week.min(LAST_REGULAR_WEEK)
}

/// Pick every week in `from_week..=to_week` using only plays from earlier
/// weeks, then grade the calls against final scores.
pub fn run_backtest(
    plays: &[PlayRecord],
    schedule: &[ScheduledGame],
    season: i32,
    from_week: u32,
    to_week: u32,
    cfg: &ModelConfig,
    enrichers: &[&dyn UnitEnricher],
) -> Result<(BacktestReport, Vec<GradedPick>), ConfigError> {
    cfg.validate()?;
    let weeks = backtest_weeks(from_week, to_week);
    validate_week(*weeks.start())?;
    validate_week(*weeks.end())?;

    let mut report = BacktestReport::default();
    let mut graded = Vec::new();
    for week in weeks {
        let slate = week_slate(schedule, season, week);
        if slate.is_empty() {
            debug!(season, week, "empty slate, skipping");
            continue;
        }
        let model = WeekModel::build(plays, season, week - 1, enrichers);
        for (pick, game) in model.picks(&slate, cfg).into_iter().zip(&slate) {
            let home_margin = game.home_margin();
            let result = grade(pick.verdict, home_margin);
            report.record(result);
            graded.push(GradedPick {
                week,
                home_team: pick.home_team,
                away_team: pick.away_team,
                net_edge: pick.net_edge,
                verdict: pick.verdict,
                home_margin,
                result,
            });
        }
    }
    info!(
        season,
        games = report.games,
        hits = report.hits,
        misses = report.misses,
        "backtest complete"
    );
    Ok((report, graded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_rules() {
        assert_eq!(grade(Verdict::HomeFavored, Some(3)), PickResult::Hit);
        assert_eq!(grade(Verdict::HomeFavored, Some(-3)), PickResult::Miss);
        assert_eq!(grade(Verdict::AwayFavored, Some(-7)), PickResult::Hit);
        assert_eq!(grade(Verdict::AwayFavored, Some(0)), PickResult::Push);
        assert_eq!(grade(Verdict::AwayFavored, None), PickResult::Pending);
        assert_eq!(grade(Verdict::TooClose, Some(10)), PickResult::NoCall);
        assert_eq!(grade(Verdict::InsufficientData, Some(10)), PickResult::Insufficient);
    }

    #[test]
    fn accuracy_ignores_undecided() {
        let mut report = BacktestReport::default();
        assert_eq!(report.accuracy(), None);
        for r in [PickResult::Hit, PickResult::Hit, PickResult::Miss, PickResult::Push, PickResult::NoCall] {
            report.record(r);
        }
        assert_eq!(report.games, 5);
        assert_eq!(report.directional, 4);
        assert_eq!(report.accuracy(), Some(2.0 / 3.0));
    }

    #[test]
    fn weeks_stop_at_the_regular_season() {
        assert_eq!(backtest_weeks(1, 25), 2..=LAST_REGULAR_WEEK);
        assert_eq!(backtest_weeks(5, 9), 5..=9);

        let schedule: Vec<ScheduledGame> = serde_json::from_str(
            r#"[
                {"season": 2025, "week": 18, "game_type": "REG", "gameday": "2026-01-04",
                 "home_team": "KC", "away_team": "LV", "home_score": 24, "away_score": 10},
                {"season": 2025, "week": 19, "game_type": "REG", "gameday": "2026-01-11",
                 "home_team": "KC", "away_team": "BUF", "home_score": 27, "away_score": 24}
            ]"#,
        )
        .unwrap();
        let (report, graded) =
            run_backtest(&[], &schedule, 2025, 17, 25, &ModelConfig::default(), &[]).unwrap();
        assert_eq!(report.games, 1);
        assert!(graded.iter().all(|g| g.week <= LAST_REGULAR_WEEK));
    }
}
