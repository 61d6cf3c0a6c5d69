use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::plays::SeasonType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub season: i32,
    pub week: u32,
    #[serde(default = "regular_season")]
    pub game_type: String,
    #[serde(default)]
    pub gameday: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_score: Option<i32>,
    #[serde(default)]
    pub away_score: Option<i32>,
}

fn regular_season() -> String {
    "REG".to_string()
}

impl ScheduledGame {
    pub fn is_regular_season(&self) -> bool {
        SeasonType::from_label(&self.game_type) == Some(SeasonType::Reg)
    }

    pub fn gameday_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.gameday.trim(), "%Y-%m-%d").ok()
    }

    /// "AWAY @ HOME  (gameday)"
    pub fn label(&self) -> String {
        format!("{} @ {}  ({})", self.away_team, self.home_team, self.gameday)
    }

    pub fn home_margin(&self) -> Option<i32> {
        Some(self.home_score? - self.away_score?)
    }
}

/// Regular-season games of one season/week in kickoff-date order.
///
/// Games with an unreadable date go last; equal dates keep schedule order.
pub fn week_slate(schedule: &[ScheduledGame], season: i32, week: u32) -> Vec<ScheduledGame> {
    let mut games: Vec<ScheduledGame> = schedule
        .iter()
        .filter(|g| g.season == season && g.week == week && g.is_regular_season())
        .cloned()
        .collect();
    games.sort_by_key(|g| match g.gameday_date() {
        Some(d) => (0, Some(d)),
        None => (1, None),
    });
    games
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(week: u32, game_type: &str, day: &str, home: &str, away: &str) -> ScheduledGame {
        ScheduledGame {
            season: 2025,
            week,
            game_type: game_type.to_string(),
            gameday: day.to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score: None,
            away_score: None,
        }
    }

    #[test]
    fn slate_filters_and_orders_by_date() {
        let schedule = vec![
            game(3, "REG", "2025-09-21", "KC", "NYG"),
            game(3, "REG", "TBD", "DEN", "LAC"),
            game(3, "REG", "2025-09-18", "BUF", "MIA"),
            game(4, "REG", "2025-09-25", "ARI", "SEA"),
            game(3, "POST", "2025-09-19", "PHI", "DAL"),
            game(3, "REG", "2025-09-21", "GB", "CLE"),
        ];
        let slate = week_slate(&schedule, 2025, 3);
        let homes: Vec<&str> = slate.iter().map(|g| g.home_team.as_str()).collect();
        assert_eq!(homes, vec!["BUF", "KC", "GB", "DEN"]);
    }

    #[test]
    fn label_and_margin() {
        let mut g = game(1, "REG", "2025-09-07", "KC", "LAC");
        assert_eq!(g.label(), "LAC @ KC  (2025-09-07)");
        assert_eq!(g.home_margin(), None);
        g.home_score = Some(21);
        g.away_score = Some(27);
        assert_eq!(g.home_margin(), Some(-6));
    }

    #[test]
    fn game_type_defaults_to_regular_season() {
        let g: ScheduledGame = serde_json::from_str(
            r#"{"season":2025,"week":2,"home_team":"KC","away_team":"PHI"}"#,
        )
        .unwrap();
        assert!(g.is_regular_season());
        assert_eq!(g.gameday_date(), None);
    }
}
