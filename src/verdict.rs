use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    HomeFavored,
    AwayFavored,
    TooClose,
    InsufficientData,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Self::HomeFavored => "home favored",
            Self::AwayFavored => "away favored",
            Self::TooClose => "too close to call",
            Self::InsufficientData => "insufficient data",
        }
    }

    pub fn headline(self, home: &str, away: &str) -> String {
        match self {
            Self::HomeFavored => format!("{home} should win over {away}"),
            Self::AwayFavored => format!("{away} should win over {home}"),
            Self::TooClose => "Too close to call".to_string(),
            Self::InsufficientData => "Insufficient data".to_string(),
        }
    }

    pub fn is_directional(self) -> bool {
        matches!(self, Self::HomeFavored | Self::AwayFavored)
    }
}

pub fn net_edge(home_edge: Option<f64>, away_edge: Option<f64>) -> Option<f64> {
    Some(home_edge? - away_edge?)
}

pub fn classify(net: Option<f64>, close_margin: f64) -> Verdict {
    match net {
        None => Verdict::InsufficientData,
        Some(n) if n.is_nan() => Verdict::InsufficientData,
        Some(n) if n > close_margin => Verdict::HomeFavored,
        Some(n) if n < -close_margin => Verdict::AwayFavored,
        Some(_) => Verdict::TooClose,
    }
}
