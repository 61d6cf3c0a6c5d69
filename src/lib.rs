pub mod backtest;
pub mod config;
pub mod edge;
pub mod enrich;
pub mod export;
pub mod matchup;
pub mod normalize;
pub mod picks;
pub mod play_source;
pub mod plays;
pub mod schedule;
pub mod unit_metrics;
pub mod unit_scores;
pub mod verdict;
