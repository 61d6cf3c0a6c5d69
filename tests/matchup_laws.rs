use gridiron_edge::config::ModelConfig;
use gridiron_edge::edge::{UnitWeights, adjusted_edge};
use gridiron_edge::enrich::NoEnrichment;
use gridiron_edge::matchup::ShareWeights;
use gridiron_edge::picks::WeekModel;
use gridiron_edge::plays::{PlayRecord, PlayType, SeasonType};
use gridiron_edge::unit_metrics::{OffenseUnit, compute_team_unit_metrics};
use gridiron_edge::unit_scores::UnitScores;
use gridiron_edge::verdict::Verdict;

fn play(offense: &str, defense: &str, play_type: PlayType, epa: f64, yards: f64, sack: f64) -> PlayRecord {
    PlayRecord {
        season: 2025,
        week: 1,
        season_type: SeasonType::Reg,
        offense: offense.to_string(),
        defense: defense.to_string(),
        play_type,
        epa: Some(epa),
        yards_gained: yards,
        air_yards: Some(6.0),
        sack: Some(sack),
    }
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

#[test]
fn clean_offense_wins_every_block_and_every_down() {
    let mut plays = Vec::new();
    for _ in 0..100 {
        plays.push(play("KC", "LV", PlayType::Pass, 0.3, 8.0, 0.0));
        plays.push(play("KC", "LV", PlayType::Run, 0.1, 4.0, 0.0));
    }
    let tables = compute_team_unit_metrics(&plays, 2025, 1);

    let ol = tables.offense_row("KC", OffenseUnit::Ol).expect("KC OL");
    assert_eq!(ol.pass_block_win, Some(1.0));
    assert_eq!(ol.run_block_win, Some(1.0));
    for unit in OffenseUnit::SKILL {
        let row = tables.offense_row("KC", unit).expect("skill row");
        assert_eq!(row.success_rate, Some(1.0));
        assert!(close(row.epa_per_play, 0.2));
    }
}

#[test]
fn future_season_has_no_data() {
    let plays = vec![play("KC", "LV", PlayType::Pass, 0.3, 8.0, 0.0)];
    let tables = compute_team_unit_metrics(&plays, 2099, 1);
    assert!(tables.is_empty());

    let model = WeekModel::build(&plays, 2099, 1, &[&NoEnrichment]);
    assert!(model.is_empty());
    let pick = model.pick("KC", "LV", &ModelConfig::default());
    assert_eq!(pick.verdict, Verdict::InsufficientData);
    assert_eq!(pick.net_edge, None);
}

fn mirror_season() -> Vec<PlayRecord> {
    let mut plays = Vec::new();
    for (off, def) in [("AAA", "BBB"), ("BBB", "AAA")] {
        plays.push(play(off, def, PlayType::Pass, 0.4, 12.0, 0.0));
        plays.push(play(off, def, PlayType::Pass, -0.7, -6.0, 1.0));
        plays.push(play(off, def, PlayType::Run, 0.2, 5.0, 0.0));
        plays.push(play(off, def, PlayType::Run, -0.3, 0.0, 0.0));
    }
    plays
}

#[test]
fn identical_teams_are_too_close_to_call() {
    let model = WeekModel::build(&mirror_season(), 2025, 1, &[&NoEnrichment]);
    assert_eq!(model.scores().offense("AAA", OffenseUnit::Qb), Some(0.5));
    let pick = model.pick("AAA", "BBB", &ModelConfig::default());

    for side in [&pick.home, &pick.away] {
        for (_, edge) in side.raw.iter() {
            assert!(close(edge, 0.0));
        }
        assert!((side.ttf - 0.6).abs() < 1e-9);
    }
    assert!(close(pick.net_edge, 0.0));
    assert_eq!(pick.verdict, Verdict::TooClose);
}

#[test]
fn swapping_home_and_away_negates_the_net_edge() {
    let mut plays = mirror_season();
    plays.push(play("AAA", "BBB", PlayType::Pass, 1.5, 40.0, 0.0));
    plays.push(play("AAA", "BBB", PlayType::Run, 0.9, 15.0, 0.0));
    let model = WeekModel::build(&plays, 2025, 1, &[&NoEnrichment]);
    let cfg = ModelConfig::default();

    let forward = model.pick("AAA", "BBB", &cfg);
    let reverse = model.pick("BBB", "AAA", &cfg);
    let (f, r) = (forward.net_edge.unwrap(), reverse.net_edge.unwrap());
    assert!((f + r).abs() < 1e-12);
    assert_eq!(forward.verdict, Verdict::HomeFavored);
    assert_eq!(reverse.verdict, Verdict::AwayFavored);
    assert_eq!(reverse.headline, "AAA should win over BBB");
}

#[test]
fn lone_weighted_unit_is_the_team_edge() {
    let scores = UnitScores::from_tables(&compute_team_unit_metrics(&mirror_season(), 2025, 1));
    let shares = ShareWeights::default();
    let full = adjusted_edge(&scores, "AAA", "BBB", 1.0, &UnitWeights::default(), &shares);
    let qb_only = adjusted_edge(
        &scores,
        "AAA",
        "BBB",
        1.0,
        &UnitWeights::only(OffenseUnit::Qb, 3.0),
        &shares,
    );
    assert_eq!(qb_only.edge, full.adjusted.qb);
}

#[test]
fn missing_defense_scores_subtract_nothing() {
    let mut scores = UnitScores::default();
    for unit in OffenseUnit::ALL {
        scores.insert_offense("NE", unit, Some(0.8));
    }
    let side = adjusted_edge(&scores, "NE", "NYG", 1.0, &UnitWeights::default(), &ShareWeights::default());
    assert!(close(side.raw.qb, 0.8));
    assert!(close(side.raw.rb, 0.8));
    assert!(close(side.raw.te, 0.8));
    assert!(close(side.raw.ol, 0.8));
    // WR needs the coverage score as well
    assert_eq!(side.raw.wr, None);
    assert!((side.ttf - 0.92).abs() < 1e-9);
    assert!(close(side.adjusted.qb, 0.8 * 0.92));
    assert!(close(side.adjusted.rb, 0.8));
}

#[test]
fn zero_dependency_strength_fixes_the_trench_factor() {
    let mut plays = mirror_season();
    plays.push(play("AAA", "BBB", PlayType::Run, 0.5, 9.0, 0.0));
    let model = WeekModel::build(&plays, 2025, 1, &[&NoEnrichment]);
    let cfg = ModelConfig {
        dep_strength: 0.0,
        ..ModelConfig::default()
    };
    let pick = model.pick("AAA", "BBB", &cfg);
    assert!((pick.home.ttf - 0.6).abs() < 1e-12);
    assert!((pick.away.ttf - 0.6).abs() < 1e-12);
}
