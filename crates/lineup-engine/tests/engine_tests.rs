// Integration tests for the lineup engine.
//
// These drive the public API end to end: collaborators feed a roster and
// projections into `LineupEngine`, and the tests check the optimal lineup,
// the move chains, the point totals and the waiver recommendations.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;

use lineup_engine::config::EngineConfig;
use lineup_engine::lineup::{Player, Position, RosterSnapshot, Slot, SlotRequirements};
use lineup_engine::optimizer::{diff_lineups, LineupEngine, MoveKind, OptimalLineup};
use lineup_engine::projections::{ProjectionRecord, ProjectionTable};
use lineup_engine::provider::{
    CsvProjectionSource, CsvWaiverPool, JsonRosterProvider, ProjectionSource, RosterProvider,
    WaiverPoolProvider,
};
use lineup_engine::waiver::WaiverCandidate;
use lineup_engine::EngineError;

// ===========================================================================
// Test helpers
// ===========================================================================

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> String {
    format!("{FIXTURES}/{name}")
}

fn player(id: &str, position: Position, slot: &str) -> Player {
    Player {
        id: id.into(),
        name: id.to_uppercase(),
        position,
        team: String::new(),
        projection_key: id.into(),
        current_slot: Some(slot.into()),
        is_starter: slot != "BN",
    }
}

fn ppr(points: f64) -> ProjectionRecord {
    ProjectionRecord {
        pts_ppr: Some(points),
        pts_half_ppr: None,
        pts_std: None,
    }
}

fn labels(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

struct StaticProjections {
    records: HashMap<String, ProjectionRecord>,
}

impl StaticProjections {
    fn new(entries: &[(&str, f64)]) -> Self {
        Self {
            records: entries.iter().map(|(k, v)| (k.to_string(), ppr(*v))).collect(),
        }
    }
}

#[async_trait]
impl ProjectionSource for StaticProjections {
    async fn fetch_projections(
        &self,
        _week: u32,
        _year: u32,
    ) -> Result<HashMap<String, ProjectionRecord>, EngineError> {
        Ok(self.records.clone())
    }
}

struct FailingProjections;

#[async_trait]
impl ProjectionSource for FailingProjections {
    async fn fetch_projections(
        &self,
        _week: u32,
        _year: u32,
    ) -> Result<HashMap<String, ProjectionRecord>, EngineError> {
        Err(EngineError::ProjectionUnavailable {
            reason: "connection reset".into(),
        })
    }
}

struct StaticRoster(Option<RosterSnapshot>);

#[async_trait]
impl RosterProvider for StaticRoster {
    async fn current_roster(&self) -> Result<Option<RosterSnapshot>, EngineError> {
        Ok(self.0.clone())
    }
}

struct StaticPool(Vec<WaiverCandidate>);

#[async_trait]
impl WaiverPoolProvider for StaticPool {
    async fn fetch_top_available(
        &self,
        position: Position,
        _week: u32,
        _year: u32,
        limit: usize,
    ) -> Result<Vec<WaiverCandidate>, EngineError> {
        Ok(self
            .0
            .iter()
            .filter(|c| c.position == position)
            .take(limit)
            .cloned()
            .collect())
    }
}

fn engine(
    players: Vec<Player>,
    positions: Option<Vec<String>>,
    projections: &[(&str, f64)],
) -> LineupEngine<StaticProjections, StaticRoster> {
    LineupEngine::new(
        StaticProjections::new(projections),
        StaticRoster(Some(RosterSnapshot {
            players,
            roster_positions: positions,
            lineup_requirements: None,
        })),
        EngineConfig::default(),
    )
}

// ===========================================================================
// Worked scenarios
// ===========================================================================

#[tokio::test]
async fn quarterback_upgrade_is_one_change() {
    let engine = engine(
        vec![
            player("qb1", Position::Quarterback, "QB"),
            player("qb2", Position::Quarterback, "BN"),
        ],
        labels(&["QB", "BN"]),
        &[("qb1", 20.0), ("qb2", 25.0)],
    );

    let result = engine.optimize(5, 2024, None).await.unwrap();
    assert_eq!(result.optimal_lineup.players(Slot::Quarterback)[0].id, "qb2");
    assert_eq!(result.changes.len(), 1);

    let change = &result.changes[0];
    assert_eq!(change.player_out.as_ref().map(|p| p.id.as_str()), Some("qb1"));
    assert_eq!(change.player_in.id, "qb2");
    assert_eq!(change.player_out_projection, Some(20.0));
    assert_eq!(change.player_in_projection, Some(25.0));
    assert!((change.improvement - 5.0).abs() < 1e-9);
    assert!((result.improvement - 5.0).abs() < 1e-9);
}

#[test]
fn open_flex_is_filled_with_a_single_start() {
    let roster = vec![
        player("rb1", Position::RunningBack, "RB"),
        player("wr1", Position::WideReceiver, "WR"),
        player("wr2", Position::WideReceiver, "BN"),
    ];
    let projections: ProjectionTable = [("rb1", 10.0), ("wr1", 12.0), ("wr2", 15.0)]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
    let req = SlotRequirements::new()
        .with(Slot::RunningBack, 1)
        .with(Slot::WideReceiver, 1)
        .with(Slot::Flex, 1);
    let mut slots = BTreeMap::new();
    slots.insert(Slot::RunningBack, vec![roster[0].clone()]);
    slots.insert(Slot::WideReceiver, vec![roster[1].clone()]);
    slots.insert(Slot::Flex, vec![roster[2].clone()]);
    let optimal = OptimalLineup::from_slots(slots);

    let changes = diff_lineups(&roster, &optimal, &projections, &req);
    assert_eq!(changes.len(), 1);
    assert!(changes[0].player_out.is_none());
    assert_eq!(changes[0].position, Slot::Flex);
    assert_eq!(changes[0].chain.steps.len(), 1);
    assert_eq!(changes[0].chain.steps[0].kind, MoveKind::Start);
}

#[tokio::test]
async fn open_flex_through_the_engine_benches_nobody() {
    let engine = engine(
        vec![
            player("rb1", Position::RunningBack, "RB"),
            player("wr1", Position::WideReceiver, "WR"),
            player("wr2", Position::WideReceiver, "BN"),
        ],
        labels(&["RB", "WR", "FLEX"]),
        &[("rb1", 10.0), ("wr1", 12.0), ("wr2", 15.0)],
    );

    let result = engine.optimize(5, 2024, Some("ppr")).await.unwrap();
    assert_eq!(result.changes.len(), 1);
    assert!(result.changes[0].player_out.is_none());
    assert_eq!(result.changes[0].player_in.id, "wr2");
    assert!((result.changes[0].improvement - 15.0).abs() < 1e-9);
    assert!((result.improvement - 15.0).abs() < 1e-9);
    assert!(result.benched.is_empty());
}

#[test]
fn cascading_chain_benches_repositions_then_starts() {
    let roster = vec![
        player("rb1", Position::RunningBack, "RB"),
        player("rb2", Position::RunningBack, "FLEX"),
        player("rb3", Position::RunningBack, "BN"),
        player("wr3", Position::WideReceiver, "BN"),
    ];
    let projections: ProjectionTable = [("rb1", 8.0), ("rb2", 9.0), ("rb3", 14.0), ("wr3", 11.0)]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
    let req = SlotRequirements::new()
        .with(Slot::RunningBack, 1)
        .with(Slot::Flex, 1);
    let mut slots = BTreeMap::new();
    slots.insert(Slot::RunningBack, vec![roster[1].clone()]);
    slots.insert(Slot::Flex, vec![roster[2].clone()]);
    slots.insert(Slot::Bench, vec![roster[0].clone(), roster[3].clone()]);
    let optimal = OptimalLineup::from_slots(slots);

    let changes = diff_lineups(&roster, &optimal, &projections, &req);
    assert_eq!(changes.len(), 1);
    let chain = &changes[0].chain;
    let steps: Vec<(&str, Slot, Slot, MoveKind)> = chain
        .steps
        .iter()
        .map(|s| (s.player.id.as_str(), s.from, s.to, s.kind))
        .collect();
    assert_eq!(
        steps,
        vec![
            ("rb1", Slot::RunningBack, Slot::Bench, MoveKind::Bench),
            ("rb2", Slot::Flex, Slot::RunningBack, MoveKind::Reposition),
            ("rb3", Slot::Bench, Slot::Flex, MoveKind::Start),
        ]
    );
    assert!((chain.net_improvement - 6.0).abs() < 1e-9);
    assert_eq!(changes[0].position, Slot::Flex);
    assert_eq!(changes[0].player_out.as_ref().map(|p| p.id.as_str()), Some("rb1"));
}

#[tokio::test]
async fn waiver_pickup_above_threshold_only() {
    let engine = engine(
        vec![
            player("wr1", Position::WideReceiver, "WR"),
            player("wr2", Position::WideReceiver, "BN"),
        ],
        labels(&["WR", "BN"]),
        &[("wr1", 13.0), ("wr2", 5.0)],
    );
    let pool = StaticPool(vec![
        WaiverCandidate {
            player_id: "fa1".into(),
            name: "Free Agent One".into(),
            position: Position::WideReceiver,
            team: "MIA".into(),
            projected_points: 9.5,
        },
        WaiverCandidate {
            player_id: "fa2".into(),
            name: "Free Agent Two".into(),
            position: Position::WideReceiver,
            team: "NYJ".into(),
            projected_points: 7.0,
        },
    ]);

    let recs = engine.waiver_recommendations(&pool, 5, 2024, None).await.unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].add.player_id, "fa1");
    assert_eq!(recs[0].drop.id, "wr2");
    assert!((recs[0].projected_impact - 4.5).abs() < 1e-9);
    assert!(recs[0].reason.contains("Free Agent One"));
}

// ===========================================================================
// Errors
// ===========================================================================

#[tokio::test]
async fn missing_roster_is_no_team_data() {
    let engine = LineupEngine::new(
        StaticProjections::new(&[]),
        StaticRoster(None),
        EngineConfig::default(),
    );
    let err = engine.optimize(1, 2024, None).await.unwrap_err();
    assert!(matches!(err, EngineError::NoTeamData));
}

#[tokio::test]
async fn empty_roster_is_no_team_data() {
    let engine = LineupEngine::new(
        StaticProjections::new(&[]),
        StaticRoster(Some(RosterSnapshot::default())),
        EngineConfig::default(),
    );
    let err = engine.optimize(1, 2024, None).await.unwrap_err();
    assert!(matches!(err, EngineError::NoTeamData));
}

#[tokio::test]
async fn projection_failure_propagates() {
    let engine = LineupEngine::new(
        FailingProjections,
        StaticRoster(Some(RosterSnapshot {
            players: vec![player("qb1", Position::Quarterback, "QB")],
            roster_positions: None,
            lineup_requirements: None,
        })),
        EngineConfig::default(),
    );
    let err = engine.optimize(1, 2024, None).await.unwrap_err();
    match err {
        EngineError::ProjectionUnavailable { reason } => assert_eq!(reason, "connection reset"),
        other => panic!("expected ProjectionUnavailable, got: {other}"),
    }
}

// ===========================================================================
// Properties
// ===========================================================================

fn big_roster() -> (Vec<Player>, Vec<(String, f64)>) {
    let layout: &[(&str, Position, &str, Option<f64>)] = &[
        ("qb1", Position::Quarterback, "QB", Some(17.0)),
        ("qb2", Position::Quarterback, "SUPER_FLEX", Some(14.5)),
        ("qb3", Position::Quarterback, "BN", Some(21.0)),
        ("rb1", Position::RunningBack, "RB1", Some(12.0)),
        ("rb2", Position::RunningBack, "RB2", Some(6.5)),
        ("rb3", Position::RunningBack, "BN", Some(13.5)),
        ("rb4", Position::RunningBack, "BN", None),
        ("wr1", Position::WideReceiver, "WR1", Some(16.0)),
        ("wr2", Position::WideReceiver, "WR2", Some(8.0)),
        ("wr3", Position::WideReceiver, "FLEX", Some(9.5)),
        ("wr4", Position::WideReceiver, "BN", Some(11.0)),
        ("te1", Position::TightEnd, "TE", Some(7.0)),
        ("te2", Position::TightEnd, "BN", Some(10.0)),
        ("k1", Position::Kicker, "K", Some(8.0)),
        ("def1", Position::Defense, "DEF", Some(-1.0)),
        ("def2", Position::Defense, "BN", Some(6.0)),
    ];
    let players = layout.iter().map(|&(id, pos, slot, _)| player(id, pos, slot)).collect();
    let points = layout
        .iter()
        .filter_map(|&(id, _, _, pts)| pts.map(|p| (id.to_string(), p)))
        .collect();
    (players, points)
}

#[tokio::test]
async fn lineup_properties_hold() {
    let (players, points) = big_roster();
    let points: Vec<(&str, f64)> = points.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let positions = labels(&[
        "QB", "RB", "RB", "WR", "WR", "TE", "SUPER_FLEX", "FLEX", "K", "DEF", "BN", "BN",
    ]);
    let engine = engine(players.clone(), positions, &points);

    let result = engine.optimize(5, 2024, None).await.unwrap();

    // Coverage and legality.
    let mut seen = HashSet::new();
    for (slot, assigned) in result.optimal_lineup.iter() {
        if !slot.is_bench_like() {
            assert!(assigned.len() <= result.requirements.required(slot));
        }
        for p in assigned {
            assert!(seen.insert(p.id.clone()), "{} appears twice", p.id);
            assert!(slot.accepts(p.position), "{} illegal at {slot}", p.id);
        }
    }
    assert_eq!(seen.len(), players.len());

    // Monotonicity.
    assert!(result.projected_points >= result.current_points);
    let change_total: f64 = result.changes.iter().map(|c| c.improvement).sum();
    assert!(change_total > 0.0);

    // Chain validity: benches first, starts last, and replaying the steps
    // in order never puts more players in a slot than it has seats.
    let mut occupancy: HashMap<Slot, usize> = HashMap::new();
    for p in &players {
        let slot = p.normalized_slot().unwrap_or(Slot::Bench);
        *occupancy.entry(slot).or_default() += 1;
    }
    for chain in &result.move_chains {
        for step in &chain.steps {
            if let Some(count) = occupancy.get_mut(&step.from) {
                *count = count.saturating_sub(1);
            }
            let count = occupancy.entry(step.to).or_default();
            *count += 1;
            if !step.to.is_bench_like() {
                assert!(*count <= result.requirements.required(step.to), "{} overbooked", step.to);
            }
        }
        assert_eq!(chain.steps.last().map(|s| s.kind), Some(MoveKind::Start));
        let first_non_bench = chain.steps.iter().position(|s| s.kind != MoveKind::Bench).unwrap();
        assert!(chain.steps[first_non_bench..].iter().all(|s| s.kind != MoveKind::Bench));
    }

    // Determinism.
    let again = engine.optimize(5, 2024, None).await.unwrap();
    assert_eq!(result, again);
}

#[tokio::test]
async fn concurrent_calls_agree() {
    let (players, points) = big_roster();
    let points: Vec<(&str, f64)> = points.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let engine = engine(players, None, &points);

    let (a, b) = tokio::join!(engine.optimize(5, 2024, None), engine.optimize(5, 2024, None));
    assert_eq!(a.unwrap(), b.unwrap());
}

// ===========================================================================
// File-backed collaborators
// ===========================================================================

#[tokio::test]
async fn fixture_roster_end_to_end() {
    let engine = LineupEngine::new(
        CsvProjectionSource::new(fixture("projections.csv")),
        JsonRosterProvider::new(fixture("roster.json")),
        EngineConfig::default(),
    );

    let result = engine.optimize(5, 2024, None).await.unwrap();
    assert!((result.projected_points - 133.3).abs() < 1e-6);
    assert!((result.current_points - 124.5).abs() < 1e-6);
    assert!((result.improvement - 8.8).abs() < 1e-6);
    assert_eq!(result.projections.get("9999"), None);

    let bench: Vec<&str> = result.benched.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(bench, vec!["Patrick Mahomes", "Adam Thielen", "Unprojected Rookie"]);

    assert_eq!(result.changes.len(), 1);
    let change = &result.changes[0];
    assert_eq!(change.player_in.name, "Lamar Jackson");
    assert_eq!(change.player_out.as_ref().map(|p| p.name.as_str()), Some("Patrick Mahomes"));
    assert_eq!(change.position, Slot::Quarterback);
    assert!((change.improvement - 8.8).abs() < 1e-6);

    let steps: Vec<(&str, Slot, Slot, MoveKind)> = change
        .chain
        .steps
        .iter()
        .map(|s| (s.player.name.as_str(), s.from, s.to, s.kind))
        .collect();
    assert_eq!(
        steps,
        vec![
            ("Patrick Mahomes", Slot::Quarterback, Slot::Bench, MoveKind::Bench),
            ("Adam Thielen", Slot::Flex, Slot::Bench, MoveKind::Bench),
            ("Najee Harris", Slot::RunningBack, Slot::Flex, MoveKind::Reposition),
            ("Lamar Jackson", Slot::Bench, Slot::Quarterback, MoveKind::Start),
            ("Bijan Robinson", Slot::Bench, Slot::RunningBack, MoveKind::Start),
        ]
    );
}

#[tokio::test]
async fn explicit_negative_requirement_is_rejected() {
    let mut counts = HashMap::new();
    counts.insert("QB".to_string(), 1);
    counts.insert("WR".to_string(), -2);
    let engine = LineupEngine::new(
        StaticProjections::new(&[("qb1", 20.0)]),
        StaticRoster(Some(RosterSnapshot {
            players: vec![player("qb1", Position::Quarterback, "QB")],
            roster_positions: None,
            lineup_requirements: Some(counts),
        })),
        EngineConfig::default(),
    );
    let err = engine.optimize(1, 2024, None).await.unwrap_err();
    match err {
        EngineError::InvalidLineupRequirements { slot, count } => {
            assert_eq!((slot.as_str(), count), ("WR", -2));
        }
        other => panic!("expected InvalidLineupRequirements, got: {other}"),
    }
}

#[tokio::test]
async fn fixture_waiver_pool() {
    let engine = LineupEngine::new(
        CsvProjectionSource::new(fixture("projections.csv")),
        JsonRosterProvider::new(fixture("roster.json")),
        EngineConfig::default(),
    );
    let pool = CsvWaiverPool::new(fixture("waiver_pool.csv"));

    let recs = engine.waiver_recommendations(&pool, 5, 2024, None).await.unwrap();
    let adds: Vec<&str> = recs.iter().map(|r| r.add.name.as_str()).collect();
    assert_eq!(adds, vec!["Rashee Rice", "Jayden Reed", "Zay Flowers"]);
    assert!(recs.iter().all(|r| r.drop.name == "Unprojected Rookie"));
    assert!(recs.iter().all(|r| r.drop_projection.is_none()));
}

#[tokio::test]
async fn missing_waiver_file_propagates() {
    let engine = LineupEngine::new(
        CsvProjectionSource::new(fixture("projections.csv")),
        JsonRosterProvider::new(fixture("roster.json")),
        EngineConfig::default(),
    );
    let pool = CsvWaiverPool::new(fixture("no_such_pool.csv"));

    let err = engine.waiver_recommendations(&pool, 5, 2024, None).await.unwrap_err();
    assert!(matches!(err, EngineError::WaiverPoolUnavailable { .. }));
}
