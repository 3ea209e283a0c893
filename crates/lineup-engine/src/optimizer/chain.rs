// Move-chain diffing between the current lineup and the optimal lineup.
//
// Starting a benched player usually means displacing whoever sits in the
// target slot, and that player may in turn need a slot someone else holds.
// Each benched player who belongs in the optimal lineup gets one displacement
// trace over a seat map (slot -> current occupants). The resolved traces are
// merged into one move chain of bench, reposition and start steps that a user
// can follow in order without ever double-booking a slot.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::assign::OptimalLineup;
use crate::lineup::player::Player;
use crate::lineup::position::Slot;
use crate::lineup::requirements::SlotRequirements;
use crate::projections::ProjectionTable;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Bench,
    Reposition,
    Start,
}

/// One player's transition between two slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveStep {
    pub player: Player,
    pub from: Slot,
    pub to: Slot,
    pub kind: MoveKind,
    pub reason: String,
}

/// An ordered set of moves that realizes one net lineup improvement.
///
/// Steps are ordered bench moves, then repositions, then start moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveChain {
    pub steps: Vec<MoveStep>,
    /// Projections of `started` minus projections of `benched`.
    pub net_improvement: f64,
    /// Bench players entering the lineup, highest projection first.
    pub started: Vec<Player>,
    /// Starters leaving the lineup, in roster order.
    pub benched: Vec<Player>,
}

/// A net swap backed by its move chain. `player_in` is the chain's
/// highest-projected start and `player_out` its first benched starter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupChange {
    pub player_out: Option<Player>,
    pub player_in: Player,
    /// Slot the incoming player ends up in.
    pub position: Slot,
    pub player_out_projection: Option<f64>,
    pub player_in_projection: Option<f64>,
    pub improvement: f64,
    pub chain: MoveChain,
}

// ---------------------------------------------------------------------------
// Seat map
// ---------------------------------------------------------------------------

/// Current occupants of each starting slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct SeatMap<'a> {
    seats: BTreeMap<Slot, Vec<&'a Player>>,
}

impl<'a> SeatMap<'a> {
    /// Seat every current starter at their normalized slot.
    pub(crate) fn from_roster(roster: &'a [Player]) -> Self {
        let mut map = Self::default();
        for player in roster {
            if let Some(slot) = player.starting_slot() {
                map.seat(slot, player);
            }
        }
        map
    }

    pub(crate) fn seat(&mut self, slot: Slot, player: &'a Player) {
        self.seats.entry(slot).or_default().push(player);
    }

    fn vacate(&mut self, slot: Slot, player_id: &str) {
        if let Some(occupants) = self.seats.get_mut(&slot) {
            occupants.retain(|p| p.id != player_id);
        }
    }

    pub(crate) fn occupants(&self, slot: Slot) -> &[&'a Player] {
        self.seats.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    fn occupied(&self, slot: Slot) -> usize {
        self.occupants(slot).len()
    }
}

// ---------------------------------------------------------------------------
// Displacement tracing
// ---------------------------------------------------------------------------

/// A player who has to leave their seat for a trace to resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Displacement<'a> {
    Reposition { player: &'a Player, from: Slot, to: Slot },
    Bench { player: &'a Player, from: Slot },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TraceOutcome<'a> {
    /// The target can be reached after the listed displacements, in
    /// discovery order (closest to the target first).
    Resolved(Vec<Displacement<'a>>),
    /// Every occupant of `slot` already sits where the optimum wants them.
    Blocked { slot: Slot },
    /// The trace came back to `slot`.
    Cycle { slot: Slot },
}

/// Walk the displacement path that frees a seat in `target`.
///
/// At each slot: a free seat ends the walk; otherwise the first occupant who
/// belongs elsewhere is displaced. If they belong on the bench the walk ends,
/// otherwise it continues at their optimal slot. Revisiting a slot aborts.
pub(crate) fn trace_displacement<'a>(
    target: Slot,
    seats: &SeatMap<'a>,
    optimal_slots: &HashMap<&str, Slot>,
    requirements: &SlotRequirements,
) -> TraceOutcome<'a> {
    let optimal_of = |p: &Player| optimal_slots.get(p.id.as_str()).copied().unwrap_or(Slot::Bench);

    let mut visited = HashSet::new();
    let mut path = Vec::new();
    let mut slot = target;

    loop {
        if !visited.insert(slot) {
            return TraceOutcome::Cycle { slot };
        }
        if seats.occupied(slot) < requirements.capacity(slot) {
            return TraceOutcome::Resolved(path);
        }
        let Some(&occupant) = seats.occupants(slot).iter().find(|&&p| optimal_of(p) != slot) else {
            return TraceOutcome::Blocked { slot };
        };
        let destination = optimal_of(occupant);
        if destination.is_bench_like() {
            path.push(Displacement::Bench {
                player: occupant,
                from: slot,
            });
            return TraceOutcome::Resolved(path);
        }
        path.push(Displacement::Reposition {
            player: occupant,
            from: slot,
            to: destination,
        });
        slot = destination;
    }
}

/// Order repositions so each one lands on a free seat.
///
/// A reposition is ready once its destination has room. Among ready moves,
/// moves out of SUPER_FLEX go first; otherwise the deepest move (last
/// discovered) goes first.
fn order_repositions<'a>(
    mut pending: Vec<(&'a Player, Slot, Slot)>,
    occupancy: &mut HashMap<Slot, usize>,
    requirements: &SlotRequirements,
) -> Vec<(&'a Player, Slot, Slot)> {
    pending.reverse();
    let mut ordered = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let next = {
            let current: &HashMap<Slot, usize> = &*occupancy;
            let is_ready =
                |to: Slot| current.get(&to).copied().unwrap_or(0) < requirements.capacity(to);
            pending
                .iter()
                .position(|&(_, from, to)| from == Slot::SuperFlex && is_ready(to))
                .or_else(|| pending.iter().position(|&(_, _, to)| is_ready(to)))
        };

        let Some(index) = next else {
            warn!("no reposition order frees every seat; emitting the rest deepest-first");
            ordered.append(&mut pending);
            break;
        };
        let (player, from, to) = pending.remove(index);
        if let Some(count) = occupancy.get_mut(&from) {
            *count = count.saturating_sub(1);
        }
        *occupancy.entry(to).or_insert(0) += 1;
        ordered.push((player, from, to));
    }

    ordered
}

fn describe_points(points: Option<f64>) -> String {
    match points {
        Some(p) => format!("{p:.1} pts"),
        None => "no projection".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Chain construction
// ---------------------------------------------------------------------------

/// A critical-start candidate whose displacement trace resolved.
#[derive(Debug, Clone)]
struct ResolvedStart<'a> {
    candidate: &'a Player,
    target: Slot,
    path: Vec<Displacement<'a>>,
}

/// Apply a resolved trace to the simulated seat map so later traces see it.
fn apply_trace<'a>(seats: &mut SeatMap<'a>, start: &ResolvedStart<'a>) {
    for displacement in &start.path {
        match *displacement {
            Displacement::Bench { player, from } => seats.vacate(from, &player.id),
            Displacement::Reposition { player, from, to } => {
                seats.vacate(from, &player.id);
                seats.seat(to, player);
            }
        }
    }
    seats.seat(start.target, start.candidate);
}

/// Merge one round of resolved traces into a single move chain.
///
/// Steps are every critical-bench move (roster order), then the
/// repositions found by the traces, then every start (highest projection
/// first).
fn build_chain(
    roster: &[Player],
    critical_bench: &[&Player],
    starts: &[ResolvedStart<'_>],
    projections: &ProjectionTable,
    requirements: &SlotRequirements,
) -> MoveChain {
    let mut steps = Vec::new();

    let mut occupancy: HashMap<Slot, usize> = HashMap::new();
    for slot in roster.iter().filter_map(Player::starting_slot) {
        *occupancy.entry(slot).or_insert(0) += 1;
    }

    for &player in critical_bench {
        let Some(from) = player.starting_slot() else {
            continue;
        };
        if let Some(count) = occupancy.get_mut(&from) {
            *count = count.saturating_sub(1);
        }
        steps.push(MoveStep {
            player: player.clone(),
            from,
            to: Slot::Bench,
            kind: MoveKind::Bench,
            reason: format!(
                "Bench {} ({}) to free {}",
                player.name,
                describe_points(projections.for_player(player)),
                from
            ),
        });
    }

    let repositions: Vec<(&Player, Slot, Slot)> = starts
        .iter()
        .flat_map(|start| start.path.iter())
        .filter_map(|displacement| match *displacement {
            Displacement::Reposition { player, from, to } => Some((player, from, to)),
            Displacement::Bench { .. } => None,
        })
        .collect();

    for (player, from, to) in order_repositions(repositions, &mut occupancy, requirements) {
        steps.push(MoveStep {
            player: player.clone(),
            from,
            to,
            kind: MoveKind::Reposition,
            reason: format!("Move {} from {} to {} to free {}", player.name, from, to, from),
        });
    }

    for start in starts {
        let candidate = start.candidate;
        let from = candidate
            .normalized_slot()
            .filter(|slot| slot.is_bench_like())
            .unwrap_or(Slot::Bench);
        steps.push(MoveStep {
            player: candidate.clone(),
            from,
            to: start.target,
            kind: MoveKind::Start,
            reason: format!(
                "Start {} ({}) at {}",
                candidate.name,
                describe_points(projections.for_player(candidate)),
                start.target
            ),
        });
    }

    let started: Vec<Player> = starts.iter().map(|s| s.candidate.clone()).collect();
    let benched: Vec<Player> = critical_bench.iter().map(|&p| p.clone()).collect();
    let net_improvement = projections.total(&started) - projections.total(&benched);

    MoveChain {
        steps,
        net_improvement,
        started,
        benched,
    }
}

/// Compute the lineup changes that take `roster`'s current lineup to `optimal`.
///
/// Critical starts (benched players who start in the optimum) are traced in
/// descending projection order against a seat map that reflects the traces
/// before them. All resolved traces of the round are merged into one move
/// chain, which also benches every critical-bench starter (current starters
/// left out of the optimum). The round yields one change: its incoming
/// player is the highest-projected start and its outgoing player the first
/// critical-bench player. Candidates whose trace is blocked or cyclic are
/// left out; a round with no resolved start yields no change.
pub fn diff_lineups(
    roster: &[Player],
    optimal: &OptimalLineup,
    projections: &ProjectionTable,
    requirements: &SlotRequirements,
) -> Vec<LineupChange> {
    let optimal_slots: HashMap<&str, Slot> = optimal
        .iter()
        .flat_map(|(slot, players)| players.iter().map(move |p| (p.id.as_str(), slot)))
        .collect();

    let mut candidates: Vec<(&Player, Slot)> = roster
        .iter()
        .filter(|p| !p.is_starting())
        .filter_map(|p| {
            let slot = optimal_slots.get(p.id.as_str()).copied()?;
            (!slot.is_bench_like()).then_some((p, slot))
        })
        .collect();
    candidates.sort_by(|(a, _), (b, _)| {
        projections
            .points_or_zero(b)
            .partial_cmp(&projections.points_or_zero(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let critical_bench: Vec<&Player> = roster
        .iter()
        .filter(|p| p.is_starting() && !optimal.is_starting(&p.id))
        .collect();
    debug!(
        "{} players to start, {} starters to bench",
        candidates.len(),
        critical_bench.len()
    );

    let mut seats = SeatMap::from_roster(roster);
    let mut starts = Vec::new();

    for (candidate, target) in candidates {
        let path = match trace_displacement(target, &seats, &optimal_slots, requirements) {
            TraceOutcome::Resolved(path) => path,
            TraceOutcome::Blocked { slot } => {
                debug!("cannot start {}: {} is held by optimal starters", candidate.name, slot);
                continue;
            }
            TraceOutcome::Cycle { slot } => {
                warn!(
                    "displacement trace for {} revisited {}, skipping",
                    candidate.name, slot
                );
                continue;
            }
        };
        let start = ResolvedStart {
            candidate,
            target,
            path,
        };
        apply_trace(&mut seats, &start);
        starts.push(start);
    }

    let Some(primary) = starts.first() else {
        if !critical_bench.is_empty() {
            debug!("no start resolved; leaving {} starters in place", critical_bench.len());
        }
        return Vec::new();
    };

    let chain = build_chain(roster, &critical_bench, &starts, projections, requirements);
    debug!(
        "move chain: {} steps, {} starts, {} benched, {:+.1} pts",
        chain.steps.len(),
        chain.started.len(),
        chain.benched.len(),
        chain.net_improvement
    );

    let player_out = critical_bench.first().map(|&p| p.clone());
    vec![LineupChange {
        player_out_projection: player_out.as_ref().and_then(|p| projections.for_player(p)),
        player_out,
        player_in: primary.candidate.clone(),
        position: primary.target,
        player_in_projection: projections.for_player(primary.candidate),
        improvement: chain.net_improvement,
        chain,
    }]
}
