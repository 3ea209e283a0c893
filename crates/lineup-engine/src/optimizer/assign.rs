// Constrained lineup assignment.
//
// Greedy, priority-ordered fill: standard slots lock in first, then the flex
// categories from most to least permissive. Not globally optimal, but
// deterministic and easy to explain to a user.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lineup::player::Player;
use crate::lineup::position::{Slot, FLEX_SLOTS, STANDARD_SLOTS};
use crate::lineup::requirements::SlotRequirements;
use crate::projections::ProjectionTable;

/// Slot -> assigned players. Always carries a `Slot::Bench` entry holding
/// every roster player not assigned to a starting slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalLineup {
    slots: BTreeMap<Slot, Vec<Player>>,
}

impl OptimalLineup {
    /// Wrap explicit assignments, adding an empty bench entry if missing.
    pub fn from_slots(mut slots: BTreeMap<Slot, Vec<Player>>) -> Self {
        slots.entry(Slot::Bench).or_default();
        OptimalLineup { slots }
    }

    /// Players assigned to `slot`, in assignment order.
    pub fn players(&self, slot: Slot) -> &[Player] {
        self.slots.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bench(&self) -> &[Player] {
        self.players(Slot::Bench)
    }

    /// Every slot entry, starters first and bench last.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &[Player])> {
        self.slots.iter().map(|(&slot, players)| (slot, players.as_slice()))
    }

    /// Every (slot, player) pair for non-bench slots.
    pub fn starters(&self) -> impl Iterator<Item = (Slot, &Player)> {
        self.slots
            .iter()
            .filter(|(slot, _)| !slot.is_bench_like())
            .flat_map(|(&slot, players)| players.iter().map(move |p| (slot, p)))
    }

    /// The slot a player was assigned to, `Slot::Bench` included.
    pub fn slot_of(&self, player_id: &str) -> Option<Slot> {
        self.slots
            .iter()
            .find(|(_, players)| players.iter().any(|p| p.id == player_id))
            .map(|(&slot, _)| slot)
    }

    pub fn is_starting(&self, player_id: &str) -> bool {
        self.slot_of(player_id).is_some_and(|slot| !slot.is_bench_like())
    }

    /// Projected points of the starting players.
    pub fn projected_points(&self, projections: &ProjectionTable) -> f64 {
        projections.total(self.starters().map(|(_, p)| p))
    }
}

/// Sort players by projection descending. Missing projections count as zero;
/// the stable sort keeps roster order for ties.
fn sorted_by_projection<'a>(
    roster: &'a [Player],
    projections: &ProjectionTable,
) -> Vec<&'a Player> {
    let mut sorted: Vec<&Player> = roster.iter().collect();
    sorted.sort_by(|a, b| {
        projections
            .points_or_zero(b)
            .partial_cmp(&projections.points_or_zero(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}

/// Take up to `count` players eligible for `slot` from the front of `pool`.
fn take_for_slot<'a>(pool: &mut Vec<&'a Player>, slot: Slot, count: usize) -> Vec<&'a Player> {
    let mut taken = Vec::with_capacity(count);
    let mut remaining = Vec::with_capacity(pool.len());
    for player in pool.drain(..) {
        if taken.len() < count && slot.accepts(player.position) {
            taken.push(player);
        } else {
            remaining.push(player);
        }
    }
    *pool = remaining;
    taken
}

/// Assign roster players to the required slots.
///
/// Fill order:
/// 1. QB, RB, WR, TE, K, DEF with exact-position players.
/// 2. SUPER_FLEX (QB/RB/WR/TE).
/// 3. FLEX (RB/WR/TE), then WRRB_FLEX (WR/RB), then REC_FLEX (WR/TE).
/// 4. Everyone left goes to the bench.
///
/// Each step takes the highest-projected eligible players still unassigned.
/// The order is fixed, so the result is not guaranteed to beat every other
/// legal lineup: a non-QB taken at SUPER_FLEX can strand a QB that only
/// SUPER_FLEX would accept.
pub fn assign_lineup(
    roster: &[Player],
    projections: &ProjectionTable,
    requirements: &SlotRequirements,
) -> OptimalLineup {
    let mut pool = sorted_by_projection(roster, projections);
    let mut slots: BTreeMap<Slot, Vec<Player>> = BTreeMap::new();

    for &slot in STANDARD_SLOTS.iter().chain(FLEX_SLOTS) {
        let count = requirements.required(slot);
        if count == 0 {
            continue;
        }
        let taken = take_for_slot(&mut pool, slot, count);
        debug!("filled {} with {}/{} players", slot, taken.len(), count);
        if !taken.is_empty() {
            slots.insert(slot, taken.into_iter().cloned().collect());
        }
    }

    slots.insert(Slot::Bench, pool.into_iter().cloned().collect());

    OptimalLineup { slots }
}
