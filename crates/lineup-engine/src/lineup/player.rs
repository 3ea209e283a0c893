// Roster players and roster snapshots.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::position::{Position, Slot};

/// A rostered player as supplied by the roster provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub team: String,
    /// Key used to look the player up in the projection table.
    pub projection_key: String,
    /// Raw current lineup slot label (e.g. "RB2", "FLEX", "BN"). `None` when
    /// the player is not slotted.
    #[serde(default)]
    pub current_slot: Option<String>,
    #[serde(default)]
    pub is_starter: bool,
}

impl Player {
    /// The normalized current slot, if the raw label is one we model.
    pub fn normalized_slot(&self) -> Option<Slot> {
        self.current_slot.as_deref().and_then(Slot::parse)
    }

    /// The slot this player currently starts in, or `None` if benched.
    ///
    /// A player starts only when flagged as a starter *and* sitting in a
    /// non-bench slot.
    pub fn starting_slot(&self) -> Option<Slot> {
        if !self.is_starter {
            return None;
        }
        self.normalized_slot().filter(|slot| !slot.is_bench_like())
    }

    pub fn is_starting(&self) -> bool {
        self.starting_slot().is_some()
    }
}

/// A team's roster together with the league's roster-position list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub players: Vec<Player>,
    /// Ordered roster-position labels from the league settings, e.g.
    /// `["QB", "RB", "RB", "WR", "WR", "TE", "FLEX", "K", "DEF", "BN", ...]`.
    #[serde(default)]
    pub roster_positions: Option<Vec<String>>,
    /// Explicit slot label -> count map. Takes precedence over
    /// `roster_positions` when present; negative counts are rejected.
    #[serde(default)]
    pub lineup_requirements: Option<HashMap<String, i64>>,
}
