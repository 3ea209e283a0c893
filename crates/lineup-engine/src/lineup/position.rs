// Player positions and lineup slot categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// NFL fantasy positions a player can be listed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "K")]
    Kicker,
    #[serde(rename = "DEF", alias = "DST", alias = "D/ST")]
    Defense,
}

impl Position {
    /// Parse a position string. Accepts "DEF", "DST" and "D/ST" for team defense.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" => Some(Position::Kicker),
            "DEF" | "DST" | "D/ST" => Some(Position::Defense),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DEF",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// A lineup slot category.
///
/// Declaration order doubles as display order, so `BTreeMap<Slot, _>` iterates
/// starters first and bench-like slots last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "K")]
    Kicker,
    #[serde(rename = "DEF")]
    Defense,
    #[serde(rename = "SUPER_FLEX")]
    SuperFlex,
    #[serde(rename = "FLEX")]
    Flex,
    #[serde(rename = "WRRB_FLEX")]
    WrRbFlex,
    #[serde(rename = "REC_FLEX")]
    RecFlex,
    #[serde(rename = "BENCH")]
    Bench,
    #[serde(rename = "IR")]
    InjuredReserve,
}

/// Standard position slots, filled first and in this order.
pub const STANDARD_SLOTS: &[Slot] = &[
    Slot::Quarterback,
    Slot::RunningBack,
    Slot::WideReceiver,
    Slot::TightEnd,
    Slot::Kicker,
    Slot::Defense,
];

/// Flex slots, filled after the standard slots and in this order.
pub const FLEX_SLOTS: &[Slot] = &[Slot::SuperFlex, Slot::Flex, Slot::WrRbFlex, Slot::RecFlex];

/// Strip trailing ordinal digits from a raw slot label ("RB2" -> "RB").
pub fn normalize_slot_label(raw: &str) -> &str {
    raw.trim().trim_end_matches(|c: char| c.is_ascii_digit())
}

impl Slot {
    /// Parse a raw slot label from a league config or a roster entry.
    ///
    /// Labels are case-normalized and ordinal digits are stripped first.
    /// Returns `None` for labels this engine does not model (e.g. IDP slots).
    pub fn parse(raw: &str) -> Option<Self> {
        let label = normalize_slot_label(raw).to_uppercase();
        match label.as_str() {
            "QB" => Some(Slot::Quarterback),
            "RB" => Some(Slot::RunningBack),
            "WR" => Some(Slot::WideReceiver),
            "TE" => Some(Slot::TightEnd),
            "K" => Some(Slot::Kicker),
            "DEF" | "DST" | "D/ST" => Some(Slot::Defense),
            "SUPER_FLEX" | "SUPERFLEX" | "OP" | "Q/W/R/T" => Some(Slot::SuperFlex),
            "FLEX" | "W/R/T" | "RB/WR/TE" => Some(Slot::Flex),
            "WRRB_FLEX" | "W/R" | "RB/WR" => Some(Slot::WrRbFlex),
            "REC_FLEX" | "W/T" | "WR/TE" => Some(Slot::RecFlex),
            "BENCH" | "BN" | "BE" => Some(Slot::Bench),
            "IR" => Some(Slot::InjuredReserve),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Slot::Quarterback => "QB",
            Slot::RunningBack => "RB",
            Slot::WideReceiver => "WR",
            Slot::TightEnd => "TE",
            Slot::Kicker => "K",
            Slot::Defense => "DEF",
            Slot::SuperFlex => "SUPER_FLEX",
            Slot::Flex => "FLEX",
            Slot::WrRbFlex => "WRRB_FLEX",
            Slot::RecFlex => "REC_FLEX",
            Slot::Bench => "BENCH",
            Slot::InjuredReserve => "IR",
        }
    }

    /// Bench-like slots hold non-starters and have no capacity limit.
    pub fn is_bench_like(&self) -> bool {
        matches!(self, Slot::Bench | Slot::InjuredReserve)
    }

    /// Positions that may be assigned to this slot.
    pub fn eligible_positions(&self) -> &'static [Position] {
        use Position::*;
        match self {
            Slot::Quarterback => &[Quarterback],
            Slot::RunningBack => &[RunningBack],
            Slot::WideReceiver => &[WideReceiver],
            Slot::TightEnd => &[TightEnd],
            Slot::Kicker => &[Kicker],
            Slot::Defense => &[Defense],
            Slot::SuperFlex => &[Quarterback, RunningBack, WideReceiver, TightEnd],
            Slot::Flex => &[RunningBack, WideReceiver, TightEnd],
            Slot::WrRbFlex => &[WideReceiver, RunningBack],
            Slot::RecFlex => &[WideReceiver, TightEnd],
            Slot::Bench | Slot::InjuredReserve => &[
                Quarterback,
                RunningBack,
                WideReceiver,
                TightEnd,
                Kicker,
                Defense,
            ],
        }
    }

    pub fn accepts(&self, position: Position) -> bool {
        self.eligible_positions().contains(&position)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}
