// Lineup slot requirements and their resolution from league data.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::player::Player;
use super::position::Slot;
use crate::error::EngineError;

/// How many players each starting slot takes.
///
/// Bench-like slots are never stored; their capacity is unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequirements {
    counts: BTreeMap<Slot, usize>,
}

impl SlotRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the required count for a slot. Bench-like slots are ignored.
    pub fn set(&mut self, slot: Slot, count: usize) {
        if slot.is_bench_like() {
            return;
        }
        if count == 0 {
            self.counts.remove(&slot);
        } else {
            self.counts.insert(slot, count);
        }
    }

    /// Builder-style variant of [`SlotRequirements::set`].
    pub fn with(mut self, slot: Slot, count: usize) -> Self {
        self.set(slot, count);
        self
    }

    /// Required count for a starting slot; zero when absent.
    pub fn required(&self, slot: Slot) -> usize {
        self.counts.get(&slot).copied().unwrap_or(0)
    }

    /// Seat capacity of a slot. Bench-like slots absorb everyone.
    pub fn capacity(&self, slot: Slot) -> usize {
        if slot.is_bench_like() {
            usize::MAX
        } else {
            self.required(slot)
        }
    }

    /// Starting slots with a non-zero requirement, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, usize)> + '_ {
        self.counts.iter().map(|(&slot, &count)| (slot, count))
    }

    /// Total number of starting seats.
    pub fn starter_count(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Build requirements from explicit signed counts keyed by slot label.
    ///
    /// Negative counts are rejected. Unknown and bench-like labels are skipped.
    pub fn from_counts(counts: &HashMap<String, i64>) -> Result<Self, EngineError> {
        let mut requirements = Self::new();
        for (label, &count) in counts {
            if count < 0 {
                return Err(EngineError::InvalidLineupRequirements {
                    slot: label.clone(),
                    count,
                });
            }
            match Slot::parse(label) {
                Some(slot) => {
                    let current = requirements.required(slot);
                    requirements.set(slot, current + count as usize);
                }
                None => warn!("ignoring unknown slot label '{}' in lineup requirements", label),
            }
        }
        Ok(requirements)
    }

    /// Build requirements from an unsigned label -> count map (config files).
    pub fn from_label_counts(counts: &HashMap<String, usize>) -> Self {
        let mut requirements = Self::new();
        for (label, &count) in counts {
            match Slot::parse(label) {
                Some(slot) => {
                    let current = requirements.required(slot);
                    requirements.set(slot, current + count);
                }
                None => warn!("ignoring unknown slot label '{}' in lineup requirements", label),
            }
        }
        requirements
    }

    /// The stock NFL lineup: 1 QB, 2 RB, 2 WR, 1 TE, 1 FLEX, 1 K, 1 DEF.
    pub fn default_nfl() -> Self {
        Self::new()
            .with(Slot::Quarterback, 1)
            .with(Slot::RunningBack, 2)
            .with(Slot::WideReceiver, 2)
            .with(Slot::TightEnd, 1)
            .with(Slot::Flex, 1)
            .with(Slot::Kicker, 1)
            .with(Slot::Defense, 1)
    }
}

/// Where a resolved requirement map came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementSource {
    Explicit,
    LeagueSettings,
    CurrentStarters,
    Default,
}

/// Resolve the target lineup shape.
///
/// Resolution order:
/// 1. Explicit slot counts supplied by the caller.
/// 2. Count the league's roster-position labels.
/// 3. Count the slots the current starters occupy.
/// 4. Fall back to `default`.
///
/// Bench-like labels never produce a count. The only error is a negative
/// explicit count; every other input resolves to a usable map.
pub fn resolve_requirements(
    explicit: Option<&HashMap<String, i64>>,
    roster_positions: Option<&[String]>,
    players: &[Player],
    default: &SlotRequirements,
) -> Result<(SlotRequirements, RequirementSource), EngineError> {
    if let Some(counts) = explicit {
        let requirements = SlotRequirements::from_counts(counts)?;
        if !requirements.is_empty() {
            debug!("explicit lineup requirements: {:?}", requirements);
            return Ok((requirements, RequirementSource::Explicit));
        }
    }

    if let Some(labels) = roster_positions {
        let mut requirements = SlotRequirements::new();
        for label in labels {
            match Slot::parse(label) {
                Some(slot) => {
                    let current = requirements.required(slot);
                    requirements.set(slot, current + 1);
                }
                None => warn!("ignoring unknown roster position '{}'", label),
            }
        }
        if !requirements.is_empty() {
            debug!("lineup requirements from league settings: {:?}", requirements);
            return Ok((requirements, RequirementSource::LeagueSettings));
        }
    }

    let mut inferred = SlotRequirements::new();
    for slot in players.iter().filter_map(Player::starting_slot) {
        let current = inferred.required(slot);
        inferred.set(slot, current + 1);
    }
    if !inferred.is_empty() {
        debug!("lineup requirements inferred from starters: {:?}", inferred);
        return Ok((inferred, RequirementSource::CurrentStarters));
    }

    debug!("using default lineup requirements");
    Ok((default.clone(), RequirementSource::Default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::position::Position;

    fn starter(id: &str, position: Position, slot: &str) -> Player {
        Player {
            id: id.into(),
            name: id.into(),
            position,
            team: String::new(),
            projection_key: id.into(),
            current_slot: Some(slot.into()),
            is_starter: true,
        }
    }

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn resolve(
        explicit: Option<&HashMap<String, i64>>,
        positions: Option<&[String]>,
        players: &[Player],
    ) -> Result<(SlotRequirements, RequirementSource), EngineError> {
        resolve_requirements(explicit, positions, players, &SlotRequirements::default_nfl())
    }

    #[test]
    fn league_settings_are_counted() {
        let positions = labels(&[
            "QB", "RB", "RB", "WR", "WR", "TE", "FLEX", "SUPER_FLEX", "K", "DEF", "BN", "BN", "IR",
        ]);
        let (req, source) = resolve(None, Some(&positions), &[]).unwrap();
        assert_eq!(source, RequirementSource::LeagueSettings);
        assert_eq!(req.required(Slot::RunningBack), 2);
        assert_eq!(req.required(Slot::SuperFlex), 1);
        assert_eq!(req.required(Slot::Bench), 0);
        assert_eq!(req.capacity(Slot::Bench), usize::MAX);
        assert_eq!(req.capacity(Slot::InjuredReserve), usize::MAX);
        assert_eq!(req.starter_count(), 10);
    }

    #[test]
    fn league_labels_are_case_normalized() {
        let positions = labels(&["qb", "flex"]);
        let (req, _) = resolve(None, Some(&positions), &[]).unwrap();
        assert_eq!(req.required(Slot::Quarterback), 1);
        assert_eq!(req.required(Slot::Flex), 1);
    }

    #[test]
    fn falls_back_to_current_starters() {
        let players = vec![
            starter("a", Position::Quarterback, "QB"),
            starter("b", Position::RunningBack, "RB1"),
            starter("c", Position::RunningBack, "RB2"),
            starter("d", Position::WideReceiver, "BN"),
        ];
        let (req, source) = resolve(None, None, &players).unwrap();
        assert_eq!(source, RequirementSource::CurrentStarters);
        assert_eq!(req.required(Slot::Quarterback), 1);
        assert_eq!(req.required(Slot::RunningBack), 2);
        assert_eq!(req.required(Slot::WideReceiver), 0);
    }

    #[test]
    fn falls_back_to_default() {
        let (req, source) = resolve(None, None, &[]).unwrap();
        assert_eq!(source, RequirementSource::Default);
        assert_eq!(req, SlotRequirements::default_nfl());
        assert_eq!(req.starter_count(), 9);
    }

    #[test]
    fn unknown_only_league_labels_fall_through() {
        let positions = labels(&["LB", "DL", "BN"]);
        let (_, source) = resolve(None, Some(&positions), &[]).unwrap();
        assert_eq!(source, RequirementSource::Default);
    }

    #[test]
    fn explicit_counts_take_precedence() {
        let counts = HashMap::from([("QB".to_string(), 1), ("SUPER_FLEX".to_string(), 1)]);
        let positions = labels(&["QB", "RB", "WR"]);
        let (req, source) = resolve(Some(&counts), Some(&positions), &[]).unwrap();
        assert_eq!(source, RequirementSource::Explicit);
        assert_eq!(req.required(Slot::SuperFlex), 1);
        assert_eq!(req.required(Slot::RunningBack), 0);
    }

    #[test]
    fn explicit_negative_count_is_an_error() {
        let counts = HashMap::from([("WR".to_string(), -2)]);
        let err = resolve(Some(&counts), None, &[]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidLineupRequirements { count: -2, .. }));
    }

    #[test]
    fn explicit_bench_only_counts_fall_through() {
        let counts = HashMap::from([("BN".to_string(), 6)]);
        let (_, source) = resolve(Some(&counts), None, &[]).unwrap();
        assert_eq!(source, RequirementSource::Default);
    }

    #[test]
    fn negative_count_is_rejected() {
        let mut counts = HashMap::new();
        counts.insert("QB".to_string(), 1);
        counts.insert("RB".to_string(), -1);
        let err = SlotRequirements::from_counts(&counts).unwrap_err();
        match err {
            EngineError::InvalidLineupRequirements { slot, count } => {
                assert_eq!(slot, "RB");
                assert_eq!(count, -1);
            }
            other => panic!("expected InvalidLineupRequirements, got: {other}"),
        }
    }

    #[test]
    fn zero_count_is_absent() {
        let mut counts = HashMap::new();
        counts.insert("TE".to_string(), 0);
        counts.insert("BENCH".to_string(), 7);
        let req = SlotRequirements::from_counts(&counts).unwrap();
        assert!(req.is_empty());
    }
}
