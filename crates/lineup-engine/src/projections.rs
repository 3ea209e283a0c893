// Weekly projection records and the per-format projection table.
//
// Projection records carry one value per scoring format; the table collapses
// them to a single scalar per rostered player for the active format. Absence
// is kept explicit: a player missing from the table is "unprojected", not zero.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use tracing::warn;

use crate::lineup::player::Player;

// ---------------------------------------------------------------------------
// Scoring format
// ---------------------------------------------------------------------------

/// Fantasy scoring format used to pick a projection value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFormat {
    #[default]
    Ppr,
    HalfPpr,
    Standard,
}

impl ScoringFormat {
    /// Parse a format string, defaulting to PPR for anything unrecognized.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "ppr" => ScoringFormat::Ppr,
            "half_ppr" | "half-ppr" | "half" => ScoringFormat::HalfPpr,
            "standard" | "std" => ScoringFormat::Standard,
            other => {
                warn!("unrecognized scoring format '{}', using ppr", other);
                ScoringFormat::Ppr
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoringFormat::Ppr => "ppr",
            ScoringFormat::HalfPpr => "half_ppr",
            ScoringFormat::Standard => "standard",
        }
    }
}

// ---------------------------------------------------------------------------
// Projection records
// ---------------------------------------------------------------------------

/// One player's weekly projection under every scoring format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    #[serde(default)]
    pub pts_ppr: Option<f64>,
    #[serde(default)]
    pub pts_half_ppr: Option<f64>,
    #[serde(default)]
    pub pts_std: Option<f64>,
}

impl ProjectionRecord {
    /// The value for `format`, if present and finite.
    pub fn points(&self, format: ScoringFormat) -> Option<f64> {
        let value = match format {
            ScoringFormat::Ppr => self.pts_ppr,
            ScoringFormat::HalfPpr => self.pts_half_ppr,
            ScoringFormat::Standard => self.pts_std,
        };
        value.filter(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// Projection table
// ---------------------------------------------------------------------------

/// Projection-key -> points for a single scoring format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTable {
    points: HashMap<String, f64>,
}

impl ProjectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, points: f64) {
        self.points.insert(key.into(), points);
    }

    /// Projected points for a key; `None` means no projection is available.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.points.get(key).copied()
    }

    /// Projection for a player, if any.
    pub fn for_player(&self, player: &Player) -> Option<f64> {
        self.get(&player.projection_key)
    }

    /// Projection for a player with absence counted as zero. Only point
    /// totals and orderings should use this.
    pub fn points_or_zero(&self, player: &Player) -> f64 {
        self.for_player(player).unwrap_or(0.0)
    }

    /// Sum of projected points over `players`.
    pub fn total<'a>(&self, players: impl IntoIterator<Item = &'a Player>) -> f64 {
        players.into_iter().map(|p| self.points_or_zero(p)).sum()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(String, f64)> for ProjectionTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Build the projection table for `roster` under `format`.
///
/// Players without a record, or whose record lacks a usable value for the
/// format, are left out of the table.
pub fn map_projections(
    roster: &[Player],
    records: &HashMap<String, ProjectionRecord>,
    format: ScoringFormat,
) -> ProjectionTable {
    roster
        .iter()
        .filter_map(|player| {
            let points = records.get(&player.projection_key)?.points(format)?;
            Some((player.projection_key.clone(), points))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

/// Weekly projection CSV row. Blank point cells deserialize as `None`.
#[derive(Debug, Deserialize)]
struct RawProjectionRow {
    player_id: String,
    week: u32,
    season: u32,
    #[serde(default)]
    pts_ppr: Option<f64>,
    #[serde(default)]
    pts_half_ppr: Option<f64>,
    #[serde(default)]
    pts_std: Option<f64>,
}

/// Read projection records for one week/season from CSV.
///
/// Rows for other weeks or seasons are ignored and malformed rows are skipped.
pub(crate) fn load_projections_from_reader<R: Read>(
    rdr: R,
    week: u32,
    season: u32,
) -> Result<HashMap<String, ProjectionRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut records = HashMap::new();
    for result in reader.deserialize::<RawProjectionRow>() {
        match result {
            Ok(raw) => {
                if raw.week != week || raw.season != season {
                    continue;
                }
                let player_id = raw.player_id.trim().to_string();
                if records.contains_key(&player_id) {
                    warn!("duplicate projection row for '{}', using latest value", player_id);
                }
                records.insert(
                    player_id,
                    ProjectionRecord {
                        pts_ppr: raw.pts_ppr,
                        pts_half_ppr: raw.pts_half_ppr,
                        pts_std: raw.pts_std,
                    },
                );
            }
            Err(e) => {
                warn!("skipping malformed projection row: {}", e);
            }
        }
    }
    Ok(records)
}
