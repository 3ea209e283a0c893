// Collaborator interfaces and file-backed implementations.
//
// The engine never fetches data itself; it asks a projection source, a roster
// provider and (for waiver advice) a waiver pool. Each is an async trait so a
// caller can plug in an HTTP client, a cache, or the file readers below.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::lineup::player::RosterSnapshot;
use crate::lineup::position::Position;
use crate::projections::{load_projections_from_reader, ProjectionRecord};
use crate::waiver::WaiverCandidate;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Supplies weekly projections keyed by player projection key.
#[async_trait]
pub trait ProjectionSource: Send + Sync {
    async fn fetch_projections(
        &self,
        week: u32,
        year: u32,
    ) -> Result<HashMap<String, ProjectionRecord>, EngineError>;
}

/// Supplies the user's current roster and the league's roster positions.
#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// `Ok(None)` means there is no team context to optimize.
    async fn current_roster(&self) -> Result<Option<RosterSnapshot>, EngineError>;
}

/// Supplies the best available free agents at a position.
#[async_trait]
pub trait WaiverPoolProvider: Send + Sync {
    async fn fetch_top_available(
        &self,
        position: Position,
        week: u32,
        year: u32,
        limit: usize,
    ) -> Result<Vec<WaiverCandidate>, EngineError>;
}

// ---------------------------------------------------------------------------
// CSV projection source
// ---------------------------------------------------------------------------

/// Reads weekly projections from a CSV file with columns
/// `player_id,week,season,pts_ppr,pts_half_ppr,pts_std`.
#[derive(Debug, Clone)]
pub struct CsvProjectionSource {
    path: PathBuf,
}

impl CsvProjectionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProjectionSource for CsvProjectionSource {
    async fn fetch_projections(
        &self,
        week: u32,
        year: u32,
    ) -> Result<HashMap<String, ProjectionRecord>, EngineError> {
        let bytes = read_bytes(&self.path)
            .await
            .map_err(|reason| EngineError::ProjectionUnavailable { reason })?;
        let records = load_projections_from_reader(bytes.as_slice(), week, year).map_err(|e| {
            EngineError::ProjectionUnavailable {
                reason: format!("CSV error in {}: {e}", self.path.display()),
            }
        })?;
        debug!(
            "loaded {} projections for week {} of {} from {}",
            records.len(),
            week,
            year,
            self.path.display()
        );
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// JSON roster provider
// ---------------------------------------------------------------------------

/// Reads a [`RosterSnapshot`] from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonRosterProvider {
    path: PathBuf,
}

impl JsonRosterProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RosterProvider for JsonRosterProvider {
    async fn current_roster(&self) -> Result<Option<RosterSnapshot>, EngineError> {
        let bytes = read_bytes(&self.path)
            .await
            .map_err(|reason| EngineError::RosterUnavailable { reason })?;
        let snapshot: RosterSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| EngineError::RosterUnavailable {
                reason: format!("failed to parse {}: {e}", self.path.display()),
            })?;
        if snapshot.players.is_empty() {
            return Ok(None);
        }
        Ok(Some(snapshot))
    }
}

// ---------------------------------------------------------------------------
// CSV waiver pool
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawWaiverRow {
    player_id: String,
    name: String,
    position: String,
    #[serde(default)]
    team: String,
    week: u32,
    season: u32,
    projected_points: f64,
}

/// Reads free agents from a CSV file with columns
/// `player_id,name,position,team,week,season,projected_points`.
#[derive(Debug, Clone)]
pub struct CsvWaiverPool {
    path: PathBuf,
}

impl CsvWaiverPool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse waiver rows for one position/week/season, best first, capped at `limit`.
fn load_waiver_pool_from_reader<R: Read>(
    rdr: R,
    position: Position,
    week: u32,
    season: u32,
    limit: usize,
) -> Result<Vec<WaiverCandidate>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut candidates = Vec::new();
    for result in reader.deserialize::<RawWaiverRow>() {
        match result {
            Ok(raw) => {
                if raw.week != week || raw.season != season {
                    continue;
                }
                if !raw.projected_points.is_finite() {
                    warn!("skipping free agent '{}': non-finite projection", raw.name.trim());
                    continue;
                }
                let Some(row_position) = Position::from_str_pos(&raw.position) else {
                    warn!(
                        "skipping free agent '{}': unknown position '{}'",
                        raw.name.trim(),
                        raw.position
                    );
                    continue;
                };
                if row_position != position {
                    continue;
                }
                candidates.push(WaiverCandidate {
                    player_id: raw.player_id.trim().to_string(),
                    name: raw.name.trim().to_string(),
                    position: row_position,
                    team: raw.team.trim().to_string(),
                    projected_points: raw.projected_points,
                });
            }
            Err(e) => {
                warn!("skipping malformed waiver row: {}", e);
            }
        }
    }
    candidates.sort_by(|a, b| {
        b.projected_points
            .partial_cmp(&a.projected_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(limit);
    Ok(candidates)
}

#[async_trait]
impl WaiverPoolProvider for CsvWaiverPool {
    async fn fetch_top_available(
        &self,
        position: Position,
        week: u32,
        year: u32,
        limit: usize,
    ) -> Result<Vec<WaiverCandidate>, EngineError> {
        let bytes = read_bytes(&self.path)
            .await
            .map_err(|reason| EngineError::WaiverPoolUnavailable { position, reason })?;
        load_waiver_pool_from_reader(bytes.as_slice(), position, week, year, limit).map_err(|e| {
            EngineError::WaiverPoolUnavailable {
                position,
                reason: format!("CSV error in {}: {e}", self.path.display()),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn read_bytes(path: &Path) -> Result<Vec<u8>, String> {
    tokio::fs::read(path)
        .await
        .map_err(|e| format!("failed to read {}: {e}", path.display()))
}
