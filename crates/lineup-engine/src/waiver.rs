// Waiver-wire recommendations.
//
// For each skill position, the weakest rostered player is compared against
// the best available free agents. A pickup is recommended only when it beats
// that player by more than the configured significance threshold.

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WaiverConfig;
use crate::error::EngineError;
use crate::lineup::player::Player;
use crate::lineup::position::Position;
use crate::projections::ProjectionTable;
use crate::provider::WaiverPoolProvider;

/// A free agent offered by the waiver pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverCandidate {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub team: String,
    pub projected_points: f64,
}

/// A suggested add/drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverRecommendation {
    pub add: WaiverCandidate,
    pub drop: Player,
    /// Added player's projection minus the dropped player's.
    pub projected_impact: f64,
    pub drop_projection: Option<f64>,
    pub reason: String,
}

/// Recommendations for one position given its free-agent candidates.
///
/// The drop target is the lowest-projected rostered player at the position
/// (first in roster order on ties). Candidates already on the roster are
/// ignored. Returns nothing when the roster has no player at the position.
pub fn evaluate_position(
    position: Position,
    roster: &[Player],
    projections: &ProjectionTable,
    candidates: &[WaiverCandidate],
    threshold: f64,
) -> Vec<WaiverRecommendation> {
    let Some(weakest) = roster
        .iter()
        .filter(|p| p.position == position)
        .min_by(|a, b| {
            projections
                .points_or_zero(a)
                .partial_cmp(&projections.points_or_zero(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    else {
        debug!("no rostered {} to compare against", position);
        return Vec::new();
    };

    let drop_projection = projections.for_player(weakest);
    let drop_points = drop_projection.unwrap_or(0.0);

    candidates
        .iter()
        .filter(|c| !roster.iter().any(|p| p.projection_key == c.player_id))
        .filter_map(|candidate| {
            let impact = candidate.projected_points - drop_points;
            if impact <= threshold {
                return None;
            }
            Some(WaiverRecommendation {
                add: candidate.clone(),
                drop: weakest.clone(),
                projected_impact: impact,
                drop_projection,
                reason: format!(
                    "{} projects {:.1} pts vs {:.1} for {} ({:+.1})",
                    candidate.name, candidate.projected_points, drop_points, weakest.name, impact
                ),
            })
        })
        .collect()
}

/// Build waiver recommendations across the configured positions.
///
/// Pool lookups run concurrently; the first failure is returned as-is.
/// Results are sorted by projected impact, largest first.
pub async fn recommend_waivers<W>(
    pool: &W,
    roster: &[Player],
    projections: &ProjectionTable,
    week: u32,
    year: u32,
    settings: &WaiverConfig,
) -> Result<Vec<WaiverRecommendation>, EngineError>
where
    W: WaiverPoolProvider + ?Sized,
{
    let fetches = settings.positions.iter().map(|&position| async move {
        let candidates = pool
            .fetch_top_available(position, week, year, settings.candidates_per_position)
            .await?;
        Ok::<_, EngineError>((position, candidates))
    });
    let pools = try_join_all(fetches).await?;

    let mut recommendations: Vec<WaiverRecommendation> = pools
        .iter()
        .flat_map(|(position, candidates)| {
            evaluate_position(*position, roster, projections, candidates, settings.threshold)
        })
        .collect();
    recommendations.sort_by(|a, b| {
        b.projected_impact
            .partial_cmp(&a.projected_impact)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!("{} waiver recommendations", recommendations.len());
    Ok(recommendations)
}
