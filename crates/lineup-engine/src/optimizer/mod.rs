// Lineup optimization service and result assembly.
//
// One call runs: roster -> projections (the only await) -> requirement
// resolution -> projection mapping -> assignment -> move-chain diff -> result.
// The engine holds its collaborators and config but no per-call state.

pub mod assign;
pub mod chain;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::lineup::player::{Player, RosterSnapshot};
use crate::lineup::requirements::{resolve_requirements, SlotRequirements};
use crate::projections::{map_projections, ProjectionRecord, ProjectionTable, ScoringFormat};
use crate::provider::{ProjectionSource, RosterProvider, WaiverPoolProvider};
use crate::waiver::{recommend_waivers, WaiverRecommendation};

pub use assign::{assign_lineup, OptimalLineup};
pub use chain::{diff_lineups, LineupChange, MoveChain, MoveKind, MoveStep};

/// Everything a caller needs to present one optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimal_lineup: OptimalLineup,
    /// Roster players left out of the optimal starting lineup.
    pub benched: Vec<Player>,
    pub projected_points: f64,
    pub current_points: f64,
    /// `projected_points - current_points`.
    pub improvement: f64,
    pub changes: Vec<LineupChange>,
    pub move_chains: Vec<MoveChain>,
    pub projections: ProjectionTable,
    pub requirements: SlotRequirements,
    pub scoring_format: ScoringFormat,
}

/// Package assignment and diff output with point totals.
pub fn assemble_result(
    roster: &[Player],
    optimal_lineup: OptimalLineup,
    changes: Vec<LineupChange>,
    projections: ProjectionTable,
    requirements: SlotRequirements,
    scoring_format: ScoringFormat,
) -> OptimizationResult {
    let projected_points = optimal_lineup.projected_points(&projections);
    let current_points = projections.total(roster.iter().filter(|p| p.is_starting()));
    let benched = optimal_lineup.bench().to_vec();
    let move_chains = changes.iter().map(|c| c.chain.clone()).collect();

    OptimizationResult {
        optimal_lineup,
        benched,
        projected_points,
        current_points,
        improvement: projected_points - current_points,
        changes,
        move_chains,
        projections,
        requirements,
        scoring_format,
    }
}

/// Optimize an already-materialized roster snapshot.
///
/// This is the synchronous core of [`LineupEngine::optimize`].
pub fn optimize_snapshot(
    snapshot: &RosterSnapshot,
    records: &HashMap<String, ProjectionRecord>,
    format: ScoringFormat,
    default_lineup: &SlotRequirements,
) -> Result<OptimizationResult, EngineError> {
    let roster = snapshot.players.as_slice();
    if roster.is_empty() {
        return Err(EngineError::NoTeamData);
    }

    let (requirements, source) = resolve_requirements(
        snapshot.lineup_requirements.as_ref(),
        snapshot.roster_positions.as_deref(),
        roster,
        default_lineup,
    )?;
    let projections = map_projections(roster, records, format);
    info!(
        "optimizing {} players into {} seats ({} projected, {} format, from {:?})",
        roster.len(),
        requirements.starter_count(),
        projections.len(),
        format.label(),
        source
    );

    let optimal = assign_lineup(roster, &projections, &requirements);
    let changes = diff_lineups(roster, &optimal, &projections, &requirements);
    let result = assemble_result(roster, optimal, changes, projections, requirements, format);

    info!(
        "optimal lineup projects {:.1} pts ({:+.1} vs current), {} changes",
        result.projected_points,
        result.improvement,
        result.changes.len()
    );
    Ok(result)
}

/// Stateless lineup optimizer wired to its data collaborators.
pub struct LineupEngine<P, R> {
    projections: P,
    rosters: R,
    config: EngineConfig,
}

impl<P, R> LineupEngine<P, R>
where
    P: ProjectionSource,
    R: RosterProvider,
{
    pub fn new(projections: P, rosters: R, config: EngineConfig) -> Self {
        Self {
            projections,
            rosters,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a caller-supplied format string, falling back to the config.
    fn scoring_format(&self, format: Option<&str>) -> ScoringFormat {
        format
            .map(ScoringFormat::from_str_lossy)
            .unwrap_or(self.config.scoring_format)
    }

    async fn load_roster(&self) -> Result<RosterSnapshot, EngineError> {
        match self.rosters.current_roster().await? {
            Some(snapshot) if !snapshot.players.is_empty() => Ok(snapshot),
            _ => Err(EngineError::NoTeamData),
        }
    }

    /// Optimize the current roster for a week.
    pub async fn optimize(
        &self,
        week: u32,
        year: u32,
        format: Option<&str>,
    ) -> Result<OptimizationResult, EngineError> {
        let format = self.scoring_format(format);
        let snapshot = self.load_roster().await?;
        let records = self.projections.fetch_projections(week, year).await?;
        optimize_snapshot(&snapshot, &records, format, &self.config.default_lineup)
    }

    /// Waiver add/drop suggestions for the current roster.
    pub async fn waiver_recommendations<W>(
        &self,
        pool: &W,
        week: u32,
        year: u32,
        format: Option<&str>,
    ) -> Result<Vec<WaiverRecommendation>, EngineError>
    where
        W: WaiverPoolProvider + ?Sized,
    {
        let format = self.scoring_format(format);
        let snapshot = self.load_roster().await?;
        let records = self.projections.fetch_projections(week, year).await?;
        let projections = map_projections(&snapshot.players, &records, format);
        recommend_waivers(
            pool,
            &snapshot.players,
            &projections,
            week,
            year,
            &self.config.waiver,
        )
        .await
    }
}
