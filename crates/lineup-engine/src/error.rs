// Engine error taxonomy.

use thiserror::Error;

use crate::lineup::position::Position;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no team data: the roster provider returned no roster")]
    NoTeamData,

    #[error("projections unavailable: {reason}")]
    ProjectionUnavailable { reason: String },

    #[error("invalid lineup requirements: slot `{slot}` has count {count}")]
    InvalidLineupRequirements { slot: String, count: i64 },

    #[error("roster unavailable: {reason}")]
    RosterUnavailable { reason: String },

    #[error("waiver pool unavailable for {position}: {reason}")]
    WaiverPoolUnavailable { position: Position, reason: String },
}
