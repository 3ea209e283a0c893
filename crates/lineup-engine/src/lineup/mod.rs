pub mod player;
pub mod position;
pub mod requirements;

pub use player::{Player, RosterSnapshot};
pub use position::{Position, Slot};
pub use requirements::{resolve_requirements, RequirementSource, SlotRequirements};
