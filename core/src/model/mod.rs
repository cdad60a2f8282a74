// entities of the tournament and rating engine (spec §3)

mod bracket;
mod event;
mod fighter;
mod match_;
mod weight_class;

pub use bracket::*;
pub use event::*;
pub use fighter::*;
pub use match_::*;
pub use weight_class::*;

use uuid::Uuid;

pub type FighterId = Uuid;
pub type WeightClassId = Uuid;
pub type EventId = Uuid;
pub type EntryId = Uuid;
pub type MatchId = Uuid;
pub type BracketFormatId = Uuid;
pub type BracketRoundId = Uuid;
