//! the one storage seam the engine requires (spec §6). Every operation the
//! bracket state machine performs against persistence goes through this
//! trait; `async fn` mirrors the teacher workspace's `ports::DatabasePort`
//! even though the concurrency model (spec §5) treats calls as
//! synchronous-per-worker — this lets a real façade share a connection
//! pool without the engine caring.

pub mod in_memory;

use async_trait::async_trait;

use crate::error::DbResult;
use crate::model::{
    BracketFormat, BracketFormatId, BracketRound, BracketRoundId, Entry, EntryId, Event, EventId,
    Fighter, FighterId, Match, MatchId, MatchStatus, WeightClass, WeightClassId,
};

#[async_trait]
pub trait StoragePort: Send + Sync {
    async fn get_fighter(&self, id: FighterId) -> DbResult<Fighter>;
    async fn update_fighter(&self, fighter: Fighter) -> DbResult<()>;
    async fn list_fighters(&self) -> DbResult<Vec<Fighter>>;

    async fn get_event(&self, id: EventId) -> DbResult<Event>;
    async fn list_events(&self) -> DbResult<Vec<Event>>;

    async fn get_entry(&self, id: EntryId) -> DbResult<Entry>;
    /// entries for `event_id`, optionally filtered by weight class, checked
    /// in only — the eligible-participant query of spec §4.4 `generateBracket`.
    async fn list_checked_in_entries(
        &self,
        event_id: EventId,
        weight_class_id: Option<WeightClassId>,
    ) -> DbResult<Vec<Entry>>;

    async fn get_weight_class(&self, id: WeightClassId) -> DbResult<WeightClass>;
    async fn list_weight_classes(&self) -> DbResult<Vec<WeightClass>>;

    async fn get_bracket_format(&self, id: BracketFormatId) -> DbResult<BracketFormat>;
    async fn insert_bracket_format(&self, bracket: BracketFormat) -> DbResult<()>;
    async fn update_bracket_format(&self, bracket: BracketFormat) -> DbResult<()>;
    async fn delete_bracket_format(&self, id: BracketFormatId) -> DbResult<()>;

    async fn get_round(&self, id: BracketRoundId) -> DbResult<BracketRound>;
    async fn insert_round(&self, round: BracketRound) -> DbResult<()>;
    async fn update_round(&self, round: BracketRound) -> DbResult<()>;
    async fn delete_round(&self, id: BracketRoundId) -> DbResult<()>;
    async fn list_rounds_by_bracket(&self, bracket_id: BracketFormatId) -> DbResult<Vec<BracketRound>>;

    async fn get_match(&self, id: MatchId) -> DbResult<Match>;
    async fn insert_match(&self, m: Match) -> DbResult<()>;
    async fn update_match(&self, m: Match) -> DbResult<()>;
    async fn delete_match(&self, id: MatchId) -> DbResult<()>;

    async fn list_matches_by_event(&self, event_id: EventId) -> DbResult<Vec<Match>>;
    async fn list_matches_by_round(&self, round_id: BracketRoundId) -> DbResult<Vec<Match>>;
    async fn list_matches_by_bracket(&self, bracket_id: BracketFormatId) -> DbResult<Vec<Match>>;
    async fn list_matches_by_status(&self, event_id: EventId, status: MatchStatus) -> DbResult<Vec<Match>>;
    async fn list_matches_by_fighter(&self, event_id: EventId, fighter_id: FighterId) -> DbResult<Vec<Match>>;
    /// matches depending on `match_id` in either slot (spec §4.4 propagation
    /// step 2).
    async fn list_dependents(&self, match_id: MatchId) -> DbResult<Vec<Match>>;
    /// every match with a non-null result, for the replay engine; ordering
    /// by (event date, match id) is applied by the caller once events are
    /// joined in, since this trait has no cross-entity join primitive.
    async fn list_completed_matches(&self) -> DbResult<Vec<Match>>;
}
