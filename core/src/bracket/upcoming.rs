//! `getUpcomingMatches` (spec §4.4): Ready matches for a bracket, limited
//! to a caller-supplied count and filtered to pairs where both fighters
//! have cleared the bracket's minimum rest interval since their last
//! completed match — grounded on
//! `original_source/.../tournament_engine.py::get_upcoming_matches` /
//! `_can_fighters_compete`. Advisory only — the state machine never blocks
//! a write on rest (spec §5 "Rest-interval gating").

use chrono::{DateTime, Duration, Utc};

use crate::error::{entity_err, CoreResult};
use crate::model::{BracketFormatId, FighterId, Match, MatchStatus};
use crate::storage::StoragePort;

use super::BracketEngine;

impl BracketEngine {
    pub async fn upcoming_matches(
        &self,
        bracket_format_id: BracketFormatId,
        limit: usize,
    ) -> CoreResult<Vec<Match>> {
        let bracket = self
            .storage
            .get_bracket_format(bracket_format_id)
            .await
            .map_err(entity_err("bracket_format"))?;

        let mut ready: Vec<Match> = self
            .storage
            .list_matches_by_bracket(bracket_format_id)
            .await
            .map_err(entity_err("match"))?
            .into_iter()
            .filter(|m| m.status == MatchStatus::Ready)
            .collect();
        ready.sort_by_key(|m| m.position.unwrap_or(u32::MAX));

        // omits matches with a null slot (spec §4.4): "No orphan Ready"
        // already guarantees this for anything the engine produced, but a
        // defensive filter keeps the contract explicit at this read seam.
        ready.retain(|m| m.both_slots_set());

        let event_matches = self
            .storage
            .list_matches_by_event(bracket.event_id)
            .await
            .map_err(entity_err("match"))?;

        let min_rest = bracket.min_rest_minutes;
        ready.retain(|m| {
            let (Some(a), Some(b)) = (m.slot_a, m.slot_b) else {
                return false;
            };
            Self::is_rested(a, min_rest, &event_matches) && Self::is_rested(b, min_rest, &event_matches)
        });

        ready.truncate(limit);
        Ok(ready)
    }

    fn is_rested(fighter_id: FighterId, min_rest_minutes: u32, all_matches: &[Match]) -> bool {
        if min_rest_minutes == 0 {
            return true;
        }
        let last_completed: Option<DateTime<Utc>> = all_matches
            .iter()
            .filter(|m| m.status == MatchStatus::Completed)
            .filter(|m| m.slot_a == Some(fighter_id) || m.slot_b == Some(fighter_id))
            .filter_map(|m| m.completed_at)
            .max();
        match last_completed {
            Some(last) => Utc::now() - last >= Duration::minutes(min_rest_minutes as i64),
            None => true,
        }
    }
}
