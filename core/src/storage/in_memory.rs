//! in-memory `StoragePort` fake, grounded on the fakes pattern used by the
//! teacher workspace's own test doubles (`integration_testing::port_fakes`).
//! Backs engine-level integration tests; never used by a real deployment.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{DbError, DbResult};
use crate::model::{
    BracketFormat, BracketFormatId, BracketRound, BracketRoundId, Entry, EntryId, Event, EventId,
    Fighter, FighterId, Match, MatchId, MatchStatus, WeightClass, WeightClassId,
};

use super::StoragePort;

#[derive(Default)]
pub struct InMemoryStorage {
    fighters: RwLock<HashMap<FighterId, Fighter>>,
    events: RwLock<HashMap<EventId, Event>>,
    entries: RwLock<HashMap<EntryId, Entry>>,
    weight_classes: RwLock<HashMap<WeightClassId, WeightClass>>,
    bracket_formats: RwLock<HashMap<BracketFormatId, BracketFormat>>,
    rounds: RwLock<HashMap<BracketRoundId, BracketRound>>,
    matches: RwLock<HashMap<MatchId, Match>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_fighter(&self, fighter: Fighter) {
        self.fighters.write().await.insert(fighter.id, fighter);
    }
    pub async fn seed_event(&self, event: Event) {
        self.events.write().await.insert(event.id, event);
    }
    pub async fn seed_entry(&self, entry: Entry) {
        self.entries.write().await.insert(entry.id, entry);
    }
    pub async fn seed_weight_class(&self, wc: WeightClass) {
        self.weight_classes.write().await.insert(wc.id, wc);
    }
}

#[async_trait]
impl StoragePort for InMemoryStorage {
    async fn get_fighter(&self, id: FighterId) -> DbResult<Fighter> {
        self.fighters.read().await.get(&id).cloned().ok_or(DbError::NotFound)
    }
    async fn update_fighter(&self, fighter: Fighter) -> DbResult<()> {
        self.fighters.write().await.insert(fighter.id, fighter);
        Ok(())
    }
    async fn list_fighters(&self) -> DbResult<Vec<Fighter>> {
        Ok(self.fighters.read().await.values().cloned().collect())
    }

    async fn get_event(&self, id: EventId) -> DbResult<Event> {
        self.events.read().await.get(&id).cloned().ok_or(DbError::NotFound)
    }
    async fn list_events(&self) -> DbResult<Vec<Event>> {
        Ok(self.events.read().await.values().cloned().collect())
    }

    async fn get_entry(&self, id: EntryId) -> DbResult<Entry> {
        self.entries.read().await.get(&id).cloned().ok_or(DbError::NotFound)
    }
    async fn list_checked_in_entries(
        &self,
        event_id: EventId,
        weight_class_id: Option<WeightClassId>,
    ) -> DbResult<Vec<Entry>> {
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.event_id == event_id && e.checked_in)
            .filter(|e| weight_class_id.is_none() || e.weight_class_id == weight_class_id)
            .cloned()
            .collect())
    }

    async fn get_weight_class(&self, id: WeightClassId) -> DbResult<WeightClass> {
        self.weight_classes
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DbError::NotFound)
    }
    async fn list_weight_classes(&self) -> DbResult<Vec<WeightClass>> {
        Ok(self.weight_classes.read().await.values().cloned().collect())
    }

    async fn get_bracket_format(&self, id: BracketFormatId) -> DbResult<BracketFormat> {
        self.bracket_formats
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DbError::NotFound)
    }
    async fn insert_bracket_format(&self, bracket: BracketFormat) -> DbResult<()> {
        self.bracket_formats.write().await.insert(bracket.id, bracket);
        Ok(())
    }
    async fn update_bracket_format(&self, bracket: BracketFormat) -> DbResult<()> {
        self.bracket_formats.write().await.insert(bracket.id, bracket);
        Ok(())
    }
    async fn delete_bracket_format(&self, id: BracketFormatId) -> DbResult<()> {
        self.bracket_formats.write().await.remove(&id);
        Ok(())
    }

    async fn get_round(&self, id: BracketRoundId) -> DbResult<BracketRound> {
        self.rounds.read().await.get(&id).cloned().ok_or(DbError::NotFound)
    }
    async fn insert_round(&self, round: BracketRound) -> DbResult<()> {
        self.rounds.write().await.insert(round.id, round);
        Ok(())
    }
    async fn update_round(&self, round: BracketRound) -> DbResult<()> {
        self.rounds.write().await.insert(round.id, round);
        Ok(())
    }
    async fn delete_round(&self, id: BracketRoundId) -> DbResult<()> {
        self.rounds.write().await.remove(&id);
        Ok(())
    }
    async fn list_rounds_by_bracket(&self, bracket_id: BracketFormatId) -> DbResult<Vec<BracketRound>> {
        Ok(self
            .rounds
            .read()
            .await
            .values()
            .filter(|r| r.bracket_format_id == bracket_id)
            .cloned()
            .collect())
    }

    async fn get_match(&self, id: MatchId) -> DbResult<Match> {
        self.matches.read().await.get(&id).cloned().ok_or(DbError::NotFound)
    }
    async fn insert_match(&self, m: Match) -> DbResult<()> {
        self.matches.write().await.insert(m.id, m);
        Ok(())
    }
    async fn update_match(&self, m: Match) -> DbResult<()> {
        self.matches.write().await.insert(m.id, m);
        Ok(())
    }
    async fn delete_match(&self, id: MatchId) -> DbResult<()> {
        self.matches.write().await.remove(&id);
        Ok(())
    }

    async fn list_matches_by_event(&self, event_id: EventId) -> DbResult<Vec<Match>> {
        Ok(self
            .matches
            .read()
            .await
            .values()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect())
    }
    async fn list_matches_by_round(&self, round_id: BracketRoundId) -> DbResult<Vec<Match>> {
        Ok(self
            .matches
            .read()
            .await
            .values()
            .filter(|m| m.bracket_round_id == Some(round_id))
            .cloned()
            .collect())
    }
    async fn list_matches_by_bracket(&self, bracket_id: BracketFormatId) -> DbResult<Vec<Match>> {
        let round_ids: Vec<BracketRoundId> = self
            .rounds
            .read()
            .await
            .values()
            .filter(|r| r.bracket_format_id == bracket_id)
            .map(|r| r.id)
            .collect();
        Ok(self
            .matches
            .read()
            .await
            .values()
            .filter(|m| m.bracket_round_id.is_some_and(|r| round_ids.contains(&r)))
            .cloned()
            .collect())
    }
    async fn list_matches_by_status(&self, event_id: EventId, status: MatchStatus) -> DbResult<Vec<Match>> {
        Ok(self
            .matches
            .read()
            .await
            .values()
            .filter(|m| m.event_id == event_id && m.status == status)
            .cloned()
            .collect())
    }
    async fn list_matches_by_fighter(&self, event_id: EventId, fighter_id: FighterId) -> DbResult<Vec<Match>> {
        Ok(self
            .matches
            .read()
            .await
            .values()
            .filter(|m| {
                m.event_id == event_id && (m.slot_a == Some(fighter_id) || m.slot_b == Some(fighter_id))
            })
            .cloned()
            .collect())
    }
    async fn list_dependents(&self, match_id: MatchId) -> DbResult<Vec<Match>> {
        Ok(self
            .matches
            .read()
            .await
            .values()
            .filter(|m| {
                m.dependency_a.is_some_and(|d| d.source == match_id)
                    || m.dependency_b.is_some_and(|d| d.source == match_id)
            })
            .cloned()
            .collect())
    }
    async fn list_completed_matches(&self) -> DbResult<Vec<Match>> {
        Ok(self
            .matches
            .read()
            .await
            .values()
            .filter(|m| m.result.is_some())
            .cloned()
            .collect())
    }
}
