//! freestanding (non-bracket) match scheduling (spec §4.4 `createManualMatch`).

use chrono::Utc;

use crate::error::{entity_err, CoreError, CoreResult};
use crate::model::{EventId, FighterId, Match, MatchStatus, WeightClassId};
use crate::pairing::weight_aware::{is_weight_legal, match_weight_class, FighterAttrs};
use crate::storage::StoragePort;

use super::BracketEngine;

impl BracketEngine {
    pub async fn create_manual_match(
        &self,
        event_id: EventId,
        fighter_a: FighterId,
        fighter_b: FighterId,
        weight_class_id: Option<WeightClassId>,
    ) -> CoreResult<Match> {
        if fighter_a == fighter_b {
            return Err(CoreError::InvalidState(
                "a match cannot be scheduled against oneself".into(),
            ));
        }

        let entries = self
            .storage
            .list_checked_in_entries(event_id, None)
            .await
            .map_err(entity_err("entry"))?;
        let entry_a = entries.iter().find(|e| e.fighter_id == fighter_a).ok_or_else(|| {
            CoreError::InvalidState(format!("fighter {fighter_a} is not checked in"))
        })?;
        let entry_b = entries.iter().find(|e| e.fighter_id == fighter_b).ok_or_else(|| {
            CoreError::InvalidState(format!("fighter {fighter_b} is not checked in"))
        })?;

        let same_class =
            entry_a.weight_class_id.is_some() && entry_a.weight_class_id == entry_b.weight_class_id;
        if !same_class && !is_weight_legal(entry_a.snapshot_weight_lb, entry_b.snapshot_weight_lb) {
            return Err(CoreError::WeightMismatch(format!(
                "fighters {fighter_a} and {fighter_b} are outside the weight tolerance and not in the same class"
            )));
        }

        // spec §4.4: absent an explicit weight class, default to the
        // heavier fighter's class (same convention as §4.3.6 pairing).
        let attrs_a = FighterAttrs {
            weight_lb: entry_a.snapshot_weight_lb,
            weight_class_id: entry_a.weight_class_id,
            rating: 0.0,
        };
        let attrs_b = FighterAttrs {
            weight_lb: entry_b.snapshot_weight_lb,
            weight_class_id: entry_b.weight_class_id,
            rating: 0.0,
        };
        let resolved_class = weight_class_id.or_else(|| match_weight_class(&attrs_a, &attrs_b));

        let now = Utc::now();
        let m = Match {
            id: uuid::Uuid::new_v4(),
            event_id,
            bracket_round_id: None,
            slot_a: Some(fighter_a),
            slot_b: Some(fighter_b),
            weight_class_id: resolved_class,
            result: None,
            method: None,
            duration_seconds: None,
            status: MatchStatus::Ready,
            position: None,
            dependency_a: None,
            dependency_b: None,
            resolved_a: false,
            resolved_b: false,
            a_elo_change: None,
            b_elo_change: None,
            created_at: now,
            completed_at: None,
        };
        self.storage.insert_match(m.clone()).await.map_err(entity_err("match"))?;
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BeltRank, EntityStatus, Entry, Fighter, RatingBook};
    use crate::storage::in_memory::InMemoryStorage;
    use std::sync::Arc;
    use uuid::Uuid;

    fn fighter(weight: u32) -> Fighter {
        Fighter {
            id: Uuid::new_v4(),
            display_name: "x".into(),
            belt_rank: BeltRank::Blue,
            body_weight_lb: Some(weight),
            primary_weight_class_id: None,
            ratings: RatingBook::reset_to_baseline(BeltRank::Blue),
            badges: vec![],
            status: EntityStatus::Active,
        }
    }

    fn entry(event_id: Uuid, fighter_id: Uuid, weight: u32) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            event_id,
            fighter_id,
            weight_class_id: None,
            checked_in: true,
            snapshot_belt_rank: BeltRank::Blue,
            snapshot_weight_lb: Some(weight),
        }
    }

    #[tokio::test]
    async fn rejects_a_fighter_against_themself() {
        let storage = Arc::new(InMemoryStorage::new());
        let engine = BracketEngine::new(storage);
        let f = Uuid::new_v4();
        let err = engine
            .create_manual_match(Uuid::new_v4(), f, f, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[tokio::test]
    async fn rejects_pairs_outside_weight_tolerance() {
        let storage = Arc::new(InMemoryStorage::new());
        let event_id = Uuid::new_v4();
        let a = fighter(150);
        let b = fighter(220);
        storage.seed_fighter(a.clone()).await;
        storage.seed_fighter(b.clone()).await;
        storage.seed_entry(entry(event_id, a.id, 150)).await;
        storage.seed_entry(entry(event_id, b.id, 220)).await;

        let engine = BracketEngine::new(storage);
        let err = engine.create_manual_match(event_id, a.id, b.id, None).await.unwrap_err();
        assert!(matches!(err, CoreError::WeightMismatch(_)));
    }

    #[tokio::test]
    async fn legal_pair_is_scheduled_ready() {
        let storage = Arc::new(InMemoryStorage::new());
        let event_id = Uuid::new_v4();
        let a = fighter(150);
        let b = fighter(160);
        storage.seed_fighter(a.clone()).await;
        storage.seed_fighter(b.clone()).await;
        storage.seed_entry(entry(event_id, a.id, 150)).await;
        storage.seed_entry(entry(event_id, b.id, 160)).await;

        let engine = BracketEngine::new(storage);
        let m = engine.create_manual_match(event_id, a.id, b.id, None).await.unwrap();
        assert_eq!(m.status, MatchStatus::Ready);
        assert!(m.both_slots_set());
    }

    #[tokio::test]
    async fn defaults_weight_class_to_the_heavier_fighter_when_not_supplied() {
        let storage = Arc::new(InMemoryStorage::new());
        let event_id = Uuid::new_v4();
        let lighter = fighter(150);
        let heavier = fighter(175);
        storage.seed_fighter(lighter.clone()).await;
        storage.seed_fighter(heavier.clone()).await;
        let lighter_class = Uuid::new_v4();
        let heavier_class = Uuid::new_v4();
        storage
            .seed_entry(Entry {
                id: Uuid::new_v4(),
                event_id,
                fighter_id: lighter.id,
                weight_class_id: Some(lighter_class),
                checked_in: true,
                snapshot_belt_rank: BeltRank::Blue,
                snapshot_weight_lb: Some(150),
            })
            .await;
        storage
            .seed_entry(Entry {
                id: Uuid::new_v4(),
                event_id,
                fighter_id: heavier.id,
                weight_class_id: Some(heavier_class),
                checked_in: true,
                snapshot_belt_rank: BeltRank::Blue,
                snapshot_weight_lb: Some(175),
            })
            .await;

        let engine = BracketEngine::new(storage);
        // passing fighter ids in (lighter, heavier) order, so a naive "first
        // argument's class" default would pick the wrong one.
        let m = engine
            .create_manual_match(event_id, lighter.id, heavier.id, None)
            .await
            .unwrap();
        assert_eq!(m.weight_class_id, Some(heavier_class));
    }
}
