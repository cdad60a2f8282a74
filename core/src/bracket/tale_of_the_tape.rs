//! the "tale of the tape" composed read (SPEC_FULL.md §10 supplement,
//! grounded on `elo_service.get_head_to_head` and
//! `elo_service.preview_elo_changes` in original_source/): head-to-head
//! record plus a preview of each possible outcome's rating swing, for two
//! fighters being weighed as a matchup.

use crate::error::{entity_err, CoreResult};
use crate::model::{FighterId, WeightClassId};
use crate::pairing::standings::{build_head_to_head_index, HeadToHead};
use crate::rating::kernel;
use crate::rating::replay::class_track;
use crate::storage::StoragePort;

use super::BracketEngine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaleOfTheTape {
    pub head_to_head: HeadToHead,
    /// fighter A's overall-track rating delta for [A wins, draw, B wins].
    pub overall_preview_a: [f64; 3],
    /// fighter A's class-track rating delta, when `weight_class_id` resolves.
    pub class_preview_a: Option<[f64; 3]>,
}

impl BracketEngine {
    pub async fn tale_of_the_tape(
        &self,
        fighter_a: FighterId,
        fighter_b: FighterId,
        weight_class_id: Option<WeightClassId>,
    ) -> CoreResult<TaleOfTheTape> {
        let a = self.storage.get_fighter(fighter_a).await.map_err(entity_err("fighter"))?;
        let b = self.storage.get_fighter(fighter_b).await.map_err(entity_err("fighter"))?;

        let completed = self.storage.list_completed_matches().await.map_err(entity_err("match"))?;
        let index = build_head_to_head_index(&completed);
        let head_to_head = index.get(&(fighter_a, fighter_b)).copied().unwrap_or_default();

        let a_played = completed
            .iter()
            .filter(|m| m.slot_a == Some(fighter_a) || m.slot_b == Some(fighter_a))
            .count() as u32;
        let overall_preview_a = kernel::preview_outcomes(a.ratings.overall, b.ratings.overall, a_played);

        let class_preview_a = match weight_class_id {
            Some(id) => match self.storage.get_weight_class(id).await {
                Ok(class) => {
                    let track = class_track(&class);
                    let rating_a = a.ratings.track(track).current;
                    let rating_b = b.ratings.track(track).current;
                    Some(kernel::preview_outcomes(rating_a, rating_b, a_played))
                }
                Err(_) => None,
            },
            None => None,
        };

        Ok(TaleOfTheTape {
            head_to_head,
            overall_preview_a,
            class_preview_a,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BeltRank, EntityStatus, Fighter, RatingBook};
    use crate::storage::in_memory::InMemoryStorage;
    use std::sync::Arc;
    use uuid::Uuid;

    fn fighter() -> Fighter {
        Fighter {
            id: Uuid::new_v4(),
            display_name: "x".into(),
            belt_rank: BeltRank::Blue,
            body_weight_lb: Some(170),
            primary_weight_class_id: None,
            ratings: RatingBook::reset_to_baseline(BeltRank::Blue),
            badges: vec![],
            status: EntityStatus::Active,
        }
    }

    #[tokio::test]
    async fn no_history_yields_zeroed_head_to_head() {
        let storage = Arc::new(InMemoryStorage::new());
        let a = fighter();
        let b = fighter();
        storage.seed_fighter(a.clone()).await;
        storage.seed_fighter(b.clone()).await;

        let engine = BracketEngine::new(storage);
        let tape = engine.tale_of_the_tape(a.id, b.id, None).await.unwrap();
        assert_eq!(tape.head_to_head, HeadToHead::default());
        assert_eq!(tape.class_preview_a, None);
    }
}
