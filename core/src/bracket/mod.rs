//! the bracket state machine (spec §4.4): the central orchestrator that
//! creates brackets, materializes pairing-strategy plans into stored rounds
//! and matches, ingests results, propagates them through the dependency
//! graph, resolves byes, detects round completion, and invokes the
//! relevant pairing strategy again for formats that generate rounds
//! dynamically (Swiss, GuaranteedMatches).
//!
//! One `BracketEngine` per request/worker, holding only a storage handle —
//! spec §5: "the process holds no bracket-state caches."

mod generation;
mod manual;
mod recommend;
mod results;
mod tale_of_the_tape;
mod upcoming;

pub use recommend::{recommend as recommend_format, FormatRecommendation};
pub use tale_of_the_tape::TaleOfTheTape;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{entity_err, CoreResult};
use crate::model::{
    BracketFormat, BracketFormatId, BracketRoundId, Event, EventId, Fighter,
    FighterId, Match, MatchDependency, MatchId, MatchStatus, RoundStatus, WeightClass,
    WeightClassId,
};
use crate::pairing::{MatchPlan, MatchPlanKind, SlotSource};
use crate::rating;
use crate::storage::StoragePort;

pub struct BracketEngine {
    storage: Arc<dyn StoragePort>,
}

impl BracketEngine {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        BracketEngine { storage }
    }

    /// consumes all completed matches and replays ratings from scratch
    /// (spec §4.2). This is the explicit `POST /rankings/recalculate-elo`
    /// entry point — failures here are NOT swallowed, unlike the
    /// best-effort trigger fired after every mutation (spec §7).
    pub async fn replay(&self) -> CoreResult<()> {
        let fighters_vec = self.storage.list_fighters().await.map_err(entity_err("fighter"))?;
        let mut fighters: HashMap<FighterId, Fighter> =
            fighters_vec.into_iter().map(|f| (f.id, f)).collect();
        let mut matches = self
            .storage
            .list_completed_matches()
            .await
            .map_err(entity_err("match"))?;
        let events: HashMap<EventId, Event> = self
            .storage
            .list_events()
            .await
            .map_err(entity_err("event"))?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();
        let weight_classes: HashMap<WeightClassId, WeightClass> = self
            .storage
            .list_weight_classes()
            .await
            .map_err(entity_err("weight_class"))?
            .into_iter()
            .map(|w| (w.id, w))
            .collect();

        rating::replay::replay(&mut fighters, &mut matches, &events, &weight_classes);

        for fighter in fighters.into_values() {
            self.storage.update_fighter(fighter).await.map_err(entity_err("fighter"))?;
        }
        for m in matches {
            self.storage.update_match(m).await.map_err(entity_err("match"))?;
        }
        Ok(())
    }

    /// fire-and-forget replay invocation after a result mutation (spec §7:
    /// "failures are logged and swallowed; the next explicit replay call
    /// will reconverge").
    pub(crate) async fn trigger_replay(&self) {
        if let Err(e) = self.replay().await {
            log::warn!("post-mutation rating replay failed, will reconverge on next explicit call: {e}");
        }
    }

    pub(crate) async fn finalize_bracket(&self, bracket: &BracketFormat) -> CoreResult<()> {
        let mut b = bracket.clone();
        b.finalized = true;
        self.storage
            .update_bracket_format(b)
            .await
            .map_err(entity_err("bracket_format"))
    }

    /// promotes any Pending round with at least one Ready match to
    /// InProgress (spec §4.4 propagation step 5).
    pub(crate) async fn activate_rounds_for_bracket(&self, bracket_format_id: BracketFormatId) {
        let rounds = match self.storage.list_rounds_by_bracket(bracket_format_id).await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("could not scan rounds for activation: {e}");
                return;
            }
        };
        for round in rounds {
            if round.status != RoundStatus::Pending {
                continue;
            }
            let matches = match self.storage.list_matches_by_round(round.id).await {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("could not list matches for round {}: {e}", round.id);
                    continue;
                }
            };
            if matches.iter().any(|m| m.status == MatchStatus::Ready) {
                let mut r = round;
                r.status = RoundStatus::InProgress;
                if let Err(e) = self.storage.update_round(r).await {
                    log::warn!("could not activate round: {e}");
                }
            }
        }
    }

    /// the original round-1 participant order for a bracket, reconstructed
    /// from round 1's matches (position order, slot A then slot B) —
    /// Swiss/GuaranteedMatches continuation pairing needs a stable fighter
    /// ordering for deterministic tie-breaks, and round 1 is the only round
    /// whose slots are all concrete `Fighter` sources at materialization.
    pub(crate) async fn bracket_participant_order(
        &self,
        bracket_format_id: BracketFormatId,
    ) -> CoreResult<Vec<FighterId>> {
        let rounds = self
            .storage
            .list_rounds_by_bracket(bracket_format_id)
            .await
            .map_err(entity_err("bracket_round"))?;
        let Some(round1) = rounds.into_iter().find(|r| r.round_number == 1) else {
            return Ok(Vec::new());
        };
        let mut matches = self
            .storage
            .list_matches_by_round(round1.id)
            .await
            .map_err(entity_err("match"))?;
        matches.sort_by_key(|m| m.position.unwrap_or(u32::MAX));
        let mut seen = std::collections::HashSet::new();
        let mut order = Vec::new();
        for m in matches {
            for slot in [m.slot_a, m.slot_b] {
                if let Some(id) = slot {
                    if seen.insert(id) {
                        order.push(id);
                    }
                }
            }
        }
        Ok(order)
    }

    /// resolves a pairing-strategy `SlotSource` into a concrete fighter id
    /// (if already known) and/or a `MatchDependency` pointing at an
    /// earlier-materialized match, using `round_ids[round_index][match_index]`
    /// as the lookup table built up as rounds are created in order. Dynamic
    /// continuation rounds (Swiss/GuaranteedMatches) pass an empty table —
    /// their plans only ever use `Fighter`/`Tbd` sources.
    pub(crate) fn resolve_slot(
        source: SlotSource,
        round_ids: &[Vec<MatchId>],
    ) -> (Option<FighterId>, Option<MatchDependency>) {
        match source {
            SlotSource::Fighter(id) => (Some(id), None),
            SlotSource::DependsOn {
                round_index,
                match_index,
                requires_winner,
            } => {
                let source = round_ids
                    .get(round_index)
                    .and_then(|ids| ids.get(match_index))
                    .copied();
                match source {
                    Some(source) => (None, Some(MatchDependency { source, requires_winner })),
                    None => (None, None),
                }
            }
            SlotSource::Tbd => (None, None),
        }
    }

    /// builds the stored `Match` rows for one round's plan, given the
    /// dependency lookup table for rounds materialized so far. Returns the
    /// matches (not yet inserted) plus the subset that completed
    /// immediately as byes and need propagating once inserted.
    pub(crate) fn build_matches_for_round(
        event_id: EventId,
        round_id: BracketRoundId,
        plans: &[MatchPlan],
        default_weight_class: Option<WeightClassId>,
        round_ids: &[Vec<MatchId>],
    ) -> Vec<Match> {
        plans
            .iter()
            .enumerate()
            .map(|(idx, plan)| {
                let (mut fighter_a, mut dep_a) = Self::resolve_slot(plan.slot_a, round_ids);
                let (mut fighter_b, mut dep_b) = Self::resolve_slot(plan.slot_b, round_ids);

                let a_real = !matches!(plan.slot_a, SlotSource::Tbd);
                let b_real = !matches!(plan.slot_b, SlotSource::Tbd);
                let forced_bye = matches!(plan.kind, MatchPlanKind::Bye) || (a_real != b_real);

                if forced_bye && !a_real && b_real {
                    // the known side landed in slot B; byes are always
                    // recorded with the known fighter in slot A (spec §3
                    // invariant: bye ⇒ B-slot null).
                    std::mem::swap(&mut fighter_a, &mut fighter_b);
                    std::mem::swap(&mut dep_a, &mut dep_b);
                }

                let now = Utc::now();
                let weight_class_id = plan.weight_class_id.or(default_weight_class);

                if forced_bye {
                    if let Some(winner) = fighter_a {
                        Match {
                            id: uuid::Uuid::new_v4(),
                            event_id,
                            bracket_round_id: Some(round_id),
                            slot_a: Some(winner),
                            slot_b: None,
                            weight_class_id,
                            result: Some(crate::model::MatchResultKind::PlayerAWin),
                            method: Some(crate::model::METHOD_BYE.to_string()),
                            duration_seconds: Some(0),
                            status: MatchStatus::Completed,
                            position: Some(idx as u32 + 1),
                            dependency_a: dep_a,
                            dependency_b: None,
                            resolved_a: false,
                            resolved_b: false,
                            a_elo_change: None,
                            b_elo_change: None,
                            created_at: now,
                            completed_at: Some(now),
                        }
                    } else {
                        // the winner isn't known yet: a dependency-driven
                        // bye-forward (spec §4.3.2 "single-slot bye-forward
                        // match"). `method` is pre-marked so propagation
                        // recognizes it once slot A resolves.
                        Match {
                            id: uuid::Uuid::new_v4(),
                            event_id,
                            bracket_round_id: Some(round_id),
                            slot_a: None,
                            slot_b: None,
                            weight_class_id,
                            result: None,
                            method: Some(crate::model::METHOD_BYE.to_string()),
                            duration_seconds: None,
                            status: MatchStatus::Pending,
                            position: Some(idx as u32 + 1),
                            dependency_a: dep_a,
                            dependency_b: None,
                            resolved_a: false,
                            resolved_b: false,
                            a_elo_change: None,
                            b_elo_change: None,
                            created_at: now,
                            completed_at: None,
                        }
                    }
                } else {
                    let both_known = fighter_a.is_some() && fighter_b.is_some();
                    Match {
                        id: uuid::Uuid::new_v4(),
                        event_id,
                        bracket_round_id: Some(round_id),
                        slot_a: fighter_a,
                        slot_b: fighter_b,
                        weight_class_id,
                        result: None,
                        method: None,
                        duration_seconds: None,
                        status: if both_known {
                            MatchStatus::Ready
                        } else {
                            MatchStatus::Pending
                        },
                        position: Some(idx as u32 + 1),
                        dependency_a: dep_a,
                        dependency_b: dep_b,
                        resolved_a: false,
                        resolved_b: false,
                        a_elo_change: None,
                        b_elo_change: None,
                        created_at: now,
                        completed_at: None,
                    }
                }
            })
            .collect()
    }
}
