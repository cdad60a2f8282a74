//! bracket lifecycle: `createBracket`, `generateBracket`, `deleteBracket`
//! (spec §4.4).

use std::collections::HashMap;

use chrono::Utc;
use rand::thread_rng;

use crate::error::{entity_err, CoreError, CoreResult};
use crate::model::{
    BracketConfig, BracketFormat, BracketFormatId, BracketRound, BracketRoundId, EventId,
    FighterId, Match, MatchId, MatchStatus, RoundMetadata, RoundStatus, SeedingMethod,
    WeightClassId,
};
use crate::pairing::weight_aware::FighterAttrs;
use crate::pairing::{
    double_elim, guaranteed, round_robin, single_elim, swiss, IdentityShuffler, RandShuffler,
    RoundActivation, RoundPlan, Shuffler,
};
use crate::storage::StoragePort;
use crate::utils::validation::{FieldError, ValidationErrors};

use super::BracketEngine;

/// dispatches to a concrete shuffler without requiring `dyn Shuffler`
/// (`Shuffler::shuffle` is generic over `T`, so the trait isn't object-safe).
enum EngineShuffler {
    Random(RandShuffler<rand::rngs::ThreadRng>),
    Identity(IdentityShuffler),
}

impl Shuffler for EngineShuffler {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        match self {
            EngineShuffler::Random(r) => r.shuffle(items),
            EngineShuffler::Identity(i) => i.shuffle(items),
        }
    }
}

fn engine_shuffler(seeding: SeedingMethod) -> EngineShuffler {
    match seeding {
        SeedingMethod::Random => EngineShuffler::Random(RandShuffler(thread_rng())),
        SeedingMethod::InputOrder => EngineShuffler::Identity(IdentityShuffler),
    }
}

/// validates the recognized config keys of spec §3's table, reporting every
/// violation through the `FieldError`/`ValidationErrors` builder (ambient
/// stack per SPEC_FULL.md §2, reused from `app_core::utils::validation`)
/// rather than a bare string, so a façade can surface field-scoped messages.
fn validate_config(config: &BracketConfig) -> CoreResult<()> {
    let mut errors = ValidationErrors::new();
    match config {
        BracketConfig::GuaranteedMatches { match_count, .. } => {
            if *match_count == 0 {
                errors.add(
                    FieldError::builder()
                        .set_field("match_count")
                        .add_user_defined_code("out_of_range")
                        .add_message("match_count must be at least 1")
                        .build(),
                );
            }
        }
        BracketConfig::Swiss { rounds: Some(0), .. } => {
            errors.add(
                FieldError::builder()
                    .set_field("rounds")
                    .add_user_defined_code("out_of_range")
                    .add_message("rounds must be at least 1 when set explicitly")
                    .build(),
            );
        }
        _ => {}
    }
    errors.into_result().map_err(Into::into)
}

impl BracketEngine {
    pub async fn create_bracket(
        &self,
        event_id: EventId,
        weight_class_id: Option<WeightClassId>,
        config: BracketConfig,
        min_rest_minutes: u32,
        auto_generate: bool,
    ) -> CoreResult<BracketFormat> {
        validate_config(&config)?;
        let bracket = BracketFormat {
            id: uuid::Uuid::new_v4(),
            event_id,
            weight_class_id,
            config,
            min_rest_minutes,
            auto_generate,
            generated: false,
            finalized: false,
        };
        self.storage
            .insert_bracket_format(bracket.clone())
            .await
            .map_err(entity_err("bracket_format"))?;
        Ok(bracket)
    }

    pub async fn delete_bracket(&self, bracket_format_id: BracketFormatId) -> CoreResult<()> {
        let rounds = self
            .storage
            .list_rounds_by_bracket(bracket_format_id)
            .await
            .map_err(entity_err("bracket_round"))?;
        let mut any_had_result = false;
        for round in rounds {
            let matches = self
                .storage
                .list_matches_by_round(round.id)
                .await
                .map_err(entity_err("match"))?;
            for m in matches {
                any_had_result |= m.result.is_some();
                self.storage.delete_match(m.id).await.map_err(entity_err("match"))?;
            }
            self.storage.delete_round(round.id).await.map_err(entity_err("bracket_round"))?;
        }
        self.storage
            .delete_bracket_format(bracket_format_id)
            .await
            .map_err(entity_err("bracket_format"))?;

        // spec §4.4 `deleteBracket`: "if any deleted match had a result,
        // triggers rating replay."
        if any_had_result {
            self.trigger_replay().await;
        }
        Ok(())
    }

    /// fighter attributes keyed by id, read from the checked-in entries of
    /// `bracket`'s scope — weight-aware pairing (spec §4.3.6) and continuation
    /// pairing both need this snapshot.
    pub(crate) async fn fighter_attrs(
        &self,
        bracket: &BracketFormat,
    ) -> CoreResult<HashMap<FighterId, FighterAttrs>> {
        let entries = self
            .storage
            .list_checked_in_entries(bracket.event_id, bracket.weight_class_id)
            .await
            .map_err(entity_err("entry"))?;
        let mut attrs = HashMap::new();
        for e in entries {
            let rating = match self.storage.get_fighter(e.fighter_id).await {
                Ok(f) => f.ratings.overall,
                Err(_) => 1200.0,
            };
            attrs.insert(
                e.fighter_id,
                FighterAttrs {
                    weight_lb: e.snapshot_weight_lb,
                    weight_class_id: e.weight_class_id,
                    rating,
                },
            );
        }
        Ok(attrs)
    }

    /// inserts one round and its matches, returning the new round's id, all
    /// of its materialized match ids (in plan order, for the dependency
    /// lookup table), and the subset completed immediately as byes.
    pub(crate) async fn materialize_round(
        &self,
        bracket: &BracketFormat,
        round_number: u32,
        round_plan: RoundPlan,
        metadata_extra: RoundMetadata,
        round_ids: &[Vec<MatchId>],
    ) -> CoreResult<(BracketRoundId, Vec<MatchId>, Vec<MatchId>)> {
        let round_id = uuid::Uuid::new_v4();
        let status = match round_plan.activation {
            RoundActivation::Active => RoundStatus::InProgress,
            RoundActivation::Pending => RoundStatus::Pending,
        };
        let metadata = RoundMetadata {
            lane: round_plan.lane,
            losers_kind: round_plan.losers_kind,
            feeds_from_winners: round_plan.feeds_from_winners,
            total_rounds: metadata_extra.total_rounds,
            total_matches_per_fighter: metadata_extra.total_matches_per_fighter,
            max_rematches: metadata_extra.max_rematches,
        };
        let round = BracketRound {
            id: round_id,
            bracket_format_id: bracket.id,
            round_number,
            display_name: round_plan.display_name.clone(),
            status,
            metadata,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.storage.insert_round(round).await.map_err(entity_err("bracket_round"))?;

        let mut matches: Vec<Match> = Self::build_matches_for_round(
            bracket.event_id,
            round_id,
            &round_plan.matches,
            bracket.weight_class_id,
            round_ids,
        );
        if round_plan.activation == RoundActivation::Pending {
            for m in &mut matches {
                if m.status == MatchStatus::Ready {
                    m.status = MatchStatus::Pending;
                }
            }
        }

        let mut all_ids = Vec::with_capacity(matches.len());
        let mut completed_ids = Vec::new();
        for m in matches {
            all_ids.push(m.id);
            if m.status == MatchStatus::Completed {
                completed_ids.push(m.id);
            }
            self.storage.insert_match(m).await.map_err(entity_err("match"))?;
        }

        Ok((round_id, all_ids, completed_ids))
    }

    pub async fn generate_bracket(&self, bracket_format_id: BracketFormatId) -> CoreResult<()> {
        let mut bracket = self
            .storage
            .get_bracket_format(bracket_format_id)
            .await
            .map_err(entity_err("bracket_format"))?;
        if bracket.generated {
            return Err(CoreError::AlreadyGenerated(bracket_format_id));
        }

        let mut entries = self
            .storage
            .list_checked_in_entries(bracket.event_id, bracket.weight_class_id)
            .await
            .map_err(entity_err("entry"))?;
        // entries carry no ordering field of their own; sorting by fighter id
        // gives every caller (tests included) a stable, reproducible order to
        // seed from (DESIGN.md, bracket generation).
        entries.sort_by_key(|e| e.fighter_id);
        let participants: Vec<FighterId> = entries.iter().map(|e| e.fighter_id).collect();

        let seeding = bracket.config.seeding_method();
        let mut shuffler = engine_shuffler(seeding);

        let mut completed_at_creation: Vec<MatchId> = Vec::new();

        match bracket.config {
            BracketConfig::SingleElim { .. } => {
                let plan = single_elim::build(&participants, seeding, &mut shuffler)?;
                completed_at_creation = self.materialize_full_plan(&bracket, plan).await?;
            }
            BracketConfig::DoubleElim { .. } => {
                let plan = double_elim::build(&participants, seeding, &mut shuffler)?;
                completed_at_creation = self.materialize_full_plan(&bracket, plan).await?;
            }
            BracketConfig::RoundRobin { .. } => {
                let plan = round_robin::build(&participants, seeding, &mut shuffler)?;
                completed_at_creation = self.materialize_full_plan(&bracket, plan).await?;
            }
            BracketConfig::Swiss { rounds, .. } => {
                let total_rounds = rounds.unwrap_or_else(|| swiss::default_total_rounds(participants.len()));
                let plan = swiss::round1(&participants, seeding, &mut shuffler)?;
                let round_plan = RoundPlan {
                    display_name: "Round 1".to_string(),
                    lane: None,
                    losers_kind: None,
                    feeds_from_winners: None,
                    activation: RoundActivation::Active,
                    matches: plan,
                };
                let metadata = RoundMetadata {
                    total_rounds: Some(total_rounds),
                    ..Default::default()
                };
                let (_, _, completed) = self
                    .materialize_round(&bracket, 1, round_plan, metadata, &[])
                    .await?;
                completed_at_creation = completed;
                bracket.config = BracketConfig::Swiss {
                    seeding_method: seeding,
                    rounds: Some(total_rounds),
                };
            }
            BracketConfig::GuaranteedMatches {
                match_count,
                max_rematches,
                weight_based_pairing,
                ..
            } => {
                // spec §4.3.5: single-class brackets always pair
                // consecutively, regardless of `weight_based_pairing` — the
                // weight-aware candidate search only matters when the
                // bracket spans multiple classes.
                let use_weight_aware = weight_based_pairing && bracket.weight_class_id.is_none();
                let plan = if use_weight_aware {
                    let attrs = self.fighter_attrs(&bracket).await?;
                    let mut sorted = participants.clone();
                    if seeding == SeedingMethod::Random {
                        shuffler.shuffle(&mut sorted);
                    }
                    sorted.sort_by(|a, b| {
                        let wa = attrs.get(a).and_then(|x| x.weight_lb).unwrap_or(0);
                        let wb = attrs.get(b).and_then(|x| x.weight_lb).unwrap_or(0);
                        wb.cmp(&wa)
                    });
                    crate::pairing::weight_aware::pair(&sorted, &attrs, &HashMap::new(), max_rematches)
                } else {
                    guaranteed::round1_simple(&participants, seeding, &mut shuffler)?
                };
                let round_plan = RoundPlan {
                    display_name: "Round 1".to_string(),
                    lane: None,
                    losers_kind: None,
                    feeds_from_winners: None,
                    activation: RoundActivation::Active,
                    matches: plan,
                };
                let metadata = RoundMetadata {
                    total_matches_per_fighter: Some(match_count),
                    max_rematches: Some(max_rematches),
                    ..Default::default()
                };
                let (_, _, completed) = self
                    .materialize_round(&bracket, 1, round_plan, metadata, &[])
                    .await?;
                completed_at_creation = completed;
            }
        }

        bracket.generated = true;
        self.storage
            .update_bracket_format(bracket.clone())
            .await
            .map_err(entity_err("bracket_format"))?;

        for id in completed_at_creation {
            self.propagate_from(id).await?;
        }
        self.activate_rounds_for_bracket(bracket.id).await;
        self.trigger_replay().await;
        Ok(())
    }

    /// materializes every round of a fully pre-built plan (single/double
    /// elim, round robin), threading the dependency lookup table forward as
    /// each round's match ids become known.
    async fn materialize_full_plan(
        &self,
        bracket: &BracketFormat,
        plan: crate::pairing::BracketPlan,
    ) -> CoreResult<Vec<MatchId>> {
        let mut round_ids: Vec<Vec<MatchId>> = Vec::with_capacity(plan.rounds.len());
        let mut completed = Vec::new();
        for (idx, round_plan) in plan.rounds.into_iter().enumerate() {
            let (_, ids, done) = self
                .materialize_round(
                    bracket,
                    idx as u32 + 1,
                    round_plan,
                    RoundMetadata::default(),
                    &round_ids,
                )
                .await?;
            completed.extend(done);
            round_ids.push(ids);
        }
        Ok(completed)
    }
}
