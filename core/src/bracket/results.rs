//! result ingestion and dependency-graph propagation (spec §4.4
//! `updateMatchResult`/`undoMatchResult`/`deleteMatch` and the propagation
//! algorithm they share).

use std::collections::{HashSet, VecDeque};

use chrono::Utc;

use crate::error::{entity_err, CoreError, CoreResult};
use crate::model::{
    BracketFormat, BracketFormatId, BracketRound, FighterId, Match, MatchDependency, MatchId,
    MatchResultKind, MatchStatus, RoundStatus, TournamentFormat, BracketConfig,
};
use crate::pairing::{guaranteed, standings, swiss, weight_aware, RoundActivation, RoundPlan};
use crate::model::RoundMetadata;
use crate::storage::StoragePort;

use super::BracketEngine;

enum Resolution {
    Fighter(FighterId),
    /// the predecessor completed but had no candidate for the requested
    /// side (e.g. a bye has no loser) — this dependency will never resolve.
    Dead,
    Pending,
}

impl BracketEngine {
    pub async fn update_match_result(
        &self,
        match_id: MatchId,
        result: MatchResultKind,
        method: Option<String>,
        duration_seconds: Option<u32>,
    ) -> CoreResult<()> {
        let mut m = self.storage.get_match(match_id).await.map_err(entity_err("match"))?;
        if m.status == MatchStatus::Completed {
            return Err(CoreError::InvalidState(format!(
                "match {match_id} already has a result; undo it first"
            )));
        }
        if m.status == MatchStatus::Cancelled {
            return Err(CoreError::InvalidState(format!("match {match_id} is cancelled")));
        }
        if !m.both_slots_set() {
            return Err(CoreError::InvalidState(format!(
                "match {match_id} is missing a participant"
            )));
        }

        m.result = Some(result);
        m.method = method;
        m.duration_seconds = duration_seconds;
        m.status = MatchStatus::Completed;
        m.completed_at = Some(Utc::now());
        self.storage.update_match(m).await.map_err(entity_err("match"))?;

        self.propagate_from(match_id).await?;
        self.trigger_replay().await;
        Ok(())
    }

    pub async fn undo_match_result(&self, match_id: MatchId) -> CoreResult<()> {
        let mut m = self.storage.get_match(match_id).await.map_err(entity_err("match"))?;
        if m.is_bye() {
            return Err(CoreError::InvalidState(format!(
                "match {match_id} is an automatic bye and cannot be undone"
            )));
        }
        if m.result.is_none() {
            return Err(CoreError::InvalidState(format!("match {match_id} has no result to undo")));
        }
        let dependents = self.storage.list_dependents(match_id).await.map_err(entity_err("match"))?;
        if dependents.iter().any(|d| d.status == MatchStatus::Completed) {
            return Err(CoreError::InvalidState(format!(
                "match {match_id} has completed dependents; undo those first"
            )));
        }

        m.result = None;
        m.method = None;
        m.duration_seconds = None;
        m.completed_at = None;
        m.a_elo_change = None;
        m.b_elo_change = None;
        m.status = MatchStatus::Ready;
        self.storage.update_match(m).await.map_err(entity_err("match"))?;

        for mut dep in dependents {
            let mut changed = false;
            if dep.dependency_a.is_some_and(|d| d.source == match_id) {
                dep.slot_a = None;
                dep.resolved_a = false;
                changed = true;
            }
            if dep.dependency_b.is_some_and(|d| d.source == match_id) {
                dep.slot_b = None;
                dep.resolved_b = false;
                changed = true;
            }
            if changed {
                dep.status = MatchStatus::Pending;
                self.storage.update_match(dep).await.map_err(entity_err("match"))?;
            }
        }

        if let Some(round_id) = self.storage.get_match(match_id).await.ok().and_then(|m| m.bracket_round_id) {
            if let Ok(round) = self.storage.get_round(round_id).await {
                if round.status == RoundStatus::Completed {
                    let mut r = round;
                    r.status = RoundStatus::InProgress;
                    r.completed_at = None;
                    let _ = self.storage.update_round(r).await;
                }
            }
        }

        self.trigger_replay().await;
        Ok(())
    }

    /// removes a match and clears the dependency reference and any
    /// populated slot in every dependent match (spec §4.4 `deleteMatch`:
    /// "clears dependency references and populated slots in all
    /// dependents; triggers replay if had result"). Unlike `undoMatchResult`,
    /// the dependency pointer itself is cleared here since its source is
    /// gone for good.
    pub async fn delete_match(&self, match_id: MatchId) -> CoreResult<()> {
        let m = self.storage.get_match(match_id).await.map_err(entity_err("match"))?;
        let had_result = m.result.is_some();

        let dependents = self.storage.list_dependents(match_id).await.map_err(entity_err("match"))?;
        for mut dep in dependents {
            let mut changed = false;
            if dep.dependency_a.is_some_and(|d| d.source == match_id) {
                dep.dependency_a = None;
                dep.slot_a = None;
                dep.resolved_a = false;
                changed = true;
            }
            if dep.dependency_b.is_some_and(|d| d.source == match_id) {
                dep.dependency_b = None;
                dep.slot_b = None;
                dep.resolved_b = false;
                changed = true;
            }
            if changed {
                if dep.status == MatchStatus::Completed {
                    dep.result = None;
                    dep.method = None;
                    dep.duration_seconds = None;
                    dep.completed_at = None;
                    dep.a_elo_change = None;
                    dep.b_elo_change = None;
                }
                dep.status = MatchStatus::Pending;
                self.storage.update_match(dep).await.map_err(entity_err("match"))?;
            }
        }

        self.storage.delete_match(match_id).await.map_err(entity_err("match"))?;

        if had_result {
            self.trigger_replay().await;
        }
        Ok(())
    }

    fn resolve_dependency(source: &Match, dep: MatchDependency) -> Resolution {
        if source.status != MatchStatus::Completed {
            return Resolution::Pending;
        }
        let (winner, loser) = source.winner_loser();
        let wanted = if dep.requires_winner { winner } else { loser };
        match wanted {
            Some(id) => Resolution::Fighter(id),
            None => Resolution::Dead,
        }
    }

    /// iterative work-queue propagation (spec §4.4 steps 1-5): starts from
    /// one newly-completed match and, for every dependent whose slot
    /// resolves (to a fighter, or to "dead" when the predecessor was a bye
    /// with no loser), updates it, auto-completes it if it becomes a forced
    /// bye, and enqueues it for further propagation when it completes. Each
    /// dependent is written independently so one failure doesn't block the
    /// rest (spec §7).
    pub(crate) async fn propagate_from(&self, completed_match_id: MatchId) -> CoreResult<()> {
        let mut queue: VecDeque<MatchId> = VecDeque::new();
        queue.push_back(completed_match_id);
        let mut touched_brackets: HashSet<BracketFormatId> = HashSet::new();

        while let Some(source_id) = queue.pop_front() {
            let source = match self.storage.get_match(source_id).await {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("propagation: could not reload source match {source_id}: {e}");
                    continue;
                }
            };
            if let Some(round_id) = source.bracket_round_id {
                if let Ok(round) = self.storage.get_round(round_id).await {
                    touched_brackets.insert(round.bracket_format_id);
                }
            }

            let dependents = match self.storage.list_dependents(source_id).await {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("propagation: could not list dependents of {source_id}: {e}");
                    continue;
                }
            };

            for mut dep in dependents {
                let mut touched = false;

                if !dep.resolved_a && dep.dependency_a.is_some_and(|d| d.source == source_id) {
                    match Self::resolve_dependency(&source, dep.dependency_a.unwrap()) {
                        Resolution::Fighter(id) => {
                            dep.slot_a = Some(id);
                            dep.resolved_a = true;
                            touched = true;
                        }
                        Resolution::Dead => {
                            dep.resolved_a = true;
                            touched = true;
                        }
                        Resolution::Pending => {}
                    }
                }
                if !dep.resolved_b && dep.dependency_b.is_some_and(|d| d.source == source_id) {
                    match Self::resolve_dependency(&source, dep.dependency_b.unwrap()) {
                        Resolution::Fighter(id) => {
                            dep.slot_b = Some(id);
                            dep.resolved_b = true;
                            touched = true;
                        }
                        Resolution::Dead => {
                            dep.resolved_b = true;
                            touched = true;
                        }
                        Resolution::Pending => {}
                    }
                }

                if !touched {
                    continue;
                }

                let a_settled = dep.dependency_a.is_none() || dep.resolved_a;
                let b_settled = dep.dependency_b.is_none() || dep.resolved_b;
                if a_settled && b_settled {
                    match (dep.slot_a, dep.slot_b) {
                        (Some(_), Some(_)) => dep.status = MatchStatus::Ready,
                        (Some(_), None) => {
                            dep.result = Some(MatchResultKind::PlayerAWin);
                            dep.method = Some(crate::model::METHOD_BYE.to_string());
                            dep.duration_seconds = Some(0);
                            dep.status = MatchStatus::Completed;
                            dep.completed_at = Some(Utc::now());
                        }
                        (None, Some(b)) => {
                            dep.slot_a = Some(b);
                            dep.slot_b = None;
                            dep.result = Some(MatchResultKind::PlayerAWin);
                            dep.method = Some(crate::model::METHOD_BYE.to_string());
                            dep.duration_seconds = Some(0);
                            dep.status = MatchStatus::Completed;
                            dep.completed_at = Some(Utc::now());
                        }
                        (None, None) => {
                            // both predecessors were byes with no loser:
                            // nobody is left to schedule (spec §8 edge case).
                            dep.status = MatchStatus::Cancelled;
                        }
                    }
                }

                let dep_id = dep.id;
                let became_completed = dep.status == MatchStatus::Completed;
                if let Err(e) = self.storage.update_match(dep).await {
                    log::warn!("propagation: could not update dependent {dep_id}: {e}");
                    continue;
                }
                if became_completed {
                    queue.push_back(dep_id);
                }
            }
        }

        for bracket_id in touched_brackets {
            self.activate_rounds_for_bracket(bracket_id).await;
            self.maybe_advance_rounds(bracket_id).await;
        }

        Ok(())
    }

    /// scans InProgress rounds of `bracket_format_id`; any round whose
    /// matches are all Completed/Cancelled is marked Completed and, for the
    /// dynamically-paired formats, triggers generation of the next round
    /// (spec §4.4 step 6 "round completion").
    pub(crate) async fn maybe_advance_rounds(&self, bracket_format_id: BracketFormatId) {
        let bracket = match self.storage.get_bracket_format(bracket_format_id).await {
            Ok(b) => b,
            Err(e) => {
                log::warn!("round advancement: could not load bracket {bracket_format_id}: {e}");
                return;
            }
        };
        if bracket.finalized {
            return;
        }
        let rounds = match self.storage.list_rounds_by_bracket(bracket_format_id).await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("round advancement: could not list rounds: {e}");
                return;
            }
        };

        for round in rounds.into_iter().filter(|r| r.status == RoundStatus::InProgress) {
            let matches = match self.storage.list_matches_by_round(round.id).await {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("round advancement: could not list matches for round {}: {e}", round.id);
                    continue;
                }
            };
            let all_done = matches
                .iter()
                .all(|m| matches!(m.status, MatchStatus::Completed | MatchStatus::Cancelled));
            if matches.is_empty() || !all_done {
                continue;
            }

            let mut completed_round = round.clone();
            completed_round.status = RoundStatus::Completed;
            completed_round.completed_at = Some(Utc::now());
            if let Err(e) = self.storage.update_round(completed_round).await {
                log::warn!("round advancement: could not complete round {}: {e}", round.id);
                continue;
            }

            match bracket.config.format() {
                TournamentFormat::Swiss => self.advance_swiss(&bracket, &round).await,
                TournamentFormat::GuaranteedMatches => self.advance_guaranteed(&bracket, &round).await,
                TournamentFormat::RoundRobin => self.activate_next_pending_round(bracket_format_id).await,
                TournamentFormat::SingleElim | TournamentFormat::DoubleElim => {
                    self.maybe_finalize_full_topology(&bracket, bracket_format_id).await
                }
            }
        }
    }

    /// activates the next `Pending` round and promotes its matches to
    /// `Ready` directly (RoundRobin pre-creates every round's matches at
    /// generation time with both slots already known, so there is no
    /// dependency resolution to wait on here — unlike Swiss/GuaranteedMatches,
    /// which materialize the round instead). `activate_rounds_for_bracket`
    /// only promotes rounds still in `Pending`, so it can't pick this one up
    /// after it's flipped to `InProgress`.
    async fn activate_next_pending_round(&self, bracket_format_id: BracketFormatId) {
        let rounds = match self.storage.list_rounds_by_bracket(bracket_format_id).await {
            Ok(r) => r,
            Err(_) => return,
        };
        let mut pending: Vec<BracketRound> = rounds
            .into_iter()
            .filter(|r| r.status == RoundStatus::Pending)
            .collect();
        pending.sort_by_key(|r| r.round_number);
        if let Some(next) = pending.into_iter().next() {
            let mut r = next;
            r.status = RoundStatus::InProgress;
            let round_id = r.id;
            if let Err(e) = self.storage.update_round(r).await {
                log::warn!("round robin advancement: could not activate round {round_id}: {e}");
                return;
            }

            let matches = match self.storage.list_matches_by_round(round_id).await {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("round robin advancement: could not list matches for round {round_id}: {e}");
                    return;
                }
            };
            for mut m in matches {
                if m.status == MatchStatus::Pending && m.both_slots_set() {
                    m.status = MatchStatus::Ready;
                    if let Err(e) = self.storage.update_match(m).await {
                        log::warn!("round robin advancement: could not ready a match in round {round_id}: {e}");
                    }
                }
            }
        } else if let Ok(bracket) = self.storage.get_bracket_format(bracket_format_id).await {
            let _ = self.finalize_bracket(&bracket).await;
        }
    }

    async fn maybe_finalize_full_topology(&self, bracket: &BracketFormat, bracket_format_id: BracketFormatId) {
        let rounds = match self.storage.list_rounds_by_bracket(bracket_format_id).await {
            Ok(r) => r,
            Err(_) => return,
        };
        let all_terminal = rounds
            .iter()
            .all(|r| matches!(r.status, RoundStatus::Completed | RoundStatus::Cancelled));
        if all_terminal {
            let _ = self.finalize_bracket(bracket).await;
        }
    }

    async fn advance_swiss(&self, bracket: &BracketFormat, round: &BracketRound) {
        let total_rounds = round.metadata.total_rounds.unwrap_or(round.round_number);
        if round.round_number >= total_rounds {
            let _ = self.finalize_bracket(bracket).await;
            return;
        }
        let participants = match self.bracket_participant_order(bracket.id).await {
            Ok(p) => p,
            Err(e) => {
                log::warn!("swiss advancement: could not reconstruct participant order: {e}");
                return;
            }
        };
        let matches = match self.storage.list_matches_by_bracket(bracket.id).await {
            Ok(m) => m,
            Err(e) => {
                log::warn!("swiss advancement: could not list matches: {e}");
                return;
            }
        };
        let mut entries = standings::compute_standings(&participants, &matches);
        swiss::sort_standings(&mut entries);
        let sorted: Vec<FighterId> = entries.into_iter().map(|e| e.fighter_id).collect();
        let history = standings::build_head_to_head_index(&matches);
        let plans = swiss::pair_round(&sorted, &history);

        let round_plan = RoundPlan {
            display_name: format!("Round {}", round.round_number + 1),
            lane: None,
            losers_kind: None,
            feeds_from_winners: None,
            activation: RoundActivation::Active,
            matches: plans,
        };
        let metadata = RoundMetadata {
            total_rounds: Some(total_rounds),
            ..Default::default()
        };
        match self
            .materialize_round(bracket, round.round_number + 1, round_plan, metadata, &[])
            .await
        {
            Ok((_, _, completed)) => {
                for id in completed {
                    if let Err(e) = self.propagate_from(id).await {
                        log::warn!("swiss advancement: propagation from bye {id} failed: {e}");
                    }
                }
                self.activate_rounds_for_bracket(bracket.id).await;
            }
            Err(e) => log::warn!("swiss advancement: could not materialize round: {e}"),
        }
    }

    async fn advance_guaranteed(&self, bracket: &BracketFormat, round: &BracketRound) {
        let (target, max_rematches, weight_based) = match &bracket.config {
            BracketConfig::GuaranteedMatches {
                match_count,
                max_rematches,
                weight_based_pairing,
                ..
            } => (*match_count, *max_rematches, *weight_based_pairing),
            _ => return,
        };

        let participants = match self.bracket_participant_order(bracket.id).await {
            Ok(p) => p,
            Err(e) => {
                log::warn!("guaranteed-matches advancement: could not reconstruct order: {e}");
                return;
            }
        };
        let matches = match self.storage.list_matches_by_bracket(bracket.id).await {
            Ok(m) => m,
            Err(e) => {
                log::warn!("guaranteed-matches advancement: could not list matches: {e}");
                return;
            }
        };

        let mut played_count: std::collections::HashMap<FighterId, u32> = std::collections::HashMap::new();
        for m in &matches {
            if m.result.is_none() || matches!(m.result, Some(MatchResultKind::NoContest)) {
                continue;
            }
            for slot in [m.slot_a, m.slot_b].into_iter().flatten() {
                *played_count.entry(slot).or_default() += 1;
            }
        }
        let remaining: Vec<FighterId> = participants
            .iter()
            .copied()
            .filter(|id| played_count.get(id).copied().unwrap_or(0) < target)
            .collect();

        if remaining.len() < 2 {
            let _ = self.finalize_bracket(bracket).await;
            return;
        }

        let history = standings::build_head_to_head_index(&matches);
        let use_weight_aware = weight_based && bracket.weight_class_id.is_none();
        let plans = if use_weight_aware {
            let attrs = match self.fighter_attrs(bracket).await {
                Ok(a) => a,
                Err(e) => {
                    log::warn!("guaranteed-matches advancement: could not load fighter attrs: {e}");
                    return;
                }
            };
            let mut standings_entries = standings::compute_standings(&remaining, &matches);
            weight_aware::sort_standings(&mut standings_entries, &attrs);
            let sorted: Vec<FighterId> = standings_entries.into_iter().map(|e| e.fighter_id).collect();
            weight_aware::pair(&sorted, &attrs, &history, max_rematches)
        } else {
            let mut standings_entries = standings::compute_standings(&remaining, &matches);
            standings_entries.sort_by(|a, b| {
                b.points.partial_cmp(&a.points).unwrap().then(b.wins.cmp(&a.wins))
            });
            let sorted: Vec<FighterId> = standings_entries.into_iter().map(|e| e.fighter_id).collect();
            guaranteed::pair_simple(&sorted, &history, max_rematches)
        };

        if plans.is_empty() {
            let _ = self.finalize_bracket(bracket).await;
            return;
        }

        let round_plan = RoundPlan {
            display_name: format!("Round {}", round.round_number + 1),
            lane: None,
            losers_kind: None,
            feeds_from_winners: None,
            activation: RoundActivation::Active,
            matches: plans,
        };
        let metadata = RoundMetadata {
            total_matches_per_fighter: Some(target),
            max_rematches: Some(max_rematches),
            ..Default::default()
        };
        match self
            .materialize_round(bracket, round.round_number + 1, round_plan, metadata, &[])
            .await
        {
            Ok((_, _, completed)) => {
                for id in completed {
                    if let Err(e) = self.propagate_from(id).await {
                        log::warn!("guaranteed-matches advancement: propagation from bye {id} failed: {e}");
                    }
                }
                self.activate_rounds_for_bracket(bracket.id).await;
            }
            Err(e) => log::warn!("guaranteed-matches advancement: could not materialize round: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::in_memory::InMemoryStorage;
    use std::sync::Arc;
    use uuid::Uuid;

    fn base_match(id: Uuid, slot_a: Option<Uuid>, slot_b: Option<Uuid>) -> Match {
        Match {
            id,
            event_id: Uuid::new_v4(),
            bracket_round_id: None,
            slot_a,
            slot_b,
            weight_class_id: None,
            result: None,
            method: None,
            duration_seconds: None,
            status: MatchStatus::Pending,
            position: None,
            dependency_a: None,
            dependency_b: None,
            resolved_a: false,
            resolved_b: false,
            a_elo_change: None,
            b_elo_change: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn undo_clears_the_slot_it_populated_in_a_dependent() {
        let storage = Arc::new(InMemoryStorage::new());
        let fighter_a = Uuid::new_v4();
        let fighter_b = Uuid::new_v4();
        let fighter_c = Uuid::new_v4();

        let m1_id = Uuid::new_v4();
        let mut m1 = base_match(m1_id, Some(fighter_a), Some(fighter_b));
        m1.result = Some(MatchResultKind::PlayerAWin);
        m1.status = MatchStatus::Completed;
        m1.completed_at = Some(Utc::now());
        storage.insert_match(m1).await.unwrap();

        let m2_id = Uuid::new_v4();
        let mut m2 = base_match(m2_id, None, Some(fighter_c));
        m2.dependency_a = Some(MatchDependency { source: m1_id, requires_winner: true });
        storage.insert_match(m2).await.unwrap();

        let engine = BracketEngine::new(storage.clone());
        engine.propagate_from(m1_id).await.unwrap();

        let resolved = storage.get_match(m2_id).await.unwrap();
        assert_eq!(resolved.slot_a, Some(fighter_a));
        assert_eq!(resolved.status, MatchStatus::Ready);
        assert!(resolved.resolved_a);

        engine.undo_match_result(m1_id).await.unwrap();

        let undone = storage.get_match(m2_id).await.unwrap();
        assert_eq!(undone.slot_a, None, "undo must clear the slot it populated");
        assert_eq!(undone.status, MatchStatus::Pending);
        assert!(!undone.resolved_a, "dependency must become resolvable again");
        assert_eq!(
            undone.dependency_a,
            Some(MatchDependency { source: m1_id, requires_winner: true }),
            "the dependency reference itself is not cleared by undo"
        );
    }

    #[tokio::test]
    async fn delete_match_clears_dependents_and_triggers_replay() {
        let storage = Arc::new(InMemoryStorage::new());
        let fighter_a = Uuid::new_v4();
        let fighter_b = Uuid::new_v4();
        let fighter_c = Uuid::new_v4();

        let m1_id = Uuid::new_v4();
        let mut m1 = base_match(m1_id, Some(fighter_a), Some(fighter_b));
        m1.result = Some(MatchResultKind::PlayerAWin);
        m1.status = MatchStatus::Completed;
        m1.completed_at = Some(Utc::now());
        storage.insert_match(m1).await.unwrap();

        let m2_id = Uuid::new_v4();
        let mut m2 = base_match(m2_id, None, Some(fighter_c));
        m2.dependency_a = Some(MatchDependency { source: m1_id, requires_winner: true });
        storage.insert_match(m2).await.unwrap();

        let engine = BracketEngine::new(storage.clone());
        engine.propagate_from(m1_id).await.unwrap();
        assert_eq!(storage.get_match(m2_id).await.unwrap().slot_a, Some(fighter_a));

        engine.delete_match(m1_id).await.unwrap();

        assert!(storage.get_match(m1_id).await.is_err());
        let after = storage.get_match(m2_id).await.unwrap();
        assert_eq!(after.slot_a, None, "delete must clear the slot it had populated");
        assert!(after.dependency_a.is_none(), "delete must clear the dependency reference");
        assert_eq!(after.status, MatchStatus::Pending);
    }

    #[tokio::test]
    async fn delete_match_without_dependents_succeeds() {
        let storage = Arc::new(InMemoryStorage::new());
        let m1_id = Uuid::new_v4();
        let m1 = base_match(m1_id, Some(Uuid::new_v4()), Some(Uuid::new_v4()));
        storage.insert_match(m1).await.unwrap();

        let engine = BracketEngine::new(storage.clone());
        engine.delete_match(m1_id).await.unwrap();
        assert!(storage.get_match(m1_id).await.is_err());
    }
}
