//! the six concrete end-to-end scenarios of spec.md §8, run against the
//! `InMemoryStorage` fake end to end through `BracketEngine`'s public
//! operations — one test per scenario, named in the
//! `given_<state>_when_<action>_then_<expectation>` style used by
//! `app_core/tests/postal_address_state/registry_wrapper_tests.rs`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use fk_grappling_core::bracket::BracketEngine;
use fk_grappling_core::model::{
    BeltRank, BracketConfig, Entry, EntityStatus, Event, EventId, EventStatus, Fighter, FighterId,
    Match, MatchResultKind, MatchStatus, RatingBook, RoundStatus, SeedingMethod, WeightClass,
};
use fk_grappling_core::storage::in_memory::InMemoryStorage;

fn fighter(id: FighterId, belt: BeltRank) -> Fighter {
    Fighter {
        id,
        display_name: format!("fighter-{id}"),
        belt_rank: belt,
        body_weight_lb: Some(170),
        primary_weight_class_id: None,
        ratings: RatingBook::reset_to_baseline(belt),
        badges: vec![],
        status: EntityStatus::Active,
    }
}

fn entry(event_id: EventId, fighter_id: FighterId) -> Entry {
    Entry {
        id: Uuid::new_v4(),
        event_id,
        fighter_id,
        weight_class_id: None,
        checked_in: true,
        snapshot_belt_rank: BeltRank::Blue,
        snapshot_weight_lb: Some(170),
    }
}

/// seeds `n` checked-in fighters for a fresh event, returning their ids in
/// ascending order — `generateBracket` sorts entries by fighter id for a
/// stable, reproducible seed order (DESIGN.md, bracket generation), so
/// building the id list pre-sorted lets a test predict exactly which
/// fighter lands in which round-1 slot.
async fn seed_event_with_fighters(storage: &Arc<InMemoryStorage>, n: usize) -> (EventId, Vec<FighterId>) {
    let event_id = Uuid::new_v4();
    storage
        .seed_event(Event {
            id: event_id,
            name: "Test Open".into(),
            scheduled_date: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            venue: "Gym".into(),
            status: EventStatus::InProgress,
        })
        .await;

    let mut ids: Vec<FighterId> = (0..n).map(|_| Uuid::new_v4()).collect();
    ids.sort();
    for &id in &ids {
        storage.seed_fighter(fighter(id, BeltRank::Blue)).await;
        storage.seed_entry(entry(event_id, id)).await;
    }
    (event_id, ids)
}

async fn matches_by_round_number(
    storage: &Arc<InMemoryStorage>,
    bracket_id: Uuid,
    round_number: u32,
) -> Vec<Match> {
    use fk_grappling_core::storage::StoragePort;
    let rounds = storage.list_rounds_by_bracket(bracket_id).await.unwrap();
    let round = rounds.into_iter().find(|r| r.round_number == round_number).unwrap();
    let mut matches = storage.list_matches_by_round(round.id).await.unwrap();
    matches.sort_by_key(|m| m.position.unwrap_or(u32::MAX));
    matches
}

/// 1) 8-fighter single-elim, no byes: post an A-win in every match and
/// expect the original round-1 slot-A participant to be champion.
#[tokio::test]
async fn given_eight_fighter_single_elim_when_every_match_is_an_a_win_then_slot_a_chain_wins_the_final() {
    use fk_grappling_core::storage::StoragePort;

    let storage = Arc::new(InMemoryStorage::new());
    let (event_id, ids) = seed_event_with_fighters(&storage, 8).await;
    let engine = BracketEngine::new(storage.clone());

    let bracket = engine
        .create_bracket(
            event_id,
            None,
            BracketConfig::SingleElim { seeding_method: SeedingMethod::InputOrder },
            0,
            true,
        )
        .await
        .unwrap();
    engine.generate_bracket(bracket.id).await.unwrap();

    // round 1: 4 matches, always let slot A win.
    let round1 = matches_by_round_number(&storage, bracket.id, 1).await;
    assert_eq!(round1.len(), 4);
    for m in &round1 {
        engine
            .update_match_result(m.id, MatchResultKind::PlayerAWin, Some("Submission".into()), Some(240))
            .await
            .unwrap();
    }

    let round2 = matches_by_round_number(&storage, bracket.id, 2).await;
    assert_eq!(round2.len(), 2);
    for m in &round2 {
        assert!(m.both_slots_set(), "round 2 match should be fully resolved by round 1 results");
        engine
            .update_match_result(m.id, MatchResultKind::PlayerAWin, None, Some(180))
            .await
            .unwrap();
    }

    let round3 = matches_by_round_number(&storage, bracket.id, 3).await;
    assert_eq!(round3.len(), 1);
    assert_eq!(round3[0].slot_a, Some(ids[0]));
    engine
        .update_match_result(round3[0].id, MatchResultKind::PlayerAWin, None, Some(60))
        .await
        .unwrap();

    let final_match = storage.get_match(round3[0].id).await.unwrap();
    let (winner, _) = final_match.winner_loser();
    assert_eq!(winner, Some(ids[0]));

    let rounds = storage.list_rounds_by_bracket(bracket.id).await.unwrap();
    assert_eq!(rounds.len(), 3);
    assert!(rounds.iter().all(|r| r.status == RoundStatus::Completed));

    let all_matches = storage.list_matches_by_bracket(bracket.id).await.unwrap();
    assert_eq!(all_matches.len(), 7);

    let final_bracket = storage.get_bracket_format(bracket.id).await.unwrap();
    assert!(final_bracket.finalized, "bracket should finalize once the final round completes");
}

/// 2) 6-fighter single-elim: round 1 has 3 contested matches (no byes, since
/// 6 is even), and round 2's topology shortfall resolves into an automatic
/// bye rather than getting stuck.
#[tokio::test]
async fn given_six_fighter_single_elim_when_round_one_completes_then_no_round_two_match_is_stuck() {
    use fk_grappling_core::storage::StoragePort;

    let storage = Arc::new(InMemoryStorage::new());
    let (event_id, _ids) = seed_event_with_fighters(&storage, 6).await;
    let engine = BracketEngine::new(storage.clone());

    let bracket = engine
        .create_bracket(
            event_id,
            None,
            BracketConfig::SingleElim { seeding_method: SeedingMethod::InputOrder },
            0,
            true,
        )
        .await
        .unwrap();
    engine.generate_bracket(bracket.id).await.unwrap();

    let round1 = matches_by_round_number(&storage, bracket.id, 1).await;
    assert_eq!(round1.len(), 3);
    assert!(round1.iter().all(|m| m.method.as_deref() != Some("Bye")));

    for m in &round1 {
        engine
            .update_match_result(m.id, MatchResultKind::PlayerAWin, None, Some(120))
            .await
            .unwrap();
    }

    let round2 = matches_by_round_number(&storage, bracket.id, 2).await;
    assert_eq!(round2.len(), 2);
    // every round-2 match is either fully contested (Ready) or already
    // resolved automatically as a bye — never left with an unresolved slot.
    for m in &round2 {
        assert!(
            m.status == MatchStatus::Ready || m.status == MatchStatus::Completed,
            "round 2 match {:?} is stuck in {:?}",
            m.id,
            m.status
        );
    }
    assert!(round2.iter().any(|m| m.method.as_deref() == Some("Bye")));
    assert!(round2.iter().any(|m| m.status == MatchStatus::Ready));
}

/// 3) 5-fighter Swiss over 3 rounds: the middle seed gets round 1's bye,
/// and round 2 avoids repeating any round-1 pairing.
#[tokio::test]
async fn given_five_fighter_swiss_when_round_one_completes_then_middle_seed_got_the_bye_and_round_two_avoids_rematches(
) {
    use fk_grappling_core::storage::StoragePort;

    let storage = Arc::new(InMemoryStorage::new());
    let (event_id, ids) = seed_event_with_fighters(&storage, 5).await;
    let engine = BracketEngine::new(storage.clone());

    let bracket = engine
        .create_bracket(
            event_id,
            None,
            BracketConfig::Swiss { seeding_method: SeedingMethod::InputOrder, rounds: None },
            0,
            true,
        )
        .await
        .unwrap();
    engine.generate_bracket(bracket.id).await.unwrap();

    let round1 = matches_by_round_number(&storage, bracket.id, 1).await;
    assert_eq!(round1.len(), 3);
    let bye = round1.iter().find(|m| m.method.as_deref() == Some("Bye")).unwrap();
    assert_eq!(bye.slot_a, Some(ids[2]), "spec §4.3.3: the middle seed (index n/2) gets round 1's bye");
    assert_eq!(bye.status, MatchStatus::Completed);

    let mut round1_pairs: Vec<(FighterId, FighterId)> = Vec::new();
    for m in &round1 {
        if m.method.as_deref() == Some("Bye") {
            continue;
        }
        engine
            .update_match_result(m.id, MatchResultKind::PlayerAWin, None, Some(180))
            .await
            .unwrap();
        round1_pairs.push((m.slot_a.unwrap(), m.slot_b.unwrap()));
    }

    let round2 = matches_by_round_number(&storage, bracket.id, 2).await;
    assert_eq!(round2.len(), 3);
    for m in &round2 {
        if let (Some(a), Some(b)) = (m.slot_a, m.slot_b) {
            assert!(
                !round1_pairs.contains(&(a, b)) && !round1_pairs.contains(&(b, a)),
                "round 2 repeated a round-1 pairing that wasn't unavoidable"
            );
        }
    }
}

/// 4) 7-fighter guaranteed-matches, target 3, max 1 rematch: every fighter
/// finishes with exactly 3 matches and the bracket self-terminates.
#[tokio::test]
async fn given_seven_fighter_guaranteed_matches_when_played_to_completion_then_every_fighter_has_exactly_three(
) {
    use fk_grappling_core::storage::StoragePort;

    let storage = Arc::new(InMemoryStorage::new());
    let (event_id, ids) = seed_event_with_fighters(&storage, 7).await;
    let engine = BracketEngine::new(storage.clone());

    let bracket = engine
        .create_bracket(
            event_id,
            None,
            BracketConfig::GuaranteedMatches {
                seeding_method: SeedingMethod::InputOrder,
                match_count: 3,
                max_rematches: 1,
                weight_based_pairing: true,
            },
            0,
            true,
        )
        .await
        .unwrap();
    engine.generate_bracket(bracket.id).await.unwrap();

    // play every Ready match to an A-win until the bracket finalizes or we
    // hit a safety bound (guards against an infeasible test, not a real loop).
    for _ in 0..20 {
        let b = storage.get_bracket_format(bracket.id).await.unwrap();
        if b.finalized {
            break;
        }
        let all = storage.list_matches_by_bracket(bracket.id).await.unwrap();
        let ready: Vec<Match> = all.into_iter().filter(|m| m.status == MatchStatus::Ready).collect();
        if ready.is_empty() {
            break;
        }
        for m in ready {
            engine
                .update_match_result(m.id, MatchResultKind::PlayerAWin, None, Some(180))
                .await
                .unwrap();
        }
    }

    let b = storage.get_bracket_format(bracket.id).await.unwrap();
    assert!(b.finalized, "guaranteed-matches bracket should finalize once nobody needs more matches");

    let all_matches = storage.list_matches_by_bracket(bracket.id).await.unwrap();
    assert!(all_matches.len() <= 11, "at most ceil(7*3/2) = 11 matches");

    let mut played: HashMap<FighterId, u32> = HashMap::new();
    for m in &all_matches {
        if m.status != MatchStatus::Completed {
            continue;
        }
        for slot in [m.slot_a, m.slot_b].into_iter().flatten() {
            *played.entry(slot).or_default() += 1;
        }
    }
    for id in &ids {
        assert_eq!(played.get(id).copied().unwrap_or(0), 3, "fighter {id} should have exactly 3 matches");
    }
}

/// 5) 8-fighter double-elim, every match an A-win throughout: exactly
/// n-1 + n-2 + 1 = 14 decisive matches, and the grand-finals champion is the
/// winners-bracket champion (since the grand-finals slot-A dependency is
/// always the winners-final winner — see DESIGN.md).
#[tokio::test]
async fn given_eight_fighter_double_elim_when_every_match_is_an_a_win_then_winners_champion_takes_grand_finals(
) {
    use fk_grappling_core::storage::StoragePort;

    let storage = Arc::new(InMemoryStorage::new());
    let (event_id, _ids) = seed_event_with_fighters(&storage, 8).await;
    let engine = BracketEngine::new(storage.clone());

    let bracket = engine
        .create_bracket(
            event_id,
            None,
            BracketConfig::DoubleElim { seeding_method: SeedingMethod::InputOrder },
            0,
            true,
        )
        .await
        .unwrap();
    engine.generate_bracket(bracket.id).await.unwrap();

    // drain every Ready match with an A-win until none remain.
    let mut safety = 0;
    loop {
        safety += 1;
        assert!(safety < 30, "propagation should converge well before this bound");
        let all = storage.list_matches_by_bracket(bracket.id).await.unwrap();
        let ready: Vec<Match> = all.into_iter().filter(|m| m.status == MatchStatus::Ready).collect();
        if ready.is_empty() {
            break;
        }
        for m in ready {
            engine
                .update_match_result(m.id, MatchResultKind::PlayerAWin, None, Some(150))
                .await
                .unwrap();
        }
    }

    let all_matches = storage.list_matches_by_bracket(bracket.id).await.unwrap();
    let decisive: Vec<&Match> = all_matches.iter().filter(|m| m.result.is_some()).collect();
    assert_eq!(decisive.len(), 14, "n-1 + n-2 + 1 = 7 + 6 + 1 for a power-of-two field of 8");

    let rounds = storage.list_rounds_by_bracket(bracket.id).await.unwrap();
    let grand_finals_round = rounds
        .iter()
        .find(|r| r.metadata.lane == Some(fk_grappling_core::model::BracketLane::Finals))
        .unwrap();
    let grand_finals = storage.list_matches_by_round(grand_finals_round.id).await.unwrap();
    assert_eq!(grand_finals.len(), 1);
    let gf = &grand_finals[0];
    let (winner, _) = gf.winner_loser();
    // slot A of grand finals is always the winners-bracket finalist (spec
    // §4.3.2 point 3); since every match was an A-win throughout, that
    // finalist is also the grand-finals winner.
    assert_eq!(winner, gf.slot_a);

    let b = storage.get_bracket_format(bracket.id).await.unwrap();
    assert!(b.finalized);
}

/// 6) 4-fighter round robin: completing every round-1 match must ready up
/// round 2 rather than leaving it stuck (regression for the bug where
/// `activate_next_pending_round` flipped a round to InProgress without
/// promoting its already-paired matches out of Pending).
#[tokio::test]
async fn given_four_fighter_round_robin_when_round_one_completes_then_round_two_matches_are_ready() {
    use fk_grappling_core::storage::StoragePort;

    let storage = Arc::new(InMemoryStorage::new());
    let (event_id, _ids) = seed_event_with_fighters(&storage, 4).await;
    let engine = BracketEngine::new(storage.clone());

    let bracket = engine
        .create_bracket(
            event_id,
            None,
            BracketConfig::RoundRobin { seeding_method: SeedingMethod::InputOrder },
            0,
            true,
        )
        .await
        .unwrap();
    engine.generate_bracket(bracket.id).await.unwrap();

    let round1 = matches_by_round_number(&storage, bracket.id, 1).await;
    assert_eq!(round1.len(), 2);
    assert!(round1.iter().all(|m| m.status == MatchStatus::Ready));

    let round2_before = matches_by_round_number(&storage, bracket.id, 2).await;
    assert!(
        round2_before.iter().all(|m| m.status == MatchStatus::Pending),
        "round 2 is held back until round 1 completes"
    );

    for m in &round1 {
        engine
            .update_match_result(m.id, MatchResultKind::PlayerAWin, None, Some(180))
            .await
            .unwrap();
    }

    let rounds = storage.list_rounds_by_bracket(bracket.id).await.unwrap();
    let round2_meta = rounds.iter().find(|r| r.round_number == 2).unwrap();
    assert_eq!(round2_meta.status, RoundStatus::InProgress, "round 2 should activate once round 1 is done");

    let round2 = matches_by_round_number(&storage, bracket.id, 2).await;
    assert_eq!(round2.len(), 2);
    assert!(
        round2.iter().all(|m| m.status == MatchStatus::Ready),
        "round 2 matches have both fighters known at generation time and must be Ready, not stuck Pending"
    );
}

/// 7) rating replay determinism: replaying a fixed match history twice
/// yields byte-identical fighter ratings and per-match deltas.
#[tokio::test]
async fn given_a_fixed_match_history_when_replayed_twice_then_ratings_and_deltas_are_identical() {
    use fk_grappling_core::storage::StoragePort;

    let storage = Arc::new(InMemoryStorage::new());
    let a = fighter(Uuid::new_v4(), BeltRank::Blue);
    let b = fighter(Uuid::new_v4(), BeltRank::Purple);
    let c = fighter(Uuid::new_v4(), BeltRank::Blue);
    storage.seed_fighter(a.clone()).await;
    storage.seed_fighter(b.clone()).await;
    storage.seed_fighter(c.clone()).await;

    let class = WeightClass { id: Uuid::new_v4(), name: "Middle".into(), min_lb: Some(156), max_lb: Some(185) };
    storage.seed_weight_class(class.clone()).await;

    let event1 = Event {
        id: Uuid::new_v4(),
        name: "Event 1".into(),
        scheduled_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        venue: "Gym".into(),
        status: EventStatus::Completed,
    };
    let event2 = Event {
        id: Uuid::new_v4(),
        name: "Event 2".into(),
        scheduled_date: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        venue: "Gym".into(),
        status: EventStatus::Completed,
    };
    storage.seed_event(event1.clone()).await;
    storage.seed_event(event2.clone()).await;

    let now = Utc::now();
    let m1 = Match {
        id: Uuid::new_v4(),
        event_id: event1.id,
        bracket_round_id: None,
        slot_a: Some(a.id),
        slot_b: Some(b.id),
        weight_class_id: Some(class.id),
        result: Some(MatchResultKind::PlayerAWin),
        method: None,
        duration_seconds: Some(300),
        status: MatchStatus::Completed,
        position: None,
        dependency_a: None,
        dependency_b: None,
        resolved_a: false,
        resolved_b: false,
        a_elo_change: None,
        b_elo_change: None,
        created_at: now,
        completed_at: Some(now),
    };
    let mut m2 = m1.clone();
    m2.id = Uuid::new_v4();
    m2.event_id = event2.id;
    m2.slot_a = Some(b.id);
    m2.slot_b = Some(c.id);
    m2.result = Some(MatchResultKind::Draw);

    storage.insert_match(m1.clone()).await.unwrap();
    storage.insert_match(m2.clone()).await.unwrap();

    let engine = BracketEngine::new(storage.clone());
    engine.replay().await.unwrap();
    let first_fighters = storage.list_fighters().await.unwrap();
    let first_matches = storage.list_matches_by_event(event1.id).await.unwrap();

    engine.replay().await.unwrap();
    let second_fighters = storage.list_fighters().await.unwrap();
    let second_matches = storage.list_matches_by_event(event1.id).await.unwrap();

    let mut sort_fighters = |mut v: Vec<Fighter>| {
        v.sort_by_key(|f| f.id);
        v
    };
    assert_eq!(sort_fighters(first_fighters), sort_fighters(second_fighters));

    let mut sort_matches = |mut v: Vec<Match>| {
        v.sort_by_key(|m| m.id);
        v
    };
    assert_eq!(sort_matches(first_matches), sort_matches(second_matches));

    let replayed_b = storage.get_fighter(b.id).await.unwrap();
    assert_ne!(
        replayed_b.ratings.overall,
        kernel_starting_elo(BeltRank::Purple),
        "fighter b played two matches, its overall rating should have moved"
    );
}

fn kernel_starting_elo(belt: BeltRank) -> f64 {
    fk_grappling_core::rating::kernel::starting_elo(belt)
}
