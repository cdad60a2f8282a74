//! double elimination bracket skeleton (spec §4.3.2): winners bracket,
//! alternating losers drop-down/advancement rounds, and grand finals.

use crate::model::{BracketLane, FighterId, LosersRoundKind, SeedingMethod};

use super::{
    BracketPlan, MatchPlan, PairingError, RoundActivation, RoundPlan, Shuffler, SlotSource,
    single_elim,
};

const MIN_PARTICIPANTS: usize = 8;

pub fn build(
    participants: &[FighterId],
    seeding: SeedingMethod,
    shuffler: &mut impl Shuffler,
) -> Result<BracketPlan, PairingError> {
    let n = participants.len();
    if n < MIN_PARTICIPANTS {
        return Err(PairingError::TooFewParticipants {
            minimum: MIN_PARTICIPANTS,
            found: n,
        });
    }

    let winners = single_elim::build(participants, seeding, shuffler)?;
    let w = winners.rounds.len() as u32;
    let winners_match_counts: Vec<usize> = winners.rounds.iter().map(|r| r.matches.len()).collect();

    let mut rounds: Vec<RoundPlan> = winners
        .rounds
        .into_iter()
        .enumerate()
        .map(|(i, mut r)| {
            r.display_name = format!("Winners {}", single_elim::round_name(i as u32 + 1, w));
            r.lane = Some(BracketLane::Winners);
            r
        })
        .collect();

    // losers bracket
    let mut pool = losers_of(0, winners_match_counts[0]);
    for wi in 1..w {
        // drop-down round: pair the current pool among itself
        let dd_matches = pair_sequential(&pool);
        let dd_round_index = rounds.len();
        rounds.push(RoundPlan {
            display_name: format!("Losers Round {}", dd_round_index - (w as usize) + 1),
            lane: Some(BracketLane::Losers),
            losers_kind: Some(LosersRoundKind::DropDown),
            feeds_from_winners: Some(wi),
            activation: RoundActivation::Pending,
            matches: dd_matches.clone(),
        });
        let dd_winners = winners_of(dd_round_index, dd_matches.len());

        // new losers dropping in from the next winners round
        let new_losers = losers_of(wi as usize, winners_match_counts[wi as usize]);

        let adv_matches = interleave(dd_winners, new_losers);
        let adv_round_index = rounds.len();
        rounds.push(RoundPlan {
            display_name: format!("Losers Round {}", adv_round_index - (w as usize) + 1),
            lane: Some(BracketLane::Losers),
            losers_kind: Some(LosersRoundKind::Advancement),
            feeds_from_winners: None,
            activation: RoundActivation::Pending,
            matches: adv_matches.clone(),
        });
        pool = winners_of(adv_round_index, adv_matches.len());
    }

    let losers_champion = pool.into_iter().next().unwrap_or(SlotSource::Tbd);
    let winners_final_index = (w - 1) as usize;

    rounds.push(RoundPlan {
        display_name: "Grand Finals".to_string(),
        lane: Some(BracketLane::Finals),
        losers_kind: None,
        feeds_from_winners: None,
        activation: RoundActivation::Pending,
        matches: vec![MatchPlan::contested(
            SlotSource::DependsOn {
                round_index: winners_final_index,
                match_index: 0,
                requires_winner: true,
            },
            losers_champion,
        )],
    });

    Ok(BracketPlan { rounds })
}

fn losers_of(round_index: usize, match_count: usize) -> Vec<SlotSource> {
    // a bye match produces no loser, so it contributes no entry to the pool.
    (0..match_count)
        .map(|i| SlotSource::DependsOn {
            round_index,
            match_index: i,
            requires_winner: false,
        })
        .collect()
}

fn winners_of(round_index: usize, match_count: usize) -> Vec<SlotSource> {
    (0..match_count)
        .map(|i| SlotSource::DependsOn {
            round_index,
            match_index: i,
            requires_winner: true,
        })
        .collect()
}

/// pairs a pool of slot sources among themselves; an odd trailing entry
/// becomes a single-slot bye-forward match (spec §4.3.2 point 2).
fn pair_sequential(pool: &[SlotSource]) -> Vec<MatchPlan> {
    let mut matches = Vec::new();
    let mut i = 0;
    while i + 1 < pool.len() {
        matches.push(MatchPlan::contested(pool[i], pool[i + 1]));
        i += 2;
    }
    if i < pool.len() {
        matches.push(MatchPlan::bye(pool[i]));
    }
    matches
}

/// interleaves two pools cross-wise (spec §4.3.2 point 2 advancement round);
/// any leftover from the longer pool pairs among itself, with a single
/// trailing bye-forward if that leftover is odd.
fn interleave(pool_a: Vec<SlotSource>, pool_b: Vec<SlotSource>) -> Vec<MatchPlan> {
    let common = pool_a.len().min(pool_b.len());
    let mut matches: Vec<MatchPlan> = (0..common)
        .map(|i| MatchPlan::contested(pool_a[i], pool_b[i]))
        .collect();
    let leftover: Vec<SlotSource> = if pool_a.len() > common {
        pool_a[common..].to_vec()
    } else {
        pool_b[common..].to_vec()
    };
    matches.extend(pair_sequential(&leftover));
    matches
}
