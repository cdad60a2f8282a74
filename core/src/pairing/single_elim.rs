//! single elimination seeding and round topology (spec §4.3.1).

use crate::model::{FighterId, SeedingMethod};

use super::{BracketPlan, MatchPlan, PairingError, RoundActivation, RoundPlan, Shuffler, ceil_log2};

pub fn round_name(round_number: u32, total_rounds: u32) -> String {
    let remaining = total_rounds - round_number;
    match remaining {
        0 => "Final".to_string(),
        1 => "Semifinals".to_string(),
        2 => "Quarterfinals".to_string(),
        _ => format!("Round {round_number}"),
    }
}

/// builds the full winners-style single-elimination topology: round 1's
/// contested pairs and lone byes, then every later round's matches wired up
/// by `SlotSource::DependsOn` back to the previous round's matches.
///
/// When the previous round's match count is odd, the last match of a round
/// only has one real predecessor — its other slot is `Tbd` and never gets a
/// dependency at all; the bracket engine treats such a match as a forced
/// bye once its one real predecessor resolves (spec §8 scenario 2).
pub fn build(
    participants: &[FighterId],
    seeding: SeedingMethod,
    shuffler: &mut impl Shuffler,
) -> Result<BracketPlan, PairingError> {
    let mut participants = participants.to_vec();
    if seeding == SeedingMethod::Random {
        shuffler.shuffle(&mut participants);
    }
    let n = participants.len();
    if n < 2 {
        return Err(PairingError::TooFewParticipants { minimum: 2, found: n });
    }
    let rounds = ceil_log2(n);

    let mut round1_matches = Vec::new();
    let mut i = 0;
    while i + 1 < n {
        round1_matches.push(MatchPlan::contested(
            super::SlotSource::Fighter(participants[i]),
            super::SlotSource::Fighter(participants[i + 1]),
        ));
        i += 2;
    }
    if i < n {
        round1_matches.push(MatchPlan::bye(super::SlotSource::Fighter(participants[i])));
    }

    let mut round_plans = vec![RoundPlan {
        display_name: round_name(1, rounds),
        lane: None,
        losers_kind: None,
        feeds_from_winners: None,
        activation: RoundActivation::Active,
        matches: round1_matches,
    }];

    for k in 2..=rounds {
        let prev_index = (k - 2) as usize;
        let prev_count = round_plans[prev_index].matches.len();
        let match_count = 1usize << (rounds - k);
        let mut matches = Vec::with_capacity(match_count);
        for m in 0..match_count {
            let src_a = 2 * m;
            let src_b = 2 * m + 1;
            let slot_a = dep_or_tbd(prev_index, src_a, prev_count);
            let slot_b = dep_or_tbd(prev_index, src_b, prev_count);
            matches.push(MatchPlan::contested(slot_a, slot_b));
        }
        round_plans.push(RoundPlan {
            display_name: round_name(k, rounds),
            lane: None,
            losers_kind: None,
            feeds_from_winners: None,
            activation: RoundActivation::Pending,
            matches,
        });
    }

    Ok(BracketPlan { rounds: round_plans })
}

fn dep_or_tbd(round_index: usize, match_index: usize, prev_count: usize) -> super::SlotSource {
    if match_index < prev_count {
        super::SlotSource::DependsOn {
            round_index,
            match_index,
            requires_winner: true,
        }
    } else {
        super::SlotSource::Tbd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::IdentityShuffler;
    use uuid::Uuid;

    fn ids(n: usize) -> Vec<FighterId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn eight_fighters_three_rounds_no_byes() {
        let plan = build(&ids(8), SeedingMethod::InputOrder, &mut IdentityShuffler).unwrap();
        assert_eq!(plan.rounds.len(), 3);
        assert_eq!(plan.rounds[0].matches.len(), 4);
        assert_eq!(plan.rounds[1].matches.len(), 2);
        assert_eq!(plan.rounds[2].matches.len(), 1);
        assert_eq!(plan.rounds[2].display_name, "Final");
        assert_eq!(plan.rounds[1].display_name, "Semifinals");
        assert_eq!(plan.rounds[0].display_name, "Quarterfinals");
        for m in &plan.rounds[0].matches {
            assert_eq!(m.kind, super::super::MatchPlanKind::Contested);
        }
    }

    #[test]
    fn six_fighters_no_round1_byes_but_topology_shortfall_in_round2() {
        let plan = build(&ids(6), SeedingMethod::InputOrder, &mut IdentityShuffler).unwrap();
        assert_eq!(plan.rounds[0].matches.len(), 3);
        assert!(plan.rounds[0]
            .matches
            .iter()
            .all(|m| m.kind == super::super::MatchPlanKind::Contested));
        assert_eq!(plan.rounds[1].matches.len(), 2);
        let shortfall = &plan.rounds[1].matches[1];
        assert_eq!(shortfall.slot_b, super::super::SlotSource::Tbd);
    }

    #[test]
    fn single_participant_is_rejected() {
        assert!(build(&ids(1), SeedingMethod::InputOrder, &mut IdentityShuffler).is_err());
    }
}
