//! Swiss pairing (spec §4.3.3): a fixed round 1, then standings-driven
//! rematch-avoiding pairing on every later round, computed by the bracket
//! engine on round completion.

use std::collections::HashMap;

use crate::model::{FighterId, SeedingMethod};

use super::standings::{HeadToHead, StandingsEntry, rematch_count};
use super::{MatchPlan, PairingError, Shuffler, SlotSource, ceil_log2};

pub fn default_total_rounds(n: usize) -> u32 {
    ceil_log2(n)
}

/// round 1: participants[i] vs participants[n-1-i]; the middle fighter (odd
/// n) gets an auto-completed bye.
pub fn round1(
    participants: &[FighterId],
    seeding: SeedingMethod,
    shuffler: &mut impl Shuffler,
) -> Result<Vec<MatchPlan>, PairingError> {
    let mut participants = participants.to_vec();
    if seeding == SeedingMethod::Random {
        shuffler.shuffle(&mut participants);
    }
    let n = participants.len();
    if n < 2 {
        return Err(PairingError::TooFewParticipants { minimum: 2, found: n });
    }
    let mut matches = Vec::new();
    for i in 0..n / 2 {
        matches.push(MatchPlan::contested(
            SlotSource::Fighter(participants[i]),
            SlotSource::Fighter(participants[n - 1 - i]),
        ));
    }
    if n % 2 == 1 {
        matches.push(MatchPlan::bye(SlotSource::Fighter(participants[n / 2])));
    }
    Ok(matches)
}

/// sorts standings by (points desc, wins desc) per spec §4.3.3 step 3.
pub fn sort_standings(standings: &mut [StandingsEntry]) {
    standings.sort_by(|a, b| {
        b.points
            .partial_cmp(&a.points)
            .unwrap()
            .then(b.wins.cmp(&a.wins))
    });
}

/// greedy rematch-avoiding pairing over an already-sorted fighter list
/// (spec §4.3.3 step 4): for each unpaired fighter, take the next unpaired
/// fighter not yet faced; if none exists, relax the constraint and take the
/// next unpaired fighter. An odd trailing fighter gets a bye.
pub fn pair_round(
    sorted_desc: &[FighterId],
    history: &HashMap<(FighterId, FighterId), HeadToHead>,
) -> Vec<MatchPlan> {
    let mut unpaired: Vec<FighterId> = sorted_desc.to_vec();
    let mut matches = Vec::new();
    while !unpaired.is_empty() {
        let current = unpaired.remove(0);
        if unpaired.is_empty() {
            matches.push(MatchPlan::bye(SlotSource::Fighter(current)));
            break;
        }
        let idx = unpaired
            .iter()
            .position(|&opp| rematch_count(history, current, opp) == 0)
            .unwrap_or(0);
        let opponent = unpaired.remove(idx);
        matches.push(MatchPlan::contested(
            SlotSource::Fighter(current),
            SlotSource::Fighter(opponent),
        ));
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::IdentityShuffler;
    use uuid::Uuid;

    #[test]
    fn odd_count_gives_middle_fighter_a_bye() {
        let ids: Vec<_> = (0..5).map(|_| Uuid::new_v4()).collect();
        let matches = round1(&ids, SeedingMethod::InputOrder, &mut IdentityShuffler).unwrap();
        assert_eq!(matches.len(), 3);
        let byes: Vec<_> = matches
            .iter()
            .filter(|m| m.kind == super::super::MatchPlanKind::Bye)
            .collect();
        assert_eq!(byes.len(), 1);
        assert_eq!(byes[0].slot_a, SlotSource::Fighter(ids[2]));
    }

    #[test]
    fn pairing_avoids_rematches_when_possible() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let d = Uuid::new_v4();
        let mut history = HashMap::new();
        history.insert((a, b), HeadToHead { a_wins: 1, b_wins: 0, draws: 0 });
        history.insert((b, a), HeadToHead { a_wins: 0, b_wins: 1, draws: 0 });
        let matches = pair_round(&[a, b, c, d], &history);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].slot_a, SlotSource::Fighter(a));
        assert_eq!(matches[0].slot_b, SlotSource::Fighter(c));
    }
}
