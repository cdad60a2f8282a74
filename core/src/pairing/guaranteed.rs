//! guaranteed-matches pairing (spec §4.3.5): every fighter gets `target`
//! matches; round 1 is generated up front, later rounds are computed by the
//! bracket engine on round completion from the fighters still under target.

use std::collections::HashMap;

use crate::model::{FighterId, SeedingMethod};

use super::standings::{HeadToHead, rematch_count};
use super::{MatchPlan, PairingError, Shuffler, SlotSource};

/// single-class (or `weight_based_pairing = false`) round 1: consecutive
/// pairs in input order, odd fighter gets a bye.
pub fn round1_simple(
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
    let mut i = 0;
    while i + 1 < n {
        matches.push(MatchPlan::contested(
            SlotSource::Fighter(participants[i]),
            SlotSource::Fighter(participants[i + 1]),
        ));
        i += 2;
    }
    if i < n {
        matches.push(MatchPlan::bye(SlotSource::Fighter(participants[i])));
    }
    Ok(matches)
}

/// non-weight-aware continuation pairing (spec §4.3.5 step 4 "simple
/// path"): highest standing paired with next-highest, respecting
/// `max_rematches`; if every in-cap candidate is exhausted, take the first
/// unpaired fighter as a last resort (allows exceeding the cap). Odd
/// trailing fighter gets a bye.
pub fn pair_simple(
    sorted_desc: &[FighterId],
    history: &HashMap<(FighterId, FighterId), HeadToHead>,
    max_rematches: u32,
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
            .position(|&opp| rematch_count(history, current, opp) < max_rematches)
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
    fn odd_round1_gives_last_fighter_a_bye() {
        let ids: Vec<_> = (0..7).map(|_| Uuid::new_v4()).collect();
        let matches = round1_simple(&ids, SeedingMethod::InputOrder, &mut IdentityShuffler).unwrap();
        assert_eq!(matches.len(), 4);
        assert_eq!(
            matches.last().unwrap().kind,
            super::super::MatchPlanKind::Bye
        );
    }
}
