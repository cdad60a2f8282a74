//! round robin scheduling via the circle method (spec §4.3.4). All rounds
//! are pre-created; round 1 starts active, later rounds start pending and
//! are activated one at a time by the bracket engine as prior rounds
//! complete.

use crate::model::{FighterId, SeedingMethod};

use super::{BracketPlan, MatchPlan, PairingError, RoundActivation, RoundPlan, Shuffler, SlotSource};

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

    let mut slots: Vec<Option<FighterId>> = participants.iter().map(|&id| Some(id)).collect();
    if slots.len() % 2 == 1 {
        slots.push(None); // virtual bye slot
    }
    let m = slots.len();
    let total_rounds = m - 1;

    let mut rounds = Vec::with_capacity(total_rounds);
    for round_number in 1..=total_rounds {
        let mut matches = Vec::new();
        for i in 0..m / 2 {
            let a = slots[i];
            let b = slots[m - 1 - i];
            if let (Some(a), Some(b)) = (a, b) {
                matches.push(MatchPlan::contested(
                    SlotSource::Fighter(a),
                    SlotSource::Fighter(b),
                ));
            }
            // a pair involving the virtual bye slot plays no match at all —
            // that fighter simply sits out this round.
        }
        rounds.push(RoundPlan {
            display_name: format!("Round {round_number}"),
            lane: None,
            losers_kind: None,
            feeds_from_winners: None,
            activation: if round_number == 1 {
                RoundActivation::Active
            } else {
                RoundActivation::Pending
            },
            matches,
        });
        rotate(&mut slots);
    }

    Ok(BracketPlan { rounds })
}

fn rotate(slots: &mut Vec<Option<FighterId>>) {
    if slots.len() < 2 {
        return;
    }
    let last = slots.pop().unwrap();
    slots.insert(1, last);
}
