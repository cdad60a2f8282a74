//! shared standings and head-to-head computation used by Swiss, guaranteed
//! matches, and the weight-aware pairing pass (spec §4.3.3, §9 open
//! question 3: a precomputed symmetric map replaces per-comparison queries).

use std::collections::{HashMap, HashSet};

use crate::model::{FighterId, Match, MatchResultKind};

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsEntry {
    pub fighter_id: FighterId,
    pub points: f64,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub opponents: HashSet<FighterId>,
}

/// builds standings over `fighter_ids`, scored from `matches` (caller
/// restricts `matches` to the bracket/round scope that matters).
pub fn compute_standings(fighter_ids: &[FighterId], matches: &[Match]) -> Vec<StandingsEntry> {
    let mut by_id: HashMap<FighterId, StandingsEntry> = fighter_ids
        .iter()
        .map(|&id| {
            (
                id,
                StandingsEntry {
                    fighter_id: id,
                    points: 0.0,
                    wins: 0,
                    draws: 0,
                    losses: 0,
                    opponents: HashSet::new(),
                },
            )
        })
        .collect();

    for m in matches {
        let (Some(a), Some(b)) = (m.slot_a, m.slot_b) else {
            continue;
        };
        let Some(result) = m.result else { continue };
        if matches!(result, MatchResultKind::NoContest) {
            continue;
        }
        if let Some(entry) = by_id.get_mut(&a) {
            entry.opponents.insert(b);
        }
        if let Some(entry) = by_id.get_mut(&b) {
            entry.opponents.insert(a);
        }
        match result {
            MatchResultKind::PlayerAWin => {
                if let Some(e) = by_id.get_mut(&a) {
                    e.wins += 1;
                    e.points += 1.0;
                }
                if let Some(e) = by_id.get_mut(&b) {
                    e.losses += 1;
                }
            }
            MatchResultKind::PlayerBWin => {
                if let Some(e) = by_id.get_mut(&b) {
                    e.wins += 1;
                    e.points += 1.0;
                }
                if let Some(e) = by_id.get_mut(&a) {
                    e.losses += 1;
                }
            }
            MatchResultKind::Draw => {
                if let Some(e) = by_id.get_mut(&a) {
                    e.draws += 1;
                    e.points += 0.5;
                }
                if let Some(e) = by_id.get_mut(&b) {
                    e.draws += 1;
                    e.points += 0.5;
                }
            }
            MatchResultKind::NoContest => unreachable!(),
        }
    }

    fighter_ids
        .iter()
        .map(|id| by_id.remove(id).expect("seeded above"))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadToHead {
    pub a_wins: u32,
    pub b_wins: u32,
    pub draws: u32,
}

/// symmetric head-to-head index: `h2h[(a, b)].a_wins == h2h[(b, a)].b_wins`
/// for every pair that has met (spec §8 "Head-to-head symmetry").
pub fn build_head_to_head_index(matches: &[Match]) -> HashMap<(FighterId, FighterId), HeadToHead> {
    let mut idx: HashMap<(FighterId, FighterId), HeadToHead> = HashMap::new();
    for m in matches {
        let (Some(a), Some(b)) = (m.slot_a, m.slot_b) else {
            continue;
        };
        let Some(result) = m.result else { continue };
        if matches!(result, MatchResultKind::NoContest) {
            continue;
        }
        let (a_win_delta, b_win_delta, draw_delta) = match result {
            MatchResultKind::PlayerAWin => (1, 0, 0),
            MatchResultKind::PlayerBWin => (0, 1, 0),
            MatchResultKind::Draw => (0, 0, 1),
            MatchResultKind::NoContest => unreachable!(),
        };
        let ab = idx.entry((a, b)).or_default();
        ab.a_wins += a_win_delta;
        ab.b_wins += b_win_delta;
        ab.draws += draw_delta;
        let ba = idx.entry((b, a)).or_default();
        ba.a_wins += b_win_delta;
        ba.b_wins += a_win_delta;
        ba.draws += draw_delta;
    }
    idx
}

pub fn rematch_count(
    history: &HashMap<(FighterId, FighterId), HeadToHead>,
    a: FighterId,
    b: FighterId,
) -> u32 {
    history
        .get(&(a, b))
        .map(|h| h.a_wins + h.b_wins + h.draws)
        .unwrap_or(0)
}
