//! weight-aware guaranteed-matches pairing (spec §4.3.6).

use std::collections::HashMap;

use crate::model::{FighterId, WeightClassId};

use super::standings::{HeadToHead, StandingsEntry, rematch_count};
use super::{MatchPlan, SlotSource};

#[derive(Debug, Clone, Copy, Default)]
pub struct FighterAttrs {
    pub weight_lb: Option<u32>,
    pub weight_class_id: Option<WeightClassId>,
    pub rating: f64,
}

const HEAVYWEIGHT_FLOOR_LB: u32 = 200;
const MAX_WEIGHT_GAP_LB: u32 = 30;

/// §4.3.6 weight-legality predicate.
pub fn is_weight_legal(a: Option<u32>, b: Option<u32>) -> bool {
    match (a, b) {
        (None, _) | (_, None) => true,
        (Some(a), Some(b)) if a > HEAVYWEIGHT_FLOOR_LB && b > HEAVYWEIGHT_FLOOR_LB => true,
        (Some(a), Some(b)) => a.abs_diff(b) <= MAX_WEIGHT_GAP_LB,
    }
}

/// the heavier fighter's weight class (spec §4.3.6 "match weight-class
/// assignment").
pub fn match_weight_class(a: &FighterAttrs, b: &FighterAttrs) -> Option<WeightClassId> {
    match (a.weight_lb, b.weight_lb) {
        (Some(wa), Some(wb)) => {
            if wa >= wb {
                a.weight_class_id
            } else {
                b.weight_class_id
            }
        }
        (Some(_), None) => a.weight_class_id,
        (None, Some(_)) => b.weight_class_id,
        (None, None) => None,
    }
}

/// sorts standings by (points desc, wins desc, rating desc) — spec §4.3.6:
/// "the rating tiebreak is what drives competitive pairings when records
/// are tied".
pub fn sort_standings(standings: &mut [StandingsEntry], attrs: &HashMap<FighterId, FighterAttrs>) {
    standings.sort_by(|a, b| {
        let ra = attrs.get(&a.fighter_id).map(|x| x.rating).unwrap_or(0.0);
        let rb = attrs.get(&b.fighter_id).map(|x| x.rating).unwrap_or(0.0);
        b.points
            .partial_cmp(&a.points)
            .unwrap()
            .then(b.wins.cmp(&a.wins))
            .then(rb.partial_cmp(&ra).unwrap())
    });
}

/// four-pass candidate search per unpaired fighter (spec §4.3.6): same
/// class + legal + under cap, then cross class + legal + under cap, then
/// same class + legal (cap relaxed), then cross class + legal (cap
/// relaxed). No candidate found below the legality floor ⇒ bye.
pub fn pair(
    sorted_desc: &[FighterId],
    attrs: &HashMap<FighterId, FighterAttrs>,
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
        let current_attrs = attrs.get(&current).copied().unwrap_or_default();
        let mut chosen_idx = None;

        'passes: for pass in 0..4 {
            for (i, &candidate) in unpaired.iter().enumerate() {
                let cand_attrs = attrs.get(&candidate).copied().unwrap_or_default();
                if !is_weight_legal(current_attrs.weight_lb, cand_attrs.weight_lb) {
                    continue;
                }
                let same_class = current_attrs.weight_class_id.is_some()
                    && current_attrs.weight_class_id == cand_attrs.weight_class_id;
                let under_cap = rematch_count(history, current, candidate) < max_rematches;
                let matches_pass = match pass {
                    0 => same_class && under_cap,
                    1 => !same_class && under_cap,
                    2 => same_class,
                    3 => !same_class,
                    _ => unreachable!(),
                };
                if matches_pass {
                    chosen_idx = Some(i);
                    break 'passes;
                }
            }
        }

        match chosen_idx {
            Some(idx) => {
                let opponent = unpaired.remove(idx);
                let opp_attrs = attrs.get(&opponent).copied().unwrap_or_default();
                let wc = match_weight_class(&current_attrs, &opp_attrs);
                matches.push(
                    MatchPlan::contested(SlotSource::Fighter(current), SlotSource::Fighter(opponent))
                        .with_weight_class(wc),
                );
            }
            None => {
                let wc = current_attrs.weight_class_id;
                matches.push(MatchPlan::bye(SlotSource::Fighter(current)).with_weight_class(wc));
            }
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavyweights_are_legal_regardless_of_gap() {
        assert!(is_weight_legal(Some(210), Some(290)));
    }

    #[test]
    fn non_heavyweights_need_thirty_pound_gap() {
        assert!(is_weight_legal(Some(150), Some(175)));
        assert!(!is_weight_legal(Some(150), Some(190)));
    }

    #[test]
    fn missing_weight_degrades_to_legal() {
        assert!(is_weight_legal(None, Some(300)));
    }

    #[test]
    fn heavier_fighter_class_wins_assignment() {
        use uuid::Uuid;
        let light_class = Uuid::new_v4();
        let heavy_class = Uuid::new_v4();
        let a = FighterAttrs {
            weight_lb: Some(150),
            weight_class_id: Some(light_class),
            rating: 1500.0,
        };
        let b = FighterAttrs {
            weight_lb: Some(210),
            weight_class_id: Some(heavy_class),
            rating: 1400.0,
        };
        assert_eq!(match_weight_class(&a, &b), Some(heavy_class));
    }
}
