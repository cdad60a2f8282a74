//! pure ELO functions (spec §4.1). Stateless; no storage access.

use crate::model::BeltRank;

/// belt-based starting rating (spec §4.1 table). The alternative 200-point
/// ladder from some initialization scripts is not implemented — DESIGN.md
/// records why this table was chosen as canonical.
pub fn starting_elo(belt: BeltRank) -> f64 {
    match belt {
        BeltRank::Black => 2000.0,
        BeltRank::Brown => 1600.0,
        BeltRank::Purple => 1467.0,
        BeltRank::Blue => 1333.0,
        BeltRank::White => 1200.0,
    }
}

/// expected score of a fighter rated `r` against an opponent rated `r_opp`.
pub fn expected(r: f64, r_opp: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((r_opp - r) / 400.0))
}

/// K-factor: higher for fighters still building a track record.
pub fn k_factor(matches_played: u32) -> f64 {
    if matches_played < 10 { 32.0 } else { 24.0 }
}

/// rating delta for one fighter in one match. `actual` is 1.0/0.5/0.0.
pub fn delta(r: f64, r_opp: f64, actual: f64, matches_played: u32) -> f64 {
    k_factor(matches_played) * (actual - expected(r, r_opp))
}

/// the delta each of the three possible outcomes (A win / draw / B win)
/// would produce for fighter `r` against `r_opp`, without mutating state.
/// Reinstated from `original_source/.../elo_service.py::preview_elo_changes`
/// (SPEC_FULL.md §10) for the `tale-of-the-tape` composed read.
pub fn preview_outcomes(r: f64, r_opp: f64, matches_played: u32) -> [f64; 3] {
    [
        delta(r, r_opp, 1.0, matches_played),
        delta(r, r_opp, 0.5, matches_played),
        delta(r, r_opp, 0.0, matches_played),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ratings_expect_fifty_fifty() {
        assert!((expected(1500.0, 1500.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn underdog_win_gains_more_than_expected_win() {
        let upset = delta(1400.0, 1700.0, 1.0, 20);
        let expected_win = delta(1700.0, 1400.0, 1.0, 20);
        assert!(upset > expected_win);
    }

    #[test]
    fn new_fighter_uses_higher_k_factor() {
        let novice = delta(1500.0, 1500.0, 1.0, 3);
        let veteran = delta(1500.0, 1500.0, 1.0, 40);
        assert!(novice > veteran);
    }

    #[test]
    fn belt_table_matches_canonical_ladder() {
        assert_eq!(starting_elo(BeltRank::Black), 2000.0);
        assert_eq!(starting_elo(BeltRank::Brown), 1600.0);
        assert_eq!(starting_elo(BeltRank::Purple), 1467.0);
        assert_eq!(starting_elo(BeltRank::Blue), 1333.0);
        assert_eq!(starting_elo(BeltRank::White), 1200.0);
    }
}
