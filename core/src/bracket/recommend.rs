//! `recommendFormat` (spec §4.4): estimates each format's total match count
//! and event duration for a given participant count, then ranks the
//! formats against a desired match-count range and an optional time
//! budget. The original source has no analogue for this operation — it is
//! a spec.md addition implemented exactly as spec.md §4.4 describes it
//! (SPEC_FULL.md §4.5).

use crate::model::TournamentFormat;
use crate::pairing::swiss;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatRecommendation {
    pub format: TournamentFormat,
    pub match_count: u32,
    pub matches_per_fighter: f64,
    pub estimated_minutes: i64,
    pub in_range: bool,
    pub distance_from_range: u32,
    pub fits_in_budget: bool,
}

/// default `match_count` used to estimate GuaranteedMatches when the caller
/// has no config yet (mirrors `BracketConfig::default_for`).
const DEFAULT_GUARANTEED_TARGET: u32 = 3;

/// spec §4.4 match-count formulas. `None` means the format can't field
/// `n` participants at all (DoubleElim below 8) and is omitted from the
/// result list rather than erroring, since recommendation is advisory.
fn match_count(format: TournamentFormat, n: usize) -> Option<u32> {
    if n < 2 {
        return None;
    }
    match format {
        TournamentFormat::SingleElim => Some((n - 1) as u32),
        TournamentFormat::DoubleElim => {
            if n < 8 {
                None
            } else {
                Some((n - 1 + n - 2 + 1) as u32)
            }
        }
        TournamentFormat::RoundRobin => Some((n as u32) * (n as u32 - 1) / 2),
        TournamentFormat::Swiss => {
            let rounds = swiss::default_total_rounds(n);
            Some((n as u32 / 2) * rounds)
        }
        TournamentFormat::GuaranteedMatches => {
            Some((n as u32 * DEFAULT_GUARANTEED_TARGET) / 2)
        }
    }
}

/// spec §4.4: "Estimated event minutes = matches·(duration+2) − 2 (2-minute
/// gap between matches)".
fn estimated_minutes(matches: u32, match_duration_min: u32) -> i64 {
    if matches == 0 {
        return 0;
    }
    matches as i64 * (match_duration_min as i64 + 2) - 2
}

/// ranks every format that can field `n` fighters against the desired
/// `[min_matches, max_matches]` range and, if given, a time budget.
///
/// Sort order (spec §4.4): "Sort by `fitsInBudget` first (when budget
/// provided), then by `|estimated−budget|`; otherwise by in-range, then
/// distance-from-range."
pub fn recommend(
    n: usize,
    min_matches: u32,
    max_matches: u32,
    match_duration_min: u32,
    time_budget_min: Option<u32>,
) -> Vec<FormatRecommendation> {
    let formats = [
        TournamentFormat::SingleElim,
        TournamentFormat::DoubleElim,
        TournamentFormat::Swiss,
        TournamentFormat::RoundRobin,
        TournamentFormat::GuaranteedMatches,
    ];

    let mut out: Vec<FormatRecommendation> = formats
        .into_iter()
        .filter_map(|format| {
            let matches = match_count(format, n)?;
            let minutes = estimated_minutes(matches, match_duration_min);
            let in_range = matches >= min_matches && matches <= max_matches;
            let distance_from_range = if in_range {
                0
            } else if matches < min_matches {
                min_matches - matches
            } else {
                matches - max_matches
            };
            let fits_in_budget = match time_budget_min {
                Some(budget) => minutes <= budget as i64,
                None => true,
            };
            let matches_per_fighter = (matches as f64 * 2.0) / n as f64;
            Some(FormatRecommendation {
                format,
                match_count: matches,
                matches_per_fighter,
                estimated_minutes: minutes,
                in_range,
                distance_from_range,
                fits_in_budget,
            })
        })
        .collect();

    match time_budget_min {
        Some(budget) => out.sort_by(|a, b| {
            b.fits_in_budget.cmp(&a.fits_in_budget).then(
                (a.estimated_minutes - budget as i64)
                    .abs()
                    .cmp(&(b.estimated_minutes - budget as i64).abs()),
            )
        }),
        None => out.sort_by(|a, b| {
            b.in_range
                .cmp(&a.in_range)
                .then(a.distance_from_range.cmp(&b.distance_from_range))
        }),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_elim_needs_n_minus_one_matches() {
        let recs = recommend(8, 1, 100, 8, None);
        let se = recs.iter().find(|r| r.format == TournamentFormat::SingleElim).unwrap();
        assert_eq!(se.match_count, 7);
    }

    #[test]
    fn double_elim_excluded_below_eight() {
        let recs = recommend(6, 1, 100, 8, None);
        assert!(!recs.iter().any(|r| r.format == TournamentFormat::DoubleElim));
    }

    #[test]
    fn double_elim_match_count_matches_spec_formula() {
        let recs = recommend(8, 1, 100, 8, None);
        let de = recs.iter().find(|r| r.format == TournamentFormat::DoubleElim).unwrap();
        // n-1 + n-2 + 1 = 7 + 6 + 1 = 14 for n=8.
        assert_eq!(de.match_count, 14);
    }

    #[test]
    fn estimated_minutes_applies_two_minute_gaps() {
        let recs = recommend(8, 1, 100, 10, None);
        let se = recs.iter().find(|r| r.format == TournamentFormat::SingleElim).unwrap();
        // 7 matches * (10 + 2) - 2 = 82.
        assert_eq!(se.estimated_minutes, 82);
    }

    #[test]
    fn out_of_range_formats_sort_behind_in_range_ones_when_no_budget() {
        // 4 fighters: single-elim needs 3 matches, round-robin needs 6.
        let recs = recommend(4, 3, 3, 10, None);
        let se_index = recs.iter().position(|r| r.format == TournamentFormat::SingleElim).unwrap();
        let rr_index = recs.iter().position(|r| r.format == TournamentFormat::RoundRobin).unwrap();
        assert!(se_index < rr_index);
        assert!(recs[se_index].in_range);
        assert!(!recs[rr_index].in_range);
    }

    #[test]
    fn budget_fit_outranks_in_range_when_budget_given() {
        let recs = recommend(8, 1, 100, 10, Some(50));
        // single-elim (82 min) exceeds a 50-minute budget; formats that fit
        // should sort ahead of it regardless of match-count range.
        let se_index = recs.iter().position(|r| r.format == TournamentFormat::SingleElim).unwrap();
        assert!(!recs[se_index].fits_in_budget);
        assert!(recs.iter().take(se_index).all(|r| r.fits_in_budget) || se_index == 0);
    }
}
