// match entity and its dependency pair (spec §3 Match, §9 redesign: a
// direct non-cyclic `[Option<MatchDependency>; 2]` replaces the source's
// `depends_on_match_a/b` + `requires_winner_a/b` columns)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, FighterId, MatchId, WeightClassId};

/// wire-stable strings per spec §6 "Persisted enums": `"a_win"`, `"b_win"`,
/// `"draw"`, `"no_contest"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResultKind {
    #[serde(rename = "a_win")]
    PlayerAWin,
    #[serde(rename = "b_win")]
    PlayerBWin,
    Draw,
    NoContest,
}

impl MatchResultKind {
    /// (actualA, actualB) per spec §4.2 step 5; `None` for NoContest, which
    /// the replay engine must skip entirely.
    pub fn actual_scores(self) -> Option<(f64, f64)> {
        match self {
            MatchResultKind::PlayerAWin => Some((1.0, 0.0)),
            MatchResultKind::PlayerBWin => Some((0.0, 1.0)),
            MatchResultKind::Draw => Some((0.5, 0.5)),
            MatchResultKind::NoContest => None,
        }
    }

    pub fn winner_loser(self, a: FighterId, b: FighterId) -> (Option<FighterId>, Option<FighterId>) {
        match self {
            MatchResultKind::PlayerAWin => (Some(a), Some(b)),
            MatchResultKind::PlayerBWin => (Some(b), Some(a)),
            MatchResultKind::Draw | MatchResultKind::NoContest => (None, None),
        }
    }
}

/// wire-stable strings per spec §6: `"pending"`, `"ready"`, `"in_progress"`,
/// `"completed"`, `"cancelled"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Ready,
    InProgress,
    Completed,
    Cancelled,
}

/// a match's dependency on one predecessor match for a single slot (spec §3:
/// "dependency pair: two optional references to predecessor matches ... with
/// per-slot `requiresWinner` booleans").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDependency {
    pub source: MatchId,
    /// `true` takes the predecessor's winner, `false` takes the loser — only
    /// valid in losers-bracket contexts (spec §3 invariant).
    pub requires_winner: bool,
}

pub const METHOD_BYE: &str = "Bye";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub event_id: EventId,
    pub bracket_round_id: Option<super::BracketRoundId>,
    pub slot_a: Option<FighterId>,
    pub slot_b: Option<FighterId>,
    pub weight_class_id: Option<WeightClassId>,
    pub result: Option<MatchResultKind>,
    pub method: Option<String>,
    pub duration_seconds: Option<u32>,
    pub status: MatchStatus,
    pub position: Option<u32>,
    pub dependency_a: Option<MatchDependency>,
    pub dependency_b: Option<MatchDependency>,
    /// set once the corresponding dependency has been consumed by
    /// propagation (slot populated, or permanently dead). The dependency
    /// reference itself is never cleared on resolution so `undoMatchResult`
    /// can still find this match via `listDependents` after the slot is
    /// populated (spec §4.4).
    pub resolved_a: bool,
    pub resolved_b: bool,
    pub a_elo_change: Option<i32>,
    pub b_elo_change: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn is_bye(&self) -> bool {
        self.method.as_deref() == Some(METHOD_BYE)
    }

    pub fn winner_loser(&self) -> (Option<FighterId>, Option<FighterId>) {
        match (self.result, self.slot_a, self.slot_b) {
            (Some(result), Some(a), Some(b)) => result.winner_loser(a, b),
            (Some(MatchResultKind::PlayerAWin), Some(a), None) => (Some(a), None),
            _ => (None, None),
        }
    }

    pub fn both_slots_set(&self) -> bool {
        self.slot_a.is_some() && self.slot_b.is_some()
    }
}
