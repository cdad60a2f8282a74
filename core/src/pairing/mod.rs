//! pairing strategies (spec §4.3): pure functions over participant slices
//! that return round-construction instructions for the bracket engine to
//! materialize. None of these touch storage.

pub mod double_elim;
pub mod guaranteed;
pub mod round_robin;
pub mod single_elim;
pub mod standings;
pub mod swiss;
pub mod weight_aware;

use thiserror::Error;

use crate::model::{BracketLane, FighterId, LosersRoundKind, WeightClassId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairingError {
    #[error("bracket requires at least {minimum} participants, found {found}")]
    TooFewParticipants { minimum: usize, found: usize },
}

/// where one match slot's fighter comes from, expressed relative to the
/// bracket plan being built rather than a concrete stored id — the bracket
/// engine resolves `DependsOn` references to real `MatchId`s as it
/// materializes each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    Fighter(FighterId),
    DependsOn {
        round_index: usize,
        match_index: usize,
        requires_winner: bool,
    },
    /// unresolved: no fighter and no dependency (a genuine TBD slot, e.g. an
    /// advancement round waiting on a not-yet-known pool).
    Tbd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPlanKind {
    Contested,
    /// auto-completed bye: the non-null slot wins immediately.
    Bye,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlan {
    pub slot_a: SlotSource,
    pub slot_b: SlotSource,
    pub kind: MatchPlanKind,
    /// explicit weight-class override, set by weight-aware pairing (spec
    /// §4.3.6 "match weight-class assignment"); `None` means the engine
    /// falls back to the bracket's own `weight_class_id` at materialization.
    pub weight_class_id: Option<WeightClassId>,
}

impl MatchPlan {
    pub fn contested(a: SlotSource, b: SlotSource) -> Self {
        MatchPlan {
            slot_a: a,
            slot_b: b,
            kind: MatchPlanKind::Contested,
            weight_class_id: None,
        }
    }
    pub fn bye(a: SlotSource) -> Self {
        MatchPlan {
            slot_a: a,
            slot_b: SlotSource::Tbd,
            kind: MatchPlanKind::Bye,
            weight_class_id: None,
        }
    }
    pub fn with_weight_class(mut self, weight_class_id: Option<WeightClassId>) -> Self {
        self.weight_class_id = weight_class_id;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundActivation {
    /// both slots of every match are already known; the round starts
    /// InProgress with matches Ready (or pre-completed byes).
    Active,
    /// dependencies aren't resolved yet; the round starts Pending.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPlan {
    pub display_name: String,
    pub lane: Option<BracketLane>,
    pub losers_kind: Option<LosersRoundKind>,
    pub feeds_from_winners: Option<u32>,
    pub activation: RoundActivation,
    pub matches: Vec<MatchPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketPlan {
    pub rounds: Vec<RoundPlan>,
}

/// injected shuffle so `seeding_method = "random"` stays deterministic under
/// test (SPEC_FULL.md §2 ambient stack: `rand`, behind this seam).
pub trait Shuffler {
    fn shuffle<T>(&mut self, items: &mut [T]);
}

pub struct RandShuffler<R: rand::Rng>(pub R);

impl<R: rand::Rng> Shuffler for RandShuffler<R> {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        use rand::seq::SliceRandom;
        items.shuffle(&mut self.0);
    }
}

/// no-op shuffler for tests that need deterministic input order even when
/// `seeding_method = "random"` is requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityShuffler;

impl Shuffler for IdentityShuffler {
    fn shuffle<T>(&mut self, _items: &mut [T]) {}
}

/// rounds = ⌈log2 n⌉, shared by single-elim, double-elim (winners bracket),
/// and the Swiss default round count.
pub fn ceil_log2(n: usize) -> u32 {
    if n <= 1 {
        return 0;
    }
    let mut rounds = 0u32;
    let mut cap = 1usize;
    while cap < n {
        cap *= 2;
        rounds += 1;
    }
    rounds
}
