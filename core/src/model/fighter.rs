// fighter identity, belt rank, and rating book (spec §3 Fighter, §4.1 Rating
// Kernel starting ELO table)

use serde::{Deserialize, Serialize};

use super::{FighterId, WeightClassId};
use super::weight_class::WeightClassTrack;

/// competitor skill grade; maps to a starting ELO via [`BeltRank::starting_elo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeltRank {
    White,
    Blue,
    Purple,
    Brown,
    Black,
}

impl BeltRank {
    /// case-insensitive parse; unknown/missing input resolves to the Blue
    /// baseline (spec §4.1).
    pub fn parse_or_blue(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "white" => BeltRank::White,
            "blue" => BeltRank::Blue,
            "purple" => BeltRank::Purple,
            "brown" => BeltRank::Brown,
            "black" => BeltRank::Black,
            _ => BeltRank::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Active,
    Inactive,
}

/// per-class rating plus the initial (baseline) rating recorded for that
/// class at the last replay reset (spec §3: "per-weight-class current
/// rating and initial rating").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassRating {
    pub current: f64,
    pub initial: f64,
}

impl ClassRating {
    pub fn at_baseline(rating: f64) -> Self {
        ClassRating {
            current: rating,
            initial: rating,
        }
    }
}

/// the four rating tracks a fighter carries: one overall (P4P) track plus
/// one per [`WeightClassTrack`] (spec §3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingBook {
    pub overall: f64,
    pub light: ClassRating,
    pub middle: ClassRating,
    pub heavy: ClassRating,
}

impl RatingBook {
    pub fn reset_to_baseline(belt: BeltRank) -> Self {
        let base = crate::rating::kernel::starting_elo(belt);
        RatingBook {
            overall: base,
            light: ClassRating::at_baseline(base),
            middle: ClassRating::at_baseline(base),
            heavy: ClassRating::at_baseline(base),
        }
    }

    pub fn track(&self, track: WeightClassTrack) -> ClassRating {
        match track {
            WeightClassTrack::Lightweight => self.light,
            WeightClassTrack::Middleweight => self.middle,
            WeightClassTrack::Heavyweight => self.heavy,
        }
    }

    pub fn track_mut(&mut self, track: WeightClassTrack) -> &mut ClassRating {
        match track {
            WeightClassTrack::Lightweight => &mut self.light,
            WeightClassTrack::Middleweight => &mut self.middle,
            WeightClassTrack::Heavyweight => &mut self.heavy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub id: FighterId,
    pub display_name: String,
    pub belt_rank: BeltRank,
    pub body_weight_lb: Option<u32>,
    pub primary_weight_class_id: Option<WeightClassId>,
    pub ratings: RatingBook,
    /// per-process-opaque manual badges; the engine never interprets these,
    /// it only carries them (spec §3, out-of-scope badge administration).
    pub badges: Vec<String>,
    pub status: EntityStatus,
}

impl Fighter {
    pub fn is_active(&self) -> bool {
        self.status == EntityStatus::Active
    }
}
