// bracket format/round entities (spec §3 BracketFormat, BracketRound; §9
// redesign: the free-form config map and `round_data` JSON dict become
// closed per-format variants instead of open maps)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BracketFormatId, BracketRoundId, EventId, WeightClassId};

/// wire-stable strings per spec §6: `"single_elimination"`,
/// `"double_elimination"`, `"swiss"`, `"round_robin"`, `"guaranteed_matches"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    #[serde(rename = "single_elimination")]
    SingleElim,
    #[serde(rename = "double_elimination")]
    DoubleElim,
    Swiss,
    RoundRobin,
    GuaranteedMatches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    Random,
    InputOrder,
}

impl Default for SeedingMethod {
    fn default() -> Self {
        SeedingMethod::InputOrder
    }
}

/// closed config variant, one per format, carrying only the documented keys
/// of spec.md §3's config table (replaces the free-form JSON config column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BracketConfig {
    SingleElim {
        seeding_method: SeedingMethod,
    },
    DoubleElim {
        seeding_method: SeedingMethod,
    },
    Swiss {
        seeding_method: SeedingMethod,
        /// total Swiss rounds; `None` ⇒ default `⌈log2 n⌉`, resolved once n
        /// is known at generation time.
        rounds: Option<u32>,
    },
    RoundRobin {
        seeding_method: SeedingMethod,
    },
    GuaranteedMatches {
        seeding_method: SeedingMethod,
        match_count: u32,
        max_rematches: u32,
        weight_based_pairing: bool,
    },
}

impl BracketConfig {
    pub fn format(&self) -> TournamentFormat {
        match self {
            BracketConfig::SingleElim { .. } => TournamentFormat::SingleElim,
            BracketConfig::DoubleElim { .. } => TournamentFormat::DoubleElim,
            BracketConfig::Swiss { .. } => TournamentFormat::Swiss,
            BracketConfig::RoundRobin { .. } => TournamentFormat::RoundRobin,
            BracketConfig::GuaranteedMatches { .. } => TournamentFormat::GuaranteedMatches,
        }
    }

    pub fn seeding_method(&self) -> SeedingMethod {
        match self {
            BracketConfig::SingleElim { seeding_method }
            | BracketConfig::DoubleElim { seeding_method }
            | BracketConfig::Swiss { seeding_method, .. }
            | BracketConfig::RoundRobin { seeding_method }
            | BracketConfig::GuaranteedMatches { seeding_method, .. } => *seeding_method,
        }
    }

    pub fn default_for(format: TournamentFormat) -> Self {
        match format {
            TournamentFormat::SingleElim => BracketConfig::SingleElim {
                seeding_method: SeedingMethod::InputOrder,
            },
            TournamentFormat::DoubleElim => BracketConfig::DoubleElim {
                seeding_method: SeedingMethod::InputOrder,
            },
            TournamentFormat::Swiss => BracketConfig::Swiss {
                seeding_method: SeedingMethod::InputOrder,
                rounds: None,
            },
            TournamentFormat::RoundRobin => BracketConfig::RoundRobin {
                seeding_method: SeedingMethod::InputOrder,
            },
            TournamentFormat::GuaranteedMatches => BracketConfig::GuaranteedMatches {
                seeding_method: SeedingMethod::InputOrder,
                match_count: 3,
                max_rematches: 1,
                weight_based_pairing: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketFormat {
    pub id: BracketFormatId,
    pub event_id: EventId,
    pub weight_class_id: Option<WeightClassId>,
    pub config: BracketConfig,
    pub min_rest_minutes: u32,
    pub auto_generate: bool,
    pub generated: bool,
    pub finalized: bool,
}

/// wire-stable strings per spec §6: `"pending"`, `"in_progress"`,
/// `"completed"`, `"cancelled"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketLane {
    Winners,
    Losers,
    Finals,
}

/// spec §3 round metadata key `type` ∈ {`drop_down`, `advancement`}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LosersRoundKind {
    DropDown,
    Advancement,
}

/// replaces the Python `round_data` JSON dict (spec §3 "round metadata map")
/// with typed fields, populated only for the formats that use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundMetadata {
    pub lane: Option<BracketLane>,
    pub losers_kind: Option<LosersRoundKind>,
    /// the winners-bracket round number a losers drop-down round drains from.
    pub feeds_from_winners: Option<u32>,
    pub total_rounds: Option<u32>,
    pub total_matches_per_fighter: Option<u32>,
    pub max_rematches: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketRound {
    pub id: BracketRoundId,
    pub bracket_format_id: BracketFormatId,
    pub round_number: u32,
    pub display_name: String,
    pub status: RoundStatus,
    pub metadata: RoundMetadata,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
