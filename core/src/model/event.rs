// events and entries (spec §3 Event, Entry) — both mutated by the external
// CRUD/check-in façade; the engine only reads them (eligible-participant
// queries) through the storage port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BeltRank, EntryId, EventId, FighterId, WeightClassId};

/// wire-stable strings per spec §3's status list; the façade owns mutation,
/// the engine only reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    RegistrationOpen,
    CheckIn,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub scheduled_date: DateTime<Utc>,
    pub venue: String,
    pub status: EventStatus,
}

/// registration record; belt/weight are snapshotted at check-in so later
/// belt promotions don't retroactively change a bracket's eligibility
/// (spec §3: "snapshot belt rank and weight captured at check-in").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub event_id: EventId,
    pub fighter_id: FighterId,
    pub weight_class_id: Option<WeightClassId>,
    pub checked_in: bool,
    pub snapshot_belt_rank: BeltRank,
    pub snapshot_weight_lb: Option<u32>,
}
