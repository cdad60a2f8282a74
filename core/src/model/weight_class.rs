// weight class reference data (spec §3 WeightClass) and the closed rating
// track a weight class resolves to (spec §9 redesign: replaces attribute
// introspection with a closed tagged variant)

use serde::{Deserialize, Serialize};

use super::WeightClassId;

/// immutable reference data, seeded once; min/max bounds are inclusive and
/// either may be open (no lower/upper limit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightClass {
    pub id: WeightClassId,
    pub name: String,
    pub min_lb: Option<u32>,
    pub max_lb: Option<u32>,
}

impl WeightClass {
    pub fn contains(&self, weight_lb: u32) -> bool {
        if let Some(min) = self.min_lb {
            if weight_lb < min {
                return false;
            }
        }
        if let Some(max) = self.max_lb {
            if weight_lb > max {
                return false;
            }
        }
        true
    }
}

/// the three rating tracks a fighter carries per-class ELO under (spec §4.1,
/// §9 "closed tagged variant `WeightClassTrack`")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightClassTrack {
    Lightweight,
    Middleweight,
    Heavyweight,
}

impl WeightClassTrack {
    /// maps a body weight onto one of the three rating tracks; used by the
    /// replay engine when a weight class carries no explicit track tag
    /// (DESIGN.md, rating tracks).
    pub fn from_weight_lb(weight_lb: u32) -> Self {
        if weight_lb <= 155 {
            WeightClassTrack::Lightweight
        } else if weight_lb <= 200 {
            WeightClassTrack::Middleweight
        } else {
            WeightClassTrack::Heavyweight
        }
    }

    pub const ALL: [WeightClassTrack; 3] = [
        WeightClassTrack::Lightweight,
        WeightClassTrack::Middleweight,
        WeightClassTrack::Heavyweight,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_bounds_accept_any_weight_on_that_side() {
        let wc = WeightClass {
            id: uuid::Uuid::new_v4(),
            name: "Heavyweight".into(),
            min_lb: Some(206),
            max_lb: None,
        };
        assert!(wc.contains(500));
        assert!(!wc.contains(205));
    }

    #[test]
    fn track_thresholds() {
        assert_eq!(
            WeightClassTrack::from_weight_lb(145),
            WeightClassTrack::Lightweight
        );
        assert_eq!(
            WeightClassTrack::from_weight_lb(185),
            WeightClassTrack::Middleweight
        );
        assert_eq!(
            WeightClassTrack::from_weight_lb(230),
            WeightClassTrack::Heavyweight
        );
    }
}
