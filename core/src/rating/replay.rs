//! chronological rating replay engine (spec §4.2). Resets every fighter to
//! belt baseline and replays every completed, non-NoContest match in
//! (event.date ASC, match.id ASC) order, writing per-match deltas back.
//!
//! Kept a single synchronous pass on purpose (spec §9: "do not parallelize,
//! determinism requires serial application").

use std::collections::HashMap;

use crate::model::{
    BeltRank, ClassRating, Event, EventId, Fighter, FighterId, Match, MatchResultKind, RatingBook,
    WeightClass, WeightClassId, WeightClassTrack,
};

use super::kernel;

/// resolves the rating track a weight class is replayed under. A class with
/// both bounds open (multi-class bracket default) falls back to the
/// midpoint-of-bounds heuristic in [`WeightClassTrack::from_weight_lb`];
/// open bounds use whichever side is present (DESIGN.md, rating tracks).
pub fn class_track(class: &WeightClass) -> WeightClassTrack {
    let reference_lb = match (class.min_lb, class.max_lb) {
        (Some(min), Some(max)) => (min + max) / 2,
        (Some(min), None) => min.saturating_add(20),
        (None, Some(max)) => max.saturating_sub(20),
        (None, None) => 170,
    };
    WeightClassTrack::from_weight_lb(reference_lb)
}

#[derive(Debug, Clone, Copy, Default)]
struct MatchCounts {
    overall: u32,
    light: u32,
    middle: u32,
    heavy: u32,
}

impl MatchCounts {
    fn track(&self, track: WeightClassTrack) -> u32 {
        match track {
            WeightClassTrack::Lightweight => self.light,
            WeightClassTrack::Middleweight => self.middle,
            WeightClassTrack::Heavyweight => self.heavy,
        }
    }
    fn track_mut(&mut self, track: WeightClassTrack) -> &mut u32 {
        match track {
            WeightClassTrack::Lightweight => &mut self.light,
            WeightClassTrack::Middleweight => &mut self.middle,
            WeightClassTrack::Heavyweight => &mut self.heavy,
        }
    }
}

/// replays `matches` in place: fighters are reset to baseline and then every
/// eligible match's deltas are recomputed and written into `fighters` and
/// the match's `a_elo_change`/`b_elo_change` fields. Idempotent: calling
/// this twice on the same input yields identical output (spec §4.2, §8
/// "Rating idempotence").
pub fn replay(
    fighters: &mut HashMap<FighterId, Fighter>,
    matches: &mut [Match],
    events: &HashMap<EventId, Event>,
    weight_classes: &HashMap<WeightClassId, WeightClass>,
) {
    for fighter in fighters.values_mut() {
        fighter.ratings = RatingBook::reset_to_baseline(fighter.belt_rank);
    }

    let mut counts: HashMap<FighterId, MatchCounts> = HashMap::new();

    let mut order: Vec<usize> = (0..matches.len()).collect();
    order.sort_by(|&i, &j| {
        let mi = &matches[i];
        let mj = &matches[j];
        let di = events.get(&mi.event_id).map(|e| e.scheduled_date);
        let dj = events.get(&mj.event_id).map(|e| e.scheduled_date);
        di.cmp(&dj).then(mi.id.cmp(&mj.id))
    });

    for idx in order {
        replay_one(&mut matches[idx], fighters, weight_classes, &mut counts);
    }
}

fn replay_one(
    m: &mut Match,
    fighters: &mut HashMap<FighterId, Fighter>,
    weight_classes: &HashMap<WeightClassId, WeightClass>,
    counts: &mut HashMap<FighterId, MatchCounts>,
) {
    let (Some(a_id), Some(b_id)) = (m.slot_a, m.slot_b) else {
        return;
    };
    let Some(result) = m.result else {
        return;
    };
    if matches!(result, MatchResultKind::NoContest) {
        return;
    }
    let Some((actual_a, actual_b)) = result.actual_scores() else {
        return;
    };
    let Some(weight_class_id) = m.weight_class_id else {
        // spec §4.2 step 2 / §9 open question 2: skip entirely when absent.
        return;
    };
    let Some(class) = weight_classes.get(&weight_class_id) else {
        return;
    };
    let track = class_track(class);

    let (class_rating_a, class_rating_b, overall_a, overall_b, a_counts, b_counts) = {
        let a = fighters.get(&a_id);
        let b = fighters.get(&b_id);
        let (Some(a), Some(b)) = (a, b) else {
            return;
        };
        (
            a.ratings.track(track).current,
            b.ratings.track(track).current,
            a.ratings.overall,
            b.ratings.overall,
            counts.entry(a_id).or_default().to_owned(),
            counts.entry(b_id).or_default().to_owned(),
        )
    };

    let class_delta_a = kernel::delta(
        class_rating_a,
        class_rating_b,
        actual_a,
        a_counts.track(track),
    );
    let class_delta_b = kernel::delta(
        class_rating_b,
        class_rating_a,
        actual_b,
        b_counts.track(track),
    );
    let overall_delta_a = kernel::delta(overall_a, overall_b, actual_a, a_counts.overall);
    let overall_delta_b = kernel::delta(overall_b, overall_a, actual_b, b_counts.overall);

    if let Some(a) = fighters.get_mut(&a_id) {
        a.ratings.track_mut(track).current += class_delta_a;
        a.ratings.overall += overall_delta_a;
    }
    if let Some(b) = fighters.get_mut(&b_id) {
        b.ratings.track_mut(track).current += class_delta_b;
        b.ratings.overall += overall_delta_b;
    }

    m.a_elo_change = Some(class_delta_a.round() as i32);
    m.b_elo_change = Some(class_delta_b.round() as i32);

    let ac = counts.entry(a_id).or_default();
    *ac.track_mut(track) += 1;
    ac.overall += 1;
    let bc = counts.entry(b_id).or_default();
    *bc.track_mut(track) += 1;
    bc.overall += 1;
}

/// convenience constructor used by tests and by callers seeding a fighter
/// for the first time — not part of the replay algorithm itself.
pub fn baseline_for(belt: BeltRank) -> ClassRating {
    ClassRating::at_baseline(kernel::starting_elo(belt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityStatus, EventStatus};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn fighter(belt: BeltRank) -> Fighter {
        Fighter {
            id: Uuid::new_v4(),
            display_name: "x".into(),
            belt_rank: belt,
            body_weight_lb: Some(170),
            primary_weight_class_id: None,
            ratings: RatingBook::reset_to_baseline(belt),
            badges: vec![],
            status: EntityStatus::Active,
        }
    }

    fn event(date: chrono::DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "e".into(),
            scheduled_date: date,
            venue: "v".into(),
            status: EventStatus::Completed,
        }
    }

    fn wc() -> WeightClass {
        WeightClass {
            id: Uuid::new_v4(),
            name: "Middle".into(),
            min_lb: Some(156),
            max_lb: Some(185),
        }
    }

    fn completed_match(event_id: Uuid, a: Uuid, b: Uuid, wc_id: Uuid, result: MatchResultKind) -> Match {
        Match {
            id: Uuid::new_v4(),
            event_id,
            bracket_round_id: None,
            slot_a: Some(a),
            slot_b: Some(b),
            weight_class_id: Some(wc_id),
            result: Some(result),
            method: None,
            duration_seconds: Some(300),
            status: crate::model::MatchStatus::Completed,
            position: None,
            dependency_a: None,
            dependency_b: None,
            resolved_a: false,
            resolved_b: false,
            a_elo_change: None,
            b_elo_change: None,
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
        }
    }

    #[test]
    fn replay_is_idempotent() {
        let a = fighter(BeltRank::Blue);
        let b = fighter(BeltRank::Purple);
        let e = event(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let class = wc();
        let mut fighters = HashMap::new();
        fighters.insert(a.id, a.clone());
        fighters.insert(b.id, b.clone());
        let mut events = HashMap::new();
        events.insert(e.id, e.clone());
        let mut classes = HashMap::new();
        classes.insert(class.id, class.clone());

        let mut matches = vec![completed_match(
            e.id,
            a.id,
            b.id,
            class.id,
            MatchResultKind::PlayerAWin,
        )];

        replay(&mut fighters, &mut matches, &events, &classes);
        let first_pass = (fighters.clone(), matches.clone());

        replay(&mut fighters, &mut matches, &events, &classes);
        assert_eq!(fighters, first_pass.0);
        assert_eq!(matches, first_pass.1);
    }

    #[test]
    fn no_contest_produces_no_delta() {
        let a = fighter(BeltRank::Blue);
        let b = fighter(BeltRank::Blue);
        let e = event(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let class = wc();
        let mut fighters = HashMap::new();
        fighters.insert(a.id, a.clone());
        fighters.insert(b.id, b.clone());
        let mut events = HashMap::new();
        events.insert(e.id, e.clone());
        let mut classes = HashMap::new();
        classes.insert(class.id, class.clone());

        let mut matches = vec![completed_match(
            e.id,
            a.id,
            b.id,
            class.id,
            MatchResultKind::NoContest,
        )];
        replay(&mut fighters, &mut matches, &events, &classes);
        assert_eq!(matches[0].a_elo_change, None);
        assert_eq!(
            fighters[&a.id].ratings.overall,
            kernel::starting_elo(BeltRank::Blue)
        );
    }

    #[test]
    fn missing_weight_class_is_skipped() {
        let a = fighter(BeltRank::Blue);
        let b = fighter(BeltRank::Blue);
        let e = event(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let mut fighters = HashMap::new();
        fighters.insert(a.id, a.clone());
        fighters.insert(b.id, b.clone());
        let mut events = HashMap::new();
        events.insert(e.id, e.clone());
        let classes = HashMap::new();

        let mut m = completed_match(e.id, a.id, b.id, Uuid::new_v4(), MatchResultKind::PlayerAWin);
        m.weight_class_id = None;
        let mut matches = vec![m];
        replay(&mut fighters, &mut matches, &events, &classes);
        assert_eq!(matches[0].a_elo_change, None);
    }
}
