//! Deciding whether a stored record and a newly committed one are the same
//! logical task.

use crate::components::ActivityRecord;
use crate::registry::{ActivityRegistry, ResumeRule};

/// True if `candidate` may be satisfied by resuming `stored` instead.
///
/// `stored` must not itself be waiting for automatic resumption: an
/// auto-resume record comes back on its own and is never a resume target.
pub fn can_resume_with(
    stored: &ActivityRecord,
    candidate: &ActivityRecord,
    registry: &ActivityRegistry,
) -> bool {
    let (Some(stored_id), Some(candidate_id)) = (stored.id(), candidate.id()) else {
        return false;
    };
    if stored_id != candidate_id || stored.auto_resume {
        return false;
    }
    let Some(ty) = registry.get(stored_id) else {
        return false;
    };
    if !ty.resumable {
        return false;
    }

    let same_slots = stored.index == candidate.index
        && stored.position == candidate.position
        && stored.name == candidate.name;
    if !same_slots {
        return false;
    }

    match ty.resume_rule {
        ResumeRule::Generic => generic_payload_eq(stored, candidate),
        ResumeRule::Coordinates => {
            generic_payload_eq(stored, candidate)
                && matches!(
                    (stored.coords.first(), candidate.coords.first()),
                    (Some(a), Some(b)) if a == b
                )
        }
        ResumeRule::Participants => {
            same_set(&stored.values, &candidate.values)
                && matches!(
                    (stored.targets.first(), candidate.targets.first()),
                    (Some(a), Some(b)) if a == b
                )
                && generic_payload_eq(stored, candidate)
        }
        ResumeRule::VehicleValues => {
            generic_payload_eq(stored, candidate) && stored.values == candidate.values
        }
    }
}

fn generic_payload_eq(a: &ActivityRecord, b: &ActivityRecord) -> bool {
    a.targets == b.targets && a.str_values == b.str_values
}

// Order-insensitive, but sizes must match.
fn same_set(a: &[i32], b: &[i32]) -> bool {
    a.len() == b.len() && b.iter().all(|v| a.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ObjectRef, TriPoint};
    use crate::registry::ActivityType;
    use crate::systems::ActorTurn;

    fn noop(_: &mut ActivityRecord, _: &mut ActorTurn<'_>) {}

    fn registry() -> ActivityRegistry {
        let mut reg = ActivityRegistry::new();
        for ty in [
            ActivityType::new("ACT_CRAFT").on_finish(noop),
            ActivityType::new("ACT_ONCE").no_resume().on_finish(noop),
            ActivityType::new("ACT_CLEAR_RUBBLE")
                .with_resume_rule(ResumeRule::Coordinates)
                .on_finish(noop),
            ActivityType::new("ACT_READ")
                .with_resume_rule(ResumeRule::Participants)
                .on_finish(noop),
            ActivityType::new("ACT_VEHICLE")
                .with_resume_rule(ResumeRule::VehicleValues)
                .on_finish(noop),
        ] {
            reg.register(ty).unwrap();
        }
        reg
    }

    #[test]
    fn test_reflexive() {
        let reg = registry();
        let rec = ActivityRecord::new("ACT_CRAFT", 500)
            .with_index(2)
            .with_name("knife")
            .with_targets(vec![ObjectRef(9)])
            .with_str_values(["steel"]);
        assert!(can_resume_with(&rec, &rec.clone(), &reg));
    }

    #[test]
    fn test_null_type_and_flags() {
        let reg = registry();
        let rec = ActivityRecord::new("ACT_CRAFT", 500);
        assert!(!can_resume_with(&ActivityRecord::null(), &rec, &reg));
        assert!(!can_resume_with(&rec, &ActivityRecord::null(), &reg));
        assert!(!can_resume_with(&rec, &ActivityRecord::new("ACT_READ", 500), &reg));

        let waiting = rec.clone().with_auto_resume(true);
        assert!(!can_resume_with(&waiting, &rec, &reg));

        let once = ActivityRecord::new("ACT_ONCE", 500);
        assert!(!can_resume_with(&once, &once.clone(), &reg));
    }

    #[test]
    fn test_generic_rejects_different_string_value() {
        let reg = registry();
        let a = ActivityRecord::new("ACT_CRAFT", 500).with_str_values(["steel"]);
        let b = ActivityRecord::new("ACT_CRAFT", 500).with_str_values(["bronze"]);
        assert!(!can_resume_with(&a, &b, &reg));
    }

    #[test]
    fn test_generic_ignores_budget_and_values() {
        let reg = registry();
        let mut a = ActivityRecord::new("ACT_CRAFT", 500).with_values(vec![1]);
        a.moves_left = 120;
        let b = ActivityRecord::new("ACT_CRAFT", 500).with_values(vec![2]);
        assert!(can_resume_with(&a, &b, &reg));
    }

    #[test]
    fn test_coordinate_rule() {
        let reg = registry();
        let a = ActivityRecord::new("ACT_CLEAR_RUBBLE", 500).with_coords(vec![TriPoint::new(1, 2, 0)]);
        let same = a.clone();
        let moved = ActivityRecord::new("ACT_CLEAR_RUBBLE", 500).with_coords(vec![TriPoint::new(2, 2, 0)]);
        let empty = ActivityRecord::new("ACT_CLEAR_RUBBLE", 500);
        assert!(can_resume_with(&a, &same, &reg));
        assert!(!can_resume_with(&a, &moved, &reg));
        assert!(!can_resume_with(&a, &empty, &reg));
    }

    #[test]
    fn test_participant_rule_is_order_insensitive() {
        let reg = registry();
        let a = ActivityRecord::new("ACT_READ", 500)
            .with_values(vec![1, 2])
            .with_targets(vec![ObjectRef(5)]);
        let b = ActivityRecord::new("ACT_READ", 500)
            .with_values(vec![2, 1])
            .with_targets(vec![ObjectRef(5)]);
        let joined = ActivityRecord::new("ACT_READ", 500)
            .with_values(vec![1, 2, 3])
            .with_targets(vec![ObjectRef(5)]);
        let other_book = ActivityRecord::new("ACT_READ", 500)
            .with_values(vec![1, 2])
            .with_targets(vec![ObjectRef(6)]);
        assert!(can_resume_with(&a, &b, &reg));
        assert!(!can_resume_with(&a, &joined, &reg));
        assert!(!can_resume_with(&a, &other_book, &reg));
    }

    #[test]
    fn test_vehicle_rule_is_exact() {
        let reg = registry();
        let a = ActivityRecord::new("ACT_VEHICLE", 500)
            .with_values(vec![3, 4])
            .with_str_values(["engine"]);
        let swapped = ActivityRecord::new("ACT_VEHICLE", 500)
            .with_values(vec![4, 3])
            .with_str_values(["engine"]);
        assert!(can_resume_with(&a, &a.clone(), &reg));
        assert!(!can_resume_with(&a, &swapped, &reg));
    }
}
