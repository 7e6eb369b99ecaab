//! Human-readable status lines for in-progress activities.

use crate::components::{ActivityRecord, Character};
use crate::config::{SchedulerConfig, TURNS_PER_MINUTE};
use crate::registry::ActivityRegistry;

fn capitalized(verb: &str) -> String {
    let mut chars = verb.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn percent(factor: f32) -> i32 {
    (factor * 100.0).round() as i32
}

fn duration_text(turns: i64) -> String {
    let per_minute = TURNS_PER_MINUTE as i64;
    let minutes = (turns + per_minute - 1) / per_minute;
    match turns {
        1 => "1 turn".to_string(),
        t if t < per_minute => format!("{} turns", t),
        _ if minutes == 1 => "1 minute".to_string(),
        _ => format!("{} minutes", minutes),
    }
}

/// Work done on `record` in a turn where the actor has `budget` moves.
fn work_with(budget: i32, record: &ActivityRecord, complex: bool, cfg: &SchedulerConfig) -> i64 {
    let flat = cfg.flat_moves_per_turn.max(1);
    let budget = i64::from(budget.clamp(0, flat));
    if complex {
        let per_turn = i64::from(record.speed_factors().total_moves(&cfg.speed).max(1));
        per_turn * budget / i64::from(flat)
    } else {
        budget
    }
}

/// Turns `character` needs for `work` more move-units on `record`.
///
/// The first turn runs on what the actor has left after any move debt,
/// later turns on its full speed. `None` if the work never gets done.
fn turns_for(
    work: i32,
    record: &ActivityRecord,
    complex: bool,
    character: &Character,
    cfg: &SchedulerConfig,
) -> Option<i64> {
    let left = i64::from(work);
    if left <= 0 {
        return Some(0);
    }
    let first = work_with(character.next_turn_moves(), record, complex, cfg);
    if first >= left {
        return Some(1);
    }
    let full = work_with(character.speed, record, complex, cfg);
    if full <= 0 {
        return None;
    }
    Some(1 + (left - first + full - 1) / full)
}

/// Status text for `record` as performed by `character`.
///
/// `None` for null records, unregistered types and types without a verb.
/// Reads only; neither the record nor the character is touched.
pub fn describe_activity(
    record: &ActivityRecord,
    registry: &ActivityRegistry,
    character: &Character,
    cfg: &SchedulerConfig,
) -> Option<String> {
    let ty = registry.get(record.id()?)?;
    if ty.verb.is_empty() {
        return None;
    }
    let verb = capitalized(&ty.verb);
    let time_left = |work: i32| {
        turns_for(work, record, ty.complex_moves, character, cfg).map(duration_text)
    };

    if ty.verbose_tooltip && !ty.special {
        let mut target = String::new();
        let mut progress = String::new();
        let tasks = &record.tasks;
        if let Some(current) = tasks.front() {
            target = format!(": {}", current.target_name);
            let several = tasks.total_tasks() > 1;
            progress += "Progress: ";
            if several {
                progress += &format!("\n - Total: {:.1}%\n", tasks.progress() * 100.0);
                progress += &format!(
                    "  - Processing {} out of {}\n",
                    tasks.index(),
                    tasks.total_tasks()
                );
                if let Some(time) = time_left(tasks.moves_left()) {
                    progress += &format!("  - Estimated time: {}\n", time);
                }
                progress += " - Current: ";
            }
            progress += &format!("{:.1}%\n", current.progress() * 100.0);
            if let Some(time) = time_left(current.moves_left) {
                if several {
                    progress += "  - ";
                }
                progress += &format!("Time left: {}\n", time);
            }
        } else {
            if record.moves_total > 0 {
                progress += &format!("Progress: {:.1}%\n", record.progress() * 100.0);
            }
            if record.moves_left > 0 {
                if let Some(time) = time_left(record.moves_left) {
                    progress += &format!("Time left: {}\n", time);
                }
            }
        }

        let factors = record.speed_factors();
        let mut mults = String::from("Speed multipliers:\n");
        mults += &format!(" - Total: {}%\n", percent(factors.total(&cfg.speed)));
        for (kind, value) in factors.entries() {
            if value != 1.0 {
                mults += &format!("  - {}: {}%\n", kind.label(), percent(value));
            }
        }
        return Some(format!("{}{}\n{}\n{}", verb, target, progress, mults));
    }

    if ty.percent_progress && record.moves_total > 0 {
        let done = (record.moves_total - record.moves_left).clamp(0, record.moves_total);
        let pct = i64::from(done) * 100 / i64::from(record.moves_total);
        return Some(format!("{}: {}%", verb, pct));
    }
    Some(format!("{}…", verb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::TaskQueue;
    use crate::registry::ActivityType;
    use crate::systems::ActorTurn;

    fn noop(_: &mut ActivityRecord, _: &mut ActorTurn<'_>) {}

    fn registry() -> ActivityRegistry {
        let mut reg = ActivityRegistry::with_builtins();
        reg.register(ActivityType::new("ACT_DIG").with_verb("digging").percent_progress().on_finish(noop))
            .unwrap();
        reg.register(ActivityType::new("ACT_SEARCH").with_verb("searching").on_finish(noop))
            .unwrap();
        reg.register(ActivityType::new("ACT_SILENT").on_finish(noop)).unwrap();
        reg.register(
            ActivityType::new("ACT_CRAFT")
                .with_verb("crafting")
                .complex_moves()
                .light_affected()
                .morale_affected()
                .verbose_tooltip()
                .on_finish(noop),
        )
        .unwrap();
        reg
    }

    #[test]
    fn test_percent_style() {
        let reg = registry();
        let mut rec = ActivityRecord::new("ACT_DIG", 1000);
        rec.moves_left = 250;
        let text = describe_activity(&rec, &reg, &Character::new("A"), &SchedulerConfig::default());
        assert_eq!(text.as_deref(), Some("Digging: 75%"));
    }

    #[test]
    fn test_plain_verb_style() {
        let reg = registry();
        let rec = ActivityRecord::new("ACT_SEARCH", 1000);
        let text = describe_activity(&rec, &reg, &Character::new("A"), &SchedulerConfig::default());
        assert_eq!(text.as_deref(), Some("Searching…"));
    }

    #[test]
    fn test_nothing_to_show() {
        let reg = registry();
        let c = Character::new("A");
        let cfg = SchedulerConfig::default();
        assert_eq!(describe_activity(&ActivityRecord::null(), &reg, &c, &cfg), None);
        assert_eq!(describe_activity(&ActivityRecord::new("ACT_SILENT", 10), &reg, &c, &cfg), None);
    }

    #[test]
    fn test_verbose_lists_only_relevant_factors() {
        let reg = registry();
        let mut rec = ActivityRecord::new("ACT_CRAFT", 1000);
        rec.moves_left = 500;
        rec.speed.light = Some(0.5);
        rec.speed.morale = Some(1.0);
        let text = describe_activity(&rec, &reg, &Character::new("A"), &SchedulerConfig::default())
            .unwrap();
        assert!(text.starts_with("Crafting\n"));
        assert!(text.contains("Progress: 50.0%"));
        // 500 left at 50 per turn
        assert!(text.contains("Time left: 10 turns"));
        assert!(text.contains(" - Total: 50%"));
        assert!(text.contains("  - Light: 50%"));
        assert!(!text.contains("Morale"));
    }

    #[test]
    fn test_verbose_walks_task_queue() {
        let reg = registry();
        let mut rec = ActivityRecord::new("ACT_CRAFT", 600);
        let mut tasks = TaskQueue::new();
        tasks.push("shirt", 200);
        tasks.push("boots", 400);
        tasks.mod_moves_left(-200);
        tasks.pop();
        tasks.mod_moves_left(-100);
        rec.tasks = tasks;
        rec.moves_left = 300;
        let text = describe_activity(&rec, &reg, &Character::new("A"), &SchedulerConfig::default())
            .unwrap();
        assert!(text.starts_with("Crafting: boots
"));
        assert!(text.contains(" - Total: 50.0%"));
        assert!(text.contains("  - Processing 2 out of 2"));
        assert!(text.contains("  - Estimated time: 3 turns"));
        assert!(text.contains(" - Current: 25.0%"));
        assert!(text.contains("  - Time left: 3 turns"));
    }

    #[test]
    fn test_single_task_keeps_short_layout() {
        let reg = registry();
        let mut rec = ActivityRecord::new("ACT_CRAFT", 400);
        rec.tasks.push("plank", 400);
        let text = describe_activity(&rec, &reg, &Character::new("A"), &SchedulerConfig::default())
            .unwrap();
        assert!(text.starts_with("Crafting: plank
Progress: 0.0%
Time left: 4 turns
"));
        assert!(!text.contains("out of"));
    }

    #[test]
    fn test_estimate_accounts_for_move_debt() {
        let reg = registry();
        let mut rec = ActivityRecord::new("ACT_CRAFT", 1000);
        rec.moves_left = 500;
        let mut c = Character::new("A");
        c.moves = -150;
        let text = describe_activity(&rec, &reg, &c, &SchedulerConfig::default()).unwrap();
        // Next turn nets 0 moves, the one after 50, then 100 a turn
        assert!(text.contains("Time left: 6 turns"), "{text}");
    }

    #[test]
    fn test_zero_speed_has_no_estimate() {
        let reg = registry();
        let rec = ActivityRecord::new("ACT_CRAFT", 500);
        let mut c = Character::new("A");
        c.speed = 0;
        let text = describe_activity(&rec, &reg, &c, &SchedulerConfig::default()).unwrap();
        assert!(!text.contains("Time left"));
    }

    #[test]
    fn test_long_waits_in_minutes() {
        let reg = registry();
        let rec = ActivityRecord::new(crate::registry::ids::WAIT, 60_000);
        let text = describe_activity(&rec, &reg, &Character::new("A"), &SchedulerConfig::default());
        assert_eq!(text.as_deref(), Some("Waiting: 0%"));
        assert_eq!(duration_text(600), "10 minutes");
        assert_eq!(duration_text(61), "2 minutes");
        assert_eq!(duration_text(1), "1 turn");
    }
}
