//! Activity types the scheduler itself relies on.

use super::ActivityType;
use crate::components::{ActivityRecord, Character};
use crate::config::SchedulerConfig;
use crate::systems::ActorTurn;

/// Identifiers of the built-in types.
pub mod ids {
    /// Forced rest pushed by the stamina guard.
    pub const WAIT_STAMINA: &str = "ACT_WAIT_STAMINA";
    /// Plain countdown.
    pub const WAIT: &str = "ACT_WAIT";
}

pub(super) fn types() -> Vec<ActivityType> {
    vec![
        ActivityType::new(ids::WAIT_STAMINA)
            .with_verb("catching your breath")
            .rooted()
            .percent_progress()
            .on_turn(wait_stamina_turn)
            .on_finish(wait_stamina_finish),
        ActivityType::new(ids::WAIT)
            .with_verb("waiting")
            .rooted()
            .percent_progress()
            .on_finish(wait_finish),
    ]
}

/// The forced wait the stamina guard puts in front of a tiring task.
///
/// `values[0]` holds the stamina level at which the wait ends early.
pub fn catch_breath(character: &Character, cfg: &SchedulerConfig) -> ActivityRecord {
    let target = cfg.catch_breath_stamina_offset + cfg.stamina_guard_level(character.stamina_max);
    ActivityRecord::new(ids::WAIT_STAMINA, cfg.catch_breath_moves).with_values(vec![target])
}

// values[0]: stamina target, values[1]: stamina when the wait began
fn wait_stamina_turn(act: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
    let mut threshold = turn.character.stamina_max;
    if let Some(&target) = act.values.first() {
        threshold = target;
        if act.values.len() == 1 {
            act.values.push(turn.character.stamina);
        }
    }
    if turn.character.stamina >= threshold {
        wait_stamina_finish(act, turn);
    }
}

fn wait_stamina_finish(act: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
    let stamina = turn.character.stamina;
    if let Some(&target) = act.values.first() {
        let initial = act.get_value(1, stamina);
        if stamina < target && stamina <= initial {
            log::warn!(
                "{} failed to reach stamina {} while waiting, only at {}",
                turn.actor,
                target,
                stamina
            );
        }
    } else if stamina < turn.character.stamina_max {
        turn.message("You are bored of waiting, so you stop.");
    } else {
        turn.message("You finish waiting and feel refreshed.");
    }
    act.set_to_null();
}

fn wait_finish(act: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
    turn.message("You finish waiting.");
    act.set_to_null();
}
