//! Turn driver: steps one actor's foreground record once per turn.
//!
//! Order within a step:
//! 1. mark the record active (cleared on every exit path)
//! 2. auto-needs: refuel fires, opportunistic eating and drinking
//! 3. NPCs out of bounds abort without finishing
//! 4. move accounting (skipped for special types)
//! 5. turn handler
//! 6. stamina guard may displace the record with a forced rest
//! 7. rooted side effect
//! 8. finish handler once the budget is spent
//!
//! The driver never looks at a record after a handler could have retired
//! it without first checking `is_null`.

use rand::rngs::StdRng;
use rand::Rng;
use std::ops::{Deref, DerefMut};

use super::refresh_factors;
use crate::components::{ActivityRecord, ActorId, Character};
use crate::config::SchedulerConfig;
use crate::environment::{ConsumeKind, Environment};
use crate::registry::{builtin, ids, ActivityRegistry, ActivityType};

/// A line of player-visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub actor: ActorId,
    pub turn: u64,
    pub text: String,
}

/// Everything a handler may touch while its record is stepped.
pub struct ActorTurn<'a> {
    pub actor: ActorId,
    pub character: &'a mut Character,
    pub turn: u64,
    pub config: &'a SchedulerConfig,
    env: &'a mut dyn Environment,
    messages: &'a mut Vec<Message>,
    rng: &'a mut StdRng,
    replacement: Option<ActivityRecord>,
}

impl<'a> ActorTurn<'a> {
    pub fn new(
        actor: ActorId,
        character: &'a mut Character,
        turn: u64,
        config: &'a SchedulerConfig,
        env: &'a mut dyn Environment,
        messages: &'a mut Vec<Message>,
        rng: &'a mut StdRng,
    ) -> Self {
        Self {
            actor,
            character,
            turn,
            config,
            env,
            messages,
            rng,
            replacement: None,
        }
    }

    /// Show a message if the actor is the player.
    pub fn message(&mut self, text: impl Into<String>) {
        if self.character.is_npc {
            return;
        }
        self.messages.push(Message {
            actor: self.actor,
            turn: self.turn,
            text: text.into(),
        });
    }

    pub fn env(&self) -> &dyn Environment {
        &*self.env
    }

    pub fn env_mut(&mut self) -> &mut dyn Environment {
        &mut *self.env
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    /// Ask the driver to put `record` in front of the current one once the
    /// handler returns.
    pub fn assign_activity(&mut self, record: ActivityRecord) {
        self.replacement = Some(record);
    }

    fn take_replacement(&mut self) -> Option<ActivityRecord> {
        self.replacement.take()
    }
}

/// Holds the record's `active` flag for the length of one step.
struct ActiveGuard<'r> {
    record: &'r mut ActivityRecord,
}

impl<'r> ActiveGuard<'r> {
    fn new(record: &'r mut ActivityRecord) -> Self {
        record.active = true;
        Self { record }
    }
}

impl Deref for ActiveGuard<'_> {
    type Target = ActivityRecord;

    fn deref(&self) -> &ActivityRecord {
        self.record
    }
}

impl DerefMut for ActiveGuard<'_> {
    fn deref_mut(&mut self) -> &mut ActivityRecord {
        self.record
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.record.active = false;
    }
}

/// What the engine has to do with the record after a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Still foreground next turn.
    Continue,
    /// Completed naturally; `next` is what the finish handler asked for.
    Finished { next: Option<ActivityRecord> },
    /// Retired without finishing (handler request or unknown type).
    Retired,
    /// NPC abort because its position is no longer valid.
    Aborted,
    /// Something else takes over; the stepped record is displaced.
    Displaced(ActivityRecord),
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepOutcome::Finished { .. } | StepOutcome::Retired | StepOutcome::Aborted
        )
    }
}

/// Step `record` by one turn.
pub fn step_activity(
    record: &mut ActivityRecord,
    registry: &ActivityRegistry,
    turn: &mut ActorTurn<'_>,
) -> StepOutcome {
    let Some(type_id) = record.type_id.clone() else {
        return StepOutcome::Retired;
    };
    let Some(ty) = registry.lookup(&type_id) else {
        record.set_to_null();
        return StepOutcome::Retired;
    };
    let cfg = turn.config;
    let mut act = ActiveGuard::new(record);

    // Auto-needs
    if ty.refuel_fires {
        turn.env.try_refuel_fire(turn.actor, turn.character);
    }
    if turn.turn % cfg.auto_needs_interval.max(1) == 0 {
        act.no_food_nearby = false;
        act.no_drink_nearby = false;
    }
    if !turn.character.is_npc && ty.auto_needs && !act.no_food_nearby {
        if turn.character.is_hungry(cfg.hunger_threshold)
            && !turn
                .env
                .try_auto_consume(turn.actor, turn.character, ConsumeKind::Food)
        {
            act.no_food_nearby = true;
        }
        if turn.character.is_thirsty(cfg.thirst_threshold)
            && !act.no_drink_nearby
            && !turn
                .env
                .try_auto_consume(turn.actor, turn.character, ConsumeKind::Drink)
        {
            act.no_drink_nearby = true;
        }
    }

    let previous_stamina = turn.character.stamina;
    if turn.character.is_npc && !turn.env.is_in_bounds(turn.character.position) {
        log::warn!(
            "{} is out of bounds, dropping {}",
            turn.actor,
            type_id
        );
        act.set_to_null();
        return StepOutcome::Aborted;
    }

    if !ty.special {
        spend_moves(&mut *act, ty, turn);
    }

    if let Some(on_turn) = ty.on_turn {
        on_turn(&mut *act, turn);
    }
    if let Some(next) = turn.take_replacement() {
        if act.is_null() {
            return StepOutcome::Finished { next: Some(next) };
        }
        return StepOutcome::Displaced(next);
    }

    if !act.is_null() && ty.id.as_str() != ids::WAIT_STAMINA {
        let stamina = turn.character.stamina;
        let guard = cfg.stamina_guard_level(turn.character.stamina_max);
        if stamina < previous_stamina && stamina < guard {
            let one_in = cfg.catch_breath_message_one_in;
            if one_in > 0 && turn.rng.gen_ratio(1, one_in) {
                turn.message("You pause for a moment to catch your breath.");
            }
            act.auto_resume = true;
            log::debug!(
                "{} out of breath ({} < {}), pausing {}",
                turn.actor,
                stamina,
                guard,
                type_id
            );
            return StepOutcome::Displaced(builtin::catch_breath(turn.character, cfg));
        }
    }

    if act.is_null() {
        return StepOutcome::Retired;
    }

    if ty.rooted {
        turn.character.rooted_turns = cfg.rooted_status_turns;
        turn.character.mod_stamina(cfg.rooted_stamina_regen);
    }

    if !act.complete() {
        return StepOutcome::Continue;
    }

    if let Some(on_finish) = ty.on_finish {
        on_finish(&mut *act, turn);
    }
    let next = turn.take_replacement();
    if !act.is_null() && act.moves_left > 0 {
        // Re-armed by the finish handler
        return match next {
            Some(next) => StepOutcome::Displaced(next),
            None => StepOutcome::Continue,
        };
    }
    act.set_to_null();
    StepOutcome::Finished { next }
}

/// Move accounting for one step.
///
/// Flat types do `flat_moves_per_turn` work for as many actor moves. Complex
/// types do `total_moves` work per full turn of actor moves, so a faster
/// actor finishes sooner. Unspent actor moves stay with the actor. Work done
/// is also charged to the current queued task.
fn spend_moves(act: &mut ActivityRecord, ty: &ActivityType, turn: &mut ActorTurn<'_>) {
    let cfg = turn.config;
    let flat = cfg.flat_moves_per_turn.max(1);
    let available = turn.character.moves.max(0);
    let before = act.moves_left;

    if ty.complex_moves {
        let full = act
            .factors_refreshed_at
            .map_or(true, |at| turn.turn.saturating_sub(at) >= cfg.expensive_factor_interval);
        refresh_factors(act, ty, turn.character, &*turn.env, &cfg.speed, full);
        if full {
            act.factors_refreshed_at = Some(turn.turn);
        }

        let per_turn = act.speed.total_moves(&cfg.speed).max(1);
        let budget = available.min(flat);
        let work = (i64::from(per_turn) * i64::from(budget) / i64::from(flat)) as i32;
        if act.moves_left >= work {
            act.moves_left -= work;
            turn.character.moves -= budget;
        } else {
            let left = act.moves_left.max(0);
            let spent = (i64::from(left) * i64::from(flat) + i64::from(per_turn) - 1)
                / i64::from(per_turn);
            turn.character.moves -= spent as i32;
            act.moves_left = 0;
        }
    } else {
        let work = flat.min(available).min(act.moves_left.max(0));
        act.moves_left -= work;
        turn.character.moves -= work;
        if act.moves_left < 0 {
            act.moves_left = 0;
        }
    }

    let spent = before - act.moves_left;
    if spent > 0 {
        act.tasks.mod_moves_left(-spent);
    }

    log::trace!(
        "{} {}: moves_left {} -> {}, actor moves {}",
        turn.actor,
        ty.id,
        before,
        act.moves_left,
        turn.character.moves
    );
}
