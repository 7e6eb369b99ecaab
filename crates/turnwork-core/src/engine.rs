//! Scheduler engine - main entry point for running actors' activities

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::components::*;
use crate::config::SchedulerConfig;
use crate::environment::{Environment, OpenField};
use crate::error::{SaveError, SchedulerError};
use crate::registry::ActivityRegistry;
use crate::systems::*;

const RESUME_MESSAGE: &str = "You resume your task.";
const ROOTED_MESSAGE: &str = "You plant your feet and settle in.";

/// Main scheduler engine
pub struct SchedulerEngine<E: Environment = OpenField> {
    /// ECS world containing every actor
    pub world: World,
    registry: Arc<ActivityRegistry>,
    config: SchedulerConfig,
    env: E,
    actors: ActorIndex,
    next_actor_id: u32,
    turn: u64,
    messages: Vec<Message>,
    rng: StdRng,
}

impl SchedulerEngine {
    /// Create an engine over an unbounded, featureless world
    pub fn new(registry: impl Into<Arc<ActivityRegistry>>, config: SchedulerConfig) -> Self {
        Self::with_environment(registry, config, OpenField)
    }
}

impl<E: Environment> SchedulerEngine<E> {
    /// Create an engine over a given world collaborator
    pub fn with_environment(
        registry: impl Into<Arc<ActivityRegistry>>,
        config: SchedulerConfig,
        env: E,
    ) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            world: World::new(),
            registry: registry.into(),
            config,
            env,
            actors: ActorIndex::new(),
            next_actor_id: 1,
            turn: 0,
            messages: Vec::new(),
            rng,
        }
    }

    // ── Actors ──────────────────────────────────────────────────────────

    /// Add an idle actor
    pub fn spawn_actor(&mut self, character: Character) -> ActorId {
        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;
        let entity = self.world.spawn((id, character, Backlog::new()));
        self.actors.insert(id, entity);
        id
    }

    /// Remove an actor. Its helpers are released and any binding it held
    /// as a helper is dropped from the leader's record.
    pub fn despawn_actor(&mut self, actor: ActorId) -> Result<(), SchedulerError> {
        let entity = self.entity(actor)?;
        if let Ok(mut record) = self.world.remove_one::<ActivityRecord>(entity) {
            release_assistants(&mut self.world, &self.actors, actor, &mut record);
        }
        self.unbind_helper(entity, actor);
        let _ = self.world.despawn(entity);
        self.actors.remove(&actor);
        log::debug!("despawned {}", actor);
        Ok(())
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// All actors in processing order
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    fn entity(&self, actor: ActorId) -> Result<Entity, SchedulerError> {
        self.actors
            .get(&actor)
            .copied()
            .ok_or(SchedulerError::UnknownActor(actor))
    }

    // ── Commands ────────────────────────────────────────────────────────

    /// Make `record` the actor's foreground activity.
    ///
    /// If the backlog top is the same logical task it is resumed instead.
    /// Whatever was in the foreground is displaced onto the backlog, or
    /// canceled when its type is not suspendable. Morale-blocked types are
    /// refused to actors below `morale_block_level`.
    pub fn assign_activity(
        &mut self,
        actor: ActorId,
        record: ActivityRecord,
    ) -> Result<(), SchedulerError> {
        let entity = self.entity(actor)?;
        let Some(id) = record.id() else {
            return Ok(());
        };
        let Some(ty) = self.registry.get(id) else {
            return Err(SchedulerError::UnknownActivityType(id.clone()));
        };
        if ty.morale_blocked {
            let morale = self
                .world
                .get::<&Character>(entity)
                .map(|c| c.morale)
                .unwrap_or(0);
            if morale < self.config.morale_block_level {
                return Err(SchedulerError::TooUnhappy {
                    actor,
                    id: id.clone(),
                });
            }
        }
        self.commit(entity, actor, record);
        Ok(())
    }

    /// Commit a fresh record of `type_id` with a budget of `moves`
    pub fn start_activity(
        &mut self,
        actor: ActorId,
        type_id: &str,
        moves: i32,
    ) -> Result<(), SchedulerError> {
        self.assign_activity(actor, ActivityRecord::new(type_id, moves))
    }

    /// Abort the foreground record. Its cancel handler runs and its helpers
    /// are released; the backlog is left alone. Returns whether anything
    /// was canceled.
    pub fn cancel_activity(&mut self, actor: ActorId) -> Result<bool, SchedulerError> {
        let entity = self.entity(actor)?;
        match self.world.remove_one::<ActivityRecord>(entity) {
            Ok(record) if !record.is_null() => {
                self.cancel_record(entity, actor, record);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Interrupt the foreground record, keeping it on the backlog for
    /// later. Non-suspendable records are canceled instead.
    pub fn suspend_activity(&mut self, actor: ActorId) -> Result<bool, SchedulerError> {
        let entity = self.entity(actor)?;
        match self.world.remove_one::<ActivityRecord>(entity) {
            Ok(record) if !record.is_null() => {
                self.displace(entity, actor, record);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Pop the backlog top back into the foreground, displacing whatever
    /// is there. Returns whether there was anything to resume.
    pub fn resume_activity(&mut self, actor: ActorId) -> Result<bool, SchedulerError> {
        let entity = self.entity(actor)?;
        let Some(mut record) = self
            .world
            .get::<&mut Backlog>(entity)
            .ok()
            .and_then(|mut backlog| backlog.pop())
        else {
            return Ok(false);
        };
        record.auto_resume = false;
        if let Ok(current) = self.world.remove_one::<ActivityRecord>(entity) {
            self.displace(entity, actor, current);
        }
        self.start_or_resume(entity, actor, record);
        Ok(true)
    }

    fn commit(&mut self, entity: Entity, actor: ActorId, mut record: ActivityRecord) {
        self.unbind_helper(entity, actor);

        let registry = Arc::clone(&self.registry);
        let resumed = self
            .world
            .get::<&mut Backlog>(entity)
            .ok()
            .and_then(|mut backlog| {
                let matches = backlog
                    .peek()
                    .is_some_and(|top| can_resume_with(top, &record, &registry));
                if matches {
                    backlog.pop()
                } else {
                    None
                }
            });
        let resuming = resumed.is_some();
        if let Some(stored) = resumed {
            record = stored;
            self.notify(entity, actor, RESUME_MESSAGE);
        }

        if let Ok(current) = self.world.remove_one::<ActivityRecord>(entity) {
            self.displace(entity, actor, current);
        }
        log::debug!(
            "{} {} {}",
            actor,
            if resuming { "resumes" } else { "starts" },
            record.id().map(|id| id.as_str()).unwrap_or("nothing")
        );
        self.start_or_resume(entity, actor, record);
    }

    /// Put `record` in the foreground: recruit helpers and compute every
    /// speed factor. Rooted types are announced on every start and resume.
    fn start_or_resume(&mut self, entity: Entity, actor: ActorId, mut record: ActivityRecord) {
        let registry = Arc::clone(&self.registry);
        let Some(ty) = record.id().and_then(|id| registry.lookup(id)) else {
            return;
        };

        recruit_assistants(
            &mut self.world,
            actor,
            &mut record,
            ty,
            &self.env,
            &self.config,
            self.turn,
        );
        record.invalidate_factors();
        if let Ok(character) = self.world.get::<&Character>(entity) {
            refresh_factors(&mut record, ty, &character, &self.env, &self.config.speed, true);
            record.factors_refreshed_at = Some(self.turn);
        }
        if ty.rooted {
            self.notify(entity, actor, ROOTED_MESSAGE);
        }
        let _ = self.world.insert_one(entity, record);
    }

    /// Take `record` out of the foreground without finishing it.
    fn displace(&mut self, entity: Entity, actor: ActorId, mut record: ActivityRecord) {
        let suspendable = record
            .id()
            .and_then(|id| self.registry.get(id))
            .is_some_and(|ty| ty.suspendable);
        if !suspendable {
            self.cancel_record(entity, actor, record);
            return;
        }
        release_assistants(&mut self.world, &self.actors, actor, &mut record);
        log::debug!(
            "{} suspends {}",
            actor,
            record.id().map(|id| id.as_str()).unwrap_or("nothing")
        );
        if let Ok(mut backlog) = self.world.get::<&mut Backlog>(entity) {
            backlog.push(record);
        }
    }

    fn cancel_record(&mut self, entity: Entity, actor: ActorId, mut record: ActivityRecord) {
        release_assistants(&mut self.world, &self.actors, actor, &mut record);
        let registry = Arc::clone(&self.registry);
        let Some(ty) = record.id().and_then(|id| registry.get(id)) else {
            return;
        };
        log::debug!("{} cancels {}", actor, ty.id);
        if let Some(on_cancel) = ty.on_cancel {
            // Replacement requests from a cancel handler are ignored
            if let Ok(mut character) = self.world.get::<&mut Character>(entity) {
                let mut turn = ActorTurn::new(
                    actor,
                    &mut character,
                    self.turn,
                    &self.config,
                    &mut self.env,
                    &mut self.messages,
                    &mut self.rng,
                );
                on_cancel(&mut record, &mut turn);
            }
        }
    }

    /// Drop the actor's own helper binding, if any, from both sides.
    fn unbind_helper(&mut self, entity: Entity, actor: ActorId) {
        let Ok(binding) = self.world.remove_one::<AssistBinding>(entity) else {
            return;
        };
        if let Some(&leader) = self.actors.get(&binding.leader) {
            if let Ok(mut record) = self.world.get::<&mut ActivityRecord>(leader) {
                record.assistants.retain(|helper| *helper != actor);
            }
        }
        log::debug!("{} stops assisting {}", actor, binding.leader);
    }

    /// Auto-resume the backlog top if it is waiting for that.
    fn resume_backlog(&mut self, entity: Entity, actor: ActorId) -> bool {
        let Some(mut record) = self
            .world
            .get::<&mut Backlog>(entity)
            .ok()
            .and_then(|mut backlog| {
                if backlog.peek().is_some_and(|top| top.auto_resume) {
                    backlog.pop()
                } else {
                    None
                }
            })
        else {
            return false;
        };
        record.auto_resume = false;
        log::debug!(
            "{} auto-resumes {}",
            actor,
            record.id().map(|id| id.as_str()).unwrap_or("nothing")
        );
        self.start_or_resume(entity, actor, record);
        true
    }

    fn notify(&mut self, entity: Entity, actor: ActorId, text: &str) {
        let is_player = self
            .world
            .get::<&Character>(entity)
            .map(|c| !c.is_npc)
            .unwrap_or(false);
        if is_player {
            self.messages.push(Message {
                actor,
                turn: self.turn,
                text: text.to_string(),
            });
        }
    }

    // ── Turn loop ───────────────────────────────────────────────────────

    /// Advance the world by one turn, stepping every actor once in actor
    /// id order.
    pub fn step_turn(&mut self) {
        self.turn += 1;
        for (_, character) in self.world.query_mut::<&mut Character>() {
            character.start_turn();
        }
        let actors: Vec<(ActorId, Entity)> =
            self.actors.iter().map(|(id, entity)| (*id, *entity)).collect();
        for (actor, entity) in actors {
            self.process_actor(actor, entity);
        }
    }

    /// Run `turns` turns
    pub fn run_turns(&mut self, turns: u32) {
        for _ in 0..turns {
            self.step_turn();
        }
    }

    fn process_actor(&mut self, actor: ActorId, entity: Entity) {
        let binding = self
            .world
            .get::<&AssistBinding>(entity)
            .ok()
            .map(|b| (*b).clone());
        if let Some(binding) = binding {
            if binding_is_live(&self.world, &self.actors, actor, &binding) {
                if let Ok(mut character) = self.world.get::<&mut Character>(entity) {
                    character.moves = 0;
                }
                return;
            }
            log::warn!(
                "{} held a stale binding to {} ({}), clearing",
                actor,
                binding.leader,
                binding.activity
            );
            let _ = self.world.remove_one::<AssistBinding>(entity);
        }

        if self.world.get::<&ActivityRecord>(entity).is_err() {
            self.resume_backlog(entity, actor);
        }
        let Ok(mut record) = self.world.remove_one::<ActivityRecord>(entity) else {
            return;
        };

        if !record.assistants.is_empty() {
            let leader_pos = self
                .world
                .get::<&Character>(entity)
                .map(|c| c.position)
                .unwrap_or_default();
            prune_assistants(
                &mut self.world,
                &self.actors,
                actor,
                leader_pos,
                &mut record,
                &self.env,
                &self.config,
            );
        }

        let registry = Arc::clone(&self.registry);
        let outcome = {
            let Ok(mut character) = self.world.get::<&mut Character>(entity) else {
                return;
            };
            let mut turn = ActorTurn::new(
                actor,
                &mut character,
                self.turn,
                &self.config,
                &mut self.env,
                &mut self.messages,
                &mut self.rng,
            );
            step_activity(&mut record, &registry, &mut turn)
        };

        match outcome {
            StepOutcome::Continue => {
                let _ = self.world.insert_one(entity, record);
            }
            StepOutcome::Finished { next } => {
                release_assistants(&mut self.world, &self.actors, actor, &mut record);
                log::debug!("{} finished its activity", actor);
                if let Some(next) = next {
                    self.commit(entity, actor, next);
                }
            }
            StepOutcome::Retired | StepOutcome::Aborted => {
                release_assistants(&mut self.world, &self.actors, actor, &mut record);
            }
            StepOutcome::Displaced(next) => {
                let _ = self.world.insert_one(entity, record);
                self.commit(entity, actor, next);
            }
        }

        if self.world.get::<&ActivityRecord>(entity).is_err() {
            self.resume_backlog(entity, actor);
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn has_activity(&self, actor: ActorId) -> bool {
        self.activity(actor).is_some()
    }

    /// The actor's foreground record
    pub fn activity(&self, actor: ActorId) -> Option<hecs::Ref<'_, ActivityRecord>> {
        let entity = self.entity(actor).ok()?;
        self.world.get::<&ActivityRecord>(entity).ok()
    }

    pub fn character(&self, actor: ActorId) -> Option<hecs::Ref<'_, Character>> {
        let entity = self.entity(actor).ok()?;
        self.world.get::<&Character>(entity).ok()
    }

    pub fn character_mut(&self, actor: ActorId) -> Option<hecs::RefMut<'_, Character>> {
        let entity = self.entity(actor).ok()?;
        self.world.get::<&mut Character>(entity).ok()
    }

    pub fn backlog(&self, actor: ActorId) -> Option<hecs::Ref<'_, Backlog>> {
        let entity = self.entity(actor).ok()?;
        self.world.get::<&Backlog>(entity).ok()
    }

    /// The binding the actor holds as somebody's helper
    pub fn assist_binding(&self, actor: ActorId) -> Option<AssistBinding> {
        let entity = self.entity(actor).ok()?;
        self.world
            .get::<&AssistBinding>(entity)
            .ok()
            .map(|b| (*b).clone())
    }

    /// Status line for the actor's foreground activity
    pub fn describe_activity(&self, actor: ActorId) -> Option<String> {
        let record = self.activity(actor)?;
        let character = self.character(actor)?;
        describe_activity(&record, &self.registry, &character, &self.config)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn drain_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Save scheduler state to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        crate::persistence::save_scheduler(writer, &self.world, self.turn, self.next_actor_id)
    }

    /// Load scheduler state from a reader. Registry, configuration and
    /// environment stay as they are.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = crate::persistence::load_scheduler(reader, &self.registry)?;
        self.world = loaded.world;
        self.actors = loaded.actors;
        self.turn = loaded.turn;
        self.next_actor_id = loaded.next_actor_id;
        self.messages.clear();
        self.rng = StdRng::seed_from_u64(self.config.seed ^ self.turn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Sandbox;
    use crate::registry::{ids, ActivityType};

    fn noop(_: &mut ActivityRecord, _: &mut ActorTurn<'_>) {}

    fn note_cancel(act: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
        turn.message(format!("canceled at {}", act.moves_left));
    }

    fn registry() -> ActivityRegistry {
        let mut reg = ActivityRegistry::with_builtins();
        reg.register(ActivityType::new("ACT_DIG").with_verb("digging").on_finish(noop).on_cancel(note_cancel))
            .unwrap();
        reg.register(ActivityType::new("ACT_AIM").with_verb("aiming").not_suspendable().on_finish(noop))
            .unwrap();
        reg.register(ActivityType::new("ACT_CARVE").with_verb("carving").morale_blocked().on_finish(noop))
            .unwrap();
        reg
    }

    #[test]
    fn test_engine_creation() {
        let engine = SchedulerEngine::new(ActivityRegistry::with_builtins(), SchedulerConfig::default());
        assert_eq!(engine.actor_count(), 0);
        assert_eq!(engine.turn(), 0);
    }

    #[test]
    fn test_unknown_actor_and_type() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let actor = engine.spawn_actor(Character::new("A"));
        assert_eq!(
            engine.start_activity(ActorId(99), "ACT_DIG", 100),
            Err(SchedulerError::UnknownActor(ActorId(99)))
        );
        assert_eq!(
            engine.start_activity(actor, "ACT_NOPE", 100),
            Err(SchedulerError::UnknownActivityType(ActivityId::from("ACT_NOPE")))
        );
        assert!(!engine.has_activity(actor));
    }

    #[test]
    fn test_wait_counts_down() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let actor = engine.spawn_actor(Character::new("A"));
        engine.start_activity(actor, ids::WAIT, 300).unwrap();
        engine.run_turns(2);
        assert_eq!(engine.activity(actor).map(|r| r.moves_left), Some(100));
        engine.step_turn();
        assert!(!engine.has_activity(actor));
        assert!(engine.messages().iter().any(|m| m.text == "You finish waiting."));
    }

    #[test]
    fn test_new_activity_displaces_current() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let actor = engine.spawn_actor(Character::new("A"));
        engine.start_activity(actor, "ACT_DIG", 1000).unwrap();
        engine.step_turn();
        engine.start_activity(actor, ids::WAIT, 100).unwrap();
        assert_eq!(engine.backlog(actor).map(|b| b.len()), Some(1));

        // Recommitting the same dig resumes the stored one
        engine.step_turn();
        engine.start_activity(actor, "ACT_DIG", 1000).unwrap();
        assert_eq!(engine.activity(actor).map(|r| r.moves_left), Some(900));
        assert_eq!(engine.backlog(actor).map(|b| b.len()), Some(0));
        assert!(engine.messages().iter().any(|m| m.text == RESUME_MESSAGE));
    }

    #[test]
    fn test_non_suspendable_is_canceled_on_displacement() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let actor = engine.spawn_actor(Character::new("A"));
        engine.start_activity(actor, "ACT_AIM", 1000).unwrap();
        engine.start_activity(actor, ids::WAIT, 100).unwrap();
        assert_eq!(engine.backlog(actor).map(|b| b.len()), Some(0));
    }

    #[test]
    fn test_cancel_runs_handler_and_keeps_backlog() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let actor = engine.spawn_actor(Character::new("A"));
        engine.start_activity(actor, ids::WAIT, 5000).unwrap();
        engine.start_activity(actor, "ACT_DIG", 500).unwrap();
        engine.step_turn();
        assert_eq!(engine.cancel_activity(actor), Ok(true));
        assert!(!engine.has_activity(actor));
        assert!(engine.messages().iter().any(|m| m.text == "canceled at 400"));
        assert_eq!(engine.backlog(actor).map(|b| b.len()), Some(1));
        assert_eq!(engine.cancel_activity(actor), Ok(false));
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let actor = engine.spawn_actor(Character::new("A"));
        engine.start_activity(actor, "ACT_DIG", 500).unwrap();
        engine.step_turn();
        assert_eq!(engine.suspend_activity(actor), Ok(true));
        assert!(!engine.has_activity(actor));

        // Plain suspension does not come back by itself
        engine.step_turn();
        assert!(!engine.has_activity(actor));

        assert_eq!(engine.resume_activity(actor), Ok(true));
        assert_eq!(engine.activity(actor).map(|r| r.moves_left), Some(400));
        assert_eq!(engine.backlog(actor).map(|b| b.len()), Some(0));
        assert_eq!(engine.resume_activity(actor), Ok(false));
        assert!(engine.has_activity(actor));
    }

    #[test]
    fn test_rooted_message_for_players_only() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let player = engine.spawn_actor(Character::new("A"));
        let npc = engine.spawn_actor(Character::npc("B"));
        engine.start_activity(player, ids::WAIT, 100).unwrap();
        engine.start_activity(npc, ids::WAIT, 100).unwrap();
        let rooted: Vec<_> = engine
            .messages()
            .iter()
            .filter(|m| m.text == ROOTED_MESSAGE)
            .map(|m| m.actor)
            .collect();
        assert_eq!(rooted, vec![player]);
    }

    #[test]
    fn test_rooted_message_repeats_on_resume() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let actor = engine.spawn_actor(Character::new("A"));
        engine.start_activity(actor, ids::WAIT, 500).unwrap();
        engine.suspend_activity(actor).unwrap();
        assert_eq!(engine.resume_activity(actor), Ok(true));
        let rooted = engine
            .messages()
            .iter()
            .filter(|m| m.text == ROOTED_MESSAGE)
            .count();
        assert_eq!(rooted, 2);
    }

    #[test]
    fn test_unhappy_actor_refuses_morale_blocked_work() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let mut gloomy = Character::new("A");
        gloomy.morale = -51;
        let gloomy = engine.spawn_actor(gloomy);
        let mut glum = Character::new("B");
        glum.morale = -50;
        let glum = engine.spawn_actor(glum);

        assert_eq!(
            engine.start_activity(gloomy, "ACT_CARVE", 300),
            Err(SchedulerError::TooUnhappy {
                actor: gloomy,
                id: ActivityId::from("ACT_CARVE"),
            })
        );
        assert!(!engine.has_activity(gloomy));
        // Other work is still fine
        engine.start_activity(gloomy, "ACT_DIG", 300).unwrap();
        engine.start_activity(glum, "ACT_CARVE", 300).unwrap();
        assert!(engine.activity(glum).is_some_and(|r| r.is("ACT_CARVE")));
    }

    #[test]
    fn test_npc_out_of_bounds_is_dropped() {
        let env = Sandbox::new().with_bounds(TriPoint::new(0, 0, 0), TriPoint::new(3, 3, 0));
        let mut engine = SchedulerEngine::with_environment(registry(), SchedulerConfig::default(), env);
        let npc = engine.spawn_actor(Character::npc("B").at(TriPoint::new(8, 8, 0)));
        engine.start_activity(npc, "ACT_DIG", 1000).unwrap();
        engine.step_turn();
        assert!(!engine.has_activity(npc));
    }

    #[test]
    fn test_despawn() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let actor = engine.spawn_actor(Character::new("A"));
        engine.start_activity(actor, "ACT_DIG", 500).unwrap();
        engine.despawn_actor(actor).unwrap();
        assert_eq!(engine.actor_count(), 0);
        assert_eq!(engine.despawn_actor(actor), Err(SchedulerError::UnknownActor(actor)));
    }

    #[test]
    fn test_describe_through_engine() {
        let mut engine = SchedulerEngine::new(registry(), SchedulerConfig::default());
        let actor = engine.spawn_actor(Character::new("A"));
        engine.start_activity(actor, "ACT_DIG", 500).unwrap();
        assert_eq!(engine.describe_activity(actor).as_deref(), Some("Digging…"));
    }
}
