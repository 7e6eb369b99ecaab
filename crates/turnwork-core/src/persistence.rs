//! Save/Load functionality for persisting scheduler state
//!
//! Uses bincode for binary serialization. Each actor's components are
//! serialized individually then reconstructed on load. Assistant references
//! are stored by actor id, never by entity.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::components::*;
use crate::error::SaveError;
use crate::registry::ActivityRegistry;
use crate::systems::{binding_is_live, ActorIndex};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 2;

/// Serializable snapshot of the scheduler
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Turns elapsed
    pub turn: u64,
    /// Next actor id to hand out
    pub next_actor_id: u32,
    /// Every actor with its components
    pub actors: Vec<SavedActor>,
}

/// One actor and its scheduler components
#[derive(Serialize, Deserialize)]
pub struct SavedActor {
    pub id: ActorId,
    pub character: Character,
    pub activity: Option<ActivityRecord>,
    pub backlog: Backlog,
    pub assist: Option<AssistBinding>,
}

fn serialize_actors(world: &World) -> Vec<SavedActor> {
    let mut actors: Vec<SavedActor> = world
        .query::<(
            &ActorId,
            &Character,
            Option<&ActivityRecord>,
            Option<&Backlog>,
            Option<&AssistBinding>,
        )>()
        .iter()
        .map(|(_, (id, character, activity, backlog, assist))| SavedActor {
            id: *id,
            character: character.clone(),
            activity: activity.cloned(),
            backlog: backlog.cloned().unwrap_or_default(),
            assist: assist.cloned(),
        })
        .collect();
    actors.sort_by_key(|a| a.id);
    actors
}

/// Drop records whose type is no longer registered.
fn retire_unknown(actor: &mut SavedActor, registry: &ActivityRegistry) {
    let known = |r: &ActivityRecord| r.id().is_some_and(|id| registry.get(id).is_some());

    if let Some(record) = &actor.activity {
        if !known(record) {
            log::warn!(
                "{}: retiring foreground record of unknown type {}",
                actor.id,
                record.id().map(|id| id.as_str()).unwrap_or("null")
            );
            actor.activity = None;
        }
    }
    let dropped = actor.backlog.retain(|r| known(r));
    if dropped > 0 {
        log::warn!(
            "{}: retired {} backlog record(s) of unknown type",
            actor.id,
            dropped
        );
    }
}

/// Save the scheduler's world to a writer
pub fn save_scheduler<W: Write>(
    writer: W,
    world: &World,
    turn: u64,
    next_actor_id: u32,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        turn,
        next_actor_id,
        actors: serialize_actors(world),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a scheduler world from a reader, checking records against
/// `registry`
pub fn load_scheduler<R: Read>(
    reader: R,
    registry: &ActivityRegistry,
) -> Result<LoadedScheduler, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    let mut actors = ActorIndex::new();
    let mut bindings = Vec::new();
    for mut saved in save_data.actors {
        retire_unknown(&mut saved, registry);
        let entity = world.spawn((saved.id, saved.character, saved.backlog));
        if let Some(record) = saved.activity.filter(|r| !r.is_null()) {
            let _ = world.insert_one(entity, record);
        }
        if let Some(binding) = saved.assist {
            bindings.push((saved.id, entity, binding));
        }
        actors.insert(saved.id, entity);
    }

    // Bindings are restored only where the leader's record still lists
    // the helper
    for (helper, entity, binding) in bindings {
        if binding_is_live(&world, &actors, helper, &binding) {
            let _ = world.insert_one(entity, binding);
        } else {
            log::warn!("{}: dropping stale binding to {}", helper, binding.leader);
        }
    }

    Ok(LoadedScheduler {
        world,
        actors,
        turn: save_data.turn,
        next_actor_id: save_data.next_actor_id,
    })
}

/// Result of loading a scheduler
pub struct LoadedScheduler {
    pub world: World,
    pub actors: ActorIndex,
    pub turn: u64,
    pub next_actor_id: u32,
}
