//! Assistant coordination - recruiting helpers onto a leader's task and
//! tearing their bindings down again.
//!
//! Helpers carry an [`AssistBinding`] and no foreground record. The leader's
//! record lists them in `assistants`. Both sides are always updated together.

use hecs::{Entity, World};
use std::collections::BTreeMap;

use crate::components::{ActivityRecord, ActorId, AssistBinding, Character, TriPoint};
use crate::config::SchedulerConfig;
use crate::environment::Environment;
use crate::registry::ActivityType;

/// Stable actor ids to live entities.
pub type ActorIndex = BTreeMap<ActorId, Entity>;

fn in_reach(
    leader: ActorId,
    leader_pos: TriPoint,
    helper: &Character,
    env: &dyn Environment,
    cfg: &SchedulerConfig,
) -> Option<i32> {
    if helper.leader != Some(leader) {
        return None;
    }
    let distance = leader_pos.square_distance(&helper.position)?;
    if distance > cfg.assistant_range || !env.has_clear_path(helper.position, leader_pos) {
        return None;
    }
    Some(distance)
}

/// Bind up to the type's limit of eligible helpers to `record`.
///
/// Eligible helpers follow the leader, are idle (no foreground record, no
/// binding), stand within range and have a clear path to the leader.
/// Closest first, ties by actor id. Returns the number recruited.
pub fn recruit_assistants(
    world: &mut World,
    leader: ActorId,
    record: &mut ActivityRecord,
    ty: &ActivityType,
    env: &dyn Environment,
    cfg: &SchedulerConfig,
    turn: u64,
) -> usize {
    if !ty.assistable() {
        return 0;
    }
    let slots = (ty.max_assistants as usize).saturating_sub(record.assistants.len());
    if slots == 0 {
        return 0;
    }
    let Some(leader_pos) = world
        .query::<(&ActorId, &Character)>()
        .iter()
        .find(|(_, (id, _))| **id == leader)
        .map(|(_, (_, c))| c.position)
    else {
        return 0;
    };

    let mut candidates: Vec<(i32, ActorId, Entity)> = world
        .query::<(
            &ActorId,
            &Character,
            Option<&ActivityRecord>,
            Option<&AssistBinding>,
        )>()
        .iter()
        .filter(|(_, (id, _, fg, binding))| {
            **id != leader
                && fg.map_or(true, |r| r.is_null())
                && binding.is_none()
                && !record.assistants.contains(id)
        })
        .filter_map(|(entity, (id, character, _, _))| {
            in_reach(leader, leader_pos, character, env, cfg).map(|d| (d, *id, entity))
        })
        .collect();
    candidates.sort_by_key(|(distance, id, _)| (*distance, *id));
    candidates.truncate(slots);

    let Some(activity) = record.id().cloned() else {
        return 0;
    };
    for (_, helper, entity) in &candidates {
        let binding = AssistBinding {
            leader,
            activity: activity.clone(),
            since: turn,
        };
        let _ = world.insert_one(*entity, binding);
        record.assistants.push(*helper);
        log::debug!("{} recruited {} for {}", leader, helper, activity);
    }
    candidates.len()
}

/// Unbind every helper of `record`.
pub fn release_assistants(
    world: &mut World,
    index: &ActorIndex,
    leader: ActorId,
    record: &mut ActivityRecord,
) {
    for helper in record.assistants.drain(..) {
        let Some(&entity) = index.get(&helper) else {
            continue;
        };
        let bound_here = world
            .get::<&AssistBinding>(entity)
            .map(|b| b.leader == leader)
            .unwrap_or(false);
        if bound_here {
            let _ = world.remove_one::<AssistBinding>(entity);
            log::debug!("{} released {}", leader, helper);
        }
    }
}

/// Release helpers that no longer qualify (moved away, path blocked,
/// stopped following, or bound elsewhere). Returns how many were dropped.
pub fn prune_assistants(
    world: &mut World,
    index: &ActorIndex,
    leader: ActorId,
    leader_pos: TriPoint,
    record: &mut ActivityRecord,
    env: &dyn Environment,
    cfg: &SchedulerConfig,
) -> usize {
    let mut dropped = Vec::new();
    record.assistants.retain(|helper| {
        let keep = index.get(helper).is_some_and(|&entity| {
            let bound_here = world
                .get::<&AssistBinding>(entity)
                .map(|b| b.leader == leader)
                .unwrap_or(false);
            let reachable = world
                .get::<&Character>(entity)
                .map(|c| in_reach(leader, leader_pos, &c, env, cfg).is_some())
                .unwrap_or(false);
            bound_here && reachable
        });
        if !keep {
            dropped.push(*helper);
        }
        keep
    });

    for helper in &dropped {
        if let Some(&entity) = index.get(helper) {
            let bound_here = world
                .get::<&AssistBinding>(entity)
                .map(|b| b.leader == leader)
                .unwrap_or(false);
            if bound_here {
                let _ = world.remove_one::<AssistBinding>(entity);
            }
        }
        log::debug!("{} no longer assists {}", helper, leader);
    }
    dropped.len()
}

/// Whether a helper's binding still points at a live record that lists it.
pub fn binding_is_live(world: &World, index: &ActorIndex, helper: ActorId, binding: &AssistBinding) -> bool {
    let Some(&leader_entity) = index.get(&binding.leader) else {
        return false;
    };
    world
        .get::<&ActivityRecord>(leader_entity)
        .map(|r| r.id() == Some(&binding.activity) && r.assistants.contains(&helper))
        .unwrap_or(false)
}
