//! Bridge from actor state to the pure speed model.
//!
//! Cheap factors (light, player speed, morale, assistants) are refreshed on
//! every step. Expensive factors (skills, tools, stats, workbench) need
//! skill and inventory lookups and are refreshed on the slow cadence. A
//! record's own requirements replace the type's skills and qualities.

use turnwork_logic::speed::{
    assistants_factor, light_factor, morale_factor, player_speed_factor, skill_factor,
    stat_factor, tools_factor, SpeedConfig,
};

use crate::components::{ActivityRecord, Character, Workbench, SOCIAL_SKILL};
use crate::environment::Environment;
use crate::registry::ActivityType;

/// Recompute the cached sub-factors of `record`. With `full` set the
/// expensive ones are recomputed too.
pub fn refresh_factors(
    record: &mut ActivityRecord,
    ty: &ActivityType,
    character: &Character,
    env: &dyn Environment,
    cfg: &SpeedConfig,
    full: bool,
) {
    if !ty.complex_moves {
        return;
    }

    let speed = &mut record.speed;
    speed.light = ty
        .light_affected
        .then(|| light_factor(character.vision.sees_fine_detail, character.vision.fine_detail_mod, cfg));
    speed.player_speed = ty
        .speed_affected
        .then(|| player_speed_factor(character.speed, cfg));
    speed.morale = ty
        .morale_affected
        .then(|| morale_factor(character.morale, cfg));
    speed.assist = ty.assistable().then(|| {
        assistants_factor(
            record.assistants.len() as u32,
            character.skill_level(SOCIAL_SKILL),
        )
    });

    if !full {
        return;
    }

    let (skills, qualities) = match &record.requirements {
        Some(reqs) => (&reqs.skills, &reqs.qualities),
        None => (&ty.skills, &ty.qualities),
    };
    speed.skills = (!skills.is_empty())
        .then(|| skill_factor(skills, |s| character.skill_level(s), cfg));
    speed.tools = (!qualities.is_empty())
        .then(|| tools_factor(qualities, |q| character.best_quality(q), cfg));
    speed.stats = ty
        .stats
        .iter()
        .map(|req| (req.req, stat_factor(character.stat(req.req), req, cfg)))
        .collect();

    if ty.bench_affected {
        let bench = env
            .best_bench(character.position)
            .unwrap_or_else(|| Workbench::ground(character.position));
        speed.bench = Some(bench.multiplier.clamp(cfg.factor_min, cfg.factor_max));
        record.bench = Some(bench);
    } else {
        speed.bench = None;
        record.bench = None;
    }
}
