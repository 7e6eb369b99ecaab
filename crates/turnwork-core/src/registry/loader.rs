//! Activity types declared as JSON data and bound to handlers by name.
//!
//! ```json
//! [
//!   {
//!     "id": "ACT_DIG",
//!     "verb": "digging",
//!     "rooted": true,
//!     "resume_rule": "coordinates",
//!     "complex_moves": {
//!       "light": true,
//!       "speed": true,
//!       "qualities": [{ "id": "DIG", "threshold": 1 }],
//!       "stats": [{ "id": "STRENGTH" }]
//!     },
//!     "on_finish": "dig_finish"
//!   }
//! ]
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use turnwork_logic::requirements::{
    ActivityReq, Stat, DEFAULT_QUALITY_MODIFIER, DEFAULT_QUALITY_THRESHOLD,
    DEFAULT_SKILL_MODIFIER, DEFAULT_SKILL_THRESHOLD, DEFAULT_STAT_MODIFIER,
    DEFAULT_STAT_THRESHOLD,
};

use super::{ActivityHandler, ActivityRegistry, ActivityType, ResumeRule};
use crate::components::ActivityId;
use crate::error::RegistryError;

/// Handlers available to JSON definitions.
///
/// A definition can name a handler (`"on_turn": "dig_turn"`), or code can
/// bind a handler straight to a type identifier. Identifier bindings win
/// over names.
#[derive(Default, Clone)]
pub struct HandlerSet {
    named: BTreeMap<String, ActivityHandler>,
    turn: BTreeMap<ActivityId, ActivityHandler>,
    finish: BTreeMap<ActivityId, ActivityHandler>,
    cancel: BTreeMap<ActivityId, ActivityHandler>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_named(mut self, name: impl Into<String>, handler: ActivityHandler) -> Self {
        self.named.insert(name.into(), handler);
        self
    }

    pub fn bind_turn(mut self, id: impl Into<ActivityId>, handler: ActivityHandler) -> Self {
        self.turn.insert(id.into(), handler);
        self
    }

    pub fn bind_finish(mut self, id: impl Into<ActivityId>, handler: ActivityHandler) -> Self {
        self.finish.insert(id.into(), handler);
        self
    }

    pub fn bind_cancel(mut self, id: impl Into<ActivityId>, handler: ActivityHandler) -> Self {
        self.cancel.insert(id.into(), handler);
        self
    }

    fn bound_ids(&self) -> impl Iterator<Item = &ActivityId> {
        self.turn
            .keys()
            .chain(self.finish.keys())
            .chain(self.cancel.keys())
    }

    fn resolve(
        &self,
        id: &ActivityId,
        name: Option<&str>,
        bound: &BTreeMap<ActivityId, ActivityHandler>,
    ) -> Result<Option<ActivityHandler>, RegistryError> {
        if let Some(handler) = bound.get(id) {
            return Ok(Some(*handler));
        }
        match name {
            None => Ok(None),
            Some(name) => self.named.get(name).copied().map(Some).ok_or_else(|| {
                RegistryError::UnknownHandler {
                    id: id.clone(),
                    handler: name.to_string(),
                }
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ResumeRuleDef {
    Generic,
    Coordinates,
    Participants,
    VehicleValues,
}

impl From<ResumeRuleDef> for ResumeRule {
    fn from(def: ResumeRuleDef) -> Self {
        match def {
            ResumeRuleDef::Generic => ResumeRule::Generic,
            ResumeRuleDef::Coordinates => ResumeRule::Coordinates,
            ResumeRuleDef::Participants => ResumeRule::Participants,
            ResumeRuleDef::VehicleValues => ResumeRule::VehicleValues,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReqDef {
    id: String,
    modifier: Option<f32>,
    threshold: Option<i32>,
}

impl ReqDef {
    fn into_req<K>(self, req: K, modifier: f32, threshold: i32) -> ActivityReq<K> {
        ActivityReq::new(
            req,
            self.modifier.unwrap_or(modifier),
            self.threshold.unwrap_or(threshold),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComplexMovesDef {
    bench: bool,
    light: bool,
    speed: bool,
    morale: bool,
    max_assistants: u32,
    skills: Vec<ReqDef>,
    qualities: Vec<ReqDef>,
    stats: Vec<ReqDef>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ActivityTypeDef {
    id: String,
    #[serde(default)]
    verb: String,
    #[serde(default)]
    rooted: bool,
    #[serde(default)]
    special: bool,
    #[serde(default = "default_true")]
    suspendable: bool,
    #[serde(default)]
    no_resume: bool,
    #[serde(default)]
    refuel_fires: bool,
    #[serde(default)]
    auto_needs: bool,
    #[serde(default)]
    verbose_tooltip: bool,
    #[serde(default)]
    percent_progress: bool,
    #[serde(default)]
    morale_blocked: bool,
    resume_rule: Option<ResumeRuleDef>,
    complex_moves: Option<ComplexMovesDef>,
    on_turn: Option<String>,
    on_finish: Option<String>,
    on_cancel: Option<String>,
}

impl ActivityTypeDef {
    fn build(self, handlers: &HandlerSet) -> Result<ActivityType, RegistryError> {
        let id = ActivityId::from(self.id);
        let mut ty = ActivityType::new(id.clone()).with_verb(self.verb);
        ty.rooted = self.rooted;
        ty.special = self.special;
        ty.suspendable = self.suspendable;
        ty.resumable = !self.no_resume;
        ty.refuel_fires = self.refuel_fires;
        ty.auto_needs = self.auto_needs;
        ty.verbose_tooltip = self.verbose_tooltip;
        ty.percent_progress = self.percent_progress;
        ty.morale_blocked = self.morale_blocked;
        ty.resume_rule = self.resume_rule.map(ResumeRule::from).unwrap_or_default();

        if let Some(cm) = self.complex_moves {
            ty.complex_moves = true;
            ty.bench_affected = cm.bench;
            ty.light_affected = cm.light;
            ty.speed_affected = cm.speed;
            ty.morale_affected = cm.morale;
            ty.max_assistants = cm.max_assistants;
            ty.skills = cm
                .skills
                .into_iter()
                .map(|r| {
                    let name = r.id.clone();
                    r.into_req(name, DEFAULT_SKILL_MODIFIER, DEFAULT_SKILL_THRESHOLD)
                })
                .collect();
            ty.qualities = cm
                .qualities
                .into_iter()
                .map(|r| {
                    let name = r.id.clone();
                    r.into_req(name, DEFAULT_QUALITY_MODIFIER, DEFAULT_QUALITY_THRESHOLD)
                })
                .collect();
            for r in cm.stats {
                let stat = Stat::from_name(&r.id).ok_or_else(|| RegistryError::UnknownStat {
                    id: id.clone(),
                    stat: r.id.clone(),
                })?;
                ty.stats
                    .push(r.into_req(stat, DEFAULT_STAT_MODIFIER, DEFAULT_STAT_THRESHOLD));
            }
        }

        ty.on_turn = handlers.resolve(&id, self.on_turn.as_deref(), &handlers.turn)?;
        ty.on_finish = handlers.resolve(&id, self.on_finish.as_deref(), &handlers.finish)?;
        ty.on_cancel = handlers.resolve(&id, self.on_cancel.as_deref(), &handlers.cancel)?;
        Ok(ty)
    }
}

/// Parse definitions and register them. Nothing is registered unless every
/// definition loads. Returns the number of types added.
pub fn load_json(
    registry: &mut ActivityRegistry,
    json: &str,
    handlers: &HandlerSet,
) -> Result<usize, RegistryError> {
    let defs: Vec<ActivityTypeDef> = serde_json::from_str(json)?;

    let defined: BTreeSet<ActivityId> = defs.iter().map(|d| ActivityId::from(d.id.as_str())).collect();
    if let Some(id) = handlers.bound_ids().find(|id| !defined.contains(*id)) {
        return Err(RegistryError::HandlerForUndefinedType { id: id.clone() });
    }

    let mut staged = registry.clone();
    let count = defs.len();
    for def in defs {
        staged.register(def.build(handlers)?)?;
    }
    *registry = staged;
    log::debug!("loaded {} activity types from JSON", count);
    Ok(count)
}

impl ActivityRegistry {
    /// Built-in types plus every definition in `json`.
    pub fn from_json(json: &str, handlers: &HandlerSet) -> Result<Self, RegistryError> {
        let mut registry = Self::with_builtins();
        load_json(&mut registry, json, handlers)?;
        Ok(registry)
    }
}
