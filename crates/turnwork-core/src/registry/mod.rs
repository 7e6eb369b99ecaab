//! Activity type registry.
//!
//! Maps a type identifier to its capability flags, its speed requirements
//! and its plain-function handlers. Built once at load time and shared
//! read-only with the engine afterwards.

pub mod builtin;
pub mod loader;

pub use builtin::ids;
pub use loader::HandlerSet;

use std::collections::BTreeMap;
use std::fmt;
use turnwork_logic::requirements::{QualityReq, SkillReq, StatReq};

use crate::components::{ActivityId, ActivityRecord};
use crate::error::RegistryError;
use crate::systems::ActorTurn;

/// Hard limit on recruited helpers per activity.
pub const MAX_ASSISTANTS_LIMIT: u32 = 32;

/// Per-turn, finish or cancel callback for an activity type.
pub type ActivityHandler = fn(&mut ActivityRecord, &mut ActorTurn<'_>);

/// How two records of one type decide they are the same logical task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResumeRule {
    /// index, position, name, targets and string payload.
    #[default]
    Generic,
    /// Generic plus the first bound coordinate.
    Coordinates,
    /// Generic plus integer payload compared as an unordered set, and a
    /// first target that both records have.
    Participants,
    /// Generic plus exact integer and string payload.
    VehicleValues,
}

/// Immutable description of a kind of task.
#[derive(Clone)]
pub struct ActivityType {
    pub id: ActivityId,
    /// Shown in progress descriptions, e.g. "digging".
    pub verb: String,
    /// The actor must not move while this is foreground.
    pub rooted: bool,
    /// Skips generic move accounting; the turn handler manages timing.
    pub special: bool,
    /// Displacement pushes to the backlog instead of canceling.
    pub suspendable: bool,
    pub resumable: bool,
    /// Cost varies with the composite speed factor instead of a flat
    /// cost per turn.
    pub complex_moves: bool,
    pub refuel_fires: bool,
    /// Opportunistic eating and drinking is allowed.
    pub auto_needs: bool,
    pub verbose_tooltip: bool,
    pub percent_progress: bool,
    pub bench_affected: bool,
    pub light_affected: bool,
    pub speed_affected: bool,
    pub morale_affected: bool,
    /// Refused to actors too unhappy for careful work.
    pub morale_blocked: bool,
    pub skills: Vec<SkillReq>,
    pub qualities: Vec<QualityReq>,
    pub stats: Vec<StatReq>,
    pub max_assistants: u32,
    pub resume_rule: ResumeRule,
    pub on_turn: Option<ActivityHandler>,
    pub on_finish: Option<ActivityHandler>,
    pub on_cancel: Option<ActivityHandler>,
}

impl fmt::Debug for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityType")
            .field("id", &self.id)
            .field("verb", &self.verb)
            .field("rooted", &self.rooted)
            .field("special", &self.special)
            .field("complex_moves", &self.complex_moves)
            .field("morale_blocked", &self.morale_blocked)
            .field("max_assistants", &self.max_assistants)
            .field("resume_rule", &self.resume_rule)
            .field("on_turn", &self.on_turn.is_some())
            .field("on_finish", &self.on_finish.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish_non_exhaustive()
    }
}

impl ActivityType {
    pub fn new(id: impl Into<ActivityId>) -> Self {
        Self {
            id: id.into(),
            verb: String::new(),
            rooted: false,
            special: false,
            suspendable: true,
            resumable: true,
            complex_moves: false,
            refuel_fires: false,
            auto_needs: false,
            verbose_tooltip: false,
            percent_progress: false,
            bench_affected: false,
            light_affected: false,
            speed_affected: false,
            morale_affected: false,
            morale_blocked: false,
            skills: Vec::new(),
            qualities: Vec::new(),
            stats: Vec::new(),
            max_assistants: 0,
            resume_rule: ResumeRule::Generic,
            on_turn: None,
            on_finish: None,
            on_cancel: None,
        }
    }

    pub fn with_verb(mut self, verb: impl Into<String>) -> Self {
        self.verb = verb.into();
        self
    }

    pub fn rooted(mut self) -> Self {
        self.rooted = true;
        self
    }

    pub fn special(mut self) -> Self {
        self.special = true;
        self
    }

    pub fn not_suspendable(mut self) -> Self {
        self.suspendable = false;
        self
    }

    pub fn no_resume(mut self) -> Self {
        self.resumable = false;
        self
    }

    pub fn complex_moves(mut self) -> Self {
        self.complex_moves = true;
        self
    }

    pub fn refuel_fires(mut self) -> Self {
        self.refuel_fires = true;
        self
    }

    pub fn auto_needs(mut self) -> Self {
        self.auto_needs = true;
        self
    }

    pub fn verbose_tooltip(mut self) -> Self {
        self.verbose_tooltip = true;
        self
    }

    pub fn percent_progress(mut self) -> Self {
        self.percent_progress = true;
        self
    }

    pub fn bench_affected(mut self) -> Self {
        self.bench_affected = true;
        self
    }

    pub fn light_affected(mut self) -> Self {
        self.light_affected = true;
        self
    }

    pub fn speed_affected(mut self) -> Self {
        self.speed_affected = true;
        self
    }

    pub fn morale_affected(mut self) -> Self {
        self.morale_affected = true;
        self
    }

    pub fn morale_blocked(mut self) -> Self {
        self.morale_blocked = true;
        self
    }

    pub fn with_skill(mut self, req: SkillReq) -> Self {
        self.skills.push(req);
        self
    }

    pub fn with_quality(mut self, req: QualityReq) -> Self {
        self.qualities.push(req);
        self
    }

    pub fn with_stat(mut self, req: StatReq) -> Self {
        self.stats.push(req);
        self
    }

    pub fn with_max_assistants(mut self, max: u32) -> Self {
        self.max_assistants = max;
        self
    }

    pub fn with_resume_rule(mut self, rule: ResumeRule) -> Self {
        self.resume_rule = rule;
        self
    }

    pub fn on_turn(mut self, handler: ActivityHandler) -> Self {
        self.on_turn = Some(handler);
        self
    }

    pub fn on_finish(mut self, handler: ActivityHandler) -> Self {
        self.on_finish = Some(handler);
        self
    }

    pub fn on_cancel(mut self, handler: ActivityHandler) -> Self {
        self.on_cancel = Some(handler);
        self
    }

    pub fn assistable(&self) -> bool {
        self.max_assistants > 0
    }

    /// Whether skill, tool, stat or bench lookups are involved. These are
    /// only refreshed on the slow cadence.
    pub fn has_expensive_factors(&self) -> bool {
        !self.skills.is_empty()
            || !self.qualities.is_empty()
            || !self.stats.is_empty()
            || self.bench_affected
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.on_turn.is_none() && self.on_finish.is_none() && !self.special {
            return Err(RegistryError::NoBehavior {
                id: self.id.clone(),
            });
        }
        if self.max_assistants > MAX_ASSISTANTS_LIMIT {
            return Err(RegistryError::InvalidMaxAssistants {
                id: self.id.clone(),
                max: self.max_assistants,
                limit: MAX_ASSISTANTS_LIMIT,
            });
        }
        if self.special && self.complex_moves {
            return Err(RegistryError::InconsistentFlags {
                id: self.id.clone(),
            });
        }
        // Special types skip move accounting, only their turn handler
        // can bring them to an end
        if self.special && self.on_turn.is_none() {
            return Err(RegistryError::SpecialWithoutTurnHandler {
                id: self.id.clone(),
            });
        }
        if self.verb.is_empty() {
            log::warn!("activity type {} has no verb", self.id);
        }
        Ok(())
    }
}

/// Read-only table of every known activity type.
#[derive(Debug, Clone, Default)]
pub struct ActivityRegistry {
    types: BTreeMap<ActivityId, ActivityType>,
}

impl ActivityRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the scheduler's own wait types.
    pub fn with_builtins() -> Self {
        let mut types = BTreeMap::new();
        for ty in builtin::types() {
            types.insert(ty.id.clone(), ty);
        }
        Self { types }
    }

    /// Add a type. Duplicates and malformed types are load-time errors.
    pub fn register(&mut self, ty: ActivityType) -> Result<(), RegistryError> {
        if self.types.contains_key(&ty.id) {
            return Err(RegistryError::DuplicateType { id: ty.id });
        }
        ty.validate()?;
        log::debug!("registered activity type {}", ty.id);
        self.types.insert(ty.id.clone(), ty);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(&ActivityId::from(id))
    }

    /// Non-asserting lookup for callers that can handle absence.
    pub fn get(&self, id: &ActivityId) -> Option<&ActivityType> {
        self.types.get(id)
    }

    /// Lookup of a type the caller expects to exist.
    ///
    /// An unknown identifier is a programming error: debug builds panic,
    /// release builds log and return `None` so the record is retired.
    pub fn lookup(&self, id: &ActivityId) -> Option<&ActivityType> {
        let ty = self.types.get(id);
        if ty.is_none() {
            log::error!("lookup of unregistered activity type {}", id);
            debug_assert!(false, "lookup of unregistered activity type {}", id);
        }
        ty
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityType> {
        self.types.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut ActivityRecord, _: &mut ActorTurn<'_>) {}

    #[test]
    fn test_register_and_get() {
        let mut reg = ActivityRegistry::new();
        reg.register(ActivityType::new("ACT_DIG").with_verb("digging").on_finish(noop))
            .unwrap();
        assert!(reg.contains("ACT_DIG"));
        assert_eq!(reg.len(), 1);
        let ty = reg.get(&ActivityId::from("ACT_DIG")).unwrap();
        assert_eq!(ty.verb, "digging");
        assert!(ty.suspendable);
        assert!(ty.resumable);
    }

    #[test]
    fn test_duplicate_registration_is_error() {
        let mut reg = ActivityRegistry::new();
        reg.register(ActivityType::new("ACT_DIG").on_finish(noop)).unwrap();
        let err = reg.register(ActivityType::new("ACT_DIG").on_turn(noop));
        assert!(matches!(err, Err(RegistryError::DuplicateType { .. })));
        // First registration kept
        let ty = reg.get(&ActivityId::from("ACT_DIG")).unwrap();
        assert!(ty.on_turn.is_none());
    }

    #[test]
    fn test_noop_type_rejected() {
        let mut reg = ActivityRegistry::new();
        let err = reg.register(ActivityType::new("ACT_NOTHING"));
        assert!(matches!(err, Err(RegistryError::NoBehavior { .. })));
    }

    #[test]
    fn test_special_needs_turn_handler() {
        let mut reg = ActivityRegistry::new();
        let err = reg.register(ActivityType::new("ACT_AIM").special());
        assert!(matches!(
            err,
            Err(RegistryError::SpecialWithoutTurnHandler { .. })
        ));
        let err = reg.register(ActivityType::new("ACT_AIM").special().on_finish(noop));
        assert!(matches!(
            err,
            Err(RegistryError::SpecialWithoutTurnHandler { .. })
        ));
        assert!(!reg.contains("ACT_AIM"));
        reg.register(ActivityType::new("ACT_AIM").special().on_turn(noop))
            .unwrap();
    }

    #[test]
    fn test_max_assistants_limit() {
        let mut reg = ActivityRegistry::new();
        let err = reg.register(ActivityType::new("ACT_BUILD").on_finish(noop).with_max_assistants(33));
        assert!(matches!(
            err,
            Err(RegistryError::InvalidMaxAssistants { max: 33, .. })
        ));
        reg.register(ActivityType::new("ACT_BUILD").on_finish(noop).with_max_assistants(32))
            .unwrap();
    }

    #[test]
    fn test_special_complex_rejected() {
        let mut reg = ActivityRegistry::new();
        let err = reg.register(ActivityType::new("ACT_ODD").special().complex_moves());
        assert!(matches!(err, Err(RegistryError::InconsistentFlags { .. })));
    }

    #[test]
    fn test_builtins_present() {
        let reg = ActivityRegistry::with_builtins();
        assert!(reg.contains(ids::WAIT));
        assert!(reg.contains(ids::WAIT_STAMINA));
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic)]
    fn test_lookup_unknown_type() {
        let reg = ActivityRegistry::new();
        assert!(reg.lookup(&ActivityId::from("ACT_MISSING")).is_none());
    }
}
