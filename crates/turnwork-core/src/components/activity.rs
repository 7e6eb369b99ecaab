//! The activity record: one actor's in-progress long-running task.
//!
//! The core fields are fixed and small. Everything handler-specific lives in
//! the payload bag (`values`, `str_values`, `targets`, `coords`,
//! `creatures`); each handler agrees privately on its own slot layout and
//! the scheduler only compares payloads for resumption.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use turnwork_logic::requirements::{QualityReq, SkillReq};
use turnwork_logic::speed::SpeedFactors;

use super::{ActivityId, ActorId, ObjectRef, TaskQueue, TriPoint};
use crate::environment::Environment;

/// Interruption categories a record can opt out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DistractionKind {
    Noise,
    Pain,
    Attacked,
    HostileNear,
    HostileFar,
    TalkedTo,
    MotionAlarm,
    WeatherChange,
    DangerousField,
    Hunger,
    Thirst,
    Temperature,
}

/// Bench, furniture or vehicle part the actor is working at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbench {
    pub name: String,
    pub multiplier: f32,
    pub position: TriPoint,
}

impl Workbench {
    pub fn new(name: impl Into<String>, multiplier: f32, position: TriPoint) -> Self {
        Self {
            name: name.into(),
            multiplier,
            position,
        }
    }

    /// Working on the ground with no bench at all.
    pub fn ground(position: TriPoint) -> Self {
        Self::new("ground", 1.0, position)
    }
}

/// Skill and tool requirements one record carries in place of its type's,
/// such as those of the recipe being crafted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    pub skills: Vec<SkillReq>,
    pub qualities: Vec<QualityReq>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skill(mut self, req: SkillReq) -> Self {
        self.skills.push(req);
        self
    }

    pub fn with_quality(mut self, req: QualityReq) -> Self {
        self.qualities.push(req);
        self
    }
}

/// An actor's in-progress task.
///
/// A record with no type is the null record: "no activity".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub type_id: Option<ActivityId>,
    pub moves_total: i32,
    pub moves_left: i32,
    pub index: i32,
    pub position: i32,
    pub name: String,
    pub placement: Option<TriPoint>,
    pub values: Vec<i32>,
    pub str_values: Vec<String>,
    pub targets: Vec<ObjectRef>,
    pub coords: Vec<TriPoint>,
    pub creatures: BTreeSet<ActorId>,
    /// Eligible for automatic resumption once displaced.
    pub auto_resume: bool,
    pub ignored_distractions: BTreeSet<DistractionKind>,
    /// Helpers currently bound to this record.
    pub assistants: Vec<ActorId>,
    /// Overrides the type's skill and tool requirements when set.
    pub requirements: Option<Requirements>,
    /// Named sub-tasks; empty for single-target activities.
    pub tasks: TaskQueue,
    /// True only while the turn driver is stepping this record.
    #[serde(skip)]
    pub(crate) active: bool,
    pub(crate) speed: SpeedFactors,
    /// Turn at which the expensive factors were last computed.
    #[serde(skip)]
    pub(crate) factors_refreshed_at: Option<u64>,
    pub(crate) bench: Option<Workbench>,
    pub no_food_nearby: bool,
    pub no_drink_nearby: bool,
}

impl ActivityRecord {
    pub fn new(type_id: impl Into<ActivityId>, moves: i32) -> Self {
        Self {
            type_id: Some(type_id.into()),
            moves_total: moves,
            moves_left: moves,
            index: -1,
            position: -1,
            ..Default::default()
        }
    }

    /// The null record.
    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.type_id.is_none()
    }

    pub fn id(&self) -> Option<&ActivityId> {
        self.type_id.as_ref()
    }

    /// True if this record is of the given type.
    pub fn is(&self, id: &str) -> bool {
        self.type_id.as_ref().is_some_and(|t| t.as_str() == id)
    }

    /// Retire now. The turn driver notices after the current dispatch
    /// returns and tears the record down.
    pub fn set_to_null(&mut self) {
        self.type_id = None;
    }

    /// Exhausted its work budget (or was retired).
    pub fn complete(&self) -> bool {
        self.is_null() || self.moves_left <= 0
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Integer payload at `index`, or `def` if absent.
    pub fn get_value(&self, index: usize, def: i32) -> i32 {
        self.values.get(index).copied().unwrap_or(def)
    }

    /// String payload at `index`, or `def` if absent.
    pub fn get_str_value<'a>(&'a self, index: usize, def: &'a str) -> &'a str {
        self.str_values.get(index).map(String::as_str).unwrap_or(def)
    }

    pub fn mod_moves_left(&mut self, delta: i32) {
        self.moves_left = (self.moves_left + delta).max(0);
    }

    pub fn set_moves(&mut self, total: i32, left: i32) {
        self.moves_total = total;
        self.moves_left = left;
    }

    /// Fraction of the work budget already spent, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.moves_total <= 0 {
            return 0.0;
        }
        let done = (self.moves_total - self.moves_left).clamp(0, self.moves_total);
        done as f32 / self.moves_total as f32
    }

    pub fn speed_factors(&self) -> &SpeedFactors {
        &self.speed
    }

    pub fn workbench(&self) -> Option<&Workbench> {
        self.bench.as_ref()
    }

    /// Forget cached factors so the next step recomputes all of them.
    pub fn invalidate_factors(&mut self) {
        self.factors_refreshed_at = None;
    }

    pub fn with_index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    pub fn with_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_placement(mut self, placement: TriPoint) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_values(mut self, values: Vec<i32>) -> Self {
        self.values = values;
        self
    }

    pub fn with_str_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.str_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_targets(mut self, targets: Vec<ObjectRef>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_coords(mut self, coords: Vec<TriPoint>) -> Self {
        self.coords = coords;
        self
    }

    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = Some(requirements);
        self
    }

    pub fn with_tasks(mut self, tasks: TaskQueue) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_auto_resume(mut self, auto_resume: bool) -> Self {
        self.auto_resume = auto_resume;
        self
    }

    // ── Distractions ──────────────────────────────────────────────────

    /// Whether `kind` should not interrupt this record, either because the
    /// record opted out or because the world policy ignores it globally.
    pub fn is_distraction_ignored(&self, kind: DistractionKind, env: &dyn Environment) -> bool {
        self.ignored_distractions.contains(&kind) || env.is_distraction_ignored(kind)
    }

    pub fn ignore_distraction(&mut self, kind: DistractionKind) {
        self.ignored_distractions.insert(kind);
    }

    pub fn allow_distractions(&mut self) {
        self.ignored_distractions.clear();
    }

    /// Copy the opt-outs of another record, typically the one this record
    /// interrupted.
    pub fn inherit_distractions(&mut self, other: &ActivityRecord) {
        self.ignored_distractions
            .extend(other.ignored_distractions.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{OpenField, Sandbox};

    #[test]
    fn test_null_record() {
        let rec = ActivityRecord::null();
        assert!(rec.is_null());
        assert!(rec.complete());
        assert_eq!(rec.id(), None);
    }

    #[test]
    fn test_payload_defaults() {
        let rec = ActivityRecord::new("ACT_READ", 100)
            .with_values(vec![3, 4])
            .with_str_values(["book"]);
        assert_eq!(rec.get_value(1, 0), 4);
        assert_eq!(rec.get_value(5, -1), -1);
        assert_eq!(rec.get_str_value(0, ""), "book");
        assert_eq!(rec.get_str_value(2, "none"), "none");
    }

    #[test]
    fn test_set_to_null_retires() {
        let mut rec = ActivityRecord::new("ACT_DIG", 500);
        assert!(rec.is("ACT_DIG"));
        assert!(!rec.complete());
        rec.set_to_null();
        assert!(rec.complete());
        assert!(!rec.is("ACT_DIG"));
    }

    #[test]
    fn test_progress() {
        let mut rec = ActivityRecord::new("ACT_DIG", 400);
        assert_eq!(rec.progress(), 0.0);
        rec.mod_moves_left(-100);
        assert_eq!(rec.progress(), 0.25);
        rec.mod_moves_left(-1000);
        assert_eq!(rec.moves_left, 0);
        assert_eq!(rec.progress(), 1.0);
    }

    #[test]
    fn test_distractions() {
        let mut rec = ActivityRecord::new("ACT_READ", 100);
        assert!(!rec.is_distraction_ignored(DistractionKind::Noise, &OpenField));
        rec.ignore_distraction(DistractionKind::Noise);
        assert!(rec.is_distraction_ignored(DistractionKind::Noise, &OpenField));

        let mut other = ActivityRecord::new("ACT_WAIT", 100);
        other.inherit_distractions(&rec);
        assert!(other.is_distraction_ignored(DistractionKind::Noise, &OpenField));

        rec.allow_distractions();
        assert!(!rec.is_distraction_ignored(DistractionKind::Noise, &OpenField));
    }

    #[test]
    fn test_global_distraction_policy() {
        let rec = ActivityRecord::new("ACT_READ", 100);
        let mut env = Sandbox::new();
        env.ignore_globally(DistractionKind::WeatherChange);
        assert!(rec.is_distraction_ignored(DistractionKind::WeatherChange, &env));
        assert!(!rec.is_distraction_ignored(DistractionKind::Pain, &env));
    }
}
