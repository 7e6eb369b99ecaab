//! World queries the scheduler depends on but does not own.
//!
//! The scheduler never reaches into map state directly. It asks an injected
//! [`Environment`] whether a position is in bounds, whether two actors can
//! reach each other, which bench is available and whether food or fuel is
//! at hand. The distraction policy is queried here too, read-only.

use std::collections::BTreeSet;

use crate::components::{ActorId, Character, DistractionKind, TriPoint, Workbench};

/// What an opportunistic consumption check looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeKind {
    Food,
    Drink,
}

/// World collaborator consulted by the turn driver.
///
/// Every method has a permissive default, so an implementation only
/// overrides what its world actually models.
pub trait Environment {
    /// Whether the position is inside the loaded world.
    fn is_in_bounds(&self, _pos: TriPoint) -> bool {
        true
    }

    /// Whether an actor at `from` can walk to `to` unobstructed.
    fn has_clear_path(&self, _from: TriPoint, _to: TriPoint) -> bool {
        true
    }

    /// Best bench the actor at `pos` could use, if any.
    fn best_bench(&self, _pos: TriPoint) -> Option<Workbench> {
        None
    }

    /// Feed nearby fires. Returns true if any fuel was added.
    fn try_refuel_fire(&mut self, _actor: ActorId, _character: &Character) -> bool {
        false
    }

    /// Eat or drink something within reach. Returns true on success.
    fn try_auto_consume(
        &mut self,
        _actor: ActorId,
        _character: &mut Character,
        _kind: ConsumeKind,
    ) -> bool {
        false
    }

    /// Global distraction policy, independent of any one record.
    fn is_distraction_ignored(&self, _kind: DistractionKind) -> bool {
        false
    }
}

/// Unbounded empty world: everything reachable, nothing to use.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl Environment for OpenField {}

/// Small configurable world used by tests and the headless harness.
#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    /// Inclusive bounds; `None` means unbounded.
    pub bounds: Option<(TriPoint, TriPoint)>,
    pub blocked: BTreeSet<TriPoint>,
    pub benches: Vec<Workbench>,
    pub food: u32,
    pub drink: u32,
    pub fires_refueled: u32,
    pub consumed: Vec<(ActorId, ConsumeKind)>,
    pub ignored: BTreeSet<DistractionKind>,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(mut self, min: TriPoint, max: TriPoint) -> Self {
        self.bounds = Some((min, max));
        self
    }

    pub fn with_bench(mut self, bench: Workbench) -> Self {
        self.benches.push(bench);
        self
    }

    pub fn with_food(mut self, food: u32, drink: u32) -> Self {
        self.food = food;
        self.drink = drink;
        self
    }

    pub fn block(&mut self, pos: TriPoint) {
        self.blocked.insert(pos);
    }

    pub fn ignore_globally(&mut self, kind: DistractionKind) {
        self.ignored.insert(kind);
    }
}

impl Environment for Sandbox {
    fn is_in_bounds(&self, pos: TriPoint) -> bool {
        match self.bounds {
            None => true,
            Some((min, max)) => {
                (min.x..=max.x).contains(&pos.x)
                    && (min.y..=max.y).contains(&pos.y)
                    && (min.z..=max.z).contains(&pos.z)
            }
        }
    }

    fn has_clear_path(&self, from: TriPoint, to: TriPoint) -> bool {
        if from.z != to.z {
            return false;
        }
        let mut cur = from.step_toward(&to);
        while cur != to {
            if self.blocked.contains(&cur) {
                return false;
            }
            cur = cur.step_toward(&to);
        }
        true
    }

    fn best_bench(&self, pos: TriPoint) -> Option<Workbench> {
        self.benches
            .iter()
            .filter(|b| pos.square_distance(&b.position).is_some_and(|d| d <= 1))
            .max_by(|a, b| {
                a.multiplier
                    .partial_cmp(&b.multiplier)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned()
    }

    fn try_refuel_fire(&mut self, _actor: ActorId, _character: &Character) -> bool {
        self.fires_refueled += 1;
        true
    }

    fn try_auto_consume(
        &mut self,
        actor: ActorId,
        character: &mut Character,
        kind: ConsumeKind,
    ) -> bool {
        let stock = match kind {
            ConsumeKind::Food => &mut self.food,
            ConsumeKind::Drink => &mut self.drink,
        };
        if *stock == 0 {
            return false;
        }
        *stock -= 1;
        match kind {
            ConsumeKind::Food => character.kcal_percent = 1.0,
            ConsumeKind::Drink => character.thirst = 0,
        }
        self.consumed.push((actor, kind));
        true
    }

    fn is_distraction_ignored(&self, kind: DistractionKind) -> bool {
        self.ignored.contains(&kind)
    }
}
