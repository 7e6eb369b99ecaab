//! Scheduler tunables.

use serde::{Deserialize, Serialize};
use turnwork_logic::speed::SpeedConfig;

use crate::error::ConfigError;

/// Turns per simulated minute (one turn is one second).
pub const TURNS_PER_MINUTE: u64 = 60;

/// Every number the turn driver uses. Missing JSON fields keep their
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Work done per turn by an activity without `complex_moves`.
    pub flat_moves_per_turn: i32,
    /// Stamina guard fires below `stamina_max / stamina_guard_divisor`.
    pub stamina_guard_divisor: i32,
    /// Length of the forced catch-breath wait, in move-units.
    pub catch_breath_moves: i32,
    /// Catch-breath ends once stamina reaches
    /// `offset + stamina_max / stamina_guard_divisor`.
    pub catch_breath_stamina_offset: i32,
    /// The catch-breath message is shown one time in this many.
    pub catch_breath_message_one_in: u32,
    /// Turns between opportunistic food and drink checks.
    pub auto_needs_interval: u64,
    /// Turns between expensive (skill/tool/stat/bench) factor refreshes.
    pub expensive_factor_interval: u64,
    /// Below this kcal fraction the actor looks for food.
    pub hunger_threshold: f32,
    /// Above this thirst level the actor looks for a drink.
    pub thirst_threshold: i32,
    /// Maximum distance between a leader and a recruited helper.
    pub assistant_range: i32,
    /// Extra stamina regained per step of a rooted activity.
    pub rooted_stamina_regen: i32,
    /// Turns of the "staying put" status applied by rooted activities.
    pub rooted_status_turns: u32,
    /// Actors with morale below this refuse morale-blocked activities.
    pub morale_block_level: i32,
    pub seed: u64,
    pub speed: SpeedConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            flat_moves_per_turn: 100,
            stamina_guard_divisor: 3,
            catch_breath_moves: 6000,
            catch_breath_stamina_offset: 200,
            catch_breath_message_one_in: 50,
            auto_needs_interval: 30 * TURNS_PER_MINUTE,
            expensive_factor_interval: TURNS_PER_MINUTE,
            hunger_threshold: 0.95,
            thirst_threshold: 40,
            assistant_range: 6,
            rooted_stamina_regen: 5,
            rooted_status_turns: 2,
            morale_block_level: -50,
            seed: 0,
            speed: SpeedConfig::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Stamina level under which the guard displaces the current task.
    pub fn stamina_guard_level(&self, stamina_max: i32) -> i32 {
        stamina_max / self.stamina_guard_divisor.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = SchedulerConfig::from_json_str(r#"{ "seed": 7, "assistant_range": 3 }"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.assistant_range, 3);
        assert_eq!(cfg.flat_moves_per_turn, 100);
        assert_eq!(cfg.auto_needs_interval, 1800);
        assert_eq!(cfg.speed.factor_max, 2.0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(SchedulerConfig::from_json_str("{ seed: }").is_err());
    }

    #[test]
    fn test_stamina_guard_level() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.stamina_guard_level(9000), 3000);
    }
}
