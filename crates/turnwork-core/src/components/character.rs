//! Actor state the scheduler reads and writes: moves, stamina, needs,
//! stats, skills, tools and vision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use turnwork_logic::requirements::Stat;

use super::{ActorId, TriPoint};

/// Skill used to scale how much assistants help.
pub const SOCIAL_SKILL: &str = "speech";

/// Raw character stats - 8 is an average human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub perception: i32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            strength: 8,
            dexterity: 8,
            intelligence: 8,
            perception: 8,
        }
    }
}

impl StatBlock {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Dexterity => self.dexterity,
            Stat::Intelligence => self.intelligence,
            Stat::Perception => self.perception,
        }
    }

    pub fn set(&mut self, stat: Stat, value: i32) {
        match stat {
            Stat::Strength => self.strength = value,
            Stat::Dexterity => self.dexterity = value,
            Stat::Intelligence => self.intelligence = value,
            Stat::Perception => self.perception = value,
        }
    }
}

/// A carried tool and the qualities it provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub qualities: BTreeMap<String, i32>,
}

impl Tool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualities: BTreeMap::new(),
        }
    }

    pub fn with_quality(mut self, quality: impl Into<String>, level: i32) -> Self {
        self.qualities.insert(quality.into(), level);
        self
    }
}

/// How well the actor can see detail right now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vision {
    pub sees_fine_detail: bool,
    /// Higher is darker; only consulted when fine detail is not visible.
    pub fine_detail_mod: f32,
}

impl Default for Vision {
    fn default() -> Self {
        Self {
            sees_fine_detail: true,
            fine_detail_mod: 1.0,
        }
    }
}

/// An actor in the scheduler (player or NPC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub is_npc: bool,
    pub position: TriPoint,
    /// Action budget remaining this turn.
    pub moves: i32,
    /// Moves gained per turn; 100 is normal.
    pub speed: i32,
    pub stamina: i32,
    pub stamina_max: i32,
    /// Stamina regained at the start of each turn.
    pub stamina_regen: i32,
    /// Stored calories as a fraction of healthy (1.0 = fully fed).
    pub kcal_percent: f32,
    /// Thirst level; 0 is fully hydrated.
    pub thirst: i32,
    pub morale: i32,
    pub stats: StatBlock,
    pub skills: BTreeMap<String, i32>,
    pub tools: Vec<Tool>,
    pub vision: Vision,
    /// Leader this actor follows, if any. Only followers can be recruited
    /// as assistants.
    pub leader: Option<ActorId>,
    /// Turns left on the "staying put" status set by rooted activities.
    pub rooted_turns: u32,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_npc: false,
            position: TriPoint::ZERO,
            moves: 0,
            speed: 100,
            stamina: 10_000,
            stamina_max: 10_000,
            stamina_regen: 20,
            kcal_percent: 1.0,
            thirst: 0,
            morale: 0,
            stats: StatBlock::default(),
            skills: BTreeMap::new(),
            tools: Vec::new(),
            vision: Vision::default(),
            leader: None,
            rooted_turns: 0,
        }
    }

    pub fn npc(name: impl Into<String>) -> Self {
        Self {
            is_npc: true,
            ..Self::new(name)
        }
    }

    pub fn at(mut self, position: TriPoint) -> Self {
        self.position = position;
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>, level: i32) -> Self {
        self.skills.insert(skill.into(), level);
        self
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_stamina(mut self, stamina: i32, stamina_max: i32) -> Self {
        self.stamina = stamina;
        self.stamina_max = stamina_max;
        self
    }

    pub fn following(mut self, leader: ActorId) -> Self {
        self.leader = Some(leader);
        self
    }

    /// Level in a skill; untrained skills are 0.
    pub fn skill_level(&self, skill: &str) -> i32 {
        self.skills.get(skill).copied().unwrap_or(0)
    }

    pub fn stat(&self, stat: Stat) -> i32 {
        self.stats.get(stat)
    }

    /// Highest level of a tool quality among carried tools.
    pub fn best_quality(&self, quality: &str) -> Option<i32> {
        self.tools
            .iter()
            .filter_map(|t| t.qualities.get(quality).copied())
            .max()
    }

    /// Refill the move budget and regenerate stamina.
    ///
    /// Unspent moves carry over, but the budget never exceeds one turn's worth.
    pub fn start_turn(&mut self) {
        self.moves = (self.moves + self.speed).min(self.speed);
        self.stamina = (self.stamina + self.stamina_regen).min(self.stamina_max);
        self.rooted_turns = self.rooted_turns.saturating_sub(1);
    }

    /// Moves `start_turn` will leave the actor with. Less than `speed`
    /// while the actor is still paying off a move debt.
    pub fn next_turn_moves(&self) -> i32 {
        (self.moves + self.speed).min(self.speed)
    }

    pub fn mod_stamina(&mut self, delta: i32) {
        self.stamina = (self.stamina + delta).clamp(0, self.stamina_max);
    }

    pub fn is_hungry(&self, threshold: f32) -> bool {
        self.kcal_percent < threshold
    }

    pub fn is_thirsty(&self, threshold: i32) -> bool {
        self.thirst > threshold
    }

    pub fn is_rooted(&self) -> bool {
        self.rooted_turns > 0
    }
}
