//! Requirements that an activity type declares against the actor performing it.
//!
//! Each requirement names what is required (a skill, a tool quality or a
//! raw stat), a modifier that scales how strongly it affects speed, and a
//! threshold below which the actor is penalized and above which the actor
//! is rewarded.

use serde::{Deserialize, Serialize};

/// Tool quality that uses the cubic curve instead of the generic rational one.
pub const CUT_FINE: &str = "CUT_FINE";
/// Tool quality that uses the linear curve instead of the generic rational one.
pub const BUTCHER: &str = "BUTCHER";

/// Default modifier for skill requirements.
pub const DEFAULT_SKILL_MODIFIER: f32 = 1.0;
/// Default threshold for skill requirements.
pub const DEFAULT_SKILL_THRESHOLD: i32 = 0;
/// Default modifier for tool quality requirements.
pub const DEFAULT_QUALITY_MODIFIER: f32 = 10.0;
/// Default threshold for tool quality requirements.
pub const DEFAULT_QUALITY_THRESHOLD: i32 = 0;
/// Default modifier for stat requirements.
pub const DEFAULT_STAT_MODIFIER: f32 = 1.0;
/// Default stat threshold (an average human stat).
pub const DEFAULT_STAT_THRESHOLD: i32 = 8;

/// Raw character stats an activity can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stat {
    Strength,
    Dexterity,
    Intelligence,
    Perception,
}

impl Stat {
    /// All stats in order.
    pub const ALL: [Stat; 4] = [
        Stat::Strength,
        Stat::Dexterity,
        Stat::Intelligence,
        Stat::Perception,
    ];

    /// Data-file name of the stat.
    pub fn name(&self) -> &'static str {
        match self {
            Stat::Strength => "STRENGTH",
            Stat::Dexterity => "DEXTERITY",
            Stat::Intelligence => "INTELLIGENCE",
            Stat::Perception => "PERCEPTION",
        }
    }

    /// Parse a data-file stat name.
    pub fn from_name(name: &str) -> Option<Stat> {
        Stat::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Short label used in progress descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Stat::Strength => "Strength",
            Stat::Dexterity => "Dexterity",
            Stat::Intelligence => "Intelligence",
            Stat::Perception => "Perception",
        }
    }
}

/// A single requirement: what is needed, how strongly it counts, and the
/// level at which it is neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReq<K> {
    pub req: K,
    pub modifier: f32,
    pub threshold: i32,
}

impl<K> ActivityReq<K> {
    pub fn new(req: K, modifier: f32, threshold: i32) -> Self {
        Self {
            req,
            modifier,
            threshold,
        }
    }

    pub fn with_modifier(mut self, modifier: f32) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Skill requirement keyed by skill identifier.
pub type SkillReq = ActivityReq<String>;
/// Tool quality requirement keyed by quality identifier.
pub type QualityReq = ActivityReq<String>;
/// Raw stat requirement.
pub type StatReq = ActivityReq<Stat>;

impl SkillReq {
    pub fn skill(skill: impl Into<String>) -> Self {
        Self::new(skill.into(), DEFAULT_SKILL_MODIFIER, DEFAULT_SKILL_THRESHOLD)
    }

    pub fn quality(quality: impl Into<String>) -> Self {
        Self::new(
            quality.into(),
            DEFAULT_QUALITY_MODIFIER,
            DEFAULT_QUALITY_THRESHOLD,
        )
    }
}

impl StatReq {
    pub fn stat(stat: Stat) -> Self {
        Self::new(stat, DEFAULT_STAT_MODIFIER, DEFAULT_STAT_THRESHOLD)
    }
}

/// Which curve converts a tool quality surplus into a speed bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityCurve {
    /// Saturating `modifier * q / (|q| + 1.75)`.
    Rational,
    /// `2q³ − 10q² + 32q`, scaled by `modifier / 10`.
    Cubic,
    /// `q * modifier`.
    Linear,
}

impl QualityCurve {
    /// Curve used for the given quality identifier.
    pub fn for_quality(quality: &str) -> QualityCurve {
        match quality {
            CUT_FINE => QualityCurve::Cubic,
            BUTCHER => QualityCurve::Linear,
            _ => QualityCurve::Rational,
        }
    }
}
