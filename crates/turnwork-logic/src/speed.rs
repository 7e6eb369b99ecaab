//! Speed factors: how fast an actor gets through a long-running activity.
//!
//! Throughput is the product of independent sub-factors (light, workbench,
//! player speed, skills, tools, morale, assistants and raw stats). Each
//! sub-factor is clamped on its own, and the composite is clamped again
//! before it is used.
//!
//! A sub-factor the activity type does not declare is `None` in
//! [`SpeedFactors`]: it never multiplies in and is never displayed.
//!
//! ```
//! use turnwork_logic::speed::{SpeedConfig, SpeedFactors};
//!
//! let cfg = SpeedConfig::default();
//! let factors = SpeedFactors::default();
//! assert_eq!(factors.total(&cfg), 1.0);
//! assert_eq!(factors.total_moves(&cfg), 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::requirements::{QualityCurve, QualityReq, SkillReq, Stat, StatReq};

/// Bounds on raw percentage bonuses before they are turned into factors.
const RAW_MIN: f32 = -75.0;
const RAW_MAX: f32 = 100.0;

/// Neutral morale band: no bonus or penalty within ±this value.
pub const MORALE_NEUTRAL_BAND: i32 = 20;

/// Clamp ranges and curve constants for the speed model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// Lower clamp for every individual sub-factor.
    pub factor_min: f32,
    /// Upper clamp for every individual sub-factor.
    pub factor_max: f32,
    /// The light factor never drops below this.
    pub light_floor: f32,
    /// Lower clamp for the composite factor.
    pub total_min: f32,
    /// Upper clamp for the composite factor.
    pub total_max: f32,
    /// Vision modifier at which fine detail stops being visible.
    pub fine_vision_threshold: f32,
    /// Vision modifier span from "just too dark" to "pitch black".
    pub darkness_span: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            factor_min: 0.25,
            factor_max: 2.0,
            light_floor: 0.1,
            total_min: 0.1,
            total_max: 4.0,
            fine_vision_threshold: 4.0,
            darkness_span: 7.0,
        }
    }
}

/// Constrain a factor to `[min, max]`.
pub fn limit_factor(factor: f32, min: f32, max: f32) -> f32 {
    factor.clamp(min, max)
}

/// Turn a raw percentage bonus into a fractional factor contribution.
///
/// The raw value is clamped to `[min, max]`, divided by `denom` (never less
/// than 1) and converted from percent.
pub fn refine_factor(raw: f32, denom: f32, min: f32, max: f32) -> f32 {
    let raw = limit_factor(raw, min, max);
    let denom = denom.max(1.0);
    raw / denom / 100.0
}

fn refine(raw: f32) -> f32 {
    refine_factor(raw, 1.0, RAW_MIN, RAW_MAX)
}

/// Combine several bonuses so the strongest one counts most.
///
/// Bonuses are sorted descending; the n-th (1-based) counts at weight
/// `1/n`. The result is `1 + Σ bonus_n / n`, unclamped.
pub fn combine_diminishing(mut bonuses: Vec<f32>) -> f32 {
    bonuses.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    bonuses
        .iter()
        .enumerate()
        .fold(1.0, |acc, (i, bonus)| acc + bonus / (i as f32 + 1.0))
}

/// S-curve for a skill surplus/deficit, in percent.
pub fn skill_curve(effective: i32) -> f32 {
    if effective == 0 {
        return 0.0;
    }
    let x = effective as f32;
    0.02 * x.powi(3) - 0.5 * x.powi(2) + 6.0 * x
}

/// Fractional bonus for a single skill requirement.
pub fn skill_bonus(level: i32, req: &SkillReq) -> f32 {
    refine(req.modifier * skill_curve(level - req.threshold))
}

/// Skill factor for a set of requirements. `level_of` returns the actor's
/// level in a skill (0 if untrained).
pub fn skill_factor(
    reqs: &[SkillReq],
    level_of: impl Fn(&str) -> i32,
    cfg: &SpeedConfig,
) -> f32 {
    if reqs.is_empty() {
        return 1.0;
    }
    let bonuses = reqs
        .iter()
        .map(|req| skill_bonus(level_of(&req.req), req))
        .collect();
    limit_factor(combine_diminishing(bonuses), cfg.factor_min, cfg.factor_max)
}

/// Raw percentage bonus for the best tool of a quality. `best_level` is
/// `None` when no reachable tool has the quality at all.
pub fn quality_bonus(best_level: Option<i32>, req: &QualityReq) -> f32 {
    let Some(best) = best_level else {
        return 0.0;
    };
    let q = best - req.threshold;
    if q == 0 {
        return 0.0;
    }
    let qf = q as f32;
    match QualityCurve::for_quality(&req.req) {
        QualityCurve::Cubic => {
            (2.0 * qf.powi(3) - 10.0 * qf.powi(2) + 32.0 * qf) * (req.modifier / 10.0)
        }
        QualityCurve::Linear => qf * req.modifier,
        QualityCurve::Rational => req.modifier * qf / (qf.abs() + 1.75),
    }
}

/// Tool factor for a set of quality requirements. `best_of` returns the
/// highest level available for a quality, if any tool has it.
pub fn tools_factor(
    reqs: &[QualityReq],
    best_of: impl Fn(&str) -> Option<i32>,
    cfg: &SpeedConfig,
) -> f32 {
    if reqs.is_empty() {
        return 1.0;
    }
    let bonuses = reqs
        .iter()
        .map(|req| refine(quality_bonus(best_of(&req.req), req)))
        .collect();
    limit_factor(combine_diminishing(bonuses), cfg.factor_min, cfg.factor_max)
}

/// Bounded rational curve for a stat delta, as a fractional bonus.
///
/// Deficits approach −0.75 quadratically-over-quadratically, so being one
/// point short costs little and being far short costs a lot but never
/// everything. Surpluses saturate toward +1.0.
pub fn stat_curve(delta: f32) -> f32 {
    if delta < 0.0 {
        let d2 = delta * delta;
        -0.75 * d2 / (d2 + 16.0)
    } else {
        delta / (delta + 8.0)
    }
}

/// Factor for a single stat requirement.
pub fn stat_factor(actual: i32, req: &StatReq, cfg: &SpeedConfig) -> f32 {
    let delta = req.modifier * (actual - req.threshold) as f32;
    limit_factor(1.0 + stat_curve(delta), cfg.factor_min, cfg.factor_max)
}

/// Factor for the actor's current morale level.
pub fn morale_factor(morale: i32, cfg: &SpeedConfig) -> f32 {
    let f = if morale > MORALE_NEUTRAL_BAND {
        // 1% per 4 extra morale
        0.95 + morale as f32 / 400.0
    } else if morale < -MORALE_NEUTRAL_BAND {
        // 1% per point of missing morale
        1.20 + morale as f32 / 100.0
    } else {
        1.0
    };
    limit_factor(f, cfg.factor_min, cfg.factor_max)
}

/// Factor for lighting. `darkness_mod` is the actor's fine-detail vision
/// modifier; higher is darker.
pub fn light_factor(sees_fine_detail: bool, darkness_mod: f32, cfg: &SpeedConfig) -> f32 {
    if sees_fine_detail {
        return 1.0;
    }
    let darkness =
        ((darkness_mod - cfg.fine_vision_threshold) / cfg.darkness_span).clamp(0.0, 1.0);
    limit_factor(1.0 - darkness, cfg.light_floor, cfg.factor_max)
}

/// Factor for actor speed, where 100 is normal.
pub fn player_speed_factor(speed: i32, cfg: &SpeedConfig) -> f32 {
    limit_factor(speed as f32 / 100.0, cfg.factor_min, cfg.factor_max)
}

/// Factor for recruited helpers. Cubic in the helper count, scaled by the
/// leader's social skill (0.8 at skill 0, 1.2 at skill 10).
pub fn assistants_factor(count: u32, social_skill: i32) -> f32 {
    if count == 0 {
        return 1.0;
    }
    let n = count as f32;
    let mut f = 0.5 * n.powi(3) - 7.0 * n.powi(2) + 45.0 * n;
    f *= 0.8 + 0.04 * social_skill.clamp(0, 10) as f32;
    1.0 + refine_factor(f, 1.0, 0.0, 200.0)
}

/// One displayed sub-factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorKind {
    Assistants,
    Workbench,
    Speed,
    Skills,
    Tools,
    Morale,
    Light,
    Stat(Stat),
}

impl FactorKind {
    pub fn label(&self) -> &'static str {
        match self {
            FactorKind::Assistants => "Assistants",
            FactorKind::Workbench => "Workbench",
            FactorKind::Speed => "Speed",
            FactorKind::Skills => "Skills",
            FactorKind::Tools => "Tools",
            FactorKind::Morale => "Morale",
            FactorKind::Light => "Light",
            FactorKind::Stat(stat) => stat.label(),
        }
    }
}

/// Cached sub-factors of one in-progress activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedFactors {
    pub assist: Option<f32>,
    pub bench: Option<f32>,
    pub player_speed: Option<f32>,
    pub skills: Option<f32>,
    pub tools: Option<f32>,
    pub morale: Option<f32>,
    pub light: Option<f32>,
    pub stats: Vec<(Stat, f32)>,
}

impl SpeedFactors {
    /// Relevant sub-factors in display order.
    pub fn entries(&self) -> Vec<(FactorKind, f32)> {
        let mut out = Vec::new();
        let singles = [
            (FactorKind::Assistants, self.assist),
            (FactorKind::Workbench, self.bench),
            (FactorKind::Speed, self.player_speed),
            (FactorKind::Skills, self.skills),
            (FactorKind::Tools, self.tools),
            (FactorKind::Morale, self.morale),
            (FactorKind::Light, self.light),
        ];
        for (kind, value) in singles {
            if let Some(v) = value {
                out.push((kind, v));
            }
        }
        for (stat, v) in &self.stats {
            out.push((FactorKind::Stat(*stat), *v));
        }
        out
    }

    /// Product of all stat factors.
    pub fn stats_total(&self) -> f32 {
        self.stats.iter().map(|(_, f)| f).product()
    }

    /// Composite multiplier, globally clamped. Exactly 1.0 when nothing is
    /// relevant.
    pub fn total(&self, cfg: &SpeedConfig) -> f32 {
        let entries = self.entries();
        if entries.is_empty() {
            return 1.0;
        }
        let product: f32 = entries.iter().map(|(_, f)| f).product();
        limit_factor(product, cfg.total_min, cfg.total_max)
    }

    /// Move-units of work done per full turn (100 actor moves).
    pub fn total_moves(&self, cfg: &SpeedConfig) -> i32 {
        (self.total(cfg) * 100.0).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::{BUTCHER, CUT_FINE};

    fn cfg() -> SpeedConfig {
        SpeedConfig::default()
    }

    #[test]
    fn test_refine_factor_clamps_and_divides() {
        assert_eq!(refine_factor(50.0, 1.0, -75.0, 100.0), 0.5);
        assert_eq!(refine_factor(500.0, 1.0, -75.0, 100.0), 1.0);
        assert_eq!(refine_factor(-500.0, 1.0, -75.0, 100.0), -0.75);
        assert_eq!(refine_factor(50.0, 2.0, -75.0, 100.0), 0.25);
        // Denominators below one never amplify
        assert_eq!(refine_factor(50.0, 0.5, -75.0, 100.0), 0.5);
    }

    #[test]
    fn test_combine_diminishing_weights() {
        let f = combine_diminishing(vec![0.2, 0.4]);
        // 1 + 0.4 + 0.2/2
        assert!((f - 1.5).abs() < 1e-6);
        assert_eq!(combine_diminishing(Vec::new()), 1.0);
    }

    #[test]
    fn test_skill_factor_untrained_matches_threshold() {
        let reqs = vec![SkillReq::skill("fabrication")];
        assert_eq!(skill_factor(&reqs, |_| 0, &cfg()), 1.0);
        assert!(skill_factor(&reqs, |_| 5, &cfg()) > 1.0);

        let hard = vec![SkillReq::skill("fabrication").with_threshold(4)];
        assert!(skill_factor(&hard, |_| 0, &cfg()) < 1.0);
    }

    #[test]
    fn test_skill_factor_no_requirements() {
        assert_eq!(skill_factor(&[], |_| 10, &cfg()), 1.0);
    }

    #[test]
    fn test_quality_bonus_curves() {
        let generic = QualityReq::quality("HAMMER");
        assert_eq!(quality_bonus(None, &generic), 0.0);
        assert_eq!(quality_bonus(Some(0), &generic), 0.0);
        let g1 = quality_bonus(Some(1), &generic);
        assert!((g1 - 10.0 / 2.75).abs() < 1e-4);

        let cut = QualityReq::quality(CUT_FINE);
        // 2 - 10 + 32 = 24
        assert!((quality_bonus(Some(1), &cut) - 24.0).abs() < 1e-4);

        let butcher = QualityReq::quality(BUTCHER);
        assert!((quality_bonus(Some(3), &butcher) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_rational_quality_deficit_is_bounded() {
        let req = QualityReq::quality("SAW").with_threshold(2);
        for best in [0, 1] {
            let b = quality_bonus(Some(best), &req);
            assert!(b < 0.0);
            assert!(b > -req.modifier);
        }
    }

    #[test]
    fn test_tools_factor_missing_tool_is_identity() {
        let reqs = vec![QualityReq::quality("HAMMER")];
        assert_eq!(tools_factor(&reqs, |_| None, &cfg()), 1.0);
        assert!(tools_factor(&reqs, |_| Some(3), &cfg()) > 1.0);
    }

    #[test]
    fn test_stat_curve_penalizes_large_deficits_harder() {
        let small = stat_curve(-1.0);
        let large = stat_curve(-6.0);
        assert!(small < 0.0 && small > -0.1);
        assert!(large < small * 5.0);
        assert!(stat_curve(-1000.0) > -0.75);
        assert!(stat_curve(1000.0) < 1.0);
    }

    #[test]
    fn test_stat_factor_at_threshold() {
        let req = StatReq::stat(Stat::Strength);
        assert_eq!(stat_factor(8, &req, &cfg()), 1.0);
        assert!(stat_factor(4, &req, &cfg()) < 1.0);
        assert!(stat_factor(12, &req, &cfg()) > 1.0);
    }

    #[test]
    fn test_morale_factor_bands() {
        assert_eq!(morale_factor(0, &cfg()), 1.0);
        assert_eq!(morale_factor(20, &cfg()), 1.0);
        assert_eq!(morale_factor(-20, &cfg()), 1.0);
        assert!(morale_factor(100, &cfg()) > 1.0);
        assert!(morale_factor(-60, &cfg()) < 1.0);
        assert!(morale_factor(-60, &cfg()) < morale_factor(-30, &cfg()));
        assert_eq!(morale_factor(-10_000, &cfg()), cfg().factor_min);
    }

    #[test]
    fn test_light_factor_floor() {
        assert_eq!(light_factor(true, 100.0, &cfg()), 1.0);
        assert_eq!(light_factor(false, 100.0, &cfg()), cfg().light_floor);
        let dim = light_factor(false, 5.0, &cfg());
        assert!(dim < 1.0 && dim > cfg().light_floor);
    }

    #[test]
    fn test_assistants_factor() {
        assert_eq!(assistants_factor(0, 10), 1.0);
        let one = assistants_factor(1, 0);
        let two = assistants_factor(2, 0);
        assert!(one > 1.0);
        assert!(two > one);
        assert!(assistants_factor(1, 10) > one);
        assert!(assistants_factor(32, 10) <= 3.0);
    }

    #[test]
    fn test_total_ignores_irrelevant_factors() {
        let factors = SpeedFactors {
            bench: Some(2.0),
            ..Default::default()
        };
        assert_eq!(factors.total(&cfg()), 2.0);
        assert_eq!(factors.total_moves(&cfg()), 200);
        assert_eq!(factors.entries().len(), 1);
    }

    #[test]
    fn test_total_global_clamp() {
        let factors = SpeedFactors {
            bench: Some(2.0),
            tools: Some(2.0),
            skills: Some(2.0),
            ..Default::default()
        };
        assert_eq!(factors.total(&cfg()), cfg().total_max);
    }
}
