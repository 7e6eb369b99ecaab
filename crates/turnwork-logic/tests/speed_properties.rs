//! Property tests for the speed model.
//!
//! Exercises the composite clamp, the identity point when nothing is
//! declared, and the diminishing combination law for multiple skill and
//! tool requirements.

use proptest::prelude::*;
use turnwork_logic::requirements::{QualityReq, SkillReq, Stat, StatReq};
use turnwork_logic::speed::{
    assistants_factor, combine_diminishing, light_factor, morale_factor, skill_factor,
    stat_factor, tools_factor, SpeedConfig, SpeedFactors,
};

fn cfg() -> SpeedConfig {
    SpeedConfig::default()
}

// ── Composite bounds ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn composite_stays_within_global_clamp(
        skill in 0i32..20,
        quality in proptest::option::of(0i32..8),
        strength in 0i32..30,
        morale in -500i32..500,
        dark in 0.0f32..20.0,
        sees in any::<bool>(),
        helpers in 0u32..32,
        social in 0i32..10,
        bench in 0.25f32..2.0,
    ) {
        let cfg = cfg();
        let factors = SpeedFactors {
            assist: Some(assistants_factor(helpers, social)),
            bench: Some(bench),
            player_speed: Some(1.0),
            skills: Some(skill_factor(&[SkillReq::skill("fabrication")], |_| skill, &cfg)),
            tools: Some(tools_factor(&[QualityReq::quality("HAMMER")], |_| quality, &cfg)),
            morale: Some(morale_factor(morale, &cfg)),
            light: Some(light_factor(sees, dark, &cfg)),
            stats: vec![(Stat::Strength, stat_factor(strength, &StatReq::stat(Stat::Strength), &cfg))],
        };
        let total = factors.total(&cfg);
        prop_assert!(total >= cfg.total_min);
        prop_assert!(total <= cfg.total_max);
    }

    #[test]
    fn sub_factors_stay_within_factor_clamp(
        skill in -5i32..40,
        morale in -1000i32..1000,
        strength in -10i32..40,
    ) {
        let cfg = cfg();
        let s = skill_factor(&[SkillReq::skill("a"), SkillReq::skill("b")], |_| skill, &cfg);
        let m = morale_factor(morale, &cfg);
        let st = stat_factor(strength, &StatReq::stat(Stat::Dexterity), &cfg);
        for f in [s, m, st] {
            prop_assert!(f >= cfg.factor_min && f <= cfg.factor_max);
        }
    }

    #[test]
    fn diminishing_combination_is_sub_additive(b1 in 0.01f32..1.0, ratio in 0.01f32..1.0) {
        let b2 = b1 * ratio;
        let combined = combine_diminishing(vec![b2, b1]);
        prop_assert!(combined < 1.0 + b1 + b2);
        prop_assert!(combined > 1.0 + b1);
    }

    #[test]
    fn second_skill_counts_at_half_weight(a in 1i32..=10, b in 1i32..=10) {
        let cfg = cfg();
        let level = |s: &str| if s == "a" { a } else { b };
        let alone = |name: &str| skill_factor(&[SkillReq::skill(name)], level, &cfg) - 1.0;
        let (hi, lo) = (alone("a").max(alone("b")), alone("a").min(alone("b")));
        let both = skill_factor(&[SkillReq::skill("a"), SkillReq::skill("b")], level, &cfg);
        prop_assert!(both > 1.0 + hi);
        prop_assert!(both < 1.0 + hi + lo);
        prop_assert!((both - (1.0 + hi + lo / 2.0)).abs() < 1e-5);
    }

    #[test]
    fn second_tool_counts_at_half_weight(hammer in 1i32..=8, saw in 1i32..=8) {
        let cfg = cfg();
        let best = |q: &str| Some(if q == "HAMMER" { hammer } else { saw });
        let alone = |q: &str| tools_factor(&[QualityReq::quality(q)], best, &cfg) - 1.0;
        let (hi, lo) = (alone("HAMMER").max(alone("SAW")), alone("HAMMER").min(alone("SAW")));
        let both = tools_factor(
            &[QualityReq::quality("HAMMER"), QualityReq::quality("SAW")],
            best,
            &cfg,
        );
        prop_assert!(both > 1.0 + hi);
        prop_assert!(both < 1.0 + hi + lo);
        prop_assert!((both - (1.0 + hi + lo / 2.0)).abs() < 1e-5);
    }
}

// ── Identity point ─────────────────────────────────────────────────────

#[test]
fn no_declared_factors_is_exactly_one() {
    let cfg = cfg();
    assert_eq!(SpeedFactors::default().total(&cfg), 1.0);
    assert_eq!(SpeedFactors::default().total_moves(&cfg), 100);
    assert!(SpeedFactors::default().entries().is_empty());
}

#[test]
fn missing_inputs_resolve_to_identity() {
    let cfg = cfg();
    assert_eq!(skill_factor(&[], |_| 7, &cfg), 1.0);
    assert_eq!(tools_factor(&[QualityReq::quality("SAW")], |_| None, &cfg), 1.0);
    assert_eq!(assistants_factor(0, 5), 1.0);
}

#[test]
fn one_strong_skill_beats_many_weak_ones() {
    let cfg = cfg();
    let strong = skill_factor(&[SkillReq::skill("a")], |_| 8, &cfg);
    let weak = skill_factor(
        &[SkillReq::skill("a"), SkillReq::skill("b"), SkillReq::skill("c")],
        |_| 2,
        &cfg,
    );
    assert!(strong > weak);
}
