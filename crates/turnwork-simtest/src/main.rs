//! Turnwork Headless Scheduling Harness
//!
//! Loads the activity type data, binds it to demo handlers and drives the
//! scheduler through end-to-end scenarios. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p turnwork-simtest
//!   cargo run -p turnwork-simtest -- --verbose

use serde::Deserialize;
use std::sync::Arc;
use turnwork_core::prelude::*;
use turnwork_core::registry::HandlerSet;
use turnwork_core::systems::can_resume_with;
use turnwork_logic::requirements::{SkillReq, Stat, StatReq};
use turnwork_logic::speed::{
    assistants_factor, morale_factor, skill_bonus, skill_factor, stat_factor, SpeedConfig,
    SpeedFactors,
};

// ── Activity type data (same JSON a game would ship) ────────────────────
const TYPES_JSON: &str = include_str!("../../../data/activity_types.json");

#[derive(Debug, Deserialize)]
struct TypeHeader {
    id: String,
    #[serde(default)]
    verb: String,
}

// ── Demo handlers ───────────────────────────────────────────────────────

fn exert(_: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
    turn.character.mod_stamina(-150);
}

fn dig_finish(_: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
    turn.message("You finish digging.");
}

fn craft_finish(act: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
    let item = act.get_str_value(0, "something").to_string();
    turn.message(format!("You finish crafting the {}.", item));
}

fn vehicle_finish(_: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
    turn.message("You finish your work on the vehicle.");
}

fn plain_finish(_: &mut ActivityRecord, _: &mut ActorTurn<'_>) {}

/// Steadying an aim costs the actor's own moves instead of the record's.
fn aim_turn(act: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
    let spent = turn.character.moves.min(act.moves_left).max(0);
    act.mod_moves_left(-spent);
    turn.character.moves -= spent;
}

fn note_cancel(_: &mut ActivityRecord, turn: &mut ActorTurn<'_>) {
    turn.message("You stop what you were doing.");
}

fn handlers() -> HandlerSet {
    HandlerSet::new()
        .with_named("exert", exert)
        .with_named("dig_finish", dig_finish)
        .with_named("craft_finish", craft_finish)
        .with_named("vehicle_finish", vehicle_finish)
        .with_named("plain_finish", plain_finish)
        .with_named("note_cancel", note_cancel)
        .with_named("aim_turn", aim_turn)
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Turnwork Scheduling Harness ===\n");

    let mut results = Vec::new();

    // 1. Activity type data
    let registry = match validate_type_definitions(&mut results, verbose) {
        Some(registry) => Arc::new(registry),
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Speed model sweep
    results.extend(validate_speed_model(verbose));

    // 3. Flat countdown
    results.extend(validate_flat_countdown(&registry));

    // 4. Speed-scaled work
    results.extend(validate_speed_scaling(&registry));

    // 5. Stamina guard and auto-resume
    results.extend(validate_stamina_guard(&registry, verbose));

    // 6. Assistants
    results.extend(validate_assistants(&registry));

    // 7. Resumption
    results.extend(validate_resumption(&registry));

    // 8. Progress descriptions
    results.extend(validate_progress(&registry, verbose));

    // 9. Save/load
    results.extend(validate_persistence(&registry));

    if !report(&results, verbose) {
        std::process::exit(1);
    }
}

/// Print the summary. Returns whether everything passed.
fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    failed == 0
}

fn config() -> SchedulerConfig {
    SchedulerConfig {
        seed: 7,
        ..SchedulerConfig::default()
    }
}

// ── 1. Type Definitions ─────────────────────────────────────────────────

fn validate_type_definitions(
    results: &mut Vec<TestResult>,
    verbose: bool,
) -> Option<ActivityRegistry> {
    println!("--- Activity Type Definitions ---");

    let headers: Vec<TypeHeader> = match serde_json::from_str(TYPES_JSON) {
        Ok(h) => h,
        Err(e) => {
            results.push(TestResult {
                name: "types_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };

    let registry = match ActivityRegistry::from_json(TYPES_JSON, &handlers()) {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult {
                name: "types_register".into(),
                passed: false,
                detail: e.to_string(),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "types_all_registered".into(),
        passed: registry.len() == headers.len() + 2
            && headers.iter().all(|h| registry.contains(&h.id)),
        detail: format!("{} types plus built-ins", headers.len()),
    });

    let verbless: Vec<_> = headers.iter().filter(|h| h.verb.is_empty()).collect();
    results.push(TestResult {
        name: "types_have_verbs".into(),
        passed: verbless.is_empty(),
        detail: if verbless.is_empty() {
            "every type has a verb".into()
        } else {
            format!(
                "missing verbs: {}",
                verbless
                    .iter()
                    .map(|h| h.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        },
    });

    let inconsistent: Vec<_> = registry
        .iter()
        .filter(|t| t.special && (t.complex_moves || t.on_turn.is_none()))
        .collect();
    results.push(TestResult {
        name: "types_flags_consistent".into(),
        passed: inconsistent.is_empty(),
        detail: format!("{} special types without a turn handler or with complex moves", inconsistent.len()),
    });

    // Loading the same file twice must fail instead of overriding
    let mut twice = registry.clone();
    let duplicate = turnwork_core::registry::loader::load_json(&mut twice, TYPES_JSON, &handlers());
    results.push(TestResult {
        name: "types_duplicate_rejected".into(),
        passed: matches!(duplicate, Err(RegistryError::DuplicateType { .. }))
            && twice.len() == registry.len(),
        detail: "second load of the same ids is an error".into(),
    });

    let orphan = ActivityRegistry::from_json(
        TYPES_JSON,
        &handlers().bind_finish("ACT_UNDEFINED", plain_finish),
    );
    results.push(TestResult {
        name: "types_orphan_binding_rejected".into(),
        passed: matches!(orphan, Err(RegistryError::HandlerForUndefinedType { .. })),
        detail: "binding for an undefined id is an error".into(),
    });

    if verbose {
        println!("  Registered types:");
        for ty in registry.iter() {
            println!(
                "    {:16} complex={} rooted={} assistants={}",
                ty.id, ty.complex_moves, ty.rooted, ty.max_assistants
            );
        }
    }

    Some(registry)
}

// ── 2. Speed Model ──────────────────────────────────────────────────────

fn validate_speed_model(verbose: bool) -> Vec<TestResult> {
    println!("--- Speed Model ---");
    let mut results = Vec::new();
    let cfg = SpeedConfig::default();

    results.push(TestResult {
        name: "speed_identity".into(),
        passed: SpeedFactors::default().total(&cfg) == 1.0,
        detail: "no declared factors gives exactly 1.0".into(),
    });

    // Morale is monotonic
    let morale: Vec<f32> = (-300..=300).step_by(10).map(|m| morale_factor(m, &cfg)).collect();
    results.push(TestResult {
        name: "speed_morale_monotonic".into(),
        passed: morale.windows(2).all(|w| w[0] <= w[1]),
        detail: format!(
            "{:.2} at -300, {:.2} at 0, {:.2} at 300",
            morale[0],
            morale[30],
            morale[morale.len() - 1]
        ),
    });

    // Stat deficits hurt more the larger they are, but stay bounded
    let req = StatReq::stat(Stat::Strength);
    let stats: Vec<f32> = (0..=16).map(|s| stat_factor(s, &req, &cfg)).collect();
    results.push(TestResult {
        name: "speed_stat_bounded".into(),
        passed: stats.windows(2).all(|w| w[0] <= w[1])
            && stats.iter().all(|f| *f >= cfg.factor_min && *f <= cfg.factor_max),
        detail: format!("{:.2} at 0, {:.2} at 16", stats[0], stats[16]),
    });

    // Diminishing combination
    let reqs = [SkillReq::skill("fabrication"), SkillReq::skill("tailor")];
    let level_of = |s: &str| if s == "fabrication" { 4 } else { 2 };
    let b1 = skill_bonus(4, &reqs[0]);
    let b2 = skill_bonus(2, &reqs[1]);
    let combined = skill_factor(&reqs, level_of, &cfg);
    results.push(TestResult {
        name: "speed_diminishing".into(),
        passed: combined < 1.0 + b1 + b2 && combined > 1.0 + b1,
        detail: format!("1+{:.3} < {:.3} < 1+{:.3}+{:.3}", b1, combined, b1, b2),
    });

    let helpers: Vec<f32> = (0..=6).map(|n| assistants_factor(n, 5)).collect();
    results.push(TestResult {
        name: "speed_assistants_increasing".into(),
        passed: helpers[0] == 1.0 && helpers.windows(2).all(|w| w[0] < w[1]),
        detail: format!("{:.2} with one helper", helpers[1]),
    });

    if verbose {
        println!("  Assistant factor by count:");
        for (n, f) in helpers.iter().enumerate() {
            println!("    {}: {:.3}", n, f);
        }
    }

    results
}

// ── 3. Flat Countdown ───────────────────────────────────────────────────

fn validate_flat_countdown(registry: &Arc<ActivityRegistry>) -> Vec<TestResult> {
    println!("--- Flat Countdown ---");
    let mut results = Vec::new();

    let mut engine = SchedulerEngine::new(Arc::clone(registry), config());
    let actor = engine.spawn_actor(Character::new("Avery"));
    let _ = engine.start_activity(actor, "ACT_VEHICLE", 600);

    let mut left = Vec::new();
    let mut finished_on = None;
    for _ in 0..10 {
        engine.step_turn();
        match engine.activity(actor) {
            Some(record) => left.push(record.moves_left),
            None if finished_on.is_none() => finished_on = Some(engine.turn()),
            None => {}
        }
    }
    let finishes: Vec<u64> = engine
        .messages()
        .iter()
        .filter(|m| m.text == "You finish your work on the vehicle.")
        .map(|m| m.turn)
        .collect();

    results.push(TestResult {
        name: "flat_decrements_by_100".into(),
        passed: left == vec![500, 400, 300, 200, 100],
        detail: format!("moves left per turn {:?}", left),
    });
    results.push(TestResult {
        name: "flat_finishes_on_turn_6".into(),
        passed: finished_on == Some(6) && finishes == vec![6],
        detail: format!("finished on {:?}, finish handler on {:?}", finished_on, finishes),
    });

    results
}

// ── 4. Speed Scaling ────────────────────────────────────────────────────

fn turns_to_finish<E: Environment>(engine: &mut SchedulerEngine<E>, actor: ActorId) -> u64 {
    let start = engine.turn();
    while engine.has_activity(actor) && engine.turn() - start < 100 {
        engine.step_turn();
    }
    engine.turn() - start
}

fn validate_speed_scaling(registry: &Arc<ActivityRegistry>) -> Vec<TestResult> {
    println!("--- Speed Scaling ---");
    let mut results = Vec::new();

    let mut plain = SchedulerEngine::new(Arc::clone(registry), config());
    let a = plain.spawn_actor(Character::new("Plain"));
    let _ = plain.start_activity(a, "ACT_SAW", 1000);
    let base = turns_to_finish(&mut plain, a);

    let env = Sandbox::new().with_bench(Workbench::new("sawhorse", 2.0, TriPoint::ZERO));
    let mut benched = SchedulerEngine::with_environment(Arc::clone(registry), config(), env);
    let b = benched.spawn_actor(Character::new("Benched"));
    let _ = benched.start_activity(b, "ACT_SAW", 1000);
    let fast = turns_to_finish(&mut benched, b);

    results.push(TestResult {
        name: "complex_factor_halves_time".into(),
        passed: base == 10 && fast == 5,
        detail: format!("{} turns at 1.0, {} turns at 2.0", base, fast),
    });

    results
}

// ── 5. Stamina Guard ────────────────────────────────────────────────────

fn validate_stamina_guard(registry: &Arc<ActivityRegistry>, verbose: bool) -> Vec<TestResult> {
    println!("--- Stamina Guard ---");
    let mut results = Vec::new();

    let mut engine = SchedulerEngine::new(Arc::clone(registry), config());
    let actor = engine.spawn_actor(Character::new("Digger").with_stamina(3600, 9000));
    let _ = engine.assign_activity(
        actor,
        ActivityRecord::new("ACT_DIG", 20_000).with_coords(vec![TriPoint::new(2, 0, 0)]),
    );

    let mut displaced_left = None;
    for _ in 0..50 {
        engine.step_turn();
        let resting = engine
            .activity(actor)
            .is_some_and(|r| r.is(ids::WAIT_STAMINA));
        if resting {
            displaced_left = engine
                .backlog(actor)
                .and_then(|b| b.peek().map(|r| (r.moves_left, r.auto_resume)));
            break;
        }
    }
    results.push(TestResult {
        name: "stamina_guard_fires".into(),
        passed: matches!(displaced_left, Some((_, true))),
        detail: format!("displaced record {:?}", displaced_left),
    });

    let mut resumed_left = None;
    for _ in 0..200 {
        engine.step_turn();
        if let Some(record) = engine.activity(actor) {
            if record.is("ACT_DIG") {
                resumed_left = Some(record.moves_left);
                break;
            }
        }
    }
    results.push(TestResult {
        name: "stamina_guard_resumes_unchanged".into(),
        passed: resumed_left.is_some() && resumed_left == displaced_left.map(|(left, _)| left),
        detail: format!(
            "left {:?} at displacement, {:?} on resume",
            displaced_left.map(|(left, _)| left),
            resumed_left
        ),
    });
    let rested = engine
        .character(actor)
        .map(|c| c.stamina >= c.stamina_max / 3)
        .unwrap_or(false);
    results.push(TestResult {
        name: "stamina_guard_restores_stamina".into(),
        passed: rested && engine.backlog(actor).is_some_and(|b| b.is_empty()),
        detail: format!("stamina {:?}", engine.character(actor).map(|c| c.stamina)),
    });

    if verbose {
        for m in engine.messages() {
            println!("    [turn {}] {}", m.turn, m.text);
        }
    }

    results
}

// ── 6. Assistants ───────────────────────────────────────────────────────

fn validate_assistants(registry: &Arc<ActivityRegistry>) -> Vec<TestResult> {
    println!("--- Assistants ---");
    let mut results = Vec::new();

    let mut engine = SchedulerEngine::new(Arc::clone(registry), config());
    let leader = engine.spawn_actor(Character::new("Leader"));
    let near = engine.spawn_actor(Character::npc("Near").following(leader).at(TriPoint::new(1, 0, 0)));
    let far = engine.spawn_actor(Character::npc("Far").following(leader).at(TriPoint::new(20, 0, 0)));
    let _ = engine.assign_activity(
        leader,
        ActivityRecord::new("ACT_BUILD", 5000).with_coords(vec![TriPoint::new(0, 1, 0)]),
    );
    engine.step_turn();

    let bound = engine.assist_binding(near).map(|b| b.leader) == Some(leader)
        && engine.assist_binding(far).is_none();
    let inert = engine.character(near).is_some_and(|c| c.moves == 0);
    results.push(TestResult {
        name: "assist_recruits_in_range".into(),
        passed: bound && inert,
        detail: format!(
            "assistants {:?}",
            engine.activity(leader).map(|r| r.assistants.clone())
        ),
    });

    let _ = engine.cancel_activity(leader);
    let released = engine.assist_binding(near).is_none();
    engine.step_turn();
    let idle = !engine.has_activity(near) && engine.character(near).is_some_and(|c| c.moves > 0);
    results.push(TestResult {
        name: "assist_released_on_cancel".into(),
        passed: released && idle,
        detail: "helper unbound and idle after leader cancels".into(),
    });

    let _ = engine.start_activity(leader, "ACT_SAW", 5000);
    engine.step_turn();
    results.push(TestResult {
        name: "assist_zero_max_never_recruits".into(),
        passed: engine.assist_binding(near).is_none()
            && engine.activity(leader).is_some_and(|r| r.assistants.is_empty()),
        detail: "ACT_SAW has no assistant slots".into(),
    });

    results
}

// ── 7. Resumption ───────────────────────────────────────────────────────

fn validate_resumption(registry: &Arc<ActivityRegistry>) -> Vec<TestResult> {
    println!("--- Resumption ---");
    let mut results = Vec::new();

    let shirt = ActivityRecord::new("ACT_CRAFT", 3000).with_str_values(["shirt"]);
    let pants = ActivityRecord::new("ACT_CRAFT", 3000).with_str_values(["pants"]);
    results.push(TestResult {
        name: "resume_reflexive".into(),
        passed: can_resume_with(&shirt, &shirt.clone(), registry),
        detail: "a record resumes into itself".into(),
    });
    results.push(TestResult {
        name: "resume_string_value_differs".into(),
        passed: !can_resume_with(&shirt, &pants, registry),
        detail: "one differing string value blocks resumption".into(),
    });

    let mut engine = SchedulerEngine::new(Arc::clone(registry), config());
    let actor = engine.spawn_actor(Character::new("Tailor"));
    let _ = engine.assign_activity(actor, shirt.clone());
    engine.run_turns(3);
    let _ = engine.assign_activity(actor, pants);
    engine.step_turn();
    let _ = engine.suspend_activity(actor);
    let stored = engine.backlog(actor).map(|b| b.len()).unwrap_or(0);
    let _ = engine.assign_activity(actor, ActivityRecord::new("ACT_CRAFT", 3000).with_str_values(["pants"]));
    let resumed = engine
        .activity(actor)
        .is_some_and(|r| r.get_str_value(0, "") == "pants" && r.moves_left < 3000);
    results.push(TestResult {
        name: "resume_matching_commit".into(),
        passed: stored == 2 && resumed,
        detail: format!("{} stored, matching commit resumed={}", stored, resumed),
    });

    results
}

// ── 8. Progress Descriptions ────────────────────────────────────────────

fn validate_progress(registry: &Arc<ActivityRegistry>, verbose: bool) -> Vec<TestResult> {
    println!("--- Progress Descriptions ---");
    let mut results = Vec::new();

    let mut engine = SchedulerEngine::new(Arc::clone(registry), config());
    let digger = engine.spawn_actor(Character::new("Digger"));
    let crafter = engine.spawn_actor(Character::new("Crafter").with_skill("fabrication", 3));
    let _ = engine.start_activity(digger, "ACT_VEHICLE", 1000);
    let _ = engine.assign_activity(
        crafter,
        ActivityRecord::new("ACT_CRAFT", 6000).with_str_values(["knife"]),
    );
    engine.run_turns(5);

    let short = engine.describe_activity(digger);
    results.push(TestResult {
        name: "progress_percent".into(),
        passed: short.as_deref() == Some("Working on the vehicle: 50%"),
        detail: format!("{:?}", short),
    });

    let long = engine.describe_activity(crafter).unwrap_or_default();
    results.push(TestResult {
        name: "progress_verbose".into(),
        passed: long.starts_with("Crafting\n")
            && long.contains("Time left:")
            && long.contains("Speed multipliers:")
            && long.contains("Skills"),
        detail: long.lines().next().unwrap_or("").to_string(),
    });

    if verbose {
        for line in long.lines() {
            println!("    {}", line);
        }
    }

    results
}

// ── 9. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(registry: &Arc<ActivityRegistry>) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut engine = SchedulerEngine::new(Arc::clone(registry), config());
    let actor = engine.spawn_actor(Character::new("Avery"));
    let _ = engine.start_activity(actor, "ACT_FISH", 9000);
    let _ = engine.start_activity(actor, "ACT_DIG", 4000);
    engine.run_turns(4);

    let mut buffer = Vec::new();
    let saved = engine.save(&mut buffer);
    let mut loaded = SchedulerEngine::new(Arc::clone(registry), config());
    let restored = saved.is_ok() && loaded.load(&buffer[..]).is_ok();

    let same_record = engine.activity(actor).map(|r| r.moves_left)
        == loaded.activity(actor).map(|r| r.moves_left);
    let same_backlog = engine.backlog(actor).map(|b| b.len()) == loaded.backlog(actor).map(|b| b.len());
    results.push(TestResult {
        name: "save_load_roundtrip".into(),
        passed: restored && same_record && same_backlog && loaded.turn() == engine.turn(),
        detail: format!("{} bytes", buffer.len()),
    });

    results
}
