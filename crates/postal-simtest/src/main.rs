//! Postal Headless Progression Harness
//!
//! Drives the progression core through scripted scenarios and a seeded soak
//! run, checking the economy's invariants after every step. Runs entirely
//! in-process, with no engine or renderer.
//!
//! Usage:
//!   cargo run -p postal-simtest
//!   cargo run -p postal-simtest -- --verbose

use postal_logic::config::ProgressionConfig;
use postal_logic::courier::Courier;
use postal_logic::delivery::{base_xp, streak_title, DeliveryState};
use postal_logic::destination::{DestinationId, DestinationRegistry};
use postal_logic::experience::{xp_to_next, ExperienceConfig, ExperienceLedger};
use postal_logic::rewards::ChoiceConfig;
use postal_logic::signals::{Signal, SignalLog};
use postal_logic::skills::{SkillTrack, SkillTree};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::Deserialize;

// ── Fixtures (same JSON a host would ship) ──────────────────────────────
const DESTINATIONS_JSON: &str = include_str!("../../../data/destinations.json");
const PROGRESSION_JSON: &str = include_str!("../../../data/progression.json");
const SOAK_PLAN_JSON: &str = include_str!("../../../data/soak_plan.json");

#[derive(Debug, Deserialize)]
struct SoakPlan {
    seed: u64,
    steps: u32,
    zones: u32,
    min_dt: f32,
    max_dt: f32,
    weights: SoakWeights,
}

#[derive(Debug, Deserialize)]
struct SoakWeights {
    pick_up: u32,
    enter_zone: u32,
    exit_zone: u32,
    tick: u32,
    damage: u32,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Postal Progression Harness ===\n");

    let mut results = Vec::new();

    // 1. Fixture validation
    results.extend(validate_fixtures(verbose));

    // 2. Skill tree stats
    results.extend(validate_skill_tree(verbose));

    // 3. Experience curve
    results.extend(validate_experience(verbose));

    // 4. Inventory capacity
    results.extend(validate_inventory(verbose));

    // 5. Delivery sessions
    results.extend(validate_delivery(verbose));

    // 6. Skill pick queue
    results.extend(validate_skill_picks(verbose));

    // 7. Seeded soak
    results.extend(run_soak(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_registry() -> Option<DestinationRegistry> {
    usable_registry(DESTINATIONS_JSON)
}

/// A catalogue the soak can draw from: parses and has at least one entry.
fn usable_registry(json: &str) -> Option<DestinationRegistry> {
    DestinationRegistry::from_json(json)
        .ok()
        .filter(|registry| !registry.is_empty())
}

fn load_config() -> ProgressionConfig {
    ProgressionConfig::from_json(PROGRESSION_JSON).unwrap_or_default()
}

fn seeded_courier(seed: u64) -> Courier {
    let mut config = load_config();
    config.choices = ChoiceConfig {
        seed: Some(seed),
        ..config.choices
    };
    let courier = Courier::new(config);
    match load_registry() {
        Some(registry) => courier.with_destinations(registry),
        None => courier,
    }
}

fn rewards_of(signals: &[Signal]) -> Vec<i64> {
    signals
        .iter()
        .filter_map(|s| match s {
            Signal::PackageDelivered { reward, .. } => Some(*reward),
            _ => None,
        })
        .collect()
}

// ── 1. Fixtures ─────────────────────────────────────────────────────────

fn validate_fixtures(verbose: bool) -> Vec<TestResult> {
    println!("--- Fixtures ---");
    let mut results = Vec::new();

    match DestinationRegistry::from_json(DESTINATIONS_JSON) {
        Ok(registry) => {
            results.push(check(
                "destinations_parse",
                !registry.is_empty(),
                format!("{} destinations loaded", registry.len()),
            ));
            if verbose {
                for d in registry.iter() {
                    println!("  destination {:>2}: {}", d.id, d.display_name);
                }
            }
        }
        Err(e) => results.push(check("destinations_parse", false, e.to_string())),
    }

    match ProgressionConfig::from_json(PROGRESSION_JSON) {
        Ok(config) => results.push(check(
            "progression_config_parse",
            config.skills.base_capacity == 15,
            format!(
                "capacity {} (+{}/lvl), delivery {:.2}s (x{:.2}/lvl)",
                config.skills.base_capacity,
                config.skills.capacity_per_level,
                config.skills.base_delivery_seconds,
                config.skills.delivery_multiplier_per_level
            ),
        )),
        Err(e) => results.push(check("progression_config_parse", false, e.to_string())),
    }

    match serde_json::from_str::<SoakPlan>(SOAK_PLAN_JSON) {
        Ok(plan) => results.push(check(
            "soak_plan_parse",
            plan.steps > 0 && plan.zones > 0 && plan.min_dt <= plan.max_dt,
            format!("{} steps over {} zones", plan.steps, plan.zones),
        )),
        Err(e) => results.push(check("soak_plan_parse", false, e.to_string())),
    }

    results
}

// ── 2. Skill tree ───────────────────────────────────────────────────────

fn validate_skill_tree(verbose: bool) -> Vec<TestResult> {
    println!("--- Skill Tree ---");
    let mut results = Vec::new();
    let mut tree = SkillTree::new(load_config().skills);
    let mut signals = SignalLog::new();

    let mut monotonic = true;
    let mut last_seconds = tree.delivery_seconds();
    for level in 1..=30 {
        tree.level_up(SkillTrack::Delivery, &mut signals);
        let seconds = tree.delivery_seconds();
        if !(seconds < last_seconds && seconds > 0.0) {
            monotonic = false;
        }
        if verbose && level % 10 == 0 {
            println!("  delivery lvl {:>2}: {:.4}s/package", level, seconds);
        }
        last_seconds = seconds;
    }
    results.push(check(
        "delivery_time_strictly_decreasing",
        monotonic,
        format!("30 levels → {:.4}s", last_seconds),
    ));

    for _ in 0..4 {
        tree.level_up(SkillTrack::Capacity, &mut signals);
    }
    results.push(check(
        "capacity_formula",
        tree.capacity() == 27,
        format!("capacity level 4 → {}", tree.capacity()),
    ));

    let changed = signals.count(|s| matches!(s, Signal::SkillLevelChanged { .. }));
    results.push(check(
        "one_signal_per_level_up",
        changed == 34,
        format!("{} level-change signals for 34 level-ups", changed),
    ));

    let untouched = tree.level_up_id(99, &mut signals).is_none() && tree.level_of_id(99) == 0;
    results.push(check(
        "unknown_track_is_noop",
        untouched && signals.len() == 34,
        "raw id 99 ignored".into(),
    ));

    results
}

// ── 3. Experience ───────────────────────────────────────────────────────

fn validate_experience(verbose: bool) -> Vec<TestResult> {
    println!("--- Experience ---");
    let mut results = Vec::new();
    let config = load_config().experience;

    let mut ledger = ExperienceLedger::new(config.clone());
    let mut signals = SignalLog::new();
    ledger.add_xp(250, &mut signals);
    let level_ups: Vec<u32> = signals
        .as_slice()
        .iter()
        .filter_map(|s| match s {
            Signal::LevelUp(l) => Some(*l),
            _ => None,
        })
        .collect();
    results.push(check(
        "grant_250_from_level_1",
        ledger.level() == 3 && ledger.current_xp() == 25 && level_ups == vec![2, 3],
        format!(
            "level {} with {}/{} XP, level-ups {:?}",
            ledger.level(),
            ledger.current_xp(),
            ledger.xp_to_next(),
            level_ups
        ),
    ));

    let curve: Vec<i64> = (1..=5).map(|l| xp_to_next(l, &config)).collect();
    if verbose {
        println!("  curve levels 1-5: {:?}", curve);
    }
    results.push(check(
        "curve_shape",
        curve == vec![100, 125, 150, 175, 200],
        format!("{:?}", curve),
    ));

    let mut ledger = ExperienceLedger::new(ExperienceConfig::default());
    let mut ok = true;
    let mut last_level = ledger.level();
    for amount in (1..=400).map(|i| (i * 37) % 311) {
        ledger.add_xp(amount, &mut signals);
        ok &= ledger.current_xp() >= 0 && ledger.current_xp() < ledger.xp_to_next();
        ok &= ledger.level() >= last_level;
        last_level = ledger.level();
    }
    results.push(check(
        "ledger_invariant_sweep",
        ok,
        format!("400 grants → level {}", ledger.level()),
    ));

    results
}

// ── 4. Inventory ────────────────────────────────────────────────────────

fn validate_inventory(_verbose: bool) -> Vec<TestResult> {
    println!("--- Inventory ---");
    let mut results = Vec::new();
    let mut courier = seeded_courier(1);

    let mut accepted = 0;
    for i in 0..15 {
        if courier.pick_up(i % 5) {
            accepted += 1;
        }
    }
    courier.drain_signals();
    let sixteenth = courier.pick_up(0);
    let signals = courier.drain_signals();
    results.push(check(
        "sixteenth_pickup_refused",
        accepted == 15
            && !sixteenth
            && courier.inventory().total_held() == 15
            && signals == vec![Signal::PickupFailedFull],
        format!(
            "{} accepted, held {}/{}",
            accepted,
            courier.inventory().total_held(),
            courier.inventory().capacity()
        ),
    ));

    let before = courier.inventory().total_held();
    let refused = !courier.pick_up(-3) && !courier.pick_up(77);
    results.push(check(
        "invalid_destinations_ignored",
        refused && courier.inventory().total_held() == before && courier.pending_signals().is_empty(),
        "negative and unregistered ids dropped".into(),
    ));

    results
}

// ── 5. Delivery ─────────────────────────────────────────────────────────

fn validate_delivery(verbose: bool) -> Vec<TestResult> {
    println!("--- Delivery ---");
    let mut results = Vec::new();

    let sequence: Vec<i64> = (1..=10).map(base_xp).collect();
    results.push(check(
        "base_xp_sequence",
        sequence == vec![10, 12, 15, 19, 24, 30, 37, 45, 54, 64],
        format!("{:?}", sequence),
    ));

    // Three packages, three full timers, then exhaustion.
    let mut courier = seeded_courier(2);
    for _ in 0..3 {
        courier.pick_up(1);
    }
    courier.enter_zone(1, 1);
    for _ in 0..4 {
        courier.tick(2.0);
    }
    let signals = courier.drain_signals();
    let rewards = rewards_of(&signals);
    let ended: Vec<u32> = signals
        .iter()
        .filter_map(|s| match s {
            Signal::StreakEnded(n) => Some(*n),
            _ => None,
        })
        .collect();
    if verbose {
        if let Some(&n) = ended.first() {
            println!("  streak {} announced as {:?}", n, streak_title(n));
        }
    }
    results.push(check(
        "three_package_streak",
        rewards == vec![10, 12, 15]
            && ended == vec![3]
            && courier.delivery().state() == DeliveryState::Inactive,
        format!("rewards {:?}, streaks ended {:?}", rewards, ended),
    ));

    // Half a timer, then a zone switch.
    let mut courier = seeded_courier(3);
    courier.pick_up(0);
    courier.pick_up(2);
    courier.enter_zone(1, 0);
    courier.tick(1.0);
    courier.enter_zone(2, 2);
    let signals = courier.drain_signals();
    results.push(check(
        "zone_switch_drops_partial_progress",
        rewards_of(&signals).is_empty()
            && courier.inventory().count(DestinationId(0)) == 1
            && courier.experience().current_xp() == 0,
        "no package, no XP".into(),
    ));

    // Single deliveries are never announced.
    let mut courier = seeded_courier(4);
    courier.pick_up(3);
    courier.enter_zone(5, 3);
    courier.tick(2.0);
    courier.exit_zone(5);
    let signals = courier.drain_signals();
    results.push(check(
        "single_delivery_not_a_streak",
        !signals.iter().any(|s| matches!(s, Signal::StreakEnded(_))),
        format!("{} signals, none StreakEnded", signals.len()),
    ));

    // Re-supply while standing in the zone does not resume.
    let mut courier = seeded_courier(5);
    courier.enter_zone(6, 4);
    courier.tick(0.1);
    courier.pick_up(4);
    courier.tick(2.0);
    courier.tick(2.0);
    results.push(check(
        "restock_needs_fresh_entry",
        !courier.delivery().is_delivering() && courier.inventory().count(DestinationId(4)) == 1,
        "session stayed inactive".into(),
    ));

    results
}

// ── 6. Skill picks ──────────────────────────────────────────────────────

fn validate_skill_picks(verbose: bool) -> Vec<TestResult> {
    println!("--- Skill Picks ---");
    let mut results = Vec::new();
    let mut courier = seeded_courier(6);

    for _ in 0..15 {
        courier.pick_up(2);
    }
    courier.enter_zone(1, 2);
    let mut offers = 0;
    let mut distinct = true;
    let mut serialized = true;
    while courier.delivery().is_delivering() {
        courier.tick(2.0);
        for signal in courier.drain_signals() {
            if let Signal::SkillChoiceOffered([a, b, c]) = signal {
                offers += 1;
                distinct &= a != b && b != c && a != c;
            }
        }
        if let Some(offered) = courier.rewards().offered() {
            serialized &= courier.is_paused();
            if verbose {
                println!(
                    "  level {} offers {:?}",
                    courier.experience().level(),
                    offered
                );
            }
            courier.choose_track(offered[0]);
        }
    }
    let total_levels: u32 = SkillTrack::ALL
        .iter()
        .map(|&t| courier.skills().level(t))
        .sum();
    results.push(check(
        "one_pick_per_level_up",
        offers as u32 == courier.experience().level() - 1 && total_levels == offers as u32,
        format!(
            "level {}, {} picks offered, {} skill levels",
            courier.experience().level(),
            offers,
            total_levels
        ),
    ));
    results.push(check(
        "picks_are_distinct",
        distinct,
        "every offer had three different tracks".into(),
    ));
    results.push(check(
        "time_frozen_while_choosing",
        serialized,
        "courier paused during every pick".into(),
    ));

    results
}

// ── 7. Soak ─────────────────────────────────────────────────────────────

fn run_soak(verbose: bool) -> Vec<TestResult> {
    println!("--- Soak ---");
    let mut results = Vec::new();

    let plan: SoakPlan = match serde_json::from_str(SOAK_PLAN_JSON) {
        Ok(p) => p,
        Err(e) => {
            results.push(check("soak_plan", false, e.to_string()));
            return results;
        }
    };
    let Some(registry) = load_registry() else {
        results.push(check("soak_registry", false, "no destinations".into()));
        return results;
    };

    let w = &plan.weights;
    let actions = match WeightedIndex::new([w.pick_up, w.enter_zone, w.exit_zone, w.tick, w.damage]) {
        Ok(dist) => dist,
        Err(e) => {
            results.push(check("soak_weights", false, e.to_string()));
            return results;
        }
    };

    let mut rng = StdRng::seed_from_u64(plan.seed);
    let mut courier = seeded_courier(plan.seed);
    // Each zone is bound to one destination for the whole run.
    let zone_destinations: Vec<DestinationId> = (0..plan.zones)
        .filter_map(|_| registry.random(&mut rng).map(|d| d.id))
        .collect();

    let mut violations = Vec::new();
    let mut last_level = courier.experience().level();
    let mut last_capacity = courier.inventory().capacity();
    let mut delivered = 0u32;
    let mut streaks = 0u32;
    let mut longest_streak = 0u32;
    let mut timer_shortened = false;

    for step in 0..plan.steps {
        let action = actions.sample(&mut rng);
        let ticked = action == 3;
        match action {
            0 => {
                if let Some(d) = registry.random(&mut rng) {
                    courier.pick_up(i64::from(d.id.0));
                }
            }
            1 => {
                let zone = rng.gen_range(0..plan.zones);
                courier.enter_zone(zone, i64::from(zone_destinations[zone as usize].0));
            }
            2 => courier.exit_zone(rng.gen_range(0..plan.zones)),
            3 => courier.tick(rng.gen_range(plan.min_dt..=plan.max_dt)),
            _ => {
                courier.take_damage(1);
                courier.restore_full_health();
            }
        }
        if let Some(offered) = courier.rewards().offered() {
            if let Some(&track) = offered.choose(&mut rng) {
                courier.choose_track(track);
            }
        }

        let inv = courier.inventory();
        if inv.total_held() > inv.capacity() {
            violations.push(format!("step {}: held {} > {}", step, inv.total_held(), inv.capacity()));
        }
        if inv.capacity() < last_capacity {
            violations.push(format!("step {}: capacity shrank", step));
        }
        last_capacity = inv.capacity();
        let xp = courier.experience();
        if xp.current_xp() < 0 || xp.current_xp() >= xp.xp_to_next() {
            violations.push(format!(
                "step {}: xp {}/{}",
                step,
                xp.current_xp(),
                xp.xp_to_next()
            ));
        }
        if xp.level() < last_level {
            violations.push(format!("step {}: level went down", step));
        }
        last_level = xp.level();
        if courier.health().current() > courier.health().max() {
            violations.push(format!("step {}: hearts over max", step));
        }
        // A Delivery pick can shorten the timer under a running package; the
        // next tick hands that package over.
        if ticked {
            timer_shortened = false;
        }
        timer_shortened |= courier.pending_signals().iter().any(|s| {
            matches!(
                s,
                Signal::SkillLevelChanged {
                    track: SkillTrack::Delivery,
                    ..
                }
            )
        });
        let elapsed = courier.delivery().elapsed();
        let overdue = elapsed >= courier.delivery().required_duration(courier.skills());
        if elapsed < 0.0 || (overdue && !timer_shortened) {
            violations.push(format!("step {}: timer at {:.3}s", step, elapsed));
        }

        for signal in courier.drain_signals() {
            match signal {
                Signal::PackageDelivered { .. } => delivered += 1,
                Signal::StreakEnded(n) => {
                    streaks += 1;
                    longest_streak = longest_streak.max(n);
                    if n < 2 {
                        violations.push(format!("step {}: streak of {} announced", step, n));
                    }
                }
                _ => {}
            }
        }
    }

    if verbose {
        println!(
            "  {} deliveries, {} streaks (longest {}), level {}",
            delivered,
            streaks,
            longest_streak,
            courier.experience().level()
        );
        for track in SkillTrack::ALL {
            println!("  {:<9} lvl {}", track.name(), courier.skills().level(track));
        }
    }

    results.push(check(
        "soak_invariants",
        violations.is_empty(),
        if violations.is_empty() {
            format!("{} steps clean", plan.steps)
        } else {
            format!("{} violations, first: {}", violations.len(), violations[0])
        },
    ));
    results.push(check(
        "soak_made_progress",
        delivered > 0 && courier.experience().level() > 1,
        format!(
            "{} deliveries, reached level {}",
            delivered,
            courier.experience().level()
        ),
    ));

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_catalogue_is_not_usable() {
        assert!(usable_registry("[]").is_none());
        assert!(usable_registry("not json").is_none());
        assert!(usable_registry(DESTINATIONS_JSON).is_some());
    }

    #[test]
    fn shipped_soak_plan_parses() {
        let plan: SoakPlan = serde_json::from_str(SOAK_PLAN_JSON).expect("soak plan");
        assert!(plan.zones > 0 && plan.min_dt <= plan.max_dt);
    }
}
