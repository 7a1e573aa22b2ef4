//! Sanity sweep for SoulSweep's combat rules.
//!
//! Loads the built-in soul roster, checks that the patterns, formations,
//! prices and charge rules it drives are well formed, and then lets a
//! simple autopilot fight every soul in the roster. Any failed check makes
//! the process exit with status 1, so CI can run it as is.
//!
//!   cargo run -p soulsweep-simtest -- [--verbose] [--seed N]

use rand::rngs::StdRng;
use rand::SeedableRng;
use soulsweep_core::prelude::*;
use soulsweep_logic::attack_pattern::MUZZLE_OFFSET;
use soulsweep_logic::config::CombatConfig;
use soulsweep_logic::formation::FormationArea;
use soulsweep_logic::geometry::Vec2;
use soulsweep_logic::roster::Roster;
use soulsweep_logic::upgrades::{generate_offer, Progress, UpgradeRules};
use soulsweep_logic::vacuum::VacuumCharge;

const TICK: f32 = 1.0 / 60.0;
/// Longest a scripted encounter may run, in seconds.
const ENCOUNTER_LIMIT: f32 = 120.0;

// ── Checks ──────────────────────────────────────────────────────────────

/// Outcome of one named check.
struct Check {
    name: String,
    ok: bool,
    detail: String,
}

/// Print the checks and return how many failed. Passing checks are only
/// listed with `--verbose`.
fn report(checks: &[Check], verbose: bool) -> usize {
    let failures: Vec<&Check> = checks.iter().filter(|c| !c.ok).collect();
    if verbose {
        for check in checks.iter().filter(|c| c.ok) {
            println!("  ok    {:<40} {}", check.name, check.detail);
        }
    }
    for check in &failures {
        println!("  FAIL  {:<40} {}", check.name, check.detail);
    }
    println!("\n{} checks, {} failed", checks.len(), failures.len());
    failures.len()
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    println!("soulsweep-simtest, seed {}\n", seed);

    let mut results = Vec::new();

    // 1. Roster data
    let roster = match Roster::builtin() {
        Ok(roster) => {
            results.extend(validate_roster(&roster));
            Some(roster)
        }
        Err(e) => {
            results.push(Check {
                name: "roster_parse".into(),
                ok: false,
                detail: format!("built-in roster failed to load: {}", e),
            });
            None
        }
    };

    // 2. Attack pattern geometry
    if let Some(roster) = &roster {
        results.extend(validate_attack_patterns(roster));
    }

    // 3. Formations
    results.extend(validate_formations(seed));

    // 4. Upgrade pricing
    results.extend(validate_upgrade_pricing(seed));

    // 5. Vacuum charge
    results.extend(validate_charge());

    // 6. Config round trip
    results.extend(validate_config());

    // 7. Scripted encounters
    if let Some(roster) = &roster {
        results.extend(run_encounters(roster, seed, verbose));
    }

    println!();
    if report(&results, verbose) > 0 {
        std::process::exit(1);
    }
}

// ── 1. Roster ───────────────────────────────────────────────────────────

fn validate_roster(roster: &Roster) -> Vec<Check> {
    println!("--- Soul Roster ---");
    let mut results = Vec::new();

    results.push(Check {
        name: "roster_levels".into(),
        ok: roster.total_levels() >= 1,
        detail: format!(
            "{} levels, {} souls",
            roster.total_levels(),
            roster.soul_count()
        ),
    });

    let unarmed: Vec<&str> = roster
        .levels
        .iter()
        .flatten()
        .filter(|soul| soul.turrets.is_empty())
        .map(|soul| soul.name.as_str())
        .collect();
    results.push(Check {
        name: "roster_every_soul_has_turrets".into(),
        ok: unarmed.is_empty(),
        detail: if unarmed.is_empty() {
            "every soul has at least one turret".into()
        } else {
            format!("souls without turrets: {}", unarmed.join(", "))
        },
    });

    let mut empty_turrets = Vec::new();
    for soul in roster.levels.iter().flatten() {
        for (i, turret) in soul.turrets.iter().enumerate() {
            if turret.usable_attacks().is_empty() {
                empty_turrets.push(format!("{}#{}", soul.name, i));
            }
        }
    }
    results.push(Check {
        name: "roster_turrets_have_attacks".into(),
        ok: empty_turrets.is_empty(),
        detail: if empty_turrets.is_empty() {
            "every turret has a usable attack".into()
        } else {
            format!("turrets without attacks: {}", empty_turrets.join(", "))
        },
    });

    let unpaid: Vec<&str> = roster
        .levels
        .iter()
        .flatten()
        .filter(|soul| soul.bounty == 0 || soul.time_bonus <= 0.0)
        .map(|soul| soul.name.as_str())
        .collect();
    results.push(Check {
        name: "roster_rewards".into(),
        ok: unpaid.is_empty(),
        detail: if unpaid.is_empty() {
            "every soul pays a bounty and a time bonus".into()
        } else {
            format!("souls without rewards: {}", unpaid.join(", "))
        },
    });

    // Later levels should be at least as tough as earlier ones
    let toughest: Vec<f32> = roster
        .levels
        .iter()
        .map(|level| level.iter().map(|s| s.stamina).fold(0.0, f32::max))
        .collect();
    let rising = toughest.windows(2).all(|w| w[1] >= w[0]);
    results.push(Check {
        name: "roster_difficulty_curve".into(),
        ok: rising,
        detail: format!("toughest soul per level: {:?}", toughest),
    });

    results
}

// ── 2. Attack Patterns ──────────────────────────────────────────────────

fn validate_attack_patterns(roster: &Roster) -> Vec<Check> {
    println!("--- Attack Patterns ---");
    let mut results = Vec::new();

    let patterns: Vec<_> = roster
        .levels
        .iter()
        .flatten()
        .flat_map(|soul| soul.turrets.iter())
        .flat_map(|turret| turret.usable_attacks())
        .collect();

    let mismatched = patterns
        .iter()
        .filter(|p| {
            let points = p.spawn_points(MUZZLE_OFFSET);
            points.len() != p.projectile_count() || p.projectile_kinds().len() != points.len()
        })
        .count();
    results.push(Check {
        name: "patterns_spawn_counts".into(),
        ok: mismatched == 0,
        detail: format!(
            "{} patterns, {} with mismatched spawn/kind counts",
            patterns.len(),
            mismatched
        ),
    });

    let bad_offsets = patterns
        .iter()
        .flat_map(|p| p.spawn_points(MUZZLE_OFFSET))
        .filter(|point| (point.length() - MUZZLE_OFFSET.length()).abs() > 1e-3)
        .count();
    results.push(Check {
        name: "patterns_offsets_on_muzzle_circle".into(),
        ok: bad_offsets == 0,
        detail: format!("{} offsets off the muzzle circle", bad_offsets),
    });

    let slow = patterns
        .iter()
        .filter(|p| p.projectile_speed <= 0.0 || p.damage <= 0.0)
        .count();
    results.push(Check {
        name: "patterns_positive_speed_and_damage".into(),
        ok: slow == 0,
        detail: format!("{} patterns with non-positive speed or damage", slow),
    });

    let destructible = patterns
        .iter()
        .filter(|p| p.projectile_kinds().iter().any(|k| k.is_destructible()))
        .count();
    results.push(Check {
        name: "patterns_feed_the_vacuum".into(),
        ok: destructible > 0,
        detail: format!("{} patterns fire destructible projectiles", destructible),
    });

    results
}

// ── 3. Formations ───────────────────────────────────────────────────────

fn validate_formations(seed: u64) -> Vec<Check> {
    println!("--- Formations ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut worst_gap = 0.0f32;
    let mut off_perimeter = 0;
    let mut checked = 0;
    for _ in 0..200 {
        let area = FormationArea::random(&mut rng, false);
        for count in 1..=8 {
            let slots = area.slots(count);
            checked += 1;
            let arcs: Vec<f32> = slots.iter().map(|s| area.arc_position(*s)).collect();
            let mut total = 0.0;
            for i in 0..arcs.len() {
                let next = arcs[(i + 1) % arcs.len()];
                let mut gap = next - arcs[i];
                if gap <= 0.0 {
                    gap += area.perimeter();
                }
                total += gap;
            }
            worst_gap = worst_gap.max((total - area.perimeter()).abs());

            let hw = area.width * 0.5;
            let hh = area.height * 0.5;
            off_perimeter += slots
                .iter()
                .filter(|s| {
                    let on_x = (s.x.abs() - hw).abs() < 1e-3 && s.y.abs() <= hh + 1e-3;
                    let on_y = (s.y.abs() - hh).abs() < 1e-3 && s.x.abs() <= hw + 1e-3;
                    !(on_x || on_y)
                })
                .count();
        }
    }

    results.push(Check {
        name: "formation_arcs_sum_to_perimeter".into(),
        ok: worst_gap < 1e-2,
        detail: format!("{} formations, worst error {:.5}", checked, worst_gap),
    });
    results.push(Check {
        name: "formation_slots_on_perimeter".into(),
        ok: off_perimeter == 0,
        detail: format!("{} slots off the rectangle", off_perimeter),
    });

    let square_ok = (0..100).all(|_| {
        let area = FormationArea::random(&mut rng, true);
        area.width == area.height && (3.0..8.0).contains(&area.height)
    });
    results.push(Check {
        name: "formation_square_mode".into(),
        ok: square_ok,
        detail: "square formations keep width == height in [3, 8)".into(),
    });

    results
}

// ── 4. Upgrade Pricing ──────────────────────────────────────────────────

fn validate_upgrade_pricing(seed: u64) -> Vec<Check> {
    println!("--- Upgrade Pricing ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let rules = UpgradeRules::default();

    let mut offers = Vec::new();
    for level in 1..=5 {
        for _ in 0..500 {
            offers.push(generate_offer(&mut rng, &rules, Progress::new(level, 5)));
        }
    }

    let off_grid = offers.iter().filter(|o| o.cost % 5 != 0).count();
    results.push(Check {
        name: "upgrade_costs_multiple_of_five".into(),
        ok: off_grid == 0,
        detail: format!("{} offers, {} off the 5 grid", offers.len(), off_grid),
    });

    let multi_drawback = offers
        .iter()
        .filter(|o| o.bonuses.drawback_count() > 1)
        .count();
    results.push(Check {
        name: "upgrade_single_drawback".into(),
        ok: multi_drawback == 0,
        detail: format!("{} offers with more than one drawback", multi_drawback),
    });

    let conditional = offers.iter().filter(|o| o.is_conditional()).count();
    let share = conditional as f64 / offers.len() as f64;
    results.push(Check {
        name: "upgrade_conditional_share".into(),
        ok: (share - rules.conditional_weight).abs() < 0.05,
        detail: format!(
            "{:.1}% conditional (target {:.0}%)",
            share * 100.0,
            rules.conditional_weight * 100.0
        ),
    });

    results
}

// ── 5. Vacuum Charge ────────────────────────────────────────────────────

fn validate_charge() -> Vec<Check> {
    println!("--- Vacuum Charge ---");
    let mut results = Vec::new();
    let mut charge = VacuumCharge::default();

    let mut in_bounds = true;
    let mut drained_at = None;
    for tick in 0..1000 {
        if charge.drain(TICK) {
            drained_at = Some(tick);
            break;
        }
        in_bounds &= (0.0..=charge.maximum).contains(&charge.current);
    }
    results.push(Check {
        name: "charge_drains_to_zero".into(),
        ok: drained_at.is_some() && charge.current == 0.0 && charge.recharging_from_empty,
        detail: format!("emptied after {:?} ticks", drained_at),
    });

    let mut locked_ticks = 0;
    while !charge.can_suction() && locked_ticks < 10_000 {
        charge.refill(TICK);
        in_bounds &= (0.0..=charge.maximum).contains(&charge.current);
        locked_ticks += 1;
    }
    results.push(Check {
        name: "charge_lockout_until_full".into(),
        ok: charge.current.floor() == charge.maximum.floor() && in_bounds,
        detail: format!(
            "locked for {:.2}s, released at {:.2}/{:.2}",
            locked_ticks as f32 * TICK,
            charge.current,
            charge.maximum
        ),
    });

    results
}

// ── 6. Config ───────────────────────────────────────────────────────────

fn validate_config() -> Vec<Check> {
    println!("--- Config ---");
    let mut results = Vec::new();
    let config = CombatConfig::default();

    let roundtrip = config
        .to_json()
        .and_then(|json| CombatConfig::from_json(&json))
        .map(|parsed| format!("{:?}", parsed) == format!("{:?}", config));
    results.push(Check {
        name: "config_json_roundtrip".into(),
        ok: matches!(roundtrip, Ok(true)),
        detail: match roundtrip {
            Ok(same) => format!("round trip identical: {}", same),
            Err(e) => format!("config error: {}", e),
        },
    });

    let partial = CombatConfig::from_json(r#"{ "vacuum": { "range": 6.0 } }"#);
    let partial_ok = partial
        .as_ref()
        .map(|c| c.vacuum.range == 6.0 && c.vacuum.cone_degrees == config.vacuum.cone_degrees)
        .unwrap_or(false);
    results.push(Check {
        name: "config_partial_overrides".into(),
        ok: partial_ok,
        detail: "missing fields fall back to defaults".into(),
    });

    let sections = serde_json::to_value(&config)
        .ok()
        .and_then(|v| v.as_object().map(|o| o.len()))
        .unwrap_or(0);
    results.push(Check {
        name: "config_sections".into(),
        ok: sections == 7,
        detail: format!("{} tuning sections", sections),
    });

    results
}

// ── 7. Scripted Encounters ──────────────────────────────────────────────

/// Chase the soul to just outside its flee radius and keep sucking.
fn autopilot(engine: &CombatEngine) -> PlayerInput {
    let (Some(player), Some(soul)) = (engine.player_position(), engine.soul_position()) else {
        return PlayerInput::idle();
    };
    let to_soul = soul - player;
    let movement = if to_soul.length() > 2.5 {
        to_soul.normalize()
    } else {
        Vec2::ZERO
    };
    PlayerInput {
        movement,
        aim: soul,
        suction: true,
    }
}

struct EncounterLog {
    result: Option<CombatResult>,
    seconds: f32,
    shots: usize,
    hits: usize,
    violations: Vec<String>,
}

fn play_encounter(engine: &mut CombatEngine, name: &str) -> Option<EncounterLog> {
    let token = engine.roster().find(name)?;
    engine.run.run_clock = ENCOUNTER_LIMIT * 2.0;
    if !engine.start_combat(token) {
        return None;
    }

    let mut log = EncounterLog {
        result: None,
        seconds: 0.0,
        shots: 0,
        hits: 0,
        violations: Vec::new(),
    };
    let mut last_stamina = f32::INFINITY;

    while engine.in_combat() && log.seconds < ENCOUNTER_LIMIT {
        let input = autopilot(engine);
        engine.update(TICK, &input);
        log.seconds += TICK;

        for event in engine.drain_events() {
            match event {
                CombatEvent::ProjectileFired { count } => log.shots += count,
                CombatEvent::PlayerHit { .. } => log.hits += 1,
                CombatEvent::CombatEnded(result) => log.result = Some(result),
                _ => {}
            }
        }

        if let Some((stamina, _)) = engine.soul_stamina() {
            if stamina > last_stamina || stamina < 0.0 {
                log.violations.push(format!("soul stamina {} -> {}", last_stamina, stamina));
            }
            last_stamina = stamina;
        }
        if let Some((charge, max)) = engine.player_charge() {
            if !(0.0..=max).contains(&charge) {
                log.violations.push(format!("charge {} outside [0, {}]", charge, max));
            }
        }
    }

    Some(log)
}

fn run_encounters(roster: &Roster, seed: u64, verbose: bool) -> Vec<Check> {
    println!("--- Scripted Encounters ---");
    let mut results = Vec::new();

    let names: Vec<String> = roster
        .levels
        .iter()
        .flatten()
        .map(|soul| soul.name.clone())
        .collect();

    let mut resolved = 0;
    for (i, name) in names.iter().enumerate() {
        let mut engine = CombatEngine::with_seed(seed + i as u64);
        let Some(log) = play_encounter(&mut engine, name) else {
            results.push(Check {
                name: format!("encounter_{}", name.to_lowercase()),
                ok: false,
                detail: "combat did not start".into(),
            });
            continue;
        };

        if log.result.is_some() {
            resolved += 1;
        }
        if verbose {
            println!(
                "  {}: {:?} after {:.1}s, {} shots, {} hits",
                name, log.result, log.seconds, log.shots, log.hits
            );
        }
        results.push(Check {
            name: format!("encounter_{}", name.to_lowercase()),
            ok: log.violations.is_empty() && log.shots > 0,
            detail: if log.violations.is_empty() {
                format!(
                    "{:?} after {:.1}s ({} shots, {} hits)",
                    log.result, log.seconds, log.shots, log.hits
                )
            } else {
                log.violations.join("; ")
            },
        });
    }
    results.push(Check {
        name: "encounters_resolved".into(),
        ok: true,
        detail: format!("{}/{} encounters resolved within {}s", resolved, names.len(), ENCOUNTER_LIMIT),
    });

    // A forced one-hit capture must pay out exactly once
    let mut engine = CombatEngine::with_seed(seed);
    let payout = forced_capture(&mut engine);
    results.push(Check {
        name: "encounter_forced_capture_pays_once".into(),
        ok: payout == Some(engine.roster().levels[0][0].bounty),
        detail: format!("wallet after capture: {:?}", payout),
    });

    results
}

/// Start against the first soul, drop its stamina to one hit and hold the
/// nozzle on it until the capture resolves.
fn forced_capture(engine: &mut CombatEngine) -> Option<u32> {
    let first = engine.roster().tokens().next()?;
    engine.start_combat(first);
    while engine.host.transition != Transition::None {
        engine.update(TICK, &PlayerInput::idle());
    }

    let encounter = *engine.encounter()?;
    let player = engine.player_position()?;
    {
        let mut soul = engine.world.get::<&mut Soul>(encounter.soul).ok()?;
        soul.stamina = 1.0;
        soul.damage_cooldown = 0.0;
        soul.teleport = SoulTeleport::Idle;
    }
    engine.world.get::<&mut Position>(encounter.soul).ok()?.0 = player + Vec2::new(2.0, -0.1);

    let input = PlayerInput::suck_at(player + Vec2::new(8.0, -0.1));
    for _ in 0..600 {
        engine.update(TICK, &input);
        if !engine.in_combat() {
            break;
        }
    }
    // A second end is ignored
    engine.end_combat(CombatResult::Win);
    Some(engine.run.wallet.balance)
}
