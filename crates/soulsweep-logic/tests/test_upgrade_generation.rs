//! Integration tests for the upgrade pipeline.
//!
//! Exercises: Progress → generate_board → purchase → StatMultipliers
//! → ConditionalUpgrade evaluation over a simulated combat.
//!
//! All tests are pure logic - no ECS, no engine.

use rand::rngs::StdRng;
use rand::SeedableRng;
use soulsweep_logic::difficulty::max_bonus_steps;
use soulsweep_logic::upgrades::{
    evaluate_conditionals, generate_board, generate_offer, Attribute, Comparator,
    ConditionInputs, ConditionSubject, ConditionalUpgrade, Progress, StatMultipliers,
    UpgradeRules,
};
use soulsweep_logic::vacuum::{effective_max_charge, starting_stamina, VacuumCharge};

// ── Helpers ────────────────────────────────────────────────────────────

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn max_bonus(attribute: Attribute, rules: &UpgradeRules, progress: Progress) -> f32 {
    let steps = if attribute == Attribute::Speed {
        rules.max_speed_steps
    } else {
        max_bonus_steps(rules.bonus_cap, progress.level, progress.total_levels)
    };
    steps.max(2) as f32 * 5.0
}

// ── Generation ─────────────────────────────────────────────────────────

#[test]
fn bonuses_grow_with_progress_but_stay_capped() {
    let rules = UpgradeRules {
        conditional_weight: 0.0,
        ..Default::default()
    };
    let mut rng = rng(11);

    for level in 1..=6 {
        let progress = Progress::new(level, 3);
        for _ in 0..200 {
            let offer = generate_offer(&mut rng, &rules, progress);
            for (attribute, value) in offer.bonuses.entries().filter(|(_, v)| *v > 0.0) {
                assert!(value >= 10.0);
                assert!(value <= max_bonus(attribute, &rules, progress));
            }
        }
    }
}

#[test]
fn large_bonuses_sometimes_carry_a_drawback() {
    let rules = UpgradeRules {
        conditional_weight: 0.0,
        ..Default::default()
    };
    let mut rng = rng(5);
    let mut seen_drawback = false;

    for _ in 0..2000 {
        let offer = generate_offer(&mut rng, &rules, Progress::new(3, 3));
        let positive = offer
            .bonuses
            .entries()
            .find(|(_, v)| *v > 0.0)
            .map(|(_, v)| v)
            .unwrap_or(0.0);

        if offer.bonuses.drawback_count() == 1 {
            seen_drawback = true;
            assert!(positive >= 50.0);
            let negative = offer
                .bonuses
                .entries()
                .find(|(_, v)| *v < 0.0)
                .map(|(_, v)| v)
                .unwrap_or(0.0);
            assert_eq!(negative, -((positive * 0.5 / 10.0).floor() * 10.0));
            assert_eq!(offer.cost % 5, 0);
        } else {
            assert_eq!(offer.cost, positive as u32 * 5);
        }
    }
    assert!(seen_drawback);
}

#[test]
fn conditional_offers_follow_threshold_ranges() {
    let rules = UpgradeRules {
        conditional_weight: 1.0,
        ..Default::default()
    };
    let mut rng = rng(8);

    for _ in 0..1000 {
        let offer = generate_offer(&mut rng, &rules, Progress::new(2, 3));
        let condition = offer.condition.expect("always conditional");
        assert_eq!(offer.bonuses.stamina, 0.0);
        assert_eq!(offer.bonuses.capacity, 0.0);

        match (condition.subject, condition.comparator) {
            (ConditionSubject::Stamina, Comparator::Equal) => {
                assert_eq!(condition.threshold, 100.0)
            }
            (ConditionSubject::Stamina, Comparator::Less) => {
                assert!((25.0..=50.0).contains(&condition.threshold))
            }
            (ConditionSubject::Stamina, Comparator::Greater) => {
                assert!((50.0..=75.0).contains(&condition.threshold))
            }
            (ConditionSubject::Charge, Comparator::Less) => {
                assert!((10.0..=50.0).contains(&condition.threshold))
            }
            (ConditionSubject::Charge, Comparator::Greater) => {
                assert!((50.0..=90.0).contains(&condition.threshold))
            }
            (ConditionSubject::Charge, Comparator::Equal) => {
                panic!("charge conditions never use Equal")
            }
        }
        assert_eq!(offer.cost % 5, 0);
    }
}

// ── Purchases and conditionals ─────────────────────────────────────────

#[test]
fn buying_a_board_changes_player_stats() {
    let rules = UpgradeRules {
        conditional_weight: 0.0,
        ..Default::default()
    };
    let mut rng = rng(21);
    let board = generate_board(&mut rng, &rules, Progress::new(1, 3));
    let mut stats = StatMultipliers::default();
    for offer in &board {
        stats.apply(&offer.bonuses);
    }

    let stamina = starting_stamina(50.0, stats.stamina);
    let capacity = effective_max_charge(5.0, stats.capacity);
    assert!(stamina >= 1.0);
    assert!(capacity >= 1.0);
}

#[test]
fn conditional_upgrades_toggle_over_a_drain_cycle() {
    let rules = UpgradeRules {
        conditional_weight: 1.0,
        ..Default::default()
    };
    let mut rng = rng(34);
    let mut upgrades: Vec<ConditionalUpgrade> = (0..6)
        .map(|_| generate_offer(&mut rng, &rules, Progress::new(3, 3)))
        .filter_map(|offer| ConditionalUpgrade::from_offer(&offer))
        .collect();
    assert_eq!(upgrades.len(), 6);

    let mut stats = StatMultipliers::default();
    let mut charge = VacuumCharge::default();

    // Drain to empty, then refill, evaluating every tick
    for tick in 0..2000 {
        if tick < 600 {
            charge.drain(0.01);
        } else {
            charge.refill(0.01);
        }
        let inputs = ConditionInputs {
            stamina: if tick % 3 == 0 { 1.0 } else { 0.4 },
            charge: charge.fraction(),
        };
        evaluate_conditionals(&mut upgrades, inputs, &mut stats);
    }

    // Multipliers equal the baseline plus exactly the upgrades still active
    let active_speed: f32 = upgrades.iter().filter(|u| u.active).map(|u| u.speed * 0.01).sum();
    let active_power: f32 = upgrades.iter().filter(|u| u.active).map(|u| u.power * 0.01).sum();
    assert!((stats.speed - (1.0 + active_speed)).abs() < 1e-3);
    assert!((stats.power - (1.0 + active_power)).abs() < 1e-3);

    // Greater and Equal conditions stop holding below zero and retract
    let off = ConditionInputs {
        stamina: -1.0,
        charge: -1.0,
    };
    for upgrade in upgrades.iter_mut() {
        if upgrade.condition.comparator == Comparator::Less {
            // Less-than conditions still hold at a negative fraction
            continue;
        }
        upgrade.evaluate(off.fraction(upgrade.condition.subject), &mut stats);
        assert!(!upgrade.active);
    }
}
