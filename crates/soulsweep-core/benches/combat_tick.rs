use criterion::{black_box, criterion_group, criterion_main, Criterion};
use soulsweep_core::prelude::*;
use soulsweep_logic::geometry::Vec2;
use soulsweep_logic::upgrades::{generate_board, Progress, UpgradeRules};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// An engine mid-fight against the largest formation in the roster.
fn busy_engine() -> CombatEngine {
    let mut engine = CombatEngine::with_seed(42);
    let token = engine
        .roster()
        .find("Banshee")
        .or_else(|| engine.roster().tokens().last());
    if let Some(token) = token {
        engine.start_combat(token);
    }
    // Walk on and let the turrets fill the arena
    for _ in 0..600 {
        engine.update(1.0 / 60.0, &PlayerInput::idle());
    }
    engine.drain_events();
    engine
}

fn bench_combat_tick(c: &mut Criterion) {
    let mut engine = busy_engine();
    let input = PlayerInput::suck_at(Vec2::new(5.0, 0.0));

    c.bench_function("combat_tick", |b| {
        b.iter(|| {
            engine.update(black_box(1.0 / 60.0), &input);
            engine.drain_events();
        })
    });

    c.bench_function("start_and_end_combat", |b| {
        let mut engine = CombatEngine::with_seed(7);
        let token = engine.roster().find("Revenant");
        b.iter(|| {
            if let Some(token) = token {
                engine.start_combat(black_box(token));
                engine.end_combat(CombatResult::Lose);
                engine.run.stun_timer = 0.0;
            }
        })
    });
}

fn bench_upgrade_board(c: &mut Criterion) {
    let rules = UpgradeRules::default();
    let mut rng = StdRng::seed_from_u64(42);

    c.bench_function("generate_board", |b| {
        b.iter(|| generate_board(&mut rng, &rules, black_box(Progress::new(3, 5))))
    });
}

criterion_group!(benches, bench_combat_tick, bench_upgrade_board);
criterion_main!(benches);
