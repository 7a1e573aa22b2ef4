//! Vacuum system - player movement, suction, charge, and the capture
//! animation that follows a depleting hit.

use hecs::{Entity, World};
use soulsweep_logic::constants::vacuum::CAPTURE_END_SCALE;
use soulsweep_logic::geometry::{lerp, Vec2};
use soulsweep_logic::upgrades::ConditionInputs;
use soulsweep_logic::vacuum::{capture_rotation, movement_speed, suction_damage, Nozzle};

use crate::components::{
    CaptureAnimation, CapturePhase, DamageOutcome, Player, Position, Projectile, Rotation, Scale,
    Soul, Vacuum,
};
use crate::events::CombatEvent;
use crate::host::{PlayerInput, TickContext};

use super::formation::deactivate_turrets;
use super::upgrades::Loadout;

/// The label fades out over the first half of the drift.
const LABEL_FADE: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
enum Target {
    Soul(Entity, Vec2),
    Projectile(Entity, Vec2),
}

pub fn capture_in_progress(world: &World) -> bool {
    world.query::<&CaptureAnimation>().iter().next().is_some()
}

pub fn vacuum_system(
    world: &mut World,
    ctx: &TickContext,
    input: &PlayerInput,
    loadout: &mut Loadout,
    events: &mut Vec<CombatEvent>,
) {
    if ctx.is_frozen() || capture_in_progress(world) {
        return;
    }

    let Some((player_entity, inputs)) = world
        .query::<(&Player, &Vacuum)>()
        .iter()
        .next()
        .map(|(entity, (player, vacuum))| {
            let inputs = ConditionInputs {
                stamina: player.stamina_fraction(),
                charge: vacuum.charge.fraction(),
            };
            (entity, inputs)
        })
    else {
        return;
    };

    loadout.evaluate(inputs);
    let multipliers = loadout.multipliers;
    let config = ctx.config;
    let delta = ctx.delta;

    // Move, aim, and decide whether suction runs this tick
    let nozzle = {
        let Ok((pos, player, vacuum)) =
            world.query_one_mut::<(&mut Position, &mut Player, &mut Vacuum)>(player_entity)
        else {
            return;
        };

        player.tick_invincibility(delta);

        let speed = movement_speed(
            config.player.base_speed,
            multipliers.speed,
            config.player.min_speed,
            config.player.max_speed,
        );
        let step = input.movement.clamp_length(1.0) * speed * delta;
        pos.0 = config.arena.clamp(pos.0 + step, config.player.half_size);
        vacuum.nozzle = Nozzle::aimed(pos.0, input.aim, vacuum.nozzle.facing);

        if !(input.suction && vacuum.charge.can_suction()) {
            vacuum.suction_active = false;
            vacuum.effects.clear();
            if vacuum.charge.refill(delta) {
                events.push(CombatEvent::ChargeRestored);
            }
            return;
        }
        vacuum.suction_active = true;
        vacuum.nozzle
    };

    let range = config.vacuum.range;
    let cone = config.vacuum.cone_degrees;
    let in_reach = |point: Vec2| nozzle.in_range(point, range) && nozzle.within_cone(point, cone);

    let mut targets = Vec::new();
    for (entity, (pos, soul)) in world.query::<(&Position, &Soul)>().iter() {
        if !soul.captured && in_reach(pos.0) {
            targets.push(Target::Soul(entity, pos.0));
        }
    }
    for (entity, (pos, projectile)) in world.query::<(&Position, &Projectile)>().iter() {
        if projectile.destructible && projectile.is_flying() && in_reach(pos.0) {
            targets.push(Target::Projectile(entity, pos.0));
        }
    }

    if let Ok(mut vacuum) = world.get::<&mut Vacuum>(player_entity) {
        vacuum.effects.resize(targets.len());
    }

    let damage = suction_damage(config.vacuum.base_damage, multipliers.power);
    let strength = config.vacuum.strength;

    for target in targets {
        match target {
            Target::Soul(entity, position) => {
                let outcome = match world.get::<&mut Soul>(entity) {
                    Ok(mut soul) if !soul.is_immune() => {
                        let outcome = soul.take_damage(damage);
                        if outcome != DamageOutcome::Ignored {
                            events.push(CombatEvent::SoulDamaged {
                                stamina: soul.stamina,
                            });
                        }
                        outcome
                    }
                    _ => continue,
                };

                if outcome == DamageOutcome::Depleted {
                    start_capture(world, entity, player_entity, position, &nozzle);
                    events.push(CombatEvent::CaptureStarted);
                    return;
                }
                nudge(world, entity, position, nozzle.tip, strength * delta);
            }
            Target::Projectile(entity, position) => {
                let direction = (nozzle.tip - position).normalize();
                if let Ok(mut projectile) = world.get::<&mut Projectile>(entity) {
                    projectile.redirect(direction, strength * config.vacuum.pull_factor, delta);
                }
                nudge(world, entity, position, nozzle.tip, strength * delta);
            }
        }
    }

    if let Ok(mut vacuum) = world.get::<&mut Vacuum>(player_entity) {
        if vacuum.charge.drain(delta) {
            events.push(CombatEvent::ChargeDepleted);
        }
    }
}

fn nudge(world: &mut World, entity: Entity, from: Vec2, tip: Vec2, distance: f32) {
    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
        pos.0 = from + (tip - from).normalize() * distance;
    }
}

fn start_capture(world: &mut World, soul: Entity, player: Entity, position: Vec2, nozzle: &Nozzle) {
    deactivate_turrets(world);

    if let Ok(mut vacuum) = world.get::<&mut Vacuum>(player) {
        vacuum.effects.resize(1);
    }

    let animation = CaptureAnimation {
        player,
        start: position,
        target_rotation: capture_rotation(position, nozzle),
        phase: CapturePhase::ToCentre { t: 0.0 },
        label_opacity: 1.0,
    };
    let _ = world.insert_one(soul, animation);
}

/// Drift the captured soul onto the nozzle, then into the container.
pub fn capture_system(world: &mut World, ctx: &TickContext, events: &mut Vec<CombatEvent>) {
    if ctx.is_frozen() {
        return;
    }

    let captures: Vec<(Entity, CaptureAnimation)> = world
        .query::<&CaptureAnimation>()
        .iter()
        .map(|(entity, capture)| (entity, *capture))
        .collect();

    let speed = ctx.config.vacuum.capture_speed;
    let inside_duration = ctx.config.vacuum.capture_inside_duration;

    for (soul, mut capture) in captures {
        let nozzle = match world.get::<&Vacuum>(capture.player) {
            Ok(vacuum) => vacuum.nozzle,
            Err(_) => continue,
        };

        let (position, scale, rotation) = match capture.phase {
            CapturePhase::ToCentre { t } => {
                let distance = capture.start.distance(&nozzle.tip);
                let t = if distance > f32::EPSILON {
                    (t + ctx.delta / distance * speed).min(1.0)
                } else {
                    1.0
                };
                capture.label_opacity = (1.0 - t / LABEL_FADE).max(0.0);
                capture.phase = if t >= 1.0 {
                    CapturePhase::ToInside { timer: 0.0 }
                } else {
                    CapturePhase::ToCentre { t }
                };
                (
                    Vec2::lerp(capture.start, nozzle.tip, t),
                    lerp(1.0, CAPTURE_END_SCALE, t),
                    lerp(0.0, capture.target_rotation, t),
                )
            }
            CapturePhase::ToInside { timer } => {
                let timer = (timer + ctx.delta).min(inside_duration);
                let progress = if inside_duration > 0.0 {
                    timer / inside_duration
                } else {
                    1.0
                };
                capture.phase = CapturePhase::ToInside { timer };
                if progress >= 1.0 {
                    let _ = world.remove_one::<CaptureAnimation>(soul);
                    events.push(CombatEvent::SoulCaptured);
                } else if let Ok(mut current) = world.get::<&mut CaptureAnimation>(soul) {
                    *current = capture;
                }
                if let Ok(mut pos) = world.get::<&mut Position>(soul) {
                    pos.0 = Vec2::lerp(nozzle.tip, nozzle.container(), progress);
                }
                continue;
            }
        };

        if let Ok(mut current) = world.get::<&mut CaptureAnimation>(soul) {
            *current = capture;
        }
        if let Ok(mut pos) = world.get::<&mut Position>(soul) {
            pos.0 = position;
        }
        if let Ok(mut s) = world.get::<&mut Scale>(soul) {
            s.0 = scale;
        }
        if let Ok(mut r) = world.get::<&mut Rotation>(soul) {
            r.0 = rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soulsweep_logic::attack_pattern::AttackPattern;
    use soulsweep_logic::config::CombatConfig;
    use soulsweep_logic::upgrades::{Comparator, ConditionSubject, ConditionalUpgrade, UpgradeCondition};
    use soulsweep_logic::vacuum::VacuumCharge;

    use crate::components::{Opacity, Turret, TurretState};
    use crate::host::HostState;
    use crate::systems::projectile::spawn_projectile;
    use crate::systems::turret::Shot;

    fn spawn_player(world: &mut World) -> Entity {
        world.spawn((
            Position(Vec2::ZERO),
            Player::new(10.0),
            Vacuum::new(VacuumCharge::new(5.0, 1.0, 0.8), 10),
        ))
    }

    fn spawn_soul(world: &mut World, position: Vec2, stamina: f32) -> Entity {
        let mut soul = Soul::new("Wisp", stamina, 0.1);
        soul.setup_complete = true;
        world.spawn((
            Position(position),
            Opacity::default(),
            Scale::default(),
            Rotation::default(),
            soul,
        ))
    }

    fn aim_right() -> PlayerInput {
        PlayerInput::suck_at(Vec2::new(5.0, -0.1))
    }

    #[test]
    fn test_suction_damages_soul_in_cone() {
        let config = CombatConfig::default();
        let ctx = TickContext::new(0.05, HostState::default(), &config);
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let soul = spawn_soul(&mut world, Vec2::new(2.0, -0.1), 10.0);
        let mut loadout = Loadout::default();
        let mut events = Vec::new();

        vacuum_system(&mut world, &ctx, &aim_right(), &mut loadout, &mut events);

        assert_eq!(world.get::<&Soul>(soul).unwrap().stamina, 9.0);
        // Pulled toward the nozzle
        assert!(world.get::<&Position>(soul).unwrap().0.x < 2.0);
        let vacuum = world.get::<&Vacuum>(player).unwrap();
        assert!(vacuum.suction_active);
        assert_eq!(vacuum.effects.active, 1);
        assert!((vacuum.charge.current - 4.95).abs() < 1e-5);
    }

    #[test]
    fn test_soul_outside_cone_is_untouched() {
        let config = CombatConfig::default();
        let ctx = TickContext::new(0.05, HostState::default(), &config);
        let mut world = World::new();
        spawn_player(&mut world);
        let behind = spawn_soul(&mut world, Vec2::new(-2.0, -0.1), 10.0);
        let mut events = Vec::new();

        vacuum_system(&mut world, &ctx, &aim_right(), &mut Loadout::default(), &mut events);
        assert_eq!(world.get::<&Soul>(behind).unwrap().stamina, 10.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_depleting_hit_starts_capture_once() {
        let config = CombatConfig::default();
        let ctx = TickContext::new(0.05, HostState::default(), &config);
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let soul = spawn_soul(&mut world, Vec2::new(2.0, -0.1), 1.0);
        let turret = world.spawn((
            Position(Vec2::new(0.0, 2.0)),
            Opacity::default(),
            Turret::new(vec![AttackPattern::default()], 6, 0.0),
        ));
        let mut events = Vec::new();

        vacuum_system(&mut world, &ctx, &aim_right(), &mut Loadout::default(), &mut events);
        assert!(capture_in_progress(&world));
        assert_eq!(world.get::<&Turret>(turret).unwrap().state, TurretState::Deactivating);
        assert_eq!(world.get::<&Vacuum>(player).unwrap().effects.active, 1);

        // The vacuum stands still while the animation runs
        let charge = world.get::<&Vacuum>(player).unwrap().charge.current;
        vacuum_system(&mut world, &ctx, &aim_right(), &mut Loadout::default(), &mut events);
        assert_eq!(world.get::<&Vacuum>(player).unwrap().charge.current, charge);

        let mut captured = 0;
        for _ in 0..200 {
            capture_system(&mut world, &ctx, &mut events);
            captured = events.iter().filter(|e| **e == CombatEvent::SoulCaptured).count();
        }
        assert_eq!(captured, 1);
        assert_eq!(events.iter().filter(|e| **e == CombatEvent::CaptureStarted).count(), 1);
        assert!(!capture_in_progress(&world));

        let tip = world.get::<&Vacuum>(player).unwrap().nozzle;
        let pos = world.get::<&Position>(soul).unwrap().0;
        assert!(pos.distance(&tip.container()) < 1e-4);
        assert!((world.get::<&Scale>(soul).unwrap().0 - CAPTURE_END_SCALE).abs() < 1e-5);
    }

    #[test]
    fn test_empty_charge_locks_out_until_floor_refill() {
        let config = CombatConfig::default();
        let ctx = TickContext::new(0.5, HostState::default(), &config);
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let mut events = Vec::new();
        let mut loadout = Loadout::default();

        for _ in 0..10 {
            vacuum_system(&mut world, &ctx, &aim_right(), &mut loadout, &mut events);
        }
        assert!(events.contains(&CombatEvent::ChargeDepleted));
        {
            let vacuum = world.get::<&Vacuum>(player).unwrap();
            assert_eq!(vacuum.charge.current, 0.0);
            assert!(vacuum.charge.recharging_from_empty);
        }

        // Holding the trigger refills instead of sucking while locked
        let mut ticks = 0;
        while world.get::<&Vacuum>(player).unwrap().charge.recharging_from_empty {
            vacuum_system(&mut world, &ctx, &aim_right(), &mut loadout, &mut events);
            assert!(!world.get::<&Vacuum>(player).unwrap().suction_active);
            ticks += 1;
            assert!(ticks < 100);
        }
        let vacuum = world.get::<&Vacuum>(player).unwrap();
        assert_eq!(vacuum.charge.current.floor(), vacuum.charge.maximum.floor());
        assert!(events.contains(&CombatEvent::ChargeRestored));
    }

    #[test]
    fn test_destructible_projectile_is_pulled() {
        let config = CombatConfig::default();
        let ctx = TickContext::new(0.05, HostState::default(), &config);
        let mut world = World::new();
        spawn_player(&mut world);
        let shot = Shot {
            origin: Vec2::new(2.0, 1.0),
            direction: Vec2::UP,
            speed: 2.0,
            damage: 1.0,
            destructible: true,
        };
        let projectile = spawn_projectile(&mut world, &shot, None);

        vacuum_system(&mut world, &ctx, &PlayerInput::suck_at(Vec2::new(2.0, 1.0)), &mut Loadout::default(), &mut Vec::new());
        let velocity = world.get::<&Projectile>(projectile).unwrap().velocity;
        assert!(velocity.x < 0.0);
        assert!(velocity.length() <= 2.0 + 1e-4);
    }

    #[test]
    fn test_conditional_upgrade_follows_charge() {
        let config = CombatConfig::default();
        let ctx = TickContext::new(0.5, HostState::default(), &config);
        let mut world = World::new();
        spawn_player(&mut world);
        let mut loadout = Loadout::default();
        loadout.conditionals.push(ConditionalUpgrade {
            condition: UpgradeCondition {
                subject: ConditionSubject::Charge,
                comparator: Comparator::Less,
                threshold: 50.0,
            },
            speed: 0.0,
            power: 20.0,
            active: false,
        });

        vacuum_system(&mut world, &ctx, &aim_right(), &mut loadout, &mut Vec::new());
        assert_eq!(loadout.multipliers.power, 1.0);

        for _ in 0..6 {
            vacuum_system(&mut world, &ctx, &aim_right(), &mut loadout, &mut Vec::new());
        }
        assert!(loadout.conditionals[0].active);
        assert!((loadout.multipliers.power - 1.2).abs() < 1e-5);
    }
}
