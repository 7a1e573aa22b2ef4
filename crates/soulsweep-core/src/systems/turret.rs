//! Turret system - attack timing, bursts, pattern cycling and fades.

use hecs::{Entity, World};
use soulsweep_logic::attack_pattern::aim_towards;
use soulsweep_logic::geometry::Vec2;

use crate::components::{OnDestroy, Opacity, Position, Turret, TurretState};
use crate::events::CombatEvent;
use crate::host::TickContext;

use super::projectile::spawn_projectile;

/// One projectile to be spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub destructible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurretStep {
    Idle,
    Fired(Vec<Shot>),
    /// Fade-out finished; remove the turret.
    Despawn,
}

/// Fire, cool down, teleport or fade every turret, then spawn the shots.
pub fn turret_system(
    world: &mut World,
    ctx: &TickContext,
    player: Vec2,
    hook: Option<&OnDestroy>,
    events: &mut Vec<CombatEvent>,
) {
    if ctx.is_frozen() {
        return;
    }

    let fade_out = ctx.config.turret.fade_out;
    let mut shots = Vec::new();
    let mut finished: Vec<Entity> = Vec::new();

    for (entity, (turret, pos, opacity)) in
        world.query_mut::<(&mut Turret, &mut Position, &mut Opacity)>()
    {
        match advance_turret(turret, &mut pos.0, &mut opacity.0, player, ctx.delta, fade_out) {
            TurretStep::Idle => {}
            TurretStep::Fired(fired) => shots.extend(fired),
            TurretStep::Despawn => finished.push(entity),
        }
    }

    for entity in finished {
        let _ = world.despawn(entity);
    }

    if !shots.is_empty() {
        events.push(CombatEvent::ProjectileFired { count: shots.len() });
        for shot in &shots {
            spawn_projectile(world, shot, hook.cloned());
        }
    }
}

/// Step one turret's state machine by `delta` seconds.
pub fn advance_turret(
    turret: &mut Turret,
    position: &mut Vec2,
    opacity: &mut f32,
    player: Vec2,
    delta: f32,
    fade_out: f32,
) -> TurretStep {
    match turret.state {
        TurretState::Attacking => attack(turret, *position, player, delta),
        TurretState::BurstCooldown => {
            cool_down(turret, delta);
            TurretStep::Idle
        }
        TurretState::Teleporting => {
            let done = match turret.teleport.as_mut() {
                Some(fade) => fade.advance(delta, position, opacity),
                None => true,
            };
            if done {
                turret.teleport = None;
                *opacity = 1.0;
                // A spent burst still owes its cooldown; the timer kept running
                // from before the fade.
                if burst_spent(turret) {
                    turret.state = TurretState::BurstCooldown;
                } else {
                    turret.state = TurretState::Attacking;
                    turret.timer = 0.0;
                }
            }
            TurretStep::Idle
        }
        TurretState::Deactivating => {
            turret.timer += delta;
            *opacity = if fade_out > 0.0 {
                1.0 - (turret.timer / fade_out).min(1.0)
            } else {
                0.0
            };
            if turret.timer >= fade_out {
                TurretStep::Despawn
            } else {
                TurretStep::Idle
            }
        }
    }
}

fn attack(turret: &mut Turret, position: Vec2, player: Vec2, delta: f32) -> TurretStep {
    let index = turret.current_attack;
    let Some(pattern) = turret.attacks.get(index) else {
        return TurretStep::Idle;
    };

    turret.timer += delta;
    if turret.timer < pattern.time_between_attacks {
        return TurretStep::Idle;
    }
    turret.timer = 0.0;

    let first_of_burst = turret.attacks_launched == 0;
    let Some(points) = turret.spawn_sets.get_mut(index) else {
        return TurretStep::Idle;
    };

    if pattern.track_player && first_of_burst {
        *points = pattern.spawn_points(aim_towards(position, player));
    }

    let damage = pattern.damage + turret.damage_bonus;
    let kinds = turret.kinds.get(index).map(Vec::as_slice).unwrap_or(&[]);
    let shots = points
        .iter()
        .zip(kinds)
        .map(|(offset, kind)| Shot {
            origin: position + *offset,
            direction: offset.normalize(),
            speed: pattern.projectile_speed,
            damage,
            destructible: kind.is_destructible(),
        })
        .collect();

    // Fixed patterns turn a little further after the opening attack of
    // every burst, so the rotation accumulates.
    if !pattern.track_player && first_of_burst && pattern.attack_rotation != 0.0 {
        for point in points.iter_mut() {
            *point = point.rotate(pattern.attack_rotation);
        }
    }

    turret.attacks_launched += 1;
    if turret.attacks_launched >= pattern.attacks_per_burst {
        turret.state = TurretState::BurstCooldown;
    }
    TurretStep::Fired(shots)
}

fn burst_spent(turret: &Turret) -> bool {
    turret
        .pattern()
        .is_some_and(|pattern| turret.attacks_launched >= pattern.attacks_per_burst)
}

fn cool_down(turret: &mut Turret, delta: f32) {
    let Some(pattern) = turret.attacks.get(turret.current_attack) else {
        turret.state = TurretState::Attacking;
        return;
    };

    turret.timer += delta;
    if turret.timer < pattern.time_between_bursts {
        return;
    }

    turret.timer = 0.0;
    turret.attacks_launched = 0;
    turret.bursts += 1;
    if turret.bursts >= pattern.bursts_before_change() {
        turret.bursts = 0;
        turret.current_attack = (turret.current_attack + 1) % turret.attacks.len();
        turret.teleport_countdown = turret.teleport_countdown.saturating_sub(1);
    }
    turret.state = TurretState::Attacking;
}
