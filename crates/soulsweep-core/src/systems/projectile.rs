//! Projectile system - flight, player hits, and capture into the vacuum.

use hecs::{Entity, World};
use soulsweep_logic::constants::vacuum::PROJECTILE_END_SCALE;
use soulsweep_logic::geometry::{lerp, Vec2};
use soulsweep_logic::vacuum::Nozzle;

use crate::components::{
    DestroyHook, HitOutcome, OnDestroy, Player, Position, Projectile, ProjectileFate,
    ProjectileState, Scale, Vacuum,
};
use crate::events::CombatEvent;
use crate::host::TickContext;

use super::turret::Shot;
use super::vacuum::capture_in_progress;

pub fn spawn_projectile(world: &mut World, shot: &Shot, hook: Option<OnDestroy>) -> Entity {
    let projectile = Projectile::new(shot.direction, shot.speed, shot.damage, shot.destructible);
    let entity = world.spawn((Position(shot.origin), Scale::default(), projectile));
    if let Some(hook) = hook {
        let _ = world.insert_one(entity, DestroyHook(hook));
    }
    entity
}

/// Despawn a projectile, firing its destroy hook first. The hook is taken
/// off the entity, so it can only ever run once.
pub fn remove_projectile(world: &mut World, entity: Entity, fate: ProjectileFate) -> bool {
    if let Ok(hook) = world.remove_one::<DestroyHook>(entity) {
        (hook.0)(fate);
    }
    world.despawn(entity).is_ok()
}

/// Remove every projectile with [`ProjectileFate::Cleared`].
pub fn clear_projectiles(world: &mut World) -> usize {
    let entities: Vec<Entity> = world
        .query::<&Projectile>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    entities
        .into_iter()
        .filter(|entity| remove_projectile(world, *entity, ProjectileFate::Cleared))
        .count()
}

#[derive(Debug, Clone, Copy)]
struct Target {
    entity: Entity,
    position: Vec2,
    nozzle: Nozzle,
    suction: bool,
    invincible: bool,
}

/// The player is out of reach once defeated or while a soul is being
/// captured.
fn find_player(world: &World) -> Option<Target> {
    let capturing = capture_in_progress(world);
    world
        .query::<(&Position, &Player, &Vacuum)>()
        .iter()
        .next()
        .map(|(entity, (pos, player, vacuum))| Target {
            entity,
            position: pos.0,
            nozzle: vacuum.nozzle,
            suction: vacuum.suction_active,
            invincible: capturing || player.is_invincible() || player.defeated,
        })
}

/// Move projectiles and resolve what they touch.
pub fn projectile_system(world: &mut World, ctx: &TickContext, events: &mut Vec<CombatEvent>) {
    if ctx.is_frozen() {
        return;
    }

    let delta = ctx.delta;
    let arena = ctx.config.arena;
    let margin = ctx.config.turret.offscreen_margin;
    let hit_radius = ctx.config.player.hit_radius;
    let capture_radius = ctx.config.vacuum.capture_radius;
    let inside_duration = ctx.config.vacuum.projectile_inside_duration;

    let player = find_player(world);
    let mut invincible = player.map_or(true, |p| p.invincible);

    let mut removals: Vec<(Entity, ProjectileFate)> = Vec::new();
    let mut hits: Vec<(Entity, f32)> = Vec::new();
    let mut charge_gained = 0.0;

    for (entity, (projectile, pos, scale)) in
        world.query_mut::<(&mut Projectile, &mut Position, &mut Scale)>()
    {
        match projectile.state {
            ProjectileState::Flying => {
                pos.0 += projectile.velocity * delta;
                if arena.is_outside(pos.0, margin) {
                    removals.push((entity, ProjectileFate::Expired));
                    continue;
                }
                let Some(target) = player else {
                    continue;
                };
                if projectile.destructible
                    && target.suction
                    && pos.0.distance(&target.nozzle.tip) <= capture_radius
                {
                    projectile.state = ProjectileState::BeingCaptured;
                } else if !invincible && pos.0.distance(&target.position) <= hit_radius {
                    hits.push((entity, projectile.damage));
                    invincible = true;
                }
            }
            ProjectileState::BeingCaptured => {
                let Some(target) = player else {
                    continue;
                };
                pos.0 = pos.0.move_towards(target.nozzle.tip, projectile.speed * delta);
                if pos.0 == target.nozzle.tip {
                    projectile.state = ProjectileState::EnteringContainer { timer: 0.0 };
                    events.push(CombatEvent::ProjectileSucked);
                }
            }
            ProjectileState::EnteringContainer { timer } => {
                let Some(target) = player else {
                    continue;
                };
                let timer = (timer + delta).min(inside_duration);
                let t = if inside_duration > 0.0 {
                    timer / inside_duration
                } else {
                    1.0
                };
                pos.0 = Vec2::lerp(target.nozzle.tip, target.nozzle.container(), t);
                scale.0 = lerp(1.0, PROJECTILE_END_SCALE, t);
                projectile.state = ProjectileState::EnteringContainer { timer };
                if t >= 1.0 {
                    charge_gained += ctx.config.vacuum.charge_per_projectile;
                    removals.push((entity, ProjectileFate::Captured));
                }
            }
        }
    }

    if let Some(target) = player {
        if charge_gained > 0.0 {
            if let Ok(mut vacuum) = world.get::<&mut Vacuum>(target.entity) {
                vacuum.charge.add(charge_gained);
            }
        }

        for (projectile, damage) in hits {
            let outcome = match world.get::<&mut Player>(target.entity) {
                Ok(mut p) => {
                    let outcome = p.take_hit(damage, ctx.config.player.invincibility);
                    if outcome != HitOutcome::Ignored {
                        events.push(CombatEvent::PlayerHit {
                            damage,
                            stamina: p.stamina,
                        });
                    }
                    outcome
                }
                Err(_) => HitOutcome::Ignored,
            };
            match outcome {
                HitOutcome::Ignored => {}
                HitOutcome::Hurt => removals.push((projectile, ProjectileFate::HitPlayer)),
                HitOutcome::Defeated => {
                    removals.push((projectile, ProjectileFate::HitPlayer));
                    events.push(CombatEvent::PlayerDefeated);
                }
            }
        }
    }

    for (entity, fate) in removals {
        remove_projectile(world, entity, fate);
        events.push(CombatEvent::ProjectileRemoved(fate));
    }
}
