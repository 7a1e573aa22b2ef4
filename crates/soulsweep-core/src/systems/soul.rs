//! Soul AI - flee, wander, and teleport away from walls.

use hecs::World;
use rand::Rng;
use soulsweep_logic::config::SoulTuning;
use soulsweep_logic::geometry::{ArenaBounds, Vec2};

use crate::components::{FadeTeleport, Opacity, Position, Soul, SoulTeleport, Wander};
use crate::events::CombatEvent;
use crate::host::TickContext;

pub fn soul_system(
    world: &mut World,
    ctx: &TickContext,
    player: Vec2,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) {
    if ctx.is_frozen() {
        return;
    }

    let tuning = &ctx.config.soul;
    let arena = ctx.config.arena;

    for (_, (soul, pos, opacity)) in world.query_mut::<(&mut Soul, &mut Position, &mut Opacity)>() {
        soul.tick_cooldown(ctx.delta);
        if soul.captured || !soul.setup_complete {
            continue;
        }
        if step_soul(soul, &mut pos.0, &mut opacity.0, player, ctx.delta, tuning, arena, rng) {
            events.push(CombatEvent::SoulTeleportStarted);
        }
    }
}

/// Advance one soul. Returns true when a teleport wind-up began.
#[allow(clippy::too_many_arguments)]
pub fn step_soul(
    soul: &mut Soul,
    position: &mut Vec2,
    opacity: &mut f32,
    player: Vec2,
    delta: f32,
    tuning: &SoulTuning,
    arena: ArenaBounds,
    rng: &mut impl Rng,
) -> bool {
    match soul.teleport {
        SoulTeleport::Idle => {}
        SoulTeleport::WindUp { timer, destination } => {
            let timer = timer + delta;
            soul.teleport = if timer >= tuning.teleport_delay {
                SoulTeleport::Fading(FadeTeleport::new(destination, tuning.teleport_fade))
            } else {
                SoulTeleport::WindUp { timer, destination }
            };
            return false;
        }
        SoulTeleport::Fading(mut fade) => {
            if fade.advance(delta, position, opacity) {
                soul.teleport = SoulTeleport::Idle;
                soul.flee_decay = 0.0;
                *opacity = 1.0;
            } else {
                soul.teleport = SoulTeleport::Fading(fade);
            }
            return false;
        }
    }

    let fleeing = position.distance(&player) < tuning.flee_distance;
    let mut heading = None;

    if fleeing {
        let mut away = (*position - player).normalize();
        if away == Vec2::ZERO {
            away = Vec2::RIGHT;
        }
        *position += away * tuning.speed * delta;
        soul.flee_decay = 1.0;
        soul.wander = None;
    } else {
        let wander = soul.wander.get_or_insert_with(|| random_wander(rng, tuning));
        wander.timer += delta;
        *position += wander.direction * tuning.speed * delta;
        heading = Some(wander.direction);
        if wander.timer >= wander.duration {
            soul.wander = None;
        }
        soul.flee_decay = (soul.flee_decay - delta).max(0.0);
    }

    let clamped = arena.clamp(*position, tuning.half_size);
    if clamped == *position {
        return false;
    }
    *position = clamped;

    if soul.flee_decay > 0.0 {
        let destination = teleport_destination(rng, *position, tuning, arena);
        soul.teleport = SoulTeleport::WindUp {
            timer: 0.0,
            destination,
        };
        soul.wander = None;
        return true;
    }

    if !fleeing {
        let mut wander = random_wander(rng, tuning);
        if let Some(previous) = heading {
            if wander.direction.quadrant() == previous.quadrant() {
                wander.direction = -wander.direction;
            }
        }
        soul.wander = Some(wander);
    }
    false
}

fn random_range(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

pub fn random_wander(rng: &mut impl Rng, tuning: &SoulTuning) -> Wander {
    Wander {
        direction: Vec2::from_angle(rng.gen_range(0.0..360.0)),
        duration: random_range(rng, tuning.min_wander, tuning.max_wander),
        timer: 0.0,
    }
}

/// A point a random distance away, mirrored back across the soul on any
/// axis that would leave the arena, then clamped inside.
pub fn teleport_destination(
    rng: &mut impl Rng,
    from: Vec2,
    tuning: &SoulTuning,
    arena: ArenaBounds,
) -> Vec2 {
    let direction = Vec2::from_angle(rng.gen_range(0.0..360.0));
    let distance = random_range(rng, tuning.min_teleport_distance, tuning.max_teleport_distance);
    let mut destination = from + direction * distance;

    let max_x = (arena.half_extents.x - tuning.half_size.x).max(0.0);
    let max_y = (arena.half_extents.y - tuning.half_size.y).max(0.0);
    if destination.x.abs() > max_x {
        destination.x = from.x - (destination.x - from.x);
    }
    if destination.y.abs() > max_y {
        destination.y = from.y - (destination.y - from.y);
    }
    arena.clamp(destination, tuning.half_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use soulsweep_logic::config::CombatConfig;

    use crate::host::HostState;

    fn ready_soul() -> Soul {
        let mut soul = Soul::new("Wisp", 50.0, 0.1);
        soul.setup_complete = true;
        soul
    }

    #[test]
    fn test_flees_from_nearby_player() {
        let tuning = SoulTuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut soul = ready_soul();
        let mut position = Vec2::new(1.0, 0.0);
        let mut opacity = 1.0;

        step_soul(&mut soul, &mut position, &mut opacity, Vec2::ZERO, 0.1, &tuning, ArenaBounds::default(), &mut rng);
        assert!((position.x - 1.2).abs() < 1e-5);
        assert_eq!(position.y, 0.0);
        assert_eq!(soul.flee_decay, 1.0);
        assert!(soul.wander.is_none());
    }

    #[test]
    fn test_wanders_when_player_is_far() {
        let tuning = SoulTuning::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut soul = ready_soul();
        let mut position = Vec2::ZERO;
        let mut opacity = 1.0;

        step_soul(&mut soul, &mut position, &mut opacity, Vec2::new(6.0, 0.0), 0.1, &tuning, ArenaBounds::default(), &mut rng);
        let wander = soul.wander.expect("picked a wander direction");
        assert!((wander.direction.length() - 1.0).abs() < 1e-5);
        assert!((2.0..5.0).contains(&wander.duration));
        assert!((position.length() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_cornered_fleeing_soul_teleports() {
        let tuning = SoulTuning::default();
        let arena = ArenaBounds::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut soul = ready_soul();
        let edge = arena.half_extents.x - tuning.half_size.x;
        let mut position = Vec2::new(edge, 0.0);
        let mut opacity = 1.0;

        let started = step_soul(&mut soul, &mut position, &mut opacity, Vec2::new(edge - 1.0, 0.0), 0.1, &tuning, arena, &mut rng);
        assert!(started);
        assert_eq!(position.x, edge);
        let SoulTeleport::WindUp { destination, .. } = soul.teleport else {
            panic!("expected a wind-up");
        };
        assert!(!soul.is_immune());

        // Wind-up, then fade out and back in at the destination
        let mut immune_ticks = 0;
        for _ in 0..60 {
            step_soul(&mut soul, &mut position, &mut opacity, Vec2::new(edge - 1.0, 0.0), 0.1, &tuning, arena, &mut rng);
            if soul.is_immune() {
                immune_ticks += 1;
            }
            if !soul.is_teleporting() {
                break;
            }
        }
        assert!(immune_ticks > 0);
        assert!(!soul.is_teleporting());
        assert_eq!(position, destination);
        assert_eq!(soul.flee_decay, 0.0);
        assert_eq!(opacity, 1.0);
    }

    #[test]
    fn test_teleport_destination_stays_in_arena() {
        let tuning = SoulTuning::default();
        let arena = ArenaBounds::default();
        let mut rng = StdRng::seed_from_u64(4);
        let corners = [
            Vec2::new(8.0, 4.0),
            Vec2::new(-8.0, -4.0),
            Vec2::new(0.0, 4.5),
            Vec2::ZERO,
        ];
        for from in corners {
            for _ in 0..200 {
                let destination = teleport_destination(&mut rng, from, &tuning, arena);
                assert_eq!(arena.clamp(destination, tuning.half_size), destination);
            }
        }
    }

    #[test]
    fn test_wall_bounce_leaves_the_quadrant() {
        let tuning = SoulTuning::default();
        let arena = ArenaBounds::default();
        let mut rng = StdRng::seed_from_u64(5);
        let edge = arena.half_extents.x - tuning.half_size.x;

        for _ in 0..50 {
            let mut soul = ready_soul();
            let heading = Vec2::new(1.0, 1.0).normalize();
            soul.wander = Some(Wander {
                direction: heading,
                duration: 10.0,
                timer: 0.0,
            });
            let mut position = Vec2::new(edge, 0.0);
            let mut opacity = 1.0;
            step_soul(&mut soul, &mut position, &mut opacity, Vec2::new(-8.0, -4.0), 0.1, &tuning, arena, &mut rng);
            let wander = soul.wander.expect("new direction");
            assert_ne!(wander.direction.quadrant(), heading.quadrant());
            assert!(!soul.is_teleporting());
        }
    }

    #[test]
    fn test_system_waits_for_setup_and_skips_captured() {
        let config = CombatConfig::default();
        let ctx = TickContext::new(0.1, HostState::default(), &config);
        let mut rng = StdRng::seed_from_u64(6);
        let mut world = World::new();

        let waiting = world.spawn((Position(Vec2::new(1.0, 0.0)), Opacity::default(), Soul::new("A", 10.0, 0.1)));
        let mut captured = ready_soul();
        captured.captured = true;
        let done = world.spawn((Position(Vec2::new(1.0, 0.0)), Opacity::default(), captured));

        soul_system(&mut world, &ctx, Vec2::ZERO, &mut rng, &mut Vec::new());
        assert_eq!(world.get::<&Position>(waiting).unwrap().0, Vec2::new(1.0, 0.0));
        assert_eq!(world.get::<&Position>(done).unwrap().0, Vec2::new(1.0, 0.0));
    }
}
