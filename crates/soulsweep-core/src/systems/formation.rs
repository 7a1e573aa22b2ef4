//! Turret formation - places a soul's turrets around a rectangle and moves
//! them to a fresh one once every turret has used up its attacks.

use hecs::{Entity, World};
use rand::Rng;
use soulsweep_logic::formation::FormationArea;
use soulsweep_logic::geometry::Vec2;
use soulsweep_logic::roster::SoulTemplate;

use crate::components::{Opacity, Position, Turret};
use crate::events::CombatEvent;
use crate::host::TickContext;

/// The turrets guarding the current soul.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurretFormation {
    pub turrets: Vec<Entity>,
    pub area: FormationArea,
    pub square: bool,
    /// Cleared by [`TurretFormation::deactivate`]; no rebuilds afterwards.
    pub active: bool,
}

impl TurretFormation {
    /// Spawn a soul's turrets at `origin` and send them to their first slots.
    pub fn spawn(
        world: &mut World,
        template: &SoulTemplate,
        damage_bonus: f32,
        origin: Vec2,
        rng: &mut impl Rng,
        fade: f32,
    ) -> Self {
        let mut turrets = Vec::with_capacity(template.turrets.len());
        for (i, turret_template) in template.turrets.iter().enumerate() {
            let Some(turret) =
                Turret::from_template(turret_template, template.attacks_before_teleport, damage_bonus)
            else {
                log::warn!("Turret {} of '{}' has no usable attacks, skipping", i, template.name);
                continue;
            };
            turrets.push(world.spawn((Position(origin), Opacity::default(), turret)));
        }

        let mut formation = Self {
            turrets,
            area: FormationArea::default(),
            square: template.square_formation,
            active: true,
        };
        formation.rebuild(world, rng, fade);
        formation
    }

    pub fn len(&self) -> usize {
        self.turrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turrets.is_empty()
    }

    /// Roll a new rectangle and teleport every turret to its slot.
    pub fn rebuild(&mut self, world: &mut World, rng: &mut impl Rng, fade: f32) -> bool {
        if self.turrets.is_empty() {
            return false;
        }

        self.area = FormationArea::random(rng, self.square);
        let slots = self.area.slots(self.turrets.len());
        for (entity, slot) in self.turrets.iter().zip(slots) {
            if let Ok(mut turret) = world.get::<&mut Turret>(*entity) {
                turret.start_teleport(slot, fade);
            }
        }
        log::debug!(
            "Formation rebuilt: {} turrets on a {}x{} rectangle",
            self.turrets.len(),
            self.area.width,
            self.area.height
        );
        true
    }

    /// Every turret is ready to move.
    pub fn ready_to_reform(&self, world: &World) -> bool {
        !self.turrets.is_empty()
            && self.turrets.iter().all(|entity| {
                world
                    .get::<&Turret>(*entity)
                    .map(|turret| turret.can_teleport())
                    .unwrap_or(false)
            })
    }

    /// Fade every turret out and stop rebuilding.
    pub fn deactivate(&mut self, world: &mut World) -> usize {
        self.active = false;
        let mut count = 0;
        for entity in &self.turrets {
            if let Ok(mut turret) = world.get::<&mut Turret>(*entity) {
                if !turret.is_deactivating() {
                    turret.deactivate();
                    count += 1;
                }
            }
        }
        count
    }

    /// Despawn every turret immediately.
    pub fn clear(&mut self, world: &mut World) {
        for entity in self.turrets.drain(..) {
            let _ = world.despawn(entity);
        }
        self.active = false;
    }
}

/// Rebuild the formation when all turrets are ready, and forget turrets
/// that have finished fading out.
pub fn formation_system(
    world: &mut World,
    ctx: &TickContext,
    formation: &mut TurretFormation,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) {
    if ctx.is_frozen() {
        return;
    }

    formation.turrets.retain(|entity| world.contains(*entity));
    if !formation.active || formation.turrets.is_empty() {
        return;
    }

    if formation.ready_to_reform(world) && formation.rebuild(world, rng, ctx.config.turret.teleport_fade) {
        events.push(CombatEvent::Reformed {
            turrets: formation.len(),
        });
    }
}

/// Put every turret in the world into its fade-out.
pub fn deactivate_turrets(world: &mut World) -> usize {
    let mut count = 0;
    for (_, turret) in world.query_mut::<&mut Turret>() {
        if !turret.is_deactivating() {
            turret.deactivate();
            count += 1;
        }
    }
    count
}
