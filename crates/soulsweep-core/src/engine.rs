//! Combat engine - owns the world, the run and the host seams, and drives
//! one encounter at a time.

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use soulsweep_logic::config::{CombatConfig, SessionTuning};
use soulsweep_logic::difficulty::{health_multiplier, next_quota, turret_damage_bonus};
use soulsweep_logic::geometry::Vec2;
use soulsweep_logic::roster::{EnemyToken, Roster};
use soulsweep_logic::upgrades::{Progress, UpgradeOffer};
use soulsweep_logic::vacuum::{effective_max_charge, starting_stamina, VacuumCharge};

use crate::components::*;
use crate::events::{CombatEvent, CombatResult};
use crate::host::{DialogueEvent, DialogueSink, HostState, NullDialogue, PlayerInput, TickContext, Transition};
use crate::persistence::{self, SaveError};
use crate::systems::*;

/// Combatants enter over the last part of the In transition.
const ENTRANCE_MOVE_FRACTION: f32 = 0.15;
/// Where the player and the soul wait before walking on.
const OFFSCREEN_X: f32 = 10.0;

/// Progress through a run, kept between encounters and saved to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub wallet: Wallet,
    /// Starts at 1, never decreases.
    pub level: u32,
    /// Captures needed to unlock the next upgrade visit.
    pub quota: u32,
    pub captures: u32,
    pub total_captures: u32,
    /// Seconds left before game over.
    pub run_clock: f32,
    /// Seconds the player stays stunned after a loss.
    pub stun_timer: f32,
    pub loadout: Loadout,
    pub board: UpgradeBoard,
}

impl RunState {
    pub fn new(session: &SessionTuning) -> Self {
        Self {
            wallet: Wallet::default(),
            level: 1,
            quota: session.starting_quota,
            captures: 0,
            total_captures: 0,
            run_clock: session.run_time,
            stun_timer: 0.0,
            loadout: Loadout::default(),
            board: UpgradeBoard::default(),
        }
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_timer > 0.0
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(&SessionTuning::default())
    }
}

/// The encounter being fought.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encounter {
    pub token: EnemyToken,
    pub soul: Entity,
    pub player: Entity,
    pub bounty: u32,
    pub time_bonus: f32,
}

/// Main combat engine
pub struct CombatEngine {
    /// ECS world holding the player, soul, turrets and projectiles
    pub world: World,
    pub run: RunState,
    pub host: HostState,
    config: CombatConfig,
    roster: Roster,
    rng: StdRng,
    formation: TurretFormation,
    encounter: Option<Encounter>,
    last_result: Option<CombatResult>,
    /// Seconds left in the current transition
    transition_timer: f32,
    dialogue: Box<dyn DialogueSink>,
    events: Vec<CombatEvent>,
    projectile_hook: Option<OnDestroy>,
}

impl CombatEngine {
    /// Engine with the built-in roster, default tuning and an entropy seed.
    pub fn new() -> Self {
        Self::with_parts(CombatConfig::default(), builtin_roster(), StdRng::from_entropy())
    }

    /// Reproducible engine: the same seed and inputs give the same run.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_parts(CombatConfig::default(), builtin_roster(), StdRng::seed_from_u64(seed))
    }

    pub fn with_parts(config: CombatConfig, roster: Roster, mut rng: StdRng) -> Self {
        let mut run = RunState::new(&config.session);
        let progress = Progress::new(run.level, roster.total_levels());
        run.board.restock(&mut rng, &config.upgrades, progress);

        Self {
            world: World::new(),
            run,
            host: HostState::default(),
            config,
            roster,
            rng,
            formation: TurretFormation::default(),
            encounter: None,
            last_result: None,
            transition_timer: 0.0,
            dialogue: Box::new(NullDialogue),
            events: Vec::new(),
            projectile_hook: None,
        }
    }

    pub fn set_dialogue(&mut self, dialogue: Box<dyn DialogueSink>) {
        self.dialogue = dialogue;
    }

    /// Attach `hook` to every projectile fired from now on.
    pub fn set_projectile_hook(&mut self, hook: Option<OnDestroy>) {
        self.projectile_hook = hook;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.host.paused = paused;
    }

    /// Pick a soul the player is allowed to meet at the current level.
    pub fn roll_encounter(&mut self) -> Option<EnemyToken> {
        self.roster.random_token(&mut self.rng, self.run.level)
    }

    /// Begin an encounter with the soul behind `token`. Does nothing while
    /// another encounter runs, after game over, while stunned, or for a
    /// token the roster doesn't know.
    pub fn start_combat(&mut self, token: EnemyToken) -> bool {
        if self.encounter.is_some() || self.host.game_over || self.run.is_stunned() {
            return false;
        }
        let Some(template) = self.roster.get(token).cloned() else {
            log::warn!("Unknown soul {:?}, combat not started", token);
            return false;
        };

        let level = self.run.level;
        let multipliers = self.run.loadout.multipliers;

        let health = health_multiplier(
            level,
            self.roster.level_of(token),
            self.config.session.health_scale_rate,
        );
        let mut soul = Soul::new(
            template.name.clone(),
            template.stamina * health,
            self.config.soul.damage_cooldown,
        );
        soul.bounty = template.bounty;
        soul.time_bonus = template.time_bonus;
        let soul_entity = self.world.spawn((
            Position(Vec2::new(OFFSCREEN_X, 0.0)),
            Opacity::default(),
            Scale::default(),
            Rotation::default(),
            soul,
        ));

        let charge = VacuumCharge::new(
            effective_max_charge(self.config.vacuum.base_max_charge, multipliers.capacity),
            self.config.vacuum.drain_rate,
            self.config.vacuum.refill_rate,
        );
        let player_entity = self.world.spawn((
            Position(Vec2::new(-OFFSCREEN_X, 0.0)),
            Player::new(starting_stamina(self.config.player.base_stamina, multipliers.stamina)),
            Vacuum::new(charge, self.config.vacuum.effect_pool_size),
        ));

        self.formation = TurretFormation::spawn(
            &mut self.world,
            &template,
            turret_damage_bonus(level),
            Vec2::ZERO,
            &mut self.rng,
            self.config.turret.teleport_fade,
        );

        self.encounter = Some(Encounter {
            token,
            soul: soul_entity,
            player: player_entity,
            bounty: template.bounty,
            time_bonus: template.time_bonus,
        });
        self.last_result = None;
        self.begin_transition(Transition::In);
        self.events.push(CombatEvent::CombatStarted { token });

        log::info!(
            "Combat started: {} (level {}) with {} turrets, stamina x{:.1}",
            template.name,
            token.level,
            self.formation.len(),
            health
        );
        true
    }

    /// Update by `delta` seconds.
    pub fn update(&mut self, delta: f32, input: &PlayerInput) {
        self.advance_transition(delta);

        if !self.host.is_frozen() && !capture_in_progress(&self.world) {
            self.run.stun_timer = (self.run.stun_timer - delta).max(0.0);
            self.tick_run_clock(delta);
        }

        if self.encounter.is_none() {
            return;
        }

        let first = self.events.len();
        let ctx = TickContext::new(delta, self.host, &self.config);

        // Player first, so turrets and projectiles see this tick's nozzle
        vacuum_system(&mut self.world, &ctx, input, &mut self.run.loadout, &mut self.events);
        capture_system(&mut self.world, &ctx, &mut self.events);

        let player = self.player_position().unwrap_or(Vec2::ZERO);
        soul_system(&mut self.world, &ctx, player, &mut self.rng, &mut self.events);
        formation_system(&mut self.world, &ctx, &mut self.formation, &mut self.rng, &mut self.events);
        turret_system(&mut self.world, &ctx, player, self.projectile_hook.as_ref(), &mut self.events);
        projectile_system(&mut self.world, &ctx, &mut self.events);

        let tick_events = &self.events[first..];
        if tick_events.contains(&CombatEvent::CaptureStarted) {
            self.formation.active = false;
        }
        let outcome = tick_events.iter().find_map(|event| match event {
            CombatEvent::PlayerDefeated => Some(CombatResult::Lose),
            CombatEvent::SoulCaptured => Some(CombatResult::Win),
            _ => None,
        });
        if let Some(result) = outcome {
            self.end_combat(result);
        }
    }

    /// Resolve the current encounter. Only the first call after a start has
    /// any effect.
    pub fn end_combat(&mut self, result: CombatResult) -> bool {
        let Some(encounter) = self.encounter.take() else {
            return false;
        };

        let cleared = clear_projectiles(&mut self.world);
        self.formation.clear(&mut self.world);
        let leftovers: Vec<Entity> = self
            .world
            .query::<&Turret>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        for entity in leftovers {
            let _ = self.world.despawn(entity);
        }
        let _ = self.world.despawn(encounter.soul);
        let _ = self.world.despawn(encounter.player);

        match result {
            CombatResult::Win => {
                self.run.wallet.award(encounter.bounty);
                self.run.run_clock += encounter.time_bonus;
                self.run.captures += 1;
                self.run.total_captures += 1;
                if self.run.captures >= self.run.quota {
                    self.unlock_upgrades();
                }
            }
            CombatResult::Lose => {
                self.run.stun_timer = self.config.session.stun_duration;
            }
        }

        self.last_result = Some(result);
        self.begin_transition(Transition::Out);
        self.events.push(CombatEvent::CombatEnded(result));
        log::info!(
            "Combat ended: {:?} against {:?}, {} projectiles cleared, balance {}",
            result,
            encounter.token,
            cleared,
            self.run.wallet.balance
        );
        true
    }

    fn unlock_upgrades(&mut self) {
        let progress = self.progress();
        let board = &mut self.run.board;
        board.purchases_remaining += 1;
        board.restock(&mut self.rng, &self.config.upgrades, progress);
        board.open();
        self.dialogue.display(DialogueEvent::UpgradeUnlock);
        self.host.paused = true;
        log::info!("Quota of {} reached, upgrades unlocked", self.run.quota);
    }

    /// Buy the offer in `slot`.
    pub fn apply_upgrade(&mut self, slot: usize) -> bool {
        let progress = self.progress();
        self.run.board.apply(
            slot,
            &mut self.run.wallet,
            &mut self.run.loadout,
            self.dialogue.as_mut(),
            &mut self.rng,
            &self.config.upgrades,
            progress,
        )
    }

    pub fn reroll_upgrades(&mut self) -> bool {
        let progress = self.progress();
        self.run.board.reroll(
            &mut self.run.wallet,
            self.dialogue.as_mut(),
            &mut self.rng,
            &self.config.upgrades,
            progress,
        )
    }

    /// Leave the upgrade board: raise the quota, reset captures, go up a
    /// level and unpause.
    pub fn close_upgrades(&mut self) -> bool {
        if !self.run.board.open {
            return false;
        }
        if !self.run.board.purchased_this_visit {
            self.dialogue.display(DialogueEvent::UpgradeSkip);
        }
        self.run.board.close();
        self.run.quota = next_quota(self.run.quota, self.config.session.max_quota);
        self.run.captures = 0;
        self.run.level += 1;
        self.host.paused = false;
        log::info!("Upgrades closed, level {} with quota {}", self.run.level, self.run.quota);
        true
    }

    pub fn deactivate_turrets(&mut self) -> usize {
        self.formation.deactivate(&mut self.world)
    }

    fn begin_transition(&mut self, transition: Transition) {
        self.host.transition = transition;
        self.transition_timer = match transition {
            Transition::None => 0.0,
            Transition::In => self.config.session.transition_in,
            Transition::Out => self.config.session.transition_out,
        };
    }

    fn advance_transition(&mut self, delta: f32) {
        let duration = match self.host.transition {
            Transition::None => return,
            Transition::In => self.config.session.transition_in,
            Transition::Out => self.config.session.transition_out,
        };
        self.transition_timer = (self.transition_timer - delta).max(0.0);

        let finished = self.transition_timer <= 0.0;
        if self.host.transition == Transition::In {
            let progress = if duration > 0.0 {
                1.0 - self.transition_timer / duration
            } else {
                1.0
            };
            self.place_combatants(progress);
            if finished {
                if let Some(encounter) = self.encounter {
                    if let Ok(mut soul) = self.world.get::<&mut Soul>(encounter.soul) {
                        soul.setup_complete = true;
                    }
                }
            }
        }
        if finished {
            self.host.transition = Transition::None;
        }
    }

    fn place_combatants(&mut self, progress: f32) {
        let Some(encounter) = self.encounter else {
            return;
        };
        let window = 1.0 - ENTRANCE_MOVE_FRACTION;
        let t = ((progress - window) / ENTRANCE_MOVE_FRACTION).clamp(0.0, 1.0);

        let player = Vec2::lerp(
            Vec2::new(-OFFSCREEN_X, 0.0),
            Vec2::new(self.config.player.start_x, 0.0),
            t,
        );
        let soul = Vec2::lerp(
            Vec2::new(OFFSCREEN_X, 0.0),
            Vec2::new(self.config.soul.start_x, 0.0),
            t,
        );
        if let Ok(mut pos) = self.world.get::<&mut Position>(encounter.player) {
            pos.0 = player;
        }
        if let Ok(mut pos) = self.world.get::<&mut Position>(encounter.soul) {
            pos.0 = soul;
        }
    }

    fn tick_run_clock(&mut self, delta: f32) {
        if self.host.game_over || self.run.run_clock <= 0.0 {
            return;
        }
        self.run.run_clock = (self.run.run_clock - delta).max(0.0);
        if self.run.run_clock <= 0.0 {
            self.host.game_over = true;
            self.dialogue.display(DialogueEvent::GameOver);
            self.events.push(CombatEvent::GameOver);
            log::info!(
                "Game over at level {} with {} captures",
                self.run.level,
                self.run.total_captures
            );
        }
    }

    fn progress(&self) -> Progress {
        Progress::new(self.run.level, self.roster.total_levels())
    }

    // --- Queries ---

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn formation(&self) -> &TurretFormation {
        &self.formation
    }

    pub fn encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    pub fn in_combat(&self) -> bool {
        self.encounter.is_some()
    }

    pub fn last_result(&self) -> Option<CombatResult> {
        self.last_result
    }

    pub fn offers(&self) -> &[UpgradeOffer] {
        &self.run.board.offers
    }

    pub fn player_position(&self) -> Option<Vec2> {
        let encounter = self.encounter?;
        self.world.get::<&Position>(encounter.player).ok().map(|pos| pos.0)
    }

    pub fn soul_position(&self) -> Option<Vec2> {
        let encounter = self.encounter?;
        self.world.get::<&Position>(encounter.soul).ok().map(|pos| pos.0)
    }

    /// Current and maximum player stamina.
    pub fn player_stamina(&self) -> Option<(f32, f32)> {
        let encounter = self.encounter?;
        let player = self.world.get::<&Player>(encounter.player).ok()?;
        Some((player.stamina, player.max_stamina))
    }

    /// Current and maximum vacuum charge.
    pub fn player_charge(&self) -> Option<(f32, f32)> {
        let encounter = self.encounter?;
        let vacuum = self.world.get::<&Vacuum>(encounter.player).ok()?;
        Some((vacuum.charge.current, vacuum.charge.maximum))
    }

    /// Current and maximum soul stamina.
    pub fn soul_stamina(&self) -> Option<(f32, f32)> {
        let encounter = self.encounter?;
        let soul = self.world.get::<&Soul>(encounter.soul).ok()?;
        Some((soul.stamina, soul.max_stamina))
    }

    pub fn turret_count(&self) -> usize {
        self.world.query::<&Turret>().iter().count()
    }

    pub fn projectile_count(&self) -> usize {
        self.world.query::<&Projectile>().iter().count()
    }

    /// Events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Persistence ---

    pub fn save_run<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_run(writer, &self.run)
    }

    /// Replace the run with a saved one. Any encounter in progress is kept.
    pub fn load_run<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        self.run = persistence::load_run(reader)?;
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, SaveError> {
        persistence::export_json(&self.run)
    }
}

impl Default for CombatEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_roster() -> Roster {
    Roster::builtin().unwrap_or_else(|e| {
        log::error!("Built-in roster failed to load: {}", e);
        Roster::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_on(engine: &mut CombatEngine) {
        let steps = (engine.config().session.transition_in / 0.1).ceil() as usize + 1;
        for _ in 0..steps {
            engine.update(0.1, &PlayerInput::idle());
        }
    }

    #[test]
    fn test_start_combat_spawns_encounter() {
        let mut engine = CombatEngine::with_seed(1);
        let token = engine.roster().find("Wisp").unwrap();

        assert!(engine.start_combat(token));
        assert!(!engine.start_combat(token));
        assert_eq!(engine.host.transition, Transition::In);
        assert_eq!(engine.turret_count(), 2);
        assert_eq!(engine.player_stamina(), Some((50.0, 50.0)));
        assert_eq!(engine.player_charge(), Some((5.0, 5.0)));
        assert_eq!(engine.soul_stamina(), Some((60.0, 60.0)));
        assert!(engine
            .drain_events()
            .contains(&CombatEvent::CombatStarted { token }));
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let mut engine = CombatEngine::with_seed(2);
        assert!(!engine.start_combat(EnemyToken::new(99, 0)));
        assert!(!engine.in_combat());
        assert_eq!(engine.world.len(), 0);
    }

    #[test]
    fn test_entrance_places_combatants() {
        let mut engine = CombatEngine::with_seed(3);
        let token = engine.roster().find("Wisp").unwrap();
        engine.start_combat(token);

        // Still off screen before the move window
        engine.update(1.0, &PlayerInput::idle());
        assert_eq!(engine.player_position(), Some(Vec2::new(-OFFSCREEN_X, 0.0)));

        walk_on(&mut engine);
        assert_eq!(engine.host.transition, Transition::None);
        let config = engine.config().clone();
        let player = engine.player_position().unwrap();
        assert!((player.x - config.player.start_x).abs() < 0.5);
        let soul = engine.encounter().unwrap().soul;
        assert!(engine.world.get::<&Soul>(soul).unwrap().setup_complete);
    }

    #[test]
    fn test_run_clock_runs_out() {
        let mut engine = CombatEngine::with_seed(4);
        engine.run.run_clock = 0.25;
        for _ in 0..5 {
            engine.update(0.1, &PlayerInput::idle());
        }
        assert!(engine.host.game_over);
        assert_eq!(engine.run.run_clock, 0.0);
        let events = engine.drain_events();
        assert_eq!(events.iter().filter(|e| **e == CombatEvent::GameOver).count(), 1);

        let token = engine.roster().find("Wisp").unwrap();
        assert!(!engine.start_combat(token));
    }

    #[test]
    fn test_deactivate_turrets_stops_the_formation() {
        let mut engine = CombatEngine::with_seed(5);
        let token = engine.roster().find("Lantern").unwrap();
        engine.start_combat(token);
        assert_eq!(engine.deactivate_turrets(), 4);
        assert!(!engine.formation().active);

        walk_on(&mut engine);
        for _ in 0..10 {
            engine.update(0.1, &PlayerInput::idle());
        }
        assert_eq!(engine.turret_count(), 0);
    }
}
