//! Host seams - the state, input and dialogue that the surrounding game
//! supplies to the combat simulation.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use soulsweep_logic::config::CombatConfig;
use soulsweep_logic::geometry::Vec2;

/// Screen transition currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transition {
    #[default]
    None,
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostState {
    pub game_over: bool,
    pub paused: bool,
    pub transition: Transition,
}

impl HostState {
    /// Combat systems do nothing while frozen.
    pub fn is_frozen(&self) -> bool {
        self.game_over || self.paused || self.transition != Transition::None
    }
}

/// Lines the host's dialogue box may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogueEvent {
    UpgradeUnlock,
    UpgradePurchase,
    UpgradeReroll,
    UpgradeSkip,
    GameOver,
}

/// Fire-and-forget dialogue display.
pub trait DialogueSink {
    fn display(&mut self, event: DialogueEvent);
}

/// Discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDialogue;

impl DialogueSink for NullDialogue {
    fn display(&mut self, _event: DialogueEvent) {}
}

/// Records every line. Clones share one log, so a host can hand a clone to
/// the engine and read the other.
#[derive(Debug, Clone, Default)]
pub struct DialogueLog {
    shown: Arc<Mutex<Vec<DialogueEvent>>>,
}

impl DialogueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DialogueEvent> {
        self.shown.lock().map(|shown| shown.clone()).unwrap_or_default()
    }

    pub fn count(&self, event: DialogueEvent) -> usize {
        self.events().iter().filter(|e| **e == event).count()
    }
}

impl DialogueSink for DialogueLog {
    fn display(&mut self, event: DialogueEvent) {
        log::debug!("Dialogue: {:?}", event);
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(event);
        }
    }
}

/// One frame of player input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement axis, each component in [-1, 1].
    pub movement: Vec2,
    /// World point the nozzle aims at.
    pub aim: Vec2,
    pub suction: bool,
}

impl PlayerInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn suck_at(aim: Vec2) -> Self {
        Self {
            movement: Vec2::ZERO,
            aim,
            suction: true,
        }
    }
}

/// Shared per-tick inputs handed to every system.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub delta: f32,
    pub host: HostState,
    pub config: &'a CombatConfig,
}

impl<'a> TickContext<'a> {
    pub fn new(delta: f32, host: HostState, config: &'a CombatConfig) -> Self {
        Self { delta, host, config }
    }

    pub fn is_frozen(&self) -> bool {
        self.host.is_frozen()
    }
}
