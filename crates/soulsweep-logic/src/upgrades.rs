//! Upgrade generation - random offers, pricing, stat multipliers and
//! conditional modifiers.
//!
//! Offers are either unconditional (one bonus, sometimes paid for with a
//! drawback on another attribute) or conditional: a speed or power bonus
//! that only applies while the player's stamina or charge satisfies a
//! threshold. Prices are always multiples of 5.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::upgrades::{
    BONUS_CAP, BONUS_STEP, CONDITIONAL_COST_FACTOR, CONDITIONAL_WEIGHT, DRAWBACK_THRESHOLD,
    MAX_SPEED_STEPS, MIN_BONUS_STEPS, REROLL_COST, SLOTS, UNCONDITIONAL_COST_FACTOR,
};
use crate::difficulty;

/// Player attribute an upgrade can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Stamina,
    Speed,
    Power,
    Capacity,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Stamina,
        Attribute::Speed,
        Attribute::Power,
        Attribute::Capacity,
    ];

    /// Attributes a conditional bonus may target.
    pub const CONDITIONAL: [Attribute; 2] = [Attribute::Speed, Attribute::Power];

    pub fn label(self) -> &'static str {
        match self {
            Attribute::Stamina => "health",
            Attribute::Speed => "movement speed",
            Attribute::Power => "damage",
            Attribute::Capacity => "charge capacity",
        }
    }
}

/// Bonus percentages per attribute. Negative values are drawbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bonuses {
    pub stamina: f32,
    pub speed: f32,
    pub power: f32,
    pub capacity: f32,
}

impl Bonuses {
    pub fn get(&self, attribute: Attribute) -> f32 {
        match attribute {
            Attribute::Stamina => self.stamina,
            Attribute::Speed => self.speed,
            Attribute::Power => self.power,
            Attribute::Capacity => self.capacity,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: f32) {
        match attribute {
            Attribute::Stamina => self.stamina = value,
            Attribute::Speed => self.speed = value,
            Attribute::Power => self.power = value,
            Attribute::Capacity => self.capacity = value,
        }
    }

    /// Non-zero entries in attribute order.
    pub fn entries(&self) -> impl Iterator<Item = (Attribute, f32)> + '_ {
        Attribute::ALL
            .iter()
            .map(move |&a| (a, self.get(a)))
            .filter(|(_, v)| *v != 0.0)
    }

    pub fn drawback_count(&self) -> usize {
        self.entries().filter(|(_, v)| *v < 0.0).count()
    }
}

/// Live value a condition watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionSubject {
    Stamina,
    Charge,
}

impl ConditionSubject {
    pub fn label(self) -> &'static str {
        match self {
            ConditionSubject::Stamina => "health",
            ConditionSubject::Charge => "vacuum cleaner charge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    Equal,
    Less,
    Greater,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::Less => "<",
            Comparator::Greater => ">",
        }
    }
}

/// Trigger of a conditional upgrade. `threshold` is a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCondition {
    pub subject: ConditionSubject,
    pub comparator: Comparator,
    pub threshold: f32,
}

impl UpgradeCondition {
    /// Compare a fill fraction in [0, 1] against the threshold.
    pub fn holds(&self, fraction: f32) -> bool {
        let threshold = self.threshold * 0.01;
        match self.comparator {
            Comparator::Equal => fraction == threshold,
            Comparator::Less => fraction < threshold,
            Comparator::Greater => fraction > threshold,
        }
    }

    /// Extra cost for how restrictive the condition is.
    pub fn surcharge(&self) -> u32 {
        match self.comparator {
            Comparator::Equal => 0,
            Comparator::Greater => (100.0 - self.threshold).max(0.0) as u32,
            Comparator::Less => self.threshold.max(0.0) as u32,
        }
    }
}

impl fmt::Display for UpgradeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "When {} {} {}%",
            self.subject.label(),
            self.comparator.symbol(),
            self.threshold
        )
    }
}

/// One purchasable offer on the upgrade board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOffer {
    pub condition: Option<UpgradeCondition>,
    pub bonuses: Bonuses,
    pub cost: u32,
}

impl UpgradeOffer {
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

impl fmt::Display for UpgradeOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.condition {
            Some(condition) => {
                write!(f, "{condition}")?;
                if let Some((attribute, value)) = self.bonuses.entries().next() {
                    writeln!(f, " +{}% {}", value, attribute.label())?;
                }
            }
            None => {
                for (attribute, value) in self.bonuses.entries() {
                    let sign = if value < 0.0 { '-' } else { '+' };
                    writeln!(f, "{}{}% {}", sign, value.abs(), attribute.label())?;
                }
            }
        }
        write!(f, "\n£{}", self.cost)
    }
}

/// Generation and board rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeRules {
    /// Chance that an offer is conditional.
    pub conditional_weight: f64,
    /// Total 5% steps spread across all levels.
    pub bonus_cap: u32,
    pub reroll_cost: u32,
    pub slots: usize,
    pub max_speed_steps: u32,
    /// Unconditional bonuses at or above this may carry a drawback.
    pub drawback_threshold: f32,
}

impl Default for UpgradeRules {
    fn default() -> Self {
        Self {
            conditional_weight: CONDITIONAL_WEIGHT,
            bonus_cap: BONUS_CAP,
            reroll_cost: REROLL_COST,
            slots: SLOTS,
            max_speed_steps: MAX_SPEED_STEPS,
            drawback_threshold: DRAWBACK_THRESHOLD,
        }
    }
}

/// How far through the run the player is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub level: u32,
    pub total_levels: u32,
}

impl Progress {
    pub fn new(level: u32, total_levels: u32) -> Self {
        Self {
            level,
            total_levels,
        }
    }

    pub fn clamped_level(&self) -> u32 {
        difficulty::clamped_level(self.level, self.total_levels)
    }
}

pub fn round_down_to_five(value: u32) -> u32 {
    value - value % 5
}

/// Base price of a bonus when the offer has a condition or a drawback.
fn discounted_price(bonus: f32) -> u32 {
    (bonus * CONDITIONAL_COST_FACTOR).round().max(0.0) as u32
}

/// Price of a conditional offer.
pub fn conditional_cost(bonus: f32, condition: &UpgradeCondition) -> u32 {
    round_down_to_five(discounted_price(bonus) + condition.surcharge())
}

/// Price of an unconditional offer.
pub fn unconditional_cost(bonus: f32, has_drawback: bool) -> u32 {
    if has_drawback {
        round_down_to_five(discounted_price(bonus))
    } else {
        bonus.max(0.0) as u32 * UNCONDITIONAL_COST_FACTOR
    }
}

/// Drawback paired with a large bonus: half of it, rounded down to a
/// multiple of 10, as a negative percentage.
pub fn drawback_penalty(bonus: f32) -> f32 {
    -((bonus * 0.5 / 10.0).floor() * 10.0)
}

fn roll_steps(rng: &mut impl Rng, max_steps: u32) -> u32 {
    if max_steps <= MIN_BONUS_STEPS {
        MIN_BONUS_STEPS
    } else {
        rng.gen_range(MIN_BONUS_STEPS..=max_steps)
    }
}

fn roll_bonus(rng: &mut impl Rng, attribute: Attribute, rules: &UpgradeRules, progress: Progress) -> f32 {
    let max_steps = if attribute == Attribute::Speed {
        rules.max_speed_steps
    } else {
        difficulty::max_bonus_steps(rules.bonus_cap, progress.level, progress.total_levels)
    };
    roll_steps(rng, max_steps) as f32 * BONUS_STEP
}

fn roll_condition(rng: &mut impl Rng) -> UpgradeCondition {
    let subject = if rng.gen_bool(0.5) {
        ConditionSubject::Stamina
    } else {
        ConditionSubject::Charge
    };

    let (comparator, threshold) = match subject {
        // Equal only makes sense at full health
        ConditionSubject::Stamina => match rng.gen_range(0..3) {
            0 => (Comparator::Equal, 100.0),
            1 => (Comparator::Less, rng.gen_range(5..=10) as f32 * BONUS_STEP),
            _ => (
                Comparator::Greater,
                100.0 - rng.gen_range(5..=10) as f32 * BONUS_STEP,
            ),
        },
        ConditionSubject::Charge => {
            if rng.gen_bool(0.5) {
                (Comparator::Less, rng.gen_range(2..=10) as f32 * BONUS_STEP)
            } else {
                (
                    Comparator::Greater,
                    100.0 - rng.gen_range(2..=10) as f32 * BONUS_STEP,
                )
            }
        }
    };

    UpgradeCondition {
        subject,
        comparator,
        threshold,
    }
}

/// Generate one offer.
pub fn generate_offer(rng: &mut impl Rng, rules: &UpgradeRules, progress: Progress) -> UpgradeOffer {
    let mut bonuses = Bonuses::default();

    if rng.gen_bool(rules.conditional_weight.clamp(0.0, 1.0)) {
        let attribute = Attribute::CONDITIONAL[rng.gen_range(0..Attribute::CONDITIONAL.len())];
        let bonus = roll_bonus(rng, attribute, rules, progress);
        bonuses.set(attribute, bonus);

        let condition = roll_condition(rng);
        return UpgradeOffer {
            condition: Some(condition),
            bonuses,
            cost: conditional_cost(bonus, &condition),
        };
    }

    let attribute = Attribute::ALL[rng.gen_range(0..Attribute::ALL.len())];
    let bonus = roll_bonus(rng, attribute, rules, progress);
    bonuses.set(attribute, bonus);

    let has_drawback = bonus >= rules.drawback_threshold && rng.gen_bool(0.5);
    if has_drawback {
        let others: Vec<Attribute> = Attribute::ALL
            .iter()
            .copied()
            .filter(|a| *a != attribute)
            .collect();
        let penalised = others[rng.gen_range(0..others.len())];
        bonuses.set(penalised, drawback_penalty(bonus));
    }

    UpgradeOffer {
        condition: None,
        bonuses,
        cost: unconditional_cost(bonus, has_drawback),
    }
}

/// Generate a full board of offers.
pub fn generate_board(rng: &mut impl Rng, rules: &UpgradeRules, progress: Progress) -> Vec<UpgradeOffer> {
    (0..rules.slots)
        .map(|_| generate_offer(rng, rules, progress))
        .collect()
}

/// The player's stat multipliers. Base 1.0; bonuses add a hundredth of
/// their percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatMultipliers {
    pub stamina: f32,
    pub speed: f32,
    pub power: f32,
    pub capacity: f32,
}

impl Default for StatMultipliers {
    fn default() -> Self {
        Self {
            stamina: 1.0,
            speed: 1.0,
            power: 1.0,
            capacity: 1.0,
        }
    }
}

impl StatMultipliers {
    pub fn apply(&mut self, bonuses: &Bonuses) {
        self.stamina += bonuses.stamina * 0.01;
        self.speed += bonuses.speed * 0.01;
        self.power += bonuses.power * 0.01;
        self.capacity += bonuses.capacity * 0.01;
    }
}

/// Edge reported by [`ConditionalUpgrade::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Activated,
    Deactivated,
}

/// A purchased conditional offer, switched on and off as its condition
/// starts and stops holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalUpgrade {
    pub condition: UpgradeCondition,
    /// Speed bonus percentage while active.
    pub speed: f32,
    /// Power bonus percentage while active.
    pub power: f32,
    pub active: bool,
}

impl ConditionalUpgrade {
    /// `None` for unconditional offers.
    pub fn from_offer(offer: &UpgradeOffer) -> Option<Self> {
        let condition = offer.condition?;
        Some(Self {
            condition,
            speed: offer.bonuses.speed,
            power: offer.bonuses.power,
            active: false,
        })
    }

    /// Re-check the condition and toggle the bonus on an edge. Only speed
    /// and power are touched, by exactly the same delta in both directions.
    pub fn evaluate(&mut self, fraction: f32, multipliers: &mut StatMultipliers) -> Option<Toggle> {
        let holds = self.condition.holds(fraction);
        let speed = self.speed * 0.01;
        let power = self.power * 0.01;

        if holds && !self.active {
            multipliers.speed += speed;
            multipliers.power += power;
            self.active = true;
            Some(Toggle::Activated)
        } else if !holds && self.active {
            multipliers.speed -= speed;
            multipliers.power -= power;
            self.active = false;
            Some(Toggle::Deactivated)
        } else {
            None
        }
    }
}

/// Current fill fractions a condition can watch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConditionInputs {
    /// Stamina over maximum stamina.
    pub stamina: f32,
    /// Charge over maximum charge.
    pub charge: f32,
}

impl ConditionInputs {
    pub fn fraction(&self, subject: ConditionSubject) -> f32 {
        match subject {
            ConditionSubject::Stamina => self.stamina,
            ConditionSubject::Charge => self.charge,
        }
    }
}

/// Evaluate every conditional upgrade in purchase order.
pub fn evaluate_conditionals(
    upgrades: &mut [ConditionalUpgrade],
    inputs: ConditionInputs,
    multipliers: &mut StatMultipliers,
) -> usize {
    let mut toggled = 0;
    for upgrade in upgrades.iter_mut() {
        let fraction = inputs.fraction(upgrade.condition.subject);
        if upgrade.evaluate(fraction, multipliers).is_some() {
            toggled += 1;
        }
    }
    toggled
}
