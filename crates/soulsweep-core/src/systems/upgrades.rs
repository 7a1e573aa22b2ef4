//! Upgrade shop - the wallet, the purchased loadout and the offer board.

use rand::Rng;
use serde::{Deserialize, Serialize};
use soulsweep_logic::upgrades::{
    evaluate_conditionals, generate_board, generate_offer, ConditionInputs, ConditionalUpgrade,
    Progress, StatMultipliers, UpgradeOffer, UpgradeRules,
};

use crate::host::{DialogueEvent, DialogueSink};

/// Currency earned from captures. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: u32,
}

impl Wallet {
    pub fn new(balance: u32) -> Self {
        Self { balance }
    }

    pub fn can_afford(&self, amount: u32) -> bool {
        self.balance >= amount
    }

    /// Returns false and leaves the balance alone when it can't cover `amount`.
    pub fn spend(&mut self, amount: u32) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.balance -= amount;
        true
    }

    pub fn award(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }
}

/// Everything the player has bought.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub multipliers: StatMultipliers,
    pub conditionals: Vec<ConditionalUpgrade>,
}

impl Loadout {
    /// Toggle conditional upgrades whose condition changed. Returns the
    /// number toggled.
    pub fn evaluate(&mut self, inputs: ConditionInputs) -> usize {
        evaluate_conditionals(&mut self.conditionals, inputs, &mut self.multipliers)
    }

    pub fn add(&mut self, offer: &UpgradeOffer) {
        match ConditionalUpgrade::from_offer(offer) {
            Some(conditional) => self.conditionals.push(conditional),
            None => self.multipliers.apply(&offer.bonuses),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeBoard {
    pub offers: Vec<UpgradeOffer>,
    pub purchases_remaining: u32,
    pub open: bool,
    pub purchased_this_visit: bool,
}

impl UpgradeBoard {
    /// Fresh offers in every slot.
    pub fn restock(&mut self, rng: &mut impl Rng, rules: &UpgradeRules, progress: Progress) {
        self.offers = generate_board(rng, rules, progress);
    }

    pub fn offer(&self, slot: usize) -> Option<&UpgradeOffer> {
        self.offers.get(slot)
    }

    /// Show the board and reset the per-visit purchase flag.
    pub fn open(&mut self) {
        self.open = true;
        self.purchased_this_visit = false;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Buy the offer in `slot`. Does nothing for an empty slot or when the
    /// wallet can't cover the cost.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &mut self,
        slot: usize,
        wallet: &mut Wallet,
        loadout: &mut Loadout,
        dialogue: &mut dyn DialogueSink,
        rng: &mut impl Rng,
        rules: &UpgradeRules,
        progress: Progress,
    ) -> bool {
        let Some(offer) = self.offers.get(slot) else {
            return false;
        };
        if !wallet.can_afford(offer.cost) {
            return false;
        }

        dialogue.display(DialogueEvent::UpgradePurchase);
        loadout.add(offer);
        wallet.spend(offer.cost);
        log::info!("Bought upgrade for {} (slot {}), {} left", offer.cost, slot, wallet.balance);

        self.offers[slot] = generate_offer(rng, rules, progress);
        self.purchases_remaining = self.purchases_remaining.saturating_sub(1);
        self.purchased_this_visit = true;
        true
    }

    /// Replace every offer for `rules.reroll_cost`.
    pub fn reroll(
        &mut self,
        wallet: &mut Wallet,
        dialogue: &mut dyn DialogueSink,
        rng: &mut impl Rng,
        rules: &UpgradeRules,
        progress: Progress,
    ) -> bool {
        if !wallet.can_afford(rules.reroll_cost) {
            return false;
        }

        dialogue.display(DialogueEvent::UpgradeReroll);
        wallet.spend(rules.reroll_cost);
        self.restock(rng, rules, progress);
        log::info!("Rerolled upgrades, {} left", wallet.balance);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use soulsweep_logic::upgrades::{Bonuses, Comparator, ConditionSubject, UpgradeCondition};

    use crate::host::DialogueLog;

    fn progress() -> Progress {
        Progress::new(1, 5)
    }

    fn offer(cost: u32, bonuses: Bonuses, condition: Option<UpgradeCondition>) -> UpgradeOffer {
        UpgradeOffer {
            condition,
            bonuses,
            cost,
        }
    }

    #[test]
    fn test_wallet_spend_and_award() {
        let mut wallet = Wallet::new(10);
        assert!(!wallet.spend(11));
        assert_eq!(wallet.balance, 10);
        assert!(wallet.spend(10));
        assert_eq!(wallet.balance, 0);

        wallet.award(u32::MAX);
        wallet.award(5);
        assert_eq!(wallet.balance, u32::MAX);
    }

    #[test]
    fn test_reroll_without_funds_changes_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let rules = UpgradeRules::default();
        let mut board = UpgradeBoard::default();
        board.restock(&mut rng, &rules, progress());
        let before = board.clone();
        let mut wallet = Wallet::new(10);
        let mut log = DialogueLog::new();

        assert!(!board.reroll(&mut wallet, &mut log, &mut rng, &rules, progress()));
        assert_eq!(board, before);
        assert_eq!(wallet.balance, 10);
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_reroll_spends_and_regenerates() {
        let mut rng = StdRng::seed_from_u64(2);
        let rules = UpgradeRules::default();
        let mut board = UpgradeBoard::default();
        board.restock(&mut rng, &rules, progress());
        let mut wallet = Wallet::new(30);
        let mut log = DialogueLog::new();

        assert!(board.reroll(&mut wallet, &mut log, &mut rng, &rules, progress()));
        assert_eq!(wallet.balance, 5);
        assert_eq!(board.offers.len(), rules.slots);
        assert_eq!(log.events(), vec![DialogueEvent::UpgradeReroll]);
    }

    #[test]
    fn test_apply_unconditional_upgrade() {
        let mut rng = StdRng::seed_from_u64(3);
        let rules = UpgradeRules::default();
        let mut board = UpgradeBoard::default();
        board.restock(&mut rng, &rules, progress());
        board.purchases_remaining = 1;
        board.offers[1] = offer(
            150,
            Bonuses {
                power: 60.0,
                speed: -30.0,
                ..Default::default()
            },
            None,
        );
        let mut wallet = Wallet::new(200);
        let mut loadout = Loadout::default();
        let mut log = DialogueLog::new();

        assert!(board.apply(1, &mut wallet, &mut loadout, &mut log, &mut rng, &rules, progress()));
        assert_eq!(wallet.balance, 50);
        assert!((loadout.multipliers.power - 1.6).abs() < 1e-5);
        assert!((loadout.multipliers.speed - 0.7).abs() < 1e-5);
        assert_eq!(board.purchases_remaining, 0);
        assert!(board.purchased_this_visit);
        assert_eq!(board.offers.len(), rules.slots);
        assert_eq!(log.count(DialogueEvent::UpgradePurchase), 1);

        // Counter saturates at zero
        board.offers[0].cost = 0;
        assert!(board.apply(0, &mut wallet, &mut loadout, &mut log, &mut rng, &rules, progress()));
        assert_eq!(board.purchases_remaining, 0);
    }

    #[test]
    fn test_apply_conditional_goes_to_loadout() {
        let mut rng = StdRng::seed_from_u64(4);
        let rules = UpgradeRules::default();
        let mut board = UpgradeBoard::default();
        board.restock(&mut rng, &rules, progress());
        let condition = UpgradeCondition {
            subject: ConditionSubject::Stamina,
            comparator: Comparator::Equal,
            threshold: 100.0,
        };
        board.offers[0] = offer(
            25,
            Bonuses {
                speed: 10.0,
                ..Default::default()
            },
            Some(condition),
        );
        let mut wallet = Wallet::new(25);
        let mut loadout = Loadout::default();

        assert!(board.apply(0, &mut wallet, &mut loadout, &mut DialogueLog::new(), &mut rng, &rules, progress()));
        assert_eq!(loadout.conditionals.len(), 1);
        assert_eq!(loadout.multipliers, StatMultipliers::default());

        let full = ConditionInputs {
            stamina: 1.0,
            charge: 1.0,
        };
        assert_eq!(loadout.evaluate(full), 1);
        assert!((loadout.multipliers.speed - 1.1).abs() < 1e-5);
        assert_eq!(loadout.evaluate(full), 0);
        loadout.evaluate(ConditionInputs {
            stamina: 0.5,
            charge: 1.0,
        });
        assert!((loadout.multipliers.speed - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_apply_rejects_bad_slot_and_short_wallet() {
        let mut rng = StdRng::seed_from_u64(5);
        let rules = UpgradeRules::default();
        let mut board = UpgradeBoard::default();
        board.restock(&mut rng, &rules, progress());
        board.offers[0].cost = 100;
        let before = board.clone();
        let mut wallet = Wallet::new(99);
        let mut loadout = Loadout::default();
        let mut log = DialogueLog::new();

        assert!(!board.apply(0, &mut wallet, &mut loadout, &mut log, &mut rng, &rules, progress()));
        assert!(!board.apply(7, &mut wallet, &mut loadout, &mut log, &mut rng, &rules, progress()));
        assert_eq!(board, before);
        assert_eq!(wallet.balance, 99);
        assert_eq!(loadout, Loadout::default());
        assert!(log.events().is_empty());
    }
}
