//! Player gold and the health of the defended building.

/// Gold a fresh world starts with.
pub(crate) const DEFAULT_GOLD: i64 = 500;
/// Building health a fresh world starts with.
pub(crate) const DEFAULT_BUILDING_HEALTH: u32 = 100;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Economy {
    gold: i64,
    building_health: u32,
}

impl Economy {
    pub(crate) const fn new(gold: i64, building_health: u32) -> Self {
        Self {
            gold,
            building_health,
        }
    }

    pub(crate) const fn gold(&self) -> i64 {
        self.gold
    }

    pub(crate) const fn building_health(&self) -> u32 {
        self.building_health
    }

    /// Zero building health is terminal.
    pub(crate) const fn is_fallen(&self) -> bool {
        self.building_health == 0
    }

    pub(crate) fn credit(&mut self, amount: u32) -> i64 {
        self.gold = self.gold.saturating_add(i64::from(amount));
        self.gold
    }

    /// Debits gold. The balance may go negative.
    pub(crate) fn debit(&mut self, amount: u32) -> i64 {
        self.gold = self.gold.saturating_sub(i64::from(amount));
        self.gold
    }

    /// Restores health unless the building has fallen.
    pub(crate) fn heal(&mut self, amount: u32) -> Option<u32> {
        if self.is_fallen() {
            return None;
        }
        self.building_health = self.building_health.saturating_add(amount);
        Some(self.building_health)
    }

    /// Damages the building. Returns the remaining health and whether this call made it fall.
    pub(crate) fn damage(&mut self, amount: u32) -> (u32, bool) {
        let was_standing = !self.is_fallen();
        self.building_health = self.building_health.saturating_sub(amount);
        (self.building_health, was_standing && self.is_fallen())
    }
}

impl Default for Economy {
    fn default() -> Self {
        Self::new(DEFAULT_GOLD, DEFAULT_BUILDING_HEALTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_saturates_and_falls_once() {
        let mut economy = Economy::default();
        assert_eq!(economy.damage(60), (40, false));
        assert_eq!(economy.damage(60), (0, true));
        assert_eq!(economy.damage(60), (0, false));
        assert!(economy.is_fallen());
    }

    #[test]
    fn fallen_building_cannot_be_healed() {
        let mut economy = Economy::new(0, 10);
        assert_eq!(economy.heal(5), Some(15));
        let _ = economy.damage(15);
        assert_eq!(economy.heal(5), None);
        assert_eq!(economy.building_health(), 0);
    }

    #[test]
    fn gold_has_no_overdraft_guard() {
        let mut economy = Economy::new(30, 100);
        assert_eq!(economy.debit(50), -20);
        assert_eq!(economy.credit(20), 0);
        assert_eq!(economy.gold(), 0);
    }
}
