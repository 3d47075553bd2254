//! Per-kind balance boosts and the stat snapshots handed to new units.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::UnitKind;

/// Additive adjustments applied on top of a kind's static profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindBoosts {
    /// Extra base health.
    pub health: u32,
    /// Extra strength.
    pub strength: u32,
    /// Extra pixels travelled per tick.
    pub speed: f32,
    /// Extra purchase cost or bounty.
    pub gold_value: u32,
}

impl KindBoosts {
    /// Folds `delta` into the accumulated boosts. Negative speed deltas are ignored.
    pub fn accumulate(&mut self, delta: KindBoosts) {
        self.health = self.health.saturating_add(delta.health);
        self.strength = self.strength.saturating_add(delta.strength);
        self.speed += delta.speed.max(0.0);
        self.gold_value = self.gold_value.saturating_add(delta.gold_value);
    }
}

/// Stats captured when a unit is spawned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitStats {
    /// Maximum health.
    pub base_health: u32,
    /// Damage dealt per attack.
    pub strength: u32,
    /// Pixels travelled per tick while moving.
    pub speed: f32,
    /// Refractory period between attacks.
    pub cooldown: Duration,
    /// Purchase cost for player units, bounty for hostile units.
    pub gold_value: u32,
    /// Experience awarded to whoever kills the unit.
    pub xp_value: u32,
}

impl UnitStats {
    /// Unboosted stats taken straight from the kind's profile.
    #[must_use]
    pub const fn base(kind: UnitKind) -> Self {
        let profile = kind.profile();
        Self {
            base_health: profile.base_health,
            strength: profile.strength,
            speed: profile.speed,
            cooldown: profile.cooldown,
            gold_value: profile.gold_value,
            xp_value: profile.xp_value,
        }
    }
}

/// Global boosts applied to every kind. Boosts only ever grow.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KindCatalog {
    boosts: [KindBoosts; UnitKind::ALL.len()],
}

impl KindCatalog {
    /// Creates a catalog with no boosts applied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated boosts for the provided kind.
    #[must_use]
    pub fn boosts(&self, kind: UnitKind) -> KindBoosts {
        self.boosts[kind.index()]
    }

    /// Raises the boosts for the provided kind.
    pub fn boost(&mut self, kind: UnitKind, delta: KindBoosts) {
        self.boosts[kind.index()].accumulate(delta);
    }

    /// Stats a unit of the provided kind would spawn with right now.
    #[must_use]
    pub fn stats(&self, kind: UnitKind) -> UnitStats {
        let base = UnitStats::base(kind);
        let boosts = self.boosts(kind);
        UnitStats {
            base_health: base.base_health.saturating_add(boosts.health),
            strength: base.strength.saturating_add(boosts.strength),
            speed: base.speed + boosts.speed,
            gold_value: base.gold_value.saturating_add(boosts.gold_value),
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_catalog_matches_profile() {
        let catalog = KindCatalog::new();
        assert_eq!(
            catalog.stats(UnitKind::Enemy),
            UnitStats::base(UnitKind::Enemy)
        );
        assert_eq!(catalog.stats(UnitKind::Shooter).gold_value, 100);
    }

    #[test]
    fn boosts_accumulate_per_kind() {
        let mut catalog = KindCatalog::new();
        catalog.boost(
            UnitKind::Enemy,
            KindBoosts {
                health: 20,
                strength: 5,
                ..KindBoosts::default()
            },
        );
        catalog.boost(
            UnitKind::Enemy,
            KindBoosts {
                health: 40,
                strength: 10,
                ..KindBoosts::default()
            },
        );

        let enemy = catalog.stats(UnitKind::Enemy);
        assert_eq!(enemy.base_health, 110);
        assert_eq!(enemy.strength, 20);
        assert_eq!(
            catalog.stats(UnitKind::Shooter),
            UnitStats::base(UnitKind::Shooter),
            "shooter stats should be untouched by enemy boosts"
        );
    }

    #[test]
    fn negative_speed_never_lowers_stats() {
        let mut catalog = KindCatalog::new();
        catalog.boost(
            UnitKind::Enemy,
            KindBoosts {
                speed: -3.0,
                ..KindBoosts::default()
            },
        );
        assert_eq!(catalog.stats(UnitKind::Enemy).speed, 0.5);
    }
}
