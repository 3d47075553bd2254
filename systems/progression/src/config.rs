//! Balance configuration for the progression controller.

use defense_evolution_core::{KindBoosts, UnitKind};
use serde::Deserialize;

const ERA_LENGTH: u32 = 10;
const ERA_COUNT: u32 = 5;

/// Half-width of the placement area unlocked below a wave threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ColumnStep {
    /// Waves strictly below this number use `half_width`.
    pub threshold: u32,
    /// Columns allowed on each side of the centre line.
    pub half_width: u32,
}

/// Boost applied to a kind when a specific wave starts.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ScheduledBoost {
    /// Wave number that triggers the boost.
    pub wave: u32,
    /// Kind receiving the boost.
    pub kind: UnitKind,
    /// Amounts added to the kind's catalog entry.
    #[serde(default)]
    pub boosts: KindBoosts,
}

/// Amounts granted when a unit spends a pending level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpgradeAmounts {
    /// Base health added by a health upgrade.
    pub health: u32,
    /// Strength added by a strength upgrade.
    pub strength: u32,
}

impl Default for UpgradeAmounts {
    fn default() -> Self {
        Self {
            health: 50,
            strength: 5,
        }
    }
}

/// Tunable parameters of the progression controller.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Ascending `(threshold, half-width)` table for unlocked columns.
    pub column_table: Vec<ColumnStep>,
    /// Boosts applied as waves start.
    pub boosts: Vec<ScheduledBoost>,
    /// Upgrade amounts.
    pub upgrades: UpgradeAmounts,
    /// Gold the player starts with.
    pub starting_gold: i64,
    /// Health the building starts with.
    pub building_health: u32,
    /// Seed for lane layout randomness.
    pub seed: u64,
}

impl Default for ProgressionConfig {
    /// Enemy boosts grow with each column tier. The Shooter gets a flat boost
    /// at every era change so both kinds keep pace; those amounts are tunable
    /// balance values rather than fixed rules.
    fn default() -> Self {
        let column_table = [(5, 2), (10, 3), (15, 5), (20, 6), (25, 7), (30, 8)]
            .into_iter()
            .map(|(threshold, half_width)| ColumnStep {
                threshold,
                half_width,
            })
            .collect::<Vec<_>>();

        let enemy_boosts = column_table.iter().zip(1..).map(|(step, tier)| ScheduledBoost {
            wave: step.threshold,
            kind: UnitKind::Enemy,
            boosts: KindBoosts {
                health: 20 * tier,
                strength: 5 * tier,
                ..KindBoosts::default()
            },
        });
        let shooter_boosts = (1..=ERA_COUNT).map(|era| ScheduledBoost {
            wave: era * ERA_LENGTH,
            kind: UnitKind::Shooter,
            boosts: KindBoosts {
                health: 25,
                strength: 2,
                gold_value: 25,
                ..KindBoosts::default()
            },
        });
        let boosts = enemy_boosts.chain(shooter_boosts).collect();

        Self {
            column_table,
            boosts,
            upgrades: UpgradeAmounts::default(),
            starting_gold: 500,
            building_health: 100,
            seed: 0x5eed_de75,
        }
    }
}

/// Historical era the player has reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Era {
    /// Waves below 10.
    Ancient,
    /// Waves 10 to 19.
    Classical,
    /// Waves 20 to 29.
    Renaissance,
    /// Waves 30 to 39.
    Industrial,
    /// Waves 40 to 49.
    Modern,
    /// Wave 50 onwards.
    Future,
}

impl Era {
    /// Era a wave number belongs to.
    #[must_use]
    pub const fn for_wave(wave: u32) -> Self {
        match wave / ERA_LENGTH {
            0 => Self::Ancient,
            1 => Self::Classical,
            2 => Self::Renaissance,
            3 => Self::Industrial,
            4 => Self::Modern,
            _ => Self::Future,
        }
    }

    /// Display name of the era.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ancient => "Ancient",
            Self::Classical => "Classical",
            Self::Renaissance => "Renaissance",
            Self::Industrial => "Industrial",
            Self::Modern => "Modern",
            Self::Future => "Future",
        }
    }
}

impl std::fmt::Display for Era {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
