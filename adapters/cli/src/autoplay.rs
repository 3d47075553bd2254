//! Scripted driver that plays waves without player input.

use std::time::Duration;

use defense_evolution_core::{CellCoord, Command, Event, UnitKind};
use defense_evolution_system_progression::{Progression, UpgradeChoice};
use defense_evolution_world::{self as world, query, World};
use serde::Serialize;

/// Parameters controlling an autoplay session.
#[derive(Clone, Debug)]
pub(crate) struct AutoplayConfig {
    pub(crate) rows: u32,
    pub(crate) columns: u32,
    pub(crate) frame: Duration,
    pub(crate) max_frames: u64,
    pub(crate) waves_to_play: u32,
    pub(crate) placements: Vec<CellCoord>,
}

/// Outcome of an autoplay session.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct Summary {
    pub(crate) waves_cleared: u32,
    pub(crate) era: String,
    pub(crate) frames: u64,
    pub(crate) simulated_seconds: f64,
    pub(crate) gold: i64,
    pub(crate) gold_display: String,
    pub(crate) building_health: u32,
    pub(crate) building_fallen: bool,
    pub(crate) shooters: usize,
    pub(crate) enemies_killed: u32,
    pub(crate) enemies_breached: u32,
    pub(crate) upgrades: u32,
}

pub(crate) struct Autoplay {
    world: World,
    progression: Progression,
    config: AutoplayConfig,
    enemies_killed: u32,
    enemies_breached: u32,
    upgrades: u32,
    waves_cleared: u32,
}

impl Autoplay {
    /// Builds the battlefield, resets the economy, and buys the scripted shooters.
    pub(crate) fn new(progression: Progression, config: AutoplayConfig) -> Self {
        let mut autoplay = Self {
            world: World::new(),
            progression,
            config,
            enemies_killed: 0,
            enemies_breached: 0,
            upgrades: 0,
            waves_cleared: 0,
        };

        let mut commands = vec![Command::ConfigureGrid {
            rows: autoplay.config.rows,
            columns: autoplay.config.columns,
        }];
        autoplay.progression.reset_economy(&mut commands);
        autoplay.dispatch(commands);

        let mut purchases = Vec::new();
        for cell in autoplay.config.placements.clone() {
            if !autoplay
                .progression
                .request_placement(&autoplay.world, cell, &mut purchases)
            {
                tracing::warn!(
                    row = cell.row(),
                    column = cell.column(),
                    "placement outside unlocked columns"
                );
            }
        }
        autoplay.dispatch(purchases);
        autoplay
    }

    /// Plays until the requested number of waves is cleared, the building falls, or frames run out.
    pub(crate) fn run(mut self) -> Summary {
        let mut frames = 0;
        while frames < self.config.max_frames {
            if !self.progression.is_wave_active() {
                if query::is_building_fallen(&self.world)
                    || self.waves_cleared >= self.config.waves_to_play
                    || !self.progression.has_next_wave()
                {
                    break;
                }
                let _ = self.progression.start_wave(&self.world);
            }

            let was_active = self.progression.is_wave_active();
            self.dispatch(vec![Command::Tick {
                dt: self.config.frame,
            }]);
            self.spend_levels();
            frames += 1;

            if was_active && !self.progression.is_wave_active() {
                self.waves_cleared += 1;
            }
        }

        self.summarize(frames)
    }

    /// Applies commands, feeding every resulting event batch back through progression.
    fn dispatch(&mut self, mut commands: Vec<Command>) {
        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.record(&events);
            self.progression
                .handle(&events, &self.world, &mut commands);
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::UnitKilled {
                    kind: UnitKind::Enemy,
                    ..
                } => self.enemies_killed += 1,
                Event::BuildingBreached { .. } => self.enemies_breached += 1,
                Event::UnitUpgraded { .. } => self.upgrades += 1,
                _ => {}
            }
        }
    }

    /// Spends pending levels, preferring health for wounded shooters.
    fn spend_levels(&mut self) {
        let mut commands = Vec::new();
        for unit in query::unit_view(&self.world).iter() {
            if unit.kind != UnitKind::Shooter || !unit.pending_upgrade {
                continue;
            }
            let wounded =
                u32::try_from(unit.health).map_or(true, |health| health < unit.max_health);
            let choice = if wounded {
                UpgradeChoice::Health
            } else {
                UpgradeChoice::Strength
            };
            let _ = self
                .progression
                .request_upgrade(&self.world, unit.id, choice, &mut commands);
        }
        self.dispatch(commands);
    }

    fn summarize(&self, frames: u64) -> Summary {
        let gold = query::gold(&self.world);
        Summary {
            waves_cleared: self.waves_cleared,
            era: self.progression.era().to_string(),
            frames,
            simulated_seconds: query::clock(&self.world).as_secs_f64(),
            gold,
            gold_display: format_gold(gold),
            building_health: query::building_health(&self.world),
            building_fallen: query::is_building_fallen(&self.world),
            shooters: query::unit_view(&self.world)
                .iter()
                .filter(|unit| unit.kind == UnitKind::Shooter)
                .count(),
            enemies_killed: self.enemies_killed,
            enemies_breached: self.enemies_breached,
            upgrades: self.upgrades,
        }
    }
}

/// Abbreviates large balances the way the in-game HUD does.
pub(crate) fn format_gold(gold: i64) -> String {
    if gold > 10_000_000 {
        format!("{}M", gold / 1_000_000)
    } else if gold > 100_000 {
        format!("{}K", gold / 1_000)
    } else {
        gold.to_string()
    }
}
