#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progression controller for Defense Evolution.
//!
//! The controller owns the wave lifecycle, the balance catalog, and the
//! placement rules that widen as the player survives more waves. Like every
//! system it never mutates the world directly; it reads queries and answers
//! with command batches.

mod config;

use std::{path::Path, time::Duration};

use defense_evolution_core::{
    CellCoord, Command, Event, KindCatalog, StatUpgrade, UnitId, UnitKind,
};
use defense_evolution_system_waves::{
    lane_column, lane_count, load_waves, parse_waves, WaveBook, WaveFileError, WaveInfo,
};
use defense_evolution_world::{query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use config::{ColumnStep, Era, ProgressionConfig, ScheduledBoost, UpgradeAmounts};

/// Stat a player chooses to raise when spending a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeChoice {
    /// Raise base health and refill.
    Health,
    /// Raise strength.
    Strength,
}

/// Half-width of the placement area for a wave.
///
/// The first table entry whose threshold exceeds `wave` wins; past the table
/// half the grid is open.
#[must_use]
pub fn allowed_columns(table: &[ColumnStep], wave: u32, grid_columns: u32) -> u32 {
    table
        .iter()
        .find(|step| wave < step.threshold)
        .map_or(grid_columns / 2, |step| step.half_width)
}

/// Signed distance of a column from the centre line. Zero is never returned.
#[must_use]
pub fn signed_column_offset(column: u32, grid_columns: u32) -> i64 {
    let half = i64::from(grid_columns / 2);
    let column = i64::from(column);
    column - half + i64::from(column >= half)
}

/// Drives waves, owns the balance catalog, and vets player requests.
#[derive(Debug)]
pub struct Progression {
    config: ProgressionConfig,
    catalog: KindCatalog,
    waves: WaveBook,
    wave: u32,
    wave_clock: Option<Duration>,
    current: Option<WaveInfo>,
    allowed_columns: u32,
    just_switched_columns: bool,
    grid_columns: u32,
}

impl Progression {
    /// Creates a controller for a grid with `grid_columns` columns and no waves loaded.
    #[must_use]
    pub fn new(config: ProgressionConfig, grid_columns: u32) -> Self {
        let allowed = allowed_columns(&config.column_table, 0, grid_columns);
        Self {
            config,
            catalog: KindCatalog::new(),
            waves: WaveBook::default(),
            wave: 0,
            wave_clock: None,
            current: None,
            allowed_columns: allowed,
            just_switched_columns: false,
            grid_columns,
        }
    }

    /// Emits the commands that put the economy into its starting state.
    pub fn reset_economy(&self, out: &mut Vec<Command>) {
        out.push(Command::ResetEconomy {
            gold: self.config.starting_gold,
            building_health: self.config.building_health,
        });
    }

    /// Parses wave definitions, laying lanes out with the configured seed.
    pub fn parse_waves(&mut self, source: &str) -> Result<usize, WaveFileError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let book = parse_waves(source, |wave| self.lanes_for(wave), &mut rng)?;
        let loaded = book.len();
        self.waves = book;
        Ok(loaded)
    }

    /// Loads wave definitions from disk, laying lanes out with the configured seed.
    pub fn load_waves(&mut self, path: &Path) -> Result<usize, WaveFileError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let book = load_waves(path, |wave| self.lanes_for(wave), &mut rng)?;
        let loaded = book.len();
        self.waves = book;
        Ok(loaded)
    }

    /// Starts the next wave. Returns `false` and changes nothing when a wave cannot start.
    pub fn start_wave(&mut self, world: &World) -> bool {
        if let Some(reason) = self.start_refusal(world) {
            tracing::warn!(wave = self.wave + 1, reason, "wave start refused");
            return false;
        }

        self.wave += 1;
        self.current = self.waves.take(self.wave);
        self.wave_clock = Some(Duration::ZERO);

        let wave = self.wave;
        for boost in self.config.boosts.iter().filter(|boost| boost.wave == wave) {
            self.catalog.boost(boost.kind, boost.boosts);
            tracing::info!(wave, kind = ?boost.kind, "applied era boost");
        }

        self.allowed_columns = self.allowed_columns_for(wave);
        self.just_switched_columns = false;
        tracing::info!(
            wave,
            era = %self.era(),
            allowed_columns = self.allowed_columns,
            "wave started"
        );
        true
    }

    fn start_refusal(&self, world: &World) -> Option<&'static str> {
        if query::is_building_fallen(world) {
            Some("building has fallen")
        } else if query::enemy_count(world) > 0 {
            Some("enemies remain on the grid")
        } else if self.is_wave_active() {
            Some("a wave is already active")
        } else if !self.waves.contains(self.wave + 1) {
            Some("no wave defined")
        } else {
            None
        }
    }

    /// Consumes world events, releases due spawns, and ends the wave once it is cleared.
    pub fn handle(&mut self, events: &[Event], world: &World, out: &mut Vec<Command>) {
        for event in events {
            if let Event::UnitPlaced {
                kind: UnitKind::Shooter,
                ..
            } = event
            {
                self.just_switched_columns = false;
            }
        }

        let Some(mut clock) = self.wave_clock else {
            return;
        };
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                clock = clock.saturating_add(*dt);
            }
        }
        self.wave_clock = Some(clock);

        let emitted = self.release_spawns(clock, out);
        let drained = self.current.as_ref().map_or(true, WaveInfo::is_done);
        if emitted == 0 && drained && query::enemy_count(world) == 0 {
            self.on_wave_end();
        }
    }

    fn release_spawns(&mut self, clock: Duration, out: &mut Vec<Command>) -> usize {
        let Some(wave) = self.current.as_mut() else {
            return 0;
        };

        let stats = self.catalog.stats(UnitKind::Enemy);
        let mut emitted = 0;
        while wave.next_time().map_or(false, |time| time <= clock) {
            let Some(lanes) = wave.extract_next_spawn() else {
                break;
            };
            let lane_total = lanes.len();
            for (lane, code) in lanes.into_iter().enumerate() {
                let Some(code) = code else {
                    continue;
                };
                if code.kind().map_or(true, |kind| !kind.is_hostile()) {
                    tracing::warn!(%code, "skipping unknown spawn code");
                    continue;
                }
                let Some(column) = lane_column(self.grid_columns, lane_total, lane) else {
                    continue;
                };
                out.push(Command::PlaceUnit {
                    kind: UnitKind::Enemy,
                    cell: CellCoord::new(0, column),
                    stats,
                });
                emitted += 1;
            }
        }

        if emitted > 0 {
            tracing::debug!(wave = self.wave, emitted, "released spawns");
        }
        emitted
    }

    fn on_wave_end(&mut self) {
        let next = self.allowed_columns_for(self.wave + 1);
        self.just_switched_columns = next != self.allowed_columns;
        self.allowed_columns = next;
        self.wave_clock = None;
        self.current = None;
        tracing::info!(wave = self.wave, "wave cleared");
    }

    /// Requests a shooter purchase at `cell` if the cell lies in the unlocked area.
    ///
    /// Gold and occupancy are checked by the world.
    pub fn request_placement(
        &self,
        world: &World,
        cell: CellCoord,
        out: &mut Vec<Command>,
    ) -> bool {
        if !self.can_place_at(world, cell) {
            return false;
        }
        out.push(Command::PlaceUnit {
            kind: UnitKind::Shooter,
            cell,
            stats: self.catalog.stats(UnitKind::Shooter),
        });
        true
    }

    /// Reports whether the player may place a unit at `cell` right now.
    #[must_use]
    pub fn can_place_at(&self, world: &World, cell: CellCoord) -> bool {
        if query::is_building_fallen(world) || cell.row() == 0 {
            return false;
        }
        let offset = signed_column_offset(cell.column(), self.grid_columns);
        offset.unsigned_abs() <= u64::from(self.allowed_columns)
    }

    /// Requests that `unit` spend a pending level on the chosen stat.
    pub fn request_upgrade(
        &self,
        world: &World,
        unit: UnitId,
        choice: UpgradeChoice,
        out: &mut Vec<Command>,
    ) -> bool {
        if query::is_building_fallen(world) {
            return false;
        }
        let Some(snapshot) = query::unit(world, unit) else {
            return false;
        };

        let upgrade = match choice {
            UpgradeChoice::Health => StatUpgrade::Health(self.config.upgrades.health),
            UpgradeChoice::Strength => StatUpgrade::Strength(self.config.upgrades.strength),
        };
        out.push(Command::UpgradeUnit {
            unit,
            upgrade,
            baseline: self.catalog.stats(snapshot.kind),
        });
        true
    }

    /// Half-width of the placement area for the provided wave on this grid.
    #[must_use]
    pub fn allowed_columns_for(&self, wave: u32) -> u32 {
        allowed_columns(&self.config.column_table, wave, self.grid_columns)
    }

    fn lanes_for(&self, wave: u32) -> usize {
        lane_count(self.allowed_columns_for(wave), self.grid_columns)
    }

    /// Number of the current or most recently finished wave; zero before the first.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Era derived from the wave number.
    #[must_use]
    pub const fn era(&self) -> Era {
        Era::for_wave(self.wave)
    }

    /// Reports whether a wave is running.
    #[must_use]
    pub const fn is_wave_active(&self) -> bool {
        self.wave_clock.is_some()
    }

    /// Time elapsed in the running wave.
    #[must_use]
    pub const fn wave_clock(&self) -> Option<Duration> {
        self.wave_clock
    }

    /// Half-width of the placement area currently unlocked.
    #[must_use]
    pub const fn allowed_columns(&self) -> u32 {
        self.allowed_columns
    }

    /// Set when the unlocked area is about to widen; cleared by the next placement or wave start.
    #[must_use]
    pub const fn just_switched_columns(&self) -> bool {
        self.just_switched_columns
    }

    /// Reports whether another wave is available to start.
    #[must_use]
    pub fn has_next_wave(&self) -> bool {
        self.waves.contains(self.wave + 1)
    }

    /// Balance catalog holding the accumulated boosts.
    #[must_use]
    pub const fn catalog(&self) -> &KindCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_columns_follow_table_then_half_grid() {
        let table = ProgressionConfig::default().column_table;
        for wave in 1..=4 {
            assert_eq!(allowed_columns(&table, wave, 15), 2, "wave {wave}");
        }
        for wave in 5..=9 {
            assert_eq!(allowed_columns(&table, wave, 15), 3, "wave {wave}");
        }
        assert_eq!(allowed_columns(&table, 29, 15), 8);
        assert_eq!(allowed_columns(&table, 30, 15), 7);
        assert_eq!(allowed_columns(&table, 200, 20), 10);
    }

    #[test]
    fn column_offsets_skip_zero() {
        let offsets: Vec<i64> = (0..6).map(|column| signed_column_offset(column, 6)).collect();
        assert_eq!(offsets, vec![-3, -2, -1, 1, 2, 3]);
        assert_eq!(signed_column_offset(7, 15), 1);
        assert_eq!(signed_column_offset(6, 15), -1);
    }

    #[test]
    fn placement_is_limited_to_unlocked_columns() {
        let world = World::new();
        let progression = Progression::new(ProgressionConfig::default(), 15);
        let mut out = Vec::new();

        assert!(!progression.request_placement(&world, CellCoord::new(0, 7), &mut out));
        assert!(progression.request_placement(&world, CellCoord::new(5, 5), &mut out));
        assert!(progression.request_placement(&world, CellCoord::new(5, 8), &mut out));
        assert!(!progression.request_placement(&world, CellCoord::new(5, 4), &mut out));
        assert!(!progression.request_placement(&world, CellCoord::new(5, 9), &mut out));
        assert_eq!(out.len(), 2);
    }
}
