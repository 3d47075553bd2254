#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Defense Evolution.

mod economy;
mod projectiles;
mod units;

use std::time::Duration;

use defense_evolution_core::{
    frame_units, CellCoord, Command, Direction, Event, PixelPoint, PlacementError, UnitId,
    UnitKind, UnitStats, UpgradeError, CELL_SIZE,
};

use economy::Economy;
use projectiles::{Launch, ProjectileRegistry};
use units::{resolve_attack, UnitRegistry};

const DEFAULT_GRID_ROWS: u32 = 10;
const DEFAULT_GRID_COLUMNS: u32 = 15;

/// Horizontal offset of a projectile's spawn point from the shooter's cell centre.
const MUZZLE_OFFSET: f32 = 2.0;

/// Represents the authoritative Defense Evolution world state.
#[derive(Debug)]
pub struct World {
    occupancy: OccupancyGrid,
    units: UnitRegistry,
    projectiles: ProjectileRegistry,
    economy: Economy,
    clock: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a new world with the default grid and starting economy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            occupancy: OccupancyGrid::new(DEFAULT_GRID_ROWS, DEFAULT_GRID_COLUMNS),
            units: UnitRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            economy: Economy::default(),
            clock: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn place_unit(
        &mut self,
        kind: UnitKind,
        cell: CellCoord,
        stats: UnitStats,
        out_events: &mut Vec<Event>,
    ) {
        if let Err(reason) = self.check_placement(kind, cell, stats) {
            out_events.push(Event::PlacementRejected { kind, cell, reason });
            return;
        }

        if !kind.is_hostile() {
            let balance = self.economy.debit(stats.gold_value);
            out_events.push(Event::GoldChanged { balance });
        }

        let unit = self.units.spawn(kind, cell, stats);
        self.occupancy.occupy(unit, cell);
        out_events.push(Event::UnitPlaced { unit, kind, cell });
    }

    fn check_placement(
        &self,
        kind: UnitKind,
        cell: CellCoord,
        stats: UnitStats,
    ) -> Result<(), PlacementError> {
        if !self.occupancy.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.occupancy.occupant(cell).is_some() {
            return Err(PlacementError::Occupied);
        }
        if !kind.is_hostile() {
            if self.economy.is_fallen() {
                return Err(PlacementError::BuildingFallen);
            }
            let available = self.economy.gold();
            if available < i64::from(stats.gold_value) {
                return Err(PlacementError::InsufficientGold {
                    required: stats.gold_value,
                    available,
                });
            }
        }
        Ok(())
    }

    fn move_unit(&mut self, unit_id: UnitId, direction: Direction, out_events: &mut Vec<Event>) {
        let (rows, columns) = self.occupancy.dimensions();
        let accepted = self.units.get_mut(unit_id).map_or(false, |unit| {
            let Some(destination) = unit.cell.step(direction, rows, columns) else {
                return false;
            };
            if unit.is_moving()
                || !unit.is_alive()
                || self.occupancy.occupant(destination).is_some()
            {
                return false;
            }
            unit.request_move(direction, rows, columns).is_some()
        });

        if !accepted {
            out_events.push(Event::MoveRejected {
                unit: unit_id,
                direction,
            });
        }
    }

    fn remove_at(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(unit_id) = self.occupancy.occupant(cell) else {
            return;
        };
        self.occupancy.vacate(cell);
        if let Some(unit) = self.units.remove(unit_id) {
            out_events.push(Event::UnitRemoved {
                unit: unit_id,
                kind: unit.kind,
                cell,
            });
        }
    }

    fn damage_building(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        let (health, fell) = self.economy.damage(amount);
        out_events.push(Event::BuildingHealthChanged { health });
        if fell {
            tracing::info!("building has fallen");
            out_events.push(Event::BuildingFallen);
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        self.advance_units(out_events);
        self.reconcile_moves(out_events);
        self.advance_enemies(out_events);
        self.trigger_attacks(out_events);
        tracing::debug!(
            tick = self.tick_index,
            enemies = query::enemy_count(self),
            "enemy count"
        );
        self.advance_projectiles(dt, out_events);
    }

    fn advance_units(&mut self, out_events: &mut Vec<Event>) {
        for (cell, unit_id) in self.occupancy.occupied() {
            let Some(unit) = self.units.get_mut(unit_id) else {
                self.occupancy.vacate(cell);
                continue;
            };

            if !unit.is_active() {
                let kind = unit.kind;
                self.occupancy.vacate(cell);
                let _ = self.units.remove(unit_id);
                out_events.push(Event::UnitRemoved {
                    unit: unit_id,
                    kind,
                    cell,
                });
            } else if unit.advance(self.clock) {
                out_events.push(Event::UnitDied {
                    unit: unit_id,
                    kind: unit.kind,
                });
            }
        }
    }

    fn reconcile_moves(&mut self, out_events: &mut Vec<Event>) {
        let Self {
            occupancy, units, ..
        } = self;

        for unit in units.iter_mut() {
            if unit.cell == unit.anchor {
                continue;
            }

            match occupancy.occupant(unit.cell) {
                Some(holder) if holder != unit.id => unit.cancel_move(),
                _ => {
                    let from = unit.anchor;
                    occupancy.vacate(from);
                    occupancy.occupy(unit.id, unit.cell);
                    unit.anchor = unit.cell;
                    out_events.push(Event::UnitMoved {
                        unit: unit.id,
                        from,
                        to: unit.cell,
                    });
                }
            }
        }
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        let (rows, columns) = self.occupancy.dimensions();
        for (cell, unit_id) in self.occupancy.occupied() {
            let Some(unit) = self.units.get_mut(unit_id) else {
                continue;
            };
            if unit.kind != UnitKind::Enemy || !unit.is_alive() || unit.is_moving() {
                continue;
            }
            let Some(below) = cell.step(Direction::Down, rows, columns) else {
                continue;
            };
            if self.occupancy.occupant(below).is_some() {
                continue;
            }
            if unit.request_move(Direction::Down, rows, columns).is_none() {
                continue;
            }

            self.occupancy.vacate(cell);
            self.occupancy.occupy(unit_id, below);
            unit.anchor = below;
            out_events.push(Event::UnitMoved {
                unit: unit_id,
                from: cell,
                to: below,
            });
        }
    }

    fn trigger_attacks(&mut self, out_events: &mut Vec<Event>) {
        for (cell, unit_id) in self.occupancy.occupied() {
            let Some(kind) = self
                .units
                .get(unit_id)
                .filter(|unit| unit.is_alive())
                .map(|unit| unit.kind)
            else {
                continue;
            };

            match kind {
                UnitKind::Shooter => self.shooter_attack(unit_id, cell, out_events),
                UnitKind::Enemy => self.enemy_attack(unit_id, cell, out_events),
            }
        }
    }

    fn shooter_attack(&mut self, unit_id: UnitId, cell: CellCoord, out_events: &mut Vec<Event>) {
        let clock = self.clock;
        let Some(shooter) = self.units.get(unit_id) else {
            return;
        };
        if !shooter.can_attack(clock) {
            return;
        }
        let Some(kind) = shooter.kind.profile().projectile else {
            return;
        };

        let target = (1..=cell.row())
            .map(|offset| CellCoord::new(cell.row() - offset, cell.column()))
            .filter_map(|candidate| self.occupancy.occupant(candidate))
            .find(|candidate| self.units.is_living(*candidate, UnitKind::Enemy));
        let Some(target) = target else {
            return;
        };

        let origin = shooter.position;
        let launch = Launch {
            kind,
            attacker: unit_id,
            target,
            direction: Direction::Up,
            position: PixelPoint::new(origin.x + CELL_SIZE / 2.0 - MUZZLE_OFFSET, origin.y),
            strength: shooter.stats.strength,
        };
        let projectile = self.projectiles.fire(launch);
        if let Some(shooter) = self.units.get_mut(unit_id) {
            shooter.direction = Direction::Up;
            shooter.begin_attack(clock);
        }
        out_events.push(Event::ProjectileFired {
            projectile,
            attacker: unit_id,
            target,
        });
    }

    fn enemy_attack(&mut self, unit_id: UnitId, cell: CellCoord, out_events: &mut Vec<Event>) {
        let clock = self.clock;
        let (rows, columns) = self.occupancy.dimensions();
        let Some(enemy) = self.units.get(unit_id) else {
            return;
        };
        if enemy.is_moving() {
            return;
        }

        if cell.row() + 1 == rows {
            let damage = enemy.stats.strength;
            self.occupancy.vacate(cell);
            let _ = self.units.remove(unit_id);
            tracing::debug!(unit = unit_id.get(), damage, "building breached");
            out_events.push(Event::BuildingBreached {
                unit: unit_id,
                damage,
            });
            out_events.push(Event::UnitRemoved {
                unit: unit_id,
                kind: UnitKind::Enemy,
                cell,
            });
            self.damage_building(damage, out_events);
            return;
        }

        if !enemy.can_attack(clock) {
            return;
        }
        let Some(target) = cell
            .step(Direction::Down, rows, columns)
            .and_then(|below| self.occupancy.occupant(below))
            .filter(|candidate| self.units.is_living(*candidate, UnitKind::Shooter))
        else {
            return;
        };

        if let Some(damage) = resolve_attack(&mut self.units, unit_id, 0, target, out_events) {
            out_events.push(Event::UnitStruck {
                attacker: unit_id,
                target,
                damage,
            });
        }
        if let Some(enemy) = self.units.get_mut(unit_id) {
            enemy.begin_attack(clock);
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let frames = frame_units(dt);
        for projectile_id in self.projectiles.ids() {
            let Some(projectile) = self.projectiles.get_mut(projectile_id) else {
                continue;
            };
            let target_id = projectile.target;

            let Some(target) = self.units.get(target_id) else {
                let _ = self.projectiles.remove(projectile_id);
                out_events.push(Event::ProjectileResolved {
                    projectile: projectile_id,
                    target: target_id,
                    damage: 0,
                });
                continue;
            };

            if target.is_alive() {
                projectile.advance(frames);
            } else {
                projectile.mark_hit();
            }
            if !projectile.check_hit(target.position) {
                continue;
            }

            let Some(projectile) = self.projectiles.remove(projectile_id) else {
                continue;
            };
            let damage = resolve_attack(
                &mut self.units,
                projectile.attacker,
                projectile.strength,
                target_id,
                out_events,
            )
            .unwrap_or(0);
            tracing::debug!(
                projectile = projectile_id.get(),
                target = target_id.get(),
                damage,
                "projectile resolved"
            );
            out_events.push(Event::ProjectileResolved {
                projectile: projectile_id,
                target: target_id,
                damage,
            });
            self.claim_bounty(target_id, out_events);
        }
    }

    fn claim_bounty(&mut self, unit_id: UnitId, out_events: &mut Vec<Event>) {
        let Some(unit) = self.units.get_mut(unit_id) else {
            return;
        };
        if !unit.kind.is_hostile() || unit.health > 0 || unit.bounty_claimed {
            return;
        }

        unit.bounty_claimed = true;
        let amount = unit.stats.gold_value;
        let balance = self.economy.credit(amount);
        out_events.push(Event::BountyCredited {
            unit: unit_id,
            amount,
        });
        out_events.push(Event::GoldChanged { balance });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { rows, columns } => {
            world.occupancy = OccupancyGrid::new(rows, columns);
            world.units.clear();
            world.projectiles.clear();
            out_events.push(Event::GridConfigured { rows, columns });
        }
        Command::ResetEconomy {
            gold,
            building_health,
        } => {
            world.economy = Economy::new(gold, building_health);
            out_events.push(Event::GoldChanged { balance: gold });
            out_events.push(Event::BuildingHealthChanged {
                health: building_health,
            });
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::PlaceUnit { kind, cell, stats } => world.place_unit(kind, cell, stats, out_events),
        Command::MoveUnit { unit, direction } => world.move_unit(unit, direction, out_events),
        Command::RemoveUnit { cell } => world.remove_at(cell, out_events),
        Command::UpgradeUnit {
            unit,
            upgrade,
            baseline,
        } => {
            let result = world
                .units
                .get_mut(unit)
                .ok_or(UpgradeError::MissingUnit)
                .and_then(|state| state.apply_upgrade(upgrade, baseline));
            match result {
                Ok(()) => out_events.push(Event::UnitUpgraded { unit, upgrade }),
                Err(reason) => out_events.push(Event::UpgradeRejected { unit, reason }),
            }
        }
        Command::AddGold { amount } => {
            let balance = world.economy.credit(amount);
            out_events.push(Event::GoldChanged { balance });
        }
        Command::RemoveGold { amount } => {
            let balance = world.economy.debit(amount);
            out_events.push(Event::GoldChanged { balance });
        }
        Command::HealBuilding { amount } => {
            if let Some(health) = world.economy.heal(amount) {
                out_events.push(Event::BuildingHealthChanged { health });
            }
        }
        Command::DamageBuilding { amount } => world.damage_building(amount, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use defense_evolution_core::{
        CellCoord, OccupancyView, ProjectileView, UnitId, UnitKind, UnitSnapshot, UnitView,
    };

    /// Captures the unit occupying the provided cell. Out-of-range cells yield `None`.
    #[must_use]
    pub fn unit_at(world: &World, cell: CellCoord) -> Option<UnitSnapshot> {
        world
            .occupancy
            .occupant(cell)
            .and_then(|unit| self::unit(world, unit))
    }

    /// Captures the unit with the provided identifier, if it still exists.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world.units.get(unit).map(|state| state.snapshot())
    }

    /// Captures a read-only view of every unit on the battlefield.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Captures a read-only view of every in-flight projectile.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        let (rows, columns) = world.occupancy.dimensions();
        OccupancyView::new(world.occupancy.cells(), rows, columns)
    }

    /// Counts cells currently held by hostile units.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world
            .occupancy
            .cells()
            .iter()
            .flatten()
            .filter(|unit| {
                world
                    .units
                    .get(**unit)
                    .map_or(false, |state| state.kind == UnitKind::Enemy)
            })
            .count()
    }

    /// Dimensions of the battlefield as `(rows, columns)`.
    #[must_use]
    pub fn grid_dimensions(world: &World) -> (u32, u32) {
        world.occupancy.dimensions()
    }

    /// Total simulated time since the world was created.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Gold held by the player; may be negative.
    #[must_use]
    pub fn gold(world: &World) -> i64 {
        world.economy.gold()
    }

    /// Remaining health of the defended building.
    #[must_use]
    pub fn building_health(world: &World) -> u32 {
        world.economy.building_health()
    }

    /// Reports whether the building has fallen, which ends the game.
    #[must_use]
    pub fn is_building_fallen(world: &World) -> bool {
        world.economy.is_fallen()
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    rows: u32,
    columns: u32,
    cells: Vec<Option<UnitId>>,
}

impl OccupancyGrid {
    fn new(rows: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            cells: vec![None; capacity],
        }
    }

    fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, unit: UnitId, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(unit);
            }
        }
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
    }

    /// Snapshot of every occupied cell in row-major order.
    fn occupied(&self) -> Vec<(CellCoord, UnitId)> {
        let width = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let unit = (*slot)?;
                let row = u32::try_from(index / width).ok()?;
                let column = u32::try_from(index % width).ok()?;
                Some((CellCoord::new(row, column), unit))
            })
            .collect()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn cells(&self) -> &[Option<UnitId>] {
        &self.cells
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defense_evolution_core::UnitState;

    fn place(world: &mut World, kind: UnitKind, row: u32, column: u32) -> UnitId {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlaceUnit {
                kind,
                cell: CellCoord::new(row, column),
                stats: UnitStats::base(kind),
            },
            &mut events,
        );
        events
            .into_iter()
            .find_map(|event| match event {
                Event::UnitPlaced { unit, .. } => Some(unit),
                _ => None,
            })
            .expect("placement should succeed")
    }

    fn tick(world: &mut World, events: &mut Vec<Event>) {
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            events,
        );
    }

    #[test]
    fn configure_grid_rebuilds_occupancy() {
        let mut world = World::new();
        let mut events = Vec::new();
        let _ = place(&mut world, UnitKind::Enemy, 0, 0);

        apply(
            &mut world,
            Command::ConfigureGrid {
                rows: 4,
                columns: 6,
            },
            &mut events,
        );

        assert_eq!(query::grid_dimensions(&world), (4, 6));
        assert_eq!(query::enemy_count(&world), 0);
        assert_eq!(query::occupancy_view(&world).iter().count(), 24);
        assert_eq!(
            events,
            vec![Event::GridConfigured {
                rows: 4,
                columns: 6
            }]
        );
    }

    #[test]
    fn move_command_is_committed_on_next_tick() {
        let mut world = World::new();
        let shooter = place(&mut world, UnitKind::Shooter, 5, 5);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveUnit {
                unit: shooter,
                direction: Direction::Left,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(
            query::unit_at(&world, CellCoord::new(5, 5)).map(|unit| unit.id),
            Some(shooter),
            "occupancy changes only during reconciliation"
        );

        tick(&mut world, &mut events);
        assert!(events.contains(&Event::UnitMoved {
            unit: shooter,
            from: CellCoord::new(5, 5),
            to: CellCoord::new(5, 4),
        }));
        let snapshot = query::unit_at(&world, CellCoord::new(5, 4)).expect("shooter moved");
        assert_eq!(snapshot.state, UnitState::Moving);
        assert_eq!(snapshot.direction, Direction::Left);
        assert!(query::unit_at(&world, CellCoord::new(5, 5)).is_none());
    }

    #[test]
    fn conflicting_moves_keep_occupancy_one_to_one() {
        let mut world = World::new();
        let left = place(&mut world, UnitKind::Shooter, 5, 3);
        let right = place(&mut world, UnitKind::Shooter, 5, 5);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveUnit {
                unit: left,
                direction: Direction::Right,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MoveUnit {
                unit: right,
                direction: Direction::Left,
            },
            &mut events,
        );
        tick(&mut world, &mut events);

        assert_eq!(
            query::unit_at(&world, CellCoord::new(5, 4)).map(|unit| unit.id),
            Some(left)
        );
        assert_eq!(
            query::unit_at(&world, CellCoord::new(5, 5)).map(|unit| unit.id),
            Some(right)
        );
        assert_eq!(
            query::unit(&world, right).map(|unit| unit.cell),
            Some(CellCoord::new(5, 5)),
            "cancelled move heads back to its own cell"
        );
    }

    #[test]
    fn move_into_occupied_cell_is_rejected() {
        let mut world = World::new();
        let shooter = place(&mut world, UnitKind::Shooter, 5, 5);
        let _ = place(&mut world, UnitKind::Shooter, 4, 5);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveUnit {
                unit: shooter,
                direction: Direction::Up,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::MoveRejected {
                unit: shooter,
                direction: Direction::Up,
            }]
        );
    }

    #[test]
    fn shooter_fires_up_its_column() {
        let mut world = World::new();
        let shooter = place(&mut world, UnitKind::Shooter, 6, 2);
        let enemy = place(&mut world, UnitKind::Enemy, 0, 2);
        let mut events = Vec::new();

        tick(&mut world, &mut events);

        assert!(events.contains(&Event::ProjectileFired {
            projectile: defense_evolution_core::ProjectileId::new(0),
            attacker: shooter,
            target: enemy,
        }));
        let view = query::projectile_view(&world);
        let arrow = view.iter().next().expect("arrow in flight");
        assert_eq!(arrow.direction, Direction::Up);
        assert_eq!(
            query::unit(&world, shooter).map(|unit| unit.state),
            Some(UnitState::Attacking)
        );
    }

    #[test]
    fn shooter_ignores_enemies_in_other_columns() {
        let mut world = World::new();
        let _ = place(&mut world, UnitKind::Shooter, 6, 2);
        let _ = place(&mut world, UnitKind::Enemy, 0, 3);
        let mut events = Vec::new();

        tick(&mut world, &mut events);
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn enemy_strikes_shooter_directly_below() {
        let mut world = World::new();
        let enemy = place(&mut world, UnitKind::Enemy, 3, 7);
        let shooter = place(&mut world, UnitKind::Shooter, 4, 7);
        let mut events = Vec::new();

        tick(&mut world, &mut events);

        assert!(events.contains(&Event::UnitStruck {
            attacker: enemy,
            target: shooter,
            damage: 5,
        }));
        assert_eq!(query::unit(&world, shooter).map(|unit| unit.health), Some(95));

        events.clear();
        tick(&mut world, &mut events);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::UnitStruck { .. })),
            "cooldown blocks the follow-up strike"
        );
    }

    #[test]
    fn removed_target_resolves_projectile_as_no_op() {
        let mut world = World::new();
        let _ = place(&mut world, UnitKind::Shooter, 8, 1);
        let enemy = place(&mut world, UnitKind::Enemy, 0, 1);
        let mut events = Vec::new();

        tick(&mut world, &mut events);
        apply(
            &mut world,
            Command::RemoveUnit {
                cell: CellCoord::new(1, 1),
            },
            &mut events,
        );
        events.clear();
        tick(&mut world, &mut events);

        assert!(events.contains(&Event::ProjectileResolved {
            projectile: defense_evolution_core::ProjectileId::new(0),
            target: enemy,
            damage: 0,
        }));
        assert!(query::projectile_view(&world).is_empty());
        assert_eq!(query::gold(&world), 400);
    }
}
