#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Defense Evolution engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod animation;
pub mod balance;

pub use animation::{AnimationKey, AnimationTable};
pub use balance::{KindBoosts, KindCatalog, UnitStats};

/// Side length of a grid cell expressed in render pixels.
pub const CELL_SIZE: f32 = 40.0;

/// Number of frame units contained in one second of simulated time.
///
/// Projectile speeds are expressed per frame unit so that a frame running at
/// the nominal rate advances a projectile by exactly its speed.
pub const FRAMES_PER_SECOND: f32 = 60.0;

/// Converts a simulated duration into nominal frame units.
#[must_use]
pub fn frame_units(dt: Duration) -> f32 {
    dt.as_secs_f32() * FRAMES_PER_SECOND
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the battlefield with the provided dimensions, discarding all units.
    ConfigureGrid {
        /// Number of cell rows; row zero is the spawn edge.
        rows: u32,
        /// Number of cell columns.
        columns: u32,
    },
    /// Replaces the economy state with fresh starting values.
    ResetEconomy {
        /// Gold available to the player.
        gold: i64,
        /// Health of the defended building.
        building_health: u32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a unit at the provided cell.
    PlaceUnit {
        /// Kind of unit to create.
        kind: UnitKind,
        /// Cell the unit should occupy.
        cell: CellCoord,
        /// Stats snapshotted from the balance catalog at request time.
        stats: UnitStats,
    },
    /// Requests that a unit advance a single cell in the provided direction.
    MoveUnit {
        /// Identifier of the unit to move.
        unit: UnitId,
        /// Direction of the single-cell step.
        direction: Direction,
    },
    /// Removes whichever unit occupies the provided cell.
    RemoveUnit {
        /// Cell to clear.
        cell: CellCoord,
    },
    /// Spends one pending level of a unit on a stat upgrade.
    UpgradeUnit {
        /// Identifier of the unit to upgrade.
        unit: UnitId,
        /// Stat to raise.
        upgrade: StatUpgrade,
        /// Current catalog stats for the unit's kind, used as a floor.
        baseline: UnitStats,
    },
    /// Credits gold to the player.
    AddGold {
        /// Amount of gold to add.
        amount: u32,
    },
    /// Debits gold from the player without overdraft protection.
    RemoveGold {
        /// Amount of gold to remove.
        amount: u32,
    },
    /// Restores health to the building unless it has already fallen.
    HealBuilding {
        /// Amount of health to restore.
        amount: u32,
    },
    /// Damages the building, saturating at zero.
    DamageBuilding {
        /// Amount of damage to inflict.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the battlefield was rebuilt.
    GridConfigured {
        /// Number of rows in the new grid.
        rows: u32,
        /// Number of columns in the new grid.
        columns: u32,
    },
    /// Confirms that a unit was placed onto the grid.
    UnitPlaced {
        /// Identifier assigned to the unit by the world.
        unit: UnitId,
        /// Kind of unit that was placed.
        kind: UnitKind,
        /// Cell the unit occupies.
        cell: CellCoord,
    },
    /// Reports that a placement request left the world unchanged.
    PlacementRejected {
        /// Kind of unit requested for placement.
        kind: UnitKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a unit claimed a neighbouring cell.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit left.
        from: CellCoord,
        /// Cell the unit now occupies.
        to: CellCoord,
    },
    /// Reports that a move request was refused.
    MoveRejected {
        /// Identifier of the unit that attempted to move.
        unit: UnitId,
        /// Direction of the refused step.
        direction: Direction,
    },
    /// Reports that a shooter released a projectile.
    ProjectileFired {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Unit that fired.
        attacker: UnitId,
        /// Unit targeted by the projectile.
        target: UnitId,
    },
    /// Reports that a projectile landed and was removed.
    ProjectileResolved {
        /// Identifier of the resolved projectile.
        projectile: ProjectileId,
        /// Unit the projectile was aimed at.
        target: UnitId,
        /// Damage applied; zero when the target no longer existed.
        damage: u32,
    },
    /// Reports a melee strike delivered without a projectile.
    UnitStruck {
        /// Unit that attacked.
        attacker: UnitId,
        /// Unit that received the damage.
        target: UnitId,
        /// Damage applied.
        damage: u32,
    },
    /// Reports that damage took a unit from alive to dead.
    UnitKilled {
        /// Identifier of the unit that died.
        unit: UnitId,
        /// Kind of the unit that died.
        kind: UnitKind,
        /// Unit credited with the kill, if it still exists.
        killer: Option<UnitId>,
    },
    /// Reports that a unit with depleted health was marked inactive.
    UnitDied {
        /// Identifier of the unit.
        unit: UnitId,
        /// Kind of the unit.
        kind: UnitKind,
    },
    /// Reports that a unit left the grid.
    UnitRemoved {
        /// Identifier of the removed unit.
        unit: UnitId,
        /// Kind of the removed unit.
        kind: UnitKind,
        /// Cell the unit occupied.
        cell: CellCoord,
    },
    /// Reports that a unit crossed an experience threshold.
    UnitLeveledUp {
        /// Identifier of the unit that leveled up.
        unit: UnitId,
        /// Level reached.
        level: u32,
    },
    /// Confirms that a pending level was spent on an upgrade.
    UnitUpgraded {
        /// Identifier of the upgraded unit.
        unit: UnitId,
        /// Upgrade that was applied.
        upgrade: StatUpgrade,
    },
    /// Reports that an upgrade request was refused.
    UpgradeRejected {
        /// Identifier named in the request.
        unit: UnitId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Reports that a slain hostile unit paid out its bounty.
    BountyCredited {
        /// Identifier of the slain unit.
        unit: UnitId,
        /// Gold credited.
        amount: u32,
    },
    /// Reports that a hostile unit reached the last row and struck the building.
    BuildingBreached {
        /// Identifier of the hostile unit.
        unit: UnitId,
        /// Damage dealt to the building.
        damage: u32,
    },
    /// Reports the gold balance after a change.
    GoldChanged {
        /// Balance after the change.
        balance: i64,
    },
    /// Reports the building health after a change.
    BuildingHealthChanged {
        /// Health after the change.
        health: u32,
    },
    /// Announces that the building health reached zero.
    BuildingFallen,
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Returns the neighbouring cell one step away, if it lies inside the grid.
    #[must_use]
    pub fn step(self, direction: Direction, rows: u32, columns: u32) -> Option<CellCoord> {
        let (row, column) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.column),
            Direction::Down => (self.row.checked_add(1)?, self.column),
            Direction::Left => (self.row, self.column.checked_sub(1)?),
            Direction::Right => (self.row, self.column.checked_add(1)?),
        };
        (row < rows && column < columns).then_some(CellCoord::new(row, column))
    }

    /// Pixel coordinate of the cell's upper-left corner.
    #[must_use]
    pub fn origin(self) -> PixelPoint {
        PixelPoint::new(self.column as f32 * CELL_SIZE, self.row as f32 * CELL_SIZE)
    }
}

/// Continuous render coordinate measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal coordinate; grows toward higher columns.
    pub x: f32,
    /// Vertical coordinate; grows toward higher rows.
    pub y: f32,
}

impl PixelPoint {
    /// Creates a new pixel coordinate.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Cardinal directions used for facing, movement, and projectile travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices, away from the building.
    Up,
    /// Toward increasing row indices, toward the building.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in lookup-table order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Dense index used by lookup tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

/// Unique identifier assigned to a unit. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Experience thresholds for the player-controlled kind.
const SHOOTER_XP_TABLE: [u32; 8] = [5, 10, 15, 20, 25, 30, 35, 40];

/// Kinds of units that can occupy the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Player-placed ranged defender.
    Shooter,
    /// Hostile unit that marches toward the building.
    Enemy,
}

impl UnitKind {
    /// Every unit kind in lookup-table order.
    pub const ALL: [UnitKind; 2] = [UnitKind::Shooter, UnitKind::Enemy];

    /// Dense index used by lookup tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Shooter => 0,
            Self::Enemy => 1,
        }
    }

    /// Reports whether the kind is hostile to the player.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Enemy)
    }

    /// Code identifying the kind inside wave definition files.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Shooter => "s",
            Self::Enemy => "e",
        }
    }

    /// Resolves a wave-file unit code, ignoring ASCII case.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(code))
    }

    /// Static per-kind constants before any balance boosts.
    #[must_use]
    pub const fn profile(self) -> KindProfile {
        match self {
            Self::Shooter => KindProfile {
                base_health: 100,
                cooldown: Duration::from_secs(2),
                strength: 10,
                speed: 1.0,
                gold_value: 100,
                xp_value: 0,
                xp_table: Some(&SHOOTER_XP_TABLE),
                projectile: Some(ProjectileKind::Arrow),
            },
            Self::Enemy => KindProfile {
                base_health: 50,
                cooldown: Duration::from_secs(1),
                strength: 5,
                speed: 0.5,
                gold_value: 20,
                xp_value: 1,
                xp_table: None,
                projectile: None,
            },
        }
    }
}

/// Static constants describing a unit kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindProfile {
    /// Health a freshly spawned unit starts with.
    pub base_health: u32,
    /// Refractory period between attacks.
    pub cooldown: Duration,
    /// Damage dealt per attack.
    pub strength: u32,
    /// Pixels travelled per tick while moving between cells.
    pub speed: f32,
    /// Purchase cost for player units, bounty for hostile units.
    pub gold_value: u32,
    /// Experience awarded to the unit that kills one of this kind.
    pub xp_value: u32,
    /// Cumulative experience thresholds; only kinds that level up carry one.
    pub xp_table: Option<&'static [u32]>,
    /// Projectile fired by ranged kinds.
    pub projectile: Option<ProjectileKind>,
}

/// Visual and physical type of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Arrow loosed by shooters.
    Arrow,
}

impl ProjectileKind {
    /// Pixels travelled per nominal frame unit.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Arrow => 30.0,
        }
    }

    /// Width and length of the projectile in pixels, measured along its travel axis.
    #[must_use]
    pub const fn extent(self) -> (f32, f32) {
        match self {
            Self::Arrow => (4.0, 21.0),
        }
    }
}

/// Behavioural state of a unit's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitState {
    /// Standing still and ready for orders.
    Idle,
    /// Interpolating toward a neighbouring cell.
    Moving,
    /// Holding the attack pose until the cooldown elapses.
    Attacking,
}

impl UnitState {
    /// Every state in lookup-table order.
    pub const ALL: [UnitState; 3] = [UnitState::Idle, UnitState::Moving, UnitState::Attacking];

    /// Dense index used by lookup tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Moving => 1,
            Self::Attacking => 2,
        }
    }
}

/// Stat raised when a unit spends a pending level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatUpgrade {
    /// Raises base health by the amount and refills health to the new maximum.
    Health(u32),
    /// Raises strength by the amount.
    Strength(u32),
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies beyond the configured grid bounds.
    OutOfBounds,
    /// The requested cell already holds a unit.
    Occupied,
    /// The building has fallen and the player can no longer buy units.
    BuildingFallen,
    /// The player cannot afford the unit.
    InsufficientGold {
        /// Gold the unit costs.
        required: u32,
        /// Gold the player holds.
        available: i64,
    },
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No unit with the provided identifier exists.
    MissingUnit,
    /// The unit has no unspent level.
    NoPendingLevel,
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Kind of the unit.
    pub kind: UnitKind,
    /// Cell the unit occupies.
    pub cell: CellCoord,
    /// Continuous render position.
    pub position: PixelPoint,
    /// Current health; values at or below zero mean the unit is dying.
    pub health: i32,
    /// Maximum health after upgrades.
    pub max_health: u32,
    /// Damage dealt per attack.
    pub strength: u32,
    /// Current level, starting at one.
    pub level: u32,
    /// Accumulated experience.
    pub experience: u32,
    /// Current behavioural state.
    pub state: UnitState,
    /// Current facing direction.
    pub direction: Direction,
    /// Indicates whether a level is waiting to be spent on an upgrade.
    pub pending_upgrade: bool,
    /// Render-state lookup key derived from kind, state, and direction.
    pub animation: AnimationKey,
}

/// Read-only snapshot describing all units on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Visual type of the projectile.
    pub kind: ProjectileKind,
    /// Unit that fired the projectile.
    pub attacker: UnitId,
    /// Unit the projectile is flying toward.
    pub target: UnitId,
    /// Direction of travel.
    pub direction: Direction,
    /// Continuous render position of the projectile's origin.
    pub position: PixelPoint,
}

/// Read-only snapshot describing all in-flight projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of in-flight projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<UnitId>],
    rows: u32,
    columns: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<UnitId>], rows: u32, columns: u32) -> Self {
        Self {
            cells,
            rows,
            columns,
        }
    }

    /// Returns the unit occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell lies inside the grid and holds no unit.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| matches!(self.cells.get(index), Some(None)))
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Option<UnitId>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying occupancy grid as `(rows, columns)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.row() < self.rows && cell.column() < self.columns {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stays_inside_grid() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::Up, 10, 15), None);
        assert_eq!(corner.step(Direction::Left, 10, 15), None);
        assert_eq!(
            corner.step(Direction::Down, 10, 15),
            Some(CellCoord::new(1, 0))
        );

        let far = CellCoord::new(9, 14);
        assert_eq!(far.step(Direction::Down, 10, 15), None);
        assert_eq!(far.step(Direction::Right, 10, 15), None);
        assert_eq!(
            far.step(Direction::Left, 10, 15),
            Some(CellCoord::new(9, 13))
        );
    }

    #[test]
    fn origin_scales_by_cell_size() {
        let origin = CellCoord::new(2, 3).origin();
        assert_eq!(origin, PixelPoint::new(120.0, 80.0));
    }

    #[test]
    fn unit_codes_ignore_case() {
        assert_eq!(UnitKind::from_code("e"), Some(UnitKind::Enemy));
        assert_eq!(UnitKind::from_code("E"), Some(UnitKind::Enemy));
        assert_eq!(UnitKind::from_code("s"), Some(UnitKind::Shooter));
        assert_eq!(UnitKind::from_code("dragon"), None);
    }

    #[test]
    fn only_shooters_level_up() {
        assert!(UnitKind::Shooter.profile().xp_table.is_some());
        assert!(UnitKind::Enemy.profile().xp_table.is_none());
        assert_eq!(
            UnitKind::Shooter.profile().projectile,
            Some(ProjectileKind::Arrow)
        );
    }

    #[test]
    fn occupancy_view_rejects_out_of_range_cells() {
        let cells = vec![None, Some(UnitId::new(4)), None, None];
        let view = OccupancyView::new(&cells, 2, 2);

        assert_eq!(view.occupant(CellCoord::new(0, 1)), Some(UnitId::new(4)));
        assert_eq!(view.occupant(CellCoord::new(5, 5)), None);
        assert!(view.is_free(CellCoord::new(1, 1)));
        assert!(!view.is_free(CellCoord::new(0, 1)));
        assert!(!view.is_free(CellCoord::new(2, 0)));
    }

    #[test]
    fn frame_units_follow_nominal_rate() {
        assert!((frame_units(Duration::from_secs(1)) - FRAMES_PER_SECOND).abs() < 1e-3);
        assert!((frame_units(Duration::from_millis(500)) - 30.0).abs() < 1e-3);
    }
}
