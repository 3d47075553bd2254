//! Unit state machines and the arena that owns them.

use std::{collections::BTreeMap, time::Duration};

use defense_evolution_core::{
    AnimationKey, CellCoord, Direction, Event, PixelPoint, StatUpgrade, UnitId, UnitKind,
    UnitSnapshot, UnitState, UnitStats, UpgradeError,
};

/// Authoritative state of a single unit.
#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) kind: UnitKind,
    pub(crate) stats: UnitStats,
    /// Cell the unit is heading for or standing on.
    pub(crate) cell: CellCoord,
    /// Cell recorded in the occupancy grid.
    pub(crate) anchor: CellCoord,
    pub(crate) position: PixelPoint,
    pub(crate) health: i32,
    pub(crate) direction: Direction,
    pub(crate) bounty_claimed: bool,
    experience: u32,
    level: u32,
    moving: bool,
    attacking: bool,
    ready_at: Duration,
    pending_upgrades: u32,
    active: bool,
}

impl Unit {
    pub(crate) fn spawn(id: UnitId, kind: UnitKind, cell: CellCoord, stats: UnitStats) -> Self {
        let direction = if kind.is_hostile() {
            Direction::Down
        } else {
            Direction::Up
        };
        Self {
            id,
            kind,
            stats,
            cell,
            anchor: cell,
            position: cell.origin(),
            health: saturating_i32(stats.base_health),
            direction,
            bounty_claimed: false,
            experience: 0,
            level: 1,
            moving: false,
            attacking: false,
            ready_at: Duration::ZERO,
            pending_upgrades: 0,
            active: true,
        }
    }

    /// Alive units are the only combat participants.
    pub(crate) fn is_alive(&self) -> bool {
        self.active && self.health > 0
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn is_moving(&self) -> bool {
        self.moving
    }

    pub(crate) fn can_attack(&self, clock: Duration) -> bool {
        clock >= self.ready_at
    }

    pub(crate) fn state(&self) -> UnitState {
        if self.moving {
            UnitState::Moving
        } else if self.attacking {
            UnitState::Attacking
        } else {
            UnitState::Idle
        }
    }

    /// Starts a single-cell step. Returns the destination when the step is legal.
    pub(crate) fn request_move(
        &mut self,
        direction: Direction,
        rows: u32,
        columns: u32,
    ) -> Option<CellCoord> {
        if self.moving {
            return None;
        }
        let destination = self.cell.step(direction, rows, columns)?;
        self.cell = destination;
        self.direction = direction;
        self.moving = true;
        Some(destination)
    }

    /// Abandons a step whose destination was taken, heading back to the anchor.
    pub(crate) fn cancel_move(&mut self) {
        self.cell = self.anchor;
    }

    /// Advances the state machine by one tick. Returns `true` when the unit died during this call.
    pub(crate) fn advance(&mut self, clock: Duration) -> bool {
        if self.health <= 0 {
            let was_active = self.active;
            self.active = false;
            return was_active;
        }

        if self.moving {
            let target = self.cell.origin();
            if self.position == target {
                self.moving = false;
            } else {
                self.position = PixelPoint::new(
                    approach(self.position.x, target.x, self.stats.speed),
                    approach(self.position.y, target.y, self.stats.speed),
                );
            }
        }

        if self.attacking && clock >= self.ready_at {
            self.attacking = false;
        }

        false
    }

    /// Enters the attack pose and arms the cooldown.
    pub(crate) fn begin_attack(&mut self, clock: Duration) {
        self.attacking = true;
        self.ready_at = clock.saturating_add(self.stats.cooldown);
    }

    /// Subtracts damage. Returns `true` when this hit took the unit from alive to dead.
    pub(crate) fn take_damage(&mut self, damage: u32) -> bool {
        let was_alive = self.health > 0;
        self.health = self.health.saturating_sub(saturating_i32(damage));
        was_alive && self.health <= 0
    }

    /// Adds experience and levels up once per threshold crossed.
    pub(crate) fn gain_experience(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        self.experience = self.experience.saturating_add(amount);
        let Some(table) = self.kind.profile().xp_table else {
            return;
        };

        while let Some(threshold) = usize::try_from(self.level - 1)
            .ok()
            .and_then(|index| table.get(index))
        {
            if self.experience < *threshold {
                break;
            }
            self.level += 1;
            self.pending_upgrades += 1;
            tracing::debug!(unit = self.id.get(), level = self.level, "unit leveled up");
            out_events.push(Event::UnitLeveledUp {
                unit: self.id,
                level: self.level,
            });
        }
    }

    /// Spends one pending level, first lifting stats to the catalog baseline.
    pub(crate) fn apply_upgrade(
        &mut self,
        upgrade: StatUpgrade,
        baseline: UnitStats,
    ) -> Result<(), UpgradeError> {
        if self.pending_upgrades == 0 {
            return Err(UpgradeError::NoPendingLevel);
        }

        self.stats.base_health = self.stats.base_health.max(baseline.base_health);
        self.stats.strength = self.stats.strength.max(baseline.strength);
        match upgrade {
            StatUpgrade::Health(amount) => {
                self.stats.base_health = self.stats.base_health.saturating_add(amount);
                self.health = saturating_i32(self.stats.base_health);
            }
            StatUpgrade::Strength(amount) => {
                self.stats.strength = self.stats.strength.saturating_add(amount);
            }
        }
        self.pending_upgrades -= 1;
        Ok(())
    }

    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        let state = self.state();
        UnitSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            health: self.health,
            max_health: self.stats.base_health,
            strength: self.stats.strength,
            level: self.level,
            experience: self.experience,
            state,
            direction: self.direction,
            pending_upgrade: self.pending_upgrades > 0,
            animation: AnimationKey::new(self.kind, state, self.direction),
        }
    }
}

/// Registry that stores units and hands out identifiers that are never reused.
#[derive(Debug)]
pub(crate) struct UnitRegistry {
    entries: BTreeMap<UnitId, Unit>,
    next_unit_id: UnitId,
}

impl UnitRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_unit_id: UnitId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, kind: UnitKind, cell: CellCoord, stats: UnitStats) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, Unit::spawn(id, kind, cell, stats));
        id
    }

    pub(crate) fn get(&self, id: UnitId) -> Option<&Unit> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.entries.remove(&id)
    }

    /// Drops every unit while keeping the identifier counter.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.entries.values_mut()
    }

    pub(crate) fn is_living(&self, id: UnitId, kind: UnitKind) -> bool {
        self.get(id)
            .map_or(false, |unit| unit.kind == kind && unit.is_alive())
    }
}

/// Applies an attack and awards experience to the attacker on a kill.
///
/// Damage comes from the attacker's current strength, or `fallback_strength`
/// when the attacker no longer exists. Returns `None` when the target is gone.
pub(crate) fn resolve_attack(
    units: &mut UnitRegistry,
    attacker: UnitId,
    fallback_strength: u32,
    target: UnitId,
    out_events: &mut Vec<Event>,
) -> Option<u32> {
    let damage = units
        .get(attacker)
        .map_or(fallback_strength, |unit| unit.stats.strength);

    let target_unit = units.get_mut(target)?;
    let killed = target_unit.take_damage(damage);
    let target_kind = target_unit.kind;
    let xp_value = target_unit.stats.xp_value;

    if killed {
        let killer = units.get_mut(attacker).map(|unit| {
            unit.gain_experience(xp_value, out_events);
            unit.id
        });
        tracing::debug!(unit = target.get(), ?target_kind, "unit killed");
        out_events.push(Event::UnitKilled {
            unit: target,
            kind: target_kind,
            killer,
        });
    }

    Some(damage)
}

fn approach(current: f32, target: f32, speed: f32) -> f32 {
    if current < target {
        (current + speed).min(target)
    } else {
        (current - speed).max(target)
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
