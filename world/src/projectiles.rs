//! In-flight projectiles and their direction-dependent hit tests.

use std::collections::BTreeMap;

use defense_evolution_core::{
    Direction, PixelPoint, ProjectileId, ProjectileKind, ProjectileSnapshot, UnitId, CELL_SIZE,
};

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) kind: ProjectileKind,
    pub(crate) attacker: UnitId,
    pub(crate) target: UnitId,
    pub(crate) direction: Direction,
    pub(crate) position: PixelPoint,
    /// Attacker strength captured at fire time.
    pub(crate) strength: u32,
    hit: bool,
}

impl Projectile {
    /// Moves the projectile by `frames` nominal frame units.
    pub(crate) fn advance(&mut self, frames: f32) {
        let distance = self.kind.speed() * frames;
        match self.direction {
            Direction::Up => self.position.y -= distance,
            Direction::Down => self.position.y += distance,
            Direction::Left => self.position.x -= distance,
            Direction::Right => self.position.x += distance,
        }
    }

    /// Records whether the projectile has reached the target's cell. Hits are sticky.
    pub(crate) fn check_hit(&mut self, target: PixelPoint) -> bool {
        let (_, length) = self.kind.extent();
        let reached = match self.direction {
            Direction::Up => self.position.y <= target.y + CELL_SIZE,
            Direction::Down => self.position.y + length >= target.y,
            Direction::Left => self.position.x <= target.x + CELL_SIZE,
            Direction::Right => self.position.x + length > target.x,
        };
        self.hit |= reached;
        self.hit
    }

    pub(crate) fn mark_hit(&mut self) {
        self.hit = true;
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            attacker: self.attacker,
            target: self.target,
            direction: self.direction,
            position: self.position,
        }
    }
}

/// Parameters describing a newly fired projectile.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Launch {
    pub(crate) kind: ProjectileKind,
    pub(crate) attacker: UnitId,
    pub(crate) target: UnitId,
    pub(crate) direction: Direction,
    pub(crate) position: PixelPoint,
    pub(crate) strength: u32,
}

#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn fire(&mut self, launch: Launch) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        let projectile = Projectile {
            id,
            kind: launch.kind,
            attacker: launch.attacker,
            target: launch.target,
            direction: launch.direction,
            position: launch.position,
            strength: launch.strength,
            hit: false,
        };
        let _ = self.entries.insert(id, projectile);
        id
    }

    pub(crate) fn ids(&self) -> Vec<ProjectileId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.entries.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defense_evolution_core::CellCoord;

    fn arrow_from(cell: CellCoord) -> Projectile {
        let origin = cell.origin();
        let mut registry = ProjectileRegistry::new();
        let id = registry.fire(Launch {
            kind: ProjectileKind::Arrow,
            attacker: UnitId::new(0),
            target: UnitId::new(1),
            direction: Direction::Up,
            position: PixelPoint::new(origin.x + CELL_SIZE / 2.0 - 2.0, origin.y),
            strength: 10,
        });
        registry.remove(id).expect("projectile was just fired")
    }

    #[test]
    fn upward_arrow_hits_once_inside_target_cell() {
        let mut arrow = arrow_from(CellCoord::new(5, 3));
        let target = CellCoord::new(1, 3).origin();

        assert!(!arrow.check_hit(target));
        arrow.advance(4.0);
        assert_eq!(arrow.position.y, 80.0);
        assert!(arrow.check_hit(target), "y <= target.y + cell size");
    }

    #[test]
    fn hits_are_sticky() {
        let mut arrow = arrow_from(CellCoord::new(5, 3));
        arrow.mark_hit();
        assert!(arrow.check_hit(CellCoord::new(0, 3).origin()));
    }

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = ProjectileRegistry::new();
        let launch = Launch {
            kind: ProjectileKind::Arrow,
            attacker: UnitId::new(0),
            target: UnitId::new(1),
            direction: Direction::Down,
            position: PixelPoint::default(),
            strength: 5,
        };
        let first = registry.fire(launch);
        let second = registry.fire(launch);
        assert_eq!(first.get() + 1, second.get());
        assert_eq!(registry.ids(), vec![first, second]);

        registry.clear();
        assert_eq!(registry.iter().count(), 0);
    }
}
