//! Render-state keys and the dense lookup table adapters fill with sprites.

use serde::{Deserialize, Serialize};

use crate::{Direction, UnitKind, UnitState};

/// Identifies the animation a unit should display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationKey {
    /// Kind of the animated unit.
    pub kind: UnitKind,
    /// Behavioural state of the unit.
    pub state: UnitState,
    /// Facing direction of the unit.
    pub direction: Direction,
}

impl AnimationKey {
    /// Number of distinct animation keys.
    pub const COUNT: usize = UnitKind::ALL.len() * UnitState::ALL.len() * Direction::ALL.len();

    /// Creates a new animation key.
    #[must_use]
    pub const fn new(kind: UnitKind, state: UnitState, direction: Direction) -> Self {
        Self {
            kind,
            state,
            direction,
        }
    }

    /// Dense index of the key inside an [`AnimationTable`].
    #[must_use]
    pub const fn index(self) -> usize {
        (self.kind.index() * UnitState::ALL.len() + self.state.index()) * Direction::ALL.len()
            + self.direction.index()
    }

    /// Iterates every key in index order.
    pub fn all() -> impl Iterator<Item = AnimationKey> {
        UnitKind::ALL.into_iter().flat_map(|kind| {
            UnitState::ALL.into_iter().flat_map(move |state| {
                Direction::ALL
                    .into_iter()
                    .map(move |direction| AnimationKey::new(kind, state, direction))
            })
        })
    }
}

/// Dense table holding one entry per [`AnimationKey`].
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationTable<T> {
    entries: Vec<T>,
}

impl<T> AnimationTable<T> {
    /// Builds a table by invoking `fill` for every key in index order.
    pub fn from_fn(fill: impl FnMut(AnimationKey) -> T) -> Self {
        Self {
            entries: AnimationKey::all().map(fill).collect(),
        }
    }

    /// Entry registered for the provided key.
    #[must_use]
    pub fn get(&self, key: AnimationKey) -> Option<&T> {
        self.entries.get(key.index())
    }

    /// Mutable entry registered for the provided key.
    pub fn get_mut(&mut self, key: AnimationKey) -> Option<&mut T> {
        self.entries.get_mut(key.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense_and_unique() {
        let indices: Vec<usize> = AnimationKey::all().map(AnimationKey::index).collect();
        assert_eq!(indices.len(), AnimationKey::COUNT);
        assert_eq!(indices, (0..AnimationKey::COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn table_returns_entry_for_each_key() {
        let mut table = AnimationTable::from_fn(|key| key);
        for key in AnimationKey::all() {
            assert_eq!(table.get(key), Some(&key));
        }

        let key = AnimationKey::new(UnitKind::Enemy, UnitState::Attacking, Direction::Down);
        if let Some(entry) = table.get_mut(key) {
            entry.direction = Direction::Up;
        }
        assert_eq!(
            table.get(key).map(|entry| entry.direction),
            Some(Direction::Up)
        );
    }
}
