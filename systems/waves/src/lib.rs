#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling for Defense Evolution.
//!
//! A [`WaveInfo`] is a time-ordered queue of spawns. Each spawn
//! spreads its unit codes over a fixed number of lanes centred on the grid.
//! Waves are loaded once from a text file into a [`WaveBook`], which hands
//! each wave out exactly once.

mod parser;

use std::{cmp::Reverse, collections::BinaryHeap, fmt, time::Duration};

use defense_evolution_core::UnitKind;
use rand::Rng;

pub use parser::{load_waves, parse_waves, WaveFileError};

/// Unit code as written in a wave definition file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitCode(String);

impl UnitCode {
    /// Wraps the provided code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Raw code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unit kind named by the code, if it is recognised.
    #[must_use]
    pub fn kind(&self) -> Option<UnitKind> {
        UnitKind::from_code(&self.0)
    }
}

impl fmt::Display for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number of spawn lanes for a wave, given its allowed half-width.
#[must_use]
pub fn lane_count(allowed_columns: u32, grid_columns: u32) -> usize {
    let lanes = allowed_columns.saturating_mul(2).min(grid_columns);
    usize::try_from(lanes).unwrap_or(0)
}

/// Grid column that lane `lane` maps to when `lanes` lanes are centred on the grid.
#[must_use]
pub fn lane_column(grid_columns: u32, lanes: usize, lane: usize) -> Option<u32> {
    let lanes = u32::try_from(lanes).ok()?;
    let lane = u32::try_from(lane).ok()?;
    if lane >= lanes {
        return None;
    }
    let column = grid_columns.checked_sub(lanes)? / 2 + lane;
    (column < grid_columns).then_some(column)
}

/// Units released together at a single point of wave time.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Spawn {
    time: Duration,
    sequence: u64,
    lanes: Vec<Option<UnitCode>>,
}

impl Ord for Spawn {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.time, self.sequence).cmp(&(other.time, other.sequence))
    }
}

impl PartialOrd for Spawn {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Queue of spawns belonging to one wave, ordered by release time.
#[derive(Clone, Debug, Default)]
pub struct WaveInfo {
    queue: BinaryHeap<Reverse<Spawn>>,
    lanes: usize,
    next_sequence: u64,
}

impl WaveInfo {
    /// Creates an empty wave whose spawns span `lanes` lanes.
    #[must_use]
    pub fn new(lanes: usize) -> Self {
        Self {
            queue: BinaryHeap::new(),
            lanes,
            next_sequence: 0,
        }
    }

    /// Number of lanes every spawn in this wave spans.
    #[must_use]
    pub const fn lanes(&self) -> usize {
        self.lanes
    }

    /// Queues a spawn, scattering the codes over random empty lanes.
    ///
    /// Collisions probe linearly to the next free lane. Codes beyond the lane
    /// count are dropped.
    pub fn add_spawn<R>(
        &mut self,
        time: Duration,
        codes: impl IntoIterator<Item = UnitCode>,
        rng: &mut R,
    ) where
        R: Rng + ?Sized,
    {
        let mut lanes: Vec<Option<UnitCode>> = vec![None; self.lanes];
        let mut filled = 0;
        for code in codes {
            if filled == lanes.len() {
                tracing::debug!(%code, lanes = lanes.len(), "spawn lanes full, dropping unit");
                continue;
            }

            let start = rng.gen_range(0..lanes.len());
            let free = (0..lanes.len())
                .map(|offset| (start + offset) % lanes.len())
                .find(|index| lanes[*index].is_none());
            if let Some(index) = free {
                lanes[index] = Some(code);
                filled += 1;
            }
        }

        let spawn = Spawn {
            time,
            sequence: self.next_sequence,
            lanes,
        };
        self.next_sequence += 1;
        self.queue.push(Reverse(spawn));
    }

    /// Release time of the earliest queued spawn, or `None` once the wave is drained.
    #[must_use]
    pub fn next_time(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(spawn)| spawn.time)
    }

    /// Removes and returns the lanes of the earliest queued spawn.
    pub fn extract_next_spawn(&mut self) -> Option<Vec<Option<UnitCode>>> {
        self.queue.pop().map(|Reverse(spawn)| spawn.lanes)
    }

    /// Reports whether every spawn has been extracted.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of spawns still queued.
    #[must_use]
    pub fn spawn_count(&self) -> usize {
        self.queue.len()
    }
}

/// Ordered collection of waves that hands each wave out at most once.
#[derive(Clone, Debug, Default)]
pub struct WaveBook {
    waves: Vec<Option<WaveInfo>>,
}

impl WaveBook {
    /// Creates a book from waves listed in play order.
    #[must_use]
    pub fn new(waves: Vec<WaveInfo>) -> Self {
        Self {
            waves: waves.into_iter().map(Some).collect(),
        }
    }

    /// Number of waves the book was created with.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether the book holds no waves at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Reports whether the 1-based wave number is still available.
    #[must_use]
    pub fn contains(&self, wave: u32) -> bool {
        self.slot(wave).map_or(false, |slot| slot.is_some())
    }

    /// Takes the 1-based wave out of the book.
    pub fn take(&mut self, wave: u32) -> Option<WaveInfo> {
        let index = usize::try_from(wave.checked_sub(1)?).ok()?;
        self.waves.get_mut(index)?.take()
    }

    fn slot(&self, wave: u32) -> Option<&Option<WaveInfo>> {
        let index = usize::try_from(wave.checked_sub(1)?).ok()?;
        self.waves.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn enemies(count: usize) -> Vec<UnitCode> {
        (0..count).map(|_| UnitCode::new("e")).collect()
    }

    #[test]
    fn spawns_extract_in_time_order_with_stable_ties() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut wave = WaveInfo::new(1);
        wave.add_spawn(Duration::from_secs(3), vec![UnitCode::new("a")], &mut rng);
        wave.add_spawn(Duration::from_secs(1), vec![UnitCode::new("b")], &mut rng);
        wave.add_spawn(Duration::from_secs(3), vec![UnitCode::new("c")], &mut rng);

        assert_eq!(wave.next_time(), Some(Duration::from_secs(1)));
        let order: Vec<String> = std::iter::from_fn(|| wave.extract_next_spawn())
            .map(|lanes| lanes[0].as_ref().map(|code| code.to_string()).unwrap_or_default())
            .collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn done_after_every_spawn_is_extracted() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut wave = WaveInfo::new(4);
        for second in 0..3 {
            wave.add_spawn(Duration::from_secs(second), enemies(2), &mut rng);
        }

        for remaining in (0..3).rev() {
            assert!(!wave.is_done());
            assert!(wave.extract_next_spawn().is_some());
            assert_eq!(wave.spawn_count(), remaining);
        }
        assert!(wave.is_done());
        assert_eq!(wave.next_time(), None);
        assert_eq!(wave.extract_next_spawn(), None);
    }

    #[test]
    fn excess_codes_are_dropped() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut wave = WaveInfo::new(4);
        wave.add_spawn(Duration::ZERO, enemies(9), &mut rng);

        let lanes = wave.extract_next_spawn().expect("spawn was queued");
        assert_eq!(lanes.len(), 4);
        assert!(lanes.iter().all(Option::is_some));
    }

    #[test]
    fn codes_fill_distinct_lanes() {
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut wave = WaveInfo::new(6);
            wave.add_spawn(Duration::ZERO, enemies(3), &mut rng);
            let lanes = wave.extract_next_spawn().expect("spawn was queued");
            assert_eq!(lanes.iter().flatten().count(), 3, "seed {seed}");
        }
    }

    #[test]
    fn lanes_are_centred_on_the_grid() {
        assert_eq!(lane_count(2, 15), 4);
        assert_eq!(lane_count(9, 15), 15);
        assert_eq!(lane_column(15, 4, 0), Some(5));
        assert_eq!(lane_column(15, 4, 3), Some(8));
        assert_eq!(lane_column(15, 4, 4), None);
        assert_eq!(lane_column(4, 6, 0), None);
    }

    #[test]
    fn book_hands_each_wave_out_once() {
        let mut book = WaveBook::new(vec![WaveInfo::new(2), WaveInfo::new(4)]);
        assert_eq!(book.len(), 2);
        assert!(!book.contains(0));
        assert!(book.contains(2));
        assert_eq!(book.take(2).map(|wave| wave.lanes()), Some(4));
        assert!(!book.contains(2));
        assert!(book.take(2).is_none());
        assert!(book.take(3).is_none());
        assert!(book.take(0).is_none());
    }
}
