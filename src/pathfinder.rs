//! Routing tables for AI drivers
//!
//! A [`Pathfinder`] holds, for every tile, the cheapest travel cost to one
//! target tile along the exit graph. Costs are propagated outward from the
//! target with Dijkstra's algorithm (cardinal steps cost 1, diagonal steps
//! cost sqrt 2). Built once, read-only afterwards.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use crate::direction::{Direction, DirectionSet};
use crate::track::{Checkpoint, CheckpointKind, TilePos, Track};
use crate::tilemap::Tilemap;

/// Costs closer than this are treated as equal.
pub const COST_EPSILON: f32 = 1e-4;

/// Node in the priority queue for cost propagation
#[derive(Clone, Copy, Debug)]
struct CostNode {
    x: usize,
    y: usize,
    cost: f32,
}

impl PartialEq for CostNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CostNode {}

impl Ord for CostNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| (other.y, other.x).cmp(&(self.y, self.x)))
    }
}

impl PartialOrd for CostNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// =============================================================================
// PATHFINDER
// =============================================================================

/// Cost map and next-step queries rooted at one target tile
#[derive(Clone, Debug)]
pub struct Pathfinder {
    target: TilePos,
    /// Exits of the target through which it may be entered
    entry: DirectionSet,
    origin: TilePos,
    costs: Tilemap<f32>,
    exits: Tilemap<DirectionSet>,
}

impl Pathfinder {
    /// Route to `target`, entering it through any of its exits.
    pub fn new(track: &Track, target: TilePos) -> Self {
        let entry = track
            .tile(target)
            .map(|t| t.active_exits())
            .unwrap_or_default();
        Self::build(track, target, entry)
    }

    /// Route to a checkpoint line. The target tile may only be entered
    /// through the exit the checkpoint faces, so routes cross the line in
    /// the racing direction.
    pub fn for_checkpoint(track: &Track, checkpoint: &Checkpoint) -> Self {
        let entry: DirectionSet = std::iter::once(checkpoint.direction).collect();
        Self::build(track, checkpoint.tile, entry)
    }

    fn build(track: &Track, target: TilePos, entry: DirectionSet) -> Self {
        let (width, height) = (track.width(), track.height());
        let mut exits = Tilemap::new(width, height);
        for (pos, tile) in track.tiles() {
            if let Some((x, y)) = track.grid_index(pos) {
                exits.set(x, y, tile.active_exits());
            }
        }

        let mut costs = Tilemap::new_with(width, height, f32::INFINITY);
        let mut heap = BinaryHeap::new();
        if let Some((tx, ty)) = track.grid_index(target) {
            costs.set(tx, ty, 0.0);
            heap.push(CostNode { x: tx, y: ty, cost: 0.0 });
        }

        let origin = track.origin();
        while let Some(current) = heap.pop() {
            if current.cost > *costs.get(current.x, current.y) {
                continue;
            }
            let pos = track.grid_pos(current.x, current.y);
            let mut open = *exits.get(current.x, current.y);
            if pos == target {
                open = open.iter().filter(|d| entry.contains(*d)).collect();
            }

            // Exits are paired, so a tile reachable through one of our
            // exits can reach us back through its opposite.
            for direction in open.iter() {
                let next = pos.step(direction);
                let Some((nx, ny)) = track.grid_index(next) else {
                    continue;
                };
                let cost = current.cost + direction.step_cost();
                if cost < *costs.get(nx, ny) {
                    costs.set(nx, ny, cost);
                    heap.push(CostNode { x: nx, y: ny, cost });
                }
            }
        }

        let unreachable = track
            .tiles()
            .filter(|(pos, _)| {
                track
                    .grid_index(*pos)
                    .map_or(true, |(x, y)| costs.get(x, y).is_infinite())
            })
            .count();
        if unreachable > 0 {
            log::warn!("{} tiles cannot reach target {}", unreachable, target);
        }

        Self {
            target,
            entry,
            origin,
            costs,
            exits,
        }
    }

    pub fn target(&self) -> TilePos {
        self.target
    }

    fn cell(&self, pos: TilePos) -> Option<(usize, usize)> {
        let x = pos.x.checked_sub(self.origin.x)?;
        let y = pos.y.checked_sub(self.origin.y)?;
        self.costs.in_bounds(x, y).then_some((x as usize, y as usize))
    }

    /// Travel cost from `pos` to the target, or `None` if unreachable.
    pub fn cost(&self, pos: TilePos) -> Option<f32> {
        let (x, y) = self.cell(pos)?;
        let cost = *self.costs.get(x, y);
        cost.is_finite().then_some(cost)
    }

    /// Directions out of `pos` that start a cheapest route to the target.
    ///
    /// Several directions are returned when routes tie. The set is empty on
    /// the target itself, on tiles that cannot reach it and off the track.
    pub fn next_step(&self, pos: TilePos) -> DirectionSet {
        let mut best = DirectionSet::EMPTY;
        if pos == self.target || self.cost(pos).is_none() {
            return best;
        }
        let Some((x, y)) = self.cell(pos) else {
            return best;
        };

        let mut best_cost = f32::INFINITY;
        for direction in self.exits.get(x, y).iter() {
            let next = pos.step(direction);
            if next == self.target && !self.entry.contains(direction.opposite()) {
                continue;
            }
            let Some(through) = self.cost(next) else {
                continue;
            };
            let cost = through + direction.step_cost();
            if cost < best_cost - COST_EPSILON {
                best_cost = cost;
                best = DirectionSet::EMPTY;
                best.insert(direction);
            } else if (cost - best_cost).abs() <= COST_EPSILON {
                best.insert(direction);
            }
        }
        best
    }

    /// Pick one of the tied next steps at random.
    pub fn choose_step<R: Rng + ?Sized>(&self, pos: TilePos, rng: &mut R) -> Option<Direction> {
        let options: Vec<Direction> = self.next_step(pos).iter().collect();
        options.choose(rng).copied()
    }

    /// Follow unique-or-first next steps from `from` until the target is
    /// reached. `None` if there is no route.
    pub fn route(&self, from: TilePos) -> Option<Vec<TilePos>> {
        self.cost(from)?;
        let mut path = vec![from];
        let mut current = from;
        // Costs strictly decrease along a route, so it visits each tile once.
        while current != self.target {
            let direction = self.next_step(current).iter().next()?;
            current = current.step(direction);
            path.push(current);
            if path.len() > self.costs.len() + 1 {
                return None;
            }
        }
        Some(path)
    }
}

// =============================================================================
// RACE ROUTES
// =============================================================================

/// One pathfinder per checkpoint plus the start line
#[derive(Clone, Debug)]
pub struct RaceRoutes {
    pub start: Pathfinder,
    pub checkpoints: Vec<Pathfinder>,
}

impl RaceRoutes {
    pub fn build(track: &Track) -> Self {
        let targets: Vec<&Checkpoint> = track.all_checkpoints().collect();
        let mut finders: Vec<Pathfinder> = targets
            .par_iter()
            .map(|checkpoint| Pathfinder::for_checkpoint(track, checkpoint))
            .collect();
        let start = finders.remove(0);
        log::info!(
            "built {} route tables for '{}'",
            finders.len() + 1,
            track.name()
        );
        Self {
            start,
            checkpoints: finders,
        }
    }

    pub fn for_target(&self, kind: CheckpointKind) -> Option<&Pathfinder> {
        match kind {
            CheckpointKind::Start => Some(&self.start),
            CheckpointKind::Numbered(i) => self.checkpoints.get(i as usize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction::*;
    use crate::track::{samples, TrackBuilder};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn set(dirs: &[Direction]) -> DirectionSet {
        dirs.iter().copied().collect()
    }

    fn eight_loop() -> Track {
        TrackBuilder::new("eight")
            .at(0, 0)
            .go(East)
            .go(East)
            .go(SouthEast)
            .go(SouthWest)
            .go(West)
            .go(West)
            .go(North)
            .go(North)
            .start_at((0, 0), East)
            .build()
            .unwrap()
    }

    #[test]
    fn test_square_loop_start_route() {
        let track = samples::square_loop().unwrap();
        let finder = Pathfinder::for_checkpoint(&track, track.start());
        assert_eq!(finder.next_step(TilePos::new(1, 1)), set(&[North]));
        assert_eq!(finder.next_step(TilePos::new(0, 1)), set(&[East]));
        assert_eq!(finder.next_step(TilePos::new(1, 0)), set(&[West]));
        assert_eq!(finder.cost(TilePos::new(0, 1)), Some(3.0));
    }

    #[test]
    fn test_square_loop_tie() {
        let track = samples::square_loop().unwrap();
        let finder = Pathfinder::new(&track, TilePos::new(0, 0));
        assert_eq!(finder.next_step(TilePos::new(1, 1)), set(&[North, West]));
        assert_eq!(finder.next_step(TilePos::new(0, 1)), set(&[North]));
    }

    #[test]
    fn test_eight_loop_unique_steps_match_costs() {
        let track = eight_loop();
        let target = TilePos::new(0, 0);
        let finder = Pathfinder::new(&track, target);

        for (pos, _) in track.tiles() {
            if pos == target {
                assert!(finder.next_step(pos).is_empty());
                continue;
            }
            let steps = finder.next_step(pos);
            assert_eq!(steps.len(), 1, "tile {} has steps {}", pos, steps);

            let route = finder.route(pos).unwrap();
            assert_eq!(*route.last().unwrap(), target);
            let travelled: f32 = route
                .windows(2)
                .map(|w| {
                    let d = Direction::ALL
                        .into_iter()
                        .find(|d| w[0].step(*d) == w[1])
                        .unwrap();
                    d.step_cost()
                })
                .sum();
            assert!((travelled - finder.cost(pos).unwrap()).abs() < 1e-4);
        }

        let diag = finder.cost(TilePos::new(3, 1)).unwrap();
        assert!((diag - (2.0 + std::f32::consts::SQRT_2)).abs() < 1e-4);
    }

    #[test]
    fn test_unreachable_tiles_have_no_step() {
        let track = TrackBuilder::new("islands")
            .at(0, 0)
            .go(East)
            .at(3, 0)
            .go(East)
            .start_at((0, 0), East)
            .build()
            .unwrap();
        let finder = Pathfinder::new(&track, TilePos::new(0, 0));
        assert_eq!(finder.cost(TilePos::new(3, 0)), None);
        assert!(finder.next_step(TilePos::new(4, 0)).is_empty());
        assert!(finder.next_step(TilePos::new(9, 9)).is_empty());
        assert!(finder.route(TilePos::new(3, 0)).is_none());
        assert_eq!(finder.next_step(TilePos::new(1, 0)), set(&[West]));
    }

    #[test]
    fn test_choose_step_picks_from_ties() {
        let track = samples::square_loop().unwrap();
        let finder = Pathfinder::new(&track, TilePos::new(0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen = DirectionSet::EMPTY;
        for _ in 0..64 {
            seen.insert(finder.choose_step(TilePos::new(1, 1), &mut rng).unwrap());
        }
        assert_eq!(seen, set(&[North, West]));
        assert_eq!(finder.choose_step(TilePos::new(0, 0), &mut rng), None);
    }

    #[test]
    fn test_race_routes_follow_racing_direction() {
        let track = samples::oval().unwrap();
        let routes = RaceRoutes::build(&track);
        assert_eq!(routes.checkpoints.len(), 3);

        // Checkpoint 0 at (4, 2) is crossed heading south.
        let cp0 = routes.for_target(CheckpointKind::Numbered(0)).unwrap();
        assert_eq!(cp0.target(), TilePos::new(4, 2));
        assert_eq!(cp0.next_step(TilePos::new(4, 1)), set(&[South]));
        assert_eq!(cp0.next_step(TilePos::new(3, 3)), set(&[West]));

        // The start at (2, 0) is crossed heading east.
        let start = routes.for_target(CheckpointKind::Start).unwrap();
        assert_eq!(start.next_step(TilePos::new(3, 0)), set(&[SouthEast]));
        assert_eq!(start.next_step(TilePos::new(1, 0)), set(&[East]));
        assert!(routes.for_target(CheckpointKind::Numbered(3)).is_none());
    }
}
