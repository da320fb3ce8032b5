//! Clockwise walk over a tile's exits

use crate::direction::{Direction, Turn};
use crate::track::Tile;

/// One boundary segment: the wall between two clockwise-adjacent exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitPair {
    pub from: Direction,
    pub to: Direction,
    pub turn: Turn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WalkState {
    Start,
    Walking { first: Direction, current: Direction },
    Done,
}

/// Visits every active exit exactly once as `from`, in clockwise order
/// starting at the first exit clockwise from north. A tile with one exit
/// yields a single pair whose `from` and `to` are equal (a U-turn).
#[derive(Clone, Debug)]
pub struct ExitWalk<'a> {
    tile: &'a Tile,
    state: WalkState,
}

impl<'a> ExitWalk<'a> {
    pub fn new(tile: &'a Tile) -> Self {
        Self {
            tile,
            state: WalkState::Start,
        }
    }
}

impl Iterator for ExitWalk<'_> {
    type Item = ExitPair;

    fn next(&mut self) -> Option<ExitPair> {
        let (first, current) = match self.state {
            WalkState::Start => match self.tile.first_exit() {
                Some(first) => (first, first),
                None => {
                    self.state = WalkState::Done;
                    return None;
                }
            },
            WalkState::Walking { first, current } => (first, current),
            WalkState::Done => return None,
        };

        // `current` is an active exit, so a next exit always exists.
        let to = self.tile.next_exit_clockwise(current)?;
        self.state = if to == first {
            WalkState::Done
        } else {
            WalkState::Walking { first, current: to }
        };

        Some(ExitPair {
            from: current,
            to,
            turn: Turn::between(current, to),
        })
    }
}
