//! Compass directions and turn classification
//!
//! Exits are indexed by one of eight compass directions, ordered clockwise
//! starting at north. All arithmetic on directions is modulo 8.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, SQRT_2};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

// =============================================================================
// DIRECTION
// =============================================================================

/// Cardinal and ordinal directions, clockwise from north.
///
/// Screen convention: +x is east, +y is south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "NE")]
    NorthEast,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "SE")]
    SouthEast,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "SW")]
    SouthWest,
    #[serde(rename = "W")]
    West,
    #[serde(rename = "NW")]
    NorthWest,
}

impl Direction {
    /// All directions in clockwise order, starting at north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Position in the clockwise order (north = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction at a clockwise index, wrapping modulo 8.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        self.rotate_cw(4)
    }

    /// Rotate clockwise by `steps` eighths of a turn (negative = counter-clockwise).
    pub fn rotate_cw(self, steps: i32) -> Self {
        let index = (self.index() as i32 + steps).rem_euclid(8);
        Self::from_index(index as usize)
    }

    /// Apply a turn to the exit a car entered through, giving the exit it leaves by.
    pub fn add_turn(self, turn: Turn) -> Self {
        self.rotate_cw(turn.steps() as i32)
    }

    pub fn is_cardinal(self) -> bool {
        self.index() % 2 == 0
    }

    pub fn is_diagonal(self) -> bool {
        !self.is_cardinal()
    }

    /// Grid offset (dx, dy) of the neighbour in this direction
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Angle in radians as seen by `atan2` in screen coordinates (north = -PI/2).
    /// Clockwise rotation increases the angle.
    pub fn angle(self) -> f32 {
        self.index() as f32 * FRAC_PI_4 - FRAC_PI_2
    }

    /// Unit vector pointing in this direction.
    pub fn unit(self) -> Point {
        Point::from_angle(self.angle())
    }

    /// Cost of one step through an exit in this direction.
    pub fn step_cost(self) -> f32 {
        if self.is_cardinal() {
            1.0
        } else {
            SQRT_2
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Direction::ALL
            .into_iter()
            .find(|d| d.short_name() == upper)
            .ok_or_else(|| format!("unknown direction '{}'", s))
    }
}

// =============================================================================
// TURN
// =============================================================================

/// Angular relationship between the exit a car enters through and the exit
/// it leaves by.
///
/// `Straight` means leaving through the opposite exit. The two sharp turns
/// (135 degrees) exist so that [`Turn::between`] is total; no tile geometry
/// can be built for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    UTurn,
    SharpLeft,
    Left90,
    Left45,
    Straight,
    Right45,
    Right90,
    SharpRight,
}

impl Turn {
    pub const ALL: [Turn; 8] = [
        Turn::UTurn,
        Turn::SharpLeft,
        Turn::Left90,
        Turn::Left45,
        Turn::Straight,
        Turn::Right45,
        Turn::Right90,
        Turn::SharpRight,
    ];

    /// Classify the turn from entry exit `entry` to leaving exit `exit`.
    pub fn between(entry: Direction, exit: Direction) -> Self {
        Self::from_steps((exit.index() + 8 - entry.index()) % 8)
    }

    /// Clockwise steps from the entry exit to the leaving exit.
    pub fn steps(self) -> usize {
        match self {
            Turn::UTurn => 0,
            Turn::SharpLeft => 1,
            Turn::Left90 => 2,
            Turn::Left45 => 3,
            Turn::Straight => 4,
            Turn::Right45 => 5,
            Turn::Right90 => 6,
            Turn::SharpRight => 7,
        }
    }

    fn from_steps(steps: usize) -> Self {
        Self::ALL[steps % 8]
    }

    /// Whether tile geometry exists for this turn.
    pub fn is_drivable(self) -> bool {
        !matches!(self, Turn::SharpLeft | Turn::SharpRight)
    }
}

// =============================================================================
// DIRECTION SET
// =============================================================================

/// A set of directions stored as an 8-bit mask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: DirectionSet = DirectionSet(0);

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= 1 << direction.index();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !(1 << direction.index());
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate in clockwise order starting at north.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::EMPTY;
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

impl fmt::Debug for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Direction::short_name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
        assert_eq!(Direction::NorthEast.opposite(), Direction::SouthWest);
    }

    #[test]
    fn test_turn_round_trip_all_directions() {
        for d in Direction::ALL {
            for t in Turn::ALL {
                assert_eq!(Turn::between(d, d.add_turn(t)), t, "{} {:?}", d, t);
            }
        }
    }

    #[test]
    fn test_straight_continues_through_opposite() {
        for d in Direction::ALL {
            assert_eq!(Turn::between(d, d.opposite()), Turn::Straight);
            assert_eq!(d.add_turn(Turn::Straight), d.opposite());
            assert_eq!(Turn::between(d, d), Turn::UTurn);
        }
    }

    #[test]
    fn test_turn_sides() {
        // Entering through the north exit means heading south; east is on the left.
        assert_eq!(Turn::between(Direction::North, Direction::East), Turn::Left90);
        assert_eq!(Turn::between(Direction::North, Direction::West), Turn::Right90);
        assert_eq!(Turn::between(Direction::North, Direction::SouthEast), Turn::Left45);
        assert_eq!(Turn::between(Direction::North, Direction::SouthWest), Turn::Right45);
        assert!(!Turn::between(Direction::North, Direction::NorthEast).is_drivable());
    }

    #[test]
    fn test_unit_vectors_match_offsets() {
        for d in Direction::ALL {
            let (dx, dy) = d.offset();
            let u = d.unit();
            let len = ((dx * dx + dy * dy) as f32).sqrt();
            assert!((u.x - dx as f32 / len).abs() < 1e-6);
            assert!((u.y - dy as f32 / len).abs() < 1e-6);
        }
    }

    #[test]
    fn test_step_costs() {
        assert_eq!(Direction::East.step_cost(), 1.0);
        assert!((Direction::SouthWest.step_cost() - SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_direction_set() {
        let mut set: DirectionSet = [Direction::North, Direction::West].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Direction::West));
        set.insert(Direction::East);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Direction::North, Direction::East, Direction::West]
        );
        set.remove(Direction::North);
        assert_eq!(format!("{}", set), "{E, W}");
        assert!(DirectionSet::EMPTY.is_empty());
    }

    #[test]
    fn test_parse_and_serde_names() {
        assert_eq!("ne".parse::<Direction>().unwrap(), Direction::NorthEast);
        assert!("up".parse::<Direction>().is_err());
        let json = serde_json::to_string(&Direction::SouthWest).unwrap();
        assert_eq!(json, "\"SW\"");
    }
}
