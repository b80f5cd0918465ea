use serde::{Deserialize, Serialize};

pub mod config;
pub mod driver;
pub mod entity;
pub mod map;
pub mod placement;
pub mod render;
pub mod session;

/// Represents a 2D tile coordinate. Origin is the top-left tile, `x` grows
/// rightward and `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Returns the neighbouring tile in `direction`, or `None` when that step
    /// would leave the non-negative quadrant.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        Some(Position {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }

    /// Top-left pixel of this tile for a renderer drawing square tiles of
    /// `tile_size` pixels.
    pub fn to_pixels(self, tile_size: u32) -> (u64, u64) {
        let size = u64::from(tile_size);
        (self.x as u64 * size, self.y as u64 * size)
    }
}

/// The four directions a character can move in.
///
/// The declaration order is the order in which simultaneously held
/// directions are processed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector pointing at the next tile in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// De-duplicates `held` and sorts it into processing order
    /// (Left, Right, Up, Down).
    pub fn in_processing_order<I>(held: I) -> Vec<Direction>
    where
        I: IntoIterator<Item = Direction>,
    {
        let mut directions: Vec<Direction> = held.into_iter().collect();
        directions.sort_unstable();
        directions.dedup();
        directions
    }
}

/// The collectible objects scattered through a maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Needle,
    Syringe,
    PlasticTube,
    Ether,
}

impl ObjectKind {
    /// Every collectible, in the order placement output is zipped against.
    pub const ALL: [ObjectKind; 4] = [
        ObjectKind::Needle,
        ObjectKind::Syringe,
        ObjectKind::PlasticTube,
        ObjectKind::Ether,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Needle => "needle",
            ObjectKind::Syringe => "syringe",
            ObjectKind::PlasticTube => "plastic tube",
            ObjectKind::Ether => "ether",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_follows_screen_axes() {
        let origin = Position::new(2, 2);
        assert_eq!(origin.step(Direction::Left), Some(Position::new(1, 2)));
        assert_eq!(origin.step(Direction::Right), Some(Position::new(3, 2)));
        assert_eq!(origin.step(Direction::Up), Some(Position::new(2, 1)));
        assert_eq!(origin.step(Direction::Down), Some(Position::new(2, 3)));
    }

    #[test]
    fn step_off_the_top_left_corner_is_none() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.step(Direction::Left), None);
        assert_eq!(corner.step(Direction::Up), None);
    }

    #[test]
    fn held_directions_are_sorted_and_deduplicated() {
        let held = [
            Direction::Down,
            Direction::Right,
            Direction::Left,
            Direction::Right,
        ];
        assert_eq!(
            Direction::in_processing_order(held),
            vec![Direction::Left, Direction::Right, Direction::Down]
        );
    }

    #[test]
    fn pixels_scale_by_tile_size() {
        assert_eq!(Position::new(3, 1).to_pixels(40), (120, 40));
    }
}
