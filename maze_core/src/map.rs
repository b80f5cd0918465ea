use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Position;

/// Reasons a maze description can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Maze description is empty")]
    Empty,
    #[error("Maze has zero width")]
    ZeroWidth,
    #[error("Inconsistent width at line {line}: expected {expected}, found {found}")]
    InconsistentWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid character {ch:?} at position ({x}, {y})")]
    InvalidCharacter { ch: char, x: usize, y: usize },
    #[error("No start tile ('S') found in maze")]
    MissingStart,
    #[error("No exit tile ('E') found in maze")]
    MissingExit,
    #[error("Multiple start tiles ('S') found: {first:?} and {second:?}")]
    DuplicateStart { first: Position, second: Position },
    #[error("Multiple exit tiles ('E') found: {first:?} and {second:?}")]
    DuplicateExit { first: Position, second: Position },
}

/// A rectangular 2D grid.
///
/// Stores elements of type `T` in a flat vector using row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator function `f` takes `(x, y)` coordinates and returns the value for that cell.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks if the given position is within the grid boundaries.
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Gets the cell at `position`, or `None` outside the grid.
    pub fn get(&self, position: Position) -> Option<&T> {
        if self.contains(position) {
            self.cells.get(position.y * self.width + position.x)
        } else {
            None
        }
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Position::new(index % width, index / width), cell))
    }
}

/// Static classification of a maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Path,
}

impl Tile {
    #[inline]
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Path)
    }
}

/// A parsed maze level. Immutable once built.
///
/// Map format, one line per row:
/// - `#` wall
/// - ` ` path
/// - `S` path + start (exactly one)
/// - `E` path + exit (exactly one)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeMap {
    tiles: Grid<Tile>,
    start: Position,
    exit: Position,
}

impl MazeMap {
    /// Parses a maze from its textual grid.
    ///
    /// A single trailing newline is ignored, `\r\n` line endings are accepted.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] when the rows differ in length, a character outside
    /// `#`, ` `, `S`, `E` appears, or the start or exit is missing or repeated.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let rows: Vec<Vec<char>> = text.lines().map(|line| line.chars().collect()).collect();
        let width = rows.first().ok_or(MapError::Empty)?.len();
        if width == 0 {
            return Err(MapError::ZeroWidth);
        }

        let mut start: Option<Position> = None;
        let mut exit: Option<Position> = None;

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MapError::InconsistentWidth {
                    line: y + 1,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, ch) in row.iter().copied().enumerate() {
                let pos = Position::new(x, y);
                match ch {
                    '#' | ' ' => {}
                    'S' => {
                        if let Some(first) = start {
                            return Err(MapError::DuplicateStart { first, second: pos });
                        }
                        start = Some(pos);
                    }
                    'E' => {
                        if let Some(first) = exit {
                            return Err(MapError::DuplicateExit { first, second: pos });
                        }
                        exit = Some(pos);
                    }
                    other => return Err(MapError::InvalidCharacter { ch: other, x, y }),
                }
            }
        }

        let start = start.ok_or(MapError::MissingStart)?;
        let exit = exit.ok_or(MapError::MissingExit)?;
        let tiles = Grid::from_generator(width, rows.len(), |x, y| match rows[y][x] {
            '#' => Tile::Wall,
            _ => Tile::Path,
        });

        Ok(MazeMap { tiles, start, exit })
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn exit(&self) -> Position {
        self.exit
    }

    /// Tile at `position`, `None` outside the maze.
    pub fn tile(&self, position: Position) -> Option<Tile> {
        self.tiles.get(position).copied()
    }

    /// Cells outside the parsed grid are never walkable.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.tile(position).is_some_and(Tile::is_walkable)
    }

    /// Every cell with its classification, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.tiles.enumerate().map(|(pos, tile)| (pos, *tile))
    }

    pub fn walls(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles()
            .filter(|(_, tile)| !tile.is_walkable())
            .map(|(pos, _)| pos)
    }

    /// Walkable tiles, start and exit included.
    pub fn walkable(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles()
            .filter(|(_, tile)| tile.is_walkable())
            .map(|(pos, _)| pos)
    }
}

impl FromStr for MazeMap {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MazeMap::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const SMALL: &str = "#####\n#S  #\n#  E#\n#####\n";

    #[test]
    fn parses_start_exit_and_dimensions() {
        let maze = MazeMap::parse(SMALL).unwrap();
        assert_eq!(maze.width(), 5);
        assert_eq!(maze.height(), 4);
        assert_eq!(maze.start(), Position::new(1, 1));
        assert_eq!(maze.exit(), Position::new(3, 2));
    }

    #[test]
    fn every_cell_is_wall_or_walkable_exactly_once() {
        let maze = MazeMap::parse(SMALL).unwrap();
        let walls: HashSet<Position> = maze.walls().collect();
        let walkable: HashSet<Position> = maze.walkable().collect();

        assert!(walls.is_disjoint(&walkable));
        assert_eq!(walls.len() + walkable.len(), maze.width() * maze.height());
        assert!(walkable.contains(&maze.start()));
        assert!(walkable.contains(&maze.exit()));
        assert_eq!(walkable.len(), 6);
    }

    #[test]
    fn outside_cells_are_not_walkable() {
        let maze = MazeMap::parse(SMALL).unwrap();
        assert!(!maze.is_walkable(Position::new(5, 1)));
        assert!(!maze.is_walkable(Position::new(1, 4)));
        assert_eq!(maze.tile(Position::new(40, 40)), None);
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let maze = MazeMap::parse("#S#\r\n#E#\r\n").unwrap();
        assert_eq!(maze.height(), 2);
        assert_eq!(maze.width(), 3);
    }

    #[test]
    fn edges_may_be_open_paths() {
        let maze: MazeMap = "S  E".parse().unwrap();
        assert_eq!(maze.walls().count(), 0);
        assert_eq!(maze.walkable().count(), 4);
    }

    #[test]
    fn rejects_mismatched_row_lengths() {
        let err = MazeMap::parse("#####\n#S E\n#####").unwrap_err();
        assert_eq!(
            err,
            MapError::InconsistentWidth {
                line: 2,
                expected: 5,
                found: 4
            }
        );
    }

    #[test]
    fn rejects_unknown_characters() {
        let err = MazeMap::parse("#S.E#").unwrap_err();
        assert_eq!(err, MapError::InvalidCharacter { ch: '.', x: 2, y: 0 });
    }

    #[test]
    fn rejects_missing_exit() {
        let err = MazeMap::parse("###\n#S#\n###").unwrap_err();
        assert_eq!(err, MapError::MissingExit);
    }

    #[test]
    fn rejects_missing_start() {
        let err = MazeMap::parse("###\n#E#\n###").unwrap_err();
        assert_eq!(err, MapError::MissingStart);
    }

    #[test]
    fn rejects_duplicate_start_and_exit() {
        assert!(matches!(
            MazeMap::parse("SSE"),
            Err(MapError::DuplicateStart { .. })
        ));
        assert!(matches!(
            MazeMap::parse("SEE"),
            Err(MapError::DuplicateExit { .. })
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(MazeMap::parse(""), Err(MapError::Empty));
        assert_eq!(MazeMap::parse("\nS E"), Err(MapError::ZeroWidth));
    }
}
