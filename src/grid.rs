use serde::{Deserialize, Serialize};

use crate::error::MazeError;

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Passage,
    Wall,
}

/// A 0-indexed (row, column) coordinate, row-major.
/// Serializes as a two-element `[row, col]` array on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Manhattan distance to another position.
    pub fn manhattan(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl From<[usize; 2]> for Position {
    fn from([row, col]: [usize; 2]) -> Self {
        Position { row, col }
    }
}

impl From<Position> for [usize; 2] {
    fn from(pos: Position) -> Self {
        [pos.row, pos.col]
    }
}

/// The four orthogonal movement directions. Doubles as the Q-learning
/// action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed expansion and tie-break order. Every consumer that iterates
    /// directions goes through this list so visited traces and greedy
    /// policies are reproducible.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row/column delta of one step in this direction.
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// A rectangular grid of cells with row-major boxed-slice storage.
#[derive(Debug, Clone)]
pub struct Grid {
    data: Box<[Cell]>,
    width: usize,
    height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize, fill: Cell) -> Self {
        Grid {
            data: vec![fill; width * height].into_boxed_slice(),
            width,
            height,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Whether the position lies on the outermost ring of the grid.
    pub fn is_boundary(&self, pos: Position) -> bool {
        pos.row == 0 || pos.col == 0 || pos.row == self.height - 1 || pos.col == self.width - 1
    }

    pub fn is_passage(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self[pos] == Cell::Passage
    }

    fn ravel_index(&self, pos: Position) -> usize {
        pos.row * self.width + pos.col
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        let idx = self.ravel_index(pos);
        self.data[idx] = cell;
    }

    /// The in-bounds neighbor one step away in `dir`, or `None` at the
    /// grid edge.
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.offset();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position { row, col };
        self.in_bounds(next).then_some(next)
    }

    /// In-bounds orthogonal neighbors in `Direction::ALL` order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL.into_iter().filter_map(move |dir| self.step(pos, dir))
    }

    /// Decodes the wire representation: rows of 0 (passage) / 1 (wall).
    /// Ragged, empty, or out-of-alphabet input is rejected.
    pub fn from_matrix(rows: &[Vec<u8>]) -> Result<Grid, MazeError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if height == 0 || width == 0 {
            return Err(MazeError::InvalidDimension("maze matrix is empty".into()));
        }
        if rows.iter().any(|r| r.len() != width) {
            return Err(MazeError::InvalidDimension(
                "maze matrix rows have unequal lengths".into(),
            ));
        }
        let mut grid = Grid::new(width, height, Cell::Wall);
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                let cell = match value {
                    0 => Cell::Passage,
                    1 => Cell::Wall,
                    other => {
                        return Err(MazeError::InvalidDimension(format!(
                            "maze matrix holds {other}, expected 0 or 1"
                        )));
                    }
                };
                grid.set(Position::new(row, col), cell);
            }
        }
        Ok(grid)
    }

    /// Encodes the grid as rows of 0 (passage) / 1 (wall).
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|col| match self[Position::new(row, col)] {
                        Cell::Passage => 0,
                        Cell::Wall => 1,
                    })
                    .collect()
            })
            .collect()
    }
}

impl std::ops::Index<Position> for Grid {
    type Output = Cell;

    fn index(&self, pos: Position) -> &Self::Output {
        &self.data[self.ravel_index(pos)]
    }
}
