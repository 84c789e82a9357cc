//! Board geometry: coordinates, cells and hex adjacency on an N×N rhombus

use serde::{Deserialize, Serialize};

/// Largest supported board
pub const MAX_BOARD_SIZE: usize = 26;

/// Default board size for a full game
pub const DEFAULT_BOARD_SIZE: usize = 11;

/// Player color
///
/// Blue moves first and connects the left and right columns.
/// Red connects the top and bottom rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Blue,
    Red,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Blue => Player::Red,
            Player::Red => Player::Blue,
        }
    }

    /// Distance along this player's axis from `coord` to the goal edge
    pub fn remaining_distance(self, coord: Coord, size: usize) -> usize {
        size - self.axis(coord)
    }

    /// The coordinate this player has to advance across the board
    pub fn axis(self, coord: Coord) -> usize {
        match self {
            Player::Blue => coord.col,
            Player::Red => coord.row,
        }
    }
}

/// Contents of one grid cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Blue,
    Red,
}

impl Cell {
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Blue => Some(Player::Blue),
            Cell::Red => Some(Player::Red),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn is_owned_by(self, player: Player) -> bool {
        self.owner() == Some(player)
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::Blue => Cell::Blue,
            Player::Red => Cell::Red,
        }
    }
}

/// Grid coordinate (row, column), both zero-based
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Mirror across the long diagonal
    pub fn transposed(self) -> Coord {
        Coord::new(self.col, self.row)
    }

    pub fn in_bounds(self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// Neighbor in direction (0-5), if it lies on a board of `size`
    pub fn neighbor(self, direction: usize, size: usize) -> Option<Coord> {
        let (dr, dc) = HEX_ADJACENT[direction % 6];
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        let next = Coord::new(row, col);
        next.in_bounds(size).then_some(next)
    }

    /// All on-board neighbors
    pub fn neighbors(self, size: usize) -> impl Iterator<Item = Coord> {
        (0..6).filter_map(move |dir| self.neighbor(dir, size))
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        let dr = other.row as isize - self.row as isize;
        let dc = other.col as isize - self.col as isize;
        HEX_ADJACENT.contains(&(dr, dc))
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Coord::new(row, col)
    }
}

/// Neighbor offsets (drow, dcol) on the rhombus
pub const HEX_ADJACENT: [(isize, isize); 6] = [
    (-1, 0),
    (0, -1),
    (1, -1),
    (1, 0),
    (0, 1),
    (-1, 1),
];

/// Row-major N×N grid of cells
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, coord: Coord) -> Cell {
        debug_assert!(
            coord.in_bounds(self.size),
            "{:?} is off a {}x{} board",
            coord,
            self.size,
            self.size
        );
        self.cells[coord.row * self.size + coord.col]
    }

    pub fn set(&mut self, coord: Coord, cell: Cell) {
        debug_assert!(
            coord.in_bounds(self.size),
            "{:?} is off a {}x{} board",
            coord,
            self.size,
            self.size
        );
        self.cells[coord.row * self.size + coord.col] = cell;
    }

    /// Iterate rows as slices
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.size.max(1))
    }

    /// Iterate every coordinate in row-major order
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Coord::new(row, col)))
    }

    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Cells on the edge a player starts from (column 0 for Blue, row 0 for Red)
    pub fn start_edge(&self, player: Player) -> impl Iterator<Item = Coord> {
        edge(player, 0, self.size)
    }

    /// Cells on the edge a player must reach
    pub fn goal_edge(&self, player: Player) -> impl Iterator<Item = Coord> {
        edge(player, self.size.saturating_sub(1), self.size)
    }
}

fn edge(player: Player, line: usize, size: usize) -> impl Iterator<Item = Coord> {
    (0..size).map(move |i| match player {
        Player::Blue => Coord::new(i, line),
        Player::Red => Coord::new(line, i),
    })
}
