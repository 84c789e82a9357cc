//! Game state: grid, turn, move history and the cached winner

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Coord, Grid, Player, MAX_BOARD_SIZE};
use crate::connectivity::is_connected;
use crate::error::HexError;

// ============================================================================
// CORE TYPES
// ============================================================================

/// A move: place a stone, or take over the opening stone under the swap rule
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Place(Coord),
    Swap,
}

impl From<Coord> for Move {
    fn from(coord: Coord) -> Self {
        Move::Place(coord)
    }
}

impl From<(usize, usize)> for Move {
    fn from(pos: (usize, usize)) -> Self {
        Move::Place(pos.into())
    }
}

/// Cached answer to "has someone won?"
///
/// `Unknown` means the grid changed since the last check. `NoWinner` means
/// the check ran and the game continues.
#[derive(Clone, Debug, PartialEq, Eq)]
enum WinnerCache {
    Unknown,
    NoWinner,
    Connected { winner: Player, path: Vec<Coord> },
    Resigned { winner: Player },
}

// ============================================================================
// BOARD STATE
// ============================================================================

/// Hex game state (mutate in place, `undo` to step back)
#[derive(Clone, Debug)]
pub struct BoardState {
    grid: Grid,
    swap_rule: bool,
    history: Vec<Move>,
    turn: Player,
    cache: WinnerCache,
}

impl BoardState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    pub fn new(size: usize, swap_rule: bool) -> Result<Self, HexError> {
        if size == 0 || size > MAX_BOARD_SIZE {
            return Err(HexError::InvalidSize(size));
        }
        Ok(Self {
            grid: Grid::new(size),
            swap_rule,
            history: Vec::new(),
            turn: Player::Blue,
            cache: WinnerCache::NoWinner,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn swap_rule(&self) -> bool {
        self.swap_rule
    }

    /// Player to move
    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().copied()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Contents of `coord`, which must be on the board
    pub fn cell(&self, coord: Coord) -> Cell {
        self.grid.get(coord)
    }

    pub fn stone_count(&self) -> usize {
        self.grid.stone_count()
    }

    /// The cell that changed on the last move (the transposed opening stone after a swap)
    pub fn last_placed(&self) -> Option<Coord> {
        match self.history.last()? {
            Move::Place(coord) => Some(*coord),
            Move::Swap => self.opening_coord().map(Coord::transposed),
        }
    }

    /// Whether the player to move may swap right now
    pub fn is_swap_available(&self) -> bool {
        self.swap_rule && self.history.len() == 1
    }

    fn opening_coord(&self) -> Option<Coord> {
        match self.history.first()? {
            Move::Place(coord) => Some(*coord),
            Move::Swap => None,
        }
    }

    // ========================================================================
    // RESULT
    // ========================================================================

    /// Winner of the game, computing connectivity if the grid changed
    pub fn winner(&mut self) -> Option<Player> {
        match self.verdict() {
            WinnerCache::Connected { winner, .. } | WinnerCache::Resigned { winner } => Some(*winner),
            WinnerCache::NoWinner | WinnerCache::Unknown => None,
        }
    }

    /// Chain that won the game, start edge first. Empty when nobody has
    /// connected (including a win by resignation).
    pub fn winning_path(&mut self) -> &[Coord] {
        match self.verdict() {
            WinnerCache::Connected { path, .. } => path.as_slice(),
            _ => &[],
        }
    }

    pub fn is_over(&mut self) -> bool {
        self.winner().is_some()
    }

    fn verdict(&mut self) -> &WinnerCache {
        if self.cache == WinnerCache::Unknown {
            self.cache = self.compute_verdict();
        }
        &self.cache
    }

    fn compute_verdict(&self) -> WinnerCache {
        for player in [Player::Blue, Player::Red] {
            if let Some(mut path) = is_connected(&self.grid, player) {
                path.reverse();
                return WinnerCache::Connected { winner: player, path };
            }
        }
        WinnerCache::NoWinner
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Try to play a move. Returns `false` without touching the state when
    /// the game is decided or the move is illegal.
    pub fn play(&mut self, mv: impl Into<Move>) -> bool {
        if self.is_over() {
            return false;
        }

        match mv.into() {
            Move::Place(coord) if coord.in_bounds(self.size()) && self.grid.get(coord).is_empty() => {
                self.grid.set(coord, Cell::from(self.turn));
                self.history.push(Move::Place(coord));
                self.end_turn();
                true
            }
            Move::Place(coord) if Some(coord) == self.opening_coord() && self.is_swap_available() => {
                self.apply_swap()
            }
            Move::Swap if self.is_swap_available() => self.apply_swap(),
            _ => false,
        }
    }

    /// Convenience for `play(Move::Place(..))`
    pub fn play_at(&mut self, row: usize, col: usize) -> bool {
        self.play(Coord::new(row, col))
    }

    /// Mirror the opening stone across the long diagonal and hand it to the
    /// second player
    fn apply_swap(&mut self) -> bool {
        let Some(opening) = self.opening_coord() else {
            return false;
        };
        self.grid.set(opening, Cell::Empty);
        self.grid.set(opening.transposed(), Cell::from(self.turn));
        self.history.push(Move::Swap);
        self.end_turn();
        true
    }

    /// Take back the most recent move and return it
    pub fn undo(&mut self) -> Result<Move, HexError> {
        let mv = self.history.pop().ok_or(HexError::NoHistory)?;
        match mv {
            Move::Place(coord) => self.grid.set(coord, Cell::Empty),
            Move::Swap => {
                let opening = self
                    .opening_coord()
                    .ok_or_else(|| HexError::InvalidMove("swap without an opening stone".into()))?;
                self.grid.set(opening.transposed(), Cell::Empty);
                self.grid.set(opening, Cell::Blue);
            }
        }
        self.end_turn();
        Ok(mv)
    }

    /// Take back up to `count` moves, most recent first. Returns how many
    /// were actually undone (fewer when history runs out).
    pub fn undo_moves(&mut self, count: usize) -> usize {
        let mut undone = 0;
        while undone < count && self.undo().is_ok() {
            undone += 1;
        }
        undone
    }

    /// The player to move gives up; the opponent wins immediately
    pub fn resign(&mut self) {
        if self.is_over() {
            return;
        }
        self.cache = WinnerCache::Resigned {
            winner: self.turn.opponent(),
        };
    }

    /// Every move the player to move could legally make
    pub fn legal_moves(&mut self) -> Vec<Move> {
        if self.is_over() {
            return vec![];
        }
        let mut moves: Vec<Move> = self
            .grid
            .coords()
            .filter(|&c| self.grid.get(c).is_empty())
            .map(Move::Place)
            .collect();
        if self.is_swap_available() {
            moves.push(Move::Swap);
        }
        moves
    }

    fn end_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.cache = WinnerCache::Unknown;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(state: &mut BoardState, moves: &[(usize, usize)]) {
        for &(r, c) in moves {
            assert!(state.play_at(r, c), "move ({}, {}) rejected", r, c);
        }
    }

    #[test]
    fn test_new_game() {
        let mut state = BoardState::new(7, false).unwrap();
        assert_eq!(state.turn(), Player::Blue);
        assert_eq!(state.winner(), None);
        assert!(state.winning_path().is_empty());
        assert_eq!(state.stone_count(), 0);
        assert_eq!(state.legal_moves().len(), 49);
    }

    #[test]
    fn test_invalid_size() {
        assert_eq!(BoardState::new(0, false).unwrap_err(), HexError::InvalidSize(0));
        assert!(BoardState::new(27, true).is_err());
        assert!(BoardState::new(1, false).is_ok());
    }

    #[test]
    fn test_ordinary_move_flips_turn() {
        let mut state = BoardState::new(5, false).unwrap();
        assert!(state.play_at(2, 2));
        assert_eq!(state.cell(Coord::new(2, 2)), Cell::Blue);
        assert_eq!(state.turn(), Player::Red);
        assert_eq!(state.history(), &[Move::Place(Coord::new(2, 2))]);
    }

    #[test]
    fn test_rejects_occupied_and_out_of_bounds() {
        let mut state = BoardState::new(3, false).unwrap();
        assert!(state.play_at(0, 0));
        assert!(!state.play_at(0, 0));
        assert!(!state.play_at(3, 0));
        assert!(!state.play_at(0, 3));
        assert_eq!(state.turn(), Player::Red);
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_blue_wins_top_row() {
        let mut state = BoardState::new(3, false).unwrap();
        play_all(&mut state, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(state.winner(), None);
        assert!(state.play_at(0, 2));
        assert_eq!(state.winner(), Some(Player::Blue));
        assert_eq!(
            state.winning_path(),
            &[Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]
        );
        // Decided games accept nothing
        assert!(!state.play_at(2, 2));
        assert_eq!(state.turn(), Player::Red);
    }

    #[test]
    fn test_red_wins_column() {
        let mut state = BoardState::new(3, false).unwrap();
        play_all(&mut state, &[(0, 0), (0, 2), (2, 2), (1, 2), (1, 0)]);
        assert_eq!(state.winner(), None);
        assert!(state.play_at(2, 1));
        assert_eq!(state.winner(), Some(Player::Red));
        let path = state.winning_path().to_vec();
        assert_eq!(path.first().map(|c| c.row), Some(0));
        assert_eq!(path.last().map(|c| c.row), Some(2));
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
    }

    #[test]
    fn test_swap_by_token() {
        let mut state = BoardState::new(5, true).unwrap();
        assert!(!state.play(Move::Swap));
        assert!(state.play_at(1, 3));
        assert!(state.is_swap_available());
        assert!(state.legal_moves().contains(&Move::Swap));
        assert!(state.play(Move::Swap));
        assert_eq!(state.cell(Coord::new(1, 3)), Cell::Empty);
        assert_eq!(state.cell(Coord::new(3, 1)), Cell::Red);
        assert_eq!(state.turn(), Player::Blue);
        assert_eq!(state.stone_count(), 1);
        assert_eq!(state.last_placed(), Some(Coord::new(3, 1)));
        // Only as the second move
        assert!(!state.play(Move::Swap));
    }

    #[test]
    fn test_swap_by_opening_coordinate() {
        let mut state = BoardState::new(5, true).unwrap();
        assert!(state.play_at(0, 4));
        assert!(state.play_at(0, 4));
        assert_eq!(state.last_move(), Some(Move::Swap));
        assert_eq!(state.cell(Coord::new(4, 0)), Cell::Red);
        assert_eq!(state.cell(Coord::new(0, 4)), Cell::Empty);
    }

    #[test]
    fn test_swap_on_diagonal_keeps_cell_occupied() {
        let mut state = BoardState::new(5, true).unwrap();
        assert!(state.play_at(2, 2));
        assert!(state.play(Move::Swap));
        assert_eq!(state.cell(Coord::new(2, 2)), Cell::Red);
        state.undo().unwrap();
        assert_eq!(state.cell(Coord::new(2, 2)), Cell::Blue);
    }

    #[test]
    fn test_swap_disabled_never_mutates() {
        let mut state = BoardState::new(5, false).unwrap();
        assert!(!state.play(Move::Swap));
        assert!(state.play_at(1, 1));
        let before = state.grid().clone();
        assert!(!state.play(Move::Swap));
        assert!(!state.play_at(1, 1));
        assert_eq!(state.grid(), &before);
        assert!(state.play_at(2, 2));
        assert!(!state.play(Move::Swap));
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn test_undo_swap_restores_opening() {
        let mut state = BoardState::new(5, true).unwrap();
        state.play_at(0, 3);
        state.play(Move::Swap);
        assert_eq!(state.undo(), Ok(Move::Swap));
        assert_eq!(state.cell(Coord::new(0, 3)), Cell::Blue);
        assert_eq!(state.cell(Coord::new(3, 0)), Cell::Empty);
        assert_eq!(state.turn(), Player::Red);
        assert!(state.is_swap_available());
    }

    #[test]
    fn test_undo_empty_history() {
        let mut state = BoardState::new(4, true).unwrap();
        assert_eq!(state.undo(), Err(HexError::NoHistory));
        assert_eq!(state.turn(), Player::Blue);
    }

    #[test]
    fn test_undo_round_trip() {
        let mut state = BoardState::new(4, true).unwrap();
        let start_grid = state.grid().clone();
        let moves = [Move::from((1, 2)), Move::Swap, Move::from((0, 0)), Move::from((3, 3))];
        for mv in moves {
            assert!(state.play(mv));
        }
        for _ in 0..moves.len() {
            state.undo().unwrap();
        }
        assert_eq!(state.grid(), &start_grid);
        assert_eq!(state.turn(), Player::Blue);
        assert!(state.history().is_empty());
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_undo_moves_stops_at_empty_history() {
        let mut state = BoardState::new(4, false).unwrap();
        assert_eq!(state.undo_moves(2), 0);
        play_all(&mut state, &[(0, 0), (1, 1), (2, 2)]);
        assert_eq!(state.undo_moves(2), 2);
        assert_eq!(state.history(), &[Move::Place(Coord::new(0, 0))]);
        assert_eq!(state.undo_moves(2), 1);
        assert!(state.history().is_empty());
        assert_eq!(state.turn(), Player::Blue);
    }

    #[test]
    fn test_undo_winning_move_reopens_game() {
        let mut state = BoardState::new(3, false).unwrap();
        play_all(&mut state, &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        assert_eq!(state.winner(), Some(Player::Blue));
        state.undo().unwrap();
        assert_eq!(state.winner(), None);
        assert!(state.play_at(2, 2));
    }

    #[test]
    fn test_resign() {
        let mut state = BoardState::new(5, false).unwrap();
        state.play_at(2, 2);
        // Red to move resigns
        state.resign();
        assert_eq!(state.winner(), Some(Player::Blue));
        assert!(state.winning_path().is_empty());
        assert!(!state.play_at(0, 0));
        assert!(state.legal_moves().is_empty());
    }

    #[test]
    fn test_resign_after_win_keeps_winner() {
        let mut state = BoardState::new(1, false).unwrap();
        assert!(state.play_at(0, 0));
        state.resign();
        assert_eq!(state.winner(), Some(Player::Blue));
        assert_eq!(state.winning_path(), &[Coord::new(0, 0)]);
    }

    #[test]
    fn test_winner_query_is_idempotent() {
        let mut state = BoardState::new(3, false).unwrap();
        play_all(&mut state, &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        let first = (state.winner(), state.winning_path().to_vec());
        let second = (state.winner(), state.winning_path().to_vec());
        assert_eq!(first, second);
    }
}
