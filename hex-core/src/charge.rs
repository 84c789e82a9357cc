//! Charge field: a cheap positional signal for move ordering
//!
//! Every stone is a point charge (Blue positive, Red negative) and each
//! player's goal edges are lines of that player's charge. Along each of the
//! three board lines through a cell the field either bends (the cell is a
//! local minimum or maximum) or runs straight through. Cells where the field
//! bends up along one line and down along another are saddle points between
//! Blue and Red influence: contested cells, worth playing or searching first.

use crate::board::{Coord, Player};
use crate::game::{BoardState, Move};

/// Magnitude of a stone's own cell; no cell is pushed beyond it
const MAX_CHARGE: f32 = 9.0;

/// Charge values on the board plus a one-cell border for the edge lines
#[derive(Clone, Debug, PartialEq)]
pub struct ChargeField {
    size: usize,
    values: Vec<f32>,
}

impl ChargeField {
    /// Field of an empty board: only the edge lines are charged
    pub fn new(size: usize) -> Self {
        let stride = size + 2;
        let mut field = Self {
            size,
            values: vec![0.0; stride * stride],
        };
        let far = size as isize;
        for i in 0..far {
            field.add_charge(Player::Blue, i, -1);
            field.add_charge(Player::Blue, i, far);
            field.add_charge(Player::Red, -1, i);
            field.add_charge(Player::Red, far, i);
        }
        field
    }

    /// Replay a game's history onto a fresh field.
    ///
    /// A swap wipes the field and recharges only the transposed opening stone.
    pub fn from_state(state: &BoardState) -> Self {
        let size = state.size();
        let mut field = Self::new(size);
        let mut mover = Player::Blue;
        let mut opening = None;

        for mv in state.history() {
            match *mv {
                Move::Place(coord) => {
                    opening.get_or_insert(coord);
                    field.add_stone(mover, coord);
                }
                Move::Swap => {
                    field = Self::new(size);
                    if let Some(coord) = opening {
                        field.add_stone(mover, coord.transposed());
                    }
                }
            }
            mover = mover.opponent();
        }
        field
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Field value at an on-board cell
    pub fn charge(&self, coord: Coord) -> f32 {
        self.at(coord.row as isize, coord.col as isize)
    }

    /// How contested a cell is. Negative at saddle points; lower is more
    /// contested.
    pub fn contest(&self, coord: Coord) -> f32 {
        let (r, c) = (coord.row as isize, coord.col as isize);
        let centre = self.at(r, c);
        let bends = [
            bend(self.at(r, c - 1), centre, self.at(r, c + 1)),
            bend(self.at(r + 1, c - 1), centre, self.at(r - 1, c + 1)),
            bend(self.at(r + 1, c), centre, self.at(r - 1, c)),
        ];
        let lo = bends.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = bends.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        lo * hi
    }

    /// Most contested empty cell, first in row-major order on ties
    pub fn most_contested(&self, state: &BoardState) -> Option<Coord> {
        let mut best: Option<(Coord, f32)> = None;
        for coord in state.grid().coords() {
            if !state.cell(coord).is_empty() {
                continue;
            }
            let score = self.contest(coord);
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((coord, score));
            }
        }
        best.map(|(coord, _)| coord)
    }

    fn add_stone(&mut self, player: Player, coord: Coord) {
        self.add_charge(player, coord.row as isize, coord.col as isize);
    }

    /// Add a unit charge at (row, col), which may lie on the border.
    /// Cells already at full charge are left alone.
    fn add_charge(&mut self, player: Player, row: isize, col: isize) {
        let sign = match player {
            Player::Blue => 1.0,
            Player::Red => -1.0,
        };
        let stride = (self.size + 2) as isize;
        for r in -1..stride - 1 {
            for c in -1..stride - 1 {
                let idx = self.index(r, c);
                let value = self.values[idx];
                if value.abs() == MAX_CHARGE {
                    continue;
                }
                let next = if (r, c) == (row, col) {
                    sign * MAX_CHARGE
                } else {
                    let d = distance(r - row, c - col) as f32;
                    value + sign / (d * d)
                };
                self.values[idx] = next.clamp(-MAX_CHARGE, MAX_CHARGE);
            }
        }
    }

    fn at(&self, row: isize, col: isize) -> f32 {
        self.values[self.index(row, col)]
    }

    fn index(&self, row: isize, col: isize) -> usize {
        let stride = self.size + 2;
        (row + 1) as usize * stride + (col + 1) as usize
    }
}

/// Step distance used for charge falloff: the shorter of a plain
/// row-plus-column walk and one that uses the (1,-1) diagonal
fn distance(dr: isize, dc: isize) -> isize {
    let manhattan = dr.abs() + dc.abs();
    let diagonal = dc.abs() + (dr + dc).abs();
    manhattan.min(diagonal)
}

/// Second difference through `mid` when it is an extremum of the three,
/// zero when the values run monotonically
fn bend(left: f32, mid: f32, right: f32) -> f32 {
    let lo = left.min(right);
    let hi = left.max(right);
    if mid <= lo || mid >= hi {
        (left - mid) + (right - mid)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(distance(0, 0), 0);
        assert_eq!(distance(1, -1), 1);
        assert_eq!(distance(-1, 1), 1);
        assert_eq!(distance(1, 1), 2);
        assert_eq!(distance(0, 3), 3);
    }

    #[test]
    fn test_bend() {
        assert_eq!(bend(1.0, 0.0, 1.0), 2.0);
        assert_eq!(bend(-1.0, 0.0, -1.0), -2.0);
        assert_eq!(bend(0.0, 1.0, 2.0), 0.0);
    }

    #[test]
    fn test_edges_charge_the_border() {
        let field = ChargeField::new(5);
        // Blue edges are positive, Red edges negative
        assert_eq!(field.at(2, -1), MAX_CHARGE);
        assert_eq!(field.at(2, 5), MAX_CHARGE);
        assert_eq!(field.at(-1, 2), -MAX_CHARGE);
        assert_eq!(field.at(5, 2), -MAX_CHARGE);
    }

    #[test]
    fn test_stones_saturate_their_cell() {
        let mut state = BoardState::new(5, false).unwrap();
        let empty = ChargeField::from_state(&state);
        state.play_at(2, 2);
        state.play_at(0, 4);
        let field = ChargeField::from_state(&state);

        assert_eq!(field.charge(Coord::new(2, 2)), MAX_CHARGE);
        assert_eq!(field.charge(Coord::new(0, 4)), -MAX_CHARGE);
        // A Blue stone pulls its neighbor towards Blue
        assert!(field.charge(Coord::new(3, 2)) > empty.charge(Coord::new(3, 2)));
    }

    #[test]
    fn test_swap_recharges_transposed_stone() {
        let mut state = BoardState::new(5, true).unwrap();
        state.play_at(1, 3);
        state.play(Move::Swap);

        let mut expected = ChargeField::new(5);
        expected.add_stone(Player::Red, Coord::new(3, 1));
        assert_eq!(ChargeField::from_state(&state), expected);
    }

    #[test]
    fn test_most_contested_skips_stones() {
        let mut state = BoardState::new(5, false).unwrap();
        let field = ChargeField::from_state(&state);
        let first = field.most_contested(&state).unwrap();

        state.play(first);
        let field = ChargeField::from_state(&state);
        let second = field.most_contested(&state).unwrap();
        assert_ne!(first, second);
        assert!(state.cell(second).is_empty());
    }
}
