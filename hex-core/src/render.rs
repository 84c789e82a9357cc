//! ASCII rendering of the board
//!
//! Rows are shifted right as they go down so the grid reads as a rhombus.
//! Winning chain cells are bracketed `[●]`, the last stone placed is
//! marked `(●)`.

use rustc_hash::FxHashSet;

use crate::board::{Cell, Coord};
use crate::game::BoardState;

const BLUE_STONE: char = '●';
const RED_STONE: char = '○';
const EMPTY: char = '·';

fn stone_char(cell: Cell) -> char {
    match cell {
        Cell::Empty => EMPTY,
        Cell::Blue => BLUE_STONE,
        Cell::Red => RED_STONE,
    }
}

/// Draw the board, 1-based row and column labels included
pub fn render(state: &mut BoardState) -> String {
    let path: FxHashSet<Coord> = state.winning_path().iter().copied().collect();
    let last = state.last_placed();
    let size = state.size();

    let mut out = String::from("     ");
    for col in 0..size {
        out.push_str(&format!("{:<4}", col + 1));
    }
    let header_len = out.trim_end().len();
    out.truncate(header_len);
    out.push('\n');

    for (row, cells) in state.grid().rows().enumerate() {
        let mut line = format!("{}{:>3} ", " ".repeat(row * 2), row + 1);
        for (col, &cell) in cells.iter().enumerate() {
            let coord = Coord::new(row, col);
            let (open, close) = if path.contains(&coord) {
                ('[', ']')
            } else if last == Some(coord) {
                ('(', ')')
            } else {
                (' ', ' ')
            };
            line.push(open);
            line.push(stone_char(cell));
            line.push(close);
            line.push(' ');
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str(&format!(
        "{} Blue connects left-right, {} Red connects top-bottom\n",
        BLUE_STONE, RED_STONE
    ));
    out
}
