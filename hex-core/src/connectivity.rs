//! Edge-to-edge connectivity search
//!
//! Decides whether a player's stones form a chain between that player's two
//! target edges and, when they do, reconstructs one such chain.
//!
//! The frontier is ordered by remaining distance to the goal edge. This is a
//! greedy best-first search: it never misses an existing connection, but the
//! reported chain is not necessarily the shortest one.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::board::{Coord, Grid, Player};

/// Find a chain of `player`'s stones joining its start and goal edges.
///
/// The returned path runs from the cell touching the goal edge back to a
/// cell on the start edge. Consecutive entries are hex-adjacent.
pub fn is_connected(grid: &Grid, player: Player) -> Option<Vec<Coord>> {
    if !touches_both_edges(grid, player) {
        return None;
    }

    let size = grid.size();
    let mut frontier = BinaryHeap::new();
    for seed in grid.start_edge(player) {
        if grid.get(seed).is_owned_by(player) {
            frontier.push(Reverse((player.remaining_distance(seed, size), seed)));
        }
    }

    let mut parent: FxHashMap<Coord, Coord> = FxHashMap::default();
    let mut visited: FxHashSet<Coord> = FxHashSet::default();

    while let Some(Reverse((_, current))) = frontier.pop() {
        if !visited.insert(current) {
            continue;
        }

        if player.axis(current) == size - 1 {
            return Some(reconstruct(&parent, current));
        }

        for next in current.neighbors(size) {
            if grid.get(next).is_owned_by(player) && !visited.contains(&next) {
                parent.insert(next, current);
                frontier.push(Reverse((player.remaining_distance(next, size), next)));
            }
        }
    }

    None
}

/// Fast reject: a connection needs at least one stone on each target edge
fn touches_both_edges(grid: &Grid, player: Player) -> bool {
    let owned = |c: Coord| grid.get(c).is_owned_by(player);
    grid.start_edge(player).any(owned) && grid.goal_edge(player).any(owned)
}

fn reconstruct(parent: &FxHashMap<Coord, Coord>, end: Coord) -> Vec<Coord> {
    let mut path = vec![end];
    let mut pos = end;
    while let Some(&prev) = parent.get(&pos) {
        path.push(prev);
        pos = prev;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    fn grid_from(rows: &[&str]) -> Grid {
        let mut grid = Grid::new(rows.len());
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                let cell = match ch {
                    'B' => Cell::Blue,
                    'R' => Cell::Red,
                    _ => Cell::Empty,
                };
                grid.set(Coord::new(r, c), cell);
            }
        }
        grid
    }

    fn assert_valid_chain(path: &[Coord], player: Player, size: usize) {
        assert!(!path.is_empty());
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "{:?} not adjacent", pair);
        }
        assert_eq!(player.axis(path[0]), size - 1);
        assert_eq!(player.axis(*path.last().unwrap()), 0);
    }

    #[test]
    fn test_missing_edge_rejects() {
        // Blue spans columns 0..=1 only
        let grid = grid_from(&["BB.", "...", "..."]);
        assert!(is_connected(&grid, Player::Blue).is_none());
        assert!(!touches_both_edges(&grid, Player::Blue));
    }

    #[test]
    fn test_straight_row_connects_blue() {
        let grid = grid_from(&["BBB", "RR.", "..."]);
        let path = is_connected(&grid, Player::Blue).unwrap();
        assert_eq!(path, vec![Coord::new(0, 2), Coord::new(0, 1), Coord::new(0, 0)]);
        assert!(is_connected(&grid, Player::Red).is_none());
    }

    #[test]
    fn test_diagonal_chain_connects_red() {
        // (0,2) -> (1,1) -> (2,0) follows the (1,-1) adjacency
        let grid = grid_from(&["..R", ".R.", "R.."]);
        let path = is_connected(&grid, Player::Red).unwrap();
        assert_valid_chain(&path, Player::Red, 3);
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_non_adjacent_diagonal_does_not_connect() {
        // (0,0) -> (1,1) -> (2,2) is not a hex-adjacent chain
        let grid = grid_from(&["R..", ".R.", "..R"]);
        assert!(is_connected(&grid, Player::Red).is_none());
    }

    #[test]
    fn test_winding_chain() {
        let grid = grid_from(&[
            "B....",
            "BBBB.",
            "...B.",
            ".BBB.",
            ".BBBB",
        ]);
        let path = is_connected(&grid, Player::Blue).unwrap();
        assert_valid_chain(&path, Player::Blue, 5);
    }

    #[test]
    fn test_dead_end_branches_are_not_connections() {
        let grid = grid_from(&[
            "BBB.",
            "..R.",
            "BB.B",
            "....",
        ]);
        assert!(is_connected(&grid, Player::Blue).is_none());
    }

    #[test]
    fn test_idempotent() {
        let grid = grid_from(&["RB.", "RB.", "R.B"]);
        let first = is_connected(&grid, Player::Red);
        let second = is_connected(&grid, Player::Red);
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn test_single_cell_board() {
        let grid = grid_from(&["B"]);
        assert_eq!(is_connected(&grid, Player::Blue), Some(vec![Coord::new(0, 0)]));
        assert!(is_connected(&grid, Player::Red).is_none());
    }
}
