//! Position evaluation
//!
//! Both heuristics measure how many more stones each side needs to connect
//! its edges and score the difference from the side to move's perspective.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Coord, Grid, Player};
use crate::connectivity::is_connected;
use crate::error::HexError;
use crate::game::BoardState;

/// Win value (effectively infinite)
pub const WIN_VALUE: f32 = 100000.0;

/// Distance charged to a side that has no path of the requested kind
const CUT_OFF: u32 = 100;

/// Which distance metric the evaluator uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Heuristic {
    /// Fewest empty cells on any path between the edges
    ShortestPath,
    /// Queenbee two-distance: every step must have a second-best alternative
    #[default]
    TwoDistance,
}

impl FromStr for Heuristic {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shortest-path" | "shortest" => Ok(Heuristic::ShortestPath),
            "two-distance" | "two" => Ok(Heuristic::TwoDistance),
            other => Err(HexError::Config(format!("unknown heuristic: {}", other))),
        }
    }
}

/// Evaluate position from the side to move's perspective
pub fn evaluate(state: &mut BoardState, heuristic: Heuristic) -> f32 {
    let me = state.turn();
    if let Some(winner) = state.winner() {
        return if winner == me { WIN_VALUE } else { -WIN_VALUE };
    }

    let grid = state.grid();
    let opponent = me.opponent();
    match heuristic {
        Heuristic::ShortestPath => shortest_path_score(grid, me),
        Heuristic::TwoDistance => match (two_distance(grid, me), two_distance(grid, opponent)) {
            (Some(mine), Some(theirs)) => theirs as f32 - mine as f32,
            (None, None) => shortest_path_score(grid, me),
            (mine, theirs) => {
                let raw = theirs.unwrap_or(CUT_OFF) as f32 - mine.unwrap_or(CUT_OFF) as f32;
                raw + shortest_path_score(grid, me)
            }
        },
    }
}

fn shortest_path_score(grid: &Grid, me: Player) -> f32 {
    let mine = shortest_distance(grid, me).unwrap_or(CUT_OFF);
    let theirs = shortest_distance(grid, me.opponent()).unwrap_or(CUT_OFF);
    theirs as f32 - mine as f32
}

// ============================================================================
// SHORTEST PATH
// ============================================================================

/// Fewest empty cells `player` must fill to connect its edges.
///
/// Own stones cost nothing, empty cells cost one, opponent stones block.
/// Returns `None` when the opponent has cut every path.
pub fn shortest_distance(grid: &Grid, player: Player) -> Option<u32> {
    let size = grid.size();
    let step_cost = |c: Coord| match grid.get(c) {
        Cell::Empty => Some(1),
        cell if cell.is_owned_by(player) => Some(0),
        _ => None,
    };

    let mut dist = vec![u32::MAX; size * size];
    let mut frontier = BinaryHeap::new();
    for seed in grid.start_edge(player) {
        if let Some(cost) = step_cost(seed) {
            dist[seed.row * size + seed.col] = cost;
            frontier.push(Reverse((cost, seed)));
        }
    }

    while let Some(Reverse((d, current))) = frontier.pop() {
        if d > dist[current.row * size + current.col] {
            continue;
        }
        if player.axis(current) == size - 1 {
            return Some(d);
        }
        for next in current.neighbors(size) {
            let Some(cost) = step_cost(next) else {
                continue;
            };
            let idx = next.row * size + next.col;
            if d + cost < dist[idx] {
                dist[idx] = d + cost;
                frontier.push(Reverse((d + cost, next)));
            }
        }
    }

    None
}

// ============================================================================
// TWO DISTANCE
// ============================================================================

/// Empty-cell graph for one player: own stone groups are transparent, so two
/// empty cells are neighbors if they touch directly or through a group.
struct EmptyGraph {
    cells: Vec<Coord>,
    neighbors: Vec<Vec<usize>>,
    touches_start: Vec<bool>,
    touches_goal: Vec<bool>,
}

impl EmptyGraph {
    fn build(grid: &Grid, player: Player) -> Self {
        let size = grid.size();
        let cells: Vec<Coord> = grid.coords().filter(|&c| grid.get(c).is_empty()).collect();
        let mut index = vec![usize::MAX; size * size];
        for (i, c) in cells.iter().enumerate() {
            index[c.row * size + c.col] = i;
        }

        let groups = StoneGroups::build(grid, player);

        let mut neighbors = vec![Vec::new(); cells.len()];
        let mut touches_start = vec![false; cells.len()];
        let mut touches_goal = vec![false; cells.len()];

        for (i, &cell) in cells.iter().enumerate() {
            touches_start[i] = player.axis(cell) == 0;
            touches_goal[i] = player.axis(cell) == size - 1;

            for next in cell.neighbors(size) {
                match grid.get(next) {
                    Cell::Empty => neighbors[i].push(index[next.row * size + next.col]),
                    c if c.is_owned_by(player) => {
                        let group = &groups.groups[groups.id[next.row * size + next.col]];
                        touches_start[i] |= group.touches_start;
                        touches_goal[i] |= group.touches_goal;
                        neighbors[i].extend(
                            group
                                .liberties
                                .iter()
                                .map(|l| index[l.row * size + l.col])
                                .filter(|&j| j != i),
                        );
                    }
                    _ => {}
                }
            }
            neighbors[i].sort_unstable();
            neighbors[i].dedup();
        }

        Self {
            cells,
            neighbors,
            touches_start,
            touches_goal,
        }
    }

    /// Two-distance of every empty cell from the edge marked by `touches`
    fn distances(&self, touches: &[bool]) -> Vec<u32> {
        let mut dist = vec![u32::MAX; self.cells.len()];
        let mut seen = vec![0u8; self.cells.len()];
        let mut level: Vec<usize> = (0..self.cells.len()).filter(|&i| touches[i]).collect();
        for &i in &level {
            dist[i] = 1;
        }

        let mut d = 1;
        while !level.is_empty() {
            let mut next_level = Vec::new();
            for &i in &level {
                for &n in &self.neighbors[i] {
                    if dist[n] != u32::MAX {
                        continue;
                    }
                    seen[n] += 1;
                    if seen[n] == 2 {
                        dist[n] = d + 1;
                        next_level.push(n);
                    }
                }
            }
            level = next_level;
            d += 1;
        }
        dist
    }
}

/// Connected groups of one player's stones
struct StoneGroups {
    id: Vec<usize>,
    groups: Vec<StoneGroup>,
}

struct StoneGroup {
    liberties: Vec<Coord>,
    touches_start: bool,
    touches_goal: bool,
}

impl StoneGroups {
    fn build(grid: &Grid, player: Player) -> Self {
        let size = grid.size();
        let mut id = vec![usize::MAX; size * size];
        let mut groups = Vec::new();

        for origin in grid.coords() {
            if !grid.get(origin).is_owned_by(player) || id[origin.row * size + origin.col] != usize::MAX {
                continue;
            }
            let gid = groups.len();
            let mut group = StoneGroup {
                liberties: Vec::new(),
                touches_start: false,
                touches_goal: false,
            };
            let mut stack = vec![origin];
            id[origin.row * size + origin.col] = gid;

            while let Some(stone) = stack.pop() {
                group.touches_start |= player.axis(stone) == 0;
                group.touches_goal |= player.axis(stone) == size - 1;
                for next in stone.neighbors(size) {
                    let idx = next.row * size + next.col;
                    match grid.get(next) {
                        Cell::Empty => group.liberties.push(next),
                        c if c.is_owned_by(player) && id[idx] == usize::MAX => {
                            id[idx] = gid;
                            stack.push(next);
                        }
                        _ => {}
                    }
                }
            }
            group.liberties.sort_unstable();
            group.liberties.dedup();
            groups.push(group);
        }

        Self { id, groups }
    }
}

/// Two-distance potential of `player`: the smallest `d_start + d_goal - 1`
/// over empty cells, or 0 if already connected.
pub fn two_distance(grid: &Grid, player: Player) -> Option<u32> {
    if is_connected(grid, player).is_some() {
        return Some(0);
    }

    let graph = EmptyGraph::build(grid, player);
    let from_start = graph.distances(&graph.touches_start);
    let from_goal = graph.distances(&graph.touches_goal);

    from_start
        .iter()
        .zip(&from_goal)
        .filter(|&(&s, &g)| s != u32::MAX && g != u32::MAX)
        .map(|(&s, &g)| s + g - 1)
        .min()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortest_distance_empty_board() {
        let grid = Grid::new(5);
        assert_eq!(shortest_distance(&grid, Player::Blue), Some(5));
        assert_eq!(shortest_distance(&grid, Player::Red), Some(5));
    }

    #[test]
    fn test_shortest_distance_counts_own_stones_free() {
        let mut state = BoardState::new(4, false).unwrap();
        state.play_at(1, 0);
        state.play_at(3, 3);
        state.play_at(1, 1);
        assert_eq!(shortest_distance(state.grid(), Player::Blue), Some(2));
    }

    #[test]
    fn test_shortest_distance_connected_is_zero() {
        let mut state = BoardState::new(2, false).unwrap();
        state.play_at(0, 0);
        state.play_at(1, 0);
        state.play_at(0, 1);
        assert_eq!(shortest_distance(state.grid(), Player::Blue), Some(0));
    }

    #[test]
    fn test_shortest_distance_blocked() {
        // Red wall across column 1 cuts Blue off
        let mut grid = Grid::new(3);
        for row in 0..3 {
            grid.set(Coord::new(row, 1), Cell::Red);
        }
        assert_eq!(shortest_distance(&grid, Player::Blue), None);
        assert_eq!(shortest_distance(&grid, Player::Red), Some(0));
    }

    #[test]
    fn test_two_distance_empty_board() {
        let grid = Grid::new(4);
        assert_eq!(two_distance(&grid, Player::Blue), Some(4));
        assert_eq!(two_distance(&grid, Player::Red), Some(4));
    }

    #[test]
    fn test_two_distance_one_move_from_win() {
        // Blue holds (0,0) and (0,2); (0,1) completes the row
        let mut grid = Grid::new(3);
        grid.set(Coord::new(0, 0), Cell::Blue);
        grid.set(Coord::new(0, 2), Cell::Blue);
        assert_eq!(two_distance(&grid, Player::Blue), Some(1));
    }

    #[test]
    fn test_heuristic_parse() {
        assert_eq!("shortest-path".parse::<Heuristic>().unwrap(), Heuristic::ShortestPath);
        assert_eq!("Two-Distance".parse::<Heuristic>().unwrap(), Heuristic::TwoDistance);
        assert!("charge".parse::<Heuristic>().is_err());
    }

    #[test]
    fn test_evaluate_terminal() {
        let mut state = BoardState::new(1, false).unwrap();
        state.play_at(0, 0);
        // Red to move and Blue has won
        assert_eq!(evaluate(&mut state, Heuristic::ShortestPath), -WIN_VALUE);
    }

    #[test]
    fn test_evaluate_prefers_side_ahead() {
        let mut state = BoardState::new(5, false).unwrap();
        state.play_at(2, 0);
        state.play_at(0, 4);
        state.play_at(2, 1);
        state.play_at(4, 4);
        state.play_at(2, 2);
        // Red to move, Blue is three stones up along its axis
        for heuristic in [Heuristic::ShortestPath, Heuristic::TwoDistance] {
            assert!(evaluate(&mut state, heuristic) < 0.0, "{:?}", heuristic);
        }
    }
}
