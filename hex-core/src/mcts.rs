//! Monte Carlo tree search player
//!
//! Grows a search tree one node per simulation and scores each new node by
//! filling the rest of the board at random. Uses arena allocation for the
//! tree.
//!
//! ## Architecture
//! - Level 2: Search loop (select, expand, simulate, backpropagate)
//! - Level 3: UCB1 calculation, node accessors
//! - Level 4: Random playouts

use std::time::{Duration, Instant};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::{Action, Agent};
use crate::board::{Cell, Coord, Player};
use crate::connectivity::is_connected;
use crate::game::{BoardState, Move};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Monte Carlo search settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Simulations per move
    pub simulations: usize,
    /// UCB1 exploration constant
    pub exploration: f32,
    /// Per-move time budget; the search stops at whichever limit comes first
    pub max_time_ms: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulations: 1000,
            exploration: 1.41, // sqrt(2)
            max_time_ms: None,
        }
    }
}

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Statistics for a tree node
#[derive(Clone, Debug, Default)]
pub struct NodeStats {
    pub visits: u32,
    /// Total wins for the player who moved into this node
    pub wins: f32,
}

impl NodeStats {
    pub fn win_rate(&self) -> f32 {
        if self.visits == 0 {
            0.5
        } else {
            self.wins / self.visits as f32
        }
    }
}

/// A node in the search tree
#[derive(Clone, Debug)]
pub struct MctsNode {
    pub state: BoardState,
    pub parent: Option<NodeId>,
    pub incoming_move: Option<Move>,
    pub children: Vec<(Move, NodeId)>,
    /// Moves not yet expanded, in random order
    pub untried_moves: Vec<Move>,
    pub stats: NodeStats,
    /// Set when the game is over at this node
    pub winner: Option<Player>,
}

impl MctsNode {
    fn new<R: Rng>(
        mut state: BoardState,
        parent: Option<NodeId>,
        incoming_move: Option<Move>,
        rng: &mut R,
    ) -> Self {
        let winner = state.winner();
        let mut untried_moves = if winner.is_none() {
            state.legal_moves()
        } else {
            Vec::new()
        };
        untried_moves.shuffle(rng);

        Self {
            state,
            parent,
            incoming_move,
            children: Vec::new(),
            untried_moves,
            stats: NodeStats::default(),
            winner,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty()
    }
}

// ============================================================================
// MCTS TREE
// ============================================================================

/// Search tree with arena allocation
#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
}

impl MctsTree {
    pub fn new<R: Rng>(root_state: BoardState, rng: &mut R) -> Self {
        Self {
            nodes: vec![MctsNode::new(root_state, None, None, rng)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Level 2: Tree Operations
    // ========================================================================

    /// Follow UCB1 down from the root to a node that is terminal or still
    /// has untried moves
    pub fn select_leaf(&self, exploration: f32) -> NodeId {
        let mut current = self.root();
        while self.get(current).is_fully_expanded() && !self.get(current).is_terminal() {
            match self.select_best_child(current, exploration) {
                Some(child) => current = child,
                None => break,
            }
        }
        current
    }

    /// Add one child for an untried move; `None` if there are none left
    pub fn expand<R: Rng>(&mut self, node_id: NodeId, rng: &mut R) -> Option<NodeId> {
        let mv = self.get_mut(node_id).untried_moves.pop()?;
        let mut child_state = self.get(node_id).state.clone();
        if !child_state.play(mv) {
            return None;
        }

        let child_id = NodeId(self.nodes.len());
        self.nodes
            .push(MctsNode::new(child_state, Some(node_id), Some(mv), rng));
        self.get_mut(node_id).children.push((mv, child_id));
        Some(child_id)
    }

    /// Credit a playout result to every node from `leaf_id` up to the root
    pub fn backpropagate(&mut self, leaf_id: NodeId, winner: Player) {
        let mut current = Some(leaf_id);
        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.stats.visits += 1;
            // The player who moved into this node is the one not on turn
            if node.state.turn() != winner {
                node.stats.wins += 1.0;
            }
            current = node.parent;
        }
    }

    // ========================================================================
    // Level 3: Selection Helpers
    // ========================================================================

    fn select_best_child(&self, node_id: NodeId, exploration: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.stats.visits;

        node.children
            .iter()
            .max_by(|(_, a), (_, b)| {
                let ucb_a = self.ucb1(*a, parent_visits, exploration);
                let ucb_b = self.ucb1(*b, parent_visits, exploration);
                ucb_a.partial_cmp(&ucb_b).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(_, id)| *id)
    }

    /// UCB1 = wins/visits + C * sqrt(ln(parent_visits) / visits)
    fn ucb1(&self, node_id: NodeId, parent_visits: u32, exploration: f32) -> f32 {
        let stats = &self.get(node_id).stats;
        if stats.visits == 0 {
            return f32::INFINITY;
        }
        let exploration_term =
            exploration * ((parent_visits as f32).ln() / stats.visits as f32).sqrt();
        stats.win_rate() + exploration_term
    }

    /// Most visited root move
    pub fn best_move(&self) -> Option<Move> {
        self.get(self.root())
            .children
            .iter()
            .max_by_key(|(_, id)| self.get(*id).stats.visits)
            .map(|(mv, _)| *mv)
    }

    /// Root moves with visit counts and win rates
    pub fn move_statistics(&self) -> Vec<(Move, u32, f32)> {
        self.get(self.root())
            .children
            .iter()
            .map(|(mv, id)| {
                let node = self.get(*id);
                (*mv, node.stats.visits, node.stats.win_rate())
            })
            .collect()
    }

    pub fn total_simulations(&self) -> u32 {
        self.get(self.root()).stats.visits
    }
}

// ============================================================================
// ROLLOUT (Level 4)
// ============================================================================

/// Fill every empty cell at random, alternating colours from the side to
/// move, and report who connects. A full board always has exactly one.
pub fn random_playout<R: Rng>(state: &BoardState, rng: &mut R) -> Player {
    let mut grid = state.grid().clone();
    let mut empty: Vec<Coord> = grid.coords().filter(|&c| grid.get(c).is_empty()).collect();
    empty.shuffle(rng);

    let mut mover = state.turn();
    for coord in empty {
        grid.set(coord, Cell::from(mover));
        mover = mover.opponent();
    }

    if is_connected(&grid, Player::Blue).is_some() {
        Player::Blue
    } else {
        Player::Red
    }
}

// ============================================================================
// MCTS AI
// ============================================================================

/// Monte Carlo tree search player
pub struct MctsAI {
    pub config: MctsConfig,
    rng: ChaCha8Rng,
}

impl MctsAI {
    pub fn new(config: MctsConfig) -> Self {
        Self::with_seed(config, 42)
    }

    pub fn with_seed(config: MctsConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Run a search from `state` and return the grown tree
    pub fn search(&mut self, state: &BoardState) -> MctsTree {
        let start = Instant::now();
        let deadline = self
            .config
            .max_time_ms
            .map(|ms| start + Duration::from_millis(ms));
        let mut tree = MctsTree::new(state.clone(), &mut self.rng);

        let mut simulations = 0;
        while simulations < self.config.simulations.max(1) {
            // At least one simulation, whatever the clock says
            if simulations > 0 && deadline.map_or(false, |d| Instant::now() >= d) {
                break;
            }
            self.run_simulation(&mut tree);
            simulations += 1;
        }

        tracing::debug!(
            "mcts ran {} simulations in {:.2?}, tree size {}",
            simulations,
            start.elapsed(),
            tree.len()
        );
        tree
    }

    pub fn best_move(&mut self, state: &BoardState) -> Option<Move> {
        self.search(state).best_move()
    }

    /// 1. Select 2. Expand 3. Simulate 4. Backpropagate
    fn run_simulation(&mut self, tree: &mut MctsTree) {
        let leaf = tree.select_leaf(self.config.exploration);
        let node = if tree.get(leaf).is_terminal() {
            leaf
        } else {
            tree.expand(leaf, &mut self.rng).unwrap_or(leaf)
        };

        let winner = match tree.get(node).winner {
            Some(winner) => winner,
            None => random_playout(&tree.get(node).state, &mut self.rng),
        };
        tree.backpropagate(node, winner);
    }
}

impl Agent for MctsAI {
    fn name(&self) -> &str {
        "mcts"
    }

    fn select(&mut self, state: &mut BoardState) -> Action {
        match self.best_move(state) {
            Some(mv) => Action::Play(mv),
            None => Action::Resign,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
