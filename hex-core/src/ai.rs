//! Computer players: uniform random, charge field and alpha-beta negamax
//!
//! The alpha-beta player searches to a fixed depth, or deepens one ply at a
//! time until its time budget runs low. A transposition table and per-ply
//! killer moves cut down the work of each pass.

use std::str::FromStr;
use std::time::{Duration, Instant};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::{Coord, Grid, Player};
use crate::charge::ChargeField;
use crate::error::HexError;
use crate::eval::{evaluate, Heuristic, WIN_VALUE};
use crate::game::{BoardState, Move};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Noise scale for evaluation variety
const NOISE_SCALE: f32 = 0.1;

/// Bonus for candidate cells touching the previous move
const REPLY_BONUS: f32 = 2.0;

// ============================================================================
// AGENT INTERFACE
// ============================================================================

/// What a player does on its turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Play(Move),
    Resign,
    /// Take back the opponent's reply and this player's previous move
    Undo,
}

/// Anything that can pick an action for the side to move
pub trait Agent {
    fn name(&self) -> &str;

    fn select(&mut self, state: &mut BoardState) -> Action;

    fn is_human(&self) -> bool {
        false
    }
}

/// Play until someone wins, alternating between two agents.
///
/// An agent that proposes an illegal move forfeits the game, as does one
/// that asks to undo before it has a move of its own to take back.
pub fn play_game(state: &mut BoardState, blue: &mut dyn Agent, red: &mut dyn Agent) -> Player {
    loop {
        if let Some(winner) = state.winner() {
            return winner;
        }

        let mover = state.turn();
        let agent: &mut dyn Agent = match mover {
            Player::Blue => &mut *blue,
            Player::Red => &mut *red,
        };

        match agent.select(state) {
            Action::Play(mv) => {
                if !state.play(mv) {
                    tracing::warn!("{} proposed illegal move {:?}, forfeiting", agent.name(), mv);
                    state.resign();
                }
            }
            Action::Resign => {
                tracing::debug!("{} resigned", agent.name());
                state.resign();
            }
            Action::Undo => {
                if state.history().len() < 2 {
                    tracing::warn!(
                        "{} asked to undo with nothing to take back, forfeiting",
                        agent.name()
                    );
                    state.resign();
                } else {
                    state.undo_moves(2);
                }
            }
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// How alpha-beta sorts candidate moves before searching them
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveOrdering {
    /// Near the center and next to the last stone first
    #[default]
    Center,
    /// Most contested cells of the charge field first
    Charge,
}

impl FromStr for MoveOrdering {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "center" | "centre" => Ok(MoveOrdering::Center),
            "charge" => Ok(MoveOrdering::Charge),
            other => Err(HexError::Config(format!("unknown move ordering: {}", other))),
        }
    }
}

/// Alpha-beta search settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Search depth in plies (the deepest pass when a time budget is set)
    pub depth: u32,
    /// Candidate moves kept after ordering at each node
    pub max_moves: usize,
    /// Leaf evaluator
    pub heuristic: Heuristic,
    /// Resign when every line loses
    pub resign_when_lost: bool,
    /// Per-move time budget; enables iterative deepening
    pub max_time_ms: Option<u64>,
    /// Killer moves remembered per ply (0 = off)
    pub killer_moves: usize,
    /// Reuse scores of positions reached by different move orders
    pub transposition_table: bool,
    pub ordering: MoveOrdering,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            max_moves: 24,
            heuristic: Heuristic::default(),
            resign_when_lost: true,
            max_time_ms: None,
            killer_moves: 6,
            transposition_table: true,
            ordering: MoveOrdering::default(),
        }
    }
}

// ============================================================================
// RANDOM AI
// ============================================================================

/// Picks uniformly among legal moves (including the swap when available)
pub struct RandomAI {
    rng: ChaCha8Rng,
}

impl RandomAI {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_rng(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl Agent for RandomAI {
    fn name(&self) -> &str {
        "random"
    }

    fn select(&mut self, state: &mut BoardState) -> Action {
        match state.legal_moves().choose(&mut self.rng) {
            Some(&mv) => Action::Play(mv),
            None => Action::Resign,
        }
    }
}

// ============================================================================
// CHARGE AI
// ============================================================================

/// Plays the most contested empty cell of the charge field, no search
#[derive(Clone, Copy, Debug, Default)]
pub struct ChargeAI;

impl Agent for ChargeAI {
    fn name(&self) -> &str {
        "charge"
    }

    fn select(&mut self, state: &mut BoardState) -> Action {
        match ChargeField::from_state(state).most_contested(state) {
            Some(coord) => Action::Play(Move::Place(coord)),
            None => Action::Resign,
        }
    }
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Which side of the window a stored score is exact for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bound {
    Exact,
    /// Search failed high; true score is at least this
    Lower,
    /// Search failed low; true score is at most this
    Upper,
}

#[derive(Clone, Copy, Debug)]
struct TableEntry {
    depth: i32,
    value: f32,
    bound: Bound,
}

/// Alpha-Beta AI player
pub struct AlphaBetaAI {
    pub config: AiConfig,
    rng: ChaCha8Rng,
    nodes: u64,
    table: FxHashMap<(Grid, Player), TableEntry>,
    /// Moves that caused a cutoff, indexed by ply
    killers: Vec<Vec<Move>>,
    deadline: Option<Instant>,
    aborted: bool,
}

impl AlphaBetaAI {
    pub fn new(config: AiConfig) -> Self {
        Self::with_seed(config, 42)
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            nodes: 0,
            table: FxHashMap::default(),
            killers: Vec::new(),
            deadline: None,
            aborted: false,
        }
    }

    /// Get best move and its score for the side to move.
    ///
    /// With a time budget, searches depth 1, 2, ... up to `config.depth`,
    /// starting each pass from the previous pass's best move. A pass that
    /// runs out of time is thrown away; depth 1 always completes. No new pass
    /// starts once a fifth of the budget is spent or a forced result is found.
    pub fn best_move(&mut self, state: &mut BoardState) -> Option<(Move, f32)> {
        self.nodes = 0;
        self.table.clear();
        self.killers.clear();
        self.aborted = false;

        let mut moves = state.legal_moves();
        if moves.is_empty() {
            return None;
        }
        self.order_moves(state, &mut moves, 0);

        let start = Instant::now();
        let budget = self.config.max_time_ms.map(Duration::from_millis);
        let max_depth = self.config.depth.max(1) as i32;
        let first_depth = if budget.is_some() { 1 } else { max_depth };

        let mut best: Option<(Move, f32)> = None;
        for depth in first_depth..=max_depth {
            self.deadline = match budget {
                Some(budget) if depth > 1 => Some(start + budget),
                _ => None,
            };
            let Some((mv, score)) = self.search_root(state, &moves, depth) else {
                tracing::debug!("alpha-beta out of time during depth {}", depth);
                break;
            };
            best = Some((mv, score));

            tracing::debug!(
                "alpha-beta depth={} chose {:?} score={:.2} nodes={} table={}",
                depth,
                mv,
                score,
                self.nodes,
                self.table.len()
            );

            if score.abs() >= WIN_VALUE {
                break;
            }
            if let Some(budget) = budget {
                if start.elapsed() * 5 > budget {
                    break;
                }
            }
            if let Some(pos) = moves.iter().position(|&m| m == mv) {
                moves[..=pos].rotate_right(1);
            }
        }

        self.deadline = None;
        best
    }

    /// One full-width pass over the root moves; `None` if time ran out
    fn search_root(&mut self, state: &mut BoardState, moves: &[Move], depth: i32) -> Option<(Move, f32)> {
        let mut best: Option<(Move, f32)> = None;
        let mut alpha = f32::NEG_INFINITY;

        for &mv in moves {
            if !state.play(mv) {
                continue;
            }
            let score = -self.negamax(state, depth - 1, 1, f32::NEG_INFINITY, -alpha);
            take_back(state);
            if self.aborted {
                return None;
            }

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }
        best
    }

    fn negamax(
        &mut self,
        state: &mut BoardState,
        depth: i32,
        ply: usize,
        mut alpha: f32,
        mut beta: f32,
    ) -> f32 {
        self.nodes += 1;

        // Terminal check with depth bonus: prefer quick wins and slow losses
        if let Some(winner) = state.winner() {
            let value = WIN_VALUE + depth as f32;
            return if winner == state.turn() { value } else { -value };
        }

        if depth <= 0 {
            let noise = (self.rng.gen::<f32>() - 0.5) * NOISE_SCALE;
            return evaluate(state, self.config.heuristic) + noise;
        }

        if self.deadline.map_or(false, |deadline| Instant::now() >= deadline) {
            self.aborted = true;
            return 0.0;
        }

        let key = (state.grid().clone(), state.turn());
        let alpha_orig = alpha;
        if self.config.transposition_table {
            if let Some(&entry) = self.table.get(&key) {
                if entry.depth >= depth {
                    match entry.bound {
                        Bound::Exact => return entry.value,
                        Bound::Lower => alpha = alpha.max(entry.value),
                        Bound::Upper => beta = beta.min(entry.value),
                    }
                    if alpha >= beta {
                        return entry.value;
                    }
                }
            }
        }

        let mut moves = state.legal_moves();
        self.order_moves(state, &mut moves, ply);

        let mut best = f32::NEG_INFINITY;
        for mv in moves {
            if !state.play(mv) {
                continue;
            }
            let score = -self.negamax(state, depth - 1, ply + 1, -beta, -alpha);
            take_back(state);
            if self.aborted {
                return 0.0;
            }

            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                self.remember_killer(ply, mv);
                break;
            }
        }

        if self.config.transposition_table {
            let bound = if best <= alpha_orig {
                Bound::Upper
            } else if best >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.table.insert(key, TableEntry { depth, value: best, bound });
        }

        best
    }

    /// Sort by the configured ordering, pull this ply's killers to the
    /// front, then keep the best `max_moves`
    fn order_moves(&self, state: &BoardState, moves: &mut Vec<Move>, ply: usize) {
        match self.config.ordering {
            MoveOrdering::Center => moves.sort_by(|a, b| {
                move_score(state, b)
                    .partial_cmp(&move_score(state, a))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            MoveOrdering::Charge => {
                let field = ChargeField::from_state(state);
                let contest = |mv: &Move| match mv {
                    Move::Place(coord) => field.contest(*coord),
                    Move::Swap => 0.0,
                };
                moves.sort_by(|a, b| {
                    contest(a)
                        .partial_cmp(&contest(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
        }

        if let Some(killers) = self.killers.get(ply) {
            // Stable: killers keep their relative order, as do the rest
            moves.sort_by_key(|mv| !killers.contains(mv));
        }

        let max_moves = self.config.max_moves;
        if max_moves > 0 && moves.len() > max_moves {
            moves.truncate(max_moves);
        }
    }

    fn remember_killer(&mut self, ply: usize, mv: Move) {
        let limit = self.config.killer_moves;
        if limit == 0 {
            return;
        }
        if self.killers.len() <= ply {
            self.killers.resize_with(ply + 1, Vec::new);
        }
        let killers = &mut self.killers[ply];
        if killers.contains(&mv) {
            return;
        }
        killers.push(mv);
        if killers.len() > limit {
            killers.remove(0);
        }
    }
}

impl Agent for AlphaBetaAI {
    fn name(&self) -> &str {
        "alpha-beta"
    }

    fn select(&mut self, state: &mut BoardState) -> Action {
        match self.best_move(state) {
            Some((_, score)) if self.config.resign_when_lost && score <= -WIN_VALUE => Action::Resign,
            Some((mv, _)) => Action::Play(mv),
            None => Action::Resign,
        }
    }
}

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Score a move for ordering (higher = search first)
fn move_score(state: &BoardState, mv: &Move) -> f32 {
    match mv {
        Move::Swap => swap_score(state),
        Move::Place(coord) => {
            let mut score = -center_distance(*coord, state.size());
            if let Some(last) = state.last_placed() {
                if last.is_adjacent(*coord) {
                    score += REPLY_BONUS;
                }
            }
            score
        }
    }
}

/// Swapping is worth it when the opening stone is close to the center
fn swap_score(state: &BoardState) -> f32 {
    match state.last_placed() {
        Some(opening) => 1.0 - center_distance(opening, state.size()),
        None => f32::NEG_INFINITY,
    }
}

/// Hex distance from the board center, in cells
fn center_distance(coord: Coord, size: usize) -> f32 {
    let mid = (size as f32 - 1.0) / 2.0;
    let dr = coord.row as f32 - mid;
    let dc = coord.col as f32 - mid;
    // On this rhombus the (1,-1) diagonal is a single step
    if dr * dc < 0.0 {
        dr.abs().max(dc.abs())
    } else {
        dr.abs() + dc.abs()
    }
}

/// Undo a move the search just played
fn take_back(state: &mut BoardState) {
    let undone = state.undo();
    debug_assert!(undone.is_ok(), "search undo with empty history");
}

// ============================================================================
// TESTS
// ============================================================================
