//! Hex Core - Game engine and AI
//!
//! This crate provides the core game logic for Hex:
//! - Board geometry (square grid with hex adjacency)
//! - Game state with move/undo, resignation and the swap (pie) rule
//! - Edge-to-edge connectivity search and winning chain reconstruction
//! - Position evaluation with shortest-path and two-distance heuristics
//! - Random, charge-field, alpha-beta and Monte Carlo computer players
//! - ASCII rendering

pub mod board;
pub mod error;
pub mod game;
pub mod connectivity;
pub mod eval;
pub mod charge;
pub mod ai;
pub mod mcts;
pub mod render;
pub mod config;

// Re-exports for convenient access
pub use board::{Cell, Coord, Grid, Player, HEX_ADJACENT, MAX_BOARD_SIZE, DEFAULT_BOARD_SIZE};
pub use error::HexError;
pub use game::{BoardState, Move};
pub use connectivity::is_connected;
pub use eval::{evaluate, shortest_distance, two_distance, Heuristic, WIN_VALUE};
pub use charge::ChargeField;
pub use ai::{play_game, Action, Agent, AiConfig, AlphaBetaAI, ChargeAI, MoveOrdering, RandomAI};
pub use mcts::{random_playout, MctsAI, MctsConfig};
pub use render::render;
pub use config::{AgentKind, GameConfig};
