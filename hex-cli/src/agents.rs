//! Building players for a game
//!
//! - Computer players come from `hex_core::ai`
//! - `HumanAgent` reads moves from a line-based reader (stdin in practice)

use std::io::{BufRead, Write};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hex_core::{
    Action, AgentKind, Agent, AiConfig, AlphaBetaAI, BoardState, ChargeAI, Coord, HexError,
    MctsAI, MctsConfig, Move, Player, RandomAI,
};

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Build a computer player; `None` for human seats
pub fn build_computer(
    kind: AgentKind,
    ai: &AiConfig,
    mcts: &MctsConfig,
    rng: &mut ChaCha8Rng,
) -> Option<Box<dyn Agent>> {
    match kind {
        AgentKind::Human => None,
        AgentKind::Random => Some(Box::new(RandomAI::from_rng(ChaCha8Rng::seed_from_u64(rng.gen())))),
        AgentKind::AlphaBeta => Some(Box::new(AlphaBetaAI::with_seed(ai.clone(), rng.gen()))),
        AgentKind::Mcts => Some(Box::new(MctsAI::with_seed(mcts.clone(), rng.gen()))),
        AgentKind::Charge => Some(Box::new(ChargeAI)),
    }
}

/// Parse one line of human input.
///
/// Accepts `row,col` (1-based), `swap`, `undo` and `resign`.
pub fn parse_command(input: &str, size: usize) -> Result<Action, HexError> {
    let input = input.trim().to_ascii_lowercase();
    match input.as_str() {
        "resign" => return Ok(Action::Resign),
        "undo" => return Ok(Action::Undo),
        "swap" => return Ok(Action::Play(Move::Swap)),
        _ => {}
    }

    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let [row, col] = parts.as_slice() else {
        return Err(HexError::InvalidMove(format!("expected row,col but got '{}'", input)));
    };
    let parse = |s: &str| -> Result<usize, HexError> {
        match s.parse::<usize>() {
            Ok(n) if (1..=size).contains(&n) => Ok(n - 1),
            _ => Err(HexError::InvalidMove(format!("'{}' is not in 1..={}", s, size))),
        }
    };
    Ok(Action::Play(Move::Place(Coord::new(parse(*row)?, parse(*col)?))))
}

/// A player typing moves at a prompt
pub struct HumanAgent<R: BufRead, W: Write> {
    player: Player,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> HumanAgent<R, W> {
    pub fn new(player: Player, input: R, output: W) -> Self {
        Self {
            player,
            input,
            output,
        }
    }
}

impl<R: BufRead, W: Write> Agent for HumanAgent<R, W> {
    fn name(&self) -> &str {
        match self.player {
            Player::Blue => "human (blue)",
            Player::Red => "human (red)",
        }
    }

    fn select(&mut self, state: &mut BoardState) -> Action {
        loop {
            let _ = write!(self.output, "row,col (or \"swap\"/\"undo\"/\"resign\"): ");
            let _ = self.output.flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return Action::Resign,
                Ok(_) => {}
            }

            match parse_command(&line, state.size()) {
                Ok(action) => return action,
                Err(e) => {
                    let _ = writeln!(self.output, "{}", e);
                }
            }
        }
    }

    fn is_human(&self) -> bool {
        true
    }
}
