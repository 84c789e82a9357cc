//! Play command - a single game in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_config(), seat_players(), play_loop(), announce_result()
//! - Level 3: apply_action(), undo_turn()

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use hex_core::{
    render, Action, Agent, AgentKind, BoardState, GameConfig, Heuristic, MoveOrdering, Player,
};

use crate::agents::{build_computer, create_rng, HumanAgent};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Game settings JSON file (flags below override it)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board size
    #[arg(long)]
    pub size: Option<usize>,

    /// Allow the second player to swap on their first move
    #[arg(long)]
    pub swap: bool,

    /// Blue player: human, random, alpha-beta, mcts or charge
    #[arg(long)]
    pub blue: Option<AgentKind>,

    /// Red player: human, random, alpha-beta, mcts or charge
    #[arg(long)]
    pub red: Option<AgentKind>,

    /// Alpha-beta search depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Alpha-beta leaf evaluator: shortest-path or two-distance
    #[arg(long)]
    pub heuristic: Option<Heuristic>,

    /// Alpha-beta move ordering: center or charge
    #[arg(long)]
    pub ordering: Option<MoveOrdering>,

    /// MCTS simulations per move
    #[arg(long)]
    pub simulations: Option<usize>,

    /// Per-move thinking time for alpha-beta and MCTS, in milliseconds
    #[arg(long, value_name = "MS")]
    pub time_ms: Option<u64>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Resolve settings from file and flags
/// 2. Seat both players
/// 3. Play until someone wins
/// 4. Announce the result
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = resolve_config(&args, seed)?;

    tracing::info!(
        "Starting game: {}x{} board, swap rule {}, blue={}, red={}",
        config.size,
        config.size,
        if config.swap_rule { "on" } else { "off" },
        config.blue,
        config.red
    );

    let mut state = config.new_board()?;
    let mut players = seat_players(&config);

    let winner = play_loop(&mut state, &mut players)?;
    announce_result(&mut state, winner);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Merge the optional config file with command-line overrides
fn resolve_config(args: &PlayArgs, seed: Option<u64>) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Some(size) = args.size {
        config.size = size;
    }
    if args.swap {
        config.swap_rule = true;
    }
    if let Some(blue) = args.blue {
        config.blue = blue;
    }
    if let Some(red) = args.red {
        config.red = red;
    }
    if let Some(depth) = args.depth {
        config.ai.depth = depth;
    }
    if let Some(heuristic) = args.heuristic {
        config.ai.heuristic = heuristic;
    }
    if let Some(ordering) = args.ordering {
        config.ai.ordering = ordering;
    }
    if let Some(simulations) = args.simulations {
        config.mcts.simulations = simulations;
    }
    if args.time_ms.is_some() {
        config.ai.max_time_ms = args.time_ms;
        config.mcts.max_time_ms = args.time_ms;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

/// Build the Blue and Red players, in that order
fn seat_players(config: &GameConfig) -> [Box<dyn Agent>; 2] {
    let mut rng = create_rng(config.seed);
    let mut seat = |kind: AgentKind, player: Player| -> Box<dyn Agent> {
        match build_computer(kind, &config.ai, &config.mcts, &mut rng) {
            Some(agent) => agent,
            // One-byte buffer: two human seats read from the same stdin
            None => Box::new(HumanAgent::new(
                player,
                BufReader::with_capacity(1, io::stdin()),
                io::stdout(),
            )),
        }
    };
    [seat(config.blue, Player::Blue), seat(config.red, Player::Red)]
}

/// Alternate turns until the game is decided
fn play_loop(state: &mut BoardState, players: &mut [Box<dyn Agent>; 2]) -> Result<Player> {
    loop {
        if let Some(winner) = state.winner() {
            return Ok(winner);
        }

        println!("\n{}", render(state));
        let mover = state.turn();
        let agent = &mut players[seat_index(mover)];
        println!("{:?} to move ({})", mover, agent.name());

        let start = Instant::now();
        let action = agent.select(state);
        tracing::debug!("{} answered {:?} in {:.2?}", agent.name(), action, start.elapsed());

        apply_action(state, action, &**agent)?;
    }
}

/// Print the final board, the winner and the winning chain
fn announce_result(state: &mut BoardState, winner: Player) {
    println!("\n{}", render(state));
    println!("{:?} wins!", winner);

    let path = state.winning_path();
    if path.is_empty() {
        println!("(by resignation)");
    } else {
        let cells: Vec<String> = path
            .iter()
            .map(|c| format!("({},{})", c.row + 1, c.col + 1))
            .collect();
        println!("Winning path: {}", cells.join(" "));
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn seat_index(player: Player) -> usize {
    match player {
        Player::Blue => 0,
        Player::Red => 1,
    }
}

/// Apply one action; humans get another try after an illegal move
fn apply_action(state: &mut BoardState, action: Action, agent: &dyn Agent) -> Result<()> {
    match action {
        Action::Play(mv) => {
            if !state.play(mv) {
                if agent.is_human() {
                    println!("Illegal move, try again");
                } else {
                    anyhow::bail!("{} proposed illegal move {:?}", agent.name(), mv);
                }
            }
        }
        Action::Resign => {
            tracing::info!("{} resigned", agent.name());
            state.resign();
        }
        Action::Undo => undo_turn(state),
    }
    Ok(())
}

/// Take back the opponent's reply and the mover's previous move
fn undo_turn(state: &mut BoardState) {
    if state.undo_moves(2) == 0 {
        println!("Nothing to undo");
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PlayArgs {
        PlayArgs {
            config: None,
            size: None,
            swap: false,
            blue: None,
            red: None,
            depth: None,
            heuristic: None,
            ordering: None,
            simulations: None,
            time_ms: None,
        }
    }

    #[test]
    fn test_resolve_config_overrides() {
        let args = PlayArgs {
            size: Some(7),
            swap: true,
            blue: Some(AgentKind::Random),
            depth: Some(3),
            ordering: Some(MoveOrdering::Charge),
            simulations: Some(250),
            time_ms: Some(400),
            ..args()
        };
        let config = resolve_config(&args, Some(9)).unwrap();
        assert_eq!(config.size, 7);
        assert!(config.swap_rule);
        assert_eq!(config.blue, AgentKind::Random);
        assert_eq!(config.red, AgentKind::AlphaBeta);
        assert_eq!(config.ai.depth, 3);
        assert_eq!(config.ai.ordering, MoveOrdering::Charge);
        assert_eq!(config.ai.max_time_ms, Some(400));
        assert_eq!(config.mcts.simulations, 250);
        assert_eq!(config.mcts.max_time_ms, Some(400));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_resolve_config_rejects_bad_size() {
        let args = PlayArgs {
            size: Some(40),
            ..args()
        };
        assert!(resolve_config(&args, None).is_err());
    }

    #[test]
    fn test_undo_turn_takes_back_two_moves() {
        let mut state = BoardState::new(5, false).unwrap();
        state.play_at(0, 0);
        state.play_at(1, 1);
        state.play_at(2, 2);
        undo_turn(&mut state);
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.turn(), Player::Red);
        undo_turn(&mut state);
        assert!(state.history().is_empty());
        undo_turn(&mut state);
        assert_eq!(state.turn(), Player::Blue);
    }

    #[test]
    fn test_resolve_config_rejects_zero_simulations() {
        let args = PlayArgs {
            simulations: Some(0),
            ..args()
        };
        assert!(resolve_config(&args, None).is_err());
    }

    #[test]
    fn test_mcts_and_charge_game_loop() {
        let mut config = GameConfig {
            size: 4,
            blue: AgentKind::Charge,
            red: AgentKind::Mcts,
            seed: Some(5),
            ..Default::default()
        };
        config.mcts.simulations = 100;
        let mut state = config.new_board().unwrap();
        let mut players = seat_players(&config);
        let winner = play_loop(&mut state, &mut players).unwrap();
        assert_eq!(state.winner(), Some(winner));
    }

    #[test]
    fn test_computer_game_loop() {
        let config = GameConfig {
            size: 4,
            blue: AgentKind::Random,
            red: AgentKind::AlphaBeta,
            seed: Some(11),
            ..Default::default()
        };
        let mut state = config.new_board().unwrap();
        let mut players = seat_players(&config);
        let winner = play_loop(&mut state, &mut players).unwrap();
        assert_eq!(state.winner(), Some(winner));
    }
}
