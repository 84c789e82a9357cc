//! Match command - play computer players against each other
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: validate_args(), play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use hex_core::{
    play_game, AgentKind, AiConfig, BoardState, Heuristic, MctsConfig, MoveOrdering, Player,
};

use crate::agents::{build_computer, create_rng};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Board size
    #[arg(long, default_value = "7")]
    pub size: usize,

    /// Enable the swap rule
    #[arg(long)]
    pub swap: bool,

    /// Number of games to play (will alternate colors)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// First player: random, alpha-beta, mcts or charge
    #[arg(long, default_value = "alpha-beta")]
    pub a: AgentKind,

    /// Second player: random, alpha-beta, mcts or charge
    #[arg(long, default_value = "random")]
    pub b: AgentKind,

    /// AI search depth (for alpha-beta)
    #[arg(long, default_value = "2")]
    pub depth: u32,

    /// Leaf evaluator for player A
    #[arg(long)]
    pub heuristic_a: Option<Heuristic>,

    /// Leaf evaluator for player B
    #[arg(long)]
    pub heuristic_b: Option<Heuristic>,

    /// Alpha-beta move ordering for player A
    #[arg(long)]
    pub ordering_a: Option<MoveOrdering>,

    /// Alpha-beta move ordering for player B
    #[arg(long)]
    pub ordering_b: Option<MoveOrdering>,

    /// MCTS simulations per move
    #[arg(long, default_value = "1000")]
    pub simulations: usize,

    /// Per-move thinking time for alpha-beta and MCTS, in milliseconds
    #[arg(long, value_name = "MS")]
    pub time_ms: Option<u64>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Which contestant won a game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    A,
    B,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    /// Contestant playing Blue (moves first)
    blue: Side,
    winner: Side,
    winning_color: Player,
    moves: usize,
    resigned: bool,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    a_wins: usize,
    b_wins: usize,
    blue_wins: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Check both contestants are computer players
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    validate_args(&args)?;

    tracing::info!(
        "Starting match: {} vs {} ({} games, {}x{}, depth={})",
        args.a,
        args.b,
        args.games,
        args.size,
        args.size,
        args.depth
    );

    let results = play_match(&args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn validate_args(args: &MatchArgs) -> Result<()> {
    if args.a == AgentKind::Human || args.b == AgentKind::Human {
        anyhow::bail!("match needs two computer players; use `hex play` for human games");
    }
    if args.depth == 0 {
        anyhow::bail!("--depth must be at least 1");
    }
    if args.simulations == 0 {
        anyhow::bail!("--simulations must be at least 1");
    }
    // Board size is checked by BoardState::new
    BoardState::new(args.size, args.swap)?;
    Ok(())
}

/// Play all games in the match
fn play_match(args: &MatchArgs, seed: Option<u64>) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        // Alternate colors for fairness
        let blue = if game_num % 2 == 0 { Side::A } else { Side::B };

        let record = play_single_game(blue, game_num + 1, args, &mut rng)?;

        tracing::info!(
            "Game {}: {:?} wins as {:?} ({} moves{})",
            record.game_number,
            record.winner,
            record.winning_color,
            record.moves,
            if record.resigned { ", resigned" } else { "" }
        );

        games.push(record);
    }

    Ok(compute_match_statistics(games))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results, args);
    } else {
        print_text_results(results, args);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game with `blue` moving first
fn play_single_game(
    blue: Side,
    game_number: usize,
    args: &MatchArgs,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut state = BoardState::new(args.size, args.swap)?;
    let mut game_rng = create_rng(Some(rng.gen()));

    let ai_a = ai_config(args, args.heuristic_a, args.ordering_a);
    let ai_b = ai_config(args, args.heuristic_b, args.ordering_b);
    let mcts = MctsConfig {
        simulations: args.simulations,
        max_time_ms: args.time_ms,
        ..Default::default()
    };
    let (mut agent_a, mut agent_b) = match (
        build_computer(args.a, &ai_a, &mcts, &mut game_rng),
        build_computer(args.b, &ai_b, &mcts, &mut game_rng),
    ) {
        (Some(a), Some(b)) => (a, b),
        _ => anyhow::bail!("match needs two computer players"),
    };

    let winning_color = match blue {
        Side::A => play_game(&mut state, agent_a.as_mut(), agent_b.as_mut()),
        Side::B => play_game(&mut state, agent_b.as_mut(), agent_a.as_mut()),
    };

    let winner = if winning_color == Player::Blue {
        blue
    } else {
        other(blue)
    };

    Ok(GameRecord {
        game_number,
        blue,
        winner,
        winning_color,
        moves: state.history().len(),
        resigned: state.winning_path().is_empty(),
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let a_wins = games.iter().filter(|g| g.winner == Side::A).count();
    let b_wins = games.len() - a_wins;
    let blue_wins = games
        .iter()
        .filter(|g| g.winning_color == Player::Blue)
        .count();

    let total_moves: usize = games.iter().map(|g| g.moves).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        games,
        a_wins,
        b_wins,
        blue_wins,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn ai_config(
    args: &MatchArgs,
    heuristic: Option<Heuristic>,
    ordering: Option<MoveOrdering>,
) -> AiConfig {
    AiConfig {
        depth: args.depth,
        heuristic: heuristic.unwrap_or_default(),
        ordering: ordering.unwrap_or_default(),
        max_time_ms: args.time_ms,
        ..Default::default()
    }
}

fn other(side: Side) -> Side {
    match side {
        Side::A => Side::B,
        Side::B => Side::A,
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults, args: &MatchArgs) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        blue: String,
        winner: String,
        winning_color: String,
        moves: usize,
        resigned: bool,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        player_a: String,
        player_b: String,
        size: usize,
        swap_rule: bool,
        total_games: usize,
        a_wins: usize,
        b_wins: usize,
        blue_wins: usize,
        avg_moves: f32,
        a_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        player_a: args.a.to_string(),
        player_b: args.b.to_string(),
        size: args.size,
        swap_rule: args.swap,
        total_games: total,
        a_wins: results.a_wins,
        b_wins: results.b_wins,
        blue_wins: results.blue_wins,
        avg_moves: results.avg_moves,
        a_win_rate: percent(results.a_wins, total) / 100.0,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                blue: format!("{:?}", g.blue),
                winner: format!("{:?}", g.winner),
                winning_color: format!("{:?}", g.winning_color),
                moves: g.moves,
                resigned: g.resigned,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults, args: &MatchArgs) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("A ({}) vs B ({}) on {}x{}", args.a, args.b, args.size, args.size);
    println!("Total games: {}", total);
    println!(
        "A wins:      {} ({:.1}%)",
        results.a_wins,
        percent(results.a_wins, total)
    );
    println!(
        "B wins:      {} ({:.1}%)",
        results.b_wins,
        percent(results.b_wins, total)
    );
    println!(
        "Blue wins:   {} ({:.1}%)",
        results.blue_wins,
        percent(results.blue_wins, total)
    );
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {:?} (as {:?}) won in {} moves{}",
            game.game_number,
            game.winner,
            game.winning_color,
            game.moves,
            if game.resigned { " by resignation" } else { "" }
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MatchArgs {
        MatchArgs {
            size: 4,
            swap: false,
            games: 2,
            a: AgentKind::AlphaBeta,
            b: AgentKind::Random,
            depth: 1,
            heuristic_a: None,
            heuristic_b: None,
            ordering_a: None,
            ordering_b: None,
            simulations: 100,
            time_ms: None,
            json: false,
        }
    }

    fn record(game_number: usize, blue: Side, winning_color: Player, moves: usize) -> GameRecord {
        let winner = if winning_color == Player::Blue {
            blue
        } else {
            other(blue)
        };
        GameRecord {
            game_number,
            blue,
            winner,
            winning_color,
            moves,
            resigned: false,
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.a_wins, 0);
        assert_eq!(results.b_wins, 0);
        assert_eq!(results.blue_wins, 0);
        assert_eq!(results.avg_moves, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let games = vec![
            record(1, Side::A, Player::Blue, 10),
            record(2, Side::B, Player::Blue, 20),
            record(3, Side::A, Player::Red, 30),
        ];

        let results = compute_match_statistics(games);
        assert_eq!(results.a_wins, 1);
        assert_eq!(results.b_wins, 2);
        assert_eq!(results.blue_wins, 2);
        assert_eq!(results.avg_moves, 20.0);
    }

    #[test]
    fn test_validate_rejects_human_and_bad_size() {
        let human = MatchArgs {
            b: AgentKind::Human,
            ..args()
        };
        assert!(validate_args(&human).is_err());

        let huge = MatchArgs {
            size: 27,
            ..args()
        };
        assert!(validate_args(&huge).is_err());

        let idle = MatchArgs {
            simulations: 0,
            ..args()
        };
        assert!(validate_args(&idle).is_err());

        assert!(validate_args(&args()).is_ok());
    }

    #[test]
    fn test_play_match_alternates_colors() {
        let results = play_match(&args(), Some(7)).unwrap();
        assert_eq!(results.games.len(), 2);
        assert_eq!(results.games[0].blue, Side::A);
        assert_eq!(results.games[1].blue, Side::B);
        assert_eq!(results.a_wins + results.b_wins, 2);
        for game in &results.games {
            assert!(game.moves >= 4 || game.resigned);
        }
    }

    #[test]
    fn test_mcts_against_charge() {
        let args = MatchArgs {
            a: AgentKind::Mcts,
            b: AgentKind::Charge,
            ..args()
        };
        let results = play_match(&args, Some(3)).unwrap();
        assert_eq!(results.games.len(), 2);
        assert_eq!(results.a_wins + results.b_wins, 2);
    }

    #[test]
    fn test_ai_config_takes_side_settings() {
        let args = MatchArgs {
            time_ms: Some(250),
            ..args()
        };
        let ai = ai_config(&args, Some(Heuristic::ShortestPath), Some(MoveOrdering::Charge));
        assert_eq!(ai.depth, 1);
        assert_eq!(ai.heuristic, Heuristic::ShortestPath);
        assert_eq!(ai.ordering, MoveOrdering::Charge);
        assert_eq!(ai.max_time_ms, Some(250));
    }

    #[test]
    fn test_play_match_is_reproducible() {
        let first = play_match(&args(), Some(99)).unwrap();
        let second = play_match(&args(), Some(99)).unwrap();
        let summary = |r: &MatchResults| -> Vec<(Side, usize)> {
            r.games.iter().map(|g| (g.winner, g.moves)).collect()
        };
        assert_eq!(summary(&first), summary(&second));
    }
}
