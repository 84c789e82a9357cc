//! GameConfig - settings for a game session

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ai::AiConfig;
use crate::mcts::MctsConfig;
use crate::board::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};
use crate::error::HexError;
use crate::game::BoardState;

/// Who controls one side
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    #[default]
    Human,
    Random,
    AlphaBeta,
    Mcts,
    Charge,
}

impl FromStr for AgentKind {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(AgentKind::Human),
            "random" => Ok(AgentKind::Random),
            "alpha-beta" | "alphabeta" | "ab" => Ok(AgentKind::AlphaBeta),
            "mcts" | "monte-carlo" => Ok(AgentKind::Mcts),
            "charge" => Ok(AgentKind::Charge),
            other => Err(HexError::Config(format!("unknown player kind: {}", other))),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Human => "human",
            AgentKind::Random => "random",
            AgentKind::AlphaBeta => "alpha-beta",
            AgentKind::Mcts => "mcts",
            AgentKind::Charge => "charge",
        };
        f.write_str(name)
    }
}

/// Board and player setup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub size: usize,
    pub swap_rule: bool,
    pub blue: AgentKind,
    pub red: AgentKind,
    pub ai: AiConfig,
    pub mcts: MctsConfig,
    /// Seed for computer players (None = entropy)
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            swap_rule: false,
            blue: AgentKind::Human,
            red: AgentKind::AlphaBeta,
            ai: AiConfig::default(),
            mcts: MctsConfig::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), HexError> {
        if self.size == 0 || self.size > MAX_BOARD_SIZE {
            return Err(HexError::Config(format!(
                "size must be in 1..={}, got {}",
                MAX_BOARD_SIZE, self.size
            )));
        }
        if self.ai.depth == 0 {
            return Err(HexError::Config("ai.depth must be >= 1".into()));
        }
        if self.mcts.simulations == 0 {
            return Err(HexError::Config("mcts.simulations must be >= 1".into()));
        }
        if self.mcts.exploration.is_nan() || self.mcts.exploration < 0.0 {
            return Err(HexError::Config("mcts.exploration must be >= 0".into()));
        }
        Ok(())
    }

    /// Fresh board for these settings
    pub fn new_board(&self) -> Result<BoardState, HexError> {
        BoardState::new(self.size, self.swap_rule)
    }
}
