use agora_core::ConfigError;
use agora_matching::MarketError;
use agora_strategy::StrategyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid market parameters: {0}")]
    Params(#[from] ConfigError),

    #[error("Malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error("Agent task {agent} failed: {reason}")]
    Join { agent: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
