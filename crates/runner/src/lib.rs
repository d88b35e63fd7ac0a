//! Agora Runner - Repeated Double Auction Simulation
//!
//! Orchestrates a full run with many bidding agents:
//!
//! - **Bootstrap**: Population, private values and seeds
//! - **Agent Runtime**: The per-agent bidding loop
//! - **Simulation**: Repetition timing, closing and result collection
//! - **Scoring**: Payoff per agent and per strategy
//!
//! ## Architecture
//!
//! ```text
//!                        ┌──────────────────────┐
//!                        │  SimulationConfig    │
//!                        │  (JSON / profile)    │
//!                        └──────────┬───────────┘
//!                                   │ bootstrap
//!                                   ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        BIDDING AGENTS                           │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐        ┌──────────────┐    │
//! │  │ AgentRuntime │   │ AgentRuntime │  ...   │ AgentRuntime │    │
//! │  │   (zip1)     │   │   (gdx2)     │        │   (aa3)      │    │
//! │  └──────┬───────┘   └──────┬───────┘        └──────┬───────┘    │
//! │         │ round: lock → decide → submit → unlock   │            │
//! └─────────┼──────────────────┼───────────────────────┼────────────┘
//!           └──────────────────┼───────────────────────┘
//!                              ▼
//!               ┌───────────────────────────┐
//!               │  Exchange                 │◄── closer (repetition end)
//!               │  Repetition 0..R          │
//!               └─────────────┬─────────────┘
//!                             ▼
//!                   SimulationResults (scoring)
//! ```

pub mod agent;
pub mod bootstrap;
pub mod error;
pub mod scoring;
pub mod simulation;

// Re-export main types
pub use agent::{AgentConfig, AgentReport, AgentRuntime, Phase, Submission};
pub use bootstrap::{AgentSpec, SimulationBootstrap, SimulationConfig};
pub use error::{Result, SimulationError};
pub use scoring::StrategyPayoff;
pub use simulation::{RepetitionLog, SimulationResults, TradingSimulation};

// Re-export the strategy selector for config building
pub use agora_strategy::StrategyKind;
