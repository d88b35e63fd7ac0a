//! Agora Strategy Framework
//!
//! Bidding strategies for the repeated continuous double auction:
//! - Zero intelligence (ZI, ZIBTQ)
//! - Adaptive margins (ZIP)
//! - Sniping (KAPLAN)
//! - Risk-adaptive targets (RB, AA)
//! - Belief-based surplus maximisation (GD, GDX)
//!
//! ## Architecture
//!
//! ```text
//!   AgentRuntime (per agent, holds the repetition lock)
//!          │ StrategyContext { quote, history, values, ... }
//!          ▼
//!   ┌──────────────┐  adjust_state   ┌────────────────────┐
//!   │   Strategy   │ ───────────────►│ BeliefRegistry     │ (GD, GDX)
//!   │ (Box<dyn _>) │                 │  (rep, kind) → est │
//!   └──────┬───────┘                 └────────────────────┘
//!          │ submit_bids → Option<Price>
//!          ▼
//!   Repetition::submit
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agora_strategy::{BeliefRegistry, StrategyKind};
//!
//! let beliefs = Arc::new(BeliefRegistry::new(&params));
//! let mut strategy = StrategyKind::Zip.build(&params, seed, &beliefs);
//! strategy.adjust_state(&ctx);
//! let price = strategy.submit_bids(&ctx);
//! ```

pub mod belief;
pub mod error;
pub mod gd;
pub mod gdx;
pub mod kaplan;
pub mod registry;
pub mod risk;
pub mod strategy;
pub mod zi;
pub mod zip;

// Re-export main types
pub use belief::{BeliefEstimator, BeliefKind, BeliefRegistry, SharedBelief};
pub use error::{Result, StrategyError};
pub use gd::Gd;
pub use gdx::{ExpectedValuePlan, Gdx};
pub use kaplan::Kaplan;
pub use registry::StrategyKind;
pub use risk::{Aa, Rb, RiskAdapter};
pub use strategy::{Strategy, StrategyContext};
pub use zi::{Zi, Zibtq};
pub use zip::Zip;
