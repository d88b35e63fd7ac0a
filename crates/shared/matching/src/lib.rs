//! Agora Matching
//!
//! The continuous double auction the agents trade in.
//!
//! ```text
//! Exchange ── DashMap<index, Arc<Mutex<Repetition>>>
//!                                 │
//!                 ┌───────────────┴───────────────┐
//!                 ▼                               ▼
//!            MarketBook                       BidHistory
//!   (best-bid / best-ask stacks,     (every order, every transaction,
//!    one match per submission)        per-consumer cursors)
//! ```

mod book;
mod error;
mod exchange;
mod history;
mod repetition;

pub use book::{BookOutcome, MarketBook};
pub use error::{MarketError, Result};
pub use exchange::{Exchange, SharedRepetition};
pub use history::{BidHistory, HistoryCursor, Since};
pub use repetition::{Repetition, SubmitOutcome};
