//! Agora Clock Infrastructure
//!
//! Time sources for the simulator. Every timestamp in Agora is milliseconds
//! since the Unix epoch.
//!
//! ```text
//! SystemClock      wall time (chrono), for real-time runs
//! SimulationClock  anchored epoch + tokio Instant; follows paused/auto-advanced
//!                  tokio time, so full repetitions run instantly in tests
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use agora_clock::{Clock, SimulationClock};
//!
//! let clock = SimulationClock::starting_at(0);
//! tokio::time::sleep(std::time::Duration::from_millis(750)).await;
//! assert_eq!(clock.now(), 750);
//! ```

mod simulation;

use std::time::Duration;

use agora_core::Timestamp;
use chrono::Utc;

pub use simulation::SimulationClock;

/// Port for time abstraction
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the epoch
    fn now(&self) -> Timestamp;

    /// Clock name for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}

/// Wall-clock milliseconds, for runs paced in real time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp_millis()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

/// Sleep until `clock` reads `deadline`. Returns at once if it already has.
pub async fn sleep_until(clock: &dyn Clock, deadline: Timestamp) {
    let remaining = deadline - clock.now();
    if remaining > 0 {
        tokio::time::sleep(Duration::from_millis(remaining as u64)).await;
    }
}
