use agora_core::Timestamp;
use chrono::Utc;
use tokio::time::Instant;

use crate::Clock;

/// Clock driven by tokio's time source
///
/// Reads `epoch + elapsed`, where elapsed is measured with
/// `tokio::time::Instant`. Under a paused runtime (`start_paused = true`)
/// time only moves when every task is asleep, so a whole auction runs in
/// virtual time.
pub struct SimulationClock {
    epoch: Timestamp,
    origin: Instant,
}

impl SimulationClock {
    /// Anchor the clock at `epoch` from the current tokio instant
    pub fn starting_at(epoch: Timestamp) -> Self {
        Self {
            epoch,
            origin: Instant::now(),
        }
    }

    /// Anchor the clock at the current wall time
    pub fn starting_now() -> Self {
        Self::starting_at(Utc::now().timestamp_millis())
    }

    pub fn epoch(&self) -> Timestamp {
        self.epoch
    }
}

impl Clock for SimulationClock {
    fn now(&self) -> Timestamp {
        self.epoch + self.origin.elapsed().as_millis() as Timestamp
    }

    fn name(&self) -> &str {
        "SimulationClock"
    }
}
