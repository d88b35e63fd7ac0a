//! Market parameters shared by the book, the agents and the strategies.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::values::{Price, Timestamp};

/// Game constants of the repeated double auction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketParams {
    /// Lowest admissible price and value
    pub v_min: Price,
    /// Highest admissible price and value
    pub v_max: Price,
    /// Units each agent may trade per repetition
    pub max_trades: usize,
    pub repetitions: usize,
    pub auction_len_ms: i64,
    /// Tail of each repetition in which no new rounds start
    pub buffer_len_ms: i64,
    pub bid_interval_ms: i64,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            v_min: 61,
            v_max: 260,
            max_trades: 10,
            repetitions: 5,
            auction_len_ms: 127_500,
            buffer_len_ms: 5_000,
            bid_interval_ms: 750,
        }
    }
}

impl MarketParams {
    pub fn validate(&self) -> Result<()> {
        if self.v_min >= self.v_max {
            return Err(ConfigError::PriceRange {
                v_min: self.v_min,
                v_max: self.v_max,
            });
        }
        if self.max_trades == 0 {
            return Err(ConfigError::Zero("max_trades"));
        }
        if self.repetitions == 0 {
            return Err(ConfigError::Zero("repetitions"));
        }
        if self.bid_interval_ms <= 0 {
            return Err(ConfigError::Zero("bid_interval_ms"));
        }
        if self.buffer_len_ms < 0 || self.buffer_len_ms >= self.auction_len_ms {
            return Err(ConfigError::NoTradingWindow {
                buffer_ms: self.buffer_len_ms,
                auction_ms: self.auction_len_ms,
            });
        }
        Ok(())
    }

    /// Check that a private value lies inside the price range
    pub fn check_value(&self, value: Price) -> Result<()> {
        if value < self.v_min || value > self.v_max {
            return Err(ConfigError::ValueOutOfRange {
                value,
                v_min: self.v_min,
                v_max: self.v_max,
            });
        }
        Ok(())
    }

    /// Time available for bidding in one repetition
    pub fn trading_window_ms(&self) -> i64 {
        self.auction_len_ms - self.buffer_len_ms
    }

    /// Number of bidding rounds per repetition
    pub fn bidding_rounds(&self) -> usize {
        if self.bid_interval_ms <= 0 {
            return 0;
        }
        let rounds = self.trading_window_ms() / self.bid_interval_ms - 1;
        usize::try_from(rounds).unwrap_or(0)
    }

    pub fn repetition_start(&self, game_start: Timestamp, repetition: usize) -> Timestamp {
        game_start + repetition as i64 * self.auction_len_ms
    }

    pub fn repetition_end(&self, game_start: Timestamp, repetition: usize) -> Timestamp {
        self.repetition_start(game_start, repetition) + self.auction_len_ms
    }

    /// Number of admissible prices
    pub fn price_levels(&self) -> usize {
        usize::try_from(self.v_max - self.v_min + 1).unwrap_or(0)
    }

    pub fn clamp_price(&self, price: Price) -> Price {
        price.clamp(self.v_min, self.v_max)
    }
}
