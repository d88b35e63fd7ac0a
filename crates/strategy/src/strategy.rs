//! Strategy trait and the market view handed to it each round.

use agora_core::{MarketParams, Price, PrivateValues, Quote, Side, Timestamp, Transaction};
use agora_matching::BidHistory;

use crate::registry::StrategyKind;

/// Read-only market view for one agent's bidding round
///
/// Built by the agent runtime while it holds the repetition lock, so
/// `history` and `quote` are consistent with each other.
pub struct StrategyContext<'a> {
    pub repetition: usize,
    pub side: Side,
    pub params: &'a MarketParams,
    pub values: &'a PrivateValues,
    /// Units traded so far in this repetition
    pub holdings: usize,
    pub quote: Quote,
    /// The agent's standing price for the current unit
    pub current_bid: Option<Price>,
    /// The agent's last price per unit in the previous repetition
    pub previous_unit_bids: &'a [Price],
    /// Orders and transactions of the current repetition
    pub history: &'a BidHistory,
    /// Final transaction log of the previous repetition
    pub previous_transactions: &'a [Transaction],
    pub now: Timestamp,
    pub repetition_start: Timestamp,
}

impl StrategyContext<'_> {
    /// Value of the unit in play, `None` once holdings are maxed
    pub fn current_value(&self) -> Option<Price> {
        if self.holdings >= self.params.max_trades {
            return None;
        }
        self.values.get(self.holdings)
    }

    pub fn is_buyer(&self) -> bool {
        self.side.is_buy()
    }

    /// Milliseconds until the end of the trading window (may be negative)
    pub fn time_remaining(&self) -> i64 {
        self.repetition_start + self.params.trading_window_ms() - self.now
    }

    /// Whole bidding rounds left before the trading window closes
    pub fn remaining_bids(&self) -> usize {
        let rounds = self.time_remaining() / self.params.bid_interval_ms - 1;
        usize::try_from(rounds).unwrap_or(0)
    }

    pub fn trades_left(&self) -> usize {
        self.params.max_trades.saturating_sub(self.holdings)
    }

    /// Lowest and highest transaction price of the previous repetition
    pub fn previous_price_range(&self) -> Option<(Price, Price)> {
        let min = self.previous_transactions.iter().map(|tx| tx.price).min()?;
        let max = self.previous_transactions.iter().map(|tx| tx.price).max()?;
        Some((min, max))
    }

    /// Best bid, or `v_min` when no bid stands
    pub fn bid_or_floor(&self) -> Price {
        self.quote.bid_or(self.params.v_min)
    }

    /// Best ask, or `v_max` when no ask stands
    pub fn ask_or_ceiling(&self) -> Price {
        self.quote.ask_or(self.params.v_max)
    }

    /// The price an agent falls back to when it has nothing better
    pub fn passive_price(&self) -> Price {
        self.side.passive_extreme(self.params.v_min, self.params.v_max)
    }
}

/// A bidding strategy
///
/// `adjust_state` runs once per round before `submit_bids`; both only read
/// the market. Returning `None` from `submit_bids` abstains for the round.
pub trait Strategy: Send {
    fn kind(&self) -> StrategyKind;

    /// Update internal beliefs from market activity (optional)
    fn adjust_state(&mut self, _ctx: &StrategyContext<'_>) {}

    /// Price to submit this round
    fn submit_bids(&mut self, ctx: &StrategyContext<'_>) -> Option<Price>;
}
