//! Kaplan's sniper: wait in the background, then steal the deal.
//!
//! The agent only ever mirrors the opposing quote, and only when the
//! quote is cheap compared with last repetition's prices, the spread is
//! tight and still profitable, or time is running out.

use agora_core::{Price, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::registry::StrategyKind;
use crate::strategy::{Strategy, StrategyContext};

const SPREAD_THRESHOLD: f64 = 0.0625;
const PROFIT_THRESHOLD: f64 = 0.1;
const TIME_THRESHOLD: f64 = 0.1;

pub struct Kaplan {
    spread_threshold: f64,
    profit_threshold: f64,
    time_threshold: f64,
}

impl Kaplan {
    /// Each threshold is jittered by up to ±25%
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut jitter = |base: f64| base * (1.0 + 0.5 * (rng.r#gen::<f64>() - 0.5));
        Self {
            spread_threshold: jitter(SPREAD_THRESHOLD),
            profit_threshold: jitter(PROFIT_THRESHOLD),
            time_threshold: jitter(TIME_THRESHOLD),
        }
    }

    pub fn thresholds(&self) -> (f64, f64, f64) {
        (
            self.spread_threshold,
            self.profit_threshold,
            self.time_threshold,
        )
    }

    fn time_is_short(&self, ctx: &StrategyContext<'_>) -> bool {
        let fraction = ctx.time_remaining() as f64 / ctx.params.trading_window_ms() as f64;
        fraction < self.time_threshold
    }

    fn buyer_bid(&self, ctx: &StrategyContext<'_>, value: Price) -> Option<Price> {
        let to_bid = ctx.quote.ask_or(ctx.params.v_min);
        if to_bid > value {
            return None;
        }
        let range = ctx.previous_price_range();

        let below_last_min = matches!(range, Some((min, _)) if to_bid < min);

        let juicy = match (ctx.quote.bid, ctx.quote.ask, range) {
            (Some(bid), Some(ask), Some((_, max))) if ask > 0 => {
                let spread = f64::from(ask - bid) / f64::from(ask);
                let expected = f64::from(value - to_bid);
                let maximum = f64::from(value - ctx.params.v_min);
                to_bid < max
                    && spread < self.spread_threshold
                    && maximum > 0.0
                    && expected / maximum > self.profit_threshold
            }
            _ => false,
        };

        (below_last_min || juicy || self.time_is_short(ctx)).then_some(to_bid)
    }

    fn seller_ask(&self, ctx: &StrategyContext<'_>, value: Price) -> Option<Price> {
        let to_ask = ctx.quote.bid_or(ctx.params.v_max);
        if to_ask < value {
            return None;
        }
        let range = ctx.previous_price_range();

        let above_last_max = matches!(range, Some((_, max)) if to_ask > max);

        let juicy = match (ctx.quote.bid, ctx.quote.ask, range) {
            (Some(bid), Some(ask), Some((min, _))) if bid > 0 => {
                let spread = f64::from(ask - bid) / f64::from(bid);
                let expected = f64::from(to_ask - value);
                let maximum = f64::from(ctx.params.v_max - value);
                to_ask > min
                    && spread < self.spread_threshold
                    && maximum > 0.0
                    && expected / maximum > self.profit_threshold
            }
            _ => false,
        };

        (above_last_max || juicy || self.time_is_short(ctx)).then_some(to_ask)
    }
}

impl Strategy for Kaplan {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Kaplan
    }

    fn submit_bids(&mut self, ctx: &StrategyContext<'_>) -> Option<Price> {
        let value = ctx.current_value()?;
        match ctx.side {
            Side::Buy => self.buyer_bid(ctx, value),
            Side::Sell => self.seller_ask(ctx, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::Fixture;
    use agora_core::Transaction;

    fn last_repetition(fixture: &mut Fixture, prices: &[Price]) {
        fixture.repetition = 1;
        fixture.repetition_start = 127_500;
        fixture.now = 130_000;
        fixture.previous_transactions = prices
            .iter()
            .enumerate()
            .map(|(i, price)| Transaction {
                price: *price,
                timestamp: i as i64,
                buyer: "b".into(),
                seller: "s".into(),
                bid_seq: 2 * i as u64,
                ask_seq: 2 * i as u64 + 1,
            })
            .collect();
    }

    #[test]
    fn test_thresholds_jitter_within_quarter() {
        for seed in 0..50 {
            let (fs, fp, ft) = Kaplan::new(seed).thresholds();
            assert!(fs >= SPREAD_THRESHOLD * 0.75 && fs <= SPREAD_THRESHOLD * 1.25);
            assert!(fp >= PROFIT_THRESHOLD * 0.75 && fp <= PROFIT_THRESHOLD * 1.25);
            assert!(ft >= TIME_THRESHOLD * 0.75 && ft <= TIME_THRESHOLD * 1.25);
        }
    }

    #[test]
    fn test_buyer_waits_early_in_first_repetition() {
        let buyer = Fixture::buyer(200);
        let mut kaplan = Kaplan::new(1);
        assert_eq!(
            kaplan.submit_bids(&buyer.context_with_quote(Some(120), Some(150))),
            None
        );
    }

    #[test]
    fn test_buyer_snipes_cheap_ask() {
        let mut buyer = Fixture::buyer(200);
        last_repetition(&mut buyer, &[140, 150, 160]);
        let mut kaplan = Kaplan::new(1);

        assert_eq!(
            kaplan.submit_bids(&buyer.context_with_quote(Some(100), Some(135))),
            Some(135)
        );
        // Ask above last repetition's minimum and wide spread: wait
        assert_eq!(
            kaplan.submit_bids(&buyer.context_with_quote(Some(100), Some(145))),
            None
        );
    }

    #[test]
    fn test_buyer_takes_tight_profitable_spread() {
        let mut buyer = Fixture::buyer(200);
        last_repetition(&mut buyer, &[140, 150, 160]);
        let mut kaplan = Kaplan::new(1);

        // Spread 1/145 is tight and 145 is under last max 160
        assert_eq!(
            kaplan.submit_bids(&buyer.context_with_quote(Some(144), Some(145))),
            Some(145)
        );
    }

    #[test]
    fn test_never_bids_above_value() {
        let mut buyer = Fixture::buyer(130);
        last_repetition(&mut buyer, &[140, 150, 160]);
        buyer.now = 127_500 + 122_000;
        let mut kaplan = Kaplan::new(1);
        assert_eq!(
            kaplan.submit_bids(&buyer.context_with_quote(Some(120), Some(135))),
            None
        );
    }

    #[test]
    fn test_seller_acts_when_time_runs_out() {
        let mut seller = Fixture::seller(100);
        seller.now = 121_000;
        let mut kaplan = Kaplan::new(1);
        assert_eq!(
            kaplan.submit_bids(&seller.context_with_quote(Some(120), Some(180))),
            Some(120)
        );
    }
}
