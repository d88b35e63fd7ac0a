//! Zero-Intelligence Plus (Cliff, 1997).
//!
//! Each unit carries a profit margin `μ`; the shout price is
//! `value · (1 + μ)` with `μ ≤ 0` for buyers and `μ ≥ 0` for sellers.
//! Every shout seen in the market may move `μ` toward a target price near
//! the shout, using a Widrow-Hoff step with momentum:
//!
//! ```text
//! target = (1 ± R)·q ± A          R ~ U[0, 0.05], A ~ U[0, 5]
//! Δ      = β · (target − p)
//! Γ      = γ·Γ + (1 − γ)·Δ
//! μ      = (p + Γ) / value − 1
//! ```

use agora_core::{Order, Price, Side};
use agora_matching::HistoryCursor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::registry::StrategyKind;
use crate::strategy::{Strategy, StrategyContext};

/// Direction a shout pushes the profit margin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarginMove {
    /// Ask for more surplus
    Raise,
    /// Give up surplus to become more competitive
    Lower,
}

fn margin_move(side: Side, shout: &Order, accepted: bool, price: f64) -> Option<MarginMove> {
    let q = f64::from(shout.price);
    let mut decision = None;
    match side {
        Side::Sell => {
            if accepted && price <= q {
                decision = Some(MarginMove::Raise);
            }
            if accepted && shout.is_bid() && price >= q {
                decision = Some(MarginMove::Lower);
            }
            if !accepted && !shout.is_bid() && price >= q {
                decision = Some(MarginMove::Lower);
            }
        }
        Side::Buy => {
            if accepted && price >= q {
                decision = Some(MarginMove::Raise);
            }
            if accepted && !shout.is_bid() && price <= q {
                decision = Some(MarginMove::Lower);
            }
            if !accepted && shout.is_bid() && price <= q {
                decision = Some(MarginMove::Lower);
            }
        }
    }
    decision
}

pub struct Zip {
    rng: StdRng,
    learning_rate: f64,
    momentum: f64,
    /// Momentum-smoothed step Γ
    smoothed_step: f64,
    /// Margin per unit of the current repetition
    margins: Vec<f64>,
    cursor: HistoryCursor,
    repetition: Option<usize>,
}

impl Zip {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let learning_rate = 0.4 * rng.r#gen::<f64>() + 0.1;
        let momentum = 0.1 * rng.r#gen::<f64>();
        Self {
            rng,
            learning_rate,
            momentum,
            smoothed_step: 0.0,
            margins: Vec::new(),
            cursor: HistoryCursor::default(),
            repetition: None,
        }
    }

    pub fn margin(&self, unit: usize) -> Option<f64> {
        self.margins.get(unit).copied()
    }

    fn enter(&mut self, repetition: usize) {
        if self.repetition != Some(repetition) {
            self.repetition = Some(repetition);
            self.margins.clear();
            self.cursor = HistoryCursor::default();
        }
    }

    /// Price implied by a margin, rounded away from the value and capped at it
    fn margin_price(side: Side, value: Price, margin: f64) -> f64 {
        let raw = f64::from(value) * (1.0 + margin);
        match side {
            Side::Buy => raw.floor().min(f64::from(value)),
            Side::Sell => raw.ceil().max(f64::from(value)),
        }
    }

    fn clamp_margin(side: Side, margin: f64) -> f64 {
        match side {
            Side::Buy => margin.clamp(-1.0, 0.0),
            Side::Sell => margin.max(0.0),
        }
    }

    /// First shout for a unit: uniform between the passive extreme and
    /// what this unit went for last repetition
    fn opening_bid(&mut self, ctx: &StrategyContext<'_>, value: Price) -> Price {
        let at_least = ctx
            .previous_unit_bids
            .get(ctx.holdings)
            .copied()
            .unwrap_or(value);
        let v = f64::from(value);
        let (bid, margin) = match ctx.side {
            Side::Buy => {
                let upper = at_least.clamp(ctx.params.v_min, value);
                let bid = self.rng.gen_range(ctx.params.v_min..=upper);
                (bid, (-(v - f64::from(bid)) / v).min(0.0))
            }
            Side::Sell => {
                let lower = at_least.clamp(value, ctx.params.v_max);
                let bid = self.rng.gen_range(lower..=ctx.params.v_max);
                (bid, ((f64::from(bid) - v) / v).max(0.0))
            }
        };
        self.margins.resize(ctx.holdings, 0.0);
        self.margins.push(margin);
        bid
    }
}

impl Strategy for Zip {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Zip
    }

    fn adjust_state(&mut self, ctx: &StrategyContext<'_>) {
        self.enter(ctx.repetition);
        if ctx.history.is_empty() || ctx.current_bid.is_none() {
            return;
        }
        let Some(value) = ctx.current_value() else {
            return;
        };
        let Some(mut margin) = self.margin(ctx.holdings) else {
            return;
        };

        let relative = 0.05 * self.rng.r#gen::<f64>();
        let absolute = 5.0 * self.rng.r#gen::<f64>();
        let v = f64::from(value);

        let mut cursor = self.cursor;
        for shout in ctx.history.since(&mut cursor) {
            let accepted = ctx.history.is_transacted(shout);
            let price = Self::margin_price(ctx.side, value, margin);
            let Some(direction) = margin_move(ctx.side, shout, accepted, price) else {
                continue;
            };

            let q = f64::from(shout.price);
            let target = match (ctx.side, direction) {
                (Side::Buy, MarginMove::Raise) | (Side::Sell, MarginMove::Lower) => {
                    (1.0 - relative) * q - absolute
                }
                _ => (1.0 + relative) * q + absolute,
            };

            let step = self.learning_rate * (target - price);
            self.smoothed_step = self.momentum * self.smoothed_step + (1.0 - self.momentum) * step;
            margin = Self::clamp_margin(ctx.side, (price + self.smoothed_step) / v - 1.0);
        }
        self.cursor = cursor;

        self.margins.truncate(ctx.holdings + 1);
        if let Some(slot) = self.margins.get_mut(ctx.holdings) {
            *slot = margin;
        }
        log::debug!("ZIP margin for unit {} now {:.4}", ctx.holdings, margin);
    }

    fn submit_bids(&mut self, ctx: &StrategyContext<'_>) -> Option<Price> {
        self.enter(ctx.repetition);
        let value = ctx.current_value()?;

        let bid = match self.margin(ctx.holdings) {
            None => self.opening_bid(ctx, value),
            Some(margin) => {
                let raw = f64::from(value) * (1.0 + margin);
                let price = match ctx.side {
                    Side::Buy => raw.ceil(),
                    Side::Sell => raw.floor(),
                };
                ctx.side.clamp_to_value(price as Price, value)
            }
        };
        Some(bid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::Fixture;

    #[test]
    fn test_opening_bid_within_bounds() {
        let buyer = Fixture::buyer(200);
        let seller = Fixture::seller(100);
        for seed in 0..100 {
            let bid = Zip::new(seed).submit_bids(&buyer.context()).unwrap();
            assert!((61..=200).contains(&bid));
            let ask = Zip::new(seed).submit_bids(&seller.context()).unwrap();
            assert!((100..=260).contains(&ask));
        }
    }

    #[test]
    fn test_margin_signs_hold() {
        let mut zip = Zip::new(5);
        let buyer = Fixture::buyer(200);
        zip.submit_bids(&buyer.context()).unwrap();
        assert!(zip.margin(0).unwrap() <= 0.0);

        let mut zip = Zip::new(5);
        let seller = Fixture::seller(100);
        zip.submit_bids(&seller.context()).unwrap();
        assert!(zip.margin(0).unwrap() >= 0.0);
    }

    #[test]
    fn test_opening_bid_respects_last_repetition() {
        let mut buyer = Fixture::buyer(200);
        buyer.previous_unit_bids = vec![70];
        for seed in 0..50 {
            let bid = Zip::new(seed).submit_bids(&buyer.context()).unwrap();
            assert!((61..=70).contains(&bid));
        }
    }

    #[test]
    fn test_buyer_outbid_lowers_margin() {
        let mut buyer = Fixture::buyer(200);
        let mut zip = Zip::new(11);
        // Force a deep opening margin by anchoring at the floor
        buyer.previous_unit_bids = vec![61];
        let first = zip.submit_bids(&buyer.context()).unwrap();
        assert_eq!(first, 61);
        buyer.current_bid = Some(first);
        let before = zip.margin(0).unwrap();

        // A competing bid at 150 that did not trade: we are out-bid
        buyer.shout("rival", Side::Buy, 150, 2_000);
        zip.adjust_state(&buyer.context());

        let after = zip.margin(0).unwrap();
        assert!(after > before, "margin {before} -> {after}");
        assert!(after <= 0.0);
        assert!(zip.submit_bids(&buyer.context()).unwrap() > first);
    }

    #[test]
    fn test_seller_raises_margin_after_cheap_trade() {
        let mut seller = Fixture::seller(100);
        let mut zip = Zip::new(2);
        let first = zip.submit_bids(&seller.context()).unwrap();
        seller.current_bid = Some(first);
        zip.margins[0] = 0.1;
        let before = zip.margin(0).unwrap();

        // A trade far above our ask price: room to ask for more
        seller.trade(250, 250, 2_000);
        zip.adjust_state(&seller.context());

        assert!(zip.margin(0).unwrap() > before);
    }

    #[test]
    fn test_new_repetition_resets_margins() {
        let mut buyer = Fixture::buyer(200);
        let mut zip = Zip::new(4);
        zip.submit_bids(&buyer.context()).unwrap();
        assert!(zip.margin(0).is_some());

        buyer.repetition = 1;
        zip.adjust_state(&buyer.context());
        assert!(zip.margin(0).is_none());
    }
}
