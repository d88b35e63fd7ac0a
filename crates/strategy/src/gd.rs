//! Gjerstad-Dickhaut: maximise expected surplus under the shared belief.

use std::sync::Arc;

use agora_core::{Price, Side};

use crate::belief::{BeliefEstimator, BeliefKind, BeliefRegistry};
use crate::registry::StrategyKind;
use crate::strategy::{Strategy, StrategyContext};

pub struct Gd {
    beliefs: Arc<BeliefRegistry>,
    kind: BeliefKind,
}

impl Gd {
    pub fn new(beliefs: Arc<BeliefRegistry>, kind: BeliefKind) -> Self {
        Self { beliefs, kind }
    }
}

/// Price with the highest `surplus * probability`, scanning from the value
/// towards the passive extreme. `None` when no price has positive payoff.
pub(crate) fn best_response(
    belief: &BeliefEstimator,
    side: Side,
    value: Price,
    v_min: Price,
    v_max: Price,
) -> Option<Price> {
    let prices: Box<dyn Iterator<Item = Price>> = match side {
        Side::Buy => Box::new((v_min..=value).rev()),
        Side::Sell => Box::new(value..=v_max),
    };

    let mut best: Option<(Price, f64)> = None;
    for price in prices {
        let payoff = f64::from(side.surplus(value, price)) * belief.probability(side, price);
        if payoff > best.map_or(0.0, |(_, b)| b) {
            best = Some((price, payoff));
        }
    }
    best.map(|(price, _)| price)
}

impl Strategy for Gd {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Gd
    }

    fn adjust_state(&mut self, ctx: &StrategyContext<'_>) {
        let belief = self.beliefs.get(ctx.repetition, self.kind);
        belief
            .lock()
            .refresh(ctx.history, ctx.previous_transactions);
    }

    fn submit_bids(&mut self, ctx: &StrategyContext<'_>) -> Option<Price> {
        let value = ctx.current_value()?;
        let belief = self.beliefs.get(ctx.repetition, self.kind);
        let belief = belief.lock();

        let price = best_response(&belief, ctx.side, value, ctx.params.v_min, ctx.params.v_max)
            .unwrap_or_else(|| ctx.passive_price());
        Some(ctx.side.clamp_to_value(price, value))
    }
}
