//! GDX: Gjerstad-Dickhaut belief with dynamic programming over time.
//!
//! `V(t, n)` is the discounted surplus an agent with `t` units left and `n`
//! bidding rounds left expects under the current belief:
//!
//! ```text
//! V(t, n) = max_p  Pr(p) * (s_t(p) + γ V(t-1, n-1))
//!                + (1 - Pr(p)) * γ V(t, n-1)
//! V(0, n) = V(t, 0) = 0
//! ```
//!
//! `s_t` is the surplus of the unit that is traded with `t` units left.
//! The table is filled bottom-up and the price for `(t, n)` at the top is
//! the one submitted.

use std::sync::Arc;

use agora_core::{Price, Side};

use crate::belief::{BeliefKind, BeliefRegistry};
use crate::registry::StrategyKind;
use crate::strategy::{Strategy, StrategyContext};

/// Discount per bidding round
pub const GAMMA: f64 = 0.9;

/// Solved value table for one belief snapshot
#[derive(Debug, Clone)]
pub struct ExpectedValuePlan {
    side: Side,
    gamma: f64,
    v_min: Price,
    v_max: Price,
    /// Unit value with `t` units left, at index `t - 1`
    units: Vec<Price>,
    probability: Vec<f64>,
    rounds: usize,
    values: Vec<f64>,
    best: Vec<Option<Price>>,
}

impl ExpectedValuePlan {
    /// Solve the table for up to `units.len()` units and `rounds` rounds.
    /// `probability[i]` is the belief at price `v_min + i`.
    pub fn solve(
        side: Side,
        units: Vec<Price>,
        v_min: Price,
        v_max: Price,
        gamma: f64,
        rounds: usize,
        probability: Vec<f64>,
    ) -> Self {
        let cells = (units.len() + 1) * (rounds + 1);
        let mut plan = Self {
            side,
            gamma,
            v_min,
            v_max,
            units,
            probability,
            rounds,
            values: vec![0.0; cells],
            best: vec![None; cells],
        };

        for t in 1..=plan.units.len() {
            let unit = plan.units[t - 1];
            for n in 1..=rounds {
                let prices: Box<dyn Iterator<Item = Price>> = match side {
                    Side::Buy => Box::new((v_min..=unit.min(v_max)).rev()),
                    Side::Sell => Box::new(unit.max(v_min)..=v_max),
                };
                let mut best: Option<(Price, f64)> = None;
                for price in prices {
                    let value = plan.value_at(t, n, price);
                    if value > best.map_or(0.0, |(_, b)| b) {
                        best = Some((price, value));
                    }
                }
                let index = plan.index(t, n);
                if let Some((price, value)) = best {
                    plan.values[index] = value;
                    plan.best[index] = Some(price);
                }
            }
        }
        plan
    }

    fn index(&self, t: usize, n: usize) -> usize {
        t * (self.rounds + 1) + n
    }

    fn probability(&self, price: Price) -> f64 {
        usize::try_from(price - self.v_min)
            .ok()
            .and_then(|i| self.probability.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    /// `V(t, n)`; 0 on the boundaries and outside the table
    pub fn value(&self, t: usize, n: usize) -> f64 {
        if t == 0 || n == 0 || t > self.units.len() || n > self.rounds {
            return 0.0;
        }
        self.values[self.index(t, n)]
    }

    /// Expected value of shouting `price` in state `(t, n)`
    pub fn value_at(&self, t: usize, n: usize, price: Price) -> f64 {
        if t == 0 || n == 0 || t > self.units.len() {
            return 0.0;
        }
        let unit = self.units[t - 1];
        let pr = if (self.v_min..=self.v_max).contains(&price) {
            self.probability(price)
        } else {
            0.0
        };
        let surplus = f64::from(self.side.surplus(unit, price));
        pr * (surplus + self.gamma * self.value(t - 1, n - 1))
            + (1.0 - pr) * self.gamma * self.value(t, n - 1)
    }

    /// Price maximising `V(t, n)`, if any has positive value
    pub fn best_price(&self, t: usize, n: usize) -> Option<Price> {
        if t == 0 || n == 0 || t > self.units.len() || n > self.rounds {
            return None;
        }
        self.best[self.index(t, n)]
    }
}

pub struct Gdx {
    beliefs: Arc<BeliefRegistry>,
    kind: BeliefKind,
    max_trades: usize,
}

impl Gdx {
    pub fn new(beliefs: Arc<BeliefRegistry>, kind: BeliefKind, max_trades: usize) -> Self {
        Self {
            beliefs,
            kind,
            max_trades,
        }
    }
}

impl Strategy for Gdx {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Gdx
    }

    fn adjust_state(&mut self, ctx: &StrategyContext<'_>) {
        let belief = self.beliefs.get(ctx.repetition, self.kind);
        belief
            .lock()
            .refresh(ctx.history, ctx.previous_transactions);
    }

    fn submit_bids(&mut self, ctx: &StrategyContext<'_>) -> Option<Price> {
        let value = ctx.current_value()?;
        let trades_left = ctx.trades_left();
        let rounds = ctx.remaining_bids();

        let units: Vec<Price> = (1..=trades_left)
            .map_while(|t| {
                self.max_trades
                    .checked_sub(t)
                    .and_then(|unit| ctx.values.get(unit))
            })
            .collect();
        let probability = {
            let belief = self.beliefs.get(ctx.repetition, self.kind);
            let belief = belief.lock();
            belief.curve(ctx.side).to_vec()
        };

        let plan = ExpectedValuePlan::solve(
            ctx.side,
            units,
            ctx.params.v_min,
            ctx.params.v_max,
            GAMMA,
            rounds,
            probability,
        );
        let price = plan
            .best_price(trades_left, rounds)
            .unwrap_or_else(|| ctx.passive_price());
        log::trace!(
            "gdx {:?} t={trades_left} n={rounds} value={value} price={price}",
            ctx.side
        );
        Some(ctx.side.clamp_to_value(price, value))
    }
}
